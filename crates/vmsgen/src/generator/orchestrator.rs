//! Runs the synthesis pipeline.
//!
//! Classification is done up front. Each `(family, package)` pair is then
//! synthesised by its own blocking task that owns its dictionaries, and the
//! tasks meet at a single barrier before deduplication, merging and final
//! processing.

use std::{
  collections::HashSet,
  panic::{AssertUnwindSafe, catch_unwind},
  sync::Arc,
};

use anyhow::Context;
use indexmap::IndexMap;
use tokio::task::JoinSet;

use super::{
  assembler::{OperationParts, PathAssembler},
  classify::{PackagePlan, ServiceClassifier},
  config::{Family, SynthesisConfig},
  dedup::remove_query_params,
  deprecation::{DeprecationAnnotator, ReplacementMap},
  document::{ApiIndex, OutputDocument, finalize_bundle},
  index::MetamodelIndex,
  merger::{SpecBundle, merge_packages},
  metrics::GenerationStats,
  navigation::RestNavigator,
  parameters::{OperationTarget, classify_request},
  path::PathDictionary,
  responses::populate_responses,
  visitor::SynthesisContext,
};

/// A package whose task returned an error or panicked.
#[derive(Debug)]
pub struct PackageFailure {
  pub family: Family,
  pub package: String,
  pub error: anyhow::Error,
}

#[derive(Debug)]
pub struct GenerationOutput {
  pub documents: Vec<OutputDocument>,
  pub api_index: ApiIndex,
  pub stats: GenerationStats,
  pub failures: Vec<PackageFailure>,
}

#[derive(Clone)]
pub struct Orchestrator {
  index: Arc<MetamodelIndex>,
  navigator: Option<Arc<dyn RestNavigator>>,
  config: Arc<SynthesisConfig>,
}

impl Orchestrator {
  pub fn new(index: MetamodelIndex, navigator: Option<Arc<dyn RestNavigator>>, config: SynthesisConfig) -> Self {
    Self {
      index: Arc::new(index),
      navigator,
      config: Arc::new(config),
    }
  }

  fn api_file_prefix(&self) -> &'static str {
    if self.config.split_output { "api_" } else { "" }
  }

  pub async fn generate(&self) -> anyhow::Result<GenerationOutput> {
    let mut plan = ServiceClassifier::new(
      &self.index,
      self.navigator.as_deref(),
      self.config.filter(),
      self.config.deprecate_rest,
    )
    .classify();

    let mut stats = GenerationStats::default();
    stats.record_warnings(std::mem::take(&mut plan.warnings));
    let replacements = std::mem::take(&mut plan.replacements);

    self.synthesize(plan.into_packages(), replacements, stats).await
  }

  /// Synthesises `packages` in parallel and finishes the surviving bundles.
  pub async fn synthesize(
    &self,
    packages: impl IntoIterator<Item = PackagePlan>,
    replacements: ReplacementMap,
    mut stats: GenerationStats,
  ) -> anyhow::Result<GenerationOutput> {
    let replacements = Arc::new(replacements);

    let mut tasks = JoinSet::new();
    for package_plan in packages {
      let index = Arc::clone(&self.index);
      let config = Arc::clone(&self.config);
      let replacements = Arc::clone(&replacements);
      let api_file_prefix = self.api_file_prefix();
      tasks.spawn_blocking(move || {
        let family = package_plan.family;
        let package = package_plan.package.clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
          synthesize_package(&index, &config, &replacements, api_file_prefix, &package_plan)
        }))
        .unwrap_or_else(|_| Err(anyhow::anyhow!("synthesis task panicked")));
        (family, package, outcome)
      });
    }

    let mut rest = IndexMap::new();
    let mut api = IndexMap::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
      let (family, package, outcome) = joined.context("package task was cancelled")?;
      match outcome {
        Ok((bundle, task_stats)) => {
          stats.merge(task_stats);
          match family {
            Family::Rest => rest.insert(package, bundle),
            Family::Api => api.insert(package, bundle),
          };
        }
        Err(error) => {
          tracing::error!(%family, %package, "package synthesis failed: {error:#}");
          failures.push(PackageFailure { family, package, error });
        }
      }
    }
    failures.sort_by(|a, b| (a.family, &a.package).cmp(&(b.family, &b.package)));
    discard_failed_packages(&mut rest, &mut api, &failures, self.config.split_output);
    rest.sort_keys();
    api.sort_keys();

    for bundle in rest.values_mut().chain(api.values_mut()) {
      remove_query_params(&mut bundle.paths, self.config.spec_version, &mut stats);
    }

    let documents = self.emit(rest, api);
    let api_index = ApiIndex::from_names(documents.iter().map(|document| document.name.as_str()));
    tracing::info!(
      documents = documents.len(),
      failures = failures.len(),
      "generation finished"
    );

    Ok(GenerationOutput {
      documents,
      api_index,
      stats,
      failures,
    })
  }

  fn emit(&self, rest: IndexMap<String, SpecBundle>, api: IndexMap<String, SpecBundle>) -> Vec<OutputDocument> {
    let config = self.config.as_ref();
    if config.split_output {
      let rest_documents = rest
        .into_iter()
        .map(|(package, bundle)| finalize_bundle(bundle, &package, "rest_", config));
      let api_documents = api
        .into_iter()
        .map(|(package, bundle)| finalize_bundle(bundle, &package, "api_", config));
      return rest_documents.chain(api_documents).collect();
    }
    merge_packages(rest, api, config.deprecate_rest)
      .into_iter()
      .map(|(package, bundle)| finalize_bundle(bundle, &package, "", config))
      .collect()
  }
}

/// Drops bundles that must not be written because a task of their package failed.
///
/// Merged output needs both families, so a failure in either one drops the
/// package from both maps. Split output only loses the failed family's file.
pub fn discard_failed_packages(
  rest: &mut IndexMap<String, SpecBundle>,
  api: &mut IndexMap<String, SpecBundle>,
  failures: &[PackageFailure],
  split_output: bool,
) {
  for failure in failures {
    if split_output {
      match failure.family {
        Family::Rest => rest.shift_remove(&failure.package),
        Family::Api => api.shift_remove(&failure.package),
      };
      continue;
    }
    let dropped = rest.shift_remove(&failure.package).is_some() | api.shift_remove(&failure.package).is_some();
    if dropped {
      tracing::warn!(package = %failure.package, "discarding partially synthesised package");
    }
  }
}

/// Synthesises every planned operation of one package into a bundle.
pub fn synthesize_package(
  index: &MetamodelIndex,
  config: &SynthesisConfig,
  replacements: &ReplacementMap,
  api_file_prefix: &str,
  plan: &PackagePlan,
) -> anyhow::Result<(SpecBundle, GenerationStats)> {
  tracing::debug!(family = %plan.family, package = %plan.package, operations = plan.operations.len(), "synthesising package");

  let mut ctx = SynthesisContext::new(index, plan.family, config.spec_version, config.filter());
  let assembler = PathAssembler::new(config.spec_version, &config.tag_separator);
  let annotator = DeprecationAnnotator::new(replacements, api_file_prefix);
  let mut services = HashSet::new();
  let mut entries = Vec::with_capacity(plan.operations.len());

  for planned in &plan.operations {
    let service = index
      .service(&planned.service)
      .with_context(|| format!("service '{}' is not in the metamodel index", planned.service))?;
    let operation = service
      .operations
      .get(&planned.operation)
      .with_context(|| format!("operation '{}.{}' is not in the metamodel index", planned.service, planned.operation))?;

    let target = OperationTarget {
      service_name: &planned.service,
      operation_name: &planned.operation,
      method: planned.route.method,
      url: &planned.route.url,
      form_encoded: planned.route.form_encoded,
    };
    let request = classify_request(&mut ctx, target, &operation.params);
    let responses = populate_responses(&mut ctx, &planned.service, operation);

    let mut entry = assembler.assemble(
      OperationParts::builder()
        .service_name(&planned.service)
        .method(planned.route.method)
        .url(request.url)
        .documentation(&operation.documentation)
        .parameters(request.parameters)
        .maybe_request_body(request.request_body)
        .responses(responses)
        .operation_id(&planned.operation)
        .build(),
    );
    if planned.deprecated {
      annotator.annotate(&mut entry, &plan.package, &planned.service);
      ctx.stats.record_deprecated_path();
    }
    if services.insert(planned.service.as_str()) {
      ctx.stats.record_service();
    }
    ctx.stats.record_operation();
    entries.push(entry);
  }

  let paths = PathDictionary::from_entries(entries);
  for fragment in ctx.types.fragments_mut() {
    fragment.strip_property_flags();
  }

  let mut stats = ctx.stats;
  stats.record_package();
  stats.record_types(ctx.types.len());
  stats.record_paths(paths.len());

  Ok((
    SpecBundle {
      family: plan.family,
      paths,
      types: ctx.types,
    },
    stats,
  ))
}
