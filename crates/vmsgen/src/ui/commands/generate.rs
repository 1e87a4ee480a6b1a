use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::{Local, Timelike};
use crossterm::style::Stylize;
use itertools::Itertools;

use crate::{
  generator::{
    config::{SpecVersion, SynthesisConfig},
    document::{API_INDEX_FILE, OutputDocument},
    metrics::GenerationStats,
    navigation::RestNavigator,
    orchestrator::{GenerationOutput, Orchestrator},
  },
  ui::{Colors, GenerateCommand, OasVersion},
  utils::{ComponentDirectory, load_index, load_navigation},
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub metamodel: PathBuf,
  pub navigation: Option<PathBuf>,
  pub output: PathBuf,
  pub verbose: bool,
  pub quiet: bool,
  pub synthesis: SynthesisConfig,
}

impl From<OasVersion> for SpecVersion {
  fn from(version: OasVersion) -> Self {
    match version {
      OasVersion::Swagger2 => Self::Swagger2,
      OasVersion::OpenApi3 => Self::OpenApi3,
    }
  }
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand, verbosity: u8) -> anyhow::Result<Self> {
    let GenerateCommand {
      metamodel,
      navigation,
      output,
      oas,
      tag_separator,
      unique_operation_ids,
      show_unreleased,
      deprecate_rest,
      split,
      host,
      quiet,
    } = command;

    if tag_separator.is_empty() {
      anyhow::bail!("Tag separator (--tag-separator) must not be empty");
    }

    let synthesis = SynthesisConfig::builder()
      .spec_version(oas.into())
      .show_unreleased(show_unreleased)
      .unique_operation_ids(unique_operation_ids)
      .deprecate_rest(deprecate_rest)
      .tag_separator(tag_separator)
      .split_output(split)
      .host(host)
      .build();

    Ok(Self {
      metamodel,
      navigation,
      output,
      verbose: verbosity > 0,
      quiet,
      synthesis,
    })
  }

  async fn load_orchestrator(&self) -> anyhow::Result<Orchestrator> {
    let source = ComponentDirectory::new(&self.metamodel);
    let index = load_index(&source).await?;
    let navigator: Option<Arc<dyn RestNavigator>> = match &self.navigation {
      Some(path) => Some(Arc::new(load_navigation(path).await?)),
      None => None,
    };
    Ok(Orchestrator::new(index, navigator, self.synthesis.clone()))
  }
}

/// Writes every document plus `api.json` into `output`.
pub async fn write_documents(output: &std::path::Path, generated: &GenerationOutput) -> anyhow::Result<()> {
  tokio::fs::create_dir_all(output)
    .await
    .with_context(|| format!("failed to create output directory {}", output.display()))?;
  for document in &generated.documents {
    write_json(&output.join(document.file_name()), &document.document).await?;
  }
  write_json(&output.join(API_INDEX_FILE), &generated.api_index).await
}

async fn write_json(path: &std::path::Path, value: &impl serde::Serialize) -> anyhow::Result<()> {
  let mut bytes = serde_json::to_vec_pretty(value)?;
  bytes.push(b'\n');
  tokio::fs::write(path, bytes)
    .await
    .with_context(|| format!("failed to write {}", path.display()))
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading metamodel from: {}", self.config.metamodel.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_generating(&self) {
    let flavour = match self.config.synthesis.spec_version {
      SpecVersion::Swagger2 => "Swagger 2.0",
      SpecVersion::OpenApi3 => "OpenAPI 3.0",
    };
    self.info(
      &format!("Generating {flavour} documents...")
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn print_statistics(&self, stats: &GenerationStats, documents: &[OutputDocument]) {
    if self.config.quiet {
      return;
    }

    self.stat("Packages synthesised:", stats.packages_processed.to_string());
    self.stat("Services processed:", stats.services_processed.to_string());
    self.stat("Operations converted:", stats.operations_converted.to_string());
    if stats.deprecated_paths > 0 {
      self.stat("", format!("{} deprecated /rest paths", stats.deprecated_paths));
    }
    self.stat("Types registered:", stats.types_registered.to_string());
    self.stat("Documents:", documents.len().to_string());
    if self.config.verbose {
      for document in documents {
        self.stat(
          "",
          format!("{} ({} paths)", document.file_name(), document.document.path_count()),
        );
      }
    }
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }
    if stats.skipped_count() > 0 {
      self.stat("Skipped:", stats.skipped_count().to_string());
    }
    self.print_warnings(stats);
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    if stats.warnings.is_empty() || self.config.quiet || !self.config.verbose {
      return;
    }

    println!();
    for warning in &stats.warnings {
      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    self.info(
      &format!("Writing to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated API documents".with(self.colors.success())
      );
    }
  }
}

pub async fn generate_documents(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let orchestrator = config.load_orchestrator().await?;

  logger.log_generating();
  let generated = orchestrator.generate().await?;
  logger.print_statistics(&generated.stats, &generated.documents);

  logger.log_writing();
  write_documents(&config.output, &generated).await?;

  if !generated.failures.is_empty() {
    let failed = generated
      .failures
      .iter()
      .map(|failure| format!("{}/{}: {:#}", failure.family, failure.package, failure.error))
      .join(", ");
    anyhow::bail!("synthesis failed for {} package(s): {failed}", generated.failures.len());
  }

  logger.log_success();
  Ok(())
}
