use strum::Display;

use super::config::Family;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub packages_processed: usize,
  pub services_processed: usize,
  pub operations_converted: usize,
  pub types_registered: usize,
  pub paths_generated: usize,
  pub deprecated_paths: usize,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_package(&mut self) {
    self.packages_processed += 1;
  }

  pub fn record_service(&mut self) {
    self.services_processed += 1;
  }

  pub fn record_operation(&mut self) {
    self.operations_converted += 1;
  }

  pub fn record_deprecated_path(&mut self) {
    self.deprecated_paths += 1;
  }

  pub fn record_types(&mut self, count: usize) {
    self.types_registered += count;
  }

  pub fn record_paths(&mut self, count: usize) {
    self.paths_generated += count;
  }

  /// Records a best-effort degradation and mirrors it to the log.
  pub fn record_warning(&mut self, warning: GenerationWarning) {
    tracing::warn!("{warning}");
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    for warning in warnings {
      self.record_warning(warning);
    }
  }

  /// Folds a finished task's counters into the run total.
  pub fn merge(&mut self, other: Self) {
    self.packages_processed += other.packages_processed;
    self.services_processed += other.services_processed;
    self.operations_converted += other.operations_converted;
    self.types_registered += other.types_registered;
    self.paths_generated += other.paths_generated;
    self.deprecated_paths += other.deprecated_paths;
    self.warnings.extend(other.warnings);
  }

  pub fn skipped_count(&self) -> usize {
    self.warnings.iter().filter(|warning| warning.is_skipped_item()).count()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
  #[strum(to_string = "service info not found")]
  MissingServiceInfo,
  #[strum(to_string = "operation not found")]
  MissingOperation,
  #[strum(to_string = "filtered as unreleased")]
  Filtered,
  #[strum(to_string = "no routing metadata")]
  NoRoute,
  #[strum(to_string = "blacklisted for the rest family")]
  Blacklisted,
  #[strum(to_string = "navigation unavailable")]
  NavigationUnavailable,
  #[strum(to_string = "unsupported http method")]
  UnsupportedMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Type '{type_name}' could not be resolved; its $ref will dangle")]
  DanglingReference { type_name: String },
  #[strum(to_string = "No parameter matches placeholder '{{{placeholder}}}' in '{url}'")]
  PathParameterMismatch { placeholder: String, url: String },
  #[strum(to_string = "Skipped service '{service}' ({family}): {reason}")]
  SkippedService {
    service: String,
    family: Family,
    reason: SkipReason,
  },
  #[strum(to_string = "Skipped operation '{service}.{operation}' ({family}): {reason}")]
  SkippedOperation {
    service: String,
    operation: String,
    family: Family,
    reason: SkipReason,
  },
  #[strum(to_string = "Path '{path}' collides with its base path on a shared method and was kept as is")]
  DuplicatePath { path: String },
}

impl GenerationWarning {
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::SkippedService { .. } | Self::SkippedOperation { .. })
  }
}
