use strum::Display;
use vmsgen_metamodel::Metadata;

/// Output document flavour. Threaded through every visitor and handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SpecVersion {
  #[strum(serialize = "2")]
  Swagger2,
  #[default]
  #[strum(serialize = "3")]
  OpenApi3,
}

impl SpecVersion {
  pub const fn schema_ref_prefix(self) -> &'static str {
    match self {
      Self::Swagger2 => "#/definitions/",
      Self::OpenApi3 => "#/components/schemas/",
    }
  }

  pub const fn is_oas3(self) -> bool {
    matches!(self, Self::OpenApi3)
  }
}

/// Routing convention a path belongs to. The two families encode maps and
/// request bodies differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Family {
  Rest,
  Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPolicy {
  #[default]
  ReleasedOnly,
  ShowAll,
}

impl FilterPolicy {
  pub const fn from_show_unreleased(show_unreleased: bool) -> Self {
    if show_unreleased { Self::ShowAll } else { Self::ReleasedOnly }
  }

  /// Whether an element carrying `metadata` is excluded from output.
  ///
  /// `TechPreview` wins over `Changing`/`Proposed`.
  pub fn is_filtered(self, metadata: &Metadata) -> bool {
    if matches!(self, Self::ShowAll) || metadata.is_empty() {
      return false;
    }
    if metadata.contains("TechPreview") {
      return false;
    }
    metadata.contains("Changing") || metadata.contains("Proposed")
  }
}

#[derive(Debug, Clone, bon::Builder)]
pub struct SynthesisConfig {
  #[builder(default)]
  pub spec_version: SpecVersion,
  #[builder(default)]
  pub show_unreleased: bool,
  #[builder(default)]
  pub unique_operation_ids: bool,
  #[builder(default)]
  pub deprecate_rest: bool,
  #[builder(default = "/".to_string(), into)]
  pub tag_separator: String,
  #[builder(default)]
  pub split_output: bool,
  #[builder(default = "<vcenter>".to_string(), into)]
  pub host: String,
}

impl Default for SynthesisConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl SynthesisConfig {
  pub const fn filter(&self) -> FilterPolicy {
    FilterPolicy::from_show_unreleased(self.show_unreleased)
  }
}
