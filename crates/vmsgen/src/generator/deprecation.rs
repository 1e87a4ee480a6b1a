use indexmap::IndexMap;

use super::path::{DeprecationNotice, HttpMethod, PathEntry};

pub const UNKNOWN_REPLACEMENT: &str = "<unknown>";

/// service -> operation -> method -> api path (without the `/api` prefix).
///
/// Recorded for services routed by both conventions, so a deprecated rest
/// path can point at its api successor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap(IndexMap<String, IndexMap<String, IndexMap<HttpMethod, String>>>);

impl ReplacementMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, service: &str, operation: &str, method: HttpMethod, api_path: impl Into<String>) {
    self
      .0
      .entry(service.to_string())
      .or_default()
      .entry(operation.to_string())
      .or_default()
      .insert(method, api_path.into());
  }

  pub fn lookup(&self, service: &str, operation: &str) -> Option<(HttpMethod, &str)> {
    self
      .0
      .get(service)?
      .get(operation)?
      .iter()
      .next()
      .map(|(method, path)| (*method, path.as_str()))
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Marks rest paths deprecated and links their api replacement.
#[derive(Debug, Clone, Copy)]
pub struct DeprecationAnnotator<'a> {
  replacements: &'a ReplacementMap,
  api_file_prefix: &'a str,
}

impl<'a> DeprecationAnnotator<'a> {
  /// `api_file_prefix` is prepended to `<package>.json` when api paths are
  /// written to their own file.
  pub const fn new(replacements: &'a ReplacementMap, api_file_prefix: &'a str) -> Self {
    Self {
      replacements,
      api_file_prefix,
    }
  }

  pub fn replacement(&self, package: &str, service: &str, operation: &str) -> String {
    match self.replacements.lookup(service, operation) {
      Some((method, path)) => format!(
        "{}{package}.json#/paths/~1api{}/{method}",
        self.api_file_prefix,
        path.replace('/', "~1")
      ),
      None => UNKNOWN_REPLACEMENT.to_string(),
    }
  }

  pub fn annotate(&self, entry: &mut PathEntry, package: &str, service: &str) {
    let replacement = entry
      .operation_id
      .as_deref()
      .map_or_else(|| UNKNOWN_REPLACEMENT.to_string(), |operation| self.replacement(package, service, operation));
    entry.deprecated = Some(true);
    entry.deprecation = Some(DeprecationNotice { replacement });
  }
}
