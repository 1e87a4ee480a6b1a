//! Unions the rest and api bundles of a package.
//!
//! With deprecation enabled, a type defined differently by both families keeps
//! its rest definition under `<name>_deprecated`, and every reference inside
//! the rest bundle is rewritten to follow it. Fragments are compared
//! structurally; identical definitions are shared rather than duplicated.

use indexmap::IndexMap;

use super::{
  config::Family,
  path::PathDictionary,
  type_dictionary::TypeDictionary,
  walk::{DocumentVisitor, TextSlot, Walk},
};

pub const DEPRECATED_SUFFIX: &str = "_deprecated";

#[derive(Debug, Clone, PartialEq)]
pub struct SpecBundle {
  pub family: Family,
  pub paths: PathDictionary,
  pub types: TypeDictionary,
}

impl SpecBundle {
  pub fn new(family: Family) -> Self {
    Self {
      family,
      paths: PathDictionary::new(),
      types: TypeDictionary::new(),
    }
  }
}

/// Rewrites strings that name `from` to name `to`: any text equal to `from`,
/// and references whose last segment is `from`.
struct ReferenceRewriter<'a> {
  from: &'a str,
  to: &'a str,
}

impl DocumentVisitor for ReferenceRewriter<'_> {
  fn text(&mut self, slot: TextSlot, value: &mut String) {
    if *value == self.from {
      *value = self.to.to_string();
    } else if slot == TextSlot::Reference
      && let Some(prefix) = value.strip_suffix(self.from)
      && prefix.ends_with('/')
    {
      *value = format!("{prefix}{}", self.to);
    }
  }
}

/// Renames `name` inside `bundle` and rewrites every reference to it.
pub fn rename_type(bundle: &mut SpecBundle, name: &str, renamed: &str) {
  bundle.types.rename(name, renamed);
  bundle.types.rename_request_body(name, renamed);
  let mut rewriter = ReferenceRewriter { from: name, to: renamed };
  bundle.paths.walk(&mut rewriter);
  bundle.types.walk(&mut rewriter);
}

/// Names defined by both dictionaries with differing definitions.
pub fn conflicting_types(rest: &TypeDictionary, api: &TypeDictionary) -> Vec<String> {
  rest
    .iter()
    .filter(|(name, entry)| api.entry(name).is_some_and(|other| other != *entry))
    .map(|(name, _)| name.clone())
    .collect()
}

pub fn merge_bundles(mut rest: SpecBundle, api: SpecBundle, deprecate_rest: bool) -> SpecBundle {
  if deprecate_rest {
    for name in conflicting_types(&rest.types, &api.types) {
      let renamed = format!("{name}{DEPRECATED_SUFFIX}");
      tracing::debug!(type_name = %name, %renamed, "keeping rest definition under deprecated name");
      rename_type(&mut rest, &name, &renamed);
    }
  }

  let mut merged = SpecBundle {
    family: Family::Api,
    paths: rest.paths,
    types: rest.types,
  };
  merged.paths.extend(api.paths);
  merged.types.extend(api.types);
  merged
}

/// Pairs per-package bundles of both families and merges each pair. A package
/// present in only one family passes through unchanged.
pub fn merge_packages(
  rest: IndexMap<String, SpecBundle>,
  mut api: IndexMap<String, SpecBundle>,
  deprecate_rest: bool,
) -> IndexMap<String, SpecBundle> {
  let mut merged = IndexMap::new();
  for (package, rest_bundle) in rest {
    let bundle = match api.shift_remove(&package) {
      Some(api_bundle) => merge_bundles(rest_bundle, api_bundle, deprecate_rest),
      None => rest_bundle,
    };
    merged.insert(package, bundle);
  }
  merged.extend(api);
  merged.sort_keys();
  merged
}
