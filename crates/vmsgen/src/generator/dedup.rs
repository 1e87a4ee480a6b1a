//! Lifts literal query strings out of path keys.
//!
//! A key such as `/cis/tasks/{task}?action=cancel` becomes `/cis/tasks/{task}`
//! with a required `action` query parameter constrained to `cancel`. When the
//! base path already exists the verbs are merged if they do not overlap; an
//! overlapping key is left untouched.

use super::{
  config::SpecVersion,
  metrics::{GenerationStats, GenerationWarning},
  path::{Parameter, ParameterLocation, PathDictionary, VerbMap},
  schema::SchemaFragment,
};

/// Parses `a=b&c` into required string query parameters.
pub fn query_literal_parameters(query: &str, version: SpecVersion) -> Vec<Parameter> {
  query
    .split('&')
    .map(|token| {
      let (name, value) = match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
      };
      let mut param = Parameter::new(name, ParameterLocation::Query);
      param.description = Some(token.to_string());
      param.required = Some(true);
      param.set_schema(
        version,
        SchemaFragment {
          schema_type: Some("string".to_string()),
          enum_values: value.map(|value| vec![value.to_string()]),
          ..SchemaFragment::default()
        },
      );
      param
    })
    .collect()
}

fn append_parameters(verbs: &mut VerbMap, base_path: &str, params: &[Parameter]) {
  for entry in verbs.values_mut() {
    entry.parameters.extend(params.iter().cloned());
    entry.path = base_path.to_string();
  }
}

pub fn remove_query_params(paths: &mut PathDictionary, version: SpecVersion, stats: &mut GenerationStats) {
  let keys: Vec<String> = paths.keys().filter(|key| key.contains('?')).cloned().collect();
  let mut merged_keys = Vec::new();

  for key in keys {
    let Some((base_path, query)) = key.split_once('?') else {
      continue;
    };
    let params = query_literal_parameters(query, version);

    if !paths.contains(base_path) {
      if let Some(mut verbs) = paths.remove(&key) {
        append_parameters(&mut verbs, base_path, &params);
        paths.insert_verbs(base_path, verbs);
      }
      continue;
    }

    let (Some(verbs), Some(existing)) = (paths.get(&key), paths.get(base_path)) else {
      continue;
    };
    if verbs.keys().any(|method| existing.contains_key(method)) {
      stats.record_warning(GenerationWarning::DuplicatePath { path: key.clone() });
      continue;
    }

    let mut merged = verbs.clone();
    append_parameters(&mut merged, base_path, &params);
    for (method, entry) in existing {
      merged.insert(*method, entry.clone());
    }
    paths.insert_verbs(base_path, merged);
    merged_keys.push(key);
  }

  for key in merged_keys {
    paths.remove(&key);
  }
}
