use serde_json::json;

use crate::generator::{
  config::SpecVersion,
  dedup::{query_literal_parameters, remove_query_params},
  metrics::{GenerationStats, GenerationWarning},
  path::{HttpMethod, PathDictionary, PathEntry},
};

fn entry(method: HttpMethod, path: &str, operation_id: &str) -> PathEntry {
  PathEntry {
    method,
    path: path.to_string(),
    operation_id: Some(operation_id.to_string()),
    ..PathEntry::default()
  }
}

#[test]
fn test_query_literal_parameters() {
  let params = query_literal_parameters("action=cancel&vmw-task", SpecVersion::Swagger2);
  assert_eq!(
    serde_json::to_value(&params).unwrap(),
    json!([
      {
        "name": "action",
        "in": "query",
        "description": "action=cancel",
        "required": true,
        "type": "string",
        "enum": ["cancel"]
      },
      {"name": "vmw-task", "in": "query", "description": "vmw-task", "required": true, "type": "string"}
    ])
  );

  let params = query_literal_parameters("action=cancel", SpecVersion::OpenApi3);
  assert_eq!(
    serde_json::to_value(&params).unwrap(),
    json!([{
      "name": "action",
      "in": "query",
      "description": "action=cancel",
      "required": true,
      "schema": {"type": "string", "enum": ["cancel"]}
    }])
  );
}

#[test]
fn test_lifts_query_into_missing_base() {
  let mut paths = PathDictionary::from_entries([entry(
    HttpMethod::Post,
    "/api/cis/tasks/{task}?action=cancel",
    "cancel",
  )]);
  let mut stats = GenerationStats::default();

  remove_query_params(&mut paths, SpecVersion::Swagger2, &mut stats);

  assert_eq!(paths.keys().collect::<Vec<_>>(), ["/api/cis/tasks/{task}"]);
  let moved = &paths.get("/api/cis/tasks/{task}").unwrap()[&HttpMethod::Post];
  assert_eq!(moved.path, "/api/cis/tasks/{task}");
  assert_eq!(moved.parameters.len(), 1);
  assert_eq!(moved.parameters[0].name, "action");
  assert!(stats.warnings.is_empty());
}

#[test]
fn test_merges_disjoint_verbs_into_base() {
  let mut paths = PathDictionary::from_entries([
    entry(HttpMethod::Get, "/api/vcenter/vm/{vm}", "get"),
    entry(HttpMethod::Post, "/api/vcenter/vm/{vm}?action=clone", "clone"),
  ]);
  let mut stats = GenerationStats::default();

  remove_query_params(&mut paths, SpecVersion::OpenApi3, &mut stats);

  assert_eq!(paths.len(), 1);
  let verbs = paths.get("/api/vcenter/vm/{vm}").unwrap();
  assert_eq!(verbs.len(), 2);
  assert!(verbs[&HttpMethod::Get].parameters.is_empty());
  assert_eq!(verbs[&HttpMethod::Post].operation_id.as_deref(), Some("clone"));
  assert_eq!(verbs[&HttpMethod::Post].parameters[0].name, "action");
}

#[test]
fn test_overlapping_verbs_are_kept_with_warning() {
  let mut paths = PathDictionary::from_entries([
    entry(HttpMethod::Post, "/api/vcenter/vm", "create"),
    entry(HttpMethod::Post, "/api/vcenter/vm?action=register", "register"),
  ]);
  let original = paths.clone();
  let mut stats = GenerationStats::default();

  remove_query_params(&mut paths, SpecVersion::OpenApi3, &mut stats);

  assert_eq!(paths, original);
  assert_eq!(
    stats.warnings,
    vec![GenerationWarning::DuplicatePath {
      path: "/api/vcenter/vm?action=register".to_string()
    }]
  );
}
