use serde_json::json;
use vmsgen_metamodel::{ElementMap, TypeDescriptor};

use super::support::{annotated, context, field, long, string, structure, vm_metamodel};
use crate::generator::{
  config::{Family, SpecVersion},
  metrics::{GenerationStats, GenerationWarning},
  parameters::{OperationTarget, classify_request, convert_parameter, extract_path_parameters},
  path::{HttpMethod, ParameterLocation},
};

fn target<'a>(operation_name: &'a str, method: HttpMethod, url: &'a str) -> OperationTarget<'a> {
  OperationTarget {
    service_name: "com.vmware.vcenter.VM",
    operation_name,
    method,
    url,
    form_encoded: false,
  }
}

#[test]
fn test_extract_path_parameters_by_name() {
  let params = vec![field("vm", TypeDescriptor::builtin("ID")), field("spec", string())];
  let mut stats = GenerationStats::default();

  let extraction = extract_path_parameters(&params, "/api/vcenter/vm/{vm}", &mut stats);

  assert_eq!(
    extraction.path_params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
    ["vm"]
  );
  assert_eq!(
    extraction.remaining.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
    ["spec"]
  );
  assert_eq!(extraction.url, "/api/vcenter/vm/{vm}");
  assert!(stats.warnings.is_empty());
}

#[test]
fn test_extract_path_parameters_renames_path_variable() {
  let params = vec![annotated(
    field("library_item", TypeDescriptor::builtin("ID")),
    "PathVariable",
    ElementMap::new().with_string("value", "id"),
  )];
  let mut stats = GenerationStats::default();

  let extraction = extract_path_parameters(&params, "/api/content/library/item/{id}?action=copy", &mut stats);

  assert_eq!(extraction.url, "/api/content/library/item/{library_item}?action=copy");
  assert_eq!(extraction.path_params.len(), 1);
  assert!(extraction.remaining.is_empty());
}

#[test]
fn test_extract_path_parameters_unmatched_placeholder() {
  let mut stats = GenerationStats::default();

  let extraction = extract_path_parameters(&[], "/api/vcenter/vm/{vm}", &mut stats);

  assert_eq!(extraction.url, "/api/vcenter/vm/{vm}");
  assert_eq!(
    stats.warnings,
    vec![GenerationWarning::PathParameterMismatch {
      placeholder: "vm".to_string(),
      url: "/api/vcenter/vm/{vm}".to_string(),
    }]
  );
}

#[test]
fn test_rest_post_wraps_body_swagger2() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Rest, SpecVersion::Swagger2);
  let params = vec![field("spec", TypeDescriptor::structure("com.vmware.vcenter.VM.create_spec"))];

  let parts = classify_request(&mut ctx, target("create", HttpMethod::Post, "/rest/vcenter/vm"), &params);

  assert_eq!(parts.url, "/rest/vcenter/vm");
  assert!(parts.request_body.is_none());
  assert_eq!(
    serde_json::to_value(&parts.parameters).unwrap(),
    json!([{
      "name": "request_body",
      "in": "body",
      "required": true,
      "schema": {"$ref": "#/definitions/com.vmware.vcenter.VM_create"}
    }])
  );
  assert_eq!(
    serde_json::to_value(ctx.types.get("com.vmware.vcenter.VM_create").unwrap()).unwrap(),
    json!({
      "type": "object",
      "properties": {
        "spec": {"$ref": "#/definitions/com.vmware.vcenter.VM.create_spec", "description": "The spec."}
      },
      "required": ["spec"]
    })
  );
}

#[test]
fn test_api_patch_request_body_openapi3() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Api, SpecVersion::OpenApi3);
  let params = vec![
    field("vm", TypeDescriptor::builtin("ID")),
    annotated(
      field("spec", TypeDescriptor::structure("com.vmware.vcenter.VM.create_spec")),
      "Body",
      ElementMap::new(),
    ),
  ];

  let parts = classify_request(&mut ctx, target("update", HttpMethod::Patch, "/api/vcenter/vm/{vm}"), &params);

  assert_eq!(
    parts.request_body.as_ref().map(|body| body.reference.as_str()),
    Some("#/components/requestBodies/com.vmware.vcenter.VM_update")
  );
  assert_eq!(
    serde_json::to_value(&parts.parameters).unwrap(),
    json!([{
      "name": "vm",
      "in": "path",
      "description": "The vm.",
      "required": true,
      "schema": {"type": "string"}
    }])
  );
  assert_eq!(
    serde_json::to_value(ctx.types.get("com.vmware.vcenter.VM_update").unwrap()).unwrap(),
    json!({"$ref": "#/components/schemas/com.vmware.vcenter.VM.create_spec", "description": "The spec."})
  );
  assert_eq!(
    serde_json::to_value(&ctx.types.request_bodies()["com.vmware.vcenter.VM_update"]).unwrap(),
    json!({
      "content": {
        "application/json": {"schema": {"$ref": "#/components/schemas/com.vmware.vcenter.VM_update"}}
      }
    })
  );
}

#[test]
fn test_form_encoded_body_becomes_form_data() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Api, SpecVersion::Swagger2);
  let params = vec![
    annotated(
      field("username", string()),
      "BodyField",
      ElementMap::new().with_string("name", "username"),
    ),
    annotated(
      field("password", TypeDescriptor::optional(string())),
      "BodyField",
      ElementMap::new().with_string("name", "password"),
    ),
  ];
  let target = OperationTarget {
    form_encoded: true,
    ..target("token", HttpMethod::Post, "/api/vcenter/authentication/token")
  };

  let parts = classify_request(&mut ctx, target, &params);

  assert!(parts.request_body.is_none());
  assert_eq!(
    serde_json::to_value(&parts.parameters).unwrap(),
    json!([
      {"name": "username", "in": "formData", "description": "The username.", "required": true, "type": "string"},
      {"name": "password", "in": "formData", "description": "The password.", "type": "string"}
    ])
  );
}

#[test]
fn test_rest_get_flattens_structure_into_query() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Rest, SpecVersion::Swagger2);
  let params = vec![field("filter", TypeDescriptor::structure("com.vmware.vcenter.VM.filter_spec"))];

  let parts = classify_request(&mut ctx, target("list", HttpMethod::Get, "/rest/vcenter/vm"), &params);

  assert_eq!(
    serde_json::to_value(&parts.parameters).unwrap(),
    json!([
      {
        "name": "names",
        "in": "query",
        "description": "The names.",
        "required": false,
        "type": "array",
        "items": {"type": "string"},
        "uniqueItems": true,
        "collectionFormat": "multi"
      },
      {
        "name": "power_states",
        "in": "query",
        "description": "The power_states.",
        "required": false,
        "type": "array",
        "items": {"type": "string", "enum": ["POWERED_ON", "POWERED_OFF"]},
        "uniqueItems": true,
        "collectionFormat": "multi"
      },
      {
        "name": "limit",
        "in": "query",
        "description": "The limit.",
        "required": true,
        "type": "integer",
        "format": "int64"
      }
    ])
  );
}

#[test]
fn test_flattened_query_without_required_names_is_optional() {
  let index = vm_metamodel()
    .structure(structure(
      "com.vmware.vcenter.VM.list_options",
      vec![
        field("page", TypeDescriptor::optional(long())),
        field("cursor", TypeDescriptor::optional(string())),
      ],
    ))
    .build();
  let mut ctx = context(&index, Family::Rest, SpecVersion::Swagger2);
  let params = vec![field("options", TypeDescriptor::structure("com.vmware.vcenter.VM.list_options"))];

  let parts = classify_request(&mut ctx, target("list", HttpMethod::Get, "/rest/vcenter/vm"), &params);

  assert_eq!(
    serde_json::to_value(&parts.parameters).unwrap(),
    json!([
      {
        "name": "page",
        "in": "query",
        "description": "The page.",
        "required": false,
        "type": "integer",
        "format": "int64"
      },
      {"name": "cursor", "in": "query", "description": "The cursor.", "required": false, "type": "string"}
    ])
  );
}

#[test]
fn test_delete_sends_everything_as_query() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Rest, SpecVersion::Swagger2);
  let params = vec![
    field("vm", TypeDescriptor::builtin("ID")),
    field("force", TypeDescriptor::builtin("BOOLEAN")),
  ];

  let parts = classify_request(&mut ctx, target("delete", HttpMethod::Delete, "/rest/vcenter/vm/{vm}"), &params);

  assert!(parts.request_body.is_none());
  assert_eq!(
    serde_json::to_value(&parts.parameters).unwrap(),
    json!([
      {"name": "vm", "in": "path", "description": "The vm.", "required": true, "type": "string"},
      {"name": "force", "in": "query", "description": "The force.", "required": true, "type": "boolean"}
    ])
  );
}

#[test]
fn test_convert_parameter_inlines_enumeration() {
  let index = vm_metamodel().build();
  let state = field("state", TypeDescriptor::enumeration("com.vmware.vcenter.VM.power_state"));

  let mut openapi = context(&index, Family::Api, SpecVersion::OpenApi3);
  assert_eq!(
    serde_json::to_value(convert_parameter(&mut openapi, ParameterLocation::Query, &state)).unwrap(),
    json!({
      "name": "state",
      "in": "query",
      "description": "{ 1. Values of com.vmware.vcenter.VM.power_state. }, { 2. The state. }",
      "required": true,
      "schema": {"type": "string", "enum": ["POWERED_ON", "POWERED_OFF"]}
    })
  );

  let mut swagger = context(&index, Family::Api, SpecVersion::Swagger2);
  assert_eq!(
    serde_json::to_value(convert_parameter(&mut swagger, ParameterLocation::Query, &state)).unwrap(),
    json!({
      "name": "state",
      "in": "query",
      "description": "{ 1. Values of com.vmware.vcenter.VM.power_state. }, { 2. The state. }",
      "required": true,
      "type": "string",
      "enum": ["POWERED_ON", "POWERED_OFF"]
    })
  );
}
