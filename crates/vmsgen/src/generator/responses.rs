use indexmap::IndexMap;
use vmsgen_metamodel::{OperationInfo, STRUCTURE_RESOURCE_TYPE};

use super::{
  config::Family,
  path::Response,
  schema::{Required, SchemaFragment},
  visitor::SynthesisContext,
};

pub const DEFAULT_SUCCESS_STATUS: u16 = 200;
pub const DEFAULT_ERROR_STATUS: u16 = 500;

const ERROR_STATUS: &[(&str, u16)] = &[
  ("com.vmware.vapi.std.errors.already_exists", 400),
  ("com.vmware.vapi.std.errors.already_in_desired_state", 400),
  ("com.vmware.vapi.std.errors.feature_in_use", 400),
  ("com.vmware.vapi.std.errors.internal_server_error", 500),
  ("com.vmware.vapi.std.errors.invalid_argument", 400),
  ("com.vmware.vapi.std.errors.invalid_element_configuration", 400),
  ("com.vmware.vapi.std.errors.invalid_element_type", 400),
  ("com.vmware.vapi.std.errors.invalid_request", 400),
  ("com.vmware.vapi.std.errors.not_found", 404),
  ("com.vmware.vapi.std.errors.operation_not_found", 404),
  ("com.vmware.vapi.std.errors.not_allowed_in_current_state", 400),
  ("com.vmware.vapi.std.errors.resource_busy", 400),
  ("com.vmware.vapi.std.errors.resource_in_use", 400),
  ("com.vmware.vapi.std.errors.resource_inaccessible", 400),
  ("com.vmware.vapi.std.errors.service_unavailable", 503),
  ("com.vmware.vapi.std.errors.timed_out", 504),
  ("com.vmware.vapi.std.errors.unable_to_allocate_resource", 400),
  ("com.vmware.vapi.std.errors.unauthenticated", 401),
  ("com.vmware.vapi.std.errors.unauthorized", 403),
  ("com.vmware.vapi.std.errors.unexpected_input", 400),
  ("com.vmware.vapi.std.errors.unsupported", 400),
  ("com.vmware.vapi.std.errors.error", 400),
  ("com.vmware.vapi.std.errors.concurrent_change", 400),
  ("com.vmware.vapi.std.errors.unverified_peer", 400),
];

/// HTTP status for a standard error structure id. Unknown errors map to 500.
pub fn error_status(structure_id: &str) -> u16 {
  ERROR_STATUS
    .iter()
    .find(|(id, _)| *id == structure_id)
    .map_or(DEFAULT_ERROR_STATUS, |(_, status)| *status)
}

/// Name of the rest-family success wrapper for an operation.
pub fn result_type_name(service_name: &str, operation_name: &str) -> String {
  if operation_name == "get" {
    format!("{service_name}_result")
  } else {
    format!("{service_name}.{operation_name}_result")
  }
}

fn success_status(operation: &OperationInfo) -> u16 {
  let Some(response) = operation.metadata.get("Response") else {
    return DEFAULT_SUCCESS_STATUS;
  };
  response
    .string("code")
    .and_then(|code| code.parse().ok())
    .or_else(|| {
      response
        .elements
        .get("code")
        .and_then(|value| value.long_value)
        .and_then(|code| u16::try_from(code).ok())
    })
    .unwrap_or(DEFAULT_SUCCESS_STATUS)
}

/// Maps the operation output and declared errors to status-coded responses.
pub fn populate_responses(
  ctx: &mut SynthesisContext<'_>,
  service_name: &str,
  operation: &OperationInfo,
) -> IndexMap<u16, Response> {
  let mut responses = IndexMap::new();

  let mut output = SchemaFragment::default();
  ctx.visit(&operation.output.output_type, &mut output);
  let output = (output.schema_type.as_deref() != Some("void")).then_some(output);

  let (status, schema) = match ctx.family {
    Family::Rest => {
      let schema = output.map(|value| {
        let type_name = result_type_name(service_name, &operation.name);
        ctx.types.insert_missing(
          type_name.clone(),
          SchemaFragment {
            schema_type: Some("object".to_string()),
            properties: Some(IndexMap::from([("value".to_string(), value)])),
            required: Some(Required::Names(vec!["value".to_string()])),
            ..SchemaFragment::default()
          },
        );
        SchemaFragment::reference(ctx.type_ref(&type_name))
      });
      (DEFAULT_SUCCESS_STATUS, schema)
    }
    Family::Api => (success_status(operation), output),
  };
  responses.insert(
    status,
    Response::new(ctx.version, operation.output.documentation.clone(), schema),
  );

  for error in &operation.errors {
    ctx.register(STRUCTURE_RESOURCE_TYPE, &error.structure_id);
    let schema = match ctx.family {
      Family::Rest => {
        let wrapper_name = format!("{}_error", error.structure_id);
        let properties = IndexMap::from([
          ("type".to_string(), SchemaFragment::of_type("string")),
          (
            "value".to_string(),
            SchemaFragment::reference(ctx.type_ref(&error.structure_id)),
          ),
        ]);
        ctx.types.insert(
          wrapper_name.clone(),
          SchemaFragment {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..SchemaFragment::default()
          },
        );
        SchemaFragment::reference(ctx.type_ref(&wrapper_name))
      }
      Family::Api => SchemaFragment::reference(ctx.type_ref(&error.structure_id)),
    };
    responses.insert(
      error_status(&error.structure_id),
      Response::new(ctx.version, error.documentation.clone(), Some(schema)),
    );
  }

  responses
}
