//! Parameter classification, flattening and request-body wrapping.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use vmsgen_metamodel::{FieldInfo, ParamAnnotation};

use super::{
  config::{Family, SpecVersion},
  metrics::{GenerationStats, GenerationWarning},
  path::{HttpMethod, Parameter, ParameterLocation, RequestBodyRef},
  schema::{RequestBody, Required, SchemaFragment, json_content},
  visitor::SynthesisContext,
};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(.+?)\}").expect("bad regex"));

pub const REQUEST_BODY_PARAM: &str = "request_body";

/// Path parameters matched against a url template, plus whatever is left.
#[derive(Debug)]
pub struct PathExtraction<'p> {
  pub path_params: Vec<&'p FieldInfo>,
  pub remaining: Vec<&'p FieldInfo>,
  pub url: String,
}

/// Matches every `{placeholder}` in `url` against the parameter pool.
///
/// A parameter matches by name or by its `PathVariable` value and is consumed
/// once. When the match is through `PathVariable`, that occurrence is
/// rewritten to the declared name.
pub fn extract_path_parameters<'p>(
  params: &'p [FieldInfo],
  url: &str,
  stats: &mut GenerationStats,
) -> PathExtraction<'p> {
  let mut remaining: Vec<&FieldInfo> = params.iter().collect();
  let mut path_params = Vec::new();
  let mut rewritten = String::with_capacity(url.len());
  let mut cursor = 0;

  for capture in PLACEHOLDER_RE.captures_iter(url) {
    let (Some(whole), Some(placeholder)) = (capture.get(0), capture.get(1)) else {
      continue;
    };
    let placeholder = placeholder.as_str();
    let position = remaining.iter().position(|param| {
      param.name == placeholder
        || matches!(param.metadata.param_annotation(), ParamAnnotation::PathVariable(Some(value)) if value == placeholder)
    });

    let Some(position) = position else {
      stats.record_warning(GenerationWarning::PathParameterMismatch {
        placeholder: placeholder.to_string(),
        url: url.to_string(),
      });
      continue;
    };

    let param = remaining.remove(position);
    if param.name != placeholder {
      rewritten.push_str(&url[cursor..whole.start()]);
      rewritten.push('{');
      rewritten.push_str(&param.name);
      rewritten.push('}');
      cursor = whole.end();
    }
    path_params.push(param);
  }
  rewritten.push_str(&url[cursor..]);

  PathExtraction {
    path_params,
    remaining,
    url: rewritten,
  }
}

pub fn extract_body_parameters<'p>(params: &[&'p FieldInfo]) -> Vec<&'p FieldInfo> {
  params
    .iter()
    .copied()
    .filter(|param| param.metadata.param_annotation() == ParamAnnotation::Body)
    .collect()
}

pub fn extract_query_parameters<'p>(params: &[&'p FieldInfo]) -> Vec<&'p FieldInfo> {
  params
    .iter()
    .copied()
    .filter(|param| param.metadata.param_annotation() == ParamAnnotation::Query)
    .collect()
}

fn untagged_parameters<'p>(params: &[&'p FieldInfo]) -> Vec<&'p FieldInfo> {
  params
    .iter()
    .copied()
    .filter(|param| param.metadata.param_annotation() == ParamAnnotation::None)
    .collect()
}

fn required_flag(fragment: &SchemaFragment) -> bool {
  match fragment.required.as_ref() {
    Some(Required::Flag(flag)) => *flag,
    Some(Required::Text(text)) => text == "true",
    Some(Required::Names(_)) | None => true,
  }
}

/// Converts one metamodel parameter into a path/query/header parameter.
///
/// A `$ref` result is inlined from the dictionary with a combined description.
/// An unresolvable target keeps the `$ref` under `schema`.
pub fn convert_parameter(ctx: &mut SynthesisContext<'_>, location: ParameterLocation, field: &FieldInfo) -> Parameter {
  let mut fragment = SchemaFragment::default();
  ctx.visit(&field.field_type, &mut fragment);

  let mut param = Parameter::new(&field.name, location);
  param.required = Some(required_flag(&fragment));
  param.description = Some(field.documentation.clone());

  let Some(reference) = fragment.reference.take() else {
    param.set_schema(ctx.version, fragment);
    return param;
  };

  match ctx.types.get(ctx.ref_target(&reference)).cloned() {
    Some(target) => {
      if let Some(type_description) = target.description.as_deref().filter(|text| !text.is_empty()) {
        param.description = Some(format!("{{ 1. {type_description} }}, {{ 2. {} }}", field.documentation));
      }
      param.set_schema(ctx.version, target);
    }
    None => param.schema = Some(SchemaFragment::reference(reference)),
  }
  param
}

/// Flattens an untagged parameter into query parameters.
///
/// A reference to an object yields one parameter per property; a reference to
/// a scalar typedef yields one parameter named after `field`; a plain type
/// yields a single scalar parameter.
pub fn flatten_query_parameter(ctx: &mut SynthesisContext<'_>, field: &FieldInfo) -> Vec<Parameter> {
  let mut fragment = SchemaFragment::default();
  ctx.visit(&field.field_type, &mut fragment);
  let required = required_flag(&fragment);

  let Some(reference) = fragment.reference.take() else {
    let mut param = Parameter::new(&field.name, ParameterLocation::Query);
    param.required = Some(required);
    param.description = Some(field.documentation.clone());
    param.set_schema(ctx.version, fragment);
    return vec![param];
  };

  let Some(target) = ctx.types.get(ctx.ref_target(&reference)).cloned() else {
    return Vec::new();
  };

  match target.properties.as_ref() {
    Some(properties) => properties
      .iter()
      .map(|(name, property)| {
        let mut param = property_parameter(ctx, name, property);
        param.required = Some(target.required_names().contains(name));
        param
      })
      .collect(),
    None => {
      let mut param = Parameter::new(&field.name, ParameterLocation::Query);
      param.required = Some(required);
      param.description.clone_from(&target.description);
      param.set_schema(ctx.version, target);
      vec![param]
    }
  }
}

fn property_parameter(ctx: &SynthesisContext<'_>, name: &str, property: &SchemaFragment) -> Parameter {
  let mut param = Parameter::new(name, ParameterLocation::Query);
  param.description.clone_from(&property.description);

  if property.schema_type.is_none()
    && let Some(reference) = property.reference.as_deref()
  {
    let Some(target) = ctx.types.get(ctx.ref_target(reference)) else {
      if ctx.version.is_oas3() {
        param.schema = Some(SchemaFragment::reference(reference));
      }
      return param;
    };
    if target.description.is_some() {
      param.description.clone_from(&target.description);
    }
    match ctx.version {
      SpecVersion::Swagger2 => {
        param.param_type = target
          .schema_type
          .as_deref()
          .map(|json_type| if json_type == "object" { "string" } else { json_type }.to_string());
        param.enum_values.clone_from(&target.enum_values);
      }
      SpecVersion::OpenApi3 => {
        param.schema = Some(SchemaFragment {
          description: None,
          required: None,
          ..target.clone()
        });
      }
    }
    return param;
  }

  let mut schema = SchemaFragment {
    description: None,
    required: None,
    ..property.clone()
  };
  if !ctx.version.is_oas3() {
    if schema.is_array() {
      param.collection_format = Some("multi".to_string());
    }
    if let Some(items) = schema.items.as_mut()
      && let Some(reference) = items.reference.as_deref()
      && let Some(target) = ctx.types.get(ctx.ref_target(reference))
    {
      **items = SchemaFragment {
        description: None,
        ..target.clone()
      };
    }
  }
  param.set_schema(ctx.version, schema);
  param
}

/// The request-body half of an operation.
#[derive(Debug, Default)]
pub struct RequestPayload {
  pub parameters: Vec<Parameter>,
  pub request_body: Option<RequestBodyRef>,
}

/// Wraps body parameters into a synthetic `<service>_<operation>` type and
/// returns the parameter or request-body reference pointing at it.
pub fn wrap_body_parameters(
  ctx: &mut SynthesisContext<'_>,
  service_name: &str,
  operation_name: &str,
  params: &[&FieldInfo],
  form_encoded: bool,
) -> RequestPayload {
  let wrapper_name = format!("{service_name}_{operation_name}");
  let mut body = match ctx.family {
    Family::Rest => SchemaFragment {
      schema_type: Some("object".to_string()),
      properties: Some(IndexMap::new()),
      ..SchemaFragment::default()
    },
    Family::Api => SchemaFragment::default(),
  };
  let mut required = Vec::new();

  for param in params {
    let mut fragment = SchemaFragment::default();
    ctx.visit(&param.field_type, &mut fragment);
    fragment.description = Some(param.documentation.clone());

    let key = match ctx.family {
      Family::Rest => Some(param.name.clone()),
      Family::Api => param.metadata.string("BodyField", "name").map(ToString::to_string),
    };
    match key {
      Some(key) => {
        if Required::marks_required(fragment.required.as_ref()) {
          required.push(key.clone());
        }
        body.schema_type = Some("object".to_string());
        body.properties.get_or_insert_with(IndexMap::new).insert(key, fragment);
      }
      None => body.union(fragment),
    }
  }

  let any_required = !required.is_empty();
  body.required = any_required.then_some(Required::Names(required));
  ctx.types.insert(wrapper_name.clone(), body);

  match ctx.version {
    SpecVersion::OpenApi3 => {
      let schema = SchemaFragment::reference(ctx.type_ref(&wrapper_name));
      ctx.types.insert_request_body(
        wrapper_name.clone(),
        RequestBody {
          content: json_content(schema),
        },
      );
      RequestPayload {
        parameters: Vec::new(),
        request_body: Some(RequestBodyRef {
          reference: format!("#/components/requestBodies/{wrapper_name}"),
        }),
      }
    }
    SpecVersion::Swagger2 if form_encoded => RequestPayload {
      parameters: form_data_parameters(ctx, &wrapper_name),
      request_body: None,
    },
    SpecVersion::Swagger2 => {
      let mut param = Parameter::new(REQUEST_BODY_PARAM, ParameterLocation::Body);
      param.required = any_required.then_some(true);
      param.schema = Some(SchemaFragment::reference(ctx.type_ref(&wrapper_name)));
      RequestPayload {
        parameters: vec![param],
        request_body: None,
      }
    }
  }
}

fn form_data_parameters(ctx: &SynthesisContext<'_>, type_name: &str) -> Vec<Parameter> {
  let mut visited = Vec::new();
  let mut current = type_name;
  loop {
    let Some(definition) = ctx.types.get(current) else {
      return Vec::new();
    };
    if let Some(properties) = definition.properties.as_ref() {
      let required = definition.required_names();
      return properties
        .iter()
        .map(|(name, property)| {
          let mut param = Parameter::new(name, ParameterLocation::FormData);
          param.param_type.clone_from(&property.schema_type);
          param.description.clone_from(&property.description);
          param.required = required.contains(name).then_some(true);
          param
        })
        .collect();
    }
    match definition.reference.as_deref() {
      Some(reference) if !visited.contains(&current) => {
        visited.push(current);
        current = ctx.ref_target(reference);
      }
      _ => return Vec::new(),
    }
  }
}

/// Fully classified request side of an operation.
#[derive(Debug, Default)]
pub struct RequestParts {
  pub url: String,
  pub parameters: Vec<Parameter>,
  pub request_body: Option<RequestBodyRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct OperationTarget<'a> {
  pub service_name: &'a str,
  pub operation_name: &'a str,
  pub method: HttpMethod,
  pub url: &'a str,
  pub form_encoded: bool,
}

/// Splits `params` into path, body, query and flattened parameters following
/// the routing rules of the context's family.
pub fn classify_request(ctx: &mut SynthesisContext<'_>, target: OperationTarget<'_>, params: &[FieldInfo]) -> RequestParts {
  let extraction = extract_path_parameters(params, target.url, &mut ctx.stats);
  let mut parts = RequestParts {
    url: extraction.url,
    ..RequestParts::default()
  };
  for field in &extraction.path_params {
    parts.parameters.push(convert_parameter(ctx, ParameterLocation::Path, field));
  }
  let remaining = extraction.remaining;

  match (ctx.family, target.method) {
    (_, HttpMethod::Delete) => {
      for field in &remaining {
        parts.parameters.push(convert_parameter(ctx, ParameterLocation::Query, field));
      }
    }
    (Family::Rest, method) if method.carries_body() => {
      if !remaining.is_empty() {
        parts.push_payload(wrap_body_parameters(
          ctx,
          target.service_name,
          target.operation_name,
          &remaining,
          target.form_encoded,
        ));
      }
    }
    (Family::Rest, _) => {
      for field in &remaining {
        parts.parameters.extend(flatten_query_parameter(ctx, field));
      }
    }
    (Family::Api, method) => {
      if method.carries_body() {
        let body = extract_body_parameters(&remaining);
        if !body.is_empty() {
          parts.push_payload(wrap_body_parameters(
            ctx,
            target.service_name,
            target.operation_name,
            &body,
            target.form_encoded,
          ));
        }
      }
      for field in extract_query_parameters(&remaining) {
        parts.parameters.push(convert_parameter(ctx, ParameterLocation::Query, field));
      }
      for field in untagged_parameters(&remaining) {
        parts.parameters.extend(flatten_query_parameter(ctx, field));
      }
    }
  }
  parts
}

impl RequestParts {
  fn push_payload(&mut self, payload: RequestPayload) {
    self.parameters.extend(payload.parameters);
    self.request_body = payload.request_body;
  }
}
