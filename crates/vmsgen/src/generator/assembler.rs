use indexmap::IndexMap;
use itertools::Itertools;

use super::{
  config::SpecVersion,
  path::{HttpMethod, Parameter, ParameterLocation, PathEntry, RequestBodyRef, Response},
  schema::{JSON_MEDIA_TYPE, SchemaFragment},
};

pub const SESSION_PATH_SUFFIX: &str = "/cis/session";
pub const CSRF_HEADER: &str = "vmware-use-header-authn";
pub const TASK_MARKER: &str = "vmw-task=true";

/// Raw pieces of one synthesised operation.
#[derive(Debug, Clone, bon::Builder)]
pub struct OperationParts {
  #[builder(into)]
  pub service_name: String,
  pub method: HttpMethod,
  #[builder(into)]
  pub url: String,
  #[builder(into, default)]
  pub documentation: String,
  #[builder(default)]
  pub parameters: Vec<Parameter>,
  pub request_body: Option<RequestBodyRef>,
  #[builder(default)]
  pub responses: IndexMap<u16, Response>,
  #[builder(into)]
  pub operation_id: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PathAssembler<'a> {
  version: SpecVersion,
  tag_separator: &'a str,
}

impl<'a> PathAssembler<'a> {
  pub const fn new(version: SpecVersion, tag_separator: &'a str) -> Self {
    Self { version, tag_separator }
  }

  /// Tag for a dotted service id, dropping the `com.vmware.<product>` prefix.
  pub fn tag(&self, service_name: &str) -> String {
    service_name.split('.').skip(3).join(self.tag_separator)
  }

  pub fn assemble(&self, parts: OperationParts) -> PathEntry {
    let consumes = (!self.version.is_oas3() && parts.method.carries_body())
      .then(|| vec![JSON_MEDIA_TYPE.to_string()]);
    let mut entry = PathEntry {
      method: parts.method,
      path: parts.url,
      tags: vec![self.tag(&parts.service_name)],
      summary: Some(parts.documentation),
      parameters: parts.parameters,
      request_body: parts.request_body,
      responses: parts.responses,
      consumes,
      operation_id: Some(parts.operation_id),
      ..PathEntry::default()
    };
    self.apply_overrides(&mut entry);
    entry
  }

  fn apply_overrides(&self, entry: &mut PathEntry) {
    if is_session_create(entry) {
      entry.parameters.push(self.csrf_header());
      entry.security = Some(vec![IndexMap::from([("basic_auth".to_string(), Vec::new())])]);
    }
    if entry.operation_id.as_deref().is_some_and(|id| id.ends_with("$task")) {
      entry.path = add_query_param(&entry.path, TASK_MARKER);
    }
  }

  fn csrf_header(&self) -> Parameter {
    let mut header = Parameter::new(CSRF_HEADER, ParameterLocation::Header);
    header.description = Some("Custom header to protect against CSRF attacks in browser based clients".to_string());
    header.required = Some(true);
    header.set_schema(self.version, SchemaFragment::of_type("string"));
    header
  }
}

fn is_session_create(entry: &PathEntry) -> bool {
  entry.method == HttpMethod::Post && entry.path.split('?').next().is_some_and(|base| base.ends_with(SESSION_PATH_SUFFIX))
}

/// Appends `param` to the query string of `url` unless it is already there.
pub fn add_query_param(url: &str, param: &str) -> String {
  match url.split_once('?') {
    Some((_, query)) if query.split('&').any(|token| token == param) => url.to_string(),
    Some(_) => format!("{url}&{param}"),
    None => format!("{url}?{param}"),
  }
}
