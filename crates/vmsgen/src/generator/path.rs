use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use strum::{Display, EnumString};

use super::{
  config::SpecVersion,
  schema::{Content, SchemaFragment, json_content},
};

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HttpMethod {
  #[default]
  Get,
  Post,
  Put,
  Patch,
  Delete,
}

impl HttpMethod {
  pub const fn carries_body(self) -> bool {
    matches!(self, Self::Post | Self::Put | Self::Patch)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
  Path,
  #[default]
  Query,
  Header,
  Body,
  FormData,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
  pub name: String,
  #[serde(rename = "in")]
  pub location: ParameterLocation,
  pub description: Option<String>,
  pub required: Option<bool>,
  #[serde(rename = "type")]
  pub param_type: Option<String>,
  pub format: Option<String>,
  pub items: Option<Box<SchemaFragment>>,
  #[serde(rename = "uniqueItems")]
  pub unique_items: Option<bool>,
  #[serde(rename = "enum")]
  pub enum_values: Option<Vec<String>>,
  #[serde(rename = "collectionFormat")]
  pub collection_format: Option<String>,
  pub schema: Option<SchemaFragment>,
}

impl Parameter {
  pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
    Self {
      name: name.into(),
      location,
      ..Self::default()
    }
  }

  /// Places the scalar schema keys of `fragment` where `version` expects
  /// them: inline for Swagger 2, under `schema` for OpenAPI 3.
  pub fn set_schema(&mut self, version: SpecVersion, fragment: SchemaFragment) {
    if version.is_oas3() {
      let schema = SchemaFragment {
        reference: None,
        description: None,
        properties: None,
        additional_properties: None,
        required: None,
        ..fragment
      };
      if !schema.is_empty() {
        self.schema = Some(schema);
      }
    } else {
      self.param_type = fragment.schema_type;
      self.format = fragment.format;
      self.items = fragment.items;
      self.unique_items = fragment.unique_items;
      self.enum_values = fragment.enum_values;
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBodyRef {
  #[serde(rename = "$ref")]
  pub reference: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
  pub description: String,
  pub schema: Option<SchemaFragment>,
  pub content: Option<Content>,
}

impl Response {
  pub fn new(version: SpecVersion, description: impl Into<String>, schema: Option<SchemaFragment>) -> Self {
    let description = description.into();
    match (version, schema) {
      (SpecVersion::OpenApi3, Some(schema)) => Self {
        description,
        schema: None,
        content: Some(json_content(schema)),
      },
      (_, schema) => Self {
        description,
        schema,
        content: None,
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeprecationNotice {
  pub replacement: String,
}

pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// One operation under a path key. `method` and `path` route the entry into a
/// [`PathDictionary`] and are never serialised.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
  #[serde(skip)]
  pub method: HttpMethod,
  #[serde(skip)]
  pub path: String,
  #[serde(default)]
  pub tags: Vec<String>,
  pub summary: Option<String>,
  #[serde(default)]
  pub parameters: Vec<Parameter>,
  #[serde(rename = "requestBody")]
  pub request_body: Option<RequestBodyRef>,
  #[serde(default)]
  pub responses: IndexMap<u16, Response>,
  pub consumes: Option<Vec<String>>,
  pub produces: Option<Vec<String>>,
  #[serde(rename = "operationId")]
  pub operation_id: Option<String>,
  pub security: Option<Vec<SecurityRequirement>>,
  pub deprecated: Option<bool>,
  #[serde(rename = "x-vmw-deprecated")]
  pub deprecation: Option<DeprecationNotice>,
}

pub type VerbMap = IndexMap<HttpMethod, PathEntry>;

/// url -> method -> entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathDictionary(IndexMap<String, VerbMap>);

impl PathDictionary {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_entries(entries: impl IntoIterator<Item = PathEntry>) -> Self {
    let mut paths = Self::new();
    for entry in entries {
      paths.insert(entry);
    }
    paths
  }

  /// Routes `entry` by its transient path and method. A later entry for the
  /// same pair replaces the earlier one.
  pub fn insert(&mut self, entry: PathEntry) {
    self.0.entry(entry.path.clone()).or_default().insert(entry.method, entry);
  }

  pub fn insert_verbs(&mut self, path: impl Into<String>, verbs: VerbMap) {
    self.0.insert(path.into(), verbs);
  }

  pub fn get(&self, path: &str) -> Option<&VerbMap> {
    self.0.get(path)
  }

  pub fn contains(&self, path: &str) -> bool {
    self.0.contains_key(path)
  }

  pub fn remove(&mut self, path: &str) -> Option<VerbMap> {
    self.0.shift_remove(path)
  }

  pub fn keys(&self) -> impl Iterator<Item = &String> {
    self.0.keys()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut VerbMap)> {
    self.0.iter_mut()
  }

  pub fn entries(&self) -> impl Iterator<Item = &PathEntry> {
    self.0.values().flat_map(IndexMap::values)
  }

  pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut PathEntry> {
    self.0.values_mut().flat_map(IndexMap::values_mut)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn operation_count(&self) -> usize {
    self.0.values().map(IndexMap::len).sum()
  }

  /// Unions `other` into `self`; `other` wins on identical path keys.
  pub fn extend(&mut self, other: Self) {
    self.0.extend(other.0);
  }

  pub fn sort_keys(&mut self) {
    self.0.sort_keys();
  }
}
