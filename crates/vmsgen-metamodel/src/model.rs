use indexmap::IndexMap;
use serde::Deserialize;

use crate::{Metadata, TypeDescriptor};

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentData {
  pub info: ComponentInfo,
  #[serde(default)]
  pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentInfo {
  pub name: String,
  #[serde(default)]
  pub packages: IndexMap<String, PackageInfo>,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageInfo {
  pub name: String,
  #[serde(default)]
  pub structures: IndexMap<String, StructureInfo>,
  #[serde(default)]
  pub enumerations: IndexMap<String, EnumerationInfo>,
  #[serde(default)]
  pub services: IndexMap<String, ServiceInfo>,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInfo {
  pub name: String,
  #[serde(default)]
  pub operations: IndexMap<String, OperationInfo>,
  #[serde(default)]
  pub structures: IndexMap<String, StructureInfo>,
  #[serde(default)]
  pub enumerations: IndexMap<String, EnumerationInfo>,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationInfo {
  pub name: String,
  #[serde(default)]
  pub params: Vec<FieldInfo>,
  pub output: OutputInfo,
  #[serde(default)]
  pub errors: Vec<ErrorInfo>,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputInfo {
  #[serde(rename = "type")]
  pub output_type: TypeDescriptor,
  #[serde(default)]
  pub documentation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
  pub structure_id: String,
  #[serde(default)]
  pub documentation: String,
}

/// A structure field or an operation parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldInfo {
  pub name: String,
  #[serde(rename = "type")]
  pub field_type: TypeDescriptor,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}

impl FieldInfo {
  /// Name the field is serialized under, honouring `SerializationName`.
  pub fn serialized_name(&self) -> &str {
    self.metadata.string("SerializationName", "value").unwrap_or(&self.name)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructureInfo {
  pub name: String,
  #[serde(default)]
  pub fields: Vec<FieldInfo>,
  #[serde(default)]
  pub enumerations: IndexMap<String, EnumerationInfo>,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumerationInfo {
  pub name: String,
  #[serde(default)]
  pub values: Vec<EnumerationValueInfo>,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumerationValueInfo {
  pub value: String,
  #[serde(default)]
  pub metadata: Metadata,
  #[serde(default)]
  pub documentation: String,
}
