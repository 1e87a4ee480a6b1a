use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A JSON-Schema-like fragment as emitted under `definitions` /
/// `components.schemas`, inside properties, items and parameters.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFragment {
  #[serde(rename = "$ref")]
  pub reference: Option<String>,
  #[serde(rename = "type")]
  pub schema_type: Option<String>,
  pub format: Option<String>,
  pub description: Option<String>,
  pub items: Option<Box<SchemaFragment>>,
  #[serde(rename = "uniqueItems")]
  pub unique_items: Option<bool>,
  pub properties: Option<IndexMap<String, SchemaFragment>>,
  #[serde(rename = "additionalProperties")]
  pub additional_properties: Option<Box<SchemaFragment>>,
  pub required: Option<Required>,
  #[serde(rename = "enum")]
  pub enum_values: Option<Vec<String>>,
}

/// `required` is a flag on a property-level fragment and a name list on an
/// object. Some metadata sources also carry it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Required {
  Flag(bool),
  Text(String),
  Names(Vec<String>),
}

impl Required {
  /// A property counts as required when it carries no `required` key or the
  /// literal string `"true"`. A boolean `true` does not count.
  pub fn marks_required(required: Option<&Self>) -> bool {
    match required {
      None => true,
      Some(Self::Text(text)) => text == "true",
      Some(Self::Flag(_) | Self::Names(_)) => false,
    }
  }

  pub fn names(&self) -> &[String] {
    match self {
      Self::Names(names) => names,
      Self::Flag(_) | Self::Text(_) => &[],
    }
  }
}

impl SchemaFragment {
  pub fn of_type(schema_type: impl Into<String>) -> Self {
    Self {
      schema_type: Some(schema_type.into()),
      ..Self::default()
    }
  }

  pub fn reference(target: impl Into<String>) -> Self {
    Self {
      reference: Some(target.into()),
      ..Self::default()
    }
  }

  pub fn with_description(description: impl Into<String>) -> Self {
    Self {
      description: Some(description.into()),
      ..Self::default()
    }
  }

  pub fn is_array(&self) -> bool {
    self.schema_type.as_deref() == Some("array")
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }

  /// Points this fragment at `target`. A `$ref` and a `type` never coexist.
  pub fn set_reference(&mut self, target: String) {
    self.schema_type = None;
    self.reference = Some(target);
  }

  pub fn required_names(&self) -> &[String] {
    self.required.as_ref().map_or(&[], Required::names)
  }

  /// Overlays every key set on `other` onto `self`.
  pub fn union(&mut self, other: Self) {
    macro_rules! overlay {
      ($($field:ident),*) => {
        $(if other.$field.is_some() { self.$field = other.$field; })*
      };
    }
    overlay!(
      reference,
      schema_type,
      format,
      description,
      items,
      unique_items,
      properties,
      additional_properties,
      required,
      enum_values
    );
  }

  /// Strips boolean `required` flags from property fragments, recursively.
  pub fn strip_property_flags(&mut self) {
    if let Some(properties) = self.properties.as_mut() {
      for property in properties.values_mut() {
        if matches!(property.required, Some(Required::Flag(_))) {
          property.required = None;
        }
        property.strip_property_flags();
      }
    }
    if let Some(items) = self.items.as_mut() {
      items.strip_property_flags();
    }
    if let Some(additional) = self.additional_properties.as_mut() {
      additional.strip_property_flags();
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
  pub schema: SchemaFragment,
}

pub type Content = IndexMap<String, MediaType>;

pub fn json_content(schema: SchemaFragment) -> Content {
  IndexMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

/// OpenAPI 3 entry under `components.requestBodies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
  pub content: Content,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_marks_required() {
    assert!(Required::marks_required(None));
    assert!(Required::marks_required(Some(&Required::Text("true".to_string()))));
    assert!(!Required::marks_required(Some(&Required::Text("false".to_string()))));
    assert!(!Required::marks_required(Some(&Required::Flag(true))));
    assert!(!Required::marks_required(Some(&Required::Flag(false))));
  }

  #[test]
  fn test_serialize_skips_unset_keys() {
    let mut fragment = SchemaFragment::of_type("array");
    fragment.items = Some(Box::new(SchemaFragment::reference("#/definitions/vcenter.VM.info")));
    fragment.unique_items = Some(true);
    assert_eq!(
      serde_json::to_value(&fragment).unwrap(),
      json!({"type": "array", "items": {"$ref": "#/definitions/vcenter.VM.info"}, "uniqueItems": true})
    );
  }

  #[test]
  fn test_required_untagged_roundtrip() {
    let fragment: SchemaFragment =
      serde_json::from_value(json!({"type": "object", "required": ["name"], "properties": {"name": {"required": false}}}))
        .unwrap();
    assert_eq!(fragment.required_names(), ["name".to_string()]);
    let name = &fragment.properties.as_ref().unwrap()["name"];
    assert_eq!(name.required, Some(Required::Flag(false)));
  }

  #[test]
  fn test_strip_property_flags() {
    let mut fragment: SchemaFragment = serde_json::from_value(json!({
      "type": "object",
      "required": ["a"],
      "properties": {
        "a": {"type": "string", "required": false},
        "b": {"type": "object", "properties": {"c": {"type": "string", "required": true}}}
      }
    }))
    .unwrap();
    fragment.strip_property_flags();
    assert_eq!(
      serde_json::to_value(&fragment).unwrap(),
      json!({
        "type": "object",
        "required": ["a"],
        "properties": {
          "a": {"type": "string"},
          "b": {"type": "object", "properties": {"c": {"type": "string"}}}
        }
      })
    );
  }

  #[test]
  fn test_set_reference_clears_type() {
    let mut fragment = SchemaFragment::of_type("object");
    fragment.set_reference("#/definitions/a".to_string());
    assert_eq!(serde_json::to_value(&fragment).unwrap(), json!({"$ref": "#/definitions/a"}));
  }
}
