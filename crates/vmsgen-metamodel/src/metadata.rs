use indexmap::IndexMap;
use serde::Deserialize;

/// Annotation name -> element map, as attached to services, operations,
/// fields and enumeration values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Metadata(IndexMap<String, ElementMap>);

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ElementMap {
  #[serde(default)]
  pub elements: IndexMap<String, ElementValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ElementValue {
  #[serde(rename = "type", default)]
  pub value_type: Option<String>,
  #[serde(default)]
  pub string_value: Option<String>,
  #[serde(default)]
  pub list_value: Vec<String>,
  #[serde(default)]
  pub long_value: Option<i64>,
}

/// Routing role of an operation parameter, derived from its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamAnnotation {
  PathVariable(Option<String>),
  Body,
  Query,
  None,
}

impl Metadata {
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with(mut self, annotation: impl Into<String>, elements: ElementMap) -> Self {
    self.0.insert(annotation.into(), elements);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn contains(&self, annotation: &str) -> bool {
    self.0.contains_key(annotation)
  }

  pub fn get(&self, annotation: &str) -> Option<&ElementMap> {
    self.0.get(annotation)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &ElementMap)> {
    self.0.iter()
  }

  /// String value of `element` inside `annotation`.
  pub fn string(&self, annotation: &str, element: &str) -> Option<&str> {
    self.get(annotation).and_then(|map| map.string(element))
  }

  pub fn param_annotation(&self) -> ParamAnnotation {
    if let Some(map) = self.get("PathVariable") {
      return ParamAnnotation::PathVariable(map.string("value").map(ToString::to_string));
    }
    if self.contains("Body") || self.contains("BodyField") {
      return ParamAnnotation::Body;
    }
    if self.contains("Query") {
      return ParamAnnotation::Query;
    }
    ParamAnnotation::None
  }
}

impl ElementMap {
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with_string(mut self, element: impl Into<String>, value: impl Into<String>) -> Self {
    self.elements.insert(
      element.into(),
      ElementValue {
        value_type: Some("STRING".to_string()),
        string_value: Some(value.into()),
        ..ElementValue::default()
      },
    );
    self
  }

  #[must_use]
  pub fn with_list(mut self, element: impl Into<String>, values: Vec<String>) -> Self {
    self.elements.insert(
      element.into(),
      ElementValue {
        value_type: Some("STRING_LIST".to_string()),
        list_value: values,
        ..ElementValue::default()
      },
    );
    self
  }

  pub fn string(&self, element: &str) -> Option<&str> {
    self.elements.get(element).and_then(|value| value.string_value.as_deref())
  }

  pub fn list(&self, element: &str) -> &[String] {
    self
      .elements
      .get(element)
      .map_or(&[], |value| value.list_value.as_slice())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_annotation_precedence() {
    let path = Metadata::new()
      .with("PathVariable", ElementMap::new().with_string("value", "vm"))
      .with("Query", ElementMap::new());
    assert_eq!(path.param_annotation(), ParamAnnotation::PathVariable(Some("vm".to_string())));

    let body_field = Metadata::new().with("BodyField", ElementMap::new().with_string("name", "spec"));
    assert_eq!(body_field.param_annotation(), ParamAnnotation::Body);

    let query = Metadata::new().with("Query", ElementMap::new());
    assert_eq!(query.param_annotation(), ParamAnnotation::Query);

    assert_eq!(Metadata::new().param_annotation(), ParamAnnotation::None);
  }

  #[test]
  fn test_element_lookup() {
    let metadata: Metadata = serde_json::from_str(
      r#"{"GET": {"elements": {"path": {"type": "STRING", "string_value": "/vcenter/vm"},
                               "params": {"type": "STRING_LIST", "list_value": ["action=clone"]}}}}"#,
    )
    .unwrap();
    assert_eq!(metadata.string("GET", "path"), Some("/vcenter/vm"));
    assert_eq!(metadata.get("GET").unwrap().list("params"), ["action=clone".to_string()]);
    assert!(metadata.get("GET").unwrap().list("missing").is_empty());
  }
}
