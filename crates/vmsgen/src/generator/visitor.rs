//! Type graph visitor.
//!
//! Turns [`TypeDescriptor`] trees into [`SchemaFragment`]s and registers every
//! reachable user-defined type in the package's [`TypeDictionary`]. A type is
//! claimed as [`Entry::Pending`](super::type_dictionary::Entry) before its
//! fields are visited, so self-referential structures terminate.

use indexmap::IndexMap;
use vmsgen_metamodel::{EnumerationInfo, STRUCTURE_RESOURCE_TYPE, StructureInfo, TypeDescriptor};

use super::{
  config::{Family, FilterPolicy, SpecVersion},
  index::TypeLookup,
  metrics::{GenerationStats, GenerationWarning},
  schema::{Required, SchemaFragment},
  type_dictionary::TypeDictionary,
};

const BUILTIN_TYPE_NAMES: &[&str] = &[
  "binary",
  "boolean",
  "datetime",
  "double",
  "dynamicstructure",
  "exception",
  "id",
  "long",
  "opaque",
  "secret",
  "string",
  "uri",
];

/// Maps a metamodel builtin name to its JSON `(type, format)` pair.
pub fn builtin_schema(name: &str) -> (String, Option<&'static str>) {
  let name = name.to_lowercase();
  let (json_type, format) = match name.as_str() {
    "date_time" => ("string", Some("date-time")),
    "secret" => ("string", Some("password")),
    "any_error" | "id" => ("string", None),
    "dynamic_structure" | "opaque" => ("object", None),
    "uri" => ("string", Some("uri")),
    "long" => ("integer", Some("int64")),
    "double" => ("number", Some("double")),
    "binary" => ("string", Some("binary")),
    _ => return (name, None),
  };
  (json_type.to_string(), format)
}

pub fn is_builtin_type_name(name: &str) -> bool {
  BUILTIN_TYPE_NAMES.contains(&name.to_lowercase().as_str())
}

/// Per-package synthesis state. One context is owned by exactly one task.
pub struct SynthesisContext<'a> {
  lookup: &'a dyn TypeLookup,
  pub family: Family,
  pub version: SpecVersion,
  pub filter: FilterPolicy,
  pub types: TypeDictionary,
  pub stats: GenerationStats,
}

impl<'a> SynthesisContext<'a> {
  pub fn new(lookup: &'a dyn TypeLookup, family: Family, version: SpecVersion, filter: FilterPolicy) -> Self {
    Self {
      lookup,
      family,
      version,
      filter,
      types: TypeDictionary::new(),
      stats: GenerationStats::default(),
    }
  }

  pub fn type_ref(&self, name: &str) -> String {
    format!("{}{name}", self.version.schema_ref_prefix())
  }

  /// Name of the registered type a `$ref` points at.
  pub fn ref_target<'r>(&self, reference: &'r str) -> &'r str {
    reference
      .strip_prefix(self.version.schema_ref_prefix())
      .unwrap_or(reference)
  }

  pub fn visit(&mut self, descriptor: &TypeDescriptor, fragment: &mut SchemaFragment) {
    match descriptor {
      TypeDescriptor::Builtin(name) => Self::visit_builtin(name, fragment),
      TypeDescriptor::Optional(inner) => {
        fragment.required = Some(Required::Flag(false));
        self.visit(inner, fragment);
      }
      TypeDescriptor::List(inner) => {
        fragment.schema_type = Some("array".to_string());
        self.visit(inner, fragment);
      }
      TypeDescriptor::Set(inner) => {
        fragment.schema_type = Some("array".to_string());
        fragment.unique_items = Some(true);
        self.visit(inner, fragment);
      }
      TypeDescriptor::Map { key, value } => self.visit_map(key, value, fragment),
      TypeDescriptor::UserDefined {
        resource_type,
        resource_id,
      } => self.visit_user_defined(resource_type, resource_id, fragment),
    }
  }

  fn visit_builtin(name: &str, fragment: &mut SchemaFragment) {
    let (json_type, format) = builtin_schema(name);
    let target = SchemaFragment {
      schema_type: Some(json_type),
      format: format.map(ToString::to_string),
      ..SchemaFragment::default()
    };
    if fragment.is_array() {
      fragment.items = Some(Box::new(target));
    } else {
      fragment.schema_type = target.schema_type;
      fragment.format = target.format;
    }
  }

  fn visit_user_defined(&mut self, resource_type: &str, resource_id: &str, fragment: &mut SchemaFragment) {
    let reference = self.type_ref(resource_id);
    if fragment.is_array() {
      fragment.items = Some(Box::new(SchemaFragment::reference(reference)));
    } else {
      fragment.set_reference(reference);
    }
    self.register(resource_type, resource_id);
  }

  /// Key or value slot of a map: builtins inline by type only, user-defined
  /// types by `$ref`, nested generics through a fresh fragment.
  fn map_slot(&mut self, descriptor: &TypeDescriptor) -> SchemaFragment {
    let mut slot = match descriptor {
      TypeDescriptor::Builtin(name) => SchemaFragment::of_type(builtin_schema(name).0),
      TypeDescriptor::UserDefined {
        resource_type,
        resource_id,
      } => {
        let slot = SchemaFragment::reference(self.type_ref(resource_id));
        self.register(resource_type, resource_id);
        slot
      }
      generic => {
        let mut slot = SchemaFragment::default();
        self.visit(generic, &mut slot);
        slot
      }
    };
    slot.required = None;
    slot
  }

  fn visit_map(&mut self, key: &TypeDescriptor, value: &TypeDescriptor, fragment: &mut SchemaFragment) {
    let map = match self.family {
      Family::Api => SchemaFragment {
        schema_type: Some("object".to_string()),
        additional_properties: Some(Box::new(self.map_slot(value))),
        ..SchemaFragment::default()
      },
      Family::Rest => {
        let properties = IndexMap::from([
          ("key".to_string(), self.map_slot(key)),
          ("value".to_string(), self.map_slot(value)),
        ]);
        let entry = SchemaFragment {
          schema_type: Some("object".to_string()),
          properties: Some(properties),
          ..SchemaFragment::default()
        };
        SchemaFragment {
          schema_type: Some("array".to_string()),
          items: Some(Box::new(entry)),
          ..SchemaFragment::default()
        }
      }
    };

    if fragment.is_array() {
      fragment.items = Some(Box::new(map));
    } else {
      fragment.schema_type = map.schema_type;
      fragment.items = map.items;
      fragment.additional_properties = map.additional_properties;
    }
    fragment.reference = None;
  }

  /// Registers `resource_id` once. Lookup failures leave the name
  /// unregistered and are recorded as dangling references.
  pub fn register(&mut self, resource_type: &str, resource_id: &str) {
    if self.types.contains(resource_id) || is_builtin_type_name(resource_id) {
      return;
    }

    let lookup = self.lookup;
    let filter = self.filter;
    if resource_type == STRUCTURE_RESOURCE_TYPE {
      let Some(structure) = lookup.structure(resource_id).filter(|s| !filter.is_filtered(&s.metadata)) else {
        self.record_dangling(resource_id);
        return;
      };
      self.types.reserve(resource_id);
      let fragment = self.synthesize_structure(structure);
      self.types.insert(resource_id, fragment);
    } else {
      let Some(enumeration) = lookup.enumeration(resource_id).filter(|e| !filter.is_filtered(&e.metadata)) else {
        self.record_dangling(resource_id);
        return;
      };
      self.types.reserve(resource_id);
      let fragment = self.synthesize_enumeration(enumeration);
      self.types.insert(resource_id, fragment);
    }
    tracing::debug!(type_name = resource_id, family = %self.family, "registered type");
  }

  fn record_dangling(&mut self, type_name: &str) {
    self.stats.record_warning(GenerationWarning::DanglingReference {
      type_name: type_name.to_string(),
    });
  }

  fn synthesize_structure(&mut self, structure: &StructureInfo) -> SchemaFragment {
    let mut properties: IndexMap<String, SchemaFragment> = IndexMap::new();
    for field in &structure.fields {
      if self.filter.is_filtered(&field.metadata) {
        continue;
      }
      let mut property = SchemaFragment::with_description(field.documentation.clone());
      self.visit(&field.field_type, &mut property);
      properties.entry(field.serialized_name().to_string()).or_insert(property);
    }

    let required: Vec<String> = properties
      .iter()
      .filter(|(_, property)| Required::marks_required(property.required.as_ref()))
      .map(|(name, _)| name.clone())
      .collect();

    SchemaFragment {
      schema_type: Some("object".to_string()),
      properties: Some(properties),
      required: (!required.is_empty()).then_some(Required::Names(required)),
      ..SchemaFragment::default()
    }
  }

  fn synthesize_enumeration(&self, enumeration: &EnumerationInfo) -> SchemaFragment {
    let values = enumeration
      .values
      .iter()
      .filter(|value| !self.filter.is_filtered(&value.metadata))
      .map(|value| value.value.clone())
      .collect();
    SchemaFragment {
      schema_type: Some("string".to_string()),
      description: Some(enumeration.documentation.clone()),
      enum_values: Some(values),
      ..SchemaFragment::default()
    }
  }
}
