use serde::Deserialize;

use crate::MetamodelError;

/// Resource type that marks a user-defined type as a structure. Every other
/// resource type resolves to an enumeration.
pub const STRUCTURE_RESOURCE_TYPE: &str = "com.vmware.vapi.structure";

/// A metamodel type reference.
///
/// Deserializes from the category-tagged wire form
/// (`{"category": "GENERIC", "generic_instantiation": {...}}`). An unknown
/// category or generic kind is a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawType")]
pub enum TypeDescriptor {
  Builtin(String),
  Optional(Box<TypeDescriptor>),
  List(Box<TypeDescriptor>),
  Set(Box<TypeDescriptor>),
  Map {
    key: Box<TypeDescriptor>,
    value: Box<TypeDescriptor>,
  },
  UserDefined {
    resource_type: String,
    resource_id: String,
  },
}

impl TypeDescriptor {
  pub fn builtin(name: impl Into<String>) -> Self {
    Self::Builtin(name.into())
  }

  pub fn optional(inner: Self) -> Self {
    Self::Optional(Box::new(inner))
  }

  pub fn list(inner: Self) -> Self {
    Self::List(Box::new(inner))
  }

  pub fn set(inner: Self) -> Self {
    Self::Set(Box::new(inner))
  }

  pub fn map(key: Self, value: Self) -> Self {
    Self::Map {
      key: Box::new(key),
      value: Box::new(value),
    }
  }

  pub fn structure(resource_id: impl Into<String>) -> Self {
    Self::UserDefined {
      resource_type: STRUCTURE_RESOURCE_TYPE.to_string(),
      resource_id: resource_id.into(),
    }
  }

  pub fn enumeration(resource_id: impl Into<String>) -> Self {
    Self::UserDefined {
      resource_type: "com.vmware.vapi.enumeration".to_string(),
      resource_id: resource_id.into(),
    }
  }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TypeCategory {
  Builtin,
  Generic,
  UserDefined,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum GenericKind {
  Optional,
  List,
  Set,
  Map,
}

#[derive(Debug, Deserialize)]
struct RawType {
  category: TypeCategory,
  builtin_type: Option<String>,
  generic_instantiation: Option<Box<RawGeneric>>,
  user_defined_type: Option<RawUserDefined>,
}

#[derive(Debug, Deserialize)]
struct RawGeneric {
  generic_type: GenericKind,
  element_type: Option<RawType>,
  map_key_type: Option<RawType>,
  map_value_type: Option<RawType>,
}

#[derive(Debug, Deserialize)]
struct RawUserDefined {
  resource_type: String,
  resource_id: String,
}

impl TryFrom<RawType> for TypeDescriptor {
  type Error = MetamodelError;

  fn try_from(raw: RawType) -> Result<Self, Self::Error> {
    match raw.category {
      TypeCategory::Builtin => raw.builtin_type.map(Self::Builtin).ok_or(MetamodelError::MissingTypeField {
        category: "BUILTIN",
        field: "builtin_type",
      }),
      TypeCategory::UserDefined => {
        let user_defined = raw.user_defined_type.ok_or(MetamodelError::MissingTypeField {
          category: "USER_DEFINED",
          field: "user_defined_type",
        })?;
        Ok(Self::UserDefined {
          resource_type: user_defined.resource_type,
          resource_id: user_defined.resource_id,
        })
      }
      TypeCategory::Generic => {
        let generic = raw.generic_instantiation.ok_or(MetamodelError::MissingTypeField {
          category: "GENERIC",
          field: "generic_instantiation",
        })?;
        generic.into_descriptor()
      }
    }
  }
}

impl RawGeneric {
  fn into_descriptor(self) -> Result<TypeDescriptor, MetamodelError> {
    let element = |slot: Option<RawType>, field: &'static str| {
      slot
        .ok_or(MetamodelError::MissingTypeField {
          category: "GENERIC",
          field,
        })
        .and_then(TypeDescriptor::try_from)
        .map(Box::new)
    };

    Ok(match self.generic_type {
      GenericKind::Optional => TypeDescriptor::Optional(element(self.element_type, "element_type")?),
      GenericKind::List => TypeDescriptor::List(element(self.element_type, "element_type")?),
      GenericKind::Set => TypeDescriptor::Set(element(self.element_type, "element_type")?),
      GenericKind::Map => TypeDescriptor::Map {
        key: element(self.map_key_type, "map_key_type")?,
        value: element(self.map_value_type, "map_value_type")?,
      },
    })
  }
}
