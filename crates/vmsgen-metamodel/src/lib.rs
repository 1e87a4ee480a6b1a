//! Input model for the vAPI metamodel.
//!
//! A metamodel component document describes packages, and each package carries
//! the structures, enumerations and services that make up an API surface. The
//! types here only deserialize and index that input; schema synthesis lives in
//! the `vmsgen` binary.

mod error;
mod metadata;
mod model;
mod types;

pub use error::MetamodelError;
pub use metadata::{ElementMap, ElementValue, Metadata, ParamAnnotation};
pub use model::{
  ComponentData, ComponentInfo, EnumerationInfo, EnumerationValueInfo, ErrorInfo, FieldInfo, OperationInfo,
  OutputInfo, PackageInfo, ServiceInfo, StructureInfo,
};
pub use types::{STRUCTURE_RESOURCE_TYPE, TypeDescriptor};

/// Decodes one component document, reporting the JSON path of the first failure.
pub fn component_from_slice(bytes: &[u8]) -> Result<ComponentData, MetamodelError> {
  let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
  serde_path_to_error::deserialize(deserializer).map_err(|err| MetamodelError::Decode {
    path: err.path().to_string(),
    source: err.into_inner(),
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_component_from_slice_reports_path() {
    let document = json!({
      "info": {
        "name": "vcenter",
        "packages": {
          "com.vmware.vcenter": {
            "name": "com.vmware.vcenter",
            "structures": {
              "com.vmware.vcenter.VM.info": {
                "name": "com.vmware.vcenter.VM.info",
                "fields": [{ "name": "power", "type": { "category": "SOMETHING" } }]
              }
            }
          }
        }
      }
    });
    let bytes = serde_json::to_vec(&document).unwrap();
    let err = component_from_slice(&bytes).unwrap_err();
    let MetamodelError::Decode { path, .. } = err else {
      panic!("expected decode error");
    };
    assert!(path.contains("fields[0]"), "unexpected path {path}");
  }

  #[test]
  fn test_component_from_slice_minimal() {
    let bytes = br#"{"info": {"name": "cis", "packages": {}}}"#;
    let component = component_from_slice(bytes).unwrap();
    assert_eq!(component.info.name, "cis");
    assert!(component.info.packages.is_empty());
  }
}
