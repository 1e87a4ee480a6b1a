use vmsgen_metamodel::{
  ComponentData, ComponentInfo, ElementMap, EnumerationInfo, EnumerationValueInfo, ErrorInfo, FieldInfo, Metadata,
  OperationInfo, OutputInfo, PackageInfo, ServiceInfo, StructureInfo, TypeDescriptor,
};

use crate::generator::{
  config::{Family, FilterPolicy, SpecVersion},
  index::MetamodelIndex,
  visitor::SynthesisContext,
};

pub(super) fn string() -> TypeDescriptor {
  TypeDescriptor::builtin("STRING")
}

pub(super) fn long() -> TypeDescriptor {
  TypeDescriptor::builtin("LONG")
}

pub(super) fn void() -> TypeDescriptor {
  TypeDescriptor::builtin("VOID")
}

pub(super) fn field(name: &str, field_type: TypeDescriptor) -> FieldInfo {
  FieldInfo {
    name: name.to_string(),
    field_type,
    metadata: Metadata::new(),
    documentation: format!("The {name}."),
  }
}

pub(super) fn annotated(mut field: FieldInfo, annotation: &str, elements: ElementMap) -> FieldInfo {
  field.metadata = field.metadata.with(annotation, elements);
  field
}

pub(super) fn unreleased() -> Metadata {
  Metadata::new().with("Changing", ElementMap::new())
}

pub(super) fn tech_preview() -> Metadata {
  Metadata::new()
    .with("Proposed", ElementMap::new())
    .with("TechPreview", ElementMap::new())
}

pub(super) fn structure(id: &str, fields: Vec<FieldInfo>) -> StructureInfo {
  StructureInfo {
    name: id.to_string(),
    fields,
    ..StructureInfo::default()
  }
}

pub(super) fn enumeration(id: &str, values: &[&str]) -> EnumerationInfo {
  EnumerationInfo {
    name: id.to_string(),
    values: values
      .iter()
      .map(|value| EnumerationValueInfo {
        value: (*value).to_string(),
        ..EnumerationValueInfo::default()
      })
      .collect(),
    documentation: format!("Values of {id}."),
    ..EnumerationInfo::default()
  }
}

pub(super) fn operation(name: &str, params: Vec<FieldInfo>, output: TypeDescriptor) -> OperationInfo {
  OperationInfo {
    name: name.to_string(),
    params,
    output: OutputInfo {
      output_type: output,
      documentation: format!("Result of {name}."),
    },
    errors: Vec::new(),
    metadata: Metadata::new(),
    documentation: format!("Runs {name}."),
  }
}

pub(super) fn with_error(mut operation: OperationInfo, structure_id: &str) -> OperationInfo {
  operation.errors.push(ErrorInfo {
    structure_id: structure_id.to_string(),
    documentation: format!("Raised as {structure_id}."),
  });
  operation
}

/// Verb metadata of an `/api` operation.
pub(super) fn api_mapping(mut operation: OperationInfo, method: &str, path: &str) -> OperationInfo {
  operation.metadata = operation
    .metadata
    .with(method, ElementMap::new().with_string("path", path));
  operation
}

/// `RequestMapping` metadata of a `/rest` operation.
pub(super) fn rest_mapping(mut operation: OperationInfo, method: &str, value: &str) -> OperationInfo {
  operation.metadata = operation.metadata.with(
    "RequestMapping",
    ElementMap::new().with_string("value", value).with_string("method", method),
  );
  operation
}

pub(super) fn service(id: &str, operations: Vec<OperationInfo>) -> ServiceInfo {
  ServiceInfo {
    name: id.to_string(),
    operations: operations.into_iter().map(|op| (op.name.clone(), op)).collect(),
    ..ServiceInfo::default()
  }
}

/// Collects metamodel elements into a single-package component.
#[derive(Debug, Default)]
pub(super) struct MetamodelBuilder {
  package: PackageInfo,
}

impl MetamodelBuilder {
  pub(super) fn new() -> Self {
    Self {
      package: PackageInfo {
        name: "com.vmware.test".to_string(),
        ..PackageInfo::default()
      },
    }
  }

  pub(super) fn structure(mut self, structure: StructureInfo) -> Self {
    self.package.structures.insert(structure.name.clone(), structure);
    self
  }

  pub(super) fn enumeration(mut self, enumeration: EnumerationInfo) -> Self {
    self.package.enumerations.insert(enumeration.name.clone(), enumeration);
    self
  }

  pub(super) fn service(mut self, service: ServiceInfo) -> Self {
    self.package.services.insert(service.name.clone(), service);
    self
  }

  pub(super) fn build(self) -> MetamodelIndex {
    let component = ComponentData {
      info: ComponentInfo {
        name: "test".to_string(),
        packages: [(self.package.name.clone(), self.package)].into_iter().collect(),
        ..ComponentInfo::default()
      },
      fingerprint: None,
    };
    MetamodelIndex::from_components([component])
  }
}

pub(super) fn context(index: &MetamodelIndex, family: Family, version: SpecVersion) -> SynthesisContext<'_> {
  SynthesisContext::new(index, family, version, FilterPolicy::ReleasedOnly)
}

/// A VM summary with a power state enumeration, shared by several tests.
pub(super) fn vm_metamodel() -> MetamodelBuilder {
  MetamodelBuilder::new()
    .enumeration(enumeration("com.vmware.vcenter.VM.power_state", &["POWERED_ON", "POWERED_OFF"]))
    .structure(structure(
      "com.vmware.vcenter.VM.summary",
      vec![
        field("vm", TypeDescriptor::builtin("ID")),
        field("name", string()),
        field("power_state", TypeDescriptor::enumeration("com.vmware.vcenter.VM.power_state")),
      ],
    ))
    .structure(structure(
      "com.vmware.vcenter.VM.filter_spec",
      vec![
        field("names", TypeDescriptor::optional(TypeDescriptor::set(string()))),
        field(
          "power_states",
          TypeDescriptor::optional(TypeDescriptor::set(TypeDescriptor::enumeration(
            "com.vmware.vcenter.VM.power_state",
          ))),
        ),
        field("limit", long()),
      ],
    ))
    .structure(structure(
      "com.vmware.vcenter.VM.create_spec",
      vec![
        field("name", string()),
        field("notes", TypeDescriptor::optional(string())),
      ],
    ))
    .structure(structure(
      "com.vmware.vapi.std.errors.not_found",
      vec![field("messages", TypeDescriptor::list(string()))],
    ))
}
