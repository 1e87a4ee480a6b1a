use indexmap::IndexMap;
use vmsgen_metamodel::{ComponentData, EnumerationInfo, ServiceInfo, StructureInfo};

/// Read-only type resolution used by the visitor.
pub trait TypeLookup: Send + Sync {
  fn structure(&self, id: &str) -> Option<&StructureInfo>;
  fn enumeration(&self, id: &str) -> Option<&EnumerationInfo>;
}

/// Flattened registries over every loaded component, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MetamodelIndex {
  structures: IndexMap<String, StructureInfo>,
  enumerations: IndexMap<String, EnumerationInfo>,
  services: IndexMap<String, ServiceInfo>,
}

impl MetamodelIndex {
  pub fn from_components(components: impl IntoIterator<Item = ComponentData>) -> Self {
    let mut index = Self::default();
    for component in components {
      for package in component.info.packages.into_values() {
        for (id, structure) in package.structures {
          index.add_structure(id, structure);
        }
        for (id, enumeration) in package.enumerations {
          index.enumerations.insert(id, enumeration);
        }
        for (id, service) in package.services {
          index.add_service(id, service);
        }
      }
    }
    tracing::debug!(
      structures = index.structures.len(),
      enumerations = index.enumerations.len(),
      services = index.services.len(),
      "indexed metamodel"
    );
    index
  }

  fn add_structure(&mut self, id: String, structure: StructureInfo) {
    for (enum_id, enumeration) in &structure.enumerations {
      self.enumerations.insert(enum_id.clone(), enumeration.clone());
    }
    self.structures.insert(id, structure);
  }

  fn add_service(&mut self, id: String, service: ServiceInfo) {
    for (structure_id, structure) in &service.structures {
      self.add_structure(structure_id.clone(), structure.clone());
    }
    for (enum_id, enumeration) in &service.enumerations {
      self.enumerations.insert(enum_id.clone(), enumeration.clone());
    }
    self.services.insert(id, service);
  }

  pub fn service(&self, id: &str) -> Option<&ServiceInfo> {
    self.services.get(id)
  }

  pub fn services(&self) -> impl Iterator<Item = (&String, &ServiceInfo)> {
    self.services.iter()
  }
}

impl TypeLookup for MetamodelIndex {
  fn structure(&self, id: &str) -> Option<&StructureInfo> {
    self.structures.get(id)
  }

  fn enumeration(&self, id: &str) -> Option<&EnumerationInfo> {
    self.enumerations.get(id)
  }
}
