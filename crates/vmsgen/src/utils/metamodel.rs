use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use vmsgen_metamodel::{ComponentData, component_from_slice};

use crate::generator::{index::MetamodelIndex, navigation::RecordedNavigation};

/// Where metamodel components come from.
pub trait MetadataSource {
  async fn list_components(&self) -> anyhow::Result<Vec<String>>;

  async fn get_component(&self, id: &str) -> anyhow::Result<ComponentData>;
}

/// A directory of `<component>.json` documents.
#[derive(Debug, Clone)]
pub struct ComponentDirectory {
  root: PathBuf,
}

impl ComponentDirectory {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn component_path(&self, id: &str) -> PathBuf {
    self.root.join(format!("{id}.json"))
  }
}

impl MetadataSource for ComponentDirectory {
  async fn list_components(&self) -> anyhow::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(&self.root)
      .await
      .with_context(|| format!("failed to read metamodel directory {}", self.root.display()))?;

    let mut components = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(OsStr::to_str) != Some("json") {
        continue;
      }
      if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
        components.push(stem.to_string());
      }
    }
    components.sort();
    Ok(components)
  }

  async fn get_component(&self, id: &str) -> anyhow::Result<ComponentData> {
    let path = self.component_path(id);
    let file = AsyncMmapFile::open(&path)
      .await
      .with_context(|| format!("failed to open component {}", path.display()))?;
    component_from_slice(file.as_slice()).with_context(|| format!("failed to decode component {}", path.display()))
  }
}

/// Loads every component of `source` and indexes it.
pub async fn load_index(source: &impl MetadataSource) -> anyhow::Result<MetamodelIndex> {
  let ids = source.list_components().await?;
  let mut components = Vec::with_capacity(ids.len());
  for id in &ids {
    tracing::debug!(component = %id, "loading component");
    components.push(source.get_component(id).await?);
  }
  Ok(MetamodelIndex::from_components(components))
}

pub async fn load_navigation(path: &Path) -> anyhow::Result<RecordedNavigation> {
  let file = AsyncMmapFile::open(path)
    .await
    .with_context(|| format!("failed to open navigation file {}", path.display()))?;
  RecordedNavigation::from_slice(file.as_slice())
    .with_context(|| format!("failed to decode navigation file {}", path.display()))
}
