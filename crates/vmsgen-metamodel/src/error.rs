use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetamodelError {
  #[error("failed to decode metamodel at '{path}': {source}")]
  Decode {
    path: String,
    #[source]
    source: serde_json::Error,
  },
  #[error("{category} type is missing '{field}'")]
  MissingTypeField { category: &'static str, field: &'static str },
}
