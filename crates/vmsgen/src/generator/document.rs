//! Final processing and document emission.
//!
//! A merged (or split) bundle is normalised, optionally given unique operation
//! ids and wrapped into a Swagger 2 or OpenAPI 3 document template.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_with::skip_serializing_none;

use super::{
  config::{SpecVersion, SynthesisConfig},
  merger::SpecBundle,
  path::{PathDictionary, SecurityRequirement},
  schema::{JSON_MEDIA_TYPE, RequestBody, SchemaFragment},
  walk::{DocumentVisitor, TextSlot, Walk},
};

const VENDOR_PREFIX: &str = "com.vmware.";

pub const API_INDEX_FILE: &str = "api.json";
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// Ids that are never handed out by [`assign_unique_operation_ids`].
const RESERVED_OPERATION_IDS: &[&str] = &[
  "get", "set", "list", "add", "run", "start", "stop", "restart", "reset", "cancel", "create", "update", "delete",
];

const PACKAGE_DESCRIPTIONS: &[(&str, &str)] = &[
  (
    "content",
    "VMware vSphere\u{00ae} Content Library empowers vSphere Admins to effectively manage VM templates, vApps, ISO images and scripts with ease.",
  ),
  ("spbm", "SPBM"),
  (
    "vapi",
    "vAPI is an extensible API Platform for modelling and delivering APIs/SDKs/CLIs.",
  ),
  (
    "vcenter",
    "VMware vCenter Server provides a centralized platform for managing your VMware vSphere environments",
  ),
  (
    "appliance",
    "The vCenter Server Appliance is a preconfigured Linux-based virtual machine optimized for running vCenter Server and associated services.",
  ),
];

pub fn package_description(package: &str) -> &'static str {
  PACKAGE_DESCRIPTIONS
    .iter()
    .find(|(name, _)| *name == package)
    .map_or("", |(_, description)| description)
}

pub fn normalize_type_name(name: &str) -> String {
  name.replace(VENDOR_PREFIX, "").replace('$', "_")
}

struct NameNormalizer;

impl DocumentVisitor for NameNormalizer {
  fn text(&mut self, slot: TextSlot, value: &mut String) {
    if value.contains(VENDOR_PREFIX) {
      *value = value.replace(VENDOR_PREFIX, "");
    }
    if slot == TextSlot::Reference && value.contains('$') {
      *value = value.replace('$', "_");
    }
  }

  fn fragment(&mut self, fragment: &mut SchemaFragment) {
    if fragment.reference.is_some() {
      fragment.required = None;
    }
  }
}

/// Drops the vendor prefix from names, references, summaries and descriptions
/// and replaces `$` in names and references.
pub fn normalize_names(bundle: &mut SpecBundle) {
  bundle.paths.walk(&mut NameNormalizer);
  bundle.types.walk(&mut NameNormalizer);
  bundle.types.rename_all(normalize_type_name);
}

/// Python-style title casing: a letter is upper-cased when it follows a
/// non-letter and lower-cased otherwise.
fn title_case(word: &str) -> String {
  let mut titled = String::with_capacity(word.len());
  let mut boundary = true;
  for ch in word.chars() {
    if ch.is_alphabetic() {
      if boundary {
        titled.extend(ch.to_uppercase());
      } else {
        titled.extend(ch.to_lowercase());
      }
      boundary = false;
    } else {
      titled.push(ch);
      boundary = true;
    }
  }
  titled
}

/// Camel-cases `operation_id` and appends the literal segments of `path`.
///
/// `{placeholders}`, `com`, `vmware` and a segment equal to the operation id
/// are skipped; the query string is ignored.
pub fn camelized_operation_id(path: &str, operation_id: &str) -> String {
  let raw = operation_id.replace('-', "_");
  let mut words = raw.split('_');
  let mut camelized = words.next().unwrap_or_default().to_string();
  for word in words {
    camelized.push_str(&title_case(word));
  }

  let path = path.split('?').next().unwrap_or(path).replace('-', "_");
  for segment in path.split('/') {
    if segment.contains('{') || segment == "com" || segment == "vmware" || segment.eq_ignore_ascii_case(&raw) {
      continue;
    }
    for word in segment.split('_') {
      camelized.push_str(&title_case(word));
    }
  }
  camelized
}

/// Replaces operation ids with path-qualified ones. A candidate already taken
/// (or reserved) leaves the entry's id unchanged.
pub fn assign_unique_operation_ids(paths: &mut PathDictionary) {
  let mut used: HashSet<String> = RESERVED_OPERATION_IDS.iter().map(ToString::to_string).collect();
  for (path, verbs) in paths.iter_mut() {
    for entry in verbs.values_mut() {
      let Some(current) = entry.operation_id.as_deref() else {
        continue;
      };
      let candidate = camelized_operation_id(path, current);
      if used.insert(candidate.clone()) {
        entry.operation_id = Some(candidate);
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
  pub description: String,
  pub title: String,
  pub version: String,
}

impl Info {
  fn for_package(package: &str) -> Self {
    Self {
      description: package_description(package).to_string(),
      title: package.replace(['{', '}'], ""),
      version: "2.0.0".to_string(),
    }
  }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityScheme {
  #[serde(rename = "type")]
  pub scheme_type: String,
  #[serde(rename = "in")]
  pub location: Option<String>,
  pub name: Option<String>,
  pub scheme: Option<String>,
}

impl SecurityScheme {
  fn session_header(scheme_type: &str) -> Self {
    Self {
      scheme_type: scheme_type.to_string(),
      location: Some("header".to_string()),
      name: Some(SESSION_HEADER.to_string()),
      scheme: None,
    }
  }
}

fn session_security() -> Vec<SecurityRequirement> {
  vec![IndexMap::from([("api_key".to_string(), Vec::new())])]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swagger2Document {
  pub swagger: String,
  pub info: Info,
  pub host: String,
  #[serde(rename = "securityDefinitions")]
  pub security_definitions: IndexMap<String, SecurityScheme>,
  pub security: Vec<SecurityRequirement>,
  #[serde(rename = "basePath")]
  pub base_path: String,
  pub produces: Vec<String>,
  pub consumes: Vec<String>,
  pub tags: Vec<String>,
  pub schemes: Vec<String>,
  pub paths: PathDictionary,
  pub definitions: IndexMap<String, SchemaFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Components {
  pub schemas: IndexMap<String, SchemaFragment>,
  #[serde(rename = "requestBodies")]
  pub request_bodies: IndexMap<String, RequestBody>,
  #[serde(rename = "securitySchemes")]
  pub security_schemes: IndexMap<String, SecurityScheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApi3Document {
  pub openapi: String,
  pub info: Info,
  pub servers: Vec<Server>,
  pub security: Vec<SecurityRequirement>,
  pub paths: PathDictionary,
  pub components: Components,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpecDocument {
  Swagger2(Swagger2Document),
  OpenApi3(OpenApi3Document),
}

impl SpecDocument {
  /// Wraps a finished bundle into the template for `version`. Paths and
  /// definitions are emitted sorted by key.
  pub fn build(bundle: SpecBundle, package: &str, version: SpecVersion, host: &str) -> Self {
    let mut paths = bundle.paths;
    paths.sort_keys();
    let (schemas, request_bodies) = bundle.types.into_parts();
    let info = Info::for_package(package);

    match version {
      SpecVersion::Swagger2 => Self::Swagger2(Swagger2Document {
        swagger: "2.0".to_string(),
        info,
        host: host.to_string(),
        security_definitions: IndexMap::from([
          ("api_key".to_string(), SecurityScheme::session_header("apiKey")),
          (
            "basic_auth".to_string(),
            SecurityScheme {
              scheme_type: "basic".to_string(),
              location: None,
              name: None,
              scheme: None,
            },
          ),
        ]),
        security: session_security(),
        base_path: String::new(),
        produces: vec![JSON_MEDIA_TYPE.to_string()],
        consumes: vec![JSON_MEDIA_TYPE.to_string()],
        tags: Vec::new(),
        schemes: vec!["https".to_string(), "http".to_string()],
        paths,
        definitions: schemas,
      }),
      SpecVersion::OpenApi3 => Self::OpenApi3(OpenApi3Document {
        openapi: "3.0.0".to_string(),
        info,
        servers: vec![Server {
          url: format!("https://{host}"),
        }],
        security: session_security(),
        paths,
        components: Components {
          schemas,
          request_bodies,
          security_schemes: IndexMap::from([
            ("api_key".to_string(), SecurityScheme::session_header("apiKey")),
            (
              "basic_auth".to_string(),
              SecurityScheme {
                scheme_type: "http".to_string(),
                location: None,
                name: None,
                scheme: Some("basic".to_string()),
              },
            ),
          ]),
        },
      }),
    }
  }

  pub fn path_count(&self) -> usize {
    match self {
      Self::Swagger2(document) => document.paths.len(),
      Self::OpenApi3(document) => document.paths.len(),
    }
  }
}

/// One file of the output directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDocument {
  /// File stem, without the `.json` extension.
  pub name: String,
  pub document: SpecDocument,
}

impl OutputDocument {
  pub fn file_name(&self) -> String {
    format!("{}.json", self.name)
  }
}

/// Contents of `api.json`: the stems of every produced document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiIndex {
  pub files: Vec<String>,
}

impl ApiIndex {
  pub fn from_names<'n>(names: impl IntoIterator<Item = &'n str>) -> Self {
    let mut files: Vec<String> = names.into_iter().map(ToString::to_string).collect();
    files.sort();
    files.dedup();
    Self { files }
  }
}

/// Normalises names, assigns unique ids when enabled and builds the document
/// written as `<prefix><package>.json`.
pub fn finalize_bundle(mut bundle: SpecBundle, package: &str, file_prefix: &str, config: &SynthesisConfig) -> OutputDocument {
  normalize_names(&mut bundle);
  bundle.paths.sort_keys();
  if config.unique_operation_ids {
    assign_unique_operation_ids(&mut bundle.paths);
  }
  OutputDocument {
    name: format!("{file_prefix}{}", package.replace(['{', '}'], "")),
    document: SpecDocument::build(bundle, package, config.spec_version, &config.host),
  }
}
