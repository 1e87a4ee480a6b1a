use serde_json::json;
use vmsgen_metamodel::{STRUCTURE_RESOURCE_TYPE, TypeDescriptor};

use super::support::{
  MetamodelBuilder, context, field, long, string, structure, tech_preview, unreleased, vm_metamodel,
};
use crate::generator::{
  config::{Family, FilterPolicy, SpecVersion},
  metrics::GenerationWarning,
  schema::SchemaFragment,
  visitor::{SynthesisContext, builtin_schema, is_builtin_type_name},
};

fn visit_value(ctx: &mut SynthesisContext<'_>, descriptor: &TypeDescriptor) -> serde_json::Value {
  let mut fragment = SchemaFragment::default();
  ctx.visit(descriptor, &mut fragment);
  serde_json::to_value(&fragment).unwrap()
}

#[test]
fn test_builtin_schema_table() {
  assert_eq!(builtin_schema("DATE_TIME"), ("string".to_string(), Some("date-time")));
  assert_eq!(builtin_schema("SECRET"), ("string".to_string(), Some("password")));
  assert_eq!(builtin_schema("LONG"), ("integer".to_string(), Some("int64")));
  assert_eq!(builtin_schema("DOUBLE"), ("number".to_string(), Some("double")));
  assert_eq!(builtin_schema("DYNAMIC_STRUCTURE"), ("object".to_string(), None));
  assert_eq!(builtin_schema("BOOLEAN"), ("boolean".to_string(), None));
  assert!(is_builtin_type_name("Secret"));
  assert!(!is_builtin_type_name("com.vmware.vcenter.VM.info"));
}

#[test]
fn test_visit_generics() {
  let index = MetamodelBuilder::new().build();
  let mut ctx = context(&index, Family::Api, SpecVersion::OpenApi3);

  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::optional(TypeDescriptor::list(string()))),
    json!({"required": false, "type": "array", "items": {"type": "string"}})
  );
  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::set(long())),
    json!({"type": "array", "uniqueItems": true, "items": {"type": "integer", "format": "int64"}})
  );
  assert!(ctx.types.is_empty());
}

#[test]
fn test_visit_map_api_family() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Api, SpecVersion::OpenApi3);

  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::map(string(), long())),
    json!({"type": "object", "additionalProperties": {"type": "integer"}})
  );
  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::list(TypeDescriptor::map(string(), string()))),
    json!({"type": "array", "items": {"type": "object", "additionalProperties": {"type": "string"}}})
  );
  assert_eq!(
    visit_value(
      &mut ctx,
      &TypeDescriptor::map(string(), TypeDescriptor::structure("com.vmware.vcenter.VM.create_spec"))
    ),
    json!({
      "type": "object",
      "additionalProperties": {"$ref": "#/components/schemas/com.vmware.vcenter.VM.create_spec"}
    })
  );
  assert!(ctx.types.contains("com.vmware.vcenter.VM.create_spec"));
}

#[test]
fn test_visit_map_rest_family() {
  let index = MetamodelBuilder::new().build();
  let mut ctx = context(&index, Family::Rest, SpecVersion::Swagger2);

  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::map(string(), long())),
    json!({
      "type": "array",
      "items": {
        "type": "object",
        "properties": {"key": {"type": "string"}, "value": {"type": "integer"}}
      }
    })
  );
  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::optional(TypeDescriptor::map(string(), string()))),
    json!({
      "required": false,
      "type": "array",
      "items": {
        "type": "object",
        "properties": {"key": {"type": "string"}, "value": {"type": "string"}}
      }
    })
  );
}

#[test]
fn test_register_structure_and_enumeration() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Api, SpecVersion::OpenApi3);

  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::structure("com.vmware.vcenter.VM.summary")),
    json!({"$ref": "#/components/schemas/com.vmware.vcenter.VM.summary"})
  );
  assert_eq!(
    serde_json::to_value(ctx.types.get("com.vmware.vcenter.VM.summary").unwrap()).unwrap(),
    json!({
      "type": "object",
      "properties": {
        "vm": {"description": "The vm.", "type": "string"},
        "name": {"description": "The name.", "type": "string"},
        "power_state": {
          "description": "The power_state.",
          "$ref": "#/components/schemas/com.vmware.vcenter.VM.power_state"
        }
      },
      "required": ["vm", "name", "power_state"]
    })
  );
  assert_eq!(
    serde_json::to_value(ctx.types.get("com.vmware.vcenter.VM.power_state").unwrap()).unwrap(),
    json!({
      "type": "string",
      "description": "Values of com.vmware.vcenter.VM.power_state.",
      "enum": ["POWERED_ON", "POWERED_OFF"]
    })
  );
  assert_eq!(ctx.types.len(), 2);
  assert!(ctx.stats.warnings.is_empty());
}

#[test]
fn test_register_is_idempotent() {
  let index = vm_metamodel().build();
  let mut ctx = context(&index, Family::Api, SpecVersion::Swagger2);

  ctx.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.vcenter.VM.summary");
  let first = ctx.types.clone();
  ctx.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.vcenter.VM.summary");
  visit_value(&mut ctx, &TypeDescriptor::list(TypeDescriptor::structure("com.vmware.vcenter.VM.summary")));

  assert_eq!(ctx.types, first);
}

#[test]
fn test_self_referential_structure_terminates() {
  let node = TypeDescriptor::structure("com.vmware.test.node");
  let index = MetamodelBuilder::new()
    .structure(structure(
      "com.vmware.test.node",
      vec![
        field("children", TypeDescriptor::list(node.clone())),
        field("parent", TypeDescriptor::optional(node.clone())),
      ],
    ))
    .build();
  let mut ctx = context(&index, Family::Rest, SpecVersion::Swagger2);

  visit_value(&mut ctx, &node);

  assert_eq!(ctx.types.len(), 1);
  assert_eq!(
    serde_json::to_value(ctx.types.get("com.vmware.test.node").unwrap()).unwrap(),
    json!({
      "type": "object",
      "properties": {
        "children": {
          "description": "The children.",
          "type": "array",
          "items": {"$ref": "#/definitions/com.vmware.test.node"}
        },
        "parent": {
          "description": "The parent.",
          "required": false,
          "$ref": "#/definitions/com.vmware.test.node"
        }
      },
      "required": ["children"]
    })
  );
}

#[test]
fn test_unresolved_type_dangles() {
  let index = MetamodelBuilder::new().build();
  let mut ctx = context(&index, Family::Api, SpecVersion::OpenApi3);

  assert_eq!(
    visit_value(&mut ctx, &TypeDescriptor::structure("com.vmware.missing")),
    json!({"$ref": "#/components/schemas/com.vmware.missing"})
  );
  assert!(ctx.types.is_empty());
  assert_eq!(
    ctx.stats.warnings,
    vec![GenerationWarning::DanglingReference {
      type_name: "com.vmware.missing".to_string()
    }]
  );
}

#[test]
fn test_unreleased_elements_are_filtered() {
  let mut hidden = structure("com.vmware.test.hidden", vec![field("name", string())]);
  hidden.metadata = unreleased();
  let mut secret = field("secret", string());
  secret.metadata = unreleased();
  let index = MetamodelBuilder::new()
    .structure(hidden)
    .structure(structure("com.vmware.test.visible", vec![field("name", string()), secret]))
    .build();

  let mut released = context(&index, Family::Api, SpecVersion::OpenApi3);
  released.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.test.hidden");
  released.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.test.visible");
  assert!(!released.types.contains("com.vmware.test.hidden"));
  assert_eq!(released.stats.warnings.len(), 1);
  let visible = released.types.get("com.vmware.test.visible").unwrap();
  assert_eq!(
    visible.properties.as_ref().unwrap().keys().collect::<Vec<_>>(),
    ["name"]
  );

  let mut everything = SynthesisContext::new(&index, Family::Api, SpecVersion::OpenApi3, FilterPolicy::ShowAll);
  everything.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.test.hidden");
  everything.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.test.visible");
  assert!(everything.types.contains("com.vmware.test.hidden"));
  assert_eq!(
    everything.types.get("com.vmware.test.visible").unwrap().properties.as_ref().unwrap().len(),
    2
  );
}

#[test]
fn test_tech_preview_overrides_unreleased() {
  let mut preview = structure("com.vmware.test.preview", vec![field("name", string())]);
  preview.metadata = tech_preview();
  let mut flag = field("flag", string());
  flag.metadata = tech_preview();
  let index = MetamodelBuilder::new()
    .structure(preview)
    .structure(structure("com.vmware.test.visible", vec![field("name", string()), flag]))
    .build();

  let mut ctx = context(&index, Family::Api, SpecVersion::OpenApi3);
  ctx.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.test.preview");
  ctx.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.test.visible");

  assert!(ctx.types.contains("com.vmware.test.preview"));
  assert!(ctx.stats.warnings.is_empty());
  assert_eq!(
    ctx.types.get("com.vmware.test.visible").unwrap().properties.as_ref().unwrap().keys().collect::<Vec<_>>(),
    ["name", "flag"]
  );
}

#[test]
fn test_serialization_name_renames_property() {
  let mut power = field("power", string());
  power.metadata = power.metadata.with(
    "SerializationName",
    vmsgen_metamodel::ElementMap::new().with_string("value", "power_state"),
  );
  let index = MetamodelBuilder::new()
    .structure(structure("com.vmware.test.renamed", vec![power]))
    .build();
  let mut ctx = context(&index, Family::Api, SpecVersion::OpenApi3);

  ctx.register(STRUCTURE_RESOURCE_TYPE, "com.vmware.test.renamed");
  let renamed = ctx.types.get("com.vmware.test.renamed").unwrap();
  assert!(renamed.properties.as_ref().unwrap().contains_key("power_state"));
  assert_eq!(renamed.required_names(), ["power_state".to_string()]);
}
