use super::{
  path::{Parameter, PathDictionary, PathEntry, RequestBodyRef, Response},
  schema::{RequestBody, SchemaFragment},
  type_dictionary::TypeDictionary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSlot {
  Reference,
  Summary,
  Description,
}

/// Callbacks invoked while walking emitted documents. Both default to no-ops.
pub trait DocumentVisitor {
  fn text(&mut self, _slot: TextSlot, _value: &mut String) {}

  fn fragment(&mut self, _fragment: &mut SchemaFragment) {}
}

/// Depth-first traversal over every schema and reference-bearing string.
pub trait Walk {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor);
}

fn walk_text(slot: TextSlot, value: Option<&mut String>, visitor: &mut dyn DocumentVisitor) {
  if let Some(value) = value {
    visitor.text(slot, value);
  }
}

impl Walk for SchemaFragment {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    visitor.fragment(self);
    walk_text(TextSlot::Reference, self.reference.as_mut(), visitor);
    walk_text(TextSlot::Description, self.description.as_mut(), visitor);
    if let Some(items) = self.items.as_mut() {
      items.walk(visitor);
    }
    if let Some(properties) = self.properties.as_mut() {
      for property in properties.values_mut() {
        property.walk(visitor);
      }
    }
    if let Some(additional) = self.additional_properties.as_mut() {
      additional.walk(visitor);
    }
  }
}

impl Walk for Parameter {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    walk_text(TextSlot::Description, self.description.as_mut(), visitor);
    if let Some(items) = self.items.as_mut() {
      items.walk(visitor);
    }
    if let Some(schema) = self.schema.as_mut() {
      schema.walk(visitor);
    }
  }
}

impl Walk for RequestBodyRef {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    visitor.text(TextSlot::Reference, &mut self.reference);
  }
}

impl Walk for RequestBody {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    for media in self.content.values_mut() {
      media.schema.walk(visitor);
    }
  }
}

impl Walk for Response {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    visitor.text(TextSlot::Description, &mut self.description);
    if let Some(schema) = self.schema.as_mut() {
      schema.walk(visitor);
    }
    if let Some(content) = self.content.as_mut() {
      for media in content.values_mut() {
        media.schema.walk(visitor);
      }
    }
  }
}

impl Walk for PathEntry {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    walk_text(TextSlot::Summary, self.summary.as_mut(), visitor);
    for parameter in &mut self.parameters {
      parameter.walk(visitor);
    }
    if let Some(body) = self.request_body.as_mut() {
      body.walk(visitor);
    }
    for response in self.responses.values_mut() {
      response.walk(visitor);
    }
  }
}

impl Walk for PathDictionary {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    for entry in self.entries_mut() {
      entry.walk(visitor);
    }
  }
}

impl Walk for TypeDictionary {
  fn walk(&mut self, visitor: &mut dyn DocumentVisitor) {
    for fragment in self.fragments_mut() {
      fragment.walk(visitor);
    }
    for body in self.request_bodies_mut() {
      body.walk(visitor);
    }
  }
}
