use indexmap::IndexMap;

use super::schema::{RequestBody, SchemaFragment};

/// Slot state for a named type. A `Pending` slot is being synthesised; any
/// nested reference to it resolves to a `$ref` without a second pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
  Pending,
  Ready(SchemaFragment),
}

impl Entry {
  pub fn fragment(&self) -> Option<&SchemaFragment> {
    match self {
      Self::Ready(fragment) => Some(fragment),
      Self::Pending => None,
    }
  }

  pub fn into_fragment(self) -> SchemaFragment {
    match self {
      Self::Ready(fragment) => fragment,
      Self::Pending => SchemaFragment::default(),
    }
  }
}

/// Named schema registry owned by one package task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDictionary {
  entries: IndexMap<String, Entry>,
  request_bodies: IndexMap<String, RequestBody>,
}

impl TypeDictionary {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  /// Claims `name` for synthesis. Returns `false` when the name is already
  /// present in any state.
  pub fn reserve(&mut self, name: &str) -> bool {
    if self.entries.contains_key(name) {
      return false;
    }
    self.entries.insert(name.to_string(), Entry::Pending);
    true
  }

  pub fn insert(&mut self, name: impl Into<String>, fragment: SchemaFragment) {
    self.entries.insert(name.into(), Entry::Ready(fragment));
  }

  /// Inserts only when `name` is not yet registered.
  pub fn insert_missing(&mut self, name: impl Into<String>, fragment: SchemaFragment) {
    self.entries.entry(name.into()).or_insert(Entry::Ready(fragment));
  }

  pub fn get(&self, name: &str) -> Option<&SchemaFragment> {
    self.entries.get(name).and_then(Entry::fragment)
  }

  pub fn entry(&self, name: &str) -> Option<&Entry> {
    self.entries.get(name)
  }

  /// Moves the entry under `from` to `to`, keeping its position.
  pub fn rename(&mut self, from: &str, to: &str) -> bool {
    let Some(index) = self.entries.get_index_of(from) else {
      return false;
    };
    let Some((_, entry)) = self.entries.shift_remove_index(index) else {
      return false;
    };
    self.entries.shift_insert(index.min(self.entries.len()), to.to_string(), entry);
    true
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
    self.entries.iter()
  }

  pub fn fragments_mut(&mut self) -> impl Iterator<Item = &mut SchemaFragment> {
    self.entries.values_mut().filter_map(|entry| match entry {
      Entry::Ready(fragment) => Some(fragment),
      Entry::Pending => None,
    })
  }

  /// Applies `rename` to every type name, keeping order. Later duplicates win.
  pub fn rename_all(&mut self, rename: impl Fn(&str) -> String) {
    self.entries = std::mem::take(&mut self.entries)
      .into_iter()
      .map(|(name, entry)| (rename(&name), entry))
      .collect();
    self.request_bodies = std::mem::take(&mut self.request_bodies)
      .into_iter()
      .map(|(name, body)| (rename(&name), body))
      .collect();
  }

  pub fn insert_request_body(&mut self, name: impl Into<String>, body: RequestBody) {
    self.request_bodies.insert(name.into(), body);
  }

  #[cfg(test)]
  pub fn request_bodies(&self) -> &IndexMap<String, RequestBody> {
    &self.request_bodies
  }

  pub fn request_bodies_mut(&mut self) -> impl Iterator<Item = &mut RequestBody> {
    self.request_bodies.values_mut()
  }

  pub fn rename_request_body(&mut self, from: &str, to: &str) -> bool {
    match self.request_bodies.shift_remove(from) {
      Some(body) => {
        self.request_bodies.insert(to.to_string(), body);
        true
      }
      None => false,
    }
  }

  /// Unions `other` into `self`; `other` wins on name collisions.
  pub fn extend(&mut self, other: Self) {
    self.entries.extend(other.entries);
    self.request_bodies.extend(other.request_bodies);
  }

  /// Definitions ready for emission, sorted by name. A slot left pending
  /// serialises as an empty schema.
  pub fn into_parts(self) -> (IndexMap<String, SchemaFragment>, IndexMap<String, RequestBody>) {
    let mut schemas: IndexMap<String, SchemaFragment> = self
      .entries
      .into_iter()
      .map(|(name, entry)| (name, entry.into_fragment()))
      .collect();
    schemas.sort_keys();
    let mut request_bodies = self.request_bodies;
    request_bodies.sort_keys();
    (schemas, request_bodies)
  }
}
