//! The startup-built registries the resolver reads from: type metadata and
//! the inheritance index.

use crate::metadata::TypeMetadata;
use crate::TypeName;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// The registry of injection metadata, keyed by type name.
///
/// Populated by discovery or configuration code before a resolver is built
/// over it; read-only during resolution. Registering a name twice replaces
/// the earlier entry — the last registration wins.
#[derive(Default)]
pub struct MetadataRegistry {
  types: DashMap<TypeName, Arc<TypeMetadata>>,
}

impl MetadataRegistry {
  /// Creates a new, empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers one type's metadata.
  pub fn register(&self, metadata: TypeMetadata) {
    tracing::trace!(type_name = metadata.name(), "registering metadata");
    self.types.insert(metadata.name(), Arc::new(metadata));
  }

  /// The metadata registered for `name`.
  pub fn get(&self, name: &str) -> Option<Arc<TypeMetadata>> {
    self.types.get(name).map(|entry| Arc::clone(entry.value()))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.types.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }
}

/// The externally built mapping from an abstract type name to its known
/// concrete implementations, in registration order.
///
/// Built once before the resolver exists; the resolver reads it for the whole
/// resolution session and never mutates it.
#[derive(Clone, Debug, Default)]
pub struct InheritanceIndex {
  entries: HashMap<TypeName, Vec<TypeName>>,
}

impl InheritanceIndex {
  /// Creates a new, empty index.
  pub fn new() -> Self {
    Self::default()
  }

  /// Records `implementations` as candidates for `name`, after any recorded
  /// earlier.
  pub fn register(
    &mut self,
    name: TypeName,
    implementations: impl IntoIterator<Item = TypeName>,
  ) {
    self.entries.entry(name).or_default().extend(implementations);
  }

  /// The ordered candidate implementations known for `name`.
  pub fn candidates(&self, name: &str) -> Option<&[TypeName]> {
    self.entries.get(name).map(Vec::as_slice)
  }
}
