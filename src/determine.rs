//! Picking the concrete type to instantiate for a request.

use crate::core::short_name;
use crate::qualifier::Marker;
use crate::TypeName;
use std::collections::HashMap;

/// Chooses the concrete type for a requested type, given its known candidate
/// implementations and an optional qualifier.
///
/// Implementations never fail: a determiner that cannot narrow the request
/// returns it unchanged and leaves the outcome to the resolver.
pub trait TypeDeterminer: Send + Sync {
  fn determine(
    &self,
    requested: TypeName,
    candidates: Option<&[TypeName]>,
    qualifier: Option<&Marker>,
  ) -> TypeName;
}

/// The naming-convention determiner: a qualifier names the chosen
/// implementation by short-name prefix, case-insensitively.
///
/// E.g. `Tire` requested with the qualifier `named("spare")` determines
/// `SpareTire`. The first candidate whose short name starts with the prefix
/// wins; with no match the request passes through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrefixDeterminer;

impl TypeDeterminer for PrefixDeterminer {
  fn determine(
    &self,
    requested: TypeName,
    candidates: Option<&[TypeName]>,
    qualifier: Option<&Marker>,
  ) -> TypeName {
    if let Some(qualifier) = qualifier {
      let prefix = qualifier.prefix().to_lowercase();
      for &candidate in candidates.unwrap_or(&[]) {
        if short_name(candidate).to_lowercase().starts_with(&prefix) {
          tracing::debug!(requested, candidate, "qualifier prefix matched");
          return candidate;
        }
      }
    }
    requested
  }
}

/// An explicit binding-table determiner: each (requested type, qualifier
/// prefix) pair maps directly to an implementation, decoupling instantiation
/// from naming conventions.
///
/// Prefixes are matched case-insensitively. Unbound requests pass through
/// unchanged.
#[derive(Debug, Default)]
pub struct BindingDeterminer {
  bindings: HashMap<(TypeName, String), TypeName>,
}

impl BindingDeterminer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Binds the qualifier `prefix` on `requested` to `implementation`.
  pub fn bind(mut self, requested: TypeName, prefix: &str, implementation: TypeName) -> Self {
    self
      .bindings
      .insert((requested, prefix.to_lowercase()), implementation);
    self
  }
}

impl TypeDeterminer for BindingDeterminer {
  fn determine(
    &self,
    requested: TypeName,
    _candidates: Option<&[TypeName]>,
    qualifier: Option<&Marker>,
  ) -> TypeName {
    if let Some(qualifier) = qualifier {
      let key = (requested, qualifier.prefix().to_lowercase());
      if let Some(&implementation) = self.bindings.get(&key) {
        tracing::debug!(requested, implementation, "binding matched");
        return implementation;
      }
    }
    requested
  }
}
