//! Deferred providers: lazy factories over the resolver.

use crate::error::ResolveError;
use crate::qualifier::Marker;
use crate::resolver::ResolverInner;
use crate::{Instance, TypeName};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// The type name under which the deferred-factory capability is requested.
///
/// An injection point declared with this type and a generic target — see
/// [`Param::deferred`](crate::Param::deferred) and
/// [`Field::deferred`](crate::Field::deferred) — receives a [`Deferred`]
/// instead of an eagerly constructed instance.
pub const TYPE_NAME: TypeName = "Deferred";

/// A lazy factory for one dependency.
///
/// [`get`](Deferred::get) runs a full resolution each call; nothing is
/// constructed before then, and nothing is cached here. A singleton-scoped
/// target still comes back identical on every call, because the resolver's
/// own cache provides it.
pub struct Deferred {
  target: TypeName,
  qualifier: Option<Marker>,
  resolver: Weak<ResolverInner>,
}

impl Deferred {
  pub(crate) fn new(
    target: TypeName,
    qualifier: Option<Marker>,
    resolver: Weak<ResolverInner>,
  ) -> Self {
    Self {
      target,
      qualifier,
      resolver,
    }
  }

  /// The type this provider resolves on demand.
  pub fn target(&self) -> TypeName {
    self.target
  }

  /// Resolves the target now.
  pub fn get(&self) -> Result<Instance, ResolveError> {
    let resolver = self.resolver.upgrade().ok_or(ResolveError::ResolverGone)?;
    resolver.resolve(self.target, self.qualifier.as_ref(), None)
  }

  /// Resolves the target now and downcasts it.
  pub fn get_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ResolveError> {
    self.get()?.downcast::<T>().map_err(|_| ResolveError::WrongType {
      type_name: self.target,
      expected: std::any::type_name::<T>(),
    })
  }
}

impl fmt::Debug for Deferred {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Deferred")
      .field("target", &self.target)
      .field("qualifier", &self.qualifier)
      .finish()
  }
}
