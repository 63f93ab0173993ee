//! The typed failure model of the resolution engine.
//!
//! Every failure names the type it occurred on and, where one exists, the
//! injection point that triggered it, so the top-level caller can decide
//! whether a partially resolvable graph is acceptable instead of the engine
//! deciding for them.

use crate::TypeName;
use std::fmt;
use thiserror::Error;

/// A boxed error produced by user-registered closures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One designated receiver of a resolved dependency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectionPoint {
  /// A constructor parameter, by declared position.
  Constructor { index: usize },
  /// An injectable field, by name.
  Field(&'static str),
  /// An injectable method, by name.
  Method(&'static str),
  /// A parameter of an injectable method.
  MethodParameter { method: &'static str, index: usize },
}

impl fmt::Display for InjectionPoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InjectionPoint::Constructor { index } => write!(f, "constructor parameter {index}"),
      InjectionPoint::Field(name) => write!(f, "field `{name}`"),
      InjectionPoint::Method(name) => write!(f, "method `{name}`"),
      InjectionPoint::MethodParameter { method, index } => {
        write!(f, "parameter {index} of method `{method}`")
      }
    }
  }
}

/// Why a resolution did not produce an instance.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The requested type has neither registered metadata nor known
  /// implementations.
  #[error("type `{0}` is not registered and has no known implementations")]
  NotRegistered(TypeName),

  /// An abstract type with no candidate implementations.
  #[error("abstract type `{0}` has no registered implementations")]
  NoCandidates(TypeName),

  /// An abstract type with several candidates and nothing narrowing them.
  #[error("abstract type `{type_name}` has {count} candidate implementations and no qualifier narrows them")]
  Ambiguous { type_name: TypeName, count: usize },

  /// Neither an injection-marked nor a no-argument constructor is declared.
  #[error("type `{0}` declares neither an injectable nor a no-argument constructor")]
  NoConstructor(TypeName),

  /// A deferred-factory request without a generic target type.
  #[error("deferred request carries no target type")]
  MissingTarget,

  /// The dependency graph loops back onto a type already being resolved.
  #[error("circular dependency detected while resolving `{0}`")]
  Cycle(TypeName),

  /// The registered constructor closure failed.
  #[error("constructor of `{type_name}` failed: {source}")]
  Construction {
    type_name: TypeName,
    #[source]
    source: BoxError,
  },

  /// A registered assignment or invocation closure failed.
  #[error("{point} of `{type_name}` failed: {source}")]
  Injection {
    type_name: TypeName,
    point: InjectionPoint,
    #[source]
    source: BoxError,
  },

  /// A dependency of the named injection point could not be resolved.
  #[error("could not resolve {point} of `{type_name}`: {source}")]
  Dependency {
    type_name: TypeName,
    point: InjectionPoint,
    #[source]
    source: Box<ResolveError>,
  },

  /// The resolved instance is not of the requested concrete type.
  #[error("instance of `{type_name}` is not a `{expected}`")]
  WrongType {
    type_name: TypeName,
    expected: &'static str,
  },

  /// A deferred provider outlived the resolver it was created from.
  #[error("the resolver behind this deferred provider has been dropped")]
  ResolverGone,
}

impl ResolveError {
  /// Follows the dependency chain down to the failure that started it.
  pub fn root(&self) -> &ResolveError {
    match self {
      ResolveError::Dependency { source, .. } => source.root(),
      other => other,
    }
  }
}
