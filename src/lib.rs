//! # Fibre Inject
//!
//! A metadata-driven dependency injection engine for Rust.
//!
//! Fibre Inject builds fully-wired object graphs from declared metadata instead
//! of hand-written factory chains. Each type registers the shape of its
//! injection points once — a constructor, fields, methods — and the resolver
//! walks that metadata recursively on demand, choosing among competing
//! implementations, honouring singleton scope and deferring construction
//! behind lazy providers.
//!
//! ## Core Concepts
//!
//! - **Metadata registry**: maps a type name to its constructor, field and
//!   method descriptors. Populated at startup, read-only during resolution.
//! - **Inheritance index**: maps an abstract type name to its known concrete
//!   implementations, supplied by external discovery code.
//! - **Resolver**: recursively turns a requested type name into a live,
//!   fully injected instance. Every resolver owns its own singleton cache;
//!   isolated graphs each construct their own resolver.
//! - **Qualifiers**: markers attached to injection points that pick one
//!   implementation among several.
//! - **Deferred providers**: lazy factories that re-run resolution each time
//!   they are invoked.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_inject::{
//!   Constructor, InheritanceIndex, MetadataRegistry, Param, Resolver, TypeMetadata,
//! };
//! use std::sync::Arc;
//!
//! struct Engine {
//!   cylinders: u32,
//! }
//!
//! struct Car {
//!   engine: Arc<Engine>,
//! }
//!
//! // Describe each type once: how it is constructed and what it needs.
//! let registry = MetadataRegistry::new();
//! registry.register(
//!   TypeMetadata::concrete("Engine").constructor(Constructor::no_arg(|| Engine { cylinders: 4 })),
//! );
//! registry.register(TypeMetadata::concrete("Car").constructor(Constructor::marked(
//!   [Param::of("Engine")],
//!   |args| {
//!     Ok(Car {
//!       engine: args.get::<Engine>(0)?,
//!     })
//!   },
//! )));
//!
//! // The resolver wires the whole graph on demand.
//! let resolver = Resolver::new(registry, InheritanceIndex::new());
//! let car = resolver.get::<Car>("Car").unwrap();
//!
//! assert_eq!(car.engine.cylinders, 4);
//! ```

mod core;
pub mod deferred;
pub mod determine;
mod error;
mod macros;
mod metadata;
pub mod qualifier;
mod registry;
mod resolver;
pub mod select;

pub use deferred::Deferred;
pub use determine::{BindingDeterminer, PrefixDeterminer, TypeDeterminer};
pub use error::{BoxError, InjectionPoint, ResolveError};
pub use metadata::{Args, Constructor, Field, InjectionSet, Method, Param, TypeMetadata};
pub use qualifier::Marker;
pub use registry::{InheritanceIndex, MetadataRegistry};
pub use resolver::Resolver;

use std::any::Any;
use std::sync::Arc;

/// Stable identifier naming a registered or requested type.
///
/// The short name — the segment after the last `::` — is what qualifier
/// prefixes are matched against.
pub type TypeName = &'static str;

/// A resolved instance: sharable, and downcastable to its concrete type by
/// the caller.
pub type Instance = Arc<dyn Any + Send + Sync>;
