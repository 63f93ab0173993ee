//! The instance resolver: recursive resolution and instantiation.

use crate::core::{InProgress, ResolutionGuard};
use crate::deferred::{self, Deferred};
use crate::determine::{PrefixDeterminer, TypeDeterminer};
use crate::error::{InjectionPoint, ResolveError};
use crate::metadata::{Args, InjectionSet, Param, TypeMetadata};
use crate::qualifier::{self, Marker};
use crate::registry::{InheritanceIndex, MetadataRegistry};
use crate::select;
use crate::{Instance, TypeName};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;

/// The resolution engine.
///
/// A resolver exclusively owns its singleton cache and its in-progress
/// bookkeeping for its whole lifetime; isolated graphs (and tests) each
/// construct their own resolver rather than sharing global state. The handle
/// is cheap to clone and safe to share across threads: concurrent requests
/// for the same singleton block on one construction instead of racing.
#[derive(Clone)]
pub struct Resolver {
  inner: Arc<ResolverInner>,
}

impl Resolver {
  /// A resolver over `registry` and `index` using the naming-convention
  /// [`PrefixDeterminer`].
  pub fn new(registry: MetadataRegistry, index: InheritanceIndex) -> Self {
    Self::with_determiner(registry, index, PrefixDeterminer)
  }

  /// A resolver with an explicit determination policy.
  pub fn with_determiner(
    registry: MetadataRegistry,
    index: InheritanceIndex,
    determiner: impl TypeDeterminer + 'static,
  ) -> Self {
    Self {
      inner: Arc::new(ResolverInner {
        registry,
        index,
        determiner: Box::new(determiner),
        singletons: DashMap::new(),
        in_progress: InProgress::default(),
      }),
    }
  }

  /// Resolves `type_name` into a fully injected instance.
  pub fn resolve(&self, type_name: TypeName) -> Result<Instance, ResolveError> {
    self.inner.resolve(type_name, None, None)
  }

  /// Resolves with an explicit qualifier and generic arguments — the full
  /// entry point, the same one injection sites go through internally.
  pub fn resolve_with(
    &self,
    type_name: TypeName,
    qualifier: Option<&Marker>,
    generics: Option<&[TypeName]>,
  ) -> Result<Instance, ResolveError> {
    self.inner.resolve(type_name, qualifier, generics)
  }

  /// Resolves `type_name` and downcasts the instance to `T`.
  pub fn get<T: Any + Send + Sync>(&self, type_name: TypeName) -> Result<Arc<T>, ResolveError> {
    downcast::<T>(type_name, self.resolve(type_name)?)
  }

  /// Resolves `type_name` under `qualifier` and downcasts the instance.
  pub fn get_with<T: Any + Send + Sync>(
    &self,
    type_name: TypeName,
    qualifier: &Marker,
  ) -> Result<Arc<T>, ResolveError> {
    downcast::<T>(type_name, self.resolve_with(type_name, Some(qualifier), None)?)
  }

  /// The lenient accessor: failures are logged to the tracing sink and
  /// mapped to `None`, leaving the caller's slot unset. Callers that accept
  /// partially populated graphs use this; everyone else wants
  /// [`Resolver::get`].
  pub fn get_opt<T: Any + Send + Sync>(&self, type_name: TypeName) -> Option<Arc<T>> {
    match self.get::<T>(type_name) {
      Ok(instance) => Some(instance),
      Err(error) => {
        tracing::debug!(type_name, %error, "resolution failed");
        None
      }
    }
  }
}

fn downcast<T: Any + Send + Sync>(
  type_name: TypeName,
  instance: Instance,
) -> Result<Arc<T>, ResolveError> {
  instance.downcast::<T>().map_err(|_| ResolveError::WrongType {
    type_name,
    expected: std::any::type_name::<T>(),
  })
}

pub(crate) struct ResolverInner {
  registry: MetadataRegistry,
  index: InheritanceIndex,
  determiner: Box<dyn TypeDeterminer>,
  singletons: DashMap<TypeName, Arc<OnceCell<Instance>>>,
  in_progress: InProgress,
}

impl ResolverInner {
  pub(crate) fn resolve(
    self: &Arc<Self>,
    type_name: TypeName,
    qualifier: Option<&Marker>,
    generics: Option<&[TypeName]>,
  ) -> Result<Instance, ResolveError> {
    tracing::debug!(type_name, qualifier = ?qualifier.map(Marker::prefix), "resolve");

    // Deferred-factory interception: nothing is constructed eagerly.
    if type_name == deferred::TYPE_NAME {
      let target = generics
        .and_then(|generics| generics.first().copied())
        .ok_or(ResolveError::MissingTarget)?;
      tracing::debug!(deferred_target = target, "returning deferred provider");
      let provider = Deferred::new(target, qualifier.cloned(), Arc::downgrade(self));
      return Ok(Arc::new(provider));
    }

    let candidates = self.index.candidates(type_name);
    let type_name = self.determiner.determine(type_name, candidates, qualifier);

    let _guard = ResolutionGuard::enter(&self.in_progress, type_name)?;

    if let Some(cell) = self.singletons.get(type_name) {
      if let Some(instance) = cell.get() {
        tracing::debug!(type_name, "delivering cached singleton");
        return Ok(Arc::clone(instance));
      }
    }

    match self.registry.get(type_name) {
      Some(metadata) if !metadata.is_abstract() => self.construct(type_name, &metadata),
      metadata => {
        // Interface or abstract type: resolve through its candidates. Zero
        // or ambiguous candidates terminate here, never retry.
        let registered = metadata.is_some();
        match self.index.candidates(type_name) {
          Some(candidates) if candidates.len() == 1 => {
            self.resolve(candidates[0], qualifier, None)
          }
          Some(candidates) if candidates.is_empty() => {
            Err(ResolveError::NoCandidates(type_name))
          }
          Some(candidates) => {
            tracing::debug!(type_name, count = candidates.len(), "ambiguous abstraction");
            Err(ResolveError::Ambiguous {
              type_name,
              count: candidates.len(),
            })
          }
          None if registered => Err(ResolveError::NoCandidates(type_name)),
          None => Err(ResolveError::NotRegistered(type_name)),
        }
      }
    }
  }

  /// Concrete construction. Singleton-scoped types build inside their cache
  /// cell's atomic get-or-create, so the instance is published exactly once
  /// and only after injection has completed.
  fn construct(
    self: &Arc<Self>,
    type_name: TypeName,
    metadata: &TypeMetadata,
  ) -> Result<Instance, ResolveError> {
    if metadata.is_singleton() {
      let cell = Arc::clone(self.singletons.entry(type_name).or_default().value());
      let instance = cell.get_or_try_init(|| self.build(type_name, metadata))?;
      Ok(Arc::clone(instance))
    } else {
      self.build(type_name, metadata)
    }
  }

  fn build(
    self: &Arc<Self>,
    type_name: TypeName,
    metadata: &TypeMetadata,
  ) -> Result<Instance, ResolveError> {
    let constructor = select::marked(metadata)
      .or_else(|| select::no_arg(metadata))
      .ok_or(ResolveError::NoConstructor(type_name))?;

    // Arguments are resolved depth-first, left to right: one argument and
    // its whole subtree complete before the next starts.
    let args = self.resolve_params(type_name, constructor.params(), |index| {
      InjectionPoint::Constructor { index }
    })?;
    let mut instance = constructor
      .produce(Args::new(args))
      .map_err(|source| ResolveError::Construction { type_name, source })?;

    // Post-construction injection, base level first, while the instance is
    // still exclusively owned.
    for set in metadata.injection_sets() {
      self.inject(type_name, set, instance.as_mut())?;
    }

    tracing::debug!(type_name, "constructed");
    Ok(Arc::from(instance))
  }

  fn resolve_params(
    self: &Arc<Self>,
    owner: TypeName,
    params: &[Param],
    point: impl Fn(usize) -> InjectionPoint,
  ) -> Result<Vec<Instance>, ResolveError> {
    let mut values = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
      let qualifier = param.qualifier();
      let candidates = self.index.candidates(param.type_name());
      let target = self
        .determiner
        .determine(param.type_name(), candidates, qualifier);
      let value = self
        .resolve(target, qualifier, param.generic_args())
        .map_err(|source| ResolveError::Dependency {
          type_name: owner,
          point: point(index),
          source: Box::new(source),
        })?;
      values.push(value);
    }
    Ok(values)
  }

  fn inject(
    self: &Arc<Self>,
    owner: TypeName,
    set: &InjectionSet,
    instance: &mut (dyn Any + Send + Sync),
  ) -> Result<(), ResolveError> {
    for field in set.fields() {
      tracing::trace!(owner, level = set.level(), field = field.name(), "injecting field");
      let qualifier = qualifier::extract(field.markers());
      let candidates = self.index.candidates(field.type_name());
      let target = self
        .determiner
        .determine(field.type_name(), candidates, qualifier);
      let value = self
        .resolve(target, qualifier, field.generic_args())
        .map_err(|source| ResolveError::Dependency {
          type_name: owner,
          point: InjectionPoint::Field(field.name()),
          source: Box::new(source),
        })?;
      field
        .apply(instance, value)
        .map_err(|source| ResolveError::Injection {
          type_name: owner,
          point: InjectionPoint::Field(field.name()),
          source,
        })?;
    }

    for method in set.methods() {
      tracing::trace!(owner, level = set.level(), method = method.name(), "invoking method");
      let args = self.resolve_params(owner, method.params(), |index| {
        InjectionPoint::MethodParameter {
          method: method.name(),
          index,
        }
      })?;
      method
        .call(instance, Args::new(args))
        .map_err(|source| ResolveError::Injection {
          type_name: owner,
          point: InjectionPoint::Method(method.name()),
          source,
        })?;
    }

    Ok(())
  }
}
