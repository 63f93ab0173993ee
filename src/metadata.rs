//! Type metadata: the per-type container of constructor, field and method
//! descriptors that stands in for runtime reflection.
//!
//! Every injectable type registers one [`TypeMetadata`] describing its
//! injection points. Closures registered alongside each descriptor perform
//! the actual construction, assignment and invocation, typed against the
//! concrete Rust type; the engine itself only ever handles `dyn Any`.

use crate::deferred::{self, Deferred};
use crate::error::BoxError;
use crate::qualifier::{self, Marker};
use crate::{Instance, TypeName};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub(crate) type BoxedInstance = Box<dyn Any + Send + Sync>;

type ProduceFn = Box<dyn Fn(Args) -> Result<BoxedInstance, BoxError> + Send + Sync>;
type AssignFn = Box<dyn Fn(&mut (dyn Any + Send + Sync), Instance) -> Result<(), BoxError> + Send + Sync>;
type InvokeFn = Box<dyn Fn(&mut (dyn Any + Send + Sync), Args) -> Result<(), BoxError> + Send + Sync>;

/// Resolved arguments handed to a produce or invoke closure, in declared
/// parameter order.
pub struct Args(Vec<Instance>);

impl Args {
  pub(crate) fn new(values: Vec<Instance>) -> Self {
    Self(values)
  }

  /// The argument at `index`, downcast to its concrete type.
  pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, BoxError> {
    let value = self
      .0
      .get(index)
      .ok_or_else(|| format!("no argument at index {index}"))?;
    value.clone().downcast::<T>().map_err(|_| {
      format!(
        "argument {index} is not a `{}`",
        std::any::type_name::<T>()
      )
      .into()
    })
  }

  /// The argument at `index` as a deferred provider.
  pub fn deferred(&self, index: usize) -> Result<Arc<Deferred>, BoxError> {
    self.get::<Deferred>(index)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// One declared constructor or method parameter: its declared type, generic
/// arguments captured from a parameterized declared type, and markers.
pub struct Param {
  type_name: TypeName,
  generics: Vec<TypeName>,
  markers: Vec<Marker>,
}

impl Param {
  pub fn of(type_name: TypeName) -> Self {
    Self {
      type_name,
      generics: Vec::new(),
      markers: Vec::new(),
    }
  }

  /// A parameter declared as a deferred factory of `target`.
  pub fn deferred(target: TypeName) -> Self {
    Self::of(deferred::TYPE_NAME).generic(target)
  }

  /// Appends a generic argument of the parameterized declared type.
  pub fn generic(mut self, type_name: TypeName) -> Self {
    self.generics.push(type_name);
    self
  }

  /// Attaches a marker to this parameter.
  pub fn marker(mut self, marker: Marker) -> Self {
    self.markers.push(marker);
    self
  }

  pub fn type_name(&self) -> TypeName {
    self.type_name
  }

  pub(crate) fn generic_args(&self) -> Option<&[TypeName]> {
    if self.generics.is_empty() {
      None
    } else {
      Some(&self.generics)
    }
  }

  pub(crate) fn qualifier(&self) -> Option<&Marker> {
    qualifier::extract(&self.markers)
  }
}

/// A declared constructor: parameter descriptors plus the produce closure
/// invoked with their resolved values.
pub struct Constructor {
  marked: bool,
  params: Vec<Param>,
  produce: ProduceFn,
}

impl Constructor {
  /// The constructor carrying the injection mark; preferred by the resolver
  /// over every other declared constructor.
  pub fn marked<T, F>(params: impl IntoIterator<Item = Param>, produce: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Args) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    Self {
      marked: true,
      params: params.into_iter().collect(),
      produce: Box::new(move |args| produce(args).map(|value| Box::new(value) as BoxedInstance)),
    }
  }

  /// The unmarked no-argument constructor; the resolver's fallback.
  pub fn no_arg<T, F>(produce: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self {
      marked: false,
      params: Vec::new(),
      produce: Box::new(move |_| Ok(Box::new(produce()) as BoxedInstance)),
    }
  }

  /// An unmarked constructor with parameters, findable by signature through
  /// [`select::matching`](crate::select::matching).
  pub fn with_params<T, F>(params: impl IntoIterator<Item = Param>, produce: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Args) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    Self {
      marked: false,
      ..Self::marked(params, produce)
    }
  }

  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub(crate) fn is_marked(&self) -> bool {
    self.marked
  }

  pub(crate) fn produce(&self, args: Args) -> Result<BoxedInstance, BoxError> {
    (self.produce)(args)
  }
}

/// An injectable field descriptor with its assignment closure.
pub struct Field {
  name: &'static str,
  type_name: TypeName,
  generics: Vec<TypeName>,
  markers: Vec<Marker>,
  assign: AssignFn,
}

impl Field {
  /// Declares field `name` of declared type `type_name`, written through
  /// `assign` once its value is resolved.
  pub fn assign<T, V, F>(name: &'static str, type_name: TypeName, assign: F) -> Self
  where
    T: Any,
    V: Any + Send + Sync,
    F: Fn(&mut T, Arc<V>) + Send + Sync + 'static,
  {
    Self {
      name,
      type_name,
      generics: Vec::new(),
      markers: Vec::new(),
      assign: Box::new(move |target, value| {
        let target = target
          .downcast_mut::<T>()
          .ok_or_else(|| format!("instance is not a `{}`", std::any::type_name::<T>()))?;
        let value = value
          .downcast::<V>()
          .map_err(|_| format!("field `{name}` cannot accept the resolved value"))?;
        assign(target, value);
        Ok(())
      }),
    }
  }

  /// Declares a field holding a deferred factory of `target`.
  pub fn deferred<T, F>(name: &'static str, target: TypeName, assign: F) -> Self
  where
    T: Any,
    F: Fn(&mut T, Arc<Deferred>) + Send + Sync + 'static,
  {
    Self::assign::<T, Deferred, F>(name, deferred::TYPE_NAME, assign).generic(target)
  }

  /// Appends a generic argument of the parameterized declared type.
  pub fn generic(mut self, type_name: TypeName) -> Self {
    self.generics.push(type_name);
    self
  }

  /// Attaches a marker to this field.
  pub fn marker(mut self, marker: Marker) -> Self {
    self.markers.push(marker);
    self
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn type_name(&self) -> TypeName {
    self.type_name
  }

  pub(crate) fn generic_args(&self) -> Option<&[TypeName]> {
    if self.generics.is_empty() {
      None
    } else {
      Some(&self.generics)
    }
  }

  pub(crate) fn markers(&self) -> &[Marker] {
    &self.markers
  }

  pub(crate) fn apply(
    &self,
    target: &mut (dyn Any + Send + Sync),
    value: Instance,
  ) -> Result<(), BoxError> {
    (self.assign)(target, value)
  }
}

/// An injectable method descriptor with its invocation closure.
pub struct Method {
  name: &'static str,
  params: Vec<Param>,
  invoke: InvokeFn,
}

impl Method {
  /// Declares method `name` taking `params`, invoked through `invoke` after
  /// construction. Methods with no parameters are still invoked, purely for
  /// their side effects.
  pub fn new<T, F>(name: &'static str, params: impl IntoIterator<Item = Param>, invoke: F) -> Self
  where
    T: Any,
    F: Fn(&mut T, Args) -> Result<(), BoxError> + Send + Sync + 'static,
  {
    Self {
      name,
      params: params.into_iter().collect(),
      invoke: Box::new(move |target, args| {
        let target = target
          .downcast_mut::<T>()
          .ok_or_else(|| format!("instance is not a `{}`", std::any::type_name::<T>()))?;
        invoke(target, args)
      }),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub(crate) fn call(
    &self,
    target: &mut (dyn Any + Send + Sync),
    args: Args,
  ) -> Result<(), BoxError> {
    (self.invoke)(target, args)
  }
}

/// The injectable fields and methods declared at one hierarchy level.
pub struct InjectionSet {
  level: TypeName,
  fields: Vec<Field>,
  methods: Vec<Method>,
}

impl InjectionSet {
  fn new(level: TypeName) -> Self {
    Self {
      level,
      fields: Vec::new(),
      methods: Vec::new(),
    }
  }

  /// The hierarchy level these injection points were declared at.
  pub fn level(&self) -> TypeName {
    self.level
  }

  pub fn fields(&self) -> &[Field] {
    &self.fields
  }

  pub fn methods(&self) -> &[Method] {
    &self.methods
  }
}

/// The registered shape of one type: scope, declared constructors and the
/// ordered per-hierarchy-level injection sets.
pub struct TypeMetadata {
  name: TypeName,
  is_abstract: bool,
  singleton: bool,
  constructors: Vec<Constructor>,
  sets: Vec<InjectionSet>,
}

impl TypeMetadata {
  /// Metadata for a concrete, constructible type.
  pub fn concrete(name: TypeName) -> Self {
    Self {
      name,
      is_abstract: false,
      singleton: false,
      constructors: Vec::new(),
      sets: Vec::new(),
    }
  }

  /// Metadata for an interface or abstract type, resolvable only through its
  /// registered implementations.
  pub fn interface(name: TypeName) -> Self {
    Self {
      is_abstract: true,
      ..Self::concrete(name)
    }
  }

  /// Marks the type singleton-scoped: at most one instance per resolver
  /// lifetime.
  pub fn singleton(mut self) -> Self {
    self.singleton = true;
    self
  }

  /// Declares a constructor.
  pub fn constructor(mut self, constructor: Constructor) -> Self {
    self.constructors.push(constructor);
    self
  }

  /// Opens a new hierarchy level for subsequent field and method
  /// declarations. Levels are injected in declaration order, so declare them
  /// base-first with the type's own level last. Without any explicit level,
  /// declarations land in a single implicit level named after the type.
  pub fn level(mut self, level: TypeName) -> Self {
    self.sets.push(InjectionSet::new(level));
    self
  }

  /// Declares an injectable field on the current level.
  pub fn field(mut self, field: Field) -> Self {
    self.current_set().fields.push(field);
    self
  }

  /// Declares an injectable method on the current level.
  pub fn method(mut self, method: Method) -> Self {
    self.current_set().methods.push(method);
    self
  }

  fn current_set(&mut self) -> &mut InjectionSet {
    if self.sets.is_empty() {
      self.sets.push(InjectionSet::new(self.name));
    }
    let last = self.sets.len() - 1;
    &mut self.sets[last]
  }

  /// The type name this metadata describes.
  pub fn name(&self) -> TypeName {
    self.name
  }

  /// The ordered injection sets, base level first. The chosen constructor is
  /// never part of a set — the resolver has already handled it by the time
  /// these are walked.
  pub fn injection_sets(&self) -> &[InjectionSet] {
    &self.sets
  }

  pub fn constructors(&self) -> &[Constructor] {
    &self.constructors
  }

  pub(crate) fn is_abstract(&self) -> bool {
    self.is_abstract
  }

  pub(crate) fn is_singleton(&self) -> bool {
    self.singleton
  }
}

impl fmt::Debug for TypeMetadata {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeMetadata")
      .field("name", &self.name)
      .field("abstract", &self.is_abstract)
      .field("singleton", &self.singleton)
      .field("constructors", &self.constructors.len())
      .field("levels", &self.sets.len())
      .finish()
  }
}
