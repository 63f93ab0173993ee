//! Public macros for ergonomic resolution.

/// Resolves a required type from a resolver, panicking when resolution
/// fails.
///
/// The registered name is taken from the spelled type itself, so
/// `resolve!(resolver, Car)` looks up `"Car"`. Pass an explicit name as the
/// third argument when the registered name differs.
///
/// # Panics
///
/// Panics if resolution fails. For a fallible version use
/// [`Resolver::get`](crate::Resolver::get) directly.
///
/// # Examples
///
/// ```
/// use fibre_inject::{resolve, Constructor, InheritanceIndex, MetadataRegistry, Resolver, TypeMetadata};
///
/// struct Clock {
///   ticks: u64,
/// }
///
/// let registry = MetadataRegistry::new();
/// registry.register(
///   TypeMetadata::concrete("Clock").constructor(Constructor::no_arg(|| Clock { ticks: 12 })),
/// );
/// let resolver = Resolver::new(registry, InheritanceIndex::new());
///
/// let clock = resolve!(resolver, Clock);
/// assert_eq!(clock.ticks, 12);
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving by the spelled type name: resolve!(resolver, MyService)
  ($resolver:expr, $type:ty) => {
    $resolver
      .get::<$type>(stringify!($type))
      .unwrap_or_else(|error| {
        panic!(
          "failed to resolve required type `{}`: {}",
          stringify!($type),
          error
        )
      })
  };

  // Arm for resolving under an explicit name: resolve!(resolver, MyService, "name")
  ($resolver:expr, $type:ty, $name:expr) => {
    $resolver.get::<$type>($name).unwrap_or_else(|error| {
      panic!("failed to resolve required type `{}`: {}", $name, error)
    })
  };
}
