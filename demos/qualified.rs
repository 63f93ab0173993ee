use fibre_inject::{
  Constructor, InheritanceIndex, Marker, MetadataRegistry, Param, Resolver, TypeMetadata,
};
use std::sync::Arc;

// --- Abstraction and Implementations ---

struct SpareTire;
impl SpareTire {
  fn describe(&self) -> &'static str {
    "a spare tire from the trunk"
  }
}

struct RegularTire;
impl RegularTire {
  fn describe(&self) -> &'static str {
    "a regular road tire"
  }
}

struct Car {
  front: Arc<RegularTire>,
  back: Arc<SpareTire>,
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  // --- Registration ---
  // Both implementations are concrete types; the index ties them to the
  // abstract "Tire" they stand in for.
  let registry = MetadataRegistry::new();
  registry.register(TypeMetadata::concrete("SpareTire").constructor(Constructor::no_arg(|| SpareTire)));
  registry
    .register(TypeMetadata::concrete("RegularTire").constructor(Constructor::no_arg(|| RegularTire)));
  registry.register(TypeMetadata::concrete("Car").constructor(Constructor::marked(
    [
      Param::of("Tire").marker(Marker::named("regular")),
      Param::of("Tire").marker(Marker::named("spare")),
    ],
    |args| {
      Ok(Car {
        front: args.get::<RegularTire>(0)?,
        back: args.get::<SpareTire>(1)?,
      })
    },
  )));

  let mut index = InheritanceIndex::new();
  index.register("Tire", ["RegularTire", "SpareTire"]);
  let resolver = Resolver::new(registry, index);

  // --- Resolution ---
  // Each injection point chooses its implementation through its qualifier.
  let car = resolver.get::<Car>("Car").unwrap();

  println!("front: {}", car.front.describe());
  println!("back: {}", car.back.describe());

  // Qualifiers also work at the request site.
  let spare = resolver
    .get_with::<SpareTire>("Tire", &Marker::named("spare"))
    .unwrap();
  println!("requested directly: {}", spare.describe());
}
