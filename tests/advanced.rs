use fibre_inject::{
  deferred, BoxError, Constructor, Deferred, Field, InheritanceIndex, InjectionPoint, Marker,
  MetadataRegistry, Method, Param, ResolveError, Resolver, TypeMetadata,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// --- Advanced Test Fixtures ---

struct SpareTire {
  pressure: u32,
}

struct RegularTire;

struct Engine {
  serial: usize,
}

/// Registers `SpareTire` with a zero-parameter injectable method, so tests
/// can tell a bare construction from a fully injected one.
fn register_spare_tire(registry: &MetadataRegistry) {
  registry.register(
    TypeMetadata::concrete("SpareTire")
      .constructor(Constructor::no_arg(|| SpareTire { pressure: 0 }))
      .method(Method::new("inflate", [], |tire: &mut SpareTire, _| {
        tire.pressure = 32;
        Ok(())
      })),
  );
}

/// Registers a counting `Engine` constructor and returns the counter.
fn register_engine(registry: &MetadataRegistry, singleton: bool) -> Arc<AtomicUsize> {
  let built = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&built);
  let mut metadata = TypeMetadata::concrete("Engine");
  if singleton {
    metadata = metadata.singleton();
  }
  registry.register(metadata.constructor(Constructor::no_arg(move || Engine {
    serial: counter.fetch_add(1, Ordering::SeqCst),
  })));
  built
}

// --- Abstraction Resolution ---

#[test]
fn interface_with_a_single_candidate_resolves_transparently() {
  let registry = MetadataRegistry::new();
  register_spare_tire(&registry);
  let mut index = InheritanceIndex::new();
  index.register("Tire", ["SpareTire"]);
  let resolver = Resolver::new(registry, index);

  let tire = resolver.get::<SpareTire>("Tire").unwrap();

  // The candidate came back fully injected, not just constructed.
  assert_eq!(tire.pressure, 32);
}

#[test]
fn interface_with_zero_candidates_fails() {
  let registry = MetadataRegistry::new();
  registry.register(TypeMetadata::interface("Radio"));
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let error = resolver.resolve("Radio").unwrap_err();

  assert!(matches!(error, ResolveError::NoCandidates("Radio")));
}

#[test]
fn interface_with_undisambiguated_candidates_fails() {
  let registry = MetadataRegistry::new();
  register_spare_tire(&registry);
  registry
    .register(TypeMetadata::concrete("RegularTire").constructor(Constructor::no_arg(|| RegularTire)));
  let mut index = InheritanceIndex::new();
  index.register("Tire", ["RegularTire", "SpareTire"]);
  let resolver = Resolver::new(registry, index);

  let error = resolver.resolve("Tire").unwrap_err();

  assert!(matches!(
    error,
    ResolveError::Ambiguous {
      type_name: "Tire",
      count: 2
    }
  ));
}

#[test]
fn qualifier_disambiguates_among_candidates() {
  struct Garage {
    tire: Arc<SpareTire>,
  }
  let registry = MetadataRegistry::new();
  register_spare_tire(&registry);
  registry
    .register(TypeMetadata::concrete("RegularTire").constructor(Constructor::no_arg(|| RegularTire)));
  registry.register(TypeMetadata::concrete("Garage").constructor(Constructor::marked(
    [Param::of("Tire").marker(Marker::named("spare"))],
    |args| {
      Ok(Garage {
        tire: args.get::<SpareTire>(0)?,
      })
    },
  )));
  let mut index = InheritanceIndex::new();
  index.register("Tire", ["RegularTire", "SpareTire"]);
  let resolver = Resolver::new(registry, index);

  let garage = resolver.get::<Garage>("Garage").unwrap();
  assert_eq!(garage.tire.pressure, 32);

  // The same narrowing works at the request site.
  let tire = resolver
    .get_with::<SpareTire>("Tire", &Marker::named("spare"))
    .unwrap();
  assert_eq!(tire.pressure, 32);
}

#[test]
fn singleton_candidate_is_cached_under_its_concrete_name() {
  let registry = MetadataRegistry::new();
  registry.register(
    TypeMetadata::concrete("SpareTire")
      .singleton()
      .constructor(Constructor::no_arg(|| SpareTire { pressure: 30 })),
  );
  let mut index = InheritanceIndex::new();
  index.register("Tire", ["SpareTire"]);
  let resolver = Resolver::new(registry, index);

  let via_interface = resolver.get::<SpareTire>("Tire").unwrap();
  let again = resolver.get::<SpareTire>("Tire").unwrap();
  let direct = resolver.get::<SpareTire>("SpareTire").unwrap();

  assert!(Arc::ptr_eq(&via_interface, &again));
  assert!(Arc::ptr_eq(&via_interface, &direct));
}

// --- Deferred Providers ---

#[test]
fn deferred_provider_never_constructs_eagerly() {
  struct Workshop {
    engines: Arc<Deferred>,
  }
  let registry = MetadataRegistry::new();
  let built = register_engine(&registry, false);
  registry.register(TypeMetadata::concrete("Workshop").constructor(Constructor::marked(
    [Param::deferred("Engine")],
    |args| {
      Ok(Workshop {
        engines: args.deferred(0)?,
      })
    },
  )));
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let workshop = resolver.get::<Workshop>("Workshop").unwrap();
  assert_eq!(built.load(Ordering::SeqCst), 0);

  let first = workshop.engines.get_as::<Engine>().unwrap();
  let second = workshop.engines.get_as::<Engine>().unwrap();

  // A non-singleton target is constructed anew on every call.
  assert_eq!(built.load(Ordering::SeqCst), 2);
  assert!(!Arc::ptr_eq(&first, &second));
  assert_eq!(first.serial, 0);
  assert_eq!(second.serial, 1);
}

#[test]
fn deferred_provider_on_a_singleton_target_returns_the_cached_instance() {
  let registry = MetadataRegistry::new();
  let built = register_engine(&registry, true);
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let provider = resolver
    .resolve_with(deferred::TYPE_NAME, None, Some(&["Engine"]))
    .unwrap()
    .downcast::<Deferred>()
    .unwrap();
  assert_eq!(built.load(Ordering::SeqCst), 0);

  let first = provider.get_as::<Engine>().unwrap();
  let second = provider.get_as::<Engine>().unwrap();

  assert_eq!(built.load(Ordering::SeqCst), 1);
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn deferred_field_injection_threads_the_generic_target() {
  struct Depot {
    engines: Option<Arc<Deferred>>,
  }
  let registry = MetadataRegistry::new();
  let built = register_engine(&registry, false);
  registry.register(
    TypeMetadata::concrete("Depot")
      .constructor(Constructor::no_arg(|| Depot { engines: None }))
      .field(Field::deferred("engines", "Engine", |depot: &mut Depot, provider| {
        depot.engines = Some(provider);
      })),
  );
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let depot = resolver.get::<Depot>("Depot").unwrap();
  assert_eq!(built.load(Ordering::SeqCst), 0);

  let provider = depot.engines.as_ref().unwrap();
  assert_eq!(provider.target(), "Engine");
  provider.get_as::<Engine>().unwrap();
  assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn deferred_request_without_a_target_fails() {
  let resolver = Resolver::new(MetadataRegistry::new(), InheritanceIndex::new());

  let error = resolver
    .resolve_with(deferred::TYPE_NAME, None, None)
    .unwrap_err();

  assert!(matches!(error, ResolveError::MissingTarget));
}

#[test]
fn deferred_provider_reports_a_dropped_resolver() {
  let provider = {
    let registry = MetadataRegistry::new();
    register_engine(&registry, false);
    let resolver = Resolver::new(registry, InheritanceIndex::new());
    resolver
      .resolve_with(deferred::TYPE_NAME, None, Some(&["Engine"]))
      .unwrap()
      .downcast::<Deferred>()
      .unwrap()
  };

  let error = provider.get().unwrap_err();

  assert!(matches!(error, ResolveError::ResolverGone));
}

// --- Construction Order and Injection ---

#[test]
fn construction_is_depth_first_left_to_right() {
  struct Piston;
  struct Motor {
    _piston: Arc<Piston>,
  }
  struct Chassis;
  struct Vehicle {
    _motor: Arc<Motor>,
    _chassis: Arc<Chassis>,
  }

  let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
  let registry = MetadataRegistry::new();

  let log = Arc::clone(&order);
  registry.register(TypeMetadata::concrete("Piston").constructor(Constructor::no_arg(move || {
    log.lock().unwrap().push("Piston");
    Piston
  })));
  let log = Arc::clone(&order);
  registry.register(TypeMetadata::concrete("Motor").constructor(Constructor::marked(
    [Param::of("Piston")],
    move |args| {
      log.lock().unwrap().push("Motor");
      Ok(Motor {
        _piston: args.get::<Piston>(0)?,
      })
    },
  )));
  let log = Arc::clone(&order);
  registry.register(TypeMetadata::concrete("Chassis").constructor(Constructor::no_arg(move || {
    log.lock().unwrap().push("Chassis");
    Chassis
  })));
  let log = Arc::clone(&order);
  registry.register(TypeMetadata::concrete("Vehicle").constructor(Constructor::marked(
    [Param::of("Motor"), Param::of("Chassis")],
    move |args| {
      log.lock().unwrap().push("Vehicle");
      Ok(Vehicle {
        _motor: args.get::<Motor>(0)?,
        _chassis: args.get::<Chassis>(1)?,
      })
    },
  )));
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  resolver.get::<Vehicle>("Vehicle").unwrap();

  // The whole Motor subtree completes before Chassis starts.
  assert_eq!(
    *order.lock().unwrap(),
    vec!["Piston", "Motor", "Chassis", "Vehicle"]
  );
}

#[test]
fn field_injection_observes_the_constructed_instance() {
  struct Amplifier {
    volume: u32,
  }
  struct Stereo {
    base: u32,
    label: String,
    amplifier: Option<Arc<Amplifier>>,
  }
  let registry = MetadataRegistry::new();
  registry.register(
    TypeMetadata::concrete("Amplifier")
      .constructor(Constructor::no_arg(|| Amplifier { volume: 4 })),
  );
  registry.register(
    TypeMetadata::concrete("Stereo")
      .constructor(Constructor::no_arg(|| Stereo {
        base: 11,
        label: String::new(),
        amplifier: None,
      }))
      .field(Field::assign(
        "amplifier",
        "Amplifier",
        |stereo: &mut Stereo, amplifier: Arc<Amplifier>| {
          // Constructor state is already in place when fields arrive.
          stereo.label = format!("base {} amp {}", stereo.base, amplifier.volume);
          stereo.amplifier = Some(amplifier);
        },
      )),
  );
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let stereo = resolver.get::<Stereo>("Stereo").unwrap();

  assert_eq!(stereo.label, "base 11 amp 4");
  assert!(stereo.amplifier.is_some());
}

#[test]
fn method_injection_resolves_parameters_like_a_constructor() {
  struct Amplifier {
    volume: u32,
  }
  struct Stereo {
    volume: u32,
  }
  let registry = MetadataRegistry::new();
  registry.register(
    TypeMetadata::concrete("Amplifier")
      .constructor(Constructor::no_arg(|| Amplifier { volume: 7 })),
  );
  registry.register(
    TypeMetadata::concrete("Stereo")
      .constructor(Constructor::no_arg(|| Stereo { volume: 0 }))
      .method(Method::new(
        "install",
        [Param::of("Amplifier")],
        |stereo: &mut Stereo, args| {
          stereo.volume = args.get::<Amplifier>(0)?.volume;
          Ok(())
        },
      )),
  );
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let stereo = resolver.get::<Stereo>("Stereo").unwrap();

  assert_eq!(stereo.volume, 7);
}

#[test]
fn hierarchy_levels_inject_base_first() {
  struct Convertible {
    log: Vec<&'static str>,
  }
  let registry = MetadataRegistry::new();
  registry.register(
    TypeMetadata::concrete("Convertible")
      .constructor(Constructor::no_arg(|| Convertible { log: Vec::new() }))
      .level("Vehicle")
      .method(Method::new("mark_vehicle", [], |c: &mut Convertible, _| {
        c.log.push("Vehicle");
        Ok(())
      }))
      .level("Car")
      .method(Method::new("mark_car", [], |c: &mut Convertible, _| {
        c.log.push("Car");
        Ok(())
      }))
      .level("Convertible")
      .method(Method::new("mark_convertible", [], |c: &mut Convertible, _| {
        c.log.push("Convertible");
        Ok(())
      })),
  );
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let convertible = resolver.get::<Convertible>("Convertible").unwrap();

  assert_eq!(convertible.log, vec!["Vehicle", "Car", "Convertible"]);
}

// --- Failure Paths ---

#[test]
fn cyclic_dependencies_fail_deterministically() {
  struct Chicken;
  struct Egg;
  let registry = MetadataRegistry::new();
  registry.register(TypeMetadata::concrete("Chicken").constructor(Constructor::marked(
    [Param::of("Egg")],
    |_args| Ok(Chicken),
  )));
  registry.register(TypeMetadata::concrete("Egg").constructor(Constructor::marked(
    [Param::of("Chicken")],
    |_args| Ok(Egg),
  )));
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let error = resolver.resolve("Chicken").unwrap_err();

  assert!(matches!(error.root(), ResolveError::Cycle("Chicken")));
}

#[test]
fn dependency_failures_name_the_injection_point() {
  struct Root;
  let registry = MetadataRegistry::new();
  registry.register(TypeMetadata::concrete("Root").constructor(Constructor::marked(
    [Param::of("MissingPart")],
    |_args| Ok(Root),
  )));
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let error = resolver.resolve("Root").unwrap_err();

  assert!(matches!(
    error,
    ResolveError::Dependency {
      type_name: "Root",
      point: InjectionPoint::Constructor { index: 0 },
      ..
    }
  ));
  assert!(matches!(error.root(), ResolveError::NotRegistered("MissingPart")));
}

#[test]
fn constructor_failures_carry_the_user_error() {
  struct Flaky;
  let registry = MetadataRegistry::new();
  registry.register(TypeMetadata::concrete("Flaky").constructor(Constructor::marked(
    [],
    |_args| -> Result<Flaky, BoxError> { Err("boom".into()) },
  )));
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let error = resolver.resolve("Flaky").unwrap_err();

  assert!(matches!(error, ResolveError::Construction { type_name: "Flaky", .. }));
  assert!(error.to_string().contains("boom"));
}

// --- Concurrency and Isolation ---

#[test]
fn concurrent_singleton_resolution_constructs_exactly_once() {
  struct Shared;
  let built = Arc::new(AtomicUsize::new(0));
  let registry = MetadataRegistry::new();
  let counter = Arc::clone(&built);
  registry.register(
    TypeMetadata::concrete("Shared")
      .singleton()
      .constructor(Constructor::no_arg(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        // Widen the race window.
        thread::sleep(Duration::from_millis(50));
        Shared
      })),
  );
  let resolver = Resolver::new(registry, InheritanceIndex::new());

  thread::scope(|scope| {
    for _ in 0..8 {
      let resolver = resolver.clone();
      scope.spawn(move || {
        resolver.get::<Shared>("Shared").unwrap();
      });
    }
  });

  assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn resolvers_are_isolated_from_each_other() {
  struct Config;
  let build = || {
    let registry = MetadataRegistry::new();
    registry.register(
      TypeMetadata::concrete("Config")
        .singleton()
        .constructor(Constructor::no_arg(|| Config)),
    );
    Resolver::new(registry, InheritanceIndex::new())
  };
  let first_resolver = build();
  let second_resolver = build();

  let first = first_resolver.get::<Config>("Config").unwrap();
  let second = second_resolver.get::<Config>("Config").unwrap();

  // Each resolver owns its own singleton cache.
  assert!(!Arc::ptr_eq(&first, &second));
}
