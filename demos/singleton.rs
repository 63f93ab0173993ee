use fibre_inject::{Constructor, InheritanceIndex, MetadataRegistry, Resolver, TypeMetadata};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  let registry = MetadataRegistry::new();

  // --- Singleton Registration ---
  // This constructor will only ever run ONCE per resolver.
  registry.register(
    TypeMetadata::concrete("SingletonTracker")
      .singleton()
      .constructor(Constructor::no_arg(|| {
        println!("Creating SINGLETON RequestTracker...");
        RequestTracker {
          id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
        }
      })),
  );

  // --- Transient Registration ---
  // This constructor runs EVERY time the type is resolved.
  registry.register(
    TypeMetadata::concrete("TransientTracker").constructor(Constructor::no_arg(|| {
      println!("Creating TRANSIENT RequestTracker...");
      RequestTracker {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      }
    })),
  );

  let resolver = Resolver::new(registry, InheritanceIndex::new());

  println!("--- Resolving Singletons ---");
  let s1 = resolver.get::<RequestTracker>("SingletonTracker").unwrap();
  let s2 = resolver.get::<RequestTracker>("SingletonTracker").unwrap();
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert!(
    Arc::ptr_eq(&s1, &s2),
    "Singleton instances should be identical"
  );
  println!("Singleton instances are the same pointer, as expected.\n");

  println!("--- Resolving Transients ---");
  let t1 = resolver.get::<RequestTracker>("TransientTracker").unwrap();
  let t2 = resolver.get::<RequestTracker>("TransientTracker").unwrap();
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert!(
    !Arc::ptr_eq(&t1, &t2),
    "Transient instances should be different"
  );
  println!("Transient instances are different pointers, as expected.");
}
