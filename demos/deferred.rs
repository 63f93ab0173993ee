use fibre_inject::{
  Constructor, Deferred, InheritanceIndex, MetadataRegistry, Param, Resolver, TypeMetadata,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// An expensive dependency we do not want to build up front.
struct ReportRenderer {
  id: usize,
}

// A service that only needs a renderer once a report is actually requested.
struct ReportService {
  renderer: Arc<Deferred>,
}

static RENDERERS_BUILT: AtomicUsize = AtomicUsize::new(0);

fn main() {
  let registry = MetadataRegistry::new();
  registry.register(
    TypeMetadata::concrete("ReportRenderer").constructor(Constructor::no_arg(|| {
      println!("Building a ReportRenderer...");
      ReportRenderer {
        id: RENDERERS_BUILT.fetch_add(1, Ordering::SeqCst),
      }
    })),
  );
  registry.register(TypeMetadata::concrete("ReportService").constructor(Constructor::marked(
    [Param::deferred("ReportRenderer")],
    |args| {
      Ok(ReportService {
        renderer: args.deferred(0)?,
      })
    },
  )));

  let resolver = Resolver::new(registry, InheritanceIndex::new());

  let service = resolver.get::<ReportService>("ReportService").unwrap();
  println!(
    "Service resolved; renderers built so far: {}",
    RENDERERS_BUILT.load(Ordering::SeqCst)
  );
  assert_eq!(RENDERERS_BUILT.load(Ordering::SeqCst), 0);

  // Construction happens on demand, once per call for a transient target.
  let first = service.renderer.get_as::<ReportRenderer>().unwrap();
  let second = service.renderer.get_as::<ReportRenderer>().unwrap();
  println!("First renderer: {}, second renderer: {}", first.id, second.id);
  assert!(!Arc::ptr_eq(&first, &second));
}
