use fibre_inject::{
  Constructor, InheritanceIndex, MetadataRegistry, ResolveError, Resolver, TypeMetadata,
};

struct UnregisteredService;

struct Logger;

fn main() {
  let registry = MetadataRegistry::new();
  registry.register(TypeMetadata::concrete("Logger").constructor(Constructor::no_arg(|| Logger)));
  registry.register(TypeMetadata::interface("Mailer"));

  let mut index = InheritanceIndex::new();
  index.register("Transport", ["SmtpTransport", "SendmailTransport"]);
  let resolver = Resolver::new(registry, index);

  // --- Typed failures from the strict accessor ---
  println!("Attempting to resolve a type that was never registered...");
  match resolver.get::<UnregisteredService>("UnregisteredService") {
    Ok(_) => panic!("should not have found the service"),
    Err(error) => println!("  -> {error}"),
  }

  println!("Attempting to resolve an interface with no implementations...");
  match resolver.resolve("Mailer") {
    Ok(_) => panic!("should not have resolved"),
    Err(error @ ResolveError::NoCandidates(_)) => println!("  -> {error}"),
    Err(error) => panic!("unexpected failure: {error}"),
  }

  println!("Attempting to resolve an ambiguous abstraction...");
  match resolver.resolve("Transport") {
    Ok(_) => panic!("should not have resolved"),
    Err(error @ ResolveError::Ambiguous { .. }) => println!("  -> {error}"),
    Err(error) => panic!("unexpected failure: {error}"),
  }

  // --- The lenient accessor ---
  println!("\nNow using the lenient `get_opt()` accessor...");
  match resolver.get_opt::<UnregisteredService>("UnregisteredService") {
    Some(_) => panic!("should not have found the service"),
    None => println!("Correctly received `None` for the missing service."),
  }

  // A registered type still resolves fine.
  assert!(resolver.get_opt::<Logger>("Logger").is_some());
  println!("The registered Logger resolves as expected.");
}
