//! Constructor lookup over a type's declared constructor descriptors.
//!
//! Pure selection: nothing here resolves or constructs. All lookups return
//! `None` on no match and never panic.

use crate::metadata::{Constructor, TypeMetadata};
use crate::TypeName;

/// The constructor explicitly marked for injection, if any. Preferred by the
/// resolver over every other declared constructor.
pub fn marked(metadata: &TypeMetadata) -> Option<&Constructor> {
  metadata
    .constructors()
    .iter()
    .find(|constructor| constructor.is_marked())
}

/// The no-argument constructor, if any.
pub fn no_arg(metadata: &TypeMetadata) -> Option<&Constructor> {
  metadata
    .constructors()
    .iter()
    .find(|constructor| constructor.params().is_empty())
}

/// A constructor whose parameter types match `params` in count, order and
/// identity. An empty `params` falls back to the no-argument lookup.
pub fn matching<'a>(metadata: &'a TypeMetadata, params: &[TypeName]) -> Option<&'a Constructor> {
  if params.is_empty() {
    return no_arg(metadata);
  }
  metadata.constructors().iter().find(|constructor| {
    constructor.params().len() == params.len()
      && constructor
        .params()
        .iter()
        .zip(params)
        .all(|(declared, requested)| declared.type_name() == *requested)
  })
}
