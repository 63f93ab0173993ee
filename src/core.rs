//! Internal plumbing shared by the resolver: cycle bookkeeping and name
//! helpers.

use crate::error::ResolveError;
use crate::TypeName;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::thread::{self, ThreadId};

/// The set of type names currently being resolved, keyed per thread so that
/// independent call trees do not observe each other.
#[derive(Default)]
pub(crate) struct InProgress {
  entries: Mutex<HashSet<(ThreadId, TypeName)>>,
}

/// An RAII guard marking one type as in-flight for the current call tree.
///
/// Entering a type that is already in-flight on this thread means the
/// dependency graph loops back onto itself; resolution stops with
/// [`ResolveError::Cycle`] instead of recursing without bound. Dropping the
/// guard removes the entry again.
pub(crate) struct ResolutionGuard<'a> {
  stack: &'a InProgress,
  key: (ThreadId, TypeName),
}

impl<'a> ResolutionGuard<'a> {
  pub(crate) fn enter(stack: &'a InProgress, type_name: TypeName) -> Result<Self, ResolveError> {
    let key = (thread::current().id(), type_name);
    // `insert` returns `false` if the key was already present.
    if !stack.entries.lock().insert(key) {
      return Err(ResolveError::Cycle(type_name));
    }
    Ok(Self { stack, key })
  }
}

impl Drop for ResolutionGuard<'_> {
  fn drop(&mut self) {
    self.stack.entries.lock().remove(&self.key);
  }
}

/// The segment after the last `::`, mirroring an unqualified simple name.
pub(crate) fn short_name(name: &str) -> &str {
  name.rsplit("::").next().unwrap_or(name)
}
