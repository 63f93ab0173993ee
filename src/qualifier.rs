//! Injection-point markers and the qualifier extraction rule.

use crate::core::short_name;
use crate::TypeName;

/// A marker attached to an injection point.
///
/// Markers mirror the annotations this engine's metadata is distilled from:
/// each carries the name of its own type, optionally an explicit name value,
/// and a flag stating whether its kind acts as a disambiguation tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
  name: TypeName,
  value: Option<&'static str>,
  qualifier: bool,
}

impl Marker {
  /// A naming tag with an explicit value, e.g. `Marker::named("spare")`.
  pub fn named(value: &'static str) -> Self {
    Self {
      name: "Named",
      value: Some(value),
      qualifier: true,
    }
  }

  /// A disambiguation tag identified by its own type name alone.
  pub fn qualifier(name: TypeName) -> Self {
    Self {
      name,
      value: None,
      qualifier: true,
    }
  }

  /// A marker that is not a disambiguation tag; extraction ignores it.
  pub fn plain(name: TypeName) -> Self {
    Self {
      name,
      value: None,
      qualifier: false,
    }
  }

  /// Whether this marker's kind is a disambiguation tag.
  pub fn is_qualifier(&self) -> bool {
    self.qualifier
  }

  /// The name prefix this marker contributes when disambiguating: its
  /// explicit value when present, else its own short type name.
  pub fn prefix(&self) -> &str {
    self.value.unwrap_or_else(|| short_name(self.name))
  }
}

/// Picks the marker honoured as the qualifier of one injection point.
///
/// The first qualifier-kind marker wins; later markers are ignored even if
/// they are also qualifier-kind.
pub fn extract(markers: &[Marker]) -> Option<&Marker> {
  markers.iter().find(|marker| marker.is_qualifier())
}
