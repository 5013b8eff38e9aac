//! Path template derivation from type shapes.
//!
//! A template names one scalar leaf of a type graph. Record fields contribute
//! their annotation name, mapping elements the wildcard `*` and sequence
//! elements the wildcard `#`:
//!
//! ```text
//! struct A { map: HashMap<String, B>, slice: Vec<B>, strings: Vec<String> }
//! struct B { float: f64 }
//!
//! map.*.float
//! slice.#.float
//! strings
//! ```
//!
//! Sequences of scalars are leaves themselves; their value is a
//! comma-separated list.

use std::fmt;

use tracing::trace;

use crate::error::{OverlayError, OverlayResult};
use crate::shape::{Overlay, TypeShape};

/// Wildcard standing for any mapping key.
pub const MAP_WILDCARD: char = '*';

/// Wildcard standing for any sequence index.
pub const SEQ_WILDCARD: char = '#';

/// One segment of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A record field name.
    Literal(&'static str),
    /// Any mapping key.
    MapKey,
    /// Any sequence index.
    SeqIndex,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => f.write_str(name),
            Self::MapKey => write!(f, "{MAP_WILDCARD}"),
            Self::SeqIndex => write!(f, "{SEQ_WILDCARD}"),
        }
    }
}

/// The structural path to one scalar leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Creates a template from its segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The template's segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the template has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether any segment is a wildcard.
    pub fn has_wildcards(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s, Segment::Literal(_)))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Derives every path template of `T`.
pub fn templates_for<T: Overlay>() -> OverlayResult<Vec<PathTemplate>> {
    derive_templates(&T::shape())
}

/// Derives every path template reachable from `shape`, depth first in field
/// declaration order.
///
/// Fails with [`OverlayError::UnsupportedRootShape`] when the root itself is a
/// leaf.
pub fn derive_templates(shape: &TypeShape) -> OverlayResult<Vec<PathTemplate>> {
    let mut templates = Vec::new();
    let mut path = Vec::new();
    walk(shape, &mut path, &mut templates)?;
    trace!(count = templates.len(), "Derived path templates");
    Ok(templates)
}

fn walk(
    shape: &TypeShape,
    path: &mut Vec<Segment>,
    templates: &mut Vec<PathTemplate>,
) -> OverlayResult<()> {
    match shape.unwrap_optional() {
        TypeShape::Record(fields) => {
            for field in fields {
                path.push(Segment::Literal(field.name));
                walk(&field.shape, path, templates)?;
                path.pop();
            }
            Ok(())
        }
        TypeShape::Mapping(elem) => descend(Segment::MapKey, elem, path, templates),
        TypeShape::Sequence(elem) if elem.is_container() => {
            descend(Segment::SeqIndex, elem, path, templates)
        }
        leaf => {
            if path.is_empty() {
                return Err(OverlayError::UnsupportedRootShape {
                    shape: leaf.to_string(),
                });
            }
            templates.push(PathTemplate::new(path.clone()));
            Ok(())
        }
    }
}

fn descend(
    segment: Segment,
    elem: &TypeShape,
    path: &mut Vec<Segment>,
    templates: &mut Vec<PathTemplate>,
) -> OverlayResult<()> {
    path.push(segment);
    let result = walk(elem, path, templates);
    path.pop();
    result
}
