//! Static type descriptions of overlay targets.
//!
//! Every type that can be reached from a configuration root implements
//! [`Overlay`]. The trait has two halves:
//!
//! - [`Overlay::shape`] describes the type as a [`TypeShape`] tree; the schema
//!   walker turns that tree into path templates.
//! - [`Overlay::apply_path`] walks a live value along path segments and
//!   assigns a raw string at the leaf.
//!
//! Records implement the trait through `#[derive(Overlay)]`; scalars and
//! std containers are covered by the library.

use std::fmt;

use crate::error::MergeError;

/// The kind of a scalar leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Strings and other text parsed with `FromStr`.
    Str,
    /// Booleans.
    Bool,
    /// Signed integers.
    Int,
    /// Unsigned integers.
    Uint,
    /// Floating point numbers.
    Float,
    /// RFC 3339 timestamps.
    Timestamp,
}

impl ScalarKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named field of a record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The annotation name used in paths.
    pub name: &'static str,
    /// Shape of the field's type.
    pub shape: TypeShape,
}

impl Field {
    /// Creates a field description.
    pub fn new(name: &'static str, shape: TypeShape) -> Self {
        Self { name, shape }
    }
}

/// Classification of a type reachable in the object graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// A single value.
    Scalar(ScalarKind),
    /// A struct with annotated fields, in declaration order.
    Record(Vec<Field>),
    /// A string-keyed map.
    Mapping(Box<TypeShape>),
    /// A growable, index-addressed list.
    Sequence(Box<TypeShape>),
    /// A value that may be absent.
    Optional(Box<TypeShape>),
}

impl TypeShape {
    /// Strips any number of `Optional` wrappers.
    pub fn unwrap_optional(&self) -> &TypeShape {
        let mut shape = self;
        while let Self::Optional(inner) = shape {
            shape = inner;
        }
        shape
    }

    /// Whether the shape (ignoring optionality) holds other values.
    pub fn is_container(&self) -> bool {
        matches!(
            self.unwrap_optional(),
            Self::Record(_) | Self::Mapping(_) | Self::Sequence(_)
        )
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Record(fields) => write!(f, "record({} fields)", fields.len()),
            Self::Mapping(elem) => write!(f, "map<{elem}>"),
            Self::Sequence(elem) => write!(f, "list<{elem}>"),
            Self::Optional(inner) => write!(f, "option<{inner}>"),
        }
    }
}

/// A type that environment values can be overlaid onto.
///
/// # Example
///
/// ```rust,ignore
/// use envoverlay::Overlay;
///
/// #[derive(Default, Overlay)]
/// struct Server {
///     port: u16,
///     #[overlay(rename = "hosts")]
///     allowed_hosts: Vec<String>,
/// }
///
/// let mut server = Server::default();
/// server.apply_path(&["port"], "8080")?;
/// ```
pub trait Overlay {
    /// Describes the type.
    fn shape() -> TypeShape;

    /// Walks `path` from this value and assigns `raw` at its end, creating
    /// missing containers on the way.
    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError>;
}

/// Fails when a scalar of type `T` is reached with segments left over.
pub fn ensure_leaf<T: ?Sized>(path: &[&str]) -> Result<(), MergeError> {
    match path.first() {
        Some(segment) => Err(MergeError::unexpected_segment::<T>(*segment)),
        None => Ok(()),
    }
}
