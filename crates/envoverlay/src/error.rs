//! Error types for template derivation, merging and loading.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Merge Errors
// =============================================================================

/// Errors raised while walking a single path into the target object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The path names a field the current record does not have.
    #[error("could not find field `{field}` in {record}")]
    UnknownField {
        /// The segment that failed to resolve.
        field: String,
        /// Type name of the record that was searched.
        record: &'static str,
    },

    /// A sequence position was addressed with something other than a
    /// non-negative integer.
    #[error("could not convert `{segment}` to a sequence index: {source}")]
    InvalidIndex {
        /// The offending segment.
        segment: String,
        /// Why the segment did not parse.
        source: ParseIntError,
    },

    /// A sequence index parsed but the sequence cannot grow to reach it.
    #[error("sequence cannot grow to index {index}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
    },

    /// The raw value could not be coerced into the leaf's declared type.
    #[error("expected {expected} but got value: {value:?}")]
    TypeMismatch {
        /// Human-readable name of the expected type.
        expected: &'static str,
        /// The raw string taken from the environment.
        value: String,
    },

    /// The schema reached a leaf position with a type that cannot be set from
    /// a single string.
    #[error("type {type_name} is not supported as a leaf value")]
    UnsupportedLeafType {
        /// Type name of the leaf.
        type_name: &'static str,
    },

    /// The path continues below a scalar.
    #[error("path continues at `{segment}` below scalar type {type_name}")]
    UnexpectedSegment {
        /// First segment left over.
        segment: String,
        /// Type name of the scalar.
        type_name: &'static str,
    },
}

impl MergeError {
    /// Creates an unknown field error for record type `R`.
    pub fn unknown_field<R: ?Sized>(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
            record: std::any::type_name::<R>(),
        }
    }

    /// Creates an invalid index error.
    pub fn invalid_index(segment: impl Into<String>, source: ParseIntError) -> Self {
        Self::InvalidIndex {
            segment: segment.into(),
            source,
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &'static str, value: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            value: value.into(),
        }
    }

    /// Creates an unsupported leaf error for type `T`.
    pub fn unsupported_leaf<T: ?Sized>() -> Self {
        Self::UnsupportedLeafType {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Creates an unexpected segment error for scalar type `T`.
    pub fn unexpected_segment<T: ?Sized>(segment: impl Into<String>) -> Self {
        Self::UnexpectedSegment {
            segment: segment.into(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

// =============================================================================
// Overlay Errors
// =============================================================================

/// Errors that abort an overlay call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    /// The root type is a single value instead of a container.
    #[error("top-level element must be a record, mapping or sequence but got: {shape}")]
    UnsupportedRootShape {
        /// Description of the root shape.
        shape: String,
    },

    /// Applying one resolved assignment failed.
    #[error("cannot set `{path}`: {source}")]
    Assignment {
        /// Canonical dotted path of the assignment.
        path: String,
        /// The underlying merge failure.
        source: MergeError,
    },
}

impl OverlayError {
    /// Returns the merge failure behind an assignment error.
    pub fn merge_error(&self) -> Option<&MergeError> {
        match self {
            Self::Assignment { source, .. } => Some(source),
            Self::UnsupportedRootShape { .. } => None,
        }
    }
}

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors that can occur while loading a configuration file and overlaying
/// the environment on it.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A required configuration file is missing.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file extension has no enabled provider.
    #[error("Unsupported or disabled configuration file format: .{0}")]
    UnsupportedFormat(String),

    /// The merged sources could not be extracted into the target type.
    #[error("Failed to extract configuration: {0}")]
    Parse(Box<figment::Error>),

    /// The environment overlay failed.
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

impl From<figment::Error> for LoadError {
    fn from(err: figment::Error) -> Self {
        Self::Parse(Box::new(err))
    }
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message_quotes_value() {
        let err = MergeError::type_mismatch("int", "five");
        assert_eq!(err.to_string(), "expected int but got value: \"five\"");
    }

    #[test]
    fn test_merge_error_accessor() {
        let err = OverlayError::Assignment {
            path: "int".to_string(),
            source: MergeError::type_mismatch("int", "x"),
        };
        assert!(matches!(
            err.merge_error(),
            Some(MergeError::TypeMismatch { .. })
        ));

        let root = OverlayError::UnsupportedRootShape {
            shape: "int".to_string(),
        };
        assert!(root.merge_error().is_none());
    }
}
