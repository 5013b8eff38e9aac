//! Scalar coercion from raw environment strings.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::MergeError;
use crate::shape::{Overlay, ScalarKind, TypeShape, ensure_leaf};

/// Implements [`Overlay`](crate::Overlay) for types parsed with `FromStr`.
///
/// The types must also implement `Default`, which is used when the value has
/// to be materialized inside a container. Without a leading kind the types
/// are treated as string scalars.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Default)]
/// enum Mode { #[default] Fast, Safe }
///
/// impl std::str::FromStr for Mode { /* ... */ }
///
/// envoverlay::overlay_from_str!(Mode);
/// ```
#[macro_export]
macro_rules! overlay_from_str {
    (@kind $kind:expr; $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Overlay for $ty {
                fn shape() -> $crate::TypeShape {
                    $crate::TypeShape::Scalar($kind)
                }

                fn apply_path(
                    &mut self,
                    path: &[&str],
                    raw: &str,
                ) -> ::std::result::Result<(), $crate::MergeError> {
                    $crate::shape::ensure_leaf::<Self>(path)?;
                    *self = raw
                        .parse::<$ty>()
                        .map_err(|_| $crate::MergeError::type_mismatch(stringify!($ty), raw))?;
                    Ok(())
                }
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $crate::overlay_from_str!(@kind $crate::ScalarKind::Str; $($ty),+);
    };
}

overlay_from_str!(@kind ScalarKind::Int; i8, i16, i32, i64, i128, isize);
overlay_from_str!(@kind ScalarKind::Uint; u8, u16, u32, u64, u128, usize);
overlay_from_str!(@kind ScalarKind::Float; f32, f64);
overlay_from_str!(PathBuf);

impl Overlay for String {
    fn shape() -> TypeShape {
        TypeShape::Scalar(ScalarKind::Str)
    }

    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
        ensure_leaf::<Self>(path)?;
        raw.clone_into(self);
        Ok(())
    }
}

impl Overlay for bool {
    fn shape() -> TypeShape {
        TypeShape::Scalar(ScalarKind::Bool)
    }

    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
        ensure_leaf::<Self>(path)?;
        *self = parse_bool(raw).ok_or_else(|| MergeError::type_mismatch("bool", raw))?;
        Ok(())
    }
}

/// Accepts the conventional boolean spellings.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl Overlay for DateTime<FixedOffset> {
    fn shape() -> TypeShape {
        TypeShape::Scalar(ScalarKind::Timestamp)
    }

    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
        ensure_leaf::<Self>(path)?;
        *self = DateTime::parse_from_rfc3339(raw)
            .map_err(|_| MergeError::type_mismatch("RFC 3339 timestamp", raw))?;
        Ok(())
    }
}

impl Overlay for DateTime<Utc> {
    fn shape() -> TypeShape {
        TypeShape::Scalar(ScalarKind::Timestamp)
    }

    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
        ensure_leaf::<Self>(path)?;
        *self = DateTime::parse_from_rfc3339(raw)
            .map_err(|_| MergeError::type_mismatch("RFC 3339 timestamp", raw))?
            .with_timezone(&Utc);
        Ok(())
    }
}
