//! Applying resolved assignments to a live object graph.
//!
//! Each container type is one kind of cursor:
//!
//! | Type | Next segment | Missing element |
//! |------|--------------|-----------------|
//! | record (derived) | field name | `UnknownField` |
//! | `HashMap` / `BTreeMap` | key | built from `Default`, inserted after the rest of the path applied |
//! | `Vec` | index | sequence grown with `Default` values |
//! | `Option` | passed through | `Some(Default)` stored after the rest of the path applied |
//! | `Box` | passed through | - |
//!
//! A `Vec` reached with no segments left is a scalar list: the raw value is
//! split on commas and replaces the contents.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::error::{MergeError, OverlayError, OverlayResult};
use crate::matcher::Assignments;
use crate::shape::{Overlay, TypeShape};

/// Separator between list items in a scalar list value.
const LIST_SEPARATOR: char = ',';

/// Applies every assignment to `root` in lexicographic path order.
///
/// Stops at the first failing assignment; earlier assignments stay applied.
pub fn apply<T: Overlay>(assignments: &Assignments, root: &mut T) -> OverlayResult<()> {
    for (path, raw) in assignments {
        let segments: Vec<&str> = path.split('.').collect();
        trace!(path = %path, "Applying environment override");
        root.apply_path(&segments, raw)
            .map_err(|source| OverlayError::Assignment {
                path: path.clone(),
                source,
            })?;
    }
    Ok(())
}

/// A `None` becomes `Some` only once the rest of the path applied; a failing
/// assignment leaves it `None`.
impl<T: Overlay + Default> Overlay for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::Optional(Box::new(T::shape()))
    }

    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
        if let Some(inner) = self {
            return inner.apply_path(path, raw);
        }
        let mut inner = T::default();
        inner.apply_path(path, raw)?;
        *self = Some(inner);
        Ok(())
    }
}

impl<T: Overlay> Overlay for Box<T> {
    fn shape() -> TypeShape {
        T::shape()
    }

    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
        (**self).apply_path(path, raw)
    }
}

impl<T: Overlay + Default> Overlay for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::Sequence(Box::new(T::shape()))
    }

    fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
        let Some((segment, rest)) = path.split_first() else {
            return assign_list(self, raw);
        };

        let index: usize = segment
            .parse()
            .map_err(|source| MergeError::invalid_index(*segment, source))?;
        if index >= self.len() {
            let len = index
                .checked_add(1)
                .ok_or(MergeError::IndexOutOfRange { index })?;
            self.try_reserve(len - self.len())
                .map_err(|_| MergeError::IndexOutOfRange { index })?;
            self.resize_with(len, T::default);
        }
        self[index].apply_path(rest, raw)
    }
}

/// Replaces the contents of a scalar list with the comma-separated `raw`.
fn assign_list<T: Overlay + Default>(list: &mut Vec<T>, raw: &str) -> Result<(), MergeError> {
    if T::shape().is_container() {
        return Err(MergeError::unsupported_leaf::<Vec<T>>());
    }

    let items = raw
        .split(LIST_SEPARATOR)
        .map(|piece| {
            let mut item = T::default();
            item.apply_path(&[], piece)?;
            Ok(item)
        })
        .collect::<Result<Vec<T>, MergeError>>()?;

    *list = items;
    Ok(())
}

macro_rules! impl_mapping {
    ($($map:ident),+) => {
        $(
            impl<T: Overlay + Default> Overlay for $map<String, T> {
                fn shape() -> TypeShape {
                    TypeShape::Mapping(Box::new(T::shape()))
                }

                fn apply_path(&mut self, path: &[&str], raw: &str) -> Result<(), MergeError> {
                    let Some((key, rest)) = path.split_first() else {
                        return Err(MergeError::unsupported_leaf::<Self>());
                    };

                    // The exclusive borrow reaches the stored element, boxed or not.
                    if let Some(existing) = self.get_mut(*key) {
                        return existing.apply_path(rest, raw);
                    }

                    let mut fresh = T::default();
                    fresh.apply_path(rest, raw)?;
                    self.insert((*key).to_string(), fresh);
                    Ok(())
                }
            }
        )+
    };
}

impl_mapping!(HashMap, BTreeMap);
