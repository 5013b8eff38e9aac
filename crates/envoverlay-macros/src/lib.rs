//! Procedural macros for envoverlay.
//!
//! This crate provides:
//!
//! - `#[derive(Overlay)]` - Describes a struct's fields to the overlay engine
//!   and routes path segments to them
//!
//! # Overlay Derive Macro
//!
//! ```rust,ignore
//! use envoverlay::Overlay;
//!
//! #[derive(Default, Overlay, serde::Deserialize)]
//! #[serde(rename_all = "lowercase")]
//! pub struct Server {
//!     pub port: u16,
//!     #[serde(rename = "hosts")]
//!     pub allowed_hosts: Vec<String>,
//!     #[overlay(skip)]
//!     pub secret: String,
//! }
//! ```

mod overlay;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `envoverlay::Overlay` for a struct with named fields.
///
/// Every field type must implement `Overlay` itself. Type parameters are
/// bound by `Overlay + Default`, since `Option`, `Vec` and map fields build
/// missing elements from `Default`.
///
/// # Attributes
///
/// Container level, read from both `#[overlay(...)]` and `#[serde(...)]`:
///
/// - `rename_all = "..."` - Rename every field (`lowercase`, `UPPERCASE`,
///   `PascalCase`, `camelCase`, `snake_case`, `SCREAMING_SNAKE_CASE`,
///   `kebab-case`, `SCREAMING-KEBAB-CASE`)
///
/// Field level:
///
/// - `#[overlay(rename = "...")]` / `#[serde(rename = "...")]` - Name used in paths
/// - `#[overlay(skip)]` / `#[serde(skip)]` / `#[serde(skip_deserializing)]` -
///   Hide the field from the overlay
///
/// `#[overlay(...)]` takes precedence over `#[serde(...)]`.
#[proc_macro_derive(Overlay, attributes(overlay))]
pub fn derive_overlay(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match overlay::derive_overlay(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
