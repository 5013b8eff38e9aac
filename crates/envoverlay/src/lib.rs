//! # envoverlay
//!
//! Schema-driven environment variable overlay for nested configuration
//! structs.
//!
//! ## Overview
//!
//! A configuration type describes its own shape through the [`Overlay`]
//! trait. From that shape envoverlay derives every path a variable could
//! address, matches the environment against those paths, and writes the
//! matching values into a live instance of the type.
//!
//! ```text
//! ┌──────────────┐  templates  ┌──────────────┐  assignments  ┌──────────────┐
//! │    Walker    │────────────▶│   Matcher    │──────────────▶│    Merger    │──▶ &mut T
//! │  (T::shape)  │             │ (PREFIX_...) │               │ (apply_path) │
//! └──────────────┘             └──────────────┘               └──────────────┘
//! ```
//!
//! - **Walker**: Turns a [`TypeShape`] into [`PathTemplate`]s such as
//!   `servers.*.ports.#`
//! - **Matcher**: Compares `PREFIX_...` names against the templates and
//!   produces concrete dotted paths
//! - **Merger**: Walks each path through the object graph, creating map
//!   entries, growing sequences and filling options along the way
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use envoverlay::Overlay;
//!
//! #[derive(Debug, Default, Overlay)]
//! struct Config {
//!     name: String,
//!     limits: HashMap<String, u32>,
//!     peers: Vec<Peer>,
//! }
//!
//! #[derive(Debug, Default, Overlay)]
//! struct Peer {
//!     host: String,
//!     port: u16,
//! }
//!
//! // APP_NAME=demo APP_LIMITS_READ=10 APP_PEERS_1_PORT=8080
//! let mut config = Config::default();
//! envoverlay::overlay_env("app", &mut config)?;
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Enable `.toml` files in [`ConfigLoader`] (default)
//! - `yaml-config`: Enable `.yaml` / `.yml` files in [`ConfigLoader`]
//! - `json-log`: Enable the JSON log format

// Lets `#[derive(Overlay)]` output, which names `::envoverlay`, resolve inside this crate.
extern crate self as envoverlay;

pub mod engine;
pub mod env;
pub mod error;
pub mod loader;
pub mod logging;
pub mod matcher;
pub mod merger;
mod scalar;
pub mod shape;
pub mod walker;

pub use engine::{overlay_env, overlay_from};
pub use error::{LoadError, LoadResult, MergeError, OverlayError, OverlayResult};
pub use loader::ConfigLoader;
#[cfg(feature = "toml-config")]
pub use loader::load_toml;
pub use matcher::{Assignments, compare, resolve};
pub use merger::apply;
pub use shape::{Field, Overlay, ScalarKind, TypeShape};
pub use walker::{PathTemplate, Segment, derive_templates, templates_for};

pub use envoverlay_macros::Overlay;

// Re-export tracing for downstream crates
pub use tracing;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use envoverlay::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{LoadError, MergeError, OverlayError};
    pub use crate::loader::ConfigLoader;
    pub use crate::logging::{LoggingBuilder, LoggingConfig};
    pub use crate::shape::{Overlay, TypeShape};
    pub use crate::{overlay_env, overlay_from};

    pub use envoverlay_macros::Overlay;
}
