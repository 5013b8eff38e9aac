//! Overlay Demo
//!
//! Loads a service configuration from a file, overlays `PREFIX_*`
//! environment variables on it and prints the result as JSON.
//!
//! # Addressing
//!
//! Every field of the configuration can be reached from the environment:
//!
//! ```text
//! DEMO_NAME=edge
//! DEMO_LISTENERS_0_PORT=8443          # grows `listeners` as needed
//! DEMO_UPSTREAMS_BILLING_URL=http://… # creates the `billing` entry
//! DEMO_UPSTREAMS_BILLING_TAGS=a,b,c   # scalar lists are comma-separated
//! DEMO_LOGGING_LEVEL=debug
//! ```
//!
//! # Usage
//!
//! ```bash
//! DEMO_LISTENERS_0_PORT=9000 cargo run --package overlay-demo -- --config demo.toml
//! cargo run --package overlay-demo -- --templates
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use envoverlay::logging::{self, LoggingConfig};
use envoverlay::{ConfigLoader, Overlay, templates_for};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Load a config file and overlay prefixed environment variables")]
struct Args {
    /// Configuration file (`.toml`, `.yaml` or `.yml`).
    #[arg(short, long, default_value = "demo.toml")]
    config: PathBuf,

    /// Environment variable prefix.
    #[arg(short, long, default_value = "demo")]
    prefix: String,

    /// Fail when the configuration file does not exist.
    #[arg(long)]
    require_file: bool,

    /// Print the addressable paths and exit.
    #[arg(long)]
    templates: bool,
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize, Overlay)]
#[serde(default)]
struct ServiceConfig {
    name: String,
    deployed_at: Option<DateTime<Utc>>,
    listeners: Vec<Listener>,
    upstreams: HashMap<String, Upstream>,
    logging: LoggingConfig,
}

#[derive(Debug, Default, Serialize, Deserialize, Overlay)]
#[serde(default)]
struct Listener {
    host: String,
    port: u16,
    tls: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, Overlay)]
#[serde(default, rename_all = "snake_case")]
struct Upstream {
    url: String,
    timeout_secs: Option<u64>,
    tags: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.templates {
        for template in templates_for::<ServiceConfig>()? {
            println!("{template}");
        }
        return Ok(());
    }

    let mut loader = ConfigLoader::new(&args.prefix).file(&args.config);
    if args.require_file {
        loader = loader.require_file();
    }

    let config: ServiceConfig = loader
        .load()
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    logging::init_from_config(&config.logging);
    info!(
        name = %config.name,
        listeners = config.listeners.len(),
        upstreams = config.upstreams.len(),
        "Configuration ready"
    );

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
