// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Allow println! in main.rs for CLI user-facing output (validate command)
#![allow(clippy::print_stdout)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use apiforge_server::{
    load_config_file, load_or_create_config_file, ApiForgeServerBuilder, ServerConfig,
};

#[derive(Parser)]
#[command(name = "apiforge-server")]
#[command(about = "Virtual API and feed server for templated JSON endpoints")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "config/apiforge.yaml", global = true)]
    config: PathBuf,

    /// Override the server port
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server (default if no subcommand specified)
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config/apiforge.yaml")]
        config: PathBuf,

        /// Override the server port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate a configuration file without starting the server
    Validate {
        /// Path to the configuration file to validate
        #[arg(short, long, default_value = "config/apiforge.yaml")]
        config: PathBuf,

        /// Show resolved server settings with environment variables expanded
        #[arg(long)]
        show_resolved: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { config, port }) => run_server(config, port).await,
        Some(Commands::Validate {
            config,
            show_resolved,
        }) => validate_config(config, show_resolved),
        None => run_server(cli.config, cli.port).await,
    }
}

/// Load `.env` from the config file's directory so `${VAR}` references in
/// the config can be satisfied from it.
fn load_env_file(config_path: &Path) -> bool {
    let Some(config_dir) = config_path.parent() else {
        return false;
    };
    let env_file = config_dir.join(".env");
    if !env_file.exists() {
        return false;
    }
    match dotenvy::from_path(&env_file) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Warning: Failed to load .env file: {e}");
            false
        }
    }
}

/// RUST_LOG wins over the configured level.
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Warning: Failed to initialize logging: {e}");
    }
}

async fn run_server(config_path: PathBuf, port_override: Option<u16>) -> Result<()> {
    let env_file_loaded = load_env_file(&config_path);

    let config = if config_path.exists() {
        let config = load_config_file(&config_path)?;
        init_logging(&config.log_level);
        config
    } else {
        init_logging("info");
        warn!(
            "Config file '{}' not found. Creating default configuration.",
            config_path.display()
        );
        let config = load_or_create_config_file(&config_path)?;
        info!(
            "Default configuration created at: {}",
            config_path.display()
        );
        info!("Please edit the configuration file to add providers, APIs and feeds.");
        config
    };

    info!("Starting ApiForge Server");
    debug!("Debug logging is enabled");

    if env_file_loaded {
        info!("Loaded environment variables from .env file");
    }
    info!("Config file: {}", config_path.display());

    let mut builder = ApiForgeServerBuilder::new().with_config(config);
    if let Some(port) = port_override {
        info!("Using command line port {port}");
        builder = builder.with_port(port);
    }

    let server = builder.build().await?;
    server.run().await
}

/// Validate a configuration file
fn validate_config(config_path: PathBuf, show_resolved: bool) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[ERROR] Configuration file not found: {}",
            config_path.display()
        );
        std::process::exit(1);
    }

    load_env_file(&config_path);

    match load_config_file(&config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid");
            println!();
            print_summary(&config);

            if show_resolved {
                println!();
                println!("Resolved server settings:");
                println!("  Host: {}", config.host);
                println!("  Port: {}", config.port);
                println!("  Log Level: {}", config.log_level);
                println!("  Resolution Timeout: {}s", config.resolution_timeout_secs);
                println!(
                    "  Blob Store: {} (bucket '{}')",
                    config.blob_store.root.display(),
                    config.blob_store.bucket
                );
            }

            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Configuration is invalid:");
            println!("  {e}");
            std::process::exit(1);
        }
    }
}

fn print_summary(config: &ServerConfig) {
    let active_feeds = config.feeds.iter().filter(|f| f.is_active).count();

    println!("Summary:");
    println!("  Providers: {}", config.providers.len());
    println!("  Databases: {}", config.databases.len());
    println!("  APIs: {}", config.apis.len());
    println!("  Feeds: {} ({active_feeds} active)", config.feeds.len());
}
