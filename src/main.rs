//! Admin service entry point.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use admin_service::cache::RedisCache;
use admin_service::config::Config;
use admin_service::metrics;
use admin_service::utils::shutdown_signal;
use admin_service::{AdminServer, ServiceError};

/// Administrative HTTP service.
#[derive(Parser, Debug)]
#[command(name = "admin-service")]
#[command(about = "Health check and admin endpoints for the backend")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Run the HTTP service (default).
    Serve,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Read .env once, before RUST_LOG and the config loader look at the environment
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("admin_service=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(args.port),
        Some(Command::Serve) | None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration.
fn load_config(port_override: Option<u16>) -> Result<Config, ServiceError> {
    let mut config = Config::load()?;

    if let Some(port) = port_override {
        config.port = port;
    }

    config.validate().map_err(ServiceError::InvalidConfig)?;
    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config(port_override: Option<u16>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ADMIN SERVICE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match load_config(port_override) {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration check failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Environment: {}", config.environment());
    if config.is_development() {
        println!("  CORS Origins: any (development)");
    } else {
        println!("  CORS Origins: {}", config.cors_origins().join(", "));
    }
    println!("  Redis URL: {}", config.redis_url);
    println!("  Shutdown Timeout: {}s", config.shutdown_timeout_secs);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the admin service until SIGINT or SIGTERM.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let server = match start(port_override).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start admin service: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(shutdown_signal()).await {
        error!("Admin service failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Load configuration, connect the cache and bind the listener.
async fn start(port_override: Option<u16>) -> Result<AdminServer, ServiceError> {
    info!("Loading configuration...");
    let config = load_config(port_override)?;

    let metrics_handle = if config.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Metrics disabled, recorder install failed: {}", e);
                None
            }
        }
    } else {
        None
    };

    let cache = RedisCache::new(&config.redis_url)?;
    AdminServer::start(config, Arc::new(cache), metrics_handle).await
}
