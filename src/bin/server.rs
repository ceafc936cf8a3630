//! kvstr Server Binary
//!
//! Starts the TCP server for kvstr.

use clap::Parser;
use kvstr::network::Server;
use kvstr::{Config, LogLevel};
use tracing_subscriber::{fmt, EnvFilter};

/// kvstr Server
#[derive(Parser, Debug)]
#[command(name = "kvstr-server")]
#[command(about = "In-memory key-value store over a length-prefixed text protocol")]
#[command(version)]
struct Args {
    /// Log level (INFO, WARN, ERR, DEBUG, FATAL)
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<String>,

    /// Listen address (host:port)
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Initial store capacity (slots)
    #[arg(short, long, default_value = "1024")]
    capacity: usize,

    /// Maximum request size in bytes
    #[arg(long, default_value = "5242880")]
    max_request_size: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    let args = Args::parse();

    // Resolve the level before logging starts; report a bad name afterwards
    let parsed_level = args.log_level.as_deref().map(str::parse::<LogLevel>);
    let log_level = match parsed_level {
        Some(Ok(level)) => level,
        _ => LogLevel::Info,
    };

    // Initialize tracing/logging
    let filter = match parsed_level {
        Some(_) => EnvFilter::builder()
            .with_default_directive(log_level.as_filter().into())
            .parse_lossy(""),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    if let Some(Err(e)) = &parsed_level {
        tracing::warn!("Unknown log level. Defaulting to INFO. ({})", e);
    }
    if parsed_level.is_some() {
        tracing::info!("Log level set to {}.", log_level);
    }

    tracing::info!("kvstr Server v{}", kvstr::VERSION);
    tracing::info!("Starting server.");

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .initial_capacity(args.capacity)
        .max_request_size(args.max_request_size)
        .max_connections(args.max_connections)
        .log_level(log_level)
        .build();

    // Bind listener and create the store
    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler
    let token = server.shutdown_token();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received interrupt signal. Shutting down server.");
        token.cancel();
    }) {
        tracing::error!("Failed to install interrupt handler: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete.");
}
