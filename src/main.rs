use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sukashi::config::Config;
use sukashi::server::{self, AppState};
use sukashi::storage::S3ObjectStore;

/// Sukashi - image ingestion and watermarking service
#[derive(Parser, Debug)]
#[command(name = "sukashi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging subsystem
    sukashi::logging::init_subscriber(args.log_json)
        .expect("Failed to initialize logging subsystem");

    // Load configuration from file
    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        bucket = %config.storage.bucket,
        "Configuration loaded successfully"
    );

    if args.test {
        println!("Configuration OK");
        return;
    }

    // One store handle, shared by all in-flight requests
    let store = S3ObjectStore::connect(&config.storage).await;
    let state = Arc::new(AppState::new(Arc::new(store), config.limits.clone()));

    if let Err(err) = server::run(&config.server, state).await {
        tracing::error!(error = %err, "Server failed");
        std::process::exit(1);
    }
}
