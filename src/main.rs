//! Asset Cache Daemon - marketplace asset query and image cache
//!
//! Runs an IPC server by default; one-shot CLI commands are for testing.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use asset_cache_daemon::ipc::IpcServer;
use asset_cache_daemon::marketplace::OwnerAssets;
use asset_cache_daemon::{AssetService, Config, ERROR_FILE};

/// CLI command
#[derive(Debug)]
enum Command {
    /// Run IPC server mode (default)
    Server,
    /// Query an owner's assets (CLI mode)
    Query { address: String },
    /// Fetch an asset into the cache (CLI mode)
    Fetch { url: String },
    /// Render an SVG asset (CLI mode)
    Bitmap {
        url: String,
        width: u32,
        output: Option<String>,
    },
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"Asset Cache Daemon - marketplace asset queries and local image cache

USAGE:
    asset-cache-daemon                              # Run IPC server (default)
    asset-cache-daemon query <address>
    asset-cache-daemon fetch <url>
    asset-cache-daemon bitmap <url> <width> [out.png]
    asset-cache-daemon help

COMMANDS:
    (none)  Run IPC server mode (newline-delimited JSON on a Unix socket)
    query   Print the assets owned by an address
    fetch   Download an asset into the cache and print its file name
    bitmap  Render a cached SVG asset, optionally saving it as PNG
    help    Show this help message

ENVIRONMENT:
    ASSET_CACHE_DIR                    Cache directory
    MARKETPLACE_API_URL                Marketplace API base URL
    MARKETPLACE_CONNECT_TIMEOUT_SECS   Connect timeout (default 15)
    MARKETPLACE_REQUEST_TIMEOUT_SECS   Query timeout (default 30)
    ASSET_DOWNLOAD_READ_TIMEOUT_SECS   Download stall limit (default 30)
    ASSET_FETCH_WAIT_SECS              Wait for a concurrent download (default 120)
    ASSET_CACHE_MAX_AGE_SECS           Prune cached files older than this at startup
    ASSET_DAEMON_SOCKET                IPC socket path
    RUST_LOG                           Log level (trace, debug, info, warn, error)
"#
    );
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Server);
    }

    match args[1].as_str() {
        "query" => {
            if args.len() < 3 {
                return Err(anyhow!("Usage: asset-cache-daemon query <address>"));
            }
            Ok(Command::Query {
                address: args[2].clone(),
            })
        }
        "fetch" => {
            if args.len() < 3 {
                return Err(anyhow!("Usage: asset-cache-daemon fetch <url>"));
            }
            Ok(Command::Fetch {
                url: args[2].clone(),
            })
        }
        "bitmap" => {
            if args.len() < 4 {
                return Err(anyhow!(
                    "Usage: asset-cache-daemon bitmap <url> <width> [out.png]"
                ));
            }
            let width = args[3]
                .parse::<u32>()
                .with_context(|| format!("Invalid width: {}", args[3]))?;
            Ok(Command::Bitmap {
                url: args[2].clone(),
                width,
                output: args.get(4).cloned(),
            })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            Ok(Command::Help)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command
    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    if let Command::Help = command {
        print_help();
        return Ok(());
    }

    let config = Config::from_env()?;
    let service = Arc::new(AssetService::new(&config).context("Failed to start asset service")?);

    match command {
        Command::Server => {
            info!(cache_dir = %config.cache_dir.display(), "Starting asset daemon in IPC server mode");

            let mut ipc_server = IpcServer::new(Arc::clone(&service), config.socket_path.clone());
            if let Err(e) = ipc_server.start().await {
                error!(error = %e, "Failed to start IPC server");
                return Err(e);
            }
            let ipc_server = Arc::new(ipc_server);

            info!("Daemon ready. Waiting for commands...");

            let ipc_handle = tokio::spawn({
                let ipc_server = Arc::clone(&ipc_server);
                async move {
                    if let Err(e) = ipc_server.run().await {
                        error!(error = %e, "IPC server error");
                    }
                }
            });

            // Wait for Ctrl+C
            tokio::signal::ctrl_c().await?;

            info!("Received shutdown signal, cancelling in-flight requests...");
            ipc_server.stop().await?;
            let _ = ipc_handle.await;

            info!("Shutdown complete.");
        }
        Command::Query { address } => match service.try_query_balance(&address).await {
            Ok(document) => {
                let assets = OwnerAssets::from_document(&document).unwrap_or_default();
                println!("{} owns {} asset(s)", address, assets.assets.len());
                for asset in &assets.assets {
                    println!(
                        "  #{} {} {}",
                        asset.token_id,
                        asset.name.as_deref().unwrap_or("(unnamed)"),
                        asset.display_image().unwrap_or("")
                    );
                }
            }
            Err(e) => {
                error!(owner = %address, error = %e, "Query failed");
                return Err(e.into());
            }
        },
        Command::Fetch { url } => {
            let name = service.fetch_file(&url, &CancellationToken::new()).await;
            if name == ERROR_FILE {
                return Err(anyhow!("Failed to fetch {}", url));
            }
            println!("{}", service.cache().cache_dir().join(name).display());
        }
        Command::Bitmap { url, width, output } => {
            let bitmap = service
                .try_fetch_bitmap(&url, width, &CancellationToken::new())
                .await?;
            println!("{}x{} {:?}", bitmap.width, bitmap.height, bitmap.format);
            if let Some(output) = output {
                std::fs::write(&output, bitmap.to_png()?)
                    .with_context(|| format!("Failed to write {}", output))?;
                println!("Saved to {}", output);
            }
        }
        Command::Help => print_help(),
    }

    Ok(())
}
