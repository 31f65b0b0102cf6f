//! IPC Server - Unix socket server for local clients
//!
//! Handles incoming connections and dispatches commands to the AssetService.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::ERROR_FILE;
use crate::ipc::protocol::{parse_command, serialize_response, Command, Response, PROTOCOL_VERSION};
use crate::service::AssetService;

/// IPC Server that listens for commands from local clients
pub struct IpcServer {
    /// Asset service handling the commands
    service: Arc<AssetService>,
    /// Socket path
    socket_path: PathBuf,
    /// Socket listener
    listener: Option<UnixListener>,
    /// Active connections counter
    connection_count: Arc<RwLock<u32>>,
    /// Cancelled on stop; every connection holds a child token that is
    /// also cancelled when its client disconnects
    shutdown: CancellationToken,
}

impl IpcServer {
    /// Create a new IPC server
    pub fn new(service: Arc<AssetService>, socket_path: PathBuf) -> Self {
        Self {
            service,
            socket_path,
            listener: None,
            connection_count: Arc::new(RwLock::new(0)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start the IPC server
    pub async fn start(&mut self) -> Result<()> {
        // Clean up any existing socket file
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .context("Failed to remove existing socket file")?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", self.socket_path))?;

        info!(socket_path = %self.socket_path.display(), "IPC server started");

        self.listener = Some(listener);
        Ok(())
    }

    /// Run the server loop, accepting connections until stopped
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("Server not started")?;

        loop {
            let accepted = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, _)) => {
                    let service = Arc::clone(&self.service);
                    let connection_count = Arc::clone(&self.connection_count);
                    let cancel = self.shutdown.child_token();

                    // Spawn a new task to handle this connection
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, service, connection_count, cancel).await {
                            error!(error = %e, "Connection handler error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }

        Ok(())
    }

    /// Token that stops the server and aborts in-flight work when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop the IPC server and clean up
    pub async fn stop(&self) -> Result<()> {
        self.shutdown.cancel();
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).context("Failed to remove socket file")?;
        }
        info!("IPC server stopped");
        Ok(())
    }

    /// Get the number of active connections
    pub async fn connection_count(&self) -> u32 {
        *self.connection_count.read().await
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

/// Handle a single client connection
async fn handle_connection(
    stream: UnixStream,
    service: Arc<AssetService>,
    connection_count: Arc<RwLock<u32>>,
    cancel: CancellationToken,
) -> Result<()> {
    {
        let mut count = connection_count.write().await;
        *count += 1;
        debug!(count = *count, "New connection");
    }

    let (reader, mut writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();

    // Read commands line by line (newline-delimited JSON)
    loop {
        line.clear();
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = buf_reader.read_line(&mut line) => read,
        };

        match read {
            Ok(0) => {
                debug!("Connection closed by client");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                debug!(command = %trimmed, "Received command");

                let response = match parse_command(trimmed.as_bytes()) {
                    Ok(command) => {
                        let work = process_command(command, &service, &cancel);
                        tokio::pin!(work);

                        // Watch the socket while the command runs so a client
                        // that goes away aborts its downloads
                        let mut watching = true;
                        loop {
                            tokio::select! {
                                response = &mut work => break response,
                                eof = client_closed(&mut buf_reader), if watching => {
                                    if eof {
                                        debug!("Client disconnected, cancelling in-flight command");
                                        cancel.cancel();
                                    }
                                    watching = false;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, command = %trimmed, "Failed to parse command");
                        Response::Error {
                            error: format!("Invalid command: {}", e),
                        }
                    }
                };

                match serialize_response(&response) {
                    Ok(json) => {
                        if let Err(e) = writer.write_all(&json).await {
                            error!(error = %e, "Failed to write response");
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to serialize response");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to read from socket");
                break;
            }
        }
    }

    {
        let mut count = connection_count.write().await;
        *count = count.saturating_sub(1);
        debug!(count = *count, "Connection ended");
    }

    Ok(())
}

/// Resolve once the client sends more data (false) or disconnects (true)
///
/// Pending input stays buffered for the next `read_line`.
async fn client_closed<R: AsyncBufRead + Unpin>(reader: &mut R) -> bool {
    match reader.fill_buf().await {
        Ok(buf) => buf.is_empty(),
        Err(_) => true,
    }
}

/// Process a command and return a response
pub async fn process_command(
    command: Command,
    service: &AssetService,
    cancel: &CancellationToken,
) -> Response {
    match command {
        Command::QueryBalance { address } => {
            info!(owner = %address, "Processing queryBalance command");
            let assets = service.query_balance(&address).await;
            Response::Balance { address, assets }
        }

        Command::FetchFile { url } => {
            info!(url = %url, "Processing fetchFile command");
            let name = service.fetch_file(&url, cancel).await;
            let path = if name == ERROR_FILE {
                None
            } else {
                let path = service.cache().cache_dir().join(&name);
                path.is_file().then(|| path.to_string_lossy().into_owned())
            };
            Response::File { name, path }
        }

        Command::FetchBitmap { url, width, output } => {
            info!(url = %url, width = width, "Processing fetchBitmap command");
            let bitmap = service.fetch_bitmap(&url, width, cancel).await;

            if let Some(output) = &output {
                let written = bitmap
                    .to_png()
                    .map_err(anyhow::Error::from)
                    .and_then(|png| {
                        std::fs::write(output, png)
                            .with_context(|| format!("Failed to write {}", output))
                    });
                if let Err(e) = written {
                    return Response::Error {
                        error: format!("Failed to save bitmap: {:#}", e),
                    };
                }
            }

            Response::Bitmap {
                width: bitmap.width,
                height: bitmap.height,
                format: bitmap.format,
                placeholder: bitmap.is_placeholder(),
                output,
            }
        }

        Command::GetStatus => {
            debug!("Processing getStatus command");
            let (cache_hits, cache_misses) = service.cache().stats();

            Response::Status {
                version: PROTOCOL_VERSION,
                healthy: service.cache().cache_dir().is_dir(),
                cached_files: service.cache().cached_file_count(),
                tracked_addresses: service.throttle().tracked_owners(),
                cache_hits,
                cache_misses,
            }
        }
    }
}
