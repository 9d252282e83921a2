//! # Campus Server
//!
//! Axum HTTP surface for the discussion access gate, feature switches and
//! the certificate queue, plus the certificate worker that drains the queue.
//!
//! ## Example
//! ```no_run
//! use campus_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod gateway;
mod router;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum_server::Handle;
use campus::domain::config::ApiConfig;
use campus::features::certificates::memory::{
    InMemoryUsers, InMemoryVerification, RecordingGenerator,
};
use campus::features::certificates::{CertificateTask, CertificateWorker, Certificates};
use campus::kernel::server::ApiState;
use campus_event_bus::EventBus;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    certificate_task: Option<CertificateTask>,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Ports the certificate worker runs against. Defaults to the in-process
    /// implementations.
    pub fn certificate_task(mut self, task: CertificateTask) -> Self {
        self.certificate_task = Some(task);
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the TLS files when TLS is configured
    /// 2. Creates the event bus that carries the certificate queue
    /// 3. Initializes every feature slice
    /// 4. Constructs application state
    /// 5. Takes the consumer end of the certificate queue for the worker
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * A feature slice fails to initialize (bad course or role settings)
    /// * The certificate queue cannot be set up
    pub async fn build(self) -> Result<Server> {
        // 1. Validate SSL Configuration
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);

        info!(
            address = %address,
            "Initializing server"
        );

        // 2. Event bus
        let events = EventBus::new();

        // 3. Orchestrate Feature Slices
        let task = self.certificate_task.unwrap_or_else(in_memory_task);
        let slices = campus::init(&self.cfg, &events, task)
            .map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        // 4. Construct State using Functional Folding
        let state = slices
            .into_iter()
            .fold(ApiState::builder().config(self.cfg).events(events.clone()), |builder, slice| {
                builder.register_slice(slice)
            })
            .build()
            .context("Failed to finalize API state registry")?;

        // 5. Certificate worker
        let shutdown = CancellationToken::new();
        let certificates = state.try_get_slice::<Certificates>()?;
        let worker = CertificateWorker::new(certificates, &events, shutdown.clone())
            .context("Failed to attach certificate worker")?;

        Ok(Server { state, worker: Some(worker), shutdown })
    }
}

fn in_memory_task() -> CertificateTask {
    CertificateTask::new(
        Arc::new(InMemoryUsers::new()),
        Arc::new(InMemoryVerification::new()),
        Arc::new(RecordingGenerator::new()),
    )
}

/// A fully initialized server instance ready to run.
///
/// This struct is returned by [`ServerBuilder::build`] and contains
/// all necessary runtime state.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    worker: Option<CertificateWorker>,
    shutdown: CancellationToken,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the certificate worker and the HTTP server, and runs until the
    /// shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(mut self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            "Starting server"
        );

        let app = self.app()?;
        let worker = self.worker.take().map(CertificateWorker::spawn);

        // Set up Graceful Shutdown
        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();
        let shutdown = self.shutdown.clone();

        // Spawn shutdown signal listener
        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown.cancel();
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        // Start Server (HTTP or HTTPS)
        let served = if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")
        };

        // Stop the worker whichever way the server ended
        self.shutdown.cancel();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("Certificate worker ended abnormally: {e}");
            }
        }

        served?;
        info!("Server shutdown complete");
        Ok(())
    }

    /// The full axum application: feature routes, system routes and API docs.
    ///
    /// # Errors
    /// Returns an error if a feature router cannot find its slice in the state.
    pub fn app(&self) -> Result<Router> {
        router::init(self.state.clone())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Takes the certificate worker so the caller can drive it. [`Server::run`]
    /// then serves HTTP only.
    pub fn take_worker(&mut self) -> Option<CertificateWorker> {
        self.worker.take()
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
///
/// This function waits for either:
/// * SIGINT (Ctrl+C)
/// * SIGTERM (sent by process managers like systemd)
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
