use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{Instrument, info};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::fs::DiskFs;
use crate::http::connection::Connection;
use crate::http::resolver::PathResolver;

/// Pause after a failed accept so persistent errors (e.g. EMFILE) do not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Owns the listening socket and the bounded set of connection workers.
pub struct Listener {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    resolver: Arc<PathResolver>,
    workers: Arc<Semaphore>,
}

impl Listener {
    /// Binds `config.host:config.port` and serves `config.root` from disk.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let resolver = PathResolver::new(Arc::new(DiskFs), &config.root)?;
        Self::bind_with(config, resolver).await
    }

    pub async fn bind_with(config: ServerConfig, resolver: PathResolver) -> Result<Self, ServerError> {
        let addr = config.listen_addr();
        let bind_error = |source| ServerError::Bind {
            addr: addr.clone(),
            source,
        };

        let listener = TcpListener::bind(&addr).await.map_err(bind_error)?;
        let local = listener.local_addr().map_err(bind_error)?;
        info!(
            addr = %local,
            root = %resolver.root().display(),
            max_workers = config.max_workers,
            "Listening"
        );

        Ok(Self {
            listener,
            workers: Arc::new(Semaphore::new(config.max_workers)),
            config: Arc::new(config),
            resolver: Arc::new(resolver),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then stops.
    ///
    /// Accept errors are logged and the loop continues.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            while let Some(done) = tasks.try_join_next() {
                if let Err(e) = done {
                    tracing::error!(error = %e, "Connection task failed");
                }
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }

                accepted = self.listener.accept() => match accepted {
                    Ok((socket, peer)) => self.dispatch(&mut tasks, socket, peer),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }

        self.stop(tasks).await;
    }

    /// Hands the socket to a worker, or drops it when every worker is busy.
    fn dispatch(&self, tasks: &mut JoinSet<()>, socket: TcpStream, peer: SocketAddr) {
        let permit = match Arc::clone(&self.workers).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!("{}", ServerError::PoolSaturated { peer });
                drop(socket);
                return;
            }
        };

        tracing::debug!(%peer, "Accepted connection");

        let resolver = Arc::clone(&self.resolver);
        let read_timeout = self.config.read_timeout;
        let write_timeout = self.config.write_timeout;
        let span = tracing::info_span!("connection", %peer);

        tasks.spawn(
            async move {
                let _permit = permit;
                let conn = Connection::new(socket, resolver, read_timeout).with_write_timeout(write_timeout);
                if let Err(e) = conn.run().await {
                    tracing::error!(error = %e, "Connection error");
                }
            }
            .instrument(span),
        );
    }

    /// Closes the socket, waits out the grace period, then aborts stragglers.
    async fn stop(self, mut tasks: JoinSet<()>) {
        let grace = self.config.shutdown_grace;
        drop(self.listener);
        info!(in_flight = tasks.len(), "Listener closed, draining connections");

        let drained = timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            tracing::warn!(remaining = tasks.len(), "Grace period elapsed, aborting connections");
            tasks.shutdown().await;
        }

        info!("Server stopped");
    }
}
