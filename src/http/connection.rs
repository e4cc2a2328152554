use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::error::ServerError;
use crate::http::listing;
use crate::http::mime;
use crate::http::parser::{ParseError, parse_request_line, read_request_line};
use crate::http::request::Request;
use crate::http::resolver::{PathResolver, ResolvedTarget};
use crate::http::response::ResponseOutcome;
use crate::http::writer::ResponseWriter;

/// How long a finished connection keeps draining client bytes after our FIN.
const LINGER: Duration = Duration::from_millis(500);

/// One client connection, handled start to finish.
///
/// The stream is owned here and dropped when [`Connection::run`] returns, so
/// the socket is closed on every path.
pub struct Connection<S> {
    stream: S,
    resolver: Arc<PathResolver>,
    read_timeout: Duration,
    write_timeout: Duration,
    state: ConnectionState,
}

pub enum ConnectionState {
    Parsing,
    Resolving(Request),
    Responding(ResponseWriter),
    Closed,
}

/// Which branch a parsed request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    NotFound,
    BadMethod,
    BadProtocol,
    Directory,
    File,
}

/// The ordered predicate chain: existence, then method, then protocol, then kind.
pub fn decide(request: &Request, target: &ResolvedTarget) -> Route {
    if !target.exists_on_disk {
        Route::NotFound
    } else if !request.method_valid {
        Route::BadMethod
    } else if !request.protocol_valid {
        Route::BadProtocol
    } else if target.is_directory {
        Route::Directory
    } else {
        Route::File
    }
}

/// Resolves the request and produces its outcome plus the target's mtime.
///
/// Blocking: touches the filesystem.
pub fn build_outcome(resolver: &PathResolver, request: &Request) -> (ResponseOutcome, Option<SystemTime>) {
    let target = resolver.resolve(&request.path);

    let outcome = match decide(request, &target) {
        Route::NotFound => ResponseOutcome::NotFound,
        Route::BadMethod => ResponseOutcome::NotImplemented,
        Route::BadProtocol => ResponseOutcome::BadRequest,
        Route::Directory => {
            let listing = listing::list(resolver.fs().as_ref(), &target.canonical_path, resolver.root());
            ResponseOutcome::Ok {
                body: listing::render(&request.path, &listing).into_bytes(),
                content_type: "text/html",
            }
        }
        Route::File => match resolver.fs().read(&target.canonical_path) {
            Ok(body) => ResponseOutcome::Ok {
                body,
                content_type: mime::content_type(Path::new(&request.path)),
            },
            Err(source) => {
                let err = ServerError::Filesystem {
                    path: target.canonical_path.clone(),
                    source,
                };
                tracing::error!("{err}");
                ResponseOutcome::InternalError
            }
        },
    };

    (outcome, target.last_modified)
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// The write timeout starts out equal to `read_timeout`.
    pub fn new(stream: S, resolver: Arc<PathResolver>, read_timeout: Duration) -> Self {
        Self {
            stream,
            resolver,
            read_timeout,
            write_timeout: read_timeout,
            state: ConnectionState::Parsing,
        }
    }

    /// Bounds how long sending the response (and the closing FIN) may stall.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        self.close().await;
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Parsing => match self.read_request().await? {
                    Some(Ok(request)) => ConnectionState::Resolving(request),
                    Some(Err(outcome)) => Self::respond(outcome, None),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Resolving(request) => {
                    let resolver = Arc::clone(&self.resolver);
                    let span = tracing::Span::current();
                    let (outcome, last_modified) = tokio::task::spawn_blocking(move || {
                        span.in_scope(|| {
                            let (outcome, last_modified) = build_outcome(&resolver, &request);
                            tracing::info!(
                                method = %request.method,
                                path = %request.path,
                                status = outcome.status().as_u16(),
                                "Request handled"
                            );
                            (outcome, last_modified)
                        })
                    })
                    .await?;

                    Self::respond(outcome, last_modified)
                }

                ConnectionState::Responding(writer) => {
                    match timeout(self.write_timeout, writer.write_to_stream(&mut self.stream)).await {
                        Ok(result) => result?,
                        Err(_) => {
                            tracing::warn!(timeout = ?self.write_timeout, "Timed out sending response");
                        }
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    fn respond(outcome: ResponseOutcome, last_modified: Option<SystemTime>) -> ConnectionState {
        let response = outcome.into_response(last_modified, SystemTime::now());
        ConnectionState::Responding(ResponseWriter::new(response))
    }

    /// Reads and parses the request line.
    ///
    /// `None` means close without answering: the peer sent nothing, or the
    /// read timed out. A malformed line yields a 400 outcome to send back.
    async fn read_request(&mut self) -> anyhow::Result<Option<Result<Request, ResponseOutcome>>> {
        let line = match timeout(self.read_timeout, read_request_line(&mut self.stream)).await {
            Err(_) => {
                tracing::warn!(timeout = ?self.read_timeout, "Timed out waiting for request line");
                return Ok(None);
            }
            Ok(Ok(None)) => {
                tracing::debug!("Client closed connection without sending a request");
                return Ok(None);
            }
            Ok(Ok(Some(line))) => line,
            Ok(Err(ParseError::Io(e))) => return Err(e.into()),
            Ok(Err(e)) => {
                tracing::warn!("{}", ServerError::MalformedRequest(e));
                return Ok(Some(Err(ResponseOutcome::BadRequest)));
            }
        };

        match parse_request_line(&line) {
            Ok(request) => {
                tracing::debug!(line = %line, "Request line received");
                Ok(Some(Ok(request)))
            }
            Err(e) => {
                tracing::warn!(line = %line, "{}", ServerError::MalformedRequest(e));
                Ok(Some(Err(ResponseOutcome::BadRequest)))
            }
        }
    }

    /// Sends FIN, then discards whatever the client still sends for a short
    /// while so unread request headers do not turn the close into a reset.
    async fn close(&mut self) {
        if !matches!(timeout(self.write_timeout, self.stream.shutdown()).await, Ok(Ok(()))) {
            return;
        }

        let mut sink = [0u8; 1024];
        let _ = timeout(LINGER, async {
            while let Ok(n) = self.stream.read(&mut sink).await {
                if n == 0 {
                    break;
                }
            }
        })
        .await;
    }
}
