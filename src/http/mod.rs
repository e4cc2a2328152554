//! HTTP/1.0 request handling for static content.
//!
//! One request per connection: the server reads the request line, answers, and
//! closes. Headers and bodies sent by the client are ignored.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine and the outcome decision
//! - **`parser`**: reads and splits the request line, percent-decodes the path
//! - **`request`**: the parsed request with its method/protocol validity flags
//! - **`resolver`**: maps request paths into the server root, rejects escapes
//! - **`listing`**: directory enumeration, ordering and the listing page
//! - **`response`**: status codes, outcomes and header construction
//! - **`writer`**: serializes the header block and body onto the stream
//! - **`mime`**: content type from file extension
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Parsing   │ ← Read the request line (bounded by the read timeout)
//!        └──────┬──────┘
//!               │ Request line parsed        (malformed → 400, EOF/timeout → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │    Resolving     │ ← 404 / 501 / 400 / listing / file
//!        └──────┬───────────┘
//!               │ Outcome decided
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Header block, then body
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use webroot::fs::DiskFs;
//! use webroot::http::connection::Connection;
//! use webroot::http::resolver::PathResolver;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Arc::new(PathResolver::new(Arc::new(DiskFs), "/srv".as_ref())?);
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let resolver = Arc::clone(&resolver);
//!         tokio::spawn(async move {
//!             let conn = Connection::new(socket, resolver, Duration::from_secs(30));
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod listing;
pub mod mime;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod response;
pub mod writer;
