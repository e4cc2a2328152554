//! webroot - concurrent static-content HTTP/1.0 server
//!
//! Serves files and directory listings from a single root directory.

pub mod config;
pub mod error;
pub mod format;
pub mod fs;
pub mod html;
pub mod http;
pub mod server;
