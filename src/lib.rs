//! basic-file-server: a static file server with cached directory listings
//! and on-demand image derivatives.
//!
//! Directory requests return a JSON listing
//! (`{"entries":[{"isDir":..,"name":..,"size":..}]}`) that is computed once
//! per request path and cached on disk forever after. File requests are
//! streamed as-is, except that a missing image path may be materialized
//! from a sibling source first:
//!
//! - `cover` policy: `cover.*` becomes a `cover.jpg` thumbnail built from
//!   the directory's first image (`1.jpg`, `1.jpeg`, `1.png`, ...).
//! - `extension_swap` policy: a missing `X.jpg` is converted from `X.png`
//!   or `X.gif`, and `cover.jpg` is scaled from `1.jpg`.
//!
//! When derivation fails the untouched source is served instead.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Error types.
pub mod error;
/// Image derivation engine.
pub mod imaging;
/// Directory listing cache.
pub mod listing;
/// Per-key locks.
pub mod locks;
/// Atomic file writes.
pub mod persist;
/// Request path resolution.
pub mod resolver;
/// HTTP server.
pub mod server;


pub use config::{Cli, Command, Config};
pub use error::{AppError, Result};
pub use server::AppState;
