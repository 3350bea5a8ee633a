//! FOP Editor Server Library
//!
//! Shared pieces of the two binaries:
//!
//! - `fopeditor-server` (src/main.rs): public API that validates render
//!   requests and hands them to the stub or the FOP sidecar
//! - `fop-sidecar` (src/bin/fop-sidecar.rs): runs Apache FOP on behalf of
//!   the public API
//!
//! # Modules
//!
//! - `pdf`: minimal PDF emitter used by the stub renderer
//! - `render`: renderer trait and its backends
//! - `routes`: HTTP handlers and routers for both tiers

pub mod config;
pub mod error;
pub mod pdf;
pub mod render;
pub mod request;
pub mod routes;
pub mod server;
pub mod state;
