//! PDF output module
//!
//! Provides a dependency-free emitter for minimal single-page documents.
//! Used by the stub renderer while no real FOP backend is configured.

mod minimal;

pub use minimal::{build_simple_pdf, escape_text};
