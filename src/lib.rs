// src/lib.rs
//! Scenecore
//!
//! Intrusive reference-counted object model for scene graphs: owning and
//! observer handles, auxiliary named values and visitor dispatch over an
//! extensible node hierarchy.

pub mod config;
pub mod error;
pub mod model;
pub mod nodes;
pub mod performance;
pub mod prelude;
pub mod visit;

// Re-export main types for convenience
pub use model::{Object, ObserverPtr, RefPtr};

/// Installs the `env_logger` backend, honouring `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp(None)
        .try_init();
}
