//! Error types
//!
//! Normal object-model operations do not fail: missing values and dead
//! observers are reported as `None`. These errors cover the callers that want
//! to know why, and configuration parsing.

use thiserror::Error;

/// Why a named value lookup failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no value named `{key}`")]
    Missing { key: String },

    #[error("value `{key}` is a {found}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Invalid configuration input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown allocator `{0}` (expected `heap` or `tracking`)")]
    UnknownAllocator(String),

    #[error("invalid value `{value}` for {variable}: {reason}")]
    InvalidVariable {
        variable: &'static str,
        value: String,
        reason: String,
    },
}
