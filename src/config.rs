//! Object model configuration
//!
//! Selects the allocation policy and the traversal monitor window. Defaults
//! can be overridden from the environment:
//!
//! - `SCENECORE_ALLOCATOR` - `heap` or `tracking`
//! - `SCENECORE_MONITOR_SAMPLES` - number of traversal samples kept
//!
//! ```rust
//! use scenecore::config::{AllocatorKind, ObjectConfig};
//!
//! let config = ObjectConfig::default().with_allocator(AllocatorKind::Tracking);
//! let allocator = config.build_allocator();
//! assert!(allocator.stats().is_some());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::model::Allocator;
use crate::error::ConfigError;
use crate::performance::TraversalMonitor;

pub const ALLOCATOR_VAR: &str = "SCENECORE_ALLOCATOR";
pub const MONITOR_SAMPLES_VAR: &str = "SCENECORE_MONITOR_SAMPLES";

/// Which allocation policy new objects are created under
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorKind {
    #[default]
    Heap,
    Tracking,
}

impl FromStr for AllocatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heap" => Ok(Self::Heap),
            "tracking" => Ok(Self::Tracking),
            _ => Err(ConfigError::UnknownAllocator(s.to_string())),
        }
    }
}

impl fmt::Display for AllocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heap => f.write_str("heap"),
            Self::Tracking => f.write_str("tracking"),
        }
    }
}

/// Configuration for allocators and traversal monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectConfig {
    pub allocator: AllocatorKind,
    pub monitor_samples: usize,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            allocator: AllocatorKind::Heap,
            monitor_samples: 120,
        }
    }
}

impl ObjectConfig {
    /// Defaults overridden by the `SCENECORE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ALLOCATOR_VAR) {
            config.allocator = value.parse()?;
        }

        if let Some(value) = lookup(MONITOR_SAMPLES_VAR) {
            config.monitor_samples =
                value
                    .trim()
                    .parse()
                    .map_err(|err: std::num::ParseIntError| ConfigError::InvalidVariable {
                        variable: MONITOR_SAMPLES_VAR,
                        value: value.clone(),
                        reason: err.to_string(),
                    })?;
            if config.monitor_samples == 0 {
                return Err(ConfigError::InvalidVariable {
                    variable: MONITOR_SAMPLES_VAR,
                    value,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        log::debug!(
            "object config: allocator={}, monitor_samples={}",
            config.allocator,
            config.monitor_samples
        );
        Ok(config)
    }

    pub fn with_allocator(mut self, allocator: AllocatorKind) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_monitor_samples(mut self, samples: usize) -> Self {
        self.monitor_samples = samples.max(1);
        self
    }

    pub fn build_allocator(&self) -> Allocator {
        match self.allocator {
            AllocatorKind::Heap => Allocator::heap(),
            AllocatorKind::Tracking => Allocator::tracking(),
        }
    }

    pub fn build_monitor(&self) -> TraversalMonitor {
        TraversalMonitor::with_config(self.monitor_samples)
    }
}
