//! # Scenecore Prelude
//!
//! Commonly used types and traits in one import:
//!
//! ```rust
//! use scenecore::prelude::*;
//!
//! let mut root = Group::new();
//! root.add_child(RefPtr::new(Leaf::new()).upcast());
//! let root = RefPtr::new(root);
//! root.set_value("name", "root".to_string());
//!
//! let observer = ObserverPtr::new(&root);
//! let mut counter = CountObjects::new();
//! root.accept(&mut counter);
//! assert_eq!(counter.total(), 2);
//!
//! drop(root);
//! assert!(observer.lock().is_none());
//! ```

// Re-export object model types
pub use crate::model::{
    AllocationPolicy, Allocator, Object, ObjectCore, ObjectExt, ObserverPtr, RefPtr, Value,
};

// Re-export node types
pub use crate::nodes::{Group, Leaf, Lod, QuadGroup, Sphere, StateCommand, StateGroup};

// Re-export visitors
pub use crate::visit::{probe, CollectValues, CountObjects, PrintTree, Visitor};

// Re-export configuration and monitoring
pub use crate::config::{AllocatorKind, ObjectConfig};
pub use crate::error::{ConfigError, LookupError};
pub use crate::performance::{TraversalMetrics, TraversalMonitor};

// Re-export common external dependencies
pub use cgmath::Point3;
