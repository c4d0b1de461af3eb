//! # Object Model
//!
//! The reference-counted object model every node and resource builds on.
//!
//! ## Key Components
//!
//! - [`Object`] / [`ObjectCore`] - base trait and the state embedded in every object
//! - [`RefPtr`] - owning handle; the object is destroyed when the last one drops
//! - [`ObserverPtr`] - weak handle that detects destruction
//! - [`Auxiliary`] - lazily created side-table for named values and objects
//! - [`Value`] - typed value stored as an object
//! - [`Allocator`] - creates objects under a pluggable [`AllocationPolicy`]
//!
//! ## Usage
//!
//! ```rust
//! use scenecore::model::{ObjectExt, ObserverPtr, RefPtr};
//! use scenecore::nodes::Group;
//!
//! let group = RefPtr::new(Group::new());
//! group.set_value("count", 5i32);
//! assert_eq!(group.get_value::<i32>("count"), Some(5));
//!
//! let observer = ObserverPtr::new(&group);
//! drop(group);
//! assert!(observer.lock().is_none());
//! ```

pub mod allocator;
pub mod auxiliary;
pub mod object;
pub mod observer_ptr;
pub mod ref_ptr;
pub mod value;

// Re-export main types
pub use allocator::{AllocationPolicy, AllocationStats, Allocator, HeapPolicy, TrackingPolicy};
pub use auxiliary::Auxiliary;
pub use object::{AsObject, Object, ObjectCore, ObjectExt};
pub use observer_ptr::ObserverPtr;
pub use ref_ptr::{ExclusiveMut, RefPtr};
pub use value::Value;
