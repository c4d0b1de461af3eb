//! # Scene Nodes
//!
//! The built-in node types. Every node is an [`Object`](crate::model::Object)
//! that stores its children as owning handles, so a subgraph may be shared
//! by several parents.
//!
//! ## Key Components
//!
//! - [`Leaf`] - node without children
//! - [`Group`] - any number of children
//! - [`QuadGroup`] - exactly four child slots
//! - [`Lod`] - alternative children selected by projected size
//! - [`StateGroup`] - children sharing a list of state commands
//!
//! Types defined outside this crate become nodes by implementing
//! [`Object`](crate::model::Object); visitors that do not know them still
//! traverse through them.

pub mod group;
pub mod leaf;
pub mod lod;
pub mod quad_group;
pub mod state_group;

// Re-export main types
pub use group::Group;
pub use leaf::Leaf;
pub use lod::{Lod, LodChild, Sphere};
pub use quad_group::QuadGroup;
pub use state_group::{StateCommand, StateGroup};
