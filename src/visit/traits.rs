//! Visitor dispatch protocol
//!
//! Double dispatch over the node types: [`Object::accept`] calls the
//! `apply_*` method matching the node's type, and every `apply_*` method
//! falls back to a more general one when a visitor does not override it:
//!
//! ```text
//! apply_leaf | apply_group | apply_quad_group | apply_lod | apply_state_group
//!     -> apply_node -> apply_object -> Object::traverse
//! ```
//!
//! Objects whose type the visitor does not know at all land in
//! [`Visitor::apply_object`] and are still traversed.
//!
//! ## Capability probes
//!
//! A node defined outside this crate can cooperate with a visitor defined
//! outside this crate: the visitor opts in by returning itself from
//! [`Visitor::as_any_mut`], and the node's `accept` uses [`probe`] to reach
//! the concrete visitor, falling back to the generic methods otherwise.

use std::any::Any;

use crate::model::Object;
use crate::nodes::{Group, Leaf, Lod, QuadGroup, StateGroup};

/// Conversion to `&mut dyn Visitor`, implemented for every sized visitor
pub trait AsVisitor {
    fn as_visitor(&mut self) -> &mut dyn Visitor;
}

impl<V: Visitor> AsVisitor for V {
    fn as_visitor(&mut self) -> &mut dyn Visitor {
        self
    }
}

/// Operation applied over an object graph
///
/// Override the methods for the node types you care about and call
/// `traverse` on the node to continue into its children.
pub trait Visitor: AsVisitor {
    /// Fallback for every object; continues into the object's children
    fn apply_object(&mut self, object: &dyn Object) {
        object.traverse(self.as_visitor());
    }

    /// Fallback for every built-in node type
    fn apply_node(&mut self, node: &dyn Object) {
        self.apply_object(node);
    }

    fn apply_leaf(&mut self, leaf: &Leaf) {
        self.apply_node(leaf);
    }

    fn apply_group(&mut self, group: &Group) {
        self.apply_node(group);
    }

    fn apply_quad_group(&mut self, quad_group: &QuadGroup) {
        self.apply_node(quad_group);
    }

    fn apply_lod(&mut self, lod: &Lod) {
        self.apply_node(lod);
    }

    fn apply_state_group(&mut self, state_group: &StateGroup) {
        self.apply_node(state_group);
    }

    /// Opt-in access to the concrete visitor for capability probes
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}

/// The concrete visitor behind `visitor`, if it is a `V` and opted in
pub fn probe<V: Visitor + 'static>(visitor: &mut dyn Visitor) -> Option<&mut V> {
    visitor.as_any_mut()?.downcast_mut::<V>()
}
