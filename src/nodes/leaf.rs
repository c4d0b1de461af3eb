//! Leaf node

use crate::model::{Object, ObjectCore};
use crate::visit::Visitor;

/// Node without children
#[derive(Debug, Default)]
pub struct Leaf {
    core: ObjectCore,
}

impl Leaf {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Object for Leaf {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn class_name(&self) -> &'static str {
        "Leaf"
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.apply_leaf(self);
    }
}
