//! N-ary group node

use crate::model::{Allocator, Object, ObjectCore, RefPtr};
use crate::visit::Visitor;

use super::leaf::Leaf;

/// Node owning any number of children, visited in insertion order
#[derive(Debug, Default)]
pub struct Group {
    core: ObjectCore,
    children: Vec<RefPtr<dyn Object>>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            core: ObjectCore::new(),
            children: Vec::with_capacity(capacity),
        }
    }

    /// Appends a child; the same object may be added to several groups
    pub fn add_child(&mut self, child: RefPtr<dyn Object>) {
        self.children.push(child);
    }

    /// Removes the first occurrence of `child`, returning whether it was found
    pub fn remove_child(&mut self, child: &RefPtr<dyn Object>) -> bool {
        match self
            .children
            .iter()
            .position(|existing| RefPtr::ptr_eq(existing, child))
        {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> &[RefPtr<dyn Object>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Builds a balanced tree of groups `levels` deep with `fanout` children each
    ///
    /// With `shared_leaf` every bottom slot holds that one object, otherwise
    /// each slot gets its own [`Leaf`].
    pub fn build_tree(
        levels: u32,
        fanout: usize,
        shared_leaf: Option<&RefPtr<dyn Object>>,
        allocator: &Allocator,
    ) -> RefPtr<dyn Object> {
        if levels == 0 {
            return match shared_leaf {
                Some(leaf) => leaf.clone(),
                None => allocator.create(Leaf::new()).upcast(),
            };
        }

        let mut group = Group::with_capacity(fanout);
        for _ in 0..fanout {
            group.add_child(Self::build_tree(levels - 1, fanout, shared_leaf, allocator));
        }
        allocator.create(group).upcast()
    }
}

impl Object for Group {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn class_name(&self) -> &'static str {
        "Group"
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.apply_group(self);
    }

    fn traverse(&self, visitor: &mut dyn Visitor) {
        for child in &self.children {
            child.accept(visitor);
        }
    }
}
