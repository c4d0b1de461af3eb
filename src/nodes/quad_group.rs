//! Fixed four-child group node

use crate::model::{Allocator, Object, ObjectCore, RefPtr};
use crate::visit::Visitor;

use super::leaf::Leaf;

/// Group with exactly four child slots, any of which may be empty
#[derive(Debug, Default)]
pub struct QuadGroup {
    core: ObjectCore,
    children: [Option<RefPtr<dyn Object>>; 4],
}

impl QuadGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group with all four slots filled
    pub fn from_children(children: [RefPtr<dyn Object>; 4]) -> Self {
        Self {
            core: ObjectCore::new(),
            children: children.map(Some),
        }
    }

    /// Puts `child` in slot `index`, returning the previous occupant
    ///
    /// # Panics
    /// If `index` is not below 4.
    pub fn set_child(
        &mut self,
        index: usize,
        child: Option<RefPtr<dyn Object>>,
    ) -> Option<RefPtr<dyn Object>> {
        assert!(index < 4, "quad group slot {index} out of range");
        std::mem::replace(&mut self.children[index], child)
    }

    pub fn child(&self, index: usize) -> Option<&RefPtr<dyn Object>> {
        self.children.get(index)?.as_ref()
    }

    pub fn children(&self) -> &[Option<RefPtr<dyn Object>>; 4] {
        &self.children
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.children.iter().flatten().count()
    }

    /// Builds a quad tree `levels` deep
    ///
    /// A depth of 4 has 85 quad groups. Without `shared_leaf` it has 256 leaves,
    /// with it every bottom slot holds the shared object.
    pub fn build_tree(
        levels: u32,
        shared_leaf: Option<&RefPtr<dyn Object>>,
        allocator: &Allocator,
    ) -> RefPtr<dyn Object> {
        if levels == 0 {
            return match shared_leaf {
                Some(leaf) => leaf.clone(),
                None => allocator.create(Leaf::new()).upcast(),
            };
        }

        let children = std::array::from_fn(|_| Self::build_tree(levels - 1, shared_leaf, allocator));
        allocator.create(QuadGroup::from_children(children)).upcast()
    }
}

impl Object for QuadGroup {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn class_name(&self) -> &'static str {
        "QuadGroup"
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.apply_quad_group(self);
    }

    fn traverse(&self, visitor: &mut dyn Visitor) {
        for child in self.children.iter().flatten() {
            child.accept(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots() {
        let mut quad = QuadGroup::new();
        assert_eq!(quad.occupied(), 0);

        let leaf = RefPtr::new(Leaf::new()).upcast();
        assert!(quad.set_child(2, Some(leaf.clone())).is_none());
        assert_eq!(quad.occupied(), 1);
        assert!(quad.child(2).is_some_and(|child| RefPtr::ptr_eq(child, &leaf)));
        assert!(quad.child(0).is_none());
        assert!(quad.child(7).is_none());

        let previous = quad.set_child(2, None).expect("slot was filled");
        assert!(RefPtr::ptr_eq(&previous, &leaf));
        assert_eq!(quad.occupied(), 0);
    }

    #[test]
    #[should_panic]
    fn test_set_child_out_of_range() {
        let mut quad = QuadGroup::new();
        quad.set_child(4, None);
    }

    #[test]
    fn test_build_tree_counts() {
        let allocator = Allocator::tracking();
        let tree = QuadGroup::build_tree(4, None, &allocator);
        let stats = allocator.stats().unwrap();
        assert_eq!(stats.live("QuadGroup"), 85);
        assert_eq!(stats.live("Leaf"), 256);

        drop(tree);
        assert_eq!(allocator.stats().unwrap().live_objects, 0);
    }
}
