//! Counting visitor

use std::collections::{BTreeMap, HashSet};

use crate::model::Object;

use super::traits::Visitor;

/// Counts visited objects grouped by class name
///
/// By default an object reachable along several paths is counted once per
/// visit. [`CountObjects::unique`] counts each object once and does not
/// re-enter a shared subgraph.
#[derive(Debug, Default)]
pub struct CountObjects {
    unique: bool,
    visited: HashSet<usize>,
    counts: BTreeMap<&'static str, usize>,
    total: usize,
}

impl CountObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique() -> Self {
        Self {
            unique: true,
            ..Self::default()
        }
    }

    /// Objects counted with the given class name
    pub fn count(&self, class_name: &str) -> usize {
        self.counts.get(class_name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.counts
    }

    /// Clears the counts so the visitor can be applied to another root
    pub fn reset(&mut self) {
        self.visited.clear();
        self.counts.clear();
        self.total = 0;
    }
}

impl Visitor for CountObjects {
    fn apply_object(&mut self, object: &dyn Object) {
        if self.unique {
            let addr = object as *const dyn Object as *const () as usize;
            if !self.visited.insert(addr) {
                return;
            }
        }
        *self.counts.entry(object.class_name()).or_default() += 1;
        self.total += 1;
        object.traverse(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Allocator, RefPtr};
    use crate::nodes::{Group, Leaf, QuadGroup};

    #[test]
    fn test_quad_tree_counts() {
        let allocator = Allocator::heap();
        let tree = QuadGroup::build_tree(4, None, &allocator);

        let mut counter = CountObjects::new();
        tree.accept(&mut counter);
        assert_eq!(counter.count("QuadGroup"), 85);
        assert_eq!(counter.count("Leaf"), 256);
        assert_eq!(counter.total(), 341);
    }

    #[test]
    fn test_shared_leaf_counts() {
        let allocator = Allocator::heap();
        let shared = allocator.create(Leaf::new()).upcast();
        let tree = QuadGroup::build_tree(4, Some(&shared), &allocator);

        let mut unique = CountObjects::unique();
        tree.accept(&mut unique);
        assert_eq!(unique.count("QuadGroup"), 85);
        assert_eq!(unique.count("Leaf"), 1);

        let mut per_visit = CountObjects::new();
        tree.accept(&mut per_visit);
        assert_eq!(per_visit.count("Leaf"), 256);
    }

    #[test]
    fn test_reset_between_roots() {
        let mut counter = CountObjects::new();
        let group = RefPtr::new(Group::new());
        group.accept(&mut counter);
        group.accept(&mut counter);
        assert_eq!(counter.count("Group"), 2);

        counter.reset();
        assert_eq!(counter.total(), 0);
        RefPtr::new(Leaf::new()).accept(&mut counter);
        assert_eq!(counter.counts().len(), 1);
        assert_eq!(counter.count("Leaf"), 1);
    }
}
