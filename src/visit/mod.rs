//! # Visitors
//!
//! Operations over object graphs, added without touching the node types.
//!
//! ## Key Components
//!
//! - [`Visitor`] - double-dispatch trait with per-node-type methods and fallbacks
//! - [`probe`] - capability probe from `&mut dyn Visitor` to a concrete visitor
//! - [`CountObjects`] - counts objects by class name
//! - [`PrintTree`] - indented outline of a graph
//! - [`CollectValues`] - gathers a named value from every object
//!
//! ## Usage
//!
//! ```rust
//! use scenecore::model::Allocator;
//! use scenecore::nodes::QuadGroup;
//! use scenecore::visit::CountObjects;
//!
//! let tree = QuadGroup::build_tree(2, None, &Allocator::default());
//! let mut counter = CountObjects::new();
//! tree.accept(&mut counter);
//! assert_eq!(counter.count("QuadGroup"), 5);
//! assert_eq!(counter.count("Leaf"), 16);
//! ```

pub mod collect;
pub mod count;
pub mod print;
pub mod traits;

// Re-export main types
pub use collect::CollectValues;
pub use count::CountObjects;
pub use print::PrintTree;
pub use traits::{probe, AsVisitor, Visitor};

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::model::{Object, ObjectCore, ObjectExt, RefPtr};
    use crate::nodes::{Group, Leaf, Lod, QuadGroup, Sphere, StateCommand, StateGroup};

    /// Records the dispatch method and class of every visited object
    #[derive(Default)]
    struct Trace {
        calls: Vec<String>,
    }

    impl Visitor for Trace {
        fn apply_object(&mut self, object: &dyn Object) {
            self.calls.push(format!("object:{}", object.class_name()));
            object.traverse(self);
        }

        fn apply_group(&mut self, group: &Group) {
            self.calls.push("group".to_string());
            group.traverse(self);
        }

        fn apply_leaf(&mut self, _leaf: &Leaf) {
            self.calls.push("leaf".to_string());
        }
    }

    /// Node type the library knows nothing about
    struct Terrain {
        core: ObjectCore,
        tiles: Vec<RefPtr<dyn Object>>,
        elevation: f32,
    }

    impl Terrain {
        fn new(elevation: f32) -> Self {
            Self {
                core: ObjectCore::new(),
                tiles: Vec::new(),
                elevation,
            }
        }
    }

    impl Object for Terrain {
        fn core(&self) -> &ObjectCore {
            &self.core
        }

        fn accept(&self, visitor: &mut dyn Visitor) {
            match probe::<TerrainStats>(visitor) {
                Some(stats) => stats.apply_terrain(self),
                None => visitor.apply_node(self),
            }
        }

        fn traverse(&self, visitor: &mut dyn Visitor) {
            for tile in &self.tiles {
                tile.accept(visitor);
            }
        }
    }

    /// Visitor shipped alongside `Terrain` that understands it
    #[derive(Default)]
    struct TerrainStats {
        terrains: usize,
        max_elevation: f32,
        others: usize,
    }

    impl TerrainStats {
        fn apply_terrain(&mut self, terrain: &Terrain) {
            self.terrains += 1;
            self.max_elevation = self.max_elevation.max(terrain.elevation);
            terrain.traverse(self);
        }
    }

    impl Visitor for TerrainStats {
        fn apply_object(&mut self, object: &dyn Object) {
            self.others += 1;
            object.traverse(self);
        }

        fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
            Some(self)
        }
    }

    #[test]
    fn test_fallback_chain() {
        let mut state_group = StateGroup::new();
        state_group.add_state_command(RefPtr::new(StateCommand::new(0, "pipeline")).upcast());
        state_group.add_child(RefPtr::new(Leaf::new()).upcast());

        let mut lod = Lod::new(Sphere::default());
        lod.add_child(0.0, RefPtr::new(Leaf::new()).upcast());

        let mut quad = QuadGroup::new();
        quad.set_child(1, Some(RefPtr::new(Group::new()).upcast()));

        let mut root = Group::new();
        root.add_child(RefPtr::new(state_group).upcast());
        root.add_child(RefPtr::new(lod).upcast());
        root.add_child(RefPtr::new(quad).upcast());

        let mut trace = Trace::default();
        RefPtr::new(root).accept(&mut trace);
        assert_eq!(
            trace.calls,
            vec![
                "group",
                "object:StateGroup",
                "object:StateCommand",
                "leaf",
                "object:Lod",
                "leaf",
                "object:QuadGroup",
                "group",
            ]
        );
    }

    #[test]
    fn test_preorder_insertion_order() {
        let named = |name: &str| {
            let leaf = RefPtr::new(Leaf::new());
            leaf.set_value("name", name.to_string());
            leaf.upcast()
        };

        let mut inner = Group::new();
        inner.add_child(named("b"));
        inner.add_child(named("c"));

        let mut root = Group::new();
        root.add_child(named("a"));
        root.add_child(RefPtr::new(inner).upcast());
        root.add_child(named("d"));

        let mut collect = CollectValues::<String>::new("name");
        RefPtr::new(root).accept(&mut collect);
        assert_eq!(collect.into_values(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_unknown_node_is_traversed() {
        let mut terrain = Terrain::new(12.0);
        terrain.tiles.push(RefPtr::new(Leaf::new()).upcast());
        terrain.tiles.push(RefPtr::new(Group::new()).upcast());

        let mut root = Group::new();
        root.add_child(RefPtr::new(terrain).upcast());
        let root = RefPtr::new(root);

        let mut counter = CountObjects::new();
        root.accept(&mut counter);
        assert_eq!(counter.count("Terrain"), 1);
        assert_eq!(counter.count("Group"), 2);
        assert_eq!(counter.count("Leaf"), 1);
        assert_eq!(counter.total(), 4);
    }

    #[test]
    fn test_capability_probe_dispatch() {
        let mut nested = Terrain::new(3.0);
        nested.tiles.push(RefPtr::new(Leaf::new()).upcast());
        let mut terrain = Terrain::new(40.0);
        terrain.tiles.push(RefPtr::new(nested).upcast());
        terrain.tiles.push(RefPtr::new(Group::new()).upcast());
        let terrain = RefPtr::new(terrain);

        let mut stats = TerrainStats::default();
        terrain.accept(&mut stats);
        assert_eq!(stats.terrains, 2);
        assert_eq!(stats.max_elevation, 40.0);
        assert_eq!(stats.others, 2);

        let mut counter = CountObjects::new();
        assert!(probe::<TerrainStats>(&mut counter).is_none());
        terrain.accept(&mut counter);
        assert_eq!(counter.total(), 4);
    }
}
