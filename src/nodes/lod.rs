//! Level-of-detail node
//!
//! A [`Lod`] holds alternative versions of the same subgraph ordered from
//! most to least detailed. Each child carries the minimum screen-height
//! ratio at which it should be used; [`Lod::select`] picks the first child
//! whose threshold is met.

use cgmath::{MetricSpace, Point3};

use crate::model::{Object, ObjectCore, RefPtr};
use crate::visit::Visitor;

/// Bounding sphere of a level-of-detail node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Fraction of the viewport height the sphere covers from `eye`
    ///
    /// Returns infinity when the eye is inside the sphere.
    pub fn screen_height_ratio(&self, eye: Point3<f64>, vertical_fov_radians: f64) -> f64 {
        let distance = eye.distance(self.center);
        if distance <= self.radius {
            return f64::INFINITY;
        }
        self.radius / (distance * (vertical_fov_radians * 0.5).tan())
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 0.0), 1.0)
    }
}

/// One level of detail
#[derive(Debug, Clone)]
pub struct LodChild {
    pub minimum_screen_height_ratio: f64,
    pub node: RefPtr<dyn Object>,
}

/// Node choosing between alternative children by projected size
#[derive(Debug, Default)]
pub struct Lod {
    core: ObjectCore,
    pub bound: Sphere,
    children: Vec<LodChild>,
}

impl Lod {
    pub fn new(bound: Sphere) -> Self {
        Self {
            core: ObjectCore::new(),
            bound,
            children: Vec::new(),
        }
    }

    /// Appends a level; add the most detailed level first
    pub fn add_child(&mut self, minimum_screen_height_ratio: f64, node: RefPtr<dyn Object>) {
        self.children.push(LodChild {
            minimum_screen_height_ratio,
            node,
        });
    }

    pub fn children(&self) -> &[LodChild] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// First child whose minimum ratio is met by `screen_height_ratio`
    pub fn select(&self, screen_height_ratio: f64) -> Option<&RefPtr<dyn Object>> {
        self.children
            .iter()
            .find(|child| screen_height_ratio >= child.minimum_screen_height_ratio)
            .map(|child| &child.node)
    }

    /// Child to draw when viewed from `eye`
    pub fn select_for_view(
        &self,
        eye: Point3<f64>,
        vertical_fov_radians: f64,
    ) -> Option<&RefPtr<dyn Object>> {
        self.select(self.bound.screen_height_ratio(eye, vertical_fov_radians))
    }
}

impl Object for Lod {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn class_name(&self) -> &'static str {
        "Lod"
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.apply_lod(self);
    }

    fn traverse(&self, visitor: &mut dyn Visitor) {
        for child in &self.children {
            child.node.accept(visitor);
        }
    }
}
