//! Named value collection

use crate::model::{Object, ObjectExt};

use super::traits::Visitor;

/// Gathers the value bound to one key from every visited object
#[derive(Debug)]
pub struct CollectValues<T> {
    key: String,
    values: Vec<T>,
}

impl<T> CollectValues<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
        }
    }

    /// Values in traversal order
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl<T> Visitor for CollectValues<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn apply_object(&mut self, object: &dyn Object) {
        if let Some(value) = object.get_value::<T>(&self.key) {
            self.values.push(value);
        }
        object.traverse(self);
    }
}
