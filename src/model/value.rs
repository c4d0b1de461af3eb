//! Typed values stored as objects
//!
//! Named values on an object's auxiliary are [`Value<T>`] objects, which lets
//! one map hold integers, floats, strings, vectors and user types side by
//! side and lets visitors reach them like any other object.

use std::fmt;

use super::object::{Object, ObjectCore};

/// An [`Object`] wrapping a single typed value
pub struct Value<T> {
    core: ObjectCore,
    value: T,
}

impl<T> Value<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            core: ObjectCore::new(),
            value,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Object for Value<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn core(&self) -> &ObjectCore {
        &self.core
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.value).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Object, ObjectExt, RefPtr};
    use crate::error::LookupError;
    use crate::nodes::Group;

    #[derive(Clone, Debug, PartialEq)]
    struct Tint {
        rgb: [f32; 3],
    }

    #[test]
    fn test_value_round_trip() {
        let group = RefPtr::new(Group::new());
        group.set_value("count", 5i32);
        group.set_value("scale", 0.5f32);
        group.set_value("precise", 0.25f64);
        group.set_value("name", "root".to_string());
        group.set_value("weights", vec![1u8, 2, 3]);
        group.set_value("tint", Tint { rgb: [1.0, 0.5, 0.0] });

        assert_eq!(group.get_value::<i32>("count"), Some(5));
        assert_eq!(group.get_value::<f32>("scale"), Some(0.5));
        assert_eq!(group.get_value::<f64>("precise"), Some(0.25));
        assert_eq!(group.get_value::<String>("name").as_deref(), Some("root"));
        assert_eq!(group.get_value::<Vec<u8>>("weights"), Some(vec![1, 2, 3]));
        assert_eq!(
            group.get_value::<Tint>("tint"),
            Some(Tint { rgb: [1.0, 0.5, 0.0] })
        );
    }

    #[test]
    fn test_overwrite_with_other_type() {
        let group = RefPtr::new(Group::new());
        group.set_value("count", 5i32);
        assert_eq!(group.get_value::<i32>("count"), Some(5));

        group.set_value("count", "five".to_string());
        assert_eq!(group.get_value::<String>("count").as_deref(), Some("five"));
        assert_eq!(group.get_value::<i32>("count"), None);
        assert_eq!(group.object_keys().len(), 1);
    }

    #[test]
    fn test_missing_and_mismatched_lookups() {
        let group = RefPtr::new(Group::new());
        assert_eq!(group.get_value::<i32>("count"), None);
        assert!(group.get_object("count").is_none());

        group.set_value("count", 5i32);
        assert_eq!(group.get_value::<u32>("count"), None);
        assert_eq!(group.get_value::<i32>("Count"), None);

        match group.require_value::<String>("count") {
            Err(LookupError::TypeMismatch { expected, found, .. }) => {
                assert_eq!(expected, "Value<String>");
                assert_eq!(found, "Value<i32>");
            }
            other => panic!("unexpected lookup result: {other:?}"),
        }
        assert!(matches!(
            group.require_value::<i32>("missing"),
            Err(LookupError::Missing { .. })
        ));
        assert_eq!(group.require_value::<i32>("count").ok(), Some(5));
    }

    #[test]
    fn test_named_objects_are_owned() {
        let group = RefPtr::new(Group::new());
        let child = RefPtr::new(Group::new());
        group.set_object("child", child.clone().upcast());
        assert_eq!(child.ref_count(), 2);

        let found = group.get_object_as::<Group>("child").expect("stored child");
        assert!(RefPtr::ptr_eq(&found, &child));
        assert_eq!(found.class_name(), "Group");
        drop(found);

        drop(group);
        assert_eq!(child.ref_count(), 1);
    }
}
