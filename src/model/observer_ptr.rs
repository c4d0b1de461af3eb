//! Weak observer handle
//!
//! An [`ObserverPtr`] holds the object's [`Auxiliary`] rather than a count on
//! the object. Promotion with [`ObserverPtr::lock`] happens under the
//! auxiliary's connection lock and only succeeds while the count is
//! non-zero, so a promoted handle never points at a destroyed object.

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use super::auxiliary::Auxiliary;
use super::object::Object;
use super::ref_ptr::RefPtr;

/// Non-owning handle that detects destruction of its object
pub struct ObserverPtr<T: Object + ?Sized> {
    target: Option<(NonNull<T>, Arc<Auxiliary>)>,
}

// SAFETY: the pointer is only dereferenced while the auxiliary reports the
// object connected and its lock is held.
unsafe impl<T: Object + ?Sized> Send for ObserverPtr<T> {}
unsafe impl<T: Object + ?Sized> Sync for ObserverPtr<T> {}

impl<T: Object + ?Sized> ObserverPtr<T> {
    /// Observes the object owned by `handle`
    pub fn new(handle: &RefPtr<T>) -> Self {
        let auxiliary = handle.core().get_or_create_auxiliary().clone();
        auxiliary.register_observer();
        Self {
            target: Some((handle.as_non_null(), auxiliary)),
        }
    }

    /// An observer that observes nothing
    pub fn empty() -> Self {
        Self { target: None }
    }

    /// Promotes to an owning handle if the object is still alive
    pub fn lock(&self) -> Option<RefPtr<T>> {
        let (ptr, auxiliary) = self.target.as_ref()?;
        auxiliary.with_connected(|| {
            // SAFETY: connected under the lock means the object has not been
            // released yet; a zero count refuses promotion
            let object = unsafe { ptr.as_ref() };
            if object.core().try_increment() {
                Some(unsafe { RefPtr::from_counted(*ptr) })
            } else {
                None
            }
        })
    }

    /// Whether the observed object is still alive
    pub fn is_valid(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|(_, auxiliary)| auxiliary.is_connected())
    }

    /// Whether this observer was ever pointed at an object
    pub fn is_empty(&self) -> bool {
        self.target.is_none()
    }

    /// Stops observing
    pub fn reset(&mut self) {
        if let Some((_, auxiliary)) = self.target.take() {
            auxiliary.unregister_observer();
        }
    }

    /// Re-targets at the object owned by `handle`
    pub fn assign(&mut self, handle: &RefPtr<T>) {
        *self = Self::new(handle);
    }

    /// Whether this observer watches the object owned by `handle`
    pub fn observes(&self, handle: &RefPtr<T>) -> bool {
        self.target.as_ref().is_some_and(|(ptr, auxiliary)| {
            auxiliary.is_connected()
                && std::ptr::addr_eq(ptr.as_ptr(), handle.as_non_null().as_ptr())
        })
    }
}

impl<T: Object + ?Sized> Clone for ObserverPtr<T> {
    fn clone(&self) -> Self {
        if let Some((_, auxiliary)) = &self.target {
            auxiliary.register_observer();
        }
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T: Object + ?Sized> Drop for ObserverPtr<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: Object + ?Sized> Default for ObserverPtr<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Object + ?Sized> From<&RefPtr<T>> for ObserverPtr<T> {
    fn from(handle: &RefPtr<T>) -> Self {
        Self::new(handle)
    }
}

impl<T: Object + ?Sized> fmt::Debug for ObserverPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverPtr")
            .field("empty", &self.is_empty())
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectExt;
    use crate::nodes::{Group, Leaf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lock_while_alive() {
        let leaf = RefPtr::new(Leaf::new());
        let observer = ObserverPtr::new(&leaf);
        assert!(observer.is_valid());
        assert_eq!(leaf.observer_count(), 1);

        let promoted = observer.lock().expect("object is alive");
        assert!(RefPtr::ptr_eq(&promoted, &leaf));
        assert_eq!(leaf.ref_count(), 2);
    }

    #[test]
    fn test_lock_after_destruction() {
        let leaf = RefPtr::new(Leaf::new());
        let observer = ObserverPtr::from(&leaf);
        let copy = observer.clone();
        drop(leaf);

        assert!(!observer.is_valid());
        assert!(observer.lock().is_none());
        assert!(copy.lock().is_none());
        // stays dead
        assert!(observer.lock().is_none());
    }

    #[test]
    fn test_observer_outlives_auxiliary_owner() {
        let group = RefPtr::new(Group::new());
        group.set_value("name", "root".to_string());
        let observer = ObserverPtr::new(&group);
        let auxiliary = group.auxiliary().cloned().expect("created by set_value");
        drop(group);

        assert!(!auxiliary.is_connected());
        assert!(auxiliary.is_empty());
        assert_eq!(auxiliary.observer_count(), 1);
        assert!(observer.lock().is_none());

        drop(observer);
        assert_eq!(auxiliary.observer_count(), 0);
    }

    #[test]
    fn test_auxiliary_clones_are_not_observers() {
        let mut group = RefPtr::new(Group::new());
        group.set_value("name", "root".to_string());
        let auxiliary = group.auxiliary().cloned().expect("created by set_value");
        assert_eq!(auxiliary.observer_count(), 0);
        assert_eq!(group.observer_count(), 0);
        assert!(RefPtr::get_mut(&mut group).is_some());

        let observer = ObserverPtr::new(&group);
        let copy = observer.clone();
        assert_eq!(auxiliary.observer_count(), 2);
        drop(copy);
        assert_eq!(group.observer_count(), 1);
        assert!(RefPtr::get_mut(&mut group).is_none());

        drop(observer);
        assert!(RefPtr::get_mut(&mut group).is_some());
    }

    #[test]
    fn test_empty_and_reset() {
        let empty: ObserverPtr<Leaf> = ObserverPtr::default();
        assert!(empty.is_empty());
        assert!(empty.lock().is_none());

        let leaf = RefPtr::new(Leaf::new());
        let mut observer = ObserverPtr::new(&leaf);
        assert!(observer.observes(&leaf));
        observer.reset();
        assert!(observer.lock().is_none());
        assert_eq!(leaf.observer_count(), 0);

        observer.assign(&leaf);
        assert!(observer.lock().is_some());
    }

    #[test]
    fn test_back_reference_breaks_cycle() {
        struct Child {
            core: crate::model::ObjectCore,
            parent: ObserverPtr<Group>,
            drops: Arc<AtomicUsize>,
        }

        impl Object for Child {
            fn core(&self) -> &crate::model::ObjectCore {
                &self.core
            }
        }

        impl Drop for Child {
            fn drop(&mut self) {
                self.drops.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let mut parent = RefPtr::new(Group::new());
        let child = RefPtr::new(Child {
            core: crate::model::ObjectCore::new(),
            parent: ObserverPtr::new(&parent),
            drops: drops.clone(),
        });
        assert!(RefPtr::get_mut(&mut parent).is_none());

        let parent_observer = child.parent.clone();
        assert!(parent_observer.lock().is_some());
        drop(parent_observer);

        drop(parent);
        assert!(child.parent.lock().is_none());
        drop(child);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_promotion_races_final_release() {
        for _ in 0..200 {
            let leaf = RefPtr::new(Leaf::new());
            leaf.set_value("name", "racer".to_string());
            let observer = ObserverPtr::new(&leaf);

            std::thread::scope(|scope| {
                scope.spawn(move || drop(leaf));
                scope.spawn(|| {
                    for _ in 0..100 {
                        match observer.lock() {
                            Some(alive) => {
                                assert!(alive.ref_count() >= 1);
                                assert_eq!(alive.get_value::<String>("name").as_deref(), Some("racer"));
                            }
                            None => break,
                        }
                    }
                });
            });

            assert!(observer.lock().is_none());
        }
    }
}
