//! Auxiliary side-table attached to objects on demand
//!
//! The auxiliary holds the data most objects never need: named child
//! objects (including named values) and the liveness flag that observer
//! handles consult. It is reference counted separately from its object, so
//! observers can keep asking "is my object alive?" after it is gone.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::object::Object;
use super::ref_ptr::RefPtr;

/// Per-object side-table for named objects and observer liveness
pub struct Auxiliary {
    /// Cleared exactly once, when the owning object is destroyed
    connected: Mutex<bool>,
    /// Named child objects in insertion order
    objects: Mutex<Vec<(String, RefPtr<dyn Object>)>>,
    /// Live `ObserverPtr`s registered on this auxiliary
    observers: AtomicUsize,
}

impl Auxiliary {
    pub(crate) fn new() -> Self {
        Self {
            connected: Mutex::new(true),
            objects: Mutex::new(Vec::new()),
            observers: AtomicUsize::new(0),
        }
    }

    /// Whether the owning object is still alive
    pub fn is_connected(&self) -> bool {
        *self.connected.lock()
    }

    /// Runs `f` while holding the connection lock if the object is alive
    ///
    /// Destruction takes the same lock to disconnect, so `f` never observes
    /// an object whose memory has been released.
    pub(crate) fn with_connected<R>(&self, f: impl FnOnce() -> Option<R>) -> Option<R> {
        let connected = self.connected.lock();
        if *connected {
            f()
        } else {
            None
        }
    }

    /// Marks the owning object dead and releases its named children
    pub(crate) fn disconnect(&self) {
        {
            let mut connected = self.connected.lock();
            if !*connected {
                return;
            }
            *connected = false;
        }

        // children are released outside the lock, they may cascade
        let released = std::mem::take(&mut *self.objects.lock());
        if !released.is_empty() {
            log::trace!("auxiliary released {} named objects", released.len());
        }
        drop(released);
    }

    /// Binds `object` to `key`; the previous binding is dropped
    pub fn set_object(&self, key: impl Into<String>, object: RefPtr<dyn Object>) {
        let key = key.into();
        let previous = {
            let mut objects = self.objects.lock();
            match objects.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, slot)) => Some(std::mem::replace(slot, object)),
                None => {
                    objects.push((key, object));
                    None
                }
            }
        };
        drop(previous);
    }

    pub fn get_object(&self, key: &str) -> Option<RefPtr<dyn Object>> {
        self.objects
            .lock()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, object)| object.clone())
    }

    pub fn remove_object(&self, key: &str) -> Option<RefPtr<dyn Object>> {
        let mut objects = self.objects.lock();
        let index = objects.iter().position(|(existing, _)| existing == key)?;
        Some(objects.remove(index).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().iter().any(|(existing, _)| existing == key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Number of live observer handles registered on this auxiliary
    pub fn observer_count(&self) -> usize {
        self.observers.load(Ordering::Acquire)
    }

    pub(crate) fn register_observer(&self) {
        self.observers.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn unregister_observer(&self) {
        self.observers.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for Auxiliary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auxiliary")
            .field("connected", &self.is_connected())
            .field("keys", &self.keys())
            .field("observers", &self.observer_count())
            .finish()
    }
}
