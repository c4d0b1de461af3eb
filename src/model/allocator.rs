//! Pluggable allocation policies
//!
//! Objects always live in individual heap allocations; the policy decides
//! what bookkeeping accompanies them. [`HeapPolicy`] does none,
//! [`TrackingPolicy`] keeps per-class counters that tests and demos use to
//! check that every unreachable object was released exactly once.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::object::Object;
use super::ref_ptr::RefPtr;

/// Hook notified when objects created through an [`Allocator`] come and go
pub trait AllocationPolicy: Send + Sync {
    /// Name shown in logs and demo output
    fn name(&self) -> &str;

    fn allocated(&self, class_name: &'static str, size: usize);

    fn released(&self, class_name: &'static str, size: usize);

    /// Counters, for policies that keep them
    fn stats(&self) -> Option<AllocationStats> {
        None
    }
}

/// Plain heap allocation without bookkeeping
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapPolicy;

impl AllocationPolicy for HeapPolicy {
    fn name(&self) -> &str {
        "heap"
    }

    fn allocated(&self, _class_name: &'static str, _size: usize) {}

    fn released(&self, _class_name: &'static str, _size: usize) {}
}

/// Counters for one class of object
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassStats {
    pub allocated: usize,
    pub released: usize,
    pub live_bytes: usize,
}

impl ClassStats {
    pub fn live(&self) -> usize {
        self.allocated - self.released
    }
}

/// Snapshot of a [`TrackingPolicy`]
#[derive(Debug, Default, Clone)]
pub struct AllocationStats {
    pub live_objects: usize,
    pub total_allocated: usize,
    pub live_bytes: usize,
    pub classes: HashMap<&'static str, ClassStats>,
}

impl AllocationStats {
    /// Live objects of one class
    pub fn live(&self, class_name: &str) -> usize {
        self.classes
            .get(class_name)
            .map(ClassStats::live)
            .unwrap_or(0)
    }
}

/// Per-class allocation counters
#[derive(Default)]
pub struct TrackingPolicy {
    live_objects: AtomicUsize,
    total_allocated: AtomicUsize,
    classes: Mutex<HashMap<&'static str, ClassStats>>,
}

impl TrackingPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AllocationPolicy for TrackingPolicy {
    fn name(&self) -> &str {
        "tracking"
    }

    fn allocated(&self, class_name: &'static str, size: usize) {
        self.live_objects.fetch_add(1, Ordering::Relaxed);
        self.total_allocated.fetch_add(1, Ordering::Relaxed);
        let mut classes = self.classes.lock();
        let entry = classes.entry(class_name).or_default();
        entry.allocated += 1;
        entry.live_bytes += size;
    }

    fn released(&self, class_name: &'static str, size: usize) {
        self.live_objects.fetch_sub(1, Ordering::Relaxed);
        let mut classes = self.classes.lock();
        let entry = classes.entry(class_name).or_default();
        debug_assert!(entry.released < entry.allocated, "{class_name} released twice");
        entry.released += 1;
        entry.live_bytes = entry.live_bytes.saturating_sub(size);
    }

    fn stats(&self) -> Option<AllocationStats> {
        let classes = self.classes.lock().clone();
        Some(AllocationStats {
            live_objects: self.live_objects.load(Ordering::Relaxed),
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            live_bytes: classes.values().map(|class| class.live_bytes).sum(),
            classes,
        })
    }
}

/// Creates objects under an [`AllocationPolicy`]
///
/// Cloning an allocator shares its policy.
#[derive(Clone)]
pub struct Allocator {
    policy: Arc<dyn AllocationPolicy>,
}

impl Allocator {
    pub fn new(policy: Arc<dyn AllocationPolicy>) -> Self {
        Self { policy }
    }

    pub fn heap() -> Self {
        Self::new(Arc::new(HeapPolicy))
    }

    pub fn tracking() -> Self {
        Self::new(Arc::new(TrackingPolicy::new()))
    }

    /// Moves `value` to the heap and returns its first owning handle
    pub fn create<T: Object>(&self, value: T) -> RefPtr<T> {
        let size = std::mem::size_of::<T>();
        let handle = RefPtr::new_in(value, Some(self.policy.clone()));
        self.policy.allocated(handle.class_name(), size);
        handle
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn stats(&self) -> Option<AllocationStats> {
        self.policy.stats()
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::heap()
    }
}

impl fmt::Debug for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("policy", &self.policy.name())
            .finish()
    }
}
