//! Base object trait and the state embedded in every object
//!
//! Every scene node, named value and resource is an [`Object`]. An object
//! carries an [`ObjectCore`] holding its atomic reference count, the lazily
//! created [`Auxiliary`] side-table and the allocation policy that created it.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::allocator::AllocationPolicy;
use super::auxiliary::Auxiliary;
use super::ref_ptr::RefPtr;
use super::value::Value;
use crate::error::LookupError;
use crate::visit::Visitor;

/// Conversion helpers implemented for every sized [`Object`]
///
/// Lets trait default methods and `dyn Object` callers reach the concrete
/// object as a trait object or as [`Any`] for downcasting.
pub trait AsObject {
    fn as_object(&self) -> &(dyn Object + 'static);
    fn as_any(&self) -> &dyn Any;
}

impl<T: Object> AsObject for T {
    fn as_object(&self) -> &(dyn Object + 'static) {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reference-countable entity of the object model
///
/// Implementors embed an [`ObjectCore`] and return it from [`Object::core`].
/// Objects are normally owned through [`RefPtr`] and observed through
/// [`ObserverPtr`](super::ObserverPtr).
///
/// ## Visiting
///
/// [`Object::accept`] is the first half of the double dispatch: a node calls
/// the visitor method matching its own type. The default calls
/// [`Visitor::apply_object`], so types unknown to a visitor are still
/// traversed through [`Object::traverse`].
pub trait Object: AsObject + Send + Sync + 'static {
    /// Embedded reference count and side-table
    fn core(&self) -> &ObjectCore;

    /// Short type name used by counting and printing visitors
    fn class_name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }

    /// Dispatches to the visitor method matching this type
    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.apply_object(self.as_object());
    }

    /// Dispatches `accept` to each child in storage order
    fn traverse(&self, _visitor: &mut dyn Visitor) {}
}

/// State shared by every object: reference count, auxiliary, allocation policy
pub struct ObjectCore {
    ref_count: AtomicU32,
    auxiliary: OnceLock<Arc<Auxiliary>>,
    policy: Mutex<Option<Arc<dyn AllocationPolicy>>>,
}

impl ObjectCore {
    pub fn new() -> Self {
        Self {
            ref_count: AtomicU32::new(0),
            auxiliary: OnceLock::new(),
            policy: Mutex::new(None),
        }
    }

    /// Current number of owning handles
    pub fn ref_count(&self) -> u32 {
        self.ref_count.load(Ordering::Acquire)
    }

    /// The auxiliary, if one has been created
    pub fn auxiliary(&self) -> Option<&Arc<Auxiliary>> {
        self.auxiliary.get()
    }

    /// Returns the auxiliary, creating it on first demand
    pub fn get_or_create_auxiliary(&self) -> &Arc<Auxiliary> {
        self.auxiliary.get_or_init(|| {
            log::debug!("creating auxiliary side-table");
            Arc::new(Auxiliary::new())
        })
    }

    pub(crate) fn policy(&self) -> Option<Arc<dyn AllocationPolicy>> {
        self.policy.lock().clone()
    }

    /// Makes the object owned by exactly one handle, created by `policy`
    ///
    /// Any count carried by an object moved in by value is stale: no handle
    /// can point at a value that is not in its heap allocation.
    pub(crate) fn adopt(&self, policy: Option<Arc<dyn AllocationPolicy>>) {
        self.ref_count.store(1, Ordering::Release);
        *self.policy.lock() = policy;
    }

    /// Adds one owning reference, returning the previous count
    pub(crate) fn increment(&self) -> u32 {
        self.ref_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Removes one owning reference, returning the previous count
    pub(crate) fn decrement(&self) -> u32 {
        self.ref_count.fetch_sub(1, Ordering::Release)
    }

    /// Increments only if the count is non-zero
    ///
    /// A count that has reached zero is final: the object is being destroyed
    /// and must never be handed out again.
    pub(crate) fn try_increment(&self) -> bool {
        let mut current = self.ref_count.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return false;
            }
            match self.ref_count.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Disconnects observers and releases the named child objects
    pub(crate) fn invalidate_observers(&self) {
        if let Some(auxiliary) = self.auxiliary.get() {
            auxiliary.disconnect();
        }
    }
}

impl Default for ObjectCore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ObjectCore {
    fn drop(&mut self) {
        // objects dropped outside a RefPtr still disconnect their auxiliary
        self.invalidate_observers();
    }
}

impl fmt::Debug for ObjectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCore")
            .field("ref_count", &self.ref_count())
            .field("has_auxiliary", &self.auxiliary.get().is_some())
            .finish()
    }
}

/// Named value and named object access for every object
///
/// Values are stored as [`Value<T>`] objects in the auxiliary's object map,
/// so a key holds exactly one binding regardless of its type.
pub trait ObjectExt: Object {
    /// Binds `value` to `key`, replacing any previous binding
    fn set_value<V>(&self, key: impl Into<String>, value: V)
    where
        V: Clone + Send + Sync + 'static,
    {
        self.set_object(key, RefPtr::new(Value::new(value)).upcast());
    }

    /// Value bound to `key`, or `None` when missing or of another type
    fn get_value<V>(&self, key: &str) -> Option<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.get_object_as::<Value<V>>(key)
            .map(|value| value.value().clone())
    }

    /// Like [`ObjectExt::get_value`] but reports why the lookup failed
    fn require_value<V>(&self, key: &str) -> Result<V, LookupError>
    where
        V: Clone + Send + Sync + 'static,
    {
        let object = self.get_object(key).ok_or_else(|| LookupError::Missing {
            key: key.to_string(),
        })?;
        object
            .as_any()
            .downcast_ref::<Value<V>>()
            .map(|value| value.value().clone())
            .ok_or_else(|| LookupError::TypeMismatch {
                key: key.to_string(),
                expected: short_type_name(type_name::<Value<V>>()),
                found: object.class_name(),
            })
    }

    /// Binds an owned child object to `key`
    fn set_object(&self, key: impl Into<String>, object: RefPtr<dyn Object>) {
        self.core().get_or_create_auxiliary().set_object(key, object);
    }

    fn get_object(&self, key: &str) -> Option<RefPtr<dyn Object>> {
        self.core().auxiliary()?.get_object(key)
    }

    /// Named child object downcast to `T`
    fn get_object_as<T: Object>(&self, key: &str) -> Option<RefPtr<T>> {
        self.get_object(key)?.cast::<T>()
    }

    /// Removes and returns the binding for `key`
    fn remove_object(&self, key: &str) -> Option<RefPtr<dyn Object>> {
        self.core().auxiliary()?.remove_object(key)
    }

    /// Keys in insertion order
    fn object_keys(&self) -> Vec<String> {
        self.core()
            .auxiliary()
            .map(|auxiliary| auxiliary.keys())
            .unwrap_or_default()
    }

    fn ref_count(&self) -> u32 {
        self.core().ref_count()
    }

    fn auxiliary(&self) -> Option<&Arc<Auxiliary>> {
        self.core().auxiliary()
    }

    /// Number of live observer handles registered on this object
    fn observer_count(&self) -> usize {
        self.core()
            .auxiliary()
            .map(|auxiliary| auxiliary.observer_count())
            .unwrap_or(0)
    }
}

impl<T: Object + ?Sized> ObjectExt for T {}

/// Strips module paths from every segment of a type name
///
/// `scenecore::model::value::Value<alloc::string::String>` becomes
/// `Value<String>`.
pub fn short_type_name(full: &'static str) -> &'static str {
    use std::cell::RefCell;
    use std::collections::HashMap;

    thread_local! {
        static CACHE: RefCell<HashMap<&'static str, &'static str>> = RefCell::new(HashMap::new());
    }

    if !full.contains("::") {
        return full;
    }
    if let Some(short) = CACHE.with(|cache| cache.borrow().get(full).copied()) {
        return short;
    }

    let mut short = String::with_capacity(full.len());
    let mut segment_start = 0;
    for (index, ch) in full.char_indices() {
        if matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
            short.push_str(last_path_segment(&full[segment_start..index]));
            short.push(ch);
            segment_start = index + ch.len_utf8();
        }
    }
    short.push_str(last_path_segment(&full[segment_start..]));

    let short = intern(short);
    CACHE.with(|cache| cache.borrow_mut().insert(full, short));
    short
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn intern(name: String) -> &'static str {
    use std::collections::HashSet;

    static NAMES: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    let mut names = NAMES.get_or_init(|| Mutex::new(HashSet::new())).lock();
    if let Some(existing) = names.get(name.as_str()) {
        return *existing;
    }
    let leaked: &'static str = Box::leak(name.into_boxed_str());
    names.insert(leaked);
    leaked
}
