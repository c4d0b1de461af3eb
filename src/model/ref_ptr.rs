//! Owning reference-counted handle
//!
//! [`RefPtr`] is an intrusive smart pointer: the count lives in the object's
//! [`ObjectCore`](super::ObjectCore), so a `RefPtr<dyn Object>` and a
//! `RefPtr<Group>` to the same group share one count.
//!
//! ## Destruction
//!
//! When the last handle is dropped the object's observers are disconnected
//! first, then the object is dropped. Releases that happen while another
//! object is being destroyed on the same thread are queued and destroyed by
//! the outermost call, so dropping a very deep tree uses a constant amount of
//! stack.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::sync::atomic::{fence, Ordering};
use std::sync::Arc;

use super::allocator::AllocationPolicy;
use super::object::Object;

/// Owning handle to a reference-counted [`Object`]
///
/// A handle always owns exactly one count. An absent handle is expressed as
/// `Option<RefPtr<T>>`.
pub struct RefPtr<T: Object + ?Sized> {
    ptr: NonNull<T>,
    _owns: PhantomData<T>,
}

// SAFETY: objects are `Send + Sync` and the count is atomic, so handles may
// be shared and moved across threads like `Arc`.
unsafe impl<T: Object + ?Sized> Send for RefPtr<T> {}
unsafe impl<T: Object + ?Sized> Sync for RefPtr<T> {}

impl<T: Object> RefPtr<T> {
    /// Moves `value` to the heap and takes the first owning reference
    pub fn new(value: T) -> Self {
        Self::new_in(value, None)
    }

    /// Like [`RefPtr::new`], recording the policy notified on release
    pub(crate) fn new_in(value: T, policy: Option<Arc<dyn AllocationPolicy>>) -> Self {
        let ptr = NonNull::from(Box::leak(Box::new(value)));
        // SAFETY: freshly allocated and not yet shared
        let handle = unsafe { Self::from_new_allocation(ptr, policy) };
        log::trace!("created {}", handle.class_name());
        handle
    }

    /// Converts into a handle to the object as `dyn Object`
    pub fn upcast(self) -> RefPtr<dyn Object> {
        let ptr: NonNull<dyn Object> = self.ptr;
        std::mem::forget(self);
        RefPtr {
            ptr,
            _owns: PhantomData,
        }
    }
}

impl<T: Object + ?Sized> RefPtr<T> {
    /// Wraps a pointer produced by `Box::leak` and takes the only count
    ///
    /// # Safety
    /// `ptr` must come from a `Box` allocation that no other handle owns.
    pub(crate) unsafe fn from_new_allocation(
        ptr: NonNull<T>,
        policy: Option<Arc<dyn AllocationPolicy>>,
    ) -> Self {
        ptr.as_ref().core().adopt(policy);
        Self {
            ptr,
            _owns: PhantomData,
        }
    }

    /// Takes one additional count on a live object
    ///
    /// # Safety
    /// The caller must already have incremented the count on behalf of the
    /// returned handle.
    pub(crate) unsafe fn from_counted(ptr: NonNull<T>) -> Self {
        Self {
            ptr,
            _owns: PhantomData,
        }
    }

    /// Number of owning handles to the object
    pub fn ref_count(&self) -> u32 {
        self.deref().core().ref_count()
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        std::ptr::addr_eq(a.ptr.as_ptr(), b.ptr.as_ptr())
    }

    /// Address of the object, stable for its lifetime
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as *const () as usize
    }

    /// Exclusive access when this is the only handle and nothing observes it
    ///
    /// The object may be replaced wholesale through the returned guard; the
    /// handle keeps owning the new value and its allocation policy.
    pub fn get_mut(this: &mut Self) -> Option<ExclusiveMut<'_, T>> {
        let core = this.deref().core();
        if core.ref_count() != 1 {
            return None;
        }
        if core
            .auxiliary()
            .is_some_and(|auxiliary| auxiliary.observer_count() > 0)
        {
            return None;
        }
        fence(Ordering::Acquire);
        let policy = core.policy();
        Some(ExclusiveMut {
            handle: this,
            policy,
        })
    }

    /// Downcasts to a handle of the concrete type `U`
    pub fn cast<U: Object>(&self) -> Option<RefPtr<U>> {
        self.deref().as_any().downcast_ref::<U>()?;
        let handle = self.clone();
        let ptr = handle.ptr.cast::<U>();
        std::mem::forget(handle);
        // SAFETY: the downcast proved the object is a `U` and the clone's
        // count moves to the new handle
        Some(unsafe { RefPtr::from_counted(ptr) })
    }

    pub(crate) fn as_non_null(&self) -> NonNull<T> {
        self.ptr
    }
}

impl<T: Object + ?Sized> Clone for RefPtr<T> {
    fn clone(&self) -> Self {
        let previous = self.deref().core().increment();
        if previous == u32::MAX {
            log::error!("reference count overflow on {}", self.class_name());
            std::process::abort();
        }
        // SAFETY: count taken above
        unsafe { Self::from_counted(self.ptr) }
    }

    fn clone_from(&mut self, source: &Self) {
        // new target is counted before the old one is released, so assigning
        // a handle to itself never destroys the object
        let replacement = source.clone();
        *self = replacement;
    }
}

impl<T: Object + ?Sized> Deref for RefPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the handle owns a count, so the object is alive
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: Object + ?Sized> Drop for RefPtr<T> {
    fn drop(&mut self) {
        let object = self.deref();
        let previous = object.core().decrement();
        if previous != 1 {
            if previous == 0 {
                log::error!("reference count underflow on {}", object.class_name());
                debug_assert!(false, "reference count underflow");
            }
            return;
        }
        fence(Ordering::Acquire);
        let target = NonNull::from(object.as_object());
        // SAFETY: the count reached zero and can never be raised again, this
        // thread holds the only access to the object
        unsafe { destroy(target) };
    }
}

impl<T: Object + ?Sized> fmt::Debug for RefPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefPtr")
            .field("class", &self.class_name())
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

/// Mutable access to the object behind the only [`RefPtr`]
///
/// Replacing the object through this guard also replaces its embedded
/// [`ObjectCore`](super::ObjectCore); on drop the guard hands the count and
/// allocation policy of the allocation back to whatever now occupies it.
pub struct ExclusiveMut<'a, T: Object + ?Sized> {
    handle: &'a mut RefPtr<T>,
    policy: Option<Arc<dyn AllocationPolicy>>,
}

impl<T: Object + ?Sized> Deref for ExclusiveMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &**self.handle
    }
}

impl<T: Object + ?Sized> DerefMut for ExclusiveMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: `get_mut` checked this is the only handle and nothing can
        // promote another while the handle is borrowed
        unsafe { self.handle.ptr.as_mut() }
    }
}

impl<T: Object + ?Sized> Drop for ExclusiveMut<'_, T> {
    fn drop(&mut self) {
        self.handle.core().adopt(self.policy.take());
    }
}

thread_local! {
    static DESTROYING: Cell<bool> = const { Cell::new(false) };
    static PENDING: RefCell<Vec<NonNull<dyn Object>>> = const { RefCell::new(Vec::new()) };
}

/// Resets the destruction flag even if an object's drop panics
struct DestroyGuard;

impl Drop for DestroyGuard {
    fn drop(&mut self) {
        DESTROYING.with(|flag| flag.set(false));
    }
}

/// Destroys an object whose count has reached zero
///
/// # Safety
/// `target` must point at a `Box` allocation whose count is zero and which
/// no other thread can reach.
unsafe fn destroy(target: NonNull<dyn Object>) {
    if DESTROYING.with(|flag| flag.replace(true)) {
        // the queue is gone once thread-local destructors have run it down
        let queued = PENDING
            .try_with(|pending| pending.borrow_mut().push(target))
            .is_ok();
        if !queued {
            destroy_now(target);
        }
        return;
    }
    let _guard = DestroyGuard;

    let mut next = Some(target);
    while let Some(ptr) = next {
        destroy_now(ptr);
        next = PENDING
            .try_with(|pending| pending.borrow_mut().pop())
            .ok()
            .flatten();
    }
}

unsafe fn destroy_now(ptr: NonNull<dyn Object>) {
    let object = ptr.as_ref();
    let class_name = object.class_name();
    let size = std::mem::size_of_val(object);
    let policy = object.core().policy();

    object.core().invalidate_observers();
    log::trace!("destroying {class_name}");
    drop(Box::from_raw(ptr.as_ptr()));

    if let Some(policy) = policy {
        policy.released(class_name, size);
    }
}
