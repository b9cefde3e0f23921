//! Positional visitation.
//!
//! A handler list is a value list of closures, one per member of the type list and in the
//! same order, built with [`handlers!`](crate::handlers). The closure at the active position
//! is the only one called. A handler list that is too short, too long, or whose closure
//! parameter types don't line up with the members does not compile.

use std::ptr;

use crate::list::{Cons, Nil};

/// Handlers taking each member by shared reference.
pub trait Handlers<L, R> {
    /// Calls the handler at `index` with the member `slot` points at.
    ///
    /// # Safety
    /// `slot` must point at a live member at `index`.
    unsafe fn dispatch(self, slot: *const u8, index: usize) -> R;
}

/// Handlers taking each member by mutable reference.
pub trait HandlersMut<L, R> {
    /// Calls the handler at `index` with the member `slot` points at.
    ///
    /// # Safety
    /// `slot` must point at a live member at `index`, not aliased elsewhere.
    unsafe fn dispatch_mut(self, slot: *mut u8, index: usize) -> R;
}

/// Handlers taking each member by value.
pub trait HandlersOnce<L, R> {
    /// Moves the member out of `slot` and calls the handler at `index` with it.
    ///
    /// # Safety
    /// `slot` must point at a live member at `index`, which the caller must not use again.
    unsafe fn dispatch_once(self, slot: *mut u8, index: usize) -> R;
}

impl<R> Handlers<Nil, R> for Nil {
    unsafe fn dispatch(self, _: *const u8, index: usize) -> R {
        unreachable!("discriminant {} out of range", index)
    }
}

impl<H, T, F, FT, R> Handlers<Cons<H, T>, R> for Cons<F, FT>
where F: FnOnce(&H) -> R, FT: Handlers<T, R> {
    #[inline]
    unsafe fn dispatch(self, slot: *const u8, index: usize) -> R {
        if index == 0 { (self.0)(&*slot.cast::<H>()) }
        else { self.1.dispatch(slot, index - 1) }
    }
}

impl<R> HandlersMut<Nil, R> for Nil {
    unsafe fn dispatch_mut(self, _: *mut u8, index: usize) -> R {
        unreachable!("discriminant {} out of range", index)
    }
}

impl<H, T, F, FT, R> HandlersMut<Cons<H, T>, R> for Cons<F, FT>
where F: FnOnce(&mut H) -> R, FT: HandlersMut<T, R> {
    #[inline]
    unsafe fn dispatch_mut(self, slot: *mut u8, index: usize) -> R {
        if index == 0 { (self.0)(&mut *slot.cast::<H>()) }
        else { self.1.dispatch_mut(slot, index - 1) }
    }
}

impl<R> HandlersOnce<Nil, R> for Nil {
    unsafe fn dispatch_once(self, _: *mut u8, index: usize) -> R {
        unreachable!("discriminant {} out of range", index)
    }
}

impl<H, T, F, FT, R> HandlersOnce<Cons<H, T>, R> for Cons<F, FT>
where F: FnOnce(H) -> R, FT: HandlersOnce<T, R> {
    #[inline]
    unsafe fn dispatch_once(self, slot: *mut u8, index: usize) -> R {
        if index == 0 { (self.0)(ptr::read(slot.cast::<H>())) }
        else { self.1.dispatch_once(slot, index - 1) }
    }
}
