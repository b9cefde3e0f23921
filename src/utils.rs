//! Raw slot access.
//!
//! Every read, write and reinterpretation of a variant's storage goes through
//! these helpers. A slot of type `MaybeUninit<S>` may be viewed as a `T` only
//! when `T` is one of the members `S` was built from and the discriminator
//! currently names `T`.

use std::mem::{align_of, size_of, MaybeUninit};
use std::ptr;

// This is a separate function to reduce the code size of .expect() itself.
#[inline(never)]
#[cold]
pub fn expect_failed(msg: &str) -> ! {
    panic!("{}", msg)
}

#[inline]
fn debug_check_fits<S, T>() {
    debug_assert!(size_of::<T>() <= size_of::<S>());
    debug_assert!(align_of::<T>() <= align_of::<S>());
}

/// Interprets an initialized slot as `&T`.
///
/// # Safety
/// The slot must hold a live `T`.
#[inline]
pub unsafe fn slot_ref<S, T>(slot: &MaybeUninit<S>) -> &T {
    debug_check_fits::<S, T>();
    &*slot.as_ptr().cast::<T>()
}

/// Interprets an initialized slot as `&mut T`.
///
/// # Safety
/// The slot must hold a live `T`.
#[inline]
pub unsafe fn slot_mut<S, T>(slot: &mut MaybeUninit<S>) -> &mut T {
    debug_check_fits::<S, T>();
    &mut *slot.as_mut_ptr().cast::<T>()
}

/// Writes `value` into the slot without dropping whatever bytes were there.
///
/// # Safety
/// Any live value in the slot must already have been moved out or dropped.
#[inline]
pub unsafe fn write_slot<S, T>(slot: &mut MaybeUninit<S>, value: T) {
    debug_check_fits::<S, T>();
    ptr::write(slot.as_mut_ptr().cast::<T>(), value)
}

/// Bitwise-moves the `T` out of the slot.
///
/// # Safety
/// The slot must hold a live `T`, and the caller must not drop it again.
#[inline]
pub unsafe fn read_slot<S, T>(slot: &MaybeUninit<S>) -> T {
    debug_check_fits::<S, T>();
    ptr::read(slot.as_ptr().cast::<T>())
}
