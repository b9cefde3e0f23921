//! Compile-time type lists.
//!
//! A type list is a chain of [`Cons`] cells ending in [`Nil`], usually written with the
//! [`types!`](crate::types) macro. Everything a variant needs to know about its members
//! (storage layout, the position of each type, and how to drop, clone, compare, hash or
//! print the member at a given position) is computed by recursing over that chain.
//! Each recursion step peels one member off the front and shifts the position down by one,
//! so a lookup monomorphizes into a short chain of integer comparisons.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::{align_of, size_of, ManuallyDrop};
use std::ptr;

/// A type list cell holding `H` followed by the list `T`.
///
/// The same cell doubles as a value list, which is how visitation handlers are passed
/// (see [`handlers!`](crate::handlers)).
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct Cons<H, T>(pub H, pub T);

/// The empty type list
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct Nil;

/// Storage large and aligned enough for `H` and every member of the tail storage `T`.
#[repr(C)]
#[allow(dead_code)]
pub union Union<H, T> {
    head: ManuallyDrop<H>,
    tail: ManuallyDrop<T>,
}

impl<H, T> Union<H, T> {
    /// Storage holding `value` as the first member
    pub const fn head(value: H) -> Self {
        Union { head: ManuallyDrop::new(value) }
    }
}

const fn max(a: usize, b: usize) -> usize { if a > b { a } else { b } }

/// Layout facts and drop dispatch for a type list.
pub trait TypeList {
    /// Number of members
    const LEN: usize;
    /// Largest member size
    const MAX_SIZE: usize;
    /// Largest member alignment
    const MAX_ALIGN: usize;
    /// A type sized and aligned to hold any member
    type Storage;

    /// Drops the member at `index` in place. Out of range indices are a no-op.
    ///
    /// # Safety
    /// `slot` must point at a live value of the member at `index`.
    unsafe fn drop_at(slot: *mut u8, index: usize);
}

impl TypeList for Nil {
    const LEN: usize = 0;
    const MAX_SIZE: usize = 0;
    const MAX_ALIGN: usize = 1;
    type Storage = ();

    #[inline]
    unsafe fn drop_at(_: *mut u8, _: usize) {}
}

impl<H, T: TypeList> TypeList for Cons<H, T> {
    const LEN: usize = 1 + T::LEN;
    const MAX_SIZE: usize = max(size_of::<H>(), T::MAX_SIZE);
    const MAX_ALIGN: usize = max(align_of::<H>(), T::MAX_ALIGN);
    type Storage = Union<H, T::Storage>;

    #[inline]
    unsafe fn drop_at(slot: *mut u8, index: usize) {
        if index == 0 { ptr::drop_in_place(slot.cast::<H>()) }
        else { T::drop_at(slot, index - 1) }
    }
}

/// A type list with at least one member. Only these can back a variant.
pub trait NonEmpty: TypeList {}

impl<H, T: TypeList> NonEmpty for Cons<H, T> {}

/// Index witness: the type is the head of the list.
pub struct Here;

/// Index witness: the type is somewhere in the tail, at the position witnessed by `I`.
pub struct There<I>(PhantomData<I>);

/// Implemented when `T` is a member of the list, at the position witnessed by `I`.
///
/// `I` is always left to inference. If `T` is not a member, or appears more than once,
/// inference fails and so does compilation.
pub trait Member<T, I>: TypeList {
    /// Position of `T` in the list
    const INDEX: usize;
}

impl<H, T: TypeList> Member<H, Here> for Cons<H, T> {
    const INDEX: usize = 0;
}

impl<H, X, T: Member<X, I>, I> Member<X, There<I>> for Cons<H, T> {
    const INDEX: usize = 1 + T::INDEX;
}

/// Clone dispatch, available when every member is `Clone`.
pub trait CloneList: TypeList {
    /// Clones the member at `index` from `src` into the uninitialized `dst`.
    ///
    /// # Safety
    /// `src` must point at a live member at `index`; `dst` must be valid storage for it.
    unsafe fn clone_at(src: *const u8, dst: *mut u8, index: usize);
}

impl CloneList for Nil {
    #[inline]
    unsafe fn clone_at(_: *const u8, _: *mut u8, _: usize) {}
}

impl<H: Clone, T: CloneList> CloneList for Cons<H, T> {
    #[inline]
    unsafe fn clone_at(src: *const u8, dst: *mut u8, index: usize) {
        if index == 0 { ptr::write(dst.cast::<H>(), (*src.cast::<H>()).clone()) }
        else { T::clone_at(src, dst, index - 1) }
    }
}

/// Equality dispatch, available when every member is `PartialEq`.
pub trait PartialEqList: TypeList {
    /// Compares two live members at the same `index`.
    ///
    /// # Safety
    /// Both pointers must point at live members at `index`.
    unsafe fn eq_at(a: *const u8, b: *const u8, index: usize) -> bool;
}

impl PartialEqList for Nil {
    #[inline]
    unsafe fn eq_at(_: *const u8, _: *const u8, _: usize) -> bool { false }
}

impl<H: PartialEq, T: PartialEqList> PartialEqList for Cons<H, T> {
    #[inline]
    unsafe fn eq_at(a: *const u8, b: *const u8, index: usize) -> bool {
        if index == 0 { *a.cast::<H>() == *b.cast::<H>() }
        else { T::eq_at(a, b, index - 1) }
    }
}

/// Marker for lists whose members are all `Eq`.
pub trait EqList: PartialEqList {}

impl EqList for Nil {}
impl<H: Eq, T: EqList> EqList for Cons<H, T> {}

/// Hash dispatch, available when every member is `Hash`.
pub trait HashList: TypeList {
    /// Feeds the member at `index` into `state`.
    ///
    /// # Safety
    /// `slot` must point at a live member at `index`.
    unsafe fn hash_at<S: Hasher>(slot: *const u8, index: usize, state: &mut S);
}

impl HashList for Nil {
    #[inline]
    unsafe fn hash_at<S: Hasher>(_: *const u8, _: usize, _: &mut S) {}
}

impl<H: Hash, T: HashList> HashList for Cons<H, T> {
    #[inline]
    unsafe fn hash_at<S: Hasher>(slot: *const u8, index: usize, state: &mut S) {
        if index == 0 { (*slot.cast::<H>()).hash(state) }
        else { T::hash_at(slot, index - 1, state) }
    }
}

/// Debug formatting dispatch, available when every member is `Debug`.
pub trait DebugList: TypeList {
    /// Formats the member at `index`.
    ///
    /// # Safety
    /// `slot` must point at a live member at `index`.
    unsafe fn fmt_at(slot: *const u8, index: usize, f: &mut fmt::Formatter) -> fmt::Result;
}

impl DebugList for Nil {
    #[inline]
    unsafe fn fmt_at(_: *const u8, _: usize, _: &mut fmt::Formatter) -> fmt::Result { Ok(()) }
}

impl<H: fmt::Debug, T: DebugList> DebugList for Cons<H, T> {
    unsafe fn fmt_at(slot: *const u8, index: usize, f: &mut fmt::Formatter) -> fmt::Result {
        if index == 0 { fmt::Debug::fmt(&*slot.cast::<H>(), f) }
        else { T::fmt_at(slot, index - 1, f) }
    }
}
