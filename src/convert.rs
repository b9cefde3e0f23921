//! Conversions between a variant and plain Rust values.
//!
//! [`Alternative`] is the native-enum form of a variant: for `types![A, B, C]` it is
//! `Alternative<A, Alternative<B, Alternative<C, Infallible>>>`, a nested enum holding the
//! same alternative and value. The tuple view gives one `Option` per position, with only the
//! active position set.

use std::convert::Infallible;
use std::ptr;

use crate::list::{Cons, Nil, TypeList};

/// A nested two-way enum. `Head` holds the first member, `Tail` one of the rest.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum Alternative<H, T> {
    /// The first member of the list
    Head(H),
    /// A member of the remaining list
    Tail(T),
}

impl<H, T> Alternative<H, T> {
    /// Returns the head value if that is the active alternative
    pub fn head(self) -> Option<H> {
        match self {
            Alternative::Head(h) => Some(h),
            Alternative::Tail(_) => None,
        }
    }

    /// Returns the tail if the head is not the active alternative
    pub fn tail(self) -> Option<T> {
        match self {
            Alternative::Head(_) => None,
            Alternative::Tail(t) => Some(t),
        }
    }
}

/// Moves members between raw storage and their [`Alternative`] form.
pub trait EnumList: TypeList {
    /// The nested enum equivalent of the list
    type Enum;

    /// Moves the member at `index` out of `slot`.
    ///
    /// # Safety
    /// `slot` must point at a live member at `index`, which the caller must not use again.
    unsafe fn read_at(slot: *const u8, index: usize) -> Self::Enum;

    /// Moves the value into `slot` and returns its position.
    ///
    /// # Safety
    /// `slot` must be valid storage for every member and hold no live value.
    unsafe fn write_into(value: Self::Enum, slot: *mut u8) -> usize;
}

impl EnumList for Nil {
    type Enum = Infallible;

    unsafe fn read_at(_: *const u8, index: usize) -> Infallible {
        unreachable!("discriminant {} out of range", index)
    }

    #[inline]
    unsafe fn write_into(value: Infallible, _: *mut u8) -> usize {
        match value {}
    }
}

impl<H, T: EnumList> EnumList for Cons<H, T> {
    type Enum = Alternative<H, T::Enum>;

    #[inline]
    unsafe fn read_at(slot: *const u8, index: usize) -> Self::Enum {
        if index == 0 { Alternative::Head(ptr::read(slot.cast::<H>())) }
        else { Alternative::Tail(T::read_at(slot, index - 1)) }
    }

    #[inline]
    unsafe fn write_into(value: Self::Enum, slot: *mut u8) -> usize {
        match value {
            Alternative::Head(h) => { ptr::write(slot.cast::<H>(), h); 0 },
            Alternative::Tail(t) => 1 + T::write_into(t, slot),
        }
    }
}

/// Copies the active member into a tuple with one `Option` per position.
pub trait TupleList: TypeList {
    /// `(Option<T0>, Option<T1>, ...)`
    type Tuple;

    /// Builds the tuple with a clone of the member at `index`.
    ///
    /// # Safety
    /// `slot` must point at a live member at `index`.
    unsafe fn tuple_at(slot: *const u8, index: usize) -> Self::Tuple;
}

macro_rules! tuple_list { ($($t:ident)+) => {
    impl<$($t: Clone),+> TupleList for types![$($t),+] {
        type Tuple = ($(Option<$t>,)+);

        #[allow(unused_assignments)]
        unsafe fn tuple_at(slot: *const u8, index: usize) -> Self::Tuple {
            let mut position = 0;
            ($({
                let item = if position == index { Some((*slot.cast::<$t>()).clone()) } else { None };
                position += 1;
                item
            },)+)
        }
    }
}}

macro_rules! tuple_lists {
    () => {};
    ($head:ident $($tail:ident)*) => {
        tuple_list!{$head $($tail)*}
        tuple_lists!{$($tail)*}
    };
}

tuple_lists!{A B C D E F G H I J K L}
