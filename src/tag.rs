//! Discriminant integers and the width tiers used to pick them.

use std::fmt;
use std::hash::Hash;
use std::mem::size_of;

/// An unsigned integer recording which alternative of a variant is active.
/// If you implement this trait incorrectly, you will break memory safety.
pub unsafe trait Discriminant: Copy+Eq+Hash+fmt::Debug {
    /// The largest number of alternatives this discriminant is chosen for
    const MAX_COUNT: usize;
    /// The size of the discriminant in bytes
    const SIZE: usize = size_of::<Self>();

    /// Converts a position in the type list into a discriminant
    fn from_index(index: usize) -> Self;
    /// Converts the discriminant back into a position in the type list
    fn index(self) -> usize;
}

macro_rules! discriminant { ($($t:ty)+) => {$(
    unsafe impl Discriminant for $t {
        const MAX_COUNT: usize = <$t>::MAX as usize;

        #[inline]
        fn from_index(index: usize) -> Self {
            debug_assert!(index < Self::MAX_COUNT);
            index as $t
        }
        #[inline]
        fn index(self) -> usize { self as usize }
    }
)+}}

discriminant!{u8 u16 u32 usize}

/// The size in bytes of the smallest discriminant able to tell `count` alternatives apart.
///
/// Up to 255 alternatives fit in a `u8`, up to 65535 in a `u16`, up to `u32::MAX` in a `u32`,
/// and anything beyond that uses the native word.
pub const fn discriminant_size(count: usize) -> usize {
    if count <= u8::MAX as usize { 1 }
    else if count <= u16::MAX as usize { 2 }
    else if count as u64 <= u32::MAX as u64 { 4 }
    else { size_of::<usize>() }
}

/// Returns `true` if `D` is the minimal discriminant for `count` alternatives.
pub const fn is_minimal<D: Discriminant>(count: usize) -> bool {
    count <= D::MAX_COUNT && D::SIZE == discriminant_size(count)
}
