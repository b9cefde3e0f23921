//! Space-efficient variant values.
//!
//! A [`Variant`] holds exactly one value out of a fixed list of types, like an enum declared
//! on the spot. It takes no more room than its largest member plus the smallest integer that
//! can tell the members apart (a single byte for up to 255 members), and its accessors never
//! panic on a type mismatch: they return `None`, a default, or a fallback instead.
//!
//! ```
//! #[macro_use] extern crate compact_variant;
//! use compact_variant::Variant;
//!
//! # fn main() {
//! let mut v = Variant::<types![i32, f32, String]>::default();
//! assert!(v.holds_alternative::<i32, _>());
//! assert_eq!(v.get_or_default::<f32, _>(), 0.0);
//!
//! v.set(String::from("hello"));
//! assert!(v.contains(&String::from("hello")));
//!
//! let len = v.visit(handlers![|_: &i32| 0, |_: &f32| 0, |s: &String| s.len()]);
//! assert_eq!(len, 5);
//! # }
//! ```
//!
//! Mistakes in the type list or the requested type are compile errors, never runtime ones.
//! Asking for a type that is not in the list:
//!
//! ```compile_fail
//! # #[macro_use] extern crate compact_variant;
//! # fn main() {
//! let v = compact_variant::Variant::<types![i32, f32]>::default();
//! v.get::<u64, _>();
//! # }
//! ```
//!
//! An empty type list:
//!
//! ```compile_fail
//! # #[macro_use] extern crate compact_variant;
//! # fn main() {
//! let v: Option<compact_variant::Variant<types![]>> = None;
//! # }
//! ```
//!
//! A discriminant wider than the list needs:
//!
//! ```compile_fail
//! # #[macro_use] extern crate compact_variant;
//! # fn main() {
//! let v = compact_variant::Variant::<types![i32, f32], u16>::new(1i32);
//! # }
//! ```

#![warn(missing_docs)]

/// Builds a type list out of a comma separated list of types.
///
/// `types![A, B, C]` is `Cons<A, Cons<B, Cons<C, Nil>>>`.
#[macro_export]
macro_rules! types {
    () => { $crate::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => { $crate::Cons<$head, $crate::types![$($tail),*]> };
}

/// Builds a handler list for [`Variant::visit`] out of one closure per alternative.
#[macro_export]
macro_rules! handlers {
    () => { $crate::Nil };
    ($head:expr $(, $tail:expr)* $(,)?) => { $crate::Cons($head, $crate::handlers!($($tail),*)) };
}

pub mod convert;
pub mod error;
pub mod list;
pub mod tag;
mod utils;
pub mod variant;
pub mod visit;

pub use convert::Alternative;
pub use error::AlternativeError;
pub use list::{Cons, Member, NonEmpty, Nil, TypeList};
pub use tag::Discriminant;
pub use variant::Variant;

// Layout claims
const _: () = {
    use std::mem::{align_of, size_of};

    assert!(size_of::<Variant<types![u32, f32]>>() == 8);
    assert!(size_of::<Variant<types![u8, u16]>>() == 4);
    // round_up(round_up(5, 4) + 1, 4): storage is padded to its alignment before the tag
    assert!(size_of::<Variant<types![u32, [u8; 5]]>>() == 12);
    assert!(align_of::<Variant<types![u64, u8]>>() == align_of::<u64>());
    assert!(size_of::<Variant<types![u8]>>() == 2);

    assert!(<types![i8, i16]>::MAX_SIZE == 2);
    assert!(<types![i32, i64]>::MAX_ALIGN == align_of::<i64>());
    assert!(tag::discriminant_size(3) == 1);
};
