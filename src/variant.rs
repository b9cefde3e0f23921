//! The variant container.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::{replace, take, ManuallyDrop, MaybeUninit};

use crate::convert::{Alternative, EnumList, TupleList};
use crate::error::AlternativeError;
use crate::list::{CloneList, Cons, DebugList, EqList, HashList, Here, Member, NonEmpty, PartialEqList, TypeList, Union};
use crate::tag::{self, Discriminant};
use crate::utils;
use crate::visit::{Handlers, HandlersMut, HandlersOnce};

/// A tagged union over the type list `L`, similar to an enum with one variant per member.
///
/// The value lives in inline storage sized and aligned for the largest member, followed by a
/// discriminant `D` naming the active member. `D` must be the smallest integer able to index
/// the list: the default `u8` covers up to 255 members, and any other choice that isn't
/// minimal fails to compile on first use.
///
/// That check is a constant evaluated during code generation, so `cargo check` alone does
/// not report a wrong `D`; `cargo build` does.
///
/// Accessors take the requested type plus an index witness that is always left as `_`:
///
/// ```
/// # #[macro_use] extern crate compact_variant;
/// # use compact_variant::Variant;
/// # fn main() {
/// let v = Variant::<types![i32, f32, i64]>::new(2.5f32);
/// assert_eq!(v.get::<f32, _>(), Some(2.5));
/// assert_eq!(v.get::<i32, _>(), None);
/// assert_eq!(v.get_or::<i64, _>(-100), -100);
/// # }
/// ```
#[repr(C)]
pub struct Variant<L: NonEmpty, D: Discriminant = u8> {
    slot: MaybeUninit<L::Storage>,
    tag: D,
    marker: PhantomData<L>,
}

impl<L: NonEmpty, D: Discriminant> Variant<L, D> {
    /// Number of alternatives
    pub const LEN: usize = L::LEN;

    const MINIMAL_DISCRIMINANT: () = assert!(
        tag::is_minimal::<D>(L::LEN),
        "the discriminant type must be the smallest integer able to index the type list"
    );

    /// Constructs a variant holding `value`, selecting the alternative by its exact type
    #[inline]
    pub fn new<T, I>(value: T) -> Self
    where L: Member<T, I> {
        let () = Self::MINIMAL_DISCRIMINANT;
        let mut slot = MaybeUninit::<L::Storage>::uninit();
        unsafe { utils::write_slot(&mut slot, value); }
        Variant { slot, tag: D::from_index(<L as Member<T, I>>::INDEX), marker: PhantomData }
    }

    /// Returns the position of `T` in the type list
    #[inline]
    pub const fn index_of<T, I>() -> usize
    where L: Member<T, I> {
        <L as Member<T, I>>::INDEX
    }

    /// Returns the position of the active alternative
    #[inline]
    pub fn index(&self) -> usize { self.tag.index() }

    /// Returns the raw discriminant
    #[inline]
    pub fn discriminant(&self) -> D { self.tag }

    /// Returns the number of alternatives
    #[inline]
    pub fn len(&self) -> usize { L::LEN }

    /// Returns `true` if `T` is the active alternative
    #[inline]
    pub fn holds_alternative<T, I>(&self) -> bool
    where L: Member<T, I> {
        self.index() == Self::index_of::<T, I>()
    }

    /// Returns `true` if `T` is the active alternative and its value equals `value`.
    /// `T` is inferred from `value` and must name exactly one member.
    #[inline]
    pub fn contains<T: PartialEq, I>(&self, value: &T) -> bool
    where L: Member<T, I> {
        self.get_ref::<T, I>().map_or(false, |v| v == value)
    }

    /// Same as `contains`
    #[inline]
    pub fn holds_value<T: PartialEq, I>(&self, value: &T) -> bool
    where L: Member<T, I> {
        self.contains::<T, I>(value)
    }

    /// Gets a reference to the `T` value if it is the active alternative
    #[inline]
    pub fn get_ref<T, I>(&self) -> Option<&T>
    where L: Member<T, I> {
        if self.holds_alternative::<T, I>() { Some(unsafe { utils::slot_ref(&self.slot) }) }
        else { None }
    }

    /// Gets a mutable reference to the `T` value if it is the active alternative
    #[inline]
    pub fn get_mut<T, I>(&mut self) -> Option<&mut T>
    where L: Member<T, I> {
        if self.holds_alternative::<T, I>() { Some(unsafe { utils::slot_mut(&mut self.slot) }) }
        else { None }
    }

    /// Clones the `T` value if it is the active alternative
    #[inline]
    pub fn get<T: Clone, I>(&self) -> Option<T>
    where L: Member<T, I> {
        self.get_ref::<T, I>().cloned()
    }

    /// Clones the `T` value if it is the active alternative, otherwise returns `T::default()`
    #[inline]
    pub fn get_or_default<T: Clone+Default, I>(&self) -> T
    where L: Member<T, I> {
        self.get_ref::<T, I>().map_or_else(T::default, Clone::clone)
    }

    /// Clones the `T` value if it is the active alternative, otherwise returns `fallback`
    #[inline]
    pub fn get_or<T: Clone, I>(&self, fallback: T) -> T
    where L: Member<T, I> {
        self.get_ref::<T, I>().map_or(fallback, Clone::clone)
    }

    /// Same as `get_or`
    #[inline]
    pub fn get_or_custom_value<T: Clone, I>(&self, fallback: T) -> T
    where L: Member<T, I> {
        self.get_or::<T, I>(fallback)
    }

    /// Clones the `T` value if it is the active alternative, otherwise calls `f`.
    /// `f` is only called when `T` is not active.
    #[inline]
    pub fn get_or_invoke<T: Clone, I, F, R>(&self, f: F) -> T
    where L: Member<T, I>, F: FnOnce() -> R, R: Into<T> {
        match self.get_ref::<T, I>() {
            Some(v) => v.clone(),
            None => f().into(),
        }
    }

    /// Gets a reference to the `T` value, or an error naming the active alternative
    pub fn try_get_ref<T, I>(&self) -> Result<&T, AlternativeError>
    where L: Member<T, I> {
        let active = self.index();
        self.get_ref::<T, I>().ok_or(AlternativeError::Mismatch { requested: Self::index_of::<T, I>(), active })
    }

    /// Gets a mutable reference to the `T` value, or an error naming the active alternative
    pub fn try_get_mut<T, I>(&mut self) -> Result<&mut T, AlternativeError>
    where L: Member<T, I> {
        let active = self.index();
        self.get_mut::<T, I>().ok_or(AlternativeError::Mismatch { requested: Self::index_of::<T, I>(), active })
    }

    /// Clones the `T` value, panicking with `msg` if it is not the active alternative
    pub fn expect<T: Clone, I>(&self, msg: &str) -> T
    where L: Member<T, I> {
        match self.get_ref::<T, I>() {
            Some(v) => v.clone(),
            None => utils::expect_failed(msg),
        }
    }

    /// Moves the `T` value out, or gives the variant back if `T` is not active
    pub fn into_inner<T, I>(self) -> Result<T, Self>
    where L: Member<T, I> {
        if self.holds_alternative::<T, I>() {
            let this = ManuallyDrop::new(self);
            Ok(unsafe { utils::read_slot(&this.slot) })
        } else {
            Err(self)
        }
    }

    /// Replaces the held value with `value`, returning the previous variant
    pub fn replace<T, I>(&mut self, value: T) -> Self
    where L: Member<T, I> {
        let old = replace(self, Self::new::<T, I>(value));
        #[cfg(feature = "tracing")]
        {
            if old.index() != self.index() {
                tracing::trace!(from = old.index(), to = self.index(), len = L::LEN, "variant alternative switched");
            }
        }
        old
    }

    /// Replaces the held value with `value` and returns a reference to it.
    /// The previous value is dropped after the new one is in place.
    pub fn emplace<T, I>(&mut self, value: T) -> &mut T
    where L: Member<T, I> {
        drop(self.replace::<T, I>(value));
        unsafe { utils::slot_mut(&mut self.slot) }
    }

    /// Replaces the held value with `value`
    #[inline]
    pub fn set<T, I>(&mut self, value: T)
    where L: Member<T, I> {
        self.emplace::<T, I>(value);
    }

    /// Takes the variant out, leaving a default one in its place
    #[inline]
    pub fn take(&mut self) -> Self
    where Self: Default {
        take(self)
    }

    /// Calls the handler at the active position with a reference to the value
    #[inline]
    pub fn visit<R, F: Handlers<L, R>>(&self, handlers: F) -> R {
        unsafe { handlers.dispatch(self.slot.as_ptr().cast(), self.index()) }
    }

    /// Calls the handler at the active position with a mutable reference to the value
    #[inline]
    pub fn visit_mut<R, F: HandlersMut<L, R>>(&mut self, handlers: F) -> R {
        let index = self.index();
        unsafe { handlers.dispatch_mut(self.slot.as_mut_ptr().cast(), index) }
    }

    /// Calls the handler at the active position with the value, consuming the variant
    #[inline]
    pub fn into_visit<R, F: HandlersOnce<L, R>>(self, handlers: F) -> R {
        let mut this = ManuallyDrop::new(self);
        let index = this.index();
        unsafe { handlers.dispatch_once(this.slot.as_mut_ptr().cast(), index) }
    }

    /// Clones the value into a tuple with one `Option` per alternative, only the active one set
    #[inline]
    pub fn as_tuple(&self) -> L::Tuple
    where L: TupleList {
        unsafe { L::tuple_at(self.slot.as_ptr().cast(), self.index()) }
    }

    /// Converts into the equivalent nested [`Alternative`](crate::Alternative) enum
    #[inline]
    pub fn into_std(self) -> L::Enum
    where L: EnumList {
        let this = ManuallyDrop::new(self);
        unsafe { L::read_at(this.slot.as_ptr().cast(), this.index()) }
    }

    /// Clones into the equivalent nested [`Alternative`](crate::Alternative) enum
    #[inline]
    pub fn to_std(&self) -> L::Enum
    where L: EnumList+CloneList {
        self.clone().into_std()
    }

    /// Constructs a variant from its nested [`Alternative`](crate::Alternative) enum form
    #[inline]
    pub fn from_std(value: L::Enum) -> Self
    where L: EnumList {
        let () = Self::MINIMAL_DISCRIMINANT;
        let mut slot = MaybeUninit::<L::Storage>::uninit();
        let index = unsafe { L::write_into(value, slot.as_mut_ptr().cast()) };
        Variant { slot, tag: D::from_index(index), marker: PhantomData }
    }
}

impl<H, T: TypeList> Variant<Cons<H, T>, u8> {
    /// Constructs a variant holding the first alternative. Usable in constant contexts.
    ///
    /// ```
    /// # #[macro_use] extern crate compact_variant;
    /// # use compact_variant::Variant;
    /// # fn main() {
    /// const EMPTY: Variant<types![String, u32]> = Variant::from_head(String::new());
    /// assert_eq!(EMPTY.get_ref::<String, _>().map(String::len), Some(0));
    /// # }
    /// ```
    #[inline]
    pub const fn from_head(value: H) -> Self {
        let () = Self::MINIMAL_DISCRIMINANT;
        Variant { slot: MaybeUninit::new(Union::head(value)), tag: 0, marker: PhantomData }
    }
}

impl<L: NonEmpty, D: Discriminant> Drop for Variant<L, D> {
    fn drop(&mut self) {
        let index = self.index();
        unsafe { L::drop_at(self.slot.as_mut_ptr().cast(), index) }
    }
}

impl<H: Default, T: TypeList, D: Discriminant> Default for Variant<Cons<H, T>, D> {
    fn default() -> Self {
        Variant::new::<H, Here>(H::default())
    }
}

impl<L: NonEmpty+CloneList, D: Discriminant> Clone for Variant<L, D> {
    fn clone(&self) -> Self {
        let mut slot = MaybeUninit::<L::Storage>::uninit();
        unsafe { L::clone_at(self.slot.as_ptr().cast(), slot.as_mut_ptr().cast(), self.index()); }
        Variant { slot, tag: self.tag, marker: PhantomData }
    }
}

impl<L: NonEmpty+PartialEqList, D: Discriminant> PartialEq for Variant<L, D> {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag &&
        unsafe { L::eq_at(self.slot.as_ptr().cast(), other.slot.as_ptr().cast(), self.index()) }
    }
}
impl<L: NonEmpty+EqList, D: Discriminant> Eq for Variant<L, D> {}

impl<L: NonEmpty+HashList, D: Discriminant> Hash for Variant<L, D> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.tag.hash(state);
        unsafe { L::hash_at(self.slot.as_ptr().cast(), self.index(), state) }
    }
}

impl<L: NonEmpty+DebugList, D: Discriminant> fmt::Debug for Variant<L, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Variant({}: ", self.index())?;
        unsafe { L::fmt_at(self.slot.as_ptr().cast(), self.index(), f)?; }
        write!(f, ")")
    }
}

impl<H, T: EnumList, D: Discriminant> From<Alternative<H, T::Enum>> for Variant<Cons<H, T>, D> {
    fn from(value: Alternative<H, T::Enum>) -> Self {
        Self::from_std(value)
    }
}

impl<H, T: EnumList, D: Discriminant> From<Variant<Cons<H, T>, D>> for Alternative<H, T::Enum> {
    fn from(value: Variant<Cons<H, T>, D>) -> Self {
        value.into_std()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::hash_map::DefaultHasher;
    use std::panic;
    use std::rc::Rc;

    type Num = Variant<types![i32, f32, i64]>;

    #[test]
    fn test_variant_default() {
        let v = Num::default();
        assert_eq!(v.index(), 0);
        assert_eq!(v.index(), Num::index_of::<i32, _>());
        assert!(v.holds_alternative::<i32, _>());
        assert!(!v.holds_alternative::<f32, _>());

        let w = Variant::<types![i16, i32, f32]>::default();
        assert_eq!(w.index(), 0);
        assert!(w.holds_alternative::<i16, _>());
    }

    #[test]
    fn test_variant_index_of() {
        assert_eq!(Num::index_of::<i32, _>(), 0);
        assert_eq!(Num::index_of::<f32, _>(), 1);
        assert_eq!(Num::index_of::<i64, _>(), 2);
        assert_eq!(Num::LEN, 3);
        assert_eq!(Variant::<types![i8, f32, String]>::index_of::<String, _>(), 2);
    }

    #[test]
    fn test_variant_fallbacks() {
        let v = Num::default();
        assert_eq!(v.get::<i32, _>(), Some(0));
        assert_eq!(v.get::<f32, _>(), None);
        assert_eq!(v.get_or_default::<f32, _>(), 0.0);
        assert_eq!(v.get_or::<i64, _>(-100), -100);
        assert_eq!(v.get_or_custom_value::<i64, _>(-7), -7);
        assert_eq!(v.get_or_invoke::<f32, _, _, _>(|| 2.5f32), 2.5);
    }

    #[test]
    fn test_variant_invoke_is_lazy() {
        let called = Cell::new(0);
        let v = Num::new(3i32);
        let r = v.get_or_invoke::<i32, _, _, _>(|| { called.set(called.get() + 1); 9i32 });
        assert_eq!(r, 3);
        assert_eq!(called.get(), 0);

        let r = v.get_or_invoke::<i64, _, _, _>(|| { called.set(called.get() + 1); 9i32 });
        assert_eq!(r, 9);
        assert_eq!(called.get(), 1);
    }

    #[test]
    fn test_variant_contains() {
        let v = Num::new(5i64);
        assert!(v.contains(&5i64));
        assert!(!v.contains(&6i64));
        assert!(!v.contains(&5i32));
        assert!(v.holds_value(&5i64));
    }

    #[test]
    fn test_variant_mut() {
        let mut v = Num::new(1.0f32);
        *v.get_mut::<f32, _>().unwrap() = 2.0;
        assert_eq!(v.get::<f32, _>(), Some(2.0));
        assert_eq!(v.get_mut::<i32, _>(), None);

        *v.emplace(4i64) += 1;
        assert_eq!(v.index(), 2);
        assert_eq!(v.get::<i64, _>(), Some(5));

        let old = v.replace(8i32);
        assert_eq!(old.get::<i64, _>(), Some(5));
        v.set(0.5f32);
        assert_eq!(v.get::<f32, _>(), Some(0.5));

        let taken = v.take();
        assert_eq!(taken.get::<f32, _>(), Some(0.5));
        assert_eq!(v.get::<i32, _>(), Some(0));
    }

    #[test]
    fn test_variant_try_get() {
        let mut v = Num::new(1i32);
        assert_eq!(v.try_get_ref::<i32, _>(), Ok(&1));
        assert_eq!(v.try_get_ref::<i64, _>(), Err(AlternativeError::Mismatch { requested: 2, active: 0 }));
        assert_eq!(v.try_get_mut::<f32, _>().unwrap_err().to_string(),
                   "alternative 1 requested but alternative 0 is active");
        assert_eq!(v.expect::<i32, _>("an i32"), 1);
    }

    #[test]
    #[should_panic(expected = "wanted a float")]
    fn test_variant_expect_mismatch() {
        Num::new(1i32).expect::<f32, _>("wanted a float");
    }

    #[test]
    fn test_variant_into_inner() {
        let v = Variant::<types![u8, String]>::new(String::from("owned"));
        let v = v.into_inner::<u8, _>().unwrap_err();
        assert_eq!(v.into_inner::<String, _>().unwrap(), "owned");
    }

    #[test]
    fn test_variant_visit() {
        let v = Num::new(2.5f32);
        let r = v.visit(handlers![|i: &i32| *i as f64, |f: &f32| *f as f64 * 2.0, |l: &i64| *l as f64]);
        assert_eq!(r, 5.0);

        let mut v = Variant::<types![u8, String]>::new(String::from("a"));
        v.visit_mut(handlers![|n: &mut u8| *n += 1, |s: &mut String| s.push('b')]);
        assert_eq!(v.get::<String, _>(), Some(String::from("ab")));

        let len = v.into_visit(handlers![|n: u8| n as usize, |s: String| s.len()]);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_variant_as_tuple() {
        let v = Num::new(7i64);
        assert_eq!(v.as_tuple(), (None, None, Some(7)));
        let v = Variant::<types![u8, String]>::new(String::from("x"));
        assert_eq!(v.as_tuple(), (None, Some(String::from("x"))));
    }

    #[test]
    fn test_variant_std_round_trip() {
        use crate::convert::Alternative::{Head, Tail};

        let v = Variant::<types![u8, String, f32]>::new(String::from("s"));
        let e = v.to_std();
        assert_eq!(e, Tail(Head(String::from("s"))));
        assert_eq!(v.into_std(), e);

        let back = Variant::<types![u8, String, f32]>::from_std(Tail(Tail(Head(1.25))));
        assert_eq!(back.get::<f32, _>(), Some(1.25));
        let back: Variant<types![u8, String, f32]> = Head(3).into();
        assert_eq!(back.get::<u8, _>(), Some(3));
        let e: Alternative<u8, _> = back.into();
        assert_eq!(e.head(), Some(3));
    }

    #[test]
    fn test_variant_traits() {
        let a = Variant::<types![u8, String]>::new(String::from("k"));
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Variant::new(1u8));
        assert_ne!(a, Variant::new(String::from("j")));

        let hash = |v: &Variant<types![u8, String]>| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&a), hash(&b));
        assert_eq!(format!("{:?}", a), "Variant(1: \"k\")");
        assert_eq!(format!("{:?}", Num::default()), "Variant(0: 0)");
    }

    struct Tracked {
        drops: Rc<Cell<usize>>,
    }

    impl Tracked {
        fn new(constructs: &Cell<usize>, drops: &Rc<Cell<usize>>) -> Self {
            constructs.set(constructs.get() + 1);
            Tracked { drops: drops.clone() }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) { self.drops.set(self.drops.get() + 1); }
    }

    #[test]
    fn test_variant_lifecycle() {
        let constructs = Cell::new(10);
        let drops = Rc::new(Cell::new(0));
        {
            let v = Variant::<types![u8, Tracked]>::new(Tracked::new(&constructs, &drops));
            assert_eq!(constructs.get(), 11);
            assert_eq!(drops.get(), 0);
            let _w = v;
        }
        assert_eq!(constructs.get(), 11);
        assert_eq!(drops.get(), 1);

        let mut v = Variant::<types![Tracked, u8]>::new(Tracked::new(&constructs, &drops));
        v.set(3u8);
        assert_eq!(drops.get(), 2);
        drop(v);
        assert_eq!(drops.get(), 2);

        let v = Variant::<types![u8, Tracked]>::new(Tracked::new(&constructs, &drops));
        let inner = v.into_inner::<Tracked, _>().ok().unwrap();
        assert_eq!(drops.get(), 2);
        drop(inner);
        assert_eq!(drops.get(), 3);
        assert_eq!(constructs.get(), 13);
    }

    #[test]
    fn test_variant_layout() {
        use std::mem::{align_of, size_of};
        let align = align_of::<i64>();
        assert_eq!(size_of::<Num>(), (size_of::<i64>() + 1 + align - 1) / align * align);
        assert_eq!(align_of::<Num>(), align_of::<i64>());
        assert_eq!(size_of::<Variant<types![u32, f32]>>(), 8);
        assert_eq!(size_of::<Variant<types![u8]>>(), 2);
        assert_eq!(Num::default().discriminant(), 0u8);

        // storage rounds 5 up to the 4-byte alignment, then the tag, then trailing padding
        let storage = (5 + 3) / 4 * 4;
        assert_eq!(size_of::<Variant<types![u32, [u8; 5]]>>(), (storage + 1 + 3) / 4 * 4);
    }

    const ZERO: Num = Num::from_head(0);

    #[test]
    fn test_variant_const_head() {
        assert_eq!(ZERO.index(), 0);
        assert_eq!(ZERO.get::<i32, _>(), Some(0));
        assert_eq!(ZERO, Num::default());

        const EMPTY: Variant<types![String, u8]> = Variant::from_head(String::new());
        let mut v = EMPTY;
        v.get_mut::<String, _>().unwrap().push('x');
        assert_eq!(v.get::<String, _>(), Some(String::from("x")));
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn test_variant_traces_only_switches() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::span::{Attributes, Id, Record};
        use tracing::{Event, Metadata};

        struct Count(Arc<AtomicUsize>);

        impl tracing::Subscriber for Count {
            fn enabled(&self, _: &Metadata<'_>) -> bool { true }
            fn new_span(&self, _: &Attributes<'_>) -> Id { Id::from_u64(1) }
            fn record(&self, _: &Id, _: &Record<'_>) {}
            fn record_follows_from(&self, _: &Id, _: &Id) {}
            fn event(&self, _: &Event<'_>) { self.0.fetch_add(1, Ordering::SeqCst); }
            fn enter(&self, _: &Id) {}
            fn exit(&self, _: &Id) {}
        }

        let events = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(Count(events.clone()), || {
            let mut v = Num::new(1i32);
            v.set(2i32);
            assert_eq!(events.load(Ordering::SeqCst), 0);
            v.set(3i64);
            assert_eq!(events.load(Ordering::SeqCst), 1);
            drop(v.replace(4i64));
            assert_eq!(events.load(Ordering::SeqCst), 1);
        });
    }

    struct Boom;

    impl Drop for Boom {
        fn drop(&mut self) { panic!("boom"); }
    }

    #[test]
    fn test_variant_set_survives_panicking_drop() {
        let mut v = Variant::<types![u8, Boom]>::new(Boom);
        let r = panic::catch_unwind(panic::AssertUnwindSafe(|| v.set(7u8)));
        assert!(r.is_err());
        assert_eq!(v.index(), 0);
        assert_eq!(v.get::<u8, _>(), Some(7));
        assert!(!v.holds_alternative::<Boom, _>());
    }
}
