use core::{cell::Cell, marker::PhantomData};

/// Marker trait for values that can be placed in an [`Arena`](crate::Arena).
///
/// # Safety
///
/// The arena reclaims memory in bulk on [`reset`](crate::Arena::reset) and
/// never runs destructors. Implementors must satisfy:
///
/// 1. **No `Drop`**: the type must not need drop glue. [`Arena::alloc`]
///    re-checks this with `const { assert!(!needs_drop::<T>()) }`.
/// 2. **All fields are `Flat`**: every field type must itself implement
///    `Flat`. The derive macro enforces this with where-clause bounds.
///
/// References are `Flat`: a value in the arena may point at data that lives at
/// least as long as the arena borrow, including other arena values.
///
/// # Derive macro
///
/// `#[derive(Flat)]` generates the impl for structs and enums:
///
/// ```
/// use arenals::{Flat, Str};
///
/// #[derive(Flat, Clone, Copy)]
/// struct Tagged<'a> {
///   tag: u8,
///   name: Str<'a>,
/// }
/// ```
///
/// A field that owns heap memory is rejected where the type is defined:
///
/// ```compile_fail
/// use arenals::Flat;
///
/// #[derive(Flat)]
/// struct Owned {
///   name: String,
/// }
/// ```
///
/// [`Arena::alloc`]: crate::Arena::alloc
pub unsafe trait Flat: Sized {}

macro_rules! impl_flat {
  ($($ty:ty),* $(,)?) => {
    $(
      // SAFETY: Primitive types have no Drop and own no memory.
      unsafe impl Flat for $ty {}
    )*
  };
}

impl_flat!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, ());

// SAFETY: Shared references have no Drop; the referent's lifetime is tracked
// by the borrow checker, not by the arena.
unsafe impl<T: ?Sized> Flat for &T {}

// SAFETY: Option<T> needs drop only if T does.
unsafe impl<T: Flat> Flat for Option<T> {}

// SAFETY: Cell<T> is a transparent wrapper around T.
unsafe impl<T: Flat> Flat for Cell<T> {}

// SAFETY: Arrays of Flat values have no Drop.
unsafe impl<T: Flat, const N: usize> Flat for [T; N] {}

// SAFETY: PhantomData is zero-sized and has no Drop.
unsafe impl<T: ?Sized> Flat for PhantomData<T> {}
