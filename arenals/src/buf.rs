use core::{cell::UnsafeCell, mem::MaybeUninit, ptr::NonNull};

/// Fixed backing storage for an [`Arena`](crate::Arena).
///
/// A `Buf` never grows: the arena's capacity is whatever the buffer reports
/// when the arena is created.
///
/// # Safety
///
/// Implementors must guarantee:
/// - `base()` returns a pointer valid for reads and writes of `capacity()`
///   bytes for as long as the buffer is neither moved nor dropped
/// - writing through `base()` while `&self` is live is permitted (the bytes
///   sit behind an `UnsafeCell` or outside `self`)
/// - `base()` and `capacity()` return the same values on every call
pub unsafe trait Buf {
  /// Start of the storage.
  fn base(&self) -> NonNull<u8>;

  /// Total number of bytes.
  fn capacity(&self) -> usize;
}

// ---------------------------------------------------------------------------
// FixedBuf
// ---------------------------------------------------------------------------

/// Inline fixed-capacity storage with 16-byte alignment.
///
/// `FixedBuf<N>` provides `N` bytes with no heap allocation, for arenas on the
/// stack, in a `static`, or on `no_std` targets.
///
/// ```
/// use arenals::{Arena, FixedBuf};
///
/// let arena = Arena::new(FixedBuf::<256>::new());
/// assert_eq!(arena.capacity(), 256);
/// ```
#[repr(C, align(16))]
pub struct FixedBuf<const N: usize> {
  data: UnsafeCell<[MaybeUninit<u8>; N]>,
}

impl<const N: usize> FixedBuf<N> {
  /// Create an uninitialized fixed buffer.
  ///
  /// This is `const`, enabling `static` storage.
  #[must_use]
  pub const fn new() -> Self {
    Self { data: UnsafeCell::new([MaybeUninit::uninit(); N]) }
  }
}

impl<const N: usize> Default for FixedBuf<N> {
  fn default() -> Self {
    Self::new()
  }
}

// SAFETY: The bytes live in an UnsafeCell inside self, so writes through the
// derived pointer are allowed while &self is live. The pointer is valid for N
// bytes until self moves, and callers borrow the owning arena for as long as
// they use it.
unsafe impl<const N: usize> Buf for FixedBuf<N> {
  fn base(&self) -> NonNull<u8> {
    // SAFETY: UnsafeCell::get never returns null.
    unsafe { NonNull::new_unchecked(self.data.get().cast::<u8>()) }
  }

  fn capacity(&self) -> usize {
    N
  }
}

// SAFETY: FixedBuf holds only bytes; moving it to another thread moves them.
unsafe impl<const N: usize> Send for FixedBuf<N> {}
