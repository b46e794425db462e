use core::{alloc::Layout, cell::Cell, fmt, ptr::NonNull};

use crate::{Flat, buf::Buf};

/// A bump allocator over one fixed buffer.
///
/// The arena hands out disjoint regions of its buffer in allocation order and
/// reclaims them all at once. There is no per-object free.
///
/// ```text
/// base                              base + used              base + capacity
/// ├── a ──┤pad├──── b ────┤── c ──┤ ───────────── free ────────────────┤
/// ```
///
/// # Lifetimes
///
/// Allocation takes `&self`, so any number of live references may coexist.
/// [`reset`](Self::reset) and [`scope`](Self::scope) take `&mut self`, so the
/// borrow checker rejects a reference held across either of them:
///
/// ```compile_fail
/// use arenals::{Arena, FixedBuf};
///
/// let mut arena = Arena::new(FixedBuf::<64>::new());
/// let n = arena.alloc(7u32).unwrap();
/// arena.reset();
/// assert_eq!(*n, 7); // `n` would dangle: must not compile.
/// ```
///
/// # Failure
///
/// Every allocation returns `None` once the buffer is exhausted. The arena is
/// left unchanged by a failed allocation, so the caller decides whether to
/// skip the unit of work, stop, or propagate.
pub struct Arena<B: Buf> {
  buf: B,
  used: Cell<usize>,
}

impl<B: Buf> Arena<B> {
  /// Wrap `buf` in an empty arena.
  pub const fn new(buf: B) -> Self {
    Self { buf, used: Cell::new(0) }
  }

  /// Total number of bytes in the backing buffer.
  #[must_use]
  pub fn capacity(&self) -> usize {
    self.buf.capacity()
  }

  /// Bytes handed out since the last reset, alignment padding included.
  #[must_use]
  pub fn used(&self) -> usize {
    self.used.get()
  }

  /// Bytes still available, ignoring any alignment padding a request needs.
  #[must_use]
  pub fn remaining(&self) -> usize {
    self.capacity() - self.used()
  }

  /// Returns `true` if nothing has been allocated since the last reset.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.used() == 0
  }

  /// Start of the backing buffer.
  #[must_use]
  pub fn base(&self) -> NonNull<u8> {
    self.buf.base()
  }

  /// Reserve `size` bytes aligned to `align`.
  ///
  /// The region starts at the first address at or after `base + used` that is
  /// a multiple of `align`. Returns `None`, leaving the arena untouched, if
  /// `align` is not a power of two or the padded request does not fit.
  ///
  /// The returned memory is uninitialized.
  pub fn alloc_raw(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
    if !align.is_power_of_two() {
      return None;
    }
    let base = self.buf.base();
    let base_addr = base.addr().get();
    let cursor = base_addr.checked_add(self.used.get())?;
    let start = cursor.checked_next_multiple_of(align)? - base_addr;
    let end = start.checked_add(size)?;
    if end > self.capacity() {
      return None;
    }
    self.used.set(end);
    // SAFETY: `start <= end <= capacity`, so the offset stays inside the
    // buffer (or one past its end for a zero-sized request at the boundary).
    Some(unsafe { base.add(start) })
  }

  /// Reserve uninitialized memory for `layout`.
  pub fn alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
    self.alloc_raw(layout.size(), layout.align())
  }

  /// Move `value` into the arena and return a reference to it.
  ///
  /// ```
  /// use arenals::{Arena, FixedBuf};
  ///
  /// let arena = Arena::new(FixedBuf::<64>::new());
  /// let a = arena.alloc(1u32).unwrap();
  /// let b = arena.alloc(2u64).unwrap();
  /// *a += 10;
  /// assert_eq!((*a, *b), (11, 2));
  /// ```
  #[expect(clippy::mut_from_ref, reason = "every call returns a fresh, disjoint region")]
  pub fn alloc<T: Flat>(&self, value: T) -> Option<&mut T> {
    const { assert!(!core::mem::needs_drop::<T>(), "arena values must not need Drop") };
    let ptr = self.alloc_layout(Layout::new::<T>())?.cast::<T>();
    // SAFETY: `ptr` is aligned for `T`, valid for `size_of::<T>()` bytes, and
    // no other reference covers it: the bump cursor has moved past it.
    unsafe {
      ptr.write(value);
      Some(&mut *ptr.as_ptr())
    }
  }

  /// Reserve `len` zeroed bytes.
  #[expect(clippy::mut_from_ref, reason = "every call returns a fresh, disjoint region")]
  pub fn alloc_bytes(&self, len: usize) -> Option<&mut [u8]> {
    let ptr = self.alloc_raw(len, 1)?;
    // SAFETY: `ptr` is valid for `len` bytes and not aliased; zero-filling
    // initializes every byte before the slice is formed.
    unsafe {
      ptr.write_bytes(0, len);
      Some(core::slice::from_raw_parts_mut(ptr.as_ptr(), len))
    }
  }

  /// Release every allocation. O(1); memory is not cleared.
  pub fn reset(&mut self) {
    self.used.set(0);
  }

  /// Run `f` in a short-lived sub-region.
  ///
  /// Everything `f` allocates is released when it returns, while allocations
  /// made before the scope stay live. References created inside cannot leave
  /// the closure:
  ///
  /// ```compile_fail
  /// use arenals::{Arena, FixedBuf};
  ///
  /// let mut arena = Arena::new(FixedBuf::<64>::new());
  /// let leaked = arena.scope(|a| a.alloc(1u8));
  /// ```
  ///
  /// Values that do not borrow the arena pass through:
  ///
  /// ```
  /// use arenals::{Arena, FixedBuf, Str};
  ///
  /// let mut arena = Arena::new(FixedBuf::<64>::new());
  /// let len = arena.scope(|a| Str::build(a, &["tmp".into(), "/x".into()]).map(|s| s.len()));
  /// assert_eq!(len, Some(5));
  /// assert!(arena.is_empty());
  /// ```
  pub fn scope<R>(&mut self, f: impl FnOnce(&Self) -> R) -> R {
    let mark = self.used.get();
    let out = f(self);
    self.used.set(mark);
    out
  }

  /// Consume the arena and return its buffer.
  pub fn into_inner(self) -> B {
    self.buf
  }
}

impl<B: Buf> fmt::Debug for Arena<B> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Arena")
      .field("base", &self.base())
      .field("used", &self.used())
      .field("capacity", &self.capacity())
      .finish()
  }
}
