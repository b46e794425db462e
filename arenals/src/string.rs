use core::{
  ffi::CStr,
  fmt::{self, Write},
  hash::{Hash, Hasher},
};

use crate::{Arena, Flat, buf::Buf};

/// A read-only byte string: the *view* flavour of a bounded string.
///
/// `Str` borrows its bytes. It can wrap a literal, a caller-owned buffer, or
/// memory built in an [`Arena`]; in the last case the borrow ties it to the
/// arena, so it cannot outlive the next [`reset`](Arena::reset).
///
/// Strings returned by [`Str::build`] carry a null terminator one byte past
/// [`len`](Self::len), reachable through [`as_c_str`](Self::as_c_str). The
/// terminator never takes part in comparisons.
#[derive(Clone, Copy, Default)]
pub struct Str<'a> {
  /// Either exactly `len` bytes, or `len` bytes followed by a `0`.
  raw: &'a [u8],
  len: usize,
}

// SAFETY: Str is a shared slice plus a length; no Drop.
unsafe impl Flat for Str<'_> {}

impl<'a> Str<'a> {
  /// Wrap `bytes` without copying.
  #[must_use]
  pub const fn new(bytes: &'a [u8]) -> Self {
    Self { raw: bytes, len: bytes.len() }
  }

  /// Concatenate `pieces` into one fresh, null-terminated arena allocation.
  ///
  /// Allocates exactly the total length plus one byte. Returns `None` if the
  /// arena cannot fit it; the arena is left untouched in that case.
  ///
  /// ```
  /// use arenals::{Arena, FixedBuf, Str};
  ///
  /// let arena = Arena::new(FixedBuf::<16>::new());
  /// let s = Str::build(&arena, &["a".into(), "b".into(), "c".into()]).unwrap();
  /// assert_eq!(s, "abc");
  /// assert_eq!(s.as_c_str(), Some(c"abc"));
  /// assert_eq!(arena.used(), 4);
  /// ```
  pub fn build<B: Buf>(arena: &'a Arena<B>, pieces: &[Str<'_>]) -> Option<Self> {
    let total = pieces.iter().try_fold(0usize, |acc, piece| acc.checked_add(piece.len))?;
    let buf = arena.alloc_bytes(total.checked_add(1)?)?;
    let mut at = 0;
    for piece in pieces {
      buf[at..at + piece.len].copy_from_slice(piece.as_bytes());
      at += piece.len;
    }
    buf[total] = 0;
    Some(Self { raw: buf, len: total })
  }

  /// The string's bytes, without any terminator.
  #[must_use]
  pub fn as_bytes(&self) -> &'a [u8] {
    &self.raw[..self.len]
  }

  /// Number of bytes, without any terminator.
  #[must_use]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if the string has no bytes.
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// A view cannot grow: its capacity is its length.
  #[must_use]
  pub const fn capacity(&self) -> usize {
    self.len
  }

  /// The null-terminated form, if this string was produced by
  /// [`build`](Self::build) and holds no interior `0` byte.
  #[must_use]
  pub fn as_c_str(&self) -> Option<&'a CStr> {
    if self.raw.len() != self.len + 1 {
      return None;
    }
    CStr::from_bytes_with_nul(self.raw).ok()
  }
}

impl<'a> From<&'a str> for Str<'a> {
  fn from(s: &'a str) -> Self {
    Self::new(s.as_bytes())
  }
}

impl<'a> From<&'a [u8]> for Str<'a> {
  fn from(bytes: &'a [u8]) -> Self {
    Self::new(bytes)
  }
}

impl PartialEq for Str<'_> {
  fn eq(&self, other: &Self) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl Eq for Str<'_> {}

impl PartialEq<str> for Str<'_> {
  fn eq(&self, other: &str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl PartialEq<&str> for Str<'_> {
  fn eq(&self, other: &&str) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl PartialOrd for Str<'_> {
  fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Str<'_> {
  fn cmp(&self, other: &Self) -> core::cmp::Ordering {
    self.as_bytes().cmp(other.as_bytes())
  }
}

impl Hash for Str<'_> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_bytes().hash(state);
  }
}

impl fmt::Display for Str<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for chunk in self.as_bytes().utf8_chunks() {
      f.write_str(chunk.valid())?;
      if !chunk.invalid().is_empty() {
        f.write_char(char::REPLACEMENT_CHARACTER)?;
      }
    }
    Ok(())
  }
}

impl fmt::Debug for Str<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for chunk in self.as_bytes().utf8_chunks() {
      for c in chunk.valid().chars() {
        write!(f, "{}", c.escape_debug())?;
      }
      for b in chunk.invalid() {
        write!(f, "\\x{b:02x}")?;
      }
    }
    f.write_char('"')
  }
}

/// A growable byte string with a fixed capacity: the *builder* flavour of a
/// bounded string.
///
/// The backing storage is either carved from an [`Arena`]
/// ([`with_capacity_in`](Self::with_capacity_in)) or supplied by the caller
/// ([`new`](Self::new)). It never reallocates.
///
/// ```
/// use arenals::StrBuf;
///
/// let mut storage = [0u8; 8];
/// let mut line = StrBuf::new(&mut storage);
/// assert_eq!(line.push_clipped(b"hello world"), 11);
/// assert_eq!(line.as_str(), "hello wo");
/// ```
pub struct StrBuf<'a> {
  buf: &'a mut [u8],
  len: usize,
}

impl<'a> StrBuf<'a> {
  /// An empty builder over caller-owned storage.
  pub fn new(buf: &'a mut [u8]) -> Self {
    Self { buf, len: 0 }
  }

  /// An empty builder over `capacity` fresh bytes from `arena`.
  pub fn with_capacity_in<B: Buf>(arena: &'a Arena<B>, capacity: usize) -> Option<Self> {
    arena.alloc_bytes(capacity).map(Self::new)
  }

  /// Bytes written so far.
  #[must_use]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if nothing has been written.
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Size of the backing storage.
  #[must_use]
  pub const fn capacity(&self) -> usize {
    self.buf.len()
  }

  /// Bytes that can still be written.
  #[must_use]
  pub const fn remaining(&self) -> usize {
    self.buf.len() - self.len
  }

  /// Forget the contents, keeping the storage.
  pub fn clear(&mut self) {
    self.len = 0;
  }

  /// The written bytes.
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    &self.buf[..self.len]
  }

  /// A view of the written bytes.
  #[must_use]
  pub fn as_str(&self) -> Str<'_> {
    Str::new(self.as_bytes())
  }

  /// Freeze the builder into a view of its written bytes.
  #[must_use]
  pub fn into_str(self) -> Str<'a> {
    let Self { buf, len } = self;
    let frozen: &'a [u8] = buf;
    Str::new(&frozen[..len])
  }

  /// Write as much of `bytes` as fits and return `bytes.len()`.
  ///
  /// The return value is the length the write *would* have had, so a caller
  /// can compare it against what was stored to detect clipping, or use a
  /// zero-capacity builder purely to measure.
  pub fn push_clipped(&mut self, bytes: &[u8]) -> usize {
    let n = bytes.len().min(self.remaining());
    self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
    self.len += n;
    bytes.len()
  }

  /// Copy all of `src` after the current contents.
  ///
  /// The destination must have been sized for it beforehand (see
  /// [`render_report`](crate::render_report)).
  ///
  /// # Panics
  ///
  /// Panics if `src` does not fit in the remaining capacity.
  pub fn append(&mut self, src: Str<'_>) {
    let end = self.len + src.len();
    assert!(
      end <= self.capacity(),
      "StrBuf capacity exceeded: need {end}, capacity {}",
      self.capacity()
    );
    self.buf[self.len..end].copy_from_slice(src.as_bytes());
    self.len = end;
  }
}

impl Default for StrBuf<'_> {
  fn default() -> Self {
    Self { buf: &mut [], len: 0 }
  }
}

impl fmt::Debug for StrBuf<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StrBuf")
      .field("str", &self.as_str())
      .field("capacity", &self.capacity())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::FixedBuf;

  #[test]
  fn build_concatenates_and_terminates() {
    let arena = Arena::new(FixedBuf::<32>::new());
    let s = Str::build(&arena, &["a".into(), "b".into(), "c".into()]).unwrap();
    assert_eq!(s, "abc");
    assert_eq!(s.len(), 3);
    assert_eq!(s.as_c_str().map(CStr::to_bytes_with_nul), Some(&b"abc\0"[..]));
    assert_eq!(arena.used(), 4);
  }

  #[test]
  fn build_without_pieces_is_an_empty_c_string() {
    let arena = Arena::new(FixedBuf::<4>::new());
    let s = Str::build(&arena, &[]).unwrap();
    assert!(s.is_empty());
    assert_eq!(s.as_c_str(), Some(c""));
    assert_eq!(arena.used(), 1);
  }

  #[test]
  fn build_fails_without_touching_the_arena() {
    let arena = Arena::new(FixedBuf::<4>::new());
    arena.alloc_bytes(1).unwrap();
    assert!(Str::build(&arena, &["abc".into()]).is_none());
    assert_eq!(arena.used(), 1);
    assert!(Str::build(&arena, &["ab".into()]).is_some());
  }

  #[test]
  fn equality_is_length_sensitive_and_ignores_terminator() {
    let arena = Arena::new(FixedBuf::<16>::new());
    let built = Str::build(&arena, &["ab".into()]).unwrap();
    assert_eq!(built, Str::new(b"ab"));
    assert_ne!(built, Str::new(b"abc"));
    assert_ne!(Str::new(b"ab\0"), Str::new(b"ab"));
    assert!(Str::new(b"ab").as_c_str().is_none());
  }

  #[test]
  fn interior_nul_has_no_c_form() {
    let arena = Arena::new(FixedBuf::<16>::new());
    let s = Str::build(&arena, &[Str::new(b"a\0b")]).unwrap();
    assert_eq!(s.len(), 3);
    assert!(s.as_c_str().is_none());
  }

  #[test]
  fn display_replaces_invalid_utf8() {
    let s = Str::new(b"a\xffb");
    assert_eq!(s.to_string(), "a\u{FFFD}b");
    assert_eq!(format!("{s:?}"), "\"a\\xffb\"");
  }

  #[test]
  fn push_clipped_reports_unclipped_length() {
    let mut probe = StrBuf::default();
    assert_eq!(probe.push_clipped(b"anything"), 8);
    assert!(probe.is_empty());

    let mut storage = [0u8; 4];
    let mut buf = StrBuf::new(&mut storage);
    assert_eq!(buf.push_clipped(b"ab"), 2);
    assert_eq!(buf.push_clipped(b"cde"), 3);
    assert_eq!(buf.as_str(), "abcd");
    assert_eq!(buf.remaining(), 0);
  }

  #[test]
  fn append_fills_to_exact_capacity() {
    let arena = Arena::new(FixedBuf::<16>::new());
    let mut out = StrBuf::with_capacity_in(&arena, 6).unwrap();
    out.append("abc".into());
    out.append("def".into());
    assert_eq!(out.into_str(), "abcdef");
  }

  #[test]
  #[should_panic(expected = "StrBuf capacity exceeded")]
  fn append_past_capacity_panics() {
    let mut storage = [0u8; 2];
    let mut out = StrBuf::new(&mut storage);
    out.append("abc".into());
  }

  #[test]
  fn clear_keeps_storage() {
    let mut storage = [0u8; 4];
    let mut buf = StrBuf::new(&mut storage);
    buf.push_clipped(b"xy");
    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), 4);
  }
}
