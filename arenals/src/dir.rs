//! Directory sources: the capability the enumerator walks.
//!
//! A [`DirSource`] opens a cursor from a search pattern, the cursor yields one
//! [`DirItem`] per child, and closing the cursor releases it. [`MemDir`] is an
//! in-memory source; the real filesystem lives in
//! [`sys::FsDir`](crate::sys::FsDir).

use core::slice;

use crate::Str;

/// Path separator placed between the base path and each child name.
#[cfg(windows)]
pub const SEPARATOR: &[u8] = b"\\";
/// Path separator placed between the base path and each child name.
#[cfg(not(windows))]
pub const SEPARATOR: &[u8] = b"/";

/// Suffix appended to the base path to form the pattern passed to
/// [`DirSource::open`]: the `*.*` wildcard on Windows, the directory itself
/// elsewhere.
#[cfg(windows)]
pub const SEARCH_SUFFIX: &[u8] = b"\\*.*";
/// Suffix appended to the base path to form the pattern passed to
/// [`DirSource::open`]: the `*.*` wildcard on Windows, the directory itself
/// elsewhere.
#[cfg(not(windows))]
pub const SEARCH_SUFFIX: &[u8] = b"/.";

/// The self pseudo-entry.
pub const CURRENT_DIR: Str<'static> = Str::new(b".");
/// The parent pseudo-entry.
pub const PARENT_DIR: Str<'static> = Str::new(b"..");

/// One child reported by a [`DirCursor`].
///
/// `name` borrows the cursor and is only valid until the next advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirItem<'c> {
  /// The bare child name, without any directory prefix.
  pub name: &'c [u8],
  /// Whether the source classifies the child as a directory.
  pub is_dir: bool,
}

/// Something that can open a listing of a directory.
pub trait DirSource {
  /// An open listing.
  type Cursor: DirCursor;

  /// Open a listing for `pattern` (`base + SEARCH_SUFFIX`).
  ///
  /// Patterns built with [`Str::build`] are null-terminated, so sources that
  /// talk to the OS can pass [`Str::as_c_str`] straight through. The cursor
  /// must not borrow `pattern`. Returns `None` if the directory cannot be
  /// read.
  fn open(&mut self, pattern: Str<'_>) -> Option<Self::Cursor>;
}

/// An open directory listing.
pub trait DirCursor {
  /// The next child, or `None` at the end of the listing.
  fn advance(&mut self) -> Option<DirItem<'_>>;

  /// Release the listing.
  fn close(self)
  where
    Self: Sized,
  {
  }
}

/// A child of a [`MemDir`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemEntry<'n> {
  /// Child name.
  pub name: &'n [u8],
  /// Directory flag.
  pub is_dir: bool,
}

impl<'n> MemEntry<'n> {
  /// A plain file.
  #[must_use]
  pub const fn file(name: &'n [u8]) -> Self {
    Self { name, is_dir: false }
  }

  /// A directory.
  #[must_use]
  pub const fn dir(name: &'n [u8]) -> Self {
    Self { name, is_dir: true }
  }
}

/// A directory source over a fixed slice of children.
///
/// Yields the children in slice order, pseudo-entries included if present.
///
/// ```
/// use arenals::{DirCursor, DirSource, MemDir, MemEntry};
///
/// let children = [MemEntry::file(b"a.txt"), MemEntry::dir(b"sub")];
/// let mut dir = MemDir::new(&children);
/// let mut cursor = dir.open("mem/.".into()).unwrap();
/// assert_eq!(cursor.advance().map(|item| item.name), Some(&b"a.txt"[..]));
/// assert_eq!(dir.opened(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct MemDir<'n> {
  children: &'n [MemEntry<'n>],
  reachable: bool,
  opened: usize,
}

impl<'n> MemDir<'n> {
  /// A readable directory with `children`.
  #[must_use]
  pub const fn new(children: &'n [MemEntry<'n>]) -> Self {
    Self { children, reachable: true, opened: 0 }
  }

  /// A directory that fails to open.
  #[must_use]
  pub const fn unreachable() -> Self {
    Self { children: &[], reachable: false, opened: 0 }
  }

  /// Number of successful [`open`](DirSource::open) calls.
  #[must_use]
  pub const fn opened(&self) -> usize {
    self.opened
  }
}

impl<'n> DirSource for MemDir<'n> {
  type Cursor = MemCursor<'n>;

  fn open(&mut self, _pattern: Str<'_>) -> Option<MemCursor<'n>> {
    if !self.reachable {
      return None;
    }
    self.opened += 1;
    Some(MemCursor { rest: self.children.iter() })
  }
}

/// Cursor over a [`MemDir`].
#[derive(Clone, Debug)]
pub struct MemCursor<'n> {
  rest: slice::Iter<'n, MemEntry<'n>>,
}

impl DirCursor for MemCursor<'_> {
  fn advance(&mut self) -> Option<DirItem<'_>> {
    self.rest.next().map(|entry| DirItem { name: entry.name, is_dir: entry.is_dir })
  }
}
