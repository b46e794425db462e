use tracing::{debug, warn};

use crate::{
  Arena, ArenaList, Entry, EntryKind, Str,
  buf::Buf,
  dir::{CURRENT_DIR, DirCursor, DirSource, PARENT_DIR, SEARCH_SUFFIX, SEPARATOR},
};

/// The children of one directory, stored in the arena that produced them.
///
/// A `Listing` keeps the shared arena borrow alive alongside the entries, so
/// the report pass can keep allocating from the same arena. Dropping the
/// listing ends the borrow and makes the arena resettable again.
pub struct Listing<'a, B: Buf> {
  arena: &'a Arena<B>,
  entries: ArenaList<'a, Entry<'a>>,
}

impl<'a, B: Buf> Listing<'a, B> {
  /// The arena holding the entries.
  #[must_use]
  pub const fn arena(&self) -> &'a Arena<B> {
    self.arena
  }

  /// The entries, in the order the directory source reported them.
  #[must_use]
  pub const fn entries(&self) -> &ArenaList<'a, Entry<'a>> {
    &self.entries
  }

  /// Number of entries.
  #[must_use]
  pub const fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` if no entry was listed.
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// List the immediate children of `base` into `arena`.
///
/// The search pattern (`base + SEARCH_SUFFIX`) is built in a scope of the
/// arena and released as soon as the cursor is open, before the first entry
/// is allocated. Each child then costs one path string and one list node.
///
/// Never fails outright:
/// - a directory that cannot be opened yields an empty listing;
/// - `.` and `..` are skipped;
/// - a child whose path does not fit is skipped;
/// - once a node does not fit, the walk stops and the entries listed so far
///   are returned.
///
/// ```
/// use arenals::{Arena, EntryKind, FixedBuf, MemDir, MemEntry, enumerate};
///
/// let children = [MemEntry::dir(b"."), MemEntry::file(b"a.txt"), MemEntry::dir(b"sub")];
/// let mut arena = Arena::new(FixedBuf::<256>::new());
/// let listing = enumerate(&mut MemDir::new(&children), "base".into(), &mut arena);
/// let kinds: Vec<_> = listing.entries().iter().map(|e| e.kind).collect();
/// assert_eq!(kinds, [EntryKind::File, EntryKind::Directory]);
/// ```
pub fn enumerate<'a, B: Buf, D: DirSource>(
  dirs: &mut D,
  base: Str<'_>,
  arena: &'a mut Arena<B>,
) -> Listing<'a, B> {
  let cursor = arena.scope(|scratch| {
    let pattern = Str::build(scratch, &[base, Str::new(SEARCH_SUFFIX)])?;
    dirs.open(pattern)
  });
  let arena: &'a Arena<B> = arena;
  let mut entries = ArenaList::new();

  let Some(mut cursor) = cursor else {
    debug!(%base, "directory could not be opened");
    return Listing { arena, entries };
  };

  while let Some(item) = cursor.advance() {
    let name = Str::new(item.name);
    if name == CURRENT_DIR || name == PARENT_DIR {
      continue;
    }
    let Some(path) = Str::build(arena, &[base, Str::new(SEPARATOR), name]) else {
      debug!(%name, remaining = arena.remaining(), "path does not fit, skipping entry");
      continue;
    };
    let kind = if item.is_dir { EntryKind::Directory } else { EntryKind::File };
    if entries.push_back(Entry::new(path, kind), arena).is_none() {
      warn!(listed = entries.len(), "arena exhausted, stopping directory walk");
      break;
    }
  }
  cursor.close();

  debug!(%base, entries = entries.len(), used = arena.used(), "directory enumerated");
  Listing { arena, entries }
}

#[cfg(test)]
mod tests {
  use core::cell::Cell;

  use super::*;
  use crate::{
    FixedBuf,
    dir::{DirItem, MemDir, MemEntry},
  };

  fn paths<B: Buf>(listing: &Listing<'_, B>) -> Vec<String> {
    listing.entries().iter().map(|e| e.path.to_string()).collect()
  }

  fn sep() -> &'static str {
    core::str::from_utf8(SEPARATOR).unwrap()
  }

  #[test]
  fn lists_children_in_source_order() {
    let children = [MemEntry::file(b"a.txt"), MemEntry::dir(b"sub"), MemEntry::file(b"z")];
    let mut arena = Arena::new(FixedBuf::<512>::new());
    let listing = enumerate(&mut MemDir::new(&children), "root".into(), &mut arena);
    let s = sep();
    assert_eq!(
      paths(&listing),
      [format!("root{s}a.txt"), format!("root{s}sub"), format!("root{s}z")]
    );
    let kinds: Vec<_> = listing.entries().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [EntryKind::File, EntryKind::Directory, EntryKind::File]);
  }

  #[test]
  fn entry_paths_are_null_terminated() {
    let children = [MemEntry::file(b"a")];
    let mut arena = Arena::new(FixedBuf::<256>::new());
    let listing = enumerate(&mut MemDir::new(&children), ".".into(), &mut arena);
    let path = listing.entries().first().unwrap().path;
    assert_eq!(path.as_c_str().map(|c| c.to_bytes().len()), Some(path.len()));
  }

  #[test]
  fn unreachable_directory_yields_empty_listing() {
    let mut arena = Arena::new(FixedBuf::<256>::new());
    let listing = enumerate(&mut MemDir::unreachable(), "nope".into(), &mut arena);
    assert!(listing.is_empty());
    assert_eq!(listing.arena().used(), 0);
  }

  #[test]
  fn empty_directory_releases_the_pattern() {
    let mut dir = MemDir::new(&[]);
    let mut arena = Arena::new(FixedBuf::<256>::new());
    let listing = enumerate(&mut dir, "root".into(), &mut arena);
    assert!(listing.is_empty());
    assert_eq!(listing.arena().used(), 0);
    assert_eq!(dir.opened(), 1);
  }

  #[test]
  fn pseudo_entries_are_skipped() {
    let children = [MemEntry::dir(b"."), MemEntry::dir(b"..")];
    let mut arena = Arena::new(FixedBuf::<256>::new());
    let listing = enumerate(&mut MemDir::new(&children), "root".into(), &mut arena);
    assert!(listing.is_empty());
    assert!(listing.arena().is_empty());
  }

  #[test]
  fn names_that_only_start_with_dots_are_kept() {
    let children = [MemEntry::file(b".hidden"), MemEntry::dir(b"...")];
    let mut arena = Arena::new(FixedBuf::<256>::new());
    let listing = enumerate(&mut MemDir::new(&children), "r".into(), &mut arena);
    assert_eq!(listing.len(), 2);
  }

  #[test]
  fn pattern_does_not_fit_is_treated_as_unreadable() {
    let base = [b'x'; 40];
    let children = [MemEntry::file(b"a")];
    let mut dir = MemDir::new(&children);
    let mut arena = Arena::new(FixedBuf::<32>::new());
    let listing = enumerate(&mut dir, Str::new(&base), &mut arena);
    assert!(listing.is_empty());
    assert_eq!(dir.opened(), 0);
  }

  #[test]
  fn oversized_path_is_skipped_and_walk_continues() {
    let long = [b'n'; 200];
    let children = [MemEntry::file(&long), MemEntry::file(b"ok")];
    let mut arena = Arena::new(FixedBuf::<128>::new());
    let listing = enumerate(&mut MemDir::new(&children), "b".into(), &mut arena);
    assert_eq!(paths(&listing), [format!("b{}ok", sep())]);
  }

  /// Yields files `a` through `z`, counting how many were read.
  struct Letters<'c> {
    advances: &'c Cell<usize>,
  }

  struct LetterCursor<'c> {
    next: u8,
    name: [u8; 1],
    advances: &'c Cell<usize>,
  }

  impl DirCursor for LetterCursor<'_> {
    fn advance(&mut self) -> Option<DirItem<'_>> {
      if self.next > b'z' {
        return None;
      }
      self.advances.set(self.advances.get() + 1);
      self.name = [self.next];
      self.next += 1;
      Some(DirItem { name: &self.name, is_dir: false })
    }
  }

  impl<'c> DirSource for Letters<'c> {
    type Cursor = LetterCursor<'c>;

    fn open(&mut self, _pattern: Str<'_>) -> Option<LetterCursor<'c>> {
      Some(LetterCursor { next: b'a', name: [0], advances: self.advances })
    }
  }

  #[test]
  fn node_exhaustion_keeps_the_entries_already_listed() {
    let advances = Cell::new(0);
    let mut arena = Arena::new(FixedBuf::<256>::new());
    let listed = paths(&enumerate(&mut Letters { advances: &advances }, "b".into(), &mut arena));
    assert!(!listed.is_empty());
    assert!(listed.len() < 26);
    let s = sep();
    for (i, path) in listed.iter().enumerate() {
      assert_eq!(*path, format!("b{s}{}", char::from(b'a' + i as u8)));
    }
    // The walk stops at the first node that does not fit instead of reading
    // the rest of the directory.
    assert_eq!(advances.get(), listed.len() + 1);
  }

  struct Recording {
    pattern: Vec<u8>,
  }

  struct Once(Option<&'static [u8]>);

  impl DirCursor for Once {
    fn advance(&mut self) -> Option<DirItem<'_>> {
      self.0.take().map(|name| DirItem { name, is_dir: false })
    }
  }

  impl DirSource for Recording {
    type Cursor = Once;

    fn open(&mut self, pattern: Str<'_>) -> Option<Once> {
      self.pattern = pattern.as_c_str()?.to_bytes().to_vec();
      Some(Once(Some(&b"f"[..])))
    }
  }

  #[test]
  fn pattern_is_base_plus_search_suffix() {
    let mut dirs = Recording { pattern: Vec::new() };
    let mut arena = Arena::new(FixedBuf::<128>::new());
    let listing = enumerate(&mut dirs, "root".into(), &mut arena);
    assert_eq!(listing.len(), 1);
    let mut expected = b"root".to_vec();
    expected.extend_from_slice(SEARCH_SUFFIX);
    assert_eq!(dirs.pattern, expected);
  }
}
