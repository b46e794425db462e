use crate::{Flat, Render, Str, StrBuf};

/// Whether a directory child is a plain file or a directory.
#[derive(Flat, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryKind {
  /// Anything the directory source does not report as a directory.
  File,
  /// A directory. Listed, never descended into.
  Directory,
}

impl EntryKind {
  /// Report label, padded so paths line up: `"file:"` or `"dir: "`.
  #[must_use]
  pub const fn label(self) -> &'static str {
    match self {
      Self::File => "file:",
      Self::Directory => "dir: ",
    }
  }
}

/// One child of the enumerated directory.
///
/// `path` is `base + separator + name`, built in the arena the entry lives in.
#[derive(Flat, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
  /// Path relative to the process, as handed to the enumerator.
  pub path: Str<'a>,
  /// File or directory.
  pub kind: EntryKind,
}

impl<'a> Entry<'a> {
  /// A new entry.
  #[must_use]
  pub const fn new(path: Str<'a>, kind: EntryKind) -> Self {
    Self { path, kind }
  }
}

/// Render `"<label> <path>\n"` into `dest`, starting from its first byte.
///
/// Writes at most `dest.capacity()` bytes and leaves `dest.len()` at the
/// number written. Returns the length of the full line, clipped or not, so a
/// zero-capacity `dest` measures without writing:
///
/// ```
/// use arenals::{EntryKind, StrBuf, format_into};
///
/// let need = format_into(&mut StrBuf::default(), EntryKind::File, "x.txt".into());
/// assert_eq!(need, "file: x.txt\n".len());
/// ```
pub fn format_into(dest: &mut StrBuf<'_>, kind: EntryKind, path: Str<'_>) -> usize {
  dest.clear();
  dest.push_clipped(kind.label().as_bytes())
    + dest.push_clipped(b" ")
    + dest.push_clipped(path.as_bytes())
    + dest.push_clipped(b"\n")
}

impl Render for Entry<'_> {
  fn measure(&self) -> usize {
    self.kind.label().len() + 1 + self.path.len() + 1
  }

  fn render(&self, out: &mut StrBuf<'_>) -> usize {
    format_into(out, self.kind, self.path)
  }
}
