use core::fmt;

use tracing::{debug, warn};

use crate::{Arena, ArenaList, Str, StrBuf, buf::Buf, config::LINE_SCRATCH_BYTES};

/// A value that renders to one report line.
///
/// Sizing and writing are separate so a report can be measured exactly before
/// any byte of it is allocated.
pub trait Render {
  /// Length of the rendered line in bytes.
  fn measure(&self) -> usize;

  /// Render into `out` from its first byte, clipped at its capacity, and
  /// return the unclipped length (equal to [`measure`](Self::measure)).
  fn render(&self, out: &mut StrBuf<'_>) -> usize;
}

/// The final report buffer could not be allocated.
///
/// Unlike a skipped entry there is no degraded result here: the report's size
/// is known exactly and nothing smaller can hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
  /// The arena cannot fit the report plus the scratch line.
  OutOfMemory {
    /// Bytes the report and scratch line need together.
    needed: usize,
    /// Bytes the arena had left.
    available: usize,
  },
}

impl fmt::Display for ReportError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::OutOfMemory { needed, available } => {
        write!(f, "failed to allocate output str memory: need {needed} bytes, {available} left")
      }
    }
  }
}

impl core::error::Error for ReportError {}

/// Size pass: total bytes of all rendered items. Allocates nothing.
pub fn measure<'i, T: Render + 'i>(items: impl IntoIterator<Item = &'i T>) -> usize {
  items.into_iter().map(T::measure).sum()
}

/// Render every item of `items` into one exactly-sized arena string.
///
/// 1. measure every item;
/// 2. allocate the output (exactly the measured total) and one
///    [`LINE_SCRATCH_BYTES`] scratch line;
/// 3. render each item into the scratch line and append it to the output.
///
/// A line longer than the scratch buffer is clipped, so the output never
/// outgrows its allocation.
///
/// ```
/// use arenals::{Arena, ArenaList, Entry, EntryKind, FixedBuf, render_report};
///
/// let arena = Arena::new(FixedBuf::<1024>::new());
/// let mut list = ArenaList::new();
/// list.push_back(Entry::new("a.txt".into(), EntryKind::File), &arena).unwrap();
/// list.push_back(Entry::new("sub".into(), EntryKind::Directory), &arena).unwrap();
/// let report = render_report(&list, &arena).unwrap();
/// assert_eq!(report, "file: a.txt\ndir:  sub\n");
/// ```
///
/// # Errors
///
/// [`ReportError::OutOfMemory`] if either buffer does not fit.
pub fn render_report<'a, B: Buf, T: Render>(
  items: &ArenaList<'a, T>,
  arena: &'a Arena<B>,
) -> Result<Str<'a>, ReportError> {
  let total = measure(items);
  debug!(items = items.len(), total, "report sized");

  let available = arena.remaining();
  let oom = || ReportError::OutOfMemory { needed: total + LINE_SCRATCH_BYTES, available };
  let mut out = StrBuf::with_capacity_in(arena, total).ok_or_else(oom)?;
  let mut scratch = StrBuf::with_capacity_in(arena, LINE_SCRATCH_BYTES).ok_or_else(oom)?;

  for item in items {
    let need = item.render(&mut scratch);
    if need > scratch.len() {
      warn!(need, scratch = scratch.capacity(), "report line clipped");
    }
    out.append(scratch.as_str());
  }

  debug_assert!(out.len() <= total);
  Ok(out.into_str())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Entry, EntryKind, FixedBuf};

  fn two_entries<'a, B: Buf>(arena: &'a Arena<B>) -> ArenaList<'a, Entry<'a>> {
    let mut list = ArenaList::new();
    list.push_back(Entry::new("a.txt".into(), EntryKind::File), arena).unwrap();
    list.push_back(Entry::new("sub".into(), EntryKind::Directory), arena).unwrap();
    list
  }

  #[test]
  fn size_pass_matches_concatenated_lines() {
    let arena = Arena::new(FixedBuf::<256>::new());
    let list = two_entries(&arena);
    let used = arena.used();
    assert_eq!(measure(&list), "file: a.txt\n".len() + "dir:  sub\n".len());
    assert_eq!(arena.used(), used);
  }

  #[test]
  fn fill_pass_writes_exactly_the_measured_bytes() {
    let arena = Arena::new(FixedBuf::<1024>::new());
    let list = two_entries(&arena);
    let before = arena.used();
    let report = render_report(&list, &arena).unwrap();
    assert_eq!(report, "file: a.txt\ndir:  sub\n");
    assert_eq!(report.len(), measure(&list));
    assert_eq!(arena.used(), before + report.len() + LINE_SCRATCH_BYTES);
  }

  #[test]
  fn empty_list_renders_empty_report() {
    let arena = Arena::new(FixedBuf::<1024>::new());
    let list: ArenaList<'_, Entry<'_>> = ArenaList::new();
    let report = render_report(&list, &arena).unwrap();
    assert!(report.is_empty());
  }

  #[test]
  fn missing_scratch_space_is_fatal() {
    let arena = Arena::new(FixedBuf::<256>::new());
    let list = two_entries(&arena);
    let available = arena.remaining();
    let err = render_report(&list, &arena).unwrap_err();
    assert_eq!(
      err,
      ReportError::OutOfMemory { needed: measure(&list) + LINE_SCRATCH_BYTES, available }
    );
    assert!(err.to_string().starts_with("failed to allocate output str memory"));
  }

  #[test]
  fn long_lines_are_clipped_to_the_scratch_line() {
    let long = [b'x'; LINE_SCRATCH_BYTES];
    let arena = Arena::new(FixedBuf::<2048>::new());
    let mut list = ArenaList::new();
    list.push_back(Entry::new(Str::new(&long), EntryKind::File), &arena).unwrap();
    list.push_back(Entry::new("b".into(), EntryKind::File), &arena).unwrap();
    let report = render_report(&list, &arena).unwrap();
    assert_eq!(report.len(), LINE_SCRATCH_BYTES + "file: b\n".len());
    assert!(report.as_bytes().starts_with(b"file: xxx"));
    assert!(report.as_bytes().ends_with(b"xfile: b\n"), "clipped line loses its newline");
  }
}
