use std::io::Write;

use tracing::{debug, info};

use crate::{Arena, Buf, DirSource, Error, Str, config::DONE_MARKER, enumerate, render_report};

/// What one [`run`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
  /// Entries listed.
  pub entries: usize,
  /// Arena bytes in use once enumeration finished.
  pub listing_bytes: usize,
  /// Length of the report text.
  pub report_bytes: usize,
  /// Arena bytes in use once the report was built.
  pub peak_bytes: usize,
}

/// List `base`, write the report followed by the completion marker to `out`,
/// and reset the arena.
///
/// The arena is reset on every path, so it is empty again when this returns.
///
/// # Errors
///
/// [`Error::Report`] if the report does not fit, [`Error::Output`] if `out`
/// fails. Nothing is written in the first case.
///
/// # Example
///
/// ```
/// use arenals::{Arena, FixedBuf, MemDir, MemEntry, Str, run};
///
/// let children = [MemEntry::file(b"a"), MemEntry::dir(b"d")];
/// let mut arena = Arena::new(FixedBuf::<1024>::new());
/// let mut out = Vec::new();
/// let summary = run(&mut arena, &mut MemDir::new(&children), Str::new(b"."), &mut out).unwrap();
/// assert_eq!(summary.entries, 2);
/// assert!(out.ends_with(b"done\n"));
/// assert_eq!(arena.used(), 0);
/// ```
pub fn run<B: Buf, D: DirSource, W: Write + ?Sized>(
  arena: &mut Arena<B>,
  dirs: &mut D,
  base: Str<'_>,
  out: &mut W,
) -> Result<Summary, Error> {
  let result = list_into(arena, dirs, base, out);
  arena.reset();
  result
}

fn list_into<B: Buf, D: DirSource, W: Write + ?Sized>(
  arena: &mut Arena<B>,
  dirs: &mut D,
  base: Str<'_>,
  out: &mut W,
) -> Result<Summary, Error> {
  let listing = enumerate(dirs, base, arena);
  let arena = listing.arena();
  let listing_bytes = arena.used();
  info!(entries = listing.len(), "used {listing_bytes} bytes");

  let report = render_report(listing.entries(), arena)?;
  debug!(bytes = report.len(), "report rendered");

  out.write_all(report.as_bytes()).map_err(Error::Output)?;
  out.write_all(DONE_MARKER).map_err(Error::Output)?;
  out.flush().map_err(Error::Output)?;

  Ok(Summary {
    entries: listing.len(),
    listing_bytes,
    report_bytes: report.len(),
    peak_bytes: arena.used(),
  })
}

#[cfg(test)]
mod tests {
  use std::io;

  use super::*;
  use crate::{FixedBuf, MemDir, MemEntry};

  const CHILDREN: [MemEntry<'static>; 3] =
    [MemEntry::file(b"a.txt"), MemEntry::dir(b"src"), MemEntry::file(b"b.rs")];

  #[test]
  fn writes_report_then_marker() {
    let mut arena = Arena::new(FixedBuf::<2048>::new());
    let mut out = Vec::new();
    let summary = run(&mut arena, &mut MemDir::new(&CHILDREN), Str::new(b"."), &mut out).unwrap();
    assert_eq!(
      out,
      b"file: ./a.txt\ndir:  ./src\nfile: ./b.rs\ndone\n".as_slice(),
    );
    assert_eq!(summary.entries, 3);
    assert_eq!(summary.report_bytes, out.len() - DONE_MARKER.len());
    assert!(summary.peak_bytes > summary.listing_bytes);
    assert_eq!(arena.used(), 0);
  }

  #[test]
  fn unreachable_base_prints_only_marker() {
    let mut arena = Arena::new(FixedBuf::<1024>::new());
    let mut out = Vec::new();
    let summary = run(&mut arena, &mut MemDir::unreachable(), Str::new(b"nope"), &mut out).unwrap();
    assert_eq!(out, DONE_MARKER);
    assert_eq!((summary.entries, summary.listing_bytes, summary.report_bytes), (0, 0, 0));
  }

  #[test]
  fn report_oom_writes_nothing_and_resets() {
    // Room for the listing, none for the scratch line.
    let mut arena = Arena::new(FixedBuf::<256>::new());
    let mut out = Vec::new();
    let err = run(&mut arena, &mut MemDir::new(&CHILDREN), Str::new(b"."), &mut out).unwrap_err();
    assert!(matches!(err, Error::Report(_)));
    assert!(out.is_empty());
    assert_eq!(arena.used(), 0);
  }

  struct Broken;

  impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
      Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn sink_failure_is_reported() {
    let mut arena = Arena::new(FixedBuf::<2048>::new());
    let err =
      run(&mut arena, &mut MemDir::new(&CHILDREN), Str::new(b"."), &mut Broken).unwrap_err();
    assert_eq!(err.exit_code(), crate::error::EXIT_OUTPUT);
    assert_eq!(arena.used(), 0);
  }
}
