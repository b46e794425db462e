use std::{fmt, io};

use crate::ReportError;

/// Process exit code when the report cannot be allocated.
pub const EXIT_REPORT_OOM: i32 = 2;

/// Process exit code when writing the report fails.
pub const EXIT_OUTPUT: i32 = 3;

/// A fatal failure of the lister.
#[derive(Debug)]
pub enum Error {
  /// The OS refused the startup buffer.
  Buffer(io::Error),
  /// The arena could not hold the report.
  Report(ReportError),
  /// Writing the report to the sink failed.
  Output(io::Error),
}

impl Error {
  /// The process exit code for this failure.
  ///
  /// A refused buffer exits with the OS error number when there is one.
  #[must_use]
  pub fn exit_code(&self) -> i32 {
    match self {
      Self::Buffer(err) => err.raw_os_error().filter(|&code| code != 0).unwrap_or(1),
      Self::Report(_) => EXIT_REPORT_OOM,
      Self::Output(_) => EXIT_OUTPUT,
    }
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Buffer(err) => write!(f, "failed to allocate arena buffer: {err}"),
      Self::Report(err) => fmt::Display::fmt(err, f),
      Self::Output(err) => write!(f, "failed to write report: {err}"),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Buffer(err) | Self::Output(err) => Some(err),
      Self::Report(err) => Some(err),
    }
  }
}

impl From<ReportError> for Error {
  fn from(err: ReportError) -> Self {
    Self::Report(err)
  }
}
