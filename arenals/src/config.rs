//! Compile-time configuration.
//!
//! The memory budget is fixed when the binary is built; nothing here is read
//! at runtime. Log verbosity is the one runtime knob (`RUST_LOG`).

/// Size of the one buffer obtained from the OS at startup.
pub const ARENA_BYTES: usize = 4096 * 4;

/// Capacity of the scratch line each report entry is rendered into.
pub const LINE_SCRATCH_BYTES: usize = 512;

/// Directory the binary lists.
pub const BASE_PATH: &[u8] = b".";

/// Completion marker written after the report.
pub const DONE_MARKER: &[u8] = b"done\n";
