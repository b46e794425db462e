//! Directory listing inside one fixed memory arena.
//!
//! `arenals` lists the immediate children of a directory and renders them as
//! a text report, drawing every byte of working memory from a single
//! [`Arena`] sized at startup. Nothing is freed individually: the arena is
//! reset once the report has been written.
//!
//! # Pieces
//!
//! - [`Arena`]: bump allocation over a [`Buf`] ([`FixedBuf`] inline, or
//!   `sys::HeapBuf` from the OS). Only [`Flat`] values can be placed in it.
//! - [`Str`] / [`StrBuf`]: length-carrying byte strings and bounded builders.
//! - [`ArenaList`]: an append-only singly linked list with arena nodes.
//! - [`enumerate`]: one directory level from a [`DirSource`] into a [`Listing`].
//! - [`render_report`]: the two-pass (measure, then fill) report formatter.
//!
//! # Lifetimes
//!
//! Every arena value borrows the arena. [`Arena::reset`] takes `&mut self`, so
//! a string or node can never be used after the memory behind it is reused:
//!
//! ```compile_fail
//! use arenals::{Arena, FixedBuf, Str};
//!
//! let mut arena = Arena::new(FixedBuf::<64>::new());
//! let s = Str::build(&arena, &["dangling".into()]).unwrap();
//! arena.reset();
//! println!("{s}");
//! ```
//!
//! # Example
//!
//! ```
//! use arenals::{Arena, FixedBuf, MemDir, MemEntry, Str, enumerate, render_report};
//!
//! let children = [MemEntry::file(b"Cargo.toml"), MemEntry::dir(b"src")];
//! let mut arena = Arena::new(FixedBuf::<1024>::new());
//!
//! let listing = enumerate(&mut MemDir::new(&children), Str::new(b"."), &mut arena);
//! let report = render_report(listing.entries(), listing.arena()).unwrap();
//! assert_eq!(report, "file: ./Cargo.toml\ndir:  ./src\n");
//!
//! drop(listing);
//! arena.reset();
//! assert_eq!(arena.used(), 0);
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(missing_docs)]

extern crate self as arenals;

mod arena;
mod buf;
pub mod config;
pub mod dir;
mod entry;
mod enumerate;
#[cfg(feature = "std")]
mod error;
mod flat;
mod list;
mod report;
#[cfg(feature = "std")]
mod run;
mod string;
#[cfg(feature = "std")]
pub mod sys;

pub use arena::Arena;
pub use arenals_derive::Flat;
pub use buf::{Buf, FixedBuf};
pub use dir::{DirCursor, DirItem, DirSource, MemCursor, MemDir, MemEntry};
pub use entry::{Entry, EntryKind, format_into};
pub use enumerate::{Listing, enumerate};
#[cfg(feature = "std")]
pub use error::{EXIT_OUTPUT, EXIT_REPORT_OOM, Error};
pub use flat::Flat;
pub use list::{ArenaList, Iter, Node};
pub use report::{Render, ReportError, measure, render_report};
#[cfg(feature = "std")]
pub use run::{Summary, run};
pub use string::{Str, StrBuf};
