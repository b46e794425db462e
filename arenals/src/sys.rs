//! Operating-system collaborators: the fixed startup buffer and the real
//! filesystem as a [`DirSource`].

use std::{io, ptr::NonNull};

#[cfg(not(unix))]
use crate::dir::SEARCH_SUFFIX;
use crate::{
  Str,
  buf::Buf,
  dir::{DirCursor, DirItem, DirSource},
};

// ---------------------------------------------------------------------------
// HeapBuf
// ---------------------------------------------------------------------------

/// One fixed block of memory obtained from the OS.
///
/// On Unix this is an anonymous private `mmap`, so the arena never touches the
/// process heap. Elsewhere it comes from the global allocator. Either way it is
/// requested once and never grows.
pub struct HeapBuf {
  ptr: NonNull<u8>,
  len: usize,
}

impl HeapBuf {
  /// Request `size` bytes.
  ///
  /// # Errors
  ///
  /// The OS error when the mapping is refused (including `size == 0`).
  #[cfg(unix)]
  pub fn allocate(size: usize) -> io::Result<Self> {
    // SAFETY: An anonymous private mapping with no address hint touches no
    // existing memory.
    let ptr = unsafe {
      libc::mmap(
        core::ptr::null_mut(),
        size,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANON,
        -1,
        0,
      )
    };
    if ptr == libc::MAP_FAILED {
      return Err(io::Error::last_os_error());
    }
    NonNull::new(ptr.cast::<u8>())
      .map(|ptr| Self { ptr, len: size })
      .ok_or_else(|| io::ErrorKind::OutOfMemory.into())
  }

  /// Request `size` bytes.
  ///
  /// # Errors
  ///
  /// `InvalidInput` for a zero or oversized request, `OutOfMemory` when the
  /// allocator refuses it.
  #[cfg(not(unix))]
  pub fn allocate(size: usize) -> io::Result<Self> {
    let layout = Self::layout(size)?;
    // SAFETY: `layout` has a non-zero size.
    let ptr = unsafe { std::alloc::alloc(layout) };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr, len: size })
      .ok_or_else(|| io::ErrorKind::OutOfMemory.into())
  }

  #[cfg(not(unix))]
  fn layout(size: usize) -> io::Result<std::alloc::Layout> {
    if size == 0 {
      return Err(io::ErrorKind::InvalidInput.into());
    }
    std::alloc::Layout::from_size_align(size, 16).map_err(|_| io::ErrorKind::InvalidInput.into())
  }
}

// SAFETY: `ptr` is valid for `len` bytes until drop, and the bytes live outside
// `self`, so writing through the pointer while `&self` is live is allowed.
unsafe impl Buf for HeapBuf {
  fn base(&self) -> NonNull<u8> {
    self.ptr
  }

  fn capacity(&self) -> usize {
    self.len
  }
}

#[cfg(unix)]
impl Drop for HeapBuf {
  fn drop(&mut self) {
    // SAFETY: `ptr`/`len` describe the mapping created in `allocate`.
    unsafe {
      libc::munmap(self.ptr.as_ptr().cast(), self.len);
    }
  }
}

#[cfg(not(unix))]
impl Drop for HeapBuf {
  fn drop(&mut self) {
    if let Ok(layout) = Self::layout(self.len) {
      // SAFETY: `ptr` was allocated with this exact layout in `allocate`.
      unsafe { std::alloc::dealloc(self.ptr.as_ptr(), layout) };
    }
  }
}

// SAFETY: HeapBuf exclusively owns its block.
unsafe impl Send for HeapBuf {}

// ---------------------------------------------------------------------------
// FsDir
// ---------------------------------------------------------------------------

/// The real filesystem.
///
/// On Unix the null-terminated pattern goes straight to `opendir`, and names
/// are read in place from the stream's `dirent` buffer, so listing allocates
/// nothing. Symbolic links are reported as files.
///
/// Elsewhere listing goes through [`std::fs::read_dir`], which allocates on
/// the heap for each child name. The arena stays the only home of entries and
/// the report, but the listing is no longer allocation-free on those targets.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsDir;

/// An open directory stream.
#[cfg(unix)]
pub struct FsCursor {
  dir: NonNull<libc::DIR>,
}

#[cfg(unix)]
impl DirSource for FsDir {
  type Cursor = FsCursor;

  fn open(&mut self, pattern: Str<'_>) -> Option<FsCursor> {
    let path = pattern.as_c_str()?;
    // SAFETY: `path` is a valid null-terminated string.
    let dir = unsafe { libc::opendir(path.as_ptr()) };
    NonNull::new(dir).map(|dir| FsCursor { dir })
  }
}

#[cfg(unix)]
impl FsCursor {
  #[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_vendor = "apple",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
  ))]
  fn is_dir(&self, ent: &libc::dirent, name: &core::ffi::CStr) -> bool {
    match ent.d_type {
      libc::DT_DIR => true,
      libc::DT_UNKNOWN => self.stat_is_dir(name),
      _ => false,
    }
  }

  #[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_vendor = "apple",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
  )))]
  fn is_dir(&self, _ent: &libc::dirent, name: &core::ffi::CStr) -> bool {
    self.stat_is_dir(name)
  }

  fn stat_is_dir(&self, name: &core::ffi::CStr) -> bool {
    let mut st = core::mem::MaybeUninit::<libc::stat>::uninit();
    // SAFETY: `dir` is open, `name` is null-terminated, `st` is writable.
    let rc = unsafe {
      libc::fstatat(
        libc::dirfd(self.dir.as_ptr()),
        name.as_ptr(),
        st.as_mut_ptr(),
        libc::AT_SYMLINK_NOFOLLOW,
      )
    };
    // SAFETY: fstatat filled `st` when it returned 0.
    rc == 0 && unsafe { st.assume_init_ref() }.st_mode & libc::S_IFMT == libc::S_IFDIR
  }
}

#[cfg(unix)]
impl DirCursor for FsCursor {
  fn advance(&mut self) -> Option<DirItem<'_>> {
    // SAFETY: `dir` is an open stream owned by this cursor.
    let ent = unsafe { libc::readdir(self.dir.as_ptr()) };
    if ent.is_null() {
      return None;
    }
    // SAFETY: The dirent stays valid until the next readdir/closedir on this
    // stream; both need `&mut self`, which the returned item borrows.
    let (ent, name) = unsafe {
      let ent = &*ent;
      (ent, core::ffi::CStr::from_ptr(ent.d_name.as_ptr()))
    };
    let is_dir = self.is_dir(ent, name);
    Some(DirItem { name: name.to_bytes(), is_dir })
  }
}

#[cfg(unix)]
impl Drop for FsCursor {
  fn drop(&mut self) {
    // SAFETY: `dir` is open and closed exactly once, here.
    unsafe {
      libc::closedir(self.dir.as_ptr());
    }
  }
}

/// An open directory listing.
#[cfg(not(unix))]
pub struct FsCursor {
  entries: std::fs::ReadDir,
  name: String,
}

#[cfg(not(unix))]
impl DirSource for FsDir {
  type Cursor = FsCursor;

  fn open(&mut self, pattern: Str<'_>) -> Option<FsCursor> {
    let dir = pattern.as_bytes().strip_suffix(SEARCH_SUFFIX)?;
    let dir = core::str::from_utf8(dir).ok()?;
    let entries = std::fs::read_dir(dir).ok()?;
    Some(FsCursor { entries, name: String::new() })
  }
}

#[cfg(not(unix))]
impl DirCursor for FsCursor {
  fn advance(&mut self) -> Option<DirItem<'_>> {
    loop {
      let Ok(entry) = self.entries.next()? else { continue };
      self.name.clear();
      self.name.push_str(&entry.file_name().to_string_lossy());
      let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
      return Some(DirItem { name: self.name.as_bytes(), is_dir });
    }
  }
}
