pub mod mem;

#[cfg(windows)]
pub mod win32;

use std::io::{Read, Seek, Write};

pub use mem::MemFs;

#[cfg(windows)]
pub use win32::Win32Fs;

/// Sentinel returned by the attribute query when the target does not exist
/// or cannot be reached. Mirrors INVALID_FILE_ATTRIBUTES.
pub const INVALID_ATTRIBUTES: u32 = u32::MAX;

pub const ATTRIBUTE_READONLY: u32 = 0x0000_0001;
pub const ATTRIBUTE_DIRECTORY: u32 = 0x0000_0010;
pub const ATTRIBUTE_ARCHIVE: u32 = 0x0000_0020;
pub const ATTRIBUTE_NORMAL: u32 = 0x0000_0080;

/// Access requested when opening a handle. Sharing follows from access:
/// read handles allow shared reads, anything writable is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    /// Read + write + write-attributes, for file-time updates.
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Fail unless the target already exists.
    OpenExisting,
    /// Create or truncate.
    CreateAlways,
    /// Fail if the target already exists.
    CreateNew,
}

/// The three per-file timestamps, in 100ns FILETIME units. The underlying
/// set-time primitive takes all three at once, so they travel together;
/// writing one field requires reading the other two first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileTimeTriple {
    pub creation: u64,
    pub last_access: u64,
    pub last_write: u64,
}

/// The native primitives this crate consumes, kept thin so the dispatch
/// and normalization logic can be exercised against [`MemFs`] without a
/// real filesystem. All paths given to these methods are expected to be
/// in whatever form the caller already dispatched to; the trait does no
/// normalization of its own.
///
/// Failures report through the return value (`false`/`None`) and leave a
/// code readable via [`NativeFs::last_error`]. A code of zero means "no
/// error pending" and must never be promoted to a failure.
pub trait NativeFs {
    type Handle: Read + Write + Seek;

    /// Attribute bitmask, or [`INVALID_ATTRIBUTES`] when unreachable.
    fn attributes(&self, path: &str) -> u32;

    fn set_attributes(&self, path: &str, attributes: u32) -> bool;

    fn delete(&self, path: &str) -> bool;

    fn copy(&self, source: &str, dest: &str, fail_if_exists: bool) -> bool;

    fn rename(&self, source: &str, dest: &str) -> bool;

    /// Raw open-with-flags. `None` on failure; the handle closes itself
    /// when dropped.
    fn open(&self, path: &str, access: Access, disposition: Disposition) -> Option<Self::Handle>;

    fn file_times(&self, handle: &Self::Handle) -> Option<FileTimeTriple>;

    fn set_file_times(&self, handle: &Self::Handle, times: FileTimeTriple) -> bool;

    /// Last OS error code left by a failed call on this thread.
    fn last_error(&self) -> u32;
}
