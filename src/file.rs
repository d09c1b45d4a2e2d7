use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::config::PathPolicy;
use crate::encoding::{TextEncoding, Utf8};
use crate::error::{FileError, Result};
use crate::native::{Access, Disposition, FileTimeTriple, NativeFs, INVALID_ATTRIBUTES};
use crate::path;

/// File operations that keep working past the conventional path-length
/// ceiling. Paths short enough for the conventional API are delegated to it
/// verbatim; anything at or over the threshold is canonicalized to the
/// extended-length form and served through raw handles on the native
/// backend.
pub struct LongFile<N: NativeFs> {
    policy: PathPolicy,
    native: N,
}

#[cfg(windows)]
impl LongFile<crate::native::Win32Fs> {
    pub fn new() -> Self {
        Self::with_policy(PathPolicy::default())
    }

    pub fn with_policy(policy: PathPolicy) -> Self {
        Self {
            policy,
            native: crate::native::Win32Fs,
        }
    }
}

#[cfg(windows)]
impl Default for LongFile<crate::native::Win32Fs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NativeFs> LongFile<N> {
    pub fn with_native(native: N, policy: PathPolicy) -> Self {
        Self { policy, native }
    }

    pub fn policy(&self) -> PathPolicy {
        self.policy
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    /// The dispatch decision, exposed so callers and tests can observe the
    /// exact boundary.
    pub fn uses_extended(&self, path: &str) -> bool {
        self.policy.uses_extended(path)
    }

    // --- existence / removal ---------------------------------------------

    pub fn exists(&self, path: &str) -> bool {
        if !self.uses_extended(path) {
            return Path::new(path).exists();
        }
        match path::canonicalize(path) {
            Ok(canonical) => self.native.attributes(&canonical) != INVALID_ATTRIBUTES,
            Err(_) => false,
        }
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        if !self.uses_extended(path) {
            return fs::remove_file(path).map_err(|e| FileError::from_io(e, path));
        }
        let canonical = path::canonicalize(path)?;
        debug!("Deleting via extended path: {}", canonical);
        self.check(self.native.delete(&canonical), path)
    }

    // --- copy / move ------------------------------------------------------

    /// Copy `source` to `dest`. With `overwrite` false an existing
    /// destination is an error. Both paths take the extended route as soon
    /// as either one trips the threshold; the native copy primitive takes
    /// paired extended paths, so mixing forms within one call is not
    /// allowed.
    pub fn copy(&self, source: &str, dest: &str, overwrite: bool) -> Result<()> {
        if !self.uses_extended(source) && !self.uses_extended(dest) {
            if !overwrite && Path::new(dest).exists() {
                return Err(FileError::AlreadyExists(dest.to_string()));
            }
            fs::copy(source, dest).map_err(|e| FileError::from_io(e, source))?;
            return Ok(());
        }
        let src = path::canonicalize(source)?;
        let dst = path::canonicalize(dest)?;
        debug!("Copying via extended path: {} -> {}", src, dst);
        self.check(self.native.copy(&src, &dst, !overwrite), dest)
    }

    pub fn rename(&self, source: &str, dest: &str) -> Result<()> {
        if !self.uses_extended(source) && !self.uses_extended(dest) {
            return fs::rename(source, dest).map_err(|e| FileError::from_io(e, source));
        }
        let src = path::canonicalize(source)?;
        let dst = path::canonicalize(dest)?;
        debug!("Moving via extended path: {} -> {}", src, dst);
        self.check(self.native.rename(&src, &dst), dest)
    }

    // --- whole-file reads -------------------------------------------------

    pub fn read_all_bytes(&self, path: &str) -> Result<Vec<u8>> {
        if !self.uses_extended(path) {
            return fs::read(path).map_err(|e| FileError::from_io(e, path));
        }
        let mut handle = self.open_native(path, Access::Read, Disposition::OpenExisting)?;
        let mut data = Vec::new();
        handle.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn read_all_text(&self, path: &str) -> Result<String> {
        self.read_all_text_with(path, &Utf8)
    }

    pub fn read_all_text_with(&self, path: &str, encoding: &dyn TextEncoding) -> Result<String> {
        Ok(encoding.decode(&self.read_all_bytes(path)?))
    }

    pub fn read_all_lines(&self, path: &str) -> Result<Vec<String>> {
        self.read_all_lines_with(path, &Utf8)
    }

    pub fn read_all_lines_with(
        &self,
        path: &str,
        encoding: &dyn TextEncoding,
    ) -> Result<Vec<String>> {
        Ok(split_lines(&self.read_all_text_with(path, encoding)?))
    }

    // --- whole-file writes ------------------------------------------------

    pub fn write_all_bytes(&self, path: &str, data: &[u8]) -> Result<()> {
        if !self.uses_extended(path) {
            return fs::write(path, data).map_err(|e| FileError::from_io(e, path));
        }
        let mut handle = self.open_native(path, Access::Write, Disposition::CreateAlways)?;
        handle.write_all(data)?;
        Ok(())
    }

    pub fn write_all_text(&self, path: &str, text: &str) -> Result<()> {
        self.write_all_text_with(path, text, &Utf8)
    }

    pub fn write_all_text_with(
        &self,
        path: &str,
        text: &str,
        encoding: &dyn TextEncoding,
    ) -> Result<()> {
        self.write_all_bytes(path, &encoding.encode(text))
    }

    pub fn append_all_text(&self, path: &str, text: &str) -> Result<()> {
        self.append_all_text_with(path, text, &Utf8)
    }

    pub fn append_all_text_with(
        &self,
        path: &str,
        text: &str,
        encoding: &dyn TextEncoding,
    ) -> Result<()> {
        let data = encoding.encode(text);
        if !self.uses_extended(path) {
            let mut file = fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map_err(|e| FileError::from_io(e, path))?;
            file.write_all(&data)?;
            return Ok(());
        }
        // The native open has no create-or-append disposition: try an
        // exclusive create first, then fall back to the existing file.
        let canonical = path::canonicalize(path)?;
        let mut handle = match self
            .native
            .open(&canonical, Access::Write, Disposition::CreateNew)
        {
            Some(handle) => handle,
            None => self
                .native
                .open(&canonical, Access::Write, Disposition::OpenExisting)
                .ok_or_else(|| self.native_error(path))?,
        };
        handle.seek(SeekFrom::End(0))?;
        handle.write_all(&data)?;
        Ok(())
    }

    // --- attributes -------------------------------------------------------

    /// Attribute bitmask of the file. Both routes end at the same native
    /// primitive; the conventional branch merely skips canonicalization,
    /// which is all the conventional attribute API does anyway.
    pub fn attributes(&self, path: &str) -> Result<u32> {
        let target = self.dispatch(path)?;
        let attributes = self.native.attributes(&target);
        if attributes == INVALID_ATTRIBUTES {
            return Err(self.native_error(path));
        }
        Ok(attributes)
    }

    pub fn set_attributes(&self, path: &str, attributes: u32) -> Result<()> {
        let target = self.dispatch(path)?;
        self.check(self.native.set_attributes(&target, attributes), path)
    }

    // --- file times -------------------------------------------------------

    /// The creation/last-access/last-write triple, read in one native call.
    pub fn file_times(&self, path: &str) -> Result<FileTimeTriple> {
        let handle = self.open_native(path, Access::Read, Disposition::OpenExisting)?;
        self.native
            .file_times(&handle)
            .ok_or_else(|| self.native_error(path))
    }

    pub fn creation_time(&self, path: &str) -> Result<u64> {
        Ok(self.file_times(path)?.creation)
    }

    pub fn last_access_time(&self, path: &str) -> Result<u64> {
        Ok(self.file_times(path)?.last_access)
    }

    pub fn last_write_time(&self, path: &str) -> Result<u64> {
        Ok(self.file_times(path)?.last_write)
    }

    pub fn set_creation_time(&self, path: &str, time: u64) -> Result<()> {
        self.update_times(path, |times| times.creation = time)
    }

    pub fn set_last_access_time(&self, path: &str, time: u64) -> Result<()> {
        self.update_times(path, |times| times.last_access = time)
    }

    pub fn set_last_write_time(&self, path: &str, time: u64) -> Result<()> {
        self.update_times(path, |times| times.last_write = time)
    }

    /// The set-time primitive takes all three fields, so read the current
    /// triple first and pass the untouched two back unchanged.
    fn update_times(&self, path: &str, apply: impl FnOnce(&mut FileTimeTriple)) -> Result<()> {
        let handle = self.open_native(path, Access::ReadWrite, Disposition::OpenExisting)?;
        let mut times = self
            .native
            .file_times(&handle)
            .ok_or_else(|| self.native_error(path))?;
        apply(&mut times);
        self.check(self.native.set_file_times(&handle, times), path)
    }

    // --- size / streams ---------------------------------------------------

    pub fn file_size(&self, path: &str) -> Result<u64> {
        if !self.uses_extended(path) {
            let meta = fs::metadata(path).map_err(|e| FileError::from_io(e, path))?;
            return Ok(meta.len());
        }
        let mut handle = self.open_native(path, Access::Read, Disposition::OpenExisting)?;
        Ok(handle.seek(SeekFrom::End(0))?)
    }

    /// Scoped read stream over the file; the handle closes when dropped.
    pub fn open_read(&self, path: &str) -> Result<N::Handle> {
        self.open_native(path, Access::Read, Disposition::OpenExisting)
    }

    /// Scoped read-write stream over an existing file, exclusive.
    pub fn open_write(&self, path: &str) -> Result<N::Handle> {
        self.open_native(path, Access::ReadWrite, Disposition::OpenExisting)
    }

    // --- internals --------------------------------------------------------

    /// Canonicalize when the path trips the threshold, pass through verbatim
    /// otherwise.
    fn dispatch(&self, path: &str) -> Result<String> {
        if self.uses_extended(path) {
            debug!(
                "Path length {} at or over threshold {}, using extended route",
                path.encode_utf16().count(),
                self.policy.max_path()
            );
            path::canonicalize(path)
        } else {
            Ok(path.to_string())
        }
    }

    fn open_native(
        &self,
        path: &str,
        access: Access,
        disposition: Disposition,
    ) -> Result<N::Handle> {
        let target = self.dispatch(path)?;
        self.native
            .open(&target, access, disposition)
            .ok_or_else(|| self.native_error(path))
    }

    /// For calls that yield a value (a handle, an attribute mask) a bare
    /// failure cannot be swallowed even when no error code is pending, so a
    /// zero code surfaces as an opaque `NativeFailure` here.
    fn native_error(&self, path: &str) -> FileError {
        match self.native.last_error() {
            0 => FileError::NativeFailure {
                code: 0,
                path: path.to_string(),
            },
            code => FileError::from_code(code, path),
        }
    }

    /// For boolean native calls: a failure with error code zero means no
    /// error is pending (the code would be stale from unrelated activity)
    /// and must not be reported as one.
    fn check(&self, ok: bool, path: &str) -> Result<()> {
        if ok {
            return Ok(());
        }
        match self.native.last_error() {
            0 => Ok(()),
            code => Err(FileError::from_code(code, path)),
        }
    }
}

/// Whole-file line splitting: any carriage return anywhere switches the
/// separator to `\r\n` for the entire blob, otherwise bare `\n` is used.
/// A file mixing both styles therefore splits inconsistently; callers
/// depend on this, so it stays.
fn split_lines(text: &str) -> Vec<String> {
    if text.contains('\r') {
        text.split("\r\n").map(str::to_string).collect()
    } else {
        text.split('\n').map(str::to_string).collect()
    }
}
