use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

use crate::error::{
    ERROR_ACCESS_DENIED, ERROR_ALREADY_EXISTS, ERROR_FILE_EXISTS, ERROR_FILE_NOT_FOUND,
};
use crate::native::{
    Access, Disposition, FileTimeTriple, NativeFs, ATTRIBUTE_NORMAL, ATTRIBUTE_READONLY,
    INVALID_ATTRIBUTES,
};

#[derive(Debug, Clone)]
struct MemEntry {
    data: Vec<u8>,
    attributes: u32,
    times: FileTimeTriple,
}

type SharedEntry = Rc<RefCell<MemEntry>>;

/// In-memory stand-in for the Win32 primitives. Keys are exactly the path
/// strings handed to it, so tests observe which form (conventional or
/// canonical) an operation dispatched with. Error reporting follows the
/// Win32 shape: failed calls return `false`/`None` and park a code for
/// [`NativeFs::last_error`]; successful calls do not clear a stale code.
#[derive(Default)]
pub struct MemFs {
    files: RefCell<HashMap<String, SharedEntry>>,
    last_error: Cell<u32>,
    clock: Cell<u64>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test-setup shortcut: place a file without going through `open`.
    pub fn insert_file(&self, path: &str, data: &[u8]) {
        let times = self.tick();
        self.files.borrow_mut().insert(
            path.to_string(),
            Rc::new(RefCell::new(MemEntry {
                data: data.to_vec(),
                attributes: ATTRIBUTE_NORMAL,
                times,
            })),
        );
    }

    /// Current bytes of a stored file, if present.
    pub fn snapshot(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .borrow()
            .get(path)
            .map(|entry| entry.borrow().data.clone())
    }

    fn tick(&self) -> FileTimeTriple {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        FileTimeTriple {
            creation: now,
            last_access: now,
            last_write: now,
        }
    }

    fn fail(&self, code: u32) {
        self.last_error.set(code);
    }

    fn entry(&self, path: &str) -> Option<SharedEntry> {
        self.files.borrow().get(path).cloned()
    }
}

pub struct MemHandle {
    entry: SharedEntry,
    pos: u64,
    writable: bool,
}

impl Read for MemHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let entry = self.entry.borrow();
        let start = (self.pos as usize).min(entry.data.len());
        let n = (entry.data.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&entry.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "handle not opened for write",
            ));
        }
        let mut entry = self.entry.borrow_mut();
        let start = self.pos as usize;
        if entry.data.len() < start {
            entry.data.resize(start, 0);
        }
        let overlap = (entry.data.len() - start).min(buf.len());
        entry.data[start..start + overlap].copy_from_slice(&buf[..overlap]);
        entry.data.extend_from_slice(&buf[overlap..]);
        self.pos += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.entry.borrow().data.len() as i64;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => len + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of file",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}

impl NativeFs for MemFs {
    type Handle = MemHandle;

    fn attributes(&self, path: &str) -> u32 {
        match self.entry(path) {
            Some(entry) => entry.borrow().attributes,
            None => {
                self.fail(ERROR_FILE_NOT_FOUND);
                INVALID_ATTRIBUTES
            }
        }
    }

    fn set_attributes(&self, path: &str, attributes: u32) -> bool {
        match self.entry(path) {
            Some(entry) => {
                entry.borrow_mut().attributes = attributes;
                true
            }
            None => {
                self.fail(ERROR_FILE_NOT_FOUND);
                false
            }
        }
    }

    fn delete(&self, path: &str) -> bool {
        let readonly = match self.entry(path) {
            Some(entry) => entry.borrow().attributes & ATTRIBUTE_READONLY != 0,
            None => {
                self.fail(ERROR_FILE_NOT_FOUND);
                return false;
            }
        };
        if readonly {
            self.fail(ERROR_ACCESS_DENIED);
            return false;
        }
        self.files.borrow_mut().remove(path);
        true
    }

    fn copy(&self, source: &str, dest: &str, fail_if_exists: bool) -> bool {
        let Some(src) = self.entry(source) else {
            self.fail(ERROR_FILE_NOT_FOUND);
            return false;
        };
        if self.entry(dest).is_some() && fail_if_exists {
            self.fail(ERROR_FILE_EXISTS);
            return false;
        }
        let cloned = src.borrow().clone();
        self.files
            .borrow_mut()
            .insert(dest.to_string(), Rc::new(RefCell::new(cloned)));
        true
    }

    fn rename(&self, source: &str, dest: &str) -> bool {
        let mut files = self.files.borrow_mut();
        if files.contains_key(dest) {
            self.fail(ERROR_ALREADY_EXISTS);
            return false;
        }
        match files.remove(source) {
            Some(entry) => {
                files.insert(dest.to_string(), entry);
                true
            }
            None => {
                self.fail(ERROR_FILE_NOT_FOUND);
                false
            }
        }
    }

    fn open(&self, path: &str, access: Access, disposition: Disposition) -> Option<Self::Handle> {
        let writable = access != Access::Read;
        let existing = self.entry(path);

        if writable {
            if let Some(entry) = &existing {
                if entry.borrow().attributes & ATTRIBUTE_READONLY != 0 {
                    self.fail(ERROR_ACCESS_DENIED);
                    return None;
                }
            }
        }

        let entry = match (disposition, existing) {
            (Disposition::OpenExisting, Some(entry)) => entry,
            (Disposition::OpenExisting, None) => {
                self.fail(ERROR_FILE_NOT_FOUND);
                return None;
            }
            (Disposition::CreateNew, Some(_)) => {
                self.fail(ERROR_FILE_EXISTS);
                return None;
            }
            (Disposition::CreateAlways, Some(entry)) => {
                entry.borrow_mut().data.clear();
                entry
            }
            (Disposition::CreateAlways, None) | (Disposition::CreateNew, None) => {
                let times = self.tick();
                let entry = Rc::new(RefCell::new(MemEntry {
                    data: Vec::new(),
                    attributes: ATTRIBUTE_NORMAL,
                    times,
                }));
                self.files
                    .borrow_mut()
                    .insert(path.to_string(), entry.clone());
                entry
            }
        };

        Some(MemHandle {
            entry,
            pos: 0,
            writable,
        })
    }

    fn file_times(&self, handle: &Self::Handle) -> Option<FileTimeTriple> {
        Some(handle.entry.borrow().times)
    }

    fn set_file_times(&self, handle: &Self::Handle, times: FileTimeTriple) -> bool {
        if !handle.writable {
            self.fail(ERROR_ACCESS_DENIED);
            return false;
        }
        handle.entry.borrow_mut().times = times;
        true
    }

    fn last_error(&self) -> u32 {
        self.last_error.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_existing_missing_sets_not_found() {
        let fs = MemFs::new();
        assert!(fs
            .open("x", Access::Read, Disposition::OpenExisting)
            .is_none());
        assert_eq!(fs.last_error(), ERROR_FILE_NOT_FOUND);
    }

    #[test]
    fn test_create_new_refuses_existing() {
        let fs = MemFs::new();
        fs.insert_file("x", b"data");
        assert!(fs.open("x", Access::Write, Disposition::CreateNew).is_none());
        assert_eq!(fs.last_error(), ERROR_FILE_EXISTS);
    }

    #[test]
    fn test_create_always_truncates() {
        let fs = MemFs::new();
        fs.insert_file("x", b"old content");
        let mut handle = fs
            .open("x", Access::Write, Disposition::CreateAlways)
            .unwrap();
        handle.write_all(b"new").unwrap();
        drop(handle);
        assert_eq!(fs.snapshot("x").unwrap(), b"new");
    }

    #[test]
    fn test_read_handle_refuses_writes() {
        let fs = MemFs::new();
        fs.insert_file("x", b"data");
        let mut handle = fs.open("x", Access::Read, Disposition::OpenExisting).unwrap();
        assert!(handle.write_all(b"no").is_err());
    }

    #[test]
    fn test_delete_readonly_is_access_denied() {
        let fs = MemFs::new();
        fs.insert_file("x", b"data");
        fs.set_attributes("x", ATTRIBUTE_READONLY);
        assert!(!fs.delete("x"));
        assert_eq!(fs.last_error(), ERROR_ACCESS_DENIED);
    }

    #[test]
    fn test_stale_error_code_survives_success() {
        let fs = MemFs::new();
        assert!(!fs.delete("missing"));
        fs.insert_file("x", b"data");
        assert!(fs.delete("x"));
        // Success does not clear the code, exactly like GetLastError.
        assert_eq!(fs.last_error(), ERROR_FILE_NOT_FOUND);
    }
}
