use std::ffi::OsStr;
use std::fs::File;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::io::{AsRawHandle, FromRawHandle};

use windows::core::PCWSTR;
use windows::Win32::Foundation::{GetLastError, FILETIME, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CopyFileW, CreateFileW, DeleteFileW, GetFileAttributesW, GetFileTime, MoveFileW,
    SetFileAttributesW, SetFileTime, CREATE_ALWAYS, CREATE_NEW, FILE_FLAGS_AND_ATTRIBUTES,
    FILE_GENERIC_READ, FILE_GENERIC_WRITE, FILE_SHARE_MODE, FILE_SHARE_NONE, FILE_SHARE_READ,
    FILE_WRITE_ATTRIBUTES, OPEN_EXISTING,
};

use crate::native::{Access, Disposition, FileTimeTriple, NativeFs};

/// Real Win32 backend. Paths arrive already dispatched (canonical for the
/// extended route); this layer only marshals them to wide strings and
/// forwards to the OS. Raw handles are wrapped in `std::fs::File` so they
/// close on drop on every exit path.
pub struct Win32Fs;

fn to_wide(path: &str) -> Vec<u16> {
    OsStr::new(path)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

fn filetime_to_u64(ft: FILETIME) -> u64 {
    (ft.dwLowDateTime as u64) | ((ft.dwHighDateTime as u64) << 32)
}

fn u64_to_filetime(value: u64) -> FILETIME {
    FILETIME {
        dwLowDateTime: value as u32,
        dwHighDateTime: (value >> 32) as u32,
    }
}

impl NativeFs for Win32Fs {
    type Handle = File;

    fn attributes(&self, path: &str) -> u32 {
        let wide = to_wide(path);
        unsafe { GetFileAttributesW(PCWSTR(wide.as_ptr())) }
    }

    fn set_attributes(&self, path: &str, attributes: u32) -> bool {
        let wide = to_wide(path);
        unsafe {
            SetFileAttributesW(PCWSTR(wide.as_ptr()), FILE_FLAGS_AND_ATTRIBUTES(attributes))
        }
        .is_ok()
    }

    fn delete(&self, path: &str) -> bool {
        let wide = to_wide(path);
        unsafe { DeleteFileW(PCWSTR(wide.as_ptr())) }.is_ok()
    }

    fn copy(&self, source: &str, dest: &str, fail_if_exists: bool) -> bool {
        let src = to_wide(source);
        let dst = to_wide(dest);
        unsafe { CopyFileW(PCWSTR(src.as_ptr()), PCWSTR(dst.as_ptr()), fail_if_exists) }.is_ok()
    }

    fn rename(&self, source: &str, dest: &str) -> bool {
        let src = to_wide(source);
        let dst = to_wide(dest);
        unsafe { MoveFileW(PCWSTR(src.as_ptr()), PCWSTR(dst.as_ptr())) }.is_ok()
    }

    fn open(&self, path: &str, access: Access, disposition: Disposition) -> Option<Self::Handle> {
        let (desired_access, share): (u32, FILE_SHARE_MODE) = match access {
            Access::Read => (FILE_GENERIC_READ.0, FILE_SHARE_READ),
            Access::Write => (FILE_GENERIC_WRITE.0, FILE_SHARE_NONE),
            Access::ReadWrite => (
                FILE_GENERIC_READ.0 | FILE_GENERIC_WRITE.0 | FILE_WRITE_ATTRIBUTES.0,
                FILE_SHARE_NONE,
            ),
        };
        let disposition = match disposition {
            Disposition::OpenExisting => OPEN_EXISTING,
            Disposition::CreateAlways => CREATE_ALWAYS,
            Disposition::CreateNew => CREATE_NEW,
        };
        let wide = to_wide(path);
        let handle = unsafe {
            CreateFileW(
                PCWSTR(wide.as_ptr()),
                desired_access,
                share,
                None,
                disposition,
                FILE_FLAGS_AND_ATTRIBUTES(0),
                None,
            )
        }
        .ok()?;
        Some(unsafe { File::from_raw_handle(handle.0 as _) })
    }

    fn file_times(&self, handle: &Self::Handle) -> Option<FileTimeTriple> {
        let raw = HANDLE(handle.as_raw_handle() as _);
        let mut creation = FILETIME::default();
        let mut access = FILETIME::default();
        let mut write = FILETIME::default();
        unsafe {
            GetFileTime(
                raw,
                Some(&mut creation),
                Some(&mut access),
                Some(&mut write),
            )
        }
        .ok()?;
        Some(FileTimeTriple {
            creation: filetime_to_u64(creation),
            last_access: filetime_to_u64(access),
            last_write: filetime_to_u64(write),
        })
    }

    fn set_file_times(&self, handle: &Self::Handle, times: FileTimeTriple) -> bool {
        let raw = HANDLE(handle.as_raw_handle() as _);
        let creation = u64_to_filetime(times.creation);
        let access = u64_to_filetime(times.last_access);
        let write = u64_to_filetime(times.last_write);
        unsafe { SetFileTime(raw, Some(&creation), Some(&access), Some(&write)) }.is_ok()
    }

    fn last_error(&self) -> u32 {
        unsafe { GetLastError() }.0
    }
}
