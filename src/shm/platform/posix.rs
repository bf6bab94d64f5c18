// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// POSIX backend for named shared memory: shm_open + ftruncate + mmap.
// No trailing reference-counter footer — the ring wire format must be
// byte-exact across languages, so the region holds exactly
// header_size + slot_count*slot_size bytes, nothing appended.

use std::ffi::CString;
use std::io;
use std::ptr;

pub(crate) struct PlatformMapping {
    pub(crate) ptr: *mut u8,
    pub(crate) size: usize,
}

unsafe impl Send for PlatformMapping {}
unsafe impl Sync for PlatformMapping {}

fn c_name(os_name: &str) -> io::Result<CString> {
    let name = if os_name.starts_with('/') {
        os_name.to_string()
    } else {
        format!("/{os_name}")
    };
    CString::new(name).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

/// Create exclusively. On any failure after the object is created, the
/// name is unlinked before returning the error.
pub(crate) fn create(os_name: &str, size: usize) -> io::Result<PlatformMapping> {
    let cname = c_name(os_name)?;
    let perms: libc::mode_t = 0o666;

    let fd = unsafe {
        libc::shm_open(
            cname.as_ptr(),
            libc::O_RDWR | libc::O_CREAT | libc::O_EXCL,
            perms as libc::c_uint,
        )
    };
    if fd == -1 {
        return Err(io::Error::last_os_error());
    }

    let cleanup_and_err = |fd: i32, cname: &CString, err: io::Error| -> io::Error {
        unsafe {
            libc::close(fd);
            libc::shm_unlink(cname.as_ptr());
        }
        err
    };

    if unsafe { libc::ftruncate(fd, size as libc::off_t) } != 0 {
        return Err(cleanup_and_err(fd, &cname, io::Error::last_os_error()));
    }

    let mem = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };
    unsafe { libc::close(fd) };

    if mem == libc::MAP_FAILED {
        let err = io::Error::last_os_error();
        unsafe { libc::shm_unlink(cname.as_ptr()) };
        return Err(err);
    }

    Ok(PlatformMapping {
        ptr: mem as *mut u8,
        size,
    })
}

/// Open an existing region, discovering its size via `fstat`.
pub(crate) fn open(os_name: &str) -> io::Result<PlatformMapping> {
    let cname = c_name(os_name)?;
    let fd = unsafe { libc::shm_open(cname.as_ptr(), libc::O_RDWR, 0) };
    if fd == -1 {
        return Err(io::Error::last_os_error());
    }

    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    if unsafe { libc::fstat(fd, &mut st) } != 0 {
        let err = io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(err);
    }
    let size = st.st_size as usize;

    let mem = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };
    unsafe { libc::close(fd) };

    if mem == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }

    Ok(PlatformMapping {
        ptr: mem as *mut u8,
        size,
    })
}

pub(crate) fn exists(os_name: &str) -> bool {
    let Ok(cname) = c_name(os_name) else {
        return false;
    };
    let fd = unsafe { libc::shm_open(cname.as_ptr(), libc::O_RDONLY, 0) };
    if fd == -1 {
        false
    } else {
        unsafe { libc::close(fd) };
        true
    }
}

pub(crate) fn unlink(os_name: &str) {
    if let Ok(cname) = c_name(os_name) {
        unsafe {
            libc::shm_unlink(cname.as_ptr());
        }
    }
}

pub(crate) unsafe fn unmap(mapping: &PlatformMapping) {
    if !mapping.ptr.is_null() {
        libc::munmap(mapping.ptr as *mut libc::c_void, mapping.size);
    }
}
