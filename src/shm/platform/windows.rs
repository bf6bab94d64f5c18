// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Windows backend for named shared memory: CreateFileMappingW (create) /
// OpenFileMappingW (open) + MapViewOfFile. Windows shared memory is
// pagefile-backed and has no unlink step — the mapping object is
// reference-counted by the OS and disappears when the last handle closes.

use std::io;
use std::ptr;
use windows_sys::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, FALSE, HANDLE};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingW, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile, VirtualQuery,
    FILE_MAP_ALL_ACCESS, MEMORY_BASIC_INFORMATION, PAGE_READWRITE, SEC_COMMIT,
};

pub(crate) struct PlatformMapping {
    pub(crate) ptr: *mut u8,
    pub(crate) size: usize,
    handle: HANDLE,
}

unsafe impl Send for PlatformMapping {}
unsafe impl Sync for PlatformMapping {}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn map_view(handle: HANDLE) -> io::Result<*mut u8> {
    let mem = unsafe { MapViewOfFile(handle, FILE_MAP_ALL_ACCESS, 0, 0, 0) };
    if mem.is_null() {
        let err = io::Error::last_os_error();
        unsafe { CloseHandle(handle) };
        return Err(err);
    }
    Ok(mem as *mut u8)
}

pub(crate) fn create(os_name: &str, size: usize) -> io::Result<PlatformMapping> {
    let wide = to_wide(os_name);
    let handle = unsafe {
        CreateFileMappingW(
            windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE,
            ptr::null(),
            PAGE_READWRITE | SEC_COMMIT,
            0,
            size as u32,
            wide.as_ptr(),
        )
    };
    let last_err = unsafe { windows_sys::Win32::Foundation::GetLastError() };
    if handle == 0 {
        return Err(io::Error::last_os_error());
    }
    if last_err == ERROR_ALREADY_EXISTS {
        unsafe { CloseHandle(handle) };
        return Err(io::Error::new(io::ErrorKind::AlreadyExists, "shm already exists"));
    }

    let ptr = map_view(handle)?;
    Ok(PlatformMapping { ptr, size, handle })
}

pub(crate) fn open(os_name: &str) -> io::Result<PlatformMapping> {
    let wide = to_wide(os_name);
    let handle = unsafe { OpenFileMappingW(FILE_MAP_ALL_ACCESS, FALSE, wide.as_ptr()) };
    if handle == 0 {
        return Err(io::Error::last_os_error());
    }

    let ptr = map_view(handle)?;

    let mut info: MEMORY_BASIC_INFORMATION = unsafe { std::mem::zeroed() };
    let ret = unsafe {
        VirtualQuery(
            ptr as *const _,
            &mut info,
            std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
        )
    };
    if ret == 0 {
        let err = io::Error::last_os_error();
        unsafe {
            UnmapViewOfFile(ptr as *const _);
            CloseHandle(handle);
        }
        return Err(err);
    }

    Ok(PlatformMapping {
        ptr,
        size: info.RegionSize,
        handle,
    })
}

pub(crate) fn exists(os_name: &str) -> bool {
    let wide = to_wide(os_name);
    let handle = unsafe { OpenFileMappingW(FILE_MAP_ALL_ACCESS, FALSE, wide.as_ptr()) };
    if handle == 0 {
        false
    } else {
        unsafe { CloseHandle(handle) };
        true
    }
}

/// No-op: Windows has no shared-memory namespace to unlink from — the
/// mapping object is destroyed when the last handle to it closes.
pub(crate) fn unlink(_os_name: &str) {}

pub(crate) unsafe fn unmap(mapping: &PlatformMapping) {
    if !mapping.ptr.is_null() {
        UnmapViewOfFile(mapping.ptr as *const _);
    }
    if mapping.handle != 0 {
        CloseHandle(mapping.handle);
    }
}
