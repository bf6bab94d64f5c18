// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Monotonic nanosecond clock. Used only to stamp outgoing messages; this
// module has no dependency on any other module in the crate (layer 1 of
// the design — see SPEC_FULL.md §2).

/// Returns a monotonic nanosecond counter, never affected by wall-clock
/// adjustments. Never decreases across calls within a process and is
/// comparable across processes on the same host.
///
/// Uses `CLOCK_MONOTONIC` on Unix and `QueryPerformanceCounter` on
/// Windows — see SPEC_FULL.md §9 for why this substitutes for the
/// original's `CLOCK_MONOTONIC_RAW`.
#[cfg(unix)]
#[inline]
pub fn now_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }
    (ts.tv_sec as u64)
        .saturating_mul(1_000_000_000)
        .saturating_add(ts.tv_nsec as u64)
}

#[cfg(windows)]
#[inline]
pub fn now_ns() -> u64 {
    use std::sync::OnceLock;
    use windows_sys::Win32::System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency};

    static FREQ: OnceLock<u64> = OnceLock::new();
    let freq = *FREQ.get_or_init(|| {
        let mut f = 0i64;
        unsafe { QueryPerformanceFrequency(&mut f) };
        f.max(1) as u64
    });

    let mut counter = 0i64;
    unsafe { QueryPerformanceCounter(&mut counter) };
    (counter as u64).saturating_mul(1_000_000_000) / freq
}
