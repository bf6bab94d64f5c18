// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Kernel-assisted wait/wake primitive (layer 2 — see SPEC_FULL.md §2, §4.2).
// Wraps a futex-style "park while a 32-bit word equals an expected value,
// wake N waiters when the word changes" facility. Cross-process: the word
// must live in shared memory, which is why (unlike a same-process atomic
// wait helper) this does not use the private/same-process fast path the
// OS offers.

use std::sync::atomic::AtomicU32;
use std::time::Duration;

/// Outcome of a [`wait`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// Returned because the word changed, a spurious wakeup occurred, or a
    /// `wake` call matched. Callers must re-check their condition — a
    /// `Woken` result never by itself implies new data is present.
    Woken,
    /// A real timeout elapsed with no wake.
    TimedOut,
}

/// How many parked waiters to wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCount {
    Count(i32),
    All,
}

/// Park the calling thread while `*word == expected`, or return
/// immediately if it does not. An optional `timeout` bounds how long the
/// call may block.
///
/// Spurious `Woken` returns are permitted and expected; callers must loop
/// and re-check their own condition rather than assume `Woken` means data
/// arrived.
pub fn wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>) -> WaitResult {
    imp::wait(word, expected, timeout)
}

/// Wake parked waiters on `word`. `count` selects how many; waking an
/// address with no waiters is a cheap no-op. Returns the number of
/// waiters actually woken (best-effort; `0` is always a valid, harmless
/// answer even on platforms that cannot report a precise count).
pub fn wake(word: &AtomicU32, count: WakeCount) -> u32 {
    imp::wake(word, count)
}

#[cfg(target_os = "linux")]
mod imp {
    use super::*;
    use std::ptr;

    pub(super) fn wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>) -> WaitResult {
        let ts = timeout.map(|d| libc::timespec {
            tv_sec: d.as_secs() as libc::time_t,
            tv_nsec: d.subsec_nanos() as libc::c_long,
        });
        let ts_ptr = ts
            .as_ref()
            .map(|t| t as *const libc::timespec)
            .unwrap_or(ptr::null());

        // No FUTEX_PRIVATE_FLAG: the word lives in memory shared across
        // unrelated processes, so the kernel must treat this as a
        // process-shared futex.
        let rc = unsafe {
            libc::syscall(
                libc::SYS_futex,
                word as *const AtomicU32 as *const u32,
                libc::FUTEX_WAIT,
                expected,
                ts_ptr,
                ptr::null::<u32>(),
                0u32,
            )
        };

        if rc == 0 {
            return WaitResult::Woken;
        }
        match unsafe { *libc::__errno_location() } {
            libc::EAGAIN => WaitResult::Woken, // value already changed
            libc::ETIMEDOUT => WaitResult::TimedOut,
            libc::EINTR => WaitResult::Woken, // spurious; caller re-checks
            _ => WaitResult::Woken,
        }
    }

    pub(super) fn wake(word: &AtomicU32, count: WakeCount) -> u32 {
        let n: i32 = match count {
            WakeCount::Count(n) => n,
            WakeCount::All => i32::MAX,
        };
        let rc = unsafe {
            libc::syscall(
                libc::SYS_futex,
                word as *const AtomicU32 as *const u32,
                libc::FUTEX_WAKE,
                n,
                ptr::null::<libc::timespec>(),
                ptr::null::<u32>(),
                0u32,
            )
        };
        if rc > 0 {
            rc as u32
        } else {
            0
        }
    }
}

#[cfg(windows)]
mod imp {
    use super::*;
    use std::ffi::c_void;
    use windows_sys::Win32::System::Threading::{
        WaitOnAddress, WakeByAddressAll, WakeByAddressSingle,
    };

    pub(super) fn wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>) -> WaitResult {
        let expected = expected;
        let timeout_ms = match timeout {
            Some(d) => d.as_millis().min(u32::MAX as u128) as u32,
            None => u32::MAX, // INFINITE
        };
        let ok = unsafe {
            WaitOnAddress(
                word as *const AtomicU32 as *const c_void,
                &expected as *const u32 as *const c_void,
                std::mem::size_of::<u32>(),
                timeout_ms,
            )
        };
        if ok == 0 {
            // GetLastError() == ERROR_TIMEOUT in the timeout case; any
            // other failure is treated as a spurious wake per this
            // module's documented contract.
            if timeout.is_some() {
                WaitResult::TimedOut
            } else {
                WaitResult::Woken
            }
        } else {
            WaitResult::Woken
        }
    }

    pub(super) fn wake(word: &AtomicU32, count: WakeCount) -> u32 {
        let addr = word as *const AtomicU32 as *const c_void;
        match count {
            WakeCount::All => {
                unsafe { WakeByAddressAll(addr) };
                u32::MAX
            }
            WakeCount::Count(n) => {
                for _ in 0..n.max(0) {
                    unsafe { WakeByAddressSingle(addr) };
                }
                n.max(0) as u32
            }
        }
    }
}

#[cfg(not(any(target_os = "linux", windows)))]
mod imp {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Instant;

    // No portable cross-process park/wake primitive on this target; fall
    // back to a short-sleep poll. Never selected on the platforms this
    // crate is actually built for in production (Linux/Windows).
    pub(super) fn wait(word: &AtomicU32, expected: u32, timeout: Option<Duration>) -> WaitResult {
        let deadline = timeout.map(|d| Instant::now() + d);
        loop {
            if word.load(Ordering::Relaxed) != expected {
                return WaitResult::Woken;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return WaitResult::TimedOut;
                }
            }
            std::thread::sleep(Duration::from_micros(200));
        }
    }

    pub(super) fn wake(_word: &AtomicU32, _count: WakeCount) -> u32 {
        0
    }
}
