// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Named shared-memory region lifecycle. Existence is a system-wide fact
// independent of any one process; a `Region` is just this process's
// mapping of it.

mod platform;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::ConduitError;
use crate::naming;

/// A page-aligned, named shared-memory mapping.
///
/// Move-only: dropping a `Region` unmaps it but never unlinks the
/// system-wide name — only [`unlink`] or the owning publisher's
/// explicit teardown does that.
pub struct Region {
    mapping: platform::PlatformMapping,
    name: String,
}

// The mapping is shared-mutable by design; every concurrent access goes
// through the atomics the ring module places over these bytes.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Creates a region exclusively. Fails with
    /// [`ConduitError::RegionAlreadyExists`] if the name is taken. On any
    /// mid-way failure, the partially created name is unlinked before the
    /// error is returned (handled inside the platform backend).
    pub fn create(topic: &str, size: usize) -> Result<Self, ConduitError> {
        let os_name = naming::os_name(topic);
        match platform::create(&os_name, size) {
            Ok(mapping) => Ok(Self {
                mapping,
                name: topic.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(ConduitError::RegionAlreadyExists {
                    topic: topic.to_string(),
                })
            }
            Err(e) if e.raw_os_error() == Some(libc_eexist()) => {
                Err(ConduitError::RegionAlreadyExists {
                    topic: topic.to_string(),
                })
            }
            Err(source) => Err(ConduitError::RegionOsFailure {
                topic: topic.to_string(),
                source,
            }),
        }
    }

    /// Opens an existing region. Fails with [`ConduitError::RegionNotFound`]
    /// if no publisher has created it.
    pub fn open(topic: &str) -> Result<Self, ConduitError> {
        let os_name = naming::os_name(topic);
        match platform::open(&os_name) {
            Ok(mapping) => Ok(Self {
                mapping,
                name: topic.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConduitError::RegionNotFound {
                    topic: topic.to_string(),
                })
            }
            Err(e) if e.raw_os_error() == Some(libc_enoent()) => {
                Err(ConduitError::RegionNotFound {
                    topic: topic.to_string(),
                })
            }
            Err(source) => Err(ConduitError::RegionOsFailure {
                topic: topic.to_string(),
                source,
            }),
        }
    }

    /// Non-blocking existence probe.
    pub fn exists(topic: &str) -> bool {
        platform::exists(&naming::os_name(topic))
    }

    /// Polls until the region exists or `still_running` is cleared.
    /// Returns `true` the first time the region is present, `false` if
    /// `still_running` became `false` first. Exists because a subscriber
    /// may legitimately start before its publisher.
    pub fn wait_until_exists(
        topic: &str,
        still_running: &AtomicBool,
        poll_interval: Duration,
    ) -> bool {
        while still_running.load(Ordering::Acquire) {
            if Self::exists(topic) {
                return true;
            }
            std::thread::sleep(poll_interval);
        }
        false
    }

    /// Removes the name from the system namespace. Existing mappings
    /// remain valid until dropped; new openers will fail from this point.
    pub fn unlink(topic: &str) {
        platform::unlink(&naming::os_name(topic));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.mapping.size
    }

    pub fn data_ptr(&self) -> *mut u8 {
        self.mapping.ptr
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        unsafe { platform::unmap(&self.mapping) };
    }
}

#[cfg(unix)]
fn libc_eexist() -> i32 {
    libc::EEXIST
}
#[cfg(not(unix))]
fn libc_eexist() -> i32 {
    i32::MIN
}

#[cfg(unix)]
fn libc_enoent() -> i32 {
    libc::ENOENT
}
#[cfg(not(unix))]
fn libc_enoent() -> i32 {
    i32::MIN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_topic(prefix: &str) -> String {
        static COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}_{}_{n}", std::process::id())
    }

    #[test]
    fn create_then_exists_then_unlink() {
        let topic = unique_topic("region_lifecycle");
        Region::unlink(&topic);
        assert!(!Region::exists(&topic));

        let region = Region::create(&topic, 4096).expect("create");
        assert_eq!(region.size(), 4096);
        assert!(Region::exists(&topic));

        drop(region);
        assert!(Region::exists(&topic)); // unmap does not unlink
        Region::unlink(&topic);
        assert!(!Region::exists(&topic));
    }

    #[test]
    fn double_create_fails_then_succeeds_after_unlink() {
        let topic = unique_topic("region_double_create");
        Region::unlink(&topic);

        let first = Region::create(&topic, 4096).expect("first create");
        let second = Region::create(&topic, 4096);
        assert!(matches!(second, Err(ConduitError::RegionAlreadyExists { .. })));

        drop(first);
        Region::unlink(&topic);
        let third = Region::create(&topic, 4096);
        assert!(third.is_ok());
        Region::unlink(&topic);
    }

    #[test]
    fn open_nonexistent_fails() {
        let topic = unique_topic("region_open_missing");
        Region::unlink(&topic);
        let result = Region::open(&topic);
        assert!(matches!(result, Err(ConduitError::RegionNotFound { .. })));
    }

    #[test]
    fn open_sees_publisher_size() {
        let topic = unique_topic("region_open_sized");
        Region::unlink(&topic);
        let publisher = Region::create(&topic, 8192).expect("create");
        let subscriber = Region::open(&topic).expect("open");
        assert_eq!(subscriber.size(), publisher.size());
        drop(publisher);
        Region::unlink(&topic);
    }

    #[test]
    fn wait_until_exists_stops_on_flag() {
        let topic = unique_topic("region_wait_stop");
        Region::unlink(&topic);
        let running = AtomicBool::new(false);
        let found = Region::wait_until_exists(&topic, &running, Duration::from_millis(5));
        assert!(!found);
    }

    #[test]
    fn wait_until_exists_finds_late_publisher() {
        let topic = unique_topic("region_wait_found");
        Region::unlink(&topic);
        let running = std::sync::Arc::new(AtomicBool::new(true));
        let r2 = std::sync::Arc::clone(&running);
        let topic2 = topic.clone();
        let handle = std::thread::spawn(move || {
            Region::wait_until_exists(&topic2, &r2, Duration::from_millis(5))
        });
        std::thread::sleep(Duration::from_millis(20));
        let region = Region::create(&topic, 1024).expect("create");
        assert!(handle.join().unwrap());
        drop(region);
        Region::unlink(&topic);
    }
}
