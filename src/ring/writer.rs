// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Wait-free single writer over the ring. No CAS, no retry loop —
// `write_idx` only ever moves forward under this one writer, so a plain
// store is sufficient; readers that observe a torn view of the cursor
// mid-transition simply back off to their last good sequence.

use std::sync::atomic::Ordering;

use crate::futex::{self, WakeCount};
use crate::ring::header::{encode_slot_header, Header, SLOT_HEADER_SIZE};
use crate::time::now_ns;

/// Outcome of a single [`RingWriter::try_write`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Published { sequence: u64 },
    /// Payload does not fit in a slot; nothing was written.
    TooLarge { max: usize },
}

/// Owns no memory of its own — it is a thin, repeatable view over a
/// region's bytes, constructed once by the publisher that calls
/// [`RingWriter::initialize`].
pub struct RingWriter {
    base: *mut u8,
    slot_count: u32,
    slot_mask: u64,
    slot_size: u32,
}

unsafe impl Send for RingWriter {}
unsafe impl Sync for RingWriter {}

impl RingWriter {
    /// Initializes a freshly created region's header and returns a writer
    /// over it. Must be called exactly once, by the process that created
    /// the region, before publishing the region's name to any reader.
    ///
    /// # Safety
    /// `base` must point to an exclusively-owned mapping of at least
    /// `Header::region_size(slot_count, slot_size)` bytes.
    pub unsafe fn initialize(base: *mut u8, slot_count: u32, slot_size: u32) -> Self {
        Header::initialize(base, slot_count, slot_size);
        Self {
            base,
            slot_count,
            slot_mask: slot_count as u64 - 1,
            slot_size,
        }
    }

    /// Attaches to an already-initialized region as its writer (used when
    /// a publisher process recovers the writer handle rather than
    /// creating it, e.g. in tests). Reads configuration straight from the
    /// header instead of re-running `initialize`.
    ///
    /// # Safety
    /// `base` must point to a mapping previously initialized by
    /// [`RingWriter::initialize`].
    pub unsafe fn attach(base: *mut u8) -> Self {
        let header = Header::at(base);
        header.acquire_fence();
        let slot_count = header.slot_count();
        Self {
            base,
            slot_count,
            slot_mask: slot_count as u64 - 1,
            slot_size: header.slot_size(),
        }
    }

    fn header(&self) -> &Header {
        unsafe { Header::at(self.base) }
    }

    fn slot_mut(&self, index: u64) -> &mut [u8] {
        let slot_idx = (index & self.slot_mask) as usize;
        let offset = Header::size() + slot_idx * self.slot_size as usize;
        unsafe {
            std::slice::from_raw_parts_mut(self.base.add(offset), self.slot_size as usize)
        }
    }

    pub fn slot_capacity(&self) -> usize {
        self.slot_size as usize - SLOT_HEADER_SIZE
    }

    /// Writes one message to the next slot and advances the cursor (spec
    /// §4.4.4). Wait-free: bounded work, no loop, no blocking syscall.
    pub fn try_write(&self, payload: &[u8]) -> WriteOutcome {
        let max = self.slot_capacity();
        if payload.len() > max {
            return WriteOutcome::TooLarge { max };
        }

        let header = self.header();
        let sequence = header.write_idx().load(Ordering::Relaxed);
        let timestamp_ns = now_ns();

        let slot = self.slot_mut(sequence);
        encode_slot_header(slot, payload.len() as u32, sequence, timestamp_ns);
        slot[SLOT_HEADER_SIZE..SLOT_HEADER_SIZE + payload.len()].copy_from_slice(payload);

        // Release: publishes both the slot body and the new cursor value
        // to every reader that subsequently loads write_idx with Acquire.
        header.write_idx().store(sequence + 1, Ordering::Release);
        header.wake_word().fetch_add(1, Ordering::Release);
        futex::wake(header.wake_word(), WakeCount::All);

        WriteOutcome::Published { sequence }
    }

    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    pub fn slot_size(&self) -> u32 {
        self.slot_size
    }
}
