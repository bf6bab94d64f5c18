// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Layer 4: the lock-free single-producer/multi-consumer ring (spec
// §4.4). One writer, up to [`header::MAX_SUBSCRIBERS`] independent
// readers, each with their own cursor and no shared mutable state beyond
// the bitmap CAS used to claim/release a reader slot.

pub mod header;
mod reader;
mod writer;

pub use header::{Header, CACHE_LINE_SIZE, MAX_SUBSCRIBERS, SLOT_HEADER_SIZE};
pub use reader::{MessageView, RingReader};
pub use writer::{RingWriter, WriteOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_region(slot_count: u32, slot_size: u32) -> Vec<u8> {
        vec![0u8; Header::region_size(slot_count, slot_size)]
    }

    #[test]
    fn single_writer_single_reader_round_trip() {
        let mut region = make_region(8, 64);
        let base = region.as_mut_ptr();
        let writer = unsafe { RingWriter::initialize(base, 8, 64) };
        let mut reader = unsafe { RingReader::attach(base, "t").unwrap() };

        assert!(reader.try_read().is_none());

        let outcome = writer.try_write(b"hello");
        assert_eq!(outcome, WriteOutcome::Published { sequence: 0 });

        let msg = reader.try_read().expect("message");
        assert_eq!(msg.payload, b"hello");
        assert_eq!(msg.sequence, 0);
        assert!(reader.try_read().is_none());
    }

    #[test]
    fn payload_too_large_is_rejected() {
        let mut region = make_region(4, 32);
        let base = region.as_mut_ptr();
        let writer = unsafe { RingWriter::initialize(base, 4, 32) };
        let max = writer.slot_capacity();
        let oversized = vec![0u8; max + 1];
        assert_eq!(
            writer.try_write(&oversized),
            WriteOutcome::TooLarge { max }
        );
    }

    #[test]
    fn fan_out_to_multiple_subscribers() {
        let mut region = make_region(8, 64);
        let base = region.as_mut_ptr();
        let writer = unsafe { RingWriter::initialize(base, 8, 64) };
        let mut r1 = unsafe { RingReader::attach(base, "t").unwrap() };
        let mut r2 = unsafe { RingReader::attach(base, "t").unwrap() };

        writer.try_write(b"fan-out");

        assert_eq!(r1.try_read().unwrap().payload, b"fan-out");
        assert_eq!(r2.try_read().unwrap().payload, b"fan-out");
    }

    #[test]
    fn late_subscriber_does_not_see_history() {
        let mut region = make_region(8, 64);
        let base = region.as_mut_ptr();
        let writer = unsafe { RingWriter::initialize(base, 8, 64) };
        writer.try_write(b"before");

        let mut late = unsafe { RingReader::attach(base, "t").unwrap() };
        assert!(late.try_read().is_none());

        writer.try_write(b"after");
        assert_eq!(late.try_read().unwrap().payload, b"after");
    }

    #[test]
    fn overrun_snaps_reader_forward_instead_of_blocking() {
        let mut region = make_region(4, 32);
        let base = region.as_mut_ptr();
        let writer = unsafe { RingWriter::initialize(base, 4, 32) };
        let mut reader = unsafe { RingReader::attach(base, "t").unwrap() };

        for i in 0..10u8 {
            writer.try_write(&[i]);
        }

        // Ring only holds 4 slots; the reader was lapped more than twice
        // over. It must resynchronize, not panic or return stale data.
        let msg = reader.try_read().expect("resynced message");
        assert!(msg.sequence >= 10 - 4);
    }

    #[test]
    fn release_frees_subscriber_slot_for_reuse() {
        let mut region = make_region(4, 32);
        let base = region.as_mut_ptr();
        unsafe { RingWriter::initialize(base, 4, 32) };

        let mut claimed = Vec::new();
        for _ in 0..MAX_SUBSCRIBERS {
            claimed.push(unsafe { RingReader::attach(base, "t").unwrap() });
        }
        assert!(unsafe { RingReader::attach(base, "t") }.is_err());

        drop(claimed.pop().unwrap());
        assert!(unsafe { RingReader::attach(base, "t") }.is_ok());
    }

    #[test]
    fn wait_for_times_out_when_nothing_published() {
        let mut region = make_region(4, 32);
        let base = region.as_mut_ptr();
        unsafe { RingWriter::initialize(base, 4, 32) };
        let mut reader = unsafe { RingReader::attach(base, "t").unwrap() };

        let result = reader.wait_for(Duration::from_millis(20));
        assert!(result.is_none());
    }

    #[test]
    fn wait_for_wakes_on_publish_from_another_thread() {
        // A leaked buffer stands in for a shared-memory mapping: both
        // handles below point at the same bytes for the rest of the
        // process's life, exactly as two processes would share a region.
        let region: &'static mut [u8] = vec![0u8; Header::region_size(8, 64)].leak();
        let base = region.as_mut_ptr();
        let writer = unsafe { RingWriter::initialize(base, 8, 64) };
        let mut reader = unsafe { RingReader::attach(base, "t").unwrap() };

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            writer.try_write(b"woke up");
        });

        let msg = reader.wait_for(Duration::from_secs(2));
        assert_eq!(msg.unwrap().payload, b"woke up");
        handle.join().unwrap();
    }
}
