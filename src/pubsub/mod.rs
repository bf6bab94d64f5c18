// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// The Publisher/Subscriber façade. This is the crate's public surface
// — everything below exists to make `publish` and `try_take` cheap and
// correct.

mod typed;

pub use typed::{
    FixedMessage, SerialPublisher, SerialSubscriber, SerializableMessage, TypedPublisher,
    TypedSubscriber,
};

use std::time::Duration;

use crate::error::{ConduitError, Result};
use crate::ring::{Header, MessageView, RingReader, RingWriter};
use crate::shm::Region;

/// Construction parameters for [`Publisher::new`]. Defaults to a depth
/// of 16 slots and 4 KiB messages.
#[derive(Debug, Clone, Copy)]
pub struct PublisherOptions {
    /// Ring depth; must be a power of two, at least 1.
    pub depth: u32,
    /// Largest payload this topic will ever carry.
    pub max_message_size: u32,
}

impl Default for PublisherOptions {
    fn default() -> Self {
        Self {
            depth: 16,
            max_message_size: 4096,
        }
    }
}

/// A topic's sole writer. Not `Clone` — the ring's wait-free write
/// algorithm assumes exactly one logical writer; sharing a `Publisher`
/// across threads and calling `publish` concurrently from more than one
/// of them is undefined.
pub struct Publisher {
    region: Region,
    writer: RingWriter,
}

impl Publisher {
    /// Creates the topic's region exclusively and initializes the ring.
    /// Fails with [`ConduitError::RegionAlreadyExists`] if another
    /// publisher already owns this topic.
    pub fn new(topic: &str, options: PublisherOptions) -> Result<Self> {
        assert!(options.depth.is_power_of_two() && options.depth > 0);
        let slot_size = 20 + options.max_message_size;
        let size = Header::region_size(options.depth, slot_size);
        let region = Region::create(topic, size)?;
        let writer = unsafe { RingWriter::initialize(region.data_ptr(), options.depth, slot_size) };
        Ok(Self { region, writer })
    }

    /// Publishes `payload`. Returns `true` on success, `false` if
    /// `payload` exceeds this topic's slot capacity — oversize payloads
    /// are non-fatal, reported as a falsy result rather than an `Err`.
    /// Wait-free: never blocks, never allocates.
    pub fn publish(&self, payload: &[u8]) -> bool {
        match self.writer.try_write(payload) {
            crate::ring::WriteOutcome::Published { .. } => true,
            crate::ring::WriteOutcome::TooLarge { .. } => false,
        }
    }

    pub fn topic(&self) -> &str {
        self.region.name()
    }

    /// Read-only introspection for a CLI-style `info` command.
    pub fn stats(&self) -> TopicStats {
        TopicStats::read(self.region.data_ptr())
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        Region::unlink(self.region.name());
    }
}

/// Construction parameters for [`Subscriber::new`]. Currently empty —
/// reserved for future per-subscriber tuning (e.g. a custom poll
/// interval for `wait_until_exists`); kept as a struct rather than a bare
/// `topic: &str` argument so adding a field later is not a breaking
/// change.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriberOptions {}

/// One subscriber's claim on a topic. Releases its reader slot on drop.
pub struct Subscriber {
    region: Region,
    reader: RingReader,
}

impl Subscriber {
    /// Opens an existing topic and claims a reader slot. Fails with
    /// [`ConduitError::RegionNotFound`] if no publisher has created the
    /// region yet, or [`ConduitError::NoSubscriberSlots`] if the topic
    /// already has `max_subscribers` attached readers.
    pub fn new(topic: &str, _options: SubscriberOptions) -> Result<Self> {
        let region = Region::open(topic)?;
        let reader = unsafe { RingReader::attach(region.data_ptr(), topic)? };
        Ok(Self { region, reader })
    }

    /// Non-blocking receive. `None` means nothing new has been published
    /// since the last call (or since attach, for the first call).
    pub fn try_take(&mut self) -> Option<MessageView<'_>> {
        self.reader.try_read()
    }

    /// Blocks until a message is available. Parks at zero CPU; never
    /// busy-spins.
    pub fn wait(&mut self) -> MessageView<'_> {
        self.reader.wait()
    }

    /// Blocks until a message is available or `timeout` elapses.
    pub fn wait_for(&mut self, timeout: Duration) -> Option<MessageView<'_>> {
        self.reader.wait_for(timeout)
    }

    pub fn topic(&self) -> &str {
        self.region.name()
    }
}

/// Read-only snapshot of a topic's ring state, for introspection tools.
/// Never used on the publish/take hot path.
#[derive(Debug, Clone, Copy)]
pub struct TopicStats {
    pub slot_count: u32,
    pub slot_size: u32,
    pub max_subscribers: u32,
    pub active_subscribers: u32,
    pub messages_published: u64,
}

impl TopicStats {
    fn read(base: *mut u8) -> Self {
        let header = unsafe { Header::at(base) };
        Self {
            slot_count: header.slot_count(),
            slot_size: header.slot_size(),
            max_subscribers: header.max_subscribers(),
            active_subscribers: header.active_subscribers(),
            messages_published: header.write_idx().load(std::sync::atomic::Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_topic(prefix: &str) -> String {
        static COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("{prefix}_{}_{n}", std::process::id())
    }

    #[test]
    fn basic_round_trip() {
        let topic = unique_topic("pubsub_t1");
        Region::unlink(&topic);
        let publisher = Publisher::new(
            &topic,
            PublisherOptions {
                depth: 16,
                max_message_size: 1024,
            },
        )
        .unwrap();
        let mut subscriber = Subscriber::new(&topic, SubscriberOptions::default()).unwrap();

        assert!(publisher.publish(b"hello world"));
        let msg = subscriber.try_take().expect("message");
        assert_eq!(msg.payload, b"hello world");
        assert_eq!(msg.sequence, 0);
    }

    #[test]
    fn multi_subscriber_fan_out() {
        let topic = unique_topic("pubsub_t4");
        Region::unlink(&topic);
        let publisher = Publisher::new(&topic, PublisherOptions::default()).unwrap();
        let mut subs: Vec<_> = (0..3)
            .map(|_| Subscriber::new(&topic, SubscriberOptions::default()).unwrap())
            .collect();

        assert!(publisher.publish(b"message"));
        for sub in subs.iter_mut() {
            let msg = sub.try_take().expect("message");
            assert_eq!(msg.payload, b"message");
            assert_eq!(msg.sequence, 0);
        }
    }

    #[test]
    fn payload_too_large_is_non_fatal() {
        let topic = unique_topic("pubsub_too_large");
        Region::unlink(&topic);
        let publisher = Publisher::new(
            &topic,
            PublisherOptions {
                depth: 4,
                max_message_size: 8,
            },
        )
        .unwrap();

        assert!(publisher.publish(&[0u8; 8]));
        assert!(!publisher.publish(&[0u8; 9]));
    }

    #[test]
    fn subscriber_cap_then_free_slot_reuse() {
        let topic = unique_topic("pubsub_t7");
        Region::unlink(&topic);
        let _publisher = Publisher::new(&topic, PublisherOptions::default()).unwrap();

        let mut subs = Vec::new();
        for _ in 0..16 {
            subs.push(Subscriber::new(&topic, SubscriberOptions::default()).unwrap());
        }
        let overflow = Subscriber::new(&topic, SubscriberOptions::default());
        assert!(matches!(overflow, Err(ConduitError::NoSubscriberSlots { .. })));

        subs.pop();
        assert!(Subscriber::new(&topic, SubscriberOptions::default()).is_ok());
    }

    #[test]
    fn unlink_happens_on_publisher_drop() {
        let topic = unique_topic("pubsub_unlink");
        Region::unlink(&topic);
        let publisher = Publisher::new(&topic, PublisherOptions::default()).unwrap();
        assert!(Region::exists(&topic));
        drop(publisher);
        assert!(!Region::exists(&topic));
    }

    #[test]
    fn subscriber_open_before_publisher_fails_cleanly() {
        let topic = unique_topic("pubsub_missing");
        Region::unlink(&topic);
        let result = Subscriber::new(&topic, SubscriberOptions::default());
        assert!(matches!(result, Err(ConduitError::RegionNotFound { .. })));
    }
}
