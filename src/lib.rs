// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Conduit: a zero-copy, lock-free shared-memory single-producer /
// multi-consumer pub/sub core for single-host, multi-process systems.
// One publisher per topic owns a named shared-memory ring; any number of
// subscribers map it read-write and track their own cursor. The write
// path is wait-free; idle subscribers park on a kernel wait primitive at
// zero CPU and wake within microseconds of a publish.
//
// Layered bottom-up, each layer depending only on the ones before it:
// `time` (monotonic clock) -> `futex` (park/wake) -> `shm` (named region
// lifecycle) -> `ring` (the SPMC algorithm) -> `pubsub` (the public
// façade, raw and typed).

pub mod error;
pub mod futex;
pub mod naming;
pub mod pubsub;
pub mod ring;
pub mod shm;
pub mod time;

pub use error::{ConduitError, Result};
pub use pubsub::{
    FixedMessage, Publisher, PublisherOptions, SerialPublisher, SerialSubscriber,
    SerializableMessage, Subscriber, SubscriberOptions, TopicStats, TypedPublisher,
    TypedSubscriber,
};
pub use ring::MessageView;
pub use shm::Region;
