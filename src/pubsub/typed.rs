// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Typed sugar over the raw byte façade. Adds nothing to the wire
// protocol: a typed publisher and a raw subscriber on the same topic
// interoperate byte-for-byte, and vice versa. Plain-data messages and
// serializable messages get two distinct trait families rather than
// one trait with two overlapping impls.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::time::Duration;

use crate::error::Result;
use crate::pubsub::{Publisher, PublisherOptions, Subscriber, SubscriberOptions};

/// Marker for plain-data message types published by raw byte copy.
///
/// # Safety
/// Implementors must be a type for which any bit pattern of the
/// underlying bytes is valid (no padding read as uninitialized, no
/// invariants that a stray byte pattern could violate) — the same
/// contract the original enforces with a `static_assert` on
/// `std::is_trivially_copyable`.
pub unsafe trait FixedMessage: Copy + 'static {}

/// Messages that serialize themselves into a caller-sized buffer. For
/// schemas too dynamic to represent as a fixed byte layout (variable
/// length, nested allocations).
pub trait SerializableMessage: Sized {
    fn serialized_size(&self) -> usize;
    fn serialize(&self, buffer: &mut [u8]);
    fn deserialize(bytes: &[u8]) -> Self;
}

fn as_bytes<T: FixedMessage>(value: &T) -> &[u8] {
    unsafe { std::slice::from_raw_parts(value as *const T as *const u8, std::mem::size_of::<T>()) }
}

fn from_bytes<T: FixedMessage>(bytes: &[u8]) -> T {
    debug_assert_eq!(bytes.len(), std::mem::size_of::<T>());
    unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const T) }
}

/// Publishes `T` by raw byte copy, no allocation, no serialization step.
pub struct TypedPublisher<T: FixedMessage> {
    inner: Publisher,
    _marker: PhantomData<T>,
}

impl<T: FixedMessage> TypedPublisher<T> {
    pub fn new(topic: &str, depth: u32) -> Result<Self> {
        let inner = Publisher::new(
            topic,
            PublisherOptions {
                depth,
                max_message_size: std::mem::size_of::<T>() as u32,
            },
        )?;
        Ok(Self {
            inner,
            _marker: PhantomData,
        })
    }

    pub fn publish(&self, value: &T) -> bool {
        self.inner.publish(as_bytes(value))
    }
}

/// Receives `T` by raw byte copy out of the ring.
pub struct TypedSubscriber<T: FixedMessage> {
    inner: Subscriber,
    _marker: PhantomData<T>,
}

impl<T: FixedMessage> TypedSubscriber<T> {
    pub fn new(topic: &str) -> Result<Self> {
        let inner = Subscriber::new(topic, SubscriberOptions::default())?;
        Ok(Self {
            inner,
            _marker: PhantomData,
        })
    }

    pub fn try_take(&mut self) -> Option<T> {
        self.inner.try_take().map(|view| from_bytes(view.payload))
    }

    pub fn wait(&mut self) -> T {
        from_bytes(self.inner.wait().payload)
    }

    pub fn wait_for(&mut self, timeout: Duration) -> Option<T> {
        self.inner.wait_for(timeout).map(|view| from_bytes(view.payload))
    }
}

/// Publishes `T` through its own [`SerializableMessage`] impl into a
/// per-publisher scratch buffer. The `RefCell` mirrors the
/// single-logical-writer contract already documented on [`Publisher`]:
/// a concurrent `publish` from a second thread panics on the borrow
/// instead of silently corrupting the scratch buffer.
pub struct SerialPublisher<T> {
    inner: Publisher,
    scratch: RefCell<Vec<u8>>,
    _marker: PhantomData<T>,
}

impl<T: SerializableMessage> SerialPublisher<T> {
    pub fn new(topic: &str, depth: u32, max_message_size: u32) -> Result<Self> {
        let inner = Publisher::new(
            topic,
            PublisherOptions {
                depth,
                max_message_size,
            },
        )?;
        Ok(Self {
            inner,
            scratch: RefCell::new(Vec::new()),
            _marker: PhantomData,
        })
    }

    pub fn publish(&self, value: &T) -> bool {
        let size = value.serialized_size();
        let mut scratch = self.scratch.borrow_mut();
        scratch.clear();
        scratch.resize(size, 0);
        value.serialize(&mut scratch);
        self.inner.publish(&scratch)
    }
}

/// Receives `T` by reconstructing it from the borrowed slot bytes.
pub struct SerialSubscriber<T> {
    inner: Subscriber,
    _marker: PhantomData<T>,
}

impl<T: SerializableMessage> SerialSubscriber<T> {
    pub fn new(topic: &str) -> Result<Self> {
        let inner = Subscriber::new(topic, SubscriberOptions::default())?;
        Ok(Self {
            inner,
            _marker: PhantomData,
        })
    }

    pub fn try_take(&mut self) -> Option<T> {
        self.inner.try_take().map(|view| T::deserialize(view.payload))
    }

    pub fn wait(&mut self) -> T {
        T::deserialize(self.inner.wait().payload)
    }

    pub fn wait_for(&mut self, timeout: Duration) -> Option<T> {
        self.inner.wait_for(timeout).map(|view| T::deserialize(view.payload))
    }
}
