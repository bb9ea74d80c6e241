//! Outbound message queue.
//!
//! Holds envelopes the application tried to send while no live channel
//! existed. The queue outlives individual channels: it is filled during an
//! outage and drained, in order, on the next successful open.
//!
//! # Invariant
//!
//! Strictly FIFO. Nothing here reorders, duplicates, or silently drops an
//! entry; the only removals besides `pop_front`/`take_all` are the opt-in
//! capacity eviction and age expiry, and both hand the removed entries back
//! to the caller so they can be reported.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde_json::Value;

/// An envelope awaiting delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedMessage {
    /// Application-level event name.
    pub event_name: String,
    /// Opaque payload, never inspected by the core.
    pub payload: Value,
    /// When the message entered the queue. Diagnostics and expiry only.
    pub enqueued_at: Instant,
}

impl QueuedMessage {
    /// Creates a message stamped with the current instant.
    pub fn new(event_name: impl Into<String>, payload: Value) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
            enqueued_at: Instant::now(),
        }
    }

    /// Creates a message with an explicit enqueue instant, for owners that
    /// keep their own clock.
    pub fn stamped(event_name: impl Into<String>, payload: Value, enqueued_at: Instant) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
            enqueued_at,
        }
    }

    /// How long the message has been waiting as of `now`.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.enqueued_at)
    }
}

/// FIFO buffer of [`QueuedMessage`]s with an optional size bound.
#[derive(Debug, Default)]
pub struct MessageQueue {
    entries: VecDeque<QueuedMessage>,
    capacity: Option<usize>,
}

impl MessageQueue {
    /// Creates an unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue holding at most `capacity` entries (`None` =
    /// unbounded). A capacity of 0 is treated as 1.
    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    /// Appends a message.
    ///
    /// If the queue is bounded and full, the oldest entry is evicted and
    /// returned so the caller can report it.
    pub fn push(&mut self, message: QueuedMessage) -> Option<QueuedMessage> {
        let evicted = match self.capacity {
            Some(cap) if self.entries.len() >= cap => self.entries.pop_front(),
            _ => None,
        };
        if let Some(old) = &evicted {
            tracing::debug!(
                event = %old.event_name,
                capacity = ?self.capacity,
                "queue full: evicting oldest message"
            );
        }
        self.entries.push_back(message);
        evicted
    }

    /// Removes and returns the oldest message.
    pub fn pop_front(&mut self) -> Option<QueuedMessage> {
        self.entries.pop_front()
    }

    /// Removes every entry, oldest first.
    pub fn take_all(&mut self) -> Vec<QueuedMessage> {
        self.entries.drain(..).collect()
    }

    /// Puts `messages` back at the front, keeping their relative order,
    /// ahead of anything queued since they were taken.
    ///
    /// Used when a flush aborts halfway: the unsent tail goes back first
    /// in line. Capacity is not enforced here; nothing that was already
    /// accepted gets evicted by its own return.
    pub fn requeue_front(&mut self, messages: Vec<QueuedMessage>) {
        for message in messages.into_iter().rev() {
            self.entries.push_front(message);
        }
    }

    /// Removes and returns every entry older than `max_age` as of `now`.
    pub fn expire_older_than(&mut self, max_age: Duration, now: Instant) -> Vec<QueuedMessage> {
        let mut expired = Vec::new();
        self.entries.retain(|m| {
            if m.age_at(now) > max_age {
                expired.push(m.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over queued messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedMessage> {
        self.entries.iter()
    }
}
