//! Core types for workq: queue messages and depth reports.
//!
//! This module defines the main data structures used for queue operations and
//! introspection.
//!
//! ## What
//!
//! - [`Message`] represents a message handed to a consumer.
//! - [`QueueDepth`] and [`QueueDepthVerbose`] are per-queue depth rows.
//! - [`ShardDepth`] is the per-shard breakdown reported by the verbose detail
//!   query.
//!
//! ## How
//!
//! Use these types when pushing and polling messages and when inspecting queue
//! depths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self};
use tabled::Tabled;

/// A message in a queue.
///
/// The id is chosen by the producer and is unique within its queue. The
/// payload is an opaque string; higher layers decide what it means.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, Tabled)]
pub struct Message {
    /// Caller-supplied message ID, unique within the queue
    pub id: String,
    /// Delivery priority; higher pops earlier
    pub priority: i32,
    /// Opaque payload, absent when the producer pushed without one
    #[serde(skip_serializing_if = "Option::is_none")]
    #[tabled(skip)]
    pub payload: Option<String>,
}

impl Message {
    /// Build a message with the given id and payload at priority 0.
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: 0,
            payload: Some(payload.into()),
        }
    }

    /// Build a message with an explicit priority.
    pub fn with_priority(id: impl Into<String>, priority: i32, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority,
            payload: Some(payload.into()),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message {{ id: {}, priority: {} }}", self.id, self.priority)
    }
}

/// The full stored row for a message, as returned by [`get_message`].
///
/// Exposes the delivery schedule and lease state the engine keeps in the
/// database: when the message was created, when it becomes (or became)
/// visible, and whether a lease is currently outstanding.
///
/// [`get_message`]: crate::queue::WorkQueue::get_message
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, Tabled)]
pub struct MessageRow {
    /// Name of the queue holding the message
    pub queue_name: String,
    /// Caller-supplied message ID, unique within the queue
    pub message_id: String,
    /// Delivery priority; higher pops earlier
    pub priority: i32,
    /// The delay or lease duration originally applied, in seconds
    pub offset_time_seconds: i64,
    /// Earliest instant the message is visible to a poll
    pub deliver_on: DateTime<Utc>,
    /// Timestamp of insertion; final ordering tie-break
    pub created_on: DateTime<Utc>,
    /// True while a lease is outstanding
    pub popped: bool,
    /// Opaque payload, absent when the producer pushed without one
    #[serde(skip_serializing_if = "Option::is_none")]
    #[tabled(skip)]
    pub payload: Option<String>,
}

impl fmt::Display for MessageRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MessageRow {{ queue_name: {}, message_id: {}, priority: {}, popped: {}, deliver_on: {}, created_on: {} }}",
            self.queue_name, self.message_id, self.priority, self.popped, self.deliver_on, self.created_on
        )
    }
}

/// Visible depth of one queue, as reported by [`queues_detail`].
///
/// [`queues_detail`]: crate::queue::WorkQueue::queues_detail
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, Tabled)]
pub struct QueueDepth {
    /// Name of the queue
    pub queue_name: String,
    /// Number of visible (not popped) messages
    pub size: i64,
}

/// Visible and leased depth of one queue, as reported by
/// [`queues_detail_verbose`].
///
/// [`queues_detail_verbose`]: crate::queue::WorkQueue::queues_detail_verbose
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, Tabled)]
pub struct QueueDepthVerbose {
    /// Name of the queue
    pub queue_name: String,
    /// Number of visible (not popped) messages
    pub size: i64,
    /// Number of messages currently under a lease
    pub uacked: i64,
}

/// Per-shard depth breakdown. The engine is not sharded; every queue
/// reports a single shard (see [`SHARD_ID`]).
///
/// [`SHARD_ID`]: crate::constants::SHARD_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardDepth {
    /// Number of visible (not popped) messages
    pub size: i64,
    /// Number of messages currently under a lease
    pub uacked: i64,
}

/// A lease returned to the queue by an unack sweep.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReclaimedMessage {
    pub queue_name: String,
    pub message_id: String,
}

impl fmt::Display for QueueDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.queue_name, self.size)
    }
}
