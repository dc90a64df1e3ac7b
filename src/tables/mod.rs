//! Table operations for the workq schema.
//!
//! This module contains row-level operations for each table in the workq
//! system. Each table module provides focused operations on a specific table
//! without business logic; the push/pop/ack state machine lives in
//! [`crate::queue`].

pub mod messages;
pub mod queues;
