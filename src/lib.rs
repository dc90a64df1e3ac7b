//! # workq
//!
//! A PostgreSQL-backed work queue for Rust applications.
//!
//! workq provides named queues of messages with at-least-once delivery:
//! producers push messages with caller-supplied ids, consumers lease them
//! with a visibility timeout, then ack to complete delivery. Leases that are
//! never acked expire back into the queue after a fixed unack window.
//!
//! ## Features
//!
//! - At-least-once delivery over PostgreSQL's SKIP LOCKED
//! - Priority ordering with delayed (scheduled) delivery
//! - Safe under concurrent producers, consumers, and process crashes
//! - Background reclamation of abandoned leases with a clean shutdown hook
//! - CLI tool for pushing, polling, and inspecting queues

pub mod admin;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod output;
pub mod queue;
pub mod reclaimer;
pub mod tables;
pub mod types;

pub use admin::WorkqAdmin;
pub use config::{Config, QueueConfig};
pub use error::{Result, WorkqError};
pub use gateway::Gateway;
pub use queue::WorkQueue;
pub use reclaimer::Reclaimer;
pub use types::{Message, MessageRow, QueueDepth, QueueDepthVerbose, ShardDepth};
