//! Queue table operations for workq.
//!
//! This module provides row operations on the `queue` table: lazy creation,
//! the queue-wide exclusive lock taken by pushes, and the depth reports used
//! by introspection.

use crate::error::Result;
use crate::gateway::PgTx;
use crate::types::{QueueDepth, QueueDepthVerbose};

const CREATE_QUEUE_IF_NOT_EXISTS: &str = r#"
    INSERT INTO queue (queue_name)
    VALUES ($1)
    ON CONFLICT (queue_name) DO NOTHING;
"#;

const LOCK_QUEUE: &str = r#"
    SELECT queue_name FROM queue
    WHERE queue_name = $1
    FOR UPDATE;
"#;

const QUEUE_DEPTHS: &str = r#"
    SELECT q.queue_name,
           (SELECT count(*) FROM queue_message m
             WHERE m.popped = false AND m.queue_name = q.queue_name) AS size
    FROM queue q;
"#;

const QUEUE_DEPTHS_VERBOSE: &str = r#"
    SELECT q.queue_name,
           (SELECT count(*) FROM queue_message m
             WHERE m.popped = false AND m.queue_name = q.queue_name) AS size,
           (SELECT count(*) FROM queue_message m
             WHERE m.popped = true AND m.queue_name = q.queue_name) AS uacked
    FROM queue q;
"#;

/// Insert the queue row if it is not already there. Idempotent; safe to
/// call on every push.
pub async fn create_if_not_exists(tx: &mut PgTx, queue_name: &str) -> Result<()> {
    sqlx::query(CREATE_QUEUE_IF_NOT_EXISTS)
        .bind(queue_name)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Take an exclusive lock on the queue row for the rest of the transaction.
/// A no-op when the queue does not exist yet.
pub async fn lock(tx: &mut PgTx, queue_name: &str) -> Result<()> {
    sqlx::query(LOCK_QUEUE)
        .bind(queue_name)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Visible depth of every known queue.
pub async fn depths(tx: &mut PgTx) -> Result<Vec<QueueDepth>> {
    let rows = sqlx::query_as::<_, QueueDepth>(QUEUE_DEPTHS)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows)
}

/// Visible and leased depth of every known queue.
pub async fn depths_verbose(tx: &mut PgTx) -> Result<Vec<QueueDepthVerbose>> {
    let rows = sqlx::query_as::<_, QueueDepthVerbose>(QUEUE_DEPTHS_VERBOSE)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows)
}
