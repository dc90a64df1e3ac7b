//! Message table operations for workq.
//!
//! Row-level operations on the `queue_message` table: upserts, locks, the
//! skip-locked peek selection, lease flips, deletes, and reschedules. The
//! leasing state machine that sequences these lives in [`crate::queue`].
//!
//! Visibility arithmetic is computed inside Postgres (`now()`,
//! `make_interval`) so every client shares the database clock.

use crate::error::Result;
use crate::gateway::PgTx;
use crate::types::{Message, MessageRow, ReclaimedMessage};

const LOCK_MESSAGE: &str = r#"
    SELECT message_id FROM queue_message
    WHERE queue_name = $1 AND message_id = $2
    FOR UPDATE;
"#;

const LOCK_ALL_FOR_QUEUE: &str = r#"
    SELECT message_id FROM queue_message
    WHERE queue_name = $1
    FOR UPDATE;
"#;

const EXISTS_MESSAGE: &str = r#"
    SELECT 1 FROM queue_message
    WHERE queue_name = $1 AND message_id = $2
    FOR SHARE;
"#;

/// On conflict the payload and delivery time are refreshed; priority and
/// offset keep the values from this call's insert attempt only when the row
/// is new.
const UPSERT_MESSAGE: &str = r#"
    INSERT INTO queue_message (queue_name, message_id, priority, offset_time_seconds, deliver_on, payload)
    VALUES ($1, $2, $3, $4, now() + make_interval(secs => $4::double precision), $5)
    ON CONFLICT (queue_name, message_id)
    DO UPDATE SET payload = EXCLUDED.payload, deliver_on = EXCLUDED.deliver_on;
"#;

/// The 1 ms epsilon absorbs clock granularity between this visibility test
/// and the pop update that follows it.
const PEEK_MESSAGES: &str = r#"
    SELECT message_id AS id, priority, payload
    FROM queue_message
    WHERE queue_name = $1
      AND popped = false
      AND deliver_on <= now() + interval '1 millisecond'
    ORDER BY priority DESC, deliver_on ASC, created_on ASC
    LIMIT $2
    FOR UPDATE SKIP LOCKED;
"#;

/// The `popped = false` guard is redundant with the peek's exclusive lock;
/// the row-count check in the caller turns any disagreement into a fault.
const POP_MESSAGES: &str = r#"
    UPDATE queue_message
    SET popped = true
    WHERE queue_name = $1 AND message_id = ANY($2) AND popped = false;
"#;

const GET_MESSAGE: &str = r#"
    SELECT queue_name, message_id, priority, offset_time_seconds, deliver_on, created_on, popped, payload
    FROM queue_message
    WHERE queue_name = $1 AND message_id = $2;
"#;

const DELETE_MESSAGE: &str = r#"
    DELETE FROM queue_message
    WHERE queue_name = $1 AND message_id = $2;
"#;

const DELETE_ALL_FOR_QUEUE: &str = r#"
    DELETE FROM queue_message
    WHERE queue_name = $1;
"#;

const RESCHEDULE_MESSAGE: &str = r#"
    UPDATE queue_message
    SET offset_time_seconds = $3,
        deliver_on = now() + make_interval(secs => $3::double precision)
    WHERE queue_name = $1 AND message_id = $2;
"#;

const COUNT_FOR_QUEUE: &str = r#"
    SELECT COUNT(*) FROM queue_message
    WHERE queue_name = $1;
"#;

const RELEASE_EXPIRED: &str = r#"
    UPDATE queue_message t
    SET popped = false
    FROM (
        SELECT queue_name, message_id
        FROM queue_message
        WHERE popped = true
          AND deliver_on + make_interval(secs => $1::double precision) < now()
        FOR UPDATE SKIP LOCKED
    ) expired
    WHERE t.queue_name = expired.queue_name
      AND t.message_id = expired.message_id
    RETURNING t.queue_name, t.message_id;
"#;

const RELEASE_EXPIRED_FOR_QUEUE: &str = r#"
    UPDATE queue_message t
    SET popped = false
    FROM (
        SELECT queue_name, message_id
        FROM queue_message
        WHERE queue_name = $2
          AND popped = true
          AND deliver_on + make_interval(secs => $1::double precision) < now()
        FOR UPDATE SKIP LOCKED
    ) expired
    WHERE t.queue_name = expired.queue_name
      AND t.message_id = expired.message_id
    RETURNING t.queue_name, t.message_id;
"#;

/// Take an exclusive lock on one message row. A no-op when the row does not
/// exist.
pub async fn lock_row(tx: &mut PgTx, queue_name: &str, message_id: &str) -> Result<()> {
    sqlx::query(LOCK_MESSAGE)
        .bind(queue_name)
        .bind(message_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Take an exclusive lock on every message row of the queue.
pub async fn lock_all_for_queue(tx: &mut PgTx, queue_name: &str) -> Result<()> {
    sqlx::query(LOCK_ALL_FOR_QUEUE)
        .bind(queue_name)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Shared-locked existence probe.
pub async fn exists(tx: &mut PgTx, queue_name: &str, message_id: &str) -> Result<bool> {
    let row: Option<(i32,)> = sqlx::query_as(EXISTS_MESSAGE)
        .bind(queue_name)
        .bind(message_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

/// Insert or refresh a message. `deliver_on` becomes now + offset.
pub async fn upsert(
    tx: &mut PgTx,
    queue_name: &str,
    message_id: &str,
    priority: i32,
    offset_time_seconds: i64,
    payload: Option<&str>,
) -> Result<()> {
    sqlx::query(UPSERT_MESSAGE)
        .bind(queue_name)
        .bind(message_id)
        .bind(priority)
        .bind(offset_time_seconds)
        .bind(payload)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Select up to `count` visible messages in delivery order, skipping rows
/// locked by concurrent pollers. A non-positive count yields an empty batch.
pub async fn peek(tx: &mut PgTx, queue_name: &str, count: i64) -> Result<Vec<Message>> {
    if count < 1 {
        return Ok(Vec::new());
    }
    let messages = sqlx::query_as::<_, Message>(PEEK_MESSAGES)
        .bind(queue_name)
        .bind(count)
        .fetch_all(&mut **tx)
        .await?;
    Ok(messages)
}

/// Flip the candidate rows to leased. Returns the number of rows updated,
/// which the caller checks against the candidate count.
pub async fn mark_popped(tx: &mut PgTx, queue_name: &str, ids: &[String]) -> Result<u64> {
    let result = sqlx::query(POP_MESSAGES)
        .bind(queue_name)
        .bind(ids)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

/// Fetch the full stored row for one message.
pub async fn get(
    tx: &mut PgTx,
    queue_name: &str,
    message_id: &str,
) -> Result<Option<MessageRow>> {
    let row = sqlx::query_as::<_, MessageRow>(GET_MESSAGE)
        .bind(queue_name)
        .bind(message_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

/// Delete one message; true when a row was removed.
pub async fn delete(tx: &mut PgTx, queue_name: &str, message_id: &str) -> Result<bool> {
    let result = sqlx::query(DELETE_MESSAGE)
        .bind(queue_name)
        .bind(message_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete every message in the queue, returning the removed-row count.
pub async fn delete_all(tx: &mut PgTx, queue_name: &str) -> Result<u64> {
    let result = sqlx::query(DELETE_ALL_FOR_QUEUE)
        .bind(queue_name)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

/// Rewrite a message's offset and delivery time. Returns the updated-row
/// count (0 when the message is gone, 1 otherwise).
pub async fn reschedule(
    tx: &mut PgTx,
    queue_name: &str,
    message_id: &str,
    offset_time_seconds: i64,
) -> Result<u64> {
    let result = sqlx::query(RESCHEDULE_MESSAGE)
        .bind(queue_name)
        .bind(message_id)
        .bind(offset_time_seconds)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

/// Count all rows for a queue, leased or not.
pub async fn count(tx: &mut PgTx, queue_name: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(COUNT_FOR_QUEUE)
        .bind(queue_name)
        .fetch_one(&mut **tx)
        .await?;
    Ok(count)
}

/// Return every lease held longer than `window_seconds` past its delivery
/// time to the visible state, optionally scoped to one queue. Rows locked by
/// live consumers are skipped.
pub async fn release_expired(
    tx: &mut PgTx,
    window_seconds: i64,
    queue_name: Option<&str>,
) -> Result<Vec<ReclaimedMessage>> {
    let reclaimed = match queue_name {
        Some(queue_name) => {
            sqlx::query_as::<_, ReclaimedMessage>(RELEASE_EXPIRED_FOR_QUEUE)
                .bind(window_seconds)
                .bind(queue_name)
                .fetch_all(&mut **tx)
                .await?
        }
        None => {
            sqlx::query_as::<_, ReclaimedMessage>(RELEASE_EXPIRED)
                .bind(window_seconds)
                .fetch_all(&mut **tx)
                .await?
        }
    };
    Ok(reclaimed)
}
