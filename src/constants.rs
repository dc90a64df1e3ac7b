//! Schema statements and engine defaults for workq.
//!
//! DDL lives here so the admin module can install and tear down the two
//! queue tables. Per-operation SQL lives next to the code that runs it in
//! `tables/`.

/// How long a lease may be held past its delivery time before the
/// reclaimer considers it abandoned, in seconds.
pub const DEFAULT_UNACK_WINDOW_SECONDS: i64 = 60;

/// Cadence of the background unack sweep, in seconds. Kept equal to the
/// unack window by default.
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Sleep between poll attempts when a batch is not yet satisfied.
pub const DEFAULT_POLL_BACKOFF_MS: u64 = 100;

/// Bound on transaction retries after a serialization failure or deadlock.
pub const DEFAULT_MAX_TX_RETRIES: u32 = 3;

/// Base delay between transaction retries; grows linearly per attempt.
pub const TX_RETRY_BACKOFF_MS: u64 = 50;

/// Shard id reported by the verbose detail query. Sharding is not
/// implemented; every queue reports this single shard.
pub const SHARD_ID: &str = "a";

pub const CREATE_QUEUE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS queue (
        queue_name TEXT PRIMARY KEY
    );
"#;

pub const CREATE_QUEUE_MESSAGE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS queue_message (
        queue_name           TEXT NOT NULL,
        message_id           TEXT NOT NULL,
        priority             INTEGER NOT NULL DEFAULT 0,
        offset_time_seconds  BIGINT NOT NULL DEFAULT 0,
        deliver_on           TIMESTAMPTZ NOT NULL DEFAULT now(),
        created_on           TIMESTAMPTZ NOT NULL DEFAULT now(),
        popped               BOOLEAN NOT NULL DEFAULT false,
        payload              TEXT,
        PRIMARY KEY (queue_name, message_id)
    );
"#;

/// Covers the peek filter (queue_name, popped, deliver_on) and its
/// ordering columns.
pub const CREATE_COMBO_QUEUE_MESSAGE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS combo_queue_message
    ON queue_message (queue_name, popped, deliver_on, priority DESC, created_on);
"#;

pub const DROP_QUEUE_MESSAGE_TABLE: &str = r#"
    DROP TABLE IF EXISTS queue_message;
"#;

pub const DROP_QUEUE_TABLE: &str = r#"
    DROP TABLE IF EXISTS queue;
"#;

pub const TABLE_EXISTS_QUERY: &str = r#"
    SELECT to_regclass($1) IS NOT NULL;
"#;
