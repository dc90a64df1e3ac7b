//! Scoped transaction acquisition for workq.
//!
//! All engine operations run inside a [`Gateway`] transaction. The gateway
//! owns the connection pool, forces repeatable-read isolation, and offers
//! three flavours of scoped transaction:
//!
//! - [`Gateway::with_transaction`] runs once, commits on success, rolls back
//!   and surfaces the fault otherwise.
//! - [`Gateway::with_retried_transaction`] additionally retries transient
//!   serialization/deadlock conflicts up to a fixed bound, with a bounded
//!   linear backoff between attempts.
//! - [`Gateway::try_transaction`] runs once and maps a transient conflict to
//!   `Ok(None)`, the "try again later" sentinel the polling loop relies on.
//!
//! Conflicts are expected under concurrent producers and consumers; callers
//! pick the variant that matches how much of that they want to absorb.

use crate::config::Config;
use crate::constants::TX_RETRY_BACKOFF_MS;
use crate::error::{Result, WorkqError};
use futures::future::BoxFuture;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

/// A transaction handle bound to the gateway's pool.
pub type PgTx = Transaction<'static, Postgres>;

/// SQL gateway owning the pool and the transaction discipline.
#[derive(Clone, Debug)]
pub struct Gateway {
    pool: PgPool,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Gateway {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool, max_retries: u32) -> Self {
        Self {
            pool,
            max_retries,
            retry_backoff: Duration::from_millis(TX_RETRY_BACKOFF_MS),
        }
    }

    /// Connect a new pool from configuration.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect(&config.dsn)
            .await?;
        Ok(Self::new(pool, config.queue.max_tx_retries))
    }

    /// The underlying pool, for callers that need plain queries.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> Result<PgTx> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn run_once<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut PgTx) -> BoxFuture<'t, Result<T>> + Send,
    {
        let mut tx = self.begin().await?;
        match op(&mut tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                // Best effort; the connection is returned to the pool either way.
                tx.rollback().await.ok();
                Err(err)
            }
        }
    }

    /// Run `op` in a transaction; commit on success, roll back on fault and
    /// surface the fault to the caller.
    pub async fn with_transaction<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut PgTx) -> BoxFuture<'t, Result<T>> + Send,
    {
        self.run_once(op).await
    }

    /// Run `op` in a transaction, retrying transient conflicts up to the
    /// configured bound. Non-transient faults surface immediately.
    pub async fn with_retried_transaction<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'t> Fn(&'t mut PgTx) -> BoxFuture<'t, Result<T>> + Send + Sync,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.run_once(&op).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        attempt,
                        "retrying transaction after transient conflict: {err}"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Run `op` once; a transient conflict yields `Ok(None)` instead of a
    /// fault, so callers can treat it as "come back later".
    pub async fn try_transaction<T, F>(&self, op: F) -> Result<Option<T>>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut PgTx) -> BoxFuture<'t, Result<T>> + Send,
    {
        match self.run_once(op).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_transient() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
