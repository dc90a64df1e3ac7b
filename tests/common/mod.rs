pub mod constants;
pub mod postgres;

use once_cell::sync::OnceCell;
use workq::{Config, QueueConfig, WorkQueue};

static CONTAINER: OnceCell<postgres::PostgresHandle> = OnceCell::new();
static DSN: tokio::sync::OnceCell<String> = tokio::sync::OnceCell::const_new();

/// Get a PostgreSQL DSN for testing.
///
/// Uses an external database when WORKQ_TEST_DSN is set; otherwise boots one
/// PostgreSQL testcontainer per test binary and keeps it alive for the rest
/// of the run. The workq schema is installed before the DSN is handed out.
#[allow(dead_code)] // Used by multiple test modules, but Rust doesn't detect cross-module usage
pub async fn get_postgres_dsn() -> String {
    DSN.get_or_init(|| async {
        if let Ok(dsn) = std::env::var("WORKQ_TEST_DSN") {
            println!("Using external PostgreSQL database: {}", dsn);
            postgres::install_schema(&dsn).await;
            return dsn;
        }

        let handle = postgres::start().await;
        let dsn = handle.dsn.clone();
        let _ = CONTAINER.set(handle);
        dsn
    })
    .await
    .clone()
}

/// Build an engine against the shared test database with custom queue
/// options.
#[allow(dead_code)]
pub async fn test_engine_with_options(options: QueueConfig) -> WorkQueue {
    let dsn = get_postgres_dsn().await;
    let config = Config {
        dsn,
        max_connections: constants::MAX_CONNECTIONS,
        connection_timeout_seconds: constants::CONNECTION_TIMEOUT_SECS,
        queue: options,
    };
    WorkQueue::connect(&config)
        .await
        .expect("Failed to connect WorkQueue")
}

/// Build an engine against the shared test database with default options.
#[allow(dead_code)]
pub async fn test_engine() -> WorkQueue {
    test_engine_with_options(QueueConfig::default()).await
}
