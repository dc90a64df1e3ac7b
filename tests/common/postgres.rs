use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use workq::{Config, WorkqAdmin};

use super::constants::*;

/// A running PostgreSQL testcontainer with the workq schema installed.
pub struct PostgresHandle {
    // Held so the container outlives the test binary; dropping it stops the
    // container.
    #[allow(dead_code)]
    container: ContainerAsync<Postgres>,
    pub dsn: String,
}

pub async fn start() -> PostgresHandle {
    println!("Starting PostgreSQL testcontainer...");

    let postgres_image = Postgres::default()
        .with_db_name(TEST_DB_NAME)
        .with_user(TEST_DB_USER)
        .with_password(TEST_DB_PASSWORD);

    let container = postgres_image
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let dsn = format!(
        "postgres://{}:{}@{}:{}/{}",
        TEST_DB_USER,
        TEST_DB_PASSWORD,
        container.get_host().await.expect("container host"),
        container
            .get_host_port_ipv4(POSTGRES_PORT)
            .await
            .expect("container port"),
        TEST_DB_NAME
    );

    println!("PostgreSQL container started");
    println!("Database URL: {}", dsn);

    install_schema(&dsn).await;

    PostgresHandle { container, dsn }
}

pub async fn install_schema(dsn: &str) {
    let admin = WorkqAdmin::new(&Config::from_dsn(dsn))
        .await
        .expect("Failed to connect admin");
    admin.install().await.expect("Failed to install schema");
    admin.verify().await.expect("Schema verification failed");
    println!("workq schema installed");
}
