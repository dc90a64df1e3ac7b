// Test configuration constants

// Database configuration
pub const TEST_DB_NAME: &str = "workq_test";
pub const TEST_DB_USER: &str = "workq";
pub const TEST_DB_PASSWORD: &str = "workq";
pub const POSTGRES_PORT: u16 = 5432;

// Connection configuration
pub const MAX_CONNECTIONS: u32 = 16;
pub const CONNECTION_TIMEOUT_SECS: u64 = 5;
