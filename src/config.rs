//! Runtime settings, resolved once at startup and passed to constructors.

use std::env;

/// Connection and bootstrap configuration. Built from the environment (a
/// `.env` file is honored) in `main`; nothing reads the environment after
/// startup.
#[derive(Clone, Debug)]
pub struct Settings {
    /// sqlx connection string, e.g. `sqlite:db/world.db?mode=rwc`.
    pub database_url: String,
    /// Listen address for the HTTP server.
    pub bind_addr: String,
    /// Path to the schema DDL script run by initialize.
    pub schema_path: String,
    /// Path to the seed data script run by initialize.
    pub seed_path: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:db/world.db?mode=rwc".into()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            schema_path: env::var("WORLD_SCHEMA_PATH").unwrap_or_else(|_| "db/schema.sql".into()),
            seed_path: env::var("WORLD_SEED_PATH").unwrap_or_else(|_| "db/seed.sql".into()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "sqlite:db/world.db?mode=rwc".into(),
            bind_addr: "0.0.0.0:3000".into(),
            schema_path: "db/schema.sql".into(),
            seed_path: "db/seed.sql".into(),
        }
    }
}
