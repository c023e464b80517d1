//! Connection pool construction and database bootstrap. The schema and seed
//! scripts are applied inside one transaction so a failed reset never leaves
//! a half-initialized database behind.

use std::path::Path;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::Settings;
use crate::error::AppError;

/// Ensure the directory that will hold the SQLite file exists. No-op for
/// in-memory databases. Call before creating the pool so `mode=rwc` can
/// create the file.
pub async fn ensure_database_path(database_url: &str) -> Result<(), AppError> {
    let Some(file) = file_path_from_url(database_url) else {
        return Ok(());
    };
    if let Some(parent) = Path::new(&file).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Filesystem path of a `sqlite:` URL, or None for in-memory databases.
fn file_path_from_url(url: &str) -> Option<String> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or("");
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(path.to_string())
}

pub async fn connect_pool(settings: &Settings) -> Result<SqlitePool, AppError> {
    ensure_database_path(&settings.database_url).await?;
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;
    Ok(pool)
}

/// Reset the database: run the schema script, then the seed script, both in
/// a single transaction. Any failure rolls the whole reset back.
pub async fn initialize(pool: &SqlitePool, settings: &Settings) -> Result<(), AppError> {
    let schema = tokio::fs::read_to_string(&settings.schema_path).await?;
    let seed = tokio::fs::read_to_string(&settings.seed_path).await?;

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(&schema).execute(&mut *tx).await?;
    tracing::info!(path = %settings.schema_path, "applied world schema");
    sqlx::raw_sql(&seed).execute(&mut *tx).await?;
    tracing::info!(path = %settings.seed_path, "loaded world seed data");
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_for(dir: &Path) -> Settings {
        Settings {
            database_url: format!("sqlite:{}?mode=rwc", dir.join("world.db").display()),
            bind_addr: "127.0.0.1:0".into(),
            schema_path: dir.join("schema.sql").display().to_string(),
            seed_path: dir.join("seed.sql").display().to_string(),
        }
    }

    fn write_scripts(dir: &Path, seed: &str) {
        let mut schema = std::fs::File::create(dir.join("schema.sql")).unwrap();
        schema
            .write_all(include_str!("../db/schema.sql").as_bytes())
            .unwrap();
        let mut seed_file = std::fs::File::create(dir.join("seed.sql")).unwrap();
        seed_file.write_all(seed.as_bytes()).unwrap();
    }

    #[test]
    fn file_path_parsing() {
        assert_eq!(file_path_from_url("sqlite:db/world.db?mode=rwc"), Some("db/world.db".into()));
        assert_eq!(file_path_from_url("sqlite://db/world.db"), Some("db/world.db".into()));
        assert_eq!(file_path_from_url("sqlite::memory:"), None);
        assert_eq!(file_path_from_url("postgres://localhost/x"), None);
    }

    #[tokio::test]
    async fn initialize_loads_schema_and_seed() {
        let dir = tempfile::tempdir().unwrap();
        write_scripts(
            dir.path(),
            "INSERT INTO country (country_code, country_code2, country_name, continent) \
             VALUES ('NOR', 'NO', 'Norway', 'Europe');",
        );
        let settings = settings_for(dir.path());
        let pool = connect_pool(&settings).await.unwrap();

        initialize(&pool, &settings).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM country")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        // A second run resets to the seeded state rather than accumulating.
        sqlx::query("INSERT INTO country (country_code, country_code2, country_name, continent) VALUES ('SWE', 'SE', 'Sweden', 'Europe')")
            .execute(&pool)
            .await
            .unwrap();
        initialize(&pool, &settings).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM country")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn failed_seed_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        write_scripts(dir.path(), "INSERT INTO no_such_table VALUES (1);");
        let settings = settings_for(dir.path());
        let pool = connect_pool(&settings).await.unwrap();

        assert!(initialize(&pool, &settings).await.is_err());
        // The schema script ran in the same transaction, so nothing persisted.
        let tables: Result<(i64,), _> = sqlx::query_as("SELECT COUNT(*) FROM country")
            .fetch_one(&pool)
            .await;
        assert!(tables.is_err());
    }
}

