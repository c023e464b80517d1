//! Data access layer: one repository per entity, each holding a pool clone.
//!
//! Country and language rows are addressable by either their 2- or 3-letter
//! code. Key resolution is centralized here: every repository first maps the
//! caller's code to the canonical 3-letter form, and all other statements
//! work with the canonical code only.

pub mod city;
pub mod country;
pub mod language;

pub use city::CityRepository;
pub use country::CountryRepository;
pub use language::LanguageRepository;

use sqlx::sqlite::SqlitePool;

use crate::error::AppError;

/// Result of a partial update: either a write happened, or every provided
/// field already matched and the row was left untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome<T> {
    Updated(T),
    Unchanged(T),
}

impl<T> UpdateOutcome<T> {
    pub fn entity(&self) -> &T {
        match self {
            UpdateOutcome::Updated(e) | UpdateOutcome::Unchanged(e) => e,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, UpdateOutcome::Unchanged(_))
    }
}

/// Canonical 3-letter country code for either alternate form, or None when
/// no country matches.
pub async fn resolve_country_code(
    pool: &SqlitePool,
    code: &str,
) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT country_code FROM country WHERE country_code = ?1 OR country_code2 = ?1")
            .bind(code)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(c,)| c))
}

/// Canonical 3-letter language code for either alternate form.
pub async fn resolve_language_code(
    pool: &SqlitePool,
    code: &str,
) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT language_code FROM language WHERE language_code = ?1 OR language_code2 = ?1")
            .bind(code)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(c,)| c))
}

/// Translate a unique-constraint violation into a conflict; pass everything
/// else through as a store failure.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: impl Into<String>) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(message.into()),
        _ => AppError::Db(e),
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    /// Single-connection in-memory database with the schema applied. One
    /// connection keeps every statement on the same memory database.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        sqlx::raw_sql(include_str!("../../db/schema.sql"))
            .execute(&pool)
            .await
            .expect("schema");
        pool
    }

    /// Minimal fixture: two countries, three cities (one capital), two
    /// languages, and one association.
    pub async fn seed_fixture(pool: &SqlitePool) {
        sqlx::raw_sql(
            r#"
            INSERT INTO country (country_code, country_code2, country_name, continent, country_population) VALUES
                ('USA', 'US', 'United States of America', 'North America', 331900000),
                ('NOR', 'NO', 'Norway', 'Europe', 5408000);
            INSERT INTO city (city_name, country_code, latitude, longitude, city_population) VALUES
                ('Washington', 'USA', 38.9072, -77.0369, 689545),
                ('New York', 'USA', 40.7128, -74.0060, 8804190),
                ('Oslo', 'NOR', 59.9139, 10.7522, 709037);
            UPDATE country SET country_capital = (SELECT city_id FROM city WHERE city_name = 'Washington')
                WHERE country_code = 'USA';
            UPDATE country SET country_capital = (SELECT city_id FROM city WHERE city_name = 'Oslo')
                WHERE country_code = 'NOR';
            INSERT INTO language (language_code, language_code2, language_name) VALUES
                ('ENG', 'EN', 'English'),
                ('NOR', 'NO', 'Norwegian');
            INSERT INTO country_language (country_code, language_code, is_official, language_percentage) VALUES
                ('USA', 'ENG', 'T', 86.2);
            "#,
        )
        .execute(pool)
        .await
        .expect("fixture");
    }
}
