//! Data access for countries of the world.

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::AppError;
use crate::model::{CityRef, Country, CountryFilter, CountryInput, CountryPatch};
use crate::repository::{conflict_on_unique, resolve_country_code, UpdateOutcome};
use crate::sql::{self, match_operator, QueryBuf};

/// Base projection: countries with their capital joined in. The LEFT JOIN
/// keeps countries without a capital; their capital columns come back NULL.
const SELECT_COUNTRY: &str = "\
    SELECT \
        country.country_code, \
        country.country_code2, \
        country.country_name, \
        country.continent, \
        country.country_capital AS capital_id, \
        city.city_name AS capital_name, \
        country.country_population \
    FROM country \
    LEFT JOIN city ON country.country_capital = city.city_id";

fn select_sql(where_clause: Option<&str>) -> String {
    match where_clause {
        Some(w) => format!("{} WHERE {} ORDER BY country.country_name", SELECT_COUNTRY, w),
        None => format!("{} ORDER BY country.country_name", SELECT_COUNTRY),
    }
}

fn map_country(row: &SqliteRow) -> Result<Country, sqlx::Error> {
    Ok(Country {
        country_code: row.try_get("country_code")?,
        country_code2: row.try_get("country_code2")?,
        country_name: row.try_get("country_name")?,
        continent: row.try_get("continent")?,
        capital: CityRef {
            city_id: row.try_get("capital_id")?,
            city_name: row.try_get("capital_name")?,
        },
        country_population: row.try_get("country_population")?,
    })
}

#[derive(Clone)]
pub struct CountryRepository {
    pool: SqlitePool,
}

impl CountryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CountryRepository { pool }
    }

    /// All countries, ordered by name. Empty vec for an empty table.
    pub async fn all(&self) -> Result<Vec<Country>, AppError> {
        let rows = sqlx::query(&select_sql(None)).fetch_all(&self.pool).await?;
        rows.iter().map(|r| map_country(r).map_err(AppError::Db)).collect()
    }

    /// Countries matching every set predicate. A name containing a wildcard
    /// marker searches with LIKE, otherwise with equality.
    pub async fn find(&self, filter: &CountryFilter) -> Result<Vec<Country>, AppError> {
        if filter.is_empty() {
            return self.all().await;
        }
        let mut predicates = Vec::new();
        let mut q = QueryBuf::new(String::new());
        if let Some(name) = &filter.country_name {
            predicates.push(format!("country.country_name {} ?", match_operator(name)));
            q.push_param(name.as_str());
        }
        if let Some(continent) = &filter.continent {
            predicates.push("country.continent = ?".to_string());
            q.push_param(continent.as_str());
        }
        q.sql = select_sql(Some(&predicates.join(" AND ")));
        tracing::debug!(sql = %q.sql, "query");
        let rows = sql::query(&q).fetch_all(&self.pool).await?;
        rows.iter().map(|r| map_country(r).map_err(AppError::Db)).collect()
    }

    /// Single country by either code form.
    pub async fn get(&self, code: &str) -> Result<Option<Country>, AppError> {
        let Some(canonical) = resolve_country_code(&self.pool, code).await? else {
            return Ok(None);
        };
        let sql = select_sql(Some("country.country_code = ?"));
        let row = sqlx::query(&sql)
            .bind(&canonical)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_country).transpose().map_err(AppError::Db)
    }

    /// Insert a country and return the persisted row.
    pub async fn add(&self, input: &CountryInput) -> Result<Country, AppError> {
        input.validate()?;
        let code = input.country_code.clone().unwrap_or_default();
        let result = sqlx::query(
            "INSERT INTO country \
             (country_code, country_code2, country_name, continent, country_capital, country_population) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&code)
        .bind(&input.country_code2)
        .bind(&input.country_name)
        .bind(&input.continent)
        .bind(input.country_capital)
        .bind(input.country_population)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, format!("country ({}) already exists", code)))?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!("insert for country ({}) affected no rows", code)));
        }
        self.get(&code).await?.ok_or_else(|| {
            AppError::Orphaned(format!(
                "country ({}) missing after insert; check database integrity",
                code
            ))
        })
    }

    /// Apply a partial update. Only fields that are explicitly set and differ
    /// from the stored row are written; if none differ the row is untouched.
    pub async fn update(
        &self,
        code: &str,
        patch: &CountryPatch,
    ) -> Result<UpdateOutcome<Country>, AppError> {
        let existing = self
            .get(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("country ({}) was not found", code)))?;

        let mut sets = Vec::new();
        let mut q = QueryBuf::new(String::new());
        if let Some(v) = patch.country_code.changed_from(&existing.country_code) {
            sets.push("country_code = ?");
            q.push_param(v.as_str());
        }
        if let Some(v) = patch.country_code2.changed_from(&existing.country_code2) {
            sets.push("country_code2 = ?");
            q.push_param(v.clone());
        }
        if let Some(v) = patch.country_name.changed_from(&existing.country_name) {
            sets.push("country_name = ?");
            q.push_param(v.as_str());
        }
        if let Some(v) = patch.continent.changed_from(&existing.continent) {
            sets.push("continent = ?");
            q.push_param(v.as_str());
        }
        if let Some(v) = patch.country_capital.changed_from(&existing.capital.city_id) {
            sets.push("country_capital = ?");
            q.push_param(*v);
        }
        if let Some(v) = patch.country_population.changed_from(&existing.country_population) {
            sets.push("country_population = ?");
            q.push_param(*v);
        }
        if sets.is_empty() {
            return Ok(UpdateOutcome::Unchanged(existing));
        }

        q.sql = format!("UPDATE country SET {} WHERE country_code = ?", sets.join(", "));
        q.push_param(existing.country_code.as_str());
        tracing::debug!(sql = %q.sql, "query");
        let result = sql::query(&q).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "update for country ({}) affected no rows",
                existing.country_code
            )));
        }

        // Re-read under the new code when the update renamed the key.
        let read_key = patch
            .country_code
            .value()
            .cloned()
            .unwrap_or(existing.country_code);
        self.get(&read_key).await?.map(UpdateOutcome::Updated).ok_or_else(|| {
            AppError::Orphaned(format!(
                "country ({}) missing after update; check database integrity",
                read_key
            ))
        })
    }

    /// Remove a country along with its dependent references: cities keep
    /// their rows but lose the country link, and its language associations
    /// are removed. All statements commit or roll back together.
    pub async fn delete(&self, code: &str) -> Result<Country, AppError> {
        let existing = self
            .get(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("country ({}) was not found", code)))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE city SET country_code = NULL WHERE country_code = ?")
            .bind(&existing.country_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM country_language WHERE country_code = ?")
            .bind(&existing.country_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM country WHERE country_code = ?")
            .bind(&existing.country_code)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(existing)
    }
}
