//! Data access for cities of the world.

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::AppError;
use crate::model::{City, CityFilter, CityInput, CityPatch, CountryRef};
use crate::repository::{resolve_country_code, UpdateOutcome};
use crate::sql::{self, match_operator, QueryBuf};

const SELECT_CITY: &str = "\
    SELECT \
        city.city_id, \
        city.city_name, \
        city.country_code, \
        country.country_name, \
        city.latitude, \
        city.longitude, \
        city.city_population \
    FROM city \
    LEFT JOIN country ON country.country_code = city.country_code";

fn select_sql(where_clause: Option<&str>) -> String {
    match where_clause {
        Some(w) => format!("{} WHERE {} ORDER BY city.city_name", SELECT_CITY, w),
        None => format!("{} ORDER BY city.city_name", SELECT_CITY),
    }
}

fn map_city(row: &SqliteRow) -> Result<City, sqlx::Error> {
    Ok(City {
        city_id: row.try_get("city_id")?,
        city_name: row.try_get("city_name")?,
        country: CountryRef {
            country_code: row.try_get("country_code")?,
            country_name: row.try_get("country_name")?,
        },
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        city_population: row.try_get("city_population")?,
    })
}

#[derive(Clone)]
pub struct CityRepository {
    pool: SqlitePool,
}

impl CityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CityRepository { pool }
    }

    /// All cities, ordered by name.
    pub async fn all(&self) -> Result<Vec<City>, AppError> {
        let rows = sqlx::query(&select_sql(None)).fetch_all(&self.pool).await?;
        rows.iter().map(|r| map_city(r).map_err(AppError::Db)).collect()
    }

    /// Cities of one country, addressed by either code form.
    pub async fn all_for_country(&self, code: &str) -> Result<Vec<City>, AppError> {
        let Some(canonical) = resolve_country_code(&self.pool, code).await? else {
            return Ok(Vec::new());
        };
        let sql = select_sql(Some("city.country_code = ?"));
        let rows = sqlx::query(&sql).bind(&canonical).fetch_all(&self.pool).await?;
        rows.iter().map(|r| map_city(r).map_err(AppError::Db)).collect()
    }

    /// Cities matching every set predicate. A filter with nothing set matches
    /// nothing; the unfiltered listing is `all`.
    pub async fn find(&self, filter: &CityFilter) -> Result<Vec<City>, AppError> {
        let mut predicates = Vec::new();
        let mut q = QueryBuf::new(String::new());
        if let Some(code) = &filter.country_code {
            match resolve_country_code(&self.pool, code).await? {
                Some(canonical) => {
                    predicates.push("city.country_code = ?".to_string());
                    q.push_param(canonical);
                }
                None => return Ok(Vec::new()),
            }
        }
        if filter.is_capital == Some(true) {
            predicates
                .push("city.city_id IN (SELECT DISTINCT country_capital FROM country)".to_string());
        }
        if let Some(name) = &filter.city_name {
            predicates.push(format!("city.city_name {} ?", match_operator(name)));
            q.push_param(name.as_str());
        }
        if predicates.is_empty() {
            return Ok(Vec::new());
        }

        q.sql = select_sql(Some(&predicates.join(" AND ")));
        tracing::debug!(sql = %q.sql, "query");
        let rows = sql::query(&q).fetch_all(&self.pool).await?;
        rows.iter().map(|r| map_city(r).map_err(AppError::Db)).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Option<City>, AppError> {
        let sql = select_sql(Some("city.city_id = ?"));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(map_city).transpose().map_err(AppError::Db)
    }

    /// Insert a city and return the persisted row, keyed by the id the store
    /// assigned.
    pub async fn add(&self, input: &CityInput) -> Result<City, AppError> {
        input.validate()?;
        let code = input.country_code.as_deref().unwrap_or_default();
        let canonical = resolve_country_code(&self.pool, code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("country ({}) was not found", code)))?;
        let result = sqlx::query(
            "INSERT INTO city (city_name, country_code, latitude, longitude, city_population) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.city_name)
        .bind(&canonical)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.city_population)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal("insert for city affected no rows".into()));
        }
        let id = result.last_insert_rowid();
        self.get(id).await?.ok_or_else(|| {
            AppError::Orphaned(format!(
                "city ({}) missing after insert; check database integrity",
                id
            ))
        })
    }

    /// Apply a partial update; equal or unset fields are skipped. Changing
    /// the owning country re-resolves the code and fails when it is unknown.
    pub async fn update(&self, id: i64, patch: &CityPatch) -> Result<UpdateOutcome<City>, AppError> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("city ({}) was not found", id)))?;

        let mut sets = Vec::new();
        let mut q = QueryBuf::new(String::new());
        if let Some(code) = patch.country_code.value() {
            let canonical = resolve_country_code(&self.pool, code)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("country ({}) was not found", code)))?;
            if existing.country.country_code.as_deref() != Some(canonical.as_str()) {
                sets.push("country_code = ?");
                q.push_param(canonical);
            }
        }
        if let Some(v) = patch.city_name.changed_from(&existing.city_name) {
            sets.push("city_name = ?");
            q.push_param(v.as_str());
        }
        if let Some(v) = patch.latitude.changed_from(&existing.latitude) {
            sets.push("latitude = ?");
            q.push_param(*v);
        }
        if let Some(v) = patch.longitude.changed_from(&existing.longitude) {
            sets.push("longitude = ?");
            q.push_param(*v);
        }
        if let Some(v) = patch.city_population.changed_from(&existing.city_population) {
            sets.push("city_population = ?");
            q.push_param(*v);
        }
        if sets.is_empty() {
            return Ok(UpdateOutcome::Unchanged(existing));
        }

        q.sql = format!("UPDATE city SET {} WHERE city_id = ?", sets.join(", "));
        q.push_param(existing.city_id);
        tracing::debug!(sql = %q.sql, "query");
        let result = sql::query(&q).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "update for city ({}) affected no rows",
                existing.city_id
            )));
        }
        self.get(existing.city_id).await?.map(UpdateOutcome::Updated).ok_or_else(|| {
            AppError::Orphaned(format!(
                "city ({}) missing after update; check database integrity",
                existing.city_id
            ))
        })
    }

    /// Remove a city. Any country holding it as capital loses that reference
    /// in the same transaction.
    pub async fn delete(&self, id: i64) -> Result<City, AppError> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("city ({}) was not found", id)))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE country SET country_capital = NULL WHERE country_capital = ?")
            .bind(existing.city_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM city WHERE city_id = ?")
            .bind(existing.city_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(existing)
    }
}
