//! Data access for languages and the country/language association.

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::AppError;
use crate::model::{
    CountryLanguage, CountryLanguageDetail, CountryRef, DetailInput, Language,
    LanguageCountryDetail, LanguageFilter, LanguageInput, LanguagePatch, LanguageRef,
};
use crate::repository::{
    conflict_on_unique, resolve_country_code, resolve_language_code, UpdateOutcome,
};
use crate::sql::{self, match_operator, QueryBuf};

const SELECT_LANGUAGE: &str = "\
    SELECT \
        language.language_code, \
        language.language_code2, \
        language.language_name, \
        language.language_notes \
    FROM language";

/// Association projection: join row plus both display names. `is_official`
/// comes back as the persisted one-character flag.
const SELECT_COUNTRY_LANGUAGE: &str = "\
    SELECT \
        country_language.country_language_id, \
        country_language.country_code, \
        country.country_name, \
        country_language.language_code, \
        language.language_name, \
        country_language.is_official, \
        country_language.language_percentage \
    FROM country_language \
    INNER JOIN country ON country_language.country_code = country.country_code \
    INNER JOIN language ON country_language.language_code = language.language_code";

fn select_sql(where_clause: Option<&str>) -> String {
    match where_clause {
        Some(w) => format!("{} WHERE {} ORDER BY language.language_name", SELECT_LANGUAGE, w),
        None => format!("{} ORDER BY language.language_name", SELECT_LANGUAGE),
    }
}

fn association_sql(where_clause: &str, order: Option<&str>) -> String {
    match order {
        Some(o) => format!("{} WHERE {} ORDER BY {}", SELECT_COUNTRY_LANGUAGE, where_clause, o),
        None => format!("{} WHERE {}", SELECT_COUNTRY_LANGUAGE, where_clause),
    }
}

fn official_flag(is_official: bool) -> &'static str {
    if is_official {
        "T"
    } else {
        "F"
    }
}

fn map_language(row: &SqliteRow) -> Result<Language, sqlx::Error> {
    Ok(Language {
        language_code: row.try_get("language_code")?,
        language_code2: row.try_get("language_code2")?,
        language_name: row.try_get("language_name")?,
        language_notes: row.try_get("language_notes")?,
    })
}

fn map_country_language(row: &SqliteRow) -> Result<CountryLanguage, sqlx::Error> {
    let flag: String = row.try_get("is_official")?;
    Ok(CountryLanguage {
        country_language_id: row.try_get("country_language_id")?,
        country: CountryRef {
            country_code: row.try_get("country_code")?,
            country_name: row.try_get("country_name")?,
        },
        language: LanguageRef {
            language_code: row.try_get("language_code")?,
            language_name: row.try_get("language_name")?,
        },
        is_official: flag == "T",
        language_percentage: row.try_get("language_percentage")?,
    })
}

fn map_country_language_detail(row: &SqliteRow) -> Result<CountryLanguageDetail, sqlx::Error> {
    let full = map_country_language(row)?;
    Ok(CountryLanguageDetail {
        country_language_id: full.country_language_id,
        language: full.language,
        is_official: full.is_official,
        language_percentage: full.language_percentage,
    })
}

fn map_language_country_detail(row: &SqliteRow) -> Result<LanguageCountryDetail, sqlx::Error> {
    let full = map_country_language(row)?;
    Ok(LanguageCountryDetail {
        country_language_id: full.country_language_id,
        country: full.country,
        is_official: full.is_official,
        language_percentage: full.language_percentage,
    })
}

#[derive(Clone)]
pub struct LanguageRepository {
    pool: SqlitePool,
}

impl LanguageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LanguageRepository { pool }
    }

    /// All languages, ordered by name.
    pub async fn all(&self) -> Result<Vec<Language>, AppError> {
        let rows = sqlx::query(&select_sql(None)).fetch_all(&self.pool).await?;
        rows.iter().map(|r| map_language(r).map_err(AppError::Db)).collect()
    }

    pub async fn find(&self, filter: &LanguageFilter) -> Result<Vec<Language>, AppError> {
        let Some(name) = &filter.language_name else {
            return self.all().await;
        };
        let mut q = QueryBuf::new(select_sql(Some(&format!(
            "language.language_name {} ?",
            match_operator(name)
        ))));
        q.push_param(name.as_str());
        tracing::debug!(sql = %q.sql, "query");
        let rows = sql::query(&q).fetch_all(&self.pool).await?;
        rows.iter().map(|r| map_language(r).map_err(AppError::Db)).collect()
    }

    /// Single language by either code form.
    pub async fn get(&self, code: &str) -> Result<Option<Language>, AppError> {
        let Some(canonical) = resolve_language_code(&self.pool, code).await? else {
            return Ok(None);
        };
        let sql = select_sql(Some("language.language_code = ?"));
        let row = sqlx::query(&sql)
            .bind(&canonical)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_language).transpose().map_err(AppError::Db)
    }

    pub async fn add(&self, input: &LanguageInput) -> Result<Language, AppError> {
        input.validate()?;
        let code = input.language_code.clone().unwrap_or_default();
        let result = sqlx::query(
            "INSERT INTO language (language_code, language_code2, language_name, language_notes) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&code)
        .bind(&input.language_code2)
        .bind(&input.language_name)
        .bind(&input.language_notes)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, format!("language ({}) already exists", code)))?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "insert for language ({}) affected no rows",
                code
            )));
        }
        self.get(&code).await?.ok_or_else(|| {
            AppError::Orphaned(format!(
                "language ({}) missing after insert; check database integrity",
                code
            ))
        })
    }

    pub async fn update(
        &self,
        code: &str,
        patch: &LanguagePatch,
    ) -> Result<UpdateOutcome<Language>, AppError> {
        let existing = self
            .get(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("language ({}) was not found", code)))?;

        let mut sets = Vec::new();
        let mut q = QueryBuf::new(String::new());
        if let Some(v) = patch.language_code.changed_from(&existing.language_code) {
            sets.push("language_code = ?");
            q.push_param(v.as_str());
        }
        if let Some(v) = patch.language_code2.changed_from(&existing.language_code2) {
            sets.push("language_code2 = ?");
            q.push_param(v.clone());
        }
        if let Some(v) = patch.language_name.changed_from(&existing.language_name) {
            sets.push("language_name = ?");
            q.push_param(v.as_str());
        }
        if let Some(v) = patch.language_notes.changed_from(&existing.language_notes) {
            sets.push("language_notes = ?");
            q.push_param(v.clone());
        }
        if sets.is_empty() {
            return Ok(UpdateOutcome::Unchanged(existing));
        }

        q.sql = format!("UPDATE language SET {} WHERE language_code = ?", sets.join(", "));
        q.push_param(existing.language_code.as_str());
        tracing::debug!(sql = %q.sql, "query");
        let result = sql::query(&q).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "update for language ({}) affected no rows",
                existing.language_code
            )));
        }
        let read_key = patch
            .language_code
            .value()
            .cloned()
            .unwrap_or(existing.language_code);
        self.get(&read_key).await?.map(UpdateOutcome::Updated).ok_or_else(|| {
            AppError::Orphaned(format!(
                "language ({}) missing after update; check database integrity",
                read_key
            ))
        })
    }

    /// Remove a language together with its country associations.
    pub async fn delete(&self, code: &str) -> Result<Language, AppError> {
        let existing = self
            .get(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("language ({}) was not found", code)))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM country_language WHERE language_code = ?")
            .bind(&existing.language_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM language WHERE language_code = ?")
            .bind(&existing.language_code)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(existing)
    }

    /// Languages spoken in a country, ordered by language name.
    pub async fn languages_for_country(
        &self,
        code: &str,
    ) -> Result<Vec<CountryLanguageDetail>, AppError> {
        let Some(canonical) = resolve_country_code(&self.pool, code).await? else {
            return Ok(Vec::new());
        };
        let sql = association_sql(
            "country_language.country_code = ?",
            Some("language.language_name"),
        );
        let rows = sqlx::query(&sql).bind(&canonical).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| map_country_language_detail(r).map_err(AppError::Db))
            .collect()
    }

    /// Countries speaking a language, ordered by country name.
    pub async fn countries_for_language(
        &self,
        code: &str,
    ) -> Result<Vec<LanguageCountryDetail>, AppError> {
        let Some(canonical) = resolve_language_code(&self.pool, code).await? else {
            return Ok(Vec::new());
        };
        let sql = association_sql(
            "country_language.language_code = ?",
            Some("country.country_name"),
        );
        let rows = sqlx::query(&sql).bind(&canonical).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| map_language_country_detail(r).map_err(AppError::Db))
            .collect()
    }

    /// One country/language pair, both codes in either form.
    pub async fn language_for_country(
        &self,
        country: &str,
        language: &str,
    ) -> Result<Option<CountryLanguage>, AppError> {
        let Some(country_code) = resolve_country_code(&self.pool, country).await? else {
            return Ok(None);
        };
        let Some(language_code) = resolve_language_code(&self.pool, language).await? else {
            return Ok(None);
        };
        let sql = association_sql(
            "country_language.country_code = ? AND country_language.language_code = ?",
            None,
        );
        let row = sqlx::query(&sql)
            .bind(&country_code)
            .bind(&language_code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(map_country_language)
            .transpose()
            .map_err(AppError::Db)
    }

    /// Attach a language to a country with its per-pair attributes. Both
    /// referenced entities must resolve under either key form.
    pub async fn add_detail(
        &self,
        country: &str,
        input: &DetailInput,
    ) -> Result<CountryLanguage, AppError> {
        input.validate_for_add()?;
        let language = input.language_code.as_deref().unwrap_or_default();
        let country_code = resolve_country_code(&self.pool, country)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("country ({}) was not found", country)))?;
        let language_code = resolve_language_code(&self.pool, language)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("language ({}) was not found", language)))?;

        let result = sqlx::query(
            "INSERT INTO country_language (country_code, language_code, is_official, language_percentage) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&country_code)
        .bind(&language_code)
        .bind(official_flag(input.is_official))
        .bind(input.language_percentage)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                format!("language ({}) already attached to country ({})", language_code, country_code),
            )
        })?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "insert for language detail ({}/{}) affected no rows",
                country_code, language_code
            )));
        }
        self.language_for_country(&country_code, &language_code)
            .await?
            .ok_or_else(|| {
                AppError::Orphaned(format!(
                    "language detail ({}/{}) missing after insert; check database integrity",
                    country_code, language_code
                ))
            })
    }

    /// Rewrite the per-pair attributes of an existing association.
    pub async fn update_detail(
        &self,
        country: &str,
        language: &str,
        input: &DetailInput,
    ) -> Result<CountryLanguage, AppError> {
        let country_code = resolve_country_code(&self.pool, country)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("country ({}) was not found", country)))?;
        let language_code = resolve_language_code(&self.pool, language)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("language ({}) was not found", language)))?;

        let result = sqlx::query(
            "UPDATE country_language SET is_official = ?, language_percentage = ? \
             WHERE country_code = ? AND language_code = ?",
        )
        .bind(official_flag(input.is_official))
        .bind(input.language_percentage)
        .bind(&country_code)
        .bind(&language_code)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "language ({}) details not found for country ({})",
                language_code, country_code
            )));
        }
        self.language_for_country(&country_code, &language_code)
            .await?
            .ok_or_else(|| {
                AppError::Orphaned(format!(
                    "language detail ({}/{}) missing after update; check database integrity",
                    country_code, language_code
                ))
            })
    }

    /// Detach a language from a country, returning the removed association.
    pub async fn delete_detail(
        &self,
        country: &str,
        language: &str,
    ) -> Result<CountryLanguage, AppError> {
        let existing = self.language_for_country(country, language).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "language ({}) details not found for country ({})",
                language, country
            ))
        })?;
        sqlx::query("DELETE FROM country_language WHERE country_language_id = ?")
            .bind(existing.country_language_id)
            .execute(&self.pool)
            .await?;
        Ok(existing)
    }
}
