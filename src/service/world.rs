//! Application layer for the countries, cities, and languages of the world.
//! Adds the rules that sit above raw persistence: substring rewriting of
//! name filters, identifier guards, cross-entity checks, and the database
//! reset.

use sqlx::sqlite::SqlitePool;

use crate::config::Settings;
use crate::error::AppError;
use crate::model::{
    City, CityFilter, CityInput, CityPatch, Country, CountryFilter, CountryInput, CountryLanguage,
    CountryLanguageDetail, CountryPatch, DetailInput, Field, Language, LanguageCountryDetail,
    LanguageFilter, LanguageInput, LanguagePatch,
};
use crate::repository::{CityRepository, CountryRepository, LanguageRepository, UpdateOutcome};
use crate::store;

/// Wrap a raw name fragment in wildcard markers so lookups behave as
/// substring search.
fn substring(name: &str) -> String {
    format!("%{}%", name)
}

fn require_code(what: &'static str, code: &str) -> Result<(), AppError> {
    if code.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} code is required", what)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct WorldService {
    pool: SqlitePool,
    settings: Settings,
    countries: CountryRepository,
    cities: CityRepository,
    languages: LanguageRepository,
}

impl WorldService {
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        WorldService {
            countries: CountryRepository::new(pool.clone()),
            cities: CityRepository::new(pool.clone()),
            languages: LanguageRepository::new(pool.clone()),
            pool,
            settings,
        }
    }

    /// Reset the database to the seeded state. Completion is awaited; the
    /// caller only sees success once both scripts have committed.
    pub async fn initialize(&self) -> Result<(), AppError> {
        store::initialize(&self.pool, &self.settings).await
    }

    // Countries

    pub async fn get_countries(
        &self,
        filter: Option<&CountryFilter>,
    ) -> Result<Vec<Country>, AppError> {
        match filter {
            Some(f) if !f.is_empty() => {
                let mut f = f.clone();
                if let Some(name) = &f.country_name {
                    f.country_name = Some(substring(name));
                }
                self.countries.find(&f).await
            }
            _ => self.countries.all().await,
        }
    }

    pub async fn get_country(&self, code: &str) -> Result<Option<Country>, AppError> {
        require_code("country", code)?;
        self.countries.get(code).await
    }

    pub async fn add_country(&self, input: &CountryInput) -> Result<Country, AppError> {
        input.validate()?;
        self.countries.add(input).await
    }

    pub async fn update_country(
        &self,
        code: &str,
        patch: &CountryPatch,
    ) -> Result<UpdateOutcome<Country>, AppError> {
        require_code("country", code)?;
        self.countries.update(code, patch).await
    }

    pub async fn delete_country(&self, code: &str) -> Result<Country, AppError> {
        require_code("country", code)?;
        self.countries.delete(code).await
    }

    /// Point a country's capital reference at a city. Both sides must exist
    /// before the reference is written.
    pub async fn set_capital(
        &self,
        code: &str,
        city_id: i64,
    ) -> Result<UpdateOutcome<Country>, AppError> {
        require_code("country", code)?;
        let city = self
            .cities
            .get(city_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("city ({}) was not found", city_id)))?;
        if self.countries.get(code).await?.is_none() {
            return Err(AppError::NotFound(format!("country ({}) was not found", code)));
        }
        let patch = CountryPatch {
            country_capital: Field::Set(Some(city.city_id)),
            ..Default::default()
        };
        self.countries.update(code, &patch).await
    }

    // Cities

    pub async fn get_cities(&self, filter: Option<&CityFilter>) -> Result<Vec<City>, AppError> {
        match filter {
            Some(f)
                if f.city_name.is_some()
                    || f.country_code.is_some()
                    || f.is_capital == Some(true) =>
            {
                let mut f = f.clone();
                if let Some(name) = &f.city_name {
                    f.city_name = Some(substring(name));
                }
                self.cities.find(&f).await
            }
            _ => self.cities.all().await,
        }
    }

    pub async fn get_cities_for_country(&self, code: &str) -> Result<Vec<City>, AppError> {
        require_code("country", code)?;
        self.cities.all_for_country(code).await
    }

    pub async fn get_city(&self, id: i64) -> Result<Option<City>, AppError> {
        self.cities.get(id).await
    }

    pub async fn add_city(&self, input: &CityInput) -> Result<City, AppError> {
        input.validate()?;
        self.cities.add(input).await
    }

    pub async fn update_city(
        &self,
        id: i64,
        patch: &CityPatch,
    ) -> Result<UpdateOutcome<City>, AppError> {
        self.cities.update(id, patch).await
    }

    pub async fn delete_city(&self, id: i64) -> Result<City, AppError> {
        self.cities.delete(id).await
    }

    // Languages

    pub async fn get_languages(
        &self,
        filter: Option<&LanguageFilter>,
    ) -> Result<Vec<Language>, AppError> {
        match filter {
            Some(f) if f.language_name.is_some() => {
                let mut f = f.clone();
                if let Some(name) = &f.language_name {
                    f.language_name = Some(substring(name));
                }
                self.languages.find(&f).await
            }
            _ => self.languages.all().await,
        }
    }

    pub async fn get_language(&self, code: &str) -> Result<Option<Language>, AppError> {
        require_code("language", code)?;
        self.languages.get(code).await
    }

    pub async fn add_language(&self, input: &LanguageInput) -> Result<Language, AppError> {
        input.validate()?;
        self.languages.add(input).await
    }

    pub async fn update_language(
        &self,
        code: &str,
        patch: &LanguagePatch,
    ) -> Result<UpdateOutcome<Language>, AppError> {
        require_code("language", code)?;
        self.languages.update(code, patch).await
    }

    pub async fn delete_language(&self, code: &str) -> Result<Language, AppError> {
        require_code("language", code)?;
        self.languages.delete(code).await
    }

    // Country/language association

    pub async fn get_languages_for_country(
        &self,
        code: &str,
    ) -> Result<Vec<CountryLanguageDetail>, AppError> {
        require_code("country", code)?;
        self.languages.languages_for_country(code).await
    }

    pub async fn get_countries_for_language(
        &self,
        code: &str,
    ) -> Result<Vec<LanguageCountryDetail>, AppError> {
        require_code("language", code)?;
        self.languages.countries_for_language(code).await
    }

    pub async fn get_language_for_country(
        &self,
        country: &str,
        language: &str,
    ) -> Result<Option<CountryLanguage>, AppError> {
        require_code("country", country)?;
        require_code("language", language)?;
        self.languages.language_for_country(country, language).await
    }

    /// Attach a language to a country. Rejects an already-attached pair.
    pub async fn add_language_detail(
        &self,
        country: &str,
        input: &DetailInput,
    ) -> Result<CountryLanguage, AppError> {
        require_code("country", country)?;
        input.validate_for_add()?;
        let language = input.language_code.as_deref().unwrap_or_default();
        if let Some(existing) = self.languages.language_for_country(country, language).await? {
            return Err(AppError::Conflict(format!(
                "language ({}) already attached to country ({})",
                existing
                    .language
                    .language_code
                    .as_deref()
                    .unwrap_or(language),
                existing.country.country_code.as_deref().unwrap_or(country),
            )));
        }
        self.languages.add_detail(country, input).await
    }

    /// Update the attributes of an association, creating it when absent.
    /// Both referenced entities must resolve under either key form.
    pub async fn upsert_language_detail(
        &self,
        country: &str,
        language: &str,
        input: &DetailInput,
    ) -> Result<CountryLanguage, AppError> {
        require_code("country", country)?;
        require_code("language", language)?;
        if self
            .languages
            .language_for_country(country, language)
            .await?
            .is_some()
        {
            return self.languages.update_detail(country, language, input).await;
        }
        let add = DetailInput {
            language_code: Some(language.to_string()),
            is_official: input.is_official,
            language_percentage: input.language_percentage,
        };
        self.languages.add_detail(country, &add).await
    }

    pub async fn delete_language_detail(
        &self,
        country: &str,
        language: &str,
    ) -> Result<CountryLanguage, AppError> {
        require_code("country", country)?;
        require_code("language", language)?;
        self.languages.delete_detail(country, language).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil::{memory_pool, seed_fixture};

    async fn service() -> WorldService {
        let pool = memory_pool().await;
        seed_fixture(&pool).await;
        WorldService::new(pool, Settings::default())
    }

    #[tokio::test]
    async fn name_filters_search_substrings() {
        let svc = service().await;
        let filter = CountryFilter {
            country_name: Some("nited".into()),
            continent: None,
        };
        let hits = svc.get_countries(Some(&filter)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].country_code, "USA");

        let filter = CityFilter {
            city_name: Some("ork".into()),
            ..Default::default()
        };
        let hits = svc.get_cities(Some(&filter)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].city_name, "New York");

        let filter = LanguageFilter {
            language_name: Some("gli".into()),
        };
        let hits = svc.get_languages(Some(&filter)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].language_code, "ENG");
    }

    #[tokio::test]
    async fn no_filter_lists_everything() {
        let svc = service().await;
        assert_eq!(svc.get_countries(None).await.unwrap().len(), 2);
        assert_eq!(svc.get_cities(None).await.unwrap().len(), 3);
        assert_eq!(svc.get_languages(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn set_capital_requires_both_sides() {
        let svc = service().await;
        let new_york = svc
            .get_cities(Some(&CityFilter {
                city_name: Some("New York".into()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .remove(0);

        let outcome = svc.set_capital("US", new_york.city_id).await.unwrap();
        assert_eq!(outcome.entity().capital.city_id, Some(new_york.city_id));

        assert!(matches!(
            svc.set_capital("US", 99999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.set_capital("ZZ", new_york.city_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn add_detail_rejects_existing_pair() {
        let svc = service().await;
        let input = DetailInput {
            language_code: Some("EN".into()),
            is_official: true,
            language_percentage: 86.2,
        };
        assert!(matches!(
            svc.add_language_detail("USA", &input).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn upsert_detail_updates_or_creates() {
        let svc = service().await;
        // Existing pair: attribute rewrite.
        let input = DetailInput {
            language_code: None,
            is_official: false,
            language_percentage: 80.0,
        };
        let updated = svc.upsert_language_detail("US", "EN", &input).await.unwrap();
        assert!(!updated.is_official);
        assert_eq!(updated.language_percentage, 80.0);

        // Missing pair: created from the path codes.
        let input = DetailInput {
            language_code: None,
            is_official: true,
            language_percentage: 96.0,
        };
        let created = svc.upsert_language_detail("NO", "NO", &input).await.unwrap();
        assert!(created.is_official);
        assert_eq!(created.country.country_code.as_deref(), Some("NOR"));
        assert_eq!(created.language.language_code.as_deref(), Some("NOR"));
    }

    #[tokio::test]
    async fn usa_english_scenario() {
        let svc = service().await;
        svc.delete_language_detail("USA", "ENG").await.unwrap();

        let input = DetailInput {
            language_code: Some("ENG".into()),
            is_official: true,
            language_percentage: 86.2,
        };
        svc.add_language_detail("USA", &input).await.unwrap();
        let detail = svc
            .get_language_for_country("USA", "ENG")
            .await
            .unwrap()
            .unwrap();
        assert!(detail.is_official);
        assert_eq!(detail.language_percentage, 86.2);
    }
}
