//! End-to-end scenarios over the seeded world dataset.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use world_api::model::{
    CityFilter, CityPatch, CountryFilter, CountryInput, DetailInput, Field, LanguageInput,
};
use world_api::{AppError, Settings, WorldService};

/// Single-connection in-memory database loaded from the real schema and seed
/// scripts, so tests cover what `/initialize` actually installs.
async fn seeded_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::raw_sql(include_str!("../db/schema.sql"))
        .execute(&pool)
        .await
        .expect("schema");
    sqlx::raw_sql(include_str!("../db/seed.sql"))
        .execute(&pool)
        .await
        .expect("seed");
    pool
}

async fn service() -> (WorldService, SqlitePool) {
    let pool = seeded_pool().await;
    (WorldService::new(pool.clone(), Settings::default()), pool)
}

#[tokio::test]
async fn get_by_either_code_form_returns_the_same_record() {
    let (svc, _pool) = service().await;
    let by_alpha2 = svc.get_country("US").await.unwrap().unwrap();
    let by_alpha3 = svc.get_country("USA").await.unwrap().unwrap();
    assert_eq!(by_alpha2, by_alpha3);
    assert_eq!(by_alpha2.capital.city_name.as_deref(), Some("Washington"));

    let lang2 = svc.get_language("EN").await.unwrap().unwrap();
    let lang3 = svc.get_language("ENG").await.unwrap().unwrap();
    assert_eq!(lang2, lang3);
}

#[tokio::test]
async fn add_country_then_get_round_trips() {
    let (svc, _pool) = service().await;
    let input = CountryInput {
        country_code: Some("ISL".into()),
        country_code2: Some("IS".into()),
        country_name: Some("Iceland".into()),
        continent: Some("Europe".into()),
        country_capital: None,
        country_population: Some(372000),
    };
    let added = svc.add_country(&input).await.unwrap();
    assert_eq!(added.country_code, "ISL");
    assert_eq!(added.continent, "Europe");
    assert_eq!(svc.get_country("IS").await.unwrap().unwrap(), added);
    assert_eq!(svc.get_country("ISL").await.unwrap().unwrap(), added);
}

#[tokio::test]
async fn no_change_update_leaves_the_row_identical() {
    let (svc, pool) = service().await;
    type CountryRow = (String, Option<String>, String, String, Option<i64>, Option<i64>);
    let before: CountryRow = sqlx::query_as(
        "SELECT country_code, country_code2, country_name, continent, country_capital, country_population \
         FROM country WHERE country_code = 'NOR'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let patch = world_api::model::CountryPatch {
        country_name: Field::Set("Norway".into()),
        continent: Field::Set("Europe".into()),
        ..Default::default()
    };
    let outcome = svc.update_country("NO", &patch).await.unwrap();
    assert!(outcome.is_unchanged());

    let after: CountryRow = sqlx::query_as(
        "SELECT country_code, country_code2, country_name, continent, country_capital, country_population \
         FROM country WHERE country_code = 'NOR'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn city_population_update_touches_only_that_column() {
    let (svc, _pool) = service().await;
    let tokyo = svc
        .get_cities(Some(&CityFilter {
            city_name: Some("Tokyo".into()),
            ..Default::default()
        }))
        .await
        .unwrap()
        .remove(0);

    let patch = CityPatch {
        city_population: Field::Set(Some(14000000)),
        ..Default::default()
    };
    svc.update_city(tokyo.city_id, &patch).await.unwrap();

    let after = svc.get_city(tokyo.city_id).await.unwrap().unwrap();
    assert_eq!(after.city_population, Some(14000000));
    assert_eq!(after.city_name, tokyo.city_name);
    assert_eq!(after.latitude, tokyo.latitude);
    assert_eq!(after.longitude, tokyo.longitude);
    assert_eq!(after.country, tokyo.country);
}

#[tokio::test]
async fn deleting_a_country_releases_cities_and_languages() {
    let (svc, pool) = service().await;
    let removed = svc.delete_country("JP").await.unwrap();
    assert_eq!(removed.country_code, "JPN");

    let (cities,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM city WHERE country_code = 'JPN'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(cities, 0);
    let (freed,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM city WHERE city_name IN ('Tokyo', 'Osaka') AND country_code IS NULL",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(freed, 2);
    let (links,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM country_language WHERE country_code = 'JPN'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(links, 0);
}

#[tokio::test]
async fn deleting_a_capital_city_clears_the_reference() {
    let (svc, _pool) = service().await;
    let oslo_id = svc
        .get_country("NOR")
        .await
        .unwrap()
        .unwrap()
        .capital
        .city_id
        .unwrap();

    svc.delete_city(oslo_id).await.unwrap();
    let norway = svc.get_country("NOR").await.unwrap().unwrap();
    assert_eq!(norway.capital.city_id, None);
    assert_eq!(norway.capital.city_name, None);
}

#[tokio::test]
async fn substring_search_matches_fragments_only() {
    let (svc, _pool) = service().await;
    let hits = svc
        .get_countries(Some(&CountryFilter {
            country_name: Some("land".into()),
            continent: None,
        }))
        .await
        .unwrap();
    let names: Vec<_> = hits.iter().map(|c| c.country_name.as_str()).collect();
    assert!(names.contains(&"United Kingdom"));
    assert!(!names.contains(&"France"));

    let hits = svc
        .get_countries(Some(&CountryFilter {
            country_name: None,
            continent: Some("South America".into()),
        }))
        .await
        .unwrap();
    let codes: Vec<_> = hits.iter().map(|c| c.country_code.as_str()).collect();
    assert_eq!(codes, ["ARG", "BRA"]);
}

#[tokio::test]
async fn duplicate_add_leaves_the_store_untouched() {
    let (svc, pool) = service().await;
    let (before,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM country")
        .fetch_one(&pool)
        .await
        .unwrap();

    // Same 3-letter code as an existing row.
    let input = CountryInput {
        country_code: Some("USA".into()),
        country_name: Some("United States".into()),
        continent: Some("North America".into()),
        ..Default::default()
    };
    assert!(matches!(svc.add_country(&input).await, Err(AppError::Conflict(_))));

    // Fresh 3-letter code but a 2-letter code already in use.
    let input = CountryInput {
        country_code: Some("UMI".into()),
        country_code2: Some("US".into()),
        country_name: Some("Minor Outlying Islands".into()),
        continent: Some("Oceania".into()),
        ..Default::default()
    };
    assert!(matches!(svc.add_country(&input).await, Err(AppError::Conflict(_))));

    let (after,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM country")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(before, after);

    let input = LanguageInput {
        language_code: Some("ENG".into()),
        language_name: Some("English".into()),
        ..Default::default()
    };
    assert!(matches!(svc.add_language(&input).await, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn attach_language_then_read_detail() {
    let (svc, _pool) = service().await;
    let input = DetailInput {
        language_code: Some("SPA".into()),
        is_official: false,
        language_percentage: 4.2,
    };
    svc.add_language_detail("CAN", &input).await.unwrap();

    let detail = svc
        .get_language_for_country("CA", "ES")
        .await
        .unwrap()
        .unwrap();
    assert!(!detail.is_official);
    assert_eq!(detail.language_percentage, 4.2);
    assert_eq!(detail.country.country_name.as_deref(), Some("Canada"));

    let listed = svc.get_languages_for_country("CAN").await.unwrap();
    assert!(listed
        .iter()
        .any(|d| d.language.language_code.as_deref() == Some("SPA")));

    let speakers = svc.get_countries_for_language("SPA").await.unwrap();
    assert!(speakers
        .iter()
        .any(|d| d.country.country_code.as_deref() == Some("CAN")));
}

#[tokio::test]
async fn set_capital_updates_the_country() {
    let (svc, _pool) = service().await;
    let sydney = svc
        .get_cities(Some(&CityFilter {
            city_name: Some("Sydney".into()),
            ..Default::default()
        }))
        .await
        .unwrap()
        .remove(0);

    let outcome = svc.set_capital("AU", sydney.city_id).await.unwrap();
    let australia = outcome.entity();
    assert_eq!(australia.capital.city_id, Some(sydney.city_id));
    assert_eq!(australia.capital.city_name.as_deref(), Some("Sydney"));
}

#[tokio::test]
async fn capital_filter_lists_only_capitals() {
    let (svc, _pool) = service().await;
    let capitals = svc
        .get_cities(Some(&CityFilter {
            is_capital: Some(true),
            ..Default::default()
        }))
        .await
        .unwrap();
    let names: Vec<_> = capitals.iter().map(|c| c.city_name.as_str()).collect();
    assert!(names.contains(&"Oslo"));
    assert!(names.contains(&"Tokyo"));
    assert!(!names.contains(&"New York"));
    assert!(!names.contains(&"Sydney"));
}
