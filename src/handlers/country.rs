//! Country endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::handlers::{parse_city_id, parse_code};
use crate::model::{Country, CountryFilter, CountryInput, CountryPatch};
use crate::repository::UpdateOutcome;
use crate::response::Envelope;
use crate::state::AppState;

fn modified_envelope(outcome: UpdateOutcome<Country>) -> Envelope {
    match outcome {
        UpdateOutcome::Updated(country) => Envelope::with_data(
            200,
            format!("Country modified. ({}) {}", country.country_code, country.country_name),
            &country,
        ),
        UpdateOutcome::Unchanged(country) => {
            Envelope::with_data(304, "No changes detected for country.", &country)
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Country>>, AppError> {
    let countries = state.service.get_countries(None).await?;
    if countries.is_empty() {
        return Err(AppError::NotFound("no countries found".into()));
    }
    Ok(Json(countries))
}

pub async fn find(
    State(state): State<AppState>,
    Query(filter): Query<CountryFilter>,
) -> Result<Json<Vec<Country>>, AppError> {
    let filter = filter.normalized();
    if filter.is_empty() {
        return Err(AppError::BadRequest(
            "invalid or empty filter provided for search".into(),
        ));
    }
    let countries = state.service.get_countries(Some(&filter)).await?;
    if countries.is_empty() {
        return Err(AppError::NotFound(format!(
            "no countries found for country_name={} continent={}",
            filter.country_name.as_deref().unwrap_or_default(),
            filter.continent.as_deref().unwrap_or_default(),
        )));
    }
    Ok(Json(countries))
}

pub async fn get(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Country>, AppError> {
    parse_code("country", &code)?;
    let country = state
        .service
        .get_country(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("country ({}) was not found", code)))?;
    Ok(Json(country))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CountryInput>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    input.validate()?;

    // Duplicate probe under both key forms before touching the store.
    let mut existing = state
        .service
        .get_country(input.country_code.as_deref().unwrap_or_default())
        .await?;
    if existing.is_none() {
        if let Some(code2) = input.country_code2.as_deref().filter(|s| !s.trim().is_empty()) {
            existing = state.service.get_country(code2).await?;
        }
    }
    if let Some(existing) = existing {
        let envelope = Envelope::with_data(
            409,
            format!(
                "Country ({}) already exists. Duplicate country.",
                existing.country_code
            ),
            &existing,
        );
        return Ok(envelope.into_http(&[]));
    }

    let country = state.service.add_country(&input).await?;
    let envelope = Envelope::with_data(
        200,
        format!("Country added. ({}) {}", country.country_code, country.country_name),
        &country,
    );
    Ok(envelope.into_http(&[]))
}

pub async fn update(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(patch): Json<CountryPatch>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("country", &code)?;
    let outcome = state.service.update_country(&code, &patch).await?;
    Ok(modified_envelope(outcome).into_http(&[304]))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("country", &code)?;
    let removed = state.service.delete_country(&code).await?;
    let envelope = Envelope::with_data(
        200,
        format!("Country removed. ({}) {}", removed.country_code, removed.country_name),
        &removed,
    );
    Ok(envelope.into_http(&[]))
}

pub async fn set_capital(
    State(state): State<AppState>,
    Path((code, id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("country", &code)?;
    let city_id = parse_city_id(&id)?;
    let outcome = state.service.set_capital(&code, city_id).await?;
    Ok(modified_envelope(outcome).into_http(&[304]))
}
