//! City endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::handlers::{parse_city_id, parse_code};
use crate::model::{City, CityFilter, CityInput, CityPatch};
use crate::repository::UpdateOutcome;
use crate::response::Envelope;
use crate::state::AppState;

fn modified_envelope(outcome: UpdateOutcome<City>) -> Envelope {
    match outcome {
        UpdateOutcome::Updated(city) => Envelope::with_data(
            200,
            format!("City modified. ({}) {}", city.city_id, city.city_name),
            &city,
        ),
        UpdateOutcome::Unchanged(city) => {
            Envelope::with_data(304, "No changes detected for city.", &city)
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<City>>, AppError> {
    let cities = state.service.get_cities(None).await?;
    if cities.is_empty() {
        return Err(AppError::NotFound("no cities found".into()));
    }
    Ok(Json(cities))
}

pub async fn find(
    State(state): State<AppState>,
    Query(filter): Query<CityFilter>,
) -> Result<Json<Vec<City>>, AppError> {
    let filter = filter.normalized();
    if filter.city_name.is_none() {
        return Err(AppError::BadRequest(
            "invalid or empty filter provided for search".into(),
        ));
    }
    let cities = state.service.get_cities(Some(&filter)).await?;
    if cities.is_empty() {
        return Err(AppError::NotFound(format!(
            "no cities found for city_name={} country_code={}",
            filter.city_name.as_deref().unwrap_or_default(),
            filter.country_code.as_deref().unwrap_or_default(),
        )));
    }
    Ok(Json(cities))
}

pub async fn for_country(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<City>>, AppError> {
    parse_code("country", &code)?;
    let cities = state.service.get_cities_for_country(&code).await?;
    if cities.is_empty() {
        return Err(AppError::NotFound(format!(
            "no cities found for requested country ({})",
            code
        )));
    }
    Ok(Json(cities))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<City>, AppError> {
    let id = parse_city_id(&id)?;
    let city = state
        .service
        .get_city(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("city ({}) was not found", id)))?;
    Ok(Json(city))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CityInput>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    let city = state.service.add_city(&input).await?;
    let envelope = Envelope::with_data(
        200,
        format!("City added. ({}) {}", city.city_id, city.city_name),
        &city,
    );
    Ok(envelope.into_http(&[]))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CityPatch>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    let id = parse_city_id(&id)?;
    let outcome = state.service.update_city(id, &patch).await?;
    Ok(modified_envelope(outcome).into_http(&[304]))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    let id = parse_city_id(&id)?;
    let removed = state.service.delete_city(id).await?;
    let envelope = Envelope::with_data(
        200,
        format!("City removed. ({}) {}", removed.city_id, removed.city_name),
        &removed,
    );
    Ok(envelope.into_http(&[]))
}
