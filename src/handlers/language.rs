//! Language endpoints and the country/language association endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::handlers::parse_code;
use crate::model::{
    CountryLanguage, CountryLanguageDetail, DetailInput, Language, LanguageCountryDetail,
    LanguageFilter, LanguageInput, LanguagePatch,
};
use crate::repository::UpdateOutcome;
use crate::response::Envelope;
use crate::state::AppState;

fn detail_summary(detail: &CountryLanguage) -> String {
    format!(
        "({}) {}. ({}) {}",
        detail.country.country_code.as_deref().unwrap_or_default(),
        detail.country.country_name.as_deref().unwrap_or_default(),
        detail.language.language_code.as_deref().unwrap_or_default(),
        detail.language.language_name.as_deref().unwrap_or_default(),
    )
}

fn modified_envelope(outcome: UpdateOutcome<Language>) -> Envelope {
    match outcome {
        UpdateOutcome::Updated(language) => Envelope::with_data(
            200,
            format!(
                "Language modified. ({}) {}",
                language.language_code, language.language_name
            ),
            &language,
        ),
        UpdateOutcome::Unchanged(language) => {
            Envelope::with_data(304, "No changes detected for language.", &language)
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Language>>, AppError> {
    let languages = state.service.get_languages(None).await?;
    if languages.is_empty() {
        return Err(AppError::NotFound("no languages found".into()));
    }
    Ok(Json(languages))
}

pub async fn find(
    State(state): State<AppState>,
    Query(filter): Query<LanguageFilter>,
) -> Result<Json<Vec<Language>>, AppError> {
    let filter = filter.normalized();
    if filter.language_name.is_none() {
        return Err(AppError::BadRequest(
            "invalid or empty filter provided for search".into(),
        ));
    }
    let languages = state.service.get_languages(Some(&filter)).await?;
    if languages.is_empty() {
        return Err(AppError::NotFound(format!(
            "no languages found for language_name={}",
            filter.language_name.as_deref().unwrap_or_default(),
        )));
    }
    Ok(Json(languages))
}

pub async fn get(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Language>, AppError> {
    parse_code("language", &code)?;
    let language = state
        .service
        .get_language(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("language ({}) was not found", code)))?;
    Ok(Json(language))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<LanguageInput>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    input.validate()?;

    let mut existing = state
        .service
        .get_language(input.language_code.as_deref().unwrap_or_default())
        .await?;
    if existing.is_none() {
        if let Some(code2) = input.language_code2.as_deref().filter(|s| !s.trim().is_empty()) {
            existing = state.service.get_language(code2).await?;
        }
    }
    if let Some(existing) = existing {
        let envelope = Envelope::with_data(
            409,
            format!(
                "Language ({}) already exists. Duplicate language.",
                existing.language_code
            ),
            &existing,
        );
        return Ok(envelope.into_http(&[]));
    }

    let language = state.service.add_language(&input).await?;
    let envelope = Envelope::with_data(
        200,
        format!(
            "Language added. ({}) {}",
            language.language_code, language.language_name
        ),
        &language,
    );
    Ok(envelope.into_http(&[]))
}

pub async fn update(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(patch): Json<LanguagePatch>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("language", &code)?;
    let outcome = state.service.update_language(&code, &patch).await?;
    Ok(modified_envelope(outcome).into_http(&[304]))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("language", &code)?;
    let removed = state.service.delete_language(&code).await?;
    let envelope = Envelope::with_data(
        200,
        format!(
            "Language removed. ({}) {}",
            removed.language_code, removed.language_name
        ),
        &removed,
    );
    Ok(envelope.into_http(&[]))
}

pub async fn for_country(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<CountryLanguageDetail>>, AppError> {
    parse_code("country", &code)?;
    let details = state.service.get_languages_for_country(&code).await?;
    if details.is_empty() {
        return Err(AppError::NotFound(format!(
            "no languages found for requested country ({})",
            code
        )));
    }
    Ok(Json(details))
}

pub async fn countries_for(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<LanguageCountryDetail>>, AppError> {
    parse_code("language", &code)?;
    let details = state.service.get_countries_for_language(&code).await?;
    if details.is_empty() {
        return Err(AppError::NotFound(format!(
            "no countries found for requested language ({})",
            code
        )));
    }
    Ok(Json(details))
}

pub async fn get_for_country(
    State(state): State<AppState>,
    Path((code, language)): Path<(String, String)>,
) -> Result<Json<CountryLanguage>, AppError> {
    parse_code("country", &code)?;
    parse_code("language", &language)?;
    let detail = state
        .service
        .get_language_for_country(&code, &language)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "language ({}) details not found for country ({})",
                language, code
            ))
        })?;
    Ok(Json(detail))
}

pub async fn create_detail(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(input): Json<DetailInput>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("country", &code)?;
    let detail = state.service.add_language_detail(&code, &input).await?;
    let envelope = Envelope::with_data(
        200,
        format!("Language detail added for {}", detail_summary(&detail)),
        &detail,
    );
    Ok(envelope.into_http(&[]))
}

pub async fn update_detail(
    State(state): State<AppState>,
    Path((code, language)): Path<(String, String)>,
    Json(input): Json<DetailInput>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("country", &code)?;
    parse_code("language", &language)?;
    let detail = state
        .service
        .upsert_language_detail(&code, &language, &input)
        .await?;
    let envelope = Envelope::with_data(
        200,
        format!("Language detail saved for {}", detail_summary(&detail)),
        &detail,
    );
    Ok(envelope.into_http(&[]))
}

pub async fn delete_detail(
    State(state): State<AppState>,
    Path((code, language)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    parse_code("country", &code)?;
    parse_code("language", &language)?;
    let removed = state
        .service
        .delete_language_detail(&code, &language)
        .await?;
    let envelope = Envelope::with_data(
        200,
        format!("Language detail removed for {}", detail_summary(&removed)),
        &removed,
    );
    Ok(envelope.into_http(&[]))
}
