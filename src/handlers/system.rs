//! System endpoints: banner and database reset.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppError;
use crate::response::Envelope;
use crate::state::AppState;

pub async fn root() -> &'static str {
    "Countries of the World API"
}

/// Reset the database from the schema and seed scripts. The reset is awaited;
/// a 200 means both scripts committed.
pub async fn initialize(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Envelope>), AppError> {
    state.service.initialize().await?;
    let envelope = Envelope::new(200, "World database initialized from schema and seed scripts.");
    Ok(envelope.into_http(&[]))
}
