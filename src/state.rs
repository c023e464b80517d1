//! Shared application state for all routes.

use sqlx::sqlite::SqlitePool;

use crate::service::WorldService;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub service: WorldService,
}
