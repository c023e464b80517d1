//! World API: REST access to the countries, cities, and languages dataset.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::AppError;
pub use response::Envelope;
pub use routes::{common_routes, world_routes};
pub use service::WorldService;
pub use state::AppState;
pub use store::{connect_pool, ensure_database_path, initialize};
