//! World data routes: countries, cities, languages, and the country/language
//! association. Static segments (`find`) are registered alongside the
//! parameterized code/id routes; the router prefers the static match.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{city, country, language, system};
use crate::state::AppState;

pub fn world_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/initialize", post(system::initialize))
        .route("/countries", get(country::list).post(country::create))
        .route("/countries/find", get(country::find))
        .route(
            "/countries/:code",
            get(country::get).put(country::update).delete(country::delete),
        )
        .route("/countries/:code/capital/:id", put(country::set_capital))
        .route("/countries/:code/cities", get(city::for_country))
        .route(
            "/countries/:code/languages",
            get(language::for_country).post(language::create_detail),
        )
        .route(
            "/countries/:code/languages/:language",
            get(language::get_for_country)
                .put(language::update_detail)
                .delete(language::delete_detail),
        )
        .route("/cities", get(city::list).post(city::create))
        .route("/cities/find", get(city::find))
        .route(
            "/cities/:id",
            get(city::get).put(city::update).delete(city::delete),
        )
        .route("/languages", get(language::list).post(language::create))
        .route("/languages/find", get(language::find))
        .route(
            "/languages/:code",
            get(language::get).put(language::update).delete(language::delete),
        )
        .route("/languages/:code/countries", get(language::countries_for))
        .with_state(state)
}
