//! HTTP handlers: thin adapters that parse and validate request input,
//! invoke the service, and map outcomes onto statuses and envelopes.

pub mod city;
pub mod country;
pub mod language;
pub mod system;

use crate::error::AppError;
use crate::model::is_valid_code;

/// Reject identifiers that are not a 2- or 3-letter code before they reach
/// the service.
pub(crate) fn parse_code(what: &'static str, code: &str) -> Result<(), AppError> {
    if !is_valid_code(code) {
        return Err(AppError::BadRequest(format!(
            "empty or invalid {} identifier specified: {}",
            what, code
        )));
    }
    Ok(())
}

/// City identifiers are positive integers; zero and non-numeric values are
/// rejected up front.
pub(crate) fn parse_city_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::BadRequest(format!(
            "invalid city identifier, expected a positive integer: {}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_guard() {
        assert!(parse_code("country", "US").is_ok());
        assert!(parse_code("country", "USA").is_ok());
        assert!(parse_code("country", "").is_err());
        assert!(parse_code("country", "USAX").is_err());
        assert!(parse_code("country", "U1").is_err());
    }

    #[test]
    fn city_id_guard() {
        assert_eq!(parse_city_id("8321").unwrap(), 8321);
        assert!(parse_city_id("0").is_err());
        assert!(parse_city_id("-4").is_err());
        assert!(parse_city_id("abc").is_err());
    }
}
