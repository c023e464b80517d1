//! City model, search filter, and input carriers.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::country::require;
use crate::model::field::Field;

/// Owning-country reference embedded in a city. Fields are null for a city
/// left without a country after a country deletion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryRef {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city_id: i64,
    pub city_name: String,
    pub country: CountryRef,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city_population: Option<i64>,
}

/// Search predicates for cities; all are optional and combined with AND.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CityFilter {
    pub city_name: Option<String>,
    pub country_code: Option<String>,
    #[serde(default)]
    pub is_capital: Option<bool>,
}

impl CityFilter {
    /// Blank query parameters count as absent.
    pub fn normalized(self) -> Self {
        CityFilter {
            city_name: self.city_name.filter(|s| !s.trim().is_empty()),
            country_code: self.country_code.filter(|s| !s.trim().is_empty()),
            is_capital: self.is_capital,
        }
    }
}

/// Payload for creating a city.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CityInput {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city_population: Option<i64>,
}

impl CityInput {
    pub fn validate(&self) -> Result<(), AppError> {
        require("city_name", &self.city_name)?;
        require("country_code", &self.country_code)?;
        Ok(())
    }
}

/// Partial update for a city. Only explicitly provided fields are written.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CityPatch {
    #[serde(default)]
    pub city_name: Field<String>,
    #[serde(default)]
    pub country_code: Field<String>,
    #[serde(default)]
    pub latitude: Field<Option<f64>>,
    #[serde(default)]
    pub longitude: Field<Option<f64>>,
    #[serde(default)]
    pub city_population: Field<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_input_requires_name_and_country() {
        let mut input = CityInput {
            city_name: Some("Bergen".into()),
            country_code: Some("NO".into()),
            ..Default::default()
        };
        assert!(input.validate().is_ok());

        input.country_code = None;
        assert!(input.validate().is_err());

        input.country_code = Some("NO".into());
        input.city_name = Some("".into());
        assert!(input.validate().is_err());
    }
}
