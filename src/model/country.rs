//! Country model, search filter, and input carriers.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::field::Field;

/// Capital reference embedded in a country. Both fields are null when the
/// country has no capital on record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRef {
    pub city_id: Option<i64>,
    pub city_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub country_code: String,
    pub country_code2: Option<String>,
    pub country_name: String,
    pub continent: String,
    pub capital: CityRef,
    pub country_population: Option<i64>,
}

/// Search predicates for countries; all are optional and combined with AND.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CountryFilter {
    pub country_name: Option<String>,
    pub continent: Option<String>,
}

impl CountryFilter {
    pub fn is_empty(&self) -> bool {
        self.country_name.is_none() && self.continent.is_none()
    }

    /// Blank query parameters count as absent.
    pub fn normalized(self) -> Self {
        CountryFilter {
            country_name: self.country_name.filter(|s| !s.trim().is_empty()),
            continent: self.continent.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Payload for creating a country.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CountryInput {
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_code2: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub country_capital: Option<i64>,
    #[serde(default)]
    pub country_population: Option<i64>,
}

impl CountryInput {
    /// Required-field presence: code, name, and continent must be non-blank.
    pub fn validate(&self) -> Result<(), AppError> {
        require("country_code", &self.country_code)?;
        require("country_name", &self.country_name)?;
        require("continent", &self.continent)?;
        Ok(())
    }
}

/// Partial update for a country. Only explicitly provided fields are written.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CountryPatch {
    #[serde(default)]
    pub country_code: Field<String>,
    #[serde(default)]
    pub country_code2: Field<Option<String>>,
    #[serde(default)]
    pub country_name: Field<String>,
    #[serde(default)]
    pub continent: Field<String>,
    #[serde(default)]
    pub country_capital: Field<Option<i64>>,
    #[serde(default)]
    pub country_population: Field<Option<i64>>,
}

pub(crate) fn require(name: &str, value: &Option<String>) -> Result<(), AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(AppError::Validation(format!("{} is required", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_input_requires_code_name_continent() {
        let mut input = CountryInput {
            country_code: Some("NOR".into()),
            country_name: Some("Norway".into()),
            continent: Some("Europe".into()),
            ..Default::default()
        };
        assert!(input.validate().is_ok());

        input.continent = Some("  ".into());
        assert!(input.validate().is_err());

        input.continent = None;
        assert!(input.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_absent_from_present() {
        let patch: CountryPatch =
            serde_json::from_str(r#"{"country_population":5400000}"#).unwrap();
        assert!(!patch.country_name.is_set());
        assert_eq!(patch.country_population, Field::Set(Some(5400000)));
    }
}
