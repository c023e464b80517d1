//! Language model, the country/language association, and their carriers.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::city::CountryRef;
use crate::model::country::require;
use crate::model::field::Field;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub language_code: String,
    pub language_code2: Option<String>,
    pub language_name: String,
    pub language_notes: Option<String>,
}

/// Language reference embedded in association rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageRef {
    pub language_code: Option<String>,
    pub language_name: Option<String>,
}

/// One country/language association with its per-pair attributes. The
/// persisted one-character official flag is already mapped to a bool here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryLanguage {
    pub country_language_id: i64,
    pub country: CountryRef,
    pub language: LanguageRef,
    pub is_official: bool,
    pub language_percentage: f64,
}

/// Association row projected for a country's language listing: only the
/// language side is nested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryLanguageDetail {
    pub country_language_id: i64,
    pub language: LanguageRef,
    pub is_official: bool,
    pub language_percentage: f64,
}

/// Association row projected for a language's country listing: only the
/// country side is nested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageCountryDetail {
    pub country_language_id: i64,
    pub country: CountryRef,
    pub is_official: bool,
    pub language_percentage: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LanguageFilter {
    pub language_name: Option<String>,
}

impl LanguageFilter {
    /// Blank query parameters count as absent.
    pub fn normalized(self) -> Self {
        LanguageFilter {
            language_name: self.language_name.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Payload for creating a language.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LanguageInput {
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub language_code2: Option<String>,
    #[serde(default)]
    pub language_name: Option<String>,
    #[serde(default)]
    pub language_notes: Option<String>,
}

impl LanguageInput {
    pub fn validate(&self) -> Result<(), AppError> {
        require("language_code", &self.language_code)?;
        require("language_name", &self.language_name)?;
        Ok(())
    }
}

/// Partial update for a language. Only explicitly provided fields are written.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LanguagePatch {
    #[serde(default)]
    pub language_code: Field<String>,
    #[serde(default)]
    pub language_code2: Field<Option<String>>,
    #[serde(default)]
    pub language_name: Field<String>,
    #[serde(default)]
    pub language_notes: Field<Option<String>>,
}

/// Payload for adding or updating a country/language association. On update
/// the language comes from the path, so `language_code` is only required for
/// the add form.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DetailInput {
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_official: bool,
    #[serde(default)]
    pub language_percentage: f64,
}

impl DetailInput {
    pub fn validate_for_add(&self) -> Result<(), AppError> {
        require("language_code", &self.language_code)?;
        Ok(())
    }
}
