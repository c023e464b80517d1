//! Domain models, search filters, and input carriers for the world dataset.

pub mod city;
pub mod country;
pub mod field;
pub mod language;

pub use city::{City, CityFilter, CityInput, CityPatch, CountryRef};
pub use country::{CityRef, Country, CountryFilter, CountryInput, CountryPatch};
pub use field::Field;
pub use language::{
    CountryLanguage, CountryLanguageDetail, DetailInput, Language, LanguageCountryDetail,
    LanguageFilter, LanguageInput, LanguagePatch, LanguageRef,
};

use regex::Regex;
use std::sync::OnceLock;

/// Country and language identifiers accept both alternate forms: 2 or 3
/// ASCII letters. Everything else is rejected before reaching the service.
pub fn is_valid_code(code: &str) -> bool {
    static CODE: OnceLock<Regex> = OnceLock::new();
    CODE.get_or_init(|| Regex::new("^[A-Za-z]{2,3}$").expect("static pattern"))
        .is_match(code)
}
