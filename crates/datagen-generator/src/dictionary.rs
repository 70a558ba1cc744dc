//! Built-in dictionaries embedded in the binary.
//!
//! Each dictionary is a `;`-separated CSV file with a header line:
//!
//! | Dictionary                | Columns                                    |
//! |---------------------------|--------------------------------------------|
//! | `cities.csv`              | `name;lat;long;country;population`         |
//! | `names.csv`               | `first_name;country;male;female;unisex`    |
//! | `phone-country-codes.csv` | `indicator;country`                        |

use crate::error::GeneratorError;
use datagen_core::{City, PersonName};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

const CITIES: &str = include_str!("../resources/cities.csv");
const NAMES: &str = include_str!("../resources/names.csv");
const PHONE_CODES: &str = include_str!("../resources/phone-country-codes.csv");

#[derive(Debug, Deserialize)]
struct CityRecord {
    name: String,
    lat: String,
    long: String,
    country: String,
    population: u64,
}

#[derive(Debug, Deserialize)]
struct NameRecord {
    first_name: String,
    country: String,
    male: bool,
    female: bool,
    unisex: bool,
}

/// A phone indicator and the country it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhoneCode {
    pub indicator: String,
    pub country: String,
}

fn parse<T: DeserializeOwned>(name: &'static str, data: &str) -> Result<Vec<T>, GeneratorError> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes())
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| GeneratorError::Dictionary { name, source })
}

/// All cities.
pub fn cities() -> Result<Vec<Arc<City>>, GeneratorError> {
    Ok(parse::<CityRecord>("cities", CITIES)?
        .into_iter()
        .map(|r| {
            Arc::new(City {
                name: r.name,
                latitude: r.lat,
                longitude: r.long,
                country: r.country,
                population: r.population,
            })
        })
        .collect())
}

/// All first names.
pub fn names() -> Result<Vec<Arc<PersonName>>, GeneratorError> {
    Ok(parse::<NameRecord>("names", NAMES)?
        .into_iter()
        .map(|r| {
            Arc::new(PersonName {
                first_name: r.first_name,
                country: r.country,
                male: r.male,
                female: r.female,
                unisex: r.unisex,
            })
        })
        .collect())
}

/// All phone indicators.
pub fn phone_codes() -> Result<Vec<PhoneCode>, GeneratorError> {
    parse("phone-country-codes", PHONE_CODES)
}

/// Distinct countries of the city dictionary, in first-appearance order.
pub fn countries() -> Result<Vec<String>, GeneratorError> {
    let mut countries: Vec<String> = Vec::new();
    for city in cities()? {
        if !countries.iter().any(|c| c == &city.country) {
            countries.push(city.country.clone());
        }
    }
    Ok(countries)
}

/// Keep the entries whose country is listed in `filters`, ignoring case.
///
/// Returns `None` when there are no filters or nothing matches, in which
/// case callers use the whole dictionary.
pub fn filter_by_country<T: Clone>(
    entries: &[T],
    filters: &[String],
    country: impl Fn(&T) -> &str,
) -> Option<Vec<T>> {
    if filters.is_empty() {
        return None;
    }
    let kept: Vec<T> = entries
        .iter()
        .filter(|entry| {
            let country = country(*entry);
            filters.iter().any(|f| f.trim().eq_ignore_ascii_case(country))
        })
        .cloned()
        .collect();
    (!kept.is_empty()).then_some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionaries_load() {
        let cities = cities().unwrap();
        assert!(cities.len() > 50);
        assert!(cities.iter().all(|c| c.population > 0));
        assert!(cities.iter().any(|c| c.name == "Paris" && c.country == "France"));

        let names = names().unwrap();
        assert!(names.iter().any(|n| n.first_name == "Camille" && n.unisex));

        let codes = phone_codes().unwrap();
        assert!(codes.contains(&PhoneCode {
            indicator: "33".to_string(),
            country: "France".to_string()
        }));
    }

    #[test]
    fn test_countries_are_distinct() {
        let countries = countries().unwrap();
        assert_eq!(countries[0], "France");
        let mut sorted = countries.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), countries.len());
    }

    #[test]
    fn test_filter_by_country() {
        let cities = cities().unwrap();
        let by_country = |filters: &[&str]| {
            let filters: Vec<String> = filters.iter().map(|f| f.to_string()).collect();
            filter_by_country(&cities, &filters, |c| c.country.as_str())
        };

        let french = by_country(&["france"]).unwrap();
        assert!(!french.is_empty());
        assert!(french.iter().all(|c| c.country == "France"));

        assert!(by_country(&[]).is_none());
        assert!(by_country(&["Atlantis"]).is_none());
    }
}
