#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! County, environmental site, and carcinogen entity types.
//!
//! These are the raw records as delivered by the hosted relational
//! backend. Field names mirror the backend columns (snake_case JSON),
//! with one deliberate exception: a county carries two explicit,
//! never-interchanged identifiers — the backend primary key
//! (`store_id`) and the stable join key used by the geographic
//! boundary source (`boundary_key`). Every join declares which of the
//! two it uses.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Risk classification for an environmental site.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    /// Minimal documented exposure risk.
    Low,
    /// Elevated but localized exposure risk.
    Medium,
    /// Significant documented exposure risk.
    High,
}

/// Facility category for an environmental site.
///
/// The backend stores this as free text, so unknown values are
/// tolerated on read rather than rejected.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SiteCategory {
    /// Coal, gas, or nuclear power generation.
    PowerPlant,
    /// Municipal or industrial waste landfill.
    Landfill,
    /// Chemical manufacturing or processing.
    ChemicalPlant,
    /// Surface or subsurface mining operation.
    Mining,
    /// General heavy industry.
    Industrial,
    /// Category value not in the known set.
    #[serde(other)]
    Unknown,
}

impl std::str::FromStr for SiteCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "power_plant" => Self::PowerPlant,
            "landfill" => Self::Landfill,
            "chemical_plant" => Self::ChemicalPlant,
            "mining" => Self::Mining,
            "industrial" => Self::Industrial,
            _ => Self::Unknown,
        })
    }
}

impl SiteCategory {
    /// Returns all known (non-`Unknown`) variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PowerPlant,
            Self::Landfill,
            Self::ChemicalPlant,
            Self::Mining,
            Self::Industrial,
        ]
    }
}

/// A geographic point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

/// A Texas county with its public-health and environmental statistics.
///
/// Numeric attributes default to zero when absent from the backend;
/// a missing value is therefore indistinguishable from a true zero.
/// Downstream consumers (min/max scans, color scales) treat the two
/// identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct County {
    /// Backend primary key. `None` for counties that exist only in the
    /// boundary file and have not been persisted yet.
    #[serde(rename = "id")]
    pub store_id: Option<String>,
    /// Stable join key matching the boundary source's feature property
    /// (the `OBJECTID` of the county polygon). NOT the backend key.
    pub boundary_key: String,
    /// Display name, without the "County" suffix.
    pub name: String,
    /// Resident population.
    #[serde(default)]
    pub population: u64,
    /// Age-adjusted cancer incidence rate per 100,000.
    #[serde(default)]
    pub incidence_rate: f64,
    /// Age-adjusted cancer mortality rate per 100,000.
    #[serde(default)]
    pub mortality_rate: f64,
    /// Average annual cancer deaths.
    #[serde(default)]
    pub avg_annual_deaths: f64,
    /// Recent 5-year incidence trend, percent per year. May be negative.
    #[serde(default)]
    pub recent_trend: f64,
    /// Percentage of residents below the poverty line.
    #[serde(default)]
    pub poverty_rate: f64,
    /// Percentage of residents with healthcare access.
    #[serde(default)]
    pub healthcare_access: f64,
    /// Composite environmental pollution index, 0-100.
    #[serde(default)]
    pub pollution_level: f64,
}

/// An environmental facility located within (at most) one county.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSite {
    /// Backend primary key.
    #[serde(rename = "id")]
    pub store_id: String,
    /// Backend key of the owning county. Unassigned sites exist; the
    /// ingest backfill resolves them geographically.
    #[serde(rename = "county_id")]
    pub county_store_id: Option<String>,
    /// Site name.
    #[serde(rename = "site_name")]
    pub name: String,
    /// Nearest city, for display.
    pub city: Option<String>,
    /// Facility category.
    #[serde(rename = "type")]
    pub category: SiteCategory,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Free-text description.
    pub description: Option<String>,
    /// Site location.
    #[serde(flatten)]
    pub location: GeoPoint,
}

/// A substance or exposure associated with cancer risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carcinogen {
    /// Backend primary key.
    #[serde(rename = "id")]
    pub store_id: String,
    /// Substance name.
    pub name: String,
    /// Substance class (e.g. "heavy metal", "VOC").
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Known health effects, free text.
    pub effects: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// A distinct cancer diagnosis category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancerType {
    /// Backend primary key.
    #[serde(rename = "id")]
    pub store_id: String,
    /// Diagnosis category name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// Many-to-many association between a carcinogen and a cancer type.
///
/// The backend does not enforce uniqueness on the pair, so
/// `(carcinogen_id, cancer_id)` is treated as a logical composite key
/// and deduplicated on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarcinogenCancerLink {
    /// Backend primary key of the link row itself.
    #[serde(rename = "id")]
    pub store_id: String,
    /// Backend key of the carcinogen.
    pub carcinogen_id: String,
    /// Backend key of the cancer type.
    pub cancer_id: String,
    /// Free-text annotation on the association.
    pub description: Option<String>,
}

/// Many-to-many association between a site and a carcinogen present
/// there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCarcinogenLink {
    /// Backend primary key of the link row itself.
    #[serde(rename = "id")]
    pub store_id: String,
    /// Backend key of the site.
    pub site_id: String,
    /// Backend key of the carcinogen.
    pub carcinogen_id: String,
    /// Free-text annotation on the association.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_category_parses_known_values() {
        assert_eq!(
            "chemical_plant".parse::<SiteCategory>().unwrap(),
            SiteCategory::ChemicalPlant
        );
        assert_eq!(
            "power_plant".parse::<SiteCategory>().unwrap(),
            SiteCategory::PowerPlant
        );
    }

    #[test]
    fn site_category_tolerates_unknown_values() {
        assert_eq!(
            "superfund".parse::<SiteCategory>().unwrap(),
            SiteCategory::Unknown
        );
        let site: EnvSite = serde_json::from_str(
            r#"{
                "id": "s1",
                "county_id": null,
                "site_name": "Test Site",
                "city": "Houston",
                "type": "superfund",
                "risk_level": "high",
                "description": null,
                "longitude": -95.1,
                "latitude": 29.8
            }"#,
        )
        .unwrap();
        assert_eq!(site.category, SiteCategory::Unknown);
    }

    #[test]
    fn risk_level_round_trips_through_strings() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            let s = level.to_string();
            assert_eq!(s.parse::<RiskLevel>().unwrap(), level);
        }
    }

    #[test]
    fn county_numeric_attributes_default_to_zero() {
        let county: County = serde_json::from_str(
            r#"{"id": "c1", "boundary_key": "42", "name": "Harris"}"#,
        )
        .unwrap();
        assert_eq!(county.population, 0);
        assert!(county.poverty_rate.abs() < f64::EPSILON);
        assert!(county.recent_trend.abs() < f64::EPSILON);
    }

    #[test]
    fn county_store_id_and_boundary_key_are_distinct_fields() {
        let county: County = serde_json::from_str(
            r#"{"id": "18eeec4c", "boundary_key": "101", "name": "Harris", "poverty_rate": 14.2}"#,
        )
        .unwrap();
        assert_eq!(county.store_id.as_deref(), Some("18eeec4c"));
        assert_eq!(county.boundary_key, "101");
    }
}
