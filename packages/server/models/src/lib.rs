#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the cancer map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the backend row types to allow independent evolution of the API
//! contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cancer_map_atlas::{CarcinogenView, CountyView, SiteView};
use cancer_map_health_models::{CancerType, Carcinogen, RiskLevel, SiteCategory};
use cancer_map_overlay::{RegionStyle, Rgb, Theme};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Sequence number of the snapshot currently serving requests.
    pub snapshot_sequence: u64,
    /// When that snapshot was fetched. `None` before the first load.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// A cancer diagnosis category as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCancer {
    /// Backend key.
    pub id: String,
    /// Diagnosis category name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
}

impl From<&CancerType> for ApiCancer {
    fn from(cancer: &CancerType) -> Self {
        Self {
            id: cancer.store_id.clone(),
            name: cancer.name.clone(),
            description: cancer.description.clone(),
        }
    }
}

/// A carcinogen as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCarcinogen {
    /// Backend key.
    pub id: String,
    /// Substance name.
    pub name: String,
    /// Substance class.
    pub kind: Option<String>,
    /// Known health effects.
    pub effects: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl From<&Carcinogen> for ApiCarcinogen {
    fn from(carcinogen: &Carcinogen) -> Self {
        Self {
            id: carcinogen.store_id.clone(),
            name: carcinogen.name.clone(),
            kind: carcinogen.kind.clone(),
            effects: carcinogen.effects.clone(),
            description: carcinogen.description.clone(),
        }
    }
}

/// A carcinogen attached to a site, with its linked cancer types.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSiteCarcinogen {
    /// The carcinogen itself.
    #[serde(flatten)]
    pub carcinogen: ApiCarcinogen,
    /// How many link rows attach it to this site.
    pub occurrences: usize,
    /// Cancer types associated with the carcinogen, deduplicated.
    pub cancers: Vec<ApiCancer>,
}

impl From<&CarcinogenView> for ApiSiteCarcinogen {
    fn from(view: &CarcinogenView) -> Self {
        Self {
            carcinogen: ApiCarcinogen::from(&view.carcinogen),
            occurrences: view.occurrences,
            cancers: view.cancers.iter().map(ApiCancer::from).collect(),
        }
    }
}

/// An environmental site as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSite {
    /// Backend key.
    pub id: String,
    /// Backend key of the owning county.
    pub county_id: Option<String>,
    /// Site name.
    pub name: String,
    /// Nearest city.
    pub city: Option<String>,
    /// Facility category.
    pub category: SiteCategory,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Free-text description.
    pub description: Option<String>,
    /// Longitude.
    pub longitude: f64,
    /// Latitude.
    pub latitude: f64,
    /// Carcinogens documented at this site.
    pub carcinogens: Vec<ApiSiteCarcinogen>,
}

impl From<&SiteView> for ApiSite {
    fn from(view: &SiteView) -> Self {
        Self {
            id: view.site.store_id.clone(),
            county_id: view.site.county_store_id.clone(),
            name: view.site.name.clone(),
            city: view.site.city.clone(),
            category: view.site.category,
            risk_level: view.site.risk_level,
            description: view.site.description.clone(),
            longitude: view.site.location.longitude,
            latitude: view.site.location.latitude,
            carcinogens: view.carcinogens.iter().map(ApiSiteCarcinogen::from).collect(),
        }
    }
}

/// A county with its statistics and joined sites.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCounty {
    /// Backend key. `None` for counties known only from the boundary
    /// file.
    pub id: Option<String>,
    /// Join key matching the boundary polygon's `OBJECTID`.
    pub boundary_key: String,
    /// Display name.
    pub name: String,
    /// Resident population.
    pub population: u64,
    /// Age-adjusted incidence rate per 100,000.
    pub incidence_rate: f64,
    /// Age-adjusted mortality rate per 100,000.
    pub mortality_rate: f64,
    /// Average annual cancer deaths.
    pub avg_annual_deaths: f64,
    /// Recent 5-year incidence trend, percent per year.
    pub recent_trend: f64,
    /// Percentage of residents below the poverty line.
    pub poverty_rate: f64,
    /// Percentage of residents with healthcare access.
    pub healthcare_access: f64,
    /// Composite pollution index.
    pub pollution_level: f64,
    /// Sites owned by this county.
    pub sites: Vec<ApiSite>,
}

impl From<&CountyView> for ApiCounty {
    fn from(view: &CountyView) -> Self {
        Self {
            id: view.county.store_id.clone(),
            boundary_key: view.county.boundary_key.clone(),
            name: view.county.name.clone(),
            population: view.county.population,
            incidence_rate: view.county.incidence_rate,
            mortality_rate: view.county.mortality_rate,
            avg_annual_deaths: view.county.avg_annual_deaths,
            recent_trend: view.county.recent_trend,
            poverty_rate: view.county.poverty_rate,
            healthcare_access: view.county.healthcare_access,
            pollution_level: view.county.pollution_level,
            sites: view.sites.iter().map(ApiSite::from).collect(),
        }
    }
}

/// Query parameters for the overlay endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayQueryParams {
    /// Overlay key wire encoding: a metric name, `carcinogen:<id>`,
    /// or `cancer:<id>`. Absent or unrecognized means no overlay.
    pub key: Option<String>,
    /// Display theme. Defaults to light.
    pub theme: Option<Theme>,
}

/// Resolved style for one county polygon.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegionStyle {
    /// Join key of the county polygon this style applies to.
    pub boundary_key: String,
    /// Resolved overlay value, if the county has one.
    pub value: Option<f64>,
    /// Polygon fill color.
    pub fill_color: Rgb,
    /// Polygon fill opacity.
    pub fill_opacity: f64,
    /// Border color.
    pub stroke_color: Rgb,
    /// Border weight in pixels.
    pub stroke_weight: f64,
}

impl ApiRegionStyle {
    /// Combines a join key, resolved value, and computed style.
    #[must_use]
    pub fn new(boundary_key: String, value: Option<f64>, style: RegionStyle) -> Self {
        Self {
            boundary_key,
            value,
            fill_color: style.fill_color,
            fill_opacity: style.fill_opacity,
            stroke_color: style.stroke_color,
            stroke_weight: style.stroke_weight,
        }
    }
}

/// Response from the overlay endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverlay {
    /// Echo of the requested key, or `None` when no overlay applied.
    pub key: Option<String>,
    /// Minimum resolved value across counties.
    pub min: f64,
    /// Maximum resolved value across counties.
    pub max: f64,
    /// Whether the color scale reads inverted.
    pub inverted: bool,
    /// One style per county polygon in the boundary file.
    pub regions: Vec<ApiRegionStyle>,
}

/// One selectable overlay in the overlays listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverlayOption {
    /// Wire encoding to pass back as the overlay `key` parameter.
    pub key: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the color scale reads inverted for this overlay.
    pub inverted: bool,
}

#[cfg(test)]
mod tests {
    use cancer_map_atlas::SiteView;
    use cancer_map_health_models::{EnvSite, GeoPoint};

    use super::*;

    #[test]
    fn site_view_flattens_location() {
        let view = SiteView {
            site: EnvSite {
                store_id: "s1".to_string(),
                county_store_id: Some("c1".to_string()),
                name: "Plant".to_string(),
                city: None,
                category: SiteCategory::PowerPlant,
                risk_level: RiskLevel::Medium,
                description: None,
                location: GeoPoint {
                    longitude: -97.5,
                    latitude: 31.0,
                },
            },
            carcinogens: vec![],
        };

        let api = ApiSite::from(&view);
        assert_eq!(api.longitude, -97.5);
        assert_eq!(api.latitude, 31.0);

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["countyId"], "c1");
        assert_eq!(json["riskLevel"], "medium");
    }

    #[test]
    fn region_style_serializes_colors_as_hex() {
        let style = ApiRegionStyle::new(
            "42".to_string(),
            Some(3.0),
            RegionStyle {
                fill_color: Rgb::new(0xf8, 0x71, 0x71),
                fill_opacity: 0.5,
                stroke_color: Rgb::new(0xff, 0xff, 0xff),
                stroke_weight: 1.0,
            },
        );

        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["boundaryKey"], "42");
        assert_eq!(json["fillColor"], "#f87171");
        assert_eq!(json["strokeColor"], "#ffffff");
    }
}
