#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Overlay value resolution and choropleth color mapping.
//!
//! An overlay is the numeric dimension currently coloring the county
//! map: either a plain county attribute (poverty rate, pollution
//! index, ...) or a presence count for a specific carcinogen or
//! cancer type. The [`OverlayKey`] sum type is decided once at the
//! API boundary; the resolver only ever sees a typed key, never a
//! prefix-matched string.
//!
//! [`resolve`] computes one value per county plus the observed
//! min/max; [`color`] turns a value and the dataset min/max into a
//! display color.

pub mod color;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use cancer_map_atlas::AtlasView;
use cancer_map_health_models::County;

pub use color::{Rgb, RegionStyle, Theme};

/// A plain numeric attribute of a county.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CountyMetric {
    /// Resident population.
    Population,
    /// Age-adjusted cancer incidence rate per 100,000.
    IncidenceRate,
    /// Age-adjusted cancer mortality rate per 100,000.
    MortalityRate,
    /// Average annual cancer deaths.
    AvgAnnualDeaths,
    /// Recent 5-year incidence trend, percent per year.
    RecentTrend,
    /// Percentage of residents below the poverty line.
    PovertyRate,
    /// Percentage of residents with healthcare access.
    HealthcareAccess,
    /// Composite environmental pollution index.
    PollutionLevel,
}

impl CountyMetric {
    /// Reads this metric's value from a county record.
    #[must_use]
    pub fn value_of(self, county: &County) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Population => county.population as f64,
            Self::IncidenceRate => county.incidence_rate,
            Self::MortalityRate => county.mortality_rate,
            Self::AvgAnnualDeaths => county.avg_annual_deaths,
            Self::RecentTrend => county.recent_trend,
            Self::PovertyRate => county.poverty_rate,
            Self::HealthcareAccess => county.healthcare_access,
            Self::PollutionLevel => county.pollution_level,
        }
    }

    /// Whether the metric reads inverted on the color scale. Higher
    /// healthcare access means lower risk, so its normalized position
    /// is flipped before coloring.
    #[must_use]
    pub const fn inverted(self) -> bool {
        matches!(self, Self::HealthcareAccess)
    }
}

/// The selected overlay, decided once at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum OverlayKey {
    /// A plain county attribute.
    Metric(CountyMetric),
    /// Occurrence count of the carcinogen with this backend id.
    CarcinogenCount(String),
    /// Occurrence count of the cancer type with this backend id.
    CancerCount(String),
}

impl OverlayKey {
    /// Prefix distinguishing carcinogen keys in the wire encoding.
    pub const CARCINOGEN_PREFIX: &'static str = "carcinogen:";
    /// Prefix distinguishing cancer-type keys in the wire encoding.
    pub const CANCER_PREFIX: &'static str = "cancer:";

    /// Parses the wire encoding of an overlay key.
    ///
    /// Accepts `"carcinogen:<id>"`, `"cancer:<id>"`, or a bare metric
    /// name. Anything else returns `None`, meaning "no overlay
    /// selected" — a malformed key is never an error. Carcinogen and
    /// cancer ids live in separate namespaces by construction of the
    /// prefixes.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(id) = raw.strip_prefix(Self::CARCINOGEN_PREFIX) {
            if id.is_empty() {
                return None;
            }
            return Some(Self::CarcinogenCount(id.to_string()));
        }
        if let Some(id) = raw.strip_prefix(Self::CANCER_PREFIX) {
            if id.is_empty() {
                return None;
            }
            return Some(Self::CancerCount(id.to_string()));
        }
        raw.parse::<CountyMetric>().ok().map(Self::Metric)
    }

    /// Whether this overlay's normalized position is flipped before
    /// coloring.
    #[must_use]
    pub const fn inverted(&self) -> bool {
        match self {
            Self::Metric(metric) => metric.inverted(),
            Self::CarcinogenCount(_) | Self::CancerCount(_) => false,
        }
    }

    /// The overlay's base (full-intensity) display color.
    #[must_use]
    pub fn base_color(&self) -> Rgb {
        match self {
            Self::Metric(CountyMetric::PovertyRate) => color::POVERTY_BASE,
            Self::Metric(CountyMetric::HealthcareAccess) => color::HEALTHCARE_BASE,
            Self::Metric(CountyMetric::PollutionLevel) => color::POLLUTION_BASE,
            Self::Metric(
                CountyMetric::MortalityRate
                | CountyMetric::IncidenceRate
                | CountyMetric::AvgAnnualDeaths
                | CountyMetric::RecentTrend,
            ) => color::MORTALITY_BASE,
            Self::Metric(CountyMetric::Population) => color::POPULATION_BASE,
            Self::CarcinogenCount(_) | Self::CancerCount(_) => color::EXPOSURE_BASE,
        }
    }
}

/// One overlay's resolved values across all counties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayResolution {
    /// Resolved value per county, keyed by boundary join key.
    pub values: BTreeMap<String, f64>,
    /// Minimum over values considered present (non-NaN, non-zero).
    pub min: f64,
    /// Maximum over values considered present.
    pub max: f64,
    /// Whether normalized positions are flipped before coloring.
    pub inverted: bool,
}

impl OverlayResolution {
    /// Looks up a county's resolved value by boundary key.
    #[must_use]
    pub fn value(&self, boundary_key: &str) -> Option<f64> {
        self.values.get(boundary_key).copied()
    }
}

/// Resolves an overlay to one value per county plus the observed
/// min/max.
///
/// Zero and NaN values are excluded from the min/max scan: a zero is
/// indistinguishable from "no data" in the source collections, so it
/// must not stretch the color scale. If nothing qualifies the range
/// defaults to `(0.0, 1.0)` to keep the scale non-degenerate.
#[must_use]
pub fn resolve(view: &AtlasView, key: &OverlayKey) -> OverlayResolution {
    let mut values = BTreeMap::new();

    for county_view in &view.counties {
        let value = match key {
            OverlayKey::Metric(metric) => metric.value_of(&county_view.county),
            OverlayKey::CarcinogenCount(id) => {
                let count: usize = county_view
                    .sites
                    .iter()
                    .flat_map(|s| &s.carcinogens)
                    .filter(|cv| cv.carcinogen.store_id == *id)
                    .map(|cv| cv.occurrences)
                    .sum();
                #[allow(clippy::cast_precision_loss)]
                {
                    count as f64
                }
            }
            OverlayKey::CancerCount(id) => {
                let count = county_view
                    .sites
                    .iter()
                    .flat_map(|s| &s.carcinogens)
                    .filter(|cv| cv.cancers.iter().any(|c| c.store_id == *id))
                    .count();
                #[allow(clippy::cast_precision_loss)]
                {
                    count as f64
                }
            }
        };
        values.insert(county_view.county.boundary_key.clone(), value);
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values.values() {
        if value.is_nan() || value == 0.0 {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
    }
    if min > max {
        min = 0.0;
        max = 1.0;
    }

    OverlayResolution {
        values,
        min,
        max,
        inverted: key.inverted(),
    }
}

#[cfg(test)]
mod tests {
    use cancer_map_atlas::Snapshot;
    use cancer_map_health_models::{
        CancerType, Carcinogen, CarcinogenCancerLink, County, EnvSite, GeoPoint, RiskLevel,
        SiteCarcinogenLink, SiteCategory,
    };

    use super::*;

    fn county(store_id: &str, boundary_key: &str, poverty_rate: f64) -> County {
        County {
            store_id: Some(store_id.to_string()),
            boundary_key: boundary_key.to_string(),
            name: format!("County {boundary_key}"),
            population: 0,
            incidence_rate: 0.0,
            mortality_rate: 0.0,
            avg_annual_deaths: 0.0,
            recent_trend: 0.0,
            poverty_rate,
            healthcare_access: 0.0,
            pollution_level: 0.0,
        }
    }

    fn site(store_id: &str, county_store_id: &str) -> EnvSite {
        EnvSite {
            store_id: store_id.to_string(),
            county_store_id: Some(county_store_id.to_string()),
            name: format!("Site {store_id}"),
            city: None,
            category: SiteCategory::Industrial,
            risk_level: RiskLevel::Medium,
            description: None,
            location: GeoPoint {
                longitude: -95.0,
                latitude: 29.7,
            },
        }
    }

    fn site_link(id: &str, site_id: &str, carcinogen_id: &str) -> SiteCarcinogenLink {
        SiteCarcinogenLink {
            store_id: id.to_string(),
            site_id: site_id.to_string(),
            carcinogen_id: carcinogen_id.to_string(),
            description: None,
        }
    }

    fn carcinogen(id: &str, name: &str) -> Carcinogen {
        Carcinogen {
            store_id: id.to_string(),
            name: name.to_string(),
            kind: None,
            effects: None,
            description: None,
        }
    }

    fn cancer_link(id: &str, carcinogen_id: &str, cancer_id: &str) -> CarcinogenCancerLink {
        CarcinogenCancerLink {
            store_id: id.to_string(),
            carcinogen_id: carcinogen_id.to_string(),
            cancer_id: cancer_id.to_string(),
            description: None,
        }
    }

    #[test]
    fn parses_metric_keys() {
        assert_eq!(
            OverlayKey::parse("poverty_rate"),
            Some(OverlayKey::Metric(CountyMetric::PovertyRate))
        );
        assert_eq!(
            OverlayKey::parse("healthcare_access"),
            Some(OverlayKey::Metric(CountyMetric::HealthcareAccess))
        );
    }

    #[test]
    fn parses_prefixed_keys_into_separate_namespaces() {
        assert_eq!(
            OverlayKey::parse("carcinogen:abc"),
            Some(OverlayKey::CarcinogenCount("abc".to_string()))
        );
        assert_eq!(
            OverlayKey::parse("cancer:abc"),
            Some(OverlayKey::CancerCount("abc".to_string()))
        );
        assert_ne!(
            OverlayKey::parse("carcinogen:abc"),
            OverlayKey::parse("cancer:abc")
        );
    }

    #[test]
    fn malformed_keys_parse_to_none() {
        assert_eq!(OverlayKey::parse("bogus_metric"), None);
        assert_eq!(OverlayKey::parse("carcinogen:"), None);
        assert_eq!(OverlayKey::parse(""), None);
    }

    #[test]
    fn healthcare_access_is_inverted() {
        assert!(OverlayKey::Metric(CountyMetric::HealthcareAccess).inverted());
        assert!(!OverlayKey::Metric(CountyMetric::PovertyRate).inverted());
        assert!(!OverlayKey::CarcinogenCount("x".to_string()).inverted());
    }

    #[test]
    fn plain_metric_resolves_values_and_range() {
        let snapshot = Snapshot {
            counties: vec![county("c1", "A", 10.0), county("c2", "B", 20.0)],
            ..Snapshot::default()
        };
        let view = AtlasView::build(&snapshot);
        let resolution = resolve(&view, &OverlayKey::Metric(CountyMetric::PovertyRate));
        assert!((resolution.value("A").unwrap() - 10.0).abs() < f64::EPSILON);
        assert!((resolution.value("B").unwrap() - 20.0).abs() < f64::EPSILON);
        assert!((resolution.min - 10.0).abs() < f64::EPSILON);
        assert!((resolution.max - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_values_are_excluded_from_min_max() {
        let snapshot = Snapshot {
            counties: vec![
                county("c1", "A", 0.0),
                county("c2", "B", 0.0),
                county("c3", "C", 5.0),
                county("c4", "D", 10.0),
            ],
            ..Snapshot::default()
        };
        let view = AtlasView::build(&snapshot);
        let resolution = resolve(&view, &OverlayKey::Metric(CountyMetric::PovertyRate));
        assert!((resolution.min - 5.0).abs() < f64::EPSILON);
        assert!((resolution.max - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn all_zero_values_fall_back_to_unit_range() {
        let snapshot = Snapshot {
            counties: vec![county("c1", "A", 0.0)],
            ..Snapshot::default()
        };
        let view = AtlasView::build(&snapshot);
        let resolution = resolve(&view, &OverlayKey::Metric(CountyMetric::PovertyRate));
        assert!(resolution.min.abs() < f64::EPSILON);
        assert!((resolution.max - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn carcinogen_count_counts_link_occurrences() {
        let snapshot = Snapshot {
            counties: vec![county("c1", "A", 0.0)],
            sites: vec![site("s1", "c1")],
            carcinogens: vec![carcinogen("k1", "Benzene")],
            // Two link rows for the same site/carcinogen pair.
            site_carcinogen_links: vec![site_link("l1", "s1", "k1"), site_link("l2", "s1", "k1")],
            ..Snapshot::default()
        };
        let view = AtlasView::build(&snapshot);
        let resolution = resolve(&view, &OverlayKey::CarcinogenCount("k1".to_string()));
        assert!((resolution.value("A").unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn carcinogen_count_sums_across_sites() {
        let snapshot = Snapshot {
            counties: vec![county("c1", "A", 0.0)],
            sites: vec![site("s1", "c1"), site("s2", "c1")],
            carcinogens: vec![carcinogen("k1", "Benzene")],
            site_carcinogen_links: vec![site_link("l1", "s1", "k1"), site_link("l2", "s2", "k1")],
            ..Snapshot::default()
        };
        let view = AtlasView::build(&snapshot);
        let resolution = resolve(&view, &OverlayKey::CarcinogenCount("k1".to_string()));
        assert!((resolution.value("A").unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cancer_count_counts_distinct_site_carcinogen_pairs() {
        // One cancer reachable through two carcinogens. Site s1 hosts
        // both carcinogens (with a duplicate link row for k1), site s2
        // hosts only k1.
        let snapshot = Snapshot {
            counties: vec![county("c1", "A", 0.0)],
            sites: vec![site("s1", "c1"), site("s2", "c1")],
            carcinogens: vec![carcinogen("k1", "Benzene"), carcinogen("k2", "Arsenic")],
            cancers: vec![CancerType {
                store_id: "ca1".to_string(),
                name: "Leukemia".to_string(),
                description: None,
            }],
            carcinogen_cancer_links: vec![
                cancer_link("cl1", "k1", "ca1"),
                cancer_link("cl2", "k2", "ca1"),
            ],
            site_carcinogen_links: vec![
                site_link("l1", "s1", "k1"),
                site_link("l2", "s1", "k1"),
                site_link("l3", "s1", "k2"),
                site_link("l4", "s2", "k1"),
            ],
            ..Snapshot::default()
        };
        let view = AtlasView::build(&snapshot);
        let resolution = resolve(&view, &OverlayKey::CancerCount("ca1".to_string()));
        // Pairs (s1, k1), (s1, k2), (s2, k1); the duplicate l2 row
        // does not add a fourth.
        assert!((resolution.value("A").unwrap() - 3.0).abs() < f64::EPSILON);
        assert!((resolution.min - 3.0).abs() < f64::EPSILON);
        assert!((resolution.max - 3.0).abs() < f64::EPSILON);
    }
}
