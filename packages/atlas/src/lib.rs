#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Immutable data snapshot and the county/site/carcinogen join engine.
//!
//! A [`Snapshot`] is one render pass's view of the six backend
//! collections, fetched together and never mutated afterwards. The
//! join engine ([`AtlasView::build`]) is a pure function over a
//! snapshot: it attaches every site to its owning county, every
//! carcinogen to its sites, and every cancer type to its carcinogens,
//! producing new derived structures without touching the inputs.
//!
//! Referential integrity is not guaranteed by the backend. A link that
//! references a missing entity is dropped silently; this leniency is
//! deliberate and covered by tests.

pub mod join;

use chrono::{DateTime, Utc};
use serde::Serialize;

use cancer_map_health_models::{
    CancerType, Carcinogen, CarcinogenCancerLink, County, EnvSite, SiteCarcinogenLink,
};

pub use join::AtlasView;

/// One render pass's immutable view of the backend collections.
///
/// Replaces the ambient per-collection caches of the original
/// application: consumers receive a snapshot explicitly instead of
/// reading shared mutable state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// All counties.
    pub counties: Vec<County>,
    /// All environmental sites.
    pub sites: Vec<EnvSite>,
    /// All carcinogens.
    pub carcinogens: Vec<Carcinogen>,
    /// All cancer types.
    pub cancers: Vec<CancerType>,
    /// Carcinogen ↔ cancer-type associations.
    pub carcinogen_cancer_links: Vec<CarcinogenCancerLink>,
    /// Site ↔ carcinogen associations.
    pub site_carcinogen_links: Vec<SiteCarcinogenLink>,
    /// Monotonically increasing fetch sequence number, assigned when
    /// the fetch started. Used to discard out-of-order responses.
    pub sequence: u64,
    /// When the fetch started.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Total number of records across all six collections.
    #[must_use]
    pub const fn record_count(&self) -> usize {
        self.counties.len()
            + self.sites.len()
            + self.carcinogens.len()
            + self.cancers.len()
            + self.carcinogen_cancer_links.len()
            + self.site_carcinogen_links.len()
    }
}

/// A carcinogen present at a site, with the cancer types it is
/// associated with (deduplicated by cancer type id).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarcinogenView {
    /// The carcinogen record.
    pub carcinogen: Carcinogen,
    /// Number of link rows attaching this carcinogen to this site.
    /// The display list is deduplicated, but overlay counts are per
    /// occurrence, so the multiplicity is preserved here.
    pub occurrences: usize,
    /// Associated cancer types, one entry per distinct cancer type.
    pub cancers: Vec<CancerType>,
}

/// A site with the carcinogens documented there (deduplicated by
/// carcinogen id).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteView {
    /// The site record.
    pub site: EnvSite,
    /// Carcinogens present at this site.
    pub carcinogens: Vec<CarcinogenView>,
}

/// A county annotated with all of its sites.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyView {
    /// The county record.
    pub county: County,
    /// Sites owned by this county. Empty if it owns none.
    pub sites: Vec<SiteView>,
}
