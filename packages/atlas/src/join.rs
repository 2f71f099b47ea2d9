//! The join engine: snapshot in, annotated county views out.
//!
//! Joins run in three passes, leaves first:
//!
//! 1. carcinogen id → deduplicated cancer-type list (via
//!    `carcinogen_cancer_links`)
//! 2. site id → deduplicated carcinogen list, each carrying the
//!    cancer-type list from pass 1 (via `site_carcinogen_links`)
//! 3. partition sites by owning county `store_id`
//!
//! Links whose referenced id resolves to no record are skipped. Sites
//! whose declared owning county does not exist are dropped. Every
//! county in the snapshot appears in the output.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use cancer_map_health_models::{CancerType, Carcinogen};

use crate::{CarcinogenView, CountyView, SiteView, Snapshot};

/// The joined, renderable view of one snapshot.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasView {
    /// One entry per county in the snapshot, in snapshot order.
    pub counties: Vec<CountyView>,
}

impl AtlasView {
    /// Builds the joined view from a snapshot.
    ///
    /// Pure: the snapshot is only read. Collections may be empty, and
    /// dangling links never cause an error.
    #[must_use]
    pub fn build(snapshot: &Snapshot) -> Self {
        let cancers_by_id: HashMap<&str, &CancerType> = snapshot
            .cancers
            .iter()
            .map(|c| (c.store_id.as_str(), c))
            .collect();

        let carcinogens_by_id: HashMap<&str, &Carcinogen> = snapshot
            .carcinogens
            .iter()
            .map(|c| (c.store_id.as_str(), c))
            .collect();

        // Pass 1: carcinogen id -> distinct cancer types.
        let mut cancers_by_carcinogen: HashMap<&str, Vec<CancerType>> = HashMap::new();
        let mut seen_pairs: HashSet<(&str, &str)> = HashSet::new();
        for link in &snapshot.carcinogen_cancer_links {
            if !carcinogens_by_id.contains_key(link.carcinogen_id.as_str()) {
                continue;
            }
            let Some(cancer) = cancers_by_id.get(link.cancer_id.as_str()) else {
                continue;
            };
            if seen_pairs.insert((link.carcinogen_id.as_str(), link.cancer_id.as_str())) {
                cancers_by_carcinogen
                    .entry(link.carcinogen_id.as_str())
                    .or_default()
                    .push((*cancer).clone());
            }
        }

        // Pass 2: site id -> distinct carcinogens with their cancers.
        // Duplicate link rows collapse into one view entry, but the
        // occurrence multiplicity is kept for overlay counting.
        let mut occurrence_counts: HashMap<(&str, &str), usize> = HashMap::new();
        let mut pair_order: Vec<(&str, &str)> = Vec::new();
        for link in &snapshot.site_carcinogen_links {
            if !carcinogens_by_id.contains_key(link.carcinogen_id.as_str()) {
                continue;
            }
            let pair = (link.site_id.as_str(), link.carcinogen_id.as_str());
            let count = occurrence_counts.entry(pair).or_insert(0);
            if *count == 0 {
                pair_order.push(pair);
            }
            *count += 1;
        }

        let mut carcinogens_by_site: HashMap<&str, Vec<CarcinogenView>> = HashMap::new();
        for (site_id, carcinogen_id) in pair_order {
            let Some(carcinogen) = carcinogens_by_id.get(carcinogen_id) else {
                continue;
            };
            carcinogens_by_site
                .entry(site_id)
                .or_default()
                .push(CarcinogenView {
                    carcinogen: (*carcinogen).clone(),
                    occurrences: occurrence_counts[&(site_id, carcinogen_id)],
                    cancers: cancers_by_carcinogen
                        .get(carcinogen_id)
                        .cloned()
                        .unwrap_or_default(),
                });
        }

        // Pass 3: partition sites by owning county store_id.
        let mut sites_by_county: BTreeMap<&str, Vec<SiteView>> = BTreeMap::new();
        let county_ids: HashSet<&str> = snapshot
            .counties
            .iter()
            .filter_map(|c| c.store_id.as_deref())
            .collect();
        for site in &snapshot.sites {
            let Some(county_id) = site.county_store_id.as_deref() else {
                continue;
            };
            if !county_ids.contains(county_id) {
                continue;
            }
            sites_by_county
                .entry(county_id)
                .or_default()
                .push(SiteView {
                    site: site.clone(),
                    carcinogens: carcinogens_by_site
                        .get(site.store_id.as_str())
                        .cloned()
                        .unwrap_or_default(),
                });
        }

        let counties = snapshot
            .counties
            .iter()
            .map(|county| CountyView {
                county: county.clone(),
                sites: county
                    .store_id
                    .as_deref()
                    .and_then(|id| sites_by_county.remove(id))
                    .unwrap_or_default(),
            })
            .collect();

        Self { counties }
    }

    /// Looks up a county view by its boundary join key.
    #[must_use]
    pub fn by_boundary_key(&self, boundary_key: &str) -> Option<&CountyView> {
        self.counties
            .iter()
            .find(|view| view.county.boundary_key == boundary_key)
    }

    /// Total number of sites attached across all counties.
    #[must_use]
    pub fn site_count(&self) -> usize {
        self.counties.iter().map(|c| c.sites.len()).sum()
    }
}
