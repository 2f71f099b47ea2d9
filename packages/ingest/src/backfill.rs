//! Geographic county backfill for unassigned sites.
//!
//! Replaces the old hand-maintained name→id mapping: a site with no
//! owning county is located by point-in-polygon against the boundary
//! set, the hit's `boundary_key` is resolved to the county's backend
//! key, and the assignment is pushed through the store.

use std::collections::HashMap;

use cancer_map_boundary::BoundarySet;
use cancer_map_health_models::{County, EnvSite};
use cancer_map_store::{RestStore, tables};

use crate::IngestError;

/// One planned site → county assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Backend key of the site to update.
    pub site_store_id: String,
    /// Backend key of the owning county.
    pub county_store_id: String,
    /// County name, for logging.
    pub county_name: String,
}

/// Plans assignments for every site lacking an owning county.
///
/// Sites already assigned are left alone. A site whose location falls
/// outside every boundary, or whose located county has no backend
/// key, is skipped with a log line.
#[must_use]
pub fn plan_assignments(
    sites: &[EnvSite],
    counties: &[County],
    boundaries: &BoundarySet,
) -> Vec<Assignment> {
    let store_ids_by_boundary_key: HashMap<&str, (&str, &str)> = counties
        .iter()
        .filter_map(|c| {
            c.store_id
                .as_deref()
                .map(|id| (c.boundary_key.as_str(), (id, c.name.as_str())))
        })
        .collect();

    let mut assignments = Vec::new();
    for site in sites {
        if site.county_store_id.is_some() {
            continue;
        }
        let Some(boundary) = boundaries.locate(site.location.longitude, site.location.latitude)
        else {
            log::warn!(
                "Site {:?} ({}, {}) is outside every county boundary",
                site.name,
                site.location.longitude,
                site.location.latitude
            );
            continue;
        };
        let Some((county_store_id, county_name)) =
            store_ids_by_boundary_key.get(boundary.boundary_key.as_str())
        else {
            log::warn!(
                "Site {:?} falls in {:?}, which has no backend record",
                site.name,
                boundary.name
            );
            continue;
        };
        assignments.push(Assignment {
            site_store_id: site.store_id.clone(),
            county_store_id: (*county_store_id).to_string(),
            county_name: (*county_name).to_string(),
        });
    }

    assignments
}

/// Applies planned assignments through the store, one update per site.
///
/// # Errors
///
/// Returns [`IngestError`] on the first failed update.
pub async fn apply_assignments(
    store: &RestStore,
    assignments: &[Assignment],
) -> Result<usize, IngestError> {
    for assignment in assignments {
        store
            .update(
                tables::SITES,
                &assignment.site_store_id,
                &serde_json::json!({ "county_id": assignment.county_store_id }),
            )
            .await?;
        log::info!(
            "Assigned site {} to {}",
            assignment.site_store_id,
            assignment.county_name
        );
    }
    Ok(assignments.len())
}

#[cfg(test)]
mod tests {
    use cancer_map_health_models::{GeoPoint, RiskLevel, SiteCategory};

    use super::*;

    fn boundaries() -> BoundarySet {
        BoundarySet::parse(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": { "OBJECTID": 1, "CNTY_NM": "Harris" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-95.5,29.5],[-95.0,29.5],[-95.0,30.0],[-95.5,30.0],[-95.5,29.5]]]
                    }
                }]
            }"#,
        )
        .unwrap()
    }

    fn county(store_id: &str, boundary_key: &str, name: &str) -> County {
        County {
            store_id: Some(store_id.to_string()),
            boundary_key: boundary_key.to_string(),
            name: name.to_string(),
            population: 0,
            incidence_rate: 0.0,
            mortality_rate: 0.0,
            avg_annual_deaths: 0.0,
            recent_trend: 0.0,
            poverty_rate: 0.0,
            healthcare_access: 0.0,
            pollution_level: 0.0,
        }
    }

    fn site(store_id: &str, assigned: Option<&str>, longitude: f64, latitude: f64) -> EnvSite {
        EnvSite {
            store_id: store_id.to_string(),
            county_store_id: assigned.map(ToString::to_string),
            name: format!("Site {store_id}"),
            city: None,
            category: SiteCategory::ChemicalPlant,
            risk_level: RiskLevel::High,
            description: None,
            location: GeoPoint {
                longitude,
                latitude,
            },
        }
    }

    #[test]
    fn assigns_unassigned_site_inside_boundary() {
        let counties = vec![county("c1", "1", "Harris")];
        let sites = vec![site("s1", None, -95.25, 29.75)];
        let plan = plan_assignments(&sites, &counties, &boundaries());
        assert_eq!(
            plan,
            vec![Assignment {
                site_store_id: "s1".to_string(),
                county_store_id: "c1".to_string(),
                county_name: "Harris".to_string(),
            }]
        );
    }

    #[test]
    fn leaves_assigned_sites_alone() {
        let counties = vec![county("c1", "1", "Harris")];
        let sites = vec![site("s1", Some("c1"), -95.25, 29.75)];
        assert!(plan_assignments(&sites, &counties, &boundaries()).is_empty());
    }

    #[test]
    fn skips_sites_outside_every_boundary() {
        let counties = vec![county("c1", "1", "Harris")];
        let sites = vec![site("s1", None, -90.0, 25.0)];
        assert!(plan_assignments(&sites, &counties, &boundaries()).is_empty());
    }

    #[test]
    fn skips_counties_without_backend_record() {
        // The boundary exists but no county row carries its key.
        let counties = vec![county("c1", "99", "Elsewhere")];
        let sites = vec![site("s1", None, -95.25, 29.75)];
        assert!(plan_assignments(&sites, &counties, &boundaries()).is_empty());
    }
}
