#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! County boundary polygons and point-in-polygon attribution.
//!
//! Loads the county `GeoJSON` FeatureCollection, keeps each feature's
//! stable join key (the `OBJECTID` property) and display name, and
//! builds an R-tree index for fast point-in-polygon lookups. The
//! index is how unassigned environmental sites get attributed to
//! their owning county during ingest.
//!
//! Geographic parsing stops at "consume a feature collection": a
//! feature with a missing join key or an unusable geometry is skipped
//! with a warning, never an error.

use std::collections::BTreeMap;
use std::path::Path;

use geo::{BoundingRect, Contains, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use rstar::{AABB, RTree, RTreeObject};
use thiserror::Error;

/// Property carrying the stable county join key.
pub const KEY_PROPERTY: &str = "OBJECTID";
/// Property carrying the county display name.
pub const NAME_PROPERTY: &str = "CNTY_NM";

/// Errors that can occur while loading boundary data.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Reading the boundary file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `GeoJSON` is valid but not a FeatureCollection.
    #[error("expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// One county polygon with its join key and display name.
#[derive(Debug)]
pub struct CountyBoundary {
    /// Stable join key matching `County::boundary_key`.
    pub boundary_key: String,
    /// County display name.
    pub name: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for CountyBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// All county boundaries with an R-tree spatial index.
#[derive(Debug)]
pub struct BoundarySet {
    tree: RTree<CountyBoundary>,
    names: BTreeMap<String, String>,
}

impl BoundarySet {
    /// Loads boundaries from a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the file cannot be read or is not
    /// a `GeoJSON` FeatureCollection. Individual malformed features
    /// are skipped with a warning instead.
    pub fn load(path: &Path) -> Result<Self, BoundaryError> {
        let raw = std::fs::read_to_string(path)?;
        let collection = Self::parse(&raw)?;
        log::info!(
            "Loaded {} county boundaries from {}",
            collection.tree.size(),
            path.display()
        );
        Ok(collection)
    }

    /// Parses boundaries from a `GeoJSON` string.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the input is not a `GeoJSON`
    /// FeatureCollection.
    pub fn parse(raw: &str) -> Result<Self, BoundaryError> {
        let geojson: GeoJson = raw.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(BoundaryError::NotFeatureCollection);
        };
        Ok(Self::from_features(&collection))
    }

    fn from_features(collection: &FeatureCollection) -> Self {
        let mut entries = Vec::new();
        let mut names = BTreeMap::new();

        for feature in &collection.features {
            let Some(boundary_key) = property_string(feature, KEY_PROPERTY) else {
                log::warn!("Skipping boundary feature without {KEY_PROPERTY}");
                continue;
            };
            let name = property_string(feature, NAME_PROPERTY).unwrap_or_default();

            let Some(polygon) = feature
                .geometry
                .as_ref()
                .and_then(|g| to_multipolygon(g.clone()))
            else {
                log::warn!("Skipping boundary {boundary_key}: unusable geometry");
                continue;
            };

            let envelope = compute_envelope(&polygon);
            names.insert(boundary_key.clone(), name.clone());
            entries.push(CountyBoundary {
                boundary_key,
                name,
                envelope,
                polygon,
            });
        }

        Self {
            tree: RTree::bulk_load(entries),
            names,
        }
    }

    /// Number of loaded boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether no boundaries were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// County display name for a join key.
    #[must_use]
    pub fn name(&self, boundary_key: &str) -> Option<&str> {
        self.names.get(boundary_key).map(String::as_str)
    }

    /// All join keys present in the boundary source.
    pub fn boundary_keys(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Finds the county containing a point.
    ///
    /// Counties tile the state without overlap, so the first polygon
    /// containing the point wins.
    #[must_use]
    pub fn locate(&self, longitude: f64, latitude: f64) -> Option<&CountyBoundary> {
        let point = geo::Point::new(longitude, latitude);
        let query = AABB::from_point([longitude, latitude]);
        self.tree
            .locate_in_envelope_intersecting(&query)
            .find(|entry| entry.polygon.contains(&point))
    }

    /// Bounding box over all boundaries as
    /// `(west, south, east, north)`, for the initial map viewport.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        let mut iter = self.tree.iter();
        let first = iter.next()?;
        let mut west = first.envelope.lower()[0];
        let mut south = first.envelope.lower()[1];
        let mut east = first.envelope.upper()[0];
        let mut north = first.envelope.upper()[1];
        for entry in iter {
            west = west.min(entry.envelope.lower()[0]);
            south = south.min(entry.envelope.lower()[1]);
            east = east.max(entry.envelope.upper()[0]);
            north = north.max(entry.envelope.upper()[1]);
        }
        Some((west, south, east, north))
    }
}

/// Reads a feature property as a string, accepting numeric values
/// (the boundary source stores `OBJECTID` as a number).
fn property_string(feature: &geojson::Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`]. Handles
/// both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Computes the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
