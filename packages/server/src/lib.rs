#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the cancer map application.
//!
//! Serves the REST API for county statistics, environmental sites,
//! resolved choropleth overlays, and the county boundary `GeoJSON` for
//! the frontend map. Data is fetched from the hosted backend into
//! immutable snapshots; every handler reads the most recently admitted
//! snapshot, never the backend directly.

mod admin;
mod handlers;

use std::sync::{Arc, RwLock};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};

use cancer_map_atlas::{AtlasView, Snapshot};
use cancer_map_boundary::BoundarySet;
use cancer_map_store::{RestStore, SnapshotLoader, StoreConfig};

/// A snapshot together with its joined view, swapped in atomically.
#[derive(Debug, Default)]
pub struct MapData {
    /// The raw collections as fetched.
    pub snapshot: Snapshot,
    /// The joined county/site/carcinogen view.
    pub view: AtlasView,
}

/// The currently applied [`MapData`], guarded against out-of-order
/// application of overlapping fetches.
#[derive(Debug, Default)]
pub struct MapDataCell {
    data: RwLock<Arc<MapData>>,
}

impl MapDataCell {
    /// The currently applied snapshot and view.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn current(&self) -> Arc<MapData> {
        self.data.read().expect("map data lock poisoned").clone()
    }

    /// Applies a snapshot unless one with an equal or newer sequence
    /// is already current. The sequence comparison and the swap happen
    /// under the same write lock, so two overlapping refreshes cannot
    /// land out of order.
    ///
    /// Returns `false` when the snapshot was superseded while in
    /// flight; the fetched data is discarded unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn apply(&self, snapshot: Snapshot) -> bool {
        let view = AtlasView::build(&snapshot);
        let data = Arc::new(MapData { snapshot, view });

        let mut current = self.data.write().expect("map data lock poisoned");
        if data.snapshot.sequence <= current.snapshot.sequence {
            log::debug!(
                "Discarding superseded snapshot {} (current: {})",
                data.snapshot.sequence,
                current.snapshot.sequence
            );
            return false;
        }

        log::info!(
            "Applying snapshot {} with {} records",
            data.snapshot.sequence,
            data.snapshot.record_count()
        );
        *current = data;
        true
    }
}

/// Shared application state.
pub struct AppState {
    /// Snapshot fetcher; its store client also serves admin mutations.
    pub loader: SnapshotLoader,
    /// County boundary polygons with their spatial index.
    pub boundaries: BoundarySet,
    /// The boundary file verbatim, served to the frontend.
    pub boundary_raw: String,
    data: MapDataCell,
}

impl AppState {
    /// The currently applied snapshot and view.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn data(&self) -> Arc<MapData> {
        self.data.current()
    }

    /// Fetches a fresh snapshot and applies it if it is still current.
    ///
    /// Returns `false` when a newer snapshot was applied while this
    /// fetch was in flight; the fetched data is discarded unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub async fn refresh(&self) -> bool {
        let snapshot = self.loader.load().await;
        self.data.apply(snapshot)
    }
}

/// Starts the cancer map API server.
///
/// Reads backend settings from `CANCER_MAP_STORE_URL` and
/// `CANCER_MAP_STORE_KEY`, loads the county boundary file from
/// `BOUNDARY_PATH`, fetches the initial snapshot, and starts the
/// Actix-Web HTTP server. This is a regular async function — the
/// caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the boundary file cannot be
/// read or the HTTP server fails to bind.
///
/// # Panics
///
/// Panics if `CANCER_MAP_STORE_URL` is unset or the boundary file
/// fails to parse.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = StoreConfig::from_env().expect("CANCER_MAP_STORE_URL must be set");
    let store = RestStore::new(config);

    let boundary_path = std::env::var("BOUNDARY_PATH")
        .unwrap_or_else(|_| "data/texas-counties.geojson".to_string());
    log::info!("Loading county boundaries from {boundary_path}...");
    let boundary_raw = std::fs::read_to_string(&boundary_path)?;
    let boundaries =
        BoundarySet::parse(&boundary_raw).expect("Failed to parse county boundary file");
    log::info!("Loaded {} county boundaries", boundaries.len());

    let state = web::Data::new(AppState {
        loader: SnapshotLoader::new(store),
        boundaries,
        boundary_raw,
        data: MapDataCell::default(),
    });

    log::info!("Fetching initial snapshot...");
    state.refresh().await;

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/counties", web::get().to(handlers::counties))
                    .route("/counties/{boundary_key}", web::get().to(handlers::county))
                    .route("/carcinogens", web::get().to(handlers::carcinogens))
                    .route("/cancers", web::get().to(handlers::cancers))
                    .route("/overlays", web::get().to(handlers::overlays))
                    .route("/overlay", web::get().to(handlers::overlay))
                    .route("/boundaries", web::get().to(handlers::boundaries))
                    .route("/bounds", web::get().to(handlers::bounds))
                    .route("/refresh", web::post().to(handlers::refresh))
                    .route("/admin/{table}", web::post().to(admin::create))
                    .route("/admin/{table}/{id}", web::put().to(admin::update))
                    .route("/admin/{table}/{id}", web::delete().to(admin::remove)),
            )
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_sequence(sequence: u64) -> Snapshot {
        Snapshot {
            sequence,
            ..Snapshot::default()
        }
    }

    #[test]
    fn cell_applies_snapshots_in_sequence_order() {
        let cell = MapDataCell::default();
        assert!(cell.apply(snapshot_with_sequence(1)));
        assert!(cell.apply(snapshot_with_sequence(2)));
        assert_eq!(cell.current().snapshot.sequence, 2);
    }

    #[test]
    fn cell_discards_stale_snapshot_that_resolves_last() {
        let cell = MapDataCell::default();
        // Fetch 2 started later but its response landed first.
        assert!(cell.apply(snapshot_with_sequence(2)));
        // Fetch 1 resolves afterwards and must not clobber it.
        assert!(!cell.apply(snapshot_with_sequence(1)));
        assert!(!cell.apply(snapshot_with_sequence(2)));
        assert_eq!(cell.current().snapshot.sequence, 2);
    }
}
