//! HTTP handler functions for the cancer map API.

use actix_web::{HttpResponse, web};
use strum::IntoEnumIterator as _;

use cancer_map_overlay::{CountyMetric, OverlayKey, RegionStyle, resolve};
use cancer_map_server_models::{
    ApiCancer, ApiCarcinogen, ApiCounty, ApiHealth, ApiOverlay, ApiOverlayOption, ApiRegionStyle,
    OverlayQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let data = state.data();
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        snapshot_sequence: data.snapshot.sequence,
        fetched_at: data.snapshot.fetched_at,
    })
}

/// `GET /api/counties`
///
/// Returns every county with its statistics and joined sites.
pub async fn counties(state: web::Data<AppState>) -> HttpResponse {
    let data = state.data();
    let counties: Vec<ApiCounty> = data.view.counties.iter().map(ApiCounty::from).collect();
    HttpResponse::Ok().json(counties)
}

/// `GET /api/counties/{boundary_key}`
///
/// Looks a county up by its boundary join key, not its backend key.
pub async fn county(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let boundary_key = path.into_inner();
    let data = state.data();
    data.view.by_boundary_key(&boundary_key).map_or_else(
        || {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("No county with boundary key {boundary_key}")
            }))
        },
        |view| HttpResponse::Ok().json(ApiCounty::from(view)),
    )
}

/// `GET /api/carcinogens`
pub async fn carcinogens(state: web::Data<AppState>) -> HttpResponse {
    let data = state.data();
    let carcinogens: Vec<ApiCarcinogen> = data
        .snapshot
        .carcinogens
        .iter()
        .map(ApiCarcinogen::from)
        .collect();
    HttpResponse::Ok().json(carcinogens)
}

/// `GET /api/cancers`
pub async fn cancers(state: web::Data<AppState>) -> HttpResponse {
    let data = state.data();
    let cancers: Vec<ApiCancer> = data.snapshot.cancers.iter().map(ApiCancer::from).collect();
    HttpResponse::Ok().json(cancers)
}

/// `GET /api/overlays`
///
/// Lists every selectable overlay: the fixed county metrics plus one
/// entry per carcinogen and cancer type in the current snapshot.
pub async fn overlays(state: web::Data<AppState>) -> HttpResponse {
    let data = state.data();

    let mut options: Vec<ApiOverlayOption> = CountyMetric::iter()
        .map(|metric| ApiOverlayOption {
            key: metric.to_string(),
            name: metric_label(metric).to_string(),
            inverted: metric.inverted(),
        })
        .collect();

    options.extend(data.snapshot.carcinogens.iter().map(|c| ApiOverlayOption {
        key: format!("{}{}", OverlayKey::CARCINOGEN_PREFIX, c.store_id),
        name: c.name.clone(),
        inverted: false,
    }));
    options.extend(data.snapshot.cancers.iter().map(|c| ApiOverlayOption {
        key: format!("{}{}", OverlayKey::CANCER_PREFIX, c.store_id),
        name: c.name.clone(),
        inverted: false,
    }));

    HttpResponse::Ok().json(options)
}

/// `GET /api/overlay?key=...&theme=...`
///
/// Resolves the requested overlay and returns one style per county
/// polygon in the boundary file. A missing or unrecognized key means
/// no overlay: every polygon gets the neutral style.
pub async fn overlay(
    state: web::Data<AppState>,
    params: web::Query<OverlayQueryParams>,
) -> HttpResponse {
    let theme = params.theme.unwrap_or_default();
    let data = state.data();

    let Some(key) = params.key.as_deref().and_then(OverlayKey::parse) else {
        let regions: Vec<ApiRegionStyle> = state
            .boundaries
            .boundary_keys()
            .map(|bk| ApiRegionStyle::new(bk.to_string(), None, RegionStyle::neutral(theme)))
            .collect();
        return HttpResponse::Ok().json(ApiOverlay {
            key: None,
            min: 0.0,
            max: 1.0,
            inverted: false,
            regions,
        });
    };

    let resolution = resolve(&data.view, &key);
    let base = key.base_color();
    let regions: Vec<ApiRegionStyle> = state
        .boundaries
        .boundary_keys()
        .map(|bk| {
            let value = resolution.values.get(bk).copied();
            ApiRegionStyle::new(
                bk.to_string(),
                value,
                RegionStyle::overlaid(value, &resolution, base, theme),
            )
        })
        .collect();

    HttpResponse::Ok().json(ApiOverlay {
        key: params.key.clone(),
        min: resolution.min,
        max: resolution.max,
        inverted: resolution.inverted,
        regions,
    })
}

/// `GET /api/boundaries`
///
/// Serves the county boundary `GeoJSON` verbatim.
pub async fn boundaries(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/geo+json")
        .body(state.boundary_raw.clone())
}

/// `GET /api/bounds`
///
/// Bounding box over all county polygons, for the initial viewport.
pub async fn bounds(state: web::Data<AppState>) -> HttpResponse {
    state.boundaries.bounding_box().map_or_else(
        || {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "No boundaries loaded"
            }))
        },
        |(west, south, east, north)| {
            HttpResponse::Ok().json(serde_json::json!({
                "west": west,
                "south": south,
                "east": east,
                "north": north,
            }))
        },
    )
}

/// `POST /api/refresh`
///
/// Fetches a fresh snapshot from the backend. `applied` is `false`
/// when a newer snapshot was applied while this fetch was in flight.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    let applied = state.refresh().await;
    let data = state.data();
    HttpResponse::Ok().json(serde_json::json!({
        "applied": applied,
        "sequence": data.snapshot.sequence,
        "recordCount": data.snapshot.record_count(),
    }))
}

/// Human-readable name for a county metric overlay.
const fn metric_label(metric: CountyMetric) -> &'static str {
    match metric {
        CountyMetric::Population => "Population",
        CountyMetric::IncidenceRate => "Incidence Rate",
        CountyMetric::MortalityRate => "Mortality Rate",
        CountyMetric::AvgAnnualDeaths => "Avg Annual Deaths",
        CountyMetric::RecentTrend => "Recent Trend",
        CountyMetric::PovertyRate => "Poverty Rate",
        CountyMetric::HealthcareAccess => "Healthcare Access",
        CountyMetric::PollutionLevel => "Pollution Level",
    }
}
