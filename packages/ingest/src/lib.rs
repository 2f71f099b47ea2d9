#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Standalone data-maintenance utilities.
//!
//! These run outside the application, at build or maintenance time:
//!
//! - [`stats`] joins a state cancer-profile CSV export into the
//!   county collection by normalized county name.
//! - [`backfill`] attributes unassigned environmental sites to their
//!   owning county geographically and pushes the updates to the
//!   backend.

pub mod backfill;
pub mod stats;

use thiserror::Error;

/// Errors that can occur during maintenance runs.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Boundary data could not be loaded.
    #[error("Boundary error: {0}")]
    Boundary(#[from] cancer_map_boundary::BoundaryError),

    /// A backend write failed.
    #[error("Store error: {0}")]
    Store(#[from] cancer_map_store::StoreError),
}
