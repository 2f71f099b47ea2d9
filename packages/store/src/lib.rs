#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! REST client for the hosted relational backend.
//!
//! The backend speaks a `PostgREST`-style API: one JSON array per
//! table for reads, and row-level insert/update/delete keyed by `id`
//! for administrative writes. [`RestStore`] wraps the wire calls;
//! [`SnapshotLoader`] turns the six read queries into an immutable
//! [`Snapshot`] and guards against out-of-order responses with a
//! monotonically increasing sequence number.
//!
//! Read failures never block the pipeline: a failed table fetch is
//! logged and surfaces as an empty collection for that entity kind.

pub mod snapshot;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use cancer_map_health_models::{
    CancerType, Carcinogen, CarcinogenCancerLink, County, EnvSite, SiteCarcinogenLink,
};

pub use snapshot::SnapshotLoader;

/// Backend table names.
pub mod tables {
    /// Counties table.
    pub const COUNTIES: &str = "counties";
    /// Environmental sites table.
    pub const SITES: &str = "environmental_sites";
    /// Carcinogens table.
    pub const CARCINOGENS: &str = "carcinogens";
    /// Cancer types table.
    pub const CANCERS: &str = "cancers";
    /// Carcinogen ↔ cancer link table.
    pub const CARCINOGEN_CANCER_LINKS: &str = "carcinogen_cancer_links";
    /// Site ↔ carcinogen link table.
    pub const SITE_CARCINOGEN_LINKS: &str = "environmental_site_carcinogens";
}

/// Errors that can occur talking to the backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status} for {table}: {body}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Table the request targeted.
        table: String,
        /// Response body, for diagnostics.
        body: String,
    },
}

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// API key sent as both `apikey` and bearer token, if required.
    pub api_key: Option<String>,
}

impl StoreConfig {
    /// Reads the configuration from `CANCER_MAP_STORE_URL` and
    /// `CANCER_MAP_STORE_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if `CANCER_MAP_STORE_URL` is unset.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self {
            base_url: std::env::var("CANCER_MAP_STORE_URL")?,
            api_key: std::env::var("CANCER_MAP_STORE_KEY").ok(),
        })
    }
}

/// REST client for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl RestStore {
    /// Creates a client from the given configuration.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{table}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    /// Fetches every row of a table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails or the response is
    /// not the expected JSON shape.
    pub async fn list<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, StoreError> {
        let url = format!("{}?select=*", self.table_url(table));
        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = check_status(response, table).await?;
        let body = response.text().await?;
        decode_rows(&body)
    }

    /// Inserts one row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails or the backend
    /// rejects the row.
    pub async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        let response = self
            .authorize(self.client.post(self.table_url(table)))
            .json(row)
            .send()
            .await?;
        check_status(response, table).await?;
        Ok(())
    }

    /// Updates the row with the given `id`, replacing the same field
    /// set that reads return.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails or the backend
    /// rejects the update.
    pub async fn update<T: Serialize + Sync>(
        &self,
        table: &str,
        id: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let url = format!("{}?id=eq.{id}", self.table_url(table));
        let response = self
            .authorize(self.client.patch(&url))
            .json(row)
            .send()
            .await?;
        check_status(response, table).await?;
        Ok(())
    }

    /// Deletes the row with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails or the backend
    /// rejects the delete.
    pub async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let url = format!("{}?id=eq.{id}", self.table_url(table));
        let response = self.authorize(self.client.delete(&url)).send().await?;
        check_status(response, table).await?;
        Ok(())
    }

    /// Fetches all counties.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails.
    pub async fn list_counties(&self) -> Result<Vec<County>, StoreError> {
        self.list(tables::COUNTIES).await
    }

    /// Fetches all environmental sites.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails.
    pub async fn list_sites(&self) -> Result<Vec<EnvSite>, StoreError> {
        self.list(tables::SITES).await
    }

    /// Fetches all carcinogens.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails.
    pub async fn list_carcinogens(&self) -> Result<Vec<Carcinogen>, StoreError> {
        self.list(tables::CARCINOGENS).await
    }

    /// Fetches all cancer types.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails.
    pub async fn list_cancers(&self) -> Result<Vec<CancerType>, StoreError> {
        self.list(tables::CANCERS).await
    }

    /// Fetches all carcinogen ↔ cancer links.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails.
    pub async fn list_carcinogen_cancer_links(
        &self,
    ) -> Result<Vec<CarcinogenCancerLink>, StoreError> {
        self.list(tables::CARCINOGEN_CANCER_LINKS).await
    }

    /// Fetches all site ↔ carcinogen links.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the request fails.
    pub async fn list_site_carcinogen_links(
        &self,
    ) -> Result<Vec<SiteCarcinogenLink>, StoreError> {
        self.list(tables::SITE_CARCINOGEN_LINKS).await
    }
}

fn decode_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, StoreError> {
    Ok(serde_json::from_str(body)?)
}

async fn check_status(
    response: reqwest::Response,
    table: &str,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Backend {
        status: status.as_u16(),
        table: table.to_string(),
        body,
    })
}
