//! Snapshot fetching.
//!
//! The UI triggers a wholesale re-fetch whenever the entity
//! collections may have changed. Responses can resolve out of order,
//! so each fetch is stamped with a sequence number taken when it
//! starts; the consumer applying snapshots compares sequences and
//! drops any response that was superseded while in flight.

use std::sync::atomic::{AtomicU64, Ordering};

use cancer_map_atlas::Snapshot;

use crate::RestStore;

/// Fetches complete snapshots from the backend.
pub struct SnapshotLoader {
    store: RestStore,
    next_sequence: AtomicU64,
}

impl SnapshotLoader {
    /// Wraps a store client.
    #[must_use]
    pub const fn new(store: RestStore) -> Self {
        Self {
            store,
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Access to the underlying store, for administrative writes.
    #[must_use]
    pub const fn store(&self) -> &RestStore {
        &self.store
    }

    /// Fetches all six collections concurrently and assembles a
    /// snapshot.
    ///
    /// A failed fetch for any one table is logged and yields an empty
    /// collection for that entity kind; the other tables still load.
    /// The sequence number is taken when the fetch starts, so two
    /// overlapping loads get distinct, ordered sequences.
    pub async fn load(&self) -> Snapshot {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let fetched_at = chrono::Utc::now();

        let (counties, sites, carcinogens, cancers, carcinogen_cancer_links, site_carcinogen_links) =
            futures::join!(
                self.store.list_counties(),
                self.store.list_sites(),
                self.store.list_carcinogens(),
                self.store.list_cancers(),
                self.store.list_carcinogen_cancer_links(),
                self.store.list_site_carcinogen_links(),
            );

        let snapshot = Snapshot {
            counties: or_empty(counties, "counties"),
            sites: or_empty(sites, "sites"),
            carcinogens: or_empty(carcinogens, "carcinogens"),
            cancers: or_empty(cancers, "cancers"),
            carcinogen_cancer_links: or_empty(carcinogen_cancer_links, "carcinogen_cancer_links"),
            site_carcinogen_links: or_empty(site_carcinogen_links, "site_carcinogen_links"),
            sequence,
            fetched_at: Some(fetched_at),
        };

        log::debug!(
            "Snapshot {} loaded: {} records",
            snapshot.sequence,
            snapshot.record_count()
        );
        snapshot
    }
}

fn or_empty<T>(result: Result<Vec<T>, crate::StoreError>, label: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to fetch {label}, continuing with empty collection: {e}");
            Vec::new()
        }
    }
}
