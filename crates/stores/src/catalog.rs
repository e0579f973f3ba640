//! In-memory store catalog fed by a [`StoreSource`] and change events

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use storefinder_geo::Coordinate;
use storefinder_geocode::Geocoder;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::record::{store_id, StoreRecord};
use crate::schema::SchemaMapping;

/// Where raw store rows come from.
pub trait StoreSource: Send + Sync {
    /// Fetch every store row.
    fn fetch_stores(&self) -> impl Future<Output = Result<Vec<Value>, CatalogError>> + Send;
}

/// A JSON array of store rows on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreSource for JsonFileSource {
    async fn fetch_stores(&self) -> Result<Vec<Value>, CatalogError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;

        match serde_json::from_str(&content)? {
            Value::Array(rows) => Ok(rows),
            _ => Err(CatalogError::NotAnArray),
        }
    }
}

/// Row-level change pushed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// New row
    Insert(Value),
    /// Changed row, matched by backend id
    Update(Value),
    /// Removed row
    Delete {
        /// Backend id of the removed row
        source_id: String,
    },
}

/// Counts from an ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows turned into records
    pub loaded: usize,
    /// Rows skipped as unmappable
    pub skipped: usize,
}

/// What a change event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Record added under this id
    Inserted(String),
    /// Record with this id replaced
    Updated(String),
    /// Record with this id removed
    Deleted(String),
    /// Event did not apply
    Ignored,
}

/// Ordered collection of mapped stores.
#[derive(Debug, Clone, Default)]
pub struct StoreCatalog {
    mapping: SchemaMapping,
    stores: Vec<StoreRecord>,
    ingested: usize,
}

impl StoreCatalog {
    /// Empty catalog using `mapping`.
    pub fn new(mapping: SchemaMapping) -> Self {
        Self {
            mapping,
            stores: Vec::new(),
            ingested: 0,
        }
    }

    /// Replace the contents with rows from `source`.
    ///
    /// # Errors
    ///
    /// Propagates source failures. Unmappable rows are skipped, not errors.
    pub async fn load_from<S: StoreSource>(&mut self, source: &S) -> Result<IngestReport, CatalogError> {
        let rows = source.fetch_stores().await?;
        self.stores.clear();
        self.ingested = 0;
        let report = self.ingest(&rows);
        info!(loaded = report.loaded, skipped = report.skipped, "store catalog loaded");
        Ok(report)
    }

    /// Append rows, assigning ids in ingestion order.
    pub fn ingest(&mut self, rows: &[Value]) -> IngestReport {
        let mut report = IngestReport::default();
        for (index, row) in rows.iter().enumerate() {
            match self.mapping.map_record(row, store_id(self.ingested + 1)) {
                Ok(record) => {
                    self.ingested += 1;
                    self.stores.push(record);
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!(row = index, error = %e, "skipping store row");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Apply a backend change.
    pub fn apply(&mut self, event: ChangeEvent) -> ChangeOutcome {
        match event {
            ChangeEvent::Insert(row) | ChangeEvent::Update(row) => self.upsert(&row),
            ChangeEvent::Delete { source_id } => {
                match self.position_of(&source_id) {
                    Some(pos) => ChangeOutcome::Deleted(self.stores.remove(pos).id),
                    None => {
                        debug!(source_id = %source_id, "delete for unknown store");
                        ChangeOutcome::Ignored
                    }
                }
            }
        }
    }

    fn upsert(&mut self, row: &Value) -> ChangeOutcome {
        let existing = self
            .mapping
            .source_id(row)
            .and_then(|sid| self.position_of(&sid));

        let Some(pos) = existing else {
            let before = self.stores.len();
            self.ingest(std::slice::from_ref(row));
            return match self.stores.get(before) {
                Some(record) => ChangeOutcome::Inserted(record.id.clone()),
                None => ChangeOutcome::Ignored,
            };
        };

        let old = &self.stores[pos];
        match self.mapping.map_record(row, old.id.clone()) {
            Ok(mut record) => {
                // Keep a resolved position if the address did not move
                if record.coordinates.is_none() && record.location == old.location {
                    record.coordinates = old.coordinates;
                }
                let id = record.id.clone();
                self.stores[pos] = record;
                ChangeOutcome::Updated(id)
            }
            Err(e) => {
                warn!(id = %old.id, error = %e, "ignoring unmappable update");
                ChangeOutcome::Ignored
            }
        }
    }

    fn position_of(&self, source_id: &str) -> Option<usize> {
        self.stores
            .iter()
            .position(|s| s.source_id.as_deref() == Some(source_id))
    }

    /// Stores in ingestion order.
    pub fn stores(&self) -> &[StoreRecord] {
        &self.stores
    }

    /// Store by ingestion id.
    pub fn get(&self, id: &str) -> Option<&StoreRecord> {
        self.stores.iter().find(|s| s.id == id)
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Set the position of a store. Returns false for unknown ids.
    pub fn set_coordinates(&mut self, id: &str, coordinate: Option<Coordinate>) -> bool {
        match self.stores.iter_mut().find(|s| s.id == id) {
            Some(store) => {
                store.coordinates = coordinate;
                true
            }
            None => false,
        }
    }

    /// Geocode every store that has no coordinates. Returns how many were
    /// resolved.
    pub async fn resolve_coordinates(&mut self, geocoder: &Geocoder) -> usize {
        let pending: Vec<(String, String)> = self
            .stores
            .iter()
            .filter(|s| s.coordinates.is_none())
            .map(|s| (s.id.clone(), s.location.clone()))
            .collect();
        if pending.is_empty() {
            return 0;
        }

        let addresses: Vec<&str> = pending.iter().map(|(_, loc)| loc.as_str()).collect();
        let resolved = geocoder.batch_resolve(&addresses).await;

        let mut count = 0;
        for ((id, _), result) in pending.iter().zip(resolved) {
            if let Some(coord) = result.coordinate {
                self.set_coordinates(id, Some(coord));
                count += 1;
            }
        }
        debug!(requested = pending.len(), resolved = count, "geocoded store addresses");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::sync::Arc;
    use storefinder_core::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
    use storefinder_geocode::{Gazetteer, GeocoderConfig, OfflineProvider};

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": "a", "name": "Alpha", "location": "Koramangala"}),
            json!({"name": "No address"}),
            json!({"id": "b", "name": "Beta", "location": "Hebbal", "lat": 13.0358, "lng": 77.597}),
        ]
    }

    #[test]
    fn test_ingest_assigns_sequential_ids_and_skips_bad_rows() {
        let mut catalog = StoreCatalog::default();
        let report = catalog.ingest(&rows());

        assert_eq!(report, IngestReport { loaded: 2, skipped: 1 });
        let ids: Vec<_> = catalog.stores().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["store-1", "store-2"]);
        assert_eq!(catalog.get("store-2").unwrap().name, "Beta");
    }

    #[test]
    fn test_change_events() {
        let mut catalog = StoreCatalog::default();
        catalog.ingest(&rows());

        let outcome = catalog.apply(ChangeEvent::Insert(json!({"id": "c", "name": "Gamma", "location": "HSR"})));
        assert_eq!(outcome, ChangeOutcome::Inserted("store-3".into()));

        let outcome = catalog.apply(ChangeEvent::Update(json!({"id": "b", "name": "Beta 2", "location": "Hebbal"})));
        assert_eq!(outcome, ChangeOutcome::Updated("store-2".into()));
        let beta = catalog.get("store-2").unwrap();
        assert_eq!(beta.name, "Beta 2");
        // Same address, so the old position survives
        assert_eq!(beta.coordinates, Some(Coordinate::new(13.0358, 77.597)));

        let outcome = catalog.apply(ChangeEvent::Delete { source_id: "a".into() });
        assert_eq!(outcome, ChangeOutcome::Deleted("store-1".into()));
        assert_eq!(catalog.len(), 2);

        let outcome = catalog.apply(ChangeEvent::Delete { source_id: "zzz".into() });
        assert_eq!(outcome, ChangeOutcome::Ignored);
    }

    #[test]
    fn test_update_of_unknown_id_inserts() {
        let mut catalog = StoreCatalog::default();
        let outcome = catalog.apply(ChangeEvent::Update(json!({"id": "x", "name": "X", "location": "Y"})));
        assert_eq!(outcome, ChangeOutcome::Inserted("store-1".into()));
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut catalog = StoreCatalog::default();
        catalog.ingest(&rows());
        catalog.apply(ChangeEvent::Delete { source_id: "b".into() });
        let outcome = catalog.apply(ChangeEvent::Insert(json!({"name": "New", "location": "Z"})));
        assert_eq!(outcome, ChangeOutcome::Inserted("store-3".into()));
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", Value::Array(rows())).unwrap();

        let mut catalog = StoreCatalog::default();
        let report = catalog.load_from(&JsonFileSource::new(file.path())).await.unwrap();
        assert_eq!(report.loaded, 2);

        // Reloading replaces, ids restart
        catalog.load_from(&JsonFileSource::new(file.path())).await.unwrap();
        assert_eq!(catalog.stores()[0].id, "store-1");
    }

    #[tokio::test]
    async fn test_json_file_source_errors() {
        let missing = JsonFileSource::new("/definitely/not/here.json");
        assert!(matches!(missing.fetch_stores().await, Err(CatalogError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"stores\": []}}").unwrap();
        let source = JsonFileSource::new(file.path());
        assert!(matches!(source.fetch_stores().await, Err(CatalogError::NotAnArray)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_coordinates_from_gazetteer() {
        let mut catalog = StoreCatalog::default();
        catalog.ingest(&rows());

        let limiter = Arc::new(SlidingWindowLimiter::new(RateLimitConfig::default()));
        let geocoder = Geocoder::new(
            Arc::new(OfflineProvider),
            limiter,
            Gazetteer::builtin(),
            GeocoderConfig::default(),
        );

        assert_eq!(catalog.resolve_coordinates(&geocoder).await, 1);
        assert_eq!(
            catalog.get("store-1").unwrap().coordinates,
            Some(Coordinate::new(12.9352, 77.6245))
        );
    }
}
