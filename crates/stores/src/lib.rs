//! Store records, filtering and device location for storefinder
//!
//! Raw backend rows are mapped to [`StoreRecord`]s through a declared
//! [`SchemaMapping`], collected in a [`StoreCatalog`], geocoded, then
//! annotated with distances and filtered/sorted for display:
//!
//! ```
//! use storefinder_geo::Coordinate;
//! use storefinder_stores::{apply_filters, FilterState, HoursTag, StoreRecord};
//!
//! let stores = vec![
//!     StoreRecord::new("store-1", "Acme", "Koramangala")
//!         .with_coordinates(Coordinate::new(12.9352, 77.6245))
//!         .with_hours("7am - 11pm"),
//!     StoreRecord::new("store-2", "Beta", "Unknown"),
//! ];
//!
//! let filter = FilterState::default().with_max_distance(10.0).with_tag(HoursTag::OpenLate);
//! let visible = apply_filters(&stores, &filter, Some(Coordinate::new(12.9716, 77.5946)));
//! assert_eq!(visible.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod error;
pub mod filter;
pub mod location;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod sort;

pub use catalog::{ChangeEvent, ChangeOutcome, IngestReport, JsonFileSource, StoreCatalog, StoreSource};
pub use error::{CatalogError, GeolocationError, MappingError};
pub use filter::{FilterState, HoursTag};
pub use location::{locate, CancellationHandle, LocationOptions, LocationWatch, Position, PositionSource};
pub use pipeline::{annotate_distances, apply_filters};
pub use record::StoreRecord;
pub use schema::SchemaMapping;
pub use sort::{sort_stores, SortKey};
