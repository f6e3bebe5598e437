//! Propdb Core - EAV property resolution and embedded spatial lookups.
//!
//! This crate serves per-element metadata and placement for large 3D scene
//! databases without loading the whole model into memory. Element
//! properties live in a normalized SQLite EAV schema (`objects_id`,
//! `objects_attr`, `objects_val`, `objects_eav`); fragment placements are
//! decoded from a binary pack stream (see `propdb-pack`) and persisted into
//! a `fragment_locations` side table in the same file, so spatial lookups
//! read straight from disk and never re-parse geometry.
//!
//! Storage operations are async I/O-bound tasks: blocking SQLite work runs
//! on the tokio blocking pool and every query is a suspension point. One
//! [`StoreHandle`] serializes its own queries; callers that want concurrent
//! queries open one handle each.

pub mod error;
pub mod location;
pub mod props;
pub mod query;
pub mod store;

pub use error::Error;
pub use location::{LocationStore, ModelQuery, PlacedElement};
pub use props::{AttrKey, PropMap, PropertyResolver, PARENT_CATEGORY};
pub use query::{AttrDef, AttributeQuery, Row, RowStream};
pub use store::{AttrValue, Store, StoreConfig, StoreHandle};

/// Re-export the fragment pack format types.
pub use propdb_pack as pack;
pub use propdb_pack::FragmentLocation;
