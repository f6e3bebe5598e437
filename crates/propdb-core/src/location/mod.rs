//! Embedded location store and composite queries.
//!
//! Decoded fragment locations are persisted into a `fragment_locations`
//! side table in the same file as the attribute tables; lookups read the
//! table directly and never re-parse the geometry stream.

mod composite;
mod store;

pub use composite::{ModelQuery, PlacedElement};
pub use store::LocationStore;
