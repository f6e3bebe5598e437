//! Store access layer.
//!
//! This module owns the connection handles to the backing SQLite file and
//! the dynamically typed value that crosses the accessor boundary.

mod config;
mod handle;
mod value;

pub use config::StoreConfig;
pub use handle::{Store, StoreHandle};
pub use value::AttrValue;
