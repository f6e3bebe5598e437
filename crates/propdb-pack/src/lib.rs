//! Binary fragment-pack format for scene geometry placement.
//!
//! A pack buffer is a compact container holding one record per geometry
//! fragment of a 3D scene. Each record carries the translation and bounding
//! box of the fragment plus the integer id of the scene element it belongs
//! to. This crate decodes such buffers into per-element
//! [`FragmentLocation`] maps and provides a [`PackWriter`] for producing
//! them.
//!
//! ## Container layout
//!
//! ```text
//! [magic "PFRG"] [container version: u8] [record count: varint] [record]*
//!
//! record := version:varint  flags:u8  material_id:varint  geometry_id:varint
//!           transform  bbox:6 x f32 LE  db_id:varint
//! ```
//!
//! The transform is tagged with a one-byte kind (absent, translation,
//! rotation + translation, uniform scale + rotation + translation, or a full
//! 4x3 affine matrix); only the translation component survives decoding.
//! Records with format version > 3 store their bounding box offset into
//! world space by the translation.
//!
//! Decoding operates on `&[u8]` and is synchronous — callers fetch the
//! buffer through whatever async transport they use, then decode in one CPU
//! pass.

mod decoder;
mod error;
mod location;
mod reader;
mod varint;
mod writer;

pub use decoder::{decode_locations, decode_locations_filtered, WORLD_SPACE_MIN_VERSION};
pub use error::PackError;
pub use location::{FragmentLocation, Transform};
pub use varint::{decode_varint, encode_varint};
pub use writer::{FragmentRecord, PackWriter};

/// Magic bytes identifying a fragment pack buffer.
pub const PACK_MAGIC: [u8; 4] = *b"PFRG";

/// Current pack container version.
pub const PACK_VERSION: u8 = 1;
