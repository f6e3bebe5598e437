//! Pack decoding errors.

use thiserror::Error;

/// Errors produced while encoding or decoding a fragment pack buffer.
#[derive(Debug, Error)]
pub enum PackError {
    /// The buffer ended before the current field was fully read.
    #[error("unexpected end of pack buffer at offset {0}")]
    UnexpectedEof(usize),

    /// Buffer does not start with the pack magic bytes.
    #[error("invalid magic bytes")]
    InvalidMagic,

    /// Container version not supported by this decoder.
    #[error("unsupported pack container version: {0}")]
    UnsupportedVersion(u8),

    /// Unknown transform kind byte in a record.
    #[error("invalid transform kind: 0x{0:02x}")]
    InvalidTransformKind(u8),

    /// A varint ran past 64 bits.
    #[error("varint overflow at offset {0}")]
    VarintOverflow(usize),
}
