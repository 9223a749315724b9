//! Error types for model loading.

use thiserror::Error;

/// Result type for model decoding.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that abort a model parse.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Read, seek or close failure reported by the stream.
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a fixed-size field.
    #[error("unexpected end of stream at offset {offset}")]
    UnexpectedEof {
        /// Bytes consumed before the short read.
        offset: u64,
    },

    /// The file does not start with the `KW3D` tag.
    #[error("bad magic {found:?}, expected \"KW3D\"")]
    BadMagic {
        /// The four bytes found instead.
        found: [u8; 4],
    },

    /// A varint ran off the end of the stream or past its 5-byte limit.
    #[error("truncated stream: varint at offset {offset} never terminated")]
    TruncatedStream {
        /// Offset of the varint's first byte.
        offset: u64,
    },
}

impl ModelError {
    /// True for malformed content, false for failures of the stream itself.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::BadMagic { .. } | Self::TruncatedStream { .. })
    }
}
