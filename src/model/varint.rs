//! Variable-length quantities
//!
//! Seven payload bits per byte, high bit set on every byte except the last.
//! The first byte carries the most significant bits:
//!
//! ```text
//! 0            -> 00
//! 127          -> 7F
//! 128          -> 81 00
//! 16383        -> FF 7F
//! 16384        -> 81 80 00
//! ```

use super::error::{ModelError, ModelResult};
use super::stream::{ByteStream, StreamGuard};

/// Longest encoding the decoder accepts
pub const MAX_VARINT_BYTES: usize = 5;

const CONTINUE: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;

/// Read one varint. Values are always below `2^35`.
pub(crate) fn read_varint<S: ByteStream>(stream: &mut StreamGuard<S>) -> ModelResult<u64> {
    let start = stream.offset();
    let mut value = 0u64;
    for _ in 0..MAX_VARINT_BYTES {
        let Some(byte) = stream.read_byte()? else {
            return Err(ModelError::TruncatedStream { offset: start });
        };
        value = (value << 7) | u64::from(byte & PAYLOAD);
        if byte & CONTINUE == 0 {
            return Ok(value);
        }
    }
    Err(ModelError::TruncatedStream { offset: start })
}

/// Decode a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed.
pub fn decode_slice(bytes: &[u8]) -> ModelResult<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_BYTES).enumerate() {
        value = (value << 7) | u64::from(byte & PAYLOAD);
        if byte & CONTINUE == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(ModelError::TruncatedStream { offset: 0 })
}

/// Shortest encoding of `value`.
pub fn encode(mut value: u64) -> Vec<u8> {
    let mut out = vec![(value as u8) & PAYLOAD];
    value >>= 7;
    while value > 0 {
        out.push((value as u8 & PAYLOAD) | CONTINUE);
        value >>= 7;
    }
    out.reverse();
    out
}
