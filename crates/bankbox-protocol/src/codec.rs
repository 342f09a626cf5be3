//! Codec trait and implementations for message serialization.
//!
//! The rest of the stack never calls `serde_json` directly — it goes
//! through the [`Codec`] trait, so the wire format can be swapped (a
//! binary codec, say) without touching the server or ledger layers.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts protocol types to and from raw bytes.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection-handler task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] when serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] when the bytes are malformed or
    /// do not match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// JSON keeps messages inspectable in browser dev tools and mobile
/// debuggers, which matters far more here than frame size — snapshots are
/// a few hundred bytes for a full table of players.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
