//! # Wire Protocol
//!
//! UTF-8 JSON text frames, tagged by a `type` field.
//!
//! ```text
//! CLIENT → SERVER
//!   {"type":"login","username":"ada"}
//!   {"type":"updateTile","x":3,"y":4,"value":2}
//!   {"type":"resetTiles"}
//!
//! SERVER → CLIENT
//!   {"type":"tiles","tiles":[[k(0,0),k(0,1),...],[k(1,0),...],...]}
//!                            └── tiles[x][y], one column per x
//! ```
//!
//! Decoding is strict about the envelope and lenient about fields: bad JSON
//! or an unknown `type` is a [`NetworkError::Protocol`], while a missing or
//! mistyped field of a known message decodes as `None`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use verdance_core::TileSnapshot;

use crate::error::{NetworkError, NetworkResult};

/// Largest integer an `f64` holds exactly.
const EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

/// A command sent by a viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Announces a display name. Logged only.
    Login {
        /// Display name.
        #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },
    /// Sets one tile's kind.
    UpdateTile {
        /// Column.
        #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
        x: Option<i64>,
        /// Row.
        #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
        y: Option<i64>,
        /// Raw tile kind.
        #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
        value: Option<i64>,
    },
    /// Regenerates the whole world.
    ResetTiles,
}

impl ClientMessage {
    /// Wire name of the message.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::UpdateTile { .. } => "updateTile",
            Self::ResetTiles => "resetTiles",
        }
    }
}

/// A message pushed to viewers.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage<'a> {
    /// The full tile grid, column-major.
    Tiles {
        /// `tiles[x][y]`.
        tiles: Vec<&'a [u8]>,
    },
}

impl<'a> ServerMessage<'a> {
    /// Borrows a snapshot as a `tiles` message.
    #[must_use]
    pub fn tiles(snapshot: &'a TileSnapshot) -> Self {
        Self::Tiles {
            tiles: snapshot.columns().collect(),
        }
    }
}

/// Decodes one inbound text frame.
///
/// # Errors
///
/// Returns [`NetworkError::Protocol`] for malformed JSON, a missing `type`
/// or an unknown `type`.
pub fn decode(text: &str) -> NetworkResult<ClientMessage> {
    serde_json::from_str(text).map_err(|e| NetworkError::Protocol(e.to_string()))
}

/// Encodes a snapshot as a `tiles` text frame.
///
/// # Errors
///
/// Returns [`NetworkError::Protocol`] if serialization fails.
pub fn encode_tiles(snapshot: &TileSnapshot) -> NetworkResult<String> {
    serde_json::to_string(&ServerMessage::tiles(snapshot))
        .map_err(|e| NetworkError::Protocol(e.to_string()))
}

/// Integers, including integral floats such as `3.0`. Anything else is `None`.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Number(number) = value else {
        return Ok(None);
    };
    if let Some(int) = number.as_i64() {
        return Ok(Some(int));
    }
    // Checked integral and within the exact range just above.
    #[allow(clippy::cast_possible_truncation)]
    let int = number
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() <= EXACT_F64_INT)
        .map(|f| f as i64);
    Ok(int)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}
