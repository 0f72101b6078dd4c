// Envelope codec: JSON text frames <-> typed protocol messages.
//
// Decoding distinguishes two failure classes because they have different
// policies downstream:
// - `UnknownTag`: the frame is well-formed but its `type` tag is not in
//   this client's vocabulary. New server message types must not crash
//   old clients, so callers ignore these (logged at debug level).
// - `Malformed`: the frame is not valid JSON, has no `type` tag, or a
//   known tag is missing required fields. Callers drop the frame and
//   keep the dispatch loop alive.
//
// The distinction is made by probing just the `type` field after a full
// decode fails: if the tag is recognized, the failure was a payload
// problem, not a vocabulary gap.

use serde::Deserialize;
use thiserror::Error;

use crate::message::{ClientMessage, ServerMessage};

/// Every inbound tag this client understands, in protocol order.
/// Used to classify decode failures, not to drive dispatch.
const KNOWN_SERVER_TAGS: [&str; 20] = [
    "initialState",
    "spawn",
    "serverPositionUpdate",
    "player_left",
    "aim",
    "healthUpdate",
    "playerKilled",
    "serverSpawn",
    "serverUnspawn",
    "bulletMove",
    "grenadeMove",
    "grenadeExplode",
    "inventoryUpdate",
    "weaponStateUpdate",
    "fullPlayerState",
    "reloadStarted",
    "reloadCompleted",
    "shootRejected",
    "ammoPickupConfirmed",
    "meleeAttack",
];

/// Why a frame failed to decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Well-formed frame with a tag outside this client's vocabulary.
    #[error("unknown message tag `{0}`")]
    UnknownTag(String),
    /// Invalid JSON, missing tag, or a known tag with a bad payload.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Minimal probe to recover the tag from a frame that failed full decode.
#[derive(Deserialize)]
struct TagProbe {
    #[serde(rename = "type")]
    tag: String,
}

/// Decode one inbound frame into a `ServerMessage`.
pub fn decode_server_message(frame: &[u8]) -> Result<ServerMessage, DecodeError> {
    match serde_json::from_slice::<ServerMessage>(frame) {
        Ok(msg) => Ok(msg),
        Err(err) => match serde_json::from_slice::<TagProbe>(frame) {
            Ok(probe) if !KNOWN_SERVER_TAGS.contains(&probe.tag.as_str()) => {
                Err(DecodeError::UnknownTag(probe.tag))
            }
            _ => Err(DecodeError::Malformed(err)),
        },
    }
}

/// Encode one outbound message as a JSON text frame payload.
pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(msg)
}
