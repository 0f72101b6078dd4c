// holdout_protocol — wire protocol for the Holdout game server connection.
//
// This crate defines the message vocabulary, envelope codec, and framing
// used by the client-side synchronization layer (`holdout_client`) to
// talk to the game server over a persistent TCP channel. It has no
// dependency on the client's state machinery.
//
// Module overview:
// - `types.rs`:    ID newtypes (`SessionId`, `ObjectId`), two-axis
//                  `Position` with the wire quantization and facing
//                  conventions, entity/ammo/weapon classifications.
// - `message.rs`:  `ServerMessage` / `ClientMessage` enums plus the
//                  snapshot structs both directions share.
// - `codec.rs`:    Envelope decode/encode with the unknown-tag vs.
//                  malformed distinction (forward compatibility).
// - `framing.rs`:  Length-delimited frames over any `Read`/`Write`
//                  stream: 4-byte big-endian prefix, then JSON payload.
//
// Design decisions:
// - **Flat tagged JSON.** The server speaks `{"type": tag, ...fields}`
//   objects, so messages are internally-tagged serde enums with
//   camelCase fields (and the one historical `player_left` spelling).
// - **Unknown tags are not errors to act on.** Old clients must survive
//   new server messages; the codec classifies them separately so the
//   dispatch loop can ignore them.
// - **No async runtime.** Framing uses `std::io::Read`/`Write`,
//   compatible with blocking TCP streams and buffered wrappers.

pub mod codec;
pub mod framing;
pub mod message;
pub mod types;

pub use codec::{DecodeError, decode_server_message, encode_client_message};
pub use framing::{MAX_FRAME_SIZE, read_frame, write_frame};
pub use message::{
    AmmoCounts, ClientMessage, InventorySnapshot, ItemKind, PlayerSnapshot, ServerMessage,
    SlotItem, WeaponSnapshot,
};
pub use types::{AmmoType, EntityKind, ObjectId, Position, SessionId, WeaponType};
