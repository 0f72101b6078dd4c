// holdout_client — client-side state synchronization for Holdout.
//
// This crate keeps a local mirror of server-authoritative world state
// (players, weapons, ammo, transient projectiles/pickups) over a
// persistent message channel, and reconciles locally-predicted state
// against server corrections. It owns no rendering, input, UI, assets,
// or physics — those collaborate from outside through `GameClient`'s
// intent methods and the `EventBus` subscription.
//
// Module overview:
// - `connection.rs`: socket lifecycle and the send/receive boundary.
//                    Reader thread feeds raw frames into an inbox;
//                    nothing is interpreted there.
// - `client.rs`:     `GameClient` composition root — owns everything,
//                    drains + dispatches per tick, exposes intents.
//                    Also the bounded identity probe.
// - `router.rs`:     the single dispatch point from decoded messages
//                    to the owning component.
// - `registry.rs`:   id-keyed map of every mirrored networked entity.
// - `player.rs`:     health/shield synchronizer with the one-way death
//                    transition.
// - `weapon.rs`:     optimistic fire prediction + authoritative
//                    overwrite reconciliation; reload state machine.
// - `ammo.rs`:       reserve pools with per-type caps.
// - `inventory.rs`:  server-authoritative slot array with advisory
//                    local switching.
// - `transient.rs`:  lifecycle of server-spawned bullets/grenades/
//                    pickups, layered over the registry.
// - `outbound.rs`:   local intents -> protocol messages, including the
//                    position send throttle.
// - `events.rs`:     `SyncEvent` change notifications, multi-subscriber.
// - `error.rs`:      the error taxonomy that reaches the host.
//
// Concurrency model: single-threaded cooperative ticks. The connection
// reader is the only other thread and owns no state. No locks.

pub mod ammo;
pub mod client;
pub mod connection;
pub mod error;
pub mod events;
pub mod inventory;
pub mod outbound;
pub mod player;
pub mod registry;
mod router;
pub mod transient;
pub mod weapon;

pub use client::{GameClient, LocalIdProbe, ProbeState};
pub use connection::{ConnectConfig, Connection, ConnectionState};
pub use error::ConnectionError;
pub use events::{EventBus, SyncEvent};
pub use registry::{EntityHandle, EntityRegistry, NetworkedEntity};
