// Protocol messages for the game server connection.
//
// Two enums define the full protocol vocabulary:
// - `ServerMessage`: sent by the game server to clients.
// - `ClientMessage`: sent by clients to the game server.
//
// Supporting snapshot structs (`PlayerSnapshot`, `WeaponSnapshot`,
// `SlotItem`, `InventorySnapshot`) are shared by both directions.
//
// The wire format is a flat JSON object with a `type` tag and the
// payload fields alongside it, e.g.
// `{"type":"healthUpdate","sessionId":"a1","health":80,...}` — hence the
// internally-tagged serde representation with camelCase field names.
// The one irregular tag spelling is `player_left`, which the server has
// always sent in snake case.
//
// Optional fields model the server's habit of piggybacking partial
// state: `weaponStateUpdate` may carry a weapon snapshot, an ammo map,
// or both; absent parts simply leave the client's copy untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{AmmoType, ObjectId, Position, SessionId, WeaponType};

/// Per-type ammo counts, keyed by pool type. Maps carry only the types
/// the server chose to report; absent types are left unchanged.
pub type AmmoCounts = BTreeMap<AmmoType, i32>;

/// Messages sent by the server to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// First message after connect: the local peer's session id, every
    /// already-connected player, and the local loadout.
    InitialState {
        session_id: SessionId,
        others: Vec<PlayerSnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inventory: Option<InventorySnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weapon_state: Option<WeaponSnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ammo: Option<AmmoCounts>,
    },
    /// A new player joined.
    Spawn { player: PlayerSnapshot },
    /// Authoritative position for one player.
    ServerPositionUpdate {
        session_id: SessionId,
        position: Position,
    },
    /// A player disconnected.
    #[serde(rename = "player_left")]
    PlayerLeft { session_id: SessionId },
    /// A player's aim direction changed.
    Aim {
        session_id: SessionId,
        direction: Position,
    },
    /// Authoritative health/shield for one player.
    HealthUpdate {
        session_id: SessionId,
        health: i32,
        max_health: i32,
        shield: i32,
        max_shield: i32,
    },
    /// A player died. The only thing that kills a player locally.
    PlayerKilled { session_id: SessionId },
    /// A transient object spawned (bullet, grenade, pickup, ...).
    ServerSpawn {
        name: String,
        id: ObjectId,
        position: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<Position>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activator: Option<SessionId>,
    },
    /// A transient object despawned.
    ServerUnspawn { id: ObjectId },
    /// A bullet moved.
    BulletMove { id: ObjectId, position: Position },
    /// A grenade moved.
    GrenadeMove { id: ObjectId, position: Position },
    /// A grenade detonated. Terminal for that id.
    GrenadeExplode {
        id: ObjectId,
        position: Position,
        radius: f32,
    },
    /// Server-confirmed active slot (and that slot's contents) for one
    /// player. This is what actually switches the active slot.
    InventoryUpdate {
        session_id: SessionId,
        slot_index: usize,
        item: Option<SlotItem>,
    },
    /// Authoritative weapon and/or ammo state for the local player.
    /// Always wins over local prediction.
    WeaponStateUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weapon_state: Option<WeaponSnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ammo: Option<AmmoCounts>,
    },
    /// Full local loadout refresh: inventory, weapon, ammo.
    FullPlayerState {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inventory: Option<InventorySnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weapon_state: Option<WeaponSnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ammo: Option<AmmoCounts>,
    },
    /// The server started reloading the local player's weapon.
    ReloadStarted { weapon_name: String, reload_time: f32 },
    /// The reload finished; may carry the refreshed weapon snapshot.
    ReloadCompleted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weapon_state: Option<WeaponSnapshot>,
    },
    /// The server refused a fire request. No local rollback — the next
    /// authoritative weapon push repairs any misprediction.
    ShootRejected { reason: String },
    /// The server granted an ammo pickup to the local player.
    AmmoPickupConfirmed {
        pickup_id: ObjectId,
        ammo_type: AmmoType,
        amount: i32,
    },
    /// A melee strike happened somewhere in the world.
    MeleeAttack {
        attacker_id: SessionId,
        target_id: SessionId,
        damage: f32,
    },
}

/// Messages sent by a client to the server. Every one of these is an
/// intent: the server validates and answers with authoritative state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Raw movement input axes, each in [-1, 1].
    MoveInput { horizontal: f32, vertical: f32 },
    /// Aim direction (unit vector).
    Aim { direction: Position },
    /// Throttled local position report, quantized to three decimals.
    UpdatePosition { position: Position },
    /// Fire intent from a muzzle position along a direction.
    ShootRequest {
        position: Position,
        direction: Position,
    },
    /// Reload intent.
    ReloadRequest,
    /// Advisory slot-switch request; the switch happens only when the
    /// server answers with `inventoryUpdate`.
    InventorySwitch { slot_index: usize },
    /// Consume the item in a slot (health/shield pack).
    UseItem { slot_index: usize },
    /// Throw a grenade from a position along a direction.
    ThrowGrenade {
        position: Position,
        direction: Position,
    },
    /// Melee strike on a target player.
    MeleeAttack { target_id: SessionId, damage: f32 },
    /// Claim an ammo pickup the local player touched.
    AmmoPickup {
        pickup_id: ObjectId,
        ammo_type: AmmoType,
        amount: i32,
    },
    /// Report a bullet collision observed locally.
    BulletCollide { id: ObjectId },
}

/// One player as the server describes it in `initialState`/`spawn`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: SessionId,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventorySnapshot>,
}

/// Full weapon state snapshot. The server owns every field; the client's
/// only liberty is the optimistic ammo decrement between snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSnapshot {
    pub weapon_name: String,
    pub weapon_type: WeaponType,
    pub ammo_type: AmmoType,
    pub current_ammo: i32,
    pub magazine_capacity: i32,
    pub reserve_ammo: i32,
    pub is_reloading: bool,
    pub reload_time_remaining: f32,
    pub damage: f32,
    pub fire_rate: f32,
}

/// What one inventory slot holds. `Melee` is spelled `"Hand"` on the
/// wire — the server has always named bare fists that way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "Hand")]
    Melee,
    Weapon,
    Health,
    Shield,
    Grenade,
}

/// An occupied inventory slot. Empty slots are `None` in the snapshot's
/// items array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotItem {
    #[serde(rename = "itemType")]
    pub kind: ItemKind,
    #[serde(rename = "itemName")]
    pub name: String,
    #[serde(
        rename = "weaponName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub weapon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i32>,
}

/// Full slot array plus active index, as the server snapshots it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub items: Vec<Option<SlotItem>>,
    pub active_index: usize,
}
