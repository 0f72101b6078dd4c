// Core ID and spatial types for the game protocol.
//
// These are lightweight newtypes and value types used by `message.rs`
// (protocol messages) and the client's entity bookkeeping
// (`holdout_client::registry`). Identifiers are server-assigned opaque
// strings — the client never parses or generates them.
//
// `Position` carries the two wire-format conventions that must match the
// server and every other client exactly:
// - `quantized()`: local positions are rounded to three decimal places
//   before transmission (bandwidth + stable movement-epsilon comparisons).
// - `facing_degrees()`: a direction vector maps to a rotation angle via
//   `atan2(y, x)` in degrees minus 90, so the reference "up" vector is
//   zero rotation. This offset is a protocol convention, not geometry.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Server-assigned session identifier for one connected peer. Opaque,
/// unique per peer, stable for the session's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Server-assigned identifier for any networked object. A player's
/// `ObjectId` is its session id; transients (bullets, grenades, pickups)
/// get their own ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl From<SessionId> for ObjectId {
    fn from(id: SessionId) -> Self {
        Self(id.0)
    }
}

impl From<&SessionId> for ObjectId {
    fn from(id: &SessionId) -> Self {
        Self(id.0.clone())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A two-axis position or direction vector in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Round both axes to three decimal places — the wire resolution for
    /// locally-reported positions.
    pub fn quantized(self) -> Self {
        Self {
            x: (self.x * 1000.0).round() / 1000.0,
            y: (self.y * 1000.0).round() / 1000.0,
        }
    }

    /// Unit-length copy of this vector; zero stays zero.
    pub fn normalized(self) -> Self {
        let len = (self.x * self.x + self.y * self.y).sqrt();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        }
    }

    /// Facing angle in degrees for this direction vector: `atan2(y, x)`
    /// minus 90, so that (0, 1) — "up" — maps to zero rotation.
    pub fn facing_degrees(self) -> f32 {
        self.y.atan2(self.x).to_degrees() - 90.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Entity and item classification
// ---------------------------------------------------------------------------

/// What kind of networked object an id refers to. Players arrive through
/// the player spawn path; everything else is classified from the
/// `serverSpawn` catalog name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Bullet,
    Grenade,
    Pickup,
    Other,
}

impl EntityKind {
    /// Classify a `serverSpawn` name. Unrecognized names spawn as `Other`
    /// so the registry stays consistent with the server's id space even
    /// when the catalog gains new objects.
    pub fn from_spawn_name(name: &str) -> Self {
        match name {
            "Bullet" => Self::Bullet,
            "Grenade" => Self::Grenade,
            _ if name.contains("Pickup") || name.starts_with("Ammo") => Self::Pickup,
            _ => Self::Other,
        }
    }

    /// Projectiles carry a facing derived from their travel direction.
    pub fn has_facing(self) -> bool {
        matches!(self, Self::Bullet | Self::Grenade)
    }
}

/// Ammunition pool types. `None` is the sentinel for melee — it has no
/// pool and never appears as an inventory key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmmoType {
    None,
    Pistol,
    Rifle,
    Sniper,
    Shotgun,
}

impl AmmoType {
    /// The four pooled types, in wire/display order.
    pub const POOLED: [Self; 4] = [Self::Pistol, Self::Rifle, Self::Sniper, Self::Shotgun];
}

/// Weapon classes as the server names them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum WeaponType {
    Pistol,
    #[serde(rename = "SMG")]
    Smg,
    Rifle,
    Sniper,
    Shotgun,
}
