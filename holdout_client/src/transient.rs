// Spawn/despawn manager for transient server objects: bullets, grenades,
// pickups — anything with a lifetime driven entirely by network events
// and no player ownership beyond an "activator" reference.
//
// Storage lives in the entity registry; this component owns the
// transient-specific bookkeeping: kind classification from the spawn
// catalog name, the facing convention for projectiles, the activator
// map (used only to suppress self-collision effects, never ownership),
// and the terminal explode path.
//
// Duplicate protection falls out of structure rather than flags: a
// second `serverSpawn` for a live id hits the registry's idempotent
// spawn, and a second `grenadeExplode` finds the id already removed and
// does nothing.

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};

use holdout_protocol::types::{EntityKind, ObjectId, Position, SessionId};

use crate::events::{EventBus, SyncEvent};
use crate::registry::EntityRegistry;

/// Payload of a `serverSpawn` message, as handed to the manager.
pub struct TransientSpawn {
    pub name: String,
    pub id: ObjectId,
    pub position: Position,
    pub direction: Option<Position>,
    pub activator: Option<SessionId>,
}

/// Transient-object bookkeeping layered over the registry.
#[derive(Default)]
pub struct TransientManager {
    activators: FxHashMap<ObjectId, SessionId>,
    claimed_pickups: FxHashSet<ObjectId>,
}

impl TransientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror a server-spawned transient. Idempotent: a duplicate id
    /// leaves the existing entity (and its activator) untouched.
    pub fn spawn(
        &mut self,
        registry: &mut EntityRegistry,
        events: &mut EventBus,
        spawn: TransientSpawn,
    ) {
        let TransientSpawn {
            name,
            id,
            position,
            direction,
            activator,
        } = spawn;

        if registry.contains(&id) {
            trace!("duplicate serverSpawn for {id}");
            return;
        }

        let kind = EntityKind::from_spawn_name(&name);
        let orientation_hint = if kind.has_facing() { direction } else { None };
        let handle = registry.spawn(id.clone(), kind, position, orientation_hint);

        if let Some(owner) = activator {
            self.activators.insert(id.clone(), owner);
        }

        events.publish(SyncEvent::EntitySpawned {
            id,
            kind,
            handle,
            position,
        });
    }

    /// Move a transient. Ignored for unknown ids (already despawned
    /// client-side) and for player entities (players move through their
    /// own position path).
    pub fn move_transient(
        &mut self,
        registry: &mut EntityRegistry,
        id: &ObjectId,
        position: Position,
    ) {
        match registry.find(id) {
            Some(entity) if entity.kind != EntityKind::Player => {
                registry.update_position(id, position);
            }
            Some(_) => debug!("transient move addressed to player entity {id}"),
            None => debug!("transient move for unknown id {id}"),
        }
    }

    /// Remove a transient on `serverUnspawn`. No-op for unknown ids.
    pub fn despawn(&mut self, registry: &mut EntityRegistry, events: &mut EventBus, id: &ObjectId) {
        self.activators.remove(id);
        if let Some(entity) = registry.despawn(id) {
            events.publish(SyncEvent::EntityDespawned {
                id: entity.id,
                handle: entity.handle,
            });
        }
    }

    /// Terminal detonation. The first explode removes the entity and
    /// hands the visual cue to whoever is subscribed; a duplicate finds
    /// the id gone and is a no-op.
    pub fn explode(
        &mut self,
        registry: &mut EntityRegistry,
        events: &mut EventBus,
        id: &ObjectId,
        position: Position,
        radius: f32,
    ) {
        self.activators.remove(id);
        let Some(entity) = registry.despawn(id) else {
            trace!("duplicate explode for {id}");
            return;
        };
        events.publish(SyncEvent::TransientExploded {
            id: entity.id.clone(),
            position,
            radius,
        });
        events.publish(SyncEvent::EntityDespawned {
            id: entity.id,
            handle: entity.handle,
        });
    }

    /// Who triggered this transient, for self-collision suppression.
    pub fn activator_of(&self, id: &ObjectId) -> Option<&SessionId> {
        self.activators.get(id)
    }

    /// Mark a pickup as claimed by the local player. Returns true the
    /// first time; later calls return false so duplicate claim requests
    /// are never sent for the same pickup.
    pub fn claim_pickup(&mut self, id: &ObjectId) -> bool {
        self.claimed_pickups.insert(id.clone())
    }

    /// Forget all transient bookkeeping (connection teardown).
    pub fn clear(&mut self) {
        self.activators.clear();
        self.claimed_pickups.clear();
    }
}
