// Networked-entity registry: the single map from server-assigned ids to
// locally-owned proxy entities.
//
// Every server-owned object the client mirrors — players and transients
// alike — lives here, keyed by `ObjectId`. The registry is the only
// party that creates or releases proxies:
// - `spawn` is idempotent: a duplicate id returns the existing handle.
// - `despawn` releases exactly once; repeats are no-ops.
// - `update_position` / `update_orientation` tolerate unknown ids
//   silently (logged), because moves legitimately race with despawns
//   and spawns on an unordered-across-senders channel.
//
// Lookups are id-keyed only. There is deliberately no lookup-by-name:
// names are a presentation concern, never a correctness mechanism.
//
// Handles are opaque tokens for the presentation layer (it maps them to
// sprites or scene nodes). They are strictly increasing and never
// reused within a session, so a stale handle can never alias a newer
// entity.

use log::{debug, trace};
use rustc_hash::FxHashMap;

use holdout_protocol::types::{EntityKind, ObjectId, Position};

/// Opaque local proxy token. Strictly increasing, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

/// One mirrored server object.
#[derive(Clone, Debug)]
pub struct NetworkedEntity {
    pub id: ObjectId,
    pub kind: EntityKind,
    pub handle: EntityHandle,
    pub position: Position,
    /// Facing angle in degrees, derived from direction vectors via the
    /// protocol's atan2-minus-90 convention.
    pub facing_degrees: f32,
}

/// Id-keyed store of every live networked entity.
#[derive(Default)]
pub struct EntityRegistry {
    entities: FxHashMap<ObjectId, NetworkedEntity>,
    next_handle: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a proxy for `id`, or return the existing handle if one is
    /// already registered (idempotent spawn).
    pub fn spawn(
        &mut self,
        id: ObjectId,
        kind: EntityKind,
        position: Position,
        orientation_hint: Option<Position>,
    ) -> EntityHandle {
        if let Some(existing) = self.entities.get(&id) {
            trace!("duplicate spawn for {id}, keeping existing entity");
            return existing.handle;
        }

        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;

        let facing_degrees = orientation_hint.map_or(0.0, Position::facing_degrees);
        self.entities.insert(
            id.clone(),
            NetworkedEntity {
                id,
                kind,
                handle,
                position,
                facing_degrees,
            },
        );
        handle
    }

    /// Move an entity. Unknown ids are ignored — a move may arrive after
    /// the despawn or before the matching spawn.
    pub fn update_position(&mut self, id: &ObjectId, position: Position) {
        match self.entities.get_mut(id) {
            Some(entity) => entity.position = position,
            None => debug!("position update for unknown entity {id}"),
        }
    }

    /// Rotate an entity to face along `direction`. Unknown ids are
    /// ignored, as for `update_position`.
    pub fn update_orientation(&mut self, id: &ObjectId, direction: Position) {
        match self.entities.get_mut(id) {
            Some(entity) => entity.facing_degrees = direction.facing_degrees(),
            None => debug!("orientation update for unknown entity {id}"),
        }
    }

    /// Release an entity. Returns the released entry the first time;
    /// `None` thereafter (exactly-once release).
    pub fn despawn(&mut self, id: &ObjectId) -> Option<NetworkedEntity> {
        let removed = self.entities.remove(id);
        if removed.is_none() {
            trace!("despawn for unknown entity {id}");
        }
        removed
    }

    /// The only lookup primitive.
    pub fn find(&self, id: &ObjectId) -> Option<&NetworkedEntity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Release everything (connection teardown). Returns the released
    /// entities so despawn notifications can fire for each.
    pub fn clear(&mut self) -> Vec<NetworkedEntity> {
        let mut drained: Vec<NetworkedEntity> = self.entities.drain().map(|(_, e)| e).collect();
        // Deterministic notification order regardless of hash state.
        drained.sort_by_key(|e| e.handle);
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> ObjectId {
        ObjectId(s.into())
    }

    #[test]
    fn spawn_is_idempotent() {
        let mut registry = EntityRegistry::new();
        let first = registry.spawn(oid("a"), EntityKind::Player, Position::ZERO, None);
        let second = registry.spawn(
            oid("a"),
            EntityKind::Player,
            Position::new(9.0, 9.0),
            None,
        );
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        // The duplicate spawn must not have moved the entity.
        assert_eq!(registry.find(&oid("a")).unwrap().position, Position::ZERO);
    }

    #[test]
    fn handles_are_unique_and_increasing() {
        let mut registry = EntityRegistry::new();
        let a = registry.spawn(oid("a"), EntityKind::Player, Position::ZERO, None);
        let b = registry.spawn(oid("b"), EntityKind::Bullet, Position::ZERO, None);
        registry.despawn(&oid("a"));
        let c = registry.spawn(oid("c"), EntityKind::Other, Position::ZERO, None);
        assert!(a < b && b < c, "handles must be strictly increasing");
    }

    #[test]
    fn despawn_releases_exactly_once() {
        let mut registry = EntityRegistry::new();
        registry.spawn(oid("a"), EntityKind::Player, Position::ZERO, None);

        assert!(registry.despawn(&oid("a")).is_some());
        assert!(registry.despawn(&oid("a")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn update_position_ignores_unknown_id() {
        let mut registry = EntityRegistry::new();
        registry.update_position(&oid("ghost"), Position::new(1.0, 1.0));
        assert!(registry.is_empty());
    }

    #[test]
    fn update_position_moves_known_entity() {
        let mut registry = EntityRegistry::new();
        registry.spawn(oid("a"), EntityKind::Player, Position::ZERO, None);
        registry.update_position(&oid("a"), Position::new(3.0, -2.0));
        assert_eq!(
            registry.find(&oid("a")).unwrap().position,
            Position::new(3.0, -2.0)
        );
    }

    #[test]
    fn orientation_hint_applies_facing_convention() {
        let mut registry = EntityRegistry::new();
        // A bullet travelling "up" faces zero degrees.
        registry.spawn(
            oid("b"),
            EntityKind::Bullet,
            Position::ZERO,
            Some(Position::new(0.0, 1.0)),
        );
        let facing = registry.find(&oid("b")).unwrap().facing_degrees;
        assert!(facing.abs() < 1e-4, "up should face 0 degrees, got {facing}");
    }

    #[test]
    fn update_orientation_rederives_facing() {
        let mut registry = EntityRegistry::new();
        registry.spawn(oid("a"), EntityKind::Player, Position::ZERO, None);
        registry.update_orientation(&oid("a"), Position::new(1.0, 0.0));
        let facing = registry.find(&oid("a")).unwrap().facing_degrees;
        assert!((facing + 90.0).abs() < 1e-4, "right should face -90, got {facing}");
    }

    #[test]
    fn clear_returns_all_entities_in_handle_order() {
        let mut registry = EntityRegistry::new();
        registry.spawn(oid("a"), EntityKind::Player, Position::ZERO, None);
        registry.spawn(oid("b"), EntityKind::Bullet, Position::ZERO, None);
        registry.spawn(oid("c"), EntityKind::Pickup, Position::ZERO, None);

        let drained = registry.clear();
        assert!(registry.is_empty());
        let handles: Vec<u64> = drained.iter().map(|e| e.handle.0).collect();
        assert_eq!(handles, vec![0, 1, 2]);
    }
}
