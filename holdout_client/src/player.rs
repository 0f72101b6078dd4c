// Player state synchronizer: health, shield, and the death transition.
//
// Every value here is server-authoritative. The client applies whatever
// arrives — clamped into range — and never infers anything: in
// particular, `is_dead` flips only on an explicit kill message, never
// from health reaching zero locally (the server may be about to heal).
//
// `apply_health_update` notifies on every authoritative update, even
// when nothing changed. The server's re-send is itself a signal and the
// reference behavior performs no de-duplication here (contrast with the
// weapon synchronizer, which must notify once per distinct change).

use log::debug;
use rustc_hash::FxHashMap;

use holdout_protocol::types::ObjectId;

use crate::events::{EventBus, SyncEvent};

/// Default spawn health, matching the server's starting loadout.
pub const DEFAULT_MAX_HEALTH: i32 = 100;

/// Combat vitals for one player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub health: i32,
    pub max_health: i32,
    pub shield: i32,
    pub max_shield: i32,
    /// One-way transition: set by an explicit kill event, never cleared.
    pub is_dead: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            shield: 0,
            max_shield: 0,
            is_dead: false,
        }
    }
}

/// Per-player vitals store, keyed by the same ids as the registry.
#[derive(Default)]
pub struct PlayerStateSync {
    players: FxHashMap<ObjectId, PlayerState>,
}

impl PlayerStateSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create default vitals for a newly spawned player. Idempotent.
    pub fn create(&mut self, id: ObjectId) {
        self.players.entry(id).or_default();
    }

    /// Drop a departed player's vitals.
    pub fn remove(&mut self, id: &ObjectId) {
        self.players.remove(id);
    }

    pub fn state(&self, id: &ObjectId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Apply an authoritative health/shield update. Values are clamped
    /// into `[0, max]`; a change notification always fires, even for
    /// unchanged values. Unknown ids are ignored.
    pub fn apply_health_update(
        &mut self,
        id: &ObjectId,
        health: i32,
        max_health: i32,
        shield: i32,
        max_shield: i32,
        events: &mut EventBus,
    ) {
        let Some(state) = self.players.get_mut(id) else {
            debug!("health update for unknown player {id}");
            return;
        };

        state.max_health = max_health.max(0);
        state.health = health.clamp(0, state.max_health);
        state.max_shield = max_shield.max(0);
        state.shield = shield.clamp(0, state.max_shield);

        events.publish(SyncEvent::HealthChanged {
            id: id.clone(),
            health: state.health,
            max_health: state.max_health,
            shield: state.shield,
            max_shield: state.max_shield,
        });
    }

    /// Apply an explicit kill. Terminal for the player's combat
    /// participation; `is_local` additionally signals the defeat
    /// condition to UI/control collaborators.
    pub fn apply_kill(&mut self, id: &ObjectId, is_local: bool, events: &mut EventBus) {
        let Some(state) = self.players.get_mut(id) else {
            debug!("kill for unknown player {id}");
            return;
        };

        state.is_dead = true;
        events.publish(SyncEvent::PlayerKilled { id: id.clone() });
        if is_local {
            events.publish(SyncEvent::LocalDefeat);
        }
    }

    /// Drop every player's vitals (connection teardown).
    pub fn clear(&mut self) {
        self.players.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> ObjectId {
        ObjectId(s.into())
    }

    #[test]
    fn create_uses_spawn_defaults() {
        let mut sync = PlayerStateSync::new();
        sync.create(oid("a"));
        let state = sync.state(&oid("a")).unwrap();
        assert_eq!(state.health, 100);
        assert_eq!(state.max_health, 100);
        assert_eq!(state.shield, 0);
        assert!(!state.is_dead);
    }

    #[test]
    fn health_update_clamps_negative_health_to_zero() {
        let mut sync = PlayerStateSync::new();
        let mut bus = EventBus::new();
        sync.create(oid("a"));

        sync.apply_health_update(&oid("a"), -5, 100, 0, 50, &mut bus);
        let state = sync.state(&oid("a")).unwrap();
        assert_eq!(state.health, 0);
        assert_eq!(state.max_health, 100);
    }

    #[test]
    fn health_update_clamps_overheal_to_max() {
        let mut sync = PlayerStateSync::new();
        let mut bus = EventBus::new();
        sync.create(oid("a"));

        sync.apply_health_update(&oid("a"), 250, 100, 80, 50, &mut bus);
        let state = sync.state(&oid("a")).unwrap();
        assert_eq!(state.health, 100);
        assert_eq!(state.shield, 50);
    }

    #[test]
    fn health_update_notifies_even_when_unchanged() {
        let mut sync = PlayerStateSync::new();
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        sync.create(oid("a"));

        sync.apply_health_update(&oid("a"), 80, 100, 10, 50, &mut bus);
        sync.apply_health_update(&oid("a"), 80, 100, 10, 50, &mut bus);

        let events: Vec<SyncEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2, "no de-duplication of health updates");
    }

    #[test]
    fn health_update_for_unknown_player_is_ignored() {
        let mut sync = PlayerStateSync::new();
        let mut bus = EventBus::new();
        let rx = bus.subscribe();

        sync.apply_health_update(&oid("ghost"), 50, 100, 0, 0, &mut bus);
        assert!(sync.state(&oid("ghost")).is_none());
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn kill_is_one_way_and_signals_local_defeat() {
        let mut sync = PlayerStateSync::new();
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        sync.create(oid("me"));

        sync.apply_kill(&oid("me"), true, &mut bus);
        assert!(sync.state(&oid("me")).unwrap().is_dead);

        // A later health update does not revive the player.
        sync.apply_health_update(&oid("me"), 100, 100, 0, 0, &mut bus);
        assert!(sync.state(&oid("me")).unwrap().is_dead);

        let events: Vec<SyncEvent> = rx.try_iter().collect();
        assert_eq!(events[0], SyncEvent::PlayerKilled { id: oid("me") });
        assert_eq!(events[1], SyncEvent::LocalDefeat);
    }

    #[test]
    fn remote_kill_does_not_signal_local_defeat() {
        let mut sync = PlayerStateSync::new();
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        sync.create(oid("b"));

        sync.apply_kill(&oid("b"), false, &mut bus);

        let events: Vec<SyncEvent> = rx.try_iter().collect();
        assert_eq!(events, vec![SyncEvent::PlayerKilled { id: oid("b") }]);
    }
}
