// Change notifications published by the synchronization layer.
//
// External collaborators (HUD, renderer, input gating) observe state
// changes through an `EventBus`: they call `subscribe()` and drain the
// returned receiver on their own schedule. The bus never knows who is
// listening — subscribers are anonymous mpsc senders, and ones whose
// receiver was dropped are pruned on the next publish.
//
// Events describe what changed, not what to draw. Notably,
// `HealthChanged` fires on every authoritative health update even when
// the values are unchanged (the server's re-send is the signal), while
// `WeaponChanged` fires exactly once per distinct change — both policies
// are part of the protocol contract, not accidents.

use std::sync::mpsc::{Receiver, Sender, channel};

use holdout_protocol::types::{EntityKind, ObjectId, Position, SessionId};

use crate::registry::EntityHandle;

/// A state change observable by presentation-layer collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
    /// The channel reached the open state.
    Connected,
    /// The channel was torn down (locally or by the peer).
    Disconnected,
    /// A networked object came into existence.
    EntitySpawned {
        id: ObjectId,
        kind: EntityKind,
        handle: EntityHandle,
        position: Position,
    },
    /// A networked object was released. Fires exactly once per entity.
    EntityDespawned { id: ObjectId, handle: EntityHandle },
    /// Authoritative health/shield values for a player (clamped).
    HealthChanged {
        id: ObjectId,
        health: i32,
        max_health: i32,
        shield: i32,
        max_shield: i32,
    },
    /// A player died.
    PlayerKilled { id: ObjectId },
    /// The local player died. UI/control collaborators react to this.
    LocalDefeat,
    /// The displayed weapon state changed (once per distinct change).
    WeaponChanged {
        weapon_name: String,
        current_ammo: i32,
        magazine_capacity: i32,
        reserve_ammo: i32,
        is_reloading: bool,
    },
    /// Reserve ammo pools changed.
    AmmoChanged {
        pistol: i32,
        rifle: i32,
        sniper: i32,
        shotgun: i32,
    },
    /// Slot contents changed (full snapshot or single-slot write).
    InventoryChanged,
    /// The server confirmed a new active slot.
    ActiveSlotChanged { index: usize },
    /// A transient detonated. Visual handlers play the explosion; the
    /// entity is already gone from the registry when this fires.
    TransientExploded {
        id: ObjectId,
        position: Position,
        radius: f32,
    },
    /// A melee strike happened (animation cue for the presentation layer).
    MeleeSwing {
        attacker_id: SessionId,
        target_id: SessionId,
        damage: f32,
    },
}

/// Fan-out publisher for `SyncEvent`s. Subscribers are anonymous;
/// dropped receivers are pruned lazily.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SyncEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its receiving end.
    pub fn subscribe(&mut self) -> Receiver<SyncEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver an event to every live subscriber.
    pub fn publish(&mut self, event: SyncEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_each_receive_published_events() {
        let mut bus = EventBus::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();

        bus.publish(SyncEvent::Connected);

        assert_eq!(rx1.try_recv().unwrap(), SyncEvent::Connected);
        assert_eq!(rx2.try_recv().unwrap(), SyncEvent::Connected);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut bus = EventBus::new();
        let rx1 = bus.subscribe();
        {
            let _rx2 = bus.subscribe();
        }
        // rx2 is gone; the next publish should prune it.
        bus.publish(SyncEvent::Disconnected);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(rx1.try_recv().unwrap(), SyncEvent::Disconnected);
    }

    #[test]
    fn publish_with_no_subscribers_is_a_noop() {
        let mut bus = EventBus::new();
        bus.publish(SyncEvent::LocalDefeat);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();

        bus.publish(SyncEvent::Connected);
        bus.publish(SyncEvent::ActiveSlotChanged { index: 2 });
        bus.publish(SyncEvent::Disconnected);

        assert_eq!(rx.try_recv().unwrap(), SyncEvent::Connected);
        assert_eq!(
            rx.try_recv().unwrap(),
            SyncEvent::ActiveSlotChanged { index: 2 }
        );
        assert_eq!(rx.try_recv().unwrap(), SyncEvent::Disconnected);
    }
}
