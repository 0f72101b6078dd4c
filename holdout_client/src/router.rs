// Message router: the single dispatch point from decoded inbound
// messages to the owning component.
//
// Dispatch is synchronous and runs to completion before the next
// message is processed — no re-entrancy, no reordering, no batching.
// Unknown tags never reach this module (the codec classifies them and
// the tick loop drops them), so every arm here is a known tag with a
// well-formed payload.
//
// Self-filtering: the server echoes position/aim updates for every
// player including the local one; updates about the local peer are
// ignored here because the local transform is owned by the host's
// input/movement collaborators, not by the mirror.

use log::{debug, trace};

use holdout_protocol::message::{PlayerSnapshot, ServerMessage};
use holdout_protocol::types::{EntityKind, ObjectId, Position, SessionId};

use crate::client::GameClient;
use crate::events::SyncEvent;
use crate::transient::TransientSpawn;

impl GameClient {
    /// Route one decoded message to its handler.
    pub(crate) fn dispatch(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::InitialState {
                session_id,
                others,
                inventory,
                weapon_state,
                ammo,
            } => {
                self.handle_initial_state(session_id, others);
                if let Some(snapshot) = inventory {
                    self.inventory.set_full_inventory(&snapshot, &mut self.events);
                }
                if let Some(snapshot) = weapon_state {
                    self.weapon.apply_weapon_state(&snapshot, &mut self.events);
                }
                if let Some(counts) = ammo {
                    self.weapon.sync_ammo(&counts, &mut self.events);
                }
            }
            ServerMessage::Spawn { player } => {
                self.spawn_player(&player);
            }
            ServerMessage::ServerPositionUpdate {
                session_id,
                position,
            } => {
                if self.is_local(&session_id) {
                    return;
                }
                self.registry
                    .update_position(&ObjectId::from(&session_id), position);
            }
            ServerMessage::PlayerLeft { session_id } => {
                self.handle_player_left(&session_id);
            }
            ServerMessage::Aim {
                session_id,
                direction,
            } => {
                if self.is_local(&session_id) {
                    return;
                }
                self.registry
                    .update_orientation(&ObjectId::from(&session_id), direction);
            }
            ServerMessage::HealthUpdate {
                session_id,
                health,
                max_health,
                shield,
                max_shield,
            } => {
                self.players.apply_health_update(
                    &ObjectId::from(&session_id),
                    health,
                    max_health,
                    shield,
                    max_shield,
                    &mut self.events,
                );
            }
            ServerMessage::PlayerKilled { session_id } => {
                let is_local = self.is_local(&session_id);
                self.players
                    .apply_kill(&ObjectId::from(&session_id), is_local, &mut self.events);
            }
            ServerMessage::ServerSpawn {
                name,
                id,
                position,
                direction,
                activator,
            } => {
                self.transients.spawn(
                    &mut self.registry,
                    &mut self.events,
                    TransientSpawn {
                        name,
                        id,
                        position,
                        direction,
                        activator,
                    },
                );
            }
            ServerMessage::ServerUnspawn { id } => {
                self.transients
                    .despawn(&mut self.registry, &mut self.events, &id);
            }
            ServerMessage::BulletMove { id, position }
            | ServerMessage::GrenadeMove { id, position } => {
                self.transients
                    .move_transient(&mut self.registry, &id, position);
            }
            ServerMessage::GrenadeExplode {
                id,
                position,
                radius,
            } => {
                self.transients
                    .explode(&mut self.registry, &mut self.events, &id, position, radius);
            }
            ServerMessage::InventoryUpdate {
                session_id,
                slot_index,
                item,
            } => {
                // Remote players' loadouts are a presentation concern;
                // the slot model mirrors the local player only.
                if !self.is_local(&session_id) {
                    trace!("inventory update for remote player {session_id}");
                    return;
                }
                self.inventory
                    .apply_active_slot(slot_index, item, &mut self.events);
            }
            ServerMessage::WeaponStateUpdate { weapon_state, ammo } => {
                if let Some(snapshot) = weapon_state {
                    self.weapon.apply_weapon_state(&snapshot, &mut self.events);
                }
                if let Some(counts) = ammo {
                    self.weapon.sync_ammo(&counts, &mut self.events);
                }
            }
            ServerMessage::FullPlayerState {
                inventory,
                weapon_state,
                ammo,
            } => {
                if let Some(snapshot) = inventory {
                    self.inventory.set_full_inventory(&snapshot, &mut self.events);
                }
                if let Some(snapshot) = weapon_state {
                    self.weapon.apply_weapon_state(&snapshot, &mut self.events);
                }
                if let Some(counts) = ammo {
                    self.weapon.sync_ammo(&counts, &mut self.events);
                }
            }
            ServerMessage::ReloadStarted {
                weapon_name,
                reload_time,
            } => {
                self.weapon
                    .on_reload_started(&weapon_name, reload_time, &mut self.events);
            }
            ServerMessage::ReloadCompleted { weapon_state } => {
                self.weapon
                    .on_reload_completed(weapon_state.as_ref(), &mut self.events);
            }
            ServerMessage::ShootRejected { reason } => {
                self.weapon.on_fire_rejected(&reason);
            }
            ServerMessage::AmmoPickupConfirmed {
                pickup_id,
                ammo_type,
                amount,
            } => {
                debug!("ammo pickup {pickup_id} confirmed: {amount} {ammo_type:?}");
                self.weapon
                    .apply_ammo_pickup(ammo_type, amount, &mut self.events);
            }
            ServerMessage::MeleeAttack {
                attacker_id,
                target_id,
                damage,
            } => {
                self.events.publish(SyncEvent::MeleeSwing {
                    attacker_id,
                    target_id,
                    damage,
                });
            }
        }
    }

    /// First message after connect: cache the session id (once), mirror
    /// the local player and every already-connected player.
    fn handle_initial_state(&mut self, session_id: SessionId, others: Vec<PlayerSnapshot>) {
        let local_id = match &self.local_id {
            Some(cached) => {
                debug!("duplicate initialState; keeping cached session id {cached}");
                cached.clone()
            }
            None => {
                self.probe.resolve();
                self.local_id = Some(session_id.clone());
                session_id
            }
        };

        self.spawn_player(&PlayerSnapshot {
            id: local_id,
            position: Position::ZERO,
            inventory: None,
        });
        for other in &others {
            self.spawn_player(other);
        }
    }

    /// Mirror one player: registry entry plus default vitals. Idempotent.
    fn spawn_player(&mut self, player: &PlayerSnapshot) {
        let id = ObjectId::from(&player.id);
        if self.registry.contains(&id) {
            trace!("duplicate player spawn for {id}");
            return;
        }
        let handle = self
            .registry
            .spawn(id.clone(), EntityKind::Player, player.position, None);
        self.players.create(id.clone());
        self.events.publish(SyncEvent::EntitySpawned {
            id,
            kind: EntityKind::Player,
            handle,
            position: player.position,
        });
    }

    fn handle_player_left(&mut self, session_id: &SessionId) {
        let id = ObjectId::from(session_id);
        self.players.remove(&id);
        if let Some(entity) = self.registry.despawn(&id) {
            self.events.publish(SyncEvent::EntityDespawned {
                id: entity.id,
                handle: entity.handle,
            });
        }
    }

    fn is_local(&self, session_id: &SessionId) -> bool {
        self.local_id.as_ref() == Some(session_id)
    }
}
