// Composition root: one `GameClient` owns the connection, the registry,
// the synchronizers, and the event bus. No global instance — the host
// constructs one and passes it (or its subscription receivers) to
// whoever needs them.
//
// Everything runs on the host's tick thread. `tick(dt)` drains the
// connection inbox and dispatches every frame to completion, in arrival
// order; local intents flow the other way through the outbound encoder.
// The only other thread is the connection's reader, which never touches
// state here.
//
// The local session id arrives inside `initialState`, not as part of
// the connect handshake. `LocalIdProbe` models the bounded wait for it:
// one attempt per 0.1 s of accumulated tick time, abandoned with a
// warning after 100 attempts (~10 s). The probe never blocks — it is
// advanced cooperatively by `tick` and cancelled by teardown.

use std::sync::mpsc::Receiver;

use log::{debug, trace, warn};

use holdout_protocol::codec::{DecodeError, decode_server_message};
use holdout_protocol::message::ClientMessage;
use holdout_protocol::types::{AmmoType, ObjectId, Position, SessionId};

use crate::ammo::AmmoInventory;
use crate::connection::{ConnectConfig, Connection, ConnectionState, Inbound};
use crate::error::ConnectionError;
use crate::events::{EventBus, SyncEvent};
use crate::inventory::InventorySync;
use crate::outbound::OutboundEncoder;
use crate::player::{PlayerState, PlayerStateSync};
use crate::registry::EntityRegistry;
use crate::transient::TransientManager;
use crate::weapon::{WeaponState, WeaponSync};

/// Accumulated tick time per identity-probe attempt, in seconds.
pub const LOCAL_ID_POLL_INTERVAL: f32 = 0.1;

/// Attempts before the identity probe gives up (~10 s at the interval).
pub const LOCAL_ID_MAX_ATTEMPTS: u32 = 100;

/// Where the bounded wait for the local session id stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeState {
    /// Still polling each tick.
    Waiting,
    /// The id arrived.
    Resolved,
    /// Attempts exhausted; reported and abandoned, not retried.
    Abandoned,
    /// Teardown cancelled the wait.
    Cancelled,
}

/// Cooperative, non-blocking wait for the local session id.
pub struct LocalIdProbe {
    accumulated: f32,
    attempts: u32,
    state: ProbeState,
}

impl Default for LocalIdProbe {
    fn default() -> Self {
        Self {
            accumulated: 0.0,
            attempts: 0,
            state: ProbeState::Waiting,
        }
    }
}

impl LocalIdProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the probe by one tick's worth of time. Counts an attempt
    /// per poll interval; gives up after the attempt limit.
    pub fn tick(&mut self, dt: f32) {
        if self.state != ProbeState::Waiting {
            return;
        }
        self.accumulated += dt;
        while self.accumulated >= LOCAL_ID_POLL_INTERVAL && self.state == ProbeState::Waiting {
            self.accumulated -= LOCAL_ID_POLL_INTERVAL;
            self.attempts += 1;
            if self.attempts >= LOCAL_ID_MAX_ATTEMPTS {
                warn!("no session id after {} attempts, giving up", self.attempts);
                self.state = ProbeState::Abandoned;
            }
        }
    }

    /// The id arrived; stop polling.
    pub fn resolve(&mut self) {
        if self.state == ProbeState::Waiting {
            self.state = ProbeState::Resolved;
        }
    }

    /// Teardown; stop polling without reporting a failure.
    pub fn cancel(&mut self) {
        if self.state == ProbeState::Waiting {
            self.state = ProbeState::Cancelled;
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// The client-side synchronization layer, fully assembled.
pub struct GameClient {
    pub(crate) connection: Connection,
    pub(crate) events: EventBus,
    pub(crate) registry: EntityRegistry,
    pub(crate) players: PlayerStateSync,
    pub(crate) weapon: WeaponSync,
    pub(crate) inventory: InventorySync,
    pub(crate) transients: TransientManager,
    pub(crate) outbound: OutboundEncoder,
    pub(crate) local_id: Option<SessionId>,
    pub(crate) probe: LocalIdProbe,
    announce_connected: bool,
    torn_down: bool,
}

impl GameClient {
    /// Establish the server channel. Terminal failure for the session if
    /// the endpoint is unreachable — there is no automatic reconnect.
    pub fn connect(config: &ConnectConfig) -> Result<Self, ConnectionError> {
        let connection = Connection::connect(config)?;
        Ok(Self {
            connection,
            events: EventBus::new(),
            registry: EntityRegistry::new(),
            players: PlayerStateSync::new(),
            weapon: WeaponSync::new(),
            inventory: InventorySync::new(),
            transients: TransientManager::new(),
            outbound: OutboundEncoder::new(),
            local_id: None,
            probe: LocalIdProbe::new(),
            announce_connected: true,
            torn_down: false,
        })
    }

    /// Register an observer for state-change events.
    pub fn subscribe(&mut self) -> Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Drain and dispatch everything the server sent since the last
    /// tick, in arrival order, then advance the identity probe. Called
    /// once per host frame.
    pub fn tick(&mut self, dt: f32) {
        if self.announce_connected {
            self.announce_connected = false;
            self.events.publish(SyncEvent::Connected);
        }

        for inbound in self.connection.poll() {
            match inbound {
                Inbound::Frame(frame) => match decode_server_message(&frame) {
                    Ok(msg) => self.dispatch(msg),
                    // Forward compatibility: unknown tags are ignored.
                    Err(DecodeError::UnknownTag(tag)) => {
                        debug!("ignoring unknown message tag `{tag}`")
                    }
                    // Malformed frames are dropped; the loop lives on.
                    Err(DecodeError::Malformed(err)) => {
                        warn!("dropping malformed message: {err}")
                    }
                },
                Inbound::Closed => self.teardown_world(),
            }
        }

        if self.local_id.is_none() && self.connection.is_open() {
            self.probe.tick(dt);
        }
    }

    // -- local intents ------------------------------------------------------

    /// Movement input axes, sent every time the host reports them.
    pub fn send_move_input(&mut self, horizontal: f32, vertical: f32) {
        let msg = self.outbound.move_input(horizontal, vertical);
        self.send(msg);
    }

    /// Aim direction (normalized before transmission).
    pub fn send_aim(&mut self, direction: Position) {
        let msg = self.outbound.aim(direction);
        self.send(msg);
    }

    /// Throttled local position report; quiet ticks send nothing.
    pub fn report_position(&mut self, position: Position, dt: f32) {
        if let Some(msg) = self.outbound.update_position(position, dt) {
            self.send(msg);
        }
    }

    /// Fire intent. Optimistically consumes one round when the local
    /// gate allows; the intent is sent to the server regardless.
    /// Returns whether the prediction was applied.
    pub fn request_fire(&mut self, fire_point: Position, direction: Position) -> bool {
        let predicted = self.weapon.predict_fire(&mut self.events);
        let msg = self.outbound.shoot_request(fire_point, direction);
        self.send(msg);
        predicted
    }

    /// Reload intent. Skipped while a reload is already running.
    pub fn request_reload(&mut self) {
        if !self.weapon.can_request_reload() {
            debug!("already reloading");
            return;
        }
        let msg = self.outbound.reload_request();
        self.send(msg);
    }

    /// Advisory slot switch; the active slot changes only on the
    /// server's confirmation. Returns whether the request was sent.
    pub fn request_slot_switch(&mut self, index: usize) -> bool {
        if !self.inventory.can_request_switch(index) {
            return false;
        }
        let msg = self.outbound.inventory_switch(index);
        self.send(msg);
        true
    }

    /// Consume the item in a slot, if it is a consumable.
    pub fn use_item(&mut self, index: usize) -> bool {
        if !self.inventory.can_use_item(index) {
            debug!("slot {index} holds no consumable");
            return false;
        }
        let msg = self.outbound.use_item(index);
        self.send(msg);
        true
    }

    /// Throw a grenade, if the active slot has one left.
    pub fn throw_grenade(&mut self, position: Position, direction: Position) -> bool {
        if !self.inventory.can_throw_grenade() {
            debug!("no grenade in hand");
            return false;
        }
        let msg = self.outbound.throw_grenade(position, direction);
        self.send(msg);
        true
    }

    /// Melee strike on a target player.
    pub fn melee_attack(&mut self, target_id: SessionId, damage: f32) {
        let msg = self.outbound.melee_attack(target_id, damage);
        self.send(msg);
    }

    /// Claim an ammo pickup the local player touched. At most one claim
    /// is ever sent per pickup id. Returns whether the claim went out.
    pub fn claim_ammo_pickup(
        &mut self,
        pickup_id: &ObjectId,
        ammo_type: AmmoType,
        amount: i32,
    ) -> bool {
        if !self.registry.contains(pickup_id) {
            debug!("pickup {pickup_id} is already gone");
            return false;
        }
        if !self.transients.claim_pickup(pickup_id) {
            trace!("pickup {pickup_id} already claimed");
            return false;
        }
        let msg = self.outbound.ammo_pickup(pickup_id.clone(), ammo_type, amount);
        self.send(msg);
        true
    }

    /// Report a bullet collision observed locally. Suppressed when the
    /// struck player is the bullet's own activator.
    pub fn report_bullet_collision(&mut self, id: &ObjectId, struck: Option<&SessionId>) {
        if struck.is_some() && self.transients.activator_of(id) == struck {
            trace!("suppressing self-collision for {id}");
            return;
        }
        let msg = self.outbound.bullet_collide(id.clone());
        self.send(msg);
    }

    // -- lifecycle ----------------------------------------------------------

    /// Scoped shutdown: cancel pending waits, close the channel, release
    /// every mirrored entity. Idempotent.
    pub fn close(&mut self) {
        self.probe.cancel();
        self.connection.close();
        self.teardown_world();
    }

    /// Release all mirrored state and announce the disconnect. Runs on
    /// local close and on peer-initiated close, exactly once.
    fn teardown_world(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.probe.cancel();

        for entity in self.registry.clear() {
            self.events.publish(SyncEvent::EntityDespawned {
                id: entity.id,
                handle: entity.handle,
            });
        }
        self.players.clear();
        self.weapon.reset();
        self.inventory.reset();
        self.transients.clear();
        self.outbound.reset();

        self.events.publish(SyncEvent::Disconnected);
    }

    fn send(&mut self, msg: ClientMessage) {
        // Fire-and-forget: failures are logged, never retried.
        if let Err(err) = self.connection.send(&msg) {
            warn!("dropping outbound message: {err}");
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// The local peer's session id, once `initialState` has arrived.
    pub fn local_id(&self) -> Option<&SessionId> {
        self.local_id.as_ref()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn player_state(&self, id: &ObjectId) -> Option<&PlayerState> {
        self.players.state(id)
    }

    pub fn weapon_state(&self) -> &WeaponState {
        self.weapon.state()
    }

    pub fn ammo(&self) -> &AmmoInventory {
        self.weapon.ammo()
    }

    pub fn inventory(&self) -> &InventorySync {
        &self.inventory
    }

    pub fn identity_probe(&self) -> &LocalIdProbe {
        &self.probe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_counts_attempts_per_interval() {
        let mut probe = LocalIdProbe::new();
        // 0.25 s = two whole intervals.
        probe.tick(0.25);
        assert_eq!(probe.attempts(), 2);
        assert_eq!(probe.state(), ProbeState::Waiting);
    }

    #[test]
    fn probe_abandons_after_attempt_limit() {
        let mut probe = LocalIdProbe::new();
        for _ in 0..LOCAL_ID_MAX_ATTEMPTS {
            probe.tick(LOCAL_ID_POLL_INTERVAL);
        }
        assert_eq!(probe.state(), ProbeState::Abandoned);
        assert_eq!(probe.attempts(), LOCAL_ID_MAX_ATTEMPTS);

        // Further ticks change nothing.
        probe.tick(1.0);
        assert_eq!(probe.attempts(), LOCAL_ID_MAX_ATTEMPTS);
    }

    #[test]
    fn probe_resolve_stops_the_count() {
        let mut probe = LocalIdProbe::new();
        probe.tick(0.15);
        probe.resolve();
        probe.tick(5.0);
        assert_eq!(probe.state(), ProbeState::Resolved);
        assert_eq!(probe.attempts(), 1);
    }

    #[test]
    fn probe_cancel_wins_only_while_waiting() {
        let mut probe = LocalIdProbe::new();
        probe.resolve();
        probe.cancel();
        assert_eq!(probe.state(), ProbeState::Resolved);

        let mut probe = LocalIdProbe::new();
        probe.cancel();
        assert_eq!(probe.state(), ProbeState::Cancelled);
    }
}
