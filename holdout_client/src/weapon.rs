// Weapon & ammo synchronizer: optimistic prediction under authoritative
// correction.
//
// The player expects the ammo counter to drop the instant they fire,
// but the server is the only party that actually consumes ammo and
// rules on fire-rate/reload legality. The blend:
// - `predict_fire` decrements the local count immediately when the
//   local gate allows it (ammo available, not reloading). The fire
//   intent goes to the server regardless of the prediction.
// - `apply_weapon_state` overwrites the whole state from a server
//   snapshot. Authoritative values always win; predicted drift is
//   discarded by full overwrite, not merged.
// - `on_fire_rejected` deliberately takes no corrective action beyond
//   logging. The next authoritative push repairs any misprediction, so
//   a rollback path would only add a second source of truth.
//
// Reload flags are edge-triggered by explicit server messages. The
// client never times out a reload on its own — if `reloadCompleted` is
// lost, the next weapon snapshot clears the flag.
//
// Display collaborators must be poked exactly once per distinct change
// of {name, ammo, capacity, reserve, reloading}, not once per message;
// `notify_if_changed` keeps the last published tuple to enforce that.

use log::{debug, warn};

use holdout_protocol::message::{AmmoCounts, WeaponSnapshot};
use holdout_protocol::types::{AmmoType, WeaponType};

use crate::ammo::{AmmoInventory, max_for};
use crate::events::{EventBus, SyncEvent};

/// The local mirror of the equipped weapon. Mutated by prediction and
/// by authoritative snapshots; the server owns every field.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponState {
    pub weapon_name: String,
    pub weapon_type: Option<WeaponType>,
    pub ammo_type: AmmoType,
    pub current_ammo: i32,
    pub magazine_capacity: i32,
    pub reserve_ammo: i32,
    pub is_reloading: bool,
    pub reload_time_remaining: f32,
}

impl Default for WeaponState {
    fn default() -> Self {
        Self {
            weapon_name: String::new(),
            weapon_type: None,
            ammo_type: AmmoType::None,
            current_ammo: 0,
            magazine_capacity: 0,
            reserve_ammo: 0,
            is_reloading: false,
            reload_time_remaining: 0.0,
        }
    }
}

/// Change-detection tuple: the fields whose change warrants a display
/// refresh.
type ChangeKey = (String, i32, i32, i32, bool);

/// The local player's weapon + reserve ammo synchronizer.
#[derive(Default)]
pub struct WeaponSync {
    state: WeaponState,
    ammo: AmmoInventory,
    last_notified: Option<ChangeKey>,
}

impl WeaponSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WeaponState {
        &self.state
    }

    pub fn ammo(&self) -> &AmmoInventory {
        &self.ammo
    }

    /// Optimistically consume one round for a fire intent. Returns
    /// whether the prediction was applied; the caller sends the intent
    /// to the server either way — final legality is server-determined.
    pub fn predict_fire(&mut self, events: &mut EventBus) -> bool {
        if self.state.current_ammo > 0 && !self.state.is_reloading {
            self.state.current_ammo -= 1;
            self.notify_if_changed(events);
            true
        } else {
            false
        }
    }

    /// Whether a reload request is worth sending (the server ignores
    /// reload requests mid-reload anyway).
    pub fn can_request_reload(&self) -> bool {
        !self.state.is_reloading
    }

    /// Unconditional full overwrite from a server snapshot. Values are
    /// clamped into their invariant ranges; any predicted drift is
    /// discarded.
    pub fn apply_weapon_state(&mut self, snapshot: &WeaponSnapshot, events: &mut EventBus) {
        self.state.weapon_name = snapshot.weapon_name.clone();
        self.state.weapon_type = Some(snapshot.weapon_type);
        self.state.ammo_type = snapshot.ammo_type;
        self.state.magazine_capacity = snapshot.magazine_capacity.max(0);
        self.state.current_ammo = snapshot.current_ammo.clamp(0, self.state.magazine_capacity);
        self.state.reserve_ammo = snapshot.reserve_ammo.clamp(0, max_for(snapshot.ammo_type));
        self.state.is_reloading = snapshot.is_reloading;
        self.state.reload_time_remaining = snapshot.reload_time_remaining.max(0.0);
        self.notify_if_changed(events);
    }

    /// The server started reloading. Edge-triggered; no local timer.
    pub fn on_reload_started(&mut self, weapon_name: &str, reload_time: f32, events: &mut EventBus) {
        debug!("reloading {weapon_name} ({reload_time}s)");
        self.state.is_reloading = true;
        self.state.reload_time_remaining = reload_time.max(0.0);
        self.notify_if_changed(events);
    }

    /// The reload finished; the message may carry the refreshed
    /// snapshot, which then wins wholesale.
    pub fn on_reload_completed(
        &mut self,
        snapshot: Option<&WeaponSnapshot>,
        events: &mut EventBus,
    ) {
        self.state.is_reloading = false;
        self.state.reload_time_remaining = 0.0;
        match snapshot {
            Some(snapshot) => self.apply_weapon_state(snapshot, events),
            None => self.notify_if_changed(events),
        }
    }

    /// The server refused a fire intent. Log and wait: the next
    /// authoritative push corrects any misprediction. No rollback.
    pub fn on_fire_rejected(&self, reason: &str) {
        warn!("fire request rejected: {reason}");
    }

    /// Apply a partial reserve-ammo sync from the server.
    pub fn sync_ammo(&mut self, counts: &AmmoCounts, events: &mut EventBus) {
        if self.ammo.sync_from_server(counts) {
            self.publish_ammo(events);
        }
    }

    /// The server granted an ammo pickup. Returns the rounds actually
    /// banked (zero at the cap).
    pub fn apply_ammo_pickup(
        &mut self,
        ammo_type: AmmoType,
        amount: i32,
        events: &mut EventBus,
    ) -> i32 {
        let applied = self.ammo.add(ammo_type, amount);
        if applied != 0 {
            self.publish_ammo(events);
        } else {
            debug!("ammo pickup applied nothing ({ammo_type:?} at cap)");
        }
        applied
    }

    /// Forget everything (connection teardown).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn change_key(&self) -> ChangeKey {
        (
            self.state.weapon_name.clone(),
            self.state.current_ammo,
            self.state.magazine_capacity,
            self.state.reserve_ammo,
            self.state.is_reloading,
        )
    }

    fn notify_if_changed(&mut self, events: &mut EventBus) {
        let key = self.change_key();
        if self.last_notified.as_ref() == Some(&key) {
            return;
        }
        events.publish(SyncEvent::WeaponChanged {
            weapon_name: key.0.clone(),
            current_ammo: key.1,
            magazine_capacity: key.2,
            reserve_ammo: key.3,
            is_reloading: key.4,
        });
        self.last_notified = Some(key);
    }

    fn publish_ammo(&self, events: &mut EventBus) {
        let (pistol, rifle, sniper, shotgun) = self.ammo.totals();
        events.publish(SyncEvent::AmmoChanged {
            pistol,
            rifle,
            sniper,
            shotgun,
        });
    }
}
