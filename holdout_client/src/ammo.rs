// Reserve ammo pools, one per ammunition type.
//
// Four pooled types, always present, default zero. Every mutation is
// clamped into `[0, max]` for its type; `add` clips at the cap and
// reports the delta actually applied so pickup feedback can show the
// real amount gained. The melee sentinel (`AmmoType::None`) has no pool:
// it always "has ammo" and never stores any.
//
// Server syncs are partial by design — the message carries only the
// types that changed, and absent types keep their local value.

use std::collections::BTreeMap;

use holdout_protocol::message::AmmoCounts;
use holdout_protocol::types::AmmoType;

/// Per-type pool maxima.
pub const MAX_PISTOL_AMMO: i32 = 120;
pub const MAX_RIFLE_AMMO: i32 = 90;
pub const MAX_SNIPER_AMMO: i32 = 30;
pub const MAX_SHOTGUN_SHELLS: i32 = 24;

/// Maximum reserve for an ammo type. Melee has no pool.
pub fn max_for(ammo_type: AmmoType) -> i32 {
    match ammo_type {
        AmmoType::None => 0,
        AmmoType::Pistol => MAX_PISTOL_AMMO,
        AmmoType::Rifle => MAX_RIFLE_AMMO,
        AmmoType::Sniper => MAX_SNIPER_AMMO,
        AmmoType::Shotgun => MAX_SHOTGUN_SHELLS,
    }
}

/// The local player's reserve pools.
#[derive(Clone, Debug, PartialEq)]
pub struct AmmoInventory {
    counts: BTreeMap<AmmoType, i32>,
}

impl Default for AmmoInventory {
    fn default() -> Self {
        Self {
            counts: AmmoType::POOLED.iter().map(|t| (*t, 0)).collect(),
        }
    }
}

impl AmmoInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for a type. The melee sentinel reports zero.
    pub fn count(&self, ammo_type: AmmoType) -> i32 {
        self.counts.get(&ammo_type).copied().unwrap_or(0)
    }

    /// Whether `amount` rounds of `ammo_type` are available. Melee
    /// always has ammo.
    pub fn has(&self, ammo_type: AmmoType, amount: i32) -> bool {
        ammo_type == AmmoType::None || self.count(ammo_type) >= amount
    }

    /// Consume `amount` rounds. Fails (untouched) when insufficient.
    /// Melee always succeeds.
    pub fn use_ammo(&mut self, ammo_type: AmmoType, amount: i32) -> bool {
        if ammo_type == AmmoType::None {
            return true;
        }
        if !self.has(ammo_type, amount) {
            return false;
        }
        if let Some(count) = self.counts.get_mut(&ammo_type) {
            *count -= amount;
        }
        true
    }

    /// Add rounds, clipping at the type's maximum. Returns the delta
    /// actually applied — zero when already at the cap (or for melee).
    pub fn add(&mut self, ammo_type: AmmoType, amount: i32) -> i32 {
        if ammo_type == AmmoType::None || amount <= 0 {
            return 0;
        }
        let max = max_for(ammo_type);
        let current = self.count(ammo_type);
        let new_amount = (current + amount).min(max);
        let applied = new_amount - current;
        self.counts.insert(ammo_type, new_amount);
        applied
    }

    /// Authoritative overwrite for one type, clamped into `[0, max]`.
    pub fn set(&mut self, ammo_type: AmmoType, amount: i32) {
        if ammo_type == AmmoType::None {
            return;
        }
        let clamped = amount.clamp(0, max_for(ammo_type));
        self.counts.insert(ammo_type, clamped);
    }

    /// Apply a partial server sync: only the types present in the map
    /// are overwritten. Returns whether anything changed.
    pub fn sync_from_server(&mut self, server_counts: &AmmoCounts) -> bool {
        let before = self.counts.clone();
        for (ammo_type, amount) in server_counts {
            self.set(*ammo_type, *amount);
        }
        self.counts != before
    }

    /// All four pool counts in (pistol, rifle, sniper, shotgun) order,
    /// for display collaborators.
    pub fn totals(&self) -> (i32, i32, i32, i32) {
        (
            self.count(AmmoType::Pistol),
            self.count(AmmoType::Rifle),
            self.count(AmmoType::Sniper),
            self.count(AmmoType::Shotgun),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_start_at_zero() {
        let inv = AmmoInventory::new();
        assert_eq!(inv.totals(), (0, 0, 0, 0));
    }

    #[test]
    fn add_reports_applied_delta() {
        let mut inv = AmmoInventory::new();
        assert_eq!(inv.add(AmmoType::Pistol, 30), 30);
        assert_eq!(inv.count(AmmoType::Pistol), 30);
    }

    #[test]
    fn add_clips_at_the_cap() {
        let mut inv = AmmoInventory::new();
        inv.set(AmmoType::Shotgun, 20);
        // Cap is 24; only 4 fit.
        assert_eq!(inv.add(AmmoType::Shotgun, 10), 4);
        assert_eq!(inv.count(AmmoType::Shotgun), MAX_SHOTGUN_SHELLS);
    }

    #[test]
    fn add_at_cap_applies_nothing() {
        let mut inv = AmmoInventory::new();
        inv.set(AmmoType::Rifle, MAX_RIFLE_AMMO);
        assert_eq!(inv.add(AmmoType::Rifle, 30), 0);
        assert_eq!(inv.count(AmmoType::Rifle), MAX_RIFLE_AMMO);
    }

    #[test]
    fn add_to_melee_applies_nothing() {
        let mut inv = AmmoInventory::new();
        assert_eq!(inv.add(AmmoType::None, 10), 0);
    }

    #[test]
    fn set_clamps_into_range() {
        let mut inv = AmmoInventory::new();
        inv.set(AmmoType::Sniper, 999);
        assert_eq!(inv.count(AmmoType::Sniper), MAX_SNIPER_AMMO);
        inv.set(AmmoType::Sniper, -5);
        assert_eq!(inv.count(AmmoType::Sniper), 0);
    }

    #[test]
    fn use_ammo_fails_when_insufficient() {
        let mut inv = AmmoInventory::new();
        inv.set(AmmoType::Pistol, 2);
        assert!(!inv.use_ammo(AmmoType::Pistol, 3));
        assert_eq!(inv.count(AmmoType::Pistol), 2);
        assert!(inv.use_ammo(AmmoType::Pistol, 2));
        assert_eq!(inv.count(AmmoType::Pistol), 0);
    }

    #[test]
    fn melee_always_has_ammo() {
        let mut inv = AmmoInventory::new();
        assert!(inv.has(AmmoType::None, 1));
        assert!(inv.use_ammo(AmmoType::None, 1));
        assert_eq!(inv.count(AmmoType::None), 0);
    }

    #[test]
    fn partial_sync_touches_only_present_types() {
        let mut inv = AmmoInventory::new();
        inv.set(AmmoType::Pistol, 50);
        inv.set(AmmoType::Rifle, 40);

        let server = AmmoCounts::from([(AmmoType::Pistol, 10)]);
        assert!(inv.sync_from_server(&server));
        assert_eq!(inv.count(AmmoType::Pistol), 10);
        assert_eq!(inv.count(AmmoType::Rifle), 40, "absent types untouched");
    }

    #[test]
    fn sync_reports_no_change_for_identical_values() {
        let mut inv = AmmoInventory::new();
        inv.set(AmmoType::Sniper, 12);
        let server = AmmoCounts::from([(AmmoType::Sniper, 12)]);
        assert!(!inv.sync_from_server(&server));
    }

    #[test]
    fn sync_clamps_out_of_range_server_values() {
        let mut inv = AmmoInventory::new();
        let server = AmmoCounts::from([(AmmoType::Pistol, 500), (AmmoType::Rifle, -3)]);
        assert!(inv.sync_from_server(&server));
        assert_eq!(inv.count(AmmoType::Pistol), MAX_PISTOL_AMMO);
        assert_eq!(inv.count(AmmoType::Rifle), 0);
    }
}
