// Inventory synchronizer: the local player's slot array.
//
// Slot contents and the active index are server-authoritative. The
// client's slot-switch requests are advisory — validated locally only
// for bounds and occupancy, then sent; the active slot actually moves
// when the server answers with its `inventoryUpdate` confirmation.
// Until then the previous slot stays active, which is what feeds the
// weapon synchronizer a consistent view.
//
// Snapshots may carry fewer slots than the fixed capacity; missing
// trailing slots are empty. Reads never index out of range: the active
// index is clamped into `[0, slot_count)` at every boundary.

use log::debug;

use holdout_protocol::message::{InventorySnapshot, ItemKind, SlotItem};

use crate::events::{EventBus, SyncEvent};

/// Fixed slot capacity.
pub const MAX_SLOTS: usize = 6;

/// The local player's slots and active-slot index.
pub struct InventorySync {
    slots: Vec<Option<SlotItem>>,
    active_index: usize,
}

impl Default for InventorySync {
    fn default() -> Self {
        Self {
            slots: vec![None; MAX_SLOTS],
            active_index: 0,
        }
    }
}

impl InventorySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the slot array and active index from a server
    /// snapshot. Slots beyond the provided count are empty; extra
    /// provided slots are dropped.
    pub fn set_full_inventory(&mut self, snapshot: &InventorySnapshot, events: &mut EventBus) {
        let mut slots: Vec<Option<SlotItem>> =
            snapshot.items.iter().take(MAX_SLOTS).cloned().collect();
        slots.resize(MAX_SLOTS, None);
        self.slots = slots;
        self.active_index = snapshot.active_index.min(MAX_SLOTS - 1);

        events.publish(SyncEvent::InventoryChanged);
        events.publish(SyncEvent::ActiveSlotChanged {
            index: self.active_index,
        });
    }

    /// Local validation for an advisory slot-switch request: in bounds
    /// and occupied. The active index does not move here.
    pub fn can_request_switch(&self, index: usize) -> bool {
        if index >= MAX_SLOTS {
            debug!("slot switch request out of bounds: {index}");
            return false;
        }
        if self.slots[index].is_none() {
            debug!("slot switch request to empty slot {index}");
            return false;
        }
        true
    }

    /// Server-confirmed active slot, carrying that slot's contents.
    /// This is the only path that moves the active index.
    pub fn apply_active_slot(
        &mut self,
        index: usize,
        item: Option<SlotItem>,
        events: &mut EventBus,
    ) {
        let index = index.min(MAX_SLOTS - 1);
        self.slots[index] = item;
        self.active_index = index;

        events.publish(SyncEvent::InventoryChanged);
        events.publish(SyncEvent::ActiveSlotChanged { index });
    }

    /// The item currently in hand, if the active slot is occupied.
    pub fn active_item(&self) -> Option<&SlotItem> {
        self.slots
            .get(self.active_index.min(MAX_SLOTS - 1))
            .and_then(|slot| slot.as_ref())
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn slot(&self, index: usize) -> Option<&SlotItem> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Whether the slot holds a consumable (health/shield pack).
    pub fn can_use_item(&self, index: usize) -> bool {
        matches!(
            self.slot(index).map(|item| item.kind),
            Some(ItemKind::Health | ItemKind::Shield)
        )
    }

    /// Whether the active item is a grenade with at least one left.
    pub fn can_throw_grenade(&self) -> bool {
        matches!(
            self.active_item(),
            Some(item) if item.kind == ItemKind::Grenade && item.amount.unwrap_or(0) > 0
        )
    }

    /// Forget everything (connection teardown).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
