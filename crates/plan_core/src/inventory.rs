//! Owned-item snapshot: `item → enhancement level → count`, plus house-room levels.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{HouseRoomHrid, ItemHrid, Stock};

/// One stack as reported by the game's item-change notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterItem {
    pub item: ItemHrid,
    #[serde(default)]
    pub enhancement_level: u32,
    pub count: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    items: HashMap<ItemHrid, BTreeMap<u32, f64>>,
    #[serde(default)]
    house_rooms: HashMap<HouseRoomHrid, u32>,
}

impl InventorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: &[CharacterItem]) -> Self {
        let mut snapshot = Self::new();
        snapshot.apply_update(items);
        snapshot
    }

    /// Applies a batch of stack changes. Each `(item, level)` is replaced
    /// wholesale; stacks not mentioned are untouched.
    pub fn apply_update(&mut self, changes: &[CharacterItem]) {
        for change in changes {
            self.items
                .entry(change.item.clone())
                .or_default()
                .insert(change.enhancement_level, change.count);
        }
    }

    pub fn set_house_room_level(&mut self, room: HouseRoomHrid, level: u32) {
        self.house_rooms.insert(room, level);
    }

    /// Unenhanced count; enhanced stacks never satisfy material demand.
    pub fn owned_count(&self, item: &ItemHrid) -> f64 {
        self.count_at(item, 0)
    }

    pub fn count_at(&self, item: &ItemHrid, enhancement_level: u32) -> f64 {
        self.items
            .get(item)
            .and_then(|levels| levels.get(&enhancement_level))
            .copied()
            .unwrap_or(0.0)
    }

    /// Highest enhancement level with a positive count, `None` when no stack
    /// of the item is owned.
    pub fn max_enhancement_level(&self, item: &ItemHrid) -> Option<u32> {
        self.items.get(item).and_then(|levels| {
            levels
                .iter()
                .rev()
                .find(|(_, count)| **count > 0.0)
                .map(|(level, _)| *level)
        })
    }

    pub fn house_room_level(&self, room: &HouseRoomHrid) -> u32 {
        self.house_rooms.get(room).copied().unwrap_or(0)
    }

    pub fn house_room_levels(&self) -> &HashMap<HouseRoomHrid, u32> {
        &self.house_rooms
    }

    /// Level-0 counts for every item with a positive base stack.
    pub fn base_counts(&self) -> Stock {
        self.items
            .iter()
            .filter_map(|(item, levels)| {
                let count = levels.get(&0).copied().unwrap_or(0.0);
                (count > 0.0).then(|| (item.clone(), count))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.house_rooms.clear();
    }
}
