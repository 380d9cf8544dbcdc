//! Read-only lookups the planner needs from static game data.
//!
//! Every lookup returns `None`/empty for missing data instead of failing; the
//! aggregator treats absence as a terminal node.

use crate::{
    ActionDef, ActionType, CategoryHrid, Constants, GameData, HouseRoomDef, HouseRoomHrid, ItemDef,
    ItemHrid, ItemQuantity,
};

const UNKNOWN_SORT_INDEX: u32 = 9999;

pub trait GameDataProvider {
    /// The production action (smithing, crafting, tailoring, cooking or brewing)
    /// that yields `item`, searched in `ActionType::PRODUCTION` order.
    fn producing_action(&self, item: &ItemHrid) -> Option<&ActionDef>;

    /// The gathering action whose drop table yields `item` directly, or yields
    /// the raw item that `item` is processed from.
    fn gathering_action(&self, item: &ItemHrid) -> Option<&ActionDef>;

    /// Costs of `item` when it is exchanged in the dungeon-token shop.
    fn shop_exchange_cost(&self, item: &ItemHrid) -> Option<&[ItemQuantity]>;

    fn house_room_upgrade_costs(&self, room: &HouseRoomHrid, level: u32) -> &[ItemQuantity];

    fn display_sort_index(&self, item: &ItemHrid) -> u32;

    fn item_category(&self, item: &ItemHrid) -> Option<&CategoryHrid>;

    fn processed_item(&self, raw: &ItemHrid) -> Option<&ItemHrid>;

    fn constants(&self) -> &Constants;
}

impl GameDataProvider for GameData {
    fn producing_action(&self, item: &ItemHrid) -> Option<&ActionDef> {
        let short_name = item.as_str().rsplit('/').next().unwrap_or_default();
        ActionType::PRODUCTION.iter().find_map(|&action_type| {
            self.actions.values().find(|action| {
                action.action_type() == Some(action_type)
                    && (action.produces(item)
                        || (action.outputs.is_empty() && action.short_name() == short_name))
            })
        })
    }

    fn gathering_action(&self, item: &ItemHrid) -> Option<&ActionDef> {
        let gathering =
            |action: &&ActionDef| action.action_type().is_some_and(ActionType::is_gathering);
        self.actions
            .values()
            .filter(gathering)
            .find(|action| action.drops(item))
            .or_else(|| {
                let raw = self
                    .processable
                    .iter()
                    .find_map(|(raw, processed)| (processed == item).then_some(raw))?;
                self.actions
                    .values()
                    .filter(gathering)
                    .find(|action| action.drops(raw))
            })
    }

    fn shop_exchange_cost(&self, item: &ItemHrid) -> Option<&[ItemQuantity]> {
        self.shop_items
            .iter()
            .find(|shop_item| {
                &shop_item.item == item
                    && shop_item.category == self.constants.dungeon_shop_category
            })
            .map(|shop_item| shop_item.costs.as_slice())
    }

    fn house_room_upgrade_costs(&self, room: &HouseRoomHrid, level: u32) -> &[ItemQuantity] {
        self.house_rooms
            .get(room)
            .and_then(|def| def.upgrade_costs.get(&level))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn display_sort_index(&self, item: &ItemHrid) -> u32 {
        self.items
            .get(item)
            .map_or(UNKNOWN_SORT_INDEX, |def| def.sort_index)
    }

    fn item_category(&self, item: &ItemHrid) -> Option<&CategoryHrid> {
        self.items.get(item).map(|def| &def.category)
    }

    fn processed_item(&self, raw: &ItemHrid) -> Option<&ItemHrid> {
        self.processable.get(raw)
    }

    fn constants(&self) -> &Constants {
        &self.constants
    }
}

impl GameData {
    /// Case-insensitive lookup by display name; input is trimmed.
    pub fn find_item_by_name(&self, name: &str) -> Option<&ItemDef> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let mut matches: Vec<&ItemDef> = self
            .items
            .values()
            .filter(|def| def.name.to_lowercase() == needle)
            .collect();
        // Names should be unique; pick deterministically if they are not.
        matches.sort_by(|a, b| a.hrid.cmp(&b.hrid));
        matches.into_iter().next()
    }

    pub fn find_house_room_by_name(&self, name: &str) -> Option<&HouseRoomDef> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let mut matches: Vec<&HouseRoomDef> = self
            .house_rooms
            .values()
            .filter(|def| def.name.to_lowercase() == needle)
            .collect();
        matches.sort_by(|a, b| a.hrid.cmp(&b.hrid));
        matches.into_iter().next()
    }

    /// Position of a category in the display order; unknown categories sort last.
    pub fn category_rank(&self, category: Option<&CategoryHrid>) -> usize {
        category
            .and_then(|c| self.category_order.iter().position(|known| known == c))
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_data;

    fn item(hrid: &str) -> ItemHrid {
        ItemHrid::new(hrid)
    }

    #[test]
    fn producing_action_finds_crafting_recipe() {
        let data = base_data();
        let action = data.producing_action(&item("/items/lumber")).unwrap();
        assert_eq!(action.hrid.as_str(), "/actions/crafting/lumber");
    }

    #[test]
    fn producing_action_ignores_gathering() {
        let data = base_data();
        assert!(data.producing_action(&item("/items/log")).is_none());
    }

    #[test]
    fn gathering_action_follows_processed_items_back_to_the_raw_drop() {
        let data = base_data();
        let direct = data.gathering_action(&item("/items/log")).unwrap();
        assert_eq!(direct.hrid.as_str(), "/actions/woodcutting/tree");
        let processed = data.gathering_action(&item("/items/lumber")).unwrap();
        assert_eq!(processed.hrid.as_str(), "/actions/woodcutting/tree");
    }

    #[test]
    fn shop_exchange_only_in_dungeon_category() {
        let data = base_data();
        let costs = data
            .shop_exchange_cost(&item("/items/chimerical_essence"))
            .unwrap();
        assert_eq!(costs.len(), 1);
        assert!(data.shop_exchange_cost(&item("/items/coin_pouch")).is_none());
    }

    #[test]
    fn missing_house_room_level_is_empty() {
        let data = base_data();
        let room = HouseRoomHrid::new("/house_rooms/workshop");
        assert!(!data.house_room_upgrade_costs(&room, 1).is_empty());
        assert!(data.house_room_upgrade_costs(&room, 42).is_empty());
        let unknown = HouseRoomHrid::new("/house_rooms/nowhere");
        assert!(data.house_room_upgrade_costs(&unknown, 1).is_empty());
    }

    #[test]
    fn unknown_item_sorts_last() {
        let data = base_data();
        assert_eq!(data.display_sort_index(&item("/items/nope")), 9999);
        assert!(data.display_sort_index(&item("/items/log")) < 9999);
    }

    #[test]
    fn find_item_by_name_is_case_insensitive() {
        let data = base_data();
        let def = data.find_item_by_name("  LUMBER ").unwrap();
        assert_eq!(def.hrid.as_str(), "/items/lumber");
        assert!(data.find_item_by_name("").is_none());
        assert!(data.find_item_by_name("unobtainium").is_none());
    }
}
