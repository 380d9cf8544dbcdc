//! Buff multipliers derived from drinks, equipment and community buffs.
//!
//! A `BuffSnapshot` is captured once per aggregation pass and handed to the
//! resolver, so one pass never sees two different buff states.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ActionType, CommunityBuffHrid, Constants, GameData, InventorySnapshot, ItemHrid,
    NoncombatStats,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityBuff {
    pub hrid: CommunityBuffHrid,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub is_done: bool,
}

/// Player state that buffs are read from, besides the inventory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Loadout {
    #[serde(default)]
    pub drink_slots: BTreeMap<ActionType, Vec<ItemHrid>>,
    #[serde(default)]
    pub community_buffs: Vec<CommunityBuff>,
}

impl Loadout {
    /// Drinks that apply to `action_type`. Gathering types also pick up the
    /// artisan tea of their processing counterpart, since gathered raw items
    /// are processed implicitly.
    pub fn effective_drink_slots<'a>(
        &'a self,
        action_type: ActionType,
        artisan_tea: &ItemHrid,
    ) -> Vec<&'a ItemHrid> {
        let mut drinks: Vec<&ItemHrid> = self
            .drink_slots
            .get(&action_type)
            .map(|slots| slots.iter().collect())
            .unwrap_or_default();
        if let Some(counterpart) = action_type.processing_counterpart() {
            if let Some(slots) = self.drink_slots.get(&counterpart) {
                drinks.extend(slots.iter().filter(|drink| *drink == artisan_tea));
            }
        }
        drinks
    }
}

/// Additive fractions; zero everywhere is the neutral element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffMultipliers {
    pub gathering: f64,
    pub processing: f64,
    pub gourmet: f64,
    pub artisan: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuffSnapshot {
    by_type: BTreeMap<ActionType, BuffMultipliers>,
}

impl BuffSnapshot {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn with(mut self, action_type: ActionType, multipliers: BuffMultipliers) -> Self {
        self.by_type.insert(action_type, multipliers);
        self
    }

    pub fn for_action(&self, action_type: ActionType) -> BuffMultipliers {
        self.by_type
            .get(&action_type)
            .copied()
            .unwrap_or_default()
    }

    pub fn capture(data: &GameData, inventory: &InventorySnapshot, loadout: &Loadout) -> Self {
        let constants = &data.constants;
        let concentration = drink_concentration(data, inventory);
        let passive_gathering = equipment_gathering_bonus(data, inventory)
            + community_gathering_bonus(constants, &loadout.community_buffs);

        let by_type = ActionType::ALL
            .into_iter()
            .map(|action_type| {
                let drinks = loadout.effective_drink_slots(action_type, &constants.artisan_tea);
                let tea = |hrid: &ItemHrid, bonus: f64| {
                    if drinks.contains(&hrid) {
                        bonus * concentration
                    } else {
                        0.0
                    }
                };
                let mut multipliers = BuffMultipliers {
                    gathering: tea(&constants.gathering_tea, constants.gathering_tea_bonus),
                    processing: tea(&constants.processing_tea, constants.processing_tea_bonus),
                    gourmet: tea(&constants.gourmet_tea, constants.gourmet_tea_bonus),
                    artisan: tea(&constants.artisan_tea, constants.artisan_tea_bonus),
                };
                if action_type.is_gathering() {
                    multipliers.gathering += passive_gathering;
                }
                (action_type, multipliers)
            })
            .collect();
        Self { by_type }
    }
}

fn enhancement_multiplier(data: &GameData, level: u32) -> f64 {
    usize::try_from(level)
        .ok()
        .and_then(|index| data.enhancement_multipliers.get(index))
        .copied()
        .unwrap_or(0.0)
}

/// `base + bonus · multiplier[level]` for the highest owned level of an
/// equipment item, `None` when no copy is owned.
fn owned_equipment_stat(
    data: &GameData,
    inventory: &InventorySnapshot,
    item: &ItemHrid,
    stat: fn(&NoncombatStats) -> f64,
) -> Option<f64> {
    let level = inventory.max_enhancement_level(item)?;
    let detail = data.items.get(item).and_then(|def| def.equipment.as_ref());
    Some(detail.map_or(0.0, |detail| {
        stat(&detail.stats) + stat(&detail.enhancement_bonuses) * enhancement_multiplier(data, level)
    }))
}

/// Factor every tea magnitude is multiplied by; 1 without the pouch.
pub fn drink_concentration(data: &GameData, inventory: &InventorySnapshot) -> f64 {
    1.0 + owned_equipment_stat(data, inventory, &data.constants.drink_pouch, |stats| {
        stats.drink_concentration
    })
    .unwrap_or(0.0)
}

/// Sum over the configured slot pairs. Within a pair the preferred item
/// shadows the fallback.
pub fn equipment_gathering_bonus(data: &GameData, inventory: &InventorySnapshot) -> f64 {
    let gathering = |stats: &NoncombatStats| stats.gathering_quantity;
    data.constants
        .gathering_equipment_slots
        .iter()
        .filter_map(|pair| {
            owned_equipment_stat(data, inventory, &pair.preferred, gathering)
                .or_else(|| owned_equipment_stat(data, inventory, &pair.fallback, gathering))
        })
        .sum()
}

pub fn community_gathering_bonus(constants: &Constants, buffs: &[CommunityBuff]) -> f64 {
    buffs
        .iter()
        .find(|buff| buff.hrid == constants.community_gathering_buff && !buff.is_done)
        .map_or(0.0, |buff| {
            constants.community_gathering_base
                + f64::from(buff.level) * constants.community_gathering_per_level
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_data, item};
    use crate::CharacterItem;

    fn owned(entries: &[(&str, u32)]) -> InventorySnapshot {
        let stacks: Vec<CharacterItem> = entries
            .iter()
            .map(|(hrid, level)| CharacterItem {
                item: item(hrid),
                enhancement_level: *level,
                count: 1.0,
            })
            .collect();
        InventorySnapshot::from_items(&stacks)
    }

    fn loadout(slots: Vec<(ActionType, Vec<&str>)>) -> Loadout {
        Loadout {
            drink_slots: slots
                .into_iter()
                .map(|(action_type, drinks)| (action_type, drinks.into_iter().map(item).collect()))
                .collect(),
            community_buffs: vec![],
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn concentration_is_one_without_pouch() {
        let data = base_data();
        assert!(close(drink_concentration(&data, &InventorySnapshot::new()), 1.0));
    }

    #[test]
    fn concentration_scales_with_pouch_level() {
        let data = base_data();
        // 1 + 0.1 + 0.002 * multiplier[3] (3.3)
        let inventory = owned(&[("/items/guzzling_pouch", 3)]);
        assert!(close(drink_concentration(&data, &inventory), 1.1066));
    }

    #[test]
    fn preferred_equipment_shadows_fallback() {
        let data = base_data();
        let both = owned(&[
            ("/items/philosophers_earrings", 0),
            ("/items/earrings_of_gathering", 5),
        ]);
        assert!(close(equipment_gathering_bonus(&data, &both), 0.08));

        let fallback_only = owned(&[("/items/earrings_of_gathering", 1)]);
        assert!(close(equipment_gathering_bonus(&data, &fallback_only), 0.022));

        let both_slots = owned(&[("/items/philosophers_earrings", 0), ("/items/ring_of_gathering", 0)]);
        assert!(close(equipment_gathering_bonus(&data, &both_slots), 0.1));
    }

    #[test]
    fn community_buff_only_while_active() {
        let constants = base_data().constants;
        let mut buff = CommunityBuff {
            hrid: constants.community_gathering_buff.clone(),
            level: 10,
            is_done: false,
        };
        assert!(close(community_gathering_bonus(&constants, &[buff.clone()]), 0.245));
        buff.is_done = true;
        assert!(close(community_gathering_bonus(&constants, &[buff]), 0.0));
        assert!(close(community_gathering_bonus(&constants, &[]), 0.0));
    }

    #[test]
    fn gathering_picks_up_counterpart_artisan_tea_only() {
        let loadout = loadout(vec![(
            ActionType::Crafting,
            vec!["/items/artisan_tea", "/items/gourmet_tea"],
        )]);
        let artisan = item("/items/artisan_tea");
        let drinks = loadout.effective_drink_slots(ActionType::Woodcutting, &artisan);
        assert_eq!(drinks, vec![&artisan]);
        assert!(loadout
            .effective_drink_slots(ActionType::Milking, &artisan)
            .is_empty());
    }

    #[test]
    fn capture_combines_teas_and_passive_bonuses() {
        let data = base_data();
        let inventory = owned(&[("/items/ring_of_gathering", 0)]);
        let loadout = loadout(vec![
            (ActionType::Woodcutting, vec!["/items/gathering_tea", "/items/processing_tea"]),
            (ActionType::Crafting, vec!["/items/artisan_tea"]),
            (ActionType::Cooking, vec!["/items/gourmet_tea"]),
        ]);
        let snapshot = BuffSnapshot::capture(&data, &inventory, &loadout);

        let woodcutting = snapshot.for_action(ActionType::Woodcutting);
        assert!(close(woodcutting.gathering, 0.15 + 0.02));
        assert!(close(woodcutting.processing, 0.15));
        assert!(close(woodcutting.artisan, 0.1));

        let crafting = snapshot.for_action(ActionType::Crafting);
        assert!(close(crafting.gathering, 0.0));
        assert!(close(crafting.artisan, 0.1));

        assert!(close(snapshot.for_action(ActionType::Cooking).gourmet, 0.12));
        assert_eq!(
            snapshot.for_action(ActionType::Brewing),
            BuffMultipliers::default()
        );
    }
}
