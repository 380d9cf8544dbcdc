//! Shared test fixtures for plan_core and downstream crates.
//!
//! `base_data()` is a small but complete `GameData`: a woodcutting → crafting
//! chain with implicit processing, milking → cheesesmithing, a cooking recipe
//! for gourmet tests, an upgrade recipe, a dungeon shop exchange, gathering
//! equipment and a nine-level house room.

use crate::{
    ActionDef, ActionHrid, CategoryHrid, CommunityBuffHrid, Constants, DropEntry,
    EquipmentDetail, EquipmentSlotPair, GameData, HouseRoomDef, HouseRoomHrid, ItemDef, ItemHrid,
    ItemQuantity, NoncombatStats, ShopCategoryHrid, ShopItemDef, Stock, YieldFit,
};
use std::collections::{BTreeMap, HashMap};

pub fn item(hrid: &str) -> ItemHrid {
    ItemHrid::new(hrid)
}

pub fn qty(hrid: &str, count: f64) -> ItemQuantity {
    ItemQuantity::new(hrid, count)
}

pub fn stock(entries: &[(&str, f64)]) -> Stock {
    entries
        .iter()
        .map(|(hrid, count)| (item(hrid), *count))
        .collect()
}

fn item_def(hrid: &str, name: &str, category: &str, sort_index: u32) -> ItemDef {
    ItemDef {
        hrid: item(hrid),
        name: name.to_string(),
        category: CategoryHrid::new(category),
        sort_index,
        equipment: None,
    }
}

fn equipment_def(
    hrid: &str,
    name: &str,
    sort_index: u32,
    stats: NoncombatStats,
    bonus: NoncombatStats,
) -> ItemDef {
    ItemDef {
        equipment: Some(EquipmentDetail {
            stats,
            enhancement_bonuses: bonus,
        }),
        ..item_def(hrid, name, "/item_categories/equipment", sort_index)
    }
}

fn gathering(amount: f64) -> NoncombatStats {
    NoncombatStats {
        gathering_quantity: amount,
        drink_concentration: 0.0,
    }
}

fn action(
    hrid: &str,
    action_type: &str,
    inputs: Vec<ItemQuantity>,
    outputs: Vec<ItemQuantity>,
) -> ActionDef {
    ActionDef {
        hrid: ActionHrid::new(hrid),
        type_hrid: format!("/action_types/{action_type}"),
        inputs,
        outputs,
        drop_table: vec![],
        upgrade_item: None,
    }
}

fn drop_entry(hrid: &str, drop_rate: f64, min_count: f64, max_count: f64) -> DropEntry {
    DropEntry {
        item: item(hrid),
        drop_rate,
        min_count,
        max_count,
    }
}

fn items() -> HashMap<ItemHrid, ItemDef> {
    let defs = vec![
        item_def("/items/coin", "Coin", "/item_categories/currency", 1),
        item_def("/items/chimerical_token", "Chimerical Token", "/item_categories/currency", 2),
        item_def(
            "/items/chimerical_essence",
            "Chimerical Essence",
            "/item_categories/materials",
            300,
        ),
        item_def("/items/coin_pouch", "Coin Pouch", "/item_categories/loot", 50),
        item_def("/items/pancake", "Pancake", "/item_categories/food", 100),
        item_def("/items/gathering_tea", "Gathering Tea", "/item_categories/drink", 150),
        item_def("/items/processing_tea", "Processing Tea", "/item_categories/drink", 151),
        item_def("/items/gourmet_tea", "Gourmet Tea", "/item_categories/drink", 152),
        item_def("/items/artisan_tea", "Artisan Tea", "/item_categories/drink", 153),
        item_def("/items/wooden_bow", "Wooden Bow", "/item_categories/equipment", 200),
        item_def("/items/reinforced_bow", "Reinforced Bow", "/item_categories/equipment", 201),
        equipment_def(
            "/items/guzzling_pouch",
            "Guzzling Pouch",
            210,
            NoncombatStats {
                gathering_quantity: 0.0,
                drink_concentration: 0.1,
            },
            NoncombatStats {
                gathering_quantity: 0.0,
                drink_concentration: 0.002,
            },
        ),
        equipment_def(
            "/items/earrings_of_gathering",
            "Earrings Of Gathering",
            220,
            gathering(0.02),
            gathering(0.002),
        ),
        equipment_def(
            "/items/philosophers_earrings",
            "Philosopher's Earrings",
            221,
            gathering(0.08),
            gathering(0.016),
        ),
        equipment_def(
            "/items/ring_of_gathering",
            "Ring Of Gathering",
            222,
            gathering(0.02),
            gathering(0.002),
        ),
        equipment_def(
            "/items/philosophers_ring",
            "Philosopher's Ring",
            223,
            gathering(0.08),
            gathering(0.016),
        ),
        item_def("/items/lumber", "Lumber", "/item_categories/materials", 310),
        item_def("/items/cheese", "Cheese", "/item_categories/materials", 320),
        item_def("/items/linen_fabric", "Linen Fabric", "/item_categories/materials", 330),
        item_def("/items/log", "Log", "/item_categories/resource", 400),
        item_def("/items/milk", "Milk", "/item_categories/resource", 410),
        item_def("/items/egg", "Egg", "/item_categories/resource", 420),
        item_def("/items/flax", "Flax", "/item_categories/resource", 430),
    ];
    defs.into_iter().map(|def| (def.hrid.clone(), def)).collect()
}

fn actions() -> BTreeMap<ActionHrid, ActionDef> {
    let mut tree = action("/actions/woodcutting/tree", "woodcutting", vec![], vec![]);
    tree.drop_table = vec![drop_entry("/items/log", 1.0, 1.0, 3.0)];
    let mut cow = action("/actions/milking/cow", "milking", vec![], vec![]);
    cow.drop_table = vec![drop_entry("/items/milk", 1.0, 1.0, 1.0)];
    let mut meadow = action("/actions/foraging/meadow", "foraging", vec![], vec![]);
    meadow.drop_table = vec![
        drop_entry("/items/egg", 1.0, 1.0, 1.0),
        drop_entry("/items/flax", 0.5, 1.0, 1.0),
    ];
    let mut reinforced_bow = action(
        "/actions/crafting/reinforced_bow",
        "crafting",
        vec![qty("/items/lumber", 2.0)],
        vec![qty("/items/reinforced_bow", 1.0)],
    );
    reinforced_bow.upgrade_item = Some(item("/items/wooden_bow"));

    let defs = vec![
        tree,
        cow,
        meadow,
        action(
            "/actions/crafting/lumber",
            "crafting",
            vec![qty("/items/log", 2.0)],
            vec![qty("/items/lumber", 1.0)],
        ),
        action(
            "/actions/crafting/wooden_bow",
            "crafting",
            vec![qty("/items/lumber", 3.0)],
            vec![qty("/items/wooden_bow", 1.0)],
        ),
        reinforced_bow,
        action(
            "/actions/cheesesmithing/cheese",
            "cheesesmithing",
            vec![qty("/items/milk", 2.0)],
            vec![qty("/items/cheese", 1.0)],
        ),
        action(
            "/actions/tailoring/linen_fabric",
            "tailoring",
            vec![qty("/items/flax", 2.0)],
            vec![qty("/items/linen_fabric", 1.0)],
        ),
        action(
            "/actions/cooking/pancake",
            "cooking",
            vec![qty("/items/milk", 1.0), qty("/items/egg", 1.0)],
            vec![qty("/items/pancake", 2.0)],
        ),
    ];
    defs.into_iter().map(|def| (def.hrid.clone(), def)).collect()
}

fn shop_items() -> Vec<ShopItemDef> {
    vec![
        ShopItemDef {
            item: item("/items/chimerical_essence"),
            category: ShopCategoryHrid::new("/shop_categories/dungeon"),
            costs: vec![qty("/items/chimerical_token", 50.0)],
        },
        ShopItemDef {
            item: item("/items/coin_pouch"),
            category: ShopCategoryHrid::new("/shop_categories/general"),
            costs: vec![qty("/items/coin", 100.0)],
        },
    ]
}

/// Workshop costs `1000 * level` coins per level and defines a level 9 that
/// must never be reached.
fn house_rooms() -> HashMap<HouseRoomHrid, HouseRoomDef> {
    let upgrade_costs = (1..=9)
        .map(|level| {
            let mut costs = vec![qty("/items/coin", 1000.0 * f64::from(level))];
            if level == 2 {
                costs.push(qty("/items/lumber", 10.0));
            }
            (level, costs)
        })
        .collect();
    let workshop = HouseRoomDef {
        hrid: HouseRoomHrid::new("/house_rooms/workshop"),
        name: "Workshop".to_string(),
        sort_index: 5,
        upgrade_costs,
    };
    HashMap::from([(workshop.hrid.clone(), workshop)])
}

pub fn base_constants() -> Constants {
    Constants {
        gathering_tea: item("/items/gathering_tea"),
        processing_tea: item("/items/processing_tea"),
        gourmet_tea: item("/items/gourmet_tea"),
        artisan_tea: item("/items/artisan_tea"),
        gathering_tea_bonus: 0.15,
        processing_tea_bonus: 0.15,
        gourmet_tea_bonus: 0.12,
        artisan_tea_bonus: 0.1,
        drink_pouch: item("/items/guzzling_pouch"),
        gathering_equipment_slots: vec![
            EquipmentSlotPair {
                preferred: item("/items/philosophers_earrings"),
                fallback: item("/items/earrings_of_gathering"),
            },
            EquipmentSlotPair {
                preferred: item("/items/philosophers_ring"),
                fallback: item("/items/ring_of_gathering"),
            },
        ],
        community_gathering_buff: CommunityBuffHrid::new(
            "/community_buff_types/gathering_quantity",
        ),
        community_gathering_base: 0.195,
        community_gathering_per_level: 0.005,
        dungeon_shop_category: ShopCategoryHrid::new("/shop_categories/dungeon"),
        max_house_room_level: 8,
        trial_fit: YieldFit::default(),
        trial_z_score: crate::trials::Z_99,
        debounce_ms: 300,
        max_expansion_steps: 10_000,
    }
}

pub fn base_data() -> GameData {
    GameData {
        content_version: "test".to_string(),
        items: items(),
        actions: actions(),
        shop_items: shop_items(),
        house_rooms: house_rooms(),
        processable: BTreeMap::from([
            (item("/items/log"), item("/items/lumber")),
            (item("/items/milk"), item("/items/cheese")),
            (item("/items/flax"), item("/items/linen_fabric")),
        ]),
        enhancement_multipliers: vec![0.0, 1.0, 2.1, 3.3, 4.6, 6.0],
        category_order: [
            "/item_categories/house_rooms",
            "/item_categories/currency",
            "/item_categories/loot",
            "/item_categories/food",
            "/item_categories/drink",
            "/item_categories/equipment",
            "/item_categories/materials",
            "/item_categories/resource",
        ]
        .into_iter()
        .map(CategoryHrid::new)
        .collect(),
        constants: base_constants(),
    }
}

/// `base_data()` plus a recipe that consumes its own output two steps down.
pub fn cyclic_data() -> GameData {
    let mut data = base_data();
    let loop_a = action(
        "/actions/crafting/loop_a",
        "crafting",
        vec![qty("/items/loop_b", 1.0)],
        vec![qty("/items/loop_a", 1.0)],
    );
    let loop_b = action(
        "/actions/tailoring/loop_b",
        "tailoring",
        vec![qty("/items/loop_a", 1.0)],
        vec![qty("/items/loop_b", 1.0)],
    );
    data.actions.insert(loop_a.hrid.clone(), loop_a);
    data.actions.insert(loop_b.hrid.clone(), loop_b);
    data
}
