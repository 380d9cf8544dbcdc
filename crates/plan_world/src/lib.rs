//! Content and player-state loading shared by the planner binaries.

use anyhow::{bail, Context, Result};
use plan_core::{
    ActionDef, CategoryHrid, CharacterId, CharacterItem, Constants, GameData, HouseRoomDef,
    HouseRoomHrid, InventorySnapshot, ItemDef, ItemHrid, Loadout, ShopItemDef, TargetKind,
    TargetList,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct ItemsFile {
    content_version: String,
    items: Vec<ItemDef>,
}

#[derive(Deserialize)]
struct ActionsFile {
    actions: Vec<ActionDef>,
}

#[derive(Deserialize)]
struct ShopItemsFile {
    shop_items: Vec<ShopItemDef>,
}

#[derive(Deserialize)]
struct HouseRoomsFile {
    house_rooms: Vec<HouseRoomDef>,
}

#[derive(Deserialize)]
struct GameRulesFile {
    processable: BTreeMap<ItemHrid, ItemHrid>,
    enhancement_multipliers: Vec<f64>,
    category_order: Vec<CategoryHrid>,
}

#[derive(Deserialize)]
struct InventoryFile {
    #[serde(default)]
    items: Vec<CharacterItem>,
    #[serde(default)]
    house_rooms: HashMap<HouseRoomHrid, u32>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(name)).with_context(|| format!("reading {name}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {name}"))
}

fn assert_known(items: &HashSet<&ItemHrid>, hrid: &ItemHrid, context: &str) {
    assert!(
        items.contains(hrid),
        "{context} references '{hrid}', which is not a known item",
    );
}

fn validate_actions(data: &GameData, items: &HashSet<&ItemHrid>) {
    for action in data.actions.values() {
        let context = format!("action '{}'", action.hrid);
        for quantity in action.inputs.iter().chain(&action.outputs) {
            assert_known(items, &quantity.item, &context);
        }
        for entry in &action.drop_table {
            assert_known(items, &entry.item, &context);
            assert!(
                (0.0..=1.0).contains(&entry.drop_rate),
                "action '{}' drop '{}' has drop_rate outside [0, 1]",
                action.hrid,
                entry.item,
            );
            assert!(
                entry.min_count <= entry.max_count,
                "action '{}' drop '{}' has min_count above max_count",
                action.hrid,
                entry.item,
            );
        }
        if let Some(upgrade) = &action.upgrade_item {
            assert_known(items, upgrade, &context);
        }
    }
}

fn validate_constants(data: &GameData, items: &HashSet<&ItemHrid>) {
    let c = &data.constants;
    for tea in [&c.gathering_tea, &c.processing_tea, &c.gourmet_tea, &c.artisan_tea] {
        assert_known(items, tea, "constants");
    }
    assert_known(items, &c.drink_pouch, "constants");
    for pair in &c.gathering_equipment_slots {
        assert_known(items, &pair.preferred, "constants");
        assert_known(items, &pair.fallback, "constants");
    }
    assert!(
        c.max_house_room_level >= 1,
        "max_house_room_level must be at least 1"
    );
}

/// Validates cross-references in loaded content, panicking on any authoring error.
///
/// Catches mistakes like: a recipe input that is not a known item, a house
/// room cost naming an unknown item, or a constant pointing at a missing tea.
/// Actions of types the planner does not model are allowed; they are never
/// picked as a recipe.
pub fn validate_content(data: &GameData) {
    let items: HashSet<&ItemHrid> = data.items.keys().collect();
    let categories: HashSet<&CategoryHrid> = data.category_order.iter().collect();

    for (hrid, def) in &data.items {
        assert_eq!(hrid, &def.hrid, "item map key '{hrid}' does not match its def");
        assert!(
            categories.contains(&def.category),
            "item '{hrid}' has category '{}', which is not in category_order",
            def.category,
        );
    }

    validate_actions(data, &items);

    for shop_item in &data.shop_items {
        let context = format!("shop item '{}'", shop_item.item);
        assert_known(&items, &shop_item.item, &context);
        for cost in &shop_item.costs {
            assert_known(&items, &cost.item, &context);
        }
    }

    for room in data.house_rooms.values() {
        let context = format!("house room '{}'", room.hrid);
        for cost in room.upgrade_costs.values().flatten() {
            assert_known(&items, &cost.item, &context);
        }
    }

    for (raw, processed) in &data.processable {
        assert_known(&items, raw, "processable table");
        assert_known(&items, processed, "processable table");
    }

    validate_constants(data, &items);
    assert!(
        !data.enhancement_multipliers.is_empty(),
        "enhancement_multipliers must not be empty"
    );
}

pub fn load_content(content_dir: &str) -> Result<GameData> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let items_file: ItemsFile = read_json(dir, "items.json")?;
    let actions_file: ActionsFile = read_json(dir, "actions.json")?;
    let shop_file: ShopItemsFile = read_json(dir, "shop_items.json")?;
    let rooms_file: HouseRoomsFile = read_json(dir, "house_rooms.json")?;
    let rules: GameRulesFile = read_json(dir, "game_rules.json")?;

    let data = GameData {
        content_version: items_file.content_version,
        items: items_file
            .items
            .into_iter()
            .map(|def| (def.hrid.clone(), def))
            .collect(),
        actions: actions_file
            .actions
            .into_iter()
            .map(|def| (def.hrid.clone(), def))
            .collect(),
        shop_items: shop_file.shop_items,
        house_rooms: rooms_file
            .house_rooms
            .into_iter()
            .map(|def| (def.hrid.clone(), def))
            .collect(),
        processable: rules.processable,
        enhancement_multipliers: rules.enhancement_multipliers,
        category_order: rules.category_order,
        constants,
    };
    validate_content(&data);
    tracing::info!(
        version = %data.content_version,
        items = data.items.len(),
        actions = data.actions.len(),
        house_rooms = data.house_rooms.len(),
        "content loaded"
    );
    Ok(data)
}

/// Loads an inventory snapshot. Stacks of items the content does not know
/// are skipped with a warning.
pub fn load_inventory(path: &Path, data: &GameData) -> Result<InventorySnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading inventory {}", path.display()))?;
    let file: InventoryFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing inventory {}", path.display()))?;

    let (known, unknown): (Vec<CharacterItem>, Vec<CharacterItem>) = file
        .items
        .into_iter()
        .partition(|stack| data.items.contains_key(&stack.item));
    for stack in &unknown {
        tracing::warn!(item = %stack.item, "unknown item in inventory, skipped");
    }
    let mut inventory = InventorySnapshot::from_items(&known);
    for (room, level) in file.house_rooms {
        if data.house_rooms.contains_key(&room) {
            inventory.set_house_room_level(room, level);
        } else {
            tracing::warn!(room = %room, "unknown house room in inventory, skipped");
        }
    }
    Ok(inventory)
}

/// Missing file means no drinks and no community buffs.
pub fn load_loadout(path: Option<&Path>) -> Result<Loadout> {
    let Some(path) = path else {
        return Ok(Loadout::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading loadout {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing loadout {}", path.display()))
}

/// Turns user input into a target kind: a known hrid, or an item / house room
/// display name. Anything else is rejected here, before it reaches the core.
pub fn parse_target(data: &GameData, query: &str) -> Result<TargetKind> {
    if let Some(kind) = TargetKind::parse(query) {
        let known = match &kind {
            TargetKind::Item(item) => data.items.contains_key(item),
            TargetKind::HouseRoom(room) => data.house_rooms.contains_key(room),
        };
        if !known {
            bail!("unknown id '{}'", kind.hrid());
        }
        return Ok(kind);
    }
    if let Some(def) = data.find_item_by_name(query) {
        return Ok(TargetKind::Item(def.hrid.clone()));
    }
    if let Some(def) = data.find_house_room_by_name(query) {
        return Ok(TargetKind::HouseRoom(def.hrid.clone()));
    }
    bail!("no item or house room named '{}'", query.trim())
}

// ---------------------------------------------------------------------------
// Target persistence
// ---------------------------------------------------------------------------

/// Target lists stored as one JSON file per character.
#[derive(Debug, Clone)]
pub struct TargetStore {
    dir: PathBuf,
}

impl TargetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, character: &CharacterId) -> PathBuf {
        let safe: String = character
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("targets_{safe}.json"))
    }

    /// A character with no saved file starts with an empty list.
    pub fn load(&self, character: &CharacterId) -> Result<TargetList> {
        let path = self.path_for(character);
        if !path.exists() {
            return Ok(TargetList::new());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading targets {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing targets {}", path.display()))
    }

    pub fn save(&self, character: &CharacterId, targets: &TargetList) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(character);
        let json = serde_json::to_string_pretty(targets).context("serializing targets")?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), targets = targets.targets().len(), "targets saved");
        Ok(())
    }
}
