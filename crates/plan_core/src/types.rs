//! Type definitions for `plan_core`.
//!
//! ID newtypes, the target/action tags, and the static game-data content types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::trials::YieldFit;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(hrid: impl Into<String>) -> Self {
                Self(hrid.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ItemHrid);
string_id!(ActionHrid);
string_id!(HouseRoomHrid);
string_id!(CategoryHrid);
string_id!(ShopCategoryHrid);
string_id!(CommunityBuffHrid);
string_id!(CharacterId);

const ITEM_PREFIX: &str = "/items/";
const HOUSE_ROOM_PREFIX: &str = "/house_rooms/";

/// Display category that house-room targets are grouped under.
pub const HOUSE_ROOMS_CATEGORY: &str = "/item_categories/house_rooms";

// ---------------------------------------------------------------------------
// Quantities
// ---------------------------------------------------------------------------

/// An item and an amount. Amounts are averaged yields, so they may be fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemQuantity {
    pub item: ItemHrid,
    #[serde(default)]
    pub count: f64,
}

impl ItemQuantity {
    pub fn new(item: impl Into<String>, count: f64) -> Self {
        Self {
            item: ItemHrid::new(item),
            count,
        }
    }
}

/// Recipe inputs rarely exceed four entries.
pub type Inputs = SmallVec<[ItemQuantity; 4]>;

/// Base (unenhanced) owned counts consumed by the aggregator.
pub type Stock = HashMap<ItemHrid, f64>;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// What a target asks for. Decided once when a target is created; nothing
/// downstream inspects hrid prefixes again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "hrid", rename_all = "snake_case")]
pub enum TargetKind {
    Item(ItemHrid),
    /// Count is the desired room level.
    HouseRoom(HouseRoomHrid),
}

impl TargetKind {
    /// Classifies a raw hrid. Returns `None` for anything that is neither an
    /// item nor a house room.
    pub fn parse(hrid: &str) -> Option<Self> {
        let hrid = hrid.trim();
        if hrid.starts_with(HOUSE_ROOM_PREFIX) {
            Some(Self::HouseRoom(HouseRoomHrid::new(hrid)))
        } else if hrid.starts_with(ITEM_PREFIX) {
            Some(Self::Item(ItemHrid::new(hrid)))
        } else {
            None
        }
    }

    pub fn hrid(&self) -> &str {
        match self {
            Self::Item(item) => item.as_str(),
            Self::HouseRoom(room) => room.as_str(),
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hrid())
    }
}

/// The action types the planner understands. Anything else in game data is
/// treated as a terminal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Milking,
    Foraging,
    Woodcutting,
    Cheesesmithing,
    Crafting,
    Tailoring,
    Cooking,
    Brewing,
}

impl ActionType {
    pub const ALL: [ActionType; 8] = [
        ActionType::Milking,
        ActionType::Foraging,
        ActionType::Woodcutting,
        ActionType::Cheesesmithing,
        ActionType::Crafting,
        ActionType::Tailoring,
        ActionType::Cooking,
        ActionType::Brewing,
    ];

    /// Search order used when looking for the action that produces an item.
    pub const PRODUCTION: [ActionType; 5] = [
        ActionType::Cheesesmithing,
        ActionType::Crafting,
        ActionType::Tailoring,
        ActionType::Cooking,
        ActionType::Brewing,
    ];

    /// Parses either the bare name (`"cooking"`) or the full type hrid
    /// (`"/action_types/cooking"`).
    pub fn from_type_hrid(hrid: &str) -> Option<Self> {
        let name = hrid.rsplit('/').next().unwrap_or(hrid);
        match name {
            "milking" => Some(Self::Milking),
            "foraging" => Some(Self::Foraging),
            "woodcutting" => Some(Self::Woodcutting),
            "cheesesmithing" => Some(Self::Cheesesmithing),
            "crafting" => Some(Self::Crafting),
            "tailoring" => Some(Self::Tailoring),
            "cooking" => Some(Self::Cooking),
            "brewing" => Some(Self::Brewing),
            _ => None,
        }
    }

    pub fn is_gathering(self) -> bool {
        matches!(self, Self::Milking | Self::Foraging | Self::Woodcutting)
    }

    pub fn is_production(self) -> bool {
        !self.is_gathering()
    }

    pub fn scales_output_with_gourmet(self) -> bool {
        matches!(self, Self::Cooking | Self::Brewing)
    }

    pub fn scales_input_with_artisan(self) -> bool {
        self.is_production()
    }

    /// The production type whose artisan slot also applies while gathering,
    /// since gathered raw items are implicitly processed.
    pub fn processing_counterpart(self) -> Option<Self> {
        match self {
            Self::Milking => Some(Self::Cheesesmithing),
            Self::Foraging => Some(Self::Tailoring),
            Self::Woodcutting => Some(Self::Crafting),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoncombatStats {
    #[serde(default)]
    pub gathering_quantity: f64,
    #[serde(default)]
    pub drink_concentration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDetail {
    #[serde(default)]
    pub stats: NoncombatStats,
    /// Scaled by the enhancement multiplier table for the owned level.
    #[serde(default)]
    pub enhancement_bonuses: NoncombatStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub hrid: ItemHrid,
    pub name: String,
    pub category: CategoryHrid,
    #[serde(default = "default_sort_index")]
    pub sort_index: u32,
    #[serde(default)]
    pub equipment: Option<EquipmentDetail>,
}

pub(crate) fn default_sort_index() -> u32 {
    9999
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub item: ItemHrid,
    #[serde(default)]
    pub drop_rate: f64,
    #[serde(default)]
    pub min_count: f64,
    #[serde(default)]
    pub max_count: f64,
}

impl DropEntry {
    /// Average yield per action before any buff.
    pub fn average_count(&self) -> f64 {
        self.drop_rate * (self.min_count + self.max_count) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDef {
    pub hrid: ActionHrid,
    /// Raw type hrid as found in game data, e.g. `/action_types/cooking`.
    #[serde(rename = "type")]
    pub type_hrid: String,
    #[serde(default)]
    pub inputs: Vec<ItemQuantity>,
    #[serde(default)]
    pub outputs: Vec<ItemQuantity>,
    #[serde(default)]
    pub drop_table: Vec<DropEntry>,
    #[serde(default)]
    pub upgrade_item: Option<ItemHrid>,
}

impl ActionDef {
    pub fn action_type(&self) -> Option<ActionType> {
        ActionType::from_type_hrid(&self.type_hrid)
    }

    pub fn produces(&self, item: &ItemHrid) -> bool {
        self.outputs.iter().any(|o| &o.item == item)
    }

    pub fn drops(&self, item: &ItemHrid) -> bool {
        self.drop_table.iter().any(|d| &d.item == item)
    }

    /// Last path segment of the hrid, e.g. `lumber` for `/actions/crafting/lumber`.
    pub fn short_name(&self) -> &str {
        self.hrid.as_str().rsplit('/').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopItemDef {
    pub item: ItemHrid,
    pub category: ShopCategoryHrid,
    #[serde(default)]
    pub costs: Vec<ItemQuantity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseRoomDef {
    pub hrid: HouseRoomHrid,
    pub name: String,
    #[serde(default = "default_sort_index")]
    pub sort_index: u32,
    /// Level → raw items consumed to reach that level.
    #[serde(default)]
    pub upgrade_costs: BTreeMap<u32, Vec<ItemQuantity>>,
}

/// Preferred item wins when both are owned; only one of the pair counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlotPair {
    pub preferred: ItemHrid,
    pub fallback: ItemHrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub gathering_tea: ItemHrid,
    pub processing_tea: ItemHrid,
    pub gourmet_tea: ItemHrid,
    pub artisan_tea: ItemHrid,
    pub gathering_tea_bonus: f64,
    pub processing_tea_bonus: f64,
    pub gourmet_tea_bonus: f64,
    pub artisan_tea_bonus: f64,
    /// Equipment that scales every tea bonus when owned.
    pub drink_pouch: ItemHrid,
    pub gathering_equipment_slots: Vec<EquipmentSlotPair>,
    pub community_gathering_buff: CommunityBuffHrid,
    pub community_gathering_base: f64,
    pub community_gathering_per_level: f64,
    /// Only shop items in this category are treated as exchange recipes.
    pub dungeon_shop_category: ShopCategoryHrid,
    pub max_house_room_level: u32,
    pub trial_fit: YieldFit,
    pub trial_z_score: f64,
    pub debounce_ms: u64,
    /// Guard against runaway expansion on malformed data.
    pub max_expansion_steps: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameData {
    pub content_version: String,
    pub items: HashMap<ItemHrid, ItemDef>,
    pub actions: BTreeMap<ActionHrid, ActionDef>,
    pub shop_items: Vec<ShopItemDef>,
    pub house_rooms: HashMap<HouseRoomHrid, HouseRoomDef>,
    /// Raw gathered item → item it is implicitly processed into.
    pub processable: BTreeMap<ItemHrid, ItemHrid>,
    /// Index = enhancement level.
    pub enhancement_multipliers: Vec<f64>,
    pub category_order: Vec<CategoryHrid>,
    pub constants: Constants,
}
