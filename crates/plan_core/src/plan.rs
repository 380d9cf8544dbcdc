//! Two-pass plan: total requirement against declared credits only, then
//! shortage against the real inventory plus those credits.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{expand_items, split_demands, EPSILON};
use crate::{
    provider::GameDataProvider, BuffSnapshot, CategoryHrid, Demand, GameData, InventorySnapshot,
    ItemHrid, Loadout, PlanError, TargetList,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ItemRequirement {
    /// Net of credits from negative targets.
    pub required: f64,
    /// Base (unenhanced) inventory.
    pub owned: f64,
    pub shortage: f64,
    /// Stock left over after the shortage pass.
    pub surplus: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationResult {
    items: BTreeMap<ItemHrid, ItemRequirement>,
}

impl AggregationResult {
    pub fn get(&self, item: &ItemHrid) -> Option<&ItemRequirement> {
        self.items.get(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemHrid, &ItemRequirement)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items still short, in id order.
    pub fn shortages(&self) -> impl Iterator<Item = (&ItemHrid, f64)> {
        self.items
            .iter()
            .filter(|(_, requirement)| requirement.shortage > EPSILON)
            .map(|(item, requirement)| (item, requirement.shortage))
    }

    /// Display rows grouped by category order, then sort index, then id.
    pub fn rows(&self, data: &GameData) -> Vec<PlanRow> {
        let mut rows: Vec<PlanRow> = self
            .items
            .iter()
            .map(|(item, requirement)| {
                let def = data.items.get(item);
                PlanRow {
                    item: item.clone(),
                    name: def.map_or_else(|| item.to_string(), |def| def.name.clone()),
                    category: data.item_category(item).cloned(),
                    sort_index: data.display_sort_index(item),
                    required: requirement.required,
                    owned: requirement.owned,
                    shortage: requirement.shortage,
                    surplus: requirement.surplus,
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            data.category_rank(a.category.as_ref())
                .cmp(&data.category_rank(b.category.as_ref()))
                .then(a.sort_index.cmp(&b.sort_index))
                .then_with(|| a.item.cmp(&b.item))
        });
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub item: ItemHrid,
    pub name: String,
    pub category: Option<CategoryHrid>,
    pub sort_index: u32,
    pub required: f64,
    pub owned: f64,
    pub shortage: f64,
    pub surplus: f64,
}

/// Computes required, shortage and surplus for every item the demands reach.
///
/// Credits from negative item demands are stock in both passes: the total
/// pass runs against the credits alone, the shortage pass against inventory
/// plus credits.
pub fn compute_plan<P>(
    demands: &[Demand],
    inventory: &InventorySnapshot,
    data: &P,
    buffs: &BuffSnapshot,
) -> Result<AggregationResult, PlanError>
where
    P: GameDataProvider + ?Sized,
{
    let (seeds, credits) = split_demands(demands, inventory.house_room_levels(), data);

    let total = expand_items(&seeds, credits.clone(), data, buffs)?;

    let owned = inventory.base_counts();
    let mut stock = owned.clone();
    for (item, credit) in credits {
        *stock.entry(item).or_insert(0.0) += credit;
    }
    let net = expand_items(&seeds, stock, data, buffs)?;

    let items = total
        .totals
        .iter()
        .filter(|(_, required)| **required > EPSILON)
        .map(|(item, required)| {
            let requirement = ItemRequirement {
                required: *required,
                owned: owned.get(item).copied().unwrap_or(0.0),
                shortage: net.total(item),
                surplus: net.remaining.get(item).copied().unwrap_or(0.0),
            };
            (item.clone(), requirement)
        })
        .collect();
    tracing::debug!(
        total_steps = total.steps,
        net_steps = net.steps,
        "plan computed"
    );
    Ok(AggregationResult { items })
}

/// Filters `targets`, captures buffs once and runs both passes.
pub fn plan_targets(
    targets: &TargetList,
    inventory: &InventorySnapshot,
    data: &GameData,
    loadout: &Loadout,
) -> Result<AggregationResult, PlanError> {
    let buffs = BuffSnapshot::capture(data, inventory, loadout);
    compute_plan(&targets.active_demands(data), inventory, data, &buffs)
}
