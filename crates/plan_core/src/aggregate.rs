//! Requirement Aggregator.
//!
//! Demand is expanded through the resolver with a priority worklist keyed by
//! recipe height (length of the longest recipe chain below an item). Every
//! item that consumes X sits strictly higher than X, so X is popped once with
//! its fully merged demand. Totals therefore do not depend on target order,
//! even with whole-batch rounding.

use std::collections::{BTreeMap, HashMap};

use ahash::{AHashMap, AHashSet};

use crate::{
    provider::GameDataProvider, resolve, BuffSnapshot, HouseRoomHrid, ItemHrid, ItemQuantity,
    PlanError, Recipe, Stock, TargetKind,
};

/// Amounts at or below this are treated as satisfied.
pub const EPSILON: f64 = 1e-9;

/// A filtered target, ready for aggregation. For house rooms `count` is the
/// desired level.
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    pub kind: TargetKind,
    pub count: f64,
}

impl Demand {
    pub fn item(item: ItemHrid, count: f64) -> Self {
        Self {
            kind: TargetKind::Item(item),
            count,
        }
    }

    pub fn house_room(room: HouseRoomHrid, level: f64) -> Self {
        Self {
            kind: TargetKind::HouseRoom(room),
            count: level,
        }
    }
}

/// Outcome of one expansion pass.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    /// Demand left after stock, per item, summed over the pass.
    pub totals: BTreeMap<ItemHrid, f64>,
    /// Stock left unconsumed.
    pub remaining: Stock,
    /// Worklist pops, for diagnostics.
    pub steps: u64,
}

impl Expansion {
    pub fn total(&self, item: &ItemHrid) -> f64 {
        self.totals.get(item).copied().unwrap_or(0.0)
    }
}

/// Raw costs of raising `room` from `current_level` to `target_level`, capped
/// at the configured maximum level. Each level contributes its cost list once.
pub fn house_room_costs<P>(
    room: &HouseRoomHrid,
    current_level: u32,
    target_level: u32,
    data: &P,
) -> Vec<ItemQuantity>
where
    P: GameDataProvider + ?Sized,
{
    let last = target_level.min(data.constants().max_house_room_level);
    (current_level.saturating_add(1)..=last)
        .flat_map(|level| data.house_room_upgrade_costs(room, level).iter().cloned())
        .collect()
}

/// Splits demands into positive item seeds (house rooms pre-expanded to their
/// level costs) and stock credits from negative item targets.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn split_demands<P>(
    demands: &[Demand],
    house_levels: &HashMap<HouseRoomHrid, u32>,
    data: &P,
) -> (Vec<ItemQuantity>, Stock)
where
    P: GameDataProvider + ?Sized,
{
    let mut seeds = Vec::new();
    let mut credits = Stock::new();
    for demand in demands {
        if !demand.count.is_finite() {
            continue;
        }
        match &demand.kind {
            TargetKind::Item(item) if demand.count < 0.0 => {
                *credits.entry(item.clone()).or_insert(0.0) -= demand.count;
            }
            TargetKind::Item(item) => seeds.push(ItemQuantity {
                item: item.clone(),
                count: demand.count,
            }),
            TargetKind::HouseRoom(room) if demand.count >= 1.0 => {
                let current = house_levels.get(room).copied().unwrap_or(0);
                let target = demand.count.floor().min(f64::from(u32::MAX)) as u32;
                seeds.extend(house_room_costs(room, current, target, data));
            }
            TargetKind::HouseRoom(_) => {}
        }
    }
    (seeds, credits)
}

/// Runs one pass over `demands` against `stock`. Negative item demands are
/// credited to `stock` first; call with an empty stock for the total
/// requirement.
pub fn aggregate<P>(
    demands: &[Demand],
    stock: &Stock,
    house_levels: &HashMap<HouseRoomHrid, u32>,
    data: &P,
    buffs: &BuffSnapshot,
) -> Result<Expansion, PlanError>
where
    P: GameDataProvider + ?Sized,
{
    let (seeds, credits) = split_demands(demands, house_levels, data);
    let mut stock = stock.clone();
    for (item, credit) in credits {
        *stock.entry(item).or_insert(0.0) += credit;
    }
    expand_items(&seeds, stock, data, buffs)
}

/// Expands item demand through the resolver, consuming `stock` on the way.
pub fn expand_items<P>(
    seeds: &[ItemQuantity],
    mut stock: Stock,
    data: &P,
    buffs: &BuffSnapshot,
) -> Result<Expansion, PlanError>
where
    P: GameDataProvider + ?Sized,
{
    let limit = data.constants().max_expansion_steps;
    let mut graph = RecipeGraph::new(data, buffs);
    let mut worklist = Worklist::default();
    for seed in seeds {
        worklist.push(graph.height(&seed.item)?, &seed.item, seed.count);
    }

    let mut totals = BTreeMap::new();
    let mut steps = 0u64;
    while let Some((item, needed)) = worklist.pop() {
        steps += 1;
        if steps > limit {
            return Err(PlanError::ExpansionLimit { item, limit });
        }

        let used = match stock.get_mut(&item) {
            Some(have) => {
                let used = have.max(0.0).min(needed);
                *have -= used;
                used
            }
            None => 0.0,
        };
        let remain = needed - used;
        if remain <= EPSILON {
            continue;
        }
        *totals.entry(item.clone()).or_insert(0.0) += remain;

        let Some(recipe) = graph.recipe(&item).cloned() else {
            tracing::debug!(item = %item, remain, "terminal");
            continue;
        };
        // A remainder just above EPSILON ceils to zero without the floor.
        let batches = (remain / recipe.output_count - EPSILON).ceil().max(1.0);
        tracing::debug!(item = %item, remain, batches, "expand");
        for input in &recipe.inputs {
            worklist.push(graph.height(&input.item)?, &input.item, input.count * batches);
        }
    }

    stock.retain(|_, left| *left > EPSILON);
    Ok(Expansion {
        totals,
        remaining: stock,
        steps,
    })
}

// ---------------------------------------------------------------------------
// Worklist
// ---------------------------------------------------------------------------

/// Pending demand merged per item, popped highest recipe height first (ties by
/// id, descending).
#[derive(Debug, Default)]
struct Worklist {
    pending: BTreeMap<(u32, ItemHrid), f64>,
}

impl Worklist {
    fn push(&mut self, height: u32, item: &ItemHrid, amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        *self
            .pending
            .entry((height, item.clone()))
            .or_insert(0.0) += amount;
    }

    fn pop(&mut self) -> Option<(ItemHrid, f64)> {
        self.pending
            .pop_last()
            .map(|((_, item), amount)| (item, amount))
    }
}

// ---------------------------------------------------------------------------
// Recipe graph
// ---------------------------------------------------------------------------

/// Per-pass memo of resolved recipes and recipe heights. Lives for a single
/// pass, so it never outlives the buff snapshot it was built from.
struct RecipeGraph<'a, P: ?Sized> {
    data: &'a P,
    buffs: &'a BuffSnapshot,
    recipes: AHashMap<ItemHrid, Option<Recipe>>,
    heights: AHashMap<ItemHrid, u32>,
    visiting: AHashSet<ItemHrid>,
}

impl<'a, P> RecipeGraph<'a, P>
where
    P: GameDataProvider + ?Sized,
{
    fn new(data: &'a P, buffs: &'a BuffSnapshot) -> Self {
        Self {
            data,
            buffs,
            recipes: AHashMap::new(),
            heights: AHashMap::new(),
            visiting: AHashSet::new(),
        }
    }

    fn recipe(&mut self, item: &ItemHrid) -> Option<&Recipe> {
        let (data, buffs) = (self.data, self.buffs);
        self.recipes
            .entry(item.clone())
            .or_insert_with(|| resolve(item, data, buffs))
            .as_ref()
    }

    /// 0 for terminal items, otherwise one more than the highest input.
    fn height(&mut self, item: &ItemHrid) -> Result<u32, PlanError> {
        if let Some(height) = self.heights.get(item) {
            return Ok(*height);
        }
        if !self.visiting.insert(item.clone()) {
            return Err(PlanError::RecipeCycle { item: item.clone() });
        }
        let inputs: Vec<ItemHrid> = self
            .recipe(item)
            .map(|recipe| recipe.inputs.iter().map(|input| input.item.clone()).collect())
            .unwrap_or_default();
        let mut height = 0;
        for input in &inputs {
            height = height.max(self.height(input)? + 1);
        }
        self.visiting.remove(item);
        self.heights.insert(item.clone(), height);
        Ok(height)
    }
}
