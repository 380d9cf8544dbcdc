//! `plan_core`: deterministic material-requirement planning.
//!
//! No IO, no clock, no globals. Game data, inventory and buff state are
//! passed in explicitly.

mod aggregate;
mod buffs;
mod debounce;
mod error;
mod format;
mod inventory;
mod plan;
pub mod provider;
mod resolver;
mod targets;
mod trials;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use aggregate::{
    aggregate, expand_items, house_room_costs, split_demands, Demand, Expansion, EPSILON,
};
pub use buffs::{
    community_gathering_bonus, drink_concentration, equipment_gathering_bonus, BuffMultipliers,
    BuffSnapshot, CommunityBuff, Loadout,
};
pub use debounce::Debouncer;
pub use error::PlanError;
pub use format::format_number;
pub use inventory::{CharacterItem, InventorySnapshot};
pub use plan::{compute_plan, plan_targets, AggregationResult, ItemRequirement, PlanRow};
pub use provider::GameDataProvider;
pub use resolver::{
    action_count_for_shortage, action_detail, resolve, ActionDetail, ActionSuggestion, Recipe,
    RecipeSource,
};
pub use targets::{target_category, Target, TargetList};
pub use trials::{estimate_trials_for_confidence, TrialEstimator, YieldFit, Z_99};
pub use types::*;
