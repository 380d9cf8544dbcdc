use crate::ItemHrid;

/// Structural failures of an aggregation pass. Missing data never produces
/// one of these; it degrades to a terminal item instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("recipe cycle: {item} requires itself")]
    RecipeCycle { item: ItemHrid },
    #[error("expansion of {item} exceeded {limit} steps")]
    ExpansionLimit { item: ItemHrid, limit: u64 },
}
