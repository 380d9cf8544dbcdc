//! The user's target list and per-category inclusion toggles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CategoryHrid, Demand, GameData, TargetKind, HOUSE_ROOMS_CATEGORY};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredTarget", into = "StoredTarget")]
pub struct Target {
    pub kind: TargetKind,
    /// Item amount, or desired level for a house room. Negative item counts
    /// declare stock the player already holds in some other form.
    pub count: f64,
    pub need_calc: bool,
}

/// Persisted shape: the raw hrid is classified once on load.
#[derive(Serialize, Deserialize)]
struct StoredTarget {
    hrid: String,
    count: f64,
    #[serde(default = "default_true")]
    need_calc: bool,
}

impl TryFrom<StoredTarget> for Target {
    type Error = String;

    fn try_from(stored: StoredTarget) -> Result<Self, Self::Error> {
        let kind = TargetKind::parse(&stored.hrid)
            .ok_or_else(|| format!("not an item or house room: {}", stored.hrid))?;
        Ok(Self {
            kind,
            count: stored.count,
            need_calc: stored.need_calc,
        })
    }
}

impl From<Target> for StoredTarget {
    fn from(target: Target) -> Self {
        Self {
            hrid: target.kind.hrid().to_string(),
            count: target.count,
            need_calc: target.need_calc,
        }
    }
}

impl Target {
    pub fn category(&self, data: &GameData) -> Option<CategoryHrid> {
        target_category(&self.kind, data)
    }
}

pub fn target_category(kind: &TargetKind, data: &GameData) -> Option<CategoryHrid> {
    match kind {
        TargetKind::Item(item) => data.items.get(item).map(|def| def.category.clone()),
        TargetKind::HouseRoom(_) => Some(CategoryHrid::new(HOUSE_ROOMS_CATEGORY)),
    }
}

/// Targets in insertion order, unique by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetList {
    #[serde(default)]
    targets: Vec<Target>,
    #[serde(default)]
    categories: BTreeMap<CategoryHrid, bool>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, kind: &TargetKind) -> Option<&Target> {
        self.targets.iter().find(|target| &target.kind == kind)
    }

    /// Adds a target, or replaces the count of an existing one. Non-finite
    /// counts are ignored and return false.
    pub fn upsert(&mut self, kind: TargetKind, count: f64) -> bool {
        if !count.is_finite() {
            return false;
        }
        match self.targets.iter_mut().find(|target| target.kind == kind) {
            Some(existing) => existing.count = count,
            None => self.targets.push(Target {
                kind,
                count,
                need_calc: true,
            }),
        }
        true
    }

    /// Returns false when no such target exists or `count` is not finite.
    pub fn set_count(&mut self, kind: &TargetKind, count: f64) -> bool {
        if !count.is_finite() {
            return false;
        }
        match self.targets.iter_mut().find(|target| &target.kind == kind) {
            Some(target) => {
                target.count = count;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, kind: &TargetKind) -> bool {
        let before = self.targets.len();
        self.targets.retain(|target| &target.kind != kind);
        self.targets.len() != before
    }

    /// Drops every target. Category toggles are kept.
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Flips `need_calc`; returns the new state.
    pub fn toggle(&mut self, kind: &TargetKind) -> Option<bool> {
        let target = self.targets.iter_mut().find(|target| &target.kind == kind)?;
        target.need_calc = !target.need_calc;
        Some(target.need_calc)
    }

    pub fn set_category(&mut self, category: CategoryHrid, need_calc: bool) {
        self.categories.insert(category, need_calc);
    }

    /// Categories without a stored toggle are included.
    pub fn category_enabled(&self, category: &CategoryHrid) -> bool {
        self.categories.get(category).copied().unwrap_or(true)
    }

    pub fn categories(&self) -> &BTreeMap<CategoryHrid, bool> {
        &self.categories
    }

    /// Targets that take part in aggregation: their own flag and their
    /// category's flag are both set. Items missing from `data` have no
    /// category and are left out.
    pub fn active_demands(&self, data: &GameData) -> Vec<Demand> {
        self.targets
            .iter()
            .filter(|target| target.need_calc)
            .filter(|target| {
                target
                    .category(data)
                    .is_some_and(|category| self.category_enabled(&category))
            })
            .map(|target| Demand {
                kind: target.kind.clone(),
                count: target.count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_data, item};
    use crate::HouseRoomHrid;

    fn lumber() -> TargetKind {
        TargetKind::Item(item("/items/lumber"))
    }

    #[test]
    fn upsert_replaces_existing_count() {
        let mut list = TargetList::new();
        list.upsert(lumber(), 10.0);
        list.upsert(lumber(), 4.0);
        assert_eq!(list.targets().len(), 1);
        assert!((list.targets()[0].count - 4.0).abs() < 1e-9);
    }

    #[test]
    fn remove_and_set_count_report_missing() {
        let mut list = TargetList::new();
        assert!(!list.set_count(&lumber(), 1.0));
        assert!(!list.remove(&lumber()));
        list.upsert(lumber(), 1.0);
        assert!(list.set_count(&lumber(), 3.0));
        assert!(list.remove(&lumber()));
        assert!(list.is_empty());
    }

    #[test]
    fn toggled_target_is_excluded() {
        let data = base_data();
        let mut list = TargetList::new();
        list.upsert(lumber(), 10.0);
        list.upsert(TargetKind::Item(item("/items/cheese")), 2.0);
        assert_eq!(list.toggle(&lumber()), Some(false));
        let demands = list.active_demands(&data);
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].kind, TargetKind::Item(item("/items/cheese")));
    }

    #[test]
    fn disabled_category_excludes_its_targets() {
        let data = base_data();
        let mut list = TargetList::new();
        list.upsert(lumber(), 10.0);
        list.upsert(TargetKind::Item(item("/items/log")), -5.0);
        let room = TargetKind::HouseRoom(HouseRoomHrid::new("/house_rooms/workshop"));
        list.upsert(room, 3.0);

        list.set_category(CategoryHrid::new("/item_categories/materials"), false);
        list.set_category(CategoryHrid::new(HOUSE_ROOMS_CATEGORY), false);
        let demands = list.active_demands(&data);
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].kind, TargetKind::Item(item("/items/log")));

        list.set_category(CategoryHrid::new(HOUSE_ROOMS_CATEGORY), true);
        assert_eq!(list.active_demands(&data).len(), 2);
    }

    #[test]
    fn clear_keeps_category_toggles() {
        let mut list = TargetList::new();
        list.upsert(lumber(), 1.0);
        list.set_category(CategoryHrid::new("/item_categories/food"), false);
        list.clear();
        assert!(list.is_empty());
        assert!(!list.category_enabled(&CategoryHrid::new("/item_categories/food")));
    }

    #[test]
    fn missing_need_calc_defaults_to_true() {
        let json = r#"{"targets":[{"hrid":"/items/lumber","count":5}]}"#;
        let list: TargetList = serde_json::from_str(json).unwrap();
        assert!(list.targets()[0].need_calc);
        assert_eq!(list.targets()[0].kind, lumber());
    }

    #[test]
    fn non_finite_counts_are_not_stored() {
        let mut list = TargetList::new();
        assert!(!list.upsert(lumber(), f64::NAN));
        assert!(list.is_empty());
        assert!(list.upsert(lumber(), 5.0));
        assert!(!list.set_count(&lumber(), f64::INFINITY));
        assert!(!list.set_count(&lumber(), f64::NEG_INFINITY));
        assert!((list.targets()[0].count - 5.0).abs() < 1e-9);

        let json = serde_json::to_string(&list).unwrap();
        let back: TargetList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn target_for_unknown_item_is_excluded() {
        let data = base_data();
        let mut list = TargetList::new();
        list.upsert(TargetKind::Item(item("/items/retired_relic")), 3.0);
        list.upsert(lumber(), 2.0);
        let demands = list.active_demands(&data);
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].kind, lumber());
    }

    #[test]
    fn unknown_hrid_is_rejected_on_load() {
        let json = r#"{"targets":[{"hrid":"/actions/crafting/lumber","count":5}]}"#;
        assert!(serde_json::from_str::<TargetList>(json).is_err());
    }
}
