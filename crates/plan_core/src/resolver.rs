//! Recipe Resolver: item → buff-adjusted recipe, plus per-action detail and
//! action sizing built on the same buff rules.

use crate::{
    provider::GameDataProvider, ActionDef, ActionHrid, ActionType, BuffSnapshot, Inputs,
    ItemHrid, ItemQuantity, TrialEstimator,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeSource {
    ShopExchange,
    Action(ActionHrid),
}

/// Effective conversion for one batch under a given buff snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub inputs: Inputs,
    pub output_count: f64,
    pub source: RecipeSource,
}

/// Resolves `item` to its recipe, or `None` for a terminal item.
///
/// Dungeon-shop exchanges win over production actions. Production outputs
/// are scaled by gourmet (cooking, brewing) and inputs by artisan; the upgrade
/// item, if any, is one per batch and never artisan-scaled.
pub fn resolve<P>(item: &ItemHrid, data: &P, buffs: &BuffSnapshot) -> Option<Recipe>
where
    P: GameDataProvider + ?Sized,
{
    if let Some(costs) = data.shop_exchange_cost(item) {
        return Some(Recipe {
            inputs: costs.iter().cloned().collect(),
            output_count: 1.0,
            source: RecipeSource::ShopExchange,
        });
    }

    let action = data.producing_action(item)?;
    let action_type = action.action_type()?;
    let multipliers = buffs.for_action(action_type);

    let mut output_count = action
        .outputs
        .iter()
        .find(|output| &output.item == item)
        .map(|output| output.count)
        .filter(|count| count.is_finite() && *count > 0.0)
        .unwrap_or(1.0);
    if action_type.scales_output_with_gourmet() {
        output_count *= 1.0 + multipliers.gourmet;
    }

    let artisan = if action_type.scales_input_with_artisan() {
        multipliers.artisan
    } else {
        0.0
    };
    let mut inputs: Inputs = action
        .inputs
        .iter()
        .map(|input| ItemQuantity {
            item: input.item.clone(),
            count: input.count * (1.0 - artisan),
        })
        .collect();
    if let Some(upgrade) = &action.upgrade_item {
        inputs.push(ItemQuantity {
            item: upgrade.clone(),
            count: 1.0,
        });
    }

    Some(Recipe {
        inputs,
        output_count,
        source: RecipeSource::Action(action.hrid.clone()),
    })
}

// ---------------------------------------------------------------------------
// Action detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ActionDetail {
    pub action: ActionHrid,
    pub action_type: ActionType,
    pub upgrade_item: Option<ItemHrid>,
    pub inputs: Vec<ItemQuantity>,
    pub outputs: Vec<ItemQuantity>,
}

impl ActionDetail {
    pub fn output_of(&self, item: &ItemHrid) -> Option<f64> {
        self.outputs
            .iter()
            .find(|output| &output.item == item)
            .map(|output| output.count)
    }
}

/// Buff-adjusted inputs and average outputs of one action, `None` for
/// unsupported action types.
///
/// Gathering drops that have a processed form are split into the raw share
/// left after the processing tea and the processed-equivalent share, unless
/// `ignore_processing` is set.
pub fn action_detail<P>(
    action: &ActionDef,
    data: &P,
    buffs: &BuffSnapshot,
    ignore_processing: bool,
) -> Option<ActionDetail>
where
    P: GameDataProvider + ?Sized,
{
    let action_type = action.action_type()?;
    let multipliers = buffs.for_action(action_type);
    let mut inputs = action.inputs.clone();
    let mut outputs = action.outputs.clone();

    if action_type.is_gathering() {
        for entry in &action.drop_table {
            let average = entry.average_count() * (1.0 + multipliers.gathering);
            match data.processed_item(&entry.item) {
                Some(processed) if !ignore_processing => {
                    let kept = average * (1.0 - multipliers.processing);
                    outputs.push(ItemQuantity {
                        item: entry.item.clone(),
                        count: kept,
                    });
                    outputs.push(ItemQuantity {
                        item: processed.clone(),
                        count: kept / 2.0 / (1.0 - multipliers.artisan)
                            + average * multipliers.processing / 2.0,
                    });
                }
                _ => outputs.push(ItemQuantity {
                    item: entry.item.clone(),
                    count: average,
                }),
            }
        }
    }
    if action_type.scales_output_with_gourmet() {
        for output in &mut outputs {
            output.count *= 1.0 + multipliers.gourmet;
        }
    }
    if action_type.scales_input_with_artisan() {
        for input in &mut inputs {
            input.count *= 1.0 - multipliers.artisan;
        }
    }

    Some(ActionDetail {
        action: action.hrid.clone(),
        action_type,
        upgrade_item: action.upgrade_item.clone(),
        inputs,
        outputs,
    })
}

// ---------------------------------------------------------------------------
// Action sizing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSuggestion {
    pub action: ActionHrid,
    pub count: u64,
    /// Sized with the confidence estimator rather than plain division.
    pub probabilistic: bool,
}

/// How many times to run the action that yields `item` to cover `shortage`.
///
/// Production actions divide and round up. Gathering yields are random, so
/// their count comes from `estimator`. `None` when there is nothing to do or
/// no action yields the item.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn action_count_for_shortage<P>(
    item: &ItemHrid,
    shortage: f64,
    data: &P,
    buffs: &BuffSnapshot,
    estimator: &TrialEstimator,
) -> Option<ActionSuggestion>
where
    P: GameDataProvider + ?Sized,
{
    if !shortage.is_finite() || shortage <= 0.0 {
        return None;
    }
    let action = data
        .producing_action(item)
        .or_else(|| data.gathering_action(item))?;
    let detail = action_detail(action, data, buffs, false)?;
    let per_action = detail
        .output_of(item)
        .filter(|count| count.is_finite() && *count > 0.0)
        .unwrap_or(1.0);

    let probabilistic = detail.action_type.is_gathering();
    let count = if probabilistic {
        estimator.estimate(per_action, shortage)?
    } else {
        (shortage / per_action).ceil() as u64
    };
    Some(ActionSuggestion {
        action: detail.action,
        count,
        probabilistic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_data, item};
    use crate::BuffMultipliers;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn artisan(amount: f64) -> BuffMultipliers {
        BuffMultipliers {
            artisan: amount,
            ..BuffMultipliers::default()
        }
    }

    #[test]
    fn production_recipe_uses_action_inputs() {
        let data = base_data();
        let recipe = resolve(&item("/items/lumber"), &data, &BuffSnapshot::neutral()).unwrap();
        assert_eq!(
            recipe.source,
            RecipeSource::Action(ActionHrid::new("/actions/crafting/lumber"))
        );
        assert!(close(recipe.output_count, 1.0));
        assert_eq!(recipe.inputs.len(), 1);
        assert_eq!(recipe.inputs[0].item, item("/items/log"));
        assert!(close(recipe.inputs[0].count, 2.0));
    }

    #[test]
    fn raw_items_have_no_recipe() {
        let data = base_data();
        let buffs = BuffSnapshot::neutral();
        assert!(resolve(&item("/items/log"), &data, &buffs).is_none());
        assert!(resolve(&item("/items/coin"), &data, &buffs).is_none());
        assert!(resolve(&item("/items/unknown"), &data, &buffs).is_none());
    }

    #[test]
    fn dungeon_shop_exchange_has_unit_output() {
        let data = base_data();
        let recipe =
            resolve(&item("/items/chimerical_essence"), &data, &BuffSnapshot::neutral()).unwrap();
        assert_eq!(recipe.source, RecipeSource::ShopExchange);
        assert!(close(recipe.output_count, 1.0));
        assert!(close(recipe.inputs[0].count, 50.0));
    }

    #[test]
    fn artisan_scales_inputs_but_not_upgrade_item() {
        let data = base_data();
        let buffs = BuffSnapshot::neutral().with(ActionType::Crafting, artisan(0.1));
        let recipe = resolve(&item("/items/reinforced_bow"), &data, &buffs).unwrap();
        let lumber = recipe
            .inputs
            .iter()
            .find(|i| i.item == item("/items/lumber"))
            .unwrap();
        assert!(close(lumber.count, 1.8));
        let bow = recipe
            .inputs
            .iter()
            .find(|i| i.item == item("/items/wooden_bow"))
            .unwrap();
        assert!(close(bow.count, 1.0));
    }

    #[test]
    fn gourmet_scales_cooking_output() {
        let data = base_data();
        let gourmet = BuffMultipliers {
            gourmet: 0.12,
            ..BuffMultipliers::default()
        };
        let buffs = BuffSnapshot::neutral().with(ActionType::Cooking, gourmet);
        let recipe = resolve(&item("/items/pancake"), &data, &buffs).unwrap();
        assert!(close(recipe.output_count, 2.24));

        // Gourmet on a non-cooking type has no effect.
        let buffs = BuffSnapshot::neutral().with(ActionType::Crafting, gourmet);
        let recipe = resolve(&item("/items/lumber"), &data, &buffs).unwrap();
        assert!(close(recipe.output_count, 1.0));
    }

    #[test]
    fn gathering_detail_splits_processable_drops() {
        let data = base_data();
        let tree = &data.actions[&ActionHrid::new("/actions/woodcutting/tree")];
        let buffs = BuffSnapshot::neutral().with(
            ActionType::Woodcutting,
            BuffMultipliers {
                gathering: 0.5,
                processing: 0.2,
                gourmet: 0.0,
                artisan: 0.0,
            },
        );
        let detail = action_detail(tree, &data, &buffs, false).unwrap();
        // average 2 * 1.5 = 3; raw 3 * 0.8 = 2.4; processed 2.4 / 2 + 3 * 0.2 / 2 = 1.5
        assert!(close(detail.output_of(&item("/items/log")).unwrap(), 2.4));
        assert!(close(detail.output_of(&item("/items/lumber")).unwrap(), 1.5));

        let raw_only = action_detail(tree, &data, &buffs, true).unwrap();
        assert!(close(raw_only.output_of(&item("/items/log")).unwrap(), 3.0));
        assert!(raw_only.output_of(&item("/items/lumber")).is_none());
    }

    #[test]
    fn unsupported_action_type_has_no_detail() {
        let data = base_data();
        let mut combat = data.actions[&ActionHrid::new("/actions/woodcutting/tree")].clone();
        combat.type_hrid = "/action_types/combat".to_string();
        assert!(action_detail(&combat, &data, &BuffSnapshot::neutral(), false).is_none());
    }

    #[test]
    fn production_shortage_divides_and_rounds_up() {
        let data = base_data();
        let suggestion = action_count_for_shortage(
            &item("/items/pancake"),
            7.0,
            &data,
            &BuffSnapshot::neutral(),
            &TrialEstimator::default(),
        )
        .unwrap();
        assert_eq!(suggestion.action.as_str(), "/actions/cooking/pancake");
        assert_eq!(suggestion.count, 4);
        assert!(!suggestion.probabilistic);
    }

    #[test]
    fn gathering_shortage_uses_confidence_estimate() {
        let data = base_data();
        let estimator = TrialEstimator::default();
        let suggestion = action_count_for_shortage(
            &item("/items/milk"),
            1.0,
            &data,
            &BuffSnapshot::neutral(),
            &estimator,
        )
        .unwrap();
        assert_eq!(suggestion.action.as_str(), "/actions/milking/cow");
        assert!(suggestion.probabilistic);
        // milk is processable, so the raw share per action is 1.0 with no tea.
        assert_eq!(Some(suggestion.count), estimator.estimate(1.0, 1.0));
    }

    #[test]
    fn nothing_to_suggest_without_shortage() {
        let data = base_data();
        assert!(action_count_for_shortage(
            &item("/items/log"),
            0.0,
            &data,
            &BuffSnapshot::neutral(),
            &TrialEstimator::default(),
        )
        .is_none());
    }
}
