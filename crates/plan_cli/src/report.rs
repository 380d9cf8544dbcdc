//! Plain-text rendering of plans and target lists.

use plan_core::{
    action_count_for_shortage, format_number, target_category, AggregationResult, BuffSnapshot,
    CategoryHrid, GameData, TargetKind, TargetList, TrialEstimator, EPSILON,
};

/// `/item_categories/house_rooms` → `House Rooms`.
pub fn category_label(category: Option<&CategoryHrid>) -> String {
    let Some(category) = category else {
        return "Other".to_string();
    };
    category
        .as_str()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn target_label(kind: &TargetKind, data: &GameData) -> String {
    match kind {
        TargetKind::Item(item) => data
            .items
            .get(item)
            .map_or_else(|| item.to_string(), |def| def.name.clone()),
        TargetKind::HouseRoom(room) => data
            .house_rooms
            .get(room)
            .map_or_else(|| room.to_string(), |def| def.name.clone()),
    }
}

/// Rows grouped under category headings. Short items carry the suggested
/// number of actions to close the gap.
pub fn render_plan(
    plan: &AggregationResult,
    data: &GameData,
    buffs: &BuffSnapshot,
    estimator: &TrialEstimator,
) -> String {
    let mut out = String::new();
    if plan.is_empty() {
        out.push_str("nothing to plan\n");
        return out;
    }
    let mut current: Option<Option<CategoryHrid>> = None;
    for row in plan.rows(data) {
        if current.as_ref() != Some(&row.category) {
            out.push_str(&format!(
                "== {} ==\n",
                category_label(row.category.as_ref())
            ));
            current = Some(row.category.clone());
        }
        out.push_str(&format!(
            "  {:<28} required {:>7}  owned {:>7}  shortage {:>7}  surplus {:>7}",
            row.name,
            format_number(row.required),
            format_number(row.owned),
            format_number(row.shortage),
            format_number(row.surplus),
        ));
        if row.shortage > EPSILON {
            if let Some(suggestion) =
                action_count_for_shortage(&row.item, row.shortage, data, buffs, estimator)
            {
                let marker = if suggestion.probabilistic { "~" } else { "" };
                out.push_str(&format!(
                    "  -> {marker}{} x {}",
                    suggestion.count, suggestion.action
                ));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_targets(targets: &TargetList, data: &GameData) -> String {
    let mut out = String::new();
    if targets.is_empty() {
        out.push_str("no targets\n");
    }
    for target in targets.targets() {
        let category = target.category(data);
        let excluded = !target.need_calc
            || category
                .as_ref()
                .is_none_or(|category| !targets.category_enabled(category));
        out.push_str(&format!(
            "{} {:<28} {:>8}  [{}]  {}\n",
            if excluded { "-" } else { "+" },
            target_label(&target.kind, data),
            format_number(target.count.abs()),
            category_label(category.as_ref()),
            target.kind,
        ));
    }
    let disabled: Vec<String> = targets
        .categories()
        .iter()
        .filter(|(_, enabled)| !**enabled)
        .map(|(category, _)| category_label(Some(category)))
        .collect();
    if !disabled.is_empty() {
        out.push_str(&format!("excluded categories: {}\n", disabled.join(", ")));
    }
    out
}

/// Accepts `materials`, `house rooms` or a full category hrid.
pub fn parse_category(data: &GameData, query: &str) -> Option<CategoryHrid> {
    let query = query.trim();
    let hrid = if query.starts_with("/item_categories/") {
        query.to_string()
    } else {
        format!(
            "/item_categories/{}",
            query.to_lowercase().replace([' ', '-'], "_")
        )
    };
    data.category_order
        .iter()
        .find(|category| category.as_str() == hrid)
        .cloned()
}

/// Category a new target will be filed under, for the `targets add` echo.
pub fn describe_target(kind: &TargetKind, data: &GameData) -> String {
    format!(
        "{} ({})",
        target_label(kind, data),
        category_label(target_category(kind, data).as_ref())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::test_fixtures::{base_data, item};
    use plan_core::{compute_plan, Demand, HouseRoomHrid, InventorySnapshot};

    #[test]
    fn category_label_title_cases_last_segment() {
        let label = category_label(Some(&CategoryHrid::new("/item_categories/house_rooms")));
        assert_eq!(label, "House Rooms");
        assert_eq!(category_label(None), "Other");
    }

    #[test]
    fn plan_groups_rows_and_suggests_actions() {
        let data = base_data();
        let buffs = BuffSnapshot::neutral();
        let plan = compute_plan(
            &[Demand::item(item("/items/lumber"), 10.0)],
            &InventorySnapshot::new(),
            &data,
            &buffs,
        )
        .unwrap();
        let text = render_plan(&plan, &data, &buffs, &TrialEstimator::default());
        let materials = text.find("== Materials ==").unwrap();
        let resource = text.find("== Resource ==").unwrap();
        assert!(materials < resource);
        assert!(text.contains("-> 10 x /actions/crafting/lumber"));
        assert!(text.contains("-> ~"));
        assert!(text.contains("/actions/woodcutting/tree"));
    }

    #[test]
    fn empty_plan_says_so() {
        let data = base_data();
        let text = render_plan(
            &AggregationResult::default(),
            &data,
            &BuffSnapshot::neutral(),
            &TrialEstimator::default(),
        );
        assert_eq!(text, "nothing to plan\n");
    }

    #[test]
    fn targets_show_exclusion_marks() {
        let data = base_data();
        let mut targets = TargetList::new();
        targets.upsert(TargetKind::Item(item("/items/lumber")), 40.0);
        targets.upsert(
            TargetKind::HouseRoom(HouseRoomHrid::new("/house_rooms/workshop")),
            3.0,
        );
        targets.set_category(CategoryHrid::new("/item_categories/materials"), false);
        let text = render_targets(&targets, &data);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("- Lumber"));
        assert!(lines[1].starts_with("+ Workshop"));
        assert_eq!(lines[2], "excluded categories: Materials");
    }

    #[test]
    fn target_lines_are_newline_terminated_and_unknown_items_excluded() {
        let data = base_data();
        let mut targets = TargetList::new();
        targets.upsert(TargetKind::Item(item("/items/lumber")), -4.0);
        targets.upsert(TargetKind::Item(item("/items/retired_relic")), 2.0);
        let text = render_targets(&targets, &data);
        assert!(text.ends_with('\n'));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!(
                "+ {:<28} {:>8}  [Materials]  /items/lumber",
                "Lumber", "4"
            )
        );
        assert!(lines[1].starts_with("- /items/retired_relic"));
        assert!(lines[1].contains("[Other]"));
    }

    #[test]
    fn parse_category_accepts_names_and_hrids() {
        let data = base_data();
        let expected = Some(CategoryHrid::new("/item_categories/house_rooms"));
        assert_eq!(parse_category(&data, "House Rooms"), expected);
        assert_eq!(parse_category(&data, "/item_categories/house_rooms"), expected);
        assert_eq!(parse_category(&data, "weapons"), None);
    }
}
