//! Grouping rows under collapsible headers.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::model::Row;

/// Synthetic header emitted before each group's members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupHeader {
    pub group_id: String,
    /// Members in the group, counted even while collapsed.
    pub member_count: usize,
    pub collapsed: bool,
}

/// One entry of the render sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RenderItem {
    Header(GroupHeader),
    /// Index into the row slice the sequence was built from.
    Row(usize),
}

impl RenderItem {
    pub fn row_index(&self) -> Option<usize> {
        match self {
            Self::Row(index) => Some(*index),
            Self::Header(_) => None,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Self::Header(_))
    }
}

/// Rows partitioned by key, in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groups {
    order: Vec<String>,
    members: HashMap<String, Vec<usize>>,
}

impl Groups {
    /// Partitions `rows` by `key`, keeping row order inside each group.
    pub fn partition(rows: &[Row], key: impl Fn(&Row) -> String) -> Self {
        Self::partition_indexed(rows.iter().enumerate(), key)
    }

    /// Partitions pre-indexed rows, e.g. the survivors of a filter. Member
    /// indices are the ones supplied.
    pub fn partition_indexed<'a>(
        rows: impl IntoIterator<Item = (usize, &'a Row)>,
        key: impl Fn(&Row) -> String,
    ) -> Self {
        let mut groups = Self::default();
        for (index, row) in rows {
            let group_id = key(row);
            match groups.members.get_mut(&group_id) {
                Some(members) => members.push(index),
                None => {
                    groups.order.push(group_id.clone());
                    groups.members.insert(group_id, vec![index]);
                }
            }
        }
        groups
    }

    /// Group IDs in first-seen order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn members(&self, group_id: &str) -> &[usize] {
        self.members.get(group_id).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Flattens the groups into headers followed by their visible members.
    ///
    /// Groups missing from `collapsed` are expanded.
    pub fn flatten(&self, collapsed: &BTreeMap<String, bool>) -> Vec<RenderItem> {
        let mut items = Vec::new();
        for group_id in &self.order {
            let members = self.members(group_id);
            let is_collapsed = collapsed.get(group_id).copied().unwrap_or(false);
            items.push(RenderItem::Header(GroupHeader {
                group_id: group_id.clone(),
                member_count: members.len(),
                collapsed: is_collapsed,
            }));
            if !is_collapsed {
                items.extend(members.iter().copied().map(RenderItem::Row));
            }
        }
        items
    }

    /// Collapse state restricted to the groups present now.
    pub fn active_collapse_state(
        &self,
        collapsed: &BTreeMap<String, bool>,
    ) -> BTreeMap<String, bool> {
        self.order
            .iter()
            .map(|id| (id.clone(), collapsed.get(id).copied().unwrap_or(false)))
            .collect()
    }
}

/// Builds the render sequence for `rows`.
pub fn group(
    rows: &[Row],
    key: impl Fn(&Row) -> String,
    collapsed: &BTreeMap<String, bool>,
) -> Vec<RenderItem> {
    Groups::partition(rows, key).flatten(collapsed)
}

/// Render sequence without grouping: every row in order.
pub fn ungrouped(rows: &[Row]) -> Vec<RenderItem> {
    (0..rows.len()).map(RenderItem::Row).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn team_rows() -> Vec<Row> {
        ["red", "blue", "red", "green", "blue"]
            .iter()
            .enumerate()
            .map(|(i, team)| Row::with_id(i as i64, json!({ "team": team })))
            .collect()
    }

    fn team(row: &Row) -> String {
        row.data["team"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let groups = Groups::partition(&team_rows(), team);
        assert_eq!(groups.ids(), ["red", "blue", "green"]);
        assert_eq!(groups.members("blue"), [1, 4]);
        assert!(groups.members("purple").is_empty());
    }

    #[test]
    fn test_collapsed_group_keeps_count() {
        let mut collapsed = BTreeMap::new();
        collapsed.insert("red".to_string(), true);
        let items = group(&team_rows(), team, &collapsed);

        assert_eq!(
            items[0],
            RenderItem::Header(GroupHeader {
                group_id: "red".into(),
                member_count: 2,
                collapsed: true
            })
        );
        assert!(items[1].is_header());
        assert_eq!(items[2], RenderItem::Row(1));
        assert_eq!(items[3], RenderItem::Row(4));
        assert_eq!(items.len(), 3 + 3);
    }

    #[test]
    fn test_active_collapse_state_drops_stale_groups() {
        let mut collapsed = BTreeMap::new();
        collapsed.insert("gone".to_string(), true);
        collapsed.insert("blue".to_string(), true);
        let active = Groups::partition(&team_rows(), team).active_collapse_state(&collapsed);
        assert_eq!(active.len(), 3);
        assert_eq!(active.get("blue"), Some(&true));
        assert_eq!(active.get("red"), Some(&false));
        assert!(!active.contains_key("gone"));
    }

    #[test]
    fn test_partition_indexed_keeps_supplied_indices() {
        let rows = team_rows();
        let kept = rows.iter().enumerate().filter(|(i, _)| i % 2 == 0);
        let groups = Groups::partition_indexed(kept, team);
        assert_eq!(groups.ids(), ["red", "blue"]);
        assert_eq!(groups.members("red"), [0, 2]);
        assert_eq!(groups.members("blue"), [4]);
    }

    #[test]
    fn test_ungrouped_lists_every_row() {
        assert_eq!(
            ungrouped(&team_rows()),
            (0..5).map(RenderItem::Row).collect::<Vec<_>>()
        );
    }
}
