//! Persisted per-table state.
//!
//! The store is an explicit handle keyed by table ID. It outlives table
//! instances so a table remounted with the same ID picks up where it left
//! off. Cloning the handle shares the underlying map.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::RowId;
use crate::paging::Cursor;
use crate::sort::SortSpec;

/// Persisted paging; either part may be cleared independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaging {
    pub page: Option<u32>,
    pub size: Option<usize>,
}

/// User-adjustable table settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Visibility overrides keyed by column key.
    pub column_visibility: BTreeMap<String, bool>,
    /// Free-form settings owned by the host.
    pub extra: BTreeMap<String, String>,
}

impl TableSettings {
    /// Overlays `other` onto these settings.
    pub fn merge(&mut self, other: TableSettings) {
        self.column_visibility.extend(other.column_visibility);
        self.extra.extend(other.extra);
    }
}

/// Everything remembered about one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub selection: BTreeSet<RowId>,
    pub anchor: Option<RowId>,
    pub rows_expansion: BTreeMap<RowId, bool>,
    pub collapsed_groups: BTreeMap<String, bool>,
    pub paging: StoredPaging,
    pub cursor: Option<Cursor>,
    /// `None` until the user sorts.
    pub sorting: Option<SortSpec>,
    /// Scroll offset per page.
    pub scroll_position: BTreeMap<u32, f64>,
    /// `None` until a column is resized by hand.
    pub columns_width: Option<BTreeMap<String, f64>>,
    pub settings: TableSettings,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    reset_paging_on_load: bool,
    tables: BTreeMap<String, TableState>,
}

/// Keyed store of [`TableState`].
///
/// # Example
///
/// ```
/// use tabula::store::StateStore;
///
/// let store = StateStore::new();
/// store.update_scroll_position("users", 2, 340.0);
/// assert_eq!(store.get("users").unwrap().scroll_position.get(&2), Some(&340.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    tables: Arc<DashMap<String, TableState>>,
    reset_paging_on_load: Arc<AtomicBool>,
}

impl StateStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tables with state.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// A copy of a table's state.
    pub fn get(&self, table_id: &str) -> Option<TableState> {
        self.tables.get(table_id).map(|entry| entry.value().clone())
    }

    pub fn get_or_default(&self, table_id: &str) -> TableState {
        self.get(table_id).unwrap_or_default()
    }

    /// Mutates a table's state, creating it if needed.
    pub fn update<R>(&self, table_id: &str, f: impl FnOnce(&mut TableState) -> R) -> R {
        let mut entry = self.tables.entry(table_id.to_string()).or_default();
        f(entry.value_mut())
    }

    pub fn set(&self, table_id: &str, state: TableState) {
        self.tables.insert(table_id.to_string(), state);
    }

    /// Forgets a table entirely.
    pub fn remove(&self, table_id: &str) -> Option<TableState> {
        self.tables.remove(table_id).map(|(_, state)| state)
    }

    pub fn clear(&self) {
        self.tables.clear();
    }

    /// IDs of every stored table, sorted.
    pub fn table_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Whether the next mounted table should start from page 1.
    pub fn reset_paging_on_load(&self) -> bool {
        self.reset_paging_on_load.load(Ordering::SeqCst)
    }

    pub fn set_reset_paging_on_load(&self, reset: bool) {
        self.reset_paging_on_load.store(reset, Ordering::SeqCst);
    }

    /// Returns a table to page 1, clears its cursor and consumes the
    /// reset-on-load flag.
    pub fn reset_paging(&self, table_id: &str) {
        self.update(table_id, |state| {
            state.cursor = Some(Cursor::default());
            state.paging.page = Some(1);
        });
        self.set_reset_paging_on_load(false);
    }

    /// Drops the current page and cursor of every table.
    pub fn clear_all_current_page(&self) {
        for mut entry in self.tables.iter_mut() {
            let state = entry.value_mut();
            state.cursor = None;
            state.paging.page = None;
        }
        log::debug!("Cleared current page of {} tables", self.tables.len());
    }

    // =========================================================================
    // Scroll position
    // =========================================================================

    /// Records the scroll offset of `page`. A map that sums to zero is
    /// dropped.
    pub fn update_scroll_position(&self, table_id: &str, page: u32, offset: f64) {
        self.update(table_id, |state| {
            state.scroll_position.insert(page, offset);
            if state.scroll_position.values().sum::<f64>() == 0.0 {
                state.scroll_position.clear();
            }
        });
    }

    pub fn clear_scroll_position(&self, table_id: &str) {
        self.update(table_id, |state| state.scroll_position.clear());
    }

    // =========================================================================
    // Columns and settings
    // =========================================================================

    /// Stores custom column widths, merged into existing ones when `merge`.
    pub fn update_columns_width(&self, table_id: &str, widths: BTreeMap<String, f64>, merge: bool) {
        self.update(table_id, |state| match (&mut state.columns_width, merge) {
            (Some(existing), true) => existing.extend(widths),
            (slot, _) => *slot = Some(widths),
        });
    }

    pub fn clear_columns_width(&self, table_id: &str) {
        self.update(table_id, |state| state.columns_width = None);
    }

    pub fn update_settings(&self, table_id: &str, settings: TableSettings, merge: bool) {
        self.update(table_id, |state| {
            if merge {
                state.settings.merge(settings);
            } else {
                state.settings = settings;
            }
        });
    }

    // =========================================================================
    // Groups and rows
    // =========================================================================

    pub fn update_collapsed_groups(
        &self,
        table_id: &str,
        groups: BTreeMap<String, bool>,
        merge: bool,
    ) {
        self.update(table_id, |state| {
            if !merge {
                state.collapsed_groups.clear();
            }
            state.collapsed_groups.extend(groups);
        });
    }

    /// Sets every known group to `collapsed`.
    pub fn set_all_collapsed_groups(&self, table_id: &str, collapsed: bool) {
        self.update(table_id, |state| {
            state
                .collapsed_groups
                .values_mut()
                .for_each(|value| *value = collapsed);
        });
    }

    /// Sets one row's expansion; without `merge` other rows collapse.
    pub fn set_row_expansion(&self, table_id: &str, id: RowId, expanded: bool, merge: bool) {
        self.update(table_id, |state| {
            if !merge {
                state.rows_expansion.clear();
            }
            state.rows_expansion.insert(id, expanded);
        });
    }

    /// Expands `ids`, or collapses everything when `expanded` is false.
    pub fn set_all_row_expansion(&self, table_id: &str, ids: &[RowId], expanded: bool) {
        self.update(table_id, |state| {
            state.rows_expansion.clear();
            if expanded {
                state
                    .rows_expansion
                    .extend(ids.iter().map(|id| (id.clone(), true)));
            }
        });
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Encodes the whole store.
    pub fn snapshot(&self) -> Result<Vec<u8>, StoreError> {
        let snapshot = Snapshot {
            reset_paging_on_load: self.reset_paging_on_load(),
            tables: self
                .tables
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        };
        bincode::serialize(&snapshot).map_err(StoreError::Serialization)
    }

    /// Decodes a store written by [`StateStore::snapshot`].
    pub fn restore(bytes: &[u8]) -> Result<Self, StoreError> {
        let snapshot: Snapshot =
            bincode::deserialize(bytes).map_err(StoreError::Deserialization)?;
        let store = Self::new();
        store.set_reset_paging_on_load(snapshot.reset_paging_on_load);
        for (table_id, state) in snapshot.tables {
            store.tables.insert(table_id, state);
        }
        log::debug!("Restored state for {} tables", store.len());
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortEntry;

    #[test]
    fn test_update_creates_entry() {
        let store = StateStore::new();
        assert!(store.get("t").is_none());
        store.update("t", |state| state.anchor = Some(RowId::from(3)));
        assert_eq!(store.get("t").unwrap().anchor, Some(RowId::from(3)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = StateStore::new();
        let other = store.clone();
        other.update_scroll_position("t", 1, 10.0);
        assert!(store.get("t").is_some());
    }

    #[test]
    fn test_zero_scroll_map_is_dropped() {
        let store = StateStore::new();
        store.update_scroll_position("t", 1, 100.0);
        store.update_scroll_position("t", 2, 0.0);
        assert_eq!(store.get("t").unwrap().scroll_position.len(), 2);
        store.update_scroll_position("t", 1, 0.0);
        assert!(store.get("t").unwrap().scroll_position.is_empty());
    }

    #[test]
    fn test_reset_paging_consumes_flag() {
        let store = StateStore::new();
        store.update("t", |state| {
            state.paging = StoredPaging {
                page: Some(4),
                size: Some(50),
            };
            state.cursor = Some(Cursor::new(None, Some("x".into())));
        });
        store.set_reset_paging_on_load(true);
        store.reset_paging("t");

        let state = store.get("t").unwrap();
        assert_eq!(state.paging.page, Some(1));
        assert_eq!(state.paging.size, Some(50));
        assert_eq!(state.cursor, Some(Cursor::default()));
        assert!(!store.reset_paging_on_load());
    }

    #[test]
    fn test_clear_all_current_page() {
        let store = StateStore::new();
        for id in ["a", "b"] {
            store.update(id, |state| {
                state.paging.page = Some(3);
                state.paging.size = Some(25);
                state.cursor = Some(Cursor::default());
            });
        }
        store.clear_all_current_page();
        for id in ["a", "b"] {
            let state = store.get(id).unwrap();
            assert_eq!(state.paging, StoredPaging { page: None, size: Some(25) });
            assert!(state.cursor.is_none());
        }
    }

    #[test]
    fn test_columns_width_merge_and_clear() {
        let store = StateStore::new();
        let mut first = BTreeMap::new();
        first.insert("a".to_string(), 100.0);
        store.update_columns_width("t", first, true);
        let mut second = BTreeMap::new();
        second.insert("b".to_string(), 80.0);
        store.update_columns_width("t", second.clone(), true);
        assert_eq!(store.get("t").unwrap().columns_width.unwrap().len(), 2);

        store.update_columns_width("t", second, false);
        assert_eq!(store.get("t").unwrap().columns_width.unwrap().len(), 1);
        store.clear_columns_width("t");
        assert!(store.get("t").unwrap().columns_width.is_none());
    }

    #[test]
    fn test_set_all_collapsed_groups_touches_known_groups() {
        let store = StateStore::new();
        let groups: BTreeMap<String, bool> =
            [("a".to_string(), false), ("b".to_string(), true)].into();
        store.update_collapsed_groups("t", groups, true);
        store.set_all_collapsed_groups("t", true);
        let state = store.get("t").unwrap();
        assert!(state.collapsed_groups.values().all(|&c| c));
        assert_eq!(state.collapsed_groups.len(), 2);
    }

    #[test]
    fn test_row_expansion_single_and_multi() {
        let store = StateStore::new();
        store.set_row_expansion("t", RowId::from(1), true, true);
        store.set_row_expansion("t", RowId::from(2), true, true);
        assert_eq!(store.get("t").unwrap().rows_expansion.len(), 2);
        store.set_row_expansion("t", RowId::from(3), true, false);
        assert_eq!(store.get("t").unwrap().rows_expansion.len(), 1);
        store.set_all_row_expansion("t", &[RowId::from(1), RowId::from(2)], true);
        assert_eq!(store.get("t").unwrap().rows_expansion.len(), 2);
        store.set_all_row_expansion("t", &[], false);
        assert!(store.get("t").unwrap().rows_expansion.is_empty());
    }

    #[test]
    fn test_snapshot_restore() {
        let store = StateStore::new();
        store.update("t", |state| {
            state.selection.insert(RowId::from("a"));
            state.sorting = Some(SortSpec::from(vec![SortEntry::desc("name")]));
            state.scroll_position.insert(2, 120.5);
            state.settings.column_visibility.insert("notes".into(), false);
        });
        store.set_reset_paging_on_load(true);

        let bytes = store.snapshot().unwrap();
        let restored = StateStore::restore(&bytes).unwrap();
        assert_eq!(restored.get("t"), store.get("t"));
        assert!(restored.reset_paging_on_load());
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let result = StateStore::restore(&[0xff, 0x01]);
        assert!(matches!(result, Err(StoreError::Deserialization(_))));
    }

    #[test]
    fn test_remove() {
        let store = StateStore::new();
        store.update("t", |_| {});
        assert!(store.remove("t").is_some());
        assert!(store.is_empty());
    }
}
