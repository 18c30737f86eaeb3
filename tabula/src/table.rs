//! The table orchestrator.
//!
//! [`Table`] owns one table instance: its columns, the current row set and
//! the selection, sort, paging, grouping and layout state. Every gesture is
//! a method call; state changes are persisted to the [`StateStore`] and
//! reported through the event queue.
//!
//! Time never flows implicitly. Calls that schedule debounced work take a
//! `now` and [`Table::tick`] runs whatever has come due.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use serde_json::Value;

use crate::config::{DataSource, PagingMode, TableConfig};
use crate::debounce::Debouncer;
use crate::error::TableError;
use crate::events::{EventKind, EventQueue, EventSort, TableEvent};
use crate::filter::Filters;
use crate::group::{Groups, RenderItem};
use crate::layout::{self, LayoutOptions, ResizeSession, fit_width, grow_last_column};
use crate::model::{Column, Path, Row, RowId, normalize_columns, rows_from_records};
use crate::paging::{PageChange, PageEntry, PageInfo, Paging, PagingController, page_list};
use crate::selection::{
    Modifiers, NavKey, Selection, SelectionDelta, SelectionEngine, SelectionPolicy, scroll_target,
};
use crate::sort::{self, Comparators, SortSpec};
use crate::store::{StateStore, TableSettings};
use crate::viewport::{ColumnMeasure, ScrollMetrics, ScrollRequest, Viewport};

/// Debounced side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Effect {
    /// Recompute column widths.
    Layout,
    /// Write hand-resized column widths to the store.
    PersistColumnWidths,
    /// Write the scroll offset of the current page to the store.
    PersistScroll,
}

/// What applying a new row set did besides replacing the rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowsApplied {
    /// Selected IDs absent from the new rows.
    pub dropped_selection: Vec<RowId>,
    /// Scroll to restore the remembered offset of this page.
    pub restore_scroll: Option<ScrollRequest>,
    /// The page came back empty and the table stepped back one page.
    pub stepped_back: bool,
}

/// One mounted table.
#[derive(Debug)]
pub struct Table {
    config: TableConfig,
    id_path: Path,
    store: StateStore,
    comparators: Comparators,

    column_defs: Vec<Column>,
    columns: Vec<Column>,

    /// Every row received; for a client data source, the full data set.
    all_rows: Option<Vec<Row>>,
    /// Rows of the current page, sorted.
    rows: Vec<Row>,
    groups: Option<Groups>,
    render: Vec<RenderItem>,
    filters: Filters,

    sorting: SortSpec,
    selection: SelectionEngine,
    paging: PagingController,
    collapsed_groups: BTreeMap<String, bool>,
    rows_expansion: BTreeMap<RowId, bool>,

    events: EventQueue,
    debouncer: Debouncer<Effect>,
    resize: Option<ResizeSession>,
    custom_widths: bool,
    pending_widths: BTreeMap<String, f64>,
    pending_scroll: Option<f64>,
    viewport_width: f64,

    initialized: bool,
    body_visible: bool,
    focused: bool,
    loading: bool,
}

impl Table {
    /// Mounts a table, hydrating its state from `store`.
    ///
    /// Fails only on an invalid configuration.
    pub fn mount(config: TableConfig, store: StateStore) -> Result<Self, TableError> {
        config.validate()?;
        let id_path = Path::parse(&config.id_field)?;

        if store.reset_paging_on_load() {
            log::debug!("Resetting paging of '{}' on load", config.table_id);
            store.reset_paging(&config.table_id);
        }
        let state = store.get_or_default(&config.table_id);

        let paging = Paging::new(
            state.paging.page.unwrap_or(1).max(1),
            state
                .paging
                .size
                .filter(|&s| s > 0)
                .unwrap_or_else(|| config.initial_page_size()),
        );
        let mut pager = PagingController::new(config.paging_mode, paging);
        if let Some(cursor) = state.cursor.clone() {
            pager = pager.with_cursor(cursor);
        }

        let selection = SelectionEngine::with_selection(
            SelectionPolicy::from(&config),
            Selection::from_parts(state.selection.clone(), state.anchor.clone()),
        );

        log::debug!(
            "Mounted table '{}' on page {}/{}",
            config.table_id,
            paging.page,
            paging.size
        );

        Ok(Self {
            id_path,
            store,
            comparators: Comparators::new(),
            column_defs: Vec::new(),
            columns: Vec::new(),
            all_rows: None,
            rows: Vec::new(),
            groups: None,
            render: Vec::new(),
            filters: Filters::new(),
            sorting: state.sorting.unwrap_or_default(),
            selection,
            paging: pager,
            collapsed_groups: state.collapsed_groups,
            rows_expansion: state.rows_expansion,
            events: EventQueue::new(),
            debouncer: Debouncer::new(config.debounce),
            resize: None,
            custom_widths: false,
            pending_widths: BTreeMap::new(),
            pending_scroll: None,
            viewport_width: 0.0,
            initialized: false,
            body_visible: false,
            focused: false,
            loading: false,
            config,
        })
    }

    /// Replaces the comparator registry used for client-side sorting.
    pub fn with_comparators(mut self, comparators: Comparators) -> Self {
        self.comparators = comparators;
        self
    }

    /// Persists pending writes and tears the instance down.
    ///
    /// The persisted state stays in the store for the next mount; use
    /// [`StateStore::remove`] to forget it.
    pub fn unmount(mut self) -> StateStore {
        self.flush_persistence();
        log::debug!("Unmounted table '{}'", self.config.table_id);
        self.store
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn table_id(&self) -> &str {
        &self.config.table_id
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Visible columns with their computed widths.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows of the current page in display order, before filtering.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The flattened render sequence handed to the viewport.
    pub fn render_sequence(&self) -> &[RenderItem] {
        &self.render
    }

    /// The row rendered at `index`, if that position is a row.
    pub fn row_at(&self, index: usize) -> Option<&Row> {
        self.render
            .get(index)?
            .row_index()
            .and_then(|i| self.rows.get(i))
    }

    /// Row IDs per render position; headers and rows without an ID are
    /// `None`.
    pub fn render_ids(&self) -> Vec<Option<RowId>> {
        self.render
            .iter()
            .map(|item| item.row_index().and_then(|i| self.rows[i].id.clone()))
            .collect()
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn sorting(&self) -> &SortSpec {
        &self.sorting
    }

    pub fn paging(&self) -> Paging {
        self.paging.paging()
    }

    pub fn page_info(&self) -> PageInfo {
        self.paging.info()
    }

    /// Selectable pages; empty in cursor mode, where the total is unknown.
    pub fn page_list(&self) -> Vec<PageEntry> {
        if self.paging.mode() == PagingMode::Cursor {
            return Vec::new();
        }
        let Paging { size, .. } = self.paging.paging();
        page_list(self.paging.total_elements(), size, &[])
    }

    pub fn collapsed_groups(&self) -> &BTreeMap<String, bool> {
        &self.collapsed_groups
    }

    pub fn is_row_expanded(&self, id: &RowId) -> bool {
        self.rows_expansion.get(id).copied().unwrap_or(false)
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Takes the queued events.
    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        self.events.drain()
    }

    /// Earliest deadline of pending debounced work.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Replaces the column definitions.
    ///
    /// Persisted custom widths are applied right away. The first call
    /// completes initialization. Call [`Table::update_layout`] once the
    /// header is rendered.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.column_defs = columns;
        self.apply_columns();

        let stored = self.store.get(self.table_id()).and_then(|s| s.columns_width);
        self.custom_widths = stored.is_some();
        if let Some(widths) = stored {
            let min_cell = self.config.min_cell_width;
            for column in &mut self.columns {
                if let Some(width) = widths.get(column.key()).copied().or(column.width) {
                    column.set_computed_width(width, min_cell);
                }
            }
        }

        if !self.initialized {
            self.initialized = true;
            self.emit(EventKind::Initialized, self.all_rows.is_none());
        }
    }

    fn apply_columns(&mut self) {
        let visibility = self
            .store
            .get(self.table_id())
            .map(|s| s.settings.column_visibility)
            .unwrap_or_default();
        let previous: BTreeMap<String, f64> = self
            .columns
            .iter()
            .filter_map(|c| c.computed_width.map(|w| (c.key().to_string(), w)))
            .collect();
        self.columns = normalize_columns(self.column_defs.clone(), &visibility);
        for column in &mut self.columns {
            column.computed_width = previous.get(column.key()).copied();
        }
    }

    /// Shows or hides a column and persists the choice.
    pub fn set_column_visibility(&mut self, key: &str, visible: bool) {
        let mut settings = TableSettings::default();
        settings.column_visibility.insert(key.to_string(), visible);
        self.update_settings(settings, true);
    }

    /// Updates the persisted settings and re-applies the columns.
    pub fn update_settings(&mut self, settings: TableSettings, merge: bool) {
        self.store.update_settings(self.table_id(), settings, merge);
        self.apply_columns();
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Records a new viewport width and schedules a layout pass.
    pub fn set_viewport_width(&mut self, width: f64, now: Instant) {
        self.viewport_width = width;
        self.debouncer.schedule(Effect::Layout, now);
    }

    /// Schedules a layout pass, coalescing bursts of triggers.
    pub fn request_layout(&mut self, now: Instant) {
        self.debouncer.schedule(Effect::Layout, now);
    }

    /// Recomputes column widths now.
    ///
    /// Returns `false` when the layout was deferred because the viewport
    /// has no width or the header cannot be measured.
    pub fn update_layout(&mut self, measure: &dyn ColumnMeasure) -> bool {
        let custom = self
            .store
            .get(self.table_id())
            .and_then(|s| s.columns_width)
            .unwrap_or_default();
        let header = measure.header_widths();
        let Some(result) = layout::layout(
            &self.columns,
            self.viewport_width,
            &custom,
            header.as_deref(),
            &LayoutOptions::from(&self.config),
        ) else {
            return false;
        };

        let min_cell = self.config.min_cell_width;
        for (i, column) in self.columns.iter_mut().enumerate() {
            if let Some(min) = result.header_min_widths[i] {
                column.min_width = Some(min);
            }
            column.set_computed_width(result.widths[i], min_cell);
        }
        true
    }

    /// Starts dragging the resize handle of column `column`.
    pub fn begin_resize(&mut self, column: usize, pointer_x: f64) -> bool {
        let Some(col) = self.columns.get(column) else {
            return false;
        };
        if !col.resizable {
            return false;
        }
        let width = col.computed_width.or(col.width).unwrap_or(self.config.min_cell_width);
        self.resize = Some(ResizeSession::begin(column, pointer_x, width, self.config.rtl));
        true
    }

    /// Follows the pointer during a resize drag.
    pub fn drag_resize(&mut self, pointer_x: f64, now: Instant) -> Option<f64> {
        let session = self.resize.as_mut()?;
        let index = session.column();
        let column = self.columns.get(index)?;
        let min = column.effective_min_width(self.config.min_cell_width);
        let width = session.drag(pointer_x, min);
        self.set_custom_width(index, width, now);
        Some(width)
    }

    /// Ends a resize drag. Returns whether the column width changed.
    pub fn end_resize(&mut self, now: Instant) -> bool {
        let Some(session) = self.resize.take() else {
            return false;
        };
        let changed = session.changed();
        if changed {
            self.debouncer.schedule(Effect::PersistColumnWidths, now);
            self.grow_last_column();
        }
        changed
    }

    /// Sizes a column to its widest rendered content.
    pub fn fit_column(&mut self, column: usize, measure: &dyn ColumnMeasure, now: Instant) -> bool {
        if column >= self.columns.len() {
            return false;
        }
        let header = self
            .config
            .dbl_click_resize_include_header
            .then(|| measure.natural_header_width(column));
        let Some(width) = fit_width(header, &measure.natural_cell_widths(column)) else {
            return false;
        };
        self.set_custom_width(column, width, now);
        self.grow_last_column();
        true
    }

    fn set_custom_width(&mut self, index: usize, width: f64, now: Instant) {
        let min_cell = self.config.min_cell_width;
        let Some(column) = self.columns.get_mut(index) else {
            return;
        };
        if !column.set_computed_width(width, min_cell) {
            return;
        }
        if let Some(computed) = column.computed_width {
            self.pending_widths.insert(column.key().to_string(), computed);
        }
        self.custom_widths = true;
        self.debouncer.schedule(Effect::PersistColumnWidths, now);
    }

    fn grow_last_column(&mut self) {
        if !self.config.auto_resize_last_column || self.viewport_width <= 0.0 {
            return;
        }
        let mut widths: Vec<f64> = self
            .columns
            .iter()
            .map(|c| c.computed_width.unwrap_or(0.0))
            .collect();
        if grow_last_column(&mut widths, self.viewport_width)
            && let (Some(column), Some(&width)) = (self.columns.last_mut(), widths.last())
        {
            column.set_computed_width(width, self.config.min_cell_width);
        }
    }

    /// Forgets hand-set column widths. Returns `true` if there were any;
    /// the caller should then re-run the layout.
    pub fn clear_column_widths(&mut self) -> bool {
        if !self.custom_widths {
            return false;
        }
        self.custom_widths = false;
        self.pending_widths.clear();
        self.debouncer.cancel(&Effect::PersistColumnWidths);
        self.store.clear_columns_width(self.table_id());
        for column in &mut self.columns {
            column.computed_width = None;
        }
        true
    }

    // =========================================================================
    // Debounced work
    // =========================================================================

    /// Runs debounced work due at `now` and returns what ran.
    pub fn tick(&mut self, now: Instant, measure: &dyn ColumnMeasure) -> Vec<Effect> {
        let due = self.debouncer.flush(now);
        for effect in &due {
            match effect {
                Effect::Layout => {
                    self.update_layout(measure);
                }
                Effect::PersistColumnWidths => self.persist_column_widths(),
                Effect::PersistScroll => self.persist_scroll(),
            }
        }
        due
    }

    fn flush_persistence(&mut self) {
        for effect in self.debouncer.flush_all() {
            match effect {
                Effect::Layout => {}
                Effect::PersistColumnWidths => self.persist_column_widths(),
                Effect::PersistScroll => self.persist_scroll(),
            }
        }
    }

    fn persist_column_widths(&mut self) {
        if !self.custom_widths || self.pending_widths.is_empty() {
            return;
        }
        let widths = std::mem::take(&mut self.pending_widths);
        log::debug!("Persisting {} column widths", widths.len());
        self.store
            .update_columns_width(&self.config.table_id, widths, true);
    }

    fn persist_scroll(&mut self) {
        if let Some(offset) = self.pending_scroll.take() {
            let page = self.paging.paging().page;
            self.store
                .update_scroll_position(&self.config.table_id, page, offset);
        }
    }

    /// Records the viewport's scroll offset; persisted after the debounce.
    pub fn on_scroll(&mut self, offset: f64, now: Instant) {
        self.pending_scroll = Some(offset);
        self.debouncer.schedule(Effect::PersistScroll, now);
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Replaces the row set with raw records.
    ///
    /// With a client data source the records are the full data set; the
    /// table sorts and pages them itself. Otherwise they are the current
    /// page as delivered.
    pub fn set_rows(&mut self, records: Vec<Value>) -> RowsApplied {
        let rows = rows_from_records(records, &self.id_path);
        if self.config.data_source == DataSource::Client
            || self.config.paging_mode == PagingMode::Cursor
        {
            self.paging.set_total_elements(rows.len());
        }
        self.all_rows = Some(rows);
        self.refresh_rows()
    }

    /// Sets the total item count reported by a server data source.
    pub fn set_total_elements(&mut self, total: usize) {
        self.paging.set_total_elements(total);
    }

    /// Accepts cursor tokens for the current page. Returns whether it is
    /// the last page.
    pub fn set_cursor(&mut self, before: Option<String>, after: Option<String>) -> bool {
        let last = self.paging.set_cursor(before, after);
        self.persist_cursor();
        last
    }

    fn page_rows(&self) -> Vec<Row> {
        let all = self.all_rows.clone().unwrap_or_default();
        if self.config.data_source == DataSource::Server {
            return all;
        }
        let sorted = sort::sort(all, &self.sorting, &self.comparators);
        if !self.config.paginate {
            return sorted;
        }
        let Paging { page, size } = self.paging.paging();
        let start = (page as usize - 1).saturating_mul(size);
        sorted.into_iter().skip(start).take(size).collect()
    }

    fn refresh_rows(&mut self) -> RowsApplied {
        let mut applied = RowsApplied::default();
        loop {
            let rows = self.page_rows();
            if !rows.is_empty() || self.paging.paging().page <= 1 {
                let outcome = self.apply_rows(rows);
                applied.dropped_selection = outcome.dropped_selection;
                applied.restore_scroll = outcome.restore_scroll;
                return applied;
            }

            log::debug!(
                "Page {} of '{}' is empty, stepping back",
                self.paging.paging().page,
                self.config.table_id
            );
            applied.stepped_back = true;
            let server = self.config.data_source == DataSource::Server;
            if server {
                applied.dropped_selection = self.clear_rows();
            }
            self.paging.step_back();
            self.body_visible = false;
            self.persist_paging();
            self.emit(EventKind::UpdatePaging, true);
            if server {
                return applied;
            }
        }
    }

    /// Empties the page ahead of a step back. The selection is reconciled
    /// against the empty set first.
    fn clear_rows(&mut self) -> Vec<RowId> {
        let before = self.selection.selection().clone();
        let dropped = self.selection.reconcile(&HashSet::new(), None);
        self.rows.clear();
        self.rebuild_render();
        if *self.selection.selection() != before {
            self.persist_selection();
            self.emit(EventKind::SelectionChanged, false);
        }
        dropped
    }

    /// Installs a page of rows. Selection and collapse state are
    /// reconciled before the render sequence is rebuilt.
    fn apply_rows(&mut self, rows: Vec<Row>) -> RowsApplied {
        let present: HashSet<RowId> = rows.iter().filter_map(|r| r.id.clone()).collect();
        let before = self.selection.selection().clone();
        let dropped_selection = self.selection.reconcile(&present, None);
        self.rows = rows;

        if !self.rows.is_empty() {
            if let Some(group_by) = &self.config.group_by {
                let groups = Groups::partition(&self.rows, |row| group_by.key(row));
                let active = groups.active_collapse_state(&self.collapsed_groups);
                self.store
                    .update_collapsed_groups(&self.config.table_id, active.clone(), true);
                self.collapsed_groups.extend(active);
            }
            self.emit(EventKind::RowsUpdate, false);
            let first = self.rows.iter().find_map(|r| r.id.clone());
            self.selection.force_selection(first.as_ref());
        }

        self.rebuild_render();
        self.loading = false;

        if *self.selection.selection() != before {
            self.persist_selection();
            self.emit(EventKind::SelectionChanged, false);
        }

        let mut restore_scroll = None;
        if !self.body_visible {
            self.body_visible = true;
            let page = self.paging.paging().page;
            let offset = self
                .store
                .get(self.table_id())
                .and_then(|s| s.scroll_position.get(&page).copied())
                .unwrap_or(0.0);
            restore_scroll = Some(ScrollRequest::ToOffset(offset));
        }

        RowsApplied {
            dropped_selection,
            restore_scroll,
            stepped_back: false,
        }
    }

    fn rebuild_render(&mut self) {
        let filters = &self.filters;
        let kept = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filters.matches(row));

        match &self.config.group_by {
            Some(group_by) => {
                let groups = Groups::partition_indexed(kept, |row| group_by.key(row));
                self.render = groups.flatten(&self.collapsed_groups);
                self.groups = Some(groups);
            }
            None => {
                self.render = kept.map(|(i, _)| RenderItem::Row(i)).collect();
                self.groups = None;
            }
        }
    }

    /// Requests fresh data, optionally jumping to `goto_page` first.
    pub fn refresh(&mut self, goto_page: Option<u32>, show_loader: bool) {
        if let Some(page) = goto_page {
            self.change_page(PageChange::page(page));
        }
        if self.initialized {
            self.emit(EventKind::UpdateData, show_loader);
        }
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Sets a column filter; an empty query removes it.
    pub fn set_filter(&mut self, field: &str, query: &str) -> bool {
        if !self.filters.set(field, query) {
            return false;
        }
        self.rebuild_render();
        true
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.rebuild_render();
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Cycles the sort of the column bound to `field`.
    pub fn on_column_sort(&mut self, field: &str) -> bool {
        let Some(column) = self.columns.iter().find(|c| c.field == field).cloned() else {
            return false;
        };
        if !column.sortable {
            return false;
        }
        self.sorting.toggle(&column, self.config.multi_sort);
        self.sort_changed();
        true
    }

    /// Replaces the sort specification.
    pub fn set_sorting(&mut self, spec: SortSpec) {
        self.sorting = spec;
        self.sort_changed();
    }

    fn sort_changed(&mut self) {
        let sorting = self.sorting.clone();
        self.store
            .update(&self.config.table_id, |state| state.sorting = Some(sorting));
        self.emit(EventKind::SortChange, true);
        if self.config.data_source == DataSource::Client && self.all_rows.is_some() {
            self.refresh_rows();
        }
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Applies a paging gesture and asks for the new page.
    pub fn on_page_change(&mut self, change: PageChange) -> Paging {
        let paging = self.change_page(change);
        self.emit(EventKind::UpdatePaging, true);
        if self.config.data_source == DataSource::Client && self.all_rows.is_some() {
            self.refresh_rows();
        }
        paging
    }

    fn change_page(&mut self, change: PageChange) -> Paging {
        let outcome = self.paging.on_page_change(change);
        self.body_visible = false;
        if outcome.clear_scroll {
            self.pending_scroll = None;
            self.debouncer.cancel(&Effect::PersistScroll);
            self.store.clear_scroll_position(self.table_id());
        }
        self.persist_paging();
        self.persist_cursor();
        outcome.paging
    }

    fn persist_paging(&self) {
        let Paging { page, size } = self.paging.paging();
        self.store.update(&self.config.table_id, |state| {
            state.paging.page = Some(page);
            state.paging.size = Some(size);
        });
    }

    fn persist_cursor(&self) {
        if let Some(cursor) = self.paging.cursor().cloned() {
            self.store
                .update(&self.config.table_id, |state| state.cursor = Some(cursor));
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Handles a click on the render position `index`.
    pub fn select_row(&mut self, index: usize, modifiers: Modifiers) -> SelectionDelta {
        let sequence = self.render_ids();
        let delta = self.selection.select_row(&sequence, index, modifiers);
        self.selection_changed(&delta);
        delta
    }

    /// Selects every row on the page.
    pub fn select_all(&mut self) -> SelectionDelta {
        let sequence = self.render_ids();
        let delta = self.selection.select_all(&sequence);
        self.selection_changed(&delta);
        delta
    }

    pub fn clear_selection(&mut self) -> SelectionDelta {
        let delta = self.selection.clear();
        self.selection_changed(&delta);
        delta
    }

    /// Replaces the selection with the given IDs that exist on the page.
    pub fn set_selection(&mut self, ids: &[RowId]) -> SelectionDelta {
        let present: HashSet<&RowId> = self.rows.iter().filter_map(|r| r.id.as_ref()).collect();
        let ids: Vec<RowId> = ids.iter().filter(|id| present.contains(id)).cloned().collect();
        let delta = self.selection.replace(&ids);
        self.selection_changed(&delta);
        delta
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Handles a key press for keyboard navigation.
    ///
    /// Active only while focused, without ctrl, and for flat tables
    /// without expandable rows. Scrolls the viewport to keep the target in
    /// view and returns its render index.
    pub fn on_key(
        &mut self,
        code: &str,
        modifiers: Modifiers,
        viewport: &mut dyn Viewport,
    ) -> Option<usize> {
        if !self.focused
            || modifiers.ctrl
            || self.config.group_by.is_some()
            || self.config.expandable_rows
            || !self.config.selectable
        {
            return None;
        }
        let key = NavKey::from_code(code)?;
        let sequence = self.render_ids();
        let (target, delta) = self.selection.navigate(&sequence, key, modifiers)?;
        self.selection_changed(&delta);

        let metrics = ScrollMetrics::capture(viewport);
        if let Some(request) = scroll_target(target, &metrics, self.config.item_size) {
            request.apply(viewport);
        }
        Some(target)
    }

    fn selection_changed(&mut self, delta: &SelectionDelta) {
        if delta.is_empty() {
            return;
        }
        self.persist_selection();
        self.emit(EventKind::SelectionChanged, false);
    }

    fn persist_selection(&self) {
        let selection = self.selection.selection();
        let selected = selection.selected_set().clone();
        let anchor = selection.anchor().cloned();
        self.store.update(&self.config.table_id, |state| {
            state.selection = selected;
            state.anchor = anchor;
        });
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Flips the collapse state of a group.
    pub fn toggle_group(&mut self, group_id: &str) -> Option<bool> {
        let groups = self.groups.as_ref()?;
        if !groups.ids().iter().any(|id| id == group_id) {
            return None;
        }
        let collapsed = !self.collapsed_groups.get(group_id).copied().unwrap_or(false);
        self.collapsed_groups.insert(group_id.to_string(), collapsed);
        let change: BTreeMap<String, bool> = [(group_id.to_string(), collapsed)].into();
        self.store
            .update_collapsed_groups(&self.config.table_id, change, true);
        self.groups_changed();
        Some(collapsed)
    }

    /// Collapses or expands every known group.
    pub fn set_all_groups(&mut self, collapsed: bool) {
        self.store
            .set_all_collapsed_groups(&self.config.table_id, collapsed);
        self.collapsed_groups = self.store.get_or_default(self.table_id()).collapsed_groups;
        self.groups_changed();
    }

    fn groups_changed(&mut self) {
        if self.groups.is_none() {
            return;
        }
        self.rebuild_render();
        self.emit(EventKind::CollapsedGroupsChanged, false);
    }

    // =========================================================================
    // Row expansion
    // =========================================================================

    /// Flips a row's expansion. Without multi-expansion other rows close.
    pub fn toggle_row_expansion(&mut self, id: &RowId) -> Option<bool> {
        if !self.config.expandable_rows {
            return None;
        }
        let expanded = !self.is_row_expanded(id);
        self.store.set_row_expansion(
            &self.config.table_id,
            id.clone(),
            expanded,
            self.config.multi_expandable_rows,
        );
        self.rows_expansion = self.store.get_or_default(self.table_id()).rows_expansion;
        Some(expanded)
    }

    /// Expands every row on the page, or collapses all.
    pub fn set_all_rows_expanded(&mut self, expanded: bool) {
        if !self.config.expandable_rows {
            return;
        }
        let ids: Vec<RowId> = self.rows.iter().filter_map(|r| r.id.clone()).collect();
        self.store
            .set_all_row_expansion(&self.config.table_id, &ids, expanded);
        self.rows_expansion = self.store.get_or_default(self.table_id()).rows_expansion;
    }

    // =========================================================================
    // Events
    // =========================================================================

    fn emit(&mut self, kind: EventKind, loading: bool) {
        if !self.loading {
            self.loading = loading;
        }
        let collapsed_groups = self
            .groups
            .as_ref()
            .map(|g| g.active_collapse_state(&self.collapsed_groups))
            .unwrap_or_default();
        let event = TableEvent {
            kind,
            paging: self.paging.paging(),
            sorting: EventSort::from_spec(&self.sorting),
            selection: self
                .selection
                .selection()
                .selected_set()
                .iter()
                .map(|id| (id.to_string(), true))
                .collect(),
            collapsed_groups,
            cursor: self.paging.current_cursor().cloned(),
            loading: self.loading,
        };
        self.events.push(event);
    }
}
