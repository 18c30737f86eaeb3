//! Selection engine.
//!
//! [`Selection`] holds the selected IDs and the anchor. [`SelectionEngine`]
//! turns clicks and key presses into selection changes according to the
//! table's selection policy.

mod keyboard;
mod state;

pub use keyboard::{NavKey, next_index, scroll_target};
pub use state::{Selection, SelectionDelta};

use std::collections::HashSet;

use crate::config::{SelectBehavior, TableConfig};
use crate::model::RowId;

/// Modifier state of a selection gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    /// Treat the gesture as ctrl-held (e.g. a checkbox click).
    pub force_toggle: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// Selection rules taken from the table configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub selectable: bool,
    pub multi_selection: bool,
    pub behavior: SelectBehavior,
    pub force_selection: bool,
}

impl From<&TableConfig> for SelectionPolicy {
    fn from(config: &TableConfig) -> Self {
        Self {
            selectable: config.selectable,
            multi_selection: config.multi_selection,
            behavior: config.select_behavior,
            force_selection: config.force_selection,
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from(&TableConfig::default())
    }
}

/// Applies gestures to a [`Selection`].
///
/// Tracks the polarity of the last toggle so a ctrl+shift range after a
/// deselecting click removes rows instead of adding them.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    selection: Selection,
    policy: SelectionPolicy,
    do_select: bool,
}

impl SelectionEngine {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self::with_selection(policy, Selection::new())
    }

    pub fn with_selection(policy: SelectionPolicy, selection: Selection) -> Self {
        Self {
            selection,
            policy,
            do_select: true,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Handles a click on the row at `target` in the render sequence.
    ///
    /// Clicks on positions without an ID are ignored.
    pub fn select_row(
        &mut self,
        sequence: &[Option<RowId>],
        target: usize,
        modifiers: Modifiers,
    ) -> SelectionDelta {
        if !self.policy.selectable {
            return SelectionDelta::default();
        }
        let Some(Some(row_id)) = sequence.get(target) else {
            return SelectionDelta::default();
        };

        let ctrl = modifiers.ctrl || modifiers.force_toggle;
        let multi = self.policy.multi_selection;

        let delta = if modifiers.shift && multi {
            if !self.do_select {
                self.do_select = !ctrl;
            }
            if self.do_select || self.policy.force_selection {
                self.selection.select_range(row_id, sequence, ctrl)
            } else {
                self.selection.deselect_range(row_id, sequence)
            }
        } else if ctrl || self.policy.behavior == SelectBehavior::Toggle {
            self.do_select = !self.selection.is_selected(row_id);
            if !self.do_select && self.policy.force_selection {
                SelectionDelta::default()
            } else if self.do_select && !multi {
                self.selection.select_single(row_id)
            } else {
                self.selection.toggle(row_id)
            }
        } else {
            self.do_select = true;
            self.selection.select_single(row_id)
        };

        if !delta.is_empty() {
            log::trace!(
                "Selection changed: +{} -{}",
                delta.added.len(),
                delta.removed.len()
            );
        }
        delta
    }

    /// Replaces the selection with `ids`.
    ///
    /// Forced selection refuses to empty it.
    pub fn replace(&mut self, ids: &[RowId]) -> SelectionDelta {
        if !self.policy.selectable || (ids.is_empty() && self.policy.force_selection) {
            return SelectionDelta::default();
        }
        let ids = if self.policy.multi_selection {
            ids
        } else {
            &ids[..ids.len().min(1)]
        };
        self.selection.replace(ids)
    }

    /// Moves the selection one step with the keyboard.
    ///
    /// Returns the new target index along with the change.
    pub fn navigate(
        &mut self,
        sequence: &[Option<RowId>],
        key: NavKey,
        modifiers: Modifiers,
    ) -> Option<(usize, SelectionDelta)> {
        let target = next_index(&self.selection, sequence, key)?;
        if sequence.get(target).is_none_or(Option::is_none) {
            return None;
        }
        let delta = self.select_row(sequence, target, modifiers);
        Some((target, delta))
    }

    /// Selects every row when multi-selection is allowed.
    pub fn select_all(&mut self, sequence: &[Option<RowId>]) -> SelectionDelta {
        if !self.policy.selectable || !self.policy.multi_selection {
            return SelectionDelta::default();
        }
        self.selection.select_all(sequence)
    }

    /// Clears the selection unless forced selection forbids it.
    pub fn clear(&mut self) -> SelectionDelta {
        if self.policy.force_selection {
            return SelectionDelta::default();
        }
        self.selection.clear()
    }

    /// Reconciles against a new row set.
    ///
    /// Missing IDs are dropped. With forced selection and nothing left
    /// selected, `first` is selected and anchored.
    pub fn reconcile(&mut self, present: &HashSet<RowId>, first: Option<&RowId>) -> Vec<RowId> {
        let dropped = self.selection.reconcile(present);
        if !dropped.is_empty() {
            log::debug!("Dropped {} stale selection entries", dropped.len());
        }
        self.force_selection(first);
        dropped
    }

    /// Selects `first` if forced selection is on and nothing is selected.
    pub fn force_selection(&mut self, first: Option<&RowId>) -> SelectionDelta {
        if !self.policy.selectable || !self.policy.force_selection || !self.selection.is_empty() {
            return SelectionDelta::default();
        }
        match first {
            Some(id) => self.selection.select_single(id),
            None => SelectionDelta::default(),
        }
    }
}
