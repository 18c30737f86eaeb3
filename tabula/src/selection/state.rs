//! ID-based selection state with an anchor.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::RowId;

/// Rows added to and removed from a selection by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    pub added: Vec<RowId>,
    pub removed: Vec<RowId>,
}

impl SelectionDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    fn between(before: &BTreeSet<RowId>, after: &BTreeSet<RowId>) -> Self {
        Self {
            added: after.difference(before).cloned().collect(),
            removed: before.difference(after).cloned().collect(),
        }
    }
}

/// Selected row IDs plus the anchor that range selection extends from.
///
/// IDs stay valid across row replacement; [`Selection::reconcile`] drops
/// those that disappear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    selected: BTreeSet<RowId>,
    anchor: Option<RowId>,
}

impl Selection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a selection from persisted parts.
    pub fn from_parts(selected: BTreeSet<RowId>, anchor: Option<RowId>) -> Self {
        Self { selected, anchor }
    }

    /// Selected IDs in sorted order.
    pub fn selected(&self) -> Vec<RowId> {
        self.selected.iter().cloned().collect()
    }

    pub fn selected_set(&self) -> &BTreeSet<RowId> {
        &self.selected
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<&RowId> {
        self.anchor.as_ref()
    }

    /// Position of the anchor in a render sequence.
    pub fn anchor_index(&self, sequence: &[Option<RowId>]) -> Option<usize> {
        let anchor = self.anchor.as_ref()?;
        sequence.iter().position(|id| id.as_ref() == Some(anchor))
    }

    /// First and last selected positions in a render sequence.
    pub fn bounds(&self, sequence: &[Option<RowId>]) -> Option<(usize, usize)> {
        let selected = |id: &Option<RowId>| id.as_ref().is_some_and(|id| self.selected.contains(id));
        let first = sequence.iter().position(selected)?;
        let last = sequence.iter().rposition(selected)?;
        Some((first, last))
    }

    /// Clears the selection and the anchor.
    pub fn clear(&mut self) -> SelectionDelta {
        let removed = std::mem::take(&mut self.selected).into_iter().collect();
        self.anchor = None;
        SelectionDelta {
            added: Vec::new(),
            removed,
        }
    }

    /// Selects a single ID, clearing the rest, and anchors on it.
    pub fn select_single(&mut self, id: &RowId) -> SelectionDelta {
        let before = std::mem::take(&mut self.selected);
        self.selected.insert(id.clone());
        self.anchor = Some(id.clone());
        SelectionDelta::between(&before, &self.selected)
    }

    /// Flips membership of an ID. The anchor is set only if it was unset.
    pub fn toggle(&mut self, id: &RowId) -> SelectionDelta {
        if self.anchor.is_none() {
            self.anchor = Some(id.clone());
        }
        if self.selected.remove(id) {
            SelectionDelta {
                added: Vec::new(),
                removed: vec![id.clone()],
            }
        } else {
            self.selected.insert(id.clone());
            SelectionDelta {
                added: vec![id.clone()],
                removed: Vec::new(),
            }
        }
    }

    /// Selects the contiguous range between the anchor and `target`.
    ///
    /// Positions without an ID (group headers, rows lacking one) are
    /// skipped. With `additive` the range is merged into the current
    /// selection, otherwise it replaces it. Falls back to a single
    /// selection when the anchor or target is not in `sequence`.
    pub fn select_range(
        &mut self,
        target: &RowId,
        sequence: &[Option<RowId>],
        additive: bool,
    ) -> SelectionDelta {
        let Some((start, end)) = self.range(target, sequence) else {
            return self.select_single(target);
        };

        let before = self.selected.clone();
        if !additive {
            self.selected.clear();
        }
        self.selected
            .extend(sequence[start..=end].iter().flatten().cloned());
        if self.anchor.is_none() {
            self.anchor = Some(target.clone());
        }
        SelectionDelta::between(&before, &self.selected)
    }

    /// Removes the contiguous range between the anchor and `target`.
    ///
    /// Only the target is removed when the range cannot be resolved.
    pub fn deselect_range(&mut self, target: &RowId, sequence: &[Option<RowId>]) -> SelectionDelta {
        let before = self.selected.clone();
        match self.range(target, sequence) {
            Some((start, end)) => {
                for id in sequence[start..=end].iter().flatten() {
                    self.selected.remove(id);
                }
            }
            None => {
                self.selected.remove(target);
            }
        }
        SelectionDelta::between(&before, &self.selected)
    }

    fn range(&self, target: &RowId, sequence: &[Option<RowId>]) -> Option<(usize, usize)> {
        let target_pos = position(sequence, target)?;
        let anchor_pos = match &self.anchor {
            Some(_) => self.anchor_index(sequence)?,
            None => target_pos,
        };
        Some((anchor_pos.min(target_pos), anchor_pos.max(target_pos)))
    }

    /// Adds every ID in `sequence`.
    pub fn select_all(&mut self, sequence: &[Option<RowId>]) -> SelectionDelta {
        let before = self.selected.clone();
        self.selected.extend(sequence.iter().flatten().cloned());
        SelectionDelta::between(&before, &self.selected)
    }

    /// Replaces the selection with `ids`, keeping the anchor only if it
    /// is among them.
    pub fn replace(&mut self, ids: &[RowId]) -> SelectionDelta {
        let before = std::mem::take(&mut self.selected);
        self.selected.extend(ids.iter().cloned());
        if self.anchor.as_ref().is_some_and(|a| !self.selected.contains(a)) {
            self.anchor = None;
        }
        SelectionDelta::between(&before, &self.selected)
    }

    /// Drops selected IDs and an anchor that are not in `present`.
    ///
    /// Returns the IDs that were dropped.
    pub fn reconcile(&mut self, present: &HashSet<RowId>) -> Vec<RowId> {
        let dropped: Vec<RowId> = self
            .selected
            .iter()
            .filter(|id| !present.contains(*id))
            .cloned()
            .collect();
        for id in &dropped {
            self.selected.remove(id);
        }
        if self.anchor.as_ref().is_some_and(|a| !present.contains(a)) {
            self.anchor = None;
        }
        dropped
    }
}

fn position(sequence: &[Option<RowId>], id: &RowId) -> Option<usize> {
    sequence.iter().position(|entry| entry.as_ref() == Some(id))
}
