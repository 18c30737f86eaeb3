//! Table events.
//!
//! The table queues an event for every state change the host should react
//! to; the host drains the queue after each call. Most events are mirrored
//! by a `TableUpdate` event carrying the same payload.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::paging::{CursorDirection, Paging};
use crate::sort::{Direction, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Columns are known; the table is ready.
    Initialized,
    /// Page or page size changed; new rows are needed.
    UpdatePaging,
    /// A refresh was requested.
    UpdateData,
    /// A new row set was applied.
    RowsUpdate,
    SortChange,
    SelectionChanged,
    CollapsedGroupsChanged,
    /// Superset event mirroring the others.
    TableUpdate,
}

impl EventKind {
    /// Whether this kind is mirrored by a `TableUpdate` event.
    pub fn mirrors_table_update(self) -> bool {
        !matches!(
            self,
            Self::RowsUpdate
                | Self::SelectionChanged
                | Self::CollapsedGroupsChanged
                | Self::TableUpdate
        )
    }
}

/// Sort key as reported outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSort {
    /// `sort_field` when set, else `field`.
    pub field: String,
    pub direction: Direction,
    pub sorter: Option<String>,
}

impl EventSort {
    pub fn from_spec(spec: &SortSpec) -> Vec<Self> {
        spec.entries()
            .iter()
            .map(|entry| Self {
                field: entry.reported_field().to_string(),
                direction: entry.direction,
                sorter: entry.sorter.clone(),
            })
            .collect()
    }
}

/// Payload describing the table after a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub paging: Paging,
    pub sorting: Vec<EventSort>,
    /// Selected row IDs as an `{id: true}` map.
    pub selection: BTreeMap<String, bool>,
    /// Collapse state of the groups currently present.
    pub collapsed_groups: BTreeMap<String, bool>,
    /// Cursor mode only.
    pub cursor: Option<CursorDirection>,
    pub loading: bool,
}

/// FIFO of emitted events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<TableEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `event`, followed by its `TableUpdate` mirror when the kind
    /// has one.
    pub fn push(&mut self, event: TableEvent) {
        log::trace!("Event {:?}", event.kind);
        let mirror = event.kind.mirrors_table_update().then(|| TableEvent {
            kind: EventKind::TableUpdate,
            ..event.clone()
        });
        self.events.push_back(event);
        self.events.extend(mirror);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<TableEvent> {
        self.events.drain(..).collect()
    }
}
