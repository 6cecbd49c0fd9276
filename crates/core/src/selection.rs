//! Selection model: at most one selected record, shared by every item that
//! renders it.
//!
//! Transitions come from two places:
//! - the host broadcasting its cursor (`host_cursor`)
//! - the user activating an item in the grid (`activate` / `clear_local`)
//!
//! Each transition yields a `SelectionChange`; `highlight_delta` turns it into
//! the set of item coordinates whose highlight must be removed or added.

use crate::navigation::ItemPos;
use crate::RecordId;

/// Current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    NoSelection,
    Selected(RecordId),
}

impl SelectionState {
    pub fn record(&self) -> Option<RecordId> {
        match self {
            SelectionState::NoSelection => None,
            SelectionState::Selected(id) => Some(*id),
        }
    }
}

impl From<Option<RecordId>> for SelectionState {
    fn from(id: Option<RecordId>) -> Self {
        match id {
            Some(id) => SelectionState::Selected(id),
            None => SelectionState::NoSelection,
        }
    }
}

/// Who triggered a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Host cursor broadcast
    Host,
    /// Click or keyboard activation inside the widget
    Local,
}

/// Result of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: SelectionState,
    pub current: SelectionState,
    pub source: SelectionSource,
}

impl SelectionChange {
    /// True when the host should be told to move its cursor.
    pub fn needs_host_sync(&self) -> bool {
        self.source == SelectionSource::Local
    }
}

/// Item coordinates whose highlight changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightDelta {
    /// Items showing the previous selection; apply first
    pub cleared: Vec<ItemPos>,
    /// Items showing the new selection
    pub highlighted: Vec<ItemPos>,
}

impl HighlightDelta {
    pub fn is_empty(&self) -> bool {
        self.cleared.is_empty() && self.highlighted.is_empty()
    }
}

/// Two-state selection machine: `NoSelection` / `Selected(id)`.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    state: SelectionState,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected(&self) -> Option<RecordId> {
        self.state.record()
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.state == SelectionState::Selected(id)
    }

    /// Host broadcast of its current record (`None` = cursor is off any row).
    pub fn host_cursor(&mut self, record: Option<RecordId>) -> SelectionChange {
        self.transition(record.into(), SelectionSource::Host)
    }

    /// Local activation of an item belonging to `id`.
    pub fn activate(&mut self, id: RecordId) -> SelectionChange {
        self.transition(SelectionState::Selected(id), SelectionSource::Local)
    }

    /// Local activation of an empty placeholder.
    pub fn clear_local(&mut self) -> SelectionChange {
        self.transition(SelectionState::NoSelection, SelectionSource::Local)
    }

    fn transition(&mut self, next: SelectionState, source: SelectionSource) -> SelectionChange {
        let previous = std::mem::replace(&mut self.state, next);
        SelectionChange {
            previous,
            current: next,
            source,
        }
    }

    /// Compute which rendered items lose and gain highlight.
    ///
    /// `items` yields every rendered item with its record (`None` for
    /// placeholders). Re-selecting the same id recomputes both sides.
    pub fn highlight_delta<I>(change: &SelectionChange, items: I) -> HighlightDelta
    where
        I: IntoIterator<Item = (ItemPos, Option<RecordId>)>,
    {
        let old = change.previous.record();
        let new = change.current.record();
        let mut delta = HighlightDelta::default();

        if old.is_none() && new.is_none() {
            return delta;
        }

        for (pos, record) in items {
            let Some(record) = record else { continue };
            if Some(record) == old {
                delta.cleared.push(pos);
            }
            if Some(record) == new {
                delta.highlighted.push(pos);
            }
        }
        delta
    }
}
