//! Core types shared by every grid widget: record identity, item coordinates,
//! the selection model and spatial navigation over a materialized grid.

pub mod navigation;
pub mod selection;

pub use navigation::{Direction, GridShape, ItemPos};
pub use selection::{HighlightDelta, SelectionChange, SelectionSource, SelectionState, SelectionTracker};

use serde::{Deserialize, Serialize};

/// Host-stable record identifier.
///
/// The host numbers rows per table; ids are never reused while a widget is
/// attached, so equality is all the core relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
