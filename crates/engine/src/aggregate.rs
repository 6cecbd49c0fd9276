//! Cell aggregation: many records → one cell, keyed by (row value, column value).
//!
//! Items inside a cell keep record-arrival order; nothing here sorts them.

use pivotgrid_core::RecordId;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Composite cell key. Distinct (row, column) pairs never collide, whatever
/// characters the axis values contain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: String,
    pub column: String,
}

impl CellKey {
    pub fn new(row: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }
}

/// One record's contribution to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellItem {
    /// Empty when the record's content is null or blank
    pub content: String,
    pub record_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// Items of one grid coordinate, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cell {
    items: Vec<CellItem>,
}

impl Cell {
    pub fn items(&self) -> &[CellItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&CellItem> {
        self.items.get(idx)
    }

    /// Contents in arrival order.
    pub fn contents(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|i| i.content.as_str())
    }

    pub fn push(&mut self, item: CellItem) {
        self.items.push(item);
    }
}

/// Buckets items by `CellKey` during the record pass.
#[derive(Debug, Clone, Default)]
pub struct CellAggregator {
    cells: FxHashMap<CellKey, Cell>,
    item_count: usize,
}

impl CellAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to the cell at (row, column).
    pub fn add(&mut self, row: &str, column: &str, item: CellItem) {
        self.cells.entry(CellKey::new(row, column)).or_default().push(item);
        self.item_count += 1;
    }

    pub fn get(&self, row: &str, column: &str) -> Option<&Cell> {
        self.cells.get(&CellKey::new(row, column))
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total items across all cells.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn into_cells(self) -> FxHashMap<CellKey, Cell> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str, id: i64) -> CellItem {
        CellItem {
            content: content.to_string(),
            record_id: RecordId(id),
            background_color: None,
        }
    }

    #[test]
    fn test_arrival_order_preserved() {
        let mut agg = CellAggregator::new();
        agg.add("R1", "C1", item("z", 1));
        agg.add("R2", "C1", item("other", 2));
        agg.add("R1", "C1", item("a", 3));
        agg.add("R1", "C1", item("m", 4));

        let cell = agg.get("R1", "C1").unwrap();
        assert_eq!(cell.contents().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(cell.items()[1].record_id, RecordId(3));
        assert_eq!(agg.cell_count(), 2);
        assert_eq!(agg.item_count(), 4);
    }

    #[test]
    fn test_delimiter_in_values_does_not_collide() {
        let mut agg = CellAggregator::new();
        // "a|b" + "c" and "a" + "b|c" would share a joined "a|b|c" key
        agg.add("a|b", "c", item("first", 1));
        agg.add("a", "b|c", item("second", 2));

        assert_eq!(agg.cell_count(), 2);
        assert_eq!(agg.get("a|b", "c").unwrap().len(), 1);
        assert_eq!(agg.get("a", "b|c").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_cell() {
        let agg = CellAggregator::new();
        assert!(agg.get("R1", "C1").is_none());
    }
}
