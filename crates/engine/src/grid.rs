//! Grid materialization: a record batch and a column mapping in, an ordered
//! 2-D grid of cells out.
//!
//! Key invariants:
//! - the grid is rebuilt from scratch for every batch; nothing carries over
//! - `rows`/`columns` hold exactly the distinct non-empty axis values seen
//! - a coordinate no record contributed to has no `Cell`
//! - materialization is a pure function of (records, mapping)

use pivotgrid_core::{GridShape, ItemPos, RecordId};
use pivotgrid_protocol::{ColumnMapping, MappedRecord, MappingSlot, Record, RecordBatch};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::aggregate::{Cell, CellAggregator, CellItem, CellKey};
use crate::axis::OrderedAxisBuilder;
use crate::value::{is_finite_number, normalize, order_hint};

/// Horizontal alignment inferred for a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left-aligned
    #[default]
    Text,
    /// Right-aligned: every non-empty content is a finite number
    Numeric,
}

/// A materialized grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<String>,
    columns: Vec<String>,
    row_index: FxHashMap<String, usize>,
    column_index: FxHashMap<String, usize>,
    /// (row idx, column idx) -> items
    cells: FxHashMap<(usize, usize), Cell>,
    column_alignment: Vec<Alignment>,
}

impl Grid {
    /// Place aggregated cells on sorted axes and infer column alignment.
    fn assemble(rows: Vec<String>, columns: Vec<String>, keyed: FxHashMap<CellKey, Cell>) -> Self {
        let row_index: FxHashMap<String, usize> = rows.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect();
        let column_index: FxHashMap<String, usize> =
            columns.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect();

        let mut cells = FxHashMap::default();
        for (key, cell) in keyed {
            // Every key's row and column were observed on the axes in the same pass
            if let (Some(&r), Some(&c)) = (row_index.get(&key.row), column_index.get(&key.column)) {
                cells.insert((r, c), cell);
            }
        }

        let mut grid = Self {
            rows,
            columns,
            row_index,
            column_index,
            cells,
            column_alignment: Vec::new(),
        };
        grid.column_alignment = (0..grid.columns.len()).map(|c| grid.infer_alignment(c)).collect();
        grid
    }

    /// Numeric iff at least one non-empty content and all non-empty contents
    /// are finite numbers.
    fn infer_alignment(&self, col: usize) -> Alignment {
        let mut saw_content = false;
        for row in 0..self.rows.len() {
            let Some(cell) = self.cell_at(row, col) else { continue };
            for content in cell.contents() {
                let content = content.trim();
                if content.is_empty() {
                    continue;
                }
                if !is_finite_number(content) {
                    return Alignment::Text;
                }
                saw_content = true;
            }
        }
        if saw_content {
            Alignment::Numeric
        } else {
            Alignment::Text
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// No rows or no columns survived.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn row_position(&self, row: &str) -> Option<usize> {
        self.row_index.get(row).copied()
    }

    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    /// Cell by axis values.
    pub fn cell(&self, row: &str, column: &str) -> Option<&Cell> {
        let r = self.row_position(row)?;
        let c = self.column_position(column)?;
        self.cell_at(r, c)
    }

    /// Cell by axis positions.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Number of cells holding at least one item.
    pub fn populated_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn alignment(&self, col: usize) -> Alignment {
        self.column_alignment.get(col).copied().unwrap_or_default()
    }

    pub fn column_alignment(&self) -> &[Alignment] {
        &self.column_alignment
    }

    /// Item at a coordinate; `None` for placeholders and out-of-range positions.
    pub fn item_at(&self, pos: ItemPos) -> Option<&CellItem> {
        self.cell_at(pos.row, pos.col)?.get(pos.item)
    }

    /// Navigation shape (empty cells count as one placeholder item).
    pub fn shape(&self) -> GridShape {
        GridShape::new(self.rows.len(), self.columns.len(), |r, c| {
            self.cell_at(r, c).map_or(0, Cell::len)
        })
    }

    /// Every rendered item in document order, placeholders as `None`.
    pub fn items(&self) -> impl Iterator<Item = (ItemPos, Option<&CellItem>)> + '_ {
        let cols = self.columns.len();
        (0..self.rows.len())
            .flat_map(move |r| (0..cols).map(move |c| (r, c)))
            .flat_map(move |(r, c)| {
                let items: &[CellItem] = self.cell_at(r, c).map(Cell::items).unwrap_or(&[]);
                let placeholder = items.is_empty().then(|| (ItemPos::new(r, c, 0), None));
                placeholder.into_iter().chain(
                    items
                        .iter()
                        .enumerate()
                        .map(move |(i, item)| (ItemPos::new(r, c, i), Some(item))),
                )
            })
    }

    /// `items()` reduced to record ids, as the selection model consumes them.
    pub fn record_items(&self) -> impl Iterator<Item = (ItemPos, Option<RecordId>)> + '_ {
        self.items().map(|(pos, item)| (pos, item.map(|i| i.record_id)))
    }

    /// Coordinates of every item belonging to a record.
    pub fn positions_of(&self, id: RecordId) -> Vec<ItemPos> {
        self.record_items()
            .filter(|(_, record)| *record == Some(id))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Serializable copy, cells in document order.
    pub fn snapshot(&self) -> GridSnapshot {
        let mut cells = Vec::with_capacity(self.cells.len());
        for (r, row) in self.rows.iter().enumerate() {
            for (c, column) in self.columns.iter().enumerate() {
                if let Some(cell) = self.cell_at(r, c) {
                    cells.push(CellSnapshot {
                        row: row.clone(),
                        column: column.clone(),
                        items: cell.items().to_vec(),
                    });
                }
            }
        }
        GridSnapshot {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            column_alignment: self.column_alignment.clone(),
            cells,
        }
    }
}

// =============================================================================
// Materialization
// =============================================================================

/// Materialize records through a column mapping.
///
/// An incomplete mapping resolves no record and yields an empty grid; use
/// `GridState` to tell that apart from "no data".
pub fn materialize(records: &[Record], mapping: &ColumnMapping) -> Grid {
    materialize_mapped(records.iter().filter_map(|r| mapping.resolve(r)))
}

/// Materialize already-mapped records in one pass.
pub fn materialize_mapped<I>(records: I) -> Grid
where
    I: IntoIterator<Item = MappedRecord>,
{
    let mut rows = OrderedAxisBuilder::new();
    let mut columns = OrderedAxisBuilder::new();
    let mut cells = CellAggregator::new();
    let mut rejected = 0usize;

    for record in records {
        let row = normalize(&record.row).filter(|v| !v.is_empty());
        let column = normalize(&record.column).filter(|v| !v.is_empty());
        let (Some(row), Some(column)) = (row, column) else {
            rejected += 1;
            continue;
        };

        let content = normalize(&record.content).unwrap_or_default();
        let background_color = record
            .background_color
            .as_ref()
            .and_then(normalize)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        rows.observe(&row, record.row_order.as_ref().and_then(order_hint));
        columns.observe(&column, record.column_order.as_ref().and_then(order_hint));
        cells.add(
            &row,
            &column,
            CellItem {
                content,
                record_id: record.id,
                background_color,
            },
        );
    }

    log::debug!(
        "materialized {} items into {} rows x {} columns ({} records rejected)",
        cells.item_count(),
        rows.len(),
        columns.len(),
        rejected
    );

    Grid::assemble(rows.into_sorted_values(), columns.into_sorted_values(), cells.into_cells())
}

// =============================================================================
// Grid state
// =============================================================================

/// What the widget shows for a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GridState {
    /// No mapping delivered yet
    #[default]
    AwaitingMapping,
    /// Required slots are unmapped
    MappingIncomplete { missing: Vec<MappingSlot> },
    /// Mapping complete, zero records
    NoData,
    Ready(Grid),
}

impl GridState {
    /// Classify a batch and materialize it when possible.
    ///
    /// `resolve` projects one record through the mapping; hosts that map
    /// columns themselves plug in here.
    pub fn build<F>(mapping: Option<&ColumnMapping>, records: &[Record], mut resolve: F) -> Self
    where
        F: FnMut(&Record, &ColumnMapping) -> Option<MappedRecord>,
    {
        let Some(mapping) = mapping else {
            return GridState::AwaitingMapping;
        };
        let missing = mapping.missing_required();
        if !missing.is_empty() {
            return GridState::MappingIncomplete { missing };
        }
        if records.is_empty() {
            return GridState::NoData;
        }
        GridState::Ready(materialize_mapped(records.iter().filter_map(|r| resolve(r, mapping))))
    }

    pub fn from_batch(batch: &RecordBatch) -> Self {
        Self::build(batch.mapping.as_ref(), &batch.records, |r, m| m.resolve(r))
    }

    pub fn grid(&self) -> Option<&Grid> {
        match self {
            GridState::Ready(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, GridState::Ready(_))
    }

    /// Navigation shape; empty unless ready.
    pub fn shape(&self) -> GridShape {
        self.grid().map(Grid::shape).unwrap_or_default()
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// JSON-friendly grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub column_alignment: Vec<Alignment>,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub row: String,
    pub column: String,
    pub items: Vec<CellItem>,
}
