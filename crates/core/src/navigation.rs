//! Spatial keyboard navigation over a materialized grid.
//!
//! The grid is addressed as (row, col, item): every cell holds at least one
//! item because empty cells carry a single placeholder, so populated and empty
//! cells are navigated the same way.
//!
//! Movement is bounded: at an edge a step returns the starting position.

use serde::{Deserialize, Serialize};

/// Coordinate of one rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemPos {
    pub row: usize,
    pub col: usize,
    /// Index within the cell (0 for a placeholder)
    pub item: usize,
}

impl ItemPos {
    pub fn new(row: usize, col: usize, item: usize) -> Self {
        Self { row, col, item }
    }
}

/// Navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl Direction {
    /// Parse a key name ("left", "ArrowLeft", "home", ...). Case-insensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        let key = key.strip_prefix("arrow").unwrap_or(&key);
        match key {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "home" => Some(Direction::Home),
            "end" => Some(Direction::End),
            _ => None,
        }
    }
}

/// Item counts per cell, row-major. Each count is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridShape {
    rows: usize,
    cols: usize,
    item_counts: Vec<usize>,
}

impl GridShape {
    /// Build a shape by asking for the item count of every (row, col).
    /// Counts of zero are stored as 1 (the placeholder).
    pub fn new<F>(rows: usize, cols: usize, mut count_at: F) -> Self
    where
        F: FnMut(usize, usize) -> usize,
    {
        let mut item_counts = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                item_counts.push(count_at(row, col).max(1));
            }
        }
        Self { rows, cols, item_counts }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// No addressable item at all (zero rows or zero columns).
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Items in a cell including the placeholder; 0 outside the grid.
    pub fn item_count(&self, row: usize, col: usize) -> usize {
        if row >= self.rows || col >= self.cols {
            return 0;
        }
        self.item_counts[row * self.cols + col]
    }

    pub fn contains(&self, pos: ItemPos) -> bool {
        pos.item < self.item_count(pos.row, pos.col)
    }

    /// First item of the first cell in document order.
    pub fn first(&self) -> Option<ItemPos> {
        if self.is_empty() {
            return None;
        }
        Some(ItemPos::new(0, 0, 0))
    }

    /// Last item of the last cell in document order.
    pub fn last(&self) -> Option<ItemPos> {
        if self.is_empty() {
            return None;
        }
        let row = self.rows - 1;
        let col = self.cols - 1;
        Some(ItemPos::new(row, col, self.item_count(row, col) - 1))
    }

    /// Pull a position from an older grid into this one.
    pub fn clamp(&self, pos: ItemPos) -> Option<ItemPos> {
        if self.is_empty() {
            return None;
        }
        let row = pos.row.min(self.rows - 1);
        let col = pos.col.min(self.cols - 1);
        let item = pos.item.min(self.item_count(row, col) - 1);
        Some(ItemPos::new(row, col, item))
    }

    /// Move one step. Returns `from` unchanged when the move would leave the grid.
    ///
    /// An out-of-range `from` is clamped first; on an empty shape `from` is
    /// returned as-is.
    pub fn step(&self, from: ItemPos, direction: Direction) -> ItemPos {
        let Some(pos) = self.clamp(from) else {
            return from;
        };

        match direction {
            Direction::Left => {
                if pos.col == 0 {
                    pos
                } else {
                    ItemPos::new(pos.row, pos.col - 1, 0)
                }
            }
            Direction::Right => {
                if pos.col + 1 >= self.cols {
                    pos
                } else {
                    ItemPos::new(pos.row, pos.col + 1, 0)
                }
            }
            Direction::Down => {
                if pos.item + 1 < self.item_count(pos.row, pos.col) {
                    ItemPos::new(pos.row, pos.col, pos.item + 1)
                } else if pos.row + 1 < self.rows {
                    ItemPos::new(pos.row + 1, pos.col, 0)
                } else {
                    pos
                }
            }
            Direction::Up => {
                if pos.item > 0 {
                    ItemPos::new(pos.row, pos.col, pos.item - 1)
                } else if pos.row > 0 {
                    let row = pos.row - 1;
                    ItemPos::new(row, pos.col, self.item_count(row, pos.col) - 1)
                } else {
                    pos
                }
            }
            Direction::Home => self.first().unwrap_or(pos),
            Direction::End => self.last().unwrap_or(pos),
        }
    }
}
