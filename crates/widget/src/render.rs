//! Render sinks.
//!
//! The controller hands a sink a `Frame` (grid state plus selection, focus and
//! palette) on every full redraw, and incremental highlight/focus updates in
//! between. Item coordinates are the `(row, col, item)` positions of
//! `Grid::items`, so a sink can address any rendered item without knowing how
//! the grid was built.

use pivotgrid_config::Settings;
use pivotgrid_core::{HighlightDelta, ItemPos, RecordId};
use pivotgrid_engine::{Alignment, Cell, CellItem, Grid, GridState};
use pivotgrid_protocol::ColorChoices;
use unicode_width::UnicodeWidthStr;

use crate::style::{resolve_style, CellStyle};

/// Everything needed to draw the widget once.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub state: &'a GridState,
    pub selected: Option<RecordId>,
    pub focus: Option<ItemPos>,
    pub palette: &'a ColorChoices,
    pub settings: &'a Settings,
}

impl<'a> Frame<'a> {
    /// Placeholder panel text; `None` when a grid is ready.
    pub fn message(&self) -> Option<&'a str> {
        match self.state {
            GridState::AwaitingMapping => Some(self.settings.awaiting_mapping_message.as_str()),
            GridState::MappingIncomplete { .. } => Some(self.settings.mapping_incomplete_message.as_str()),
            GridState::NoData => Some(self.settings.no_data_message.as_str()),
            GridState::Ready(_) => None,
        }
    }

    /// Display text of an item; empty content shows the placeholder.
    pub fn item_text(&self, item: &'a CellItem) -> &'a str {
        if item.content.trim().is_empty() {
            self.settings.empty_content_placeholder.as_str()
        } else {
            item.content.as_str()
        }
    }

    pub fn item_style(&self, item: &CellItem) -> Option<CellStyle> {
        resolve_style(item.background_color.as_deref()?, self.palette)
    }

    pub fn is_selected(&self, item: &CellItem) -> bool {
        self.selected == Some(item.record_id)
    }

    /// Count badge for multi-item cells, when enabled.
    pub fn badge(&self, cell: &Cell) -> Option<usize> {
        (self.settings.show_count_badge && cell.len() > 1).then(|| cell.len())
    }

    pub fn alignment(&self, grid: &Grid, col: usize) -> Alignment {
        if self.settings.infer_alignment {
            grid.alignment(col)
        } else {
            Alignment::Text
        }
    }
}

/// Receives frames and incremental updates from a `GridController`.
pub trait RenderSink {
    /// Full redraw.
    fn render(&mut self, frame: &Frame<'_>);

    /// Selection moved; `cleared` applies before `highlighted`.
    fn update_highlight(&mut self, _delta: &HighlightDelta) {}

    /// Keyboard focus moved.
    fn update_focus(&mut self, _previous: Option<ItemPos>, _current: Option<ItemPos>) {}
}

// =============================================================================
// Text rendering
// =============================================================================

/// Plain-text table sink. Keeps the last full redraw.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    output: String,
    frames: usize,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Number of full redraws received
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl RenderSink for TextRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        self.output = render_text(frame);
        self.frames += 1;
    }
}

/// Render a frame as an aligned text table.
///
/// Each item gets a two-character marker: `>` for focus, `*` for selection.
/// Multi-item cells span several lines; the first carries the count badge.
pub fn render_text(frame: &Frame<'_>) -> String {
    let grid = match frame.state {
        GridState::Ready(grid) => grid,
        GridState::MappingIncomplete { missing } => {
            let names: Vec<&str> = missing.iter().map(|slot| slot.name()).collect();
            return format!(
                "{}\nmissing: {}\n",
                frame.message().unwrap_or_default(),
                names.join(", ")
            );
        }
        _ => return format!("{}\n", frame.message().unwrap_or_default()),
    };

    // labels[row][col] = lines of that cell
    let mut labels: Vec<Vec<Vec<String>>> = vec![vec![Vec::new(); grid.column_count()]; grid.row_count()];
    for (pos, item) in grid.items() {
        let focus = if frame.focus == Some(pos) { '>' } else { ' ' };
        let selected = if item.is_some_and(|i| frame.is_selected(i)) { '*' } else { ' ' };
        let mut text = format!("{focus}{selected}{}", item.map_or("", |i| frame.item_text(i)));
        if pos.item == 0 {
            if let Some(count) = grid.cell_at(pos.row, pos.col).and_then(|c| frame.badge(c)) {
                text.push_str(&format!(" ({count})"));
            }
        }
        labels[pos.row][pos.col].push(text);
    }

    let row_width = grid.rows().iter().map(|r| r.width()).max().unwrap_or(0);
    let widths: Vec<usize> = (0..grid.column_count())
        .map(|c| {
            let header = grid.columns()[c].width();
            labels
                .iter()
                .flat_map(|row| row[c].iter())
                .map(|l| l.width())
                .fold(header, usize::max)
        })
        .collect();

    let mut lines = Vec::new();

    let mut header = pad("", row_width, Alignment::Text);
    for (c, column) in grid.columns().iter().enumerate() {
        header.push_str(" | ");
        header.push_str(&pad(column, widths[c], Alignment::Text));
    }
    lines.push(header);

    let mut rule = "-".repeat(row_width);
    for width in &widths {
        rule.push_str("-+-");
        rule.push_str(&"-".repeat(*width));
    }
    lines.push(rule);

    for (r, row) in grid.rows().iter().enumerate() {
        let height = labels[r].iter().map(Vec::len).max().unwrap_or(1).max(1);
        for line in 0..height {
            let head = if line == 0 { row.as_str() } else { "" };
            let mut text = pad(head, row_width, Alignment::Text);
            for (c, width) in widths.iter().enumerate() {
                text.push_str(" | ");
                let label = labels[r][c].get(line).map_or("", String::as_str);
                text.push_str(&pad(label, *width, frame.alignment(grid, c)));
            }
            lines.push(text);
        }
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn pad(text: &str, width: usize, align: Alignment) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    match align {
        Alignment::Text => format!("{text}{fill}"),
        Alignment::Numeric => format!("{fill}{text}"),
    }
}
