//! The widget controller.
//!
//! One instance per widget; no globals. The host adapter calls the entry
//! points (`on_records`, `on_record`) and user input calls `navigate` /
//! `activate`. State lives behind a `RefCell` and is never borrowed across an
//! `.await`, so a single-threaded executor may interleave any of the async
//! entry points.
//!
//! Every data update bumps a generation counter. Async follow-ups (the color
//! metadata fetch) remember the generation they started under and are dropped
//! if a newer update arrived meanwhile.

use std::cell::{Ref, RefCell};

use pivotgrid_config::Settings;
use pivotgrid_core::{Direction, ItemPos, RecordId, SelectionChange, SelectionTracker};
use pivotgrid_engine::GridState;
use pivotgrid_protocol::{ColorChoices, ColumnMapping, CursorTarget, MappingSlot, RecordBatch, WidgetManifest};

use crate::host::HostBridge;
use crate::render::{Frame, RenderSink};

#[derive(Debug, Default)]
struct State {
    generation: u64,
    grid: GridState,
    selection: SelectionTracker,
    focus: Option<ItemPos>,
    palette: ColorChoices,
    /// (table, column) the palette was fetched for
    palette_source: Option<(String, String)>,
    mapping: Option<ColumnMapping>,
    table_id: Option<String>,
}

impl State {
    /// (table, column) whose color choices style the current grid
    fn color_source(&self) -> Option<(String, String)> {
        if !self.grid.is_ready() {
            return None;
        }
        let table = self.table_id.clone()?;
        let column = self.mapping.as_ref()?.column_for(MappingSlot::BackgroundColor)?;
        Some((table, column.to_string()))
    }
}

pub struct GridController<H, R> {
    host: H,
    sink: RefCell<R>,
    settings: Settings,
    state: RefCell<State>,
}

impl<H: HostBridge, R: RenderSink> GridController<H, R> {
    pub fn new(host: H, sink: R, settings: Settings) -> Self {
        Self {
            host,
            sink: RefCell::new(sink),
            settings,
            state: RefCell::new(State::default()),
        }
    }

    /// Announce the widget to the host and draw the initial placeholder.
    pub fn start(&self) {
        self.host.ready(&WidgetManifest::grid());
        self.redraw();
    }

    // =========================================================================
    // Host entry points
    // =========================================================================

    /// A new record batch: rematerialize, redraw, then refresh colors.
    pub async fn on_records(&self, batch: RecordBatch) {
        let (generation, source) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;

            let grid = GridState::build(batch.mapping.as_ref(), &batch.records, |record, mapping| {
                self.host.map_column_names(record, mapping)
            });
            let shape = grid.shape();
            state.focus = state.focus.and_then(|f| shape.clamp(f));
            state.grid = grid;
            state.mapping = batch.mapping;
            state.table_id = batch.table_id;

            let source = state.color_source();
            // A palette fetched for another column no longer applies
            if state.palette_source != source {
                state.palette.clear();
                state.palette_source = None;
            }
            (state.generation, source)
        };
        self.redraw();

        if let Some((table, column)) = source {
            self.refresh_colors(generation, table, column).await;
        }
    }

    /// Host cursor broadcast. `None` means no current record.
    pub fn on_record(&self, record: Option<RecordId>) {
        let change = self.state.borrow_mut().selection.host_cursor(record);
        self.apply_highlight(&change);
    }

    /// Re-fetch a table's records and run them through the data-update path
    /// with the last delivered mapping. Dropped if another batch arrived
    /// while the fetch was in flight.
    pub async fn reload(&self, table_id: &str) {
        let generation = self.state.borrow().generation;
        let result = self.host.fetch_table(table_id).await;

        let current = self.state.borrow().generation;
        if current != generation {
            log::debug!(
                "discarding reload of {} from generation {} (current {})",
                table_id,
                generation,
                current
            );
            return;
        }

        match result {
            Ok(records) => {
                let mapping = self.state.borrow().mapping.clone();
                let batch = RecordBatch {
                    table_id: Some(table_id.to_string()),
                    mapping,
                    records,
                };
                self.on_records(batch).await;
            }
            Err(e) => log::warn!("fetch_table({}) failed: {}", table_id, e),
        }
    }

    async fn refresh_colors(&self, generation: u64, table: String, column: String) {
        let result = self.host.fetch_color_choices(&table, &column).await;

        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation {
                log::debug!(
                    "discarding color choices for {}.{} from generation {} (current {})",
                    table,
                    column,
                    generation,
                    state.generation
                );
                return;
            }
            match result {
                Ok(choices) => {
                    state.palette = choices.unwrap_or_default();
                    state.palette_source = Some((table, column));
                }
                Err(e) => {
                    // Keep whatever palette this column already had
                    log::warn!("fetch_color_choices({}, {}) failed: {}", table, column, e);
                    return;
                }
            }
        }
        self.redraw();
    }

    // =========================================================================
    // User input
    // =========================================================================

    /// Move keyboard focus. With no focus yet, `End` focuses the last item and
    /// any other key the first.
    pub fn navigate(&self, direction: Direction) -> Option<ItemPos> {
        let (previous, current) = {
            let mut state = self.state.borrow_mut();
            let shape = state.grid.shape();
            let previous = state.focus;
            state.focus = match previous {
                Some(pos) => Some(shape.step(pos, direction)),
                None if direction == Direction::End => shape.last(),
                None => shape.first(),
            };
            (previous, state.focus)
        };
        if previous != current {
            self.sink.borrow_mut().update_focus(previous, current);
        }
        current
    }

    /// Activate the focused item (Enter).
    pub async fn activate_focused(&self) {
        let focus = self.state.borrow().focus;
        if let Some(pos) = focus {
            self.activate(pos).await;
        }
    }

    /// Activate an item: select its record, or signal "new row" for an
    /// empty cell. The host cursor follows; a failed move is logged and the
    /// local selection stays.
    pub async fn activate(&self, pos: ItemPos) {
        let (change, target, previous_focus) = {
            let mut state = self.state.borrow_mut();
            let Some(grid) = state.grid.grid() else { return };
            if !grid.shape().contains(pos) {
                return;
            }
            let record = grid.item_at(pos).map(|item| item.record_id);

            let previous_focus = state.focus.replace(pos);
            let (change, target) = match record {
                Some(id) => (state.selection.activate(id), CursorTarget::Record(id)),
                None => (state.selection.clear_local(), CursorTarget::New),
            };
            (change, target, previous_focus)
        };

        if previous_focus != Some(pos) {
            self.sink.borrow_mut().update_focus(previous_focus, Some(pos));
        }
        self.apply_highlight(&change);

        if change.needs_host_sync() {
            if let Err(e) = self.host.set_cursor_pos(target).await {
                log::warn!("set_cursor_pos({}) failed: {}", target.to_wire(), e);
            }
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Full redraw of the current state.
    pub fn redraw(&self) {
        let state = self.state.borrow();
        let frame = Frame {
            state: &state.grid,
            selected: state.selection.selected(),
            focus: state.focus,
            palette: &state.palette,
            settings: &self.settings,
        };
        self.sink.borrow_mut().render(&frame);
    }

    fn apply_highlight(&self, change: &SelectionChange) {
        let delta = {
            let state = self.state.borrow();
            match state.grid.grid() {
                Some(grid) => SelectionTracker::highlight_delta(change, grid.record_items()),
                None => return,
            }
        };
        if !delta.is_empty() {
            self.sink.borrow_mut().update_highlight(&delta);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    pub fn grid_state(&self) -> Ref<'_, GridState> {
        Ref::map(self.state.borrow(), |s| &s.grid)
    }

    pub fn palette(&self) -> Ref<'_, ColorChoices> {
        Ref::map(self.state.borrow(), |s| &s.palette)
    }

    pub fn selected(&self) -> Option<RecordId> {
        self.state.borrow().selection.selected()
    }

    pub fn focus(&self) -> Option<ItemPos> {
        self.state.borrow().focus
    }

    pub fn sink(&self) -> Ref<'_, R> {
        self.sink.borrow()
    }

    pub fn into_parts(self) -> (H, R) {
        (self.host, self.sink.into_inner())
    }
}
