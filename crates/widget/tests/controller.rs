use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use pivotgrid_config::Settings;
use pivotgrid_core::{Direction, HighlightDelta, ItemPos, RecordId};
use pivotgrid_protocol::{
    ChoiceStyle, ColorChoices, ColumnMapping, CursorTarget, Record, RecordBatch, WidgetManifest,
};
use pivotgrid_widget::{render_text, Frame, GridController, HostBridge, HostError, HostErrorKind, RenderSink};
use smol::channel::{self, Receiver, Sender};
use smol::LocalExecutor;

type ColorReply = Result<Option<ColorChoices>, HostError>;
type TableReply = Result<Vec<Record>, HostError>;

// -------------------------------------------------------------------------
// Scripted host
// -------------------------------------------------------------------------

#[derive(Default)]
struct ScriptedHost {
    manifests: RefCell<Vec<WidgetManifest>>,
    cursor_calls: RefCell<Vec<CursorTarget>>,
    cursor_failure: Cell<Option<HostErrorKind>>,
    /// One pending reply per color fetch, consumed in call order
    color_replies: RefCell<VecDeque<Receiver<ColorReply>>>,
    color_calls: RefCell<Vec<(String, String)>>,
    tables: RefCell<HashMap<String, Vec<Record>>>,
    /// Pending table fetches; when empty, `tables` answers immediately
    table_replies: RefCell<VecDeque<Receiver<TableReply>>>,
}

impl ScriptedHost {
    /// Queue a color reply the test completes later.
    fn expect_color_fetch(&self) -> Sender<ColorReply> {
        let (tx, rx) = channel::bounded(1);
        self.color_replies.borrow_mut().push_back(rx);
        tx
    }

    /// Queue a table reply the test completes later.
    fn expect_table_fetch(&self) -> Sender<TableReply> {
        let (tx, rx) = channel::bounded(1);
        self.table_replies.borrow_mut().push_back(rx);
        tx
    }
}

impl HostBridge for ScriptedHost {
    fn ready(&self, manifest: &WidgetManifest) {
        self.manifests.borrow_mut().push(manifest.clone());
    }

    async fn set_cursor_pos(&self, target: CursorTarget) -> Result<(), HostError> {
        self.cursor_calls.borrow_mut().push(target);
        match self.cursor_failure.get() {
            Some(kind) => Err(HostError::new(kind, "cursor refused")),
            None => Ok(()),
        }
    }

    async fn fetch_table(&self, table_id: &str) -> TableReply {
        let reply = self.table_replies.borrow_mut().pop_front();
        if let Some(rx) = reply {
            return rx
                .recv()
                .await
                .unwrap_or_else(|_| Err(HostError::new(HostErrorKind::Transport, "reply dropped")));
        }
        self.tables
            .borrow()
            .get(table_id)
            .cloned()
            .ok_or_else(|| HostError::rejected(format!("no table {table_id}")))
    }

    async fn fetch_color_choices(&self, table_id: &str, column_id: &str) -> ColorReply {
        self.color_calls
            .borrow_mut()
            .push((table_id.to_string(), column_id.to_string()));
        let reply = self.color_replies.borrow_mut().pop_front();
        match reply {
            Some(rx) => rx
                .recv()
                .await
                .unwrap_or_else(|_| Err(HostError::new(HostErrorKind::Transport, "reply dropped"))),
            None => Ok(None),
        }
    }
}

// -------------------------------------------------------------------------
// Recording sink
// -------------------------------------------------------------------------

#[derive(Default)]
struct RecordingSink {
    frames: Vec<String>,
    highlights: Vec<HighlightDelta>,
    focus_moves: Vec<(Option<ItemPos>, Option<ItemPos>)>,
}

impl RenderSink for RecordingSink {
    fn render(&mut self, frame: &Frame<'_>) {
        self.frames.push(render_text(frame));
    }

    fn update_highlight(&mut self, delta: &HighlightDelta) {
        self.highlights.push(delta.clone());
    }

    fn update_focus(&mut self, previous: Option<ItemPos>, current: Option<ItemPos>) {
        self.focus_moves.push((previous, current));
    }
}

type Controller = GridController<ScriptedHost, RecordingSink>;

fn controller() -> Controller {
    GridController::new(ScriptedHost::default(), RecordingSink::default(), Settings::default())
}

fn mapping(color: bool) -> ColumnMapping {
    ColumnMapping {
        row: Some("R".into()),
        column: Some("C".into()),
        content: Some("V".into()),
        background_color: color.then(|| "Tone".to_string()),
        ..Default::default()
    }
}

fn scenario_records() -> Vec<Record> {
    vec![
        Record::new(1).with("R", "R1").with("C", "C1").with("V", "5"),
        Record::new(2).with("R", "R1").with("C", "C2").with("V", "7"),
        Record::new(3).with("R", "R2").with("C", "C1").with("V", "x"),
    ]
}

fn batch(records: Vec<Record>, color: bool) -> RecordBatch {
    RecordBatch {
        table_id: Some("Tasks".into()),
        mapping: Some(mapping(color)),
        records,
    }
}

fn palette(fill: &str) -> ColorChoices {
    let mut choices = ColorChoices::new();
    choices.insert(
        "hot".to_string(),
        ChoiceStyle {
            fill_color: Some(fill.to_string()),
            text_color: None,
        },
    );
    choices
}

fn run_until_stalled(ex: &LocalExecutor<'_>) {
    while ex.try_tick() {}
}

// -------------------------------------------------------------------------
// Lifecycle
// -------------------------------------------------------------------------

#[test]
fn start_announces_manifest_and_waits_for_mapping() {
    let controller = controller();
    controller.start();

    let manifests = controller.host().manifests.borrow();
    assert_eq!(manifests.as_slice(), &[WidgetManifest::grid()]);
    assert_eq!(controller.sink().frames, vec!["Waiting for column mappings...\n".to_string()]);
}

#[test]
fn batch_renders_grid() {
    let controller = controller();
    smol::block_on(controller.on_records(batch(scenario_records(), false)));

    let state = controller.grid_state();
    let grid = state.grid().unwrap();
    assert_eq!(grid.rows(), &["R1", "R2"]);
    assert_eq!(grid.columns(), &["C1", "C2"]);
    assert!(controller.sink().frames.last().unwrap().contains("R2 |   x"));
    // No color column, no metadata fetch
    assert!(controller.host().color_calls.borrow().is_empty());
}

// -------------------------------------------------------------------------
// Async ordering
// -------------------------------------------------------------------------

#[test]
fn stale_color_reply_is_discarded() {
    let controller = controller();
    let first_reply = controller.host().expect_color_fetch();
    let second_reply = controller.host().expect_color_fetch();

    let ex = LocalExecutor::new();
    let first = ex.spawn(controller.on_records(batch(scenario_records(), true)));
    run_until_stalled(&ex);
    assert_eq!(controller.generation(), 1);

    let mut newer = scenario_records();
    newer.push(Record::new(4).with("R", "R3").with("C", "C1").with("V", "y"));
    let second = ex.spawn(controller.on_records(batch(newer, true)));
    run_until_stalled(&ex);
    assert_eq!(controller.generation(), 2);

    // The newer fetch completes first
    second_reply.try_send(Ok(Some(palette("#000000")))).unwrap();
    run_until_stalled(&ex);
    assert!(second.is_finished());

    // Then the older one, which must not win
    first_reply.try_send(Ok(Some(palette("#FFFFFF")))).unwrap();
    run_until_stalled(&ex);
    assert!(first.is_finished());

    let palette = controller.palette();
    assert_eq!(palette["hot"].fill_color.as_deref(), Some("#000000"));
    assert_eq!(controller.grid_state().grid().unwrap().row_count(), 3);
    assert_eq!(
        controller.host().color_calls.borrow().as_slice(),
        &[("Tasks".to_string(), "Tone".to_string()), ("Tasks".to_string(), "Tone".to_string())]
    );
}

#[test]
fn color_fetch_failure_keeps_grid() {
    let controller = controller();
    let reply = controller.host().expect_color_fetch();

    let ex = LocalExecutor::new();
    let task = ex.spawn(controller.on_records(batch(scenario_records(), true)));
    run_until_stalled(&ex);
    reply.try_send(Err(HostError::unavailable("metadata offline"))).unwrap();
    run_until_stalled(&ex);

    assert!(task.is_finished());
    assert!(controller.palette().is_empty());
    assert!(controller.grid_state().is_ready());
}

// -------------------------------------------------------------------------
// Selection
// -------------------------------------------------------------------------

#[test]
fn activation_selects_and_host_clear_resets() {
    let controller = controller();
    smol::block_on(async {
        controller.on_records(batch(scenario_records(), false)).await;
        controller.activate(ItemPos::new(0, 1, 0)).await;
    });

    assert_eq!(controller.selected(), Some(RecordId(2)));
    assert_eq!(controller.focus(), Some(ItemPos::new(0, 1, 0)));
    assert_eq!(
        controller.host().cursor_calls.borrow().as_slice(),
        &[CursorTarget::Record(RecordId(2))]
    );

    controller.on_record(None);
    assert_eq!(controller.selected(), None);

    let sink = controller.sink();
    assert_eq!(
        sink.highlights,
        vec![
            HighlightDelta {
                cleared: vec![],
                highlighted: vec![ItemPos::new(0, 1, 0)],
            },
            HighlightDelta {
                cleared: vec![ItemPos::new(0, 1, 0)],
                highlighted: vec![],
            },
        ]
    );
    // Host broadcasts never echo back to the host
    assert_eq!(controller.host().cursor_calls.borrow().len(), 1);
}

#[test]
fn host_broadcast_moves_highlight() {
    let controller = controller();
    smol::block_on(controller.on_records(batch(scenario_records(), false)));

    controller.on_record(Some(RecordId(1)));
    controller.on_record(Some(RecordId(3)));

    let sink = controller.sink();
    assert_eq!(sink.highlights.len(), 2);
    assert_eq!(sink.highlights[1].cleared, vec![ItemPos::new(0, 0, 0)]);
    assert_eq!(sink.highlights[1].highlighted, vec![ItemPos::new(1, 0, 0)]);
    assert!(controller.host().cursor_calls.borrow().is_empty());
}

#[test]
fn failed_cursor_move_keeps_optimistic_selection() {
    let controller = controller();
    controller.host().cursor_failure.set(Some(HostErrorKind::Rejected));

    smol::block_on(async {
        controller.on_records(batch(scenario_records(), false)).await;
        controller.activate(ItemPos::new(1, 0, 0)).await;
    });

    assert_eq!(controller.selected(), Some(RecordId(3)));
    assert_eq!(controller.host().cursor_calls.borrow().len(), 1);
}

#[test]
fn placeholder_activation_requests_new_row() {
    let controller = controller();
    smol::block_on(async {
        controller.on_records(batch(scenario_records(), false)).await;
        controller.activate(ItemPos::new(0, 0, 0)).await;
        controller.activate(ItemPos::new(1, 1, 0)).await;
    });

    assert_eq!(controller.selected(), None);
    assert_eq!(
        controller.host().cursor_calls.borrow().as_slice(),
        &[CursorTarget::Record(RecordId(1)), CursorTarget::New]
    );
}

#[test]
fn activation_outside_grid_is_ignored() {
    let controller = controller();
    smol::block_on(async {
        controller.activate(ItemPos::new(0, 0, 0)).await;
        controller.on_records(batch(scenario_records(), false)).await;
        controller.activate(ItemPos::new(5, 5, 0)).await;
    });

    assert_eq!(controller.selected(), None);
    assert!(controller.host().cursor_calls.borrow().is_empty());
}

// -------------------------------------------------------------------------
// Keyboard
// -------------------------------------------------------------------------

#[test]
fn keyboard_navigation_then_enter() {
    let controller = controller();
    smol::block_on(controller.on_records(batch(scenario_records(), false)));

    assert_eq!(controller.navigate(Direction::Down), Some(ItemPos::new(0, 0, 0)));
    assert_eq!(controller.navigate(Direction::Right), Some(ItemPos::new(0, 1, 0)));
    // Right edge
    assert_eq!(controller.navigate(Direction::Right), Some(ItemPos::new(0, 1, 0)));
    smol::block_on(controller.activate_focused());

    assert_eq!(controller.selected(), Some(RecordId(2)));
    assert_eq!(
        controller.sink().focus_moves,
        vec![
            (None, Some(ItemPos::new(0, 0, 0))),
            (Some(ItemPos::new(0, 0, 0)), Some(ItemPos::new(0, 1, 0))),
        ]
    );
}

#[test]
fn focus_is_clamped_into_smaller_grid() {
    let controller = controller();
    smol::block_on(controller.on_records(batch(scenario_records(), false)));
    controller.navigate(Direction::End);
    assert_eq!(controller.focus(), Some(ItemPos::new(1, 1, 0)));

    let smaller = vec![Record::new(1).with("R", "R1").with("C", "C1").with("V", "5")];
    smol::block_on(controller.on_records(batch(smaller, false)));
    assert_eq!(controller.focus(), Some(ItemPos::new(0, 0, 0)));

    smol::block_on(controller.on_records(batch(Vec::new(), false)));
    assert_eq!(controller.focus(), None);
}

// -------------------------------------------------------------------------
// Reload
// -------------------------------------------------------------------------

#[test]
fn reload_reuses_last_mapping() {
    let controller = controller();
    controller.host().tables.borrow_mut().insert(
        "Tasks".to_string(),
        vec![Record::new(9).with("R", "Z").with("C", "Q").with("V", "new")],
    );

    smol::block_on(async {
        controller.on_records(batch(scenario_records(), false)).await;
        controller.reload("Tasks").await;
    });

    let state = controller.grid_state();
    assert_eq!(state.grid().unwrap().rows(), &["Z"]);
    assert_eq!(controller.generation(), 2);
}

#[test]
fn failed_reload_keeps_grid() {
    let controller = controller();
    smol::block_on(async {
        controller.on_records(batch(scenario_records(), false)).await;
        controller.reload("Missing").await;
    });

    assert_eq!(controller.generation(), 1);
    assert_eq!(controller.grid_state().grid().unwrap().row_count(), 2);
}

#[test]
fn reload_superseded_by_newer_batch_is_dropped() {
    let controller = controller();
    let reply = controller.host().expect_table_fetch();

    let ex = LocalExecutor::new();
    ex.spawn(controller.on_records(batch(scenario_records(), false))).detach();
    run_until_stalled(&ex);
    assert_eq!(controller.generation(), 1);

    let reload = ex.spawn(controller.reload("Tasks"));
    run_until_stalled(&ex);
    assert!(!reload.is_finished());

    // The host delivers fresh data while the fetch is pending
    let newest = vec![Record::new(7).with("R", "Newest").with("C", "C1").with("V", "n")];
    ex.spawn(controller.on_records(batch(newest, false))).detach();
    run_until_stalled(&ex);
    assert_eq!(controller.generation(), 2);

    let stale = vec![Record::new(8).with("R", "Stale").with("C", "C1").with("V", "s")];
    reply.try_send(Ok(stale)).unwrap();
    run_until_stalled(&ex);
    assert!(reload.is_finished());

    assert_eq!(controller.generation(), 2);
    assert_eq!(controller.grid_state().grid().unwrap().rows(), &["Newest"]);
}
