// PivotGrid CLI - render a record batch as a pivot grid, headless

mod exit_codes;
mod host;
mod input;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use pivotgrid_config::{ConfigError, Settings};
use pivotgrid_core::{Direction, ItemPos, RecordId};
use pivotgrid_engine::{GridSnapshot, GridState};
use pivotgrid_protocol::{MappingSlot, WidgetManifest};
use pivotgrid_widget::{resolve_style, CellStyle, GridController, TextRenderer};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use host::FileHost;
use input::MappingArgs;

#[derive(Parser)]
#[command(name = "pgrid")]
#[command(about = "Pivot records into a row x column grid (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize a batch and print the grid
    #[command(after_help = "\
Examples:
  pgrid render batch.json
  pgrid render tasks.csv --csv --row Owner --column Stage --content Title
  pgrid render tasks.csv --csv --row Owner --column Stage --content Title --keys down,right,enter
  pgrid render batch.json --select 12 --format json")]
    Render {
        /// JSON batch (tableId, mapping, records, colors) or CSV with --csv
        file: PathBuf,

        /// Read FILE as CSV; headers are column ids
        #[arg(long)]
        csv: bool,

        /// Column providing row values
        #[arg(long)]
        row: Option<String>,

        /// Column providing column values
        #[arg(long)]
        column: Option<String>,

        /// Column providing cell content
        #[arg(long)]
        content: Option<String>,

        /// Numeric column ordering rows
        #[arg(long)]
        row_order: Option<String>,

        /// Numeric column ordering columns
        #[arg(long)]
        column_order: Option<String>,

        /// Column providing item background colors
        #[arg(long)]
        color: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Simulate a host cursor broadcast for this record id
        #[arg(long)]
        select: Option<i64>,

        /// Keys applied from the first item: left,right,up,down,home,end,enter
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Settings file (default: user config dir)
        #[arg(long, env = "PGRID_SETTINGS")]
        settings: Option<PathBuf>,
    },

    /// Print the widget manifest sent to the host on startup
    Manifest,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            file,
            csv,
            row,
            column,
            content,
            row_order,
            column_order,
            color,
            format,
            select,
            keys,
            settings,
        } => {
            let mapping = MappingArgs {
                row,
                column,
                content,
                row_order,
                column_order,
                color,
            };
            cmd_render(file, csv, mapping, format, select, keys, settings)
        }
        Commands::Manifest => cmd_manifest(),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => CliError::io(err.to_string()),
            ConfigError::Parse { .. } => CliError::parse(err.to_string()),
        }
    }
}

// ============================================================================
// render
// ============================================================================

/// One `--keys` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Move(Direction),
    Activate,
}

fn parse_keys(keys: &[String]) -> Result<Vec<KeyAction>, CliError> {
    keys.iter()
        .filter(|k| !k.trim().is_empty())
        .map(|key| {
            if key.trim().eq_ignore_ascii_case("enter") {
                return Ok(KeyAction::Activate);
            }
            Direction::from_key(key).map(KeyAction::Move).ok_or_else(|| {
                CliError::args(format!("unknown key '{}'", key))
                    .with_hint("keys are left, right, up, down, home, end, enter")
            })
        })
        .collect()
}

fn cmd_render(
    file: PathBuf,
    csv: bool,
    mapping: MappingArgs,
    format: OutputFormat,
    select: Option<i64>,
    keys: Vec<String>,
    settings_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let keys = parse_keys(&keys)?;
    let settings = match settings_path {
        Some(path) => Settings::load_from(&path)?,
        None => Settings::load(),
    };

    let input::BatchFile { batch, colors } = if csv {
        input::load_csv(&file, &mapping)?
    } else {
        input::load_json(&file, &mapping)?
    };

    let controller = GridController::new(FileHost::new(colors), TextRenderer::new(), settings);
    controller.start();

    smol::block_on(async {
        controller.on_records(batch).await;
        if let Some(id) = select {
            controller.on_record(Some(RecordId(id)));
        }
        if !keys.is_empty() {
            controller.navigate(Direction::Home);
            for key in &keys {
                match key {
                    KeyAction::Move(direction) => {
                        controller.navigate(*direction);
                    }
                    KeyAction::Activate => controller.activate_focused().await,
                }
            }
        }
    });
    controller.redraw();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match format {
        OutputFormat::Text => {
            write!(handle, "{}", controller.sink().output()).map_err(|e| CliError::io(e.to_string()))?;
        }
        OutputFormat::Json => {
            let report = RenderReport::from_controller(&controller);
            let json = serde_json::to_string_pretty(&report).map_err(|e| CliError::general(e.to_string()))?;
            writeln!(handle, "{}", json).map_err(|e| CliError::io(e.to_string()))?;
        }
    }
    Ok(())
}

/// `--format json` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing: Vec<MappingSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grid: Option<GridSnapshot>,
    /// Resolved style per color token used in the grid
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    styles: BTreeMap<String, CellStyle>,
    selected: Option<RecordId>,
    focus: Option<ItemPos>,
}

impl RenderReport {
    fn from_controller(controller: &GridController<FileHost, TextRenderer>) -> Self {
        let state = controller.grid_state();
        let settings = controller.settings();
        let palette = controller.palette();

        let (status, message, missing) = match &*state {
            GridState::AwaitingMapping => ("awaitingMapping", Some(&settings.awaiting_mapping_message), Vec::new()),
            GridState::MappingIncomplete { missing } => {
                ("mappingIncomplete", Some(&settings.mapping_incomplete_message), missing.clone())
            }
            GridState::NoData => ("noData", Some(&settings.no_data_message), Vec::new()),
            GridState::Ready(_) => ("ready", None, Vec::new()),
        };

        let mut styles = BTreeMap::new();
        if let Some(grid) = state.grid() {
            for (_, item) in grid.items() {
                let Some(token) = item.and_then(|i| i.background_color.as_deref()) else { continue };
                if styles.contains_key(token) {
                    continue;
                }
                if let Some(style) = resolve_style(token, &palette) {
                    styles.insert(token.to_string(), style);
                }
            }
        }

        Self {
            status,
            message: message.cloned(),
            missing,
            grid: state.grid().map(|g| g.snapshot()),
            styles,
            selected: controller.selected(),
            focus: controller.focus(),
        }
    }
}

// ============================================================================
// manifest
// ============================================================================

fn cmd_manifest() -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&WidgetManifest::grid()).map_err(|e| CliError::general(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
