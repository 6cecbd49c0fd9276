// Input loading: JSON batch files and CSV tables

use std::path::Path;

use pivotgrid_protocol::{ColorChoices, ColumnMapping, FieldValue, Record, RecordBatch};
use serde::Deserialize;

use crate::CliError;

/// A JSON batch file: a host batch plus optional color metadata.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BatchFile {
    #[serde(flatten)]
    pub batch: RecordBatch,
    /// Color choices of the background-color column
    pub colors: Option<ColorChoices>,
}

/// Slot overrides from the command line, as host column ids (CSV headers).
#[derive(Debug, Default, Clone)]
pub struct MappingArgs {
    pub row: Option<String>,
    pub column: Option<String>,
    pub content: Option<String>,
    pub row_order: Option<String>,
    pub column_order: Option<String>,
    pub color: Option<String>,
}

impl MappingArgs {
    pub fn is_empty(&self) -> bool {
        self.row.is_none()
            && self.column.is_none()
            && self.content.is_none()
            && self.row_order.is_none()
            && self.column_order.is_none()
            && self.color.is_none()
    }

    /// Override slots of `base` that were given on the command line.
    pub fn apply(&self, base: Option<ColumnMapping>) -> Option<ColumnMapping> {
        if self.is_empty() {
            return base;
        }
        let mut mapping = base.unwrap_or_default();
        let overrides = [
            (&self.row, &mut mapping.row),
            (&self.column, &mut mapping.column),
            (&self.content, &mut mapping.content),
            (&self.row_order, &mut mapping.row_order),
            (&self.column_order, &mut mapping.column_order),
            (&self.color, &mut mapping.background_color),
        ];
        for (arg, slot) in overrides {
            if let Some(value) = arg {
                *slot = Some(value.clone());
            }
        }
        Some(mapping)
    }
}

/// Load a JSON batch file.
pub fn load_json(path: &Path, mapping: &MappingArgs) -> Result<BatchFile, CliError> {
    let text = read(path)?;
    let mut file: BatchFile = serde_json::from_str(&text)
        .map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))?;
    file.batch.mapping = mapping.apply(file.batch.mapping.take());
    Ok(file)
}

/// Load a CSV table. Headers are column ids; record ids are 1-based data
/// line numbers. The table id is the file stem.
pub fn load_csv(path: &Path, mapping: &MappingArgs) -> Result<BatchFile, CliError> {
    let text = read(path)?;
    let records = parse_csv(&text).map_err(|e| CliError::parse(format!("{}: {}", path.display(), e)))?;
    let table_id = path.file_stem().map(|s| s.to_string_lossy().to_string());

    Ok(BatchFile {
        batch: RecordBatch {
            table_id,
            mapping: mapping.apply(None),
            records,
        },
        colors: None,
    })
}

pub fn parse_csv(text: &str) -> Result<Vec<Record>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let mut record = Record::new(idx as i64 + 1);
        for (header, value) in headers.iter().zip(row.iter()) {
            record = record.with(header, FieldValue::text(value));
        }
        records.push(record);
    }
    Ok(records)
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}
