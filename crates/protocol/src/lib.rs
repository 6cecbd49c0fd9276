//! PivotGrid host bridge wire types.
//!
//! The host delivers record batches and a column mapping as JSON; these types
//! are the canonical Rust shape of that traffic. Field names follow the host's
//! spelling (`Row`, `RowOrder`, `fillColor`, `requiredAccess`, ...), so they
//! round-trip without adapters.
//!
//! # Usage
//!
//! ```ignore
//! use pivotgrid_protocol::RecordBatch;
//!
//! let batch: RecordBatch = serde_json::from_str(&line)?;
//! let mapping = batch.mapping.unwrap_or_default();
//! for record in &batch.records {
//!     if let Some(mapped) = mapping.resolve(record) {
//!         // ...
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use pivotgrid_core::RecordId;

// =============================================================================
// Field values
// =============================================================================

/// One host cell value, in whatever shape the host column type produces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Reference column value: an object carrying a display `name`
    Reference { name: String },
    /// Reference list (or any JSON array)
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        FieldValue::Reference { name: name.into() }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or_else(|| FieldValue::Text(n.to_string())),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(map) => {
                let name = match map.get("name") {
                    Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                };
                match name {
                    Some(name) => FieldValue::Reference { name },
                    // Objects without a usable name keep their JSON text
                    None => FieldValue::Text(Value::Object(map).to_string()),
                }
            }
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        use serde_json::Value;
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Number(n) => serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s),
            FieldValue::Reference { name } => serde_json::json!({ "name": name }),
            FieldValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

// =============================================================================
// Records
// =============================================================================

static NULL_FIELD: FieldValue = FieldValue::Null;

/// A host row: its id plus field values keyed by host column id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self {
            id: RecordId(id),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, column: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(column.to_string(), value.into());
        self
    }

    /// Field by host column id; absent fields read as null.
    pub fn get(&self, column: &str) -> &FieldValue {
        self.fields.get(column).unwrap_or(&NULL_FIELD)
    }
}

// =============================================================================
// Column mapping
// =============================================================================

/// Widget-side column slots the user maps to host columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MappingSlot {
    Row,
    Column,
    Content,
    RowOrder,
    ColumnOrder,
    BackgroundColor,
}

impl MappingSlot {
    pub const ALL: [MappingSlot; 6] = [
        MappingSlot::Row,
        MappingSlot::Column,
        MappingSlot::Content,
        MappingSlot::RowOrder,
        MappingSlot::ColumnOrder,
        MappingSlot::BackgroundColor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MappingSlot::Row => "Row",
            MappingSlot::Column => "Column",
            MappingSlot::Content => "Content",
            MappingSlot::RowOrder => "RowOrder",
            MappingSlot::ColumnOrder => "ColumnOrder",
            MappingSlot::BackgroundColor => "BackgroundColor",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, MappingSlot::Row | MappingSlot::Column | MappingSlot::Content)
    }
}

impl std::fmt::Display for MappingSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Slot → host column id, as configured in the host's widget panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ColumnMapping {
    pub row: Option<String>,
    pub column: Option<String>,
    pub content: Option<String>,
    pub row_order: Option<String>,
    pub column_order: Option<String>,
    pub background_color: Option<String>,
}

impl ColumnMapping {
    /// Host column mapped to a slot. Blank ids count as unmapped.
    pub fn column_for(&self, slot: MappingSlot) -> Option<&str> {
        let col = match slot {
            MappingSlot::Row => &self.row,
            MappingSlot::Column => &self.column,
            MappingSlot::Content => &self.content,
            MappingSlot::RowOrder => &self.row_order,
            MappingSlot::ColumnOrder => &self.column_order,
            MappingSlot::BackgroundColor => &self.background_color,
        };
        col.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Required slots that have no host column.
    pub fn missing_required(&self) -> Vec<MappingSlot> {
        MappingSlot::ALL
            .iter()
            .copied()
            .filter(|slot| slot.is_required() && self.column_for(*slot).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Project a record onto widget slots. `None` when the mapping is incomplete.
    pub fn resolve(&self, record: &Record) -> Option<MappedRecord> {
        let row = self.column_for(MappingSlot::Row)?;
        let column = self.column_for(MappingSlot::Column)?;
        let content = self.column_for(MappingSlot::Content)?;
        let optional = |slot| self.column_for(slot).map(|c| record.get(c).clone());

        Some(MappedRecord {
            id: record.id,
            row: record.get(row).clone(),
            column: record.get(column).clone(),
            content: record.get(content).clone(),
            row_order: optional(MappingSlot::RowOrder),
            column_order: optional(MappingSlot::ColumnOrder),
            background_color: optional(MappingSlot::BackgroundColor),
        })
    }
}

/// A record seen through the column mapping.
///
/// Optional slots are `None` when unmapped and `Some(Null)` when mapped but
/// empty for this record.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRecord {
    pub id: RecordId,
    pub row: FieldValue,
    pub column: FieldValue,
    pub content: FieldValue,
    pub row_order: Option<FieldValue>,
    pub column_order: Option<FieldValue>,
    pub background_color: Option<FieldValue>,
}

impl MappedRecord {
    pub fn new(id: i64, row: impl Into<FieldValue>, column: impl Into<FieldValue>, content: impl Into<FieldValue>) -> Self {
        Self {
            id: RecordId(id),
            row: row.into(),
            column: column.into(),
            content: content.into(),
            row_order: None,
            column_order: None,
            background_color: None,
        }
    }

    pub fn with_orders(mut self, row_order: impl Into<FieldValue>, column_order: impl Into<FieldValue>) -> Self {
        self.row_order = Some(row_order.into());
        self.column_order = Some(column_order.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<FieldValue>) -> Self {
        self.background_color = Some(color.into());
        self
    }
}

// =============================================================================
// Batches and host calls
// =============================================================================

/// One host data delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordBatch {
    /// Host table the records come from (needed for color metadata)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// `None` until the user has opened the mapping panel at least once
    pub mapping: Option<ColumnMapping>,
    pub records: Vec<Record>,
}

/// Argument of the host cursor-set call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorTarget {
    Record(RecordId),
    /// The host's "add new row" position
    New,
}

impl CursorTarget {
    /// Wire form: `{"rowId": 5}` or `{"rowId": "new"}`.
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            CursorTarget::Record(id) => serde_json::json!({ "rowId": id.raw() }),
            CursorTarget::New => serde_json::json!({ "rowId": "new" }),
        }
    }
}

/// Color-choice metadata for one fill token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

/// Raw color token → choice style, from the host's column metadata.
pub type ColorChoices = BTreeMap<String, ChoiceStyle>;

// =============================================================================
// Widget manifest
// =============================================================================

/// One mappable column slot as announced to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSlotSpec {
    pub name: String,
    pub title: String,
    pub description: String,
    pub optional: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

/// Payload of the host `ready` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetManifest {
    pub required_access: String,
    pub allow_select_by: bool,
    pub columns: Vec<ColumnSlotSpec>,
}

impl WidgetManifest {
    /// Manifest of the pivot grid widget.
    pub fn grid() -> Self {
        let slot = |slot: MappingSlot, title: &str, description: &str, column_type: Option<&str>| ColumnSlotSpec {
            name: slot.name().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            optional: !slot.is_required(),
            column_type: column_type.map(str::to_string),
        };

        Self {
            required_access: "read table".to_string(),
            allow_select_by: true,
            columns: vec![
                slot(MappingSlot::Row, "Row Column", "Column that determines the grid rows", None),
                slot(MappingSlot::Column, "Column Column", "Column that determines the grid columns", None),
                slot(MappingSlot::Content, "Content Column", "Column that provides the cell content", None),
                slot(
                    MappingSlot::RowOrder,
                    "Row Order Column",
                    "Optional: numeric column to control row ordering",
                    Some("Numeric"),
                ),
                slot(
                    MappingSlot::ColumnOrder,
                    "Column Order Column",
                    "Optional: numeric column to control column ordering",
                    Some("Numeric"),
                ),
                slot(
                    MappingSlot::BackgroundColor,
                    "Background Color Column",
                    "Optional: color name, hex code or choice used as the item background",
                    None,
                ),
            ],
        }
    }
}
