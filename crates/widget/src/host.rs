//! The host side of the widget: an injected bridge instead of a global API
//! object.

use std::fmt;
use std::future::Future;

use pivotgrid_protocol::{ColorChoices, ColumnMapping, CursorTarget, MappedRecord, Record, WidgetManifest};

/// Why a host call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostErrorKind {
    /// Host refused the request (unknown row, bad argument)
    Rejected,
    /// Host not connected or not ready
    Unavailable,
    /// Widget lacks the access level for the call
    Unauthorized,
    /// Message channel broke mid-call
    Transport,
}

impl HostErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostErrorKind::Rejected => "rejected",
            HostErrorKind::Unavailable => "unavailable",
            HostErrorKind::Unauthorized => "unauthorized",
            HostErrorKind::Transport => "transport",
        }
    }
}

/// A failed host call. Never fatal; callers log it and keep local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub kind: HostErrorKind,
    pub message: String,
}

impl HostError {
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Rejected, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Unavailable, message)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host {}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for HostError {}

/// Calls the widget makes into its host.
///
/// Async calls are plain futures; the controller never needs them to be
/// `Send`, so a single-threaded executor drives everything.
pub trait HostBridge {
    /// Announce the widget and its column slots.
    fn ready(&self, manifest: &WidgetManifest);

    /// Move the host cursor to a record, or to the "new row" position.
    fn set_cursor_pos(&self, target: CursorTarget) -> impl Future<Output = Result<(), HostError>>;

    /// Project a record through the mapping. Hosts that rename columns on
    /// their side override this.
    fn map_column_names(&self, record: &Record, mapping: &ColumnMapping) -> Option<MappedRecord> {
        mapping.resolve(record)
    }

    /// Fetch all records of a table.
    fn fetch_table(&self, table_id: &str) -> impl Future<Output = Result<Vec<Record>, HostError>>;

    /// Color-choice metadata of a column; `Ok(None)` when the column has none.
    fn fetch_color_choices(
        &self,
        table_id: &str,
        column_id: &str,
    ) -> impl Future<Output = Result<Option<ColorChoices>, HostError>>;
}
