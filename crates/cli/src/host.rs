// File-backed host: serves color metadata from the input file and logs
// cursor requests

use pivotgrid_protocol::{ColorChoices, CursorTarget, Record, WidgetManifest};
use pivotgrid_widget::{HostBridge, HostError};

pub struct FileHost {
    colors: Option<ColorChoices>,
}

impl FileHost {
    pub fn new(colors: Option<ColorChoices>) -> Self {
        Self { colors }
    }
}

impl HostBridge for FileHost {
    fn ready(&self, manifest: &WidgetManifest) {
        log::debug!("widget ready with {} column slots", manifest.columns.len());
    }

    async fn set_cursor_pos(&self, target: CursorTarget) -> Result<(), HostError> {
        log::info!("host cursor -> {}", target.to_wire());
        Ok(())
    }

    async fn fetch_table(&self, table_id: &str) -> Result<Vec<Record>, HostError> {
        Err(HostError::unavailable(format!("no live table {table_id}")))
    }

    async fn fetch_color_choices(&self, _table_id: &str, _column_id: &str) -> Result<Option<ColorChoices>, HostError> {
        Ok(self.colors.clone())
    }
}
