//! `pivotgrid-widget`: the pivot grid widget, minus the pixels.
//!
//! `GridController` wires a host (`HostBridge`) to a render sink
//! (`RenderSink`): it materializes record batches, tracks selection and
//! keyboard focus, and forwards activations back to the host cursor.
//!
//! # Usage
//!
//! ```ignore
//! use pivotgrid_widget::{GridController, TextRenderer};
//!
//! let controller = GridController::new(host, TextRenderer::new(), Settings::load());
//! controller.start();
//! smol::block_on(controller.on_records(batch));
//! print!("{}", controller.sink().output());
//! ```

pub mod controller;
pub mod host;
pub mod render;
pub mod style;

pub use controller::GridController;
pub use host::{HostBridge, HostError, HostErrorKind};
pub use render::{render_text, Frame, RenderSink, TextRenderer};
pub use style::{resolve_style, CellStyle};
