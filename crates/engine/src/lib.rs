//! `pivotgrid-engine`: record batch to pivot grid.
//!
//! Pure engine crate: receives mapped records, returns a materialized grid.
//! No host or IO dependencies.

pub mod aggregate;
pub mod axis;
pub mod grid;
pub mod value;

pub use aggregate::{Cell, CellAggregator, CellItem, CellKey};
pub use axis::{AxisEntry, OrderedAxisBuilder};
pub use grid::{materialize, materialize_mapped, Alignment, Grid, GridSnapshot, GridState};
pub use value::normalize;
