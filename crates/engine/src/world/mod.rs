mod cell;
mod grid;

pub use cell::{Cell, Layer, LiquidKind, DRAW_ORDER};
pub use grid::{DenseGrid, GridAccessor, GridError};
