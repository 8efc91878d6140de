use thiserror::Error;

use super::Cell;

/// Read-only view of a world grid.
///
/// `cell` is only defined for in-bounds coordinates. Callers check `contains` first;
/// implementations are free to return anything for coordinates outside the grid.
pub trait GridAccessor: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn cell(&self, x: u32, y: u32) -> Cell;
    fn spawn_point(&self) -> (u32, u32);

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }

    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// Row-major in-memory grid. Cell (x,y) lives at `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid {
    width: u32,
    height: u32,
    spawn: (u32, u32),
    cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("cell count mismatch: expected {expected}, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("spawn point ({x}, {y}) lies outside a {width}x{height} grid")]
    SpawnOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl DenseGrid {
    pub fn new(
        width: u32,
        height: u32,
        spawn: (u32, u32),
        cells: Vec<Cell>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        let actual = cells.len();
        if expected != actual {
            return Err(GridError::CellCountMismatch { expected, actual });
        }
        if spawn.0 >= width || spawn.1 >= height {
            return Err(GridError::SpawnOutOfBounds {
                x: spawn.0,
                y: spawn.1,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            spawn,
            cells,
        })
    }

    pub fn from_fn(
        width: u32,
        height: u32,
        spawn: (u32, u32),
        mut cell_at: impl FnMut(u32, u32) -> Cell,
    ) -> Result<Self, GridError> {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(cell_at(x, y));
            }
        }
        Self::new(width, height, spawn, cells)
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn cell_at(&self, x: u32, y: u32) -> Option<Cell> {
        self.index_of(x, y)
            .and_then(|index| self.cells.get(index).copied())
    }
}

impl GridAccessor for DenseGrid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn cell(&self, x: u32, y: u32) -> Cell {
        debug_assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of bounds");
        self.cell_at(x, y).unwrap_or_default()
    }

    fn spawn_point(&self) -> (u32, u32) {
        self.spawn
    }
}
