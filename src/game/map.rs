//! # Game Map
//!
//! Fixed-size grid of cells with a soil height marking the ground surface.

use crate::{Cell, FlatcraftError, FlatcraftResult, Position};

/// The grid of cells a game is played on.
///
/// Every location holds exactly one cell for the whole life of the map.
/// Writing to the map never swaps cells: [`GameMap::set_at`] copies the
/// content of the given cell into the one already in place.
///
/// # Examples
///
/// ```
/// use flatcraft::GameMap;
///
/// let map = GameMap::new(10, 10, 6).unwrap();
/// assert!(map.get_at(9, 9).unwrap().is_empty());
/// assert!(map.get_at(10, 0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct GameMap {
    height: i32,
    width: i32,
    soil_height: i32,
    /// Row-major storage, `height * width` cells
    cells: Vec<Cell>,
}

impl GameMap {
    /// Creates a map filled with empty cells.
    pub fn new(height: i32, width: i32, soil_height: i32) -> FlatcraftResult<Self> {
        let cell_count = match height.checked_mul(width) {
            Some(count) if height > 0 && width > 0 => count as usize,
            _ => return Err(FlatcraftError::InvalidDimension { height, width }),
        };

        let mut cells = Vec::with_capacity(cell_count);
        for row in 0..height {
            for column in 0..width {
                cells.push(Cell::new(row, column));
            }
        }

        Ok(Self {
            height,
            width,
            soil_height,
            cells,
        })
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    /// Row of the ground surface.
    pub fn soil_height(&self) -> i32 {
        self.soil_height
    }

    /// Checks whether a location lies on the map.
    pub fn contains(&self, row: i32, column: i32) -> bool {
        (0..self.height).contains(&row) && (0..self.width).contains(&column)
    }

    /// Checks whether a position lies on the map.
    pub fn is_valid_position(&self, position: Position) -> bool {
        self.contains(position.row, position.column)
    }

    /// Gets the cell at a location.
    pub fn get_at(&self, row: i32, column: i32) -> FlatcraftResult<&Cell> {
        let index = self.index_of(row, column)?;
        Ok(&self.cells[index])
    }

    /// Gets the cell at a location, for in-place mutation.
    pub fn get_at_mut(&mut self, row: i32, column: i32) -> FlatcraftResult<&mut Cell> {
        let index = self.index_of(row, column)?;
        Ok(&mut self.cells[index])
    }

    /// Copies the content of `cell` into the cell at a location.
    pub fn set_at(&mut self, row: i32, column: i32, cell: &Cell) -> FlatcraftResult<()> {
        self.get_at_mut(row, column)?.replace_by(cell);
        Ok(())
    }

    /// Iterates over all cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterates over the cells of one row.
    pub fn row_cells(&self, row: i32) -> FlatcraftResult<&[Cell]> {
        let start = self.index_of(row, 0)?;
        Ok(&self.cells[start..start + self.width as usize])
    }

    fn index_of(&self, row: i32, column: i32) -> FlatcraftResult<usize> {
        if !self.contains(row, column) {
            return Err(FlatcraftError::OutOfBounds {
                row,
                column,
                height: self.height,
                width: self.width,
            });
        }
        Ok(row as usize * self.width as usize + column as usize)
    }
}
