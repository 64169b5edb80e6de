/// Geometry of a collage: a grid of square tiles filled in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub grid_width: u32,
    pub grid_height: u32,
    pub tile_size_px: u32,
}

impl GridLayout {
    pub fn new(grid_width: u32, grid_height: u32, tile_size_px: u32) -> Self {
        Self {
            grid_width,
            grid_height,
            tile_size_px,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }

    /// Canvas size in pixels, `(width, height)`.
    pub fn canvas_dimensions(&self) -> (u32, u32) {
        (
            self.tile_size_px * self.grid_width,
            self.tile_size_px * self.grid_height,
        )
    }

    /// `(column, row)` of the tile holding the album at `rank` (0-based).
    pub fn tile_position(&self, rank: usize) -> (u32, u32) {
        let width = self.grid_width as usize;
        ((rank % width) as u32, (rank / width) as u32)
    }

    /// Top-left pixel of the tile at `(column, row)`.
    pub fn tile_offset(&self, column: u32, row: u32) -> (u32, u32) {
        (column * self.tile_size_px, row * self.tile_size_px)
    }

    /// Walks every tile position once, left to right and top to bottom.
    pub fn cursor(&self) -> GridCursor {
        GridCursor {
            column: 0,
            row: 0,
            grid_width: self.grid_width,
            grid_height: self.grid_height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridCursor {
    column: u32,
    row: u32,
    grid_width: u32,
    grid_height: u32,
}

impl Iterator for GridCursor {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.grid_height || self.grid_width == 0 {
            return None;
        }

        let position = (self.column, self.row);
        self.column += 1;
        if self.column == self.grid_width {
            self.column = 0;
            self.row += 1;
        }
        Some(position)
    }
}
