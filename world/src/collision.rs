//! Grid of solid tiles derived from the map's world layer.
//!
//! Bodies move with axis-separated move-and-slide: the horizontal displacement
//! is resolved first, then the vertical displacement from the corrected
//! horizontal position, so a body pressed diagonally against a wall keeps
//! sliding along it.

use crate::tilemap::{TileLayer, TileMap};

/// Property that marks a tile as solid.
pub const COLLIDES_PROPERTY: &str = "collides";

const EDGE_EPSILON: f32 = 0.001;

/// Axis-aligned box anchored at its top-left corner, in map pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Aabb {
    /// Creates a new box.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Result of moving a box through the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    /// Box after collision resolution.
    pub aabb: Aabb,
    /// Whether the horizontal displacement was cut short.
    pub blocked_x: bool,
    /// Whether the vertical displacement was cut short.
    pub blocked_y: bool,
}

/// Exposed edges of a solid tile, drawn by the collision debug pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileFaces {
    /// Left edge borders a free cell.
    pub left: bool,
    /// Right edge borders a free cell.
    pub right: bool,
    /// Top edge borders a free cell.
    pub top: bool,
    /// Bottom edge borders a free cell.
    pub bottom: bool,
}

/// Dense grid of solid tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionGrid {
    columns: u32,
    rows: u32,
    tile_width: f32,
    tile_height: f32,
    solids: Vec<bool>,
}

impl CollisionGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(columns: u32, rows: u32, tile_width: f32, tile_height: f32) -> Self {
        Self {
            columns,
            rows,
            tile_width,
            tile_height,
            solids: vec![false; columns as usize * rows as usize],
        }
    }

    /// Marks every tile of `layer` whose tileset flags it as colliding.
    #[must_use]
    pub fn from_layer(map: &TileMap, layer: &TileLayer) -> Self {
        let mut grid = Self::new(
            layer.width,
            layer.height,
            map.tile_width as f32,
            map.tile_height as f32,
        );
        for (column, row, gid) in layer.tiles() {
            if map.tile_flag(gid, COLLIDES_PROPERTY) {
                grid.set_solid(column, row, true);
            }
        }
        grid
    }

    /// Size of a single cell in pixels as `(width, height)`.
    #[must_use]
    pub const fn tile_size(&self) -> (f32, f32) {
        (self.tile_width, self.tile_height)
    }

    /// Updates the solidity of a single cell; out-of-range cells are ignored.
    pub fn set_solid(&mut self, column: u32, row: u32, solid: bool) {
        if column < self.columns && row < self.rows {
            let index = row as usize * self.columns as usize + column as usize;
            self.solids[index] = solid;
        }
    }

    /// Returns whether a cell blocks movement. Cells outside the grid never do.
    #[must_use]
    pub fn is_solid(&self, column: i64, row: i64) -> bool {
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return false;
        }

        self.solids[row as usize * self.columns as usize + column as usize]
    }

    /// Number of solid cells.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.solids.iter().filter(|solid| **solid).count()
    }

    /// Iterates over solid cells together with the faces that border free space.
    pub fn solid_cells(&self) -> impl Iterator<Item = (u32, u32, TileFaces)> + '_ {
        let columns = self.columns.max(1);
        self.solids
            .iter()
            .enumerate()
            .filter(|(_, solid)| **solid)
            .map(move |(index, _)| {
                let column = index as u32 % columns;
                let row = index as u32 / columns;
                let (c, r) = (i64::from(column), i64::from(row));
                let faces = TileFaces {
                    left: !self.is_solid(c - 1, r),
                    right: !self.is_solid(c + 1, r),
                    top: !self.is_solid(c, r - 1),
                    bottom: !self.is_solid(c, r + 1),
                };
                (column, row, faces)
            })
    }

    /// Moves `aabb` by `(dx, dy)`, stopping flush against solid cells.
    #[must_use]
    pub fn move_and_slide(&self, aabb: Aabb, dx: f32, dy: f32) -> MoveOutcome {
        let resolved_x = self.resolve_x(aabb, dx);
        let mut moved = aabb;
        moved.x = resolved_x;
        let resolved_y = self.resolve_y(moved, dy);
        moved.y = resolved_y;

        MoveOutcome {
            aabb: moved,
            blocked_x: (resolved_x - (aabb.x + dx)).abs() > EDGE_EPSILON,
            blocked_y: (resolved_y - (aabb.y + dy)).abs() > EDGE_EPSILON,
        }
    }

    fn resolve_x(&self, aabb: Aabb, dx: f32) -> f32 {
        if dx == 0.0 {
            return aabb.x;
        }

        let mut candidate = aabb.x + dx;
        let rows = self.row_of(aabb.y + EDGE_EPSILON)..=self.row_of(aabb.bottom() - EDGE_EPSILON);
        let column_blocked =
            |column: i64| rows.clone().any(|row| self.is_solid(column, row));

        // Every column between the current leading edge and the target is swept,
        // so long steps cannot skip over a wall.
        if dx > 0.0 {
            let first = self.column_of(aabb.right() - EDGE_EPSILON);
            let last = self.column_of(candidate + aabb.width - EDGE_EPSILON);
            if let Some(column) = (first..=last).find(|column| column_blocked(*column)) {
                candidate = candidate.min(column as f32 * self.tile_width - aabb.width);
            }
            candidate.max(aabb.x)
        } else {
            let first = self.column_of(aabb.x + EDGE_EPSILON);
            let last = self.column_of(candidate + EDGE_EPSILON);
            if let Some(column) = (last..=first).rev().find(|column| column_blocked(*column)) {
                candidate = candidate.max((column + 1) as f32 * self.tile_width);
            }
            candidate.min(aabb.x)
        }
    }

    fn resolve_y(&self, aabb: Aabb, dy: f32) -> f32 {
        if dy == 0.0 {
            return aabb.y;
        }

        let mut candidate = aabb.y + dy;
        let columns =
            self.column_of(aabb.x + EDGE_EPSILON)..=self.column_of(aabb.right() - EDGE_EPSILON);
        let row_blocked = |row: i64| columns.clone().any(|column| self.is_solid(column, row));

        if dy > 0.0 {
            let first = self.row_of(aabb.bottom() - EDGE_EPSILON);
            let last = self.row_of(candidate + aabb.height - EDGE_EPSILON);
            if let Some(row) = (first..=last).find(|row| row_blocked(*row)) {
                candidate = candidate.min(row as f32 * self.tile_height - aabb.height);
            }
            candidate.max(aabb.y)
        } else {
            let first = self.row_of(aabb.y + EDGE_EPSILON);
            let last = self.row_of(candidate + EDGE_EPSILON);
            if let Some(row) = (last..=first).rev().find(|row| row_blocked(*row)) {
                candidate = candidate.max((row + 1) as f32 * self.tile_height);
            }
            candidate.min(aabb.y)
        }
    }

    fn column_of(&self, x: f32) -> i64 {
        (x / self.tile_width).floor() as i64
    }

    fn row_of(&self, y: f32) -> i64 {
        (y / self.tile_height).floor() as i64
    }
}
