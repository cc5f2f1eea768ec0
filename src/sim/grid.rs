//! Terrain grid and blast carving
//!
//! The grid is a flat row-major matrix of [`Cell`] tags. Anything outside the
//! matrix reads as [`Cell::Wall`], so callers never need a bounds check before
//! asking about a neighbour.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Terrain classification of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Indestructible, absorbs blasts
    Wall,
    /// Destructible, absorbs the rest of a blast arm
    Block,
    /// Transient blast cell, lethal but walkable
    Explosion,
}

/// The four blast arms, in the order they are evaluated (N, S, W, E)
pub const ARMS: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
];

/// Rectangular safe zone that map generation keeps clear (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeZone {
    pub min: IVec2,
    pub max: IVec2,
}

impl SafeZone {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| IVec2::new(x, y)))
    }
}

/// Terrain matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-empty grid. Used by tests and as the canvas for [`Grid::generate`].
    pub fn empty(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
        }
    }

    /// Build the arena layout: border walls, lattice pillars, a fixed block
    /// pattern, and the given safe zones forced clear.
    pub fn generate(width: i32, height: i32, safe_zones: &[SafeZone]) -> Self {
        let mut grid = Self::empty(width, height);

        for x in 0..width {
            grid.set(IVec2::new(x, 0), Cell::Wall);
            grid.set(IVec2::new(x, height - 1), Cell::Wall);
        }
        for y in 0..height {
            grid.set(IVec2::new(0, y), Cell::Wall);
            grid.set(IVec2::new(width - 1, y), Cell::Wall);
        }

        // Pillars on every even interior offset
        for y in (2..height - 1).step_by(2) {
            for x in (2..width - 1).step_by(2) {
                grid.set(IVec2::new(x, y), Cell::Wall);
            }
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let pos = IVec2::new(x, y);
                if grid.cell(pos) == Cell::Empty && places_block(pos) {
                    grid.set(pos, Cell::Block);
                }
            }
        }

        for zone in safe_zones {
            for pos in zone.cells() {
                if grid.in_bounds(pos) && grid.cell(pos) != Cell::Wall {
                    grid.set(pos, Cell::Empty);
                }
            }
        }

        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Row-major cell tags, for renderers
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: IVec2) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Tag at `pos`; out of bounds reads as Wall
    pub fn cell(&self, pos: IVec2) -> Cell {
        if self.in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            Cell::Wall
        }
    }

    /// Overwrite the tag at `pos`; ignored out of bounds
    pub fn set(&mut self, pos: IVec2, cell: Cell) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.cells[idx] = cell;
        }
    }

    /// Actors may stand on Empty and Explosion cells
    pub fn is_walkable(&self, pos: IVec2) -> bool {
        self.in_bounds(pos) && matches!(self.cell(pos), Cell::Empty | Cell::Explosion)
    }

    /// Cells whose Block would be destroyed by a blast at `origin`.
    ///
    /// Read-only mirror of [`Grid::carve_explosion`]; call it before carving.
    pub fn blast_victims(&self, origin: IVec2, range: i32) -> Vec<IVec2> {
        if self.in_bounds(origin) && self.cell(origin) == Cell::Block {
            return vec![origin];
        }
        let mut victims = Vec::new();
        for arm in ARMS {
            for step in 1..=range {
                let pos = origin + arm * step;
                match self.cell(pos) {
                    Cell::Wall => break,
                    Cell::Block => {
                        victims.push(pos);
                        break;
                    }
                    Cell::Empty | Cell::Explosion => {}
                }
            }
        }
        victims
    }

    /// Apply a plus-shaped blast centred on `origin`.
    ///
    /// Each arm stops at the first Wall (untouched) or Block (cleared to
    /// Empty); every other cell on the way becomes Explosion.
    pub fn carve_explosion(&mut self, origin: IVec2, range: i32) {
        match self.cell(origin) {
            Cell::Wall => {}
            Cell::Block => {
                // A buried bomb only clears its own block
                self.set(origin, Cell::Empty);
                return;
            }
            Cell::Empty | Cell::Explosion => self.set(origin, Cell::Explosion),
        }

        for arm in ARMS {
            for step in 1..=range {
                let pos = origin + arm * step;
                match self.cell(pos) {
                    Cell::Wall => break,
                    Cell::Block => {
                        self.set(pos, Cell::Empty);
                        break;
                    }
                    Cell::Empty | Cell::Explosion => self.set(pos, Cell::Explosion),
                }
            }
        }
    }

    /// Revert every Explosion cell to Empty
    pub fn clear_explosions(&mut self) {
        for cell in self.cells.iter_mut() {
            if *cell == Cell::Explosion {
                *cell = Cell::Empty;
            }
        }
    }

    /// Number of cells currently tagged `kind`
    pub fn count(&self, kind: Cell) -> usize {
        self.cells.iter().filter(|c| **c == kind).count()
    }
}

/// Fixed block pattern (roughly a quarter of the open cells)
#[inline]
fn places_block(pos: IVec2) -> bool {
    (pos.x + pos.y) % 3 == 0 && (pos.x * pos.y) % 5 != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_grid() -> Grid {
        // 9x9 with a wall border only
        let mut grid = Grid::empty(9, 9);
        for i in 0..9 {
            grid.set(IVec2::new(i, 0), Cell::Wall);
            grid.set(IVec2::new(i, 8), Cell::Wall);
            grid.set(IVec2::new(0, i), Cell::Wall);
            grid.set(IVec2::new(8, i), Cell::Wall);
        }
        grid
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = Grid::empty(5, 5);
        assert_eq!(grid.cell(IVec2::new(-1, 0)), Cell::Wall);
        assert_eq!(grid.cell(IVec2::new(5, 2)), Cell::Wall);
        assert!(!grid.is_walkable(IVec2::new(2, 5)));
    }

    #[test]
    fn test_set_out_of_bounds_is_noop() {
        let mut grid = Grid::empty(3, 3);
        let before = grid.clone();
        grid.set(IVec2::new(10, 10), Cell::Block);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_explosion_is_walkable() {
        let mut grid = Grid::empty(3, 3);
        grid.set(IVec2::new(1, 1), Cell::Explosion);
        assert!(grid.is_walkable(IVec2::new(1, 1)));
        grid.set(IVec2::new(1, 1), Cell::Block);
        assert!(!grid.is_walkable(IVec2::new(1, 1)));
    }

    #[test]
    fn test_generate_layout() {
        let zones = [SafeZone::new(IVec2::new(1, 1), IVec2::new(2, 2))];
        let grid = Grid::generate(21, 15, &zones);

        for x in 0..21 {
            assert_eq!(grid.cell(IVec2::new(x, 0)), Cell::Wall);
            assert_eq!(grid.cell(IVec2::new(x, 14)), Cell::Wall);
        }
        for y in 0..15 {
            assert_eq!(grid.cell(IVec2::new(0, y)), Cell::Wall);
            assert_eq!(grid.cell(IVec2::new(20, y)), Cell::Wall);
        }
        assert_eq!(grid.cell(IVec2::new(2, 2)), Cell::Wall);
        assert_eq!(grid.cell(IVec2::new(4, 6)), Cell::Wall);
        assert_eq!(grid.cell(IVec2::new(1, 1)), Cell::Empty);
        assert_eq!(grid.cell(IVec2::new(2, 1)), Cell::Empty);
        assert_eq!(grid.cell(IVec2::new(1, 2)), Cell::Empty);
        // (3,3): 3+3=6 divisible by 3, 9 not divisible by 5
        assert_eq!(grid.cell(IVec2::new(3, 3)), Cell::Block);
        // (5,1): 6 divisible by 3 but 5 divisible by 5
        assert_eq!(grid.cell(IVec2::new(5, 1)), Cell::Empty);
        assert!(grid.count(Cell::Block) > 0);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let zones = [SafeZone::new(IVec2::new(1, 1), IVec2::new(2, 2))];
        assert_eq!(Grid::generate(21, 15, &zones), Grid::generate(21, 15, &zones));
    }

    #[test]
    fn test_carve_open_plus() {
        let mut grid = open_grid();
        grid.carve_explosion(IVec2::new(4, 4), 2);

        let expected = [
            (4, 4),
            (4, 3),
            (4, 2),
            (4, 5),
            (4, 6),
            (3, 4),
            (2, 4),
            (5, 4),
            (6, 4),
        ];
        for (x, y) in expected {
            assert_eq!(grid.cell(IVec2::new(x, y)), Cell::Explosion, "({x},{y})");
        }
        assert_eq!(grid.count(Cell::Explosion), expected.len());
    }

    #[test]
    fn test_wall_absorbs_arm() {
        let mut grid = open_grid();
        grid.set(IVec2::new(4, 3), Cell::Wall);
        grid.carve_explosion(IVec2::new(4, 4), 3);

        assert_eq!(grid.cell(IVec2::new(4, 3)), Cell::Wall);
        assert_eq!(grid.cell(IVec2::new(4, 2)), Cell::Empty);
        assert_eq!(grid.cell(IVec2::new(4, 1)), Cell::Empty);
    }

    #[test]
    fn test_block_absorbs_arm() {
        let mut grid = open_grid();
        grid.set(IVec2::new(5, 4), Cell::Block);
        grid.carve_explosion(IVec2::new(4, 4), 3);

        assert_eq!(grid.cell(IVec2::new(5, 4)), Cell::Empty);
        assert_eq!(grid.cell(IVec2::new(6, 4)), Cell::Empty);
        assert_eq!(grid.cell(IVec2::new(7, 4)), Cell::Empty);
    }

    #[test]
    fn test_only_first_block_per_arm() {
        let mut grid = open_grid();
        grid.set(IVec2::new(4, 5), Cell::Block);
        grid.set(IVec2::new(4, 6), Cell::Block);

        assert_eq!(grid.blast_victims(IVec2::new(4, 4), 3), vec![IVec2::new(4, 5)]);
        grid.carve_explosion(IVec2::new(4, 4), 3);
        assert_eq!(grid.cell(IVec2::new(4, 5)), Cell::Empty);
        assert_eq!(grid.cell(IVec2::new(4, 6)), Cell::Block);
    }

    #[test]
    fn test_block_at_origin_is_cleared_not_exploded() {
        let mut grid = open_grid();
        grid.set(IVec2::new(4, 4), Cell::Block);
        grid.carve_explosion(IVec2::new(4, 4), 1);
        assert_eq!(grid.cell(IVec2::new(4, 4)), Cell::Empty);
        assert_eq!(grid.count(Cell::Explosion), 0);
        assert_eq!(grid.blast_victims(IVec2::new(4, 4), 1), Vec::new());
    }

    #[test]
    fn test_clear_explosions_idempotent() {
        let mut grid = open_grid();
        grid.carve_explosion(IVec2::new(4, 4), 2);
        grid.clear_explosions();
        let once = grid.clone();
        grid.clear_explosions();
        assert_eq!(grid, once);
        assert_eq!(grid.count(Cell::Explosion), 0);
    }

    proptest! {
        #[test]
        fn prop_walls_never_change(x in 1i32..20, y in 1i32..14, range in 0i32..8) {
            let grid = Grid::generate(21, 15, &[]);
            let mut carved = grid.clone();
            carved.carve_explosion(IVec2::new(x, y), range);
            for (before, after) in grid.cells().iter().zip(carved.cells()) {
                if *before == Cell::Wall {
                    prop_assert_eq!(*after, Cell::Wall);
                }
            }
        }

        #[test]
        fn prop_arm_stops_at_first_obstacle(x in 1i32..20, y in 1i32..14, range in 1i32..8) {
            let grid = Grid::generate(21, 15, &[]);
            let origin = IVec2::new(x, y);
            let mut carved = grid.clone();
            carved.carve_explosion(origin, range);

            for arm in ARMS {
                let mut blocked = false;
                for step in 1..=range {
                    let pos = origin + arm * step;
                    if blocked {
                        prop_assert_ne!(carved.cell(pos), Cell::Explosion);
                        continue;
                    }
                    if matches!(grid.cell(pos), Cell::Wall | Cell::Block) {
                        blocked = true;
                    }
                }
            }
        }
    }
}
