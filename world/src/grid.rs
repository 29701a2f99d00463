//! Battlefield grid and obstacle generation.

use std::collections::VecDeque;

use rand::{seq::SliceRandom, Rng};
use tactics_core::{CellCoord, ObstacleKind, UnitId};
use tracing::debug;

/// Single square of the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coord: CellCoord,
    obstacle: Option<ObstacleKind>,
    occupant: Option<UnitId>,
}

impl Cell {
    fn open(coord: CellCoord) -> Self {
        Self {
            coord,
            obstacle: None,
            occupant: None,
        }
    }

    /// Coordinates of the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Reports whether the cell blocks movement.
    #[must_use]
    pub const fn is_obstacle(&self) -> bool {
        self.obstacle.is_some()
    }

    /// Cosmetic variety of the obstacle, if the cell is one.
    #[must_use]
    pub const fn obstacle_kind(&self) -> Option<ObstacleKind> {
        self.obstacle
    }

    /// Unit standing on the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// Reports whether a unit stands on the cell.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Reports whether a unit may be placed on or moved to the cell.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        !self.is_obstacle() && !self.is_occupied()
    }
}

/// Row-major grid of cells.
///
/// Once generated, the non-obstacle cells always form a single
/// 4-connected region. Obstacles never change for the rest of the match;
/// only occupancy does.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid without obstacles.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| Cell::open(CellCoord::new(column, row))))
            .collect();
        Self {
            columns,
            rows,
            cells,
        }
    }

    /// Creates a grid with the provided cells blocked by trees.
    ///
    /// Cells outside the grid are ignored. No connectivity check is made, so
    /// callers are responsible for handing in a sensible layout.
    #[must_use]
    pub fn with_obstacles(columns: u32, rows: u32, obstacles: &[CellCoord]) -> Self {
        let mut grid = Self::open(columns, rows);
        for &cell in obstacles {
            if let Some(index) = grid.index(cell) {
                grid.cells[index].obstacle = Some(ObstacleKind::Tree);
            }
        }
        grid
    }

    /// Generates a grid whose obstacles never split the free cells apart.
    ///
    /// The generator aims for `round(rows * columns * percentage / 100)`
    /// obstacles. Candidate cells are visited in a shuffled order and each
    /// one is kept only if the remaining free cells stay connected, so the
    /// final count may fall short of the target on cramped grids.
    pub fn generate<R: Rng>(columns: u32, rows: u32, obstacle_percentage: u32, rng: &mut R) -> Self {
        let mut grid = Self::open(columns, rows);
        let target = obstacle_target(columns, rows, obstacle_percentage);
        if target == 0 {
            return grid;
        }

        let mut candidates: Vec<usize> = (0..grid.cells.len()).collect();
        candidates.shuffle(rng);

        let mut placed = 0;
        for index in candidates {
            if placed == target {
                break;
            }

            grid.cells[index].obstacle = Some(ObstacleKind::Tree);
            if grid.is_connected() {
                let kind = if rng.gen_bool(0.5) {
                    ObstacleKind::Tree
                } else {
                    ObstacleKind::Mountain
                };
                grid.cells[index].obstacle = Some(kind);
                placed += 1;
            } else {
                grid.cells[index].obstacle = None;
            }
        }

        debug!(columns, rows, target, placed, "generated obstacle layout");
        grid
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Returns the cell at the provided coordinate.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Total number of cells, obstacles included.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of obstacle cells.
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_obstacle()).count()
    }

    /// Coordinates of every cell that is neither an obstacle nor occupied.
    #[must_use]
    pub fn free_cells(&self) -> Vec<CellCoord> {
        self.cells
            .iter()
            .filter(|cell| cell.is_free())
            .map(Cell::coord)
            .collect()
    }

    /// Reports whether the non-obstacle cells form one 4-connected region.
    ///
    /// A grid without any free cell is not connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.cells.iter().position(|cell| !cell.is_obstacle()) else {
            return false;
        };
        let open = self.cells.iter().filter(|cell| !cell.is_obstacle()).count();

        let mut visited = vec![false; self.cells.len()];
        visited[start] = true;
        let mut queue = VecDeque::from([self.cells[start].coord]);
        let mut reached = 1;

        while let Some(current) = queue.pop_front() {
            for neighbor in self.neighbors(current) {
                let Some(index) = self.index(neighbor) else {
                    continue;
                };
                if visited[index] || self.cells[index].is_obstacle() {
                    continue;
                }
                visited[index] = true;
                reached += 1;
                queue.push_back(neighbor);
            }
        }

        reached == open
    }

    /// In-bounds orthogonal neighbours in row-major order: north, west, east, south.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let mut candidates = [None; 4];
        let mut count = 0;

        if let Some(row) = cell.row().checked_sub(1) {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }

        if let Some(column) = cell.column().checked_sub(1) {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }

        if let Some(column) = cell.column().checked_add(1) {
            if column < self.columns {
                candidates[count] = Some(CellCoord::new(column, cell.row()));
                count += 1;
            }
        }

        if let Some(row) = cell.row().checked_add(1) {
            if row < self.rows {
                candidates[count] = Some(CellCoord::new(cell.column(), row));
                count += 1;
            }
        }

        candidates.into_iter().take(count).flatten()
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    pub(crate) fn clear_occupancy(&mut self) {
        for cell in &mut self.cells {
            cell.occupant = None;
        }
    }

    pub(crate) fn set_occupant(&mut self, cell: CellCoord, occupant: Option<UnitId>) {
        if let Some(index) = self.index(cell) {
            self.cells[index].occupant = occupant;
        }
    }
}

/// Number of obstacles the generator aims for, rounded half up.
#[must_use]
pub fn obstacle_target(columns: u32, rows: u32, obstacle_percentage: u32) -> usize {
    let percentage = u64::from(obstacle_percentage.min(100));
    let area = u64::from(columns) * u64::from(rows);
    usize::try_from((area * percentage + 50) / 100).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn open_grid_is_row_major() {
        let grid = Grid::open(3, 2);
        let coords: Vec<CellCoord> = grid.cells().map(Cell::coord).collect();
        assert_eq!(coords[0], CellCoord::new(0, 0));
        assert_eq!(coords[1], CellCoord::new(1, 0));
        assert_eq!(coords[3], CellCoord::new(0, 1));
        assert_eq!(coords.len(), 6);
    }

    #[test]
    fn obstacle_target_rounds_to_nearest() {
        assert_eq!(obstacle_target(25, 25, 20), 125);
        assert_eq!(obstacle_target(5, 5, 10), 3);
        assert_eq!(obstacle_target(3, 3, 5), 0);
        assert_eq!(obstacle_target(4, 4, 250), 16);
    }

    #[test]
    fn zero_percentage_places_no_obstacles() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = Grid::generate(6, 6, 0, &mut rng);
        assert_eq!(grid.obstacle_count(), 0);
    }

    #[test]
    fn generated_grid_reaches_target_on_default_board() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let grid = Grid::generate(25, 25, 20, &mut rng);
        assert!(grid.is_connected());
        assert!(grid.obstacle_count() <= 125);
        assert!(grid.obstacle_count() > 100);
    }

    #[test]
    fn wall_splitting_the_grid_is_not_connected() {
        let wall: Vec<CellCoord> = (0..3).map(|row| CellCoord::new(1, row)).collect();
        let grid = Grid::with_obstacles(3, 3, &wall);
        assert!(!grid.is_connected());
    }

    #[test]
    fn fully_blocked_grid_is_not_connected() {
        let all: Vec<CellCoord> = Grid::open(2, 2).cells().map(Cell::coord).collect();
        let grid = Grid::with_obstacles(2, 2, &all);
        assert!(!grid.is_connected());
    }

    #[test]
    fn neighbors_follow_row_major_order_and_clip_edges() {
        let grid = Grid::open(3, 3);
        let around_center: Vec<CellCoord> = grid.neighbors(CellCoord::new(1, 1)).collect();
        assert_eq!(
            around_center,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
            ]
        );
        assert_eq!(grid.neighbors(CellCoord::new(0, 0)).count(), 2);
    }

    #[test]
    fn occupancy_updates_free_cells() {
        let mut grid = Grid::with_obstacles(2, 1, &[CellCoord::new(1, 0)]);
        assert_eq!(grid.free_cells(), vec![CellCoord::new(0, 0)]);
        grid.set_occupant(CellCoord::new(0, 0), Some(UnitId::new(0)));
        assert!(grid.free_cells().is_empty());
        assert_eq!(
            grid.cell(CellCoord::new(0, 0)).and_then(Cell::occupant),
            Some(UnitId::new(0))
        );
    }
}
