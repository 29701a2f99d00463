//! Breadth-first path queries over the battlefield grid.

use std::collections::VecDeque;

use tactics_core::{CellCoord, UnitStats};

use crate::grid::Grid;

/// Computes the shortest orthogonal path between two cells.
///
/// Obstacles are never entered and occupied cells are skipped unless they are
/// the goal itself. The returned path includes both endpoints, is `[start]`
/// when both endpoints coincide, and is empty when the goal is unreachable or
/// either endpoint lies outside the grid. Neighbours are expanded in row-major
/// order (north, west, east, south), so ties always resolve the same way.
#[must_use]
pub fn shortest_path(grid: &Grid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };
    if start_index == goal_index {
        return vec![start];
    }

    let cell_count = grid.cell_count();
    let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    visited[start_index] = true;

    let mut queue = VecDeque::from([start]);
    let mut found = false;
    while let Some(current) = queue.pop_front() {
        let Some(current_index) = grid.index(current) else {
            continue;
        };
        for neighbor in grid.neighbors(current) {
            let Some(index) = grid.index(neighbor) else {
                continue;
            };
            if visited[index] {
                continue;
            }
            let Some(cell) = grid.cell(neighbor) else {
                continue;
            };
            if cell.is_obstacle() || (cell.is_occupied() && index != goal_index) {
                continue;
            }

            visited[index] = true;
            came_from[index] = Some(current_index);
            if index == goal_index {
                found = true;
                break;
            }
            queue.push_back(neighbor);
        }
        if found {
            break;
        }
    }

    if !found {
        return Vec::new();
    }

    let coords: Vec<CellCoord> = grid.cells().map(|cell| cell.coord()).collect();
    let mut path = vec![goal];
    let mut cursor = goal_index;
    while let Some(previous) = came_from[cursor] {
        path.push(coords[previous]);
        cursor = previous;
    }
    path.reverse();
    path
}

/// Lists every cell a unit standing on `origin` can reach within `max_range` steps.
///
/// Cells are reported in discovery order, which is stable for a given board.
/// The origin itself is excluded. Obstacles and occupied cells block the
/// search, except the origin which is usually occupied by the moving unit.
#[must_use]
pub fn reachable_cells(grid: &Grid, origin: CellCoord, max_range: u32) -> Vec<CellCoord> {
    let Some(origin_index) = grid.index(origin) else {
        return Vec::new();
    };

    let mut distances: Vec<Option<u32>> = vec![None; grid.cell_count()];
    distances[origin_index] = Some(0);
    let mut queue = VecDeque::from([origin]);
    let mut reachable = Vec::new();

    while let Some(current) = queue.pop_front() {
        let Some(distance) = grid.index(current).and_then(|index| distances[index]) else {
            continue;
        };
        if distance >= max_range {
            continue;
        }

        for neighbor in grid.neighbors(current) {
            let Some(index) = grid.index(neighbor) else {
                continue;
            };
            if distances[index].is_some() {
                continue;
            }
            let admissible = grid
                .cell(neighbor)
                .map_or(false, |cell| cell.is_free() || index == origin_index);
            if !admissible {
                continue;
            }

            distances[index] = Some(distance + 1);
            reachable.push(neighbor);
            queue.push_back(neighbor);
        }
    }

    reachable
}

/// Lists the non-obstacle cells a unit standing on `origin` threatens.
///
/// Ranged units threaten every cell within their Manhattan range while melee
/// units threaten the four orthogonal neighbours. Line of sight is not
/// considered. Cells are reported in row-major order.
#[must_use]
pub fn attack_cells(grid: &Grid, origin: CellCoord, stats: &UnitStats) -> Vec<CellCoord> {
    if !grid.contains(origin) {
        return Vec::new();
    }

    grid.cells()
        .filter(|cell| !cell.is_obstacle())
        .map(|cell| cell.coord())
        .filter(|cell| stats.reaches(origin.manhattan_distance(*cell)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{Archetype, UnitId};

    fn occupied(mut grid: Grid, cells: &[CellCoord]) -> Grid {
        for (index, &cell) in cells.iter().enumerate() {
            let id = u32::try_from(index).expect("index fits");
            grid.set_occupant(cell, Some(UnitId::new(id)));
        }
        grid
    }

    #[test]
    fn path_to_self_is_single_cell() {
        let grid = Grid::open(3, 3);
        let cell = CellCoord::new(1, 1);
        assert_eq!(shortest_path(&grid, cell, cell), vec![cell]);
    }

    #[test]
    fn path_prefers_north_then_east() {
        let grid = Grid::open(3, 3);
        let path = shortest_path(&grid, CellCoord::new(0, 1), CellCoord::new(1, 0));
        assert_eq!(
            path,
            vec![CellCoord::new(0, 1), CellCoord::new(0, 0), CellCoord::new(1, 0)]
        );
    }

    #[test]
    fn path_ties_resolve_in_row_major_order() {
        let grid = Grid::open(3, 3);
        let path = shortest_path(&grid, CellCoord::new(1, 1), CellCoord::new(0, 2));
        let labels: Vec<String> = path.iter().map(|cell| cell.label()).collect();
        assert_eq!(labels, ["B2", "A2", "A3"]);

        let labels: Vec<String> = reachable_cells(&grid, CellCoord::new(1, 1), 1)
            .iter()
            .map(|cell| cell.label())
            .collect();
        assert_eq!(labels, ["B1", "A2", "C2", "B3"]);
    }

    #[test]
    fn path_detours_around_obstacles() {
        let grid = Grid::with_obstacles(3, 3, &[CellCoord::new(1, 0), CellCoord::new(1, 1)]);
        let path = shortest_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0));
        assert_eq!(path.len(), 7);
        assert_eq!(path.first(), Some(&CellCoord::new(0, 0)));
        assert_eq!(path.last(), Some(&CellCoord::new(2, 0)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn occupied_goal_is_enterable_but_occupied_waypoints_are_not() {
        let grid = occupied(
            Grid::open(3, 1),
            &[CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(2, 0)],
        );
        assert_eq!(
            shortest_path(&grid, CellCoord::new(0, 0), CellCoord::new(1, 0)).len(),
            2
        );
        assert!(shortest_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0)).is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_have_no_path() {
        let grid = Grid::open(2, 2);
        assert!(shortest_path(&grid, CellCoord::new(0, 0), CellCoord::new(5, 5)).is_empty());
    }

    #[test]
    fn reachable_cells_respect_range_and_exclude_origin() {
        let grid = Grid::open(5, 5);
        let origin = CellCoord::new(2, 2);
        let cells = reachable_cells(&grid, origin, 1);
        assert_eq!(
            cells,
            vec![
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
                CellCoord::new(3, 2),
                CellCoord::new(2, 3),
            ]
        );
        assert_eq!(reachable_cells(&grid, origin, 2).len(), 12);
        assert!(reachable_cells(&grid, origin, 0).is_empty());
    }

    #[test]
    fn reachable_cells_stop_at_units_and_obstacles() {
        let grid = occupied(
            Grid::with_obstacles(3, 1, &[CellCoord::new(2, 0)]),
            &[CellCoord::new(0, 0), CellCoord::new(1, 0)],
        );
        assert!(reachable_cells(&grid, CellCoord::new(0, 0), 3).is_empty());
    }

    #[test]
    fn melee_threatens_adjacent_cells_only() {
        let grid = Grid::with_obstacles(3, 3, &[CellCoord::new(1, 0)]);
        let cells = attack_cells(&grid, CellCoord::new(1, 1), &Archetype::Brawler.stats());
        assert_eq!(
            cells,
            vec![CellCoord::new(0, 1), CellCoord::new(2, 1), CellCoord::new(1, 2)]
        );
    }

    #[test]
    fn ranged_threatens_every_cell_in_range() {
        let grid = Grid::open(5, 5);
        let cells = attack_cells(&grid, CellCoord::new(0, 0), &Archetype::Sniper.stats());
        assert_eq!(cells.len(), 24);
    }
}
