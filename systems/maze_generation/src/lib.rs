#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized maze construction and hazard placement.
//!
//! Passages are grown with a randomized Prim's algorithm over the lattice of
//! odd coordinates, which always contains the entry at `(1, 1)`. Post-passes
//! seal the border, connect the goal, sprinkle traps and make sure a teleport
//! trap never guards the only approach to the goal.

use maze_runners_core::{CellCoord, CellKind, ConfigError, Direction, GridSpec};
use maze_runners_world::Grid;
use rand::Rng;
use tracing::debug;

/// Hand-authored 8×8 teaching layout. Its goal cell carries a teleport trap
/// that [`guard_exit`] clears.
pub const TUTORIAL_LAYOUT: [&str; 8] = [
    "########",
    "#....c.#",
    "#..t#.s#",
    "#.#.s..#",
    "#.c.#t.#",
    "#.#..#.#",
    "#.s.c.t#",
    "########",
];

/// Grows perfect mazes, keeping its frontier buffer between runs.
#[derive(Debug, Default)]
pub struct MazeGenerator {
    frontier: Vec<CellCoord>,
}

impl MazeGenerator {
    /// Generates a connected maze without hazards.
    ///
    /// Rejects sizes below 3×3 before touching the random source.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Result<Grid, ConfigError> {
        let mut grid = Grid::filled(width, height, CellKind::Wall)?;

        self.carve_passages(&mut grid, rng);
        connect_exit(&mut grid);
        open_entry_loop(&mut grid);
        make_edges_inaccessible(&mut grid);
        block_last_row_except_exit(&mut grid);

        debug!(
            width,
            height,
            paths = grid.cells_of(CellKind::Path).len(),
            "maze generated"
        );
        Ok(grid)
    }

    fn carve_passages<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) {
        self.frontier.clear();
        let entry = grid.entry();
        grid.set(entry, CellKind::Path);
        push_frontier(grid, entry, &mut self.frontier);

        let mut carved_neighbors = Vec::with_capacity(4);
        while !self.frontier.is_empty() {
            let cell = self.frontier.swap_remove(rng.gen_range(0..self.frontier.len()));
            if grid.kind(cell) == Some(CellKind::Path) {
                continue;
            }

            carved_neighbors.clear();
            carved_neighbors.extend(
                lattice_neighbors(grid, cell)
                    .filter(|(_, neighbor)| grid.kind(*neighbor) == Some(CellKind::Path)),
            );
            if carved_neighbors.is_empty() {
                continue;
            }

            let (midpoint, _) = carved_neighbors[rng.gen_range(0..carved_neighbors.len())];
            grid.set(midpoint, CellKind::Path);
            grid.set(cell, CellKind::Path);
            push_frontier(grid, cell, &mut self.frontier);
        }
    }
}

/// Produces the grid for a difficulty's layout, hazards included.
pub fn build<R: Rng + ?Sized>(spec: GridSpec, rng: &mut R) -> Result<Grid, ConfigError> {
    match spec {
        GridSpec::Tutorial => tutorial_grid(),
        GridSpec::Generated {
            width,
            height,
            hazards_per_kind,
        } => {
            let mut grid = MazeGenerator::default().generate(width, height, rng)?;
            let placed = place_hazards(&mut grid, hazards_per_kind, rng);
            guard_exit(&mut grid);
            debug!(placed, requested = hazards_per_kind * CellKind::HAZARDS.len(), "hazards placed");
            Ok(grid)
        }
    }
}

/// Parses [`TUTORIAL_LAYOUT`] and clears its guarded goal.
pub fn tutorial_grid() -> Result<Grid, ConfigError> {
    let mut grid = Grid::from_rows(&TUTORIAL_LAYOUT)?;
    guard_exit(&mut grid);
    Ok(grid)
}

/// Walls every border cell. The entry and goal are interior cells and stay open.
pub fn make_edges_inaccessible(grid: &mut Grid) {
    let (width, height) = (grid.width(), grid.height());
    for column in 0..width {
        grid.set(CellCoord::new(column, 0), CellKind::Wall);
        grid.set(CellCoord::new(column, height - 1), CellKind::Wall);
    }
    for row in 0..height {
        grid.set(CellCoord::new(0, row), CellKind::Wall);
        grid.set(CellCoord::new(width - 1, row), CellKind::Wall);
    }
    reopen_endpoints(grid);
}

/// Walls the bottom row and reopens the goal above it.
pub fn block_last_row_except_exit(grid: &mut Grid) {
    let last_row = grid.height() - 1;
    for column in 0..grid.width() - 1 {
        grid.set(CellCoord::new(column, last_row), CellKind::Wall);
    }
    grid.set(grid.exit(), CellKind::Path);
}

/// Overwrites random path cells with `count_per_kind` traps of each kind.
///
/// Cells are drawn without replacement from the path cells that are neither
/// the entry, the goal, nor orthogonally adjacent to either. Returns the
/// number of traps placed, which falls short when candidates run out.
pub fn place_hazards<R: Rng + ?Sized>(grid: &mut Grid, count_per_kind: usize, rng: &mut R) -> usize {
    let (entry, exit) = (grid.entry(), grid.exit());
    let mut candidates: Vec<CellCoord> = grid
        .cells_of(CellKind::Path)
        .into_iter()
        .filter(|cell| cell.manhattan_distance(entry) > 1 && cell.manhattan_distance(exit) > 1)
        .collect();

    let mut placed = 0;
    for kind in CellKind::HAZARDS {
        for _ in 0..count_per_kind {
            if candidates.is_empty() {
                return placed;
            }
            let cell = candidates.swap_remove(rng.gen_range(0..candidates.len()));
            grid.set(cell, kind);
            placed += 1;
        }
    }
    placed
}

/// Keeps teleport traps away from the goal.
///
/// The goal itself is reset to a path. When fewer than two of its neighbours
/// are plain paths, every teleport trap among them is cleared as well, so a
/// teleport never stands as the only way in.
///
/// This covers a goal with a single plain approach and also a goal whose
/// every approach is a trap (zero plain neighbours).
pub fn guard_exit(grid: &mut Grid) {
    let exit = grid.exit();
    if grid.kind(exit) != Some(CellKind::Path) {
        grid.set(exit, CellKind::Path);
    }

    let neighbors: Vec<CellCoord> = grid.neighbors(exit).collect();
    let path_neighbors = neighbors
        .iter()
        .filter(|cell| grid.kind(**cell) == Some(CellKind::Path))
        .count();

    if path_neighbors < 2 {
        for cell in neighbors {
            if grid.kind(cell) == Some(CellKind::TrapTeleport) {
                debug!(%cell, "teleport trap cleared from the goal approach");
                grid.set(cell, CellKind::Path);
            }
        }
    }
}

/// Carves from the closest lattice cell to the goal when the goal sits off the lattice.
fn connect_exit(grid: &mut Grid) {
    let exit = grid.exit();
    let lattice = CellCoord::new(
        nearest_odd_at_most(exit.column()),
        nearest_odd_at_most(exit.row()),
    );
    let corner = CellCoord::new(exit.column(), lattice.row());
    for cell in [lattice, corner, exit] {
        grid.set(cell, CellKind::Path);
    }
}

/// Adds a second opening next to the entry so the first corridor is not forced.
fn open_entry_loop(grid: &mut Grid) {
    let entry = grid.entry();
    let exits = [Direction::Right, Direction::Down].map(|direction| {
        let near = entry.step(direction).filter(|cell| is_interior(grid, *cell));
        let far = near
            .and_then(|cell| cell.step(direction))
            .filter(|cell| is_interior(grid, *cell));
        (near, far)
    });

    let open = exits
        .iter()
        .filter(|(near, _)| near.is_some_and(|cell| grid.kind(cell) == Some(CellKind::Path)))
        .count();
    if open != 1 {
        return;
    }

    for (near, far) in exits {
        if let (Some(near), Some(far)) = (near, far) {
            if grid.kind(near) == Some(CellKind::Wall) && grid.kind(far) == Some(CellKind::Path) {
                grid.set(near, CellKind::Path);
            }
        }
    }
}

fn reopen_endpoints(grid: &mut Grid) {
    grid.set(grid.entry(), CellKind::Path);
    grid.set(grid.exit(), CellKind::Path);
}

fn push_frontier(grid: &Grid, cell: CellCoord, frontier: &mut Vec<CellCoord>) {
    frontier.extend(
        lattice_neighbors(grid, cell)
            .map(|(_, neighbor)| neighbor)
            .filter(|neighbor| grid.kind(*neighbor) == Some(CellKind::Wall)),
    );
}

/// Interior lattice cells two steps away, paired with the wall between.
fn lattice_neighbors(
    grid: &Grid,
    cell: CellCoord,
) -> impl Iterator<Item = (CellCoord, CellCoord)> + '_ {
    Direction::ALL.into_iter().filter_map(move |direction| {
        let midpoint = cell.step(direction)?;
        let neighbor = midpoint.step(direction)?;
        is_interior(grid, neighbor).then_some((midpoint, neighbor))
    })
}

fn is_interior(grid: &Grid, cell: CellCoord) -> bool {
    grid.in_bounds(cell) && !grid.is_border(cell)
}

fn nearest_odd_at_most(value: u32) -> u32 {
    if value % 2 == 1 {
        value
    } else {
        value.saturating_sub(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn tutorial_goal_is_cleared() {
        let grid = tutorial_grid().expect("tutorial parses");
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.exit(), CellCoord::new(6, 6));
        assert_eq!(grid.kind(grid.exit()), Some(CellKind::Path));
        assert!(grid.exit_reachable());
    }

    #[test]
    fn generate_rejects_tiny_grids() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            MazeGenerator::default().generate(2, 10, &mut rng),
            Err(ConfigError::GridTooSmall {
                width: 2,
                height: 10
            })
        );
    }

    #[test]
    fn smallest_grid_is_a_single_cell_room() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let grid = MazeGenerator::default()
            .generate(3, 3, &mut rng)
            .expect("valid size");
        assert_eq!(grid.entry(), grid.exit());
        assert_eq!(grid.cells_of(CellKind::Path), vec![CellCoord::new(1, 1)]);
    }

    #[test]
    fn guard_exit_clears_the_only_approach() {
        let mut grid = Grid::from_rows(&["#####", "#...#", "###t#", "###t#", "#####"])
            .expect("layout parses");
        guard_exit(&mut grid);
        assert_eq!(grid.kind(CellCoord::new(3, 3)), Some(CellKind::Path));
        assert_eq!(grid.kind(CellCoord::new(3, 2)), Some(CellKind::Path));
    }

    #[test]
    fn guard_exit_clears_teleports_on_every_approach() {
        let mut grid = Grid::from_rows(&["#####", "#...#", "#..t#", "#.t.#", "#####"])
            .expect("layout parses");
        guard_exit(&mut grid);
        assert_eq!(grid.kind(CellCoord::new(3, 2)), Some(CellKind::Path));
        assert_eq!(grid.kind(CellCoord::new(2, 3)), Some(CellKind::Path));
    }

    #[test]
    fn guard_exit_keeps_distant_teleports() {
        let mut grid = Grid::from_rows(&["#####", "#.t.#", "#...#", "#...#", "#####"])
            .expect("layout parses");
        guard_exit(&mut grid);
        assert_eq!(grid.kind(CellCoord::new(2, 1)), Some(CellKind::TrapTeleport));
    }

    #[test]
    fn hazards_avoid_endpoints_and_their_neighbours() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut grid = MazeGenerator::default()
            .generate(15, 15, &mut rng)
            .expect("valid size");

        let placed = place_hazards(&mut grid, 3, &mut rng);

        assert_eq!(placed, 9);
        for kind in CellKind::HAZARDS {
            let cells = grid.cells_of(kind);
            assert_eq!(cells.len(), 3);
            for cell in cells {
                assert!(cell.manhattan_distance(grid.entry()) > 1);
                assert!(cell.manhattan_distance(grid.exit()) > 1);
            }
        }
    }

    #[test]
    fn hazards_stop_when_candidates_run_out() {
        let mut grid = Grid::from_rows(&["######", "#....#", "#....#", "######"])
            .expect("layout parses");
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let placed = place_hazards(&mut grid, 10, &mut rng);

        assert!(placed < 30);
        assert_eq!(grid.kind(grid.entry()), Some(CellKind::Path));
        assert_eq!(grid.kind(grid.exit()), Some(CellKind::Path));
    }

    #[test]
    fn nearest_odd_snaps_down() {
        assert_eq!(nearest_odd_at_most(1), 1);
        assert_eq!(nearest_odd_at_most(2), 1);
        assert_eq!(nearest_odd_at_most(13), 13);
        assert_eq!(nearest_odd_at_most(28), 27);
    }
}
