//! Dense maze cell storage owned by the world.

use maze_runners_core::{
    exit_for, CellCoord, CellKind, ConfigError, Direction, GridView, ENTRY, MIN_GRID_DIMENSION,
};
use rand::Rng;

use crate::navigation::DistanceField;

/// Upper bound on rejection-sampling draws before falling back to a scan.
const MAX_SAMPLE_ATTEMPTS: usize = 4096;

/// Row-major matrix of cell kinds.
///
/// The entry sits at `(1, 1)` and the goal at `(width - 2, height - 2)`.
/// Generation passes keep both on walkable cells and the border walled.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid where every cell holds `kind`.
    pub fn filled(width: u32, height: u32, kind: CellKind) -> Result<Self, ConfigError> {
        if width < MIN_GRID_DIMENSION || height < MIN_GRID_DIMENSION {
            return Err(ConfigError::GridTooSmall { width, height });
        }

        let len = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or(ConfigError::GridTooSmall { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![kind; len],
        })
    }

    /// Parses a hand-authored layout.
    ///
    /// Glyphs: `#` wall, `.` path, `s` slow trap, `c` confusion trap,
    /// `t` teleport trap.
    pub fn from_rows(rows: &[&str]) -> Result<Self, ConfigError> {
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let width = rows
            .first()
            .map_or(0, |row| u32::try_from(row.chars().count()).unwrap_or(u32::MAX));
        let mut grid = Self::filled(width, height, CellKind::Wall)?;

        for (row_index, row) in rows.iter().enumerate() {
            if row.chars().count() != grid.width as usize {
                return Err(ConfigError::RaggedLayout { row: row_index });
            }

            for (column_index, glyph) in row.chars().enumerate() {
                let kind = match glyph {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Path,
                    's' => CellKind::TrapSlow,
                    'c' => CellKind::TrapConfusion,
                    't' => CellKind::TrapTeleport,
                    other => return Err(ConfigError::UnknownGlyph { glyph: other }),
                };
                grid.set(
                    CellCoord::new(column_index as u32, row_index as u32),
                    kind,
                );
            }
        }

        Ok(grid)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell every token starts on.
    #[must_use]
    pub const fn entry(&self) -> CellCoord {
        ENTRY
    }

    /// Goal cell.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        exit_for(self.width, self.height)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Reports whether the cell lies on the outer ring.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 == self.width
            || cell.row() + 1 == self.height
    }

    /// Kind of the cell, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Overwrites a cell. Coordinates outside the grid are ignored.
    pub fn set(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = kind;
        }
    }

    /// In-bounds neighbour in the given direction.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.in_bounds(*next))
    }

    /// In-bounds orthogonal neighbours of the cell.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbor(cell, direction))
    }

    /// Every cell currently holding `kind`, in row-major order.
    #[must_use]
    pub fn cells_of(&self, kind: CellKind) -> Vec<CellCoord> {
        self.view()
            .iter()
            .filter(|(_, candidate)| *candidate == kind)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Picks a uniformly random `Path` cell other than the goal, or `None`
    /// when there is none.
    ///
    /// The goal is never a landing: a token only finishes by stepping onto it.
    /// Draws coordinates until one lands on a path; after
    /// [`MAX_SAMPLE_ATTEMPTS`] misses it samples from the explicit list.
    pub fn random_path_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CellCoord> {
        let exit = self.exit();
        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            let cell = CellCoord::new(
                rng.gen_range(0..self.width),
                rng.gen_range(0..self.height),
            );
            if cell != exit && self.kind(cell) == Some(CellKind::Path) {
                return Some(cell);
            }
        }

        let mut paths = self.cells_of(CellKind::Path);
        paths.retain(|cell| *cell != exit);
        if paths.is_empty() {
            None
        } else {
            Some(paths[rng.gen_range(0..paths.len())])
        }
    }

    /// Breadth-first distances over walkable cells starting at `origin`.
    #[must_use]
    pub fn distances_from(&self, origin: CellCoord) -> DistanceField {
        let mut field = DistanceField::default();
        field.rebuild_with(self.width, self.height, origin, |cell| {
            !self.kind(cell).is_some_and(CellKind::is_walkable)
        });
        field
    }

    /// Reports whether the goal can be walked to from the entry.
    #[must_use]
    pub fn exit_reachable(&self) -> bool {
        self.distances_from(self.entry())
            .distance(self.exit())
            .is_some()
    }

    /// Borrowed view handed to renderers and systems.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.width, self.height)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }

        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
