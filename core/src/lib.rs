#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Runners engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the systems that drive a match. Drivers submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing exactly what happened. Rejected commands never unwind a match:
//! the world reports them as events carrying one of the error types below and
//! leaves its state untouched.

mod abilities;
mod config;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use abilities::{
    Ability, Cooldowns, ExpiredEffects, StatusDurations, StatusEffect, AGILIDAD_BONUS_MOVES,
    DON_AURAL_TURNS, IGNORANTE_TURNS, LULLABY_TARGETS, LULLABY_TURNS, OVERSOUL_SPEED,
    OVERSOUL_TURNS, PETRIFICATION_TURNS, VENTISCA_TURNS,
};
pub use config::{
    find_template, template, Difficulty, GridSpec, MatchConfig, RosterSize, TokenTemplate,
    CATALOG,
};

/// Cell every token starts on.
pub const ENTRY: CellCoord = CellCoord::new(1, 1);

/// Smallest width or height accepted for a maze grid.
pub const MIN_GRID_DIMENSION: u32 = 3;

/// Fixed goal cell for a grid of the provided dimensions.
#[must_use]
pub const fn exit_for(width: u32, height: u32) -> CellCoord {
    CellCoord::new(width.saturating_sub(2), height.saturating_sub(2))
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Opens the match and hands the first turn to player one.
    StartMatch,
    /// Chooses which roster entry of the active player moves this turn.
    SelectToken {
        /// Zero-based position within the active player's roster.
        index: usize,
    },
    /// Answers the offer to activate the selected token's default ability.
    DecideAbility {
        /// Whether the ability should be used.
        activate: bool,
    },
    /// Moves the selected token a single cell.
    StepToken {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Lets a player act again once their current turn ends.
    GrantExtraTurn {
        /// Player receiving the extra turn.
        player: PlayerSlot,
    },
    /// Ends the match without a winner. Only accepted between turns.
    AbortMatch,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Announces that the match opened.
    MatchStarted {
        /// Difficulty the grid was built for.
        difficulty: Difficulty,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
    /// Announces that a player must choose a token.
    TurnStarted {
        /// Player whose turn began.
        player: PlayerSlot,
    },
    /// Reports that a player lost their turn because every token is immobilized.
    TurnSkipped {
        /// Player whose turn was skipped.
        player: PlayerSlot,
    },
    /// Reports that a player consumed their extra turn flag.
    ExtraTurnTaken {
        /// Player acting again.
        player: PlayerSlot,
    },
    /// Confirms the token chosen to move this turn.
    TokenSelected {
        /// Player owning the token.
        player: PlayerSlot,
        /// Token chosen to move.
        token: TokenId,
        /// Movement points available before any ability.
        moves: u32,
    },
    /// Reports that a token choice was refused.
    SelectionRejected {
        /// Player that attempted the selection.
        player: PlayerSlot,
        /// Why the selection was refused.
        reason: SelectionError,
    },
    /// Offers the selected token's ready default ability.
    AbilityOffered {
        /// Token owning the ability.
        token: TokenId,
        /// Ability that may be activated.
        ability: Ability,
    },
    /// Confirms that an ability was activated.
    AbilityUsed {
        /// Token that used the ability.
        token: TokenId,
        /// Ability that was used.
        ability: Ability,
        /// Cooldown applied to the ability.
        cooldown: u32,
    },
    /// Reports that an ability could not be activated.
    AbilityRejected {
        /// Token that attempted the activation.
        token: TokenId,
        /// Why the activation failed.
        reason: AbilityError,
    },
    /// Reports that a status effect now applies to a token.
    EffectApplied {
        /// Token affected.
        token: TokenId,
        /// Effect applied.
        effect: StatusEffect,
        /// Remaining duration in owner turns.
        turns: u32,
    },
    /// Reports that Don Aural shielded a token from a rival ability.
    EffectResisted {
        /// Token that resisted.
        token: TokenId,
        /// Ability that was resisted.
        ability: Ability,
    },
    /// Reports that an ability wrote a trap onto the grid.
    TrapPlaced {
        /// Cell receiving the trap.
        cell: CellCoord,
        /// Trap written onto the cell.
        kind: CellKind,
    },
    /// Confirms that a token moved between two adjacent cells.
    TokenStepped {
        /// Token that moved.
        token: TokenId,
        /// Cell occupied before the step.
        from: CellCoord,
        /// Cell occupied after the step.
        to: CellCoord,
        /// Movement points left after the step was charged.
        moves_remaining: u32,
    },
    /// Reports that a step was refused without charging a movement point.
    StepRejected {
        /// Token that attempted the step.
        token: TokenId,
        /// Direction of the attempted step.
        direction: Direction,
        /// Why the step was refused.
        reason: MoveError,
    },
    /// Reports that a token set off a terrain trap.
    TrapTriggered {
        /// Token that triggered the trap.
        token: TokenId,
        /// Cell holding the trap.
        cell: CellCoord,
        /// Kind of trap triggered.
        kind: CellKind,
    },
    /// Reports that Ignorante let a token pass over a trap unharmed.
    TrapIgnored {
        /// Token that ignored the trap.
        token: TokenId,
        /// Cell holding the trap.
        cell: CellCoord,
        /// Kind of trap ignored.
        kind: CellKind,
    },
    /// Reports that a token was relocated by a trap or ability.
    TokenTeleported {
        /// Token that was relocated.
        token: TokenId,
        /// Cell occupied before the relocation.
        from: CellCoord,
        /// Cell occupied after the relocation.
        to: CellCoord,
    },
    /// Reports that a token reached the goal and left its roster.
    TokenFinished {
        /// Player owning the token.
        player: PlayerSlot,
        /// Token that reached the goal.
        token: TokenId,
    },
    /// Reports that the active player's turn has been resolved.
    TurnEnded {
        /// Player whose turn ended.
        player: PlayerSlot,
    },
    /// Reports that Oversoul wore off and a token regained its speed.
    SpeedRestored {
        /// Token whose speed was restored.
        token: TokenId,
        /// Restored movement speed.
        speed: u32,
    },
    /// Announces the winner. No further turns are processed.
    MatchWon {
        /// Player whose roster emptied first.
        winner: PlayerSlot,
    },
    /// Announces that the match ended without a winner.
    MatchAborted,
    /// Reports that a command arrived in the wrong phase.
    CommandRejected {
        /// Command that was refused.
        command: Command,
        /// Phase the match was in.
        reason: PhaseError,
    },
}

/// Cardinal movement directions available to tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(label)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Adjacent cell in the given direction, or `None` when it would underflow.
    ///
    /// The upper bound is not checked; callers compare against grid dimensions.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::Up => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::Down => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::Left => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Right => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Contents of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Impassable cell.
    Wall,
    /// Open floor.
    Path,
    /// Costs one extra movement point to enter.
    TrapSlow,
    /// Petrifies the token that enters it.
    TrapConfusion,
    /// Relocates the token that enters it to a random path cell.
    TrapTeleport,
}

impl CellKind {
    /// Trap kinds placed by the hazard pass.
    pub const HAZARDS: [CellKind; 3] = [
        CellKind::TrapSlow,
        CellKind::TrapConfusion,
        CellKind::TrapTeleport,
    ];

    /// Reports whether tokens may stand on the cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Reports whether the cell triggers an effect on entry.
    #[must_use]
    pub const fn is_trap(self) -> bool {
        matches!(
            self,
            Self::TrapSlow | Self::TrapConfusion | Self::TrapTeleport
        )
    }
}

/// Identifies one of the two seats at the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerSlot {
    /// The player who moves first.
    One,
    /// The player who moves second.
    Two,
}

impl PlayerSlot {
    /// Both seats in turn order.
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    /// The opposing seat.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Zero-based index used for per-player arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// One-based seat number shown to humans.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

/// Unique identifier assigned to a drafted token.
///
/// Drafting is without replacement, so the catalogue index identifies a token
/// for the whole match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(u32);

impl TokenId {
    /// Creates a new token identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match template(*self) {
            Some(entry) => f.write_str(entry.name()),
            None => write!(f, "token #{}", self.0),
        }
    }
}

/// Coarse label for the match phase, used in rejection reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// The match has been prepared but not opened.
    NotStarted,
    /// Waiting for the active player to choose a token.
    AwaitingTokenChoice,
    /// Waiting for the ability decision of the selected token.
    SelectingAbility,
    /// The selected token is spending movement points.
    Moving,
    /// The match has a result.
    Over,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::AwaitingTokenChoice => "awaiting a token choice",
            Self::SelectingAbility => "selecting an ability",
            Self::Moving => "moving",
            Self::Over => "over",
        };
        f.write_str(label)
    }
}

/// Reasons a token choice may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SelectionError {
    /// The index does not name a roster entry.
    #[error("token index {index} is outside the roster of {len}")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Roster length at the time of the request.
        len: usize,
    },
    /// The token cannot move while the effect lasts.
    #[error("{token} cannot move while under {effect}")]
    Immobilized {
        /// Token that was chosen.
        token: TokenId,
        /// Effect keeping it in place.
        effect: StatusEffect,
    },
}

/// Reasons a single step may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum MoveError {
    /// The destination lies outside the grid.
    #[error("the destination is outside the maze")]
    OutOfBounds,
    /// The destination is a wall.
    #[error("the destination is a wall")]
    Wall,
    /// The token already teleported during this movement loop.
    #[error("the token already teleported this turn")]
    TeleportSpent,
}

/// Reasons an ability activation may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum AbilityError {
    /// The ability is still recharging.
    #[error("{ability} is on cooldown for {remaining} more turns")]
    OnCooldown {
        /// Ability requested.
        ability: Ability,
        /// Turns left before it is ready.
        remaining: u32,
    },
}

/// Reports a command that is not valid in the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[error("command not accepted while the match is {phase}")]
pub struct PhaseError {
    phase: PhaseKind,
}

impl PhaseError {
    /// Creates a rejection for the provided phase.
    #[must_use]
    pub const fn new(phase: PhaseKind) -> Self {
        Self { phase }
    }

    /// Phase the match was in when the command arrived.
    #[must_use]
    pub const fn phase(&self) -> PhaseKind {
        self.phase
    }
}

/// Reasons a match configuration is refused before play begins.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Roster size outside `1..=5`.
    #[error("roster size {requested} is outside 1..=5")]
    RosterSize {
        /// Requested size.
        requested: u8,
    },
    /// Grid dimensions below the supported minimum.
    #[error("grid of {width}x{height} is smaller than 3x3")]
    GridTooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A hand-authored layout has rows of differing lengths.
    #[error("layout row {row} does not match the width of the first row")]
    RaggedLayout {
        /// Offending row index.
        row: usize,
    },
    /// A hand-authored layout uses a glyph with no cell kind.
    #[error("layout glyph `{glyph}` does not name a cell kind")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
    },
    /// A difficulty name that matches no preset.
    #[error("unknown difficulty `{name}`")]
    UnknownDifficulty {
        /// Name supplied by the caller.
        name: String,
    },
    /// A pick that matches no catalogue entry.
    #[error("`{name}` is not in the token catalogue")]
    UnknownToken {
        /// Name supplied by the caller.
        name: String,
    },
    /// A token drafted twice.
    #[error("`{name}` has already been drafted")]
    DuplicateToken {
        /// Name supplied by the caller.
        name: String,
    },
    /// A player supplied the wrong number of picks.
    #[error("{player} picked {actual} tokens but the roster size is {expected}")]
    RosterLength {
        /// Player whose picks are wrong.
        player: PlayerSlot,
        /// Roster size configured for the match.
        expected: usize,
        /// Number of picks supplied.
        actual: usize,
    },
    /// Not enough undrafted tokens to fill the rosters.
    #[error("the catalogue cannot supply {needed} more tokens")]
    CatalogExhausted {
        /// Tokens still required.
        needed: usize,
    },
}

/// Read-only view into the maze cells.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellKind],
    width: u32,
    height: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellKind], width: u32, height: u32) -> Self {
        Self {
            cells,
            width,
            height,
        }
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

    /// Goal cell tokens race toward.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        exit_for(self.width, self.height)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Kind of the provided cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether a token may stand on the cell.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.kind(cell).is_some_and(CellKind::is_walkable)
    }

    /// In-bounds orthogonal neighbours of the cell.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + 'a {
        let (width, height) = (self.width, self.height);
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| cell.step(direction))
            .filter(move |next| next.column() < width && next.row() < height)
    }

    /// Iterates over every cell paired with its kind in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + 'a {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % width, index / width), *kind)
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.in_bounds(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a single token used for queries and rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenSnapshot {
    /// Identifier of the token.
    pub id: TokenId,
    /// Display name of the token.
    pub name: &'static str,
    /// Cell currently occupied.
    pub cell: CellCoord,
    /// Current movement speed.
    pub speed: u32,
    /// Speed fixed at draft time.
    pub initial_speed: u32,
    /// Ability offered at the start of each turn.
    pub ability: Ability,
    /// Remaining cooldown of every ability.
    pub cooldowns: Cooldowns,
    /// Remaining duration of every status effect.
    pub statuses: StatusDurations,
}

impl TokenSnapshot {
    /// Effect keeping the token from moving, if any.
    #[must_use]
    pub fn immobilized_by(&self) -> Option<StatusEffect> {
        self.statuses.immobilizing()
    }

    /// Remaining cooldown of the token's default ability.
    #[must_use]
    pub const fn ability_cooldown(&self) -> u32 {
        self.cooldowns.get(self.ability)
    }
}

/// Everything a renderer needs to draw one frame of the match.
#[derive(Clone, Debug)]
pub struct SceneView<'a> {
    /// Maze cells.
    pub grid: GridView<'a>,
    /// Live tokens of player one and player two, in roster order.
    pub rosters: [Vec<TokenSnapshot>; 2],
    /// Names of player one and player two.
    pub player_names: [&'a str; 2],
    /// Player whose turn it is.
    pub active: PlayerSlot,
    /// Difficulty of the match.
    pub difficulty: Difficulty,
}

impl SceneView<'_> {
    /// Live tokens of the given player.
    #[must_use]
    pub fn roster(&self, player: PlayerSlot) -> &[TokenSnapshot] {
        &self.rosters[player.index()]
    }
}

/// Presents the match state. Nothing it does feeds back into the simulation.
pub trait Renderer {
    /// Draws the current scene.
    fn show(&mut self, scene: &SceneView<'_>);

    /// Observes an event emitted by the world.
    fn notify(&mut self, _event: &Event) {}
}

/// Blocking source of human decisions.
pub trait InputSource {
    /// Next directional intent.
    fn ask_direction(&mut self) -> Direction;

    /// Answer to a yes/no prompt.
    fn ask_yes_no(&mut self, prompt: &str) -> bool;

    /// Roster index chosen among `max` entries. May be out of range; the world validates it.
    fn ask_token_index(&mut self, max: usize) -> i64;

    /// Reports whether the human asked to leave the match. Polled between turns.
    fn abort_requested(&mut self) -> bool {
        false
    }
}

/// Fire-and-forget background music.
pub trait AudioService {
    /// Starts the named track.
    fn play(&mut self, track_id: &str);

    /// Stops whatever is playing.
    fn stop(&mut self);
}
