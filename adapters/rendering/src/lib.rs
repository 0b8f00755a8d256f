#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Plain-text presentation of Maze Runners matches.

use std::{
    fmt::Write as _,
    io::{self, Write},
};

use anyhow::{Context, Result as AnyResult};
use maze_runners_core::{CellCoord, CellKind, Event, PlayerSlot, Renderer, SceneView};
use tracing::warn;

/// Glyph drawn for walls.
pub const WALL_GLYPH: char = '#';
/// Glyph drawn for open cells and for traps hidden by the difficulty.
pub const PATH_GLYPH: char = '.';
/// Glyph drawn on the entry when no token stands there.
pub const ENTRY_GLYPH: char = 'E';
/// Glyph drawn on the goal.
pub const GOAL_GLYPH: char = 'G';
/// Glyph drawn where tokens of both players share a cell.
pub const SHARED_GLYPH: char = '*';

/// [`Renderer`] writing the board, the active roster and event narration to a writer.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
    narrate: bool,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer that draws frames and narrates events.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out, narrate: true }
    }

    /// Creates a renderer that only draws frames.
    #[must_use]
    pub fn quiet(out: W) -> Self {
        Self {
            out,
            narrate: false,
        }
    }

    /// Flushes pending output and returns the writer.
    pub fn finish(mut self) -> AnyResult<W> {
        self.out
            .flush()
            .context("failed to flush rendered output")?;
        Ok(self.out)
    }

    fn write(&mut self, text: &str) {
        if let Err(error) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            report_write_error(&error);
        }
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn show(&mut self, scene: &SceneView<'_>) {
        let frame = render_scene(scene);
        self.write(&frame);
    }

    fn notify(&mut self, event: &Event) {
        if !self.narrate {
            return;
        }
        if let Some(line) = describe(event) {
            self.write(&format!("{line}\n"));
        }
    }
}

fn report_write_error(error: &io::Error) {
    warn!(%error, "failed to write frame");
}

/// Draws the board followed by the active player's roster table.
#[must_use]
pub fn render_scene(scene: &SceneView<'_>) -> String {
    let mut frame = render_board(scene);
    frame.push('\n');
    frame.push_str(&render_roster(scene));
    frame
}

/// Draws the maze with tokens on top.
#[must_use]
pub fn render_board(scene: &SceneView<'_>) -> String {
    let grid = scene.grid;
    let capacity = (grid.width() as usize + 1) * grid.height() as usize;
    let mut board = String::with_capacity(capacity);

    for row in 0..grid.height() {
        for column in 0..grid.width() {
            board.push(cell_glyph(scene, CellCoord::new(column, row)));
        }
        board.push('\n');
    }
    board
}

fn cell_glyph(scene: &SceneView<'_>, cell: CellCoord) -> char {
    let occupied = |slot: PlayerSlot| scene.roster(slot).iter().any(|token| token.cell == cell);
    match (occupied(PlayerSlot::One), occupied(PlayerSlot::Two)) {
        (true, true) => return SHARED_GLYPH,
        (true, false) => return '1',
        (false, true) => return '2',
        (false, false) => {}
    }

    if cell == scene.grid.exit() {
        return GOAL_GLYPH;
    }
    if cell == scene.grid.entry() {
        return ENTRY_GLYPH;
    }

    match scene.grid.kind(cell) {
        Some(CellKind::Wall) | None => WALL_GLYPH,
        Some(CellKind::Path) => PATH_GLYPH,
        Some(trap) if scene.difficulty.reveals_traps() => trap_glyph(trap),
        Some(_) => PATH_GLYPH,
    }
}

fn trap_glyph(kind: CellKind) -> char {
    match kind {
        CellKind::TrapSlow => 's',
        CellKind::TrapConfusion => 'c',
        CellKind::TrapTeleport => 't',
        CellKind::Wall => WALL_GLYPH,
        CellKind::Path => PATH_GLYPH,
    }
}

/// Table of the active player's live tokens.
#[must_use]
pub fn render_roster(scene: &SceneView<'_>) -> String {
    let active = scene.active;
    let mut table = String::new();
    let _ = writeln!(
        table,
        "{} ({active}) to move",
        scene.player_names[active.index()]
    );
    let _ = writeln!(
        table,
        "{:>3}  {:<11} {:<9} {:>5}  {:<15} {:<9} {}",
        "#", "Token", "Cell", "Speed", "Ability", "Cooldown", "Status"
    );

    for (index, token) in scene.roster(active).iter().enumerate() {
        let cooldown = match token.ability_cooldown() {
            0 => "ready".to_owned(),
            turns => format!("{turns} turns"),
        };
        let status = token
            .immobilized_by()
            .map_or_else(|| "-".to_owned(), |effect| format!("{effect} (stuck)"));
        let _ = writeln!(
            table,
            "{index:>3}  {:<11} {:<9} {:>5}  {:<15} {cooldown:<9} {status}",
            token.name,
            token.cell.to_string(),
            format!("{}/{}", token.speed, token.initial_speed),
            token.ability.to_string(),
        );
    }
    table
}

/// One line of narration for the events a player cares about.
#[must_use]
pub fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::MatchStarted {
            difficulty,
            width,
            height,
        } => format!("{difficulty} match on a {width}x{height} maze"),
        Event::TurnSkipped { player } => format!("{player} cannot move and is skipped"),
        Event::ExtraTurnTaken { player } => format!("{player} takes an extra turn"),
        Event::SelectionRejected { reason, .. } => format!("cannot pick that token: {reason}"),
        Event::AbilityUsed { token, ability, .. } => format!("{token} uses {ability}"),
        Event::EffectApplied {
            token,
            effect,
            turns,
        } => format!("{token} is affected by {effect} for {turns} turns"),
        Event::EffectResisted { token, ability } => format!("{token} resists {ability}"),
        Event::TrapPlaced { cell, .. } => format!("a trap is hidden at {cell}"),
        Event::StepRejected { reason, .. } => format!("cannot move there: {reason}"),
        Event::TrapTriggered { token, kind, .. } => {
            format!("{token} stepped on a {}", trap_name(*kind))
        }
        Event::TrapIgnored { token, kind, .. } => {
            format!("{token} ignores a {}", trap_name(*kind))
        }
        Event::TokenTeleported { token, to, .. } => format!("{token} is teleported to {to}"),
        Event::TokenFinished { player, token } => {
            format!("{token} of {player} reached the goal")
        }
        Event::SpeedRestored { token, speed } => format!("{token} runs at speed {speed} again"),
        Event::MatchWon { winner } => format!("{winner} wins the race"),
        Event::MatchAborted => "match abandoned".to_owned(),
        _ => return None,
    };
    Some(line)
}

fn trap_name(kind: CellKind) -> &'static str {
    match kind {
        CellKind::TrapSlow => "slowing trap",
        CellKind::TrapConfusion => "confusion trap",
        CellKind::TrapTeleport => "teleport trap",
        CellKind::Wall | CellKind::Path => "plain cell",
    }
}
