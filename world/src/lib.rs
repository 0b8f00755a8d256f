#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Maze Runners.
//!
//! The [`World`] owns the grid, both players and the single random source.
//! Every mutation goes through [`apply`]; read access goes through [`query`].

mod grid;
mod navigation;
mod token;
mod turn;

use maze_runners_core::{Command, Difficulty, Direction, Event, PhaseError, PlayerSlot, SelectionError};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use grid::Grid;
pub use navigation::DistanceField;
pub use token::{AbilityOutcome, Player, Token};
pub use turn::{MatchOutcome, TurnContext, TurnPhase};

use turn::{resolve_step, StepOutcome};

/// Represents one match: the grid, both players and whose turn it is.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    players: [Player; 2],
    difficulty: Difficulty,
    active: PlayerSlot,
    phase: TurnPhase,
    turns_completed: u32,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a match ready to be opened with [`Command::StartMatch`].
    ///
    /// `rng` drives every random decision taken after setup: teleport
    /// landings and Lullaby targets.
    #[must_use]
    pub fn new(grid: Grid, players: [Player; 2], difficulty: Difficulty, rng: ChaCha8Rng) -> Self {
        Self {
            grid,
            players,
            difficulty,
            active: PlayerSlot::One,
            phase: TurnPhase::NotStarted,
            turns_completed: 0,
            rng,
        }
    }

    fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        info!(
            difficulty = %self.difficulty,
            width = self.grid.width(),
            height = self.grid.height(),
            "match started"
        );
        out_events.push(Event::MatchStarted {
            difficulty: self.difficulty,
            width: self.grid.width(),
            height: self.grid.height(),
        });
        self.hand_turn_to(PlayerSlot::One, out_events);
    }

    /// Gives the turn to `slot`, skipping players whose tokens are all immobilized.
    ///
    /// A skipped turn still counts as that player's turn for effect expiry,
    /// so the loop terminates once the shortest immobilizing effect runs out.
    fn hand_turn_to(&mut self, slot: PlayerSlot, out_events: &mut Vec<Event>) {
        let mut candidate = slot;
        while self.players[candidate.index()].all_immobilized() {
            info!(player = %candidate, "turn skipped, every token is immobilized");
            out_events.push(Event::TurnSkipped { player: candidate });
            self.player_mut(candidate).end_of_turn(out_events);
            candidate = candidate.other();
        }

        self.active = candidate;
        self.phase = TurnPhase::AwaitingTokenChoice;
        debug!(player = %candidate, "turn started");
        out_events.push(Event::TurnStarted { player: candidate });
    }

    fn select(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let player = self.active;
        let roster = self.players[player.index()].roster();
        let len = roster.len();

        let Some(token) = roster.get(index) else {
            self.reject_selection(SelectionError::OutOfRange { index, len }, out_events);
            return;
        };

        if let Some(effect) = token.immobilized_by() {
            let reason = SelectionError::Immobilized {
                token: token.id(),
                effect,
            };
            self.reject_selection(reason, out_events);
            return;
        }

        let context = TurnContext::new(token.id(), index, token.speed());
        debug!(%player, token = token.name(), moves = token.speed(), "token selected");
        out_events.push(Event::TokenSelected {
            player,
            token: token.id(),
            moves: token.speed(),
        });

        if token.ability_ready() {
            out_events.push(Event::AbilityOffered {
                token: token.id(),
                ability: token.default_ability(),
            });
            self.phase = TurnPhase::SelectingAbility(context);
        } else {
            self.enter_moving(context, out_events);
        }
    }

    fn reject_selection(&mut self, reason: SelectionError, out_events: &mut Vec<Event>) {
        warn!(player = %self.active, %reason, "selection rejected");
        out_events.push(Event::SelectionRejected {
            player: self.active,
            reason,
        });
    }

    fn decide(&mut self, context: TurnContext, activate: bool, out_events: &mut Vec<Event>) {
        let mut context = context;
        if activate {
            let (acting, rivals) = split_players(&mut self.players, self.active);
            let Some(token) = acting.roster_mut().get_mut(context.roster_index()) else {
                self.finish_turn(out_events);
                return;
            };

            let ability = token.default_ability();
            match token.use_ability(
                ability,
                rivals.roster_mut(),
                &mut self.grid,
                &mut self.rng,
                out_events,
            ) {
                Ok(outcome) => context = context.add_moves(outcome.bonus_moves),
                Err(reason) => {
                    warn!(token = %context.token(), %reason, "ability rejected");
                    out_events.push(Event::AbilityRejected {
                        token: context.token(),
                        reason,
                    });
                }
            }
        }

        self.enter_moving(context, out_events);
    }

    fn enter_moving(&mut self, context: TurnContext, out_events: &mut Vec<Event>) {
        if context.moves_remaining() == 0 {
            self.finish_turn(out_events);
        } else {
            self.phase = TurnPhase::Moving(context);
        }
    }

    fn step(
        &mut self,
        context: TurnContext,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let player = self.active;
        let roster = self.players[player.index()].roster_mut();
        let Some(token) = roster.get_mut(context.roster_index()) else {
            self.finish_turn(out_events);
            return;
        };

        match resolve_step(
            &self.grid,
            token,
            context,
            direction,
            &mut self.rng,
            out_events,
        ) {
            StepOutcome::Continue(next) => self.phase = TurnPhase::Moving(next),
            StepOutcome::Exhausted => self.finish_turn(out_events),
            StepOutcome::Finished => {
                let finished = roster.remove(context.roster_index());
                info!(%player, token = finished.name(), "token reached the goal");
                out_events.push(Event::TokenFinished {
                    player,
                    token: finished.id(),
                });

                if roster.is_empty() {
                    info!(winner = %player, "match won");
                    self.phase = TurnPhase::Over(MatchOutcome::Won(player));
                    out_events.push(Event::MatchWon { winner: player });
                } else {
                    self.finish_turn(out_events);
                }
            }
        }
    }

    fn finish_turn(&mut self, out_events: &mut Vec<Event>) {
        let acting = self.active;
        self.player_mut(acting).end_of_turn(out_events);
        self.turns_completed = self.turns_completed.saturating_add(1);
        out_events.push(Event::TurnEnded { player: acting });

        let next = if self.players[acting.index()].has_extra_turn() {
            self.player_mut(acting).set_extra_turn(false);
            info!(player = %acting, "extra turn taken");
            out_events.push(Event::ExtraTurnTaken { player: acting });
            acting
        } else {
            acting.other()
        };

        self.hand_turn_to(next, out_events);
    }

    fn abort(&mut self, out_events: &mut Vec<Event>) {
        info!("match aborted");
        self.phase = TurnPhase::Over(MatchOutcome::Aborted);
        out_events.push(Event::MatchAborted);
    }
}

fn split_players(players: &mut [Player; 2], active: PlayerSlot) -> (&mut Player, &mut Player) {
    let [one, two] = players;
    match active {
        PlayerSlot::One => (one, two),
        PlayerSlot::Two => (two, one),
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that do not fit the current phase change nothing and are
/// reported through [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    debug!(?command, phase = %world.phase.kind(), "applying command");
    match (command, world.phase) {
        (Command::StartMatch, TurnPhase::NotStarted) => world.start(out_events),
        (Command::SelectToken { index }, TurnPhase::AwaitingTokenChoice) => {
            world.select(index, out_events);
        }
        (Command::DecideAbility { activate }, TurnPhase::SelectingAbility(context)) => {
            world.decide(context, activate, out_events);
        }
        (Command::StepToken { direction }, TurnPhase::Moving(context)) => {
            world.step(context, direction, out_events);
        }
        (Command::GrantExtraTurn { player }, phase)
            if !matches!(phase, TurnPhase::Over(_)) =>
        {
            debug!(%player, "extra turn granted");
            world.player_mut(player).set_extra_turn(true);
        }
        (Command::AbortMatch, TurnPhase::AwaitingTokenChoice) => world.abort(out_events),
        (command, phase) => {
            let reason = PhaseError::new(phase.kind());
            warn!(?command, %reason, "command rejected");
            out_events.push(Event::CommandRejected { command, reason });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_runners_core::{Difficulty, PlayerSlot, SceneView, TokenId};

    use super::{Grid, MatchOutcome, Player, Token, TurnContext, TurnPhase, World};

    /// Provides read-only access to the maze grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Current phase of the match.
    #[must_use]
    pub fn phase(world: &World) -> TurnPhase {
        world.phase
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn active_player(world: &World) -> PlayerSlot {
        world.active
    }

    /// Provides read-only access to a player.
    #[must_use]
    pub fn player(world: &World, slot: PlayerSlot) -> &Player {
        &world.players[slot.index()]
    }

    /// Live tokens of a player in roster order.
    #[must_use]
    pub fn roster(world: &World, slot: PlayerSlot) -> &[Token] {
        world.players[slot.index()].roster()
    }

    /// Locates a live token and its owner.
    #[must_use]
    pub fn token(world: &World, id: TokenId) -> Option<(PlayerSlot, &Token)> {
        PlayerSlot::ALL.into_iter().find_map(|slot| {
            roster(world, slot)
                .iter()
                .find(|token| token.id() == id)
                .map(|token| (slot, token))
        })
    }

    /// Context of the token taking its turn, if one is selected.
    #[must_use]
    pub fn current_turn(world: &World) -> Option<TurnContext> {
        world.phase.context()
    }

    /// Movement points left to the selected token.
    #[must_use]
    pub fn moves_remaining(world: &World) -> Option<u32> {
        current_turn(world).map(|context| context.moves_remaining())
    }

    /// Difficulty the match was set up with.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Number of turns resolved so far. Skipped turns are not counted.
    #[must_use]
    pub fn turns_completed(world: &World) -> u32 {
        world.turns_completed
    }

    /// Winner of the match, once decided.
    #[must_use]
    pub fn winner(world: &World) -> Option<PlayerSlot> {
        match world.phase {
            TurnPhase::Over(MatchOutcome::Won(winner)) => Some(winner),
            _ => None,
        }
    }

    /// Reports whether the match has ended.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        matches!(world.phase, TurnPhase::Over(_))
    }

    /// Captures everything a renderer needs for one frame.
    #[must_use]
    pub fn scene(world: &World) -> SceneView<'_> {
        let snapshots = |slot: PlayerSlot| {
            roster(world, slot)
                .iter()
                .map(Token::snapshot)
                .collect::<Vec<_>>()
        };
        SceneView {
            grid: world.grid.view(),
            rosters: [snapshots(PlayerSlot::One), snapshots(PlayerSlot::Two)],
            player_names: [world.players[0].name(), world.players[1].name()],
            active: world.active,
            difficulty: world.difficulty,
        }
    }
}
