//! Turn phases and single-step movement resolution.

use maze_runners_core::{
    CellKind, Direction, Event, MoveError, PhaseKind, PlayerSlot, StatusEffect, TokenId,
    PETRIFICATION_TURNS,
};
use rand::Rng;
use tracing::debug;

use crate::{Grid, Token};

/// State of the token currently taking its turn.
///
/// Threaded by value through every step so each command sees exactly the
/// counters the previous one left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TurnContext {
    token: TokenId,
    roster_index: usize,
    moves_remaining: u32,
    teleported: bool,
}

impl TurnContext {
    pub(crate) const fn new(token: TokenId, roster_index: usize, moves: u32) -> Self {
        Self {
            token,
            roster_index,
            moves_remaining: moves,
            teleported: false,
        }
    }

    /// Token taking the turn.
    #[must_use]
    pub const fn token(&self) -> TokenId {
        self.token
    }

    /// Position of the token within its owner's roster.
    #[must_use]
    pub const fn roster_index(&self) -> usize {
        self.roster_index
    }

    /// Movement points left this turn.
    #[must_use]
    pub const fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    /// Whether a teleport trap already fired during this movement loop.
    #[must_use]
    pub const fn teleported(&self) -> bool {
        self.teleported
    }

    pub(crate) fn add_moves(self, bonus: u32) -> Self {
        Self {
            moves_remaining: self.moves_remaining.saturating_add(bonus),
            ..self
        }
    }
}

/// How a match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    /// The player's roster emptied first.
    Won(PlayerSlot),
    /// The match was abandoned between turns.
    Aborted,
}

/// Phase of the match state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// Prepared but not opened.
    NotStarted,
    /// Waiting for the active player to choose a token.
    AwaitingTokenChoice,
    /// Waiting for the decision on the selected token's ability.
    SelectingAbility(TurnContext),
    /// The selected token is spending movement points.
    Moving(TurnContext),
    /// Finished; no further commands change state.
    Over(MatchOutcome),
}

impl TurnPhase {
    /// Coarse label used in rejection reports.
    #[must_use]
    pub const fn kind(&self) -> PhaseKind {
        match self {
            Self::NotStarted => PhaseKind::NotStarted,
            Self::AwaitingTokenChoice => PhaseKind::AwaitingTokenChoice,
            Self::SelectingAbility(_) => PhaseKind::SelectingAbility,
            Self::Moving(_) => PhaseKind::Moving,
            Self::Over(_) => PhaseKind::Over,
        }
    }

    /// Context of the token mid-turn, if any.
    #[must_use]
    pub const fn context(&self) -> Option<TurnContext> {
        match self {
            Self::SelectingAbility(context) | Self::Moving(context) => Some(*context),
            _ => None,
        }
    }
}

/// What a single step did to the movement loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// The loop goes on with the returned context. Rejected steps return it unchanged.
    Continue(TurnContext),
    /// The token stepped onto the goal.
    Finished,
    /// Movement points ran out or a trap ended the loop.
    Exhausted,
}

/// Resolves one directional intent for `token`.
pub(crate) fn resolve_step<R: Rng + ?Sized>(
    grid: &Grid,
    token: &mut Token,
    context: TurnContext,
    direction: Direction,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> StepOutcome {
    let id = token.id();
    let reject = |reason: MoveError, out_events: &mut Vec<Event>| {
        debug!(token = %id, %direction, %reason, "step rejected");
        out_events.push(Event::StepRejected {
            token: id,
            direction,
            reason,
        });
        StepOutcome::Continue(context)
    };

    let Some(target) = grid.neighbor(token.cell(), direction) else {
        return reject(MoveError::OutOfBounds, out_events);
    };
    let Some(kind) = grid.kind(target).filter(|kind| kind.is_walkable()) else {
        return reject(MoveError::Wall, out_events);
    };

    let from = token.cell();
    if target == grid.exit() {
        token.place(target);
        out_events.push(Event::TokenStepped {
            token: id,
            from,
            to: target,
            moves_remaining: context.moves_remaining.saturating_sub(1),
        });
        return StepOutcome::Finished;
    }

    let ignoring = token.statuses().is_active(StatusEffect::Ignorante);
    if !ignoring && kind == CellKind::TrapTeleport && context.teleported {
        return reject(MoveError::TeleportSpent, out_events);
    }

    token.place(target);

    let mut next = context;
    let cost = match kind {
        _ if ignoring => 1,
        CellKind::TrapSlow => 2,
        CellKind::TrapTeleport => 0,
        CellKind::TrapConfusion => context.moves_remaining,
        CellKind::Path | CellKind::Wall => 1,
    };
    next.moves_remaining = next.moves_remaining.saturating_sub(cost);
    out_events.push(Event::TokenStepped {
        token: id,
        from,
        to: target,
        moves_remaining: next.moves_remaining,
    });

    if kind.is_trap() {
        if ignoring {
            out_events.push(Event::TrapIgnored {
                token: id,
                cell: target,
                kind,
            });
        } else {
            out_events.push(Event::TrapTriggered {
                token: id,
                cell: target,
                kind,
            });
            match kind {
                CellKind::TrapConfusion => {
                    token.apply_status(StatusEffect::Petrification, PETRIFICATION_TURNS);
                    out_events.push(Event::EffectApplied {
                        token: id,
                        effect: StatusEffect::Petrification,
                        turns: PETRIFICATION_TURNS,
                    });
                    return StepOutcome::Exhausted;
                }
                CellKind::TrapTeleport => {
                    next.teleported = true;
                    if let Some(landing) = grid.random_path_cell(rng) {
                        token.place(landing);
                        out_events.push(Event::TokenTeleported {
                            token: id,
                            from: target,
                            to: landing,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    if next.moves_remaining == 0 {
        StepOutcome::Exhausted
    } else {
        StepOutcome::Continue(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_runners_core::{Ability, CellCoord, ENTRY};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // Row 1: entry, slow, confusion, teleport, path. Row 3 leads to the exit.
    const CORRIDOR: [&str; 5] = ["#######", "#.sct.#", "#.....#", "#..t..#", "#######"];

    fn walker(speed: u32) -> (Token, TurnContext) {
        let token = Token::new(TokenId::new(0), "Walker", speed, Ability::Agilidad, ENTRY);
        let context = TurnContext::new(token.id(), 0, speed);
        (token, context)
    }

    fn step(
        grid: &Grid,
        token: &mut Token,
        context: TurnContext,
        direction: Direction,
    ) -> (StepOutcome, Vec<Event>) {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut events = Vec::new();
        let outcome = resolve_step(grid, token, context, direction, &mut rng, &mut events);
        (outcome, events)
    }

    #[test]
    fn walls_and_edges_cost_nothing() {
        let grid = Grid::from_rows(&CORRIDOR).expect("layout parses");
        let (mut token, context) = walker(3);

        let (outcome, events) = step(&grid, &mut token, context, Direction::Up);
        assert_eq!(outcome, StepOutcome::Continue(context));
        assert_eq!(token.cell(), ENTRY);
        assert!(matches!(
            events.as_slice(),
            [Event::StepRejected {
                reason: MoveError::Wall,
                ..
            }]
        ));

        let mut corner = Token::new(TokenId::new(1), "Corner", 3, Ability::Agilidad, CellCoord::new(0, 0));
        let (outcome, events) = step(&grid, &mut corner, context, Direction::Left);
        assert_eq!(outcome, StepOutcome::Continue(context));
        assert!(matches!(
            events.as_slice(),
            [Event::StepRejected {
                reason: MoveError::OutOfBounds,
                ..
            }]
        ));
    }

    #[test]
    fn slow_trap_charges_two_points() {
        let grid = Grid::from_rows(&CORRIDOR).expect("layout parses");
        let (mut token, context) = walker(3);

        let (outcome, _) = step(&grid, &mut token, context, Direction::Right);

        let StepOutcome::Continue(next) = outcome else {
            panic!("loop should continue, got {outcome:?}");
        };
        assert_eq!(next.moves_remaining(), 1);
        assert_eq!(token.cell(), CellCoord::new(2, 1));
    }

    #[test]
    fn confusion_trap_petrifies_and_ends_the_loop() {
        let grid = Grid::from_rows(&CORRIDOR).expect("layout parses");
        let mut token = Token::new(TokenId::new(0), "Walker", 5, Ability::Agilidad, CellCoord::new(2, 2));
        let context = TurnContext::new(token.id(), 0, 5);

        let (outcome, _) = step(&grid, &mut token, context, Direction::Right);
        let StepOutcome::Continue(next) = outcome else {
            panic!("loop should continue, got {outcome:?}");
        };
        assert_eq!(next.moves_remaining(), 4);

        let mut token = Token::new(TokenId::new(0), "Walker", 5, Ability::Agilidad, CellCoord::new(3, 2));
        let (outcome, _) = step(&grid, &mut token, context, Direction::Up);
        assert_eq!(outcome, StepOutcome::Exhausted);
        assert_eq!(token.immobilized_by(), Some(StatusEffect::Petrification));
        assert_eq!(token.statuses().get(StatusEffect::Petrification), PETRIFICATION_TURNS);
    }

    #[test]
    fn teleport_is_free_and_fires_once_per_loop() {
        let grid = Grid::from_rows(&CORRIDOR).expect("layout parses");
        let mut token = Token::new(TokenId::new(0), "Walker", 4, Ability::Agilidad, CellCoord::new(3, 2));
        let context = TurnContext::new(token.id(), 0, 4);

        let (outcome, events) = step(&grid, &mut token, context, Direction::Down);
        let StepOutcome::Continue(next) = outcome else {
            panic!("loop should continue, got {outcome:?}");
        };
        assert_eq!(next.moves_remaining(), 4);
        assert!(next.teleported());
        assert_eq!(grid.kind(token.cell()), Some(CellKind::Path));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TokenTeleported { .. })));

        let mut again = Token::new(TokenId::new(0), "Walker", 4, Ability::Agilidad, CellCoord::new(3, 2));
        let (outcome, events) = step(&grid, &mut again, next, Direction::Down);
        assert_eq!(outcome, StepOutcome::Continue(next));
        assert_eq!(again.cell(), CellCoord::new(3, 2));
        assert!(matches!(
            events.as_slice(),
            [Event::StepRejected {
                reason: MoveError::TeleportSpent,
                ..
            }]
        ));
    }

    #[test]
    fn ignorante_walks_over_traps_at_base_cost() {
        let grid = Grid::from_rows(&CORRIDOR).expect("layout parses");
        let (mut token, context) = walker(3);
        token.apply_status(StatusEffect::Ignorante, 1);

        let (outcome, events) = step(&grid, &mut token, context, Direction::Right);
        let StepOutcome::Continue(next) = outcome else {
            panic!("loop should continue, got {outcome:?}");
        };
        assert_eq!(next.moves_remaining(), 2);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TrapIgnored { kind: CellKind::TrapSlow, .. })));

        let (outcome, _) = step(&grid, &mut token, next, Direction::Right);
        assert!(matches!(outcome, StepOutcome::Continue(_)));
        assert_eq!(token.immobilized_by(), None);
    }

    #[test]
    fn goal_cell_finishes_without_trap_resolution() {
        let grid = Grid::from_rows(&CORRIDOR).expect("layout parses");
        let exit = grid.exit();
        let mut token = Token::new(TokenId::new(0), "Walker", 2, Ability::Agilidad, CellCoord::new(exit.column() - 1, exit.row()));
        let context = TurnContext::new(token.id(), 0, 2);

        let (outcome, _) = step(&grid, &mut token, context, Direction::Right);
        assert_eq!(outcome, StepOutcome::Finished);
        assert_eq!(token.cell(), exit);
    }

    #[test]
    fn last_point_spent_exhausts_the_loop() {
        let grid = Grid::from_rows(&CORRIDOR).expect("layout parses");
        let (mut token, context) = walker(1);

        let (outcome, _) = step(&grid, &mut token, context, Direction::Down);
        assert_eq!(outcome, StepOutcome::Exhausted);
    }
}
