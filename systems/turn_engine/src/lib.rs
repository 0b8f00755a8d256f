#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Blocking match driver that turns human answers into world commands.

use maze_runners_core::{AudioService, Command, Event, InputSource, PlayerSlot, Renderer};
use maze_runners_world::{self as world, query, MatchOutcome, TurnPhase, World};
use tracing::{debug, info};

/// Summary of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchReport {
    /// How the match ended.
    pub outcome: MatchOutcome,
    /// Turns resolved before the match ended.
    pub turns: u32,
}

impl MatchReport {
    /// Winner of the match, if it was not aborted.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerSlot> {
        match self.outcome {
            MatchOutcome::Won(winner) => Some(winner),
            MatchOutcome::Aborted => None,
        }
    }
}

/// Drives a [`World`] to completion using its three collaborators.
///
/// The engine never validates answers itself: every answer becomes a command
/// and the world reports rejections, after which the engine simply asks again.
#[derive(Debug)]
pub struct TurnEngine<I, R, A> {
    input: I,
    renderer: R,
    audio: A,
}

impl<I, R, A> TurnEngine<I, R, A>
where
    I: InputSource,
    R: Renderer,
    A: AudioService,
{
    /// Creates an engine around the provided collaborators.
    #[must_use]
    pub fn new(input: I, renderer: R, audio: A) -> Self {
        Self {
            input,
            renderer,
            audio,
        }
    }

    /// Read-only access to the renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns the collaborators, consuming the engine.
    #[must_use]
    pub fn into_parts(self) -> (I, R, A) {
        (self.input, self.renderer, self.audio)
    }

    /// Plays the match until it is won or aborted.
    ///
    /// Every event the world emits is forwarded to the renderer and appended to
    /// `log` in order.
    pub fn run(&mut self, world: &mut World, log: &mut Vec<Event>) -> MatchReport {
        self.audio.play(query::difficulty(world).track_id());

        let outcome = loop {
            let command = match query::phase(world) {
                TurnPhase::Over(outcome) => break outcome,
                TurnPhase::NotStarted => Command::StartMatch,
                TurnPhase::AwaitingTokenChoice => {
                    if self.input.abort_requested() {
                        Command::AbortMatch
                    } else {
                        self.renderer.show(&query::scene(world));
                        let available = query::roster(world, query::active_player(world)).len();
                        let answer = self.input.ask_token_index(available);
                        Command::SelectToken {
                            index: usize::try_from(answer).unwrap_or(usize::MAX),
                        }
                    }
                }
                TurnPhase::SelectingAbility(context) => {
                    let prompt = match query::token(world, context.token()) {
                        Some((_, token)) => {
                            format!("Use {} with {}?", token.default_ability(), token.name())
                        }
                        None => "Use the ability?".to_owned(),
                    };
                    Command::DecideAbility {
                        activate: self.input.ask_yes_no(&prompt),
                    }
                }
                TurnPhase::Moving(_) => {
                    self.renderer.show(&query::scene(world));
                    Command::StepToken {
                        direction: self.input.ask_direction(),
                    }
                }
            };
            self.dispatch(world, command, log);
        };

        self.renderer.show(&query::scene(world));
        self.audio.stop();

        let report = MatchReport {
            outcome,
            turns: query::turns_completed(world),
        };
        info!(outcome = ?report.outcome, turns = report.turns, "match finished");
        report
    }

    fn dispatch(&mut self, world: &mut World, command: Command, log: &mut Vec<Event>) {
        debug!(?command, "dispatching command");
        let first = log.len();
        world::apply(world, command, log);
        for event in &log[first..] {
            self.renderer.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_runners_core::{Difficulty, Direction, MatchConfig, RosterSize, SceneView};

    #[derive(Default)]
    struct Silent;

    impl Renderer for Silent {
        fn show(&mut self, _scene: &SceneView<'_>) {}
    }

    impl AudioService for Silent {
        fn play(&mut self, _track_id: &str) {}
        fn stop(&mut self) {}
    }

    struct Quitter;

    impl InputSource for Quitter {
        fn ask_direction(&mut self) -> Direction {
            Direction::Down
        }

        fn ask_yes_no(&mut self, _prompt: &str) -> bool {
            false
        }

        fn ask_token_index(&mut self, _max: usize) -> i64 {
            0
        }

        fn abort_requested(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn abort_before_the_first_choice_ends_without_winner() {
        let mut world = maze_runners_system_bootstrap::Bootstrap
            .prepare(
                &MatchConfig::new(
                    ["A".to_owned(), "B".to_owned()],
                    RosterSize::new(1).expect("valid size"),
                    Difficulty::Tutorial,
                ),
                5,
            )
            .expect("valid config");
        let mut engine = TurnEngine::new(Quitter, Silent, Silent);
        let mut log = Vec::new();

        let report = engine.run(&mut world, &mut log);

        assert_eq!(report.outcome, MatchOutcome::Aborted);
        assert_eq!(report.winner(), None);
        assert_eq!(log.last(), Some(&Event::MatchAborted));
    }
}
