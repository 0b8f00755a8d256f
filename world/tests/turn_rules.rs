use maze_runners_core::{
    Ability, CellCoord, CellKind, Command, Difficulty, Direction, Event, MoveError, PhaseError,
    PhaseKind, PlayerSlot, SelectionError, StatusEffect, TokenId, ENTRY,
};
use maze_runners_world::{self as world, query, Grid, MatchOutcome, Player, Token, TurnPhase, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Entry at (1, 1), exit at (3, 3), slow trap at (2, 1).
const LAYOUT: [&str; 5] = ["#####", "#.s.#", "#.#.#", "#...#", "#####"];

fn token(id: u32, speed: u32, ability: Ability) -> Token {
    Token::new(TokenId::new(id), "Piece", speed, ability, ENTRY)
}

fn world_with(first: Vec<Token>, second: Vec<Token>) -> World {
    let grid = Grid::from_rows(&LAYOUT).expect("layout parses");
    World::new(
        grid,
        [Player::new("Ash", first), Player::new("Misty", second)],
        Difficulty::Normal,
        ChaCha8Rng::seed_from_u64(42),
    )
}

fn run(world: &mut World, commands: &[Command]) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, *command, &mut events);
    }
    events
}

#[test]
fn start_hands_the_first_turn_to_player_one() {
    let mut world = world_with(vec![token(0, 2, Ability::Agilidad)], vec![token(1, 2, Ability::Agilidad)]);

    let events = run(&mut world, &[Command::StartMatch]);

    assert_eq!(
        events,
        vec![
            Event::MatchStarted {
                difficulty: Difficulty::Normal,
                width: 5,
                height: 5
            },
            Event::TurnStarted {
                player: PlayerSlot::One
            },
        ]
    );
    assert_eq!(query::phase(&world), TurnPhase::AwaitingTokenChoice);
}

#[test]
fn sole_token_reaching_the_goal_wins_immediately() {
    let mut first = token(0, 5, Ability::Agilidad);
    first.set_cooldown(Ability::Agilidad, 2);
    let mut world = world_with(vec![first], vec![token(1, 2, Ability::Agilidad)]);

    let events = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::StepToken {
                direction: Direction::Down,
            },
            Command::StepToken {
                direction: Direction::Down,
            },
            Command::StepToken {
                direction: Direction::Right,
            },
            Command::StepToken {
                direction: Direction::Right,
            },
        ],
    );

    assert_eq!(query::winner(&world), Some(PlayerSlot::One));
    assert!(query::is_over(&world));
    assert_eq!(query::turns_completed(&world), 0);
    assert_eq!(
        events.last(),
        Some(&Event::MatchWon {
            winner: PlayerSlot::One
        })
    );
    assert!(events.contains(&Event::TokenFinished {
        player: PlayerSlot::One,
        token: TokenId::new(0)
    }));
    assert!(query::roster(&world, PlayerSlot::One).is_empty());

    let after = run(&mut world, &[Command::SelectToken { index: 0 }]);
    assert_eq!(
        after,
        vec![Event::CommandRejected {
            command: Command::SelectToken { index: 0 },
            reason: PhaseError::new(PhaseKind::Over)
        }]
    );
}

#[test]
fn slow_trap_costs_two_points_for_one_step() {
    let mut world = world_with(vec![token(0, 3, Ability::Agilidad)], vec![token(1, 2, Ability::Agilidad)]);

    let _ = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::DecideAbility { activate: false },
            Command::StepToken {
                direction: Direction::Right,
            },
        ],
    );

    assert_eq!(query::moves_remaining(&world), Some(1));
    let (_, moved) = query::token(&world, TokenId::new(0)).expect("token in play");
    assert_eq!(moved.cell(), CellCoord::new(2, 1));
}

#[test]
fn rejected_steps_keep_the_move_budget() {
    let mut world = world_with(vec![token(0, 2, Ability::Agilidad)], vec![token(1, 2, Ability::Agilidad)]);

    let events = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::DecideAbility { activate: false },
            Command::StepToken {
                direction: Direction::Up,
            },
            Command::StepToken {
                direction: Direction::Left,
            },
        ],
    );

    assert_eq!(query::moves_remaining(&world), Some(2));
    let rejections: Vec<MoveError> = events
        .iter()
        .filter_map(|event| match event {
            Event::StepRejected { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert_eq!(rejections, vec![MoveError::Wall, MoveError::Wall]);
}

#[test]
fn selection_is_validated_before_the_turn_begins() {
    let mut frozen = token(0, 2, Ability::Agilidad);
    frozen.apply_status(StatusEffect::Lullaby, 2);
    let mut world = world_with(
        vec![frozen, token(2, 2, Ability::Agilidad)],
        vec![token(1, 2, Ability::Agilidad)],
    );

    let events = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 7 },
            Command::SelectToken { index: 0 },
        ],
    );

    assert!(events.contains(&Event::SelectionRejected {
        player: PlayerSlot::One,
        reason: SelectionError::OutOfRange { index: 7, len: 2 }
    }));
    assert!(events.contains(&Event::SelectionRejected {
        player: PlayerSlot::One,
        reason: SelectionError::Immobilized {
            token: TokenId::new(0),
            effect: StatusEffect::Lullaby
        }
    }));
    assert_eq!(query::phase(&world), TurnPhase::AwaitingTokenChoice);

    let events = run(&mut world, &[Command::SelectToken { index: 1 }]);
    assert!(matches!(events.first(), Some(Event::TokenSelected { .. })));
}

#[test]
fn fully_immobilized_player_is_skipped() {
    let mut world = world_with(
        vec![token(0, 1, Ability::Ventisca)],
        vec![token(1, 1, Ability::Agilidad), token(2, 1, Ability::Agilidad)],
    );

    let events = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::DecideAbility { activate: true },
            Command::StepToken {
                direction: Direction::Down,
            },
        ],
    );

    assert!(events.contains(&Event::TurnSkipped {
        player: PlayerSlot::Two
    }));
    assert_eq!(query::active_player(&world), PlayerSlot::One);
    assert_eq!(
        events.last(),
        Some(&Event::TurnStarted {
            player: PlayerSlot::One
        })
    );
    for rival in query::roster(&world, PlayerSlot::Two) {
        assert_eq!(rival.immobilized_by(), None);
    }
}

#[test]
fn extra_turn_keeps_the_same_player() {
    let mut world = world_with(vec![token(0, 1, Ability::Agilidad)], vec![token(1, 1, Ability::Agilidad)]);

    let events = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::GrantExtraTurn {
                player: PlayerSlot::One,
            },
            Command::SelectToken { index: 0 },
            Command::DecideAbility { activate: false },
            Command::StepToken {
                direction: Direction::Down,
            },
        ],
    );

    assert!(events.contains(&Event::ExtraTurnTaken {
        player: PlayerSlot::One
    }));
    assert_eq!(query::active_player(&world), PlayerSlot::One);
    assert!(!query::player(&world, PlayerSlot::One).has_extra_turn());
}

#[test]
fn agilidad_extends_the_turn() {
    let mut world = world_with(vec![token(0, 1, Ability::Agilidad)], vec![token(1, 1, Ability::Agilidad)]);

    let _ = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::DecideAbility { activate: true },
        ],
    );

    assert_eq!(query::moves_remaining(&world), Some(4));
}

#[test]
fn sombra_trampa_leaves_a_trap_under_the_caster() {
    let mut world = world_with(vec![token(0, 1, Ability::SombraTrampa)], vec![token(1, 1, Ability::Agilidad)]);

    let _ = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::DecideAbility { activate: true },
        ],
    );

    assert_eq!(query::grid(&world).kind(ENTRY), Some(CellKind::TrapSlow));
}

#[test]
fn cooldowns_tick_only_for_the_acting_roster() {
    let mut world = world_with(
        vec![token(0, 1, Ability::Lullaby)],
        vec![
            token(1, 1, Ability::Agilidad),
            token(2, 1, Ability::Agilidad),
            token(3, 1, Ability::Agilidad),
        ],
    );

    let _ = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::DecideAbility { activate: true },
            Command::StepToken {
                direction: Direction::Down,
            },
        ],
    );

    let (_, caster) = query::token(&world, TokenId::new(0)).expect("token in play");
    assert_eq!(
        caster.cooldowns().get(Ability::Lullaby),
        Ability::Lullaby.cooldown() - 1
    );
    assert_eq!(query::active_player(&world), PlayerSlot::Two);
    let asleep = query::roster(&world, PlayerSlot::Two)
        .iter()
        .filter(|rival| rival.statuses().get(StatusEffect::Lullaby) == 3)
        .count();
    assert_eq!(asleep, 2);
}

#[test]
fn abort_is_only_accepted_between_turns() {
    let mut world = world_with(vec![token(0, 2, Ability::Agilidad)], vec![token(1, 2, Ability::Agilidad)]);

    let events = run(
        &mut world,
        &[
            Command::StartMatch,
            Command::SelectToken { index: 0 },
            Command::AbortMatch,
        ],
    );
    assert_eq!(
        events.last(),
        Some(&Event::CommandRejected {
            command: Command::AbortMatch,
            reason: PhaseError::new(PhaseKind::SelectingAbility)
        })
    );

    let _ = run(
        &mut world,
        &[
            Command::DecideAbility { activate: false },
            Command::StepToken {
                direction: Direction::Down,
            },
            Command::StepToken {
                direction: Direction::Down,
            },
            Command::AbortMatch,
        ],
    );
    assert_eq!(query::phase(&world), TurnPhase::Over(MatchOutcome::Aborted));
    assert_eq!(query::winner(&world), None);
}

#[test]
fn scene_lists_both_rosters() {
    let world = world_with(
        vec![token(0, 2, Ability::Agilidad), token(2, 3, Ability::Ignorante)],
        vec![token(1, 2, Ability::Agilidad)],
    );

    let scene = query::scene(&world);

    assert_eq!(scene.roster(PlayerSlot::One).len(), 2);
    assert_eq!(scene.roster(PlayerSlot::Two).len(), 1);
    assert_eq!(scene.player_names, ["Ash", "Misty"]);
    assert_eq!(scene.grid.exit(), CellCoord::new(3, 3));
}

#[test]
fn teleport_never_drops_a_token_on_the_goal() {
    // Only the entry and the goal are plain paths.
    let grid = Grid::from_rows(&["#####", "#.ss#", "###s#", "###.#", "#####"])
        .expect("layout parses");
    for seed in 0..16 {
        let mut world = World::new(
            grid.clone(),
            [
                Player::new("Ash", vec![token(0, 1, Ability::Teletransporte)]),
                Player::new("Misty", vec![token(1, 1, Ability::Agilidad)]),
            ],
            Difficulty::Normal,
            ChaCha8Rng::seed_from_u64(seed),
        );

        let events = run(
            &mut world,
            &[
                Command::StartMatch,
                Command::SelectToken { index: 0 },
                Command::DecideAbility { activate: true },
            ],
        );

        assert!(events.contains(&Event::TokenTeleported {
            token: TokenId::new(0),
            from: ENTRY,
            to: ENTRY
        }));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TokenFinished { .. })));
        let (_, abra) = query::token(&world, TokenId::new(0)).expect("token in play");
        assert_eq!(abra.cell(), ENTRY);
        assert_eq!(query::moves_remaining(&world), Some(1));
    }
}

#[test]
fn both_players_frozen_still_hands_out_a_turn() {
    let mut first = token(0, 1, Ability::Agilidad);
    first.apply_status(StatusEffect::Lullaby, 2);
    let mut second = token(1, 1, Ability::Agilidad);
    second.apply_status(StatusEffect::Petrification, 2);
    let mut world = world_with(vec![first], vec![second]);

    let events = run(&mut world, &[Command::StartMatch]);

    let skipped: Vec<PlayerSlot> = events
        .iter()
        .filter_map(|event| match event {
            Event::TurnSkipped { player } => Some(*player),
            _ => None,
        })
        .collect();
    assert_eq!(
        skipped,
        vec![PlayerSlot::One, PlayerSlot::Two, PlayerSlot::One, PlayerSlot::Two]
    );
    assert_eq!(
        events.last(),
        Some(&Event::TurnStarted {
            player: PlayerSlot::One
        })
    );
    assert_eq!(query::phase(&world), TurnPhase::AwaitingTokenChoice);
    for slot in PlayerSlot::ALL {
        for token in query::roster(&world, slot) {
            assert_eq!(token.immobilized_by(), None);
        }
    }
}
