#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match setup: validates the configuration, drafts rosters and builds the world.

use maze_runners_core::{
    find_template, template, ConfigError, MatchConfig, PlayerSlot, TokenId, CATALOG,
};
use maze_runners_system_maze_generation::build;
use maze_runners_world::{Player, Token, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Turns a [`MatchConfig`] into a world ready for [`maze_runners_core::Command::StartMatch`].
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Drafts both rosters and builds the grid from a single seeded source.
    ///
    /// The same configuration and seed always produce the same world.
    pub fn prepare(&self, config: &MatchConfig, seed: u64) -> Result<World, ConfigError> {
        let [first, second] = draft(config)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = build(config.difficulty.grid_spec(), &mut rng)?;

        if let Some(route) = grid.distances_from(grid.entry()).distance(grid.exit()) {
            debug!(route, "shortest route from entry to goal");
        }
        info!(
            seed,
            difficulty = %config.difficulty,
            roster_size = config.roster_size.get(),
            "match prepared"
        );

        let [first_name, second_name] = config.player_names.clone();
        let players = [
            Player::new(first_name, first),
            Player::new(second_name, second),
        ];
        Ok(World::new(grid, players, config.difficulty, rng))
    }
}

/// Assigns catalogue tokens to both players.
///
/// Explicit picks are honoured first, player one before player two. Players
/// without picks are then filled from the remaining catalogue in order,
/// alternating between them. A token is never drafted twice.
pub fn draft(config: &MatchConfig) -> Result<[Vec<Token>; 2], ConfigError> {
    let size = config.roster_size.get();
    let mut taken = [false; CATALOG.len()];
    let mut rosters: [Vec<Token>; 2] = [Vec::with_capacity(size), Vec::with_capacity(size)];

    for slot in PlayerSlot::ALL {
        let picks = &config.picks[slot.index()];
        if picks.is_empty() {
            continue;
        }
        if picks.len() != size {
            return Err(ConfigError::RosterLength {
                player: slot,
                expected: size,
                actual: picks.len(),
            });
        }

        for name in picks {
            let (id, entry) = find_template(name).ok_or_else(|| ConfigError::UnknownToken {
                name: name.clone(),
            })?;
            let index = id.get() as usize;
            if taken[index] {
                return Err(ConfigError::DuplicateToken {
                    name: entry.name().to_owned(),
                });
            }
            taken[index] = true;
            rosters[slot.index()].push(Token::from_template(id, entry));
        }
    }

    let mut remaining = (0..CATALOG.len()).filter(|index| !taken[*index]);
    let mut turn = PlayerSlot::One;
    loop {
        let needs = |slot: PlayerSlot| rosters[slot.index()].len() < size;
        let slot = match (needs(turn), needs(turn.other())) {
            (true, _) => turn,
            (false, true) => turn.other(),
            (false, false) => break,
        };

        let Some(index) = remaining.next() else {
            let needed = PlayerSlot::ALL
                .iter()
                .map(|slot| size - rosters[slot.index()].len())
                .sum();
            return Err(ConfigError::CatalogExhausted { needed });
        };
        let id = TokenId::new(index as u32);
        let entry = template(id).ok_or(ConfigError::CatalogExhausted { needed: 1 })?;
        debug!(player = %slot, token = entry.name(), "token auto-drafted");
        rosters[slot.index()].push(Token::from_template(id, entry));
        turn = slot.other();
    }

    Ok(rosters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_runners_core::{Ability, Difficulty, RosterSize, ENTRY};

    fn config(size: u8) -> MatchConfig {
        MatchConfig::new(
            ["Ash".to_owned(), "Misty".to_owned()],
            RosterSize::new(size).expect("valid size"),
            Difficulty::Tutorial,
        )
    }

    fn names(roster: &[Token]) -> Vec<&'static str> {
        roster.iter().map(Token::name).collect()
    }

    #[test]
    fn auto_draft_alternates_in_catalogue_order() {
        let [first, second] = draft(&config(2)).expect("draft succeeds");
        assert_eq!(names(&first), vec!["Beedrill", "Jigglypuff"]);
        assert_eq!(names(&second), vec!["Sandshrew", "Gengar"]);
    }

    #[test]
    fn explicit_picks_are_removed_from_the_auto_pool() {
        let picked = config(2).with_picks(vec!["beedrill".into(), "LUCARIO".into()], Vec::new());
        let [first, second] = draft(&picked).expect("draft succeeds");

        assert_eq!(names(&first), vec!["Beedrill", "Lucario"]);
        assert_eq!(names(&second), vec!["Sandshrew", "Jigglypuff"]);
        assert_eq!(first[1].default_ability(), Ability::DonAural);
        assert_eq!(first[1].speed(), 5);
        assert!(first.iter().chain(&second).all(|token| token.cell() == ENTRY));
    }

    #[test]
    fn duplicate_picks_are_rejected() {
        let picked = config(1).with_picks(vec!["Abra".into()], vec!["abra".into()]);
        assert_eq!(
            draft(&picked).map(|_| ()),
            Err(ConfigError::DuplicateToken {
                name: "Abra".to_owned()
            })
        );
    }

    #[test]
    fn unknown_and_short_picks_are_rejected() {
        let unknown = config(1).with_picks(vec!["Mew".into()], Vec::new());
        assert_eq!(
            draft(&unknown).map(|_| ()),
            Err(ConfigError::UnknownToken {
                name: "Mew".to_owned()
            })
        );

        let short = config(3).with_picks(Vec::new(), vec!["Eevee".into()]);
        assert_eq!(
            draft(&short).map(|_| ()),
            Err(ConfigError::RosterLength {
                player: PlayerSlot::Two,
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn prepare_is_deterministic_for_a_seed() {
        let bootstrap = Bootstrap;
        let normal = MatchConfig {
            difficulty: Difficulty::Normal,
            ..config(3)
        };

        let first = bootstrap.prepare(&normal, 9).expect("valid config");
        let second = bootstrap.prepare(&normal, 9).expect("valid config");

        assert_eq!(
            maze_runners_world::query::grid(&first),
            maze_runners_world::query::grid(&second)
        );
        assert_eq!(maze_runners_world::query::grid(&first).width(), 15);
    }
}
