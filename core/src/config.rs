//! Match setup surface: difficulty presets, roster sizing and the token catalogue.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Ability, ConfigError, TokenId};

/// Difficulty modes selectable before a match starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Fixed 8×8 teaching layout with visible traps.
    Tutorial,
    /// Generated 15×15 maze with nine hidden traps.
    Normal,
    /// Generated 30×30 maze with thirty hidden traps.
    Nightmare,
}

impl Difficulty {
    /// Every difficulty in menu order.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Tutorial,
        Difficulty::Normal,
        Difficulty::Nightmare,
    ];

    /// Grid layout associated with the difficulty.
    #[must_use]
    pub const fn grid_spec(self) -> GridSpec {
        match self {
            Self::Tutorial => GridSpec::Tutorial,
            Self::Normal => GridSpec::Generated {
                width: 15,
                height: 15,
                hazards_per_kind: 3,
            },
            Self::Nightmare => GridSpec::Generated {
                width: 30,
                height: 30,
                hazards_per_kind: 10,
            },
        }
    }

    /// Identifier of the background track played for this difficulty.
    #[must_use]
    pub const fn track_id(self) -> &'static str {
        match self {
            Self::Tutorial => "tutorial",
            Self::Normal => "normal",
            Self::Nightmare => "nightmare",
        }
    }

    /// Whether renderers may reveal trap cells.
    #[must_use]
    pub const fn reveals_traps(self) -> bool {
        matches!(self, Self::Tutorial)
    }

    /// Display name used by menus and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tutorial => "Tutorial",
            Self::Normal => "Normal",
            Self::Nightmare => "Nightmare",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        if wanted.eq_ignore_ascii_case("pesadilla") {
            return Ok(Self::Nightmare);
        }
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.track_id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownDifficulty {
                name: value.to_owned(),
            })
    }
}

/// Describes how the grid for a match is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridSpec {
    /// Use the fixed hand-authored tutorial layout.
    Tutorial,
    /// Generate a maze of the given size and sprinkle hazards over it.
    Generated {
        /// Number of columns, border included.
        width: u32,
        /// Number of rows, border included.
        height: u32,
        /// Number of hazards of each trap kind to place.
        hazards_per_kind: usize,
    },
}

/// Number of tokens each player brings into a match, validated to `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RosterSize(u8);

impl RosterSize {
    /// Smallest permitted roster.
    pub const MIN: u8 = 1;
    /// Largest permitted roster.
    pub const MAX: u8 = 5;

    /// Validates the requested roster size.
    pub fn new(requested: u8) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&requested) {
            Ok(Self(requested))
        } else {
            Err(ConfigError::RosterSize { requested })
        }
    }

    /// Number of tokens per player.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for RosterSize {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RosterSize> for u8 {
    fn from(value: RosterSize) -> Self {
        value.0
    }
}

/// Everything needed to set up a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Display names of player one and player two.
    pub player_names: [String; 2],
    /// Tokens per player.
    pub roster_size: RosterSize,
    /// Difficulty preset selecting the grid.
    pub difficulty: Difficulty,
    /// Seed for the match's single random source; `None` lets the caller pick one.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Catalogue names drafted by each player; an empty list auto-drafts.
    #[serde(default)]
    pub picks: [Vec<String>; 2],
}

impl MatchConfig {
    /// Creates a configuration that auto-drafts both rosters.
    #[must_use]
    pub fn new(
        player_names: [String; 2],
        roster_size: RosterSize,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            player_names,
            roster_size,
            difficulty,
            seed: None,
            picks: [Vec::new(), Vec::new()],
        }
    }

    /// Fixes the random seed used for the match.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the catalogue names drafted by each player.
    #[must_use]
    pub fn with_picks(mut self, first: Vec<String>, second: Vec<String>) -> Self {
        self.picks = [first, second];
        self
    }
}

/// Catalogue entry describing a draftable token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenTemplate {
    name: &'static str,
    speed: u32,
    ability: Ability,
}

impl TokenTemplate {
    const fn new(name: &'static str, speed: u32, ability: Ability) -> Self {
        Self {
            name,
            speed,
            ability,
        }
    }

    /// Display name of the token.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Movement points per turn before any effect applies.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Ability offered at the start of each of the token's turns.
    #[must_use]
    pub const fn ability(&self) -> Ability {
        self.ability
    }
}

/// Every token that can be drafted, in menu order.
pub const CATALOG: [TokenTemplate; 17] = [
    TokenTemplate::new("Beedrill", 5, Ability::Agilidad),
    TokenTemplate::new("Sandshrew", 2, Ability::Ventisca),
    TokenTemplate::new("Jigglypuff", 2, Ability::Lullaby),
    TokenTemplate::new("Gengar", 3, Ability::SombraTrampa),
    TokenTemplate::new("Snivy", 3, Ability::Ignorante),
    TokenTemplate::new("Litwick", 2, Ability::Oversoul),
    TokenTemplate::new("Decidueye", 4, Ability::SombraTrampa),
    TokenTemplate::new("Litten", 5, Ability::Ignorante),
    TokenTemplate::new("Psyduck", 3, Ability::Lullaby),
    TokenTemplate::new("Greninja", 5, Ability::SombraTrampa),
    TokenTemplate::new("Charmander", 3, Ability::Oversoul),
    TokenTemplate::new("Bulbasaur", 2, Ability::Lullaby),
    TokenTemplate::new("Squirtle", 4, Ability::Ventisca),
    TokenTemplate::new("Pikachu", 5, Ability::Agilidad),
    TokenTemplate::new("Eevee", 3, Ability::Ignorante),
    TokenTemplate::new("Lucario", 5, Ability::DonAural),
    TokenTemplate::new("Abra", 1, Ability::Teletransporte),
];

/// Looks up a catalogue entry by name, ignoring case.
#[must_use]
pub fn find_template(name: &str) -> Option<(TokenId, &'static TokenTemplate)> {
    let wanted = name.trim();
    CATALOG
        .iter()
        .enumerate()
        .find(|(_, template)| template.name.eq_ignore_ascii_case(wanted))
        .map(|(index, template)| (TokenId::new(index as u32), template))
}

/// Returns the catalogue entry backing a token identifier.
#[must_use]
pub fn template(id: TokenId) -> Option<&'static TokenTemplate> {
    usize::try_from(id.get())
        .ok()
        .and_then(|index| CATALOG.get(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_size_accepts_only_one_through_five() {
        assert!(RosterSize::new(0).is_err());
        assert_eq!(RosterSize::new(1).map(RosterSize::get), Ok(1));
        assert_eq!(RosterSize::new(5).map(RosterSize::get), Ok(5));
        assert_eq!(
            RosterSize::new(6),
            Err(ConfigError::RosterSize { requested: 6 })
        );
    }

    #[test]
    fn difficulty_presets_match_hazard_budget() {
        assert_eq!(Difficulty::Tutorial.grid_spec(), GridSpec::Tutorial);
        assert_eq!(
            Difficulty::Normal.grid_spec(),
            GridSpec::Generated {
                width: 15,
                height: 15,
                hazards_per_kind: 3
            }
        );
        assert_eq!(
            Difficulty::Nightmare.grid_spec(),
            GridSpec::Generated {
                width: 30,
                height: 30,
                hazards_per_kind: 10
            }
        );
    }

    #[test]
    fn difficulty_parses_names_and_alias() {
        assert_eq!("Pesadilla".parse::<Difficulty>(), Ok(Difficulty::Nightmare));
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.track_id().parse::<Difficulty>(), Ok(difficulty));
        }
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn catalogue_lookup_is_case_insensitive() {
        let (id, template) = find_template("pikachu").expect("pikachu is drafted");
        assert_eq!(id, TokenId::new(13));
        assert_eq!(template.speed(), 5);
        assert_eq!(template.ability(), Ability::Agilidad);
        assert_eq!(super::template(id), Some(template));
        assert!(find_template("missingno").is_none());
    }

    #[test]
    fn catalogue_names_are_unique() {
        for (index, entry) in CATALOG.iter().enumerate() {
            for other in CATALOG.iter().skip(index + 1) {
                assert!(!entry.name().eq_ignore_ascii_case(other.name()));
            }
        }
    }
}
