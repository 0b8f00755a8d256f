use std::{fs, path::Path};

use anyhow::{Context, Result};
use maze_runners_core::{Difficulty, MatchConfig, RosterSize};
use serde::Deserialize;

/// Roster size used when neither the file nor the flags provide one.
pub(crate) const DEFAULT_ROSTER_SIZE: u8 = 3;

/// Match settings read from a TOML file. Every field is optional.
///
/// ```toml
/// difficulty = "nightmare"
/// roster_size = 2
/// seed = 7
/// player1 = "Red"
/// picks1 = ["Beedrill", "Abra"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MatchFile {
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) roster_size: Option<RosterSize>,
    pub(crate) seed: Option<u64>,
    pub(crate) player1: Option<String>,
    pub(crate) player2: Option<String>,
    pub(crate) picks1: Vec<String>,
    pub(crate) picks2: Vec<String>,
}

impl MatchFile {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read match file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse match file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid match file toml contents")
    }

    /// Overlays `overrides` on top of the file; set fields in `overrides` win.
    #[must_use]
    pub(crate) fn merged(self, overrides: Self) -> Self {
        let pick = |over: Vec<String>, base: Vec<String>| if over.is_empty() { base } else { over };
        Self {
            difficulty: overrides.difficulty.or(self.difficulty),
            roster_size: overrides.roster_size.or(self.roster_size),
            seed: overrides.seed.or(self.seed),
            player1: overrides.player1.or(self.player1),
            player2: overrides.player2.or(self.player2),
            picks1: pick(overrides.picks1, self.picks1),
            picks2: pick(overrides.picks2, self.picks2),
        }
    }

    /// Fills the gaps with defaults and produces the match configuration.
    pub(crate) fn into_config(self) -> Result<MatchConfig> {
        let roster_size = match self.roster_size {
            Some(size) => size,
            None => RosterSize::new(DEFAULT_ROSTER_SIZE)?,
        };
        let names = [
            self.player1.unwrap_or_else(|| "Player 1".to_owned()),
            self.player2.unwrap_or_else(|| "Player 2".to_owned()),
        ];
        let mut config = MatchConfig::new(
            names,
            roster_size,
            self.difficulty.unwrap_or(Difficulty::Normal),
        )
        .with_picks(self.picks1, self.picks2);
        config.seed = self.seed;
        Ok(config)
    }
}
