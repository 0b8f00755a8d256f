//! Closed catalogues of abilities and timed status effects.
//!
//! Both catalogues are small and fixed, so per-token bookkeeping lives in
//! dense arrays indexed by the enum discriminant instead of open maps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extra movement points granted by [`Ability::Agilidad`].
pub const AGILIDAD_BONUS_MOVES: u32 = 3;
/// Turns a rival stays frozen after [`Ability::Ventisca`].
pub const VENTISCA_TURNS: u32 = 1;
/// Turns a rival sleeps after [`Ability::Lullaby`].
pub const LULLABY_TURNS: u32 = 3;
/// Maximum number of rivals put to sleep by a single [`Ability::Lullaby`].
pub const LULLABY_TARGETS: usize = 2;
/// Turns a token ignores terrain traps after [`Ability::Ignorante`].
pub const IGNORANTE_TURNS: u32 = 1;
/// Turns a rival stays slowed after [`Ability::Oversoul`].
pub const OVERSOUL_TURNS: u32 = 3;
/// Speed imposed on rivals hit by [`Ability::Oversoul`].
pub const OVERSOUL_SPEED: u32 = 1;
/// Turns of immunity granted by [`Ability::DonAural`].
pub const DON_AURAL_TURNS: u32 = 3;
/// Turns a token stays petrified after stepping onto a confusion trap.
pub const PETRIFICATION_TURNS: u32 = 3;

/// Abilities a token may activate at the start of its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    /// Grants the acting token three extra movement points this turn.
    Agilidad,
    /// Freezes every non-immune rival for one turn.
    Ventisca,
    /// Puts up to two random non-immune rivals to sleep.
    Lullaby,
    /// Leaves a slow trap on the acting token's cell.
    SombraTrampa,
    /// Lets the acting token ignore terrain traps this turn.
    Ignorante,
    /// Drops every non-immune rival to speed one.
    Oversoul,
    /// Makes the acting token immune to rival abilities.
    DonAural,
    /// Relocates the acting token to a random path cell.
    Teletransporte,
}

impl Ability {
    /// Number of abilities in the catalogue.
    pub const COUNT: usize = 8;

    /// Every ability in catalogue order.
    pub const ALL: [Ability; Self::COUNT] = [
        Ability::Agilidad,
        Ability::Ventisca,
        Ability::Lullaby,
        Ability::SombraTrampa,
        Ability::Ignorante,
        Ability::Oversoul,
        Ability::DonAural,
        Ability::Teletransporte,
    ];

    /// Cooldown, in owner turns, applied after the ability is used.
    #[must_use]
    pub const fn cooldown(self) -> u32 {
        match self {
            Self::Agilidad => 6,
            Self::Ventisca => 3,
            Self::Lullaby => 7,
            Self::SombraTrampa => 5,
            Self::Ignorante => 7,
            Self::Oversoul => 8,
            Self::DonAural => 7,
            Self::Teletransporte => 1,
        }
    }

    /// Display name used by menus and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Agilidad => "Agilidad",
            Self::Ventisca => "Ventisca",
            Self::Lullaby => "Lullaby",
            Self::SombraTrampa => "Sombra Trampa",
            Self::Ignorante => "Ignorante",
            Self::Oversoul => "Oversoul",
            Self::DonAural => "Don Aural",
            Self::Teletransporte => "Teletransporte",
        }
    }

    /// Reports whether Don Aural shields rivals from this ability.
    #[must_use]
    pub const fn is_blockable(self) -> bool {
        matches!(self, Self::Ventisca | Self::Lullaby | Self::Oversoul)
    }


    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Timed conditions attached to a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Frozen by a rival's Ventisca.
    Ventisca,
    /// Asleep from a rival's Lullaby.
    Lullaby,
    /// Petrified by a confusion trap.
    Petrification,
    /// Ignoring terrain traps.
    Ignorante,
    /// Slowed by a rival's Oversoul.
    Oversoul,
    /// Immune to Ventisca, Lullaby and Oversoul.
    DonAural,
}

impl StatusEffect {
    /// Number of status effects tracked per token.
    pub const COUNT: usize = 6;

    /// Every status effect in declaration order.
    pub const ALL: [StatusEffect; Self::COUNT] = [
        StatusEffect::Ventisca,
        StatusEffect::Lullaby,
        StatusEffect::Petrification,
        StatusEffect::Ignorante,
        StatusEffect::Oversoul,
        StatusEffect::DonAural,
    ];

    /// Effects that prevent a token from being chosen to move.
    pub const IMMOBILIZING: [StatusEffect; 3] = [
        StatusEffect::Lullaby,
        StatusEffect::Petrification,
        StatusEffect::Ventisca,
    ];

    /// Display name used by menus and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ventisca => "Ventisca",
            Self::Lullaby => "Lullaby",
            Self::Petrification => "Petrification",
            Self::Ignorante => "Ignorante",
            Self::Oversoul => "Oversoul",
            Self::DonAural => "Don Aural",
        }
    }

    /// Reports whether the effect keeps its token from moving.
    #[must_use]
    pub const fn is_immobilizing(self) -> bool {
        matches!(self, Self::Lullaby | Self::Petrification | Self::Ventisca)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remaining cooldown for every catalogue ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cooldowns([u32; Ability::COUNT]);

impl Cooldowns {
    /// Remaining turns before the ability can be used again.
    #[must_use]
    pub const fn get(&self, ability: Ability) -> u32 {
        self.0[ability.index()]
    }

    /// Overwrites the remaining cooldown for an ability.
    pub fn set(&mut self, ability: Ability, turns: u32) {
        self.0[ability.index()] = turns;
    }

    /// Reports whether the ability is ready for use.
    #[must_use]
    pub const fn is_ready(&self, ability: Ability) -> bool {
        self.get(ability) == 0
    }

    /// Decrements every running cooldown by one turn.
    pub fn tick(&mut self) {
        for remaining in &mut self.0 {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

/// Remaining duration of every status effect; zero means absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusDurations([u32; StatusEffect::COUNT]);

impl StatusDurations {
    /// Remaining turns for the effect, zero when absent.
    #[must_use]
    pub const fn get(&self, effect: StatusEffect) -> u32 {
        self.0[effect.index()]
    }

    /// Overwrites the remaining duration for an effect.
    pub fn set(&mut self, effect: StatusEffect, turns: u32) {
        self.0[effect.index()] = turns;
    }

    /// Reports whether the effect currently applies.
    #[must_use]
    pub const fn is_active(&self, effect: StatusEffect) -> bool {
        self.get(effect) > 0
    }

    /// First active effect that keeps the token from moving, if any.
    #[must_use]
    pub fn immobilizing(&self) -> Option<StatusEffect> {
        StatusEffect::IMMOBILIZING
            .into_iter()
            .find(|effect| self.is_active(*effect))
    }

    /// Decrements every running effect and reports which ones just ran out.
    pub fn tick(&mut self) -> ExpiredEffects {
        let mut expired = ExpiredEffects::default();
        for effect in StatusEffect::ALL {
            let slot = &mut self.0[effect.index()];
            if *slot > 0 {
                *slot -= 1;
                if *slot == 0 {
                    expired.insert(effect);
                }
            }
        }
        expired
    }
}

/// Set of status effects that expired during a single end-of-turn pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpiredEffects(u8);

impl ExpiredEffects {
    fn insert(&mut self, effect: StatusEffect) {
        self.0 |= 1 << effect.index();
    }

    /// Reports whether the effect expired.
    #[must_use]
    pub const fn contains(&self, effect: StatusEffect) -> bool {
        self.0 & (1 << effect.index()) != 0
    }

    /// Reports whether nothing expired.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
