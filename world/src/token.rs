//! Tokens and the ability resolution rules that act on them.

use maze_runners_core::{
    Ability, AbilityError, CellCoord, CellKind, Cooldowns, Event, StatusDurations, StatusEffect,
    TokenId, TokenSnapshot, TokenTemplate, AGILIDAD_BONUS_MOVES, DON_AURAL_TURNS, ENTRY,
    IGNORANTE_TURNS, LULLABY_TARGETS, LULLABY_TURNS, OVERSOUL_SPEED, OVERSOUL_TURNS,
    VENTISCA_TURNS,
};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info};

use crate::Grid;

/// A mobile piece owned by one player.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    id: TokenId,
    name: &'static str,
    cell: CellCoord,
    speed: u32,
    initial_speed: u32,
    default_ability: Ability,
    cooldowns: Cooldowns,
    statuses: StatusDurations,
}

/// Result of a successful ability activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityOutcome {
    /// Ability that was used.
    pub ability: Ability,
    /// Movement points added to the acting token's current turn.
    pub bonus_moves: u32,
}

impl Token {
    /// Creates a token on `cell` with every cooldown and status at zero.
    #[must_use]
    pub fn new(
        id: TokenId,
        name: &'static str,
        speed: u32,
        default_ability: Ability,
        cell: CellCoord,
    ) -> Self {
        Self {
            id,
            name,
            cell,
            speed,
            initial_speed: speed,
            default_ability,
            cooldowns: Cooldowns::default(),
            statuses: StatusDurations::default(),
        }
    }

    /// Creates a freshly drafted token standing on the entry cell.
    #[must_use]
    pub fn from_template(id: TokenId, template: &TokenTemplate) -> Self {
        Self::new(id, template.name(), template.speed(), template.ability(), ENTRY)
    }

    /// Identifier of the token.
    #[must_use]
    pub const fn id(&self) -> TokenId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Current movement speed.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Speed fixed at creation.
    #[must_use]
    pub const fn initial_speed(&self) -> u32 {
        self.initial_speed
    }

    /// Ability offered at the start of each turn.
    #[must_use]
    pub const fn default_ability(&self) -> Ability {
        self.default_ability
    }

    /// Remaining cooldowns.
    #[must_use]
    pub const fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    /// Remaining status durations.
    #[must_use]
    pub const fn statuses(&self) -> &StatusDurations {
        &self.statuses
    }

    /// Effect keeping the token from moving, if any.
    #[must_use]
    pub fn immobilized_by(&self) -> Option<StatusEffect> {
        self.statuses.immobilizing()
    }

    /// Reports whether Don Aural currently shields the token.
    #[must_use]
    pub const fn is_shielded(&self) -> bool {
        self.statuses.is_active(StatusEffect::DonAural)
    }

    /// Reports whether the default ability can be activated now.
    #[must_use]
    pub const fn ability_ready(&self) -> bool {
        self.cooldowns.is_ready(self.default_ability)
    }

    /// Overwrites the remaining cooldown of an ability.
    pub fn set_cooldown(&mut self, ability: Ability, turns: u32) {
        self.cooldowns.set(ability, turns);
    }

    /// Sets a status effect, keeping speed consistent with Oversoul.
    pub fn apply_status(&mut self, effect: StatusEffect, turns: u32) {
        self.statuses.set(effect, turns);
        if effect == StatusEffect::Oversoul {
            self.speed = if turns > 0 {
                OVERSOUL_SPEED
            } else {
                self.initial_speed
            };
        }
    }

    /// Moves the token without resolving anything on the destination.
    pub(crate) fn place(&mut self, cell: CellCoord) {
        self.cell = cell;
    }

    /// Read-only copy for queries and rendering.
    #[must_use]
    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            id: self.id,
            name: self.name,
            cell: self.cell,
            speed: self.speed,
            initial_speed: self.initial_speed,
            ability: self.default_ability,
            cooldowns: self.cooldowns,
            statuses: self.statuses,
        }
    }

    /// Activates `ability` on behalf of this token.
    ///
    /// Rival-targeting abilities skip shielded rivals and report them as
    /// resisted; the cooldown is consumed regardless of how many rivals were
    /// affected. Activation while the ability is recharging changes nothing.
    pub fn use_ability<R: Rng + ?Sized>(
        &mut self,
        ability: Ability,
        rivals: &mut [Token],
        grid: &mut Grid,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Result<AbilityOutcome, AbilityError> {
        let remaining = self.cooldowns.get(ability);
        if remaining > 0 {
            return Err(AbilityError::OnCooldown { ability, remaining });
        }

        let cooldown = ability.cooldown();
        self.cooldowns.set(ability, cooldown);
        info!(token = self.name, %ability, cooldown, "ability used");
        out_events.push(Event::AbilityUsed {
            token: self.id,
            ability,
            cooldown,
        });

        let mut bonus_moves = 0;
        match ability {
            Ability::Agilidad => bonus_moves = AGILIDAD_BONUS_MOVES,
            Ability::Ventisca => {
                for rival in rivals.iter_mut() {
                    rival.suffer(ability, StatusEffect::Ventisca, VENTISCA_TURNS, out_events);
                }
            }
            Ability::Lullaby => {
                let mut candidates = Vec::with_capacity(rivals.len());
                for (index, rival) in rivals.iter().enumerate() {
                    if ability.is_blockable() && rival.is_shielded() {
                        out_events.push(Event::EffectResisted {
                            token: rival.id,
                            ability,
                        });
                    } else {
                        candidates.push(index);
                    }
                }

                let chosen: Vec<usize> = candidates
                    .choose_multiple(rng, LULLABY_TARGETS)
                    .copied()
                    .collect();
                for index in chosen {
                    rivals[index].suffer(ability, StatusEffect::Lullaby, LULLABY_TURNS, out_events);
                }
            }
            Ability::SombraTrampa => {
                grid.set(self.cell, CellKind::TrapSlow);
                out_events.push(Event::TrapPlaced {
                    cell: self.cell,
                    kind: CellKind::TrapSlow,
                });
            }
            Ability::Ignorante => {
                self.gain(StatusEffect::Ignorante, IGNORANTE_TURNS, out_events);
            }
            Ability::Oversoul => {
                for rival in rivals.iter_mut() {
                    rival.suffer(ability, StatusEffect::Oversoul, OVERSOUL_TURNS, out_events);
                }
            }
            Ability::DonAural => {
                self.gain(StatusEffect::DonAural, DON_AURAL_TURNS, out_events);
            }
            Ability::Teletransporte => {
                if let Some(target) = grid.random_path_cell(rng) {
                    let from = self.cell;
                    self.cell = target;
                    out_events.push(Event::TokenTeleported {
                        token: self.id,
                        from,
                        to: target,
                    });
                }
            }
        }

        Ok(AbilityOutcome {
            ability,
            bonus_moves,
        })
    }

    /// End-of-turn bookkeeping: cooldowns and statuses lose one turn, and
    /// speed returns to its initial value the moment Oversoul runs out.
    pub fn end_of_turn(&mut self, out_events: &mut Vec<Event>) {
        self.cooldowns.tick();
        let expired = self.statuses.tick();
        if expired.contains(StatusEffect::Oversoul) {
            self.speed = self.initial_speed;
            debug!(token = self.name, speed = self.speed, "speed restored");
            out_events.push(Event::SpeedRestored {
                token: self.id,
                speed: self.speed,
            });
        }
    }

    fn gain(&mut self, effect: StatusEffect, turns: u32, out_events: &mut Vec<Event>) {
        self.apply_status(effect, turns);
        out_events.push(Event::EffectApplied {
            token: self.id,
            effect,
            turns,
        });
    }

    fn suffer(
        &mut self,
        source: Ability,
        effect: StatusEffect,
        turns: u32,
        out_events: &mut Vec<Event>,
    ) {
        if source.is_blockable() && self.is_shielded() {
            debug!(token = self.name, ability = %source, "effect resisted");
            out_events.push(Event::EffectResisted {
                token: self.id,
                ability: source,
            });
        } else {
            self.gain(effect, turns, out_events);
        }
    }
}

/// A seat at the table and the tokens it still has in play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    name: String,
    roster: Vec<Token>,
    has_extra_turn: bool,
}

impl Player {
    /// Creates a player with the provided roster.
    #[must_use]
    pub fn new(name: impl Into<String>, roster: Vec<Token>) -> Self {
        Self {
            name: name.into(),
            roster,
            has_extra_turn: false,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live tokens in roster order.
    #[must_use]
    pub fn roster(&self) -> &[Token] {
        &self.roster
    }

    pub(crate) fn roster_mut(&mut self) -> &mut Vec<Token> {
        &mut self.roster
    }

    /// Whether the player acts again after the current turn.
    #[must_use]
    pub const fn has_extra_turn(&self) -> bool {
        self.has_extra_turn
    }

    pub(crate) fn set_extra_turn(&mut self, value: bool) {
        self.has_extra_turn = value;
    }

    /// Reports whether every remaining token is immobilized.
    #[must_use]
    pub fn all_immobilized(&self) -> bool {
        !self.roster.is_empty() && self.roster.iter().all(|token| token.immobilized_by().is_some())
    }

    /// Runs end-of-turn bookkeeping on every remaining token.
    pub(crate) fn end_of_turn(&mut self, out_events: &mut Vec<Event>) {
        for token in &mut self.roster {
            token.end_of_turn(out_events);
        }
    }
}
