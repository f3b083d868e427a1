use super::EffectContext;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::{FieldConditions, MoveResult, TeamConditions, VolatileConditions};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::errors::BattleResult;
use schema::{Item, PokemonType, Stat, Status1, Weather};
use tracing::debug;

impl Battle {
    /// Status moves that inflict a persistent status. Type immunity is
    /// checked before the status rules.
    pub(super) fn force_status1(
        &mut self,
        context: &EffectContext,
        status: Status1,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        for &target in &context.targets {
            if !self.battler(target).is_active() || self.miss_check(user, target, context.data, rng)? {
                continue;
            }
            if self.type_check(user, target, context.data).is_none() {
                continue;
            }
            self.apply_status1_if_possible(user, target, status, true, rng)?;
        }
        Ok(())
    }

    pub(super) fn force_status2(
        &mut self,
        context: &EffectContext,
        condition: VolatileConditions,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        for &target in &context.targets {
            if !self.battler(target).is_active() || self.miss_check(user, target, context.data, rng)? {
                continue;
            }
            self.apply_status2_if_possible(user, target, condition, true, rng)?;
        }
        Ok(())
    }

    /// Conditions the user places on itself.
    pub(super) fn self_status2(
        &mut self,
        context: &EffectContext,
        condition: VolatileConditions,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        self.apply_status2_if_possible(user, user, condition, true, rng)?;
        Ok(())
    }

    pub(super) fn helping_hand(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        for &target in &context.targets {
            if target == user || !self.battler(target).is_active() {
                self.report(user, None, MoveResult::NoTarget);
                continue;
            }
            self.apply_status2_if_possible(user, target, VolatileConditions::HELPING_HAND, true, rng)?;
        }
        Ok(())
    }

    /// Ghosts pay half their HP to curse the target; everyone else trades
    /// speed for attack and defense.
    pub(super) fn curse(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        if self.battler(user).has_type(PokemonType::Ghost) {
            for &target in &context.targets {
                if target == user || self.miss_check(user, target, context.data, rng)? {
                    continue;
                }
                self.apply_status2_if_possible(user, target, VolatileConditions::CURSED, true, rng)?;
            }
            return Ok(());
        }

        let changes = [(Stat::Speed, -1), (Stat::Attack, 1), (Stat::Defense, 1)];
        if !self.stat_change_possible(user, &changes) {
            self.report(user, Some(user), MoveResult::IneffectiveStat);
            return Ok(());
        }
        for (stat, change) in changes {
            if self.stat_change_possible(user, &[(stat, change)]) {
                self.apply_stat_change(user, user, stat, change)?;
            }
        }
        Ok(())
    }

    /// Flatter and Swagger: raise a stat, then confuse.
    pub(super) fn flatter(
        &mut self,
        context: &EffectContext,
        stat: Stat,
        amount: i8,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        for &target in &context.targets {
            if !self.battler(target).is_active() || self.miss_check(user, target, context.data, rng)? {
                continue;
            }
            if self.battler(target).status2.contains(VolatileConditions::SUBSTITUTE) {
                self.report(user, Some(target), MoveResult::IneffectiveSubstitute);
                continue;
            }
            if self.stat_change_possible(target, &[(stat, amount)]) {
                self.apply_stat_change(user, target, stat, amount)?;
            }
            self.apply_status2_if_possible(user, target, VolatileConditions::CONFUSED, true, rng)?;
        }
        Ok(())
    }

    /// Reflect and Light Screen, extended by Light Clay.
    pub(super) fn screen(&mut self, context: &EffectContext, condition: TeamConditions) -> BattleResult<()> {
        let mut turns = if condition == TeamConditions::REFLECT {
            self.settings.reflect_turns
        } else {
            self.settings.light_screen_turns
        };
        if self.battler(context.user).item == Item::LightClay {
            turns = turns.saturating_add(self.settings.light_clay_turn_extension);
        }
        self.team_condition(context, context.user.team, condition, turns)
    }

    pub(super) fn team_condition(
        &mut self,
        context: &EffectContext,
        team: usize,
        condition: TeamConditions,
        turns: u8,
    ) -> BattleResult<()> {
        if self.teams[team].conditions.contains(condition) {
            self.report(context.user, None, MoveResult::IneffectiveStatus);
            return Ok(());
        }
        self.execute(BattleCommand::SetTeamCondition {
            team,
            condition,
            turns,
        })
    }

    /// Spikes stack to three layers, Toxic Spikes to two, Stealth Rock once.
    pub(super) fn entry_hazard(
        &mut self,
        context: &EffectContext,
        condition: TeamConditions,
    ) -> BattleResult<()> {
        let team = context.user.opposing_team();
        let side = &self.teams[team];
        let full = if condition == TeamConditions::SPIKES {
            side.spikes_layers >= 3
        } else if condition == TeamConditions::TOXIC_SPIKES {
            side.toxic_spikes_layers >= 2
        } else {
            side.conditions.contains(condition)
        };
        if full {
            self.report(context.user, None, MoveResult::IneffectiveStatus);
            return Ok(());
        }
        self.execute(BattleCommand::SetTeamCondition {
            team,
            condition,
            turns: 0,
        })
    }

    /// Shares the Protect success chain.
    pub(super) fn wide_guard(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        let chance = self.protection_chance(user);
        if rng.roll_chance(chance, u32::from(u16::MAX), "wide guard") {
            self.battler_mut(user).protection_counter += 1;
            self.execute(BattleCommand::SetTeamCondition {
                team: user.team,
                condition: TeamConditions::WIDE_GUARD,
                turns: 0,
            })
        } else {
            self.battler_mut(user).protection_counter = 0;
            self.report(user, None, MoveResult::InvalidConditions);
            Ok(())
        }
    }

    /// Using Trick Room while it is up ends it.
    pub(super) fn trick_room(&mut self) -> BattleResult<()> {
        if self.field_conditions.contains(FieldConditions::TRICK_ROOM) {
            self.execute(BattleCommand::ClearFieldCondition {
                condition: FieldConditions::TRICK_ROOM,
            })
        } else {
            let turns = self.settings.trick_room_turns;
            self.execute(BattleCommand::SetFieldCondition {
                condition: FieldConditions::TRICK_ROOM,
                turns,
            })
        }
    }

    pub(super) fn weather_move(&mut self, context: &EffectContext, weather: Weather) -> BattleResult<()> {
        if self.weather == weather {
            self.report(context.user, None, MoveResult::IneffectiveStatus);
            return Ok(());
        }
        let settings = &self.settings;
        let (turns, rock, extension) = match weather {
            Weather::Hailstorm => (settings.hail_turns, Item::IcyRock, settings.icy_rock_turn_extension),
            Weather::Rain => (settings.rain_turns, Item::DampRock, settings.damp_rock_turn_extension),
            Weather::Sandstorm => (
                settings.sandstorm_turns,
                Item::SmoothRock,
                settings.smooth_rock_turn_extension,
            ),
            Weather::HarshSunlight => (settings.sun_turns, Item::HeatRock, settings.heat_rock_turn_extension),
            Weather::None => (0, Item::None, 0),
        };
        let turns = if self.battler(context.user).item == rock && rock != Item::None {
            turns.saturating_add(extension)
        } else {
            turns
        };
        debug!(?weather, turns, "weather set by move");
        self.execute(BattleCommand::SetWeather { weather, turns })?;
        self.castform_cherrim_check_all()
    }
}
