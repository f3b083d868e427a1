use super::EffectContext;
use crate::battle::battler::StatStages;
use crate::battle::conditions::{MoveResult, VolatileConditions};
use crate::battle::events::{BattleEvent, SpecialMessage};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::errors::BattleResult;
use schema::{Stat, Weather};

impl Battle {
    /// Applies every change in `changes` to each target. Fails with
    /// `IneffectiveStat` only when none of the stages can move.
    pub(super) fn change_target_stats(
        &mut self,
        context: &EffectContext,
        changes: &[(Stat, i8)],
        require_attraction: bool,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        for &target in &context.targets {
            if !self.battler(target).is_active() {
                continue;
            }
            if target != user {
                if self.miss_check(user, target, context.data, rng)? {
                    continue;
                }
                if require_attraction {
                    let result = self.attraction_result(user, target);
                    if result != MoveResult::Success {
                        self.report(user, Some(target), result);
                        continue;
                    }
                }
                if self.battler(target).status2.contains(VolatileConditions::SUBSTITUTE) {
                    self.report(user, Some(target), MoveResult::IneffectiveSubstitute);
                    continue;
                }
            }
            if !self.stat_change_possible(target, changes) {
                self.report(user, Some(target), MoveResult::IneffectiveStat);
                continue;
            }
            for &(stat, change) in changes {
                if self.stat_change_possible(target, &[(stat, change)]) {
                    self.apply_stat_change(user, target, stat, change)?;
                }
            }
        }
        Ok(())
    }

    pub(super) fn shell_smash(&mut self, context: &EffectContext) -> BattleResult<()> {
        let user = context.user;
        let changes = [
            (Stat::Defense, -1),
            (Stat::SpDefense, -1),
            (Stat::Attack, 2),
            (Stat::SpAttack, 2),
            (Stat::Speed, 2),
        ];
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

    /// Doubled in harsh sunlight.
    pub(super) fn growth(&mut self, context: &EffectContext, amount: i8, rng: &mut BattleRng) -> BattleResult<()> {
        let amount = if self.effective_weather() == Weather::HarshSunlight {
            amount.saturating_mul(2)
        } else {
            amount
        };
        self.change_target_stats(
            context,
            &[(Stat::Attack, amount), (Stat::SpAttack, amount)],
            false,
            rng,
        )
    }

    /// Copies every stage of the target, bypassing Simple.
    pub(super) fn psych_up(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        let Some(&target) = context.targets.first() else {
            return Ok(());
        };
        if target == user || self.miss_check(user, target, context.data, rng)? {
            return Ok(());
        }
        let stages = self.battler(target).stat_stages;
        self.battler_mut(user).stat_stages = stages;
        let battler = Some(self.reference(user));
        let other = Some(self.reference(target));
        self.emit(BattleEvent::Special {
            battler,
            other,
            message: SpecialMessage::PsychUp,
        });
        Ok(())
    }

    /// Resets the stages of every active battler.
    pub(super) fn haze(&mut self, context: &EffectContext) -> BattleResult<()> {
        for id in self.active_battlers() {
            self.battler_mut(id).stat_stages = StatStages::default();
        }
        let battler = Some(self.reference(context.user));
        self.emit(BattleEvent::Special {
            battler,
            other: None,
            message: SpecialMessage::Haze,
        });
        Ok(())
    }
}
