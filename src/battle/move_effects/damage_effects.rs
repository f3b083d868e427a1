use super::{EffectContext, HitHooks, PlainHit};
use crate::battle::action::Action;
use crate::battle::battler::{BattlerId, MoveLock};
use crate::battle::calculators::move_type_for;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::{MoveResult, TeamConditions, VolatileConditions};
use crate::battle::events::{AbilityAction, BattleEvent, LockKind, SpecialMessage, StatusAction};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::battle::stats::target_ability;
use crate::errors::BattleResult;
use crate::move_data::get_move_data;
use schema::{Ability, Item, Stat, Status1};
use tracing::trace;

/// Rolls a secondary effect. Certain effects draw nothing.
fn secondary_roll(rng: &mut BattleRng, chance: u32, reason: &str) -> bool {
    chance >= 100 || (chance > 0 && rng.roll_chance(chance, 100, reason))
}

struct SecondaryStatus {
    status: Status1,
    chance: u32,
    flinch_chance: u32,
}

impl HitHooks for SecondaryStatus {
    fn after_post_hit(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        target: BattlerId,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        if secondary_roll(rng, self.chance, "secondary status") {
            battle.apply_status1_if_possible(context.user, target, self.status, false, rng)?;
        }
        if secondary_roll(rng, self.flinch_chance, "secondary flinch") {
            battle.apply_status2_if_possible(
                context.user,
                target,
                VolatileConditions::FLINCHING,
                false,
                rng,
            )?;
        }
        Ok(())
    }
}

struct SecondaryVolatile {
    condition: VolatileConditions,
    chance: u32,
}

impl HitHooks for SecondaryVolatile {
    fn after_post_hit(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        target: BattlerId,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        if secondary_roll(rng, self.chance, "secondary volatile") {
            battle.apply_status2_if_possible(context.user, target, self.condition, false, rng)?;
        }
        Ok(())
    }
}

struct TargetStatChance<'a> {
    changes: &'a [(Stat, i8)],
    chance: u32,
}

impl HitHooks for TargetStatChance<'_> {
    fn after_post_hit(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        target: BattlerId,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        if !secondary_roll(rng, self.chance, "secondary stat drop") {
            return Ok(());
        }
        for &(stat, change) in self.changes {
            if battle.stat_change_possible(target, &[(stat, change)]) {
                battle.apply_stat_change(context.user, target, stat, change)?;
            }
        }
        Ok(())
    }
}

/// Stat changes on the user happen once per use, however many targets
/// were hit.
struct UserStatChance<'a> {
    changes: &'a [(Stat, i8)],
    chance: u32,
}

impl HitHooks for UserStatChance<'_> {
    fn before_targets_faint(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        hit: &[BattlerId],
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        if hit.is_empty() || battle.battler(user).is_fainted() {
            return Ok(());
        }
        if !secondary_roll(rng, self.chance, "secondary user stat change") {
            return Ok(());
        }
        for &(stat, change) in self.changes {
            if battle.stat_change_possible(user, &[(stat, change)]) {
                battle.apply_stat_change(user, user, stat, change)?;
            }
        }
        Ok(())
    }
}

struct RecoilHooks {
    denominator: u16,
    secondary: Option<SecondaryStatus>,
}

impl HitHooks for RecoilHooks {
    fn after_post_hit(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        target: BattlerId,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        match self.secondary.as_mut() {
            Some(secondary) => secondary.after_post_hit(battle, context, target, rng),
            None => Ok(()),
        }
    }

    fn recoil(&self, battle: &Battle, context: &EffectContext, total_dealt: u16) -> Option<u16> {
        if battle.battler(context.user).ability == Ability::RockHead {
            return None;
        }
        Some((total_dealt / self.denominator.max(1)).max(1))
    }
}

struct Drain {
    percent: u16,
    require_sleep: bool,
}

impl HitHooks for Drain {
    fn before_doing_damage(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        target: BattlerId,
    ) -> BattleResult<bool> {
        if self.require_sleep && battle.battler(target).status1 != Status1::Asleep {
            battle.report(context.user, Some(target), MoveResult::InvalidConditions);
            return Ok(false);
        }
        Ok(true)
    }

    fn before_post_hit(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        target: BattlerId,
        dealt: u16,
    ) -> BattleResult<()> {
        let user = context.user;
        if dealt == 0 || battle.battler(user).is_fainted() {
            return Ok(());
        }
        let mut amount = (u32::from(dealt) * u32::from(self.percent) / 100).max(1);
        if battle.battler(user).item == Item::BigRoot {
            amount = amount * 13 / 10;
        }
        let amount = amount.min(u32::from(u16::MAX)) as u16;

        if target_ability(battle, user, target) == Ability::LiquidOoze {
            battle.execute(BattleCommand::TriggerAbility {
                owner: target,
                other: Some(user),
                action: AbilityAction::Damage,
            })?;
            battle.deal_damage(user, amount)?;
            battle.faint_check(user)?;
        } else {
            battle.heal(user, amount)?;
            let battler = Some(battle.reference(user));
            let other = Some(battle.reference(target));
            battle.emit(BattleEvent::Special {
                battler,
                other,
                message: SpecialMessage::HpDrained,
            });
        }
        Ok(())
    }
}

struct BrickBreak;

impl HitHooks for BrickBreak {
    fn before_doing_damage(
        &mut self,
        battle: &mut Battle,
        _context: &EffectContext,
        target: BattlerId,
    ) -> BattleResult<bool> {
        for condition in [TeamConditions::REFLECT, TeamConditions::LIGHT_SCREEN] {
            if battle.teams[target.team].conditions.contains(condition) {
                battle.execute(BattleCommand::ClearTeamCondition {
                    team: target.team,
                    condition,
                    action: StatusAction::Ended,
                })?;
            }
        }
        Ok(true)
    }
}

struct SuckerPunch;

impl HitHooks for SuckerPunch {
    fn before_doing_damage(
        &mut self,
        battle: &mut Battle,
        context: &EffectContext,
        target: BattlerId,
    ) -> BattleResult<bool> {
        let defender = battle.battler(target);
        let attacking = match defender.selected_action {
            Some(Action::Fight { move_, .. }) => get_move_data(move_)?.is_damaging(),
            Some(Action::Forced) => true,
            _ => false,
        };
        if defender.has_used_move_this_turn || !attacking {
            battle.report(context.user, Some(target), MoveResult::InvalidConditions);
            return Ok(false);
        }
        Ok(true)
    }
}

struct StruggleHooks;

impl HitHooks for StruggleHooks {
    fn recoil(&self, battle: &Battle, context: &EffectContext, _total_dealt: u16) -> Option<u16> {
        Some(battle.battler(context.user).hp_fraction(4))
    }
}

/// Damage that ignores the damage formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FixedDamage {
    Set(u16),
    Level,
    Psywave,
    SuperFang,
    Endeavor,
    FinalGambit,
    OneHitKnockout,
}

impl Battle {
    pub(super) fn hit_maybe_status(
        &mut self,
        context: &EffectContext,
        status: Status1,
        chance: u32,
        flinch_chance: u32,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let mut hooks = SecondaryStatus {
            status,
            chance,
            flinch_chance,
        };
        self.basic_hit(context, &mut hooks, rng)
    }

    pub(super) fn hit_maybe_volatile(
        &mut self,
        context: &EffectContext,
        condition: VolatileConditions,
        chance: u32,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        self.basic_hit(context, &mut SecondaryVolatile { condition, chance }, rng)
    }

    pub(super) fn hit_maybe_target_stats(
        &mut self,
        context: &EffectContext,
        changes: &[(Stat, i8)],
        chance: u32,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        self.basic_hit(context, &mut TargetStatChance { changes, chance }, rng)
    }

    pub(super) fn hit_maybe_user_stats(
        &mut self,
        context: &EffectContext,
        changes: &[(Stat, i8)],
        chance: u32,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        self.basic_hit(context, &mut UserStatChance { changes, chance }, rng)
    }

    pub(super) fn recoil_hit(
        &mut self,
        context: &EffectContext,
        denominator: u16,
        secondary: Option<(Status1, u32)>,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let mut hooks = RecoilHooks {
            denominator,
            secondary: secondary.map(|(status, chance)| SecondaryStatus {
                status,
                chance,
                flinch_chance: 0,
            }),
        };
        self.basic_hit(context, &mut hooks, rng)
    }

    pub(super) fn drain_hit(
        &mut self,
        context: &EffectContext,
        percent: u16,
        require_sleep: bool,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let mut hooks = Drain {
            percent,
            require_sleep,
        };
        self.basic_hit(context, &mut hooks, rng)
    }

    /// Only usable while asleep.
    pub(super) fn snore(
        &mut self,
        context: &EffectContext,
        flinch_chance: u32,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        if self.battler(context.user).status1 != Status1::Asleep {
            self.report(context.user, None, MoveResult::InvalidConditions);
            return Ok(());
        }
        let mut hooks = SecondaryVolatile {
            condition: VolatileConditions::FLINCHING,
            chance: flinch_chance,
        };
        self.basic_hit(context, &mut hooks, rng)
    }

    pub(super) fn brick_break(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        self.basic_hit(context, &mut BrickBreak, rng)
    }

    pub(super) fn sucker_punch(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        self.basic_hit(context, &mut SuckerPunch, rng)
    }

    pub(super) fn struggle(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let battler = Some(self.reference(context.user));
        self.emit(BattleEvent::Special {
            battler,
            other: None,
            message: SpecialMessage::Struggle,
        });
        self.basic_hit(context, &mut StruggleHooks, rng)
    }

    /// The user faints before its blast lands. When that empties its team
    /// the opponent has already won, whatever the blast does.
    pub(super) fn selfdestruct(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        let hp = self.battler(user).hp;
        self.deal_damage(user, hp)?;
        if self.winner.is_none() && !self.team_has_conscious_battlers(user.team) {
            self.winner = Some(user.opposing_team());
        }
        self.basic_hit(context, &mut PlainHit, rng)?;
        self.faint_check(user)?;
        Ok(())
    }

    /// Two-turn moves. The first use hides the user and stores the targets in
    /// a temporary lock; the second releases the attack.
    pub(super) fn charge_move(
        &mut self,
        context: &EffectContext,
        hiding: VolatileConditions,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        let move_ = context.data.id;
        if self.battler(user).status2.contains(hiding) {
            self.execute(BattleCommand::RemoveStatus2 {
                target: user,
                condition: hiding,
                action: StatusAction::Ended,
            })?;
            self.execute(BattleCommand::SetMoveLock {
                target: user,
                kind: LockKind::Temporary,
                lock: None,
            })?;
            return self.basic_hit(context, &mut PlainHit, rng);
        }

        if !context.called {
            self.execute(BattleCommand::ReducePp {
                target: user,
                move_,
                amount: 1,
            })?;
        }
        if self.power_herb_check(user)? {
            return self.basic_hit(context, &mut PlainHit, rng);
        }
        trace!(?user, ?move_, "charging");
        self.execute(BattleCommand::AddStatus2 {
            target: user,
            condition: hiding,
            source: Some(user),
            counter: 0,
        })?;
        self.execute(BattleCommand::SetMoveLock {
            target: user,
            kind: LockKind::Temporary,
            lock: Some(MoveLock {
                move_,
                targets: context.requested,
            }),
        })
    }

    /// Hits for an amount set by `kind` instead of the damage formula. Never
    /// crits and never triggers Life Orb.
    pub(super) fn fixed_damage_hit(
        &mut self,
        context: &EffectContext,
        kind: FixedDamage,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        let data = context.data;
        let move_type = move_type_for(data);
        let mut hit = Vec::with_capacity(context.targets.len());

        for &target in &context.targets {
            if !self.battler(target).is_active() || self.battler(user).is_fainted() {
                continue;
            }
            if kind == FixedDamage::OneHitKnockout {
                if self.battler(target).level > self.battler(user).level {
                    self.report(user, Some(target), MoveResult::IneffectiveLevel);
                    continue;
                }
                if target_ability(self, user, target) == Ability::Sturdy {
                    self.execute(BattleCommand::TriggerAbility {
                        owner: target,
                        other: Some(user),
                        action: AbilityAction::Damage,
                    })?;
                    self.report(user, Some(target), MoveResult::IneffectiveAbility);
                    continue;
                }
            }
            if self.miss_check(user, target, data, rng)? {
                continue;
            }
            if self.type_check(user, target, data).is_none() {
                continue;
            }

            let (level, user_hp) = {
                let attacker = self.battler(user);
                (attacker.level, attacker.hp)
            };
            let target_hp = self.battler(target).hp;
            let damage = match kind {
                FixedDamage::Set(amount) => amount,
                FixedDamage::Level => u16::from(level),
                FixedDamage::Psywave => {
                    let roll = rng.random_int(0, 100, "psywave");
                    (u32::from(level) * (roll + 50) / 100).max(1) as u16
                }
                FixedDamage::SuperFang => (target_hp / 2).max(1),
                FixedDamage::Endeavor => {
                    if target_hp <= user_hp {
                        self.report(user, Some(target), MoveResult::InvalidConditions);
                        continue;
                    }
                    target_hp - user_hp
                }
                FixedDamage::FinalGambit => user_hp,
                FixedDamage::OneHitKnockout => target_hp,
            };

            if kind == FixedDamage::OneHitKnockout {
                self.deal_damage(target, damage)?;
                let battler = Some(self.reference(target));
                self.emit(BattleEvent::Special {
                    battler,
                    other: None,
                    message: SpecialMessage::OneHitKnockout,
                });
            } else {
                self.deal_attack_damage(user, target, damage)?;
            }
            self.post_hit_effects(user, target, data, move_type, rng)?;
            hit.push(target);

            if kind == FixedDamage::FinalGambit {
                let hp = self.battler(user).hp;
                self.deal_damage(user, hp)?;
            }
        }

        for target in &hit {
            self.faint_check(*target)?;
        }
        if kind == FixedDamage::FinalGambit && !hit.is_empty() {
            self.faint_check(user)?;
        }
        self.post_attack_effects(user, true, None)
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::action::TargetMask;
    use crate::battle::battler::BattlerId;
    use crate::battle::conditions::{MoveResult, TeamConditions, VolatileConditions};
    use crate::battle::events::BattleEvent;
    use crate::battle::rng::BattleRng;
    use crate::battle::tests::common::{create_test_battle, predictable_rng, TestBattlerBuilder};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{Ability, BattleFormat, FieldPosition, Item, Move, Species, Status1};

    fn foe() -> TargetMask {
        TargetMask::foe(FieldPosition::Center)
    }

    #[rstest]
    #[case(Move::SonicBoom, 20)]
    #[case(Move::DragonRage, 40)]
    #[case(Move::SeismicToss, 50)]
    #[case(Move::NightShade, 50)]
    fn fixed_damage_ignores_the_formula(#[case] move_: Move, #[case] expected: u16) {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![move_])],
            vec![TestBattlerBuilder::new(Species::Machamp, 50).with_moves(vec![Move::CloseCombat])],
        );
        let target = BattlerId::new(1, 0);
        let before = battle.battler(target).hp;
        let mut rng = predictable_rng();
        battle
            .use_move(BattlerId::new(0, 0), move_, foe(), false, &mut rng)
            .expect("move resolves");
        assert_eq!(before - battle.battler(target).hp, expected);
    }

    #[test]
    fn super_fang_halves_current_hp() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::SuperFang])],
            vec![TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle])],
        );
        let target = BattlerId::new(1, 0);
        let before = battle.battler(target).hp;
        battle
            .use_move(BattlerId::new(0, 0), Move::SuperFang, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(target).hp, before - before / 2);
    }

    #[test]
    fn one_hit_knockout_fails_against_higher_level() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Lapras, 40).with_moves(vec![Move::SheerCold])],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Tackle])],
        );
        battle
            .use_move(BattlerId::new(0, 0), Move::SheerCold, foe(), false, &mut BattleRng::new_for_test(vec![]))
            .expect("move resolves");
        assert!(battle.events.events().iter().any(|event| matches!(
            event,
            BattleEvent::MoveResultReported {
                result: MoveResult::IneffectiveLevel,
                ..
            }
        )));
    }

    #[test]
    fn recoil_is_a_third_of_damage() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::DoubleEdge])],
            vec![TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle])],
        );
        let user = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        let user_before = battle.battler(user).hp;
        let target_before = battle.battler(target).hp;
        battle
            .use_move(user, Move::DoubleEdge, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        let dealt = target_before - battle.battler(target).hp;
        assert_eq!(user_before - battle.battler(user).hp, (dealt / 3).max(1));
    }

    #[test]
    fn rock_head_prevents_recoil() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Golem, 50)
                .with_moves(vec![Move::DoubleEdge])
                .with_ability(Ability::RockHead)],
            vec![TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle])],
        );
        let user = BattlerId::new(0, 0);
        let before = battle.battler(user).hp;
        battle
            .use_move(user, Move::DoubleEdge, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(user).hp, before);
    }

    #[test]
    fn dream_eater_needs_a_sleeping_target() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::DreamEater])],
            vec![TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle])],
        );
        let target = BattlerId::new(1, 0);
        let before = battle.battler(target).hp;
        battle
            .use_move(BattlerId::new(0, 0), Move::DreamEater, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(target).hp, before);

        battle.battler_mut(target).status1 = Status1::Asleep;
        battle.battler_mut(target).sleep_turns = 3;
        battle.battler_mut(BattlerId::new(0, 0)).hp = 1;
        battle
            .use_move(BattlerId::new(0, 0), Move::DreamEater, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert!(battle.battler(target).hp < before);
        assert!(battle.battler(BattlerId::new(0, 0)).hp > 1);
    }

    #[test]
    fn brick_break_shatters_screens() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Machamp, 50).with_moves(vec![Move::BrickBreak])],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Reflect])],
        );
        battle.teams[1].conditions.insert(TeamConditions::REFLECT | TeamConditions::LIGHT_SCREEN);
        battle.teams[1].reflect_turns = 5;
        battle.teams[1].light_screen_turns = 5;
        battle
            .use_move(BattlerId::new(0, 0), Move::BrickBreak, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert!(battle.teams[1].conditions.is_empty());
    }

    #[test]
    fn sucker_punch_fails_against_status_move() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Zoroark, 50).with_moves(vec![Move::SuckerPunch])],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::SwordsDance])],
        );
        let target = BattlerId::new(1, 0);
        battle.battler_mut(target).selected_action = Some(crate::battle::action::Action::Fight {
            move_: Move::SwordsDance,
            targets: TargetMask::ally(FieldPosition::Center),
        });
        let before = battle.battler(target).hp;
        battle
            .use_move(BattlerId::new(0, 0), Move::SuckerPunch, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(target).hp, before);
    }

    #[test]
    fn power_herb_skips_the_charge_turn() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Charizard, 50)
                .with_moves(vec![Move::Fly])
                .with_item(Item::PowerHerb)],
            vec![TestBattlerBuilder::new(Species::Machamp, 50).with_moves(vec![Move::CloseCombat])],
        );
        let user = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        let before = battle.battler(target).hp;
        battle
            .use_move(user, Move::Fly, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert!(battle.battler(target).hp < before);
        assert_eq!(battle.battler(user).item, Item::None);
        assert!(!battle.battler(user).status2.contains(VolatileConditions::AIRBORNE));
        assert_eq!(battle.battler(user).temp_locked_move, None);
    }

    #[test]
    fn charge_move_stores_targets_then_releases() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Charizard, 50).with_moves(vec![Move::Fly])],
            vec![TestBattlerBuilder::new(Species::Machamp, 50).with_moves(vec![Move::CloseCombat])],
        );
        let user = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        let before = battle.battler(target).hp;
        battle
            .use_move(user, Move::Fly, foe(), false, &mut predictable_rng())
            .expect("charge");
        assert!(battle.battler(user).status2.contains(VolatileConditions::AIRBORNE));
        assert_eq!(battle.battler(target).hp, before);
        let lock = battle.battler(user).temp_locked_move.expect("locked");
        assert_eq!(lock.targets, foe());

        battle
            .use_move(user, Move::Fly, lock.targets, false, &mut predictable_rng())
            .expect("release");
        assert!(!battle.battler(user).status2.contains(VolatileConditions::AIRBORNE));
        assert!(battle.battler(target).hp < before);
        assert_eq!(battle.battler(user).move_slot(Move::Fly).map(|slot| slot.pp), Some(14));
    }
}
