//! Move resolution. `use_move` picks the live targets, announces the move,
//! spends PP and hands off to exactly one handler per effect tag. Handlers live
//! in the family modules and share the hit primitives defined here.

mod damage_effects;
mod special_effects;
mod stat_effects;
mod status_effects;

use crate::battle::action::TargetMask;
use crate::battle::battler::{BattlerId, MoveLock};
use crate::battle::calculators::{
    calculate_damage, is_critical_hit, move_hits, move_type_for, type_effectiveness_against,
    DamageContext,
};
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::{MoveResult, TeamConditions, VolatileConditions};
use crate::battle::events::{AbilityAction, BattleEvent, LockKind, SpecialMessage, StatusAction};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::battle::stats::target_ability;
use crate::errors::BattleResult;
use crate::move_data::get_move_data;
use schema::{Ability, Item, Move, MoveCategory, MoveData, MoveEffect, MoveFlag, MoveTarget, Stat};
use tracing::debug;

use self::damage_effects::FixedDamage;

/// One use of a move, as seen by its handler.
#[derive(Debug, Clone)]
pub(crate) struct EffectContext {
    pub user: BattlerId,
    /// Live targets, foes first. Empty for side and field moves.
    pub targets: Vec<BattlerId>,
    pub data: &'static MoveData,
    /// The mask that was requested, kept for charge-move locks.
    pub requested: TargetMask,
    /// Called through another move rather than chosen.
    pub called: bool,
}

/// Extension points of `basic_hit`. Every method defaults to doing nothing.
pub(crate) trait HitHooks {
    /// Returning false skips the damage step for this target.
    fn before_doing_damage(
        &mut self,
        _battle: &mut Battle,
        _context: &EffectContext,
        _target: BattlerId,
    ) -> BattleResult<bool> {
        Ok(true)
    }

    fn before_post_hit(
        &mut self,
        _battle: &mut Battle,
        _context: &EffectContext,
        _target: BattlerId,
        _dealt: u16,
    ) -> BattleResult<()> {
        Ok(())
    }

    /// Runs only when the target is still standing and had no substitute.
    fn after_post_hit(
        &mut self,
        _battle: &mut Battle,
        _context: &EffectContext,
        _target: BattlerId,
        _rng: &mut BattleRng,
    ) -> BattleResult<()> {
        Ok(())
    }

    /// Runs once per use, after every target was processed.
    fn before_targets_faint(
        &mut self,
        _battle: &mut Battle,
        _context: &EffectContext,
        _hit: &[BattlerId],
        _rng: &mut BattleRng,
    ) -> BattleResult<()> {
        Ok(())
    }

    fn recoil(&self, _battle: &Battle, _context: &EffectContext, _total_dealt: u16) -> Option<u16> {
        None
    }
}

/// A hit with no extra behavior.
pub(crate) struct PlainHit;

impl HitHooks for PlainHit {}

impl Battle {
    /// Resolves one use of `move_`. Called moves skip the pre-move checks, PP
    /// and move recording.
    pub(crate) fn use_move(
        &mut self,
        user: BattlerId,
        move_: Move,
        requested: TargetMask,
        called: bool,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let data = get_move_data(move_)?;
        if !called && self.pre_move_status_check(user, move_, rng)? {
            self.cancel_charge(user)?;
            self.battler_mut(user).has_used_move_this_turn = true;
            return Ok(());
        }
        if self.battler(user).is_fainted() {
            return Ok(());
        }

        let targets = self.runtime_targets(user, data, requested, rng);
        self.announce_move(user, move_, called);
        let charges = matches!(data.effect, MoveEffect::Dig | MoveEffect::Dive | MoveEffect::Fly);
        if !called && !charges && data.effect != MoveEffect::Struggle {
            self.execute(BattleCommand::ReducePp {
                target: user,
                move_,
                amount: 1,
            })?;
        }

        let context = EffectContext {
            user,
            targets,
            data,
            requested,
            called,
        };
        debug!(?user, ?move_, targets = ?context.targets, "resolving move");

        if context.targets.is_empty() && needs_target(data.target) {
            self.report(user, None, MoveResult::NoTarget);
        } else {
            self.dispatch_effect(&context, rng)?;
        }

        if !called && data.effect != MoveEffect::Metronome {
            self.record_executed_move(user, move_, data)?;
        }
        Ok(())
    }

    fn dispatch_effect(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        use schema::Status1 as S;
        use schema::Weather as W;
        let param = context.data.effect_param;
        let chance = param.clamp(0, 100) as u32;
        match context.data.effect {
            // Plain and secondary-effect hits
            MoveEffect::Hit => self.basic_hit(context, &mut PlainHit, rng),
            MoveEffect::HitMaybeBurn => self.hit_maybe_status(context, S::Burned, chance, 0, rng),
            MoveEffect::HitMaybeBurnFlinch => self.hit_maybe_status(context, S::Burned, chance, 10, rng),
            MoveEffect::HitMaybeFreeze => self.hit_maybe_status(context, S::Frozen, chance, 0, rng),
            MoveEffect::HitMaybeFreezeFlinch => {
                self.hit_maybe_status(context, S::Frozen, chance, 10, rng)
            }
            MoveEffect::HitMaybeParalyze => {
                self.hit_maybe_status(context, S::Paralyzed, chance, 0, rng)
            }
            MoveEffect::HitMaybeParalyzeFlinch => {
                self.hit_maybe_status(context, S::Paralyzed, chance, 10, rng)
            }
            MoveEffect::HitMaybePoison => self.hit_maybe_status(context, S::Poisoned, chance, 0, rng),
            MoveEffect::HitMaybeToxic => {
                self.hit_maybe_status(context, S::BadlyPoisoned, chance, 0, rng)
            }
            MoveEffect::HitMaybeConfuse => {
                self.hit_maybe_volatile(context, VolatileConditions::CONFUSED, chance, rng)
            }
            MoveEffect::HitMaybeFlinch => {
                self.hit_maybe_volatile(context, VolatileConditions::FLINCHING, chance, rng)
            }
            MoveEffect::HitMaybeLowerTargetAcc => {
                self.hit_maybe_target_stats(context, &[(Stat::Accuracy, -1)], chance, rng)
            }
            MoveEffect::HitMaybeLowerTargetAtk => {
                self.hit_maybe_target_stats(context, &[(Stat::Attack, -1)], chance, rng)
            }
            MoveEffect::HitMaybeLowerTargetDef => {
                self.hit_maybe_target_stats(context, &[(Stat::Defense, -1)], chance, rng)
            }
            MoveEffect::HitMaybeLowerTargetSpAtk => {
                self.hit_maybe_target_stats(context, &[(Stat::SpAttack, -1)], chance, rng)
            }
            MoveEffect::HitMaybeLowerTargetSpDef => {
                self.hit_maybe_target_stats(context, &[(Stat::SpDefense, -1)], chance, rng)
            }
            MoveEffect::HitMaybeLowerTargetSpDefBy2 => {
                self.hit_maybe_target_stats(context, &[(Stat::SpDefense, -2)], chance, rng)
            }
            MoveEffect::HitMaybeLowerTargetSpe => {
                self.hit_maybe_target_stats(context, &[(Stat::Speed, -1)], chance, rng)
            }
            MoveEffect::HitMaybeLowerUserAtkDef => self.hit_maybe_user_stats(
                context,
                &[(Stat::Attack, -1), (Stat::Defense, -1)],
                chance,
                rng,
            ),
            MoveEffect::HitMaybeLowerUserDefSpDef => self.hit_maybe_user_stats(
                context,
                &[(Stat::Defense, -1), (Stat::SpDefense, -1)],
                chance,
                rng,
            ),
            MoveEffect::HitMaybeLowerUserSpAtkBy2 => {
                self.hit_maybe_user_stats(context, &[(Stat::SpAttack, -2)], chance, rng)
            }
            MoveEffect::HitMaybeLowerUserSpe => {
                self.hit_maybe_user_stats(context, &[(Stat::Speed, -1)], chance, rng)
            }
            MoveEffect::HitMaybeLowerUserSpeDefSpDef => self.hit_maybe_user_stats(
                context,
                &[(Stat::Speed, -1), (Stat::Defense, -1), (Stat::SpDefense, -1)],
                chance,
                rng,
            ),
            MoveEffect::HitMaybeRaiseUserAllStats => self.hit_maybe_user_stats(
                context,
                &[
                    (Stat::Attack, 1),
                    (Stat::Defense, 1),
                    (Stat::SpAttack, 1),
                    (Stat::SpDefense, 1),
                    (Stat::Speed, 1),
                ],
                chance,
                rng,
            ),
            MoveEffect::HitMaybeRaiseUserAtk => {
                self.hit_maybe_user_stats(context, &[(Stat::Attack, 1)], chance, rng)
            }
            MoveEffect::HitMaybeRaiseUserDef => {
                self.hit_maybe_user_stats(context, &[(Stat::Defense, 1)], chance, rng)
            }
            MoveEffect::HitMaybeRaiseUserSpAtk => {
                self.hit_maybe_user_stats(context, &[(Stat::SpAttack, 1)], chance, rng)
            }
            MoveEffect::HitMaybeRaiseUserSpe => {
                self.hit_maybe_user_stats(context, &[(Stat::Speed, 1)], chance, rng)
            }
            MoveEffect::Recoil => self.recoil_hit(context, param.max(1) as u16, None, rng),
            MoveEffect::RecoilMaybeBurn => {
                self.recoil_hit(context, 3, Some((S::Burned, chance)), rng)
            }
            MoveEffect::RecoilMaybeParalyze => {
                self.recoil_hit(context, 3, Some((S::Paralyzed, chance)), rng)
            }
            MoveEffect::HpDrain => self.drain_hit(context, param.max(0) as u16, false, rng),
            MoveEffect::HpDrainRequireSleep => self.drain_hit(context, param.max(0) as u16, true, rng),
            MoveEffect::Snore => self.snore(context, chance, rng),
            MoveEffect::BrickBreak => self.brick_break(context, rng),
            MoveEffect::SuckerPunch => self.sucker_punch(context, rng),
            MoveEffect::Struggle => self.struggle(context, rng),
            MoveEffect::Selfdestruct => self.selfdestruct(context, rng),
            MoveEffect::Dig => self.charge_move(context, VolatileConditions::UNDERGROUND, rng),
            MoveEffect::Dive => self.charge_move(context, VolatileConditions::UNDERWATER, rng),
            MoveEffect::Fly => self.charge_move(context, VolatileConditions::AIRBORNE, rng),

            // Fixed and ratio damage
            MoveEffect::SetDamage => {
                self.fixed_damage_hit(context, FixedDamage::Set(param.max(0) as u16), rng)
            }
            MoveEffect::SeismicToss => self.fixed_damage_hit(context, FixedDamage::Level, rng),
            MoveEffect::Psywave => self.fixed_damage_hit(context, FixedDamage::Psywave, rng),
            MoveEffect::SuperFang => self.fixed_damage_hit(context, FixedDamage::SuperFang, rng),
            MoveEffect::Endeavor => self.fixed_damage_hit(context, FixedDamage::Endeavor, rng),
            MoveEffect::FinalGambit => self.fixed_damage_hit(context, FixedDamage::FinalGambit, rng),
            MoveEffect::OneHitKnockout => {
                self.fixed_damage_hit(context, FixedDamage::OneHitKnockout, rng)
            }

            // Forced status
            MoveEffect::Burn => self.force_status1(context, S::Burned, rng),
            MoveEffect::Paralyze => self.force_status1(context, S::Paralyzed, rng),
            MoveEffect::Poison => self.force_status1(context, S::Poisoned, rng),
            MoveEffect::Toxic => self.force_status1(context, S::BadlyPoisoned, rng),
            MoveEffect::Sleep => self.force_status1(context, S::Asleep, rng),
            MoveEffect::Confuse => self.force_status2(context, VolatileConditions::CONFUSED, rng),
            MoveEffect::Attract => self.force_status2(context, VolatileConditions::INFATUATED, rng),
            MoveEffect::LeechSeed => self.force_status2(context, VolatileConditions::LEECH_SEED, rng),
            MoveEffect::Transform => self.force_status2(context, VolatileConditions::TRANSFORMED, rng),
            MoveEffect::FocusEnergy => self.self_status2(context, VolatileConditions::PUMPED, rng),
            MoveEffect::MagnetRise => self.self_status2(context, VolatileConditions::MAGNET_RISE, rng),
            MoveEffect::PowerTrick => self.self_status2(context, VolatileConditions::POWER_TRICK, rng),
            MoveEffect::Protect => self.self_status2(context, VolatileConditions::PROTECTED, rng),
            MoveEffect::Substitute => self.self_status2(context, VolatileConditions::SUBSTITUTE, rng),
            MoveEffect::HelpingHand => self.helping_hand(context, rng),
            MoveEffect::Curse => self.curse(context, rng),
            MoveEffect::Flatter => self.flatter(context, Stat::SpAttack, param as i8, rng),
            MoveEffect::Swagger => self.flatter(context, Stat::Attack, param as i8, rng),

            // Stat stages
            MoveEffect::ChangeTargetAcc => {
                self.change_target_stats(context, &[(Stat::Accuracy, param as i8)], false, rng)
            }
            MoveEffect::ChangeTargetAtk => {
                self.change_target_stats(context, &[(Stat::Attack, param as i8)], false, rng)
            }
            MoveEffect::ChangeTargetDef => {
                self.change_target_stats(context, &[(Stat::Defense, param as i8)], false, rng)
            }
            MoveEffect::ChangeTargetEva => {
                self.change_target_stats(context, &[(Stat::Evasion, param as i8)], false, rng)
            }
            MoveEffect::ChangeTargetSpAtk => {
                self.change_target_stats(context, &[(Stat::SpAttack, param as i8)], false, rng)
            }
            MoveEffect::ChangeTargetSpAtkIfAttractionPossible => {
                self.change_target_stats(context, &[(Stat::SpAttack, param as i8)], true, rng)
            }
            MoveEffect::ChangeTargetSpDef => {
                self.change_target_stats(context, &[(Stat::SpDefense, param as i8)], false, rng)
            }
            MoveEffect::ChangeTargetSpe => {
                self.change_target_stats(context, &[(Stat::Speed, param as i8)], false, rng)
            }
            MoveEffect::LowerTargetAtkDef => self.change_target_stats(
                context,
                &[(Stat::Attack, param as i8), (Stat::Defense, param as i8)],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetAtkAcc => self.change_target_stats(
                context,
                &[(Stat::Attack, param as i8), (Stat::Accuracy, param as i8)],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetAtkDef => self.change_target_stats(
                context,
                &[(Stat::Attack, param as i8), (Stat::Defense, param as i8)],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetAtkDefAcc => self.change_target_stats(
                context,
                &[
                    (Stat::Attack, param as i8),
                    (Stat::Defense, param as i8),
                    (Stat::Accuracy, param as i8),
                ],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetAtkSpAtk => self.change_target_stats(
                context,
                &[(Stat::Attack, param as i8), (Stat::SpAttack, param as i8)],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetAtkSpe => self.change_target_stats(
                context,
                &[(Stat::Attack, param as i8), (Stat::Speed, param as i8)],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetDefSpDef => self.change_target_stats(
                context,
                &[(Stat::Defense, param as i8), (Stat::SpDefense, param as i8)],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetSpAtkSpDef => self.change_target_stats(
                context,
                &[(Stat::SpAttack, param as i8), (Stat::SpDefense, param as i8)],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetSpAtkSpDefSpe => self.change_target_stats(
                context,
                &[
                    (Stat::SpAttack, param as i8),
                    (Stat::SpDefense, param as i8),
                    (Stat::Speed, param as i8),
                ],
                false,
                rng,
            ),
            MoveEffect::RaiseTargetSpeBy2AtkBy1 => self.change_target_stats(
                context,
                &[(Stat::Speed, 2), (Stat::Attack, 1)],
                false,
                rng,
            ),
            MoveEffect::ShellSmash => self.shell_smash(context),
            MoveEffect::Growth => self.growth(context, param as i8, rng),
            MoveEffect::PsychUp => self.psych_up(context, rng),
            MoveEffect::Haze => self.haze(context),

            // Team and field
            MoveEffect::Reflect => self.screen(context, TeamConditions::REFLECT),
            MoveEffect::LightScreen => self.screen(context, TeamConditions::LIGHT_SCREEN),
            MoveEffect::Safeguard => self.team_condition(
                context,
                context.user.team,
                TeamConditions::SAFEGUARD,
                self.settings.safeguard_turns,
            ),
            MoveEffect::LuckyChant => self.team_condition(
                context,
                context.user.team,
                TeamConditions::LUCKY_CHANT,
                self.settings.lucky_chant_turns,
            ),
            MoveEffect::Tailwind => self.team_condition(
                context,
                context.user.team,
                TeamConditions::TAILWIND,
                self.settings.tailwind_turns,
            ),
            MoveEffect::Spikes => self.entry_hazard(context, TeamConditions::SPIKES),
            MoveEffect::ToxicSpikes => self.entry_hazard(context, TeamConditions::TOXIC_SPIKES),
            MoveEffect::StealthRock => self.entry_hazard(context, TeamConditions::STEALTH_ROCK),
            MoveEffect::WideGuard => self.wide_guard(context, rng),
            MoveEffect::TrickRoom => self.trick_room(),

            // Weather
            MoveEffect::RainDance => self.weather_move(context, W::Rain),
            MoveEffect::SunnyDay => self.weather_move(context, W::HarshSunlight),
            MoveEffect::Sandstorm => self.weather_move(context, W::Sandstorm),
            MoveEffect::Hail => self.weather_move(context, W::Hailstorm),

            // Specials
            MoveEffect::Conversion => self.conversion(context, rng),
            MoveEffect::Soak => self.soak(context, rng),
            MoveEffect::GastroAcid => self.gastro_acid(context, rng),
            MoveEffect::SimpleBeam => self.simple_beam(context, rng),
            MoveEffect::PainSplit => self.pain_split(context, rng),
            MoveEffect::Moonlight => self.moonlight(context),
            MoveEffect::Rest => self.rest(context),
            MoveEffect::RestoreTargetHp => self.restore_target_hp(context, param.max(0) as u16, rng),
            MoveEffect::Metronome => self.metronome(context, rng),
            MoveEffect::Nothing => self.nothing(context),
            MoveEffect::Teleport => {
                self.report(context.user, None, MoveResult::InvalidConditions);
                Ok(())
            }
            MoveEffect::Whirlwind => self.whirlwind(context, rng),
        }
    }

    /// Turns a requested mask into the battlers it currently points at. A
    /// single foe that left is replaced by another eligible foe.
    fn runtime_targets(
        &self,
        user: BattlerId,
        data: &MoveData,
        requested: TargetMask,
        rng: &mut BattleRng,
    ) -> Vec<BattlerId> {
        let adjacent_foes = || -> Vec<BattlerId> {
            self.foes_of(user)
                .into_iter()
                .filter(|foe| self.are_adjacent(user, *foe))
                .collect()
        };
        match data.target {
            MoveTarget::User => return vec![user],
            MoveTarget::AllTeam | MoveTarget::AllFoes | MoveTarget::All => return Vec::new(),
            MoveTarget::RandomFoeSurrounding => {
                let foes = adjacent_foes();
                if foes.is_empty() {
                    return Vec::new();
                }
                let index = rng.random_index(foes.len(), "random target");
                return vec![foes[index]];
            }
            MoveTarget::Varies if !self.battler(user).has_type(schema::PokemonType::Ghost) => {
                return vec![user];
            }
            _ => {}
        }

        let targets: Vec<BattlerId> = requested
            .positions()
            .into_iter()
            .filter_map(|(is_foe, position)| {
                let team = if is_foe { user.opposing_team() } else { user.team };
                self.battler_at(team, position)
            })
            .collect();
        let single = !data.target.is_spread();
        let aimed_at_foe = requested.positions().iter().any(|(is_foe, _)| *is_foe);
        if targets.is_empty() && single && aimed_at_foe {
            let candidates = if data.target == MoveTarget::SingleNotSelf {
                self.foes_of(user)
            } else {
                adjacent_foes()
            };
            if candidates.is_empty() {
                return Vec::new();
            }
            let index = rng.random_index(candidates.len(), "redirected target");
            return vec![candidates[index]];
        }
        targets
    }

    fn announce_move(&mut self, user: BattlerId, move_: Move, called: bool) {
        let battler = self.battler_mut(user);
        let reveals =
            !called && battler.move_slot(move_).is_some() && !battler.known_moves.contains(&move_);
        if reveals {
            battler.known_moves.push(move_);
        }
        let user = battler.reference();
        self.emit(BattleEvent::MoveUsed {
            user,
            move_,
            reveals,
        });
    }

    /// Marks the battler as having acted and applies a choice lock.
    pub(crate) fn record_executed_move(
        &mut self,
        user: BattlerId,
        move_: Move,
        data: &MoveData,
    ) -> BattleResult<()> {
        let battler = self.battler_mut(user);
        battler.has_used_move_this_turn = true;
        if !matches!(data.effect, MoveEffect::Protect | MoveEffect::WideGuard) {
            battler.protection_counter = 0;
        }
        if battler.is_fainted() {
            return Ok(());
        }
        if battler.item.is_choice_item()
            && battler.move_slot(move_).is_some()
            && battler.choice_locked_move != Some(move_)
        {
            self.execute(BattleCommand::SetMoveLock {
                target: user,
                kind: LockKind::Choice,
                lock: Some(MoveLock {
                    move_,
                    targets: TargetMask::empty(),
                }),
            })?;
        }
        Ok(())
    }

    /// Drops a half-finished charge move when the battler cannot act.
    fn cancel_charge(&mut self, user: BattlerId) -> BattleResult<()> {
        let hiding = self.battler(user).status2 & VolatileConditions::SEMI_INVULNERABLE;
        if !hiding.is_empty() {
            self.execute(BattleCommand::RemoveStatus2 {
                target: user,
                condition: hiding,
                action: StatusAction::Ended,
            })?;
        }
        if self.battler(user).temp_locked_move.is_some() {
            self.execute(BattleCommand::SetMoveLock {
                target: user,
                kind: LockKind::Temporary,
                lock: None,
            })?;
        }
        Ok(())
    }

    pub(crate) fn report(&mut self, user: BattlerId, target: Option<BattlerId>, result: MoveResult) {
        let user = self.reference(user);
        let target = target.map(|id| self.reference(id));
        self.emit(BattleEvent::MoveResultReported {
            user,
            target,
            result,
        });
    }

    /// Returns true when the move fails to reach `target`: protection, Wide
    /// Guard, or the accuracy roll.
    pub(crate) fn miss_check(
        &mut self,
        user: BattlerId,
        target: BattlerId,
        data: &MoveData,
        rng: &mut BattleRng,
    ) -> BattleResult<bool> {
        if user == target {
            return Ok(false);
        }
        if self.battler(target).status2.contains(VolatileConditions::PROTECTED)
            && data.has_flag(MoveFlag::AffectedByProtect)
        {
            let battler = self.reference(target);
            let source = Some(self.reference(user));
            self.emit(BattleEvent::Status2Changed {
                battler,
                condition: VolatileConditions::PROTECTED,
                action: StatusAction::Announced,
                source,
            });
            return Ok(true);
        }
        if self.teams[target.team]
            .conditions
            .contains(TeamConditions::WIDE_GUARD)
            && data.category != MoveCategory::Status
            && data.target.is_spread()
        {
            let victim = Some(self.reference(target));
            self.emit(BattleEvent::TeamConditionChanged {
                team: target.team,
                condition: TeamConditions::WIDE_GUARD,
                action: StatusAction::Damage,
                victim,
            });
            return Ok(true);
        }
        if !move_hits(self, user, target, data, rng) {
            let user = self.reference(user);
            let target = self.reference(target);
            self.emit(BattleEvent::MoveMissed { user, target });
            return Ok(true);
        }
        Ok(false)
    }

    /// Effectiveness of the move against `target`, or None after reporting an
    /// immunity.
    pub(crate) fn type_check(
        &mut self,
        user: BattlerId,
        target: BattlerId,
        data: &MoveData,
    ) -> Option<f64> {
        let effectiveness = type_effectiveness_against(self, user, target, move_type_for(data));
        if effectiveness == 0.0 {
            self.report(user, Some(target), MoveResult::IneffectiveType);
            None
        } else {
            Some(effectiveness)
        }
    }

    fn report_effectiveness(&mut self, user: BattlerId, target: BattlerId, effectiveness: f64) {
        if effectiveness > 1.0 {
            self.report(user, Some(target), MoveResult::SuperEffective);
        } else if effectiveness < 1.0 {
            self.report(user, Some(target), MoveResult::NotVeryEffective);
        }
    }

    /// Applies attack damage. A substitute soaks it; otherwise Sturdy or a
    /// Focus Sash leave a full-HP target at 1 HP. Returns the damage taken.
    pub(crate) fn deal_attack_damage(
        &mut self,
        user: BattlerId,
        target: BattlerId,
        damage: u16,
    ) -> BattleResult<u16> {
        let battler = self.battler(target);
        if user != target && battler.status2.contains(VolatileConditions::SUBSTITUTE) {
            let absorbed = damage.min(battler.substitute_hp);
            self.battler_mut(target).substitute_hp -= absorbed;
            let battler = self.reference(target);
            let source = Some(self.reference(user));
            self.emit(BattleEvent::Status2Changed {
                battler,
                condition: VolatileConditions::SUBSTITUTE,
                action: StatusAction::Damage,
                source,
            });
            return Ok(absorbed);
        }

        let mut damage = damage;
        let mut endured = false;
        if battler.hp == battler.max_hp && damage >= battler.hp {
            if target_ability(self, user, target) == Ability::Sturdy {
                damage = battler.hp - 1;
                endured = true;
                self.execute(BattleCommand::TriggerAbility {
                    owner: target,
                    other: Some(user),
                    action: AbilityAction::Damage,
                })?;
            } else if battler.item == Item::FocusSash {
                damage = battler.hp - 1;
                endured = true;
                self.execute(BattleCommand::ConsumeItem { target })?;
            }
        }
        let dealt = self.deal_damage(target, damage)?;
        if endured {
            let battler = Some(self.reference(target));
            self.emit(BattleEvent::Special {
                battler,
                other: None,
                message: SpecialMessage::Endure,
            });
        }
        Ok(dealt)
    }

    /// The standard damaging sequence, per target: protection and accuracy,
    /// immunity, damage, crit and effectiveness reports, post-hit triggers and
    /// secondary effects. Faint checks, recoil and Life Orb follow once.
    pub(crate) fn basic_hit<H: HitHooks>(
        &mut self,
        context: &EffectContext,
        hooks: &mut H,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        let data = context.data;
        let move_type = move_type_for(data);
        let spread = data.target.is_spread() && context.targets.len() > 1;
        let mut hit = Vec::with_capacity(context.targets.len());
        let mut total_dealt = 0u16;

        for &target in &context.targets {
            if !self.battler(target).is_active() {
                continue;
            }
            if self.miss_check(user, target, data, rng)? {
                continue;
            }
            let Some(effectiveness) = self.type_check(user, target, data) else {
                continue;
            };
            if !hooks.before_doing_damage(self, context, target)? {
                continue;
            }

            let crit = is_critical_hit(self, user, target, data, rng);
            let damage = calculate_damage(
                self,
                user,
                target,
                data,
                DamageContext {
                    crit,
                    spread,
                    effectiveness,
                },
            );
            let had_substitute = self.battler(target).status2.contains(VolatileConditions::SUBSTITUTE);
            let dealt = self.deal_attack_damage(user, target, damage)?;
            if crit {
                let target = self.reference(target);
                self.emit(BattleEvent::MoveCrit { target });
            }
            self.report_effectiveness(user, target, effectiveness);
            total_dealt = total_dealt.saturating_add(dealt);

            hooks.before_post_hit(self, context, target, dealt)?;
            self.post_hit_effects(user, target, data, move_type, rng)?;
            if !had_substitute && !self.battler(target).is_fainted() {
                hooks.after_post_hit(self, context, target, rng)?;
            }
            hit.push(target);
        }

        hooks.before_targets_faint(self, context, &hit, rng)?;
        for target in &hit {
            self.faint_check(*target)?;
        }
        let recoil = if total_dealt > 0 {
            hooks.recoil(self, context, total_dealt)
        } else {
            None
        };
        self.post_attack_effects(user, hit.is_empty(), recoil)
    }

    /// Applies a stage change. The target's Simple doubles it unless the user
    /// breaks molds.
    pub(crate) fn apply_stat_change(
        &mut self,
        user: BattlerId,
        target: BattlerId,
        stat: Stat,
        change: i8,
    ) -> BattleResult<()> {
        let change = if target_ability(self, user, target) == Ability::Simple {
            change.saturating_mul(2)
        } else {
            change
        };
        let stage = self.battler(target).stage(stat).saturating_add(change);
        self.execute(BattleCommand::SetStatStage {
            target,
            stat,
            stage,
        })
    }

    /// Whether any of `changes` would move a stage off its limit.
    pub(crate) fn stat_change_possible(&self, target: BattlerId, changes: &[(Stat, i8)]) -> bool {
        let max = self.settings.max_stat_change;
        let battler = self.battler(target);
        changes.iter().any(|(stat, change)| {
            let stage = battler.stage(*stat);
            (*change > 0 && stage < max) || (*change < 0 && stage > -max)
        })
    }

    /// Replaces an ability and re-runs everything that depends on it.
    pub(crate) fn set_ability(
        &mut self,
        target: BattlerId,
        ability: Ability,
        changed_by: BattlerId,
    ) -> BattleResult<()> {
        self.execute(BattleCommand::SetAbility { target, ability })?;
        self.castform_cherrim_check(target)?;
        self.illusion_break(target, changed_by)?;
        let battler = self.battler_mut(target);
        battler.slow_start_turns = 0;
        battler.speed_boost_ready = false;
        self.anti_status_ability_check(target)
    }
}

fn needs_target(target: MoveTarget) -> bool {
    !matches!(
        target,
        MoveTarget::AllTeam | MoveTarget::AllFoes | MoveTarget::All
    )
}
