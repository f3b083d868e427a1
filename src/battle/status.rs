use crate::battle::battler::BattlerId;
use crate::battle::calculators::confusion_damage;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::{MoveResult, TeamConditions, VolatileConditions};
use crate::battle::events::{AbilityAction, BattleEvent, ItemAction, StatusAction};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::battle::stats::target_ability;
use crate::errors::BattleResult;
use crate::move_data::get_move_data;
use schema::{Ability, Item, Move, MoveEffect, MoveFlag, PokemonType, Stat, Status1, Weather};
use tracing::debug;

impl Battle {
    fn defending_ability(&self, user: Option<BattlerId>, target: BattlerId) -> Ability {
        match user {
            Some(user) => target_ability(self, user, target),
            None => self.battler(target).ability,
        }
    }

    /// Whether `status` can be given to `target`, and why not.
    ///
    /// A substitute or Safeguard only protects against other battlers; a battler
    /// can always inflict status on itself (Rest, orbs).
    pub fn status1_result(&self, user: Option<BattlerId>, target: BattlerId, status: Status1) -> MoveResult {
        let battler = self.battler(target);
        if battler.status1 != Status1::None {
            return MoveResult::IneffectiveStatus;
        }
        let immune_type = match status {
            Status1::Burned => battler.has_type(PokemonType::Fire),
            Status1::Frozen => battler.has_type(PokemonType::Ice),
            Status1::Poisoned | Status1::BadlyPoisoned => {
                battler.has_type(PokemonType::Poison) || battler.has_type(PokemonType::Steel)
            }
            Status1::Asleep | Status1::Paralyzed | Status1::None => false,
        };
        if immune_type {
            return MoveResult::IneffectiveType;
        }
        let ability = self.defending_ability(user, target);
        let immune_ability = match status {
            Status1::Asleep => matches!(ability, Ability::Insomnia | Ability::VitalSpirit),
            Status1::Burned => ability == Ability::WaterVeil,
            Status1::Frozen => ability == Ability::MagmaArmor,
            Status1::Paralyzed => ability == Ability::Limber,
            Status1::Poisoned | Status1::BadlyPoisoned => ability == Ability::Immunity,
            Status1::None => false,
        };
        if immune_ability
            || (ability == Ability::LeafGuard && self.effective_weather() == Weather::HarshSunlight)
        {
            return MoveResult::IneffectiveAbility;
        }
        let from_other = user.is_some_and(|user| user != target);
        if from_other && battler.status2.contains(VolatileConditions::SUBSTITUTE) {
            return MoveResult::IneffectiveSubstitute;
        }
        if from_other
            && self.teams[target.team]
                .conditions
                .contains(TeamConditions::SAFEGUARD)
        {
            return MoveResult::IneffectiveSafeguard;
        }
        MoveResult::Success
    }

    pub fn confusion_result(&self, user: Option<BattlerId>, target: BattlerId) -> MoveResult {
        let battler = self.battler(target);
        if battler.status2.contains(VolatileConditions::CONFUSED) {
            return MoveResult::IneffectiveStatus;
        }
        if self.defending_ability(user, target) == Ability::OwnTempo {
            return MoveResult::IneffectiveAbility;
        }
        let from_other = user.is_some_and(|user| user != target);
        if from_other && battler.status2.contains(VolatileConditions::SUBSTITUTE) {
            return MoveResult::IneffectiveSubstitute;
        }
        if from_other
            && self.teams[target.team]
                .conditions
                .contains(TeamConditions::SAFEGUARD)
        {
            return MoveResult::IneffectiveSafeguard;
        }
        MoveResult::Success
    }

    pub fn attraction_result(&self, user: BattlerId, target: BattlerId) -> MoveResult {
        let battler = self.battler(target);
        if battler.status2.contains(VolatileConditions::INFATUATED) {
            return MoveResult::IneffectiveStatus;
        }
        if !battler.gender.is_opposite(self.battler(user).gender) {
            return MoveResult::IneffectiveGender;
        }
        if target_ability(self, user, target) == Ability::Oblivious {
            return MoveResult::IneffectiveAbility;
        }
        MoveResult::Success
    }

    fn leech_seed_result(&self, target: BattlerId) -> MoveResult {
        let battler = self.battler(target);
        if battler.status2.contains(VolatileConditions::LEECH_SEED) {
            MoveResult::IneffectiveStatus
        } else if battler.has_type(PokemonType::Grass) {
            MoveResult::IneffectiveType
        } else if battler.status2.contains(VolatileConditions::SUBSTITUTE) {
            MoveResult::IneffectiveSubstitute
        } else {
            MoveResult::Success
        }
    }

    fn transform_result(&self, user: BattlerId, target: BattlerId) -> MoveResult {
        let blocked = VolatileConditions::TRANSFORMED
            | VolatileConditions::SUBSTITUTE
            | VolatileConditions::DISGUISED;
        if self.battler(user).status2.contains(VolatileConditions::TRANSFORMED)
            || self.battler(target).status2.intersects(blocked)
        {
            MoveResult::InvalidConditions
        } else {
            MoveResult::Success
        }
    }

    /// Chance out of 65535 that Protect or a relative succeeds again.
    pub(crate) fn protection_chance(&self, id: BattlerId) -> u32 {
        let counter = u32::from(self.battler(id).protection_counter).min(16);
        u32::from(u16::MAX) >> counter
    }

    fn sleep_duration(&self, target: BattlerId, rng: &mut BattleRng) -> u8 {
        let turns = rng.random_int(
            u32::from(self.settings.sleep_min_turns),
            u32::from(self.settings.sleep_max_turns),
            "sleep duration",
        );
        let divisor = if self.battler(target).ability == Ability::EarlyBird {
            2
        } else {
            1
        };
        (turns / divisor) as u8
    }

    fn report_failure(
        &mut self,
        user: BattlerId,
        target: BattlerId,
        result: MoveResult,
    ) -> BattleResult<()> {
        if result == MoveResult::IneffectiveAbility {
            self.execute(BattleCommand::TriggerAbility {
                owner: target,
                other: Some(user),
                action: AbilityAction::PreventedStatus,
            })?;
        }
        let user = self.reference(user);
        let target = Some(self.reference(target));
        self.emit(BattleEvent::MoveResultReported {
            user,
            target,
            result,
        });
        Ok(())
    }

    /// Gives `status` to `target` when the rules allow it. With `report`, a
    /// failure is announced; secondary effects stay silent.
    pub fn apply_status1_if_possible(
        &mut self,
        user: BattlerId,
        target: BattlerId,
        status: Status1,
        report: bool,
        rng: &mut BattleRng,
    ) -> BattleResult<MoveResult> {
        let result = self.status1_result(Some(user), target, status);
        if result == MoveResult::Success {
            let sleep_turns = if status == Status1::Asleep {
                self.sleep_duration(target, rng)
            } else {
                0
            };
            self.execute(BattleCommand::SetStatus1 {
                target,
                status,
                sleep_turns,
                action: StatusAction::Added,
            })?;
            self.anti_status_ability_check(target)?;
        } else if report {
            self.report_failure(user, target, result)?;
        }
        Ok(result)
    }

    /// Volatile counterpart of `apply_status1_if_possible`.
    pub fn apply_status2_if_possible(
        &mut self,
        user: BattlerId,
        target: BattlerId,
        condition: VolatileConditions,
        report: bool,
        rng: &mut BattleRng,
    ) -> BattleResult<MoveResult> {
        let result = if condition == VolatileConditions::CONFUSED {
            let result = self.confusion_result(Some(user), target);
            if result == MoveResult::Success {
                let turns = rng.random_int(
                    u32::from(self.settings.confusion_min_turns),
                    u32::from(self.settings.confusion_max_turns),
                    "confusion duration",
                );
                self.execute(BattleCommand::AddStatus2 {
                    target,
                    condition,
                    source: Some(user),
                    counter: turns as u16,
                })?;
                self.anti_status_ability_check(target)?;
            }
            result
        } else if condition == VolatileConditions::CURSED {
            if self.battler(target).status2.contains(condition) {
                MoveResult::IneffectiveStatus
            } else {
                self.add_status2(target, condition, Some(user), 0)?;
                let cost = self.battler(user).max_hp / 2;
                self.deal_damage(user, cost)?;
                if !self.faint_check(user)? {
                    self.healing_berry_check(user)?;
                }
                MoveResult::Success
            }
        } else if condition == VolatileConditions::FLINCHING {
            let battler = self.battler(target);
            if battler.has_used_move_this_turn
                || battler.status2.contains(VolatileConditions::SUBSTITUTE)
            {
                MoveResult::InvalidConditions
            } else {
                // Flinching is silent until it stops the battler.
                self.battler_mut(target).status2.insert(condition);
                MoveResult::Success
            }
        } else if condition == VolatileConditions::HELPING_HAND {
            if self.battler(target).has_used_move_this_turn {
                MoveResult::InvalidConditions
            } else {
                self.add_status2(target, condition, Some(user), 0)?;
                MoveResult::Success
            }
        } else if condition == VolatileConditions::INFATUATED {
            let result = self.attraction_result(user, target);
            if result == MoveResult::Success {
                self.cause_infatuation(target, user)?;
            }
            result
        } else if condition == VolatileConditions::LEECH_SEED {
            let result = self.leech_seed_result(target);
            if result == MoveResult::Success {
                self.add_status2(target, condition, Some(user), 0)?;
            }
            result
        } else if condition == VolatileConditions::MAGNET_RISE {
            if self.battler(target).status2.contains(condition) {
                MoveResult::IneffectiveStatus
            } else {
                let turns = u16::from(self.settings.magnet_rise_turns);
                self.add_status2(target, condition, Some(user), turns)?;
                MoveResult::Success
            }
        } else if condition == VolatileConditions::POWER_TRICK {
            let battler = self.battler_mut(target);
            std::mem::swap(&mut battler.stats.attack, &mut battler.stats.defense);
            if battler.status2.contains(condition) {
                self.execute(BattleCommand::RemoveStatus2 {
                    target,
                    condition,
                    action: StatusAction::Ended,
                })?;
            } else {
                self.add_status2(target, condition, Some(user), 0)?;
            }
            MoveResult::Success
        } else if condition == VolatileConditions::PROTECTED {
            let chance = self.protection_chance(user);
            if rng.roll_chance(chance, u32::from(u16::MAX), "protect") {
                self.battler_mut(user).protection_counter += 1;
                self.add_status2(user, condition, Some(user), 0)?;
                MoveResult::Success
            } else {
                self.battler_mut(user).protection_counter = 0;
                MoveResult::InvalidConditions
            }
        } else if condition == VolatileConditions::PUMPED {
            if self.battler(target).status2.contains(condition) {
                MoveResult::IneffectiveStatus
            } else {
                self.add_status2(target, condition, Some(user), 0)?;
                MoveResult::Success
            }
        } else if condition == VolatileConditions::SUBSTITUTE {
            let battler = self.battler(target);
            let cost = battler.max_hp / 4;
            if battler.status2.contains(condition) {
                MoveResult::IneffectiveStatus
            } else if battler.hp <= cost {
                MoveResult::IneffectiveStat
            } else {
                self.deal_damage(target, cost)?;
                self.healing_berry_check(target)?;
                self.add_status2(target, condition, Some(user), cost)?;
                MoveResult::Success
            }
        } else if condition == VolatileConditions::TRANSFORMED {
            let result = self.transform_result(user, target);
            if result == MoveResult::Success {
                self.do_transform(user, target)?;
            }
            result
        } else {
            MoveResult::InvalidConditions
        };

        if report && result != MoveResult::Success {
            self.report_failure(user, target, result)?;
        }
        Ok(result)
    }

    fn add_status2(
        &mut self,
        target: BattlerId,
        condition: VolatileConditions,
        source: Option<BattlerId>,
        counter: u16,
    ) -> BattleResult<()> {
        self.execute(BattleCommand::AddStatus2 {
            target,
            condition,
            source,
            counter,
        })
    }

    pub(crate) fn do_transform(&mut self, user: BattlerId, target: BattlerId) -> BattleResult<()> {
        let lost_power_trick = self
            .battler(user)
            .status2
            .contains(VolatileConditions::POWER_TRICK);
        self.execute(BattleCommand::Transform { user, target })?;
        if lost_power_trick {
            self.execute(BattleCommand::RemoveStatus2 {
                target: user,
                condition: VolatileConditions::POWER_TRICK,
                action: StatusAction::Ended,
            })?;
        }
        Ok(())
    }

    fn cause_infatuation(&mut self, target: BattlerId, other: BattlerId) -> BattleResult<()> {
        self.add_status2(target, VolatileConditions::INFATUATED, Some(other), 0)?;
        if self.battler(target).item == Item::DestinyKnot
            && self.attraction_result(target, other) == MoveResult::Success
        {
            self.execute(BattleCommand::TriggerItem {
                holder: target,
                other: Some(other),
                action: ItemAction::ChangedStatus,
            })?;
            self.add_status2(other, VolatileConditions::INFATUATED, Some(target), 0)?;
        }
        self.anti_status_ability_check(target)
    }

    /// Cures a status the battler's ability forbids. Runs after every grant and
    /// after the battler gains a new ability.
    pub fn anti_status_ability_check(&mut self, id: BattlerId) -> BattleResult<()> {
        let battler = self.battler(id);
        let status1 = battler.status1;
        let status2 = battler.status2;
        let cured_status1 = match battler.ability {
            Ability::Immunity => matches!(status1, Status1::Poisoned | Status1::BadlyPoisoned),
            Ability::Insomnia | Ability::VitalSpirit => status1 == Status1::Asleep,
            Ability::Limber => status1 == Status1::Paralyzed,
            Ability::MagmaArmor => status1 == Status1::Frozen,
            Ability::WaterVeil => status1 == Status1::Burned,
            _ => false,
        };
        let cured_status2 = match battler.ability {
            Ability::Oblivious if status2.contains(VolatileConditions::INFATUATED) => {
                Some(VolatileConditions::INFATUATED)
            }
            Ability::OwnTempo if status2.contains(VolatileConditions::CONFUSED) => {
                Some(VolatileConditions::CONFUSED)
            }
            _ => None,
        };

        if cured_status1 {
            self.execute(BattleCommand::TriggerAbility {
                owner: id,
                other: None,
                action: AbilityAction::ChangedStatus,
            })?;
            self.execute(BattleCommand::SetStatus1 {
                target: id,
                status: Status1::None,
                sleep_turns: 0,
                action: StatusAction::Cured,
            })?;
        }
        if let Some(condition) = cured_status2 {
            self.execute(BattleCommand::TriggerAbility {
                owner: id,
                other: None,
                action: AbilityAction::ChangedStatus,
            })?;
            self.execute(BattleCommand::RemoveStatus2 {
                target: id,
                condition,
                action: StatusAction::Cured,
            })?;
        }
        Ok(())
    }

    /// Ends infatuations aimed at a battler that is leaving the field.
    pub(crate) fn remove_infatuations(&mut self, leaving: BattlerId) -> BattleResult<()> {
        for id in self.active_battlers() {
            let battler = self.battler(id);
            if battler.status2.contains(VolatileConditions::INFATUATED)
                && battler.infatuated_with == Some(leaving)
            {
                self.execute(BattleCommand::RemoveStatus2 {
                    target: id,
                    condition: VolatileConditions::INFATUATED,
                    action: StatusAction::Ended,
                })?;
            }
        }
        Ok(())
    }

    fn emit_status2(
        &mut self,
        id: BattlerId,
        condition: VolatileConditions,
        action: StatusAction,
        source: Option<BattlerId>,
    ) {
        let battler = self.reference(id);
        let source = source.map(|s| self.reference(s));
        self.emit(BattleEvent::Status2Changed {
            battler,
            condition,
            action,
            source,
        });
    }

    fn emit_status1(&mut self, id: BattlerId, status: Status1, action: StatusAction) {
        let battler = self.reference(id);
        self.emit(BattleEvent::Status1Changed {
            battler,
            status,
            action,
        });
    }

    /// Runs the conditions that may stop a battler before it moves. Returns
    /// true when the battler loses its turn.
    ///
    /// Order: sleep or freeze, then flinch, confusion, paralysis, infatuation.
    pub(crate) fn pre_move_status_check(
        &mut self,
        user: BattlerId,
        move_: Move,
        rng: &mut BattleRng,
    ) -> BattleResult<bool> {
        let data = get_move_data(move_)?;
        let status1 = self.battler(user).status1;

        match status1 {
            Status1::Asleep => {
                let battler = self.battler_mut(user);
                battler.status1_counter = battler.status1_counter.saturating_add(1);
                if battler.status1_counter > battler.sleep_turns {
                    self.execute(BattleCommand::SetStatus1 {
                        target: user,
                        status: Status1::None,
                        sleep_turns: 0,
                        action: StatusAction::Ended,
                    })?;
                } else if data.effect != MoveEffect::Snore {
                    self.emit_status1(user, Status1::Asleep, StatusAction::CausedImmobility);
                    return Ok(true);
                }
            }
            Status1::Frozen => {
                if data.has_flag(MoveFlag::DefrostsUser) || rng.roll_chance(20, 100, "thaw") {
                    self.execute(BattleCommand::SetStatus1 {
                        target: user,
                        status: Status1::None,
                        sleep_turns: 0,
                        action: StatusAction::Ended,
                    })?;
                } else {
                    self.emit_status1(user, Status1::Frozen, StatusAction::CausedImmobility);
                    return Ok(true);
                }
            }
            _ => {}
        }

        let status2 = self.battler(user).status2;
        if status2.contains(VolatileConditions::FLINCHING) {
            self.emit_status2(
                user,
                VolatileConditions::FLINCHING,
                StatusAction::CausedImmobility,
                None,
            );
            let battler = self.battler(user);
            if battler.ability == Ability::Steadfast
                && battler.stage(Stat::Speed) < self.settings.max_stat_change
            {
                self.execute(BattleCommand::TriggerAbility {
                    owner: user,
                    other: None,
                    action: AbilityAction::ChangedStats,
                })?;
                self.apply_stat_change(user, user, Stat::Speed, 1)?;
            }
            return Ok(true);
        }

        if status2.contains(VolatileConditions::CONFUSED) {
            let battler = self.battler_mut(user);
            battler.confusion_counter = battler.confusion_counter.saturating_add(1);
            if battler.confusion_counter > battler.confusion_turns {
                self.execute(BattleCommand::RemoveStatus2 {
                    target: user,
                    condition: VolatileConditions::CONFUSED,
                    action: StatusAction::Ended,
                })?;
            } else {
                self.emit_status2(user, VolatileConditions::CONFUSED, StatusAction::Announced, None);
                if rng.roll_chance(50, 100, "confusion self-hit") {
                    self.emit_status2(user, VolatileConditions::CONFUSED, StatusAction::Damage, None);
                    let damage = confusion_damage(self, user);
                    self.deal_damage(user, damage)?;
                    // Healing berries stay put after confusion damage.
                    self.faint_check(user)?;
                    return Ok(true);
                }
            }
        }

        if self.battler(user).status1 == Status1::Paralyzed && rng.roll_chance(25, 100, "full paralysis")
        {
            self.emit_status1(user, Status1::Paralyzed, StatusAction::CausedImmobility);
            return Ok(true);
        }

        let battler = self.battler(user);
        if battler.status2.contains(VolatileConditions::INFATUATED) {
            let partner = battler.infatuated_with;
            self.emit_status2(user, VolatileConditions::INFATUATED, StatusAction::Announced, partner);
            if rng.roll_chance(50, 100, "infatuation") {
                self.emit_status2(
                    user,
                    VolatileConditions::INFATUATED,
                    StatusAction::CausedImmobility,
                    partner,
                );
                return Ok(true);
            }
        }
        debug!(?user, ?move_, "passed pre-move checks");
        Ok(false)
    }
}
