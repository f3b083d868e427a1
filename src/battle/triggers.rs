//! Ability and item triggers grouped by when they fire: on switch-in, after a
//! hit lands, after an attack finishes, and whenever HP drops.
//!
//! The order of the checks inside each family is fixed and observable in the
//! event log, so each function reads top to bottom in firing order.

use crate::battle::battler::BattlerId;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::{MoveResult, TeamConditions, VolatileConditions};
use crate::battle::events::{AbilityAction, BattleEvent, ItemAction, SpecialMessage, StatusAction};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::battle::stats::{effective_speed, stat_stage_multiplier};
use crate::errors::BattleResult;
use ordered_float::OrderedFloat;
use schema::{
    Ability, Item, MoveCategory, MoveData, MoveFlag, PokemonType, Species, Stat, Status1, Weather,
};
use tracing::trace;

const ORAN_BERRY_HEAL: u16 = 10;

impl Battle {
    /// Fastest first. Ties keep field order so no random draw is spent.
    pub(crate) fn speed_order(&self, mut ids: Vec<BattlerId>) -> Vec<BattlerId> {
        ids.sort_by_key(|id| std::cmp::Reverse(OrderedFloat(effective_speed(self, *id))));
        ids
    }

    /// Hazards, form checks and entry abilities for battlers that just arrived.
    pub(crate) fn switch_in_sweep(&mut self, arrivals: Vec<BattlerId>) -> BattleResult<()> {
        for id in self.speed_order(arrivals) {
            if !self.battler(id).is_active() {
                continue;
            }
            if self.entry_hazards(id)? {
                continue;
            }
            self.castform_cherrim_check(id)?;
            self.anti_status_ability_check(id)?;
            self.entry_ability(id)?;
        }
        Ok(())
    }

    fn emit_hazard_damage(&mut self, id: BattlerId, condition: TeamConditions) {
        let victim = Some(self.reference(id));
        self.emit(BattleEvent::TeamConditionChanged {
            team: id.team,
            condition,
            action: StatusAction::Damage,
            victim,
        });
    }

    /// Returns true when the hazards knocked the battler out.
    fn entry_hazards(&mut self, id: BattlerId) -> BattleResult<bool> {
        let grounded = self.battler(id).is_grounded();
        let side = &self.teams[id.team];
        let spikes = side.spikes_layers;
        let stealth_rock = side.conditions.contains(TeamConditions::STEALTH_ROCK);
        let toxic_spikes = side.toxic_spikes_layers;

        if grounded && spikes > 0 {
            self.emit_hazard_damage(id, TeamConditions::SPIKES);
            let divisor = 10 - 2 * u16::from(spikes);
            let damage = (self.battler(id).max_hp / divisor).max(1);
            self.deal_damage(id, damage)?;
            if self.faint_check(id)? {
                return Ok(true);
            }
            self.healing_berry_check(id)?;
        }

        if stealth_rock {
            let battler = self.battler(id);
            let effectiveness = PokemonType::dual_effectiveness(PokemonType::Rock, battler.types);
            let damage = (f64::from(battler.max_hp) * effectiveness
                / f64::from(self.settings.stealth_rock_denominator)) as u16;
            self.emit_hazard_damage(id, TeamConditions::STEALTH_ROCK);
            self.deal_damage(id, damage.max(1))?;
            if self.faint_check(id)? {
                return Ok(true);
            }
            self.healing_berry_check(id)?;
        }

        if grounded && toxic_spikes > 0 {
            if self.battler(id).has_type(PokemonType::Poison) {
                self.execute(BattleCommand::ClearTeamCondition {
                    team: id.team,
                    condition: TeamConditions::TOXIC_SPIKES,
                    action: StatusAction::Cured,
                })?;
            } else {
                let status = if toxic_spikes == 1 {
                    Status1::Poisoned
                } else {
                    Status1::BadlyPoisoned
                };
                // Hazards ignore substitutes and Safeguard, so no user is passed.
                if self.status1_result(None, id, status) == MoveResult::Success {
                    self.execute(BattleCommand::SetStatus1 {
                        target: id,
                        status,
                        sleep_turns: 0,
                        action: StatusAction::Added,
                    })?;
                    self.anti_status_ability_check(id)?;
                }
            }
        }
        Ok(false)
    }

    fn set_ability_weather(&mut self, id: BattlerId, weather: Weather) -> BattleResult<()> {
        if self.weather == weather && self.weather_turns == 0 {
            return Ok(());
        }
        self.execute(BattleCommand::TriggerAbility {
            owner: id,
            other: None,
            action: AbilityAction::Weather,
        })?;
        // Weather from abilities lasts until replaced.
        self.execute(BattleCommand::SetWeather { weather, turns: 0 })?;
        self.castform_cherrim_check_all()
    }

    fn entry_ability(&mut self, id: BattlerId) -> BattleResult<()> {
        match self.battler(id).ability {
            Ability::AirLock | Ability::CloudNine => {
                self.execute(BattleCommand::TriggerAbility {
                    owner: id,
                    other: None,
                    action: AbilityAction::Weather,
                })?;
                self.castform_cherrim_check_all()?;
            }
            Ability::Download => {
                let foes = self.foes_of(id);
                if foes.is_empty() {
                    return Ok(());
                }
                let average = |stat: Stat| -> f64 {
                    foes.iter()
                        .map(|foe| {
                            let battler = self.battler(*foe);
                            f64::from(battler.stats.get(stat)) * stat_stage_multiplier(battler.stage(stat))
                        })
                        .sum::<f64>()
                        / foes.len() as f64
                };
                let stat = if average(Stat::Defense) < average(Stat::SpDefense) {
                    Stat::Attack
                } else {
                    Stat::SpAttack
                };
                if self.battler(id).stage(stat) < self.settings.max_stat_change {
                    self.execute(BattleCommand::TriggerAbility {
                        owner: id,
                        other: None,
                        action: AbilityAction::ChangedStats,
                    })?;
                    self.apply_stat_change(id, id, stat, 1)?;
                }
            }
            Ability::Drizzle => self.set_ability_weather(id, Weather::Rain)?,
            Ability::Drought => self.set_ability_weather(id, Weather::HarshSunlight)?,
            Ability::SandStream => self.set_ability_weather(id, Weather::Sandstorm)?,
            Ability::SnowWarning => self.set_ability_weather(id, Weather::Hailstorm)?,
            Ability::Imposter => {
                let position = self.battler(id).position.across();
                if let Some(target) = self.battler_at(id.opposing_team(), position) {
                    let blocked = VolatileConditions::TRANSFORMED
                        | VolatileConditions::SUBSTITUTE
                        | VolatileConditions::DISGUISED;
                    if !self.battler(id).status2.contains(VolatileConditions::TRANSFORMED)
                        && !self.battler(target).status2.intersects(blocked)
                    {
                        self.execute(BattleCommand::TriggerAbility {
                            owner: id,
                            other: Some(target),
                            action: AbilityAction::ChangedAppearance,
                        })?;
                        self.do_transform(id, target)?;
                    }
                }
            }
            Ability::MoldBreaker | Ability::Teravolt | Ability::Turboblaze => {
                self.execute(BattleCommand::TriggerAbility {
                    owner: id,
                    other: None,
                    action: AbilityAction::Announced,
                })?;
            }
            Ability::SlowStart => {
                self.battler_mut(id).slow_start_turns = self.settings.slow_start_turns;
                self.execute(BattleCommand::TriggerAbility {
                    owner: id,
                    other: None,
                    action: AbilityAction::Announced,
                })?;
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn castform_cherrim_check_all(&mut self) -> BattleResult<()> {
        let order = self.speed_order(self.active_battlers());
        for id in order {
            self.castform_cherrim_check(id)?;
        }
        Ok(())
    }

    /// Weather forms. A form also reverts when its ability is lost or the
    /// weather is suppressed.
    pub(crate) fn castform_cherrim_check(&mut self, id: BattlerId) -> BattleResult<()> {
        let weather = self.effective_weather();
        let battler = self.battler(id);
        let (form, ability) = match battler.original_species {
            Species::Castform => {
                let form = match weather {
                    Weather::Hailstorm => Species::CastformSnowy,
                    Weather::HarshSunlight => Species::CastformSunny,
                    Weather::Rain => Species::CastformRainy,
                    _ => Species::Castform,
                };
                (form, Ability::Forecast)
            }
            Species::Cherrim => {
                let form = if weather == Weather::HarshSunlight {
                    Species::CherrimSunshine
                } else {
                    Species::Cherrim
                };
                (form, Ability::FlowerGift)
            }
            _ => return Ok(()),
        };
        let has_ability = battler.ability == ability;
        let new_species = if has_ability {
            form
        } else {
            battler.original_species
        };
        if new_species == battler.species {
            return Ok(());
        }
        if has_ability {
            self.execute(BattleCommand::TriggerAbility {
                owner: id,
                other: None,
                action: AbilityAction::ChangedAppearance,
            })?;
        }
        self.execute(BattleCommand::ChangeForm {
            target: id,
            species: new_species,
        })
    }

    pub(crate) fn illusion_break(&mut self, id: BattlerId, breaker: BattlerId) -> BattleResult<()> {
        if !self.battler(id).status2.contains(VolatileConditions::DISGUISED) {
            return Ok(());
        }
        self.execute(BattleCommand::BreakIllusion { target: id })?;
        self.execute(BattleCommand::TriggerAbility {
            owner: id,
            other: Some(breaker),
            action: AbilityAction::ChangedAppearance,
        })
    }

    /// Everything that reacts to a landed hit, in its verified order:
    /// substitute break, illusion break, stat-reacting abilities, contact
    /// abilities, Rocky Helmet, then the victim's berry.
    pub(crate) fn post_hit_effects(
        &mut self,
        user: BattlerId,
        victim: BattlerId,
        data: &MoveData,
        move_type: PokemonType,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let victim_state = self.battler(victim);
        if victim_state.status2.contains(VolatileConditions::SUBSTITUTE) {
            if victim_state.substitute_hp == 0 {
                self.execute(BattleCommand::RemoveStatus2 {
                    target: victim,
                    condition: VolatileConditions::SUBSTITUTE,
                    action: StatusAction::Ended,
                })?;
            }
        } else {
            self.illusion_break(victim, user)?;
            self.stat_reacting_abilities(user, victim, data, move_type)?;
            if data.has_flag(MoveFlag::MakesContact) {
                self.contact_abilities(user, victim, rng)?;
                if !self.battler(user).is_fainted() && self.battler(victim).item == Item::RockyHelmet {
                    self.execute(BattleCommand::TriggerItem {
                        holder: victim,
                        other: Some(user),
                        action: ItemAction::Damage,
                    })?;
                    let damage = self.battler(user).hp_fraction(self.settings.rocky_helmet_denominator);
                    self.deal_damage(user, damage)?;
                    if !self.faint_check(user)? {
                        self.healing_berry_check(user)?;
                    }
                }
            }
        }

        if !self.battler(victim).is_fainted() {
            self.healing_berry_check(victim)?;
        }
        Ok(())
    }

    fn stat_reacting_abilities(
        &mut self,
        user: BattlerId,
        victim: BattlerId,
        data: &MoveData,
        move_type: PokemonType,
    ) -> BattleResult<()> {
        let battler = self.battler(victim);
        if battler.is_fainted() {
            return Ok(());
        }
        let changes: &[(Stat, i8)] = match battler.ability {
            Ability::Justified if move_type == PokemonType::Dark => &[(Stat::Attack, 1)],
            Ability::Rattled
                if matches!(move_type, PokemonType::Bug | PokemonType::Dark | PokemonType::Ghost) =>
            {
                &[(Stat::Speed, 1)]
            }
            Ability::WeakArmor if data.category == MoveCategory::Physical => {
                &[(Stat::Defense, -1), (Stat::Speed, 1)]
            }
            _ => return Ok(()),
        };
        self.execute(BattleCommand::TriggerAbility {
            owner: victim,
            other: Some(user),
            action: AbilityAction::Damage,
        })?;
        for (stat, change) in changes {
            self.apply_stat_change(victim, victim, *stat, *change)?;
        }
        Ok(())
    }

    fn contact_status(
        &mut self,
        user: BattlerId,
        victim: BattlerId,
        status: Status1,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let sleep_turns = if status == Status1::Asleep {
            let turns = rng.random_int(
                u32::from(self.settings.sleep_min_turns),
                u32::from(self.settings.sleep_max_turns),
                "sleep duration",
            );
            let divisor = if self.battler(user).ability == Ability::EarlyBird { 2 } else { 1 };
            (turns / divisor) as u8
        } else {
            0
        };
        self.execute(BattleCommand::TriggerAbility {
            owner: victim,
            other: Some(user),
            action: AbilityAction::ChangedStatus,
        })?;
        self.execute(BattleCommand::SetStatus1 {
            target: user,
            status,
            sleep_turns,
            action: StatusAction::Added,
        })?;
        self.anti_status_ability_check(user)
    }

    fn contact_abilities(
        &mut self,
        user: BattlerId,
        victim: BattlerId,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let victim_ability = self.battler(victim).ability;
        let user_alive = |battle: &Battle| !battle.battler(user).is_fainted();

        if user_alive(self)
            && victim_ability == Ability::Mummy
            && self.battler(user).ability != Ability::Mummy
        {
            self.execute(BattleCommand::TriggerAbility {
                owner: victim,
                other: Some(user),
                action: AbilityAction::Damage,
            })?;
            self.execute(BattleCommand::SetAbility {
                target: user,
                ability: Ability::Mummy,
            })?;
            self.castform_cherrim_check(user)?;
        }

        if user_alive(self) && matches!(victim_ability, Ability::IronBarbs | Ability::RoughSkin) {
            self.execute(BattleCommand::TriggerAbility {
                owner: victim,
                other: Some(user),
                action: AbilityAction::Damage,
            })?;
            let damage = self.battler(user).hp_fraction(self.settings.iron_barbs_denominator);
            self.deal_damage(user, damage)?;
            if !self.faint_check(user)? {
                self.healing_berry_check(user)?;
            }
        }

        // Cute Charm still works when the holder is about to faint.
        if user_alive(self)
            && victim_ability == Ability::CuteCharm
            && self.attraction_result(victim, user) == MoveResult::Success
            && rng.roll_chance(30, 100, "cute charm")
        {
            self.execute(BattleCommand::TriggerAbility {
                owner: victim,
                other: Some(user),
                action: AbilityAction::ChangedStatus,
            })?;
            self.apply_status2_if_possible(victim, user, VolatileConditions::INFATUATED, false, rng)?;
        }

        if user_alive(self)
            && victim_ability == Ability::EffectSpore
            && self.battler(user).status1 == Status1::None
        {
            let roll = rng.random_int(0, 99, "effect spore");
            if roll < 30 {
                let candidate = if roll <= 10 {
                    Some(Status1::Asleep)
                } else if roll <= 20 {
                    // Electric types shrug off the paralysis band.
                    (!self.battler(user).has_type(PokemonType::Electric)).then_some(Status1::Paralyzed)
                } else {
                    Some(Status1::Poisoned)
                };
                if let Some(status) = candidate {
                    if self.status1_result(Some(victim), user, status) == MoveResult::Success {
                        self.contact_status(user, victim, status, rng)?;
                    }
                }
            }
        }

        let chance_status = match victim_ability {
            Ability::FlameBody => Some(Status1::Burned),
            Ability::PoisonPoint => Some(Status1::Poisoned),
            Ability::Static => Some(Status1::Paralyzed),
            _ => None,
        };
        if let Some(status) = chance_status {
            if user_alive(self)
                && self.status1_result(Some(victim), user, status) == MoveResult::Success
                && rng.roll_chance(30, 100, "contact status")
            {
                self.contact_status(user, victim, status, rng)?;
            }
        }
        Ok(())
    }

    /// Recoil, then Life Orb. Runs once per move use, not per target.
    pub(crate) fn post_attack_effects(
        &mut self,
        user: BattlerId,
        ignore_life_orb: bool,
        recoil: Option<u16>,
    ) -> BattleResult<()> {
        if let Some(damage) = recoil {
            if !self.battler(user).is_fainted() {
                let battler = Some(self.reference(user));
                self.emit(BattleEvent::Special {
                    battler,
                    other: None,
                    message: SpecialMessage::Recoil,
                });
                self.deal_damage(user, damage)?;
                if !self.faint_check(user)? {
                    self.healing_berry_check(user)?;
                }
            }
        }

        let battler = self.battler(user);
        if !ignore_life_orb && !battler.is_fainted() && battler.item == Item::LifeOrb {
            self.execute(BattleCommand::TriggerItem {
                holder: user,
                other: None,
                action: ItemAction::Damage,
            })?;
            let damage = self.battler(user).hp_fraction(self.settings.life_orb_denominator);
            self.deal_damage(user, damage)?;
            self.faint_check(user)?;
        }
        Ok(())
    }

    /// Consumes a Power Herb so a charge move fires at once.
    pub(crate) fn power_herb_check(&mut self, id: BattlerId) -> BattleResult<bool> {
        if self.battler(id).item != Item::PowerHerb {
            return Ok(false);
        }
        self.execute(BattleCommand::ConsumeItem { target: id })?;
        Ok(true)
    }

    pub(crate) fn healing_berry_check(&mut self, id: BattlerId) -> BattleResult<()> {
        let battler = self.battler(id);
        if battler.is_fainted() || battler.hp > battler.max_hp / 2 {
            return Ok(());
        }
        let heal = match battler.item {
            Item::SitrusBerry => battler.max_hp / 4,
            Item::OranBerry => ORAN_BERRY_HEAL,
            _ => return Ok(()),
        };
        trace!(?id, heal, "healing berry");
        self.execute(BattleCommand::ConsumeItem { target: id })?;
        self.heal(id, heal)?;
        Ok(())
    }
}
