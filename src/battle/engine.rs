//! Turn lifecycle. `begin`, `run_turn` and `run_switches` are the only entry
//! points that advance a battle; each one finishes by deciding what the battle
//! waits for next.

use crate::battle::action::{determine_acting_order, Action, TargetMask};
use crate::battle::battler::BattlerId;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::{FieldConditions, MoveResult, TeamConditions, VolatileConditions};
use crate::battle::events::{AbilityAction, BattleEvent, ItemAction, SpecialMessage, StatusAction};
use crate::battle::rng::BattleRng;
use crate::battle::state::{Battle, BattlePhase};
use crate::errors::{BattleResult, BattleStateError};
use schema::{Ability, BattleFormat, FieldPosition, Item, Move, PokemonType, Stat, Status1, Weather};
use tracing::{debug, info};

const TEAM_TIMERS: [TeamConditions; 5] = [
    TeamConditions::REFLECT,
    TeamConditions::LIGHT_SCREEN,
    TeamConditions::SAFEGUARD,
    TeamConditions::LUCKY_CHANT,
    TeamConditions::TAILWIND,
];

const MOODY_STATS: [Stat; 7] = [
    Stat::Attack,
    Stat::Defense,
    Stat::SpAttack,
    Stat::SpDefense,
    Stat::Speed,
    Stat::Accuracy,
    Stat::Evasion,
];

/// Chance out of 100 for Healer and Shed Skin to cure a status.
const CURE_ABILITY_CHANCE: u32 = 30;

impl Battle {
    /// Reveals both teams, sends out the leads and asks for the first actions.
    pub fn begin(&mut self) -> BattleResult<()> {
        self.ensure_phase(BattlePhase::ReadyToBegin)?;
        info!(format = ?self.format, "battle begins");

        // 1. Reveal both parties
        for team in 0..2 {
            self.execute(BattleCommand::RevealTeam { team })?;
        }

        // 2. Send out the first healthy battlers in position order
        let mut arrivals = Vec::new();
        for team in 0..2 {
            let leads: Vec<usize> = self.teams[team]
                .party
                .iter()
                .filter(|battler| !battler.is_fainted())
                .map(|battler| battler.id.slot)
                .collect();
            for (&position, party_slot) in self.format.positions().iter().zip(leads) {
                self.execute(BattleCommand::SwitchIn {
                    team,
                    party_slot,
                    position,
                    forced: false,
                })?;
                arrivals.push(BattlerId::new(team, party_slot));
            }
        }

        // 3. Entry effects for everyone at once
        self.switch_in_sweep(arrivals)?;
        self.conclude_step()
    }

    /// Resolves one full turn from the submitted actions.
    pub fn run_turn(&mut self, rng: &mut BattleRng) -> BattleResult<()> {
        self.ensure_phase(BattlePhase::WaitingForActions)?;
        if let Some(team) = (0..2).find(|&team| !self.teams[team].actions_submitted) {
            return Err(BattleStateError::ActionsPending(team).into());
        }

        // 1. Initialization
        self.execute(BattleCommand::BeginTurn)?;
        let order = determine_acting_order(self, rng);
        debug!(turn = self.turn, ?order, "acting order");

        // 2. Resolve each action in order
        for id in order {
            if self.winner.is_some() {
                break;
            }
            let battler = self.battler(id);
            if !battler.is_active() {
                continue;
            }
            let Some(action) = battler.selected_action else {
                continue;
            };
            self.resolve_action(id, action, rng)?;
        }

        // 3. End-of-turn phase (only if the battle is still ongoing)
        if self.winner.is_none() {
            self.execute_end_turn_phase(rng)?;
        }

        // 4. Cleanup and finalization
        self.finalize_turn()?;
        self.conclude_step()
    }

    /// Sends in the replacements submitted for fainted battlers.
    pub fn run_switches(&mut self) -> BattleResult<()> {
        self.ensure_phase(BattlePhase::WaitingForSwitchIns)?;
        if let Some(team) = (0..2).find(|&team| {
            let side = &self.teams[team];
            side.switches_submitted.len() != side.switch_ins_required
        }) {
            return Err(BattleStateError::ActionsPending(team).into());
        }

        let mut arrivals = Vec::new();
        for team in 0..2 {
            let switches = std::mem::take(&mut self.teams[team].switches_submitted);
            for (party_slot, position) in switches {
                self.execute(BattleCommand::SwitchIn {
                    team,
                    party_slot,
                    position,
                    forced: false,
                })?;
                arrivals.push(BattlerId::new(team, party_slot));
            }
            self.teams[team].switch_ins_required = 0;
        }

        self.switch_in_sweep(arrivals)?;
        self.conclude_step()
    }

    fn resolve_action(&mut self, id: BattlerId, action: Action, rng: &mut BattleRng) -> BattleResult<()> {
        debug!(?id, ?action, "resolving action");
        match action {
            Action::Switch { party_slot } => {
                let incoming = BattlerId::new(id.team, party_slot);
                let battler = self.battler(incoming);
                if battler.is_active() || battler.is_fainted() {
                    return Ok(());
                }
                self.switch_two(id, incoming, None)
            }
            Action::Fight { move_, targets } => self.use_move(id, move_, targets, false, rng),
            Action::Forced => {
                let (move_, targets) = match self.battler(id).temp_locked_move {
                    Some(lock) => (lock.move_, lock.targets),
                    None => (Move::Struggle, TargetMask::empty()),
                };
                self.use_move(id, move_, targets, false, rng)
            }
        }
    }

    /// Swaps `leaving` for `coming` at the same position. `forced_by` is set
    /// when a move dragged `leaving` out.
    pub(crate) fn switch_two(
        &mut self,
        leaving: BattlerId,
        coming: BattlerId,
        forced_by: Option<BattlerId>,
    ) -> BattleResult<()> {
        let position = self.battler(leaving).position;
        let forced = forced_by.is_some();
        self.execute(BattleCommand::SwitchOut {
            target: leaving,
            forced,
        })?;
        self.remove_infatuations(leaving)?;
        self.execute(BattleCommand::SwitchIn {
            team: coming.team,
            party_slot: coming.slot,
            position,
            forced,
        })?;
        if let Some(user) = forced_by {
            let battler = Some(self.reference(coming));
            let other = Some(self.reference(user));
            self.emit(BattleEvent::Special {
                battler,
                other,
                message: SpecialMessage::DraggedOut,
            });
        }
        self.switch_in_sweep(vec![coming])?;
        self.castform_cherrim_check_all()
    }

    /// Faints `id` if it is on the field with no HP left. Records the winner
    /// the first time a team runs out of battlers.
    pub(crate) fn faint_check(&mut self, id: BattlerId) -> BattleResult<bool> {
        let battler = self.battler(id);
        if battler.hp > 0 || battler.position == FieldPosition::None {
            return Ok(false);
        }
        debug!(?id, "fainted");
        self.execute(BattleCommand::Faint { target: id })?;
        self.remove_infatuations(id)?;
        if self.winner.is_none() && !self.team_has_conscious_battlers(id.team) {
            self.winner = Some(id.opposing_team());
        }
        self.castform_cherrim_check_all()?;
        Ok(true)
    }

    /// Applies all end-of-turn effects in their fixed order.
    fn execute_end_turn_phase(&mut self, rng: &mut BattleRng) -> BattleResult<()> {
        // 1. Weather
        self.end_turn_weather()?;
        // 2. Periodic abilities
        for id in self.end_turn_order() {
            self.end_turn_ability(id, rng)?;
        }
        // 3. Periodic items
        for id in self.end_turn_order() {
            self.end_turn_item(id)?;
        }
        // 4. Leech Seed
        for id in self.end_turn_order() {
            self.leech_seed_drain(id)?;
        }
        // 5. Persistent status, then curse
        for id in self.end_turn_order() {
            self.status_damage(id)?;
        }
        for id in self.end_turn_order() {
            self.curse_damage(id)?;
        }
        // 6. Timers
        self.tick_timers()?;
        // 7. Orbs
        for id in self.end_turn_order() {
            self.orb_check(id)?;
        }
        Ok(())
    }

    /// Battlers still standing, fastest first. Empty once a winner is known.
    fn end_turn_order(&self) -> Vec<BattlerId> {
        if self.winner.is_some() {
            return Vec::new();
        }
        self.speed_order(self.active_battlers())
    }

    /// Whether `id` still takes part in the sweep.
    fn sweeping(&self, id: BattlerId) -> bool {
        self.winner.is_none() && self.battler(id).is_active()
    }

    fn end_turn_weather(&mut self) -> BattleResult<()> {
        if self.weather == Weather::None {
            return Ok(());
        }
        // Expiring weather deals no damage on its last turn.
        if self.weather_turns > 0 {
            self.weather_turns -= 1;
            if self.weather_turns == 0 {
                self.execute(BattleCommand::SetWeather {
                    weather: Weather::None,
                    turns: 0,
                })?;
                return self.castform_cherrim_check_all();
            }
        }
        let weather = self.effective_weather();
        if weather == Weather::None {
            return Ok(());
        }
        self.emit(BattleEvent::WeatherChanged {
            weather,
            action: StatusAction::Announced,
            victim: None,
        });

        for id in self.end_turn_order() {
            if !self.sweeping(id) {
                continue;
            }
            let battler = self.battler(id);
            let ability = battler.ability;
            let hidden = battler
                .status2
                .intersects(VolatileConditions::UNDERGROUND | VolatileConditions::UNDERWATER);
            match weather {
                Weather::Hailstorm if ability == Ability::IceBody => {
                    let heal = battler.hp_fraction(self.settings.ice_body_heal_denominator);
                    self.ability_heal(id, heal)?;
                }
                Weather::Hailstorm => {
                    if battler.has_type(PokemonType::Ice)
                        || matches!(ability, Ability::Overcoat | Ability::SnowCloak)
                    {
                        continue;
                    }
                    let damage = battler.hp_fraction(self.settings.hail_damage_denominator);
                    self.weather_damage(id, weather, damage)?;
                }
                Weather::Sandstorm => {
                    let immune = [PokemonType::Rock, PokemonType::Ground, PokemonType::Steel]
                        .into_iter()
                        .any(|pokemon_type| battler.has_type(pokemon_type))
                        || matches!(
                            ability,
                            Ability::Overcoat | Ability::SandForce | Ability::SandRush | Ability::SandVeil
                        )
                        || hidden;
                    if immune {
                        continue;
                    }
                    let damage = battler.hp_fraction(self.settings.sandstorm_damage_denominator);
                    self.weather_damage(id, weather, damage)?;
                }
                Weather::Rain if ability == Ability::RainDish => {
                    let heal = battler.hp_fraction(self.settings.rain_dish_heal_denominator);
                    self.ability_heal(id, heal)?;
                }
                Weather::HarshSunlight if ability == Ability::SolarPower => {
                    let damage = battler.hp_fraction(self.settings.solar_power_damage_denominator);
                    self.execute(BattleCommand::TriggerAbility {
                        owner: id,
                        other: None,
                        action: AbilityAction::Damage,
                    })?;
                    self.deal_damage(id, damage)?;
                    self.after_residual_damage(id)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn weather_damage(&mut self, id: BattlerId, weather: Weather, damage: u16) -> BattleResult<()> {
        let victim = Some(self.reference(id));
        self.emit(BattleEvent::WeatherChanged {
            weather,
            action: StatusAction::Damage,
            victim,
        });
        self.deal_damage(id, damage)?;
        self.after_residual_damage(id)
    }

    fn ability_heal(&mut self, id: BattlerId, amount: u16) -> BattleResult<()> {
        let battler = self.battler(id);
        if battler.hp >= battler.max_hp {
            return Ok(());
        }
        self.execute(BattleCommand::TriggerAbility {
            owner: id,
            other: None,
            action: AbilityAction::RestoredHp,
        })?;
        self.heal(id, amount)?;
        Ok(())
    }

    /// Faint check, then the healing berry for survivors.
    fn after_residual_damage(&mut self, id: BattlerId) -> BattleResult<()> {
        if !self.faint_check(id)? {
            self.healing_berry_check(id)?;
        }
        Ok(())
    }

    fn end_turn_ability(&mut self, id: BattlerId, rng: &mut BattleRng) -> BattleResult<()> {
        if !self.sweeping(id) {
            return Ok(());
        }
        match self.battler(id).ability {
            Ability::Healer => {
                for ally in self.allies_of(id) {
                    if !self.are_adjacent(id, ally) || self.battler(ally).status1 == Status1::None {
                        continue;
                    }
                    if rng.roll_chance(CURE_ABILITY_CHANCE, 100, "healer") {
                        self.execute(BattleCommand::TriggerAbility {
                            owner: id,
                            other: Some(ally),
                            action: AbilityAction::ChangedStatus,
                        })?;
                        self.cure_status1(ally)?;
                    }
                }
            }
            Ability::ShedSkin => {
                if self.battler(id).status1 != Status1::None
                    && rng.roll_chance(CURE_ABILITY_CHANCE, 100, "shed skin")
                {
                    self.execute(BattleCommand::TriggerAbility {
                        owner: id,
                        other: None,
                        action: AbilityAction::ChangedStatus,
                    })?;
                    self.cure_status1(id)?;
                }
            }
            Ability::SpeedBoost => {
                if self.battler(id).speed_boost_ready && self.stat_change_possible(id, &[(Stat::Speed, 1)]) {
                    self.execute(BattleCommand::TriggerAbility {
                        owner: id,
                        other: None,
                        action: AbilityAction::ChangedStats,
                    })?;
                    self.apply_stat_change(id, id, Stat::Speed, 1)?;
                }
            }
            Ability::Moody => self.moody(id, rng)?,
            Ability::SlowStart => {
                let battler = self.battler_mut(id);
                if battler.slow_start_turns > 0 {
                    battler.slow_start_turns -= 1;
                    if battler.slow_start_turns == 0 {
                        self.execute(BattleCommand::TriggerAbility {
                            owner: id,
                            other: None,
                            action: AbilityAction::Announced,
                        })?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn cure_status1(&mut self, id: BattlerId) -> BattleResult<()> {
        self.execute(BattleCommand::SetStatus1 {
            target: id,
            status: Status1::None,
            sleep_turns: 0,
            action: StatusAction::Cured,
        })
    }

    /// Sharply raises one stat and lowers a different one. Either half is
    /// skipped when no stat can move that way.
    fn moody(&mut self, id: BattlerId, rng: &mut BattleRng) -> BattleResult<()> {
        let max = self.settings.max_stat_change;
        let battler = self.battler(id);
        let can_rise: Vec<Stat> = MOODY_STATS
            .into_iter()
            .filter(|stat| battler.stage(*stat) < max)
            .collect();
        let up = if can_rise.is_empty() {
            None
        } else {
            Some(can_rise[rng.random_index(can_rise.len(), "moody up")])
        };
        let battler = self.battler(id);
        let can_fall: Vec<Stat> = MOODY_STATS
            .into_iter()
            .filter(|stat| battler.stage(*stat) > -max && Some(*stat) != up)
            .collect();
        let down = if can_fall.is_empty() {
            None
        } else {
            Some(can_fall[rng.random_index(can_fall.len(), "moody down")])
        };
        if up.is_none() && down.is_none() {
            return Ok(());
        }

        self.execute(BattleCommand::TriggerAbility {
            owner: id,
            other: None,
            action: AbilityAction::ChangedStats,
        })?;
        if let Some(stat) = up {
            self.apply_stat_change(id, id, stat, 2)?;
        }
        if let Some(stat) = down {
            self.apply_stat_change(id, id, stat, -1)?;
        }
        Ok(())
    }

    fn end_turn_item(&mut self, id: BattlerId) -> BattleResult<()> {
        if !self.sweeping(id) {
            return Ok(());
        }
        let battler = self.battler(id);
        match battler.item {
            Item::Leftovers => {
                let heal = battler.hp_fraction(self.settings.leftovers_heal_denominator);
                self.item_heal(id, heal)?;
            }
            Item::BlackSludge if battler.has_type(PokemonType::Poison) => {
                let heal = battler.hp_fraction(self.settings.black_sludge_heal_denominator);
                self.item_heal(id, heal)?;
            }
            Item::BlackSludge => {
                let damage = battler.hp_fraction(self.settings.black_sludge_damage_denominator);
                self.execute(BattleCommand::TriggerItem {
                    holder: id,
                    other: None,
                    action: ItemAction::Damage,
                })?;
                self.deal_damage(id, damage)?;
                self.faint_check(id)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn item_heal(&mut self, id: BattlerId, amount: u16) -> BattleResult<()> {
        let battler = self.battler(id);
        if battler.hp >= battler.max_hp {
            return Ok(());
        }
        self.execute(BattleCommand::TriggerItem {
            holder: id,
            other: None,
            action: ItemAction::RestoredHp,
        })?;
        self.heal(id, amount)?;
        Ok(())
    }

    /// Moves HP from a seeded battler to whoever now stands where the seeder stood.
    fn leech_seed_drain(&mut self, id: BattlerId) -> BattleResult<()> {
        let battler = self.battler(id);
        if !self.sweeping(id) || !battler.status2.contains(VolatileConditions::LEECH_SEED) {
            return Ok(());
        }
        let Some((team, position)) = battler.seeded_by else {
            return Ok(());
        };
        let Some(sucker) = self.battler_at(team, position) else {
            return Ok(());
        };
        let amount = battler.hp_fraction(self.settings.leech_seed_denominator);

        let seeded = self.reference(id);
        let source = Some(self.reference(sucker));
        self.emit(BattleEvent::Status2Changed {
            battler: seeded,
            condition: VolatileConditions::LEECH_SEED,
            action: StatusAction::Damage,
            source,
        });
        let dealt = self.deal_damage(id, amount)?;
        self.heal(sucker, dealt)?;
        self.after_residual_damage(id)
    }

    fn status_damage(&mut self, id: BattlerId) -> BattleResult<()> {
        if !self.sweeping(id) {
            return Ok(());
        }
        let battler = self.battler(id);
        let status = battler.status1;
        let damage = match status {
            Status1::Burned => {
                let damage = battler.hp_fraction(self.settings.burn_damage_denominator);
                if battler.ability == Ability::Heatproof {
                    (damage / 2).max(1)
                } else {
                    damage
                }
            }
            Status1::Poisoned => battler.hp_fraction(self.settings.poison_damage_denominator),
            Status1::BadlyPoisoned => {
                let scaled = u32::from(battler.max_hp) * u32::from(battler.status1_counter)
                    / u32::from(self.settings.toxic_damage_denominator.max(1));
                u16::try_from(scaled).unwrap_or(u16::MAX).max(1)
            }
            _ => return Ok(()),
        };

        let reference = self.reference(id);
        self.emit(BattleEvent::Status1Changed {
            battler: reference,
            status,
            action: StatusAction::Damage,
        });
        self.deal_damage(id, damage)?;
        if !self.faint_check(id)? {
            if status == Status1::BadlyPoisoned {
                let battler = self.battler_mut(id);
                battler.status1_counter = battler.status1_counter.saturating_add(1);
            }
            self.healing_berry_check(id)?;
        }
        Ok(())
    }

    fn curse_damage(&mut self, id: BattlerId) -> BattleResult<()> {
        let battler = self.battler(id);
        if !self.sweeping(id) || !battler.status2.contains(VolatileConditions::CURSED) {
            return Ok(());
        }
        let damage = battler.hp_fraction(self.settings.curse_denominator);
        let reference = self.reference(id);
        self.emit(BattleEvent::Status2Changed {
            battler: reference,
            condition: VolatileConditions::CURSED,
            action: StatusAction::Damage,
            source: None,
        });
        self.deal_damage(id, damage)?;
        self.after_residual_damage(id)
    }

    /// Magnet Rise, team conditions and Trick Room count down together.
    fn tick_timers(&mut self) -> BattleResult<()> {
        for id in self.end_turn_order() {
            let battler = self.battler_mut(id);
            if !battler.status2.contains(VolatileConditions::MAGNET_RISE) || battler.magnet_rise_turns == 0 {
                continue;
            }
            battler.magnet_rise_turns -= 1;
            if battler.magnet_rise_turns == 0 {
                self.execute(BattleCommand::RemoveStatus2 {
                    target: id,
                    condition: VolatileConditions::MAGNET_RISE,
                    action: StatusAction::Ended,
                })?;
            }
        }

        for team in 0..2 {
            for condition in TEAM_TIMERS {
                if !self.teams[team].conditions.contains(condition) {
                    continue;
                }
                let expired = match self.teams[team].condition_turns_mut(condition) {
                    Some(turns) if *turns > 0 => {
                        *turns -= 1;
                        *turns == 0
                    }
                    _ => false,
                };
                if expired {
                    self.execute(BattleCommand::ClearTeamCondition {
                        team,
                        condition,
                        action: StatusAction::Ended,
                    })?;
                }
            }
        }

        if self.field_conditions.contains(FieldConditions::TRICK_ROOM) && self.trick_room_turns > 0 {
            self.trick_room_turns -= 1;
            if self.trick_room_turns == 0 {
                self.execute(BattleCommand::ClearFieldCondition {
                    condition: FieldConditions::TRICK_ROOM,
                })?;
            }
        }
        Ok(())
    }

    fn orb_check(&mut self, id: BattlerId) -> BattleResult<()> {
        if !self.sweeping(id) {
            return Ok(());
        }
        let battler = self.battler(id);
        let status = match battler.item {
            Item::FlameOrb => Status1::Burned,
            Item::ToxicOrb => Status1::BadlyPoisoned,
            _ => return Ok(()),
        };
        if self.status1_result(Some(id), id, status) != MoveResult::Success {
            return Ok(());
        }
        self.execute(BattleCommand::TriggerItem {
            holder: id,
            other: None,
            action: ItemAction::ChangedStatus,
        })?;
        self.execute(BattleCommand::SetStatus1 {
            target: id,
            status,
            sleep_turns: 0,
            action: StatusAction::Added,
        })
    }

    /// Clears everything that only lasts for the turn it was set in.
    fn finalize_turn(&mut self) -> BattleResult<()> {
        let transient =
            VolatileConditions::FLINCHING | VolatileConditions::PROTECTED | VolatileConditions::HELPING_HAND;
        for team in &mut self.teams {
            team.conditions.remove(TeamConditions::WIDE_GUARD);
            for battler in &mut team.party {
                battler.status2.remove(transient);
                battler.has_used_move_this_turn = false;
                battler.selected_action = None;
                if battler.is_active() {
                    battler.speed_boost_ready = true;
                }
            }
        }
        if self.winner.is_none() {
            self.auto_center()?;
        }
        Ok(())
    }

    /// In triples, two lone battlers that cannot reach each other both move
    /// to the center.
    fn auto_center(&mut self) -> BattleResult<()> {
        if self.format != BattleFormat::Triple {
            return Ok(());
        }
        let (first, second) = match (
            self.teams[0].active_battlers().as_slice(),
            self.teams[1].active_battlers().as_slice(),
        ) {
            (&[first], &[second]) => (first, second),
            _ => return Ok(()),
        };
        if self.are_adjacent(first, second) {
            return Ok(());
        }
        for id in [first, second] {
            self.execute(BattleCommand::MovePosition {
                target: id,
                position: FieldPosition::Center,
            })?;
        }
        let first = self.reference(first);
        let second = self.reference(second);
        self.emit(BattleEvent::AutoCenter { first, second });
        Ok(())
    }

    /// Decides what the battle waits for next.
    fn conclude_step(&mut self) -> BattleResult<()> {
        if self.check_win_conditions()? {
            return Ok(());
        }
        self.check_for_pending_replacements()
    }

    fn check_win_conditions(&mut self) -> BattleResult<bool> {
        let winner = self.winner.or_else(|| {
            match (self.team_has_conscious_battlers(0), self.team_has_conscious_battlers(1)) {
                (false, _) => Some(1),
                (_, false) => Some(0),
                _ => None,
            }
        });
        match winner {
            Some(team) => {
                info!(team, turn = self.turn, "battle won");
                self.execute(BattleCommand::SetWinner { team })?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn check_for_pending_replacements(&mut self) -> BattleResult<()> {
        let mut counts = [0usize; 2];
        for (team, count) in counts.iter_mut().enumerate() {
            let empty = self
                .format
                .positions()
                .iter()
                .filter(|position| self.battler_at(team, **position).is_none())
                .count();
            *count = empty.min(self.teams[team].reserves().len());
        }
        if counts.iter().any(|count| *count > 0) {
            debug!(?counts, "replacements needed");
            self.execute(BattleCommand::RequestSwitchIns { counts })
        } else {
            self.execute(BattleCommand::RequestActions)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::action::{Action, TargetMask};
    use crate::battle::battler::BattlerId;
    use crate::battle::conditions::{TeamConditions, VolatileConditions};
    use crate::battle::events::BattleEvent;
    use crate::battle::rng::BattleRng;
    use crate::battle::state::{Battle, BattlePhase};
    use crate::battle::tests::common::{create_test_battle, predictable_rng, TestBattlerBuilder};
    use crate::errors::{BattleEngineError, BattleStateError};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{Ability, BattleFormat, FieldPosition, Item, Move, Species, Stat, Status1, Weather};

    fn singles(first: TestBattlerBuilder, second: TestBattlerBuilder) -> Battle {
        create_test_battle(BattleFormat::Single, vec![first], vec![second])
    }

    fn submit(battle: &mut Battle, id: BattlerId, action: Action) {
        battle.battler_mut(id).selected_action = Some(action);
        battle.teams[id.team].actions_submitted = true;
    }

    fn splash_both(battle: &mut Battle) {
        for id in battle.active_battlers() {
            submit(
                battle,
                id,
                Action::Fight {
                    move_: Move::Splash,
                    targets: TargetMask::empty(),
                },
            );
        }
    }

    #[test]
    fn run_turn_needs_both_submissions() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
        );
        submit(
            &mut battle,
            BattlerId::new(0, 0),
            Action::Fight {
                move_: Move::Splash,
                targets: TargetMask::empty(),
            },
        );
        let result = battle.run_turn(&mut predictable_rng());
        assert_eq!(
            result,
            Err(BattleEngineError::State(BattleStateError::ActionsPending(1)))
        );
    }

    #[test]
    fn quiet_turn_requests_actions_again() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
        );
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.turn, 1);
        assert_eq!(battle.phase(), BattlePhase::WaitingForActions);
        assert!(battle
            .events
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::TurnBegan { turn: 1 })));
        assert!(battle.active_battlers().iter().all(|id| battle.battler(*id).selected_action.is_none()));
    }

    #[test]
    fn faint_with_reserves_asks_for_a_switch() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Machamp, 100).with_moves(vec![Move::CloseCombat])],
            vec![
                TestBattlerBuilder::new(Species::Pikachu, 5).with_moves(vec![Move::Splash]),
                TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
            ],
        );
        submit(
            &mut battle,
            BattlerId::new(0, 0),
            Action::Fight {
                move_: Move::CloseCombat,
                targets: TargetMask::foe(FieldPosition::Center),
            },
        );
        submit(
            &mut battle,
            BattlerId::new(1, 0),
            Action::Fight {
                move_: Move::Splash,
                targets: TargetMask::empty(),
            },
        );
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");

        assert!(battle.battler(BattlerId::new(1, 0)).is_fainted());
        assert_eq!(battle.phase(), BattlePhase::WaitingForSwitchIns);
        assert_eq!(battle.switch_ins_required(1), 1);
        assert_eq!(battle.switch_ins_required(0), 0);

        battle.teams[1].switches_submitted = vec![(1, FieldPosition::Center)];
        battle.run_switches().expect("switch resolves");
        assert_eq!(battle.battler_at(1, FieldPosition::Center), Some(BattlerId::new(1, 1)));
        assert_eq!(battle.phase(), BattlePhase::WaitingForActions);
    }

    #[test]
    fn last_faint_ends_the_battle() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Machamp, 100).with_moves(vec![Move::CloseCombat]),
            TestBattlerBuilder::new(Species::Pikachu, 5).with_moves(vec![Move::Splash]),
        );
        submit(
            &mut battle,
            BattlerId::new(0, 0),
            Action::Fight {
                move_: Move::CloseCombat,
                targets: TargetMask::foe(FieldPosition::Center),
            },
        );
        submit(
            &mut battle,
            BattlerId::new(1, 0),
            Action::Fight {
                move_: Move::Splash,
                targets: TargetMask::empty(),
            },
        );
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");

        assert_eq!(battle.winner, Some(0));
        assert!(battle.is_ended());
        assert!(matches!(battle.events.events().last(), Some(BattleEvent::Winner { team: 0 })));
        assert_eq!(
            battle.run_turn(&mut predictable_rng()),
            Err(BattleEngineError::State(BattleStateError::BattleEnded))
        );
    }

    #[test]
    fn explosion_loses_for_the_user() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Gengar, 100).with_moves(vec![Move::Explosion]),
            TestBattlerBuilder::new(Species::Pikachu, 5).with_moves(vec![Move::Splash]),
        );
        submit(
            &mut battle,
            BattlerId::new(0, 0),
            Action::Fight {
                move_: Move::Explosion,
                targets: TargetMask::foe(FieldPosition::Center),
            },
        );
        submit(
            &mut battle,
            BattlerId::new(1, 0),
            Action::Fight {
                move_: Move::Splash,
                targets: TargetMask::empty(),
            },
        );
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert!(battle.battler(BattlerId::new(1, 0)).is_fainted());
        assert_eq!(battle.winner, Some(1));
    }

    #[test]
    fn switch_action_replaces_the_battler() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![
                TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
                TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
            ],
            vec![TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::Splash])],
        );
        submit(&mut battle, BattlerId::new(0, 0), Action::Switch { party_slot: 1 });
        submit(
            &mut battle,
            BattlerId::new(1, 0),
            Action::Fight {
                move_: Move::Splash,
                targets: TargetMask::empty(),
            },
        );
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler_at(0, FieldPosition::Center), Some(BattlerId::new(0, 1)));
        assert_eq!(battle.battler(BattlerId::new(0, 0)).position, FieldPosition::None);
    }

    #[rstest]
    #[case(Status1::Burned, 8)]
    #[case(Status1::Poisoned, 8)]
    #[case(Status1::BadlyPoisoned, 16)]
    fn status_damage_at_end_of_turn(#[case] status: Status1, #[case] denominator: u16) {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
        );
        let id = BattlerId::new(0, 0);
        battle.battler_mut(id).status1 = status;
        battle.battler_mut(id).status1_counter = 1;
        let max_hp = battle.battler(id).max_hp;
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(id).hp, max_hp - max_hp / denominator);
    }

    #[test]
    fn toxic_counter_grows_each_turn() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
        );
        let id = BattlerId::new(0, 0);
        battle.battler_mut(id).status1 = Status1::BadlyPoisoned;
        battle.battler_mut(id).status1_counter = 1;
        let max_hp = battle.battler(id).max_hp;
        for _ in 0..2 {
            splash_both(&mut battle);
            battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        }
        assert_eq!(battle.battler(id).status1_counter, 3);
        assert_eq!(battle.battler(id).hp, max_hp - max_hp / 16 - max_hp * 2 / 16);
    }

    #[test]
    fn sandstorm_chips_and_expires() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Golem, 50).with_moves(vec![Move::Splash]),
        );
        battle.weather = Weather::Sandstorm;
        battle.weather_turns = 2;
        let snorlax = BattlerId::new(0, 0);
        let golem = BattlerId::new(1, 0);
        let max_hp = battle.battler(snorlax).max_hp;

        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(snorlax).hp, max_hp - max_hp / 16);
        assert_eq!(battle.battler(golem).hp, battle.battler(golem).max_hp);

        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.weather, Weather::None);
        assert_eq!(battle.battler(snorlax).hp, max_hp - max_hp / 16);
    }

    #[test]
    fn leftovers_heal_after_damage() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Snorlax, 50)
                .with_moves(vec![Move::Splash])
                .with_item(Item::Leftovers),
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
        );
        let id = BattlerId::new(0, 0);
        let max_hp = battle.battler(id).max_hp;
        battle.battler_mut(id).hp = max_hp / 2;
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(id).hp, max_hp / 2 + max_hp / 16);
    }

    #[test]
    fn leech_seed_feeds_the_seeder() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Venusaur, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
        );
        let seeder = BattlerId::new(0, 0);
        let seeded = BattlerId::new(1, 0);
        battle.battler_mut(seeder).hp = 10;
        let seeded_battler = battle.battler_mut(seeded);
        seeded_battler.status2.insert(VolatileConditions::LEECH_SEED);
        seeded_battler.seeded_by = Some((0, FieldPosition::Center));
        let drain = seeded_battler.max_hp / 8;

        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(seeder).hp, 10 + drain);
        assert_eq!(battle.battler(seeded).hp, battle.battler(seeded).max_hp - drain);
    }

    #[test]
    fn speed_boost_waits_a_turn_after_arrival() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Pikachu, 50)
                .with_moves(vec![Move::Splash])
                .with_ability(Ability::SpeedBoost),
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
        );
        let id = BattlerId::new(0, 0);
        battle.battler_mut(id).speed_boost_ready = false;
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(id).stage(Stat::Speed), 0);

        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(id).stage(Stat::Speed), 1);
    }

    #[test]
    fn moody_never_lowers_the_raised_stat() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Pikachu, 50)
                .with_moves(vec![Move::Splash])
                .with_ability(Ability::Moody),
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
        );
        let id = BattlerId::new(0, 0);
        // Only Evasion can still rise, and Evasion is the only stat that could fall.
        let stages = &mut battle.battler_mut(id).stat_stages;
        for stat in [Stat::Attack, Stat::Defense, Stat::SpAttack, Stat::SpDefense, Stat::Speed, Stat::Accuracy] {
            stages.set(stat, 6);
        }
        splash_both(&mut battle);
        battle.run_turn(&mut BattleRng::new_for_test(vec![50; 8])).expect("turn resolves");
        let battler = battle.battler(id);
        assert_eq!(battler.stage(Stat::Evasion), 2);
        let lowered = [Stat::Attack, Stat::Defense, Stat::SpAttack, Stat::SpDefense, Stat::Speed, Stat::Accuracy]
            .into_iter()
            .filter(|stat| battler.stage(*stat) == 5)
            .count();
        assert_eq!(lowered, 1);
    }

    #[test]
    fn reflect_counts_down_and_ends() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
        );
        battle.teams[0].conditions.insert(TeamConditions::REFLECT);
        battle.teams[0].reflect_turns = 1;
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert!(!battle.teams[0].conditions.contains(TeamConditions::REFLECT));
        assert!(battle.events.events().iter().any(|event| matches!(
            event,
            BattleEvent::TeamConditionChanged {
                team: 0,
                condition: TeamConditions::REFLECT,
                ..
            }
        )));
    }

    #[test]
    fn flame_orb_burns_its_holder() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Machamp, 50)
                .with_moves(vec![Move::Splash])
                .with_item(Item::FlameOrb),
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
        );
        let id = BattlerId::new(0, 0);
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(id).status1, Status1::Burned);
        // The burn only hurts from the next turn on.
        assert_eq!(battle.battler(id).hp, battle.battler(id).max_hp);
    }

    #[test]
    fn transient_flags_clear_at_end_of_turn() {
        let mut battle = singles(
            TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash]),
            TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash]),
        );
        let id = BattlerId::new(0, 0);
        battle
            .battler_mut(id)
            .status2
            .insert(VolatileConditions::PROTECTED | VolatileConditions::FLINCHING);
        battle.teams[1].conditions.insert(TeamConditions::WIDE_GUARD);
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert!(battle.battler(id).status2.is_empty());
        assert!(battle.teams[1].conditions.is_empty());
    }

    #[test]
    fn triples_auto_center_lone_battlers() {
        let mut battle = create_test_battle(
            BattleFormat::Triple,
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash])],
            vec![TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash])],
        );
        // Both leads start on the left, out of each other's reach.
        assert!(!battle.are_adjacent(BattlerId::new(0, 0), BattlerId::new(1, 0)));
        splash_both(&mut battle);
        battle.run_turn(&mut predictable_rng()).expect("turn resolves");
        assert_eq!(battle.battler(BattlerId::new(0, 0)).position, FieldPosition::Center);
        assert_eq!(battle.battler(BattlerId::new(1, 0)).position, FieldPosition::Center);
        assert!(battle
            .events
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::AutoCenter { .. })));
    }
}
