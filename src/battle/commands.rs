use crate::battle::battler::{BattlerId, MoveLock, MoveSlot};
use crate::battle::conditions::{FieldConditions, TeamConditions, VolatileConditions};
use crate::battle::events::{AbilityAction, BattleEvent, ItemAction, LockKind, StatusAction};
use crate::battle::state::{Battle, BattlePhase};
use crate::errors::{BattleResult, BattleStateError};
use crate::species::get_species_data;
use schema::{Ability, FieldPosition, Item, Move, PokemonType, Species, Stat, Status1, Weather};
use tracing::trace;

/// Atomic state changes. Executing a command applies the change and appends the
/// event(s) describing it, so the log never disagrees with the state.
#[derive(Debug, Clone)]
pub enum BattleCommand {
    // Battle flow
    RevealTeam { team: usize },
    BeginTurn,
    RequestActions,
    RequestSwitchIns { counts: [usize; 2] },
    SetWinner { team: usize },
    EmitEvent(BattleEvent),

    // Presence
    SwitchIn {
        team: usize,
        party_slot: usize,
        position: FieldPosition,
        forced: bool,
    },
    SwitchOut { target: BattlerId, forced: bool },
    Faint { target: BattlerId },
    MovePosition { target: BattlerId, position: FieldPosition },

    // Battler state
    SetHp { target: BattlerId, hp: u16 },
    SetStatStage { target: BattlerId, stat: Stat, stage: i8 },
    SetStatus1 {
        target: BattlerId,
        status: Status1,
        /// Sleep duration when falling asleep; ignored otherwise.
        sleep_turns: u8,
        action: StatusAction,
    },
    AddStatus2 {
        target: BattlerId,
        condition: VolatileConditions,
        source: Option<BattlerId>,
        /// Confusion turns, substitute HP or Magnet Rise turns.
        counter: u16,
    },
    RemoveStatus2 {
        target: BattlerId,
        condition: VolatileConditions,
        action: StatusAction,
    },
    ReducePp { target: BattlerId, move_: Move, amount: u8 },
    SetMoveLock {
        target: BattlerId,
        kind: LockKind,
        lock: Option<MoveLock>,
    },
    TriggerAbility {
        owner: BattlerId,
        other: Option<BattlerId>,
        action: AbilityAction,
    },
    TriggerItem {
        holder: BattlerId,
        other: Option<BattlerId>,
        action: ItemAction,
    },
    ConsumeItem { target: BattlerId },
    SetAbility { target: BattlerId, ability: Ability },
    SetTypes { target: BattlerId, types: [PokemonType; 2] },
    ChangeForm { target: BattlerId, species: Species },
    Transform { user: BattlerId, target: BattlerId },
    BreakIllusion { target: BattlerId },

    // Field state
    SetTeamCondition {
        team: usize,
        condition: TeamConditions,
        turns: u8,
    },
    ClearTeamCondition {
        team: usize,
        condition: TeamConditions,
        action: StatusAction,
    },
    SetWeather { weather: Weather, turns: u8 },
    SetFieldCondition { condition: FieldConditions, turns: u8 },
    ClearFieldCondition { condition: FieldConditions },
}

impl Battle {
    /// Execute a batch of commands in order, stopping at the first failure.
    pub fn execute_all(&mut self, commands: Vec<BattleCommand>) -> BattleResult<()> {
        for command in commands {
            self.execute(command)?;
        }
        Ok(())
    }

    fn check_id(&self, id: BattlerId) -> BattleResult<()> {
        if self.get_battler(id).is_none() {
            return Err(BattleStateError::Inconsistent(format!("no battler at {:?}", id)).into());
        }
        Ok(())
    }

    pub fn execute(&mut self, command: BattleCommand) -> BattleResult<()> {
        trace!(?command, "execute");
        match command {
            BattleCommand::RevealTeam { team } => {
                let team = &self.teams[team];
                let event = BattleEvent::TeamRevealed {
                    team: team.id,
                    trainer_name: team.trainer_name.clone(),
                    party: team.roster.clone(),
                };
                self.events.push(event);
            }
            BattleCommand::BeginTurn => {
                self.turn += 1;
                for team in &mut self.teams {
                    team.actions_submitted = false;
                }
                self.events.push(BattleEvent::TurnBegan { turn: self.turn });
            }
            BattleCommand::RequestActions => {
                self.phase = BattlePhase::WaitingForActions;
                for team in 0..2 {
                    self.teams[team].actions_submitted = false;
                    self.events.push(BattleEvent::ActionsRequested { team });
                }
            }
            BattleCommand::RequestSwitchIns { counts } => {
                self.phase = BattlePhase::WaitingForSwitchIns;
                for (team, count) in counts.into_iter().enumerate() {
                    self.teams[team].switch_ins_required = count;
                    self.teams[team].switches_submitted.clear();
                    if count > 0 {
                        self.events.push(BattleEvent::SwitchInsRequested { team, count });
                    }
                }
            }
            BattleCommand::SetWinner { team } => {
                self.winner = Some(team);
                self.phase = BattlePhase::Ended;
                self.events.push(BattleEvent::Winner { team });
            }
            BattleCommand::EmitEvent(event) => self.events.push(event),

            BattleCommand::SwitchIn {
                team,
                party_slot,
                position,
                forced,
            } => self.execute_switch_in(BattlerId::new(team, party_slot), position, forced)?,
            BattleCommand::SwitchOut { target, forced } => {
                self.check_id(target)?;
                let battler = self.reference(target);
                self.battler_mut(target).clear_on_switch_out();
                self.events.push(BattleEvent::SwitchOut { battler, forced });
            }
            BattleCommand::Faint { target } => {
                self.check_id(target)?;
                let battler = self.reference(target);
                let fainted = self.battler_mut(target);
                fainted.hp = 0;
                fainted.clear_on_switch_out();
                self.events.push(BattleEvent::Fainted { battler });
            }
            BattleCommand::MovePosition { target, position } => {
                self.check_id(target)?;
                self.battler_mut(target).position = position;
            }

            BattleCommand::SetHp { target, hp } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                let old_hp = battler.hp;
                battler.hp = hp.min(battler.max_hp);
                let event = BattleEvent::HpChanged {
                    battler: battler.reference(),
                    old_hp,
                    new_hp: battler.hp,
                    max_hp: battler.max_hp,
                };
                self.events.push(event);
            }
            BattleCommand::SetStatStage { target, stat, stage } => {
                self.check_id(target)?;
                let max = self.settings.max_stat_change;
                let battler = self.battler_mut(target);
                let old_stage = battler.stat_stages.get(stat);
                let new_stage = stage.clamp(-max, max);
                battler.stat_stages.set(stat, new_stage);
                let event = BattleEvent::StatChanged {
                    battler: battler.reference(),
                    stat,
                    old_stage,
                    new_stage,
                };
                self.events.push(event);
            }
            BattleCommand::SetStatus1 {
                target,
                status,
                sleep_turns,
                action,
            } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                let reported = if status == Status1::None {
                    battler.status1
                } else {
                    status
                };
                battler.status1 = status;
                battler.status1_counter = match status {
                    Status1::BadlyPoisoned => 1,
                    _ => 0,
                };
                battler.sleep_turns = if status == Status1::Asleep { sleep_turns } else { 0 };
                let event = BattleEvent::Status1Changed {
                    battler: battler.reference(),
                    status: reported,
                    action,
                };
                self.events.push(event);
            }
            BattleCommand::AddStatus2 {
                target,
                condition,
                source,
                counter,
            } => {
                self.check_id(target)?;
                let source_ref = source.map(|id| self.reference(id));
                let battler = self.battler_mut(target);
                battler.status2.insert(condition);
                if condition == VolatileConditions::CONFUSED {
                    battler.confusion_counter = 0;
                    battler.confusion_turns = counter as u8;
                } else if condition == VolatileConditions::SUBSTITUTE {
                    battler.substitute_hp = counter;
                } else if condition == VolatileConditions::MAGNET_RISE {
                    battler.magnet_rise_turns = counter as u8;
                } else if condition == VolatileConditions::INFATUATED {
                    battler.infatuated_with = source;
                } else if condition == VolatileConditions::LEECH_SEED {
                    battler.seeded_by = source_ref.map(|s| (s.team, s.position));
                }
                let event = BattleEvent::Status2Changed {
                    battler: battler.reference(),
                    condition,
                    action: StatusAction::Added,
                    source: source_ref,
                };
                self.events.push(event);
            }
            BattleCommand::RemoveStatus2 {
                target,
                condition,
                action,
            } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                battler.status2.remove(condition);
                if condition.contains(VolatileConditions::CONFUSED) {
                    battler.confusion_counter = 0;
                    battler.confusion_turns = 0;
                }
                if condition.contains(VolatileConditions::SUBSTITUTE) {
                    battler.substitute_hp = 0;
                }
                if condition.contains(VolatileConditions::MAGNET_RISE) {
                    battler.magnet_rise_turns = 0;
                }
                if condition.contains(VolatileConditions::INFATUATED) {
                    battler.infatuated_with = None;
                }
                if condition.contains(VolatileConditions::LEECH_SEED) {
                    battler.seeded_by = None;
                }
                let event = BattleEvent::Status2Changed {
                    battler: battler.reference(),
                    condition,
                    action,
                    source: None,
                };
                self.events.push(event);
            }
            BattleCommand::ReducePp {
                target,
                move_,
                amount,
            } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                let reference = battler.reference();
                if let Some(slot) = battler.move_slot_mut(move_) {
                    let old_pp = slot.pp;
                    slot.pp = slot.pp.saturating_sub(amount);
                    let new_pp = slot.pp;
                    if !battler.known_moves.contains(&move_) {
                        battler.known_moves.push(move_);
                    }
                    self.events.push(BattleEvent::PpChanged {
                        battler: reference,
                        move_,
                        old_pp,
                        new_pp,
                    });
                }
            }
            BattleCommand::SetMoveLock { target, kind, lock } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                let move_ = match kind {
                    LockKind::Temporary => {
                        battler.temp_locked_move = lock;
                        lock.map(|l| l.move_)
                    }
                    LockKind::Choice => {
                        battler.choice_locked_move = lock.map(|l| l.move_);
                        battler.choice_locked_move
                    }
                };
                let event = BattleEvent::MoveLockChanged {
                    battler: battler.reference(),
                    kind,
                    move_,
                };
                self.events.push(event);
            }
            BattleCommand::TriggerAbility {
                owner,
                other,
                action,
            } => {
                self.check_id(owner)?;
                let other = other.map(|id| self.reference(id));
                let battler = self.battler_mut(owner);
                battler.known_ability = Some(battler.ability);
                let event = BattleEvent::AbilityTriggered {
                    owner: battler.reference(),
                    other,
                    ability: battler.ability,
                    action,
                };
                self.events.push(event);
            }
            BattleCommand::TriggerItem {
                holder,
                other,
                action,
            } => {
                self.check_id(holder)?;
                let other = other.map(|id| self.reference(id));
                let battler = self.battler_mut(holder);
                battler.known_item = Some(battler.item);
                let event = BattleEvent::ItemTriggered {
                    holder: battler.reference(),
                    other,
                    item: battler.item,
                    action,
                };
                self.events.push(event);
            }
            BattleCommand::ConsumeItem { target } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                let item = battler.item;
                battler.item = Item::None;
                battler.known_item = Some(Item::None);
                let event = BattleEvent::ItemTriggered {
                    holder: battler.reference(),
                    other: None,
                    item,
                    action: ItemAction::Consumed,
                };
                self.events.push(event);
            }
            BattleCommand::SetAbility { target, ability } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                let old_ability = battler.ability;
                battler.ability = ability;
                battler.known_ability = Some(ability);
                let event = BattleEvent::AbilityReplaced {
                    battler: battler.reference(),
                    old_ability,
                    new_ability: ability,
                };
                self.events.push(event);
            }
            BattleCommand::SetTypes { target, types } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                battler.types = types;
                battler.known_types = types;
                let event = BattleEvent::TypeChanged {
                    battler: battler.reference(),
                    types,
                };
                self.events.push(event);
            }
            BattleCommand::ChangeForm { target, species } => {
                self.check_id(target)?;
                let types = get_species_data(species)?.types;
                let battler = self.battler_mut(target);
                battler.species = species;
                battler.known_species = species;
                battler.types = types;
                battler.known_types = types;
                let event = BattleEvent::FormChanged {
                    battler: battler.reference(),
                    species,
                };
                self.events.push(event);
            }
            BattleCommand::Transform { user, target } => {
                self.check_id(user)?;
                self.check_id(target)?;
                let model = self.battler(target).clone();
                let target_ref = model.reference();
                let transformed = self.battler_mut(user);
                transformed.species = model.species;
                transformed.known_species = model.species;
                transformed.types = model.types;
                transformed.known_types = model.types;
                transformed.ability = model.ability;
                transformed.stats = model.stats;
                transformed.stat_stages = model.stat_stages;
                transformed.gender = model.gender;
                if transformed.moves_backup.is_none() {
                    transformed.moves_backup = Some(transformed.moves.clone());
                }
                transformed.moves = model
                    .moves
                    .iter()
                    .map(|slot| MoveSlot {
                        move_: slot.move_,
                        pp: slot.max_pp.min(5),
                        max_pp: slot.max_pp.min(5),
                    })
                    .collect();
                transformed.status2.insert(VolatileConditions::TRANSFORMED);
                let event = BattleEvent::Transformed {
                    user: transformed.reference(),
                    target: target_ref,
                    species: model.species,
                };
                self.events.push(event);
            }
            BattleCommand::BreakIllusion { target } => {
                self.check_id(target)?;
                let battler = self.battler_mut(target);
                battler.disguised_as = None;
                battler.status2.remove(VolatileConditions::DISGUISED);
                battler.known_nickname = battler.nickname.clone();
                battler.known_species = battler.species;
                battler.known_types = battler.types;
                let event = BattleEvent::IllusionBroken {
                    battler: battler.reference(),
                    species: battler.species,
                    nickname: battler.nickname.clone(),
                };
                self.events.push(event);
            }

            BattleCommand::SetTeamCondition {
                team,
                condition,
                turns,
            } => {
                let side = &mut self.teams[team];
                side.conditions.insert(condition);
                if condition == TeamConditions::SPIKES {
                    side.spikes_layers = (side.spikes_layers + 1).min(3);
                } else if condition == TeamConditions::TOXIC_SPIKES {
                    side.toxic_spikes_layers = (side.toxic_spikes_layers + 1).min(2);
                }
                if let Some(counter) = side.condition_turns_mut(condition) {
                    *counter = turns;
                }
                self.events.push(BattleEvent::TeamConditionChanged {
                    team,
                    condition,
                    action: StatusAction::Added,
                    victim: None,
                });
            }
            BattleCommand::ClearTeamCondition {
                team,
                condition,
                action,
            } => {
                let side = &mut self.teams[team];
                side.conditions.remove(condition);
                if condition == TeamConditions::SPIKES {
                    side.spikes_layers = 0;
                } else if condition == TeamConditions::TOXIC_SPIKES {
                    side.toxic_spikes_layers = 0;
                }
                if let Some(counter) = side.condition_turns_mut(condition) {
                    *counter = 0;
                }
                self.events.push(BattleEvent::TeamConditionChanged {
                    team,
                    condition,
                    action,
                    victim: None,
                });
            }
            BattleCommand::SetWeather { weather, turns } => {
                let previous = self.weather;
                self.weather = weather;
                self.weather_turns = turns;
                let event = if weather == Weather::None {
                    BattleEvent::WeatherChanged {
                        weather: previous,
                        action: StatusAction::Ended,
                        victim: None,
                    }
                } else {
                    BattleEvent::WeatherChanged {
                        weather,
                        action: StatusAction::Added,
                        victim: None,
                    }
                };
                self.events.push(event);
            }
            BattleCommand::SetFieldCondition { condition, turns } => {
                self.field_conditions.insert(condition);
                if condition == FieldConditions::TRICK_ROOM {
                    self.trick_room_turns = turns;
                }
                self.events.push(BattleEvent::FieldConditionChanged {
                    condition,
                    action: StatusAction::Added,
                });
            }
            BattleCommand::ClearFieldCondition { condition } => {
                self.field_conditions.remove(condition);
                if condition == FieldConditions::TRICK_ROOM {
                    self.trick_room_turns = 0;
                }
                self.events.push(BattleEvent::FieldConditionChanged {
                    condition,
                    action: StatusAction::Ended,
                });
            }
        }
        Ok(())
    }

    fn execute_switch_in(
        &mut self,
        id: BattlerId,
        position: FieldPosition,
        forced: bool,
    ) -> BattleResult<()> {
        self.check_id(id)?;
        if self.battler(id).is_fainted() {
            return Err(BattleStateError::Inconsistent(format!(
                "fainted battler {:?} cannot switch in",
                id
            ))
            .into());
        }

        // Illusion copies the last conscious party member other than itself.
        let disguise = if self.battler(id).ability == Ability::Illusion {
            self.teams[id.team]
                .party
                .iter()
                .rev()
                .find(|other| other.id != id && !other.is_fainted())
                .map(|other| (other.id.slot, other.nickname.clone(), other.species, other.types))
        } else {
            None
        };

        let battler = self.battler_mut(id);
        battler.position = position;
        battler.selected_action = None;
        battler.speed_boost_ready = false;
        battler.has_used_move_this_turn = false;
        match disguise {
            Some((slot, nickname, species, types)) => {
                battler.disguised_as = Some(slot);
                battler.status2.insert(VolatileConditions::DISGUISED);
                battler.known_nickname = nickname;
                battler.known_species = species;
                battler.known_types = types;
            }
            None => {
                battler.known_nickname = battler.nickname.clone();
                battler.known_species = battler.species;
                battler.known_types = battler.types;
            }
        }
        let event = BattleEvent::SwitchIn {
            battler: battler.reference(),
            species: battler.known_species,
            nickname: battler.known_nickname.clone(),
            level: battler.level,
            hp: battler.hp,
            max_hp: battler.max_hp,
            forced,
        };
        self.events.push(event);
        Ok(())
    }

    /// Lowers HP by up to `amount` and returns the HP actually lost.
    pub fn deal_damage(&mut self, target: BattlerId, amount: u16) -> BattleResult<u16> {
        let hp = self.battler(target).hp;
        let dealt = amount.min(hp);
        if dealt > 0 {
            self.execute(BattleCommand::SetHp {
                target,
                hp: hp - dealt,
            })?;
        }
        Ok(dealt)
    }

    /// Raises HP by up to `amount` and returns the HP actually restored.
    pub fn heal(&mut self, target: BattlerId, amount: u16) -> BattleResult<u16> {
        let battler = self.battler(target);
        let restored = amount.min(battler.max_hp - battler.hp);
        if restored > 0 {
            let hp = battler.hp + restored;
            self.execute(BattleCommand::SetHp { target, hp })?;
        }
        Ok(restored)
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestBattlerBuilder};
    use pretty_assertions::assert_eq;
    use schema::BattleFormat;

    fn battle() -> Battle {
        create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::BodySlam])],
            vec![TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::ShadowBall])],
        )
    }

    #[test]
    fn set_hp_clamps_and_logs_one_event() {
        let mut battle = battle();
        let target = BattlerId::new(0, 0);
        let max_hp = battle.battler(target).max_hp;
        let before = battle.events.len();

        battle
            .execute(BattleCommand::SetHp {
                target,
                hp: max_hp + 50,
            })
            .expect("valid command");

        assert_eq!(battle.battler(target).hp, max_hp);
        assert_eq!(battle.events.len(), before + 1);
    }

    #[test]
    fn damage_never_goes_below_zero() {
        let mut battle = battle();
        let target = BattlerId::new(1, 0);
        let hp = battle.battler(target).hp;
        let dealt = battle.deal_damage(target, hp + 999).expect("valid command");
        assert_eq!(dealt, hp);
        assert_eq!(battle.battler(target).hp, 0);
    }

    #[test]
    fn stat_stage_is_clamped_to_settings() {
        let mut battle = battle();
        let target = BattlerId::new(0, 0);
        battle
            .execute(BattleCommand::SetStatStage {
                target,
                stat: Stat::Attack,
                stage: 9,
            })
            .expect("valid command");
        assert_eq!(battle.battler(target).stage(Stat::Attack), 6);
    }

    #[test]
    fn spikes_layers_cap_at_three() {
        let mut battle = battle();
        for _ in 0..5 {
            battle
                .execute(BattleCommand::SetTeamCondition {
                    team: 1,
                    condition: TeamConditions::SPIKES,
                    turns: 0,
                })
                .expect("valid command");
        }
        assert_eq!(battle.teams[1].spikes_layers, 3);
    }

    #[test]
    fn unknown_battler_is_an_error() {
        let mut battle = battle();
        let result = battle.execute(BattleCommand::SetHp {
            target: BattlerId::new(0, 9),
            hp: 1,
        });
        assert!(result.is_err());
    }
}
