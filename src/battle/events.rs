use crate::battle::battler::{BattlerId, RosterEntry};
use crate::battle::conditions::{FieldConditions, MoveResult, TeamConditions, VolatileConditions};
use crate::battle::state::Battle;
use schema::{Ability, FieldPosition, Item, Move, PokemonType, Species, Stat, Status1, Weather};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

/// Denormalized pointer to a battler as it stood when the event happened.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BattlerRef {
    pub team: usize,
    pub slot: usize,
    pub position: FieldPosition,
}

impl BattlerRef {
    pub fn id(&self) -> BattlerId {
        BattlerId::new(self.team, self.slot)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Added,
    /// The condition did something visible without changing (e.g. confusion ticking).
    Announced,
    CausedImmobility,
    Cured,
    Damage,
    Ended,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityAction {
    Announced,
    ChangedAppearance,
    ChangedStats,
    ChangedStatus,
    Damage,
    PreventedStatus,
    RestoredHp,
    Weather,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Announced,
    ChangedStatus,
    Consumed,
    Damage,
    RestoredHp,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    Choice,
    Temporary,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMessage {
    DraggedOut,
    Endure,
    Haze,
    HpDrained,
    NothingHappened,
    OneHitKnockout,
    PainSplit,
    PsychUp,
    Recoil,
    Struggle,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Battle flow
    TeamRevealed {
        team: usize,
        trainer_name: String,
        party: Vec<RosterEntry>,
    },
    TurnBegan {
        turn: u32,
    },
    ActionsRequested {
        team: usize,
    },
    SwitchInsRequested {
        team: usize,
        count: usize,
    },
    Winner {
        team: usize,
    },

    // Field presence
    SwitchIn {
        battler: BattlerRef,
        /// What the opponent sees, which differs under Illusion.
        species: Species,
        nickname: String,
        level: u8,
        hp: u16,
        max_hp: u16,
        forced: bool,
    },
    SwitchOut {
        battler: BattlerRef,
        forced: bool,
    },
    AutoCenter {
        first: BattlerRef,
        second: BattlerRef,
    },
    Fainted {
        battler: BattlerRef,
    },

    // Moves
    MoveUsed {
        user: BattlerRef,
        move_: Move,
        /// False when the move was called by another move and is not part of the loadout.
        reveals: bool,
    },
    PpChanged {
        battler: BattlerRef,
        move_: Move,
        old_pp: u8,
        new_pp: u8,
    },
    MoveMissed {
        user: BattlerRef,
        target: BattlerRef,
    },
    MoveCrit {
        target: BattlerRef,
    },
    MoveResultReported {
        user: BattlerRef,
        target: Option<BattlerRef>,
        result: MoveResult,
    },
    MoveLockChanged {
        battler: BattlerRef,
        kind: LockKind,
        move_: Option<Move>,
    },

    // Battler state
    HpChanged {
        battler: BattlerRef,
        old_hp: u16,
        new_hp: u16,
        max_hp: u16,
    },
    StatChanged {
        battler: BattlerRef,
        stat: Stat,
        old_stage: i8,
        new_stage: i8,
    },
    Status1Changed {
        battler: BattlerRef,
        status: Status1,
        action: StatusAction,
    },
    Status2Changed {
        battler: BattlerRef,
        condition: VolatileConditions,
        action: StatusAction,
        source: Option<BattlerRef>,
    },
    TypeChanged {
        battler: BattlerRef,
        types: [PokemonType; 2],
    },
    AbilityReplaced {
        battler: BattlerRef,
        old_ability: Ability,
        new_ability: Ability,
    },
    FormChanged {
        battler: BattlerRef,
        species: Species,
    },
    Transformed {
        user: BattlerRef,
        target: BattlerRef,
        species: Species,
    },
    IllusionBroken {
        battler: BattlerRef,
        species: Species,
        nickname: String,
    },
    AbilityTriggered {
        owner: BattlerRef,
        other: Option<BattlerRef>,
        ability: Ability,
        action: AbilityAction,
    },
    ItemTriggered {
        holder: BattlerRef,
        other: Option<BattlerRef>,
        item: Item,
        action: ItemAction,
    },

    // Field state
    TeamConditionChanged {
        team: usize,
        condition: TeamConditions,
        action: StatusAction,
        victim: Option<BattlerRef>,
    },
    WeatherChanged {
        weather: Weather,
        action: StatusAction,
        victim: Option<BattlerRef>,
    },
    FieldConditionChanged {
        condition: FieldConditions,
        action: StatusAction,
    },
    Special {
        battler: Option<BattlerRef>,
        other: Option<BattlerRef>,
        message: SpecialMessage,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, battle: &Battle) -> Option<String> {
        match self {
            BattleEvent::TeamRevealed { trainer_name, party, .. } => Some(format!(
                "{} brought {} battler(s).",
                trainer_name,
                party.len()
            )),
            BattleEvent::TurnBegan { turn } => Some(format!("=== Turn {} ===", turn)),
            BattleEvent::ActionsRequested { .. } | BattleEvent::SwitchInsRequested { .. } => None,
            BattleEvent::Winner { team } => Some(format!("{} won the battle!", trainer(battle, *team))),

            BattleEvent::SwitchIn { battler, nickname, .. } => Some(format!(
                "{} sent out {}!",
                trainer(battle, battler.team),
                nickname
            )),
            BattleEvent::SwitchOut { battler, forced } => {
                if *forced {
                    None
                } else {
                    Some(format!(
                        "{} withdrew {}!",
                        trainer(battle, battler.team),
                        nickname(battle, battler)
                    ))
                }
            }
            BattleEvent::AutoCenter { .. } => Some("The battlers moved to the center!".to_string()),
            BattleEvent::Fainted { battler } => Some(format!("{} fainted!", name(battle, battler))),

            BattleEvent::MoveUsed { user, move_, .. } => {
                Some(format!("{} used {}!", name(battle, user), move_))
            }
            BattleEvent::PpChanged { .. } => None,
            BattleEvent::MoveMissed { target, .. } => {
                Some(format!("{} avoided the attack!", name(battle, target)))
            }
            BattleEvent::MoveCrit { .. } => Some("A critical hit!".to_string()),
            BattleEvent::MoveResultReported { target, result, .. } => {
                Self::format_move_result(battle, target.as_ref(), *result)
            }
            BattleEvent::MoveLockChanged { .. } => None,

            BattleEvent::HpChanged { battler, old_hp, new_hp, .. } => {
                if new_hp < old_hp {
                    Some(format!("{} lost {} HP!", name(battle, battler), old_hp - new_hp))
                } else if new_hp > old_hp {
                    Some(format!("{} restored {} HP!", name(battle, battler), new_hp - old_hp))
                } else {
                    None
                }
            }
            BattleEvent::StatChanged {
                battler,
                stat,
                old_stage,
                new_stage,
            } => Some(format!(
                "{}'s {} {}",
                name(battle, battler),
                stat,
                Self::format_stage_change(*old_stage, *new_stage)
            )),
            BattleEvent::Status1Changed { battler, status, action } => Some(format!(
                "{} {}",
                name(battle, battler),
                Self::format_status1(*status, *action)
            )),
            BattleEvent::Status2Changed {
                battler,
                condition,
                action,
                ..
            } => Some(format!(
                "{} {}",
                name(battle, battler),
                Self::format_status2(*condition, *action)
            )),
            BattleEvent::TypeChanged { battler, types } => {
                let type_names = if types[0] == types[1] || types[1] == PokemonType::Typeless {
                    types[0].to_string()
                } else {
                    format!("{}/{}", types[0], types[1])
                };
                Some(format!("{} transformed into the {} type!", name(battle, battler), type_names))
            }
            BattleEvent::AbilityReplaced { battler, new_ability, .. } => {
                if *new_ability == Ability::None {
                    Some(format!("{}'s ability was suppressed!", name(battle, battler)))
                } else {
                    Some(format!("{} acquired {}!", name(battle, battler), new_ability))
                }
            }
            BattleEvent::FormChanged { battler, species } => Some(format!(
                "{} transformed into {}!",
                name(battle, battler),
                species
            )),
            BattleEvent::Transformed { user, species, .. } => {
                Some(format!("{} transformed into {}!", name(battle, user), species))
            }
            BattleEvent::IllusionBroken { battler, .. } => {
                Some(format!("{}'s illusion wore off!", name(battle, battler)))
            }
            BattleEvent::AbilityTriggered { owner, ability, .. } => {
                Some(format!("[{}'s {}]", name(battle, owner), ability))
            }
            BattleEvent::ItemTriggered {
                holder, item, action, ..
            } => Some(match action {
                ItemAction::Consumed => format!("{} used its {}!", name(battle, holder), item),
                ItemAction::RestoredHp => {
                    format!("{} restored a little HP using its {}!", name(battle, holder), item)
                }
                ItemAction::Damage => format!("{} was hurt by its {}!", name(battle, holder), item),
                ItemAction::Announced | ItemAction::ChangedStatus => {
                    format!("[{}'s {}]", name(battle, holder), item)
                }
            }),

            BattleEvent::TeamConditionChanged {
                team,
                condition,
                action,
                victim,
            } => Self::format_team_condition(battle, *team, *condition, *action, victim.as_ref()),
            BattleEvent::WeatherChanged {
                weather,
                action,
                victim,
            } => Self::format_weather(battle, *weather, *action, victim.as_ref()),
            BattleEvent::FieldConditionChanged { action, .. } => match action {
                StatusAction::Added => Some("The dimensions were twisted!".to_string()),
                StatusAction::Ended => Some("The twisted dimensions returned to normal!".to_string()),
                _ => None,
            },
            BattleEvent::Special {
                battler,
                other,
                message,
            } => Self::format_special(battle, battler.as_ref(), other.as_ref(), *message),
        }
    }

    fn format_move_result(
        battle: &Battle,
        target: Option<&BattlerRef>,
        result: MoveResult,
    ) -> Option<String> {
        let target_name = target.map(|t| name(battle, t)).unwrap_or_default();
        match result {
            MoveResult::Success => None,
            MoveResult::SuperEffective => Some("It's super effective!".to_string()),
            MoveResult::NotVeryEffective => Some("It's not very effective...".to_string()),
            MoveResult::IneffectiveType => Some(format!("It doesn't affect {}...", target_name)),
            MoveResult::IneffectiveSubstitute => {
                Some(format!("{}'s substitute blocked the effect!", target_name))
            }
            MoveResult::IneffectiveSafeguard => {
                Some(format!("{} is protected by Safeguard!", target_name))
            }
            MoveResult::IneffectiveStat => Some(format!("{}'s stats won't go any further!", target_name)),
            MoveResult::IneffectiveStatus
            | MoveResult::IneffectiveAbility
            | MoveResult::IneffectiveGender
            | MoveResult::IneffectiveLevel => Some(format!("{} was unaffected!", target_name)),
            MoveResult::Missed => None,
            MoveResult::NoTarget => Some("But there was no target...".to_string()),
            MoveResult::InvalidConditions => Some("But it failed!".to_string()),
        }
    }

    fn format_stage_change(old_stage: i8, new_stage: i8) -> &'static str {
        let change = i16::from(new_stage) - i16::from(old_stage);
        match change {
            0 if new_stage > 0 => "won't go any higher!",
            0 if new_stage < 0 => "won't go any lower!",
            0 => "was reset.",
            1 => "rose!",
            2 => "rose sharply!",
            c if c >= 3 => "rose drastically!",
            -1 => "fell!",
            -2 => "harshly fell!",
            _ => "severely fell!",
        }
    }

    fn format_status1(status: Status1, action: StatusAction) -> String {
        let text = match (status, action) {
            (Status1::Asleep, StatusAction::Added) => "fell asleep!",
            (Status1::Asleep, StatusAction::CausedImmobility) => "is fast asleep.",
            (Status1::Asleep, StatusAction::Ended) => "woke up!",
            (Status1::Burned, StatusAction::Added) => "was burned!",
            (Status1::Burned, StatusAction::Damage) => "was hurt by its burn!",
            (Status1::Frozen, StatusAction::Added) => "was frozen solid!",
            (Status1::Frozen, StatusAction::CausedImmobility) => "is frozen solid!",
            (Status1::Frozen, StatusAction::Ended) => "thawed out!",
            (Status1::Paralyzed, StatusAction::Added) => "is paralyzed! It may be unable to move!",
            (Status1::Paralyzed, StatusAction::CausedImmobility) => "is paralyzed! It can't move!",
            (Status1::Poisoned, StatusAction::Added) => "was poisoned!",
            (Status1::BadlyPoisoned, StatusAction::Added) => "was badly poisoned!",
            (Status1::Poisoned | Status1::BadlyPoisoned, StatusAction::Damage) => {
                "was hurt by poison!"
            }
            (_, StatusAction::Cured) => "was cured of its status problem!",
            _ => "was affected by its status.",
        };
        text.to_string()
    }

    fn format_status2(condition: VolatileConditions, action: StatusAction) -> String {
        let label = condition.display_name();
        match action {
            StatusAction::Added => format!("is now under {}!", label),
            StatusAction::Announced => format!("is affected by {}!", label),
            StatusAction::CausedImmobility => format!("couldn't move because of {}!", label),
            StatusAction::Cured | StatusAction::Ended => format!("is no longer under {}.", label),
            StatusAction::Damage => format!("was hurt by {}!", label),
        }
    }

    fn format_team_condition(
        battle: &Battle,
        team: usize,
        condition: TeamConditions,
        action: StatusAction,
        victim: Option<&BattlerRef>,
    ) -> Option<String> {
        let label = condition.display_name();
        let owner = trainer(battle, team);
        match action {
            StatusAction::Added => Some(format!("{} now affects {}'s team!", label, owner)),
            StatusAction::Ended | StatusAction::Cured => {
                Some(format!("{}'s {} wore off!", owner, label))
            }
            StatusAction::Damage => victim.map(|v| format!("{} was hurt by {}!", name(battle, v), label)),
            StatusAction::Announced | StatusAction::CausedImmobility => None,
        }
    }

    fn format_weather(
        battle: &Battle,
        weather: Weather,
        action: StatusAction,
        victim: Option<&BattlerRef>,
    ) -> Option<String> {
        let text = match (weather, action) {
            (Weather::Hailstorm, StatusAction::Added) => "It started to hail!".to_string(),
            (Weather::Hailstorm, StatusAction::Announced) => "Hail continues to fall.".to_string(),
            (Weather::Hailstorm, StatusAction::Ended) => "The hail stopped.".to_string(),
            (Weather::HarshSunlight, StatusAction::Added) => "The sunlight turned harsh!".to_string(),
            (Weather::HarshSunlight, StatusAction::Announced) => "The sunlight is strong.".to_string(),
            (Weather::HarshSunlight, StatusAction::Ended) => "The sunlight faded.".to_string(),
            (Weather::Rain, StatusAction::Added) => "It started to rain!".to_string(),
            (Weather::Rain, StatusAction::Announced) => "Rain continues to fall.".to_string(),
            (Weather::Rain, StatusAction::Ended) => "The rain stopped.".to_string(),
            (Weather::Sandstorm, StatusAction::Added) => "A sandstorm kicked up!".to_string(),
            (Weather::Sandstorm, StatusAction::Announced) => "The sandstorm rages.".to_string(),
            (Weather::Sandstorm, StatusAction::Ended) => "The sandstorm subsided.".to_string(),
            (weather, StatusAction::Damage) => {
                return victim.map(|v| format!("{} is buffeted by the {}!", name(battle, v), weather));
            }
            _ => return None,
        };
        Some(text)
    }

    fn format_special(
        battle: &Battle,
        battler: Option<&BattlerRef>,
        other: Option<&BattlerRef>,
        message: SpecialMessage,
    ) -> Option<String> {
        let first = battler.map(|b| name(battle, b)).unwrap_or_default();
        let second = other.map(|b| name(battle, b)).unwrap_or_default();
        Some(match message {
            SpecialMessage::DraggedOut => format!("{} was dragged out!", first),
            SpecialMessage::Endure => format!("{} hung on!", first),
            SpecialMessage::Haze => "All stat changes were eliminated!".to_string(),
            SpecialMessage::HpDrained => format!("{} had its energy drained!", first),
            SpecialMessage::NothingHappened => "But nothing happened!".to_string(),
            SpecialMessage::OneHitKnockout => "It's a one-hit KO!".to_string(),
            SpecialMessage::PainSplit => "The battlers shared their pain!".to_string(),
            SpecialMessage::PsychUp => format!("{} copied {}'s stat changes!", first, second),
            SpecialMessage::Recoil => format!("{} is damaged by recoil!", first),
            SpecialMessage::Struggle => format!("{} has no moves left!", first),
        })
    }
}

fn trainer(battle: &Battle, team: usize) -> &str {
    battle
        .teams
        .get(team)
        .map(|t| t.trainer_name.as_str())
        .unwrap_or("Unknown trainer")
}

fn nickname(battle: &Battle, battler: &BattlerRef) -> String {
    battle
        .teams
        .get(battler.team)
        .and_then(|t| t.party.get(battler.slot))
        .map(|b| b.known_nickname.clone())
        .unwrap_or_else(|| "???".to_string())
}

/// "Trainer's Nickname", the way the opponent sees it.
fn name(battle: &Battle, battler: &BattlerRef) -> String {
    format!("{}'s {}", trainer(battle, battler.team), nickname(battle, battler))
}

/// Receives every event as it is appended to the log.
pub trait EventSubscriber {
    fn on_event(&mut self, event: &BattleEvent);
}

impl<F> EventSubscriber for F
where
    F: FnMut(&BattleEvent),
{
    fn on_event(&mut self, event: &BattleEvent) {
        self(event)
    }
}

/// Writes every event to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSubscriber;

impl EventSubscriber for TracingSubscriber {
    fn on_event(&mut self, event: &BattleEvent) {
        debug!(?event, "battle event");
    }
}

/// Forwards a copy of every event into an unbounded channel, for spectators.
#[derive(Debug, Clone)]
pub struct ChannelRelay {
    sender: UnboundedSender<BattleEvent>,
}

impl ChannelRelay {
    pub fn new(sender: UnboundedSender<BattleEvent>) -> Self {
        Self { sender }
    }
}

impl EventSubscriber for ChannelRelay {
    fn on_event(&mut self, event: &BattleEvent) {
        if self.sender.send(event.clone()).is_err() {
            trace!("relay receiver dropped, event not forwarded");
        }
    }
}

/// Append-only event log plus the subscribers notified on every append.
///
/// ```rust,ignore
/// battle.events.print_debug_with_message("Turn 1 events:");
/// battle.events.print_formatted(&battle);
/// println!("{}", battle.events);
/// ```
#[derive(Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
    subscribers: Vec<Box<dyn EventSubscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus pre-filled with a recorded log, without subscribers.
    pub fn from_events(events: Vec<BattleEvent>) -> Self {
        Self {
            events,
            subscribers: Vec::new(),
        }
    }

    /// Subscribers are called synchronously, once per event, in registration order.
    pub fn subscribe<S: EventSubscriber + 'static>(&mut self, subscriber: S) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn push(&mut self, event: BattleEvent) {
        for subscriber in &mut self.subscribers {
            subscriber.on_event(&event);
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn events_since(&self, index: usize) -> &[BattleEvent] {
        self.events.get(index..).unwrap_or(&[])
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.events)
    }

    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    pub fn print_debug_with_message(&self, message: &str) {
        println!("{}", message);
        self.print_debug();
    }

    /// Falls back to debug format for silent events.
    pub fn print_formatted(&self, battle: &Battle) {
        for event in &self.events {
            match event.format(battle) {
                Some(formatted) => println!("  {}", formatted),
                None => println!("  {:?} (silent)", event),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.events)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestBattlerBuilder};
    use pretty_assertions::assert_eq;
    use schema::BattleFormat;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample_battle() -> Battle {
        create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Thunderbolt])],
            vec![TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::ShadowBall])],
        )
    }

    fn pikachu_ref() -> BattlerRef {
        BattlerRef {
            team: 0,
            slot: 0,
            position: FieldPosition::Center,
        }
    }

    #[test]
    fn silent_events_return_none() {
        let battle = sample_battle();
        let silent = vec![
            BattleEvent::ActionsRequested { team: 0 },
            BattleEvent::PpChanged {
                battler: pikachu_ref(),
                move_: Move::Thunderbolt,
                old_pp: 15,
                new_pp: 14,
            },
            BattleEvent::MoveResultReported {
                user: pikachu_ref(),
                target: None,
                result: MoveResult::Success,
            },
        ];
        for event in silent {
            assert!(event.format(&battle).is_none(), "{:?} should be silent", event);
        }
    }

    #[test]
    fn event_text_samples() {
        let battle = sample_battle();
        assert_eq!(
            BattleEvent::TurnBegan { turn: 5 }.format(&battle),
            Some("=== Turn 5 ===".to_string())
        );
        assert_eq!(
            BattleEvent::MoveUsed {
                user: pikachu_ref(),
                move_: Move::Thunderbolt,
                reveals: true
            }
            .format(&battle),
            Some("Player 1's Pikachu used Thunderbolt!".to_string())
        );
        assert_eq!(
            BattleEvent::StatChanged {
                battler: pikachu_ref(),
                stat: Stat::Speed,
                old_stage: 0,
                new_stage: 2
            }
            .format(&battle),
            Some("Player 1's Pikachu's Speed rose sharply!".to_string())
        );
    }

    #[test]
    fn subscribers_see_every_event_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut bus = EventBus::new();
        bus.subscribe(move |event: &BattleEvent| sink.borrow_mut().push(event.clone()));

        bus.push(BattleEvent::TurnBegan { turn: 1 });
        bus.push(BattleEvent::ActionsRequested { team: 1 });

        assert_eq!(seen.borrow().as_slice(), bus.events());
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.events_since(1).len(), 1);
    }

    #[test]
    fn channel_relay_forwards_copies() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let mut bus = EventBus::new();
        bus.subscribe(ChannelRelay::new(sender));
        bus.push(BattleEvent::Winner { team: 1 });
        assert_eq!(receiver.try_recv().ok(), Some(BattleEvent::Winner { team: 1 }));
    }

    #[test]
    fn json_export_is_an_array() {
        let mut bus = EventBus::new();
        bus.push(BattleEvent::TurnBegan { turn: 1 });
        let json = bus.to_json().expect("serializable");
        assert!(json.starts_with('['));
        assert!(json.contains("TurnBegan"));
    }
}
