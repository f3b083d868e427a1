use crate::battle::battler::{Battler, BattlerId};
use crate::battle::conditions::FieldConditions;
use crate::battle::events::{BattlerRef, EventBus};
use crate::battle::team::{Team, TeamRoster};
use crate::errors::{BattleResult, BattleStateError};
use crate::settings::BattleSettings;
use schema::{Ability, BattleFormat, FieldPosition, Weather};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    ReadyToBegin,
    WaitingForActions,
    WaitingForSwitchIns,
    Ended,
}

/// The battle aggregate. It exclusively owns both teams and every battler in
/// them; collaborators observe it through `events` or the read-only queries.
#[derive(Debug)]
pub struct Battle {
    pub format: BattleFormat,
    pub settings: BattleSettings,
    pub teams: [Team; 2],
    pub weather: Weather,
    /// Zero while no weather is active or when the weather never expires.
    pub weather_turns: u8,
    pub field_conditions: FieldConditions,
    pub trick_room_turns: u8,
    pub turn: u32,
    pub phase: BattlePhase,
    pub winner: Option<usize>,
    pub events: EventBus,
}

impl Battle {
    pub fn new(
        format: BattleFormat,
        first: &TeamRoster,
        second: &TeamRoster,
        settings: BattleSettings,
    ) -> BattleResult<Battle> {
        settings.validate()?;
        let teams = [
            Team::from_roster(0, first, &settings)?,
            Team::from_roster(1, second, &settings)?,
        ];
        Ok(Battle {
            format,
            settings,
            teams,
            weather: Weather::None,
            weather_turns: 0,
            field_conditions: FieldConditions::empty(),
            trick_room_turns: 0,
            turn: 0,
            phase: BattlePhase::ReadyToBegin,
            winner: None,
            events: EventBus::new(),
        })
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == BattlePhase::Ended
    }

    pub(crate) fn ensure_phase(&self, expected: BattlePhase) -> BattleResult<()> {
        if self.phase == BattlePhase::Ended {
            return Err(BattleStateError::BattleEnded.into());
        }
        if self.phase != expected {
            return Err(BattleStateError::WrongPhase {
                expected,
                actual: self.phase,
            }
            .into());
        }
        Ok(())
    }

    pub fn battler(&self, id: BattlerId) -> &Battler {
        &self.teams[id.team].party[id.slot]
    }

    pub fn battler_mut(&mut self, id: BattlerId) -> &mut Battler {
        &mut self.teams[id.team].party[id.slot]
    }

    /// Looks up a caller-supplied id without panicking.
    pub fn get_battler(&self, id: BattlerId) -> Option<&Battler> {
        self.teams.get(id.team)?.party.get(id.slot)
    }

    pub fn reference(&self, id: BattlerId) -> BattlerRef {
        self.battler(id).reference()
    }

    /// Every battler on the field, team 0 first, each team in column order.
    pub fn active_battlers(&self) -> Vec<BattlerId> {
        self.teams
            .iter()
            .flat_map(|team| team.active_battlers())
            .collect()
    }

    pub fn battler_at(&self, team: usize, position: FieldPosition) -> Option<BattlerId> {
        self.teams.get(team)?.battler_at(position).map(|b| b.id)
    }

    pub fn foes_of(&self, id: BattlerId) -> Vec<BattlerId> {
        self.teams[id.opposing_team()].active_battlers()
    }

    pub fn allies_of(&self, id: BattlerId) -> Vec<BattlerId> {
        self.teams[id.team]
            .active_battlers()
            .into_iter()
            .filter(|ally| *ally != id)
            .collect()
    }

    /// Adjacency between two positions, ally or foe.
    ///
    /// Everyone is adjacent in doubles. In triples a foe's column is mirrored,
    /// so the opposing Left faces this side's Right.
    pub fn positions_adjacent(
        &self,
        team_a: usize,
        position_a: FieldPosition,
        team_b: usize,
        position_b: FieldPosition,
    ) -> bool {
        let (Some(col_a), Some(col_b)) = (position_a.column(), position_b.column()) else {
            return false;
        };
        match self.format {
            BattleFormat::Single | BattleFormat::Double => team_a != team_b || col_a != col_b,
            BattleFormat::Triple => {
                if team_a == team_b {
                    (col_a - col_b).abs() == 1
                } else {
                    (col_a - (2 - col_b)).abs() <= 1
                }
            }
        }
    }

    pub fn are_adjacent(&self, a: BattlerId, b: BattlerId) -> bool {
        let first = self.battler(a);
        let second = self.battler(b);
        self.positions_adjacent(a.team, first.position, b.team, second.position)
    }

    /// Weather as the rules see it: Air Lock and Cloud Nine on the field suppress it.
    pub fn effective_weather(&self) -> Weather {
        let suppressed = self.active_battlers().into_iter().any(|id| {
            matches!(
                self.battler(id).ability,
                Ability::AirLock | Ability::CloudNine
            )
        });
        if suppressed {
            Weather::None
        } else {
            self.weather
        }
    }

    pub fn team_has_conscious_battlers(&self, team: usize) -> bool {
        self.teams[team].has_conscious_battlers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::battler::RosterEntry;
    use crate::errors::{BattleEngineError, RosterError};
    use rstest::rstest;
    use schema::{Move, Species};

    fn roster(name: &str, count: usize) -> TeamRoster {
        TeamRoster::new(
            name,
            (0..count)
                .map(|_| RosterEntry::new(Species::Pikachu, 50, vec![Move::Thunderbolt]))
                .collect(),
        )
    }

    #[test]
    fn new_battle_waits_to_begin() {
        let battle = Battle::new(
            BattleFormat::Single,
            &roster("A", 1),
            &roster("B", 1),
            BattleSettings::default(),
        )
        .expect("valid battle");
        assert_eq!(battle.phase(), BattlePhase::ReadyToBegin);
        assert!(battle.active_battlers().is_empty());
    }

    #[test]
    fn oversized_party_is_rejected() {
        let result = Battle::new(
            BattleFormat::Single,
            &roster("A", 7),
            &roster("B", 1),
            BattleSettings::default(),
        );
        assert!(matches!(
            result,
            Err(BattleEngineError::Roster(RosterError::PartyTooLarge { size: 7, .. }))
        ));
    }

    #[rstest]
    #[case(0, FieldPosition::Left, 1, FieldPosition::Right, true)]
    #[case(0, FieldPosition::Left, 1, FieldPosition::Center, true)]
    #[case(0, FieldPosition::Left, 1, FieldPosition::Left, false)]
    #[case(0, FieldPosition::Left, 0, FieldPosition::Center, true)]
    #[case(0, FieldPosition::Left, 0, FieldPosition::Right, false)]
    fn triple_adjacency(
        #[case] team_a: usize,
        #[case] pos_a: FieldPosition,
        #[case] team_b: usize,
        #[case] pos_b: FieldPosition,
        #[case] expected: bool,
    ) {
        let battle = Battle::new(
            BattleFormat::Triple,
            &roster("A", 3),
            &roster("B", 3),
            BattleSettings::default(),
        )
        .expect("valid battle");
        assert_eq!(battle.positions_adjacent(team_a, pos_a, team_b, pos_b), expected);
    }
}
