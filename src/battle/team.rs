use crate::battle::battler::{Battler, BattlerId, RosterEntry};
use crate::battle::conditions::TeamConditions;
use crate::errors::{BattleResult, RosterError};
use crate::settings::BattleSettings;
use schema::FieldPosition;
use serde::{Deserialize, Serialize};

/// What a trainer brings to a battle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeamRoster {
    pub trainer_name: String,
    pub party: Vec<RosterEntry>,
}

impl TeamRoster {
    pub fn new(trainer_name: &str, party: Vec<RosterEntry>) -> Self {
        Self {
            trainer_name: trainer_name.to_string(),
            party,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub id: usize,
    pub trainer_name: String,
    pub party: Vec<Battler>,
    /// The roster as submitted, kept so replays can rebuild the party.
    pub roster: Vec<RosterEntry>,

    pub conditions: TeamConditions,
    pub light_screen_turns: u8,
    pub lucky_chant_turns: u8,
    pub reflect_turns: u8,
    pub safeguard_turns: u8,
    pub tailwind_turns: u8,
    pub spikes_layers: u8,
    pub toxic_spikes_layers: u8,

    pub switch_ins_required: usize,
    pub actions_submitted: bool,
    pub switches_submitted: Vec<(usize, FieldPosition)>,
}

impl Team {
    pub fn from_roster(id: usize, roster: &TeamRoster, settings: &BattleSettings) -> BattleResult<Team> {
        if roster.party.is_empty() {
            return Err(RosterError::EmptyParty(id).into());
        }
        if roster.party.len() > usize::from(settings.max_party_size) {
            return Err(RosterError::PartyTooLarge {
                team: id,
                size: roster.party.len(),
                max: usize::from(settings.max_party_size),
            }
            .into());
        }
        let party = roster
            .party
            .iter()
            .enumerate()
            .map(|(slot, entry)| Battler::from_roster(BattlerId::new(id, slot), entry, settings))
            .collect::<BattleResult<Vec<_>>>()?;

        Ok(Team {
            id,
            trainer_name: roster.trainer_name.clone(),
            party,
            roster: roster.party.clone(),
            conditions: TeamConditions::empty(),
            light_screen_turns: 0,
            lucky_chant_turns: 0,
            reflect_turns: 0,
            safeguard_turns: 0,
            tailwind_turns: 0,
            spikes_layers: 0,
            toxic_spikes_layers: 0,
            switch_ins_required: 0,
            actions_submitted: false,
            switches_submitted: Vec::new(),
        })
    }

    pub fn battler_at(&self, position: FieldPosition) -> Option<&Battler> {
        if position == FieldPosition::None {
            return None;
        }
        self.party
            .iter()
            .find(|battler| battler.position == position && !battler.is_fainted())
    }

    /// Active battlers in Left, Center, Right order.
    pub fn active_battlers(&self) -> Vec<BattlerId> {
        let mut active: Vec<&Battler> = self.party.iter().filter(|b| b.is_active()).collect();
        active.sort_by_key(|b| b.position.column());
        active.into_iter().map(|b| b.id).collect()
    }

    /// Healthy party members waiting on the bench.
    pub fn reserves(&self) -> Vec<usize> {
        self.party
            .iter()
            .filter(|battler| battler.position == FieldPosition::None && !battler.is_fainted())
            .map(|battler| battler.id.slot)
            .collect()
    }

    pub fn has_conscious_battlers(&self) -> bool {
        self.party.iter().any(|battler| !battler.is_fainted())
    }

    /// Remaining turns for a timed condition, if it has a timer.
    pub fn condition_turns_mut(&mut self, condition: TeamConditions) -> Option<&mut u8> {
        if condition == TeamConditions::LIGHT_SCREEN {
            Some(&mut self.light_screen_turns)
        } else if condition == TeamConditions::LUCKY_CHANT {
            Some(&mut self.lucky_chant_turns)
        } else if condition == TeamConditions::REFLECT {
            Some(&mut self.reflect_turns)
        } else if condition == TeamConditions::SAFEGUARD {
            Some(&mut self.safeguard_turns)
        } else if condition == TeamConditions::TAILWIND {
            Some(&mut self.tailwind_turns)
        } else {
            None
        }
    }
}
