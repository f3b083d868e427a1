use crate::battle::action::{Action, TargetMask};
use crate::battle::conditions::VolatileConditions;
use crate::battle::events::BattlerRef;
use crate::errors::{BattleResult, RosterError};
use crate::move_data::get_move_data;
use crate::settings::BattleSettings;
use crate::species::get_species_data;
use schema::{
    Ability, BaseStats, FieldPosition, Gender, Item, Move, PokemonType, Species, Stat, Status1,
};
use serde::{Deserialize, Serialize};

/// Stable handle to a battler: its team and its index in that team's party.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BattlerId {
    pub team: usize,
    pub slot: usize,
}

impl BattlerId {
    pub fn new(team: usize, slot: usize) -> Self {
        Self { team, slot }
    }

    pub fn opposing_team(self) -> usize {
        1 - self.team
    }
}

/// One party member as submitted by a trainer before the battle starts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub species: Species,
    pub nickname: String,
    pub level: u8,
    pub gender: Gender,
    pub ability: Ability,
    pub item: Item,
    pub moves: Vec<Move>,
    /// HP, Attack, Defense, Sp. Attack, Sp. Defense, Speed.
    pub ivs: [u8; 6],
    pub evs: [u8; 6],
}

impl RosterEntry {
    /// Entry with the species' first ability, maximum IVs and no EVs.
    pub fn new(species: Species, level: u8, moves: Vec<Move>) -> Self {
        let (ability, gender) = match get_species_data(species) {
            Ok(data) => (
                data.abilities.first().copied().unwrap_or_default(),
                match data.female_ratio {
                    None => Gender::Genderless,
                    Some(100) => Gender::Female,
                    Some(_) => Gender::Male,
                },
            ),
            Err(_) => (Ability::None, Gender::Genderless),
        };
        Self {
            species,
            nickname: species.name().to_string(),
            level,
            gender,
            ability,
            item: Item::None,
            moves,
            ivs: [31; 6],
            evs: [0; 6],
        }
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = ability;
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = item;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = nickname.to_string();
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSlot {
    pub move_: Move,
    pub pp: u8,
    pub max_pp: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BattleStats {
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

impl BattleStats {
    pub fn calculate(base: &BaseStats, level: u8, ivs: &[u8; 6], evs: &[u8; 6]) -> Self {
        let stat = |base: u8, index: usize| -> u16 {
            let raw = 2 * u32::from(base) + u32::from(ivs[index]) + u32::from(evs[index]) / 4;
            (raw * u32::from(level) / 100 + 5) as u16
        };
        Self {
            attack: stat(base.attack, 1),
            defense: stat(base.defense, 2),
            sp_attack: stat(base.sp_attack, 3),
            sp_defense: stat(base.sp_defense, 4),
            speed: stat(base.speed, 5),
        }
    }

    pub fn calculate_hp(base: &BaseStats, level: u8, ivs: &[u8; 6], evs: &[u8; 6]) -> u16 {
        let raw = 2 * u32::from(base.hp) + u32::from(ivs[0]) + u32::from(evs[0]) / 4;
        (raw * u32::from(level) / 100 + u32::from(level) + 10) as u16
    }

    pub fn get(&self, stat: Stat) -> u16 {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpAttack => self.sp_attack,
            Stat::SpDefense => self.sp_defense,
            Stat::Speed => self.speed,
            Stat::Accuracy | Stat::Evasion => 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatStages {
    pub attack: i8,
    pub defense: i8,
    pub sp_attack: i8,
    pub sp_defense: i8,
    pub speed: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl StatStages {
    pub const ALL: [Stat; 7] = [
        Stat::Attack,
        Stat::Defense,
        Stat::SpAttack,
        Stat::SpDefense,
        Stat::Speed,
        Stat::Accuracy,
        Stat::Evasion,
    ];

    pub fn get(&self, stat: Stat) -> i8 {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpAttack => self.sp_attack,
            Stat::SpDefense => self.sp_defense,
            Stat::Speed => self.speed,
            Stat::Accuracy => self.accuracy,
            Stat::Evasion => self.evasion,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i8) {
        match stat {
            Stat::Attack => self.attack = value,
            Stat::Defense => self.defense = value,
            Stat::SpAttack => self.sp_attack = value,
            Stat::SpDefense => self.sp_defense = value,
            Stat::Speed => self.speed = value,
            Stat::Accuracy => self.accuracy = value,
            Stat::Evasion => self.evasion = value,
        }
    }

    pub fn is_neutral(&self) -> bool {
        Self::ALL.iter().all(|stat| self.get(*stat) == 0)
    }
}

/// A move the battler must use again next turn, with the targets it chose.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveLock {
    pub move_: Move,
    pub targets: TargetMask,
}

/// One creature in battle. Fields prefixed `known_` hold what the opposing
/// trainer has seen, which may differ from the actual values.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Battler {
    pub id: BattlerId,
    pub nickname: String,
    pub known_nickname: String,
    pub species: Species,
    pub known_species: Species,
    pub original_species: Species,
    pub level: u8,
    pub gender: Gender,
    pub known_gender: Gender,

    pub hp: u16,
    pub max_hp: u16,
    pub stats: BattleStats,
    pub original_stats: BattleStats,
    pub types: [PokemonType; 2],
    pub known_types: [PokemonType; 2],

    pub ability: Ability,
    pub known_ability: Option<Ability>,
    pub original_ability: Ability,
    pub item: Item,
    pub known_item: Option<Item>,

    pub moves: Vec<MoveSlot>,
    /// The real loadout while a transformation borrows another one.
    pub moves_backup: Option<Vec<MoveSlot>>,
    pub known_moves: Vec<Move>,

    pub status1: Status1,
    /// Turns slept so far, or the toxic damage counter.
    pub status1_counter: u8,
    pub sleep_turns: u8,
    pub status2: VolatileConditions,
    pub stat_stages: StatStages,
    pub position: FieldPosition,

    pub confusion_counter: u8,
    pub confusion_turns: u8,
    pub substitute_hp: u16,
    pub magnet_rise_turns: u8,
    pub protection_counter: u8,
    pub slow_start_turns: u8,
    pub speed_boost_ready: bool,
    pub infatuated_with: Option<BattlerId>,
    /// Team and position that receives the HP drained by Leech Seed.
    pub seeded_by: Option<(usize, FieldPosition)>,
    pub temp_locked_move: Option<MoveLock>,
    pub choice_locked_move: Option<Move>,
    pub has_used_move_this_turn: bool,
    pub selected_action: Option<Action>,
    /// Party slot whose identity Illusion is showing.
    pub disguised_as: Option<usize>,
}

impl Battler {
    pub fn from_roster(
        id: BattlerId,
        entry: &RosterEntry,
        settings: &BattleSettings,
    ) -> BattleResult<Battler> {
        if entry.moves.is_empty() {
            return Err(RosterError::NoMoves(entry.nickname.clone()).into());
        }
        if entry.moves.len() > usize::from(settings.max_moves) {
            return Err(RosterError::TooManyMoves {
                name: entry.nickname.clone(),
                count: entry.moves.len(),
                max: usize::from(settings.max_moves),
            }
            .into());
        }
        if entry.level == 0 || entry.level > settings.max_level {
            return Err(RosterError::InvalidLevel {
                name: entry.nickname.clone(),
                level: entry.level,
                max: settings.max_level,
            }
            .into());
        }

        let data = get_species_data(entry.species)?;
        let stats = BattleStats::calculate(&data.base_stats, entry.level, &entry.ivs, &entry.evs);
        let max_hp = BattleStats::calculate_hp(&data.base_stats, entry.level, &entry.ivs, &entry.evs);

        let mut moves = Vec::with_capacity(entry.moves.len());
        for move_ in &entry.moves {
            let pp = get_move_data(*move_)?.pp;
            moves.push(MoveSlot {
                move_: *move_,
                pp,
                max_pp: pp,
            });
        }

        Ok(Battler {
            id,
            nickname: entry.nickname.clone(),
            known_nickname: entry.nickname.clone(),
            species: entry.species,
            known_species: entry.species,
            original_species: entry.species,
            level: entry.level,
            gender: entry.gender,
            known_gender: entry.gender,
            hp: max_hp,
            max_hp,
            stats,
            original_stats: stats,
            types: data.types,
            known_types: data.types,
            ability: entry.ability,
            known_ability: None,
            original_ability: entry.ability,
            item: entry.item,
            known_item: None,
            moves,
            moves_backup: None,
            known_moves: Vec::new(),
            status1: Status1::None,
            status1_counter: 0,
            sleep_turns: 0,
            status2: VolatileConditions::empty(),
            stat_stages: StatStages::default(),
            position: FieldPosition::None,
            confusion_counter: 0,
            confusion_turns: 0,
            substitute_hp: 0,
            magnet_rise_turns: 0,
            protection_counter: 0,
            slow_start_turns: 0,
            speed_boost_ready: false,
            infatuated_with: None,
            seeded_by: None,
            temp_locked_move: None,
            choice_locked_move: None,
            has_used_move_this_turn: false,
            selected_action: None,
            disguised_as: None,
        })
    }

    pub fn reference(&self) -> BattlerRef {
        BattlerRef {
            team: self.id.team,
            slot: self.id.slot,
            position: self.position,
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn is_active(&self) -> bool {
        self.position != FieldPosition::None && !self.is_fainted()
    }

    pub fn has_type(&self, pokemon_type: PokemonType) -> bool {
        self.types.contains(&pokemon_type)
    }

    pub fn stage(&self, stat: Stat) -> i8 {
        self.stat_stages.get(stat)
    }

    pub fn hp_fraction(&self, denominator: u16) -> u16 {
        (self.max_hp / denominator.max(1)).max(1)
    }

    pub fn hp_percentage(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            f64::from(self.hp) / f64::from(self.max_hp)
        }
    }

    /// Grounded battlers are hit by Ground moves and entry hazards.
    pub fn is_grounded(&self) -> bool {
        !self.has_type(PokemonType::Flying)
            && self.ability != Ability::Levitate
            && !self.status2.contains(VolatileConditions::MAGNET_RISE)
    }

    pub fn move_slot(&self, move_: Move) -> Option<&MoveSlot> {
        self.moves.iter().find(|slot| slot.move_ == move_)
    }

    pub fn move_slot_mut(&mut self, move_: Move) -> Option<&mut MoveSlot> {
        self.moves.iter_mut().find(|slot| slot.move_ == move_)
    }

    /// Moves with PP left that the choice lock, if any, still allows.
    pub fn usable_moves(&self) -> Vec<Move> {
        self.moves
            .iter()
            .filter(|slot| slot.pp > 0)
            .filter(|slot| match self.choice_locked_move {
                Some(locked) if self.move_slot(locked).is_some() => slot.move_ == locked,
                _ => true,
            })
            .map(|slot| slot.move_)
            .collect()
    }

    /// Resets everything that does not survive leaving the field.
    pub fn clear_on_switch_out(&mut self) {
        if let Some(backup) = self.moves_backup.take() {
            self.moves = backup;
        }
        if let Ok(data) = get_species_data(self.original_species) {
            self.types = data.types;
            self.known_types = data.types;
        }
        self.species = self.original_species;
        self.known_species = self.original_species;
        self.stats = self.original_stats;
        self.ability = self.original_ability;
        self.known_nickname = self.nickname.clone();
        self.disguised_as = None;

        if self.status1 == Status1::BadlyPoisoned {
            self.status1_counter = 1;
        }
        self.status2 = VolatileConditions::empty();
        self.stat_stages = StatStages::default();
        self.position = FieldPosition::None;
        self.confusion_counter = 0;
        self.confusion_turns = 0;
        self.substitute_hp = 0;
        self.magnet_rise_turns = 0;
        self.protection_counter = 0;
        self.slow_start_turns = 0;
        self.speed_boost_ready = false;
        self.infatuated_with = None;
        self.seeded_by = None;
        self.temp_locked_move = None;
        self.choice_locked_move = None;
        self.has_used_move_this_turn = false;
        self.selected_action = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stats_follow_the_level_formula() {
        let entry = RosterEntry::new(Species::Pikachu, 50, vec![Move::Thunderbolt]);
        let battler = Battler::from_roster(BattlerId::new(0, 0), &entry, &BattleSettings::default())
            .expect("valid roster");
        // (2 * 35 + 31) * 50 / 100 + 50 + 10
        assert_eq!(battler.max_hp, 110);
        // (2 * 90 + 31) * 50 / 100 + 5
        assert_eq!(battler.stats.speed, 110);
        assert_eq!(battler.moves[0].pp, 15);
    }

    #[test]
    fn empty_moveset_is_rejected() {
        let entry = RosterEntry::new(Species::Pikachu, 50, vec![]);
        let result = Battler::from_roster(BattlerId::new(0, 0), &entry, &BattleSettings::default());
        assert!(matches!(
            result,
            Err(crate::errors::BattleEngineError::Roster(RosterError::NoMoves(_)))
        ));
    }

    #[test]
    fn switch_out_clears_volatile_state() {
        let entry = RosterEntry::new(Species::Gengar, 50, vec![Move::ShadowBall]);
        let mut battler = Battler::from_roster(BattlerId::new(1, 0), &entry, &BattleSettings::default())
            .expect("valid roster");
        battler.status1 = Status1::BadlyPoisoned;
        battler.status1_counter = 4;
        battler.status2 = VolatileConditions::CONFUSED | VolatileConditions::SUBSTITUTE;
        battler.stat_stages.attack = 2;
        battler.position = FieldPosition::Center;

        battler.clear_on_switch_out();

        assert_eq!(battler.status2, VolatileConditions::empty());
        assert!(battler.stat_stages.is_neutral());
        assert_eq!(battler.status1_counter, 1);
        assert_eq!(battler.position, FieldPosition::None);
    }
}
