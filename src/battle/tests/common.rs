use crate::battle::action::Action;
use crate::battle::battler::{Battler, BattlerId, RosterEntry};
use crate::battle::rng::BattleRng;
use crate::battle::state::{Battle, BattlePhase};
use crate::battle::team::TeamRoster;
use crate::settings::BattleSettings;
use schema::{Ability, BattleFormat, Gender, Item, Move, Species, Status1};

/// A builder for test battlers with common defaults.
///
/// # Example
/// ```ignore
/// let pikachu = TestBattlerBuilder::new(Species::Pikachu, 25)
///     .with_moves(vec![Move::Tackle])
///     .with_status(Status1::Paralyzed);
/// ```
pub struct TestBattlerBuilder {
    entry: RosterEntry,
    hp: Option<u16>,
    status: Option<Status1>,
    stats: Option<(u16, u16)>,
}

impl TestBattlerBuilder {
    /// Full HP, the species' first ability and Tackle as its only move.
    pub fn new(species: Species, level: u8) -> Self {
        Self {
            entry: RosterEntry::new(species, level, vec![Move::Tackle]),
            hp: None,
            status: None,
            stats: None,
        }
    }

    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        self.entry.moves = moves;
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.entry = self.entry.with_ability(ability);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.entry = self.entry.with_item(item);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.entry = self.entry.with_gender(gender);
        self
    }

    /// Current HP, clamped to the maximum.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_status(mut self, status: Status1) -> Self {
        self.status = Some(status);
        self
    }

    /// Overrides the Attack and Defense stats.
    pub fn with_stats(mut self, attack: u16, defense: u16) -> Self {
        self.stats = Some((attack, defense));
        self
    }

    fn apply(&self, battler: &mut Battler) {
        if let Some(hp) = self.hp {
            battler.hp = hp.min(battler.max_hp);
        }
        if let Some(status) = self.status {
            battler.status1 = status;
            battler.status1_counter = u8::from(status == Status1::BadlyPoisoned);
            if status == Status1::Asleep {
                battler.sleep_turns = 3;
            }
        }
        if let Some((attack, defense)) = self.stats {
            for stats in [&mut battler.stats, &mut battler.original_stats] {
                stats.attack = attack;
                stats.defense = defense;
            }
        }
    }
}

/// Builds a battle with both parties already on the field, skipping the
/// reveal and entry effects of `begin`. The first battlers of each party take
/// the format's positions in order.
pub fn create_test_battle(
    format: BattleFormat,
    first: Vec<TestBattlerBuilder>,
    second: Vec<TestBattlerBuilder>,
) -> Battle {
    let rosters = [
        TeamRoster::new("Player 1", first.iter().map(|builder| builder.entry.clone()).collect()),
        TeamRoster::new("Player 2", second.iter().map(|builder| builder.entry.clone()).collect()),
    ];
    let mut battle = match Battle::new(format, &rosters[0], &rosters[1], BattleSettings::default()) {
        Ok(battle) => battle,
        Err(err) => panic!("invalid test battle: {}", err),
    };

    for (team, builders) in [first, second].iter().enumerate() {
        for (slot, builder) in builders.iter().enumerate() {
            builder.apply(&mut battle.teams[team].party[slot]);
        }
        let positions = format.positions();
        let standing: Vec<usize> = battle.teams[team]
            .party
            .iter()
            .filter(|battler| !battler.is_fainted())
            .map(|battler| battler.id.slot)
            .take(positions.len())
            .collect();
        for (&position, slot) in positions.iter().zip(standing) {
            battle.teams[team].party[slot].position = position;
        }
    }
    battle.phase = BattlePhase::WaitingForActions;
    battle
}

/// A scripted RNG with a long list of middling values (50).
/// Useful for tests where the specific outcome is not important.
pub fn predictable_rng() -> BattleRng {
    BattleRng::new_for_test(vec![50; 100])
}

/// A move aimed at the first target `legal_targets` offers.
pub fn fight(battle: &Battle, id: BattlerId, move_: Move) -> Action {
    let targets = match battle.legal_targets(id, move_) {
        Ok(masks) => masks.into_iter().next().unwrap_or_default(),
        Err(err) => panic!("no targets for {:?}: {}", move_, err),
    };
    Action::Fight { move_, targets }
}

/// Submits one move per active battler of `team`, in field order.
pub fn submit_moves(battle: &mut Battle, team: usize, moves: &[Move]) {
    let actions: Vec<(BattlerId, Action)> = battle.teams[team]
        .active_battlers()
        .into_iter()
        .zip(moves)
        .map(|(id, &move_)| (id, fight(battle, id, move_)))
        .collect();
    if let Err(err) = battle.submit_actions(team, actions) {
        panic!("rejected actions for team {}: {}", team, err);
    }
}

/// Submits both teams' moves and resolves the turn.
pub fn run_moves(battle: &mut Battle, first: &[Move], second: &[Move], rng: &mut BattleRng) {
    submit_moves(battle, 0, first);
    submit_moves(battle, 1, second);
    if let Err(err) = battle.run_turn(rng) {
        panic!("turn failed: {}", err);
    }
}
