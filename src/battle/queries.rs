//! Read-only questions collaborators ask between turns: what a battler may
//! do, where it may aim, and what the opponent is allowed to see.

use crate::battle::action::{Action, TargetMask};
use crate::battle::battler::{BattlerId, StatStages};
use crate::battle::conditions::VolatileConditions;
use crate::battle::state::Battle;
use crate::errors::{BattleResult, BattleStateError};
use crate::move_data::get_move_data;
use schema::{Ability, FieldPosition, Gender, Item, Move, MoveTarget, PokemonType, Species, Status1};
use serde::{Deserialize, Serialize};

/// A battler as the opposing trainer sees it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KnownBattler {
    pub id: BattlerId,
    pub position: FieldPosition,
    pub nickname: String,
    pub species: Species,
    pub level: u8,
    pub gender: Gender,
    pub hp_percentage: f64,
    pub types: [PokemonType; 2],
    pub ability: Option<Ability>,
    pub item: Option<Item>,
    pub moves: Vec<Move>,
    pub status1: Status1,
    pub status2: VolatileConditions,
    pub stat_stages: StatStages,
}

impl Battle {
    fn existing(&self, id: BattlerId) -> BattleResult<&crate::battle::battler::Battler> {
        self.get_battler(id)
            .ok_or_else(|| BattleStateError::Inconsistent(format!("no battler at {:?}", id)).into())
    }

    /// Occupied positions as masks relative to `id`, foes first.
    fn occupied_masks(&self, id: BattlerId, adjacent_only: bool) -> (Vec<TargetMask>, Vec<TargetMask>) {
        let own_position = self.battler(id).position;
        let mut foes = Vec::new();
        let mut allies = Vec::new();
        for &position in self.format.positions() {
            for (team, is_foe) in [(id.opposing_team(), true), (id.team, false)] {
                let Some(other) = self.battler_at(team, position) else {
                    continue;
                };
                if other == id {
                    continue;
                }
                if adjacent_only && !self.positions_adjacent(id.team, own_position, team, position) {
                    continue;
                }
                if is_foe {
                    foes.push(TargetMask::foe(position));
                } else {
                    allies.push(TargetMask::ally(position));
                }
            }
        }
        (foes, allies)
    }

    /// Every way `id` may aim `move_`. Spread and side moves have exactly one
    /// combined mask.
    pub fn legal_targets(&self, id: BattlerId, move_: Move) -> BattleResult<Vec<TargetMask>> {
        let battler = self.existing(id)?;
        let data = get_move_data(move_)?;
        let own = TargetMask::ally(battler.position);
        let combine = |masks: Vec<TargetMask>| {
            masks
                .into_iter()
                .fold(TargetMask::empty(), |combined, mask| combined | mask)
        };

        let target = match data.target {
            MoveTarget::Varies if battler.has_type(PokemonType::Ghost) => MoveTarget::SingleSurrounding,
            MoveTarget::Varies => MoveTarget::User,
            other => other,
        };
        let masks = match target {
            MoveTarget::User => vec![own],
            MoveTarget::SingleNotSelf => {
                let (foes, allies) = self.occupied_masks(id, false);
                foes.into_iter().chain(allies).collect()
            }
            MoveTarget::SingleSurrounding => {
                let (foes, allies) = self.occupied_masks(id, true);
                foes.into_iter().chain(allies).collect()
            }
            MoveTarget::SingleFoeSurrounding => self.occupied_masks(id, true).0,
            MoveTarget::SingleAllySurrounding => {
                let allies = self.occupied_masks(id, true).1;
                if allies.is_empty() {
                    vec![own]
                } else {
                    allies
                }
            }
            MoveTarget::SelfOrAllySurrounding => {
                let mut masks = vec![own];
                masks.extend(self.occupied_masks(id, true).1);
                masks
            }
            MoveTarget::AllSurrounding => {
                let (foes, allies) = self.occupied_masks(id, true);
                vec![combine(foes.into_iter().chain(allies).collect())]
            }
            MoveTarget::AllFoesSurrounding | MoveTarget::RandomFoeSurrounding => {
                vec![combine(self.occupied_masks(id, true).0)]
            }
            MoveTarget::AllFoes => vec![combine(self.occupied_masks(id, false).0)],
            MoveTarget::AllTeam => vec![combine(self.occupied_masks(id, false).1) | own],
            MoveTarget::All => {
                let (foes, allies) = self.occupied_masks(id, false);
                vec![combine(foes.into_iter().chain(allies).collect()) | own]
            }
            MoveTarget::Varies => vec![own],
        };
        Ok(masks)
    }

    /// Every action `id` may submit this turn. Empty when it is not on the
    /// field.
    pub fn legal_actions(&self, id: BattlerId) -> BattleResult<Vec<Action>> {
        let battler = self.existing(id)?;
        if !battler.is_active() {
            return Ok(Vec::new());
        }
        if battler.temp_locked_move.is_some() {
            return Ok(vec![Action::Forced]);
        }
        let usable = battler.usable_moves();
        if usable.is_empty() {
            return Ok(vec![Action::Forced]);
        }

        let mut actions = Vec::new();
        for move_ in usable {
            for targets in self.legal_targets(id, move_)? {
                actions.push(Action::Fight { move_, targets });
            }
        }
        actions.extend(
            self.legal_switches(id.team)
                .into_iter()
                .map(|party_slot| Action::Switch { party_slot }),
        );
        Ok(actions)
    }

    /// Party slots that may be sent in.
    pub fn legal_switches(&self, team: usize) -> Vec<usize> {
        self.teams.get(team).map(|team| team.reserves()).unwrap_or_default()
    }

    pub fn switch_ins_required(&self, team: usize) -> usize {
        self.teams.get(team).map_or(0, |team| team.switch_ins_required)
    }

    /// Fog-of-war projection: only what the opponent has been shown.
    pub fn known_view(&self, id: BattlerId) -> BattleResult<KnownBattler> {
        let battler = self.existing(id)?;
        Ok(KnownBattler {
            id,
            position: battler.position,
            nickname: battler.known_nickname.clone(),
            species: battler.known_species,
            level: battler.level,
            gender: battler.known_gender,
            hp_percentage: battler.hp_percentage(),
            types: battler.known_types,
            ability: battler.known_ability,
            item: battler.known_item,
            moves: battler.known_moves.clone(),
            status1: battler.status1,
            status2: battler.status2 - VolatileConditions::DISGUISED,
            stat_stages: battler.stat_stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestBattlerBuilder};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::BattleFormat;

    fn doubles() -> Battle {
        create_test_battle(
            BattleFormat::Double,
            vec![
                TestBattlerBuilder::new(Species::Pikachu, 50)
                    .with_moves(vec![Move::Thunderbolt, Move::HelpingHand, Move::Earthquake]),
                TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::BodySlam]),
                TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle]),
            ],
            vec![
                TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::ShadowBall]),
                TestBattlerBuilder::new(Species::Machamp, 50).with_moves(vec![Move::CloseCombat]),
            ],
        )
    }

    #[rstest]
    #[case(Move::Thunderbolt, 3)]
    #[case(Move::HelpingHand, 1)]
    #[case(Move::Earthquake, 1)]
    fn target_counts_in_doubles(#[case] move_: Move, #[case] expected: usize) {
        let battle = doubles();
        let masks = battle.legal_targets(BattlerId::new(0, 0), move_).expect("targets");
        assert_eq!(masks.len(), expected);
    }

    #[test]
    fn earthquake_hits_everyone_around() {
        let battle = doubles();
        let masks = battle
            .legal_targets(BattlerId::new(0, 0), Move::Earthquake)
            .expect("targets");
        assert_eq!(
            masks,
            vec![TargetMask::FOE_LEFT | TargetMask::FOE_RIGHT | TargetMask::ALLY_RIGHT]
        );
    }

    #[test]
    fn legal_actions_include_switches() {
        let battle = doubles();
        let actions = battle.legal_actions(BattlerId::new(0, 0)).expect("actions");
        assert!(actions.contains(&Action::Switch { party_slot: 2 }));
        assert!(!actions.contains(&Action::Switch { party_slot: 1 }));
    }

    #[test]
    fn locked_battler_only_has_forced_action() {
        let mut battle = doubles();
        let id = BattlerId::new(0, 0);
        battle.battler_mut(id).temp_locked_move = Some(crate::battle::battler::MoveLock {
            move_: Move::Thunderbolt,
            targets: TargetMask::FOE_LEFT,
        });
        assert_eq!(battle.legal_actions(id).expect("actions"), vec![Action::Forced]);
    }

    #[test]
    fn out_of_pp_means_struggle() {
        let mut battle = doubles();
        let id = BattlerId::new(0, 1);
        for slot in &mut battle.battler_mut(id).moves {
            slot.pp = 0;
        }
        assert_eq!(battle.legal_actions(id).expect("actions"), vec![Action::Forced]);
    }

    #[test]
    fn known_view_hides_the_disguise() {
        let mut battle = doubles();
        let id = BattlerId::new(1, 0);
        battle.battler_mut(id).status2.insert(VolatileConditions::DISGUISED);
        let view = battle.known_view(id).expect("view");
        assert!(view.status2.is_empty());
        assert_eq!(view.ability, None);
        assert!(view.moves.is_empty());
    }
}
