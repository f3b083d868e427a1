//! Collecting decisions from both trainers. Submissions are validated in full
//! before anything is stored, so a rejected call leaves the battle untouched.

use crate::battle::action::{Action, SwitchIn};
use crate::battle::battler::BattlerId;
use crate::battle::state::{Battle, BattlePhase};
use crate::errors::{ActionError, BattleResult};
use schema::FieldPosition;
use tracing::{debug, warn};

impl Battle {
    /// Stores one action per active battler of `team`.
    pub fn submit_actions(&mut self, team: usize, actions: Vec<(BattlerId, Action)>) -> BattleResult<()> {
        self.ensure_phase(BattlePhase::WaitingForActions)?;
        if let Err(err) = self.validate_actions(team, &actions) {
            warn!(team, %err, "rejected actions");
            return Err(err);
        }
        for (id, action) in actions {
            self.battler_mut(id).selected_action = Some(action);
        }
        self.teams[team].actions_submitted = true;
        debug!(team, "actions submitted");
        Ok(())
    }

    /// Stores the replacements `team` sends into its empty positions.
    pub fn submit_switches(&mut self, team: usize, switches: Vec<SwitchIn>) -> BattleResult<()> {
        self.ensure_phase(BattlePhase::WaitingForSwitchIns)?;
        if let Err(err) = self.validate_switches(team, &switches) {
            warn!(team, %err, "rejected switches");
            return Err(err.into());
        }
        self.teams[team].switches_submitted = switches
            .into_iter()
            .map(|switch| (switch.party_slot, switch.position))
            .collect();
        debug!(team, "switches submitted");
        Ok(())
    }

    /// Both teams have acted and `run_turn` may proceed.
    pub fn ready_for_turn_resolution(&self) -> bool {
        self.phase == BattlePhase::WaitingForActions && self.teams.iter().all(|team| team.actions_submitted)
    }

    /// Every required replacement has been chosen.
    pub fn ready_for_switch_resolution(&self) -> bool {
        self.phase == BattlePhase::WaitingForSwitchIns
            && self
                .teams
                .iter()
                .all(|team| team.switches_submitted.len() == team.switch_ins_required)
    }

    fn label(&self, id: BattlerId) -> String {
        self.get_battler(id)
            .map(|battler| battler.nickname.clone())
            .unwrap_or_else(|| format!("{:?}", id))
    }

    fn validate_actions(&self, team: usize, actions: &[(BattlerId, Action)]) -> BattleResult<()> {
        let side = self.teams.get(team).ok_or(ActionError::InvalidTeam(team))?;
        if side.actions_submitted {
            return Err(ActionError::AlreadySubmitted(team).into());
        }
        let acting = side.active_battlers();
        let mut seen: Vec<BattlerId> = Vec::with_capacity(actions.len());
        let mut incoming: Vec<usize> = Vec::new();

        for &(id, action) in actions {
            if id.team != team || !acting.contains(&id) {
                return Err(ActionError::BattlerNotActing(self.label(id)).into());
            }
            if seen.contains(&id) {
                return Err(ActionError::DuplicateAction(self.label(id)).into());
            }
            seen.push(id);

            let legal = self.legal_actions(id)?;
            match action {
                Action::Fight { move_, .. } => {
                    let usable = legal
                        .iter()
                        .any(|option| matches!(option, Action::Fight { move_: legal_move, .. } if *legal_move == move_));
                    if !usable {
                        return Err(ActionError::UnusableMove {
                            battler: self.label(id),
                            move_,
                        }
                        .into());
                    }
                    if !legal.contains(&action) {
                        return Err(ActionError::InvalidTargets { move_ }.into());
                    }
                }
                Action::Switch { party_slot } => {
                    if !legal.contains(&action) || incoming.contains(&party_slot) {
                        return Err(ActionError::InvalidSwitch(party_slot).into());
                    }
                    incoming.push(party_slot);
                }
                Action::Forced => {
                    if !legal.contains(&action) {
                        return Err(ActionError::NoForcedAction(self.label(id)).into());
                    }
                }
            }
        }

        if let Some(missing) = acting.into_iter().find(|id| !seen.contains(id)) {
            return Err(ActionError::MissingAction(self.label(missing)).into());
        }
        Ok(())
    }

    fn validate_switches(&self, team: usize, switches: &[SwitchIn]) -> Result<(), ActionError> {
        let side = self.teams.get(team).ok_or(ActionError::InvalidTeam(team))?;
        if !side.switches_submitted.is_empty() {
            return Err(ActionError::AlreadySubmitted(team));
        }
        if switches.len() != side.switch_ins_required {
            return Err(ActionError::WrongSwitchCount {
                expected: side.switch_ins_required,
                received: switches.len(),
            });
        }

        let reserves = side.reserves();
        let mut slots: Vec<usize> = Vec::with_capacity(switches.len());
        let mut positions: Vec<FieldPosition> = Vec::with_capacity(switches.len());
        for switch in switches {
            if !reserves.contains(&switch.party_slot) || slots.contains(&switch.party_slot) {
                return Err(ActionError::InvalidSwitch(switch.party_slot));
            }
            let open = self.format.positions().contains(&switch.position)
                && self.battler_at(team, switch.position).is_none()
                && !positions.contains(&switch.position);
            if !open {
                return Err(ActionError::PositionOccupied(format!("{:?}", switch.position)));
            }
            slots.push(switch.party_slot);
            positions.push(switch.position);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::action::{Action, SwitchIn, TargetMask};
    use crate::battle::battler::{BattlerId, MoveLock};
    use crate::battle::state::{Battle, BattlePhase};
    use crate::battle::tests::common::{create_test_battle, TestBattlerBuilder};
    use crate::errors::{ActionError, BattleEngineError, BattleStateError};
    use pretty_assertions::assert_eq;
    use schema::{BattleFormat, FieldPosition, Move, Species};

    fn doubles() -> Battle {
        create_test_battle(
            BattleFormat::Double,
            vec![
                TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Thunderbolt, Move::Splash]),
                TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::BodySlam]),
                TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle]),
            ],
            vec![
                TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::ShadowBall]),
                TestBattlerBuilder::new(Species::Machamp, 50).with_moves(vec![Move::CloseCombat]),
            ],
        )
    }

    fn thunderbolt_left() -> Action {
        Action::Fight {
            move_: Move::Thunderbolt,
            targets: TargetMask::FOE_LEFT,
        }
    }

    fn action_error(result: Result<(), BattleEngineError>) -> ActionError {
        match result {
            Err(BattleEngineError::Action(err)) => err,
            other => panic!("expected an action error, got {:?}", other),
        }
    }

    #[test]
    fn valid_submission_is_stored() {
        let mut battle = doubles();
        battle
            .submit_actions(
                0,
                vec![
                    (BattlerId::new(0, 0), thunderbolt_left()),
                    (BattlerId::new(0, 1), Action::Switch { party_slot: 2 }),
                ],
            )
            .expect("legal actions");
        assert!(battle.teams[0].actions_submitted);
        assert_eq!(battle.battler(BattlerId::new(0, 0)).selected_action, Some(thunderbolt_left()));
        assert!(!battle.ready_for_turn_resolution());
    }

    #[test]
    fn missing_battler_is_rejected_without_changes() {
        let mut battle = doubles();
        let err = action_error(battle.submit_actions(0, vec![(BattlerId::new(0, 0), thunderbolt_left())]));
        assert_eq!(err, ActionError::MissingAction("Snorlax".to_string()));
        assert!(!battle.teams[0].actions_submitted);
        assert_eq!(battle.battler(BattlerId::new(0, 0)).selected_action, None);
    }

    #[test]
    fn duplicate_and_foreign_battlers_are_rejected() {
        let mut battle = doubles();
        let err = action_error(battle.submit_actions(
            0,
            vec![
                (BattlerId::new(0, 0), thunderbolt_left()),
                (BattlerId::new(0, 0), thunderbolt_left()),
            ],
        ));
        assert!(matches!(err, ActionError::DuplicateAction(_)));

        let err = action_error(battle.submit_actions(0, vec![(BattlerId::new(1, 0), thunderbolt_left())]));
        assert!(matches!(err, ActionError::BattlerNotActing(_)));

        let err = action_error(battle.submit_actions(0, vec![(BattlerId::new(0, 2), thunderbolt_left())]));
        assert!(matches!(err, ActionError::BattlerNotActing(_)));
    }

    #[test]
    fn unknown_move_and_bad_mask_are_rejected() {
        let mut battle = doubles();
        let err = action_error(battle.submit_actions(
            0,
            vec![
                (
                    BattlerId::new(0, 0),
                    Action::Fight {
                        move_: Move::Surf,
                        targets: TargetMask::FOE_LEFT,
                    },
                ),
                (BattlerId::new(0, 1), Action::Switch { party_slot: 2 }),
            ],
        ));
        assert!(matches!(err, ActionError::UnusableMove { move_: Move::Surf, .. }));

        let err = action_error(battle.submit_actions(
            0,
            vec![
                (
                    BattlerId::new(0, 0),
                    Action::Fight {
                        move_: Move::Thunderbolt,
                        targets: TargetMask::FOE_LEFT | TargetMask::FOE_RIGHT,
                    },
                ),
                (BattlerId::new(0, 1), Action::Switch { party_slot: 2 }),
            ],
        ));
        assert_eq!(err, ActionError::InvalidTargets { move_: Move::Thunderbolt });
    }

    #[test]
    fn two_battlers_cannot_switch_to_the_same_slot() {
        let mut battle = doubles();
        let err = action_error(battle.submit_actions(
            0,
            vec![
                (BattlerId::new(0, 0), Action::Switch { party_slot: 2 }),
                (BattlerId::new(0, 1), Action::Switch { party_slot: 2 }),
            ],
        ));
        assert_eq!(err, ActionError::InvalidSwitch(2));
    }

    #[test]
    fn locked_battler_must_submit_forced() {
        let mut battle = doubles();
        let id = BattlerId::new(0, 0);
        battle.battler_mut(id).temp_locked_move = Some(MoveLock {
            move_: Move::Thunderbolt,
            targets: TargetMask::FOE_LEFT,
        });
        let err = action_error(battle.submit_actions(
            0,
            vec![(id, thunderbolt_left()), (BattlerId::new(0, 1), Action::Switch { party_slot: 2 })],
        ));
        assert!(matches!(err, ActionError::UnusableMove { .. }));

        battle
            .submit_actions(
                0,
                vec![(id, Action::Forced), (BattlerId::new(0, 1), Action::Switch { party_slot: 2 })],
            )
            .expect("forced action is legal");

        let err = action_error(battle.submit_actions(0, vec![(id, Action::Forced)]));
        assert_eq!(err, ActionError::AlreadySubmitted(0));
    }

    #[test]
    fn switches_outside_their_phase_are_rejected() {
        let mut battle = doubles();
        let result = battle.submit_switches(
            0,
            vec![SwitchIn {
                party_slot: 2,
                position: FieldPosition::Left,
            }],
        );
        assert_eq!(
            result,
            Err(BattleEngineError::State(BattleStateError::WrongPhase {
                expected: BattlePhase::WaitingForSwitchIns,
                actual: BattlePhase::WaitingForActions,
            }))
        );
    }

    #[test]
    fn replacement_must_fill_an_empty_position() {
        let mut battle = doubles();
        let fainted = BattlerId::new(0, 0);
        battle.battler_mut(fainted).hp = 0;
        battle.battler_mut(fainted).position = FieldPosition::None;
        battle.phase = BattlePhase::WaitingForSwitchIns;
        battle.teams[0].switch_ins_required = 1;

        let err = battle
            .submit_switches(
                0,
                vec![SwitchIn {
                    party_slot: 2,
                    position: FieldPosition::Right,
                }],
            )
            .expect_err("right is occupied");
        assert_eq!(
            err,
            BattleEngineError::Action(ActionError::PositionOccupied("Right".to_string()))
        );

        let err = battle.submit_switches(0, Vec::new()).expect_err("one switch is required");
        assert_eq!(
            err,
            BattleEngineError::Action(ActionError::WrongSwitchCount {
                expected: 1,
                received: 0,
            })
        );

        battle
            .submit_switches(
                0,
                vec![SwitchIn {
                    party_slot: 2,
                    position: FieldPosition::Left,
                }],
            )
            .expect("left is empty");
        assert!(battle.ready_for_switch_resolution());
    }
}
