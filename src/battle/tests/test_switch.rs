#[cfg(test)]
mod tests {
    use crate::battle::action::{Action, SwitchIn, TargetMask};
    use crate::battle::battler::BattlerId;
    use crate::battle::conditions::TeamConditions;
    use crate::battle::events::BattleEvent;
    use crate::battle::state::{Battle, BattlePhase};
    use crate::battle::tests::common::{
        create_test_battle, predictable_rng, run_moves, submit_moves, TestBattlerBuilder,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{BattleFormat, FieldPosition, Move, Species, Status1};

    fn assert_one_battler_per_position(battle: &Battle) {
        for team in 0..2 {
            for &position in battle.format.positions() {
                let standing = battle.teams[team]
                    .party
                    .iter()
                    .filter(|battler| battler.position == position)
                    .count();
                assert!(standing <= 1, "team {} has {} battlers at {:?}", team, standing, position);
            }
        }
    }

    /// Player 2 leads with Snorlax and switches to `incoming` while Player 1
    /// uses Splash.
    fn switch_into(incoming: Species, prepare: impl FnOnce(&mut Battle)) -> Battle {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash])],
            vec![
                TestBattlerBuilder::new(Species::Snorlax, 50),
                TestBattlerBuilder::new(incoming, 50),
            ],
        );
        prepare(&mut battle);
        let mut rng = predictable_rng();
        submit_moves(&mut battle, 0, &[Move::Splash]);
        battle
            .submit_actions(1, vec![(BattlerId::new(1, 0), Action::Switch { party_slot: 1 })])
            .expect("legal switch");
        battle.run_turn(&mut rng).expect("turn resolves");
        battle
    }

    fn lay(battle: &mut Battle, condition: TeamConditions, layers: u8) {
        let side = &mut battle.teams[1];
        side.conditions.insert(condition);
        if condition == TeamConditions::SPIKES {
            side.spikes_layers = layers;
        } else if condition == TeamConditions::TOXIC_SPIKES {
            side.toxic_spikes_layers = layers;
        }
    }

    #[test]
    fn switch_takes_the_same_position() {
        let battle = switch_into(Species::Chansey, |_| {});

        let outgoing = battle.battler(BattlerId::new(1, 0));
        let incoming = battle.battler(BattlerId::new(1, 1));
        assert_eq!(outgoing.position, FieldPosition::None);
        assert_eq!(incoming.position, FieldPosition::Center);
        assert_one_battler_per_position(&battle);

        let arrived = battle.events.events().iter().any(|event| {
            matches!(event, BattleEvent::SwitchIn { battler, forced: false, .. } if battler.id() == BattlerId::new(1, 1))
        });
        assert!(arrived);
    }

    #[rstest]
    #[case(1, 8)]
    #[case(2, 6)]
    #[case(3, 4)]
    fn spikes_hurt_grounded_arrivals(#[case] layers: u8, #[case] divisor: u16) {
        let battle = switch_into(Species::Blastoise, |battle| lay(battle, TeamConditions::SPIKES, layers));

        let blastoise = battle.battler(BattlerId::new(1, 1));
        assert_eq!(blastoise.hp, blastoise.max_hp - blastoise.max_hp / divisor);
    }

    #[test]
    fn levitating_arrival_ignores_spikes() {
        let battle = switch_into(Species::Gengar, |battle| lay(battle, TeamConditions::SPIKES, 3));

        let gengar = battle.battler(BattlerId::new(1, 1));
        assert_eq!(gengar.hp, gengar.max_hp);
    }

    #[test]
    fn stealth_rock_scales_with_rock_weakness() {
        let battle = switch_into(Species::Charizard, |battle| {
            battle.teams[1].conditions.insert(TeamConditions::STEALTH_ROCK);
        });

        // Fire/Flying takes four times the base eighth.
        let charizard = battle.battler(BattlerId::new(1, 1));
        assert_eq!(charizard.hp, charizard.max_hp - charizard.max_hp / 2);
    }

    #[rstest]
    #[case(1, Status1::Poisoned)]
    #[case(2, Status1::BadlyPoisoned)]
    fn toxic_spikes_poison_grounded_arrivals(#[case] layers: u8, #[case] expected: Status1) {
        let battle = switch_into(Species::Blastoise, |battle| {
            lay(battle, TeamConditions::TOXIC_SPIKES, layers)
        });

        assert_eq!(battle.battler(BattlerId::new(1, 1)).status1, expected);
        assert!(battle.teams[1].conditions.contains(TeamConditions::TOXIC_SPIKES));
    }

    #[test]
    fn poison_type_arrival_absorbs_toxic_spikes() {
        let battle = switch_into(Species::Tentacruel, |battle| {
            lay(battle, TeamConditions::TOXIC_SPIKES, 2)
        });

        assert_eq!(battle.battler(BattlerId::new(1, 1)).status1, Status1::None);
        assert!(!battle.teams[1].conditions.contains(TeamConditions::TOXIC_SPIKES));
        assert_eq!(battle.teams[1].toxic_spikes_layers, 0);
    }

    #[test]
    fn doubles_replacements_fill_each_empty_position_once() {
        let mut battle = create_test_battle(
            BattleFormat::Double,
            vec![
                TestBattlerBuilder::new(Species::Machamp, 100).with_moves(vec![Move::CloseCombat]),
                TestBattlerBuilder::new(Species::Machamp, 100).with_moves(vec![Move::CloseCombat]),
            ],
            vec![
                TestBattlerBuilder::new(Species::Pikachu, 5).with_moves(vec![Move::Splash]),
                TestBattlerBuilder::new(Species::Pikachu, 5).with_moves(vec![Move::Splash]),
                TestBattlerBuilder::new(Species::Snorlax, 50),
                TestBattlerBuilder::new(Species::Chansey, 50),
            ],
        );
        let mut rng = predictable_rng();

        // Both attackers aim at the foe across from them.
        let targets = [FieldPosition::Left, FieldPosition::Right].map(TargetMask::foe);
        battle
            .submit_actions(
                0,
                vec![
                    (
                        BattlerId::new(0, 0),
                        Action::Fight {
                            move_: Move::CloseCombat,
                            targets: targets[0],
                        },
                    ),
                    (
                        BattlerId::new(0, 1),
                        Action::Fight {
                            move_: Move::CloseCombat,
                            targets: targets[1],
                        },
                    ),
                ],
            )
            .expect("legal");
        submit_moves(&mut battle, 1, &[Move::Splash, Move::Splash]);
        battle.run_turn(&mut rng).expect("turn resolves");

        assert_eq!(battle.phase(), BattlePhase::WaitingForSwitchIns);
        assert_eq!(battle.switch_ins_required(1), 2);
        assert_eq!(battle.switch_ins_required(0), 0);

        battle
            .submit_switches(
                1,
                vec![
                    SwitchIn {
                        party_slot: 2,
                        position: FieldPosition::Left,
                    },
                    SwitchIn {
                        party_slot: 3,
                        position: FieldPosition::Right,
                    },
                ],
            )
            .expect("legal replacements");
        battle.run_switches().expect("switches resolve");

        assert_eq!(battle.phase(), BattlePhase::WaitingForActions);
        assert_eq!(battle.battler_at(1, FieldPosition::Left), Some(BattlerId::new(1, 2)));
        assert_eq!(battle.battler_at(1, FieldPosition::Right), Some(BattlerId::new(1, 3)));
        assert_one_battler_per_position(&battle);

        run_moves(&mut battle, &[Move::CloseCombat, Move::CloseCombat], &[Move::Tackle, Move::Tackle], &mut rng);
        assert_one_battler_per_position(&battle);
    }
}
