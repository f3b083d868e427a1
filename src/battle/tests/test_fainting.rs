#[cfg(test)]
mod tests {
    use crate::battle::battler::BattlerId;
    use crate::battle::events::{BattleEvent, ItemAction, SpecialMessage};
    use crate::battle::state::{Battle, BattlePhase};
    use crate::battle::tests::common::{create_test_battle, predictable_rng, run_moves, TestBattlerBuilder};
    use pretty_assertions::assert_eq;
    use schema::{Ability, BattleFormat, Item, Move, Species};

    const DEFENDER: BattlerId = BattlerId { team: 1, slot: 0 };

    fn knockout_attempt(defender: TestBattlerBuilder) -> Battle {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Machamp, 100).with_moves(vec![Move::CloseCombat])],
            vec![defender, TestBattlerBuilder::new(Species::Chansey, 50)],
        );
        let mut rng = predictable_rng();
        run_moves(&mut battle, &[Move::CloseCombat], &[Move::Splash], &mut rng);
        battle
    }

    fn endured(battle: &Battle) -> bool {
        battle.events.events().iter().any(|event| {
            matches!(
                event,
                BattleEvent::Special {
                    message: SpecialMessage::Endure,
                    ..
                }
            )
        })
    }

    #[test]
    fn focus_sash_leaves_one_hp_and_is_consumed() {
        let battle = knockout_attempt(
            TestBattlerBuilder::new(Species::Pikachu, 5)
                .with_moves(vec![Move::Splash])
                .with_item(Item::FocusSash),
        );

        let pikachu = battle.battler(DEFENDER);
        assert_eq!(pikachu.hp, 1);
        assert_eq!(pikachu.item, Item::None);
        assert!(endured(&battle));
        assert!(battle.events.events().iter().any(|event| matches!(
            event,
            BattleEvent::ItemTriggered {
                item: Item::FocusSash,
                action: ItemAction::Consumed,
                ..
            }
        )));
        assert_eq!(battle.phase(), BattlePhase::WaitingForActions);
    }

    #[test]
    fn focus_sash_needs_full_hp() {
        let battle = knockout_attempt(
            TestBattlerBuilder::new(Species::Pikachu, 5)
                .with_moves(vec![Move::Splash])
                .with_item(Item::FocusSash)
                .with_hp(10),
        );

        let pikachu = battle.battler(DEFENDER);
        assert!(pikachu.is_fainted());
        assert_eq!(pikachu.item, Item::FocusSash);
        assert!(!endured(&battle));
    }

    #[test]
    fn sturdy_endures_without_an_item() {
        let battle = knockout_attempt(
            TestBattlerBuilder::new(Species::Golem, 5)
                .with_moves(vec![Move::Splash])
                .with_ability(Ability::Sturdy),
        );

        assert_eq!(battle.battler(DEFENDER).hp, 1);
        assert!(endured(&battle));
    }

    #[test]
    fn fainted_battler_loses_its_queued_move() {
        let battle = knockout_attempt(TestBattlerBuilder::new(Species::Snorlax, 5).with_moves(vec![Move::Splash]));

        let users: Vec<BattlerId> = battle
            .events
            .events()
            .iter()
            .filter_map(|event| match event {
                BattleEvent::MoveUsed { user, .. } => Some(user.id()),
                _ => None,
            })
            .collect();
        assert_eq!(users, vec![BattlerId::new(0, 0)]);
        assert!(battle.battler(DEFENDER).is_fainted());
        assert_eq!(battle.phase(), BattlePhase::WaitingForSwitchIns);
        assert_eq!(battle.switch_ins_required(1), 1);
    }

    #[test]
    fn fainted_event_is_emitted_once() {
        let battle = knockout_attempt(TestBattlerBuilder::new(Species::Snorlax, 5).with_moves(vec![Move::Splash]));

        let faints = battle
            .events
            .events()
            .iter()
            .filter(|event| matches!(event, BattleEvent::Fainted { battler } if battler.id() == DEFENDER))
            .count();
        assert_eq!(faints, 1);
    }
}
