use super::EffectContext;
use crate::battle::battler::BattlerId;
use crate::battle::commands::BattleCommand;
use crate::battle::conditions::{MoveResult, VolatileConditions};
use crate::battle::events::{BattleEvent, SpecialMessage, StatusAction};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::errors::BattleResult;
use crate::move_data::{get_move_data, metronome_candidates};
use schema::{Ability, Move, PokemonType, Status1, Weather};
use tracing::debug;

impl Battle {
    fn special(&mut self, battler: BattlerId, other: Option<BattlerId>, message: SpecialMessage) {
        let battler = Some(self.reference(battler));
        let other = other.map(|id| self.reference(id));
        self.emit(BattleEvent::Special {
            battler,
            other,
            message,
        });
    }

    /// The single live target of a move aimed at one battler, after the
    /// accuracy check.
    fn single_target(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<Option<BattlerId>> {
        let Some(&target) = context.targets.first() else {
            return Ok(None);
        };
        if !self.battler(target).is_active() || self.miss_check(context.user, target, context.data, rng)? {
            return Ok(None);
        }
        Ok(Some(target))
    }

    /// Changes the user to the type of one of its moves it does not already
    /// have.
    pub(super) fn conversion(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        let battler = self.battler(user);
        let mut candidates: Vec<PokemonType> = Vec::new();
        for slot in &battler.moves {
            let move_type = get_move_data(slot.move_)?.move_type;
            if move_type != PokemonType::Typeless
                && !battler.has_type(move_type)
                && !candidates.contains(&move_type)
            {
                candidates.push(move_type);
            }
        }
        if candidates.is_empty() {
            self.report(user, None, MoveResult::InvalidConditions);
            return Ok(());
        }
        let picked = candidates[rng.random_index(candidates.len(), "conversion type")];
        self.execute(BattleCommand::SetTypes {
            target: user,
            types: [picked, picked],
        })
    }

    pub(super) fn soak(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let Some(target) = self.single_target(context, rng)? else {
            return Ok(());
        };
        if self.battler(target).types == [PokemonType::Water, PokemonType::Water] {
            self.report(context.user, Some(target), MoveResult::InvalidConditions);
            return Ok(());
        }
        self.execute(BattleCommand::SetTypes {
            target,
            types: [PokemonType::Water, PokemonType::Water],
        })
    }

    pub(super) fn gastro_acid(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let Some(target) = self.single_target(context, rng)? else {
            return Ok(());
        };
        let ability = self.battler(target).ability;
        if ability == Ability::None || ability.is_locked() {
            self.report(context.user, Some(target), MoveResult::InvalidConditions);
            return Ok(());
        }
        self.set_ability(target, Ability::None, context.user)
    }

    pub(super) fn simple_beam(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let Some(target) = self.single_target(context, rng)? else {
            return Ok(());
        };
        let ability = self.battler(target).ability;
        if ability == Ability::Simple || ability.is_locked() {
            self.report(context.user, Some(target), MoveResult::InvalidConditions);
            return Ok(());
        }
        self.set_ability(target, Ability::Simple, context.user)
    }

    /// Both battlers end up with the average of their HP.
    pub(super) fn pain_split(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        let Some(target) = self.single_target(context, rng)? else {
            return Ok(());
        };
        if self.battler(target).status2.contains(VolatileConditions::SUBSTITUTE) {
            self.report(user, Some(target), MoveResult::IneffectiveSubstitute);
            return Ok(());
        }
        let total = u32::from(self.battler(user).hp) + u32::from(self.battler(target).hp);
        let shared = (total / 2) as u16;
        self.special(user, Some(target), SpecialMessage::PainSplit);
        self.execute(BattleCommand::SetHp { target: user, hp: shared })?;
        self.execute(BattleCommand::SetHp { target, hp: shared })?;
        Ok(())
    }

    pub(super) fn moonlight(&mut self, context: &EffectContext) -> BattleResult<()> {
        let user = context.user;
        let max_hp = u32::from(self.battler(user).max_hp);
        let amount = match self.effective_weather() {
            Weather::HarshSunlight => max_hp * 2 / 3,
            Weather::None => max_hp / 2,
            _ => max_hp / 4,
        };
        if self.heal(user, amount as u16)? == 0 {
            self.report(user, Some(user), MoveResult::IneffectiveStat);
        }
        Ok(())
    }

    /// Full heal and a fixed-length sleep that replaces any other status.
    pub(super) fn rest(&mut self, context: &EffectContext) -> BattleResult<()> {
        let user = context.user;
        let battler = self.battler(user);
        let max_hp = battler.max_hp;
        let result = if battler.hp == max_hp {
            MoveResult::IneffectiveStat
        } else if matches!(battler.ability, Ability::Insomnia | Ability::VitalSpirit) {
            MoveResult::IneffectiveAbility
        } else if battler.status1 == Status1::Asleep {
            MoveResult::IneffectiveStatus
        } else {
            MoveResult::Success
        };
        if result != MoveResult::Success {
            self.report(user, Some(user), result);
            return Ok(());
        }
        let sleep_turns = self.settings.sleep_max_turns;
        self.execute(BattleCommand::SetStatus1 {
            target: user,
            status: Status1::Asleep,
            sleep_turns,
            action: StatusAction::Added,
        })?;
        self.heal(user, max_hp)?;
        Ok(())
    }

    pub(super) fn restore_target_hp(
        &mut self,
        context: &EffectContext,
        percent: u16,
        rng: &mut BattleRng,
    ) -> BattleResult<()> {
        let user = context.user;
        for &target in &context.targets {
            if !self.battler(target).is_active() || self.miss_check(user, target, context.data, rng)? {
                continue;
            }
            let battler = self.battler(target);
            if battler.hp == battler.max_hp {
                self.report(user, Some(target), MoveResult::IneffectiveStat);
                continue;
            }
            let amount = (u32::from(battler.max_hp) * u32::from(percent) / 100) as u16;
            self.heal(target, amount)?;
        }
        Ok(())
    }

    /// Calls a random move with a random legal aim.
    pub(super) fn metronome(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        let candidates = metronome_candidates()?;
        if candidates.is_empty() {
            self.report(user, None, MoveResult::InvalidConditions);
            return Ok(());
        }
        let called = candidates[rng.random_index(candidates.len(), "metronome move")];
        if !context.called {
            self.record_executed_move(user, Move::Metronome, context.data)?;
        }
        let masks = self.legal_targets(user, called)?;
        let mask = if masks.is_empty() {
            crate::battle::action::TargetMask::empty()
        } else {
            masks[rng.random_index(masks.len(), "metronome target")]
        };
        debug!(?user, ?called, ?mask, "metronome");
        self.use_move(user, called, mask, true, rng)
    }

    pub(super) fn nothing(&mut self, context: &EffectContext) -> BattleResult<()> {
        self.special(context.user, None, SpecialMessage::NothingHappened);
        Ok(())
    }

    /// Drags the target out and brings in a random healthy reserve.
    pub(super) fn whirlwind(&mut self, context: &EffectContext, rng: &mut BattleRng) -> BattleResult<()> {
        let user = context.user;
        let Some(target) = self.single_target(context, rng)? else {
            return Ok(());
        };
        let reserves = self.teams[target.team].reserves();
        if reserves.is_empty() {
            self.report(user, Some(target), MoveResult::InvalidConditions);
            return Ok(());
        }
        let slot = reserves[rng.random_index(reserves.len(), "dragged-out replacement")];
        self.switch_two(target, BattlerId::new(target.team, slot), Some(user))
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::action::TargetMask;
    use crate::battle::battler::BattlerId;
    use crate::battle::conditions::MoveResult;
    use crate::battle::events::{BattleEvent, SpecialMessage};
    use crate::battle::rng::BattleRng;
    use crate::battle::tests::common::{create_test_battle, predictable_rng, TestBattlerBuilder};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{Ability, BattleFormat, FieldPosition, Move, PokemonType, Species, Status1, Weather};

    fn foe() -> TargetMask {
        TargetMask::foe(FieldPosition::Center)
    }

    #[test]
    fn pain_split_averages_hp() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::PainSplit])],
            vec![TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle])],
        );
        let user = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        battle.battler_mut(user).hp = 10;
        let target_hp = battle.battler(target).hp;
        battle
            .use_move(user, Move::PainSplit, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        let shared = (10 + target_hp) / 2;
        assert_eq!(battle.battler(target).hp, shared);
        assert_eq!(battle.battler(user).hp, shared.min(battle.battler(user).max_hp));
    }

    #[rstest]
    #[case(Weather::None, 2)]
    #[case(Weather::Rain, 4)]
    fn moonlight_depends_on_weather(#[case] weather: Weather, #[case] divisor: u16) {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Umbreon, 50).with_moves(vec![Move::Moonlight])],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Tackle])],
        );
        battle.weather = weather;
        let user = BattlerId::new(0, 0);
        battle.battler_mut(user).hp = 1;
        let max_hp = battle.battler(user).max_hp;
        battle
            .use_move(user, Move::Moonlight, TargetMask::empty(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(user).hp, 1 + max_hp / divisor);
    }

    #[test]
    fn rest_sleeps_for_the_maximum_and_heals() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Rest])],
            vec![TestBattlerBuilder::new(Species::Gengar, 50).with_moves(vec![Move::ShadowBall])],
        );
        let user = BattlerId::new(0, 0);
        battle.battler_mut(user).hp = 5;
        battle.battler_mut(user).status1 = Status1::Burned;
        battle
            .use_move(user, Move::Rest, TargetMask::empty(), false, &mut predictable_rng())
            .expect("move resolves");
        let battler = battle.battler(user);
        assert_eq!(battler.status1, Status1::Asleep);
        assert_eq!(battler.sleep_turns, battle.settings.sleep_max_turns);
        assert_eq!(battler.hp, battler.max_hp);
    }

    #[test]
    fn soak_and_simple_beam() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Lapras, 50).with_moves(vec![Move::Soak, Move::SimpleBeam])],
            vec![TestBattlerBuilder::new(Species::Charizard, 50).with_moves(vec![Move::Tackle])],
        );
        let user = BattlerId::new(0, 0);
        let target = BattlerId::new(1, 0);
        battle
            .use_move(user, Move::Soak, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(target).types, [PokemonType::Water, PokemonType::Water]);
        battle
            .use_move(user, Move::SimpleBeam, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(target).ability, Ability::Simple);
    }

    #[test]
    fn gastro_acid_cannot_touch_illusion() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Muk, 50).with_moves(vec![Move::GastroAcid])],
            vec![TestBattlerBuilder::new(Species::Zoroark, 50).with_moves(vec![Move::Tackle])],
        );
        battle
            .use_move(BattlerId::new(0, 0), Move::GastroAcid, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert_eq!(battle.battler(BattlerId::new(1, 0)).ability, Ability::Illusion);
        assert!(matches!(
            battle.events.events().last(),
            Some(BattleEvent::MoveResultReported {
                result: MoveResult::InvalidConditions,
                ..
            })
        ));
    }

    #[test]
    fn splash_does_nothing() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Gyarados, 50).with_moves(vec![Move::Splash])],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Tackle])],
        );
        battle
            .use_move(BattlerId::new(0, 0), Move::Splash, TargetMask::empty(), false, &mut BattleRng::new_for_test(vec![]))
            .expect("move resolves");
        assert!(battle.events.events().iter().any(|event| matches!(
            event,
            BattleEvent::Special {
                message: SpecialMessage::NothingHappened,
                ..
            }
        )));
    }

    #[test]
    fn whirlwind_drags_in_a_reserve() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Skarmory, 50).with_moves(vec![Move::Whirlwind])],
            vec![
                TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Tackle]),
                TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Tackle]),
            ],
        );
        battle
            .use_move(BattlerId::new(0, 0), Move::Whirlwind, foe(), false, &mut predictable_rng())
            .expect("move resolves");
        assert!(!battle.battler(BattlerId::new(1, 0)).is_active());
        assert_eq!(battle.battler(BattlerId::new(1, 1)).position, FieldPosition::Center);
    }

    #[test]
    fn metronome_calls_another_move() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Chansey, 50).with_moves(vec![Move::Metronome])],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Tackle])],
        );
        let user = BattlerId::new(0, 0);
        battle
            .use_move(user, Move::Metronome, TargetMask::empty(), false, &mut BattleRng::from_seed(7))
            .expect("move resolves");
        let used: Vec<_> = battle
            .events
            .events()
            .iter()
            .filter_map(|event| match event {
                BattleEvent::MoveUsed { move_, .. } => Some(*move_),
                _ => None,
            })
            .collect();
        assert_eq!(used.len(), 2);
        assert_eq!(used[0], Move::Metronome);
        assert_ne!(used[1], Move::Metronome);
        assert!(battle.battler(user).has_used_move_this_turn);
    }
}
