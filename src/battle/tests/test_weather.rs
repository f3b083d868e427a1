#[cfg(test)]
mod tests {
    use crate::battle::battler::{BattlerId, RosterEntry};
    use crate::battle::state::{Battle, BattlePhase};
    use crate::battle::team::TeamRoster;
    use crate::battle::tests::common::{create_test_battle, predictable_rng, run_moves, TestBattlerBuilder};
    use crate::settings::BattleSettings;
    use pretty_assertions::assert_eq;
    use schema::{Ability, BattleFormat, Item, Move, Species, Weather};

    #[test]
    fn slower_weather_setter_wins_on_lead() {
        let first = TeamRoster::new(
            "Red",
            vec![RosterEntry::new(Species::Politoed, 50, vec![Move::Surf])],
        );
        let second = TeamRoster::new(
            "Blue",
            vec![RosterEntry::new(Species::Tyranitar, 50, vec![Move::Crunch])],
        );
        let mut battle =
            Battle::new(BattleFormat::Single, &first, &second, BattleSettings::default()).expect("valid rosters");

        battle.begin().expect("battle begins");

        assert_eq!(battle.phase(), BattlePhase::WaitingForActions);
        assert_eq!(battle.weather, Weather::Sandstorm);
        assert_eq!(battle.weather_turns, 0, "ability weather lasts until replaced");
    }

    #[test]
    fn damp_rock_extends_rain_dance() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Blastoise, 50)
                .with_moves(vec![Move::RainDance, Move::Splash])
                .with_item(Item::DampRock)],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash])],
        );
        let settings = BattleSettings::default();
        let total = settings.rain_turns + settings.damp_rock_turn_extension;
        let mut rng = predictable_rng();

        run_moves(&mut battle, &[Move::RainDance], &[Move::Splash], &mut rng);
        assert_eq!(battle.weather, Weather::Rain);
        assert_eq!(battle.weather_turns, total - 1);

        for _ in 0..total - 2 {
            run_moves(&mut battle, &[Move::Splash], &[Move::Splash], &mut rng);
        }
        assert_eq!(battle.weather, Weather::Rain);

        run_moves(&mut battle, &[Move::Splash], &[Move::Splash], &mut rng);
        assert_eq!(battle.weather, Weather::None);
    }

    #[test]
    fn repeating_the_current_weather_fails() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Blastoise, 50).with_moves(vec![Move::RainDance])],
            vec![TestBattlerBuilder::new(Species::Snorlax, 50).with_moves(vec![Move::Splash])],
        );
        battle.weather = Weather::Rain;
        battle.weather_turns = 2;
        let mut rng = predictable_rng();

        run_moves(&mut battle, &[Move::RainDance], &[Move::Splash], &mut rng);

        assert_eq!(battle.weather_turns, 1);
    }

    #[test]
    fn cloud_nine_suppresses_sand_damage() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Snorlax, 50)
                .with_moves(vec![Move::Splash])
                .with_ability(Ability::CloudNine)],
            vec![TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash])],
        );
        battle.weather = Weather::Sandstorm;
        let mut rng = predictable_rng();

        run_moves(&mut battle, &[Move::Splash], &[Move::Splash], &mut rng);

        assert_eq!(battle.weather, Weather::Sandstorm);
        assert_eq!(battle.effective_weather(), Weather::None);
        let pikachu = battle.battler(BattlerId::new(1, 0));
        assert_eq!(pikachu.hp, pikachu.max_hp);
    }

    #[test]
    fn sand_spares_rock_types() {
        let mut battle = create_test_battle(
            BattleFormat::Single,
            vec![TestBattlerBuilder::new(Species::Tyranitar, 50).with_moves(vec![Move::Splash])],
            vec![TestBattlerBuilder::new(Species::Pikachu, 50).with_moves(vec![Move::Splash])],
        );
        battle.weather = Weather::Sandstorm;
        let mut rng = predictable_rng();

        run_moves(&mut battle, &[Move::Splash], &[Move::Splash], &mut rng);

        let tyranitar = battle.battler(BattlerId::new(0, 0));
        let pikachu = battle.battler(BattlerId::new(1, 0));
        assert_eq!(tyranitar.hp, tyranitar.max_hp);
        assert_eq!(pikachu.hp, pikachu.max_hp - pikachu.hp_fraction(16));
    }
}
