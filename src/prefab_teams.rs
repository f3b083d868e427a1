use crate::battle::battler::RosterEntry;
use crate::battle::team::TeamRoster;
use schema::{Ability, Item, Move, Species};
use serde::{Deserialize, Serialize};

/// A predefined team for demos and quick matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefabTeam {
    pub id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<RosterEntry>,
}

impl PrefabTeam {
    pub fn to_roster(&self, trainer_name: &str) -> TeamRoster {
        TeamRoster::new(trainer_name, self.members.clone())
    }
}

fn member(species: Species, level: u8, moves: Vec<Move>) -> RosterEntry {
    RosterEntry::new(species, level, moves)
}

/// Get all available prefab teams
pub fn get_prefab_teams() -> Vec<PrefabTeam> {
    vec![
        PrefabTeam {
            id: "rain_team".to_string(),
            name: "Rain Dance".to_string(),
            description: "Drizzle sets the rain, swift swimmers and rain dish walls follow".to_string(),
            members: vec![
                member(
                    Species::Politoed,
                    50,
                    vec![Move::Surf, Move::IceBeam, Move::HelpingHand, Move::Protect],
                )
                .with_item(Item::DampRock),
                member(
                    Species::Blastoise,
                    50,
                    vec![Move::HydroPump, Move::Scald, Move::Rest, Move::Haze],
                )
                .with_ability(Ability::RainDish)
                .with_item(Item::Leftovers),
                member(
                    Species::Tentacruel,
                    50,
                    vec![Move::Scald, Move::ToxicSpikes, Move::SludgeBomb, Move::WideGuard],
                )
                .with_item(Item::BlackSludge),
                member(
                    Species::Gyarados,
                    50,
                    vec![Move::Waterfall, Move::DragonDance, Move::Crunch, Move::Earthquake],
                )
                .with_item(Item::LifeOrb),
            ],
        },
        PrefabTeam {
            id: "sand_team".to_string(),
            name: "Sandstorm".to_string(),
            description: "Sand Stream chip damage backed by bulky steel and rock types".to_string(),
            members: vec![
                member(
                    Species::Tyranitar,
                    50,
                    vec![Move::StoneEdge, Move::Crunch, Move::Earthquake, Move::StealthRock],
                )
                .with_item(Item::SmoothRock),
                member(
                    Species::Excadrill,
                    50,
                    vec![Move::Earthquake, Move::RockSlide, Move::XScissor, Move::SwordsDance],
                )
                .with_item(Item::FocusSash),
                member(
                    Species::Skarmory,
                    50,
                    vec![Move::Spikes, Move::Whirlwind, Move::SteelWing, Move::Protect],
                )
                .with_item(Item::RockyHelmet),
                member(
                    Species::Hippowdon,
                    50,
                    vec![Move::Earthquake, Move::Curse, Move::Rest, Move::Roar],
                )
                .with_item(Item::Leftovers),
            ],
        },
        PrefabTeam {
            id: "trick_room_team".to_string(),
            name: "Trick Room".to_string(),
            description: "Slow heavy hitters that want the turn order reversed".to_string(),
            members: vec![
                member(
                    Species::Porygon2,
                    50,
                    vec![Move::TrickRoom, Move::Recover, Move::IceBeam, Move::Thunderbolt],
                ),
                member(
                    Species::Snorlax,
                    50,
                    vec![Move::BodySlam, Move::Curse, Move::Rest, Move::Snore],
                )
                .with_ability(Ability::ThickFat)
                .with_item(Item::Leftovers),
                member(
                    Species::Machamp,
                    50,
                    vec![Move::DynamicPunch, Move::StoneEdge, Move::BulkUp, Move::Protect],
                )
                .with_ability(Ability::NoGuard),
                member(
                    Species::Chansey,
                    50,
                    vec![Move::SeismicToss, Move::ThunderWave, Move::Protect, Move::HealPulse],
                ),
            ],
        },
        PrefabTeam {
            id: "classic_team".to_string(),
            name: "Classic Six".to_string(),
            description: "A balanced team of familiar faces with diverse coverage".to_string(),
            members: vec![
                member(
                    Species::Venusaur,
                    50,
                    vec![Move::GigaDrain, Move::SleepPowder, Move::LeechSeed, Move::SludgeBomb],
                ),
                member(
                    Species::Charizard,
                    50,
                    vec![Move::Flamethrower, Move::AirSlash, Move::DragonPulse, Move::SunnyDay],
                ),
                member(
                    Species::Pikachu,
                    50,
                    vec![Move::Thunderbolt, Move::VoltTackle, Move::QuickAttack, Move::ThunderWave],
                )
                .with_item(Item::LightBall),
                member(
                    Species::Gengar,
                    50,
                    vec![Move::ShadowBall, Move::SludgeBomb, Move::Hypnosis, Move::DreamEater],
                ),
                member(
                    Species::Lapras,
                    50,
                    vec![Move::IceBeam, Move::Surf, Move::Thunderbolt, Move::Hail],
                )
                .with_ability(Ability::IceBody),
                member(
                    Species::Dragonite,
                    50,
                    vec![Move::ExtremeSpeed, Move::DragonDance, Move::Earthquake, Move::Fly],
                ),
            ],
        },
    ]
}

/// Get a specific prefab team by ID
pub fn get_prefab_team(team_id: &str) -> Option<PrefabTeam> {
    get_prefab_teams().into_iter().find(|team| team.id == team_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::state::Battle;
    use crate::settings::BattleSettings;
    use crate::move_data::get_move_data;
    use schema::BattleFormat;

    #[test]
    fn every_prefab_move_has_data() {
        for team in get_prefab_teams() {
            for entry in &team.members {
                for move_ in &entry.moves {
                    assert!(
                        get_move_data(*move_).is_ok(),
                        "{} uses {:?} without data",
                        team.id,
                        move_
                    );
                }
            }
        }
    }

    #[test]
    fn prefab_teams_build_valid_battles() {
        let teams = get_prefab_teams();
        for pair in teams.windows(2) {
            let battle = Battle::new(
                BattleFormat::Double,
                &pair[0].to_roster("Red"),
                &pair[1].to_roster("Blue"),
                BattleSettings::default(),
            );
            assert!(battle.is_ok(), "{} vs {} failed: {:?}", pair[0].id, pair[1].id, battle.err());
        }
    }

    #[test]
    fn lookup_by_id() {
        assert!(get_prefab_team("sand_team").is_some());
        assert!(get_prefab_team("missing").is_none());
    }
}
