use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumIter)]
pub enum Ability {
    #[default]
    None,
    Adaptability,
    AirLock,
    BattleArmor,
    Blaze,
    Chlorophyll,
    CloudNine,
    ColorChange,
    Compoundeyes,
    CuteCharm,
    Download,
    Drizzle,
    Drought,
    EarlyBird,
    EffectSpore,
    FlameBody,
    FlowerGift,
    Forecast,
    Guts,
    Healer,
    Heatproof,
    HugePower,
    Hustle,
    IceBody,
    Illusion,
    Immunity,
    Imposter,
    Insomnia,
    IronBarbs,
    Justified,
    LeafGuard,
    Levitate,
    Limber,
    LiquidOoze,
    MagmaArmor,
    MarvelScale,
    Minus,
    MoldBreaker,
    Moody,
    Mummy,
    NoGuard,
    Oblivious,
    Overcoat,
    Overgrow,
    OwnTempo,
    Plus,
    PoisonPoint,
    PurePower,
    QuickFeet,
    RainDish,
    Rattled,
    RockHead,
    RoughSkin,
    SandForce,
    SandRush,
    SandStream,
    SandVeil,
    ShedSkin,
    ShellArmor,
    Simple,
    SlowStart,
    SnowCloak,
    SnowWarning,
    SolarPower,
    SpeedBoost,
    Static,
    Steadfast,
    Sturdy,
    SuperLuck,
    Swarm,
    SwiftSwim,
    TangledFeet,
    Technician,
    Teravolt,
    ThickFat,
    Torrent,
    Turboblaze,
    Unaware,
    VictoryStar,
    VitalSpirit,
    WaterVeil,
    WeakArmor,
    WonderSkin,
}

impl Ability {
    /// Abilities that let their owner ignore the target's defensive abilities.
    pub fn breaks_molds(self) -> bool {
        matches!(self, Ability::MoldBreaker | Ability::Teravolt | Ability::Turboblaze)
    }

    /// Abilities that a mold-breaking attacker ignores.
    pub fn is_breakable(self) -> bool {
        matches!(
            self,
            Ability::BattleArmor
                | Ability::ShellArmor
                | Ability::Heatproof
                | Ability::Immunity
                | Ability::Insomnia
                | Ability::LeafGuard
                | Ability::Levitate
                | Ability::Limber
                | Ability::MagmaArmor
                | Ability::MarvelScale
                | Ability::Oblivious
                | Ability::OwnTempo
                | Ability::SandVeil
                | Ability::Simple
                | Ability::SnowCloak
                | Ability::Sturdy
                | Ability::TangledFeet
                | Ability::ThickFat
                | Ability::Unaware
                | Ability::VitalSpirit
                | Ability::WaterVeil
                | Ability::WonderSkin
        )
    }

    /// Abilities that cannot be overwritten or suppressed by moves.
    pub fn is_locked(self) -> bool {
        matches!(self, Ability::Illusion | Ability::Imposter)
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let debug_string = format!("{:?}", self);
        let mut spaced = String::with_capacity(debug_string.len() + 4);
        for (i, c) in debug_string.chars().enumerate() {
            if i > 0 && c.is_uppercase() {
                spaced.push(' ');
            }
            spaced.push(c);
        }
        write!(f, "{}", spaced)
    }
}
