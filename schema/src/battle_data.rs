use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

/// Stats that carry a stage counter during battle. HP has no stage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Stat {
    Attack,
    Defense,
    SpAttack,
    SpDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::SpAttack => "Sp. Attack",
            Stat::SpDefense => "Sp. Defense",
            Stat::Speed => "Speed",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasiveness",
        };
        write!(f, "{}", display_name)
    }
}

/// The persistent status. A battler holds at most one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status1 {
    #[default]
    None,
    Asleep,
    Poisoned,
    BadlyPoisoned,
    Burned,
    Frozen,
    Paralyzed,
}

impl fmt::Display for Status1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Status1::None => "no status",
            Status1::Asleep => "sleep",
            Status1::Poisoned => "poison",
            Status1::BadlyPoisoned => "bad poison",
            Status1::Burned => "burn",
            Status1::Frozen => "freeze",
            Status1::Paralyzed => "paralysis",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Weather {
    #[default]
    None,
    Hailstorm,
    HarshSunlight,
    Rain,
    Sandstorm,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Weather::None => "clear skies",
            Weather::Hailstorm => "hail",
            Weather::HarshSunlight => "harsh sunlight",
            Weather::Rain => "rain",
            Weather::Sandstorm => "sandstorm",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Genderless,
}

impl Gender {
    /// Two battlers can be attracted to each other only with opposite, known genders.
    pub fn is_opposite(self, other: Gender) -> bool {
        matches!(
            (self, other),
            (Gender::Male, Gender::Female) | (Gender::Female, Gender::Male)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BattleFormat {
    #[default]
    Single,
    Double,
    Triple,
}

impl BattleFormat {
    /// Field positions each team fills, in send-out order.
    pub fn positions(self) -> &'static [FieldPosition] {
        match self {
            BattleFormat::Single => &[FieldPosition::Center],
            BattleFormat::Double => &[FieldPosition::Left, FieldPosition::Right],
            BattleFormat::Triple => &[
                FieldPosition::Left,
                FieldPosition::Center,
                FieldPosition::Right,
            ],
        }
    }

    pub fn active_count(self) -> usize {
        self.positions().len()
    }

    pub fn to_byte(self) -> u8 {
        match self {
            BattleFormat::Single => 0,
            BattleFormat::Double => 1,
            BattleFormat::Triple => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<BattleFormat> {
        match byte {
            0 => Some(BattleFormat::Single),
            1 => Some(BattleFormat::Double),
            2 => Some(BattleFormat::Triple),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldPosition {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl FieldPosition {
    /// The position directly across the field. Left faces the opposing Right.
    pub fn across(self) -> FieldPosition {
        match self {
            FieldPosition::Left => FieldPosition::Right,
            FieldPosition::Right => FieldPosition::Left,
            other => other,
        }
    }

    /// Horizontal column index used for adjacency checks, seen from one side.
    pub fn column(self) -> Option<i8> {
        match self {
            FieldPosition::None => None,
            FieldPosition::Left => Some(0),
            FieldPosition::Center => Some(1),
            FieldPosition::Right => Some(2),
        }
    }
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
