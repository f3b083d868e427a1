use crate::Species;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumIter)]
pub enum Item {
    #[default]
    None,
    BigRoot,
    BlackSludge,
    BrightPowder,
    ChoiceBand,
    ChoiceScarf,
    ChoiceSpecs,
    DampRock,
    DeepSeaScale,
    DeepSeaTooth,
    DestinyKnot,
    ExpertBelt,
    FlameOrb,
    FocusSash,
    HeatRock,
    IcyRock,
    KingsRock,
    LaxIncense,
    Leftovers,
    LifeOrb,
    LightBall,
    LightClay,
    LuckyPunch,
    MetalPowder,
    MuscleBand,
    OranBerry,
    PowerHerb,
    QuickPowder,
    RazorClaw,
    RockyHelmet,
    ScopeLens,
    SitrusBerry,
    SmoothRock,
    SoulDew,
    Stick,
    ThickClub,
    ToxicOrb,
    WideLens,
    WiseGlasses,
}

impl Item {
    pub fn is_choice_item(self) -> bool {
        matches!(self, Item::ChoiceBand | Item::ChoiceScarf | Item::ChoiceSpecs)
    }

    pub fn is_berry(self) -> bool {
        matches!(self, Item::OranBerry | Item::SitrusBerry)
    }

    /// Items whose crit boost only works for one species line.
    pub fn boosts_crit_for(self, species: Species) -> bool {
        matches!(
            (self, species),
            (Item::LuckyPunch, Species::Chansey) | (Item::Stick, Species::Farfetchd)
        )
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Item::KingsRock => "King's Rock".to_string(),
            _ => {
                let debug_string = format!("{:?}", self);
                let mut spaced = String::with_capacity(debug_string.len() + 4);
                for (i, c) in debug_string.chars().enumerate() {
                    if i > 0 && c.is_uppercase() {
                        spaced.push(' ');
                    }
                    spaced.push(c);
                }
                spaced
            }
        };
        write!(f, "{}", display_name)
    }
}
