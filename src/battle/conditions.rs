use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Conditions that coexist on a battler and clear when it leaves the field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct VolatileConditions: u32 {
        const AIRBORNE = 1 << 0;
        const CONFUSED = 1 << 1;
        const CURSED = 1 << 2;
        const DISGUISED = 1 << 3;
        const FLINCHING = 1 << 4;
        const HELPING_HAND = 1 << 5;
        const INFATUATED = 1 << 6;
        const LEECH_SEED = 1 << 7;
        const MAGNET_RISE = 1 << 8;
        const POWER_TRICK = 1 << 9;
        const PROTECTED = 1 << 10;
        const PUMPED = 1 << 11;
        const SUBSTITUTE = 1 << 12;
        const TRANSFORMED = 1 << 13;
        const UNDERGROUND = 1 << 14;
        const UNDERWATER = 1 << 15;

        const SEMI_INVULNERABLE = Self::AIRBORNE.bits() | Self::UNDERGROUND.bits() | Self::UNDERWATER.bits();
    }
}

impl VolatileConditions {
    pub fn display_name(self) -> &'static str {
        if self == Self::AIRBORNE {
            "flight"
        } else if self == Self::CONFUSED {
            "confusion"
        } else if self == Self::CURSED {
            "curse"
        } else if self == Self::DISGUISED {
            "illusion"
        } else if self == Self::FLINCHING {
            "flinch"
        } else if self == Self::HELPING_HAND {
            "Helping Hand"
        } else if self == Self::INFATUATED {
            "infatuation"
        } else if self == Self::LEECH_SEED {
            "Leech Seed"
        } else if self == Self::MAGNET_RISE {
            "Magnet Rise"
        } else if self == Self::POWER_TRICK {
            "Power Trick"
        } else if self == Self::PROTECTED {
            "protection"
        } else if self == Self::PUMPED {
            "focus"
        } else if self == Self::SUBSTITUTE {
            "substitute"
        } else if self == Self::TRANSFORMED {
            "transformation"
        } else if self == Self::UNDERGROUND {
            "digging"
        } else if self == Self::UNDERWATER {
            "diving"
        } else {
            "conditions"
        }
    }
}

bitflags! {
    /// Conditions on one team's side of the field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TeamConditions: u16 {
        const LIGHT_SCREEN = 1 << 0;
        const LUCKY_CHANT = 1 << 1;
        const REFLECT = 1 << 2;
        const SAFEGUARD = 1 << 3;
        const SPIKES = 1 << 4;
        const STEALTH_ROCK = 1 << 5;
        const TAILWIND = 1 << 6;
        const TOXIC_SPIKES = 1 << 7;
        const WIDE_GUARD = 1 << 8;
    }
}

impl TeamConditions {
    pub fn display_name(self) -> &'static str {
        if self == Self::LIGHT_SCREEN {
            "Light Screen"
        } else if self == Self::LUCKY_CHANT {
            "Lucky Chant"
        } else if self == Self::REFLECT {
            "Reflect"
        } else if self == Self::SAFEGUARD {
            "Safeguard"
        } else if self == Self::SPIKES {
            "Spikes"
        } else if self == Self::STEALTH_ROCK {
            "Stealth Rock"
        } else if self == Self::TAILWIND {
            "Tailwind"
        } else if self == Self::TOXIC_SPIKES {
            "Toxic Spikes"
        } else if self == Self::WIDE_GUARD {
            "Wide Guard"
        } else {
            "team conditions"
        }
    }
}

bitflags! {
    /// Conditions covering the whole field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FieldConditions: u8 {
        const TRICK_ROOM = 1 << 0;
    }
}

/// Named outcome of a move against one target. Rule-level non-effects are
/// reported through these rather than as errors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveResult {
    Success,
    Missed,
    NoTarget,
    IneffectiveAbility,
    IneffectiveGender,
    IneffectiveLevel,
    IneffectiveSafeguard,
    IneffectiveStat,
    IneffectiveStatus,
    IneffectiveSubstitute,
    IneffectiveType,
    InvalidConditions,
    NotVeryEffective,
    SuperEffective,
}

impl MoveResult {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            MoveResult::Success | MoveResult::NotVeryEffective | MoveResult::SuperEffective
        )
    }
}
