//! Rule constants for one battle.
//!
//! `BattleSettings::default()` reproduces the reference game's numbers. A
//! battle host may override any subset from RON; missing fields keep their
//! defaults. The settings travel inside every replay header.

use crate::errors::SettingsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSettings {
    pub max_level: u8,
    pub max_party_size: u8,
    pub max_moves: u8,
    pub max_stat_change: i8,

    pub sleep_min_turns: u8,
    pub sleep_max_turns: u8,
    pub confusion_min_turns: u8,
    pub confusion_max_turns: u8,
    pub slow_start_turns: u8,
    pub magnet_rise_turns: u8,
    /// Effective speed is divided by this while paralyzed.
    pub paralysis_speed_divisor: u8,
    pub crit_multiplier: f64,

    pub burn_damage_denominator: u16,
    pub poison_damage_denominator: u16,
    pub toxic_damage_denominator: u16,
    pub curse_denominator: u16,
    pub leech_seed_denominator: u16,
    pub hail_damage_denominator: u16,
    pub sandstorm_damage_denominator: u16,
    pub ice_body_heal_denominator: u16,
    pub rain_dish_heal_denominator: u16,
    pub solar_power_damage_denominator: u16,
    pub leftovers_heal_denominator: u16,
    pub black_sludge_heal_denominator: u16,
    pub black_sludge_damage_denominator: u16,
    pub life_orb_denominator: u16,
    pub rocky_helmet_denominator: u16,
    pub iron_barbs_denominator: u16,
    pub stealth_rock_denominator: u16,

    pub reflect_turns: u8,
    pub light_screen_turns: u8,
    pub light_clay_turn_extension: u8,
    pub safeguard_turns: u8,
    pub lucky_chant_turns: u8,
    pub tailwind_turns: u8,
    pub trick_room_turns: u8,

    pub hail_turns: u8,
    pub icy_rock_turn_extension: u8,
    pub rain_turns: u8,
    pub damp_rock_turn_extension: u8,
    pub sandstorm_turns: u8,
    pub smooth_rock_turn_extension: u8,
    pub sun_turns: u8,
    pub heat_rock_turn_extension: u8,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            max_level: 100,
            max_party_size: 6,
            max_moves: 4,
            max_stat_change: 6,

            sleep_min_turns: 1,
            sleep_max_turns: 3,
            confusion_min_turns: 1,
            confusion_max_turns: 4,
            slow_start_turns: 5,
            magnet_rise_turns: 5,
            paralysis_speed_divisor: 2,
            crit_multiplier: 2.0,

            burn_damage_denominator: 8,
            poison_damage_denominator: 8,
            toxic_damage_denominator: 16,
            curse_denominator: 4,
            leech_seed_denominator: 8,
            hail_damage_denominator: 16,
            sandstorm_damage_denominator: 16,
            ice_body_heal_denominator: 16,
            rain_dish_heal_denominator: 16,
            solar_power_damage_denominator: 8,
            leftovers_heal_denominator: 16,
            black_sludge_heal_denominator: 16,
            black_sludge_damage_denominator: 8,
            life_orb_denominator: 10,
            rocky_helmet_denominator: 6,
            iron_barbs_denominator: 8,
            stealth_rock_denominator: 8,

            reflect_turns: 5,
            light_screen_turns: 5,
            light_clay_turn_extension: 3,
            safeguard_turns: 5,
            lucky_chant_turns: 5,
            tailwind_turns: 4,
            trick_room_turns: 5,

            hail_turns: 5,
            icy_rock_turn_extension: 3,
            rain_turns: 5,
            damp_rock_turn_extension: 3,
            sandstorm_turns: 5,
            smooth_rock_turn_extension: 3,
            sun_turns: 5,
            heat_rock_turn_extension: 3,
        }
    }
}

impl BattleSettings {
    /// Parse settings from RON. Fields left out keep their default values.
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        let settings: BattleSettings =
            ron::from_str(source).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_level == 0 {
            return Err(invalid("max_level", "must be at least 1"));
        }
        if self.max_party_size == 0 || self.max_party_size > 6 {
            return Err(invalid("max_party_size", "must be between 1 and 6"));
        }
        if self.max_moves == 0 {
            return Err(invalid("max_moves", "must be at least 1"));
        }
        if !(1..=12).contains(&self.max_stat_change) {
            return Err(invalid("max_stat_change", "must be between 1 and 12"));
        }
        if self.sleep_min_turns > self.sleep_max_turns {
            return Err(invalid("sleep_min_turns", "must not exceed sleep_max_turns"));
        }
        if self.confusion_min_turns == 0 || self.confusion_min_turns > self.confusion_max_turns {
            return Err(invalid(
                "confusion_min_turns",
                "must be at least 1 and not exceed confusion_max_turns",
            ));
        }
        if self.paralysis_speed_divisor == 0 {
            return Err(invalid("paralysis_speed_divisor", "must be at least 1"));
        }
        if self.crit_multiplier < 1.0 {
            return Err(invalid("crit_multiplier", "must be at least 1.0"));
        }
        let denominators = [
            ("burn_damage_denominator", self.burn_damage_denominator),
            ("poison_damage_denominator", self.poison_damage_denominator),
            ("toxic_damage_denominator", self.toxic_damage_denominator),
            ("curse_denominator", self.curse_denominator),
            ("leech_seed_denominator", self.leech_seed_denominator),
            ("hail_damage_denominator", self.hail_damage_denominator),
            ("sandstorm_damage_denominator", self.sandstorm_damage_denominator),
            ("ice_body_heal_denominator", self.ice_body_heal_denominator),
            ("rain_dish_heal_denominator", self.rain_dish_heal_denominator),
            ("solar_power_damage_denominator", self.solar_power_damage_denominator),
            ("leftovers_heal_denominator", self.leftovers_heal_denominator),
            ("black_sludge_heal_denominator", self.black_sludge_heal_denominator),
            ("black_sludge_damage_denominator", self.black_sludge_damage_denominator),
            ("life_orb_denominator", self.life_orb_denominator),
            ("rocky_helmet_denominator", self.rocky_helmet_denominator),
            ("iron_barbs_denominator", self.iron_barbs_denominator),
            ("stealth_rock_denominator", self.stealth_rock_denominator),
        ];
        for (name, value) in denominators {
            if value == 0 {
                return Err(invalid(name, "must be non-zero"));
            }
        }
        Ok(())
    }

    /// Compact binary form stored in replay headers.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

fn invalid(name: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_ron_keeps_defaults() {
        let settings = BattleSettings::from_ron_str("(max_stat_change: 4, sleep_max_turns: 5)")
            .expect("settings should parse");
        assert_eq!(settings.max_stat_change, 4);
        assert_eq!(settings.sleep_max_turns, 5);
        assert_eq!(settings.reflect_turns, BattleSettings::default().reflect_turns);
    }

    #[test]
    fn inverted_sleep_range_is_rejected() {
        let result = BattleSettings::from_ron_str("(sleep_min_turns: 4, sleep_max_turns: 2)");
        assert!(matches!(
            result,
            Err(SettingsError::Invalid { name: "sleep_min_turns", .. })
        ));
    }

    #[test]
    fn bytes_round_trip() {
        let settings = BattleSettings {
            paralysis_speed_divisor: 4,
            ..BattleSettings::default()
        };
        let bytes = settings.to_bytes().expect("encode");
        assert_eq!(BattleSettings::from_bytes(&bytes).expect("decode"), settings);
    }
}
