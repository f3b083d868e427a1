use crate::battle::battler::BattlerId;
use crate::battle::conditions::{TeamConditions, VolatileConditions};
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::battle::stats::{
    accuracy_stage_multiplier, attack_stat, base_power, defense_stat, target_ability,
};
use schema::{
    Ability, BattleFormat, Item, Move, MoveCategory, MoveData, MoveEffect, MoveFlag, PokemonType,
    Stat, Status1, Weather,
};

/// Per-target inputs to the damage formula decided before it runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageContext {
    pub crit: bool,
    /// More than one target is being hit by this use of the move.
    pub spread: bool,
    pub effectiveness: f64,
}

/// The attacking type a move actually hits with.
pub fn move_type_for(data: &MoveData) -> PokemonType {
    if data.effect == MoveEffect::Struggle {
        PokemonType::Typeless
    } else {
        data.move_type
    }
}

/// Type multiplier of `move_type` against the target, including immunities
/// granted by levitation.
pub fn type_effectiveness_against(
    battle: &Battle,
    user: BattlerId,
    target: BattlerId,
    move_type: PokemonType,
) -> f64 {
    if move_type == PokemonType::Typeless {
        return 1.0;
    }
    let defender = battle.battler(target);
    if move_type == PokemonType::Ground {
        let levitating = target_ability(battle, user, target) == Ability::Levitate
            || defender.status2.contains(VolatileConditions::MAGNET_RISE);
        if levitating {
            return 0.0;
        }
    }
    PokemonType::dual_effectiveness(move_type, defender.types)
}

/// Rolls whether `move_` connects with `target`.
pub fn move_hits(
    battle: &Battle,
    user: BattlerId,
    target: BattlerId,
    data: &MoveData,
    rng: &mut BattleRng,
) -> bool {
    let attacker = battle.battler(user);
    let defender = battle.battler(target);
    if attacker.ability == Ability::NoGuard || defender.ability == Ability::NoGuard {
        return true;
    }

    let hiding = defender.status2 & VolatileConditions::SEMI_INVULNERABLE;
    if !hiding.is_empty() && user != target {
        let reaches = (hiding.contains(VolatileConditions::AIRBORNE) && data.has_flag(MoveFlag::HitsAirborne))
            || (hiding.contains(VolatileConditions::UNDERGROUND)
                && data.has_flag(MoveFlag::HitsUnderground))
            || (hiding.contains(VolatileConditions::UNDERWATER)
                && data.has_flag(MoveFlag::HitsUnderwater));
        if !reaches {
            return false;
        }
    }
    if user == target {
        return true;
    }

    let weather = battle.effective_weather();
    let defender_ability = target_ability(battle, user, target);
    let mut base_accuracy = f64::from(data.accuracy);
    match data.id {
        Move::Blizzard if weather == Weather::Hailstorm => return true,
        Move::Thunder | Move::Hurricane if weather == Weather::Rain => return true,
        Move::Thunder | Move::Hurricane if weather == Weather::HarshSunlight => base_accuracy = 50.0,
        _ if data.effect == MoveEffect::OneHitKnockout => {
            let chance = i32::from(attacker.level) - i32::from(defender.level) + 30;
            return rng.roll_chance(chance.max(0) as u32, 100, "one-hit knockout accuracy");
        }
        // Wonder Skin applies to always-hit status moves too.
        _ if defender_ability == Ability::WonderSkin && data.category == MoveCategory::Status => {
            base_accuracy = 50.0
        }
        _ => {}
    }
    if base_accuracy == 0.0 {
        return true;
    }

    let accuracy_stage = if defender_ability == Ability::Unaware {
        0
    } else {
        attacker.stage(Stat::Accuracy)
    };
    let evasion_stage = if attacker.ability == Ability::Unaware {
        0
    } else {
        defender.stage(Stat::Evasion)
    };
    let max = battle.settings.max_stat_change;
    let stage = (accuracy_stage - evasion_stage).clamp(-max, max);
    let mut chance = base_accuracy * accuracy_stage_multiplier(stage);

    match attacker.ability {
        Ability::Compoundeyes => chance *= 1.3,
        Ability::Hustle if data.category == MoveCategory::Physical => chance *= 0.8,
        _ => {}
    }
    let victory_star = attacker.ability == Ability::VictoryStar
        || battle
            .allies_of(user)
            .into_iter()
            .any(|ally| battle.battler(ally).ability == Ability::VictoryStar);
    if victory_star {
        chance *= 1.1;
    }
    if attacker.item == Item::WideLens {
        chance *= 1.1;
    }
    match defender_ability {
        Ability::SandVeil if weather == Weather::Sandstorm => chance *= 0.8,
        Ability::SnowCloak if weather == Weather::Hailstorm => chance *= 0.8,
        Ability::TangledFeet if defender.status2.contains(VolatileConditions::CONFUSED) => {
            chance *= 0.5
        }
        _ => {}
    }
    if matches!(defender.item, Item::BrightPowder | Item::LaxIncense) {
        chance *= 0.9;
    }

    // Whole percents only.
    rng.roll_chance(chance as u32, 100, "accuracy")
}

/// Rolls for a critical hit. Stage table: 6.25%, 12.5%, 25%, 33.3%, 50%.
pub fn is_critical_hit(
    battle: &Battle,
    user: BattlerId,
    target: BattlerId,
    data: &MoveData,
    rng: &mut BattleRng,
) -> bool {
    if matches!(
        target_ability(battle, user, target),
        Ability::BattleArmor | Ability::ShellArmor
    ) || battle.teams[target.team]
        .conditions
        .contains(TeamConditions::LUCKY_CHANT)
    {
        return false;
    }
    if data.has_flag(MoveFlag::AlwaysCrit) {
        return true;
    }

    let attacker = battle.battler(user);
    let mut stage = 0u8;
    if attacker.status2.contains(VolatileConditions::PUMPED) {
        stage += 2;
    }
    if attacker.item.boosts_crit_for(attacker.original_species) {
        stage += 2;
    }
    if data.has_flag(MoveFlag::HighCritChance) {
        stage += 1;
    }
    if attacker.ability == Ability::SuperLuck {
        stage += 1;
    }
    if matches!(attacker.item, Item::ScopeLens | Item::RazorClaw) {
        stage += 1;
    }
    let chance = match stage {
        0 => 625,
        1 => 1250,
        2 => 2500,
        3 => 3330,
        _ => 5000,
    };
    rng.roll_chance(chance, 10_000, "critical hit")
}

/// Damage before it is applied. Zero only when the target is immune.
///
/// `floor(floor(floor(2L/5 + 2) * P * A / D) / 50) + 2`, then spread, weather,
/// crit, STAB, type, burn, screens and item multipliers in that order.
pub fn calculate_damage(
    battle: &Battle,
    user: BattlerId,
    target: BattlerId,
    data: &MoveData,
    context: DamageContext,
) -> u16 {
    if context.effectiveness == 0.0 {
        return 0;
    }
    let attacker = battle.battler(user);
    let power = base_power(battle, user, target, data) as u64;
    let attack = attack_stat(battle, user, target, data, context.crit) as u64;
    let defense = defense_stat(battle, user, target, data, context.crit) as u64;

    let level_factor = 2 * u64::from(attacker.level) / 5 + 2;
    let base = level_factor * power * attack / defense.max(1) / 50 + 2;
    let mut damage = base as f64;

    if context.spread {
        damage *= 0.75;
    }
    let move_type = move_type_for(data);
    match (battle.effective_weather(), move_type) {
        (Weather::Rain, PokemonType::Water) | (Weather::HarshSunlight, PokemonType::Fire) => {
            damage *= 1.5
        }
        (Weather::Rain, PokemonType::Fire) | (Weather::HarshSunlight, PokemonType::Water) => {
            damage *= 0.5
        }
        _ => {}
    }
    if context.crit {
        damage *= battle.settings.crit_multiplier;
    }
    if move_type != PokemonType::Typeless && attacker.has_type(move_type) {
        damage *= if attacker.ability == Ability::Adaptability {
            2.0
        } else {
            1.5
        };
    }
    damage *= context.effectiveness;

    let physical = data.category == MoveCategory::Physical;
    if physical && attacker.status1 == Status1::Burned && attacker.ability != Ability::Guts {
        damage *= 0.5;
    }
    if !context.crit {
        let screens = battle.teams[target.team].conditions;
        let screened = (physical && screens.contains(TeamConditions::REFLECT))
            || (!physical && screens.contains(TeamConditions::LIGHT_SCREEN));
        if screened {
            damage *= if battle.format == BattleFormat::Single {
                0.5
            } else {
                2.0 / 3.0
            };
        }
    }
    match attacker.item {
        Item::LifeOrb => damage *= 1.3,
        Item::ExpertBelt if context.effectiveness > 1.0 => damage *= 1.2,
        Item::MuscleBand if physical => damage *= 1.1,
        Item::WiseGlasses if !physical => damage *= 1.1,
        _ => {}
    }

    (damage.floor() as u16).max(1)
}

/// Damage a confused battler deals to itself: a 40-power typeless physical hit.
pub fn confusion_damage(battle: &Battle, id: BattlerId) -> u16 {
    let battler = battle.battler(id);
    let attack = f64::from(battler.stats.attack)
        * crate::battle::stats::stat_stage_multiplier(battler.stage(Stat::Attack));
    let defense = f64::from(battler.stats.defense)
        * crate::battle::stats::stat_stage_multiplier(battler.stage(Stat::Defense));
    let level_factor = 2 * u64::from(battler.level) / 5 + 2;
    let base = level_factor * 40 * (attack.floor() as u64) / (defense.floor() as u64).max(1) / 50 + 2;
    let mut damage = base as f64;
    if battler.status1 == Status1::Burned && battler.ability != Ability::Guts {
        damage *= 0.5;
    }
    (damage.floor() as u16).max(1)
}
