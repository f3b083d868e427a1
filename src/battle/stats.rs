use crate::battle::battler::BattlerId;
use crate::battle::conditions::{TeamConditions, VolatileConditions};
use crate::battle::state::Battle;
use schema::{
    Ability, Item, MoveCategory, MoveData, MoveFlag, PokemonType, Species, Stat, Status1, Weather,
};

/// The defending ability as the attacker experiences it. Mold Breaker and
/// its variants see breakable abilities as absent.
pub fn target_ability(battle: &Battle, user: BattlerId, target: BattlerId) -> Ability {
    let ability = battle.battler(target).ability;
    if user != target && battle.battler(user).ability.breaks_molds() && ability.is_breakable() {
        Ability::None
    } else {
        ability
    }
}

/// Multiplier for a regular stat stage.
/// Negative stages: 2 / (2 + |stage|). Positive stages: (2 + stage) / 2.
pub fn stat_stage_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage);
    if stage < 0.0 {
        2.0 / (2.0 - stage)
    } else {
        (2.0 + stage) / 2.0
    }
}

/// Accuracy and evasion use thirds instead of halves.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage);
    if stage < 0.0 {
        3.0 / (3.0 - stage)
    } else {
        (3.0 + stage) / 3.0
    }
}

fn has_ally_with(battle: &Battle, id: BattlerId, abilities: &[Ability]) -> bool {
    battle
        .allies_of(id)
        .into_iter()
        .any(|ally| abilities.contains(&battle.battler(ally).ability))
}

fn flower_gift_active(battle: &Battle, id: BattlerId) -> bool {
    battle.effective_weather() == Weather::HarshSunlight
        && (battle.battler(id).ability == Ability::FlowerGift
            || has_ally_with(battle, id, &[Ability::FlowerGift]))
}

/// Speed used for acting order, after every speed modifier.
pub fn effective_speed(battle: &Battle, id: BattlerId) -> f64 {
    let battler = battle.battler(id);
    let weather = battle.effective_weather();
    let mut speed = f64::from(battler.stats.speed) * stat_stage_multiplier(battler.stage(Stat::Speed));

    match battler.item {
        Item::ChoiceScarf => speed *= 1.5,
        Item::QuickPowder
            if battler.species == Species::Ditto
                && !battler.status2.contains(VolatileConditions::TRANSFORMED) =>
        {
            speed *= 2.0
        }
        _ => {}
    }
    match battler.ability {
        Ability::Chlorophyll if weather == Weather::HarshSunlight => speed *= 2.0,
        Ability::SwiftSwim if weather == Weather::Rain => speed *= 2.0,
        Ability::SandRush if weather == Weather::Sandstorm => speed *= 2.0,
        Ability::QuickFeet if battler.status1 != Status1::None => speed *= 1.5,
        Ability::SlowStart if battler.slow_start_turns > 0 => speed *= 0.5,
        _ => {}
    }
    if battle.teams[id.team].conditions.contains(TeamConditions::TAILWIND) {
        speed *= 2.0;
    }
    if battler.status1 == Status1::Paralyzed && battler.ability != Ability::QuickFeet {
        speed /= f64::from(battle.settings.paralysis_speed_divisor);
    }
    speed.floor()
}

/// Offensive stat for a damaging move, with stages and ability/item modifiers.
pub fn attack_stat(
    battle: &Battle,
    user: BattlerId,
    target: BattlerId,
    data: &MoveData,
    crit: bool,
) -> f64 {
    let attacker = battle.battler(user);
    let physical = data.category == MoveCategory::Physical;
    let (base, stat) = if physical {
        (attacker.stats.attack, Stat::Attack)
    } else {
        (attacker.stats.sp_attack, Stat::SpAttack)
    };

    let mut stage = attacker.stage(stat);
    if target_ability(battle, user, target) == Ability::Unaware || (crit && stage < 0) {
        stage = 0;
    }
    let mut attack = f64::from(base) * stat_stage_multiplier(stage);

    if physical {
        match attacker.ability {
            Ability::HugePower | Ability::PurePower => attack *= 2.0,
            Ability::Guts if attacker.status1 != Status1::None => attack *= 1.5,
            Ability::Hustle => attack *= 1.5,
            Ability::SlowStart if attacker.slow_start_turns > 0 => attack *= 0.5,
            _ => {}
        }
        if flower_gift_active(battle, user) {
            attack *= 1.5;
        }
        match attacker.item {
            Item::ChoiceBand => attack *= 1.5,
            Item::ThickClub if attacker.species == Species::Marowak => attack *= 2.0,
            _ => {}
        }
    } else {
        if matches!(attacker.ability, Ability::Plus | Ability::Minus)
            && has_ally_with(battle, user, &[Ability::Plus, Ability::Minus])
        {
            attack *= 1.5;
        }
        match attacker.item {
            Item::ChoiceSpecs => attack *= 1.5,
            Item::DeepSeaTooth if attacker.species == Species::Clamperl => attack *= 2.0,
            Item::SoulDew if matches!(attacker.species, Species::Latias | Species::Latios) => {
                attack *= 1.5
            }
            _ => {}
        }
    }
    if attacker.item == Item::LightBall && attacker.species == Species::Pikachu {
        attack *= 2.0;
    }
    if target_ability(battle, user, target) == Ability::ThickFat
        && matches!(data.move_type, PokemonType::Fire | PokemonType::Ice)
    {
        attack *= 0.5;
    }
    attack.floor().max(1.0)
}

/// Defensive stat against a damaging move.
pub fn defense_stat(
    battle: &Battle,
    user: BattlerId,
    target: BattlerId,
    data: &MoveData,
    crit: bool,
) -> f64 {
    let defender = battle.battler(target);
    let physical = data.category == MoveCategory::Physical;
    let (base, stat) = if physical {
        (defender.stats.defense, Stat::Defense)
    } else {
        (defender.stats.sp_defense, Stat::SpDefense)
    };

    let mut stage = defender.stage(stat);
    if battle.battler(user).ability == Ability::Unaware || (crit && stage > 0) {
        stage = 0;
    }
    let mut defense = f64::from(base) * stat_stage_multiplier(stage);

    if physical {
        if target_ability(battle, user, target) == Ability::MarvelScale
            && defender.status1 != Status1::None
        {
            defense *= 1.5;
        }
        if defender.item == Item::MetalPowder
            && defender.species == Species::Ditto
            && !defender.status2.contains(VolatileConditions::TRANSFORMED)
        {
            defense *= 2.0;
        }
    } else {
        match defender.item {
            Item::DeepSeaScale if defender.species == Species::Clamperl => defense *= 2.0,
            Item::SoulDew if matches!(defender.species, Species::Latias | Species::Latios) => {
                defense *= 1.5
            }
            _ => {}
        }
        if flower_gift_active(battle, target) {
            defense *= 1.5;
        }
        if battle.effective_weather() == Weather::Sandstorm && defender.has_type(PokemonType::Rock) {
            defense *= 1.5;
        }
    }
    defense.floor().max(1.0)
}

/// Move power after ability, volatile and field modifiers.
pub fn base_power(battle: &Battle, user: BattlerId, target: BattlerId, data: &MoveData) -> f64 {
    let attacker = battle.battler(user);
    let defender = battle.battler(target);
    let mut power = f64::from(data.power);

    if attacker.ability == Ability::Technician && data.power <= 60 {
        power *= 1.5;
    }
    let pinch_type = match attacker.ability {
        Ability::Blaze => Some(PokemonType::Fire),
        Ability::Overgrow => Some(PokemonType::Grass),
        Ability::Torrent => Some(PokemonType::Water),
        Ability::Swarm => Some(PokemonType::Bug),
        _ => None,
    };
    if pinch_type == Some(data.move_type) && attacker.hp <= attacker.max_hp / 3 {
        power *= 1.5;
    }
    if attacker.ability == Ability::SandForce
        && battle.effective_weather() == Weather::Sandstorm
        && matches!(
            data.move_type,
            PokemonType::Rock | PokemonType::Ground | PokemonType::Steel
        )
    {
        power *= 1.3;
    }
    if attacker.status2.contains(VolatileConditions::HELPING_HAND) {
        power *= 1.5;
    }
    let doubled = (data.has_flag(MoveFlag::DoubleDamageAirborne)
        && defender.status2.contains(VolatileConditions::AIRBORNE))
        || (data.has_flag(MoveFlag::DoubleDamageUnderground)
            && defender.status2.contains(VolatileConditions::UNDERGROUND))
        || (data.has_flag(MoveFlag::DoubleDamageUnderwater)
            && defender.status2.contains(VolatileConditions::UNDERWATER));
    if doubled {
        power *= 2.0;
    }
    if target_ability(battle, user, target) == Ability::Heatproof && data.move_type == PokemonType::Fire
    {
        power *= 0.5;
    }
    power.floor().max(1.0)
}
