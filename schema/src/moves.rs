use crate::PokemonType;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Move {
    // Plain and secondary-effect damage
    Tackle,
    Pound,
    QuickAttack,
    ExtremeSpeed,
    BodySlam,
    DoubleEdge,
    Earthquake,
    RockSlide,
    Surf,
    HydroPump,
    Flamethrower,
    FireFang,
    IceFang,
    ThunderFang,
    IceBeam,
    Blizzard,
    Thunderbolt,
    Thunder,
    Hurricane,
    Psychic,
    ShadowBall,
    SludgeBomb,
    PoisonFang,
    Crunch,
    MudSlap,
    AuroraBeam,
    MistBall,
    SeedFlare,
    IcyWind,
    Superpower,
    CloseCombat,
    Overheat,
    HammerArm,
    VCreate,
    MetalClaw,
    AncientPower,
    SteelWing,
    ChargeBeam,
    FlameCharge,
    Bite,
    FlareBlitz,
    VoltTackle,
    GigaDrain,
    DreamEater,
    Snore,
    BrickBreak,
    SuckerPunch,
    Struggle,
    Explosion,
    Selfdestruct,
    NightSlash,
    StormThrow,
    Gust,
    Scald,
    Waterfall,
    StoneEdge,
    XScissor,
    FlashCannon,
    DragonPulse,
    DarkPulse,
    AirSlash,
    DynamicPunch,
    // Fixed and ratio damage
    SonicBoom,
    DragonRage,
    SeismicToss,
    NightShade,
    Psywave,
    SuperFang,
    Endeavor,
    FinalGambit,
    Fissure,
    SheerCold,
    Guillotine,
    // Status infliction
    WillOWisp,
    ThunderWave,
    Toxic,
    PoisonPowder,
    Spore,
    Hypnosis,
    SleepPowder,
    ConfuseRay,
    Supersonic,
    Attract,
    LeechSeed,
    FocusEnergy,
    MagnetRise,
    PowerTrick,
    Protect,
    Detect,
    Substitute,
    Transform,
    HelpingHand,
    Curse,
    Flatter,
    Swagger,
    // Stat stages
    SwordsDance,
    NastyPlot,
    Harden,
    IronDefense,
    Amnesia,
    Agility,
    DoubleTeam,
    Growl,
    Leer,
    Screech,
    SandAttack,
    StringShot,
    FakeTears,
    Charm,
    Captivate,
    Tickle,
    ShellSmash,
    Growth,
    HoneClaws,
    BulkUp,
    Coil,
    WorkUp,
    DragonDance,
    CosmicPower,
    CalmMind,
    QuiverDance,
    ShiftGear,
    PsychUp,
    Haze,
    // Team and field
    Reflect,
    LightScreen,
    Safeguard,
    LuckyChant,
    Tailwind,
    Spikes,
    ToxicSpikes,
    StealthRock,
    WideGuard,
    TrickRoom,
    // Weather
    RainDance,
    SunnyDay,
    Sandstorm,
    Hail,
    // Specials
    Conversion,
    Soak,
    GastroAcid,
    SimpleBeam,
    PainSplit,
    Moonlight,
    Rest,
    Recover,
    HealPulse,
    Metronome,
    Splash,
    Teleport,
    Whirlwind,
    Roar,
    Dig,
    Dive,
    Fly,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Move::DoubleEdge => "Double-Edge".to_string(),
            Move::WillOWisp => "Will-O-Wisp".to_string(),
            Move::XScissor => "X-Scissor".to_string(),
            Move::VCreate => "V-create".to_string(),
            Move::Selfdestruct => "Selfdestruct".to_string(),
            _ => {
                // Convert CamelCase variants to spaced words
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who a move may be aimed at, relative to its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveTarget {
    /// The user itself.
    User,
    /// Any one battler except the user, including far corners.
    SingleNotSelf,
    /// One adjacent battler, ally or foe.
    SingleSurrounding,
    /// One adjacent foe.
    SingleFoeSurrounding,
    /// One adjacent ally.
    SingleAllySurrounding,
    /// The user or one adjacent ally.
    SelfOrAllySurrounding,
    /// Every adjacent battler, allies included.
    AllSurrounding,
    /// Every adjacent foe.
    AllFoesSurrounding,
    /// The opposing team's side.
    AllFoes,
    /// The user's team's side.
    AllTeam,
    /// The whole field.
    All,
    /// A random adjacent foe.
    RandomFoeSurrounding,
    /// Depends on the user's types (Curse).
    Varies,
}

impl MoveTarget {
    /// Spread targets pay the multi-target damage reduction.
    pub fn is_spread(self) -> bool {
        matches!(self, MoveTarget::AllSurrounding | MoveTarget::AllFoesSurrounding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveFlag {
    MakesContact,
    AffectedByProtect,
    HighCritChance,
    AlwaysCrit,
    DefrostsUser,
    HitsAirborne,
    HitsUnderground,
    HitsUnderwater,
    DoubleDamageAirborne,
    DoubleDamageUnderground,
    DoubleDamageUnderwater,
}

/// Closed catalogue of effect tags. Each move row carries exactly one tag and
/// a numeric parameter whose meaning depends on the tag (secondary-effect
/// chance, stage change, fixed damage, drain percentage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum MoveEffect {
    Attract,
    BrickBreak,
    Burn,
    ChangeTargetAcc,
    ChangeTargetAtk,
    ChangeTargetDef,
    ChangeTargetEva,
    ChangeTargetSpAtk,
    ChangeTargetSpAtkIfAttractionPossible,
    ChangeTargetSpDef,
    ChangeTargetSpe,
    Confuse,
    Conversion,
    Curse,
    Dig,
    Dive,
    Endeavor,
    FinalGambit,
    Flatter,
    Fly,
    FocusEnergy,
    GastroAcid,
    Growth,
    Hail,
    Haze,
    HelpingHand,
    Hit,
    HitMaybeBurn,
    HitMaybeBurnFlinch,
    HitMaybeConfuse,
    HitMaybeFlinch,
    HitMaybeFreeze,
    HitMaybeFreezeFlinch,
    HitMaybeLowerTargetAcc,
    HitMaybeLowerTargetAtk,
    HitMaybeLowerTargetDef,
    HitMaybeLowerTargetSpAtk,
    HitMaybeLowerTargetSpDef,
    HitMaybeLowerTargetSpDefBy2,
    HitMaybeLowerTargetSpe,
    HitMaybeLowerUserAtkDef,
    HitMaybeLowerUserDefSpDef,
    HitMaybeLowerUserSpAtkBy2,
    HitMaybeLowerUserSpe,
    HitMaybeLowerUserSpeDefSpDef,
    HitMaybeParalyze,
    HitMaybeParalyzeFlinch,
    HitMaybePoison,
    HitMaybeRaiseUserAllStats,
    HitMaybeRaiseUserAtk,
    HitMaybeRaiseUserDef,
    HitMaybeRaiseUserSpAtk,
    HitMaybeRaiseUserSpe,
    HitMaybeToxic,
    HpDrain,
    HpDrainRequireSleep,
    LeechSeed,
    LightScreen,
    LowerTargetAtkDef,
    LuckyChant,
    MagnetRise,
    Metronome,
    Moonlight,
    Nothing,
    OneHitKnockout,
    PainSplit,
    Paralyze,
    Poison,
    PowerTrick,
    Protect,
    PsychUp,
    Psywave,
    RainDance,
    RaiseTargetAtkAcc,
    RaiseTargetAtkDef,
    RaiseTargetAtkDefAcc,
    RaiseTargetAtkSpAtk,
    RaiseTargetAtkSpe,
    RaiseTargetDefSpDef,
    RaiseTargetSpAtkSpDef,
    RaiseTargetSpAtkSpDefSpe,
    RaiseTargetSpeBy2AtkBy1,
    Recoil,
    RecoilMaybeBurn,
    RecoilMaybeParalyze,
    Reflect,
    Rest,
    RestoreTargetHp,
    Safeguard,
    Sandstorm,
    SeismicToss,
    Selfdestruct,
    SetDamage,
    ShellSmash,
    SimpleBeam,
    Sleep,
    Snore,
    Soak,
    Spikes,
    StealthRock,
    Struggle,
    Substitute,
    SuckerPunch,
    SunnyDay,
    SuperFang,
    Swagger,
    Tailwind,
    Teleport,
    Toxic,
    ToxicSpikes,
    Transform,
    TrickRoom,
    Whirlwind,
    WideGuard,
}

/// One row of the move table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveData {
    pub id: Move,
    #[serde(rename = "type")]
    pub move_type: PokemonType,
    pub category: MoveCategory,
    pub power: u8,
    /// Zero means the move never misses.
    pub accuracy: u8,
    pub pp: u8,
    #[serde(default)]
    pub priority: i8,
    pub target: MoveTarget,
    pub effect: MoveEffect,
    #[serde(default)]
    pub effect_param: i32,
    #[serde(default)]
    pub flags: Vec<MoveFlag>,
}

impl MoveData {
    pub fn has_flag(&self, flag: MoveFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }
}
