//! Pokemon Battle Engine
//!
//! A deterministic, turn-based battle resolver for singles, doubles and
//! triples. Callers submit every trainer's choices, the engine resolves the
//! turn against a seedable RNG, and everything that happened is appended to an
//! event log that can be saved as a tamper-evident replay.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod errors;
pub mod move_data;
pub mod prefab_teams;
pub mod replay;
pub mod settings;
pub mod species;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    Ability, BattleFormat, FieldPosition, Gender, Item, Move, MoveCategory, MoveData, MoveTarget,
    PokemonType, Species, SpeciesData, Stat, Status1, Weather,
};

// --- From this crate's modules (`src/`) ---

// Battle aggregate and the actions trainers submit.
pub use battle::action::{Action, SwitchIn, TargetMask};
pub use battle::battler::{BattlerId, RosterEntry};
pub use battle::events::{BattleEvent, ChannelRelay, EventBus, EventSubscriber, TracingSubscriber};
pub use battle::rng::BattleRng;
pub use battle::state::{Battle, BattlePhase};
pub use battle::team::TeamRoster;

// Primary data access functions.
pub use move_data::get_move_data;
pub use species::get_species_data;

pub use replay::{decode_replay, encode_replay, load_replay, save_replay};
pub use settings::BattleSettings;

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, DataError, DataResult, ReplayError,
    RosterError, SettingsError,
};
