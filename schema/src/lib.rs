// Battle engine schema - shared type definitions
// This crate holds the static enums and data-row types that the engine reads
// from its constant tables. Nothing here carries runtime battle state.

pub use abilities::*;
pub use battle_data::*;
pub use items::*;
pub use moves::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod abilities;
pub mod battle_data;
pub mod items;
pub mod moves;
pub mod pokemon_types;
pub mod species_data;
