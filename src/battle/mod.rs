pub mod action;
pub mod battler;
pub mod calculators;
pub mod commands;
pub mod conditions;
pub mod engine;
pub mod events;
pub mod move_effects;
pub mod queries;
pub mod rng;
pub mod state;
pub mod stats;
pub mod status;
pub mod team;
pub mod triggers;
pub mod turn_orchestrator;

#[cfg(test)]
pub(crate) mod tests;
