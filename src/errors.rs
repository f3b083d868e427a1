use crate::battle::state::BattlePhase;
use schema::{Move, Species};
use thiserror::Error;

/// Main error type for the battle engine.
///
/// Every variant is a caller contract violation or a broken input. Rule-level
/// non-effects (a missed move, an immune target) are never errors; they resolve
/// to a `MoveResult` and an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleEngineError {
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    #[error("Battle state error: {0}")]
    State(#[from] BattleStateError),
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors related to the constant data tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("move not found: {0:?}")]
    MoveNotFound(Move),
    #[error("species not found: {0:?}")]
    SpeciesNotFound(Species),
    #[error("malformed data table: {0}")]
    MalformedTable(String),
}

/// Errors related to submitted actions and switches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("team {0} does not exist")]
    InvalidTeam(usize),
    #[error("battler {0} is not active or does not need an action")]
    BattlerNotActing(String),
    #[error("battler {0} received more than one action")]
    DuplicateAction(String),
    #[error("battler {0} is missing an action")]
    MissingAction(String),
    #[error("team {0} already submitted its actions")]
    AlreadySubmitted(usize),
    #[error("{battler} cannot use {move_:?}")]
    UnusableMove { battler: String, move_: Move },
    #[error("invalid targets for {move_:?}")]
    InvalidTargets { move_: Move },
    #[error("party slot {0} cannot be switched in")]
    InvalidSwitch(usize),
    #[error("forced action is not available for {0}")]
    NoForcedAction(String),
    #[error("expected {expected} switch-ins but received {received}")]
    WrongSwitchCount { expected: usize, received: usize },
    #[error("position {0} is not empty")]
    PositionOccupied(String),
}

/// Errors related to calling the engine at the wrong time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    #[error("operation needs phase {expected:?} but the battle is in {actual:?}")]
    WrongPhase {
        expected: BattlePhase,
        actual: BattlePhase,
    },
    #[error("the battle has already ended")]
    BattleEnded,
    #[error("waiting for actions from team {0}")]
    ActionsPending(usize),
    #[error("inconsistent battle state: {0}")]
    Inconsistent(String),
}

/// Errors raised while building a battle from rosters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("team {0} has no battlers")]
    EmptyParty(usize),
    #[error("team {team} has {size} battlers, more than the limit of {max}")]
    PartyTooLarge { team: usize, size: usize, max: usize },
    #[error("{0} has no moves")]
    NoMoves(String),
    #[error("{name} has {count} moves, more than the limit of {max}")]
    TooManyMoves { name: String, count: usize, max: usize },
    #[error("{name} has level {level}, outside 1..={max}")]
    InvalidLevel { name: String, level: u8, max: u8 },
}

/// Replay files are rejected wholesale on any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("file is truncated")]
    Truncated,
    #[error("integrity digest does not match")]
    DigestMismatch,
    #[error("unsupported replay version {0}")]
    UnsupportedVersion(u16),
    #[error("unknown battle format byte {0}")]
    UnknownFormat(u8),
    #[error("event {index} is {size} bytes, over the 65535 byte limit")]
    EventTooLarge { index: usize, size: usize },
    #[error("only ended battles can be saved")]
    BattleNotEnded,
    #[error("could not decode payload: {0}")]
    Decode(String),
    #[error("could not encode payload: {0}")]
    Encode(String),
    #[error("replay is missing its team reveal for team {0}")]
    MissingTeam(usize),
    #[error("{0} trailing bytes after the last event")]
    TrailingBytes(usize),
    #[error("could not access replay file: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("could not parse settings: {0}")]
    Parse(String),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using DataError
pub type DataResult<T> = Result<T, DataError>;
