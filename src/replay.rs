//! Binary replay files.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! u16 version
//! u16 settings length, postcard settings
//! u8  battle format
//! u32 event count
//! per event: u16 length, postcard event
//! 16 bytes: leading half of SHA-256 over everything above
//! ```
//!
//! A file that fails any check is rejected as a whole.

use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::state::{Battle, BattlePhase};
use crate::battle::team::TeamRoster;
use crate::errors::{BattleResult, ReplayError};
use crate::settings::BattleSettings;
use schema::BattleFormat;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

pub const REPLAY_VERSION: u16 = 1;
const DIGEST_LEN: usize = 16;

fn digest(body: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(body);
    let full = hasher.finalize();
    let mut short = [0u8; DIGEST_LEN];
    short.copy_from_slice(&full[..DIGEST_LEN]);
    short
}

/// Serializes an ended battle.
pub fn encode_replay(battle: &Battle) -> BattleResult<Vec<u8>> {
    if !battle.is_ended() {
        return Err(ReplayError::BattleNotEnded.into());
    }
    let settings = battle
        .settings
        .to_bytes()
        .map_err(|err| ReplayError::Encode(err.to_string()))?;
    let settings_len = u16::try_from(settings.len()).map_err(|_| ReplayError::Encode("settings too large".to_string()))?;
    let events = battle.events.events();
    let count = u32::try_from(events.len()).map_err(|_| ReplayError::Encode("too many events".to_string()))?;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&REPLAY_VERSION.to_le_bytes());
    bytes.extend_from_slice(&settings_len.to_le_bytes());
    bytes.extend_from_slice(&settings);
    bytes.push(battle.format.to_byte());
    bytes.extend_from_slice(&count.to_le_bytes());
    for (index, event) in events.iter().enumerate() {
        let payload = postcard::to_allocvec(event).map_err(|err| ReplayError::Encode(err.to_string()))?;
        let len = u16::try_from(payload.len()).map_err(|_| ReplayError::EventTooLarge {
            index,
            size: payload.len(),
        })?;
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&payload);
    }
    let digest = digest(&bytes);
    bytes.extend_from_slice(&digest);
    debug!(events = events.len(), size = bytes.len(), "replay encoded");
    Ok(bytes)
}

/// Reads a replay back into an ended battle.
pub fn decode_replay(bytes: &[u8]) -> BattleResult<Battle> {
    if bytes.len() < DIGEST_LEN {
        return Err(ReplayError::Truncated.into());
    }
    let (body, stored) = bytes.split_at(bytes.len() - DIGEST_LEN);
    if digest(body).as_slice() != stored {
        return Err(ReplayError::DigestMismatch.into());
    }

    let mut reader = ReplayReader::new(body);
    let version = reader.read_u16()?;
    if version != REPLAY_VERSION {
        return Err(ReplayError::UnsupportedVersion(version).into());
    }
    let settings_len = usize::from(reader.read_u16()?);
    let settings = BattleSettings::from_bytes(reader.take(settings_len)?)
        .map_err(|err| ReplayError::Decode(err.to_string()))?;
    let format_byte = reader.read_u8()?;
    let format = BattleFormat::from_byte(format_byte).ok_or(ReplayError::UnknownFormat(format_byte))?;
    let count = reader.read_u32()?;

    let mut events = Vec::new();
    for _ in 0..count {
        let len = usize::from(reader.read_u16()?);
        let event: BattleEvent =
            postcard::from_bytes(reader.take(len)?).map_err(|err| ReplayError::Decode(err.to_string()))?;
        events.push(event);
    }
    if reader.remaining() > 0 {
        return Err(ReplayError::TrailingBytes(reader.remaining()).into());
    }

    rebuild(format, settings, events)
}

/// Rebuilds the parties from the reveal events and ends the battle at its
/// recorded winner.
fn rebuild(format: BattleFormat, settings: BattleSettings, events: Vec<BattleEvent>) -> BattleResult<Battle> {
    let roster = |team: usize| -> Result<TeamRoster, ReplayError> {
        events
            .iter()
            .find_map(|event| match event {
                BattleEvent::TeamRevealed {
                    team: revealed,
                    trainer_name,
                    party,
                } if *revealed == team => Some(TeamRoster::new(trainer_name, party.clone())),
                _ => None,
            })
            .ok_or(ReplayError::MissingTeam(team))
    };
    let first = roster(0)?;
    let second = roster(1)?;

    let mut battle = Battle::new(format, &first, &second, settings)?;
    battle.winner = events.iter().rev().find_map(|event| match event {
        BattleEvent::Winner { team } => Some(*team),
        _ => None,
    });
    battle.turn = events
        .iter()
        .filter_map(|event| match event {
            BattleEvent::TurnBegan { turn } => Some(*turn),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    battle.phase = BattlePhase::Ended;
    battle.events = EventBus::from_events(events);
    Ok(battle)
}

pub fn save_replay(battle: &Battle, path: impl AsRef<Path>) -> BattleResult<()> {
    let bytes = encode_replay(battle)?;
    std::fs::write(path, bytes).map_err(|err| ReplayError::Io(err.to_string()))?;
    Ok(())
}

pub fn load_replay(path: impl AsRef<Path>) -> BattleResult<Battle> {
    let bytes = std::fs::read(path).map_err(|err| ReplayError::Io(err.to_string()))?;
    decode_replay(&bytes)
}

struct ReplayReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ReplayReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ReplayError> {
        if self.remaining() < len {
            return Err(ReplayError::Truncated);
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, ReplayError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, ReplayError> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2)?);
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32, ReplayError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::action::{Action, TargetMask};
    use crate::battle::battler::{BattlerId, RosterEntry};
    use crate::battle::rng::BattleRng;
    use crate::errors::BattleEngineError;
    use pretty_assertions::assert_eq;
    use schema::{FieldPosition, Move, Species};

    fn finished_battle() -> Battle {
        let first = TeamRoster::new(
            "Red",
            vec![RosterEntry::new(Species::Machamp, 100, vec![Move::CloseCombat])],
        );
        let second = TeamRoster::new(
            "Blue",
            vec![RosterEntry::new(Species::Pikachu, 5, vec![Move::Splash])],
        );
        let mut battle =
            Battle::new(BattleFormat::Single, &first, &second, BattleSettings::default()).expect("valid rosters");
        battle.begin().expect("battle begins");
        battle
            .submit_actions(
                0,
                vec![(
                    BattlerId::new(0, 0),
                    Action::Fight {
                        move_: Move::CloseCombat,
                        targets: TargetMask::foe(FieldPosition::Center),
                    },
                )],
            )
            .expect("legal action");
        battle
            .submit_actions(
                1,
                vec![(
                    BattlerId::new(1, 0),
                    Action::Fight {
                        move_: Move::Splash,
                        targets: TargetMask::ally(FieldPosition::Center),
                    },
                )],
            )
            .expect("legal action");
        battle
            .run_turn(&mut BattleRng::new_for_test(vec![50; 100]))
            .expect("turn resolves");
        assert!(battle.is_ended());
        battle
    }

    fn replay_error(result: BattleResult<Battle>) -> ReplayError {
        match result {
            Err(BattleEngineError::Replay(err)) => err,
            Err(other) => panic!("expected a replay error, got {}", other),
            Ok(_) => panic!("expected a replay error, got a battle"),
        }
    }

    #[test]
    fn round_trip_keeps_winner_and_log() {
        let battle = finished_battle();
        let bytes = encode_replay(&battle).expect("encode");
        let loaded = decode_replay(&bytes).expect("decode");
        assert_eq!(loaded.winner, Some(0));
        assert_eq!(loaded.turn, 1);
        assert_eq!(loaded.phase(), BattlePhase::Ended);
        assert_eq!(loaded.events.events(), battle.events.events());
        assert_eq!(loaded.teams[1].trainer_name, "Blue");
    }

    #[test]
    fn unfinished_battle_cannot_be_saved() {
        let mut battle = finished_battle();
        battle.phase = BattlePhase::WaitingForActions;
        assert_eq!(
            encode_replay(&battle),
            Err(BattleEngineError::Replay(ReplayError::BattleNotEnded))
        );
    }

    #[test]
    fn any_flipped_byte_is_rejected() {
        let mut bytes = encode_replay(&finished_battle()).expect("encode");
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0xFF;
        assert_eq!(replay_error(decode_replay(&bytes)), ReplayError::DigestMismatch);
    }

    #[test]
    fn short_file_is_truncated() {
        assert_eq!(replay_error(decode_replay(&[1, 0, 3])), ReplayError::Truncated);
    }

    #[test]
    fn unknown_version_is_rejected_even_with_a_valid_digest() {
        let bytes = encode_replay(&finished_battle()).expect("encode");
        let mut body = bytes[..bytes.len() - DIGEST_LEN].to_vec();
        body[0] = 9;
        let digest = digest(&body);
        body.extend_from_slice(&digest);
        assert_eq!(replay_error(decode_replay(&body)), ReplayError::UnsupportedVersion(9));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let bytes = encode_replay(&finished_battle()).expect("encode");
        let mut body = bytes[..bytes.len() - DIGEST_LEN].to_vec();
        body.extend_from_slice(&[0, 0]);
        let digest = digest(&body);
        body.extend_from_slice(&digest);
        assert_eq!(replay_error(decode_replay(&body)), ReplayError::TrailingBytes(2));
    }
}
