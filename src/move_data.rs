use crate::errors::{DataError, DataResult};
use schema::{Move, MoveData};
use std::collections::HashMap;
use std::sync::LazyLock;

// Global move table - parsed once on first access from the embedded RON file.
static MOVE_TABLE: LazyLock<DataResult<HashMap<Move, MoveData>>> =
    LazyLock::new(|| load_move_table(include_str!("../data/moves.ron")));

/// Parse a move table from RON. Duplicate rows are rejected.
pub fn load_move_table(source: &str) -> DataResult<HashMap<Move, MoveData>> {
    let rows: Vec<MoveData> =
        ron::from_str(source).map_err(|err| DataError::MalformedTable(err.to_string()))?;
    let mut table = HashMap::with_capacity(rows.len());
    for row in rows {
        let id = row.id;
        if table.insert(id, row).is_some() {
            return Err(DataError::MalformedTable(format!("duplicate move row {:?}", id)));
        }
    }
    Ok(table)
}

/// Get move data for a specific move from the global table
pub fn get_move_data(move_: Move) -> DataResult<&'static MoveData> {
    let table = MOVE_TABLE.as_ref().map_err(Clone::clone)?;
    table.get(&move_).ok_or(DataError::MoveNotFound(move_))
}

/// Moves Metronome may call. Excludes moves that would recurse or that only
/// make sense when chosen deliberately.
pub fn metronome_candidates() -> DataResult<Vec<Move>> {
    let table = MOVE_TABLE.as_ref().map_err(Clone::clone)?;
    let mut moves: Vec<Move> = table
        .keys()
        .copied()
        .filter(|move_| {
            !matches!(
                move_,
                Move::Metronome
                    | Move::Struggle
                    | Move::Protect
                    | Move::Detect
                    | Move::Transform
                    | Move::HelpingHand
                    | Move::Snore
                    | Move::SuckerPunch
            )
        })
        .collect();
    // HashMap order is unstable; sort so the random pick is reproducible.
    moves.sort_by_key(|move_| *move_ as u16);
    Ok(moves)
}
