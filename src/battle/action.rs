use crate::battle::battler::BattlerId;
use crate::battle::conditions::FieldConditions;
use crate::battle::rng::BattleRng;
use crate::battle::state::Battle;
use crate::battle::stats::effective_speed;
use crate::move_data::get_move_data;
use bitflags::bitflags;
use ordered_float::OrderedFloat;
use schema::{FieldPosition, Move};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

bitflags! {
    /// Field positions a move is aimed at, relative to the user's side.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TargetMask: u8 {
        const ALLY_LEFT = 1 << 0;
        const ALLY_CENTER = 1 << 1;
        const ALLY_RIGHT = 1 << 2;
        const FOE_LEFT = 1 << 3;
        const FOE_CENTER = 1 << 4;
        const FOE_RIGHT = 1 << 5;
    }
}

impl TargetMask {
    pub fn ally(position: FieldPosition) -> TargetMask {
        match position {
            FieldPosition::Left => TargetMask::ALLY_LEFT,
            FieldPosition::Center => TargetMask::ALLY_CENTER,
            FieldPosition::Right => TargetMask::ALLY_RIGHT,
            FieldPosition::None => TargetMask::empty(),
        }
    }

    pub fn foe(position: FieldPosition) -> TargetMask {
        match position {
            FieldPosition::Left => TargetMask::FOE_LEFT,
            FieldPosition::Center => TargetMask::FOE_CENTER,
            FieldPosition::Right => TargetMask::FOE_RIGHT,
            FieldPosition::None => TargetMask::empty(),
        }
    }

    /// (is_foe, position) for every bit set, foes first.
    pub fn positions(self) -> Vec<(bool, FieldPosition)> {
        let order = [
            (TargetMask::FOE_LEFT, true, FieldPosition::Left),
            (TargetMask::FOE_CENTER, true, FieldPosition::Center),
            (TargetMask::FOE_RIGHT, true, FieldPosition::Right),
            (TargetMask::ALLY_LEFT, false, FieldPosition::Left),
            (TargetMask::ALLY_CENTER, false, FieldPosition::Center),
            (TargetMask::ALLY_RIGHT, false, FieldPosition::Right),
        ];
        order
            .iter()
            .filter(|(bit, _, _)| self.contains(*bit))
            .map(|(_, is_foe, position)| (*is_foe, *position))
            .collect()
    }
}

/// A trainer's decision for one active battler.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fight { move_: Move, targets: TargetMask },
    Switch { party_slot: usize },
    /// Accept the only option the engine allows: finishing a charge move, or
    /// Struggle when no move has PP left.
    Forced,
}

/// A replacement sent into an empty position.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchIn {
    pub party_slot: usize,
    pub position: FieldPosition,
}

#[derive(Debug, Clone, Copy)]
struct ActionPriority {
    action_priority: i8, // Switch: 1, Move: 0
    move_priority: i8,   // Only relevant for moves
    speed: OrderedFloat<f64>,
}

/// The move a battler's submitted action will actually execute.
pub(crate) fn resolved_move(battle: &Battle, id: BattlerId) -> Option<Move> {
    let battler = battle.battler(id);
    match battler.selected_action? {
        Action::Fight { move_, .. } => Some(move_),
        Action::Switch { .. } => None,
        Action::Forced => Some(
            battler
                .temp_locked_move
                .map(|lock| lock.move_)
                .unwrap_or(Move::Struggle),
        ),
    }
}

fn calculate_action_priority(battle: &Battle, id: BattlerId) -> ActionPriority {
    let speed = OrderedFloat(effective_speed(battle, id));
    match battle.battler(id).selected_action {
        Some(Action::Switch { .. }) => ActionPriority {
            action_priority: 1,
            move_priority: 0,
            speed,
        },
        _ => {
            let move_priority = resolved_move(battle, id)
                .and_then(|move_| get_move_data(move_).ok())
                .map(|data| data.priority)
                .unwrap_or(0);
            ActionPriority {
                action_priority: 0,
                move_priority,
                speed,
            }
        }
    }
}

/// Orders every battler with a submitted action. Ties on priority and
/// effective speed are broken by a uniform shuffle of each tied group.
pub(crate) fn determine_acting_order(battle: &Battle, rng: &mut BattleRng) -> Vec<BattlerId> {
    let trick_room = battle.field_conditions.contains(FieldConditions::TRICK_ROOM);
    let mut entries: Vec<(BattlerId, ActionPriority)> = battle
        .active_battlers()
        .into_iter()
        .filter(|id| battle.battler(*id).selected_action.is_some())
        .map(|id| (id, calculate_action_priority(battle, id)))
        .collect();

    let compare = |a: &ActionPriority, b: &ActionPriority| -> Ordering {
        let priority_cmp = b.action_priority.cmp(&a.action_priority);
        if priority_cmp != Ordering::Equal {
            return priority_cmp;
        }
        let move_priority_cmp = b.move_priority.cmp(&a.move_priority);
        if move_priority_cmp != Ordering::Equal {
            return move_priority_cmp;
        }
        // Trick Room reverses speed among moves only.
        if trick_room && a.action_priority == 0 {
            a.speed.cmp(&b.speed)
        } else {
            b.speed.cmp(&a.speed)
        }
    };
    entries.sort_by(|a, b| compare(&a.1, &b.1));

    let mut order = Vec::with_capacity(entries.len());
    let mut start = 0;
    while start < entries.len() {
        let mut end = start + 1;
        while end < entries.len() && compare(&entries[start].1, &entries[end].1) == Ordering::Equal {
            end += 1;
        }
        let mut group: Vec<BattlerId> = entries[start..end].iter().map(|(id, _)| *id).collect();
        rng.shuffle(&mut group, "speed tie");
        order.extend(group);
        start = end;
    }
    order
}
