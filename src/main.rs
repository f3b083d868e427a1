//! Plays two prefab teams against each other with seeded random choices and
//! writes the replay next to the working directory.
//!
//! ```text
//! pokemon-battle-engine [first_team] [second_team] [seed]
//! RUST_LOG=pokemon_battle_engine=debug pokemon-battle-engine rain_team sand_team 7
//! ```

use pokemon_battle_engine::battle::action::{Action, SwitchIn};
use pokemon_battle_engine::battle::battler::BattlerId;
use pokemon_battle_engine::battle::events::{BattleEvent, ChannelRelay};
use pokemon_battle_engine::battle::rng::BattleRng;
use pokemon_battle_engine::battle::state::{Battle, BattlePhase};
use pokemon_battle_engine::prefab_teams::{get_prefab_team, get_prefab_teams};
use pokemon_battle_engine::replay::{load_replay, save_replay};
use pokemon_battle_engine::settings::BattleSettings;
use pokemon_battle_engine::BattleResult;
use schema::BattleFormat;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TURN_LIMIT: u32 = 300;
const REPLAY_PATH: &str = "last_battle.replay";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let first_id = args.next().unwrap_or_else(|| "classic_team".to_string());
    let second_id = args.next().unwrap_or_else(|| "sand_team".to_string());
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 1,
    };

    let (Some(first), Some(second)) = (get_prefab_team(&first_id), get_prefab_team(&second_id)) else {
        let known: Vec<String> = get_prefab_teams().into_iter().map(|team| team.id).collect();
        eprintln!("unknown team id, choose from: {}", known.join(", "));
        return Ok(());
    };

    let mut battle = Battle::new(
        BattleFormat::Double,
        &first.to_roster("Red"),
        &second.to_roster("Blue"),
        BattleSettings::default(),
    )?;
    let (sender, receiver) = unbounded_channel();
    battle.events.subscribe(ChannelRelay::new(sender));
    info!(first = %first.name, second = %second.name, seed, "starting battle");

    let printer = tokio::spawn(print_events(receiver));
    play(&mut battle, seed)?;

    let winner = battle
        .winner
        .map(|team| battle.teams[team].trainer_name.clone())
        .unwrap_or_else(|| "nobody".to_string());
    info!(turns = battle.turn, %winner, "battle finished");

    if battle.is_ended() {
        save_replay(&battle, REPLAY_PATH)?;
        let reloaded = load_replay(REPLAY_PATH)?;
        info!(path = REPLAY_PATH, events = reloaded.events.len(), "replay saved and verified");
    } else {
        warn!(limit = TURN_LIMIT, "turn limit reached, replay not saved");
    }

    // Dropping the battle closes the relay so the printer can finish.
    drop(battle);
    printer.await?;
    Ok(())
}

/// Drives the battle until it ends or the turn limit is reached.
fn play(battle: &mut Battle, seed: u64) -> BattleResult<()> {
    let mut rng = BattleRng::from_seed(seed);
    let mut chooser = BattleRng::from_seed(seed.wrapping_add(1));
    battle.begin()?;

    while battle.turn < TURN_LIMIT {
        match battle.phase() {
            BattlePhase::WaitingForActions => {
                for team in 0..2 {
                    let actions = choose_actions(battle, team, &mut chooser)?;
                    battle.submit_actions(team, actions)?;
                }
                battle.run_turn(&mut rng)?;
            }
            BattlePhase::WaitingForSwitchIns => {
                for team in 0..2 {
                    let switches = choose_switches(battle, team);
                    if !switches.is_empty() {
                        battle.submit_switches(team, switches)?;
                    }
                }
                battle.run_switches()?;
            }
            BattlePhase::Ended | BattlePhase::ReadyToBegin => break,
        }
    }
    Ok(())
}

/// Picks a random legal move for each active battler, switching only when no
/// move is available.
fn choose_actions(
    battle: &Battle,
    team: usize,
    chooser: &mut BattleRng,
) -> BattleResult<Vec<(BattlerId, Action)>> {
    let mut chosen = Vec::new();
    let mut claimed_slots = Vec::new();
    for id in battle.teams[team].active_battlers() {
        let legal = battle.legal_actions(id)?;
        let fights: Vec<Action> = legal
            .iter()
            .copied()
            .filter(|action| !matches!(action, Action::Switch { .. }))
            .collect();
        let action = if fights.is_empty() {
            legal
                .iter()
                .copied()
                .find(|action| match action {
                    Action::Switch { party_slot } => !claimed_slots.contains(party_slot),
                    _ => true,
                })
                .unwrap_or(Action::Forced)
        } else {
            fights[chooser.random_index(fights.len(), "demo move choice")]
        };
        if let Action::Switch { party_slot } = action {
            claimed_slots.push(party_slot);
        }
        chosen.push((id, action));
    }
    Ok(chosen)
}

/// Fills empty positions with reserves in party order.
fn choose_switches(battle: &Battle, team: usize) -> Vec<SwitchIn> {
    let open = battle
        .format
        .positions()
        .iter()
        .copied()
        .filter(|&position| battle.battler_at(team, position).is_none());
    open.zip(battle.legal_switches(team))
        .take(battle.switch_ins_required(team))
        .map(|(position, party_slot)| SwitchIn { party_slot, position })
        .collect()
}

async fn print_events(mut receiver: UnboundedReceiver<BattleEvent>) {
    while let Some(event) = receiver.recv().await {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{}", line),
            Err(err) => warn!(%err, "could not serialize event"),
        }
    }
}
