//! Slug Arena demo round
//!
//! Runs a scripted four-player round through the simulation, logging form
//! changes and shell ownership, then replays the recorded inputs and
//! compares state hashes.
//!
//! Usage: `slug-arena [path/to/character_settings.json]`

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use slug_arena::{
    ArenaState, GameConfig, PlayerNumber, Vec2, FRAME_DT, FRAME_RATE, ROUND_DURATION_FRAMES, VERSION,
    core::rng::derive_round_seed,
    game::{
        collision::ContactSensor,
        events::GameEventData,
        input::{InputFrame, InputRecording},
        tick::{replay, tick},
    },
};

/// Identifier of the demo round
const DEMO_ROUND_ID: [u8; 16] = [1; 16];

/// Team colors by pad slot
const COLORS: [&str; 4] = ["red", "blue", "green", "yellow"];

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("Slug Arena v{}", VERSION);
    info!("Frame Rate: {} Hz", FRAME_RATE);

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading config from {path}"))?,
        None => GameConfig::default(),
    };
    config.validate().context("invalid config")?;

    demo_round(config);
    Ok(())
}

/// Scripted stick input for one player on one frame.
fn scripted_input(number: PlayerNumber, frame: u32) -> InputFrame {
    let angle = ((frame * (u32::from(number) + 1) * 3) % 360) as f32;
    let radians = angle.to_radians();
    let mut input = InputFrame::with_movement(
        (radians.cos() * 127.0) as i8,
        (radians.sin() * 127.0) as i8,
    );
    input.set_boost(frame % (90 + u32::from(number) * 15) == 0);
    input
}

/// Fresh arena with four players around the shell.
fn new_arena(config: &GameConfig, seed: u64) -> ArenaState {
    let mut arena = ArenaState::new(config.clone(), seed, Vec2::new(400.0, 300.0));
    for (i, color) in COLORS.iter().enumerate() {
        let number = i as PlayerNumber + 1;
        let angle = (i as f32 * 90.0).to_radians();
        let position = Vec2::new(400.0, 300.0) + Vec2::RIGHT.rotate(angle) * 150.0;
        arena.add_player(number, *color, position);
        info!("Added player {} ({}) at {}", number, color, position);
    }
    arena
}

/// Run the demo round and verify it by replay.
fn demo_round(config: GameConfig) {
    info!("=== Starting Demo Round ===");
    let numbers: Vec<PlayerNumber> = (1..=COLORS.len() as PlayerNumber).collect();
    let seed = derive_round_seed(&DEMO_ROUND_ID, &numbers);
    info!("Round ID: {}", hex::encode(DEMO_ROUND_ID));
    info!("RNG Seed: {}", seed);

    let initial = new_arena(&config, seed);
    let mut arena = initial.clone();
    let mut sensor = ContactSensor::default();

    let mut recordings: BTreeMap<PlayerNumber, InputRecording> = arena
        .players
        .keys()
        .map(|&number| (number, InputRecording::new(number)))
        .collect();

    let mut total_events = 0;
    info!("Running {} frames...", ROUND_DURATION_FRAMES);

    for _ in 0..ROUND_DURATION_FRAMES {
        let frame = arena.frame + 1;
        let mut inputs = BTreeMap::new();
        for (&number, recording) in recordings.iter_mut() {
            let input = scripted_input(number, frame);
            recording.record(frame, input);
            inputs.insert(number, input);
        }

        let mut events = tick(&mut arena, &inputs, FRAME_DT).events;
        sensor.step(&mut arena);
        events.extend(arena.take_events());
        total_events += events.len();

        for event in &events {
            match &event.data {
                GameEventData::FormChanged { player, new_form, .. } => {
                    info!("Frame {}: player {} is now {}", event.frame, player, new_form);
                }
                GameEventData::PickupAcquired { player, .. } => {
                    info!("Frame {}: player {} picked up the shell", event.frame, player);
                }
                GameEventData::PickupDropped { player, position, .. } => {
                    info!("Frame {}: player {} dropped the shell at {}", event.frame, player, position);
                }
                _ => {}
            }
        }

        if arena.frame % (FRAME_RATE * 10) == 0 {
            let holder = arena.pickup.holder().map_or("nobody".to_string(), |n| n.to_string());
            info!("Frame {}: shell held by {}, {} events so far", arena.frame, holder, total_events);
        }
    }

    arena.halt_all();

    info!("=== Round Results ===");
    let hash = arena.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    for slug in arena.players.values() {
        info!(
            "Player {} ({}): {} with {:.0}/{:.0} HP at {}",
            slug.player_number, slug.color, slug.form, slug.hp, slug.max_hp, slug.position()
        );
    }
    info!("Total events: {}", total_events);

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (mut replayed, _) = replay(
        initial,
        &recordings,
        ROUND_DURATION_FRAMES,
        FRAME_DT,
        Some(ContactSensor::default()),
    );
    replayed.halt_all();
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }
}
