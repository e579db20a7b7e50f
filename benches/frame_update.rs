//! Frame update benchmark: four players steering and boosting around the shell.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use slug_arena::game::collision::ContactSensor;
use slug_arena::game::tick::tick;
use slug_arena::{ArenaState, GameConfig, InputFrame, PlayerNumber, Vec2, FRAME_DT};

fn arena() -> ArenaState {
    let mut arena = ArenaState::new(GameConfig::default(), 42, Vec2::new(400.0, 300.0));
    for i in 1..=4u8 {
        arena.add_player(i, "red", Vec2::new(f32::from(i) * 150.0, 300.0));
    }
    arena
}

fn random_inputs(rng: &mut StdRng, frames: usize) -> Vec<BTreeMap<PlayerNumber, InputFrame>> {
    (0..frames)
        .map(|_| {
            (1..=4u8)
                .map(|number| {
                    let mut input = InputFrame::with_movement(rng.gen_range(-127..=127), rng.gen_range(-127..=127));
                    input.set_boost(rng.gen_bool(0.02));
                    (number, input)
                })
                .collect()
        })
        .collect()
}

fn bench_frame_update(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let inputs = random_inputs(&mut rng, 600);

    c.bench_function("tick_4_players", |b| {
        let mut arena = arena();
        let mut frame = 0;
        b.iter(|| {
            let result = tick(&mut arena, &inputs[frame % inputs.len()], FRAME_DT);
            frame += 1;
            black_box(result)
        })
    });

    c.bench_function("tick_4_players_with_sensor", |b| {
        let mut arena = arena();
        let mut sensor = ContactSensor::default();
        let mut frame = 0;
        b.iter(|| {
            let result = tick(&mut arena, &inputs[frame % inputs.len()], FRAME_DT);
            sensor.step(&mut arena);
            frame += 1;
            black_box((result, arena.take_events()))
        })
    });

    c.bench_function("state_hash", |b| {
        let arena = arena();
        b.iter(|| black_box(arena.compute_hash()))
    });
}

criterion_group!(benches, bench_frame_update);
criterion_main!(benches);
