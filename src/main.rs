//! Cube Chain entry point
//!
//! Headless demo: runs the deterministic sim with a scripted wandering
//! input and logs a snapshot every simulated second. Rendering and input
//! devices are external collaborators; this binary exercises the core loop.

use glam::Vec3;

use cube_chain::consts::{MAX_SUBSTEPS, SIM_DT};
use cube_chain::sim::{GameState, TickInput, tick};
use cube_chain::tuning::Tuning;

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0DE_CAFE);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json),
            Err(err) => {
                log::warn!("could not read tuning file {path}: {err}");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    log::info!("starting run with seed {seed:#x}");
    let mut state = GameState::new(seed, tuning);

    // Scripted input: cycle the cardinal directions every two seconds,
    // boosting on every other leg
    let headings = [Vec3::Z, Vec3::X, Vec3::NEG_Z, Vec3::NEG_X];
    let ticks_per_leg = (2.0 / SIM_DT) as u64;
    let ticks_per_second = (1.0 / SIM_DT) as u64;
    let total_ticks = 60 * ticks_per_second;

    // Fixed-step accumulator fed 30 Hz frames, substeps clamped to avoid
    // a spiral of death on a slow frame
    let frame_dt = 1.0 / 30.0;
    let mut accumulator = 0.0f32;

    while state.time_ticks < total_ticks {
        accumulator += frame_dt;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let leg = (state.time_ticks / ticks_per_leg) as usize;
            let input = TickInput {
                direction: Some(headings[leg % headings.len()]),
                boost: leg % 2 == 1,
            };
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            if state.time_ticks % ticks_per_second == 0 {
                log::info!(
                    "t={:>3}s player={} tail={} cubes={} pos={:?}",
                    state.time_ticks / ticks_per_second,
                    state.player.value(),
                    state.tail.len(),
                    state.cubes.len(),
                    state.camera_target(),
                );
            }
        }
    }

    println!(
        "seed {seed:#x}: player value {} with {} tail cubes after {} ticks",
        state.player.value(),
        state.tail.len(),
        state.time_ticks,
    );
}
