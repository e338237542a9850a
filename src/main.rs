//! Fracture Realms headless runner
//!
//! Runs the simulation under the autopilot at a fixed 60 Hz clock and prints
//! the final snapshot as JSON.
//!
//! Usage: `fracture-realms [config.json] [frames]`

use fracture_realms::sim::{Autopilot, GameState, LogSink, Snapshot, tick};
use fracture_realms::{FrameDriver, FrameHost, GameConfig};

/// Frames simulated when no count is given (one minute of play)
const DEFAULT_FRAMES: u64 = 3600;
const FRAME_SECONDS: f64 = 1.0 / 60.0;

/// Simulation plus autopilot, logging every event
struct HeadlessHost {
    state: GameState,
    pilot: Autopilot,
    sink: LogSink,
}

impl HeadlessHost {
    fn new(config: GameConfig) -> Self {
        Self {
            state: GameState::new(config),
            pilot: Autopilot::new(),
            sink: LogSink,
        }
    }
}

impl FrameHost for HeadlessHost {
    fn update(&mut self, dt: f32) {
        let input = self.pilot.input(&self.state);
        tick(&mut self.state, &input, dt);
        self.state.dispatch_events(Some(&mut self.sink));
    }

    fn draw(&mut self) {
        // Nothing to draw headless; keep an eye on long runs instead
        if self.state.ticks > 0 && self.state.ticks % 600 == 0 {
            log::debug!(
                "t={:.1}s realm={} shards={}",
                self.state.time,
                self.state.realm_name(),
                self.state.shard_count
            );
        }
    }
}

fn parse_args() -> Result<(GameConfig, u64), String> {
    let mut config = GameConfig::default();
    let mut frames = DEFAULT_FRAMES;
    for arg in std::env::args().skip(1) {
        if let Ok(n) = arg.parse::<u64>() {
            frames = n;
        } else {
            config = GameConfig::load(&arg).map_err(|e| e.to_string())?;
        }
    }
    Ok((config, frames))
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fracture Realms (headless) starting...");

    let (config, frames) = match parse_args() {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    let mut host = HeadlessHost::new(config);
    let mut driver = FrameDriver::new();
    for frame in 0..=frames {
        driver.tick(frame as f64 * FRAME_SECONDS, &mut host);
    }

    log::info!(
        "Finished {} ticks in {} ({:?})",
        host.state.ticks,
        host.state.realm_name(),
        host.state.phase
    );
    match Snapshot::capture(&host.state).to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to serialize snapshot: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is embedded by a host page; nothing to run here
}
