mod config;
mod scenario;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use deft::{Capsule, CharacterBody, LedgeCourse, SimulationLoop, SimulationState};

use config::SimConfig;
use scenario::Scenario;

#[derive(Parser)]
#[command(name = "deft-sim")]
#[command(about = "Headless aerial movement scenarios")]
struct Args {
    #[arg(value_enum, default_value_t = Scenario::Jump)]
    scenario: Scenario,

    #[arg(short, long, default_value_t = 60)]
    tick_rate: u32,

    #[arg(long, default_value_t = 144, help = "Frames per second feeding the fixed timestep")]
    frame_rate: u32,

    #[arg(short, long, default_value_t = 3.0, help = "Simulated seconds")]
    duration: f32,

    #[arg(short, long, help = "TOML tuning file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Print every recorded movement event")]
    events: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = SimConfig::load(args.config.as_deref())?;
    args.scenario.configure(&mut config.movement);
    let script = config
        .custom_script(args.tick_rate)
        .unwrap_or_else(|| args.scenario.script(args.tick_rate));

    let capsule = Capsule::from(config.capsule);
    let course = LedgeCourse::new(capsule);
    let lane = course
        .lane(args.scenario.lane())
        .with_context(|| format!("Course has no lane {}", args.scenario.lane()))?;

    let state = SimulationState::new(config.movement, &course, lane.spawn, capsule, args.tick_rate)?;
    let mut sim = SimulationLoop::new(state, script);

    log::info!(
        "Running {:?} on lane {} for {:.2}s at {} Hz",
        args.scenario,
        lane.name,
        args.duration,
        args.tick_rate
    );

    let frame_dt = 1.0 / args.frame_rate.max(1) as f32;
    let frames = (args.duration.max(0.0) / frame_dt).ceil() as u32;
    for _ in 0..frames {
        sim.update(frame_dt);
    }

    report(&sim, args.events);
    Ok(())
}

fn report(sim: &SimulationLoop, print_events: bool) {
    let state = sim.state();
    let events = state.events.borrow();

    if print_events {
        for recorded in events.iter() {
            log::info!("[{:>5}] {:?}", recorded.tick, recorded.event);
        }
    }

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for recorded in events.iter() {
        *counts.entry(recorded.event.name()).or_default() += 1;
    }
    if events.is_empty() {
        log::warn!("No movement events recorded");
    }
    for (name, count) in &counts {
        log::info!("{:<22} {}", name, count);
    }
    log::info!("{:<22} {}", "total", events.len());

    if let (Some(first), Some(peak)) = (sim.samples().first(), sim.peak_height()) {
        log::info!("Peak height: {:.1}", peak - first.position.z);
    }

    let position = state.body.position();
    log::info!(
        "Finished after {} ticks in {:?} at ({:.1}, {:.1}, {:.1}), {} jumps used",
        state.tick(),
        state.controller.mode(),
        position.x,
        position.y,
        position.z,
        state.controller.state().jump_count
    );
}
