use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};

use super::{InputAction, InputScript};
use crate::body::{Capsule, CharacterBody, SpatialQuery};
use crate::config::MovementConfig;
use crate::controller::{MovementController, MovementError};
use crate::event::EventLog;
use crate::locks::InputLocks;
use crate::map::LedgeCourse;
use crate::mode::ModeKind;
use crate::physics::{KinematicBody, PhysicsWorld};

pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            dt: 1.0 / tick_rate as f32,
            accumulator: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta.min(0.25);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }
}

/// Per-tick sample of the simulated character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    pub tick: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub mode: ModeKind,
    pub gravity_scale: f32,
}

pub struct SimulationState {
    pub physics: PhysicsWorld,
    pub body: KinematicBody,
    pub controller: MovementController,
    pub events: Rc<RefCell<EventLog>>,
    pub timestep: FixedTimestep,
    move_input: Vec2,
    tick: u32,
}

impl SimulationState {
    /// Spawns the course and a character standing at `spawn`.
    pub fn new(
        config: MovementConfig,
        course: &LedgeCourse,
        spawn: Vec3,
        capsule: Capsule,
        tick_rate: u32,
    ) -> Result<Self, MovementError> {
        let timestep = FixedTimestep::new(tick_rate);
        let mut physics = PhysicsWorld::new(timestep.dt());
        course.spawn(&mut physics);
        physics.step();

        let body = KinematicBody::spawn(&mut physics, spawn, capsule);
        let events = EventLog::shared(4096);
        let controller = MovementController::with_observer(
            config,
            &body,
            InputLocks::shared(),
            Box::new(events.clone()),
        )?;

        Ok(Self {
            physics,
            body,
            controller,
            events,
            timestep,
            move_input: Vec2::ZERO,
            tick: 0,
        })
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn apply(&mut self, action: InputAction) {
        log::trace!("tick {}: {:?}", self.tick, action);
        match action {
            InputAction::PressJump => self.controller.on_jump_pressed(&mut self.body),
            InputAction::ReleaseJump => self.controller.on_jump_released(&mut self.body),
            InputAction::AirDash => self.controller.on_air_dash_requested(&mut self.body),
            InputAction::Move { x, y } => self.move_input = Vec2::new(x, y),
            InputAction::Face { x, y } => self.body.set_forward(Vec3::new(x, y, 0.0)),
        }
    }

    /// One fixed step: movement logic, then integration, then the world.
    pub fn step(&mut self) -> TickSample {
        let dt = self.timestep.dt();
        {
            let queries = self.physics.queries_for(self.body.handle());
            self.controller
                .tick(&mut self.body, Some(&queries as &dyn SpatialQuery), dt);
        }

        let walk = self.controller.locks().borrow().filter_move_input(self.move_input);
        self.body.set_walk_input(walk);
        self.body.step(&mut self.physics, dt);
        self.physics.step();
        self.tick += 1;

        TickSample {
            tick: self.tick,
            position: self.body.position(),
            velocity: self.body.velocity(),
            mode: self.controller.mode(),
            gravity_scale: self.body.gravity_scale(),
        }
    }
}

/// Replays an input script against a simulation, one fixed step at a time.
pub struct SimulationLoop {
    state: SimulationState,
    script: InputScript,
    samples: Vec<TickSample>,
}

impl SimulationLoop {
    pub fn new(state: SimulationState, script: InputScript) -> Self {
        Self {
            state,
            script,
            samples: Vec::new(),
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn samples(&self) -> &[TickSample] {
        &self.samples
    }

    /// Feeds wall-clock time in and runs as many fixed steps as fit.
    pub fn update(&mut self, delta: f32) -> u32 {
        self.state.timestep.accumulate(delta);

        let mut ticks_run = 0;
        while self.state.timestep.consume_tick() {
            self.step();
            ticks_run += 1;
        }

        ticks_run
    }

    pub fn run_ticks(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn step(&mut self) {
        for action in self.script.drain_for_tick(self.state.tick()) {
            self.state.apply(action);
        }
        let sample = self.state.step();
        self.samples.push(sample);
    }

    pub fn peak_height(&self) -> Option<f32> {
        self.samples.iter().map(|s| s.position.z).reduce(f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_timestep_accumulation() {
        let mut ts = FixedTimestep::new(60);

        ts.accumulate(1.0 / 30.0);
        assert!(ts.consume_tick());
        assert!(ts.consume_tick());
        assert!(!ts.consume_tick());

        // long stalls are clamped instead of replayed
        let mut ts = FixedTimestep::new(60);
        ts.accumulate(10.0);
        let mut ticks = 0;
        while ts.consume_tick() {
            ticks += 1;
        }
        assert!((14..=15).contains(&ticks), "{ticks}");
    }

    #[test]
    fn simulation_loop_ticks() {
        let capsule = Capsule::new(34.0, 88.0);
        let course = LedgeCourse::new(capsule);
        let Some(lane) = course.lane("open") else {
            panic!("open lane missing");
        };
        let state =
            SimulationState::new(MovementConfig::default(), &course, lane.spawn, capsule, 60).unwrap();
        let mut sim = SimulationLoop::new(state, InputScript::new());

        assert_eq!(sim.update(1.0 / 30.0), 2);
        assert_eq!(sim.samples().len(), 2);
        assert_eq!(sim.state().tick(), 2);
    }
}
