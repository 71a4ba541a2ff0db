use glam::Vec3;

use crate::air_dash::{self, DashRejected};
use crate::body::{CharacterBody, SpatialQuery};
use crate::config::{ConfigError, MovementConfig};
use crate::event::{LogObserver, MovementEvent, MovementObserver};
use crate::jump::{AerialMove, GravityProfile, JumpRejected, JumpState};
use crate::kinematics::KinematicsError;
use crate::locks::SharedInputLocks;
use crate::mode::{ModeContext, ModeKind, MovementMode, Tuning};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MovementError {
    #[error("invalid movement config: {0}")]
    Config(#[from] ConfigError),
    #[error("jump profile does not fit host gravity: {0}")]
    Kinematics(#[from] KinematicsError),
}

/// Drives jump, mantle and air dash on top of a host character body.
///
/// The host calls the input entry points as buttons change and [`tick`]
/// once per frame before integrating the body.
///
/// [`tick`]: MovementController::tick
pub struct MovementController {
    tuning: Tuning,
    state: JumpState,
    locks: SharedInputLocks,
    observer: Box<dyn MovementObserver>,
    mode: Box<dyn MovementMode>,
    tick: u32,
}

impl MovementController {
    pub fn new(
        config: MovementConfig,
        body: &dyn CharacterBody,
        locks: SharedInputLocks,
    ) -> Result<Self, MovementError> {
        Self::with_observer(config, body, locks, Box::new(LogObserver))
    }

    pub fn with_observer(
        config: MovementConfig,
        body: &dyn CharacterBody,
        locks: SharedInputLocks,
        observer: Box<dyn MovementObserver>,
    ) -> Result<Self, MovementError> {
        config.validate()?;
        let gravity = GravityProfile::new(&config.jump, body.default_gravity_z(), body.gravity_scale())?;
        log::debug!(
            "movement gravity: v0 {:.1}, pre-jump {:.3}..{:.3}, post-apex {:.3}",
            gravity.jump_velocity,
            gravity.min_pre_jump,
            gravity.max_pre_jump,
            gravity.post_apex
        );

        let mode = ModeKind::of(body);
        let mut state = JumpState::new();
        state.in_air = mode == ModeKind::Airborne;

        Ok(Self {
            tuning: Tuning::new(config, gravity),
            state,
            locks,
            observer,
            mode: mode.create(),
            tick: 0,
        })
    }

    pub fn config(&self) -> &MovementConfig {
        &self.tuning.config
    }

    pub fn gravity(&self) -> &GravityProfile {
        &self.tuning.gravity
    }

    pub fn state(&self) -> &JumpState {
        &self.state
    }

    pub fn mode(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn locks(&self) -> &SharedInputLocks {
        &self.locks
    }

    pub fn on_jump_pressed(&mut self, body: &mut dyn CharacterBody) {
        self.state.holding_jump_key = true;
        // refusals are already reported to the observer
        let _ = self.try_jump(body);
    }

    pub fn on_jump_released(&mut self, body: &mut dyn CharacterBody) {
        self.with_context(body, None, |_, ctx| {
            let max_hold = ctx.tuning.config.jump.max_hold_time;
            let hold_time = ctx.state.hold_time;
            if let Some(scale) = ctx.state.release(&ctx.tuning.gravity, max_hold) {
                ctx.set_gravity_scale(scale);
                ctx.emit(MovementEvent::JumpReleased {
                    hold_time,
                    gravity_scale: ctx.body.gravity_scale(),
                });
            }
        });
    }

    pub fn on_air_dash_requested(&mut self, body: &mut dyn CharacterBody) {
        let _ = self.try_air_dash(body);
    }

    /// Starts a jump or double jump. Returns whether it was a double jump.
    pub fn try_jump(&mut self, body: &mut dyn CharacterBody) -> Result<bool, JumpRejected> {
        self.sync_mode(body, None);
        self.with_context(body, None, |_, ctx| {
            let position = ctx.body.position();
            let checked = ctx.state.check_jump(
                &ctx.tuning.config.jump,
                ctx.body.can_jump(),
                ctx.body.is_falling(),
                position,
            );
            let double_jump = match checked {
                Ok(double_jump) => double_jump,
                Err(reason) => {
                    ctx.emit(MovementEvent::JumpRejected { reason });
                    return Err(reason);
                }
            };

            let mantle = ctx.state.cancel_aerial_move();
            ctx.release_mantle(mantle);

            let velocity_z = ctx.tuning.gravity.jump_velocity;
            ctx.body.set_velocity_z(velocity_z);
            ctx.set_gravity_scale(ctx.tuning.gravity.max_pre_jump);
            ctx.body.enter_falling();

            ctx.state.begin_jump(position, double_jump);
            ctx.state.press();

            ctx.emit(MovementEvent::JumpStarted {
                jump_count: ctx.state.jump_count,
                double_jump,
                velocity_z,
                gravity_scale: ctx.body.gravity_scale(),
            });
            Ok(double_jump)
        })
    }

    pub fn try_air_dash(&mut self, body: &mut dyn CharacterBody) -> Result<(), DashRejected> {
        self.sync_mode(body, None);
        self.with_context(body, None, |_, ctx| {
            let planned = air_dash::check_air_dash(ctx.state.in_air, ctx.state.has_air_dashed).and_then(
                |()| {
                    air_dash::plan_air_dash(
                        &ctx.tuning.config.air_dash,
                        ctx.body.forward(),
                        ctx.body.default_gravity_z(),
                    )
                },
            );
            let launch = match planned {
                Ok(launch) => launch,
                Err(reason) => {
                    ctx.emit(MovementEvent::AirDashRejected { reason });
                    return Err(reason);
                }
            };

            let mantle = ctx.state.cancel_aerial_move();
            ctx.release_mantle(mantle);
            ctx.state.has_air_dashed = true;
            ctx.state.aerial = AerialMove::AirDash;

            ctx.body.set_velocity(Vec3::ZERO);
            ctx.body.launch(launch.velocity);
            ctx.set_gravity_scale(launch.gravity_scale);

            ctx.emit(MovementEvent::AirDashed {
                velocity: launch.velocity,
                gravity_scale: ctx.body.gravity_scale(),
            });
            Ok(())
        })
    }

    /// Advances one frame. `world` enables ledge probing; without it the
    /// character never mantles.
    pub fn tick(&mut self, body: &mut dyn CharacterBody, world: Option<&dyn SpatialQuery>, dt: f32) {
        self.tick = self.tick.wrapping_add(1);
        self.sync_mode(body, world);
        self.with_context(body, world, |mode, ctx| mode.on_tick(ctx, dt));
    }

    fn sync_mode(&mut self, body: &mut dyn CharacterBody, world: Option<&dyn SpatialQuery>) {
        let next = ModeKind::of(body);
        let current = self.mode.kind();
        if next == current {
            return;
        }

        self.with_context(body, world, |mode, ctx| mode.on_exit(ctx));
        self.mode = next.create();
        self.with_context(body, world, |mode, ctx| {
            mode.on_enter(ctx);
            ctx.emit(MovementEvent::ModeChanged {
                from: current,
                to: next,
            });
        });
    }

    fn with_context<R>(
        &mut self,
        body: &mut dyn CharacterBody,
        world: Option<&dyn SpatialQuery>,
        f: impl FnOnce(&mut dyn MovementMode, &mut ModeContext<'_>) -> R,
    ) -> R {
        let Self {
            tuning,
            state,
            locks,
            observer,
            mode,
            tick,
        } = self;

        let mut ctx = ModeContext {
            body,
            world,
            state,
            tuning,
            locks,
            observer: observer.as_mut(),
            tick: *tick,
        };
        f(mode.as_mut(), &mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::{JumpProfile, MantleStrategy};
    use crate::event::EventLog;
    use crate::locks::{InputLocks, LockAxes};
    use crate::test_support::{BoxWorld, FakeBody};

    const DT: f32 = 1.0 / 120.0;

    struct Harness {
        body: FakeBody,
        controller: MovementController,
        events: Rc<RefCell<EventLog>>,
        locks: SharedInputLocks,
    }

    impl Harness {
        fn new(config: MovementConfig) -> Self {
            let body = FakeBody::default();
            let events = EventLog::shared(4096);
            let locks = InputLocks::shared();
            let controller =
                MovementController::with_observer(config, &body, locks.clone(), Box::new(events.clone()))
                    .unwrap();
            Self {
                body,
                controller,
                events,
                locks,
            }
        }

        fn step(&mut self, world: Option<&dyn SpatialQuery>) {
            self.controller.tick(&mut self.body, world, DT);
            self.body.step(DT);
        }

        fn run_until_landed(&mut self, world: Option<&dyn SpatialQuery>) -> f32 {
            let mut peak = self.body.position.z;
            for _ in 0..2000 {
                self.step(world);
                peak = peak.max(self.body.position.z);
                if !self.body.falling {
                    break;
                }
            }
            self.step(world);
            peak
        }

        fn count(&self, name: &str) -> usize {
            self.events.borrow().count(name)
        }
    }

    fn config() -> MovementConfig {
        MovementConfig {
            jump: JumpProfile {
                max_height: 300.0,
                time_to_max_height: 0.5,
                min_height: 100.0,
                post_apex_time_to_max_height: 0.4,
                max_hold_time: 0.3,
                fall_coyote_distance: 50.0,
                max_jump_count: 2,
            },
            ..MovementConfig::default()
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let mut bad = config();
        bad.jump.max_jump_count = 0;
        let body = FakeBody::default();
        assert!(matches!(
            MovementController::new(bad, &body, InputLocks::shared()),
            Err(MovementError::Config(ConfigError::NoJumps))
        ));

        let weightless = FakeBody {
            gravity_z: 0.0,
            ..FakeBody::default()
        };
        assert!(matches!(
            MovementController::new(config(), &weightless, InputLocks::shared()),
            Err(MovementError::Kinematics(_))
        ));

        let upside_down = FakeBody {
            gravity_z: 980.0,
            ..FakeBody::default()
        };
        assert!(matches!(
            MovementController::new(config(), &upside_down, InputLocks::shared()),
            Err(MovementError::Kinematics(_))
        ));
    }

    #[test]
    fn held_jump_reaches_max_height_and_lands() {
        let mut h = Harness::new(config());
        h.controller.on_jump_pressed(&mut h.body);

        assert!(h.body.falling);
        assert!((h.body.velocity.z - 1200.0).abs() < 1e-2);
        assert_eq!(h.controller.state().jump_count, 1);

        let peak = h.run_until_landed(None);
        assert!((peak - 300.0).abs() < 15.0, "peak {peak}");

        assert_eq!(h.controller.mode(), ModeKind::Grounded);
        assert_eq!(h.controller.state().jump_count, 0);
        assert_eq!(h.count("apex_reached"), 1);
        assert_eq!(h.count("landed"), 1);
        assert!((h.body.gravity_scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tap_jump_is_lower_than_held_jump() {
        let mut held = Harness::new(config());
        held.controller.on_jump_pressed(&mut held.body);
        let held_peak = held.run_until_landed(None);

        let mut tap = Harness::new(config());
        tap.controller.on_jump_pressed(&mut tap.body);
        tap.step(None);
        tap.controller.on_jump_released(&mut tap.body);
        let tap_peak = tap.run_until_landed(None);

        assert_eq!(tap.count("jump_released"), 1);
        assert!(tap_peak < held_peak - 100.0, "tap {tap_peak} held {held_peak}");
    }

    #[test]
    fn double_jump_then_limit() {
        let mut h = Harness::new(config());
        h.controller.on_jump_pressed(&mut h.body);
        h.controller.on_jump_released(&mut h.body);

        while h.body.velocity.z >= 0.0 {
            h.step(None);
        }
        h.step(None);
        assert!(h.controller.state().fall_origin_set());

        assert_eq!(h.controller.try_jump(&mut h.body), Ok(true));
        assert_eq!(h.controller.state().jump_count, 2);
        assert!(h.body.velocity.z > 0.0);

        assert_eq!(
            h.controller.try_jump(&mut h.body),
            Err(JumpRejected::JumpLimit { count: 2, max: 2 })
        );
        assert_eq!(h.count("jump_rejected"), 1);
    }

    #[test]
    fn walk_off_jump_measures_from_where_it_started() {
        let mut h = Harness::new(config());
        h.controller.on_jump_pressed(&mut h.body);
        h.run_until_landed(None);
        assert_eq!(h.controller.mode(), ModeKind::Grounded);

        // step off a ledge 500 above the floor
        h.body.position = Vec3::new(0.0, 0.0, 500.0);
        h.body.falling = true;
        h.body.velocity = Vec3::new(0.0, 0.0, -1.0);
        h.step(None);

        let pressed_at = h.body.position;
        assert_eq!(h.controller.try_jump(&mut h.body), Ok(true));
        assert_eq!(h.controller.state().jump_count, 2);
        assert_eq!(h.controller.state().jump_start_position, pressed_at);
        assert_eq!(
            h.controller.try_jump(&mut h.body),
            Err(JumpRejected::JumpLimit { count: 2, max: 2 })
        );

        h.run_until_landed(None);
        let apex_heights: Vec<f32> = h
            .events
            .borrow()
            .iter()
            .filter_map(|recorded| match &recorded.event {
                MovementEvent::Landed { apex_height, .. } => Some(*apex_height),
                _ => None,
            })
            .collect();
        assert_eq!(apex_heights.len(), 2);
        assert!((apex_heights[1] - 300.0).abs() < 15.0, "apex {}", apex_heights[1]);
    }

    #[test]
    fn air_dash_once_per_airtime() {
        let mut h = Harness::new(config());
        assert_eq!(
            h.controller.try_air_dash(&mut h.body),
            Err(DashRejected::NotAirborne)
        );

        h.controller.on_jump_pressed(&mut h.body);
        h.step(None);
        assert_eq!(h.controller.try_air_dash(&mut h.body), Ok(()));
        assert_eq!(h.body.launches.len(), 1);
        assert!((h.body.velocity.x - 1600.0).abs() < 1e-2);
        assert_eq!(h.controller.state().aerial, AerialMove::AirDash);

        assert_eq!(
            h.controller.try_air_dash(&mut h.body),
            Err(DashRejected::AlreadyDashed)
        );
        assert_eq!(
            h.controller.try_jump(&mut h.body),
            Err(JumpRejected::AirDashActive)
        );

        h.run_until_landed(None);
        assert!(!h.controller.state().has_air_dashed);
        assert_eq!(h.controller.state().aerial, AerialMove::None);
    }

    #[test]
    fn dash_gravity_is_not_replaced_at_apex() {
        let mut h = Harness::new(config());
        h.controller.on_jump_pressed(&mut h.body);
        h.step(None);
        h.controller.try_air_dash(&mut h.body).unwrap();
        let dash_scale = h.body.gravity_scale;

        while h.body.velocity.z >= 0.0 {
            h.step(None);
        }
        h.step(None);
        assert_eq!(h.body.gravity_scale, dash_scale);
    }

    /// Ledge whose top is 100 above the starting ground, 60 in front.
    fn ledge_world() -> BoxWorld {
        BoxWorld::new().with_box(Vec3::new(60.0, -500.0, -100.0), Vec3::new(600.0, 500.0, 100.0))
    }

    /// Falling past the ledge face with the jump button held but no jump
    /// left to spend.
    fn fall_beside_ledge(h: &mut Harness) {
        h.body.position = Vec3::new(0.0, 0.0, 60.0);
        h.body.falling = true;
        h.body.can_jump = false;
        h.body.ground = -1000.0;
        h.controller.tick(&mut h.body, None, DT);
        h.body.velocity = Vec3::new(0.0, 0.0, -50.0);
        h.controller.on_jump_pressed(&mut h.body);
    }

    #[test]
    fn timed_hop_locks_until_landing() {
        let mut h = Harness::new(config());
        fall_beside_ledge(&mut h);
        assert_eq!(h.count("jump_rejected"), 1);

        let world = ledge_world();
        let world = Some(&world as &dyn SpatialQuery);
        h.step(world);

        assert_eq!(h.count("mantle_started"), 1);
        assert!(h.controller.state().is_mantling());
        assert_eq!(h.locks.borrow().locked_axes(), LockAxes::all());
        assert!(h.body.velocity.z > 0.0);

        while h.body.velocity.z >= 0.0 {
            h.step(world);
        }
        h.step(world);
        assert_eq!(h.locks.borrow().locked_axes(), LockAxes::RIGHT_LEFT);
        assert!(h.body.velocity.x > 0.0);

        h.body.falling = false;
        h.step(world);
        assert_eq!(h.controller.mode(), ModeKind::Grounded);
        assert_eq!(h.locks.borrow().locked_axes(), LockAxes::empty());
    }

    #[test]
    fn air_dash_cancels_mantle_and_frees_locks() {
        let mut h = Harness::new(config());
        fall_beside_ledge(&mut h);

        let world = ledge_world();
        let world = Some(&world as &dyn SpatialQuery);
        h.step(world);
        assert!(h.controller.state().is_mantling());

        h.controller.try_air_dash(&mut h.body).unwrap();
        assert_eq!(h.locks.borrow().locked_axes(), LockAxes::empty());
        assert!(!h.controller.state().is_mantling());
    }

    #[test]
    fn no_mantle_without_holding_jump() {
        let mut h = Harness::new(config());
        h.body.position = Vec3::new(0.0, 0.0, 60.0);
        h.body.falling = true;
        h.body.ground = -1000.0;
        h.body.velocity = Vec3::new(0.0, 0.0, -50.0);

        let world = ledge_world();
        for _ in 0..5 {
            h.step(Some(&world as &dyn SpatialQuery));
        }
        assert_eq!(h.count("ledge_probed"), 0);
        assert!(!h.controller.state().is_mantling());
    }

    #[test]
    fn trajectory_mantle_launches_without_locks() {
        let mut config = config();
        config.mantle.strategy = MantleStrategy::Trajectory;
        let mut h = Harness::new(config);
        fall_beside_ledge(&mut h);

        let world = ledge_world();
        let world = Some(&world as &dyn SpatialQuery);
        h.step(world);

        assert_eq!(h.count("mantle_started"), 1);
        assert_eq!(h.body.launches.len(), 1);
        let launch = h.body.launches[0];
        assert!(launch.x > 0.0 && launch.z > 0.0);
        assert_eq!(h.locks.borrow().locked_axes(), LockAxes::empty());

        let events = h.events.borrow();
        let planned = events.events_named("launch_planned").next().unwrap();
        let MovementEvent::LaunchPlanned { path, .. } = &planned.event else {
            panic!("unexpected {:?}", planned.event);
        };
        assert!(path.len() > 1);
        // launched from the capsule base where the ledge was found
        let base = Vec3::new(0.0, 0.0, 60.0 - h.body.capsule.half_height);
        assert!(path[0].distance(base) < 1e-3);
        assert!(path[1].x > path[0].x && path[1].z > path[0].z);
    }

    #[test]
    fn walking_off_a_ledge_captures_fall_origin() {
        let mut h = Harness::new(config());
        h.body.position = Vec3::new(0.0, 0.0, 500.0);
        h.body.falling = true;
        h.body.velocity = Vec3::new(0.0, 0.0, -1.0);
        h.step(None);

        assert_eq!(h.controller.mode(), ModeKind::Airborne);
        assert_eq!(h.controller.state().fall_origin, Some(Vec3::new(0.0, 0.0, 500.0)));
        assert_eq!(h.count("mode_changed"), 1);
    }
}
