use glam::Vec3;

use crate::body::{CharacterBody, SpatialQuery};
use crate::config::MovementConfig;
use crate::event::{MovementEvent, MovementObserver};
use crate::jump::{AerialMove, GravityProfile, JumpState, MantleState};
use crate::ledge::{LaunchSolver, LedgeDetector};
use crate::locks::{LockAxes, SharedInputLocks};
use crate::mantle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Grounded,
    Airborne,
}

impl ModeKind {
    pub fn of(body: &dyn CharacterBody) -> Self {
        if body.is_falling() {
            Self::Airborne
        } else {
            Self::Grounded
        }
    }

    pub(crate) fn create(self) -> Box<dyn MovementMode> {
        match self {
            Self::Grounded => Box::new(GroundedMode),
            Self::Airborne => Box::new(AirborneMode),
        }
    }
}

/// Validated configuration plus everything derived from it at construction.
#[derive(Debug, Clone)]
pub struct Tuning {
    pub config: MovementConfig,
    pub gravity: GravityProfile,
    pub detector: LedgeDetector,
    pub solver: LaunchSolver,
}

impl Tuning {
    pub fn new(config: MovementConfig, gravity: GravityProfile) -> Self {
        Self {
            detector: LedgeDetector::new(config.ledge.clone()),
            solver: LaunchSolver::new(&config.launch),
            config,
            gravity,
        }
    }
}

/// Everything a mode may touch during one callback.
pub struct ModeContext<'a> {
    pub body: &'a mut dyn CharacterBody,
    pub world: Option<&'a dyn SpatialQuery>,
    pub state: &'a mut JumpState,
    pub tuning: &'a Tuning,
    pub locks: &'a SharedInputLocks,
    pub observer: &'a mut dyn MovementObserver,
    pub tick: u32,
}

impl ModeContext<'_> {
    pub fn emit(&mut self, event: MovementEvent) {
        self.observer.record(self.tick, &event);
    }

    /// Writes a gravity scale to the host. Negative or non-finite scales are
    /// refused and the host keeps its current one.
    pub fn set_gravity_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale < 0.0 {
            log::warn!("refusing gravity scale {}", scale);
            return false;
        }
        self.body.set_gravity_scale(scale);
        true
    }

    pub fn lock(&mut self, axes: LockAxes) {
        if axes.is_empty() {
            return;
        }
        let locked = {
            let mut locks = self.locks.borrow_mut();
            locks.lock(axes);
            locks.locked_axes()
        };
        self.emit(MovementEvent::LocksChanged { locked });
    }

    pub fn unlock(&mut self, axes: LockAxes) {
        if axes.is_empty() {
            return;
        }
        let locked = {
            let mut locks = self.locks.borrow_mut();
            locks.unlock(axes);
            locks.locked_axes()
        };
        self.emit(MovementEvent::LocksChanged { locked });
    }

    /// Gives back whatever a cancelled or finished mantle still holds.
    pub fn release_mantle(&mut self, mantle: Option<MantleState>) {
        if let Some(mantle) = mantle {
            self.unlock(mantle.held_locks);
        }
    }
}

/// A movement mode the controller switches between as the host reports
/// grounded or falling.
pub trait MovementMode {
    fn kind(&self) -> ModeKind;

    fn on_enter(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn on_tick(&mut self, _ctx: &mut ModeContext<'_>, _dt: f32) {}

    fn on_exit(&mut self, _ctx: &mut ModeContext<'_>) {}
}

#[derive(Debug, Default)]
pub struct GroundedMode;

impl MovementMode for GroundedMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Grounded
    }

    fn on_enter(&mut self, ctx: &mut ModeContext<'_>) {
        ctx.state.reset_grounded();
    }
}

#[derive(Debug, Default)]
pub struct AirborneMode;

impl MovementMode for AirborneMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Airborne
    }

    fn on_enter(&mut self, ctx: &mut ModeContext<'_>) {
        ctx.state.in_air = true;
    }

    fn on_tick(&mut self, ctx: &mut ModeContext<'_>, dt: f32) {
        let velocity = ctx.body.velocity();
        let position = ctx.body.position();

        ctx.state.accumulate_hold(dt);
        ctx.state.track_height(position);

        if ctx.state.detect_apex(velocity.z) {
            let post_apex = ctx.tuning.gravity.post_apex;
            ctx.set_gravity_scale(post_apex);

            let mut released = false;
            if let AerialMove::Mantle(mantle) = &mut ctx.state.aerial {
                released = mantle.held_locks.contains(LockAxes::FORWARD_BACK);
                mantle.held_locks.remove(LockAxes::FORWARD_BACK);
            }
            if released {
                ctx.unlock(LockAxes::FORWARD_BACK);
            }

            let height = ctx.state.apex_height_so_far;
            ctx.emit(MovementEvent::ApexReached {
                height,
                gravity_scale: ctx.body.gravity_scale(),
            });
        }

        if let Some(origin) = ctx.state.capture_fall_origin(velocity.z, position) {
            ctx.emit(MovementEvent::FallOriginCaptured { origin });
        }

        mantle::apply_forward_boost(ctx, dt);

        if velocity.z < 0.0 && !ctx.state.is_mantling() && ctx.state.holding_jump_key {
            mantle::try_mantle(ctx);
        }
    }

    fn on_exit(&mut self, ctx: &mut ModeContext<'_>) {
        ctx.emit(MovementEvent::Landed {
            jump_count: ctx.state.jump_count,
            apex_height: ctx.state.apex_height_so_far,
        });

        let mantle = ctx.state.reset_airborne();
        ctx.release_mantle(mantle);

        let default_scale = ctx.tuning.gravity.default_scale;
        ctx.set_gravity_scale(default_scale);
    }
}

/// Horizontal part of `forward`, or zero when it points straight up or down.
pub(crate) fn flat_forward(body: &dyn CharacterBody) -> Vec3 {
    let up = body.up().normalize_or(Vec3::Z);
    let forward = body.forward();
    (forward - up * forward.dot(up)).normalize_or_zero()
}
