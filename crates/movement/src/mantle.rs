use glam::Vec3;

use crate::config::MantleStrategy;
use crate::event::{MantleFailure, MovementEvent};
use crate::jump::{AerialMove, MantleState};
use crate::kinematics::JumpArc;
use crate::ledge::{Ledge, ProbeOrigin, simulate_path};
use crate::locks::LockAxes;
use crate::mode::{ModeContext, flat_forward};

/// Sampling step of the launch path reported to observers.
const PATH_STEP: f32 = 1.0 / 30.0;

/// Probes for a ledge in front of the character and, when one is found,
/// starts the configured mantle. A miss or failed launch leaves the
/// character falling as before.
pub(crate) fn try_mantle(ctx: &mut ModeContext<'_>) {
    let Some(world) = ctx.world else {
        return;
    };

    let origin = ProbeOrigin {
        position: ctx.body.position(),
        forward: ctx.body.forward(),
        up: ctx.body.up(),
        capsule: ctx.body.capsule(),
    };
    let probe = ctx.tuning.detector.probe(&origin, world);
    ctx.emit(MovementEvent::LedgeProbed { probe });

    let Some(ledge) = probe.ledge() else {
        return;
    };

    match ctx.tuning.config.mantle.strategy {
        MantleStrategy::TimedHop => timed_hop(ctx, &origin, ledge),
        MantleStrategy::Trajectory => trajectory(ctx, &origin, ledge),
    }
}

fn timed_hop(ctx: &mut ModeContext<'_>, origin: &ProbeOrigin, ledge: Ledge) {
    let tuning = ctx.tuning;
    let mantle = &tuning.config.mantle;
    let target_z = ledge.edge.z + origin.capsule.half_height + mantle.height_offset;
    let distance = target_z - origin.position.z;

    let arc = match JumpArc::new(mantle.time, distance, ctx.body.default_gravity_z()) {
        Ok(arc) => arc,
        Err(err) => {
            log::debug!("mantle hop of {:.1} refused: {}", distance, err);
            ctx.emit(MovementEvent::MantleFailed {
                reason: MantleFailure::Kinematics(err),
            });
            return;
        }
    };

    let previous = ctx.state.cancel_aerial_move();
    ctx.release_mantle(previous);
    ctx.lock(LockAxes::all());

    ctx.body.set_velocity(Vec3::Z * arc.velocity);
    ctx.set_gravity_scale(arc.gravity_scale);
    ctx.state.aerial = AerialMove::Mantle(MantleState {
        strategy: MantleStrategy::TimedHop,
        edge: ledge.edge,
        target: ledge.mantle_target,
        held_locks: LockAxes::all(),
    });

    ctx.emit(MovementEvent::MantleStarted {
        strategy: MantleStrategy::TimedHop,
        edge: ledge.edge,
        target: ledge.mantle_target,
        velocity: ctx.body.velocity(),
        gravity_scale: ctx.body.gravity_scale(),
    });
}

fn trajectory(ctx: &mut ModeContext<'_>, origin: &ProbeOrigin, ledge: Ledge) {
    let up = origin.up.normalize_or(Vec3::Z);
    let start = origin.position - up * origin.capsule.half_height;
    let gravity = (ctx.body.default_gravity_z() * ctx.body.gravity_scale()).abs();

    let solution = match ctx.tuning.solver.solve(start, ledge.mantle_target, gravity) {
        Ok(solution) => solution,
        Err(err) => {
            log::debug!("mantle launch refused: {}", err);
            ctx.emit(MovementEvent::MantleFailed {
                reason: MantleFailure::Launch(err),
            });
            return;
        }
    };

    let previous = ctx.state.cancel_aerial_move();
    ctx.release_mantle(previous);

    ctx.body.set_velocity(Vec3::ZERO);
    ctx.body.launch(solution.velocity);
    ctx.state.aerial = AerialMove::Mantle(MantleState {
        strategy: MantleStrategy::Trajectory,
        edge: ledge.edge,
        target: ledge.mantle_target,
        held_locks: LockAxes::empty(),
    });

    log::debug!(
        "mantle launch at {:.0} deg, {:.2}s flight",
        solution.angle_deg,
        solution.flight_time
    );
    ctx.emit(MovementEvent::LaunchPlanned {
        angle_deg: solution.angle_deg,
        flight_time: solution.flight_time,
        path: simulate_path(start, solution.velocity, gravity, solution.flight_time, PATH_STEP),
    });
    ctx.emit(MovementEvent::MantleStarted {
        strategy: MantleStrategy::Trajectory,
        edge: ledge.edge,
        target: ledge.mantle_target,
        velocity: solution.velocity,
        gravity_scale: ctx.body.gravity_scale(),
    });
}

/// Pushes a timed hop over the edge while it climbs and falls onto the ledge.
pub(crate) fn apply_forward_boost(ctx: &mut ModeContext<'_>, dt: f32) {
    let AerialMove::Mantle(MantleState {
        strategy: MantleStrategy::TimedHop,
        ..
    }) = ctx.state.aerial
    else {
        return;
    };

    let boost = flat_forward(&*ctx.body) * ctx.tuning.config.mantle.forward_boost * dt;
    let velocity = ctx.body.velocity();
    ctx.body.set_velocity(velocity + boost);
}
