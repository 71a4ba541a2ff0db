//! Seams to the host: the integrator that owns the character's motion and
//! the spatial-query service that answers probes against world geometry.
//!
//! The core never integrates position itself. It reads the host's state,
//! writes velocity and gravity scale, and lets the host apply them.

use glam::Vec3;

/// Character collision capsule. `half_height` includes the hemispheres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub radius: f32,
    pub half_height: f32,
}

impl Capsule {
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height: half_height.max(radius),
        }
    }

    /// Half length of the straight segment between the hemisphere centres.
    pub fn segment_half_height(&self) -> f32 {
        self.half_height - self.radius
    }
}

/// Opaque id of whatever a probe hit, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorRef(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub actor: Option<ActorRef>,
}

/// Host movement integrator for one character.
///
/// `up` is `+Z`. Velocity writes take effect from the host's next
/// integration step.
pub trait CharacterBody {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    /// Unit facing direction.
    fn forward(&self) -> Vec3;
    fn up(&self) -> Vec3 {
        Vec3::Z
    }
    fn capsule(&self) -> Capsule;

    /// Host-side permission to jump (not stunned, not crouched under
    /// geometry, ...). Jump count and coyote distance are checked by the core.
    fn can_jump(&self) -> bool;
    fn is_falling(&self) -> bool;

    /// Signed vertical component of the unscaled world gravity.
    fn default_gravity_z(&self) -> f32;
    fn gravity_scale(&self) -> f32;
    fn set_gravity_scale(&mut self, scale: f32);

    fn set_velocity(&mut self, velocity: Vec3);
    fn set_velocity_z(&mut self, z: f32) {
        let mut velocity = self.velocity();
        velocity.z = z;
        self.set_velocity(velocity);
    }

    /// Switch the host into its falling mode.
    fn enter_falling(&mut self);

    /// Instantaneous velocity override. The host applies it from its next
    /// step and enters falling.
    fn launch(&mut self, velocity: Vec3);
}

/// Synchronous ray and sweep queries against world geometry. Implementations
/// must ignore the querying character itself.
pub trait SpatialQuery {
    /// `direction` is normalised; hits beyond `max_distance` are ignored.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit>;

    /// Sweeps an upright capsule whose centre moves from `from` to `to`.
    /// Overlap at `from` counts as a hit at distance zero.
    fn sweep_capsule(&self, from: Vec3, to: Vec3, capsule: Capsule) -> Option<SurfaceHit>;
}
