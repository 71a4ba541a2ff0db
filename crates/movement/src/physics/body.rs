use glam::{Vec2, Vec3};
use rapier3d::control::{CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

use super::world::{PhysicsWorld, to_vector};
use crate::body::{Capsule, CharacterBody};

const SKIN: f32 = 1.0;
/// Ground closer than this counts as standing on it.
const SNAP: f32 = 2.0;
const WALK_SPEED: f32 = 600.0;
const MAX_SLOPE: f32 = std::f32::consts::FRAC_PI_4;

/// Rapier-backed character that integrates its own gravity and exposes the
/// host surface the movement controller drives.
pub struct KinematicBody {
    handle: RigidBodyHandle,
    capsule: Capsule,
    character_controller: KinematicCharacterController,
    position: Vec3,
    velocity: Vec3,
    forward: Vec3,
    walk_input: Vec2,
    default_gravity_z: f32,
    gravity_scale: f32,
    grounded: bool,
    falling_requested: bool,
    pending_launch: Option<Vec3>,
    pub can_jump: bool,
}

impl KinematicBody {
    pub fn spawn(physics: &mut PhysicsWorld, position: Vec3, capsule: Capsule) -> Self {
        let handle = physics.add_character(position, capsule);

        let mut character_controller = KinematicCharacterController::default();
        character_controller.offset = CharacterLength::Absolute(SKIN);
        character_controller.up = Vector::Z;
        character_controller.max_slope_climb_angle = MAX_SLOPE;
        character_controller.min_slope_slide_angle = 35_f32.to_radians();
        character_controller.snap_to_ground = Some(CharacterLength::Absolute(SNAP));
        character_controller.autostep = None;

        Self {
            handle,
            capsule,
            character_controller,
            position,
            velocity: Vec3::ZERO,
            forward: Vec3::X,
            walk_input: Vec2::ZERO,
            default_gravity_z: physics.gravity_z(),
            gravity_scale: 1.0,
            grounded: false,
            falling_requested: true,
            pending_launch: None,
            can_jump: true,
        }
    }

    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn set_forward(&mut self, forward: Vec3) {
        let flat = Vec3::new(forward.x, forward.y, 0.0).normalize_or_zero();
        if flat != Vec3::ZERO {
            self.forward = flat;
        }
    }

    /// Local move input, x right and y forward, already filtered by input locks.
    pub fn set_walk_input(&mut self, input: Vec2) {
        self.walk_input = input.clamp_length_max(1.0);
    }

    fn walk_velocity(&self) -> Vec3 {
        let right = self.forward.cross(Vec3::Z);
        (self.forward * self.walk_input.y + right * self.walk_input.x) * WALK_SPEED
    }

    /// Integrates one tick and moves the capsule through the world.
    pub fn step(&mut self, physics: &mut PhysicsWorld, dt: f32) {
        if let Some(launch) = self.pending_launch.take() {
            self.velocity = launch;
            self.grounded = false;
        }

        if self.grounded && !self.falling_requested {
            let walk = self.walk_velocity();
            self.velocity.x = walk.x;
            self.velocity.y = walk.y;
        }

        self.velocity.z += self.default_gravity_z * self.gravity_scale * dt;

        let desired = self.velocity * dt;
        let shape = SharedShape::capsule_z(self.capsule.segment_half_height(), self.capsule.radius);
        let pose = Pose::from_parts(to_vector(self.position), Rotation::from_xyzw(0.0, 0.0, 0.0, 1.0));

        let corrected = physics.move_character(
            &self.character_controller,
            self.handle,
            &shape,
            pose,
            to_vector(desired),
        );
        let translation = Vec3::new(
            corrected.translation.x,
            corrected.translation.y,
            corrected.translation.z,
        );

        // walls only stop the capsule, ceilings and floors also stop the vertical speed
        self.velocity.z += (translation.z - desired.z) / dt;
        self.position += translation;

        let on_ground = corrected.grounded
            || physics.is_grounded(self.handle, self.position, self.capsule, SNAP, MAX_SLOPE);
        self.grounded = on_ground && desired.z <= 0.0;
        if self.grounded {
            self.velocity.z = 0.0;
        }
        self.falling_requested = false;

        physics.set_next_kinematic_position(self.handle, self.position);
    }
}

impl CharacterBody for KinematicBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn capsule(&self) -> Capsule {
        self.capsule
    }

    fn can_jump(&self) -> bool {
        self.can_jump
    }

    fn is_falling(&self) -> bool {
        !self.grounded || self.falling_requested
    }

    fn default_gravity_z(&self) -> f32 {
        self.default_gravity_z
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn enter_falling(&mut self) {
        self.falling_requested = true;
    }

    fn launch(&mut self, velocity: Vec3) {
        self.pending_launch = Some(velocity);
        self.falling_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn flat_world() -> PhysicsWorld {
        let mut physics = PhysicsWorld::new(DT);
        physics.add_ground(0.0, 5000.0);
        physics.step();
        physics
    }

    fn settle(body: &mut KinematicBody, physics: &mut PhysicsWorld) {
        for _ in 0..120 {
            body.step(physics, DT);
            physics.step();
        }
    }

    #[test]
    fn falls_and_lands_on_ground() {
        let mut physics = flat_world();
        let mut body = KinematicBody::spawn(&mut physics, Vec3::new(0.0, 0.0, 200.0), Capsule::new(34.0, 88.0));
        assert!(body.is_falling());

        settle(&mut body, &mut physics);

        assert!(body.is_grounded());
        assert!(!body.is_falling());
        assert!((body.position().z - 88.0).abs() < 5.0, "z {}", body.position().z);
        assert_eq!(body.velocity().z, 0.0);
    }

    #[test]
    fn launch_applies_on_next_step() {
        let mut physics = flat_world();
        let mut body = KinematicBody::spawn(&mut physics, Vec3::new(0.0, 0.0, 100.0), Capsule::new(34.0, 88.0));
        settle(&mut body, &mut physics);

        body.launch(Vec3::new(0.0, 0.0, 500.0));
        assert!(body.is_falling());
        assert_eq!(body.velocity().z, 0.0);

        let before = body.position().z;
        body.step(&mut physics, DT);
        assert!(body.position().z > before);
        assert!(!body.is_grounded());
    }

    #[test]
    fn walks_along_forward() {
        let mut physics = flat_world();
        let mut body = KinematicBody::spawn(&mut physics, Vec3::new(0.0, 0.0, 100.0), Capsule::new(34.0, 88.0));
        settle(&mut body, &mut physics);

        body.set_forward(Vec3::Y);
        body.set_walk_input(Vec2::new(0.0, 1.0));
        for _ in 0..30 {
            body.step(&mut physics, DT);
            physics.step();
        }
        assert!(body.position().y > 200.0);
        assert!(body.position().x.abs() < 1.0);
    }
}
