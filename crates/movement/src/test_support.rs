use glam::Vec3;

use crate::body::{ActorRef, Capsule, CharacterBody, SpatialQuery, SurfaceHit};

#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    fn ray(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let mut t0 = (lo - o) / d;
            let mut t1 = (hi - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t1);
        }

        if t_enter > t_exit || t_exit < 0.0 {
            return None;
        }
        if t_enter < 0.0 {
            return Some((0.0, -direction));
        }
        Some((t_enter, normal))
    }

    fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.min[axis] < other.max[axis] && self.max[axis] > other.min[axis])
    }
}

/// Axis-aligned box level with exact ray casts and a conservative capsule sweep.
#[derive(Debug, Clone, Default)]
pub struct BoxWorld {
    pub boxes: Vec<Aabb>,
}

impl BoxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, min: Vec3, max: Vec3) -> Self {
        self.boxes.push(Aabb::new(min, max));
        self
    }
}

impl SpatialQuery for BoxWorld {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.ray(origin, direction).map(|(t, n)| (i, t, n)))
            .filter(|(_, t, _)| *t <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, t, normal)| SurfaceHit {
                point: origin + direction * t,
                normal,
                distance: t,
                actor: Some(ActorRef(i as u64)),
            })
    }

    fn sweep_capsule(&self, from: Vec3, to: Vec3, capsule: Capsule) -> Option<SurfaceHit> {
        let extent = Vec3::new(capsule.radius, capsule.radius, capsule.half_height);
        let swept = Aabb::new(from.min(to) - extent, from.max(to) + extent);

        self.boxes
            .iter()
            .position(|b| b.overlaps(&swept))
            .map(|i| SurfaceHit {
                point: from,
                normal: Vec3::Z,
                distance: 0.0,
                actor: Some(ActorRef(i as u64)),
            })
    }
}

/// Minimal host integrator: explicit Euler, lands on the plane `z = ground`.
#[derive(Debug, Clone)]
pub struct FakeBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub forward: Vec3,
    pub capsule: Capsule,
    pub can_jump: bool,
    pub falling: bool,
    pub gravity_z: f32,
    pub gravity_scale: f32,
    pub launches: Vec<Vec3>,
    pub ground: f32,
}

impl Default for FakeBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            forward: Vec3::X,
            capsule: Capsule::new(34.0, 88.0),
            can_jump: true,
            falling: false,
            gravity_z: -980.0,
            gravity_scale: 1.0,
            launches: Vec::new(),
            ground: 0.0,
        }
    }
}

impl FakeBody {
    pub fn step(&mut self, dt: f32) {
        if !self.falling {
            return;
        }
        self.position += self.velocity * dt;
        self.velocity.z += self.gravity_z * self.gravity_scale * dt;

        if self.position.z <= self.ground && self.velocity.z <= 0.0 {
            self.position.z = self.ground;
            self.velocity = Vec3::ZERO;
            self.falling = false;
        }
    }
}

impl CharacterBody for FakeBody {
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
        self.falling
    }

    fn default_gravity_z(&self) -> f32 {
        self.gravity_z
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
        self.falling = true;
    }

    fn launch(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.falling = true;
        self.launches.push(velocity);
    }
}
