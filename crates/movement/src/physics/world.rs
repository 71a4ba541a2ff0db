use glam::Vec3;
use rapier3d::control::{EffectiveCharacterMovement, KinematicCharacterController};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

use crate::body::{ActorRef, Capsule, SpatialQuery, SurfaceHit};

/// Default downward gravity in centimetres per second squared.
pub const DEFAULT_GRAVITY_Z: f32 = -980.0;

pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    gravity: Vector,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl PhysicsWorld {
    /// Z-up world measured in centimetres.
    pub fn new(dt: Real) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;
        integration_parameters.min_ccd_dt = dt / 100.0;
        integration_parameters.length_unit = 100.0;

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, 0.0, DEFAULT_GRAVITY_Z),
        }
    }

    pub fn gravity_z(&self) -> f32 {
        self.gravity.z
    }

    pub fn step(&mut self) {
        self.pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Kinematic capsule standing on its segment axis, centred on `position`.
    pub fn add_character(&mut self, position: Vec3, capsule: Capsule) -> RigidBodyHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(to_vector(position))
            .lock_rotations()
            .build();

        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::capsule_z(capsule.segment_half_height(), capsule.radius)
            .friction(0.0)
            .build();

        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        handle
    }

    pub fn add_static_box(&mut self, position: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(to_vector(position))
            .build();
        self.colliders.insert(collider)
    }

    /// Thin slab whose top face sits at `z`.
    pub fn add_ground(&mut self, z: Real, half_size: Real) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_size, half_size, 10.0)
            .translation(Vector::new(0.0, 0.0, z - 10.0))
            .build();
        self.colliders.insert(collider)
    }

    /// Moves a kinematic body's collider to `position` on the next step.
    pub fn set_next_kinematic_position(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let rotation = *body.rotation();
            body.set_next_kinematic_position(Pose::from_parts(to_vector(position), rotation));
        }
    }

    pub fn move_character(
        &self,
        controller: &KinematicCharacterController,
        handle: RigidBodyHandle,
        shape: &SharedShape,
        position: Pose,
        desired_translation: Vector,
    ) -> EffectiveCharacterMovement {
        let filter = QueryFilter::default().exclude_rigid_body(handle);
        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        );

        controller.move_shape(
            self.integration_parameters.dt,
            &query_pipeline,
            shape.as_ref(),
            &position,
            desired_translation,
            |_collision| {},
        )
    }

    /// Whether a capsule centred on `position` rests on walkable ground
    /// within `threshold`. The character's own collider is ignored.
    pub fn is_grounded(
        &self,
        handle: RigidBodyHandle,
        position: Vec3,
        capsule: Capsule,
        threshold: Real,
        max_slope: Real,
    ) -> bool {
        let filter = QueryFilter::default().exclude_rigid_body(handle);

        let below = self.ray_hit(filter, position, -Vec3::Z, capsule.half_height + threshold);
        if below.is_some() {
            return true;
        }

        // off-centre support, e.g. standing on an edge
        let to = position - Vec3::Z * threshold;
        self.capsule_hit(filter, position, to, capsule)
            .is_some_and(|hit| hit.normal.z.abs() >= max_slope.cos())
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: Real) -> Option<SurfaceHit> {
        self.ray_hit(QueryFilter::default(), origin, direction, max_distance)
    }

    /// Spatial queries that ignore the colliders of `character`.
    pub fn queries_for(&self, character: RigidBodyHandle) -> CharacterQueries<'_> {
        CharacterQueries {
            world: self,
            character,
        }
    }

    fn ray_hit(
        &self,
        filter: QueryFilter,
        origin: Vec3,
        direction: Vec3,
        max_distance: Real,
    ) -> Option<SurfaceHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let query = self.query_pipeline(filter);
        let ray = Ray::new(to_vector(origin), to_vector(direction));

        query
            .cast_ray_and_get_normal(&ray, max_distance, true)
            .map(|(collider, hit)| SurfaceHit {
                point: origin + direction * hit.time_of_impact,
                normal: Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
                distance: hit.time_of_impact,
                actor: Some(actor_ref(collider)),
            })
    }

    fn capsule_hit(
        &self,
        filter: QueryFilter,
        from: Vec3,
        to: Vec3,
        capsule: Capsule,
    ) -> Option<SurfaceHit> {
        let shape = SharedShape::capsule_z(capsule.segment_half_height(), capsule.radius);
        let travel = to - from;
        let query = self.query_pipeline(filter);
        let pose = Pose::from_parts(to_vector(from), Rotation::from_xyzw(0.0, 0.0, 0.0, 1.0));

        query
            .cast_shape(
                &pose,
                to_vector(travel),
                shape.as_ref(),
                ShapeCastOptions::with_max_time_of_impact(1.0),
            )
            .map(|(collider, hit)| SurfaceHit {
                point: from + travel * hit.time_of_impact,
                normal: Vec3::new(hit.normal1.x, hit.normal1.y, hit.normal1.z),
                distance: travel.length() * hit.time_of_impact,
                actor: Some(actor_ref(collider)),
            })
    }
}

impl SpatialQuery for PhysicsWorld {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        self.raycast(origin, direction, max_distance)
    }

    fn sweep_capsule(&self, from: Vec3, to: Vec3, capsule: Capsule) -> Option<SurfaceHit> {
        self.capsule_hit(QueryFilter::default(), from, to, capsule)
    }
}

pub struct CharacterQueries<'a> {
    world: &'a PhysicsWorld,
    character: RigidBodyHandle,
}

impl SpatialQuery for CharacterQueries<'_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        let filter = QueryFilter::default().exclude_rigid_body(self.character);
        self.world.ray_hit(filter, origin, direction, max_distance)
    }

    fn sweep_capsule(&self, from: Vec3, to: Vec3, capsule: Capsule) -> Option<SurfaceHit> {
        let filter = QueryFilter::default().exclude_rigid_body(self.character);
        self.world.capsule_hit(filter, from, to, capsule)
    }
}

fn actor_ref(collider: ColliderHandle) -> ActorRef {
    let (index, generation) = collider.into_raw_parts();
    ActorRef((u64::from(generation) << 32) | u64::from(index))
}

pub(crate) fn to_vector(v: Vec3) -> Vector {
    Vector::new(v.x, v.y, v.z)
}
