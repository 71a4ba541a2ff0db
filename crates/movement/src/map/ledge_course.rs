use glam::Vec3;

use crate::body::Capsule;
use crate::physics::PhysicsWorld;

use super::{MapObject, MapObjectKind};

/// One approach in the course: a spawn point facing +X toward a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    pub name: &'static str,
    /// Capsule centre standing on the ground.
    pub spawn: Vec3,
    pub wall_x: f32,
    pub wall_top: f32,
}

/// Parallel lanes of ledges for exercising jumps and mantles.
pub struct LedgeCourse {
    objects: Vec<MapObject>,
    lanes: Vec<Lane>,
}

impl LedgeCourse {
    const GROUND_SIZE: f32 = 5000.0;
    const LANE_SPACING: f32 = 600.0;
    const WALL_X: f32 = 300.0;
    const LEDGE_DEPTH: f32 = 800.0;
    const LANE_HALF_WIDTH: f32 = 200.0;
    /// Gap between the capsule and the wall at spawn.
    const APPROACH: f32 = 16.0;

    pub fn new(capsule: Capsule) -> Self {
        let mut course = Self {
            objects: vec![MapObject::ground(0.0, Self::GROUND_SIZE)],
            lanes: Vec::new(),
        };

        course.add_lane("open", 0.0, capsule);
        course.add_lane("low_ledge", 180.0, capsule);
        course.add_lane("high_ledge", 260.0, capsule);
        course.add_lane("low_ceiling", 240.0, capsule);
        course.add_lane("tall_wall", 600.0, capsule);

        // open above the clearance probe, too low to stand up under
        if let Some(lane) = course.lane("low_ceiling") {
            let y = lane.spawn.y;
            let bottom = lane.wall_top + 165.0;
            course.objects.push(MapObject::block(
                Vec3::new(Self::WALL_X, y - Self::LANE_HALF_WIDTH, bottom),
                Vec3::new(Self::WALL_X + Self::LEDGE_DEPTH, y + Self::LANE_HALF_WIDTH, bottom + 40.0),
            ));
        }

        course
    }

    fn add_lane(&mut self, name: &'static str, wall_top: f32, capsule: Capsule) {
        let y = self.lanes.len() as f32 * Self::LANE_SPACING;

        if wall_top > 0.0 {
            self.objects.push(MapObject::block(
                Vec3::new(Self::WALL_X, y - Self::LANE_HALF_WIDTH, 0.0),
                Vec3::new(Self::WALL_X + Self::LEDGE_DEPTH, y + Self::LANE_HALF_WIDTH, wall_top),
            ));
        }

        self.lanes.push(Lane {
            name,
            spawn: Vec3::new(
                Self::WALL_X - capsule.radius - Self::APPROACH,
                y,
                capsule.half_height + 1.0,
            ),
            wall_x: Self::WALL_X,
            wall_top,
        });
    }

    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, name: &str) -> Option<Lane> {
        self.lanes.iter().find(|lane| lane.name == name).copied()
    }

    pub fn spawn(&self, physics: &mut PhysicsWorld) {
        for object in &self.objects {
            match object.kind {
                MapObjectKind::Ground => {
                    physics.add_ground(object.position.z, object.half_extents.x);
                }
                MapObjectKind::StaticBox => {
                    physics.add_static_box(object.position, object.half_extents);
                }
            }
        }
        log::debug!("ledge course spawned {} colliders", self.objects.len());
    }
}
