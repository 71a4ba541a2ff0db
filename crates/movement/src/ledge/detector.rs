use bitflags::bitflags;
use glam::Vec3;

use crate::body::{Capsule, SpatialQuery};
use crate::config::LedgeConfig;

bitflags! {
    /// Probe stages that passed, in pipeline order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProbeStages: u8 {
        const WALL = 1 << 0;
        const CLEARANCE = 1 << 1;
        const FLOOR = 1 << 2;
        const STANDING_ROOM = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMiss {
    NoWall,
    /// Something blocks the space above the candidate ledge.
    NoClearance,
    NoFloor,
    NoStandingRoom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ledge {
    pub wall: Vec3,
    pub floor: Vec3,
    pub floor_normal: Vec3,
    pub edge: Vec3,
    pub mantle_target: Vec3,
}

/// Everything one detection pass learned. Only valid for the tick it ran in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LedgeProbe {
    pub passed: ProbeStages,
    pub miss: Option<ProbeMiss>,
    pub wall_hit: Option<Vec3>,
    pub floor_hit: Option<Vec3>,
    pub floor_normal: Option<Vec3>,
    pub ledge_edge: Option<Vec3>,
    pub mantle_target: Option<Vec3>,
}

impl LedgeProbe {
    fn missed(mut self, miss: ProbeMiss) -> Self {
        self.miss = Some(miss);
        self
    }

    pub fn ledge(&self) -> Option<Ledge> {
        if self.miss.is_some() || !self.passed.is_all() {
            return None;
        }
        Some(Ledge {
            wall: self.wall_hit?,
            floor: self.floor_hit?,
            floor_normal: self.floor_normal?,
            edge: self.ledge_edge?,
            mantle_target: self.mantle_target?,
        })
    }
}

/// Where and how the character is probing from.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOrigin {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub capsule: Capsule,
}

#[derive(Debug, Clone)]
pub struct LedgeDetector {
    config: LedgeConfig,
}

impl LedgeDetector {
    pub fn new(config: LedgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgeConfig {
        &self.config
    }

    /// Runs wall, clearance, floor and standing-room probes in order,
    /// stopping at the first miss.
    pub fn probe(&self, origin: &ProbeOrigin, world: &dyn SpatialQuery) -> LedgeProbe {
        let mut probe = LedgeProbe::default();
        let up = origin.up.normalize_or(Vec3::Z);
        let forward = (origin.forward - up * origin.forward.dot(up)).normalize_or_zero();
        if forward == Vec3::ZERO {
            return probe.missed(ProbeMiss::NoWall);
        }

        let Some(wall) = world.cast_ray(origin.position, forward, self.config.wall_reach) else {
            return probe.missed(ProbeMiss::NoWall);
        };
        probe.wall_hit = Some(wall.point);
        probe.passed |= ProbeStages::WALL;

        let clearance_start = origin.position + up * self.config.ledge_height_origin;
        let clearance_end = clearance_start + forward * self.config.ledge_height_forward_reach;
        if world
            .cast_ray(clearance_start, forward, self.config.ledge_height_forward_reach)
            .is_some()
        {
            return probe.missed(ProbeMiss::NoClearance);
        }
        probe.passed |= ProbeStages::CLEARANCE;

        let Some(floor) = world.cast_ray(
            clearance_end,
            -up,
            self.config.ledge_height_origin * 2.0,
        ) else {
            return probe.missed(ProbeMiss::NoFloor);
        };
        probe.floor_hit = Some(floor.point);
        probe.floor_normal = Some(floor.normal);
        probe.passed |= ProbeStages::FLOOR;

        // the edge is useful even when the capsule turns out not to fit
        let edge = locate_edge(floor.point, floor.normal, wall.point, origin.position);
        probe.ledge_edge = Some(edge);

        let base = floor.point + up * self.config.collision_margin;
        let from = base + up * origin.capsule.half_height;
        let to = from + up * self.config.collision_margin;
        if world.sweep_capsule(from, to, origin.capsule).is_some() {
            return probe.missed(ProbeMiss::NoStandingRoom);
        }
        probe.passed |= ProbeStages::STANDING_ROOM;

        probe.mantle_target = Some(mantle_target(edge, forward, origin.capsule));
        probe
    }
}

/// Finds the vertical edge of the ledge by projecting the wall hit onto the
/// floor plane, along the in-plane direction from the floor hit back toward
/// the character.
pub fn locate_edge(floor: Vec3, floor_normal: Vec3, wall: Vec3, character: Vec3) -> Vec3 {
    let floor_right = floor_normal.cross(character - floor);
    let floor_forward = floor_right.cross(floor_normal);

    let len_sq = floor_forward.length_squared();
    if len_sq <= f32::EPSILON {
        return floor;
    }

    let projected = floor_forward * ((wall - floor).dot(floor_forward) / len_sq);
    floor + floor_forward.normalize() * projected.length()
}

/// Closest standing spot past the edge: half a capsule radius inward.
pub fn mantle_target(edge: Vec3, forward: Vec3, capsule: Capsule) -> Vec3 {
    edge + forward * (capsule.radius * 0.5)
}
