use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapObjectKind {
    Ground,
    StaticBox,
}

#[derive(Debug, Clone)]
pub struct MapObject {
    pub kind: MapObjectKind,
    pub position: Vec3,
    pub half_extents: Vec3,
}

impl MapObject {
    pub fn ground(top_z: f32, half_size: f32) -> Self {
        Self {
            kind: MapObjectKind::Ground,
            position: Vec3::new(0.0, 0.0, top_z),
            half_extents: Vec3::new(half_size, half_size, 0.0),
        }
    }

    pub fn static_box(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            kind: MapObjectKind::StaticBox,
            position,
            half_extents,
        }
    }

    /// Box spanning `min..max`.
    pub fn block(min: Vec3, max: Vec3) -> Self {
        Self::static_box((min + max) * 0.5, (max - min) * 0.5)
    }

    pub fn top(&self) -> f32 {
        self.position.z + self.half_extents.z
    }
}
