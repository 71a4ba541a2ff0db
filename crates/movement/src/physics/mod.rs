mod body;
mod world;

pub use body::KinematicBody;
pub use world::{CharacterQueries, DEFAULT_GRAVITY_Z, PhysicsWorld};
