mod ledge_course;
mod objects;

pub use ledge_course::{Lane, LedgeCourse};
pub use objects::{MapObject, MapObjectKind};
