mod observer;
mod types;

pub use observer::{EventLog, LogObserver, MovementObserver, RecordedEvent};
pub use types::{MantleFailure, MovementEvent};
