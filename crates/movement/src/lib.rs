pub mod air_dash;
pub mod body;
pub mod config;
pub mod controller;
pub mod event;
pub mod jump;
pub mod kinematics;
pub mod ledge;
pub mod locks;
mod mantle;
pub mod map;
pub mod mode;
pub mod physics;
pub mod simulation;

#[cfg(test)]
mod test_support;

pub use air_dash::{DashLaunch, DashRejected};
pub use body::{ActorRef, Capsule, CharacterBody, SpatialQuery, SurfaceHit};
pub use config::{
    AirDashConfig, ConfigError, JumpProfile, LaunchConfig, LedgeConfig, MantleConfig, MantleStrategy,
    MovementConfig,
};
pub use controller::{MovementController, MovementError};
pub use event::{EventLog, LogObserver, MantleFailure, MovementEvent, MovementObserver, RecordedEvent};
pub use jump::{AerialMove, GravityProfile, JumpRejected, JumpState, MantleState};
pub use kinematics::{JumpArc, KinematicsError};
pub use ledge::{
    LaunchError, LaunchSolution, LaunchSolver, Ledge, LedgeDetector, LedgeProbe, ProbeMiss, ProbeOrigin,
    ProbeStages,
};
pub use locks::{InputLocks, LockAxes, SharedInputLocks};
pub use map::{Lane, LedgeCourse, MapObject, MapObjectKind};
pub use mode::{AirborneMode, GroundedMode, ModeContext, ModeKind, MovementMode, Tuning};
pub use physics::{CharacterQueries, KinematicBody, PhysicsWorld};
pub use simulation::{FixedTimestep, InputAction, InputScript, SimulationLoop, SimulationState, TickSample};
