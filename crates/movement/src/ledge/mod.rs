mod detector;
mod solver;

pub use detector::{
    Ledge, LedgeDetector, LedgeProbe, ProbeMiss, ProbeOrigin, ProbeStages, locate_edge, mantle_target,
};
pub use solver::{LaunchError, LaunchSolution, LaunchSolver, simulate_path};
