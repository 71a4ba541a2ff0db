use glam::Vec3;

use crate::config::LaunchConfig;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LaunchError {
    #[error("gravity magnitude must be positive, got {0}")]
    InvalidGravity(f32),
    #[error("no launch angle clears the target")]
    NoSolution,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchSolution {
    pub velocity: Vec3,
    pub angle_deg: f32,
    pub speed: f32,
    pub flight_time: f32,
    /// Peak height of the arc above the start.
    pub apex_height: f32,
}

/// Flight times closer than this are treated as equal.
const FLIGHT_TIME_TIE: f32 = 0.01;
const DENOMINATOR_EPSILON: f32 = 1e-6;
const MAX_SIMULATED_FLIGHT: f32 = 5.0;

/// Scans launch angles for a ballistic arc from `start` through `target`.
#[derive(Debug, Clone)]
pub struct LaunchSolver {
    min_angle_deg: f32,
    max_angle_deg: f32,
    angle_step_deg: f32,
}

impl Default for LaunchSolver {
    fn default() -> Self {
        Self::new(&LaunchConfig::default())
    }
}

impl LaunchSolver {
    pub fn new(config: &LaunchConfig) -> Self {
        Self {
            min_angle_deg: config.min_angle_deg,
            max_angle_deg: config.max_angle_deg,
            angle_step_deg: config.angle_step_deg,
        }
    }

    fn angles(&self) -> impl Iterator<Item = f32> + '_ {
        let count = if self.angle_step_deg > 0.0 {
            ((self.max_angle_deg - self.min_angle_deg) / self.angle_step_deg + 1e-4).floor() as usize
        } else {
            0
        };
        (0..=count).map(move |i| self.min_angle_deg + i as f32 * self.angle_step_deg)
    }

    /// Picks the accepted angle with the shortest flight time, breaking ties
    /// toward the steeper arc. `gravity` is the magnitude of the effective
    /// downward acceleration.
    pub fn solve(&self, start: Vec3, target: Vec3, gravity: f32) -> Result<LaunchSolution, LaunchError> {
        if !gravity.is_finite() || gravity <= 0.0 {
            return Err(LaunchError::InvalidGravity(gravity));
        }

        let offset = target - start;
        let horizontal = Vec3::new(offset.x, offset.y, 0.0);
        let dx = horizontal.length();
        let dy = offset.z;
        let direction = horizontal.normalize_or_zero();

        let mut best: Option<LaunchSolution> = None;

        for angle_deg in self.angles() {
            let theta = angle_deg.to_radians();
            let (sin, cos) = theta.sin_cos();

            let numerator = gravity * dx * dx;
            let denominator = 2.0 * cos * cos * (dx * theta.tan() - dy);
            if denominator.abs() <= DENOMINATOR_EPSILON {
                log::trace!("launch angle {:.1}: divide by zero, skipped", angle_deg);
                continue;
            }

            let speed_sq = numerator / denominator;
            if speed_sq <= 0.0 {
                log::trace!("launch angle {:.1}: v0^2 = {:.2}, skipped", angle_deg, speed_sq);
                continue;
            }

            let apex_height = speed_sq * sin * sin / (2.0 * gravity);
            if apex_height < dy {
                log::trace!(
                    "launch angle {:.1}: apex {:.2} below target {:.2}",
                    angle_deg,
                    apex_height,
                    dy
                );
                continue;
            }

            let speed = speed_sq.sqrt();
            let vertical = speed * sin;
            let discriminant = vertical * vertical + 2.0 * gravity * dy;
            if discriminant < 0.0 {
                continue;
            }
            let flight_time = (vertical + discriminant.sqrt()) / gravity;

            let candidate = LaunchSolution {
                velocity: direction * (speed * cos) + Vec3::Z * vertical,
                angle_deg,
                speed,
                flight_time,
                apex_height,
            };
            log::trace!(
                "launch angle {:.1}: speed {:.2}, flight {:.3}s",
                angle_deg,
                speed,
                flight_time
            );

            let better = match &best {
                None => true,
                Some(current) if (flight_time - current.flight_time).abs() <= FLIGHT_TIME_TIE => {
                    angle_deg > current.angle_deg
                }
                Some(current) => flight_time < current.flight_time,
            };
            if better {
                best = Some(candidate);
            }
        }

        best.ok_or(LaunchError::NoSolution)
    }
}

/// Samples the arc with the same explicit step a host integrator would take.
pub fn simulate_path(start: Vec3, velocity: Vec3, gravity: f32, flight_time: f32, step: f32) -> Vec<Vec3> {
    let mut points = vec![start];
    if step <= 0.0 {
        return points;
    }

    let duration = flight_time.min(MAX_SIMULATED_FLIGHT);
    let mut position = start;
    let mut velocity = velocity;
    let mut time = 0.0;
    while time < duration {
        position += velocity * step;
        velocity.z -= gravity * step;
        points.push(position);
        time += step;
    }
    points
}
