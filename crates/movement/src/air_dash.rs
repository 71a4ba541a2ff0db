use glam::Vec3;

use crate::config::AirDashConfig;
use crate::kinematics::{self, KinematicsError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashRejected {
    NotAirborne,
    AlreadyDashed,
    Kinematics(KinematicsError),
}

/// Velocity and gravity for one dash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashLaunch {
    pub velocity: Vec3,
    pub gravity_scale: f32,
}

pub fn check_air_dash(in_air: bool, has_air_dashed: bool) -> Result<(), DashRejected> {
    if !in_air {
        return Err(DashRejected::NotAirborne);
    }
    if has_air_dashed {
        return Err(DashRejected::AlreadyDashed);
    }
    Ok(())
}

/// Horizontal burst along `forward` plus a short designed hop.
pub fn plan_air_dash(
    config: &AirDashConfig,
    forward: Vec3,
    default_gravity_z: f32,
) -> Result<DashLaunch, DashRejected> {
    let arc = kinematics::JumpArc::new(config.time, config.vertical_height, default_gravity_z)
        .map_err(DashRejected::Kinematics)?;

    let flat = Vec3::new(forward.x, forward.y, 0.0).normalize_or_zero();
    let speed = config.distance / config.time;

    Ok(DashLaunch {
        velocity: flat * speed + Vec3::Z * arc.velocity,
        gravity_scale: arc.gravity_scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_needs_air_and_one_charge() {
        assert_eq!(check_air_dash(false, false), Err(DashRejected::NotAirborne));
        assert_eq!(check_air_dash(true, true), Err(DashRejected::AlreadyDashed));
        assert_eq!(check_air_dash(true, false), Ok(()));
    }

    #[test]
    fn dash_velocity_covers_distance() {
        let config = AirDashConfig {
            distance: 400.0,
            time: 0.25,
            vertical_height: 20.0,
        };
        let launch = plan_air_dash(&config, Vec3::new(0.0, 2.0, 0.5), -980.0).unwrap();

        assert!(launch.velocity.x.abs() < 1e-4);
        assert!((launch.velocity.y - 1600.0).abs() < 1e-2);
        // 2 * 20 / 0.25
        assert!((launch.velocity.z - 160.0).abs() < 1e-3);
        assert!((launch.gravity_scale - 640.0 / 980.0).abs() < 1e-5);
    }

    #[test]
    fn bad_tuning_is_rejected() {
        let config = AirDashConfig {
            time: 0.0,
            ..AirDashConfig::default()
        };
        assert!(matches!(
            plan_air_dash(&config, Vec3::X, -980.0),
            Err(DashRejected::Kinematics(_))
        ));
    }
}
