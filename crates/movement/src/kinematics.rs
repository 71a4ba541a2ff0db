//! Closed-form jump kinematics.
//!
//! Design specifies a jump as a height and the time it takes to reach it.
//! From `h = ½·g·t²` and `v0 = g·t` we get the launch velocity and the
//! gravity that produce exactly that arc; the gravity is returned as a scale
//! on the host's default gravity so the host integrator keeps applying it.

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum KinematicsError {
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

/// Velocity and gravity scale for one designed arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpArc {
    pub velocity: f32,
    pub gravity_scale: f32,
}

impl JumpArc {
    pub fn new(time: f32, height: f32, default_gravity_z: f32) -> Result<Self, KinematicsError> {
        Ok(Self {
            velocity: initial_vertical_velocity(time, height)?,
            gravity_scale: gravity_scale(time, height, default_gravity_z)?,
        })
    }
}

/// Vertical launch speed that reaches `height` after `time`, starting from rest.
pub fn initial_vertical_velocity(time: f32, height: f32) -> Result<f32, KinematicsError> {
    check_time_height(time, height)?;
    Ok(2.0 * height / time)
}

/// Multiplier on `default_gravity_z` that decelerates the arc to zero
/// vertical speed exactly at `height`.
///
/// `default_gravity_z` is signed: a host with gravity pointing down
/// (`-980.0`) gets a positive scale back.
pub fn gravity_scale(time: f32, height: f32, default_gravity_z: f32) -> Result<f32, KinematicsError> {
    check_time_height(time, height)?;
    if !default_gravity_z.is_finite() || default_gravity_z == 0.0 {
        return Err(KinematicsError::InvalidParameter {
            name: "default gravity",
            value: default_gravity_z,
        });
    }

    Ok((-2.0 * height / (time * time)) / default_gravity_z)
}

fn check_time_height(time: f32, height: f32) -> Result<(), KinematicsError> {
    if !time.is_finite() || time <= 0.0 {
        return Err(KinematicsError::InvalidParameter { name: "time", value: time });
    }
    if !height.is_finite() || height <= 0.0 {
        return Err(KinematicsError::InvalidParameter { name: "height", value: height });
    }
    Ok(())
}
