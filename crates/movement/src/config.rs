use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("jump.min_height ({min}) must not exceed jump.max_height ({max})")]
    MinAboveMax { min: f32, max: f32 },
    #[error("jump.max_jump_count must be at least 1")]
    NoJumps,
    #[error("launch angles must satisfy 0 < min ({min}) <= max ({max}) < 90 with a positive step")]
    LaunchAngles { min: f32, max: f32 },
}

/// Per-character jump tuning. Lengths in world units, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpProfile {
    /// Apex height when the button is held for `max_hold_time`.
    pub max_height: f32,
    pub time_to_max_height: f32,
    /// Apex height of a tap.
    pub min_height: f32,
    /// Shapes the descent: time it would take the falling gravity to cover
    /// `max_height`.
    pub post_apex_time_to_max_height: f32,
    pub max_hold_time: f32,
    /// How far the character may have fallen and still double jump.
    /// Zero disables the check.
    pub fall_coyote_distance: f32,
    pub max_jump_count: u32,
}

impl Default for JumpProfile {
    fn default() -> Self {
        Self {
            max_height: 300.0,
            time_to_max_height: 0.45,
            min_height: 120.0,
            post_apex_time_to_max_height: 0.35,
            max_hold_time: 0.25,
            fall_coyote_distance: 50.0,
            max_jump_count: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgeConfig {
    pub wall_reach: f32,
    /// Height above the character origin of the open-space probe.
    pub ledge_height_origin: f32,
    pub ledge_height_forward_reach: f32,
    /// Lift applied to the capsule before testing for standing room.
    pub collision_margin: f32,
}

impl Default for LedgeConfig {
    fn default() -> Self {
        Self {
            wall_reach: 80.0,
            ledge_height_origin: 120.0,
            ledge_height_forward_reach: 90.0,
            collision_margin: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MantleStrategy {
    /// Vertical hop sized by the jump kinematics, then a forward push.
    #[default]
    TimedHop,
    /// Single ballistic launch picked by the launch solver.
    Trajectory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MantleConfig {
    pub strategy: MantleStrategy,
    /// Extra clearance above the ledge surface for the capsule base.
    pub height_offset: f32,
    pub time: f32,
    /// Horizontal acceleration along forward while hopping up.
    pub forward_boost: f32,
}

impl Default for MantleConfig {
    fn default() -> Self {
        Self {
            strategy: MantleStrategy::TimedHop,
            height_offset: 10.0,
            time: 0.2,
            forward_boost: 1200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirDashConfig {
    pub distance: f32,
    pub time: f32,
    pub vertical_height: f32,
}

impl Default for AirDashConfig {
    fn default() -> Self {
        Self {
            distance: 400.0,
            time: 0.25,
            vertical_height: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub min_angle_deg: f32,
    pub max_angle_deg: f32,
    pub angle_step_deg: f32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            min_angle_deg: 10.0,
            max_angle_deg: 80.0,
            angle_step_deg: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub jump: JumpProfile,
    pub ledge: LedgeConfig,
    pub mantle: MantleConfig,
    pub air_dash: AirDashConfig,
    pub launch: LaunchConfig,
}

impl MovementConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jump = &self.jump;
        positive("jump.max_height", jump.max_height)?;
        positive("jump.time_to_max_height", jump.time_to_max_height)?;
        positive("jump.min_height", jump.min_height)?;
        positive("jump.post_apex_time_to_max_height", jump.post_apex_time_to_max_height)?;
        positive("jump.max_hold_time", jump.max_hold_time)?;
        non_negative("jump.fall_coyote_distance", jump.fall_coyote_distance)?;
        if jump.min_height > jump.max_height {
            return Err(ConfigError::MinAboveMax {
                min: jump.min_height,
                max: jump.max_height,
            });
        }
        if jump.max_jump_count == 0 {
            return Err(ConfigError::NoJumps);
        }

        positive("ledge.wall_reach", self.ledge.wall_reach)?;
        positive("ledge.ledge_height_origin", self.ledge.ledge_height_origin)?;
        positive("ledge.ledge_height_forward_reach", self.ledge.ledge_height_forward_reach)?;
        positive("ledge.collision_margin", self.ledge.collision_margin)?;

        positive("mantle.time", self.mantle.time)?;
        non_negative("mantle.height_offset", self.mantle.height_offset)?;
        non_negative("mantle.forward_boost", self.mantle.forward_boost)?;

        positive("air_dash.distance", self.air_dash.distance)?;
        positive("air_dash.time", self.air_dash.time)?;
        positive("air_dash.vertical_height", self.air_dash.vertical_height)?;

        let launch = &self.launch;
        if !(launch.min_angle_deg > 0.0
            && launch.min_angle_deg <= launch.max_angle_deg
            && launch.max_angle_deg < 90.0
            && launch.angle_step_deg > 0.0)
        {
            return Err(ConfigError::LaunchAngles {
                min: launch.min_angle_deg,
                max: launch.max_angle_deg,
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
