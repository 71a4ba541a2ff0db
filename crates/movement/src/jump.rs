use glam::Vec3;

use crate::config::{JumpProfile, MantleStrategy};
use crate::kinematics::{self, KinematicsError};
use crate::locks::LockAxes;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpRejected {
    /// The host's own predicate said no.
    HostRefused,
    /// An air dash owns the aerial state until landing.
    AirDashActive,
    JumpLimit { count: u32, max: u32 },
    CoyoteExpired { fallen: f32, limit: f32 },
}

/// Gravity scales derived once from the jump profile and the host gravity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityProfile {
    pub default_gravity_z: f32,
    /// Host gravity scale outside any special move.
    pub default_scale: f32,
    pub jump_velocity: f32,
    /// Ascent gravity of a fully held jump.
    pub max_pre_jump: f32,
    /// Ascent gravity of a tap.
    pub min_pre_jump: f32,
    pub post_apex: f32,
}

impl GravityProfile {
    pub fn new(
        profile: &JumpProfile,
        default_gravity_z: f32,
        default_scale: f32,
    ) -> Result<Self, KinematicsError> {
        let max = kinematics::JumpArc::new(
            profile.time_to_max_height,
            profile.max_height,
            default_gravity_z,
        )?;

        // A lower apex is reached proportionally sooner: 4m in 1s means 2m in 0.5s.
        let time_scale = profile.max_height / profile.min_height;
        let min_pre_jump = kinematics::gravity_scale(
            profile.time_to_max_height / time_scale,
            profile.min_height,
            default_gravity_z,
        )?;
        let post_apex = kinematics::gravity_scale(
            profile.post_apex_time_to_max_height,
            profile.max_height,
            default_gravity_z,
        )?;

        for (name, value) in [
            ("pre-jump gravity scale", max.gravity_scale),
            ("tap gravity scale", min_pre_jump),
            ("post-apex gravity scale", post_apex),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(KinematicsError::InvalidParameter { name, value });
            }
        }

        Ok(Self {
            default_gravity_z,
            default_scale,
            jump_velocity: max.velocity,
            max_pre_jump: max.gravity_scale,
            min_pre_jump,
            post_apex,
        })
    }

    /// Ascent gravity for a jump whose button was held `hold_time`.
    pub fn hold_scale(&self, hold_time: f32, max_hold_time: f32) -> f32 {
        let t = if max_hold_time > 0.0 {
            (hold_time / max_hold_time).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.min_pre_jump + (self.max_pre_jump - self.min_pre_jump) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MantleState {
    pub strategy: MantleStrategy,
    pub edge: Vec3,
    pub target: Vec3,
    /// Locks this mantle still has to give back.
    pub held_locks: LockAxes,
}

/// The aerial move that currently owns the gravity scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AerialMove {
    #[default]
    None,
    Jump,
    Mantle(MantleState),
    AirDash,
}

impl AerialMove {
    /// Jumps and timed hops switch to falling gravity at the apex. A solved
    /// trajectory keeps the gravity it was solved for.
    fn tracks_apex(&self) -> bool {
        matches!(
            self,
            Self::Jump
                | Self::Mantle(MantleState {
                    strategy: MantleStrategy::TimedHop,
                    ..
                })
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct JumpState {
    pub in_air: bool,
    pub apex_reached: bool,
    pub holding_jump_key: bool,
    /// Hold time is accumulating; stops on release or apex.
    pub hold_active: bool,
    pub hold_time: f32,
    pub jump_start_position: Vec3,
    pub apex_height_so_far: f32,
    pub fall_origin: Option<Vec3>,
    pub jump_count: u32,
    pub has_air_dashed: bool,
    pub aerial: AerialMove,
}

impl JumpState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fall_origin_set(&self) -> bool {
        self.fall_origin.is_some()
    }

    pub fn is_mantling(&self) -> bool {
        matches!(self.aerial, AerialMove::Mantle(_))
    }

    pub fn fallen_distance(&self, position: Vec3) -> f32 {
        self.fall_origin
            .map(|origin| (origin.z - position.z).abs())
            .unwrap_or(0.0)
    }

    /// Decides whether a jump may start. Returns whether it is a double jump.
    pub fn check_jump(
        &self,
        profile: &JumpProfile,
        can_jump: bool,
        is_falling: bool,
        position: Vec3,
    ) -> Result<bool, JumpRejected> {
        if !can_jump {
            return Err(JumpRejected::HostRefused);
        }
        if self.aerial == AerialMove::AirDash {
            return Err(JumpRejected::AirDashActive);
        }
        let count = self.jumps_used(is_falling);
        if count >= profile.max_jump_count {
            return Err(JumpRejected::JumpLimit {
                count,
                max: profile.max_jump_count,
            });
        }

        let double_jump = is_falling;
        if double_jump && profile.fall_coyote_distance > 0.0 {
            let fallen = self.fallen_distance(position);
            if fallen > profile.fall_coyote_distance {
                return Err(JumpRejected::CoyoteExpired {
                    fallen,
                    limit: profile.fall_coyote_distance,
                });
            }
        }

        Ok(double_jump)
    }

    /// Jumps spent this airtime. Leaving the ground without jumping spends
    /// the first one.
    fn jumps_used(&self, is_falling: bool) -> u32 {
        if is_falling && self.jump_count == 0 {
            1
        } else {
            self.jump_count
        }
    }

    /// Bookkeeping for an accepted jump. Velocity and gravity are the caller's.
    pub fn begin_jump(&mut self, position: Vec3, double_jump: bool) {
        if self.jump_count == 0 {
            self.jump_start_position = position;
            self.apex_height_so_far = 0.0;
        }
        self.in_air = true;
        self.apex_reached = false;
        self.jump_count = self.jumps_used(double_jump) + 1;
        self.aerial = AerialMove::Jump;
    }

    pub fn press(&mut self) {
        self.holding_jump_key = true;
        self.hold_active = true;
        self.hold_time = 0.0;
    }

    /// Ends the hold window. Returns the ascent gravity to apply when the
    /// jump still owns it.
    pub fn release(&mut self, gravity: &GravityProfile, max_hold_time: f32) -> Option<f32> {
        self.holding_jump_key = false;
        if !self.hold_active {
            return None;
        }
        self.hold_active = false;

        if self.aerial != AerialMove::Jump || self.apex_reached {
            return None;
        }
        Some(gravity.hold_scale(self.hold_time, max_hold_time))
    }

    pub fn accumulate_hold(&mut self, dt: f32) {
        if self.hold_active && self.aerial == AerialMove::Jump {
            self.hold_time += dt;
        }
    }

    pub fn track_height(&mut self, position: Vec3) {
        if self.aerial == AerialMove::Jump && !self.apex_reached {
            let height = position.z - self.jump_start_position.z;
            self.apex_height_so_far = self.apex_height_so_far.max(height);
        }
    }

    /// Flags the apex the first tick a jump or mantle starts descending.
    pub fn detect_apex(&mut self, vertical_velocity: f32) -> bool {
        if !self.aerial.tracks_apex() || self.apex_reached || vertical_velocity >= 0.0 {
            return false;
        }
        self.apex_reached = true;
        self.hold_active = false;
        self.hold_time = 0.0;
        true
    }

    pub fn capture_fall_origin(&mut self, vertical_velocity: f32, position: Vec3) -> Option<Vec3> {
        if !self.in_air || vertical_velocity >= 0.0 || self.fall_origin.is_some() {
            return None;
        }
        self.fall_origin = Some(position);
        self.fall_origin
    }

    /// Drops jump and mantle ownership. Returns the mantle so its locks can
    /// be given back.
    pub fn cancel_aerial_move(&mut self) -> Option<MantleState> {
        let mantle = match self.aerial {
            AerialMove::Mantle(mantle) => Some(mantle),
            _ => None,
        };
        self.aerial = AerialMove::None;
        self.apex_reached = false;
        self.hold_active = false;
        mantle
    }

    pub fn reset_airborne(&mut self) -> Option<MantleState> {
        let mantle = self.cancel_aerial_move();
        self.in_air = false;
        self.fall_origin = None;
        self.hold_time = 0.0;
        self.jump_start_position = Vec3::ZERO;
        self.apex_height_so_far = 0.0;
        mantle
    }

    pub fn reset_grounded(&mut self) {
        self.jump_count = 0;
        self.has_air_dashed = false;
    }
}
