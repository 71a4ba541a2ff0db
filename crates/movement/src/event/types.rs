use glam::Vec3;

use crate::air_dash::DashRejected;
use crate::config::MantleStrategy;
use crate::jump::JumpRejected;
use crate::kinematics::KinematicsError;
use crate::ledge::{LaunchError, LedgeProbe};
use crate::locks::LockAxes;
use crate::mode::ModeKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MantleFailure {
    Kinematics(KinematicsError),
    Launch(LaunchError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MovementEvent {
    ModeChanged {
        from: ModeKind,
        to: ModeKind,
    },
    JumpStarted {
        jump_count: u32,
        double_jump: bool,
        velocity_z: f32,
        gravity_scale: f32,
    },
    JumpRejected {
        reason: JumpRejected,
    },
    JumpReleased {
        hold_time: f32,
        gravity_scale: f32,
    },
    ApexReached {
        height: f32,
        gravity_scale: f32,
    },
    FallOriginCaptured {
        origin: Vec3,
    },
    LedgeProbed {
        probe: LedgeProbe,
    },
    MantleStarted {
        strategy: MantleStrategy,
        edge: Vec3,
        target: Vec3,
        velocity: Vec3,
        gravity_scale: f32,
    },
    MantleFailed {
        reason: MantleFailure,
    },
    /// Sampled arc of a solved mantle launch, for drawing.
    LaunchPlanned {
        angle_deg: f32,
        flight_time: f32,
        path: Vec<Vec3>,
    },
    AirDashed {
        velocity: Vec3,
        gravity_scale: f32,
    },
    AirDashRejected {
        reason: DashRejected,
    },
    LocksChanged {
        locked: LockAxes,
    },
    Landed {
        jump_count: u32,
        apex_height: f32,
    },
}

impl MovementEvent {
    /// Debug chatter, as opposed to state changes.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LedgeProbed { .. } | Self::LaunchPlanned { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ModeChanged { .. } => "mode_changed",
            Self::JumpStarted { .. } => "jump_started",
            Self::JumpRejected { .. } => "jump_rejected",
            Self::JumpReleased { .. } => "jump_released",
            Self::ApexReached { .. } => "apex_reached",
            Self::FallOriginCaptured { .. } => "fall_origin_captured",
            Self::LedgeProbed { .. } => "ledge_probed",
            Self::MantleStarted { .. } => "mantle_started",
            Self::MantleFailed { .. } => "mantle_failed",
            Self::LaunchPlanned { .. } => "launch_planned",
            Self::AirDashed { .. } => "air_dashed",
            Self::AirDashRejected { .. } => "air_dash_rejected",
            Self::LocksChanged { .. } => "locks_changed",
            Self::Landed { .. } => "landed",
        }
    }
}
