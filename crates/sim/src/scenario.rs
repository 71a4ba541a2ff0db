use clap::ValueEnum;
use deft::{InputAction, InputScript, MantleStrategy, MovementConfig};

/// Time the character gets to settle on the ground before the first input.
const SETTLE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Full-height jump, button held throughout.
    Jump,
    /// Jump released right away.
    Tap,
    DoubleJump,
    /// Timed-hop mantle onto a low ledge.
    Mantle,
    /// Ballistic mantle onto a low ledge.
    Trajectory,
    /// Ledge with no room to stand.
    LowCeiling,
    TallWall,
    AirDash,
}

impl Scenario {
    pub fn lane(self) -> &'static str {
        match self {
            Self::Jump | Self::Tap | Self::DoubleJump | Self::AirDash => "open",
            Self::Mantle | Self::Trajectory => "low_ledge",
            Self::LowCeiling => "low_ceiling",
            Self::TallWall => "tall_wall",
        }
    }

    pub fn configure(self, config: &mut MovementConfig) {
        if self == Self::Trajectory {
            config.mantle.strategy = MantleStrategy::Trajectory;
        }
    }

    pub fn script(self, tick_rate: u32) -> InputScript {
        let script = InputScript::new().at_seconds(SETTLE, tick_rate, InputAction::PressJump);

        match self {
            Self::Jump | Self::Mantle | Self::Trajectory | Self::LowCeiling | Self::TallWall => script,
            Self::Tap => script.at_seconds(SETTLE + 0.02, tick_rate, InputAction::ReleaseJump),
            Self::DoubleJump => script
                .at_seconds(SETTLE + 0.02, tick_rate, InputAction::ReleaseJump)
                .at_seconds(SETTLE + 0.25, tick_rate, InputAction::PressJump),
            Self::AirDash => script
                .at_seconds(SETTLE + 0.2, tick_rate, InputAction::AirDash)
                .at_seconds(SETTLE + 0.3, tick_rate, InputAction::AirDash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_presses_jump_after_settling() {
        for scenario in Scenario::value_variants() {
            let mut script = scenario.script(60);
            assert!(script.drain_for_tick(14).is_empty(), "{scenario:?}");
            assert_eq!(script.drain_for_tick(15), vec![InputAction::PressJump]);
        }
    }

    #[test]
    fn only_trajectory_changes_strategy() {
        let mut config = MovementConfig::default();
        Scenario::Mantle.configure(&mut config);
        assert_eq!(config.mantle.strategy, MantleStrategy::TimedHop);

        Scenario::Trajectory.configure(&mut config);
        assert_eq!(config.mantle.strategy, MantleStrategy::Trajectory);
    }
}
