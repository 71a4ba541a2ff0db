use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InputAction {
    PressJump,
    ReleaseJump,
    AirDash,
    /// Move stick, x right and y forward, each in `-1..=1`.
    Move { x: f32, y: f32 },
    /// Turns the character to face this horizontal direction.
    Face { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedInput {
    pub tick: u32,
    pub action: InputAction,
}

/// Input timeline replayed by tick. Inputs stay in tick order.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    inputs: VecDeque<ScriptedInput>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u32, action: InputAction) {
        let index = self.inputs.partition_point(|input| input.tick <= tick);
        self.inputs.insert(index, ScriptedInput { tick, action });
    }

    pub fn with(mut self, tick: u32, action: InputAction) -> Self {
        self.push(tick, action);
        self
    }

    /// Schedules by time, rounding to the nearest tick.
    pub fn at_seconds(mut self, seconds: f32, tick_rate: u32, action: InputAction) -> Self {
        let tick = (seconds.max(0.0) * tick_rate as f32).round() as u32;
        self.push(tick, action);
        self
    }

    pub fn drain_for_tick(&mut self, tick: u32) -> Vec<InputAction> {
        let mut result = Vec::new();
        while let Some(input) = self.inputs.front() {
            if input.tick > tick {
                break;
            }
            if let Some(input) = self.inputs.pop_front() {
                result.push(input.action);
            }
        }
        result
    }

    pub fn last_tick(&self) -> Option<u32> {
        self.inputs.back().map(|input| input.tick)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
