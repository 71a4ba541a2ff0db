use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use deft::{Capsule, InputAction, InputScript, MovementConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CapsuleConfig {
    pub radius: f32,
    pub half_height: f32,
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        Self {
            radius: 34.0,
            half_height: 88.0,
        }
    }
}

impl From<CapsuleConfig> for Capsule {
    fn from(config: CapsuleConfig) -> Self {
        Capsule::new(config.radius, config.half_height)
    }
}

/// One scripted input, timed in seconds from the start of the run.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptEntry {
    pub at: f32,
    #[serde(flatten)]
    pub action: InputAction,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub movement: MovementConfig,
    pub capsule: CapsuleConfig,
    /// Replaces the scenario's own inputs when not empty.
    pub script: Vec<ScriptEntry>,
}

impl SimConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.movement.validate()?;
        Ok(config)
    }

    pub fn custom_script(&self, tick_rate: u32) -> Option<InputScript> {
        if self.script.is_empty() {
            return None;
        }

        let script = self
            .script
            .iter()
            .fold(InputScript::new(), |script, entry| {
                script.at_seconds(entry.at, tick_rate, entry.action)
            });
        Some(script)
    }
}
