//! Runner configuration read from the environment.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use skirmish_ai::AiConfig;
use skirmish_core::GridShape;

/// Smallest board the demo layout fits on.
const MIN_WIDTH: u32 = 8;
const MIN_HEIGHT: u32 = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Turns to play, counting both factions.
    pub turns: u32,
    /// RON file holding an `AiConfig`; defaults apply when unset.
    pub ai_config: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            turns: 40,
            ai_config: None,
            width: 16,
            height: 10,
        }
    }
}

impl SimConfig {
    /// Environment variables:
    /// - `SKIRMISH_TURNS` - turns to play (default: 40)
    /// - `SKIRMISH_AI_CONFIG` - path to a RON `AiConfig`
    /// - `SKIRMISH_WIDTH` / `SKIRMISH_HEIGHT` - board size (default: 16x10)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SimConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(turns) = read_env::<u32>(&lookup, "SKIRMISH_TURNS") {
            config.turns = turns;
        }
        if let Some(path) = lookup("SKIRMISH_AI_CONFIG").filter(|path| !path.is_empty()) {
            config.ai_config = Some(PathBuf::from(path));
        }
        if let Some(width) = read_env::<u32>(&lookup, "SKIRMISH_WIDTH") {
            config.width = width.max(MIN_WIDTH);
        }
        if let Some(height) = read_env::<u32>(&lookup, "SKIRMISH_HEIGHT") {
            config.height = height.max(MIN_HEIGHT);
        }

        config
    }

    pub fn shape(&self) -> GridShape {
        GridShape::new(self.width, self.height)
    }

    /// Loads and validates the AI tunables.
    pub fn load_ai_config(&self) -> Result<AiConfig> {
        let config = match &self.ai_config {
            Some(path) => load_ron(path)?,
            None => AiConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn load_ron(path: &Path) -> Result<AiConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read AI config {}", path.display()))?;
    ron::from_str(&content)
        .with_context(|| format!("failed to parse AI config RON {}", path.display()))
}

fn read_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(SimConfig::from_lookup(|_| None), SimConfig::default());
    }

    #[test]
    fn variables_override_and_clamp() {
        let config = SimConfig::from_lookup(lookup(&[
            ("SKIRMISH_TURNS", "12"),
            ("SKIRMISH_WIDTH", "3"),
            ("SKIRMISH_HEIGHT", "not a number"),
            ("SKIRMISH_AI_CONFIG", ""),
        ]));
        assert_eq!(config.turns, 12);
        assert_eq!(config.width, MIN_WIDTH);
        assert_eq!(config.height, 10);
        assert_eq!(config.ai_config, None);
    }
}
