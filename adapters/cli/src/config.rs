//! Planner limits loaded from a TOML file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use lux_agent_core::PlannerConfig;

/// Reads planner limits from `path`; missing keys keep their defaults.
pub(crate) fn load(path: &Path) -> Result<PlannerConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read planner config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid planner config at {}", path.display()))
}

fn parse(contents: &str) -> Result<PlannerConfig> {
    toml::from_str(contents).context("failed to parse planner config toml contents")
}
