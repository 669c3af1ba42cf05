//! Planner settings, from JSON or the environment.

use crate::error::PlannerError;
use crate::model::ResourceId;
use serde::{Deserialize, Serialize};

pub const ENV_MAX_DEPTH: &str = "CRAFT_PLANNER_MAX_DEPTH";
pub const ENV_QUEUE_BUFFER: &str = "CRAFT_PLANNER_QUEUE_BUFFER";
pub const ENV_FALLBACK_FUEL: &str = "CRAFT_PLANNER_FALLBACK_FUEL";

pub const DEFAULT_MAX_DEPTH: usize = 8;
pub const DEFAULT_QUEUE_BUFFER: usize = 32;

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_queue_buffer() -> usize {
    DEFAULT_QUEUE_BUFFER
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Recursion bound for the resolver. Nodes past it become raw-gather leaves.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Try methods whose inputs are already owned before the default one.
    #[serde(default = "default_true")]
    pub prefer_satisfiable: bool,
    /// Channel capacity of the job slot actor.
    #[serde(default = "default_queue_buffer")]
    pub queue_buffer: usize,
    /// Overrides the catalog's fallback fuel.
    #[serde(default)]
    pub fallback_fuel: Option<ResourceId>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            prefer_satisfiable: true,
            queue_buffer: DEFAULT_QUEUE_BUFFER,
            fallback_fuel: None,
        }
    }
}

impl PlannerConfig {
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| PlannerError::Config(err.to_string()))?;
        config.validated()
    }

    pub fn from_env() -> Result<Self, PlannerError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with<F>(mut getter: F) -> Result<Self, PlannerError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_depth: parse_env(&mut getter, ENV_MAX_DEPTH)?.unwrap_or(defaults.max_depth),
            queue_buffer: parse_env(&mut getter, ENV_QUEUE_BUFFER)?
                .unwrap_or(defaults.queue_buffer),
            fallback_fuel: getter(ENV_FALLBACK_FUEL)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(ResourceId::from),
            ..defaults
        };
        config.validated()
    }

    fn validated(self) -> Result<Self, PlannerError> {
        if self.max_depth == 0 {
            return Err(PlannerError::Config("max_depth must be at least 1".into()));
        }
        if self.queue_buffer == 0 {
            return Err(PlannerError::Config("queue_buffer must be at least 1".into()));
        }
        Ok(self)
    }
}

fn parse_env<F>(getter: &mut F, key: &'static str) -> Result<Option<usize>, PlannerError>
where
    F: FnMut(&str) -> Option<String>,
{
    match getter(key) {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| PlannerError::Config(format!("invalid {key}: {value}"))),
        None => Ok(None),
    }
}
