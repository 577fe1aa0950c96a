//! Service configuration from the environment.
//!
//! Model ids resolve in layers: the endpoint-specific variable wins, then
//! the global `LLM_MODEL`, then the built-in default. Numeric settings
//! that fail to parse are reported and left at their defaults.

use std::time::Duration;

use tracing::warn;

use crate::analyzer::AnalyzerConfig;
use crate::planner::PlannerConfig;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Most photos one vision request may carry
pub const MAX_PHOTOS: usize = 36;

/// Most analysis results one sequence request may carry
pub const MAX_ANALYSIS_RESULTS: usize = 200;

/// Model id and output cap for one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub vision: EndpointConfig,
    pub sequence: EndpointConfig,
    pub model_timeout: Duration,
    pub vision_delay: Duration,
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, or a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let model = |endpoint_key: &str| {
            get(endpoint_key)
                .or_else(|| get("LLM_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string())
        };

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8787".to_string()),
            vision: EndpointConfig {
                model: model("VISION_MODEL"),
                max_tokens: positive(&get, "VISION_MAX_TOKENS", 1024),
            },
            sequence: EndpointConfig {
                model: model("SEQUENCE_MODEL"),
                max_tokens: positive(&get, "SEQUENCE_MAX_TOKENS", 4096),
            },
            model_timeout: Duration::from_secs(positive(&get, "MODEL_TIMEOUT_SECS", 30)),
            vision_delay: Duration::from_millis(number(&get, "VISION_DELAY_MS", 250)),
            rate_limit_window: Duration::from_secs(positive(&get, "RATE_LIMIT_WINDOW_SECS", 60)),
            rate_limit_max_requests: positive(&get, "RATE_LIMIT_MAX_REQUESTS", 30),
        }
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            model: self.sequence.model.clone(),
            max_tokens: self.sequence.max_tokens,
            timeout: self.model_timeout,
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            model: self.vision.model.clone(),
            max_tokens: self.vision.max_tokens,
            timeout: self.model_timeout,
            inter_call_delay: self.vision_delay,
            max_batch: MAX_PHOTOS,
        }
    }
}

fn number<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            default
        }),
    }
}

/// Like `number`, but zero is also rejected.
fn positive<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + PartialEq + Default,
    G: Fn(&str) -> Option<String>,
{
    let value = number(get, key, default);
    if value == T::default() {
        warn!("Ignoring {}=0: must be positive", key);
        return default;
    }
    value
}
