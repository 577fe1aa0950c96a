//! # Sequence Planner
//!
//! This module turns one request's items into a FinalPlan:
//! 1. Build a compact prompt from the normalized items
//! 2. Call the model once, under a timeout
//! 3. Parse the raw output
//! 4. Validate the proposed ordering
//! 5. Assemble shots, durations and transitions
//!
//! Timeouts, provider errors, unparseable output and invalid orderings all
//! end in the deterministic fallback plan, so `plan` cannot fail. The
//! `usedPlanner` tag and the optional `error` field are the only visible
//! signs of degradation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use llm_client::{CompletionRequest, LlmClient};
pub use pipeline::PlanOutcome;
use pipeline::{ValidationPipeline, fallback_plan, plan_from_output};
use shot_types::{FinalPlan, ItemSet};

use crate::prompts;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Bound on the single model call
    pub timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Terminal result of the model call
enum ModelReply {
    Text(String),
    TimedOut,
    Failed(String),
}

/// Plans one sequence per call. Holds no per-request state.
#[derive(Clone)]
pub struct SequencePlanner {
    client: Arc<dyn LlmClient>,
    config: PlannerConfig,
    validator: Arc<ValidationPipeline>,
}

impl SequencePlanner {
    pub fn new(client: Arc<dyn LlmClient>, config: PlannerConfig) -> Self {
        Self {
            client,
            config,
            validator: Arc::new(ValidationPipeline::standard()),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Main entry point: plan a sequence for the given items.
    pub async fn plan(&self, items: &ItemSet, direction: Option<&str>) -> FinalPlan {
        self.plan_with_outcome(items, direction).await.0
    }

    /// Plan and also report which path produced the plan.
    pub async fn plan_with_outcome(
        &self,
        items: &ItemSet,
        direction: Option<&str>,
    ) -> (FinalPlan, PlanOutcome) {
        let start_time = Instant::now();

        // Building request
        let target_count = items.len();
        let request = CompletionRequest::new(&self.config.model, self.config.max_tokens)
            .system(prompts::SEQUENCE_SYSTEM)
            .prompt(prompts::sequence_prompt(items, direction));
        debug!(
            "Built planning request for {} items ({} prompt bytes)",
            target_count,
            request.prompt.len()
        );

        // Awaiting model
        let (plan, outcome) = match self.call_model(request).await {
            ModelReply::Text(raw) => plan_from_output(&self.validator, items, target_count, &raw),
            ModelReply::TimedOut => {
                warn!(
                    "Planner model timed out after {:?}, using fallback order",
                    self.config.timeout
                );
                (fallback_plan(items, None), PlanOutcome::TimedOut)
            }
            ModelReply::Failed(message) => {
                warn!("Planner model call failed: {}, using fallback order", message);
                (
                    fallback_plan(items, Some(message.clone())),
                    PlanOutcome::Failed(message),
                )
            }
        };

        info!(
            "Planned {} shots via {:?} ({:?}) in {:.2?}",
            plan.ordered_ids.len(),
            plan.used_planner,
            outcome,
            start_time.elapsed()
        );
        (plan, outcome)
    }

    /// One model call. Dropping the future on timeout aborts the request;
    /// a late reply is never observed.
    async fn call_model(&self, request: CompletionRequest) -> ModelReply {
        debug!(
            "Calling {} model {} (timeout {:?})",
            self.client.provider_name(),
            request.model,
            self.config.timeout
        );
        match tokio::time::timeout(self.config.timeout, self.client.complete(request)).await {
            Ok(Ok(text)) => ModelReply::Text(text),
            Ok(Err(e)) => ModelReply::Failed(e.to_string()),
            Err(_) => ModelReply::TimedOut,
        }
    }
}
