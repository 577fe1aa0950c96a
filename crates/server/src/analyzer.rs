//! Per-image analysis for the vision endpoint.
//!
//! Each photo gets one model call under the same timeout discipline as the
//! planner. Any failure for a photo yields the canned fallback analysis for
//! that photo only. Photos are processed one at a time with a short pause
//! between calls to stay under the provider's own rate limits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use llm_client::{CompletionRequest, LlmClient};
use pipeline::parse_or;
use shot_types::normalize::project_analysis;
use shot_types::{AnalysisResult, InputError, ItemAnalysis, PhotoInput};

use crate::prompts;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Pause between consecutive model calls in one batch
    pub inter_call_delay: Duration,
    pub max_batch: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
            inter_call_delay: Duration::from_millis(250),
            max_batch: crate::config::MAX_PHOTOS,
        }
    }
}

#[derive(Clone)]
pub struct ImageAnalyzer {
    client: Arc<dyn LlmClient>,
    config: AnalyzerConfig,
}

impl ImageAnalyzer {
    pub fn new(client: Arc<dyn LlmClient>, config: AnalyzerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a batch sequentially, one result per photo in input order.
    ///
    /// Oversized or empty batches are rejected before any model call.
    pub async fn analyze_batch(
        &self,
        photos: &[PhotoInput],
    ) -> Result<Vec<AnalysisResult>, InputError> {
        if photos.is_empty() {
            return Err(InputError::EmptyBatch {
                field: "photos".to_string(),
            });
        }
        if photos.len() > self.config.max_batch {
            return Err(InputError::BatchTooLarge {
                field: "photos".to_string(),
                count: photos.len(),
                max: self.config.max_batch,
            });
        }

        let start_time = Instant::now();
        let mut results = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            if index > 0 && !self.config.inter_call_delay.is_zero() {
                tokio::time::sleep(self.config.inter_call_delay).await;
            }
            results.push(self.analyze_one(photo).await);
        }

        info!(
            "Analyzed {} photos in {:.2?}",
            results.len(),
            start_time.elapsed()
        );
        Ok(results)
    }

    /// Analyze one photo. Never fails; degraded photos get the canned analysis.
    pub async fn analyze_one(&self, photo: &PhotoInput) -> AnalysisResult {
        let fallback = ItemAnalysis::fallback();
        let request = CompletionRequest::new(&self.config.model, self.config.max_tokens)
            .system(prompts::VISION_SYSTEM)
            .prompt(prompts::vision_prompt(photo))
            .image(&photo.mime_type, &photo.data);

        debug!("Analyzing {} ({})", photo.filename, photo.mime_type);
        let analysis =
            match tokio::time::timeout(self.config.timeout, self.client.complete(request)).await {
                Ok(Ok(raw)) => {
                    // Null projects to the canned analysis field by field.
                    let value = parse_or(&raw, Value::Null);
                    let source = match value.get("analysis") {
                        Some(nested @ Value::Object(_)) => nested,
                        _ => &value,
                    };
                    project_analysis(source, &fallback)
                }
                Ok(Err(e)) => {
                    warn!("Vision call failed for {}: {}", photo.filename, e);
                    fallback
                }
                Err(_) => {
                    warn!(
                        "Vision call for {} timed out after {:?}",
                        photo.filename, self.config.timeout
                    );
                    fallback
                }
            };

        AnalysisResult {
            filename: photo.filename.clone(),
            analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::testing::{Reply, ScriptedClient};

    fn photo(name: &str) -> PhotoInput {
        PhotoInput {
            filename: name.to_string(),
            data: "aGVsbG8=".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    fn build_analyzer(replies: Vec<Reply>) -> (ImageAnalyzer, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::new(replies));
        let config = AnalyzerConfig {
            timeout: Duration::from_millis(100),
            inter_call_delay: Duration::ZERO,
            ..AnalyzerConfig::default()
        };
        (ImageAnalyzer::new(client.clone(), config), client)
    }

    #[tokio::test]
    async fn test_parse_failure_only_affects_one_photo() {
        let good = r#"{"subject": "lighthouse", "mood": ["lonely"], "visual_energy": 3,
                       "best_role": [{"role": "opening", "score": 0.9}]}"#;
        let (analyzer, client) = build_analyzer(vec![
            Reply::text(good),
            Reply::text("I cannot describe this image."),
            Reply::text(format!("```json\n{good}\n```")),
        ]);

        let results = analyzer
            .analyze_batch(&[photo("1.png"), photo("2.png"), photo("3.png")])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].analysis.subject, "lighthouse");
        assert_eq!(results[1].filename, "2.png");
        assert_eq!(results[1].analysis, ItemAnalysis::fallback());
        assert_eq!(results[2].analysis.visual_energy, 3.0);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_errors_and_timeouts_use_fallback() {
        let (analyzer, client) = build_analyzer(vec![Reply::Fail("boom".into()), Reply::hang()]);

        let results = analyzer
            .analyze_batch(&[photo("a.png"), photo("b.png")])
            .await
            .unwrap();

        assert_eq!(results[0].analysis, ItemAnalysis::fallback());
        assert_eq!(results[1].analysis, ItemAnalysis::fallback());
        assert_eq!(client.finished(), 1);
    }

    #[tokio::test]
    async fn test_partial_output_is_merged_with_defaults() {
        let (analyzer, _client) =
            build_analyzer(vec![Reply::text(r#"{"analysis": {"subject": "crowd", "visual_energy": 42}}"#)]);

        let result = analyzer.analyze_one(&photo("x.png")).await;

        assert_eq!(result.analysis.subject, "crowd");
        assert_eq!(result.analysis.visual_energy, 5.0);
        assert_eq!(result.analysis.composition, ItemAnalysis::fallback().composition);
    }

    #[tokio::test]
    async fn test_request_embeds_image() {
        let (analyzer, client) = build_analyzer(vec![Reply::text("{}")]);

        analyzer.analyze_one(&photo("x.png")).await;

        let requests = client.requests();
        let request = &requests[0];
        assert_eq!(request.images.len(), 1);
        assert_eq!(request.images[0].media_type, "image/png");
        assert_eq!(request.max_tokens, 1024);
        assert!(request.prompt.contains("x.png"));
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected_without_calls() {
        let (analyzer, client) = build_analyzer(vec![]);
        let photos: Vec<_> = (0..40).map(|i| photo(&format!("{i}.png"))).collect();

        let err = analyzer.analyze_batch(&photos).await.unwrap_err();

        assert!(matches!(err, InputError::BatchTooLarge { count: 40, max: 36, .. }));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let (analyzer, _client) = build_analyzer(vec![]);
        assert!(analyzer.analyze_batch(&[]).await.is_err());
    }
}
