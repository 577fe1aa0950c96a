//! Scripted client for exercising callers without a provider.
//!
//! Enabled with the `testing` feature. Replies are served in order; once
//! the script runs out every further call fails.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{CompletionRequest, LlmClient, LlmError};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this text immediately
    Text(String),
    /// Fail with a provider error carrying this body
    Fail(String),
    /// Sleep, then return the text
    Delayed(Duration, String),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    /// A reply that outlives any reasonable timeout
    pub fn hang() -> Self {
        Reply::Delayed(Duration::from_secs(3600), String::new())
    }
}

#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
    finished: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Number of calls started
    pub fn calls(&self) -> usize {
        self.requests().len()
    }

    /// Number of calls that ran to completion (not dropped mid-flight)
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        let result = match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(body)) => Err(LlmError::Api { status: 500, body }),
            Some(Reply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Err(LlmError::InvalidResponse("script exhausted".into())),
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn provider_name(&self) -> &str {
        "Scripted"
    }
}
