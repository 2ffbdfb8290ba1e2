//! Test support: a scripted completion client
//!
//! Replays canned responses in order so loop behavior can be exercised
//! without a live model endpoint.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use svc_router_common::{ChatMessage, CompletionClient, LlmError, LlmResult};

/// Completion client that replays a fixed script.
///
/// Responses are consumed in order; the final response repeats once the
/// script is exhausted, so step-budget tests can run the loop indefinitely.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedClient {
    pub fn new<S: Into<String>>(responses: Vec<S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Client whose every call fails.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> LlmResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(LlmError::Api {
                status: 500,
                body: "scripted failure".to_string(),
            });
        }

        let mut responses = self.responses.lock().expect("script lock poisoned");
        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            1 => Ok(responses
                .front()
                .cloned()
                .unwrap_or_default()),
            _ => Ok(responses.pop_front().unwrap_or_default()),
        }
    }
}
