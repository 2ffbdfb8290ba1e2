//! LLM-backed synthesis of collected service data
//!
//! Only successful results are summarized. Every failure path degrades to a
//! fixed message; summarization never fails a run.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use svc_router_common::{ChatMessage, CompletionClient, ExecutionResult};
use tracing::{instrument, warn};

/// Returned when no successful results exist; no LLM call is made.
pub const NO_DATA_MESSAGE: &str = "No data was collected from services.";

/// Returned when the summarization call itself fails.
pub const FALLBACK_MESSAGE: &str =
    "Unable to generate summary. Raw data is available in the execution history.";

pub struct Summarizer {
    llm: Arc<dyn CompletionClient>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Produce one natural-language synthesis of all successful results.
    #[instrument(skip_all, fields(results = results.len()))]
    pub async fn summarize(
        &self,
        user_prompt: &str,
        results: &HashMap<String, ExecutionResult>,
    ) -> String {
        // BTreeMap keeps the prompt deterministic across runs
        let collected: BTreeMap<&str, &serde_json::Value> = results
            .iter()
            .filter(|(_, r)| r.is_success())
            .filter_map(|(name, r)| r.data.as_ref().map(|d| (name.as_str(), d)))
            .collect();

        if collected.is_empty() {
            return NO_DATA_MESSAGE.to_string();
        }

        let prompt = build_summary_prompt(user_prompt, &collected);
        match self.llm.complete(&[ChatMessage::user(prompt)]).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => FALLBACK_MESSAGE.to_string(),
            Err(e) => {
                warn!("Summary generation failed: {}", e);
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

fn build_summary_prompt(
    user_prompt: &str,
    collected: &BTreeMap<&str, &serde_json::Value>,
) -> String {
    let data = serde_json::to_string_pretty(collected).unwrap_or_default();

    format!(
        r#"You are a helpful assistant that summarizes data collected from multiple services.

User's Original Request: {user_prompt}

Data Collected from Services:
{data}

Please provide a comprehensive, well-structured summary that:
1. Directly answers the user's request
2. Highlights the most important information
3. Presents data in a clear, readable format
4. Avoids technical jargon
5. Is concise but complete

Format the response in markdown for readability."#,
    )
}
