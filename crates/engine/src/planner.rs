//! Prompt construction and model-output parsing
//!
//! Two planning styles share this module. The structured planner asks for one
//! JSON object holding a complete ordered plan; the ReAct planner asks for a
//! single Thought/Action/Action Input triple per turn. Both defend against
//! models that wrap their output in prose.

use crate::error::{EngineError, EngineResult};
use crate::registry::ServiceRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use svc_router_common::{ActionType, ChatMessage, CompletionClient, Plan};
use tracing::{debug, instrument, warn};

const PLAN_SYSTEM_PROMPT: &str =
    "You are an expert service orchestration planner. Always respond with valid JSON.";

/// Planner that produces a complete ordered plan in one model call
pub struct StructuredPlanner {
    llm: Arc<dyn CompletionClient>,
}

impl StructuredPlanner {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Ask the model for a plan over the registered services.
    ///
    /// A response without a parsable JSON object yields a planning error
    /// carrying the raw text; it never panics and never produces a partial
    /// plan.
    #[instrument(skip_all, fields(model = %self.llm.model()))]
    pub async fn plan(&self, registry: &ServiceRegistry, user_query: &str) -> EngineResult<Plan> {
        let prompt = build_plan_prompt(registry, user_query);
        let messages = [
            ChatMessage::system(PLAN_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        let raw = self.llm.complete(&messages).await?;
        debug!("Planner response: {} chars", raw.len());
        parse_plan(&raw)
    }
}

/// Build the structured-plan prompt: registry rendering, user request, and a
/// strict output-format contract.
pub fn build_plan_prompt(registry: &ServiceRegistry, user_query: &str) -> String {
    format!(
        r#"You are a service orchestration planning agent.

Your task is to analyze the user's request and create a detailed execution plan using the available services.

{services}

User Request: {user_query}

Instructions:
1. Analyze the user's request to understand what information they need
2. Identify which services from the registry are relevant
3. Determine the sequence of service calls
4. For each call, specify the exact service name, why it is needed, and what inputs to provide (and where they come from: the user request, constants, or previous step outputs)

Output your response in the following JSON format:
{{
  "reasoning": "Your overall reasoning and approach",
  "plan": [
    {{
      "step": 1,
      "service_name": "exact service name from the registry",
      "rationale": "Why this service is needed",
      "inputs": {{
        "param_name": {{"value": "actual_value", "source": "user_query|constant|step_N"}}
      }},
      "expected_outputs": "What this step will return"
    }}
  ]
}}

Ensure your response is valid JSON that can be parsed. Be specific about input values and their sources."#,
        services = registry.llm_context(),
        user_query = user_query,
    )
}

/// Parse a structured-plan response, extracting the first balanced JSON
/// object from the surrounding text.
pub fn parse_plan(raw: &str) -> EngineResult<Plan> {
    let span = extract_json_object(raw).ok_or_else(|| {
        EngineError::planning("No JSON object found in planner response", raw)
    })?;

    serde_json::from_str::<Plan>(span).map_err(|e| {
        warn!("Plan JSON rejected: {}", e);
        EngineError::planning(format!("Failed to parse plan JSON: {}", e), raw)
    })
}

/// Extract the first balanced `{...}` span, honoring string literals and
/// escapes so braces inside strings do not end the object early.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// One decoded ReAct turn
#[derive(Debug, Clone)]
pub struct ReactDecision {
    pub thought: Option<String>,
    pub action: Option<ActionType>,
    pub input: Value,
}

/// Build the ReAct prompt for the next turn, embedding the accumulated
/// observations of earlier actions.
pub fn build_react_prompt(
    registry: &ServiceRegistry,
    user_prompt: &str,
    observations: &str,
) -> String {
    format!(
        r#"You are an intelligent service orchestration agent using the ReAct (Reasoning + Acting) pattern.

Your task is to help the user by orchestrating calls to available services.

{services}

User Request: {user_prompt}

{observations}

You must follow this format strictly:

Thought: [Your reasoning about what to do next]
Action: [The action to take - either EXECUTE_SERVICE, ANALYZE_RESULT, or FINAL_ANSWER]
Action Input: [JSON with details about the action]

If Action is EXECUTE_SERVICE:
  Action Input should be: {{"service_name": "...", "params": {{...}}}}

If Action is ANALYZE_RESULT:
  Action Input should be: {{"analysis": "..."}}

If Action is FINAL_ANSWER:
  Action Input should be: {{"answer": "..."}}

Think step by step. Execute services one at a time. After each service execution, analyze the result before deciding next steps."#,
        services = registry.llm_context(),
        user_prompt = user_prompt,
        observations = observations,
    )
}

/// Parse one Thought/Action/Action Input triple.
///
/// Missing sections decode to `None`; an unparsable Action Input payload is
/// preserved verbatim under a `raw` key instead of being discarded.
pub fn parse_react_response(raw: &str) -> ReactDecision {
    let thought = section_after(raw, "Thought:", &["Action:"]);
    let action_label = section_after(raw, "Action:", &["Action Input:"]);

    let action = action_label
        .as_deref()
        .filter(|label| !label.is_empty())
        .map(ActionType::parse);

    let input = match raw.find("Action Input:") {
        Some(pos) => {
            let rest = &raw[pos + "Action Input:".len()..];
            match extract_json_object(rest) {
                Some(span) => serde_json::from_str(span)
                    .unwrap_or_else(|_| json!({ "raw": span })),
                None => {
                    let text = rest.trim();
                    if text.is_empty() {
                        json!({})
                    } else {
                        json!({ "raw": text })
                    }
                }
            }
        }
        None => json!({}),
    };

    ReactDecision {
        thought,
        action,
        input,
    }
}

/// Text between `label` and the first of `terminators` (or end of input).
fn section_after(text: &str, label: &str, terminators: &[&str]) -> Option<String> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];

    let end = terminators
        .iter()
        .filter_map(|t| rest.find(t))
        .min()
        .unwrap_or(rest.len());

    let section = rest[..end].trim();
    if section.is_empty() {
        None
    } else {
        Some(section.to_string())
    }
}
