use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a registered service may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("Unsupported HTTP method: {}", other)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

/// Descriptor for one registered REST service
///
/// The `method` field is kept in its wire form and validated when the service
/// is invoked, so a registry file with an unknown verb still loads and the
/// failure is reported per call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Unique registry key
    pub id: String,

    /// Human-readable name, used by the planner to reference the service
    pub name: String,

    /// Endpoint URL
    pub url: String,

    /// HTTP verb in wire form (GET, POST, PUT, DELETE)
    pub method: String,

    /// Free-text description fed to the LLM during planning
    pub description: String,

    /// Declared input parameter names
    #[serde(default)]
    pub input_params: Vec<String>,

    /// Declared output parameter names; non-empty means responses are
    /// projected down to these keys
    #[serde(default)]
    pub output_params: Vec<String>,

    /// Extra headers sent with every call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,

    /// Bearer token injected as an Authorization header, never logged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Free-form classification tags, surfaced to the planner
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Business domain of the service, surfaced to the planner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Example inputs, surfaced to the planner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_inputs: Option<Value>,
}

/// Outcome classification of one service invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// Classification of an invocation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokeErrorKind {
    Timeout,
    Connection,
    Http,
    UnsupportedMethod,
}

/// Result of one service invocation, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub service_name: String,
    pub status: ExecutionStatus,
    pub data: Option<Value>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<InvokeErrorKind>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn success(service_name: impl Into<String>, data: Value) -> Self {
        Self {
            service_name: service_name.into(),
            status: ExecutionStatus::Success,
            data: Some(data),
            error: None,
            error_kind: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(service_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            status: ExecutionStatus::Error,
            data: None,
            error: Some(message.into()),
            error_kind: None,
            timestamp: Utc::now(),
        }
    }

    pub fn invoke_error(
        service_name: impl Into<String>,
        kind: InvokeErrorKind,
        message: impl Into<String>,
    ) -> Self {
        let mut result = Self::error(service_name, message);
        result.error_kind = Some(kind);
        result
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Where a plan-step input value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Literal value chosen by the planner
    Constant,

    /// Literal value lifted from the user's request text
    UserQuery,

    /// Output of an earlier plan step
    Step(u32),
}

impl InputSource {
    /// Decode the planner's wire form. Unknown labels degrade to `Constant`,
    /// which makes the literal value authoritative.
    pub fn parse(s: &str) -> Self {
        match s {
            "constant" => Self::Constant,
            "user_query" => Self::UserQuery,
            other => match other.strip_prefix("step_").and_then(|n| n.parse().ok()) {
                Some(n) => Self::Step(n),
                None => Self::Constant,
            },
        }
    }
}

impl Default for InputSource {
    fn default() -> Self {
        Self::Constant
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::UserQuery => write!(f, "user_query"),
            Self::Step(n) => write!(f, "step_{}", n),
        }
    }
}

impl Serialize for InputSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InputSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// One declared input of a plan step: a literal value plus its source
#[derive(Debug, Clone, Serialize)]
pub struct InputSpec {
    pub value: Value,
    pub source: InputSource,
}

impl InputSpec {
    pub fn constant(value: Value) -> Self {
        Self {
            value,
            source: InputSource::Constant,
        }
    }

    pub fn from_step(step: u32, fallback: Value) -> Self {
        Self {
            value: fallback,
            source: InputSource::Step(step),
        }
    }
}

// Planners sometimes emit a bare value instead of the {value, source} object;
// treat that as a constant rather than rejecting the whole plan.
impl<'de> Deserialize<'de> for InputSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if let Value::Object(map) = &raw {
            if map.contains_key("value") {
                let value = map.get("value").cloned().unwrap_or(Value::Null);
                let source = map
                    .get("source")
                    .and_then(Value::as_str)
                    .map(InputSource::parse)
                    .unwrap_or_default();
                return Ok(Self { value, source });
            }
        }
        Ok(Self::constant(raw))
    }
}

/// One step of a structured execution plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub step: u32,

    pub service_name: String,

    #[serde(default)]
    pub rationale: String,

    #[serde(default)]
    pub inputs: HashMap<String, InputSpec>,

    /// Advisory only, never validated against the actual response
    #[serde(default)]
    pub expected_outputs: String,
}

/// Complete plan produced by the structured planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub reasoning: String,

    #[serde(default)]
    pub plan: Vec<PlanStep>,
}

/// Action decided by the model during one ReAct turn
///
/// Decoded exactly once at the planner boundary; the loop dispatches on the
/// closed set and reports `Unrecognized` labels as error observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionType {
    ExecuteService,
    AnalyzeResult,
    FinalAnswer,
    Unrecognized(String),
}

impl ActionType {
    /// Decode a model-emitted label: case-insensitive, hyphens normalized to
    /// underscores.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "EXECUTE_SERVICE" => Self::ExecuteService,
            "ANALYZE_RESULT" => Self::AnalyzeResult,
            "FINAL_ANSWER" => Self::FinalAnswer,
            _ => Self::Unrecognized(label.trim().to_string()),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecuteService => write!(f, "execute_service"),
            Self::AnalyzeResult => write!(f, "analyze_result"),
            Self::FinalAnswer => write!(f, "final_answer"),
            Self::Unrecognized(label) => write!(f, "{}", label),
        }
    }
}

impl Serialize for ActionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ActionType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Lifecycle state of a single orchestration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Overall state of an orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Variant payload of one orchestration step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step_type", rename_all = "snake_case")]
pub enum StepKind {
    Reasoning {
        thought: Option<String>,
    },
    Action {
        action: ActionType,
        input: Value,
    },
    Observation {
        observation: Value,
    },
    FinalAnswer {
        answer: String,
    },
}

/// Single step in an orchestration trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationStep {
    pub step_number: u32,
    pub status: StepStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl OrchestrationStep {
    pub fn reasoning(step_number: u32) -> Self {
        Self::new(step_number, StepKind::Reasoning { thought: None })
    }

    pub fn action(step_number: u32, action: ActionType, input: Value) -> Self {
        Self::new(step_number, StepKind::Action { action, input })
    }

    pub fn observation(step_number: u32, observation: Value) -> Self {
        let mut step = Self::new(step_number, StepKind::Observation { observation });
        step.status = StepStatus::Completed;
        step
    }

    fn new(step_number: u32, kind: StepKind) -> Self {
        Self {
            step_number,
            status: StepStatus::InProgress,
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Full record of one orchestration run
///
/// Sole owner of its steps; step numbers are strictly increasing and never
/// reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationTrace {
    pub user_prompt: String,
    pub steps: Vec<OrchestrationStep>,
    pub final_answer: Option<String>,
    pub summary: Option<String>,
    pub total_steps: usize,
    pub execution_time_ms: u64,
    pub status: RunStatus,
    pub error: Option<String>,
}

impl OrchestrationTrace {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            steps: Vec::new(),
            final_answer: None,
            summary: None,
            total_steps: 0,
            execution_time_ms: 0,
            status: RunStatus::Pending,
            error: None,
        }
    }

    pub fn add_step(&mut self, step: OrchestrationStep) {
        self.steps.push(step);
        self.total_steps = self.steps.len();
    }

    pub fn last_step_mut(&mut self) -> Option<&mut OrchestrationStep> {
        self.steps.last_mut()
    }
}

/// Kind discriminant for stream events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StepStarted,
    Reasoning,
    Action,
    Observation,
    FinalAnswer,
    Error,
    Summary,
    StepCompleted,
}

/// Progress event emitted during a run, consumed in emission order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event_type: EventType,
    pub step_number: u32,
    pub content: Option<String>,
    pub data: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl StreamEvent {
    pub fn new(event_type: EventType, step_number: u32) -> Self {
        Self {
            event_type,
            step_number,
            content: None,
            data: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn http_method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn input_source_round_trips_step_numbers() {
        assert_eq!(InputSource::parse("step_3"), InputSource::Step(3));
        assert_eq!(InputSource::Step(3).to_string(), "step_3");
        assert_eq!(InputSource::parse("user_query"), InputSource::UserQuery);
        // unknown labels make the literal value authoritative
        assert_eq!(InputSource::parse("telepathy"), InputSource::Constant);
    }

    #[test]
    fn input_spec_accepts_bare_values() {
        let spec: InputSpec = serde_json::from_value(json!("ACC-123")).unwrap();
        assert_eq!(spec.value, json!("ACC-123"));
        assert_eq!(spec.source, InputSource::Constant);

        let spec: InputSpec =
            serde_json::from_value(json!({"value": 7, "source": "step_1"})).unwrap();
        assert_eq!(spec.value, json!(7));
        assert_eq!(spec.source, InputSource::Step(1));
    }

    #[test]
    fn action_type_normalizes_labels() {
        assert_eq!(ActionType::parse("execute-service"), ActionType::ExecuteService);
        assert_eq!(ActionType::parse("Final_Answer"), ActionType::FinalAnswer);
        assert_eq!(
            ActionType::parse("COMBINE_RESULTS"),
            ActionType::Unrecognized("COMBINE_RESULTS".to_string())
        );
    }

    #[test]
    fn trace_tracks_step_count() {
        let mut trace = OrchestrationTrace::new("test");
        trace.add_step(OrchestrationStep::reasoning(1));
        trace.add_step(OrchestrationStep::observation(2, json!({"ok": true})));
        assert_eq!(trace.total_steps, 2);
        assert_eq!(trace.steps[1].status, StepStatus::Completed);
    }
}
