//! ReAct controller: the reasoning → action → observation loop
//!
//! Drives one action at a time against the registry, bounded by a step
//! budget. Each EXECUTE_SERVICE or ANALYZE_RESULT cycle consumes three
//! logical step slots (reasoning, action, observation); FINAL_ANSWER ends
//! the loop immediately.

use crate::events::EventStream;
use crate::invoker::ServiceInvoker;
use crate::planner::{build_react_prompt, parse_react_response};
use crate::registry::ServiceRegistry;
use crate::summarizer::Summarizer;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use svc_router_common::{
    ActionType, ChatMessage, CompletionClient, EngineConfig, EventType, ExecutionResult,
    OrchestrationStep, OrchestrationTrace, RunStatus, StepKind, StepStatus, StreamEvent,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

pub struct ReactController {
    llm: Arc<dyn CompletionClient>,
    summarizer: Summarizer,
    max_steps: u32,
    max_observation_chars: Option<usize>,
}

impl ReactController {
    pub fn new(llm: Arc<dyn CompletionClient>, config: &EngineConfig) -> Self {
        Self {
            summarizer: Summarizer::new(Arc::clone(&llm)),
            llm,
            max_steps: config.max_steps,
            max_observation_chars: config.max_observation_chars,
        }
    }

    /// Run one orchestration to completion, failure, or budget exhaustion.
    ///
    /// Emits progress events throughout and always terminates the stream with
    /// a `step_completed` event. Never panics; top-level LLM failures mark
    /// the trace failed with the error text verbatim.
    #[instrument(skip_all, fields(run_id = %Uuid::new_v4(), max_steps = self.max_steps))]
    pub async fn run(
        &self,
        registry: &ServiceRegistry,
        invoker: &ServiceInvoker,
        user_prompt: &str,
        events: &EventStream,
    ) -> OrchestrationTrace {
        let started = Instant::now();
        info!("Processing request: {}", user_prompt);

        let mut trace = OrchestrationTrace::new(user_prompt);
        trace.status = RunStatus::InProgress;

        let mut results: HashMap<String, ExecutionResult> = HashMap::new();
        let mut observations = String::new();
        let mut step_count: u32 = 0;

        while step_count < self.max_steps {
            step_count += 1;

            events.emit_step_started(step_count, "Agent is thinking...");
            trace.add_step(OrchestrationStep::reasoning(step_count));

            let prompt = build_react_prompt(
                registry,
                user_prompt,
                self.observation_window(&observations),
            );
            let response = match self.llm.complete(&[ChatMessage::user(prompt)]).await {
                Ok(response) => response,
                Err(e) => {
                    error!("ReAct loop failed: {}", e);
                    if let Some(step) = trace.last_step_mut() {
                        step.status = StepStatus::Failed;
                    }
                    trace.status = RunStatus::Failed;
                    trace.error = Some(e.to_string());
                    events.emit_error(step_count, format!("Error: {}", e));
                    break;
                }
            };

            let decision = parse_react_response(&response);

            if let Some(step) = trace.last_step_mut() {
                if let StepKind::Reasoning { thought } = &mut step.kind {
                    *thought = decision.thought.clone();
                }
            }
            events.emit_reasoning(step_count, decision.thought.as_deref());

            let Some(action) = decision.action else {
                if let Some(step) = trace.last_step_mut() {
                    step.status = StepStatus::Failed;
                }
                trace.status = RunStatus::Failed;
                trace.error = Some("Failed to parse agent response".to_string());
                events.emit_error(step_count, "Failed to parse agent response");
                break;
            };
            if let Some(step) = trace.last_step_mut() {
                step.status = StepStatus::Completed;
            }

            let action_step = step_count + 1;
            trace.add_step(OrchestrationStep::action(
                action_step,
                action.clone(),
                decision.input.clone(),
            ));

            let observation = self
                .dispatch(&action, &decision.input, action_step, registry, invoker, &mut results, events)
                .await;

            if let Some(step) = trace.last_step_mut() {
                step.status = StepStatus::Completed;
            }

            let observation_step = step_count + 2;
            trace.add_step(OrchestrationStep::observation(
                observation_step,
                observation.clone(),
            ));
            events.emit_observation(observation_step, observation.clone());

            observations.push_str(&format!(
                "\nObservation: {}",
                serde_json::to_string_pretty(&observation).unwrap_or_default()
            ));

            if action == ActionType::FinalAnswer {
                trace.final_answer = observation
                    .get("final_answer")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                trace.status = RunStatus::Completed;
                break;
            }

            step_count += 2;
        }

        if trace.status == RunStatus::Completed && !results.is_empty() {
            events.emit_step_started(step_count + 1, "Generating summary...");
            let summary = self.summarizer.summarize(user_prompt, &results).await;
            trace.summary = Some(summary.clone());
            events.emit(
                StreamEvent::new(EventType::Summary, step_count + 1)
                    .with_content(summary.clone())
                    .with_data(json!({ "summary": summary })),
            );
        }

        trace.execution_time_ms = started.elapsed().as_millis() as u64;
        events.emit(
            StreamEvent::new(EventType::StepCompleted, step_count)
                .with_content("Orchestration complete")
                .with_data(json!({ "status": trace.status })),
        );

        info!(
            "Run finished: status={}, steps={}, elapsed={}ms",
            trace.status, trace.total_steps, trace.execution_time_ms
        );
        trace
    }

    async fn dispatch(
        &self,
        action: &ActionType,
        input: &Value,
        step_number: u32,
        registry: &ServiceRegistry,
        invoker: &ServiceInvoker,
        results: &mut HashMap<String, ExecutionResult>,
        events: &EventStream,
    ) -> Value {
        match action {
            ActionType::ExecuteService => {
                let service_name = input
                    .get("service_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let params: Map<String, Value> = input
                    .get("params")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();

                events.emit(
                    StreamEvent::new(EventType::Action, step_number)
                        .with_content(format!("Executing service: {}", service_name))
                        .with_data(json!({ "service": service_name, "params": params.clone() })),
                );

                let Some(service) = registry.get_by_name(service_name) else {
                    return json!({
                        "status": "error",
                        "error": format!("Service '{}' not found", service_name),
                    });
                };

                let result = invoker.invoke(service, &params).await;
                let observation = json!({
                    "status": result.status,
                    "service": result.service_name.clone(),
                    "data": result.data.clone(),
                    "error": result.error.clone(),
                });
                results.insert(result.service_name.clone(), result);
                observation
            }
            ActionType::AnalyzeResult => {
                let analysis = input
                    .get("analysis")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                events.emit(
                    StreamEvent::new(EventType::Action, step_number)
                        .with_content("Analyzing results")
                        .with_data(json!({ "analysis": analysis })),
                );
                json!({ "status": "success", "analysis": analysis })
            }
            ActionType::FinalAnswer => {
                let answer = input
                    .get("answer")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                events.emit(
                    StreamEvent::new(EventType::FinalAnswer, step_number)
                        .with_content(answer)
                        .with_data(json!({ "answer": answer })),
                );
                json!({ "status": "success", "final_answer": answer })
            }
            ActionType::Unrecognized(label) => {
                json!({
                    "status": "error",
                    "error": format!("Unknown action: {}", label),
                })
            }
        }
    }

    /// Apply the optional cap on accumulated observation text, keeping the
    /// most recent tail.
    fn observation_window<'a>(&self, observations: &'a str) -> &'a str {
        match self.max_observation_chars {
            Some(cap) if observations.len() > cap => {
                let mut start = observations.len() - cap;
                while !observations.is_char_boundary(start) {
                    start += 1;
                }
                &observations[start..]
            }
            _ => observations,
        }
    }
}
