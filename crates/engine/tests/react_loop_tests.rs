//! ReAct controller behavior with a scripted model

mod common;

use common::{execute_service_turn, final_answer_turn, weather_descriptor};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use svc_router_common::{EngineConfig, EventType, RunStatus, StepKind};
use svc_router_engine::testing::ScriptedClient;
use svc_router_engine::{EventStream, ReactController, ServiceInvoker, ServiceRegistry};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(max_steps: u32) -> EngineConfig {
    EngineConfig {
        max_steps,
        ..EngineConfig::default()
    }
}

async fn drain(mut receiver: tokio::sync::mpsc::UnboundedReceiver<svc_router_common::StreamEvent>) -> Vec<svc_router_common::StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn weather_scenario_completes_with_answer_and_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {"temperature_2m": 18.5},
            "timezone": "America/New_York",
            "elevation": 10
        })))
        .mount(&server)
        .await;

    let mut registry = ServiceRegistry::new();
    registry.add(weather_descriptor(&server.uri()));

    let llm = Arc::new(ScriptedClient::new(vec![
        execute_service_turn(
            "Weather Service",
            r#"{"latitude": "40.7", "longitude": "-74.0"}"#,
        ),
        final_answer_turn("It is 18.5 degrees in New York."),
        // summary turn
        "Currently 18.5 degrees with clear skies.".to_string(),
    ]));

    let controller = ReactController::new(llm, &config(10));
    let invoker = ServiceInvoker::new(Duration::from_secs(5));
    let (stream, receiver) = EventStream::channel();

    let trace = controller
        .run(
            &registry,
            &invoker,
            "what's the weather at 40.7,-74.0",
            &stream,
        )
        .await;
    drop(stream);

    assert_eq!(trace.status, RunStatus::Completed);
    assert_eq!(
        trace.final_answer.as_deref(),
        Some("It is 18.5 degrees in New York.")
    );
    assert_eq!(
        trace.summary.as_deref(),
        Some("Currently 18.5 degrees with clear skies.")
    );

    // the service response was projected down to declared outputs
    let observed = trace
        .steps
        .iter()
        .find_map(|s| match &s.kind {
            StepKind::Observation { observation } => observation.get("data").cloned(),
            _ => None,
        })
        .expect("no observation step recorded");
    assert!(observed.get("current").is_some());
    assert!(observed.get("elevation").is_none());

    let events = drain(receiver).await;
    assert_eq!(
        events.last().map(|e| e.event_type),
        Some(EventType::StepCompleted)
    );
    assert!(events.iter().any(|e| e.event_type == EventType::Summary));
}

#[tokio::test]
async fn loop_respects_the_step_budget() {
    let registry = ServiceRegistry::new();

    // the script never reaches FINAL_ANSWER; its last turn repeats forever
    let llm = Arc::new(ScriptedClient::new(vec![
        "Thought: still thinking\nAction: ANALYZE_RESULT\nAction Input: {\"analysis\": \"more\"}",
    ]));

    let max_steps = 10;
    let controller = ReactController::new(llm.clone(), &config(max_steps));
    let invoker = ServiceInvoker::new(Duration::from_secs(1));
    let (stream, receiver) = EventStream::channel();

    let trace = controller.run(&registry, &invoker, "loop forever", &stream).await;
    drop(stream);

    // each cycle burns 3 logical slots, so at most ceil(max_steps / 3) model calls
    let reasoning_steps = trace
        .steps
        .iter()
        .filter(|s| matches!(s.kind, StepKind::Reasoning { .. }))
        .count();
    assert!(reasoning_steps <= (max_steps as usize).div_ceil(3) + 1);
    assert!(trace.final_answer.is_none());

    let events = drain(receiver).await;
    assert_eq!(
        events.last().map(|e| e.event_type),
        Some(EventType::StepCompleted)
    );
    // no summary without a completed run
    assert!(!events.iter().any(|e| e.event_type == EventType::Summary));
}

#[tokio::test]
async fn unknown_service_yields_error_observation_and_continues() {
    let registry = ServiceRegistry::new();

    let llm = Arc::new(ScriptedClient::new(vec![
        execute_service_turn("Ghost Service", "{}"),
        final_answer_turn("Could not find that service."),
    ]));

    let controller = ReactController::new(llm, &config(10));
    let invoker = ServiceInvoker::new(Duration::from_secs(1));
    let (stream, _receiver) = EventStream::channel();

    let trace = controller.run(&registry, &invoker, "use the ghost", &stream).await;

    // the missing service did not fail the run
    assert_eq!(trace.status, RunStatus::Completed);

    let error_observation = trace
        .steps
        .iter()
        .find_map(|s| match &s.kind {
            StepKind::Observation { observation } => {
                observation.get("error").and_then(|e| e.as_str()).map(String::from)
            }
            _ => None,
        })
        .expect("expected an error observation");
    assert!(error_observation.contains("Ghost Service"));
}

#[tokio::test]
async fn unrecognized_action_is_reported_without_halting() {
    let registry = ServiceRegistry::new();

    let llm = Arc::new(ScriptedClient::new(vec![
        "Thought: trying something odd\nAction: COMBINE_RESULTS\nAction Input: {}".to_string(),
        final_answer_turn("done"),
    ]));

    let controller = ReactController::new(llm, &config(10));
    let invoker = ServiceInvoker::new(Duration::from_secs(1));
    let (stream, _receiver) = EventStream::channel();

    let trace = controller.run(&registry, &invoker, "odd action", &stream).await;
    assert_eq!(trace.status, RunStatus::Completed);

    let has_unknown_action_error = trace.steps.iter().any(|s| match &s.kind {
        StepKind::Observation { observation } => observation
            .get("error")
            .and_then(|e| e.as_str())
            .is_some_and(|e| e.contains("Unknown action")),
        _ => false,
    });
    assert!(has_unknown_action_error);
}

#[tokio::test]
async fn unparsable_response_fails_the_run() {
    let registry = ServiceRegistry::new();

    let llm = Arc::new(ScriptedClient::new(vec![
        "I am not going to follow the format today.",
    ]));

    let controller = ReactController::new(llm, &config(10));
    let invoker = ServiceInvoker::new(Duration::from_secs(1));
    let (stream, receiver) = EventStream::channel();

    let trace = controller.run(&registry, &invoker, "hello", &stream).await;
    drop(stream);

    assert_eq!(trace.status, RunStatus::Failed);
    assert_eq!(
        trace.error.as_deref(),
        Some("Failed to parse agent response")
    );

    let events = drain(receiver).await;
    assert!(events.iter().any(|e| e.event_type == EventType::Error));
    assert_eq!(
        events.last().map(|e| e.event_type),
        Some(EventType::StepCompleted)
    );
}

#[tokio::test]
async fn llm_failure_marks_trace_failed_with_error_text() {
    let registry = ServiceRegistry::new();
    let llm = Arc::new(ScriptedClient::failing());

    let controller = ReactController::new(llm, &config(10));
    let invoker = ServiceInvoker::new(Duration::from_secs(1));
    let (stream, _receiver) = EventStream::channel();

    let trace = controller.run(&registry, &invoker, "hello", &stream).await;
    assert_eq!(trace.status, RunStatus::Failed);
    assert!(trace.error.as_deref().unwrap_or_default().contains("500"));
}
