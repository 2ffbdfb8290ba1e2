//! End-to-end session runs: batch planning pipeline and ReAct streaming

mod common;

use common::{final_answer_turn, weather_descriptor};
use serde_json::json;
use std::sync::Arc;
use svc_router_common::{EngineConfig, EventType, RunStatus};
use svc_router_engine::testing::ScriptedClient;
use svc_router_engine::{EventStream, OrchestratorSession};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn plan_mode_runs_plan_and_summarizes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "40.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {"temperature_2m": 18.5},
            "timezone": "America/New_York"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan_response = r#"{
        "reasoning": "One call to the weather service answers this.",
        "plan": [{
            "step": 1,
            "service_name": "Weather Service",
            "rationale": "User asked for current weather",
            "inputs": {
                "latitude": {"value": "40.7", "source": "user_query"},
                "longitude": {"value": "-74.0", "source": "user_query"}
            },
            "expected_outputs": "current conditions"
        }]
    }"#;

    let llm = Arc::new(ScriptedClient::new(vec![
        plan_response.to_string(),
        "It is 18.5 degrees in New York right now.".to_string(),
    ]));

    let mut session = OrchestratorSession::with_client(llm, EngineConfig::default());
    session.registry_mut().add(weather_descriptor(&server.uri()));

    let run = session.run_plan("what's the weather at 40.7,-74.0").await;

    assert!(run.error.is_none());
    assert_eq!(run.plan.len(), 1);
    assert_eq!(run.executions.len(), 1);
    assert!(run.executions[0].result.is_success());
    assert_eq!(run.summary, "It is 18.5 degrees in New York right now.");
}

#[tokio::test]
async fn plan_mode_preserves_raw_text_on_parse_failure() {
    let llm = Arc::new(ScriptedClient::new(vec![
        "I would rather write poetry than JSON.",
    ]));

    let session = OrchestratorSession::with_client(llm, EngineConfig::default());
    let run = session.run_plan("anything").await;

    assert!(run.error.is_some());
    assert!(run
        .raw_response
        .as_deref()
        .unwrap_or_default()
        .contains("poetry"));
    assert!(run.plan.is_empty());
    assert!(run.executions.is_empty());
}

#[tokio::test]
async fn react_mode_streams_events_and_returns_trace() {
    let llm = Arc::new(ScriptedClient::new(vec![final_answer_turn(
        "Nothing to orchestrate.",
    )]));

    let session = OrchestratorSession::with_client(llm, EngineConfig::default());
    let (stream, mut receiver) = EventStream::channel();

    let trace = session.run_react("just answer", &stream).await;
    drop(stream);

    assert_eq!(trace.status, RunStatus::Completed);
    assert_eq!(trace.final_answer.as_deref(), Some("Nothing to orchestrate."));

    let mut kinds = Vec::new();
    while let Some(event) = receiver.recv().await {
        kinds.push(event.event_type);
    }
    assert_eq!(kinds.first(), Some(&EventType::StepStarted));
    assert_eq!(kinds.last(), Some(&EventType::StepCompleted));
}
