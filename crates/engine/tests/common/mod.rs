//! Shared helpers for engine integration tests

use svc_router_common::ServiceDescriptor;

/// Descriptor pointing at a wiremock server
pub fn descriptor(id: &str, name: &str, url: &str, method: &str) -> ServiceDescriptor {
    ServiceDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        method: method.to_string(),
        description: format!("{} test service", name),
        ..ServiceDescriptor::default()
    }
}

/// Weather descriptor matching the canonical end-to-end scenario
pub fn weather_descriptor(base_url: &str) -> ServiceDescriptor {
    ServiceDescriptor {
        id: "weather_service".to_string(),
        name: "Weather Service".to_string(),
        url: format!("{}/v1/forecast", base_url),
        method: "GET".to_string(),
        description: "Get weather forecast for a location (requires latitude, longitude)"
            .to_string(),
        input_params: vec!["latitude".to_string(), "longitude".to_string()],
        output_params: vec!["current".to_string(), "timezone".to_string()],
        ..ServiceDescriptor::default()
    }
}

/// A scripted EXECUTE_SERVICE turn for the ReAct loop
pub fn execute_service_turn(service_name: &str, params_json: &str) -> String {
    format!(
        "Thought: I should call {service}.\nAction: EXECUTE_SERVICE\nAction Input: {{\"service_name\": \"{service}\", \"params\": {params}}}",
        service = service_name,
        params = params_json,
    )
}

/// A scripted FINAL_ANSWER turn for the ReAct loop
pub fn final_answer_turn(answer: &str) -> String {
    format!(
        "Thought: I have everything I need.\nAction: FINAL_ANSWER\nAction Input: {{\"answer\": \"{answer}\"}}",
    )
}
