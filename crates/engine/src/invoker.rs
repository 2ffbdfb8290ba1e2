//! Service invoker: exactly one HTTP request per resolved descriptor
//!
//! Failures never escape this module as `Err`; every outcome is a structured
//! `ExecutionResult`, classified as timeout, connection, HTTP status, or
//! unsupported method.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::time::Duration;
use svc_router_common::{ExecutionResult, HttpMethod, InvokeErrorKind, ServiceDescriptor};
use tracing::{debug, instrument, warn};

/// Invoker with a fixed per-call timeout
#[derive(Debug, Clone)]
pub struct ServiceInvoker {
    client: reqwest::Client,
    timeout: Duration,
}

impl ServiceInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Execute a service call with the resolved parameter map.
    ///
    /// GET sends only declared input parameters as a query string; POST and
    /// PUT send the full map as a JSON body; DELETE sends no body. The bearer
    /// token, when configured, is injected before the call and never logged.
    #[instrument(skip_all, fields(service = %service.name, method = %service.method))]
    pub async fn invoke(
        &self,
        service: &ServiceDescriptor,
        params: &Map<String, Value>,
    ) -> ExecutionResult {
        let method = match service.method.parse::<HttpMethod>() {
            Ok(method) => method,
            Err(message) => {
                return ExecutionResult::invoke_error(
                    &service.name,
                    InvokeErrorKind::UnsupportedMethod,
                    message,
                );
            }
        };

        let headers = build_headers(service);

        let request = match method {
            HttpMethod::Get => {
                let query: Vec<(String, String)> = params
                    .iter()
                    .filter(|(k, _)| service.input_params.contains(k))
                    .map(|(k, v)| (k.clone(), query_value(v)))
                    .collect();
                self.client.get(&service.url).query(&query)
            }
            HttpMethod::Post => self.client.post(&service.url).json(params),
            HttpMethod::Put => self.client.put(&service.url).json(params),
            HttpMethod::Delete => self.client.delete(&service.url),
        };

        debug!("Invoking {} {}", service.method, service.url);

        let response = match request.headers(headers).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => return self.classify_send_error(service, e),
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Service {} returned status {}", service.name, status);
            return ExecutionResult::invoke_error(
                &service.name,
                InvokeErrorKind::Http,
                format!("HTTP error {} from {}", status.as_u16(), service.url),
            );
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.classify_send_error(service, e),
        };

        // Non-JSON bodies are surfaced as raw text rather than rejected
        let data = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
        let data = project_outputs(data, &service.output_params);

        ExecutionResult::success(&service.name, data)
    }

    fn classify_send_error(&self, service: &ServiceDescriptor, e: reqwest::Error) -> ExecutionResult {
        if e.is_timeout() {
            ExecutionResult::invoke_error(
                &service.name,
                InvokeErrorKind::Timeout,
                format!(
                    "Request to {} timed out after {}s",
                    service.url,
                    self.timeout.as_secs()
                ),
            )
        } else {
            ExecutionResult::invoke_error(
                &service.name,
                InvokeErrorKind::Connection,
                format!("Connection error calling {}: {}", service.url, e),
            )
        }
    }
}

fn build_headers(service: &ServiceDescriptor) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(extra) = &service.headers {
        for (name, value) in extra {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
    }
    if let Some(token) = &service.auth_token {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
    }
    headers
}

/// Render a JSON value as a query-string value
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Project a response down to the declared output parameters.
///
/// Objects retain only declared keys; arrays are projected per element;
/// absent keys are simply omitted. Anything else passes through unchanged.
pub fn project_outputs(data: Value, output_params: &[String]) -> Value {
    if output_params.is_empty() {
        return data;
    }

    match data {
        Value::Object(map) => Value::Object(project_object(map, output_params)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(project_object(map, output_params)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn project_object(map: Map<String, Value>, output_params: &[String]) -> Map<String, Value> {
    map.into_iter()
        .filter(|(k, _)| output_params.contains(k))
        .collect()
}
