//! Orchestration session: explicit ownership of registry, model client, and
//! per-run state
//!
//! One session serves many runs; each run owns its own trace, result map,
//! and event stream.

use crate::error::{EngineError, EngineResult};
use crate::events::EventStream;
use crate::executor::{PlanExecutor, StepExecution};
use crate::invoker::ServiceInvoker;
use crate::planner::StructuredPlanner;
use crate::react::ReactController;
use crate::registry::ServiceRegistry;
use crate::summarizer::Summarizer;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use svc_router_common::{
    CompletionClient, EngineConfig, ExecutionResult, HttpCompletionClient, OrchestrationTrace,
    PlanStep, SystemConfig,
};
use tracing::info;

/// Outcome of one batch plan run
#[derive(Debug, Default)]
pub struct PlanRun {
    pub reasoning: String,
    pub plan: Vec<PlanStep>,
    pub executions: Vec<StepExecution>,
    pub summary: String,
    /// Planning or model error that prevented execution
    pub error: Option<String>,
    /// Raw model output preserved when the plan could not be parsed
    pub raw_response: Option<String>,
}

pub struct OrchestratorSession {
    registry: ServiceRegistry,
    llm: Arc<dyn CompletionClient>,
    config: EngineConfig,
}

impl OrchestratorSession {
    /// Build a session from config, with the shipped HTTP completion client.
    pub fn new(config: &SystemConfig) -> EngineResult<Self> {
        let llm = Arc::new(HttpCompletionClient::new(&config.llm)?);
        info!("Session created for model {}", llm.model());
        Ok(Self::with_client(llm, config.engine.clone()))
    }

    /// Build a session around an existing completion client.
    pub fn with_client(llm: Arc<dyn CompletionClient>, config: EngineConfig) -> Self {
        Self {
            registry: ServiceRegistry::new(),
            llm,
            config,
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.registry
    }

    /// Run the interactive ReAct loop for one request, emitting progress on
    /// `events`. The returned trace is final once the stream has ended.
    pub async fn run_react(&self, user_prompt: &str, events: &EventStream) -> OrchestrationTrace {
        let invoker = ServiceInvoker::new(Duration::from_secs(self.config.request_timeout_secs));
        let controller = ReactController::new(Arc::clone(&self.llm), &self.config);
        controller
            .run(&self.registry, &invoker, user_prompt, events)
            .await
    }

    /// Plan, execute, and summarize one request in batch mode.
    ///
    /// Planning failures produce a `PlanRun` with the error and the raw model
    /// output preserved; they never propagate.
    pub async fn run_plan(&self, user_prompt: &str) -> PlanRun {
        let planner = StructuredPlanner::new(Arc::clone(&self.llm));

        let plan = match planner.plan(&self.registry, user_prompt).await {
            Ok(plan) => plan,
            Err(EngineError::Planning {
                message,
                raw_response,
            }) => {
                return PlanRun {
                    error: Some(message),
                    raw_response: Some(raw_response),
                    ..PlanRun::default()
                };
            }
            Err(e) => {
                return PlanRun {
                    error: Some(e.to_string()),
                    ..PlanRun::default()
                };
            }
        };

        let invoker = ServiceInvoker::new(Duration::from_secs(self.config.plan_timeout_secs));
        let executor = PlanExecutor::new(invoker);
        let executions = executor.execute(&plan, &self.registry).await;

        let results: HashMap<String, ExecutionResult> = executions
            .iter()
            .map(|e| (e.service_name.clone(), e.result.clone()))
            .collect();
        let summary = Summarizer::new(Arc::clone(&self.llm))
            .summarize(user_prompt, &results)
            .await;

        PlanRun {
            reasoning: plan.reasoning,
            plan: plan.plan,
            executions,
            summary,
            error: None,
            raw_response: None,
        }
    }
}
