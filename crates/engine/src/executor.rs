//! Batch executor for structured plans
//!
//! Walks steps in the order the planner produced them. A missing service or
//! failed call is recorded and execution continues; only successful results
//! are retained for resolution by later steps.

use crate::invoker::ServiceInvoker;
use crate::registry::ServiceRegistry;
use crate::resolver::{resolve_inputs, ResolvedFrom};
use serde_json::{Map, Value};
use std::collections::HashMap;
use svc_router_common::{ExecutionResult, Plan};
use tracing::{debug, info, instrument};

/// Full record of one executed (or skipped) plan step
#[derive(Debug, Clone)]
pub struct StepExecution {
    pub step: u32,
    pub service_name: String,
    pub rationale: String,
    pub inputs: Map<String, Value>,
    pub provenance: HashMap<String, ResolvedFrom>,
    pub result: ExecutionResult,
}

pub struct PlanExecutor {
    invoker: ServiceInvoker,
}

impl PlanExecutor {
    pub fn new(invoker: ServiceInvoker) -> Self {
        Self { invoker }
    }

    /// Execute every step of the plan sequentially.
    #[instrument(skip_all, fields(steps = plan.plan.len()))]
    pub async fn execute(&self, plan: &Plan, registry: &ServiceRegistry) -> Vec<StepExecution> {
        let mut prior_results: HashMap<u32, ExecutionResult> = HashMap::new();
        let mut executions = Vec::with_capacity(plan.plan.len());

        for step in &plan.plan {
            let Some(service) = registry.get_by_name(&step.service_name) else {
                // a missing service does not abort the rest of the plan
                info!(
                    "Step {}: service '{}' not found, continuing",
                    step.step, step.service_name
                );
                executions.push(StepExecution {
                    step: step.step,
                    service_name: step.service_name.clone(),
                    rationale: step.rationale.clone(),
                    inputs: Map::new(),
                    provenance: HashMap::new(),
                    result: ExecutionResult::error(
                        &step.service_name,
                        format!("Service '{}' not found in registry", step.service_name),
                    ),
                });
                continue;
            };

            let resolved = resolve_inputs(step, &prior_results);
            debug!(
                "Step {}: invoking {} with {} parameters",
                step.step,
                service.name,
                resolved.params.len()
            );

            let result = self.invoker.invoke(service, &resolved.params).await;
            if result.is_success() {
                prior_results.insert(step.step, result.clone());
            }

            executions.push(StepExecution {
                step: step.step,
                service_name: service.name.clone(),
                rationale: step.rationale.clone(),
                inputs: resolved.params,
                provenance: resolved.provenance,
                result,
            });
        }

        executions
    }
}
