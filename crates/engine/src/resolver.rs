//! Optimistic parameter resolution for plan steps
//!
//! A step is never blocked on a missing dependency: when a `step_N` source
//! cannot be satisfied, resolution degrades to the planner's literal value
//! and records that it did.

use serde_json::{Map, Value};
use std::collections::HashMap;
use svc_router_common::{ExecutionResult, InputSource, PlanStep};
use tracing::debug;

/// How a parameter value was actually obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    /// Literal value from the plan (constant or user-query source)
    Literal,

    /// Entire output of a successful prior step
    PriorStep,

    /// A `step_N` source that could not be satisfied; the literal value was
    /// used instead
    FallbackLiteral,
}

/// Concrete call arguments for one step, with per-parameter provenance
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
    pub params: Map<String, Value>,
    pub provenance: HashMap<String, ResolvedFrom>,
}

/// Resolve every declared input of `step` against the recorded results of
/// earlier steps.
///
/// `step_N` substitutes the prior step's entire output; no field-level
/// extraction is attempted.
pub fn resolve_inputs(
    step: &PlanStep,
    prior_results: &HashMap<u32, ExecutionResult>,
) -> ResolvedInputs {
    let mut params = Map::new();
    let mut provenance = HashMap::new();

    for (name, spec) in &step.inputs {
        let (value, from) = match spec.source {
            InputSource::Constant | InputSource::UserQuery => {
                (spec.value.clone(), ResolvedFrom::Literal)
            }
            InputSource::Step(n) => match prior_results.get(&n) {
                Some(result) if result.is_success() => {
                    let data = result.data.clone().unwrap_or(Value::Null);
                    (data, ResolvedFrom::PriorStep)
                }
                _ => {
                    debug!(
                        "Step {} parameter '{}': step_{} unavailable, using literal fallback",
                        step.step, name, n
                    );
                    (spec.value.clone(), ResolvedFrom::FallbackLiteral)
                }
            },
        };

        params.insert(name.clone(), value);
        provenance.insert(name.clone(), from);
    }

    ResolvedInputs { params, provenance }
}
