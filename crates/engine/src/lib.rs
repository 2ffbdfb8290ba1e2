//! Agentic orchestration engine
//!
//! Turns a natural-language request into a sequence of calls against a
//! registry of declared REST services, using a language model as the
//! planning oracle, and synthesizes the collected data into one answer.
//!
//! Two execution styles share the same building blocks:
//! - the ReAct loop ([`react::ReactController`]) decides one action per
//!   model turn, bounded by a step budget;
//! - the batch pipeline ([`session::OrchestratorSession::run_plan`])
//!   produces a complete plan up front and walks it in order.

pub mod error;
pub mod events;
pub mod executor;
pub mod invoker;
pub mod planner;
pub mod react;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod summarizer;
pub mod testing;

pub use error::{EngineError, EngineResult};
pub use events::EventStream;
pub use executor::{PlanExecutor, StepExecution};
pub use invoker::ServiceInvoker;
pub use planner::StructuredPlanner;
pub use react::ReactController;
pub use registry::ServiceRegistry;
pub use resolver::{resolve_inputs, ResolvedFrom, ResolvedInputs};
pub use session::{OrchestratorSession, PlanRun};
pub use summarizer::Summarizer;
