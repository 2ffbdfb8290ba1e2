//! Ordered progress-event stream for one orchestration run
//!
//! Single producer, single consumer, FIFO. Emission is fire-and-forget: a
//! dropped receiver never stalls or fails the run.

use serde_json::Value;
use svc_router_common::{EventType, StreamEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// Sending half of a run's event stream
#[derive(Debug, Clone)]
pub struct EventStream {
    sender: mpsc::UnboundedSender<StreamEvent>,
}

impl EventStream {
    /// Create a stream plus its consuming half. The receiver yields events in
    /// exact emission order and ends when the stream (and its clones) drop.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Emit an event. Send errors (no receiver) are ignored.
    pub fn emit(&self, event: StreamEvent) {
        debug!(
            "Event emitted: {:?} - step {}",
            event.event_type, event.step_number
        );
        let _ = self.sender.send(event);
    }

    pub fn emit_step_started(&self, step_number: u32, content: impl Into<String>) {
        self.emit(StreamEvent::new(EventType::StepStarted, step_number).with_content(content));
    }

    pub fn emit_reasoning(&self, step_number: u32, thought: Option<&str>) {
        let mut event = StreamEvent::new(EventType::Reasoning, step_number)
            .with_data(serde_json::json!({ "thought": thought }));
        if let Some(thought) = thought {
            event = event.with_content(thought);
        }
        self.emit(event);
    }

    pub fn emit_observation(&self, step_number: u32, observation: Value) {
        self.emit(
            StreamEvent::new(EventType::Observation, step_number)
                .with_content("Observation received")
                .with_data(observation),
        );
    }

    pub fn emit_error(&self, step_number: u32, message: impl Into<String>) {
        self.emit(StreamEvent::new(EventType::Error, step_number).with_content(message));
    }
}
