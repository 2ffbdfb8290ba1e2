use crate::display;
use svc_router_engine::{EventStream, OrchestratorSession};

/// Run one query through the ReAct loop, printing events as they stream.
pub async fn execute_react(session: &OrchestratorSession, query: &str) {
    let (stream, mut receiver) = EventStream::channel();

    let printer = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            display::render_event(&event);
        }
    });

    let trace = session.run_react(query, &stream).await;
    drop(stream);
    let _ = printer.await;

    display::render_trace(&trace);
}

/// Run one query through the batch plan pipeline.
pub async fn execute_plan(session: &OrchestratorSession, query: &str) {
    let run = session.run_plan(query).await;
    display::render_plan_run(&run);
}
