use crate::oneshot;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use svc_router_engine::OrchestratorSession;

/// Interactive REPL over the ReAct loop.
pub async fn run(session: &OrchestratorSession) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("svc-router - interactive mode");
    println!(
        "{} services registered. Type a request, or 'exit' to quit.",
        session.registry().len()
    );

    loop {
        match rl.readline("svc> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = rl.add_history_entry(line);
                oneshot::execute_react(session, line).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
