//! Terminal rendering of stream events, traces, and plan runs

use svc_router_common::{EventType, OrchestrationTrace, StreamEvent};
use svc_router_engine::PlanRun;

pub fn render_event(event: &StreamEvent) {
    let content = event.content.as_deref().unwrap_or_default();
    match event.event_type {
        EventType::StepStarted => println!("[step {}] {}", event.step_number, content),
        EventType::Reasoning => println!("[step {}] Thought: {}", event.step_number, content),
        EventType::Action => {
            println!("[step {}] Action: {}", event.step_number, content);
            if let Some(data) = &event.data {
                println!("{}", indent(&pretty(data)));
            }
        }
        EventType::Observation => {
            println!("[step {}] Observation:", event.step_number);
            if let Some(data) = &event.data {
                println!("{}", indent(&pretty(data)));
            }
        }
        EventType::FinalAnswer => println!("[step {}] Final answer: {}", event.step_number, content),
        EventType::Error => println!("[step {}] Error: {}", event.step_number, content),
        EventType::Summary => println!("\nSummary:\n{}", content),
        EventType::StepCompleted => println!("[step {}] {}", event.step_number, content),
    }
}

pub fn render_trace(trace: &OrchestrationTrace) {
    println!();
    println!(
        "Run {}: {} steps in {}ms",
        trace.status, trace.total_steps, trace.execution_time_ms
    );
    if let Some(error) = &trace.error {
        println!("Error: {}", error);
    }
    if let Some(answer) = &trace.final_answer {
        println!("Answer: {}", answer);
    }
}

pub fn render_plan_run(run: &PlanRun) {
    if let Some(error) = &run.error {
        println!("Planning failed: {}", error);
        if let Some(raw) = &run.raw_response {
            println!("Raw model output:\n{}", indent(raw));
        }
        return;
    }

    if !run.reasoning.is_empty() {
        println!("Reasoning: {}\n", run.reasoning);
    }

    for execution in &run.executions {
        let outcome = if execution.result.is_success() {
            "ok".to_string()
        } else {
            format!(
                "error: {}",
                execution.result.error.as_deref().unwrap_or("unknown")
            )
        };
        println!(
            "Step {} - {} [{}]",
            execution.step, execution.service_name, outcome
        );
        if !execution.rationale.is_empty() {
            println!("  rationale: {}", execution.rationale);
        }
        if let Some(data) = &execution.result.data {
            println!("{}", indent(&pretty(data)));
        }
    }

    if !run.summary.is_empty() {
        println!("\nSummary:\n{}", run.summary);
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
