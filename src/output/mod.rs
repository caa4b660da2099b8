use crate::crew::CrewOutput;
use crate::error::{Error, Result};
use askama::Template;
use chrono::Utc;

#[derive(Template)]
#[template(path = "crew_report.html")]
struct CrewReport {
    generated_at: String,
    crew: String,
    task_count: usize,
    llm_calls: u32,
    tool_calls: u32,
    prompt_tokens: u32,
    completion_tokens: u32,
    tasks: Vec<TaskView>,
    final_output: String,
}

#[allow(dead_code)] // fields used by Askama template
struct TaskView {
    index: usize,
    name: String,
    agent: String,
    output: String,
}

/// Render an HTML report of a crew run: per-task outputs plus usage totals.
pub fn render_run_report(output: &CrewOutput) -> Result<String> {
    let tasks = output
        .task_outputs
        .iter()
        .enumerate()
        .map(|(i, t)| TaskView {
            index: i + 1,
            name: t.task.clone(),
            agent: t.agent.clone(),
            output: t.raw.clone(),
        })
        .collect();

    let report = CrewReport {
        generated_at: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        crew: output.crew.clone(),
        task_count: output.task_outputs.len(),
        llm_calls: output.stats.llm_calls,
        tool_calls: output.stats.tool_calls,
        prompt_tokens: output.stats.prompt_tokens,
        completion_tokens: output.stats.completion_tokens,
        tasks,
        final_output: output.final_output().to_string(),
    };

    report
        .render()
        .map_err(|e| Error::Template(e.to_string()))
}
