//! Sequential crew execution: resolve each task's agent, assemble the
//! prompt, call the LLM (with a tool-use conversation when the agent
//! carries capability plugins), capture the output, and feed it forward
//! to downstream tasks.

pub mod agent;
pub mod task;

pub use agent::AgentSpec;
pub use task::{TaskOutput, TaskSpec};

use crate::error::{Error, Result};
use crate::llm::{self, ChatMessage, FinishReason, ToolDef, Usage};
use crate::tools::{ToolKind, ToolSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// An ordered set of tasks over a fixed set of agents, executed
/// sequentially.
pub struct Crew {
    pub name: String,
    pub agents: Vec<AgentSpec>,
    pub tasks: Vec<TaskSpec>,
}

/// Cumulative usage across one crew run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunStats {
    pub llm_calls: u32,
    pub tool_calls: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl RunStats {
    fn accumulate(&mut self, usage: &Usage) {
        self.llm_calls += 1;
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
    }
}

/// The result of a crew run: every task's output in execution order,
/// plus usage accounting. The final task's text is the pipeline result.
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    pub crew: String,
    pub task_outputs: Vec<TaskOutput>,
    pub stats: RunStats,
}

impl CrewOutput {
    pub fn final_output(&self) -> &str {
        self.task_outputs
            .last()
            .map(|o| o.raw.as_str())
            .unwrap_or_default()
    }
}

impl Crew {
    pub fn new(name: impl Into<String>, agents: Vec<AgentSpec>, tasks: Vec<TaskSpec>) -> Self {
        Self {
            name: name.into(),
            agents,
            tasks,
        }
    }

    /// Every tool kind any agent in the crew may invoke.
    pub fn tool_kinds(&self) -> Vec<ToolKind> {
        let mut kinds = Vec::new();
        for agent in &self.agents {
            for kind in &agent.tools {
                if !kinds.contains(kind) {
                    kinds.push(*kind);
                }
            }
        }
        kinds
    }

    /// Check the static configuration before execution:
    /// - at least one task, unique task names, unique agent roles
    /// - every task's agent exists in the crew's agent list
    /// - every context reference names an earlier task (which rules out
    ///   self-references, cycles, and forward references under the
    ///   sequential process)
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(Error::pipeline(format!("crew '{}' has no tasks", self.name)));
        }

        for (i, agent) in self.agents.iter().enumerate() {
            if self.agents[..i].iter().any(|a| a.role == agent.role) {
                return Err(Error::pipeline(format!(
                    "duplicate agent role '{}'",
                    agent.role
                )));
            }
        }

        let mut earlier: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if earlier.contains(&task.name.as_str()) {
                return Err(Error::pipeline(format!(
                    "duplicate task name '{}'",
                    task.name
                )));
            }
            if !self.agents.iter().any(|a| a.role == task.agent) {
                return Err(Error::pipeline(format!(
                    "task '{}' is assigned to unknown agent '{}'",
                    task.name, task.agent
                )));
            }
            for ctx in &task.context {
                if *ctx == task.name {
                    return Err(Error::pipeline(format!(
                        "task '{}' lists itself as context",
                        task.name
                    )));
                }
                if !earlier.contains(&ctx.as_str()) {
                    return Err(Error::pipeline(format!(
                        "task '{}' context '{}' must name an earlier task",
                        task.name, ctx
                    )));
                }
            }
            earlier.push(&task.name);
        }

        Ok(())
    }

    /// Execute all tasks in order and return the collected outputs.
    pub async fn kickoff(&self, tools: &ToolSet, max_tool_turns: u32) -> Result<CrewOutput> {
        self.validate()?;
        tools.ensure_available(&self.tool_kinds())?;

        info!(crew = %self.name, tasks = self.tasks.len(), "crew kickoff");

        let mut stats = RunStats::default();
        let mut outputs: Vec<TaskOutput> = Vec::new();

        for (i, task) in self.tasks.iter().enumerate() {
            let agent = self
                .agents
                .iter()
                .find(|a| a.role == task.agent)
                .ok_or_else(|| {
                    Error::pipeline(format!("task '{}' lost its agent", task.name))
                })?;

            let context: Vec<&TaskOutput> = task
                .context
                .iter()
                .filter_map(|name| outputs.iter().find(|o| &o.task == name))
                .collect();

            info!(
                task = %task.name,
                agent = %agent.role,
                step = i + 1,
                total = self.tasks.len(),
                "starting task"
            );

            let raw = execute_task(agent, task, &context, tools, max_tool_turns, &mut stats).await?;
            debug!(task = %task.name, chars = raw.len(), "task complete");

            outputs.push(TaskOutput {
                task: task.name.clone(),
                agent: agent.role.clone(),
                raw,
            });
        }

        info!(
            crew = %self.name,
            llm_calls = stats.llm_calls,
            tool_calls = stats.tool_calls,
            prompt_tokens = stats.prompt_tokens,
            completion_tokens = stats.completion_tokens,
            "crew run complete"
        );

        Ok(CrewOutput {
            crew: self.name.clone(),
            task_outputs: outputs,
            stats,
        })
    }
}

/// Run one task to completion: a single model turn for a plain agent, or a
/// tool-use conversation for an agent with capability plugins.
async fn execute_task(
    agent: &AgentSpec,
    task: &TaskSpec,
    context: &[&TaskOutput],
    tools: &ToolSet,
    max_tool_turns: u32,
    stats: &mut RunStats,
) -> Result<String> {
    let defs = tools.definitions(&agent.tools);
    let mut messages = vec![
        ChatMessage::system(agent.system_prompt()),
        ChatMessage::user(task.user_prompt(context)),
    ];
    let mut turns = 0u32;

    loop {
        // Once the turn budget is spent, stop offering tools so the model
        // must answer from what it has gathered.
        let budget_left = turns < max_tool_turns;
        if !budget_left && !defs.is_empty() && turns == max_tool_turns {
            debug!(task = %task.name, turns, "tool turn budget spent, requesting final answer");
        }
        let offered: &[ToolDef] = if budget_left { &defs } else { &[] };

        let completion = agent.llm.converse(&messages, offered).await?;
        stats.accumulate(&completion.usage);
        let message = completion.message;

        if budget_left && !message.tool_calls.is_empty() {
            let calls = message.tool_calls.clone();
            messages.push(message);
            for call in calls {
                stats.tool_calls += 1;
                let args: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|_| Value::Object(Default::default()));
                let (result, is_error) = tools.dispatch(&call.function.name, &args).await;
                if is_error {
                    warn!(task = %task.name, tool = %call.function.name, "tool call failed");
                }
                messages.push(ChatMessage::tool_result(call.id, result));
            }
            turns += 1;
            continue;
        }

        let text = message.text_content().to_string();

        // Models without native tool calling ask for tools as a JSON reply.
        if budget_left
            && !defs.is_empty()
            && let Some((tool, args)) = parse_inline_tool_call(&text, &defs)
        {
            stats.tool_calls += 1;
            let (result, is_error) = tools.dispatch(&tool, &args).await;
            if is_error {
                warn!(task = %task.name, tool = %tool, "tool call failed");
            }
            messages.push(ChatMessage::assistant(text));
            messages.push(ChatMessage::user(format!("Result of {tool}:\n{result}")));
            turns += 1;
            continue;
        }

        if text.is_empty() {
            if completion.finish_reason == FinishReason::Length {
                return Err(Error::parse(format!(
                    "task '{}' hit the token limit before producing any text",
                    task.name
                )));
            }
            return Err(Error::parse(format!(
                "task '{}' produced no output",
                task.name
            )));
        }

        return Ok(text);
    }
}

#[derive(Deserialize)]
struct InlineToolCall {
    tool: String,
    #[serde(default)]
    args: Value,
}

/// Recognize a `{"tool": ..., "args": {...}}` reply, possibly wrapped in
/// markdown fences or surrounding prose. Only names of offered tools count;
/// anything else is treated as a final answer.
fn parse_inline_tool_call(text: &str, defs: &[ToolDef]) -> Option<(String, Value)> {
    let call: InlineToolCall = serde_json::from_str(llm::extract_json(text)).ok()?;
    if !defs.iter().any(|d| d.name == call.tool) {
        return None;
    }
    let args = match call.args {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Some((call.tool, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmClient, Provider};
    use std::sync::Arc;

    fn test_llm() -> Arc<LlmClient> {
        Arc::new(
            LlmClient::new(
                Provider::Nebius,
                "key".into(),
                "test-model".into(),
                256,
                Some("http://localhost:1".into()),
            )
            .unwrap(),
        )
    }

    fn agent(role: &str) -> AgentSpec {
        AgentSpec::new(role, "goal", "backstory", test_llm())
    }

    fn task(name: &str, agent: &str) -> TaskSpec {
        TaskSpec::new(name, "desc", "out", agent)
    }

    #[test]
    fn validate_accepts_well_formed_crew() {
        let crew = Crew::new(
            "ok",
            vec![agent("a"), agent("b")],
            vec![
                task("t1", "a"),
                task("t2", "b").with_context(vec!["t1".into()]),
            ],
        );
        assert!(crew.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_agent() {
        let crew = Crew::new("bad", vec![agent("a")], vec![task("t1", "ghost")]);
        let err = crew.validate().unwrap_err().to_string();
        assert!(err.contains("unknown agent 'ghost'"));
    }

    #[test]
    fn validate_rejects_self_context() {
        let crew = Crew::new(
            "bad",
            vec![agent("a")],
            vec![task("t1", "a").with_context(vec!["t1".into()])],
        );
        let err = crew.validate().unwrap_err().to_string();
        assert!(err.contains("lists itself"));
    }

    #[test]
    fn validate_rejects_forward_context() {
        let crew = Crew::new(
            "bad",
            vec![agent("a")],
            vec![
                task("t1", "a").with_context(vec!["t2".into()]),
                task("t2", "a"),
            ],
        );
        let err = crew.validate().unwrap_err().to_string();
        assert!(err.contains("must name an earlier task"));
    }

    #[test]
    fn validate_rejects_duplicates() {
        let crew = Crew::new(
            "bad",
            vec![agent("a"), agent("a")],
            vec![task("t1", "a")],
        );
        assert!(crew.validate().unwrap_err().to_string().contains("duplicate agent role"));

        let crew = Crew::new(
            "bad",
            vec![agent("a")],
            vec![task("t1", "a"), task("t1", "a")],
        );
        assert!(crew.validate().unwrap_err().to_string().contains("duplicate task name"));
    }

    #[test]
    fn validate_rejects_empty_task_list() {
        let crew = Crew::new("empty", vec![agent("a")], vec![]);
        assert!(crew.validate().is_err());
    }

    #[test]
    fn tool_kinds_dedups_across_agents() {
        let a = agent("a");
        let mut b = agent("b");
        b.tools = vec![ToolKind::WebSearch, ToolKind::FetchPage];
        let mut c = agent("c");
        c.tools = vec![ToolKind::WebSearch];
        let crew = Crew::new("x", vec![a, b, c], vec![task("t", "a")]);
        assert_eq!(crew.tool_kinds(), vec![ToolKind::WebSearch, ToolKind::FetchPage]);
    }

    fn defs() -> Vec<ToolDef> {
        vec![ToolDef {
            name: "web_search".into(),
            description: String::new(),
            parameters: serde_json::json!({}),
        }]
    }

    #[test]
    fn inline_tool_call_parses_fenced_json() {
        let text = "I should search.\n```json\n{\"tool\": \"web_search\", \"args\": {\"query\": \"ai\"}}\n```";
        let (tool, args) = parse_inline_tool_call(text, &defs()).unwrap();
        assert_eq!(tool, "web_search");
        assert_eq!(args["query"], "ai");
    }

    #[test]
    fn inline_tool_call_rejects_unknown_tool() {
        let text = "{\"tool\": \"rm_rf\", \"args\": {}}";
        assert!(parse_inline_tool_call(text, &defs()).is_none());
    }

    #[test]
    fn inline_tool_call_ignores_plain_answers() {
        assert!(parse_inline_tool_call("The final answer is 42.", &defs()).is_none());
    }

    #[test]
    fn inline_tool_call_defaults_missing_args() {
        let (_, args) = parse_inline_tool_call("{\"tool\": \"web_search\"}", &defs()).unwrap();
        assert!(args.as_object().unwrap().is_empty());
    }

    #[test]
    fn final_output_is_last_task() {
        let out = CrewOutput {
            crew: "c".into(),
            task_outputs: vec![
                TaskOutput { task: "t1".into(), agent: "a".into(), raw: "first".into() },
                TaskOutput { task: "t2".into(), agent: "a".into(), raw: "second".into() },
            ],
            stats: RunStats::default(),
        };
        assert_eq!(out.final_output(), "second");
    }
}
