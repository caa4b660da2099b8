use serde::Serialize;

/// A unit of work assigned to an agent by role, optionally consuming the
/// outputs of earlier tasks as context. Tasks are identified by `name`;
/// context lists reference those names.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    /// Role of the agent this task is assigned to.
    pub agent: String,
    /// Names of prior tasks whose outputs are injected as context.
    pub context: Vec<String>,
}

impl TaskSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    /// Assemble the user prompt: task description, the expected-output
    /// criteria, and the upstream task outputs this task depends on.
    pub fn user_prompt(&self, context_outputs: &[&TaskOutput]) -> String {
        let mut prompt = format!(
            "Current task: {description}\n\n\
             This is the criteria your final answer must satisfy: {expected}",
            description = self.description,
            expected = self.expected_output,
        );

        if !context_outputs.is_empty() {
            prompt.push_str("\n\nContext from prior tasks:");
            for output in context_outputs {
                prompt.push_str(&format!(
                    "\n\n## {name} (by {agent})\n{raw}",
                    name = output.task,
                    agent = output.agent,
                    raw = output.raw,
                ));
            }
        }

        prompt.push_str("\n\nBegin. Return the complete final answer, nothing else.");
        prompt
    }
}

/// The captured result of one executed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    /// Task name.
    pub task: String,
    /// Role of the agent that produced it.
    pub agent: String,
    /// The raw text the model returned.
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_without_context() {
        let task = TaskSpec::new("research", "Research X.", "A report on X.", "Researcher");
        let prompt = task.user_prompt(&[]);
        assert!(prompt.contains("Current task: Research X."));
        assert!(prompt.contains("A report on X."));
        assert!(!prompt.contains("Context from prior tasks"));
    }

    #[test]
    fn user_prompt_injects_context_outputs() {
        let task = TaskSpec::new("write", "Write an article.", "An article.", "Writer")
            .with_context(vec!["research".into()]);
        let upstream = TaskOutput {
            task: "research".into(),
            agent: "Researcher".into(),
            raw: "Key trend: diagnosis models.".into(),
        };
        let prompt = task.user_prompt(&[&upstream]);
        assert!(prompt.contains("Context from prior tasks:"));
        assert!(prompt.contains("## research (by Researcher)"));
        assert!(prompt.contains("Key trend: diagnosis models."));
    }
}
