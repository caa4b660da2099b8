use crate::llm::LlmClient;
use crate::tools::ToolKind;
use std::sync::Arc;

/// A named LLM role: goal, backstory, capability plugins, and a shared
/// client for the endpoint it talks to. Agents have no identity beyond the
/// role string and are immutable once the crew starts.
#[derive(Clone)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<ToolKind>,
    pub llm: Arc<LlmClient>,
}

impl AgentSpec {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: Arc<LlmClient>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            llm,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolKind>) -> Self {
        self.tools = tools;
        self
    }

    /// Assemble the system prompt: role + backstory + goal, plus tool-use
    /// instructions when the agent carries capability plugins.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {role}. {backstory}\n\nYour personal goal is: {goal}",
            role = self.role,
            backstory = self.backstory,
            goal = self.goal,
        );

        if !self.tools.is_empty() {
            prompt.push_str(
                "\n\nYou can use the provided tools to gather information before \
                 answering. Call a tool when you need facts you don't have. If you \
                 cannot emit structured tool calls, reply with only a JSON object of \
                 the form {\"tool\": \"<name>\", \"args\": {...}} and wait for the \
                 result. When you have enough information, give your final answer \
                 as plain text.",
            );
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

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

    #[test]
    fn system_prompt_contains_role_goal_backstory() {
        let agent = AgentSpec::new(
            "Senior Researcher",
            "Uncover AI trends in healthcare",
            "You are an expert in AI research.",
            test_llm(),
        );
        let prompt = agent.system_prompt();
        assert!(prompt.contains("You are Senior Researcher."));
        assert!(prompt.contains("You are an expert in AI research."));
        assert!(prompt.contains("Your personal goal is: Uncover AI trends in healthcare"));
        assert!(!prompt.contains("tools"));
    }

    #[test]
    fn system_prompt_mentions_tools_when_present() {
        let agent = AgentSpec::new("Researcher", "goal", "backstory", test_llm())
            .with_tools(vec![ToolKind::WebSearch]);
        assert!(agent.system_prompt().contains("provided tools"));
    }
}
