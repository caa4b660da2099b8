//! Built-in research pipelines, plus loading of pipelines declared in TOML.

use crate::crew::{AgentSpec, Crew, TaskSpec};
use crate::error::{Error, Result};
use crate::llm::LlmClient;
use crate::tools::ToolKind;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Names and one-line summaries of the built-in pipelines.
pub const BUILTINS: &[(&str, &str)] = &[
    (
        "quantum",
        "Single-agent research report on quantum computing advancements",
    ),
    (
        "healthcare",
        "Web-searching researcher + writer producing an article on AI in healthcare",
    ),
    (
        "youtube",
        "YouTube video analyst + report writer covering the AI-agents niche",
    ),
];

/// Build a built-in pipeline by name.
pub fn builtin(name: &str, llm: Arc<LlmClient>) -> Option<Crew> {
    match name {
        "quantum" => Some(quantum_research(llm)),
        "healthcare" => Some(healthcare_article(llm)),
        "youtube" => Some(youtube_niche_report(llm)),
        _ => None,
    }
}

fn quantum_research(llm: Arc<LlmClient>) -> Crew {
    let engineer = AgentSpec::new(
        "senior software engineer",
        "Discover groundbreaking technologies in quantum computing",
        "A curious mind fascinated by cutting-edge innovation and the potential to \
         change the world, you know everything about quantum computing and its \
         applications.",
        llm,
    );

    let research = TaskSpec::new(
        "research",
        "Research and summarize the latest advancements in quantum computing, \
         focusing on practical applications and future potential.",
        "A comprehensive report detailing the latest advancements in quantum \
         computing, including practical applications and future potential, with \
         references to key research papers and articles.",
        "senior software engineer",
    );

    Crew::new("quantum", vec![engineer], vec![research])
}

fn healthcare_article(llm: Arc<LlmClient>) -> Crew {
    let researcher = AgentSpec::new(
        "Senior Researcher",
        "Uncover AI trends in healthcare",
        "You are an expert in AI research.",
        llm.clone(),
    )
    .with_tools(vec![ToolKind::WebSearch, ToolKind::FetchPage]);

    let writer = AgentSpec::new(
        "Content Writer",
        "Write a compelling article on AI in healthcare.",
        "You excel at translating complex topics into readable content.",
        llm,
    );

    let research = TaskSpec::new(
        "research",
        "Research the latest AI trends in healthcare.",
        "A report summarizing key trends.",
        "Senior Researcher",
    );

    let write = TaskSpec::new(
        "write",
        "Write a 3-paragraph article based on the research.",
        "An engaging article on AI in healthcare.",
        "Content Writer",
    )
    .with_context(vec!["research".into()]);

    Crew::new("healthcare", vec![researcher, writer], vec![research, write])
}

fn youtube_niche_report(llm: Arc<LlmClient>) -> Crew {
    let analyst = AgentSpec::new(
        "YouTube Video Analyst",
        "Uncover the titles, descriptions, channels, and publishing patterns of \
         YouTube videos in a specific niche.",
        "You are an expert in YouTube video analysis, specializing in extracting \
         detailed metadata and insights from videos.",
        llm.clone(),
    )
    .with_tools(vec![ToolKind::YoutubeSearch]);

    let writer = AgentSpec::new(
        "Report Writer",
        "Write a compelling report on the YouTube video analysis findings, focusing \
         on view counts, titles, descriptions, and channel patterns. Identify the \
         most popular videos in the niche and their success factors. Write in a \
         professional tone, to the point, with actionable insights and bullet \
         points for clarity. Focus on numbers.",
        "You excel at translating complex data into readable content, focusing on \
         actionable insights and clarity.",
        llm,
    );

    let research = TaskSpec::new(
        "research",
        "Research the successful YouTube videos in the niche of AI agents, focusing \
         on their titles, descriptions, channels, and publishing patterns.",
        "A report summarizing key insights from the YouTube videos, including \
         titles, descriptions, and channel analysis.",
        "YouTube Video Analyst",
    );

    let report = TaskSpec::new(
        "report",
        "Write a detailed report based on the YouTube video analysis findings, \
         focusing on view counts, titles, descriptions, and channel analysis.",
        "An engaging report on the YouTube video analysis findings, highlighting \
         key metrics and insights.",
        "Report Writer",
    )
    .with_context(vec!["research".into()]);

    Crew::new("youtube", vec![analyst, writer], vec![research, report])
}

// -- Declarative pipelines --

/// A pipeline declared in a TOML file: agents and tasks, no code.
#[derive(Debug, Deserialize)]
pub struct PipelineFile {
    pub name: String,
    pub agents: Vec<AgentDecl>,
    pub tasks: Vec<TaskDecl>,
}

#[derive(Debug, Deserialize)]
pub struct AgentDecl {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub tools: Vec<ToolKind>,
}

#[derive(Debug, Deserialize)]
pub struct TaskDecl {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub agent: String,
    #[serde(default)]
    pub context: Vec<String>,
}

impl PipelineFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read pipeline {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse pipeline: {e}")))
    }

    pub fn into_crew(self, llm: Arc<LlmClient>) -> Crew {
        let agents = self
            .agents
            .into_iter()
            .map(|a| AgentSpec::new(a.role, a.goal, a.backstory, llm.clone()).with_tools(a.tools))
            .collect();
        let tasks = self
            .tasks
            .into_iter()
            .map(|t| {
                TaskSpec::new(t.name, t.description, t.expected_output, t.agent)
                    .with_context(t.context)
            })
            .collect();
        Crew::new(self.name, agents, tasks)
    }
}
