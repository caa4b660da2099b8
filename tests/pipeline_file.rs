use crewline::llm::{LlmClient, Provider};
use crewline::pipelines::PipelineFile;
use crewline::tools::ToolKind;
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

const PIPELINE_TOML: &str = r#"
name = "competitor-scan"

[[agents]]
role = "Market Researcher"
goal = "Map the competitive landscape for developer tools."
backstory = "You track developer-tool vendors for a living."
tools = ["web_search", "fetch_page"]

[[agents]]
role = "Analyst"
goal = "Turn research into a crisp brief."
backstory = "You write one-page briefs executives actually read."

[[tasks]]
name = "scan"
description = "Find the main competitors in the developer-tools space."
expected_output = "A list of competitors with one-line descriptions."
agent = "Market Researcher"

[[tasks]]
name = "brief"
description = "Write a one-page brief from the scan."
expected_output = "A one-page competitive brief."
agent = "Analyst"
context = ["scan"]
"#;

#[test]
fn pipeline_file_parses_and_validates() {
    let file: PipelineFile = toml::from_str(PIPELINE_TOML).unwrap();
    assert_eq!(file.name, "competitor-scan");
    assert_eq!(file.agents.len(), 2);
    assert_eq!(file.agents[0].tools, vec![ToolKind::WebSearch, ToolKind::FetchPage]);

    let crew = file.into_crew(test_llm());
    assert!(crew.validate().is_ok());
    assert_eq!(crew.tasks[1].context, vec!["scan".to_string()]);
}

#[test]
fn pipeline_file_with_unknown_agent_fails_validation() {
    let toml_text = r#"
name = "broken"

[[agents]]
role = "Researcher"
goal = "g"
backstory = "b"

[[tasks]]
name = "t"
description = "d"
expected_output = "o"
agent = "Nobody"
"#;
    let file: PipelineFile = toml::from_str(toml_text).unwrap();
    let err = file.into_crew(test_llm()).validate().unwrap_err().to_string();
    assert!(err.contains("unknown agent 'Nobody'"));
}

#[test]
fn pipeline_file_rejects_unknown_tool_name() {
    let toml_text = r#"
name = "broken"

[[agents]]
role = "Researcher"
goal = "g"
backstory = "b"
tools = ["time_travel"]

[[tasks]]
name = "t"
description = "d"
expected_output = "o"
agent = "Researcher"
"#;
    assert!(toml::from_str::<PipelineFile>(toml_text).is_err());
}
