use anyhow::Result;
use clap::Parser;
use crewline::{LlmOverride, config, crew, llm, output, pipelines, tools};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build an LlmClient from config + optional CLI override.
fn build_llm_client(
    llm_config: &config::LlmConfig,
    llm_override: Option<&LlmOverride>,
) -> Result<llm::LlmClient> {
    let provider = llm_override
        .map(|o| o.provider.clone())
        .unwrap_or_else(|| llm_config.provider.clone());
    let model = llm_override
        .map(|o| o.model.clone())
        .unwrap_or_else(|| llm_config.model.clone());
    let client = llm::LlmClient::from_config(
        provider,
        model,
        llm_config.max_tokens,
        llm_config.api_key_env.clone(),
        llm_config.base_url.clone(),
    )?;
    Ok(client)
}

fn make_llm_override(provider: Option<String>, model: Option<String>) -> Option<LlmOverride> {
    if provider.is_none() && model.is_none() {
        return None;
    }
    let provider = provider
        .map(|p| match p.as_str() {
            "openai" => llm::Provider::OpenAi,
            "openrouter" => llm::Provider::OpenRouter,
            _ => llm::Provider::Nebius,
        })
        .unwrap_or_default();
    let model = model.unwrap_or_else(|| match &provider {
        llm::Provider::OpenAi => "gpt-4o-mini".into(),
        _ => "meta-llama/Meta-Llama-3.1-70B-Instruct".into(),
    });
    Some(LlmOverride { provider, model })
}

#[derive(Parser)]
#[command(
    name = "crewline",
    about = "Sequential multi-agent research crews over OpenAI-compatible LLM endpoints"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a built-in pipeline: quantum, healthcare, or youtube
    Run {
        /// Name of the built-in pipeline
        pipeline: String,

        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Write an HTML run report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// LLM provider override: nebius, openai, openrouter
        #[arg(long)]
        provider: Option<String>,

        /// LLM model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Run a pipeline declared in a TOML file
    RunFile {
        /// Path to the pipeline TOML file
        path: PathBuf,

        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Write an HTML run report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// LLM provider override: nebius, openai, openrouter
        #[arg(long)]
        provider: Option<String>,

        /// LLM model override
        #[arg(long)]
        model: Option<String>,
    },

    /// List the built-in pipelines
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewline=info".parse().unwrap()),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            pipeline,
            config,
            report,
            provider,
            model,
        } => {
            let cfg = load_config(&config)?;
            cfg.validate()?;
            let llm_override = make_llm_override(provider, model);
            let client = Arc::new(build_llm_client(&cfg.llm, llm_override.as_ref())?);
            let crew = pipelines::builtin(&pipeline, client).ok_or_else(|| {
                let names: Vec<&str> = pipelines::BUILTINS.iter().map(|(n, _)| *n).collect();
                anyhow::anyhow!(
                    "unknown pipeline '{pipeline}' (available: {})",
                    names.join(", ")
                )
            })?;
            run_crew(crew, &cfg, report).await
        }
        Command::RunFile {
            path,
            config,
            report,
            provider,
            model,
        } => {
            let cfg = load_config(&config)?;
            cfg.validate()?;
            let llm_override = make_llm_override(provider, model);
            let client = Arc::new(build_llm_client(&cfg.llm, llm_override.as_ref())?);
            let crew = pipelines::PipelineFile::load(&path)?.into_crew(client);
            run_crew(crew, &cfg, report).await
        }
        Command::List => {
            for (name, summary) in pipelines::BUILTINS {
                println!("{name:<12} {summary}");
            }
            Ok(())
        }
    }
}

/// Load config from the given path, falling back to defaults if absent.
fn load_config(path: &Path) -> Result<config::Config> {
    if path.exists() {
        Ok(config::Config::load(path)?)
    } else {
        Ok(config::Config::default())
    }
}

async fn run_crew(
    crew: crew::Crew,
    cfg: &config::Config,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let toolset = tools::ToolSet::new(&cfg.tools)?;
    let result = crew.kickoff(&toolset, cfg.crew.max_tool_turns).await?;

    println!("{}", result.final_output());

    if let Some(path) = report_path {
        let html = output::render_run_report(&result)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &html)?;
        eprintln!(
            "Report written: {} ({} tasks, {} LLM calls)",
            path.display(),
            result.task_outputs.len(),
            result.stats.llm_calls
        );
    }

    Ok(())
}
