use anyhow::Result;
use clap::Parser;
use colored::*;
use hive_framework::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use termimad::MadSkin;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_MAIN_TASK: &str =
    "Help the user with whatever they ask, using the agents and tools available.";

const SUPERVISOR_TASK: &str = r#"You are the supervisor. The user talks only to you.
- Split the user's request into steps and delegate them with 'send_message'.
- 'os_worker' runs shell commands and writes script files; 'web_worker' fetches web pages.
- If the work needs more hands, create agents with 'create_agents_for_work'.
- Keep the user informed of the plan and summarize results when you finish."#;

const OS_WORKER_TASK: &str = r#"You are an expert in operating systems, scripting and automation.
- Tools: 'run_shell_command' for terminal work, 'save_python_code' to write scripts.
- Only act on instructions from other agents.
- If a command fails, analyze the error, adapt and retry.
- Report output and errors concisely, then call finish."#;

const WEB_WORKER_TASK: &str = r#"You are an expert in finding and extracting information on the web.
- Tool: 'fetch_page' returns a page as Markdown or HTML.
- Wait for instructions from the supervisor; do not start conversations yourself.
- Prefer a single high-quality source over many weak ones.
- Summarize what you found and where, then call finish."#;

/// Command-line arguments for the Hive CLI
#[derive(Parser)]
#[command(
    name = "hive",
    about = "Hive - a supervisor and its workers cooperating through tool-calling LLM agents"
)]
pub struct Args {
    /// Path to the configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Enable debug mode
    #[clap(short, long)]
    debug: bool,

    /// Path to the data directory
    #[clap(long, short_alias = 'f')]
    data_dir: Option<PathBuf>,

    /// LLM provider to use
    #[clap(long, short_alias = 'r')]
    provider: Option<String>,

    /// Model every agent talks to
    #[clap(short, long)]
    model: Option<String>,

    /// Shared mission given to every agent
    #[clap(short, long)]
    task: Option<String>,
}

/// Replace Markdown links with OSC 8 hyperlinks for supported terminals.
fn add_osc8_hyperlinks(input: &str) -> String {
    let Ok(re) = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)") else {
        return input.to_string();
    };
    re.replace_all(input, |caps: &regex::Captures| {
        let text = &caps[1];
        let url = &caps[2];
        format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text)
    })
    .to_string()
}

/// Load the configuration file and apply command-line overrides
fn load_config(args: &Args) -> Result<HiveConfig> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => HiveConfig::default_path()?,
    };
    let mut config = HiveConfig::load(&path)?;

    if let Some(provider) = &args.provider {
        config.provider.name = provider.clone();
    }
    if let Some(model) = &args.model {
        config.provider.default_model = model.clone();
    }
    if let Some(data_dir) = &args.data_dir {
        config.base.data_dir = data_dir.to_string_lossy().to_string();
    }
    if args.debug {
        config.base.log_level = "debug".to_string();
    }
    config.validate()?;
    Ok(config)
}

/// Daily-rotated log file under `<data_dir>/logs`, keeping a week of files
///
/// Log lines are written until the returned guard is dropped.
fn log_file_writer(data_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("hive")
        .filename_suffix("log")
        .max_log_files(7)
        .build(data_dir.join("logs"))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install console and file logging
fn init_tracing(config: &HiveConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.base.log_level));
    let (file_writer, guard) = log_file_writer(Path::new(&config.base.data_dir))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()?;
    Ok(guard)
}

/// Build the supervisor and the default workers and register them
async fn bootstrap(
    config: &HiveConfig,
    registry: &AgentRegistry,
    main_task: &str,
) -> Result<Arc<Agent>> {
    let gateway: Arc<dyn ModelGateway> = Arc::new(GenaiGateway::from_config(&config.provider));
    let working_dir = config.workspace.working_dir.clone();
    std::fs::create_dir_all(&working_dir)?;

    let supervisor = Agent::builder("supervisor", gateway.clone())
        .role(AgentRole::Manager)
        .main_task(main_task)
        .local_task(SUPERVISOR_TASK)
        .tool(registry.spawn_tool())
        .engine_config(config.engine.clone())
        .build_with(registry.classifier())?;

    let os_worker = Agent::builder("os_worker", gateway.clone())
        .role(AgentRole::Worker)
        .main_task(main_task)
        .local_task(OS_WORKER_TASK)
        .tool(Arc::new(ShellTool::new(
            working_dir.clone(),
            Duration::from_secs(config.workspace.shell_timeout_seconds),
        )))
        .tool(Arc::new(SaveCodeTool::new(working_dir)))
        .engine_config(config.engine.clone())
        .build_with(registry.classifier())?;

    let web_worker = Agent::builder("web_worker", gateway)
        .role(AgentRole::Worker)
        .main_task(main_task)
        .local_task(WEB_WORKER_TASK)
        .tool(Arc::new(FetchPageTool::new()?))
        .engine_config(config.engine.clone())
        .build_with(registry.classifier())?;

    if !registry
        .add_agents(vec![supervisor.clone(), os_worker, web_worker])
        .await
    {
        anyhow::bail!("Failed to register the default agents");
    }
    Ok(supervisor)
}

/// Print every registered agent with its role and state
async fn display_agents(registry: &AgentRegistry) {
    println!();
    println!("{}", "🤖 Registered agents".bright_cyan().bold());
    for agent in registry.agents().await {
        let state = match agent.state() {
            LifecycleState::Active => "active".bright_green(),
            LifecycleState::Passive => "passive".bright_yellow(),
        };
        let tools = agent.tools().names();
        println!(
            "• {} ({}, {}) - {}",
            agent.name().bright_green().bold(),
            agent.role().to_string().bright_magenta(),
            state,
            if tools.is_empty() {
                "no tools".to_string()
            } else {
                tools.join(", ")
            }
            .bright_cyan()
        );
    }
    println!();
}

/// Main conversation loop with the supervisor
async fn conversation_loop(
    supervisor: Arc<Agent>,
    registry: &AgentRegistry,
    max_call_depth: usize,
) -> Result<()> {
    println!(
        "{}",
        "💬 Talking to the supervisor. Type '/quit' to stop.".bright_green()
    );
    println!(
        "{}",
        "Type '/agents' to list the population. Ctrl-C cancels a running request.".bright_yellow()
    );
    println!();

    let skin = MadSkin::default();

    loop {
        print!("{}", "You: ".bright_cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "/quit" | "/exit" | "quit" | "exit" => {
                println!("{}", "👋 Goodbye!".bright_green());
                break;
            }
            "/agents" => {
                display_agents(registry).await;
                continue;
            }
            _ => {}
        }

        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(max_call_depth, token.clone());
        let invocation = supervisor.invoke_in(InvokeRequest::new(input), &ctx);
        tokio::pin!(invocation);

        let finished = tokio::select! {
            result = &mut invocation => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        let result = match finished {
            Some(result) => result,
            None => {
                token.cancel();
                invocation.await
            }
        };

        print!("{}", format!("{}: ", supervisor.name()).bright_green().bold());
        io::stdout().flush()?;

        match result {
            Ok(output) if output.is_truthy() => {
                let formatted_content = add_osc8_hyperlinks(&output.text());
                println!("{}", skin.term_text(&formatted_content));
            }
            Ok(output) => {
                println!("{}", format!("⚠️ {}", output.text()).yellow());
            }
            Err(HiveError::Cancelled) => {
                println!("{}", "⏹ Request cancelled".yellow());
            }
            Err(e) => {
                error!("Supervisor failed: {}", e);
                println!("{}", format!("❌ Agent error: {}", e).red());
            }
        }

        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = load_config(&args)?;

    std::fs::create_dir_all(&config.base.data_dir)?;
    let _log_guard = init_tracing(&config)?;

    info!("Starting Hive CLI");
    info!("Data directory: {}", config.base.data_dir);
    info!(
        "Provider: {} ({})",
        config.provider.name, config.provider.default_model
    );
    if config.provider.api_key.is_some() {
        warn!("provider.api_key is ignored; set the provider's API key environment variable instead");
    }

    let main_task = args.task.as_deref().unwrap_or(DEFAULT_MAIN_TASK);
    let registry = AgentRegistry::from_config(&config);
    let supervisor = bootstrap(&config, &registry, main_task).await?;

    println!("{}", "🚀 Activating agents...".bright_yellow());
    let report = registry.activate_all(HashMap::new()).await;
    for (name, reason) in &report.failed {
        println!(
            "{}",
            format!("❌ {} failed to activate: {}", name, reason).red()
        );
    }
    println!(
        "{}",
        format!("✅ {} agents active", report.activated.len()).bright_green()
    );

    conversation_loop(supervisor, &registry, config.engine.max_call_depth).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc8_links() {
        let out = add_osc8_hyperlinks("see [docs](https://example.com) now");
        assert_eq!(
            out,
            "see \x1b]8;;https://example.com\x1b\\docs\x1b]8;;\x1b\\ now"
        );
        assert_eq!(add_osc8_hyperlinks("plain"), "plain");
    }

    #[test]
    fn test_cli_overrides() {
        let path = missing_config_path();
        let args = Args::parse_from([
            "hive",
            "--config",
            path.to_str().unwrap(),
            "--model",
            "claude-3-5-haiku-latest",
            "--debug",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.provider.default_model, "claude-3-5-haiku-latest");
        assert_eq!(config.base.log_level, "debug");
    }

    #[test]
    fn test_log_file_writer_writes_into_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, guard) = log_file_writer(dir.path()).unwrap();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        );
        tracing::subscriber::with_default(subscriber, || {
            info!("supervisor is listening");
        });
        drop(guard);

        let logs = std::fs::read_dir(dir.path().join("logs"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect::<Vec<_>>();
        assert_eq!(logs.len(), 1);
        let name = logs[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("hive.") && name.ends_with(".log"), "{}", name);
        let content = std::fs::read_to_string(&logs[0]).unwrap();
        assert!(content.contains("supervisor is listening"));
    }

    /// A config path that does not exist, so defaults are loaded
    fn missing_config_path() -> PathBuf {
        std::env::temp_dir().join(format!("hive-missing-{}.toml", std::process::id()))
    }
}
