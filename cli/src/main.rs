//! CLI entrypoint for quill
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use quill_application::{
    ConversationLogger, RunSessionUseCase, RunTurnUseCase, ToolExecutorPort, TurnProgressNotifier,
};
use quill_domain::TransportMode;
use quill_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, LocalToolExecutor, McpServer,
    McpToolExecutor, PathResolver, ProviderKind, build_gateway, default_registry,
};
use quill_presentation::{ChatRepl, Cli, Command, ProgressReporter, ProviderArg, SimpleProgress};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    // === Show config sources ===
    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    // === Load configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    if let Some(Command::ServeTools { working_dir }) = &cli.command {
        let resolver = resolve_working_dir(working_dir.as_deref(), &config)?;
        return serve_tools(resolver).await;
    }

    apply_overrides(&cli, &mut config);
    for warning in config.check()? {
        warn!("{}", warning.message);
    }

    let resolver = resolve_working_dir(None, &config)?;
    info!("Starting quill in {}", resolver.base().display());

    // === Dependency Injection ===
    let gateway = build_gateway(config.backend.provider, &config.providers, resolver.base())
        .context("Failed to set up the inference backend")?;

    let transport = config.agent.transport;
    let mut mcp: Option<Arc<McpToolExecutor>> = None;
    let executor: Arc<dyn ToolExecutorPort> = match transport {
        TransportMode::Line => Arc::new(LocalToolExecutor::new(default_registry(resolver.clone()))),
        TransportMode::Mcp => {
            let command = config
                .mcp
                .command_or(|| default_server_command(resolver.base()));
            info!(command = ?command, "Starting MCP tool server");
            let executor = Arc::new(
                McpToolExecutor::spawn(&command, config.mcp.timeout())
                    .await
                    .context("Failed to start the MCP tool server")?,
            );
            mcp = Some(executor.clone());
            executor
        }
    };

    let mut turn = RunTurnUseCase::new(gateway.clone(), executor.clone(), transport.grammar())
        .with_params(config.agent.to_execution_params());

    if let Some(path) = &config.logging.conversation_log
        && let Some(logger) = JsonlConversationLogger::open(resolver.resolve(path))
    {
        info!("Conversation log: {}", logger.path().display());
        let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
        turn = turn.with_conversation_logger(logger);
    }

    let session = RunSessionUseCase::new(turn).with_ctrl_c_interrupt(true);

    let mut repl = ChatRepl::new(executor.tool_spec().definitions().to_vec())
        .with_model(gateway.model_name())
        .with_transport(transport);

    let progress: Box<dyn TurnProgressNotifier> = if std::io::stdout().is_terminal() {
        if !cli.quiet {
            repl.print_welcome();
        }
        Box::new(ProgressReporter::new().with_quiet(cli.quiet))
    } else {
        Box::new(SimpleProgress::new(cli.quiet))
    };

    let summary = session.run(&mut repl, progress.as_ref()).await;
    info!(
        "Session summary: {} answered, {} failed",
        summary.turns_answered, summary.turns_failed
    );

    if let Some(mcp) = mcp
        && let Err(e) = mcp.shutdown().await
    {
        warn!("MCP tool server did not shut down cleanly: {}", e);
    }

    Ok(())
}

/// Install the console subscriber on stderr, plus a daily rolling file when
/// `log_dir` is given. Stdout stays free for the REPL and the MCP channel.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "quill.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

/// CLI flags win over every config layer.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(transport) = cli.transport {
        config.agent.transport = transport.into();
    }
    if let Some(provider) = cli.provider {
        config.backend.provider = match provider {
            ProviderArg::Anthropic => ProviderKind::Anthropic,
            ProviderArg::Ollama => ProviderKind::Ollama,
        };
    }
    if let Some(model) = &cli.model {
        match config.backend.provider {
            ProviderKind::Anthropic => config.providers.anthropic.model = model.clone(),
            ProviderKind::Ollama => config.providers.ollama.model = model.clone(),
        }
    }
    if cli.max_iterations.is_some() {
        config.agent.max_iterations = cli.max_iterations;
    }
    if let Some(dir) = &cli.working_dir {
        config.agent.working_dir = Some(dir.display().to_string());
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.display().to_string());
    }
}

/// Explicit directory, then `[agent] working_dir`, then the process cwd.
fn resolve_working_dir(explicit: Option<&Path>, config: &FileConfig) -> Result<PathResolver> {
    let cwd = PathResolver::current_dir().context("Failed to read the current directory")?;
    let dir = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.agent.working_dir.as_deref().map(|d| cwd.resolve(d)));

    let Some(dir) = dir else {
        return Ok(cwd);
    };
    let dir = cwd.resolve(&dir.to_string_lossy());
    if !dir.is_dir() {
        bail!("Working directory {} does not exist", dir.display());
    }
    Ok(PathResolver::new(dir))
}

/// This binary in tool-server mode, rooted at the session's directory.
fn default_server_command(base: &Path) -> Vec<String> {
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("quill"));
    vec![
        exe.display().to_string(),
        "serve-tools".to_string(),
        "--working-dir".to_string(),
        base.display().to_string(),
    ]
}

async fn serve_tools(resolver: PathResolver) -> Result<()> {
    info!("Serving tools over stdio from {}", resolver.base().display());
    let executor = Arc::new(LocalToolExecutor::new(default_registry(resolver)));
    McpServer::new(executor)
        .serve_stdio()
        .await
        .context("MCP tool server failed")
}
