//! CLI entrypoint for chatstream
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use chatstream_application::{
    ChatCompletionInput, ChatCompletionStreamUseCase, ChatGateway, CompletionClient,
};
use chatstream_infrastructure::{
    ApproximateTokenCounter, ConfigLoader, FileConfig, InMemoryChatGateway,
    JsonFileChatGateway, JsonlConversationLogger, OpenAiCompletionClient,
    ScriptedCompletionClient, StorageBackend,
};
use chatstream_presentation::{ChatRepl, Cli, ConsoleFormatter, OutputFormat, run_turn};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // stdout carries the streamed reply
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            error!("{}", issue);
        }
        bail!("invalid configuration ({} issue(s))", issues.len());
    }

    info!("Starting chatstream with model {}", config.model.name);

    // === Dependency Injection ===
    let gateway = build_gateway(&config)?;
    let client = build_client(&config, cli.offline)?;
    let counter = Arc::new(ApproximateTokenCounter::with_chars_per_token(
        config.model.chars_per_token,
    ));

    let mut use_case = ChatCompletionStreamUseCase::new(gateway.clone(), client, counter);
    if let Some(path) = config.conversation_log_path()
        && let Some(logger) = JsonlConversationLogger::new(&path)
    {
        info!("Writing conversation log to {}", logger.path().display());
        use_case = use_case.with_conversation_logger(Arc::new(logger));
    }

    let user_id = cli.user.clone().unwrap_or_else(|| config.chat.owner.clone());
    let completion_config = config.to_completion_config();

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case, gateway, completion_config, user_id)
            .with_chat_id(cli.session.clone().unwrap_or_default())
            .with_history_path(config.history_path())
            .with_usage(config.repl.show_usage && !cli.quiet);

        repl.run().await?;
        return Ok(());
    }

    // Single message mode - message is required
    let message = match cli.message {
        Some(m) => m,
        None => bail!("Message is required. Use --chat for interactive mode."),
    };

    let input = ChatCompletionInput::new(
        cli.session.unwrap_or_default(),
        user_id,
        message,
        completion_config,
    );
    let output = run_turn(&use_case, input, cli.output == OutputFormat::Text).await?;

    match cli.output {
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&output)),
        OutputFormat::Text if !cli.quiet => {
            if let Ok(chat) = gateway.find_session_by_id(&output.chat_id).await {
                eprintln!("{}", ConsoleFormatter::usage_line(&chat));
            }
        }
        OutputFormat::Text => {}
    }

    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.model.max_tokens = max_tokens;
    }
    if let Some(system) = &cli.system {
        config.chat.initial_system_message = system.clone();
    }
    if cli.ephemeral {
        config.storage.backend = StorageBackend::Memory;
    }
}

fn build_gateway(config: &FileConfig) -> Result<Arc<dyn ChatGateway>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryChatGateway::new())),
        StorageBackend::File => {
            let dir = config
                .storage_dir()
                .ok_or_else(|| anyhow!("no data directory available; set storage.dir"))?;
            info!("Storing chats in {}", dir.display());
            Ok(Arc::new(JsonFileChatGateway::new(dir)))
        }
    }
}

fn build_client(config: &FileConfig, offline: bool) -> Result<Arc<dyn CompletionClient>> {
    if offline {
        info!("Offline mode: replies are echoed locally");
        return Ok(Arc::new(ScriptedCompletionClient::echo()));
    }

    let api_key = config.upstream.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set; sending requests without authorization",
            config.upstream.api_key_env
        );
    }

    let client = OpenAiCompletionClient::new(
        config.upstream.base_url.as_str(),
        api_key,
        Duration::from_secs(config.upstream.timeout_seconds),
    )?;
    Ok(Arc::new(client))
}
