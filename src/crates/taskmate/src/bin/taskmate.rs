//! taskmate CLI - natural-language task assistant
//!
//! Main entry point for the taskmate command-line tool.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use taskmate::{bootstrap, ConfigLoader, ConfigOverrides, Dispatcher, TaskmateConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskmate")]
#[command(about = "taskmate - manage your tasks in plain language", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file to use instead of ~/.taskmate and ./.taskmate
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// LLM provider: gemini, openai
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Task store backend: sqlite, memory
    #[arg(long, global = true)]
    store: Option<String>,

    /// SQLite database path (relative to ~/.taskmate or absolute)
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Chat,

    /// Handle a single request and print the reply
    Ask {
        /// What to do, in plain language
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show the resolved configuration
    Config,
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(cli: &Cli) -> anyhow::Result<TaskmateConfig> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::from_path(path),
        None => ConfigLoader::new(),
    };
    let overrides = ConfigOverrides {
        provider: cli.provider.clone(),
        model: cli.model.clone(),
        store: cli.store.clone(),
        db_path: cli.db_path.clone(),
    };

    loader
        .with_overrides(overrides)
        .load()
        .await
        .context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli).await?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Config => {
            print_config(&config)?;
            Ok(())
        }
        Commands::Ask { text } => {
            let mut dispatcher = bootstrap(&config)
                .await
                .context("Failed to start taskmate")?;
            let reply = dispatcher.handle_utterance(&text.join(" ")).await;
            println!("{}", reply);
            Ok(())
        }
        Commands::Chat => {
            let dispatcher = bootstrap(&config)
                .await
                .context("Failed to start taskmate")?;
            run_repl(dispatcher).await
        }
    }
}

fn print_config(config: &TaskmateConfig) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(&config.redacted())?;
    println!("{}", rendered.trim_end());
    println!();
    match config.database_path() {
        Ok(path) => println!("{} {}", "# database:".dimmed(), path.display()),
        Err(e) => println!("{} {}", "# database:".dimmed(), e),
    }
    Ok(())
}

async fn run_repl(mut dispatcher: Dispatcher) -> anyhow::Result<()> {
    println!("{}", "taskmate".bold());
    println!(
        "{}",
        "Type what you need. 'clear' resets the conversation, 'exit' quits.".dimmed()
    );
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "You:".bold().green());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        match input.to_lowercase().as_str() {
            "exit" | "quit" | "bye" => {
                println!("{}", "Goodbye!".bold());
                break;
            }
            "clear" => {
                dispatcher.reset();
                println!("{}", "Conversation history cleared.".yellow());
                continue;
            }
            _ => {}
        }

        let reply = dispatcher.handle_utterance(input).await;
        println!("{} {}", "Assistant:".bold().cyan(), reply);
        println!();
    }

    Ok(())
}
