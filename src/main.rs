use cloakwatch::alert::{compose_message, Notifier};
use cloakwatch::config::Config;
use cloakwatch::init;
use cloakwatch::listener::resolve_listener;
use cloakwatch::matcher::find_latest_trigger;
use cloakwatch::processor::read_log_lines;
use cloakwatch::Monitor;

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cloakwatch - decloak alerts from game logs to Discord", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file (.yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Game log directory (default: ~/Documents/EVE/logs/Gamelogs)
    #[arg(short, long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Watch the log directory and send alerts (default)
    Run,
    /// Interactive setup for the webhook and mentions
    Setup,
    /// Run detection once against a single log file
    Scan {
        file: PathBuf,
        /// Actually send the alert instead of printing it
        #[arg(long)]
        send: bool,
    },
    /// Send one alert through the configured webhook
    TestAlert {
        #[arg(long, default_value = "Test Pilot")]
        name: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cloakwatch=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Cli::parse();
    let config_path = init::resolve_config_path(args.config);

    // 1. Load configuration (creating defaults on first run)
    let mut config = init::initialize_config(&config_path)?;

    // 2. Command Handling
    match args.command.unwrap_or(Commands::Run) {
        Commands::Setup => init::run_terminal_setup(&config_path, &mut config),
        Commands::Scan { file, send } => scan(&file, config, send).await,
        Commands::TestAlert { name } => {
            let sends = Notifier::discord()?.notify(&name, &config.notification).await?;
            println!("✅ Test alert delivered ({}x)", sends);
            Ok(())
        }
        Commands::Run => {
            if config.is_placeholder_webhook() && atty::is(atty::Stream::Stdin) {
                println!("✨ Placeholder webhook detected. Entering setup...");
                init::run_terminal_setup(&config_path, &mut config)?;
            }
            run(config, args.log_dir).await
        }
    }
}

async fn run(config: Config, log_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let monitor = Monitor::new(config, Notifier::discord()?).with_log_dir(log_dir);
    info!("📂 Log directory: {}", monitor.log_dir().await.display());
    monitor.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    monitor.stop().await;
    Ok(())
}

async fn scan(file: &Path, config: Config, send: bool) -> anyhow::Result<()> {
    if send {
        let monitor = Monitor::new(config, Notifier::discord()?);
        let outcome = monitor.process_event(file).await?;
        println!("{:?}", outcome);
        return Ok(());
    }

    let lines = read_log_lines(file).await?;
    let Some(trigger) = find_latest_trigger(&lines, &config.ignore) else {
        println!("No decloak line found in {}", file.display());
        return Ok(());
    };
    println!("Trigger:   {}", trigger.line.trim());
    match trigger.dedup_key(config.watch.untimestamped) {
        Some(key) => println!("Dedup key: {}", key),
        None => println!("Dedup key: (none, always fires)"),
    }
    match resolve_listener(&lines) {
        Some(listener) => println!("Message:   {}", compose_message(&listener, &config.notification)),
        None => error!("No Listener line in {}; an alert would be dropped", file.display()),
    }
    Ok(())
}
