/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/init.rs
 * Responsibility: Config discovery, first-run config creation and interactive setup
 */

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use dirs::{config_dir, document_dir, home_dir};
use tracing::info;
use crate::config::Config;

pub const CONFIG_ENV: &str = "CLOAKWATCH_CONFIG";
const CONFIG_FILE: &str = "cloakwatch.yml";
const LEGACY_SETTINGS: &str = "settings.json";

/// Resolve config path
/// Priority: CLI > Environment Variable > File next to the executable > Default
pub fn resolve_config_path(cli_config: Option<PathBuf>) -> PathBuf {
    // 1. CLI takes highest priority
    if let Some(path) = cli_config {
        return path;
    }

    // 2. Environment variable
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            return PathBuf::from(env_path);
        }
    }

    // 3. Portable install: settings sitting beside the binary
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        for name in [LEGACY_SETTINGS, CONFIG_FILE] {
            let candidate = exe_dir.join(name);
            if candidate.is_file() {
                return candidate;
            }
        }
    }

    // 4. Default path
    config_dir()
        .or_else(home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cloakwatch")
        .join(CONFIG_FILE)
}

/// `<Documents>/EVE/logs/Gamelogs`, where the game client writes per-character logs.
pub fn default_log_dir() -> PathBuf {
    document_dir()
        .or_else(|| home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("EVE")
        .join("logs")
        .join("Gamelogs")
}

/// Load the config, writing defaults first when the file does not exist yet.
pub fn initialize_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(path);
    }
    let config = Config::default();
    config.save(path)?;
    info!("📝 Initialized default configuration at {:?}. Please configure your webhook!", path);
    Ok(config)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    writeln!(output, "{}", question)?;
    write!(output, "> ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read answer")?;
    Ok(line.trim().to_string())
}

fn prompt_bool<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str, current: bool) -> Result<bool> {
    let hint = if current { "Y/n" } else { "y/N" };
    let answer = prompt(input, output, &format!("{} ({})", question, hint))?;
    Ok(match answer.to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => current,
    })
}

/// Run interactive setup for the webhook and mentions. Empty answers keep the current value.
pub fn run_interactive_setup<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &mut Config,
) -> Result<()> {
    writeln!(output, "\n✨ Cloakwatch Setup - Wiring decloak alerts to Discord...")?;

    // 1. Webhook
    let url = prompt(input, output, "\n🔗 Discord webhook URL (Enter keeps the current one):")?;
    if !url.is_empty() {
        config.notification.webhook_url = url;
    } else if config.is_placeholder_webhook() {
        anyhow::bail!("Webhook URL cannot be empty.");
    }

    // 2. Mentions
    let mentions = &mut config.notification.mentions;
    mentions.everyone = prompt_bool(input, output, "\n📣 Mention @everyone?", mentions.everyone)?;
    mentions.here = prompt_bool(input, output, "📣 Mention @here?", mentions.here)?;

    let role_id = prompt(input, output, "🎭 Role ID to mention (Enter to skip):")?;
    if !role_id.is_empty() {
        mentions.role = true;
        mentions.role_id = role_id;
    }
    let user_id = prompt(input, output, "👤 User ID to mention (Enter to skip):")?;
    if !user_id.is_empty() {
        mentions.user = true;
        mentions.user_id = user_id;
    }

    writeln!(output, "\n✅ Webhook configured.")?;
    Ok(())
}

/// Setup against the real terminal, then persist.
pub fn run_terminal_setup(config_path: &Path, config: &mut Config) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    run_interactive_setup(&mut input, &mut output, config)?;
    config.save(config_path)?;
    println!("📝 Configuration inscribed to {}", config_path.display());
    Ok(())
}
