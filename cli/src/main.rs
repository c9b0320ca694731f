//! Command-line driver for the Coolapk client.
//!
//! Without a subcommand it runs the demo flow: health check, token fetch,
//! first index page, and a one-line summary.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use coolapk_core::config::{API_BASE_URL, DEFAULT_TOKEN_API_URL};
use coolapk_core::{ApiResponse, ApiSummary, ClientConfig, CoolapkClient, HealthStatus};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "coolapk", version, about = "Query the Coolapk API through a token service")]
struct Cli {
    /// Base URL of the token service.
    #[arg(long, env = "COOLAPK_TOKEN_URL", default_value = DEFAULT_TOKEN_API_URL)]
    token_url: String,

    /// Device id sent to the token service and the API.
    #[arg(long, env = "COOLAPK_DEVICE_ID")]
    device_id: Option<String>,

    /// Origin of the Coolapk API.
    #[arg(long, default_value = API_BASE_URL)]
    api_url: String,

    /// Log level; RUST_LOG takes precedence when set.
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Health check, token, first index page, summary.
    Demo,
    /// Probe the token service.
    Health,
    /// Print a fresh token.
    Token {
        /// Device id to request a token for (defaults to the client's).
        #[arg(long)]
        device_id: Option<String>,
    },
    /// Fetch a page of the main feed.
    Index {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Fetch a feed's detail.
    Feed { id: u64 },
    /// Search everything for a keyword.
    Search {
        keyword: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

/// Filter directive used when RUST_LOG is unset.
fn log_directive(level: Option<LogLevel>) -> &'static str {
    level.map_or("info", |l| l.as_str())
}

fn init_logging(level: Option<LogLevel>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let mut config = ClientConfig::new(&cli.token_url).with_api_base_url(&cli.api_url);
    if let Some(device_id) = &cli.device_id {
        config = config.with_device_id(device_id);
    }
    tracing::debug!(token_url = config.token_api_url(), api_url = config.api_base_url(), "client configured");
    let client = CoolapkClient::new(config);

    match cli.command.unwrap_or(Command::Demo) {
        Command::Demo => demo(&client),
        Command::Health => {
            let status = client.health().context("health check failed")?;
            println!("{}", describe_health(status));
            if !status.is_healthy() {
                bail!("token service not healthy");
            }
            Ok(())
        }
        Command::Token { device_id } => {
            let token = client.get_token(device_id.as_deref())?;
            println!("{token}");
            Ok(())
        }
        Command::Index { page } => print_json(&client.get_index(page)?),
        Command::Feed { id } => print_json(&client.get_feed(id)?),
        Command::Search { keyword, page } => print_json(&client.search(&keyword, page)?),
    }
}

fn demo(client: &CoolapkClient) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("Coolapk API client");
    println!("{}", "=".repeat(60));

    println!("\n[*] Checking API health...");
    if !client.health_check() {
        println!("[-] API service not available");
        return Ok(());
    }
    println!("[+] API service is healthy");

    println!("\n[*] Getting token...");
    let token = client.get_token(None).context("fetching token")?;
    let preview: String = token.chars().take(50).collect();
    println!("[+] Token: {preview}...");

    println!("\n[*] Fetching index...");
    match client.get_index(1) {
        Ok(body) => match ApiSummary::from_response(&body) {
            ApiSummary::Items(count) => println!("[+] Success! Got {count} items"),
            ApiSummary::Error(message) => println!("[-] Error: {message}"),
        },
        Err(e) => println!("[-] Request failed: {e}"),
    }
    Ok(())
}

fn describe_health(status: HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Unhealthy(code) => format!("unhealthy (HTTP {code})"),
        HealthStatus::Unreachable => "unreachable".to_string(),
    }
}

fn print_json(body: &ApiResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}
