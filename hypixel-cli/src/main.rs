//! CLI tool for querying the Hypixel API.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hypixel_client::{ClientConfig, HypixelClient, Payload, ResponseFormat, DEFAULT_BASE_URL};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Parses a query parameter in format "name=value" into (name, value) tuple.
fn parse_param(param: &str) -> Result<(String, String)> {
    let (name, value) = param
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Parameter must be in format name=value: {param}"))?;
    if name.is_empty() {
        anyhow::bail!("Parameter name must not be empty: {param}");
    }
    Ok((name.to_string(), value.to_string()))
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true)]
struct Cli {
    /// Hypixel API key
    #[arg(long, env = "HYPIXEL_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of the API
    #[arg(long, env = "HYPIXEL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Total request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Attempts per request, including the first
    #[arg(long, default_value = "3")]
    max_attempts: u32,

    /// Log filter, e.g. "info" or "hypixel_client=debug"
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Shows the status of the configured API key
    Key {
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Performs a rate-limited GET against any endpoint
    Get {
        /// Endpoint path, e.g. /v2/player
        endpoint: String,
        /// Query parameter as name=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Response format: raw, text, json, auto or response
        #[arg(short, long, default_value = "auto")]
        format: ResponseFormat,
    },
}

impl From<&Cli> for ClientConfig {
    fn from(cli: &Cli) -> Self {
        ClientConfig {
            base_url: cli.base_url.clone(),
            api_key: cli.api_key.clone(),
            timeout_secs: cli.timeout,
            max_attempts: cli.max_attempts,
        }
    }
}

fn print_payload(payload: Payload) -> Result<()> {
    match payload {
        Payload::Json(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
        Payload::Text(text) => println!("{text}"),
        Payload::Raw(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
        Payload::Response(response) => {
            println!("{} {}", response.status(), response.url());
            for (name, value) in response.headers() {
                println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
            println!();
            println!("{}", response.text());
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let client = HypixelClient::with_config(ClientConfig::from(&cli))
        .context("building Hypixel client failed")?;

    match cli.command {
        Commands::Key { json } => {
            info!("Fetching key info from {}", cli.base_url);
            let key = client.get_key_info().await.context("fetching key info failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&key)?);
            } else {
                println!("Key:            {}", key.key);
                println!("Owner:          {}", key.owner);
                println!("Limit:          {}", key.limit);
                println!("Past minute:    {}", key.queries_in_past_minute);
                println!("Total queries:  {}", key.total_queries);
            }
        },
        Commands::Get { endpoint, params, format } => {
            info!("GET {endpoint} with {} parameter(s) as {format}", params.len());
            let params: Vec<(&str, &str)> =
                params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let payload = client
                .http()
                .request(&endpoint, &params, format)
                .await
                .with_context(|| format!("GET {endpoint} failed"))?;
            print_payload(payload)?;
        },
    }

    client.close();
    Ok(())
}
