use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt};

use repo_catalog::formatter::TimezoneOffset;
use repo_catalog::tools::CatalogToolsConfig;

/// Parse timezone if provided, otherwise use local timezone
fn parse_timezone_or_default(timezone: Option<String>) -> Option<String> {
    timezone
        .and_then(|tz| TimezoneOffset::parse(&tz).map(|_| tz))
        .or_else(|| Some(TimezoneOffset::from_local().to_string()))
}

/// Token from the flag, then REPO_CATALOG_GITHUB_TOKEN, then GITHUB_TOKEN
fn resolve_github_token(github_token: Option<String>) -> Option<String> {
    github_token
        .or_else(|| std::env::var("REPO_CATALOG_GITHUB_TOKEN").ok())
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
}

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Repository Catalog MCP Server - curated GitHub repository catalog over the Model Context Protocol"
)]
#[command(
    long_about = "Repository Catalog MCP Server exposes a curated catalog of popular GitHub repositories through the Model Context Protocol. Language runtimes, frameworks, tutorials, curated lists and unmaintained projects are filtered out of the GitHub search results, pages are sliced from the filtered stream, and totals are estimated from the observed keep-ratio. Public bookmark activity and the language filter list are served from the local data directory. Supports both stdio and HTTP/SSE interfaces."
)]
#[command(propagate_version = true)]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ServerOptions {
    /// Enable debug logging for troubleshooting and development
    #[arg(short, long)]
    debug: bool,

    /// GitHub personal access token (overrides REPO_CATALOG_GITHUB_TOKEN and GITHUB_TOKEN)
    #[arg(short = 't', long)]
    github_token: Option<String>,

    /// Timezone for datetime formatting in output (e.g., "JST", "+09:00", "UTC")
    #[arg(short = 'z', long)]
    timezone: Option<String>,

    /// Directory holding languages.toml and bookmarks.toml (default: platform data directory)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// TOML file replacing the built-in exclusion rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Only catalog repositories with more stars than this (default: 1000)
    #[arg(long)]
    min_stars: Option<u32>,

    /// Request timeout in seconds for GitHub API calls (default: 10)
    #[arg(long)]
    request_timeout: Option<u64>,
}

impl ServerOptions {
    fn into_config(self) -> CatalogToolsConfig {
        CatalogToolsConfig {
            github_token: resolve_github_token(self.github_token),
            timezone: parse_timezone_or_default(self.timezone),
            data_dir: self.data_dir,
            rules_path: self.rules,
            min_stars: self.min_stars,
            request_timeout: self.request_timeout.map(Duration::from_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in stdin/stdout mode for MCP client integration like Claude Desktop
    Stdio {
        #[command(flatten)]
        options: ServerOptions,
    },
    /// Run the server with HTTP/SSE interface for web-based access and testing
    Http {
        /// Address to bind the HTTP server to
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        address: String,

        #[command(flatten)]
        options: ServerOptions,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider early to prevent "no process-level CryptoProvider available" panics
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();

    match cli.command {
        Commands::Stdio { options } => {
            repo_catalog::transport::stdio::run_stdio_server(options.into_config()).await
        }
        Commands::Http { address, options } => {
            let debug = options.debug;
            run_http_server(address, debug, options.into_config()).await
        }
    }
}

async fn run_http_server(address: String, debug: bool, config: CatalogToolsConfig) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},{}", level, env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();

    let addr: SocketAddr = address.parse()?;

    tracing::info!("Access the Repository Catalog MCP server at http://{}/sse", addr);

    if config.github_token.is_some() {
        tracing::info!("Using GitHub token");
    } else {
        tracing::warn!("No GitHub token configured, search rate limits are low");
    }

    let app = repo_catalog::transport::sse_server::SseServerApp::new(addr, config);
    app.serve().await?;

    Ok(())
}
