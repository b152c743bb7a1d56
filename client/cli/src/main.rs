mod output;
mod proxy;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use studylens_api::{ApiClient, NoAuth, StaticToken, TokenProvider};
use studylens_config::{config_dir, config_file_path, load_and_prepare, write_config, LensConfig};
use studylens_processing::ProcessingController;

#[derive(Parser)]
#[command(name = "studylens")]
#[command(about = "StudyLens: snap a problem, get the explanation")]
#[command(version)]
struct Cli {
    /// Override the configured backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an image through the OCR + LLM pipeline
    Process {
        /// Path to the image file
        image: PathBuf,
        /// Optional question about the problem
        #[arg(short, long)]
        question: Option<String>,
        /// Subject hint (math, physics, ...)
        #[arg(short, long)]
        subject: Option<String>,
    },
    /// Fetch a stored processing result
    Result {
        request_id: String,
    },
    /// List recent processing requests
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show the signed-in user's profile
    Profile,
    /// Show current month usage against the plan limit
    Usage,
    /// List subscription plans
    Plans,
    /// Check backend health
    Health,
    /// Run the local proxy for browser clients
    Serve {
        /// Port to bind the proxy to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Write a starter config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments before touching the config file so --help and
    // --version work even when the config is missing or malformed.
    let cli = Cli::parse();

    let config = load_and_prepare(&config_file_path(&config_dir())).await?;
    studylens_logging::init_logger(&config.logging.level, config.logging.dir.as_deref());

    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.api.base_url.clone());
    let tokens: Arc<dyn TokenProvider> = match &config.api.auth_token {
        Some(token) => Arc::new(StaticToken::new(token.clone())),
        None => Arc::new(NoAuth),
    };
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;
    let client = ApiClient::new(tokens)
        .with_base_url(base_url)
        .with_client(http);

    match cli.command {
        Commands::Process {
            image,
            question,
            subject,
        } => {
            let controller = ProcessingController::new(Arc::new(client))
                .with_max_image_bytes(config.api.max_image_bytes);
            let state = controller.process_image(&image, question, subject).await;
            output::render_processing_state(&state);
            if state.error.is_some() {
                std::process::exit(1);
            }
        }
        Commands::Result { request_id } => {
            let envelope = client.processing_result(&request_id).await?;
            output::render_envelope(&envelope);
        }
        Commands::History { limit } => {
            let page = client.history(limit).await?;
            output::render_history(&page);
        }
        Commands::Profile => print_json(&client.user_profile().await?)?,
        Commands::Usage => print_json(&client.user_usage().await?)?,
        Commands::Plans => print_json(&client.plans().await?)?,
        Commands::Health => print_json(&client.health().await?)?,
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.proxy.port);
            proxy::serve(
                client,
                &config.proxy.bind_address,
                port,
                config.api.max_image_bytes,
            )
            .await?;
        }
        Commands::Init => {
            let path = config_file_path(&config_dir());
            if path.exists() {
                println!("Config already exists at {}", path.display());
            } else {
                write_config(&LensConfig::default(), &path).await?;
                println!("Wrote starter config to {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
