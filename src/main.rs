use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod engine;
mod engines;
mod error;
mod preprocessing;
mod server;
mod ui;

use engines::EngineKind;

#[derive(Parser, Debug)]
#[command(name = "photo-ocr-server")]
#[command(about = "Extract text from uploaded or camera-captured images")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "9292")]
    pub port: u16,

    /// Language hints passed to the engine, joined with '+' (e.g., "jpn+eng")
    #[arg(long, env = "OCR_LANGUAGES", default_value = "jpn+eng")]
    pub languages: String,

    /// Maximum upload size in bytes (default: 20MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "20971520")]
    pub max_file_size: usize,

    /// OCR engine to use
    #[arg(long, env = "OCR_ENGINE", value_enum, default_value_t = EngineKind::Tesseract)]
    pub engine: EngineKind,

    /// Path to the tesseract binary (probes common install locations and PATH if not set)
    #[arg(long, env = "TESSERACT_CMD")]
    pub tesseract_path: Option<String>,

    /// Whether "high quality mode" (no downscaling) is on when a request doesn't say
    #[arg(long, env = "OCR_HIGH_QUALITY", default_value_t = true, action = clap::ArgAction::Set)]
    pub default_high_quality: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::try_from(args)?;

    tracing::info!("Starting photo-ocr-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Binding to {}:{} (engine: {}, languages: {})",
        config.host,
        config.port,
        config.engine,
        config.languages
    );

    server::run(config).await
}
