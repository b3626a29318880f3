//! Resume redaction server
//!
//! Accepts a base64 PDF together with text regions found on its first page,
//! blacks those regions out and stamps the company logo on every page.
//!
//! - `POST /api/v1/candidate-resume-pdf` returns the processed PDF as an
//!   attachment
//! - `GET /health` liveness check

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use redact_core::{PageSelection, WatermarkConfig};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod handlers;
mod models;
mod server;

use server::{Server, ServerConfig, DEFAULT_ROUTE};

/// Command-line arguments for the redaction server
#[derive(Parser, Debug)]
#[command(name = "redact-api")]
#[command(about = "Redacts and watermarks candidate resume PDFs")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "REDACT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// PNG image stamped on every page
    #[arg(long, env = "WATERMARK_IMAGE", default_value = redact_core::DEFAULT_WATERMARK_IMAGE)]
    watermark_image: PathBuf,

    /// Watermark opacity (0..1)
    #[arg(long, default_value = "0.1")]
    watermark_opacity: f64,

    /// Watermark scale relative to the page (0..1]
    #[arg(long, default_value = "0.6")]
    watermark_scale: f64,

    /// Pages to watermark, e.g. "1-", "1-3, 5", "odd", "!2"
    #[arg(long, default_value = "1-", value_parser = PageSelection::parse)]
    watermark_pages: PageSelection,

    /// Directory for intermediate files
    #[arg(long, env = "REDACT_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Maximum request body size in bytes (unlimited by default)
    #[arg(long)]
    max_body_bytes: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Build the server configuration, rejecting watermark settings the
    /// engine would refuse on every request.
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let config = ServerConfig {
            host: self.host,
            port: self.port,
            route: DEFAULT_ROUTE.to_string(),
            watermark: WatermarkConfig {
                image_path: self.watermark_image,
                scale: self.watermark_scale,
                opacity: self.watermark_opacity,
                pages: self.watermark_pages,
                ..WatermarkConfig::default()
            },
            temp_dir: self.temp_dir,
            max_body_bytes: self.max_body_bytes,
        };

        config.watermark.validate().with_context(|| {
            format!(
                "invalid watermark settings ({})",
                config.watermark.description()
            )
        })?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.into_config()?;
    info!(
        "Starting redact-api on {} (watermark: {})",
        config.addr(),
        config.watermark.description()
    );

    Server::new(config).run().await
}
