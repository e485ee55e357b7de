mod api_client;
mod config;
mod error;
mod icons;
mod models;
mod output;
mod render;
#[cfg(test)]
mod test_server;

use crate::{
    api_client::{BadgeSource, LeetCodeClient, LeetCodeCnClient},
    config::{Overrides, Settings, Site},
    error::AppError,
    icons::{HttpIconFetcher, IconFetcher},
    render::BadgeRenderer,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Render the badges a LeetCode user has earned into one SVG image.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Config file with a [LEETCODE] section (defaults to ./config.ini)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Account to fetch, overriding the config file
    #[arg(short, long)]
    username: Option<String>,

    /// leetcode.com or leetcode.cn
    #[arg(short, long)]
    site: Option<String>,

    /// Embed the animated medal icons instead of the static ones
    #[arg(short, long, overrides_with = "no_animated")]
    animated: bool,

    /// Embed the static icons even if the config file asks for animated ones
    #[arg(long, overrides_with = "animated")]
    no_animated: bool,

    /// Directory the SVG is written to
    #[arg(short, long, default_value = output::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let animated = if self.animated {
            Some(true)
        } else if self.no_animated {
            Some(false)
        } else {
            None
        };
        Overrides {
            username: self.username.clone(),
            site: self.site.clone(),
            animated,
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = config::load(cli.config.as_deref(), cli.overrides())?;

    let client = reqwest::Client::new();
    let base_url = settings.site.base_url();
    let source: Box<dyn BadgeSource> = match settings.site {
        Site::LeetCode => Box::new(LeetCodeClient::new(client.clone(), base_url)),
        Site::LeetCodeCn => Box::new(LeetCodeCnClient::new(client.clone(), base_url)),
    };
    let icons = HttpIconFetcher::new(client);

    generate(source.as_ref(), &icons, &settings, &cli.output_dir).await?;
    println!("Combined SVG with all badges has been created.");
    Ok(())
}

/// Fetch, render and write once. Nothing is written when no badges come back.
async fn generate(
    source: &dyn BadgeSource,
    icons: &dyn IconFetcher,
    settings: &Settings,
    output_dir: &Path,
) -> Result<PathBuf, AppError> {
    println!(
        "Fetching badges for user: {} on {}",
        settings.username, settings.site_name
    );

    let badges = api_client::fetch_or_report(source, &settings.username).await;
    if badges.is_empty() {
        return Err(AppError::NoBadges);
    }

    println!("Found {} badges. Creating combined SVG...", badges.len());
    let svg = BadgeRenderer::new(icons, source.base_url(), settings.animated)
        .render(&badges)
        .await;

    let file_name = output::output_file_name(&settings.username, &settings.site_name);
    let path = output::save_svg(output_dir, &file_name, &svg)?;
    println!("Saved SVG to {}", path.display());
    Ok(path)
}
