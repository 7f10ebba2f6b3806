//! Clipper CLI
//!
//! Operator tooling for the scraping farm: manifest validation,
//! fingerprint inspection, and live site probing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clipper::{
    error::{AppError, Result},
    models::Config,
    pipeline::{AnomalyGuard, fingerprint},
    services::CandidateExtractor,
    utils::{self, http},
};

/// clipper - Coupon scraping pipeline tools
#[derive(Parser, Debug)]
#[command(name = "clipper", version, about = "Coupon scraping pipeline tools")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "clipper.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and every site manifest
    Validate,

    /// Compute the dedup fingerprint for one offer
    Fingerprint {
        /// Merchant name
        merchant: String,

        /// Site-native ID or coupon title
        id_or_title: String,

        /// Source page URL
        source_url: String,
    },

    /// Fetch one site's index page and report what would be extracted
    Probe {
        /// Site ID from the configuration
        site_id: String,
    },

    /// Show a summary of the configured sites
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Validate => {
            log::info!("Validating configuration from {}", cli.config.display());

            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} sites)", config.sites.len());

            // Selector strings only fail when compiled, so check every
            // manifest here rather than mid-crawl.
            for site in &config.sites {
                if utils::get_domain(&site.index_url).is_none() {
                    let e = AppError::config(format!(
                        "Site '{}' index_url has no valid domain",
                        site.id
                    ));
                    log::error!("{}", e);
                    return Err(e);
                }
                if let Err(e) = CandidateExtractor::new(site) {
                    log::error!("Site '{}' has a broken selector: {}", site.id, e);
                    return Err(e);
                }
                log::info!("✓ Site '{}' selectors OK", site.id);
            }

            log::info!("All validations passed!");
        }

        Command::Fingerprint {
            merchant,
            id_or_title,
            source_url,
        } => {
            println!("{}", fingerprint(&merchant, &id_or_title, &source_url));
        }

        Command::Probe { site_id } => {
            let config = Config::load(&cli.config)?;
            let site = config
                .sites
                .iter()
                .find(|s| s.id == site_id)
                .ok_or_else(|| AppError::config(format!("Unknown site '{site_id}'")))?;

            let extractor = CandidateExtractor::new(site)?;
            let client = http::create_async_client(&config.http)?;
            let page_url = url::Url::parse(&site.index_url)?;

            log::info!("Fetching {}", site.index_url);
            let document = http::fetch_page(&client, &site.index_url).await?;

            let class = extractor.classify(&document);
            let candidates = extractor.extract(&document, &page_url);

            let guard = AnomalyGuard::with_config(config.anomaly.clone());
            match guard.validate(site.index_url.as_str(), &class, candidates.len(), site.baseline_count) {
                Ok(()) => log::info!("Anomaly check passed"),
                Err(e) => log::warn!("{}", e),
            }

            let direct = candidates.iter().filter(|c| c.code.is_some()).count();
            let reveal = candidates.iter().filter(|c| c.needs_reveal()).count();

            log::info!("Page kind: {:?}", class.kind);
            log::info!(
                "{} candidates ({} direct codes, {} need a reveal fetch)",
                candidates.len(),
                direct,
                reveal
            );
            for candidate in candidates.iter().take(5) {
                log::info!(
                    "  [{}] {}",
                    candidate.id_in_site.as_deref().unwrap_or("-"),
                    candidate.title.as_deref().unwrap_or("(no title)")
                );
            }
        }

        Command::Info => {
            let config = Config::load_or_default(&cli.config);
            log::info!("API base URL: {}", config.api.base_url);
            log::info!("Configured sites: {}", config.sites.len());
            for site in &config.sites {
                let mode = if site.selectors.reveal_link_selector.is_some() {
                    "two-phase"
                } else {
                    "direct"
                };
                log::info!("  {} ({}) - {}", site.id, mode, site.index_url);
            }
        }
    }

    Ok(())
}
