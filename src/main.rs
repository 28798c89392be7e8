#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use show_shelf::{
    CacheDuration, EpisodeLimit, EpisodeSource, aggregate,
    cache::CachedEpisodeSource,
    load_registry,
    source::{DEFAULT_PLAYLIST_BASE_URL, HttpEpisodeSource},
    util::init_http_client,
};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Builds the site's show collection out of YouTube playlist exports
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Show registry (YAML mapping of show key to title, description and playlistId)
    registry: PathBuf,

    /// Where to write the collection JSON (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base URL serving `<playlistId>.json` playlist exports
    #[arg(long, env = "SHOWS_BASE_URL", default_value = DEFAULT_PLAYLIST_BASE_URL)]
    base_url: String,

    /// Directory holding cached playlists
    #[arg(long, default_value = ".cache")]
    cache_dir: PathBuf,

    /// How long a cached playlist stays fresh, e.g. `30m`, `6h`, `1d` or `*` for forever
    #[arg(long, default_value = "6h")]
    cache_duration: CacheDuration,

    /// Always download playlists, without reading or writing the cache
    #[arg(long)]
    no_cache: bool,

    /// Episodes kept per show, a number or `all` [default: all, 6 when restricted]
    #[arg(long)]
    max_episodes: Option<EpisodeLimit>,

    /// Restricted presentation build (e.g. visual review snapshots), keeps the last 6 playlist entries
    #[arg(long)]
    restricted: bool,

    /// Visual review builds export `PERCY`; any non-empty value means a restricted build
    #[arg(long, env = "PERCY", hide = true)]
    percy: Option<String>,
}

impl Args {
    fn is_restricted(&self) -> bool {
        self.restricted || self.percy.as_deref().is_some_and(|v| !v.is_empty())
    }

    fn episode_limit(&self) -> EpisodeLimit {
        self.max_episodes.unwrap_or(if self.is_restricted() {
            EpisodeLimit::restricted()
        } else {
            EpisodeLimit::All
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let limit = args.episode_limit();
    if args.is_restricted() {
        warn!("Restricted build, keeping {limit} episodes per show");
    }

    let registry = load_registry(&args.registry).await?;

    let http = HttpEpisodeSource::new(init_http_client()?, args.base_url.as_str());
    let source: Box<dyn EpisodeSource> = if args.no_cache {
        Box::new(http)
    } else {
        info!(
            "Caching playlists in {:?} for {}",
            args.cache_dir, args.cache_duration
        );
        Box::new(CachedEpisodeSource::new(
            http,
            &args.cache_dir,
            args.cache_duration,
        ))
    };

    let shows = aggregate(&registry, source.as_ref(), limit).await?;
    let json = serde_json::to_string_pretty(&shows).context("Serializing show collection")?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Creating {}", parent.display()))?;
            }
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Writing {}", path.display()))?;
            info!("Wrote {} shows to {path:?}", shows.len());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(json.as_bytes())
                .await
                .context("Writing show collection to stdout")?;
            stdout
                .write_all(b"\n")
                .await
                .context("Writing show collection to stdout")?;
            stdout
                .flush()
                .await
                .context("Writing show collection to stdout")?;
        }
    }

    Ok(())
}
