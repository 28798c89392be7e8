use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::EpisodeLimit,
    episode::Episode,
    registry::{Registry, ShowMetadata},
    source::EpisodeSource,
};

/// Display data of a show page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowSummary {
    pub alt: String,
    pub title: String,
    pub subhead: String,
    /// Thumbnail of the newest episode
    pub hero: String,
    /// Date of the oldest kept episode
    pub date: DateTime<Utc>,
    /// Date of the newest kept episode, only when it differs from `date`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// A show with its episodes, ready to be rendered by the site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowRecord {
    #[serde(flatten)]
    pub metadata: ShowMetadata,
    pub key: String,
    pub href: String,
    pub url: String,
    pub elements: Vec<Episode>,
    pub data: ShowSummary,
}

pub type ShowCollection = BTreeMap<String, ShowRecord>;

/// Builds the show collection out of `registry`, fetching every show's playlist from `source`
///
/// Playlists are expected newest first. A show whose playlist can't be fetched or is empty
/// is left out of the collection.
///
/// # Errors
/// Errors when a fetched playlist element is malformed; fetch failures are only logged
#[instrument(skip_all, fields(shows = registry.len(), limit = %limit))]
pub async fn aggregate(
    registry: &Registry,
    source: &dyn EpisodeSource,
    limit: EpisodeLimit,
) -> Result<ShowCollection> {
    let mut shows = ShowCollection::new();

    for (key, metadata) in registry {
        let href = format!("/shows/{key}/");

        let raw = match source.fetch_episodes(&metadata.playlist_id).await {
            Ok(r) => r,
            Err(e) => {
                warn!("Unable to fetch episodes of show `{key}`: {e:#}");
                Vec::new()
            }
        };

        let elements = raw
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                Episode::from_raw(v, &href)
                    .with_context(|| format!("Show `{key}` has a malformed episode at index {i}"))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(show) = build_show(key, metadata, href, elements, limit) {
            shows.insert(key.clone(), show);
        } else {
            debug!("Skipping show `{key}`, it has no episodes");
        }
    }

    info!("Collected {} of {} shows", shows.len(), registry.len());
    Ok(shows)
}

/// Derives a show's record from its playlist, `None` when nothing is left to show
fn build_show(
    key: &str,
    metadata: &ShowMetadata,
    href: String,
    mut elements: Vec<Episode>,
    limit: EpisodeLimit,
) -> Option<ShowRecord> {
    let (first, last) = (elements.first()?, elements.last()?);
    if first.data.date < last.data.date {
        debug!("Playlist of show `{key}` doesn't look newest first");
    }

    let mut data = ShowSummary {
        alt: metadata.title.clone(),
        title: metadata.title.clone(),
        subhead: metadata.description.clone(),
        hero: first.data.thumbnail.clone(),
        date: last.date,
        updated: None,
    };

    // Truncating first means a restricted build reports a later creation date
    limit.apply(&mut elements);

    let (first, last) = (elements.first()?, elements.last()?);
    data.date = last.data.date;
    data.updated = Some(first.data.date).filter(|updated| *updated != data.date);

    Some(ShowRecord {
        metadata: metadata.clone(),
        key: key.to_string(),
        url: href.clone(),
        href,
        elements,
        data,
    })
}
