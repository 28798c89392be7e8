use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single video of a show's playlist, as exported upstream
///
/// Fields the site doesn't use are kept in `extra` and written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: DateTime<Utc>,
    pub data: EpisodeData,
    /// Site path of the episode page, filled in by the aggregator
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeData {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: DateTime<Utc>,
    pub video_id: String,
    pub thumbnail: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Episode {
    /// Turns a raw playlist element into an [`Episode`] living under `show_href`
    ///
    /// # Errors
    /// Errors when the element is missing a required field or carries an unparseable date
    pub fn from_raw(raw: Value, show_href: &str) -> Result<Self> {
        let mut episode: Self =
            serde_json::from_value(raw).context("Parsing playlist element")?;
        episode.url = format!("{show_href}{}/", episode.data.video_id);
        Ok(episode)
    }
}

/// Parses either a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (taken as midnight UTC)
///
/// # Errors
/// Errors when the input matches neither form
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(input) {
        return Ok(d.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("`{input}` is not a valid date"))?;
    Ok(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
