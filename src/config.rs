use std::{fmt, str::FromStr, sync::LazyLock, time::Duration};

use regex::Regex;
use thiserror::Error;

/// Number of episodes kept per show in restricted presentation mode
pub const RESTRICTED_EPISODE_COUNT: usize = 6;

static CACHE_DURATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*([smhdwy])$").expect("valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid cache duration `{0}`, expected e.g. `30m`, `6h`, `1d` or `*`")]
    CacheDuration(String),
    #[error("invalid episode limit `{0}`, expected a number or `all`")]
    EpisodeLimit(String),
}

/// How long a cached playlist stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDuration {
    /// Never refetch once cached (`*`)
    Forever,
    Fixed(Duration),
}

impl CacheDuration {
    /// Whether an entry of the given age is still usable
    #[must_use]
    pub fn is_fresh(self, age: Duration) -> bool {
        match self {
            Self::Forever => true,
            Self::Fixed(ttl) => age < ttl,
        }
    }
}

impl FromStr for CacheDuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" {
            return Ok(Self::Forever);
        }

        let err = || ConfigError::CacheDuration(s.to_string());
        let caps = CACHE_DURATION_REGEX.captures(s).ok_or_else(err)?;
        let amount = caps[1].parse::<u64>().map_err(|_| err())?;
        let unit = match &caps[2] {
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            "w" => 7 * 24 * 60 * 60,
            // 365 days, leap years aren't worth the trouble here
            "y" => 365 * 24 * 60 * 60,
            _ => return Err(err()),
        };

        let secs = amount.checked_mul(unit).ok_or_else(err)?;
        Ok(Self::Fixed(Duration::from_secs(secs)))
    }
}

impl fmt::Display for CacheDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forever => write!(f, "*"),
            Self::Fixed(d) => write!(f, "{}s", d.as_secs()),
        }
    }
}

/// How many episodes of each show make it into the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeLimit {
    #[default]
    All,
    /// Keep only the last `n` elements of the playlist
    Last(usize),
}

impl EpisodeLimit {
    /// The limit used for restricted presentation builds
    #[must_use]
    pub const fn restricted() -> Self {
        Self::Last(RESTRICTED_EPISODE_COUNT)
    }

    /// Drops everything but the tail the limit allows, keeping the original order
    pub fn apply<T>(self, elements: &mut Vec<T>) {
        if let Self::Last(n) = self {
            let excess = elements.len().saturating_sub(n);
            elements.drain(..excess);
        }
    }
}

impl FromStr for EpisodeLimit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<usize>()
            .map(Self::Last)
            .map_err(|_| ConfigError::EpisodeLimit(s.to_string()))
    }
}

impl fmt::Display for EpisodeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Last(n) => write!(f, "{n}"),
        }
    }
}
