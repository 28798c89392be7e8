use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Static description of a show, as written in the registry file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowMetadata {
    pub title: String,
    pub description: String,
    pub playlist_id: String,
}

/// Show key to metadata, iterated in key order
pub type Registry = BTreeMap<String, ShowMetadata>;

/// Parses a YAML show registry
///
/// # Errors
/// Errors when the document isn't a mapping of show keys to `{ title, description, playlistId }`
pub fn parse_registry(yaml: &str) -> Result<Registry> {
    serde_yaml::from_str(yaml).context("Parsing show registry")
}

/// Reads and parses the show registry at `path`
///
/// # Errors
/// Errors when the file can't be read or isn't a valid registry
#[instrument]
pub async fn load_registry(path: &Path) -> Result<Registry> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading show registry {}", path.display()))?;
    let registry =
        parse_registry(&yaml).with_context(|| format!("Loading {}", path.display()))?;

    info!("Loaded {} shows from registry", registry.len());
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = "
designcember:
  title: Designcember
  description: A month of web design.
  playlistId: PLNYkxOF6rcIAEEj8Yn4RiJfa7Un6a7Hx0
ask-the-expert:
  title: Ask the Expert
  description: Answers from the people who built it.
  playlistId: PLNYkxOF6rcIB6Yi6d8zJmRnmTw8-K6-Gn
";

    #[test]
    fn parses_shows_in_key_order() {
        let registry = parse_registry(REGISTRY).unwrap();
        let keys = registry.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(keys, ["ask-the-expert", "designcember"]);
        assert_eq!(
            registry["designcember"].playlist_id,
            "PLNYkxOF6rcIAEEj8Yn4RiJfa7Un6a7Hx0"
        );
    }

    #[test]
    fn rejects_entries_missing_a_playlist() {
        let yaml = "broken:\n  title: Broken\n  description: No playlist\n";
        assert!(parse_registry(yaml).is_err());
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shows.yml");
        tokio::fs::write(&path, REGISTRY).await.unwrap();

        let registry = load_registry(&path).await.unwrap();
        assert_eq!(registry.len(), 2);

        let missing = load_registry(&dir.path().join("nope.yml")).await;
        assert!(missing.is_err());
    }
}
