use anyhow::{Context, Result, ensure};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

/// Where YouTube playlist exports are published, one `<playlistId>.json` per playlist
pub const DEFAULT_PLAYLIST_BASE_URL: &str = "https://storage.googleapis.com/web-dev-uploads/youtube";

/// Provides the raw episode list of a playlist
///
/// Elements are returned as-is; turning them into [`crate::episode::Episode`]s is up to the caller.
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    /// # Errors
    /// Errors when the playlist can't be retrieved or isn't a JSON array
    async fn fetch_episodes(&self, playlist_id: &str) -> Result<Vec<Value>>;
}

/// Fetches playlist exports over HTTP
#[derive(Debug, Clone)]
pub struct HttpEpisodeSource {
    client: Client,
    base_url: String,
}

impl HttpEpisodeSource {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    #[must_use]
    pub fn playlist_url(&self, playlist_id: &str) -> String {
        format!("{}/{playlist_id}.json", self.base_url)
    }
}

#[async_trait]
impl EpisodeSource for HttpEpisodeSource {
    #[instrument(skip(self))]
    async fn fetch_episodes(&self, playlist_id: &str) -> Result<Vec<Value>> {
        let url = self.playlist_url(playlist_id);
        debug!("Requesting {url}");

        let req = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Fetching playlist {url}"))?;

        ensure!(
            req.status().is_success(),
            "Playlist {url} responded with status {}",
            req.status()
        );

        req.json::<Vec<Value>>()
            .await
            .with_context(|| format!("Parsing playlist {url}"))
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::TcpListener,
    };

    use super::*;

    /// Answers a single HTTP request with `status` and `body`, returning the server's base URL
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _addr) = socket.accept().await.unwrap();
            let mut reader = BufReader::new(&mut stream);
            let mut line = String::new();
            loop {
                line.clear();
                reader.read_line(&mut line).await.unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            stream
                .write_all(
                    format!(
                        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    )
                    .as_bytes(),
                )
                .await
                .ok();
        });

        format!("http://{addr}/youtube/")
    }

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let source = HttpEpisodeSource::new(Client::new(), "https://example.com/youtube//");
        assert_eq!(
            source.playlist_url("PL123"),
            "https://example.com/youtube/PL123.json"
        );
    }

    #[tokio::test]
    async fn fetches_playlist_array() {
        let base = serve_once(
            "200 OK",
            r#"[{"date":"2021-01-01","data":{"date":"2021-01-01","videoId":"v1","thumbnail":"t1"}}]"#,
        )
        .await;

        let source = HttpEpisodeSource::new(Client::new(), base);
        let episodes = source.fetch_episodes("PL123").await.unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0]["data"]["videoId"], "v1");
    }

    #[tokio::test]
    async fn fails_on_error_status() {
        let base = serve_once("404 Not Found", "{}").await;
        let source = HttpEpisodeSource::new(Client::new(), base);
        assert!(source.fetch_episodes("PL123").await.is_err());
    }

    #[tokio::test]
    async fn fails_on_non_array_body() {
        let base = serve_once("200 OK", r#"{"error":"nope"}"#).await;
        let source = HttpEpisodeSource::new(Client::new(), base);
        assert!(source.fetch_episodes("PL123").await.is_err());
    }
}
