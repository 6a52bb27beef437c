use crate::domain::ports::UrlShortener;
use crate::utils::error::{BuchaError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// TinyURL-style shortener: `GET {endpoint}?url=<long>` answers with the short URL as plain text.
pub struct TinyUrlShortener {
    endpoint: String,
    http: reqwest::Client,
}

impl TinyUrlShortener {
    pub fn new(endpoint: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { endpoint, http })
    }
}

#[async_trait]
impl UrlShortener for TinyUrlShortener {
    async fn shorten(&self, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BuchaError::ShortenerError {
                message: format!("{} returned {}: {}", self.endpoint, status, body.trim()),
            });
        }

        let short = body.trim();
        if !short.starts_with("http") {
            return Err(BuchaError::ShortenerError {
                message: format!("Unexpected shortener response: {}", short),
            });
        }

        tracing::debug!("Shortened image URL to {}", short);
        Ok(short.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const IMAGE: &str = "https://scontent.flis1-1.fna.fbcdn.net/v/t39/menu.jpg?stp=dst-jpg&_nc_ht=x";

    #[tokio::test]
    async fn test_shorten_returns_trimmed_body() {
        let server = MockServer::start();
        let api = server.mock(|when, then| {
            when.method(GET).path("/api-create.php").query_param("url", IMAGE);
            then.status(200).body("https://tinyurl.com/2p8xyz\n");
        });

        let shortener = TinyUrlShortener::new(server.url("/api-create.php")).unwrap();
        let short = shortener.shorten(IMAGE).await.unwrap();

        api.assert();
        assert_eq!(short, "https://tinyurl.com/2p8xyz");
    }

    #[tokio::test]
    async fn test_shorten_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api-create.php");
            then.status(400).body("Error");
        });

        let shortener = TinyUrlShortener::new(server.url("/api-create.php")).unwrap();
        let err = shortener.shorten(IMAGE).await.unwrap_err();

        assert!(matches!(err, BuchaError::ShortenerError { .. }));
    }
}
