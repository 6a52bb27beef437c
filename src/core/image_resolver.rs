use crate::config::settings::ExtractConfig;
use crate::domain::model::{ExtractedContent, Placeholder};
use crate::domain::ports::{Browser, Element, Locator, UrlShortener};
use crate::utils::error::BuchaError;
use std::time::Duration;

/// Turns the first content-hosted image of a post into a short, shareable link.
pub struct ImageResolver {
    image: Locator,
    timeout: Duration,
    poll_interval: Duration,
}

impl ImageResolver {
    pub fn new(config: &ExtractConfig, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            image: Locator::xpath(format!(
                ".//img[contains(@src, {})]",
                xpath_literal(&config.image_host_pattern)
            )),
            timeout,
            poll_interval,
        }
    }

    pub async fn resolve<B, U>(&self, browser: &B, shortener: &U, post: &Element) -> ExtractedContent
    where
        B: Browser + ?Sized,
        U: UrlShortener + ?Sized,
    {
        // images are lazy-loaded, give them the same budget as any other lookup
        let src = match browser
            .wait_until(&self.image, Some(post), self.timeout, self.poll_interval)
            .await
        {
            Ok(img) => browser.attribute(&img, "src").await.ok().flatten(),
            Err(BuchaError::Timeout { .. }) => None,
            Err(e) => {
                tracing::warn!("Image lookup failed: {}", e);
                None
            }
        };

        let Some(src) = src.filter(|s| !s.trim().is_empty()) else {
            tracing::warn!("No image matching {} in the last post", self.image);
            return ExtractedContent::Failed(Placeholder::NoImage);
        };

        match shortener.shorten(&src).await {
            Ok(short) => ExtractedContent::Image(short),
            Err(e) => {
                tracing::warn!("Could not shorten image URL, using it as-is: {}", e);
                ExtractedContent::Image(src)
            }
        }
    }
}

/// Quotes `value` as an XPath 1.0 string literal. XPath has no escapes, so a
/// value holding both quote kinds is built with `concat()`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
