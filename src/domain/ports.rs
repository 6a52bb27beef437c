use crate::domain::model::{AggregateReport, ExtractedContent, Restaurant};
use crate::utils::error::{BuchaError, Result};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

pub trait Storage: Send + Sync {
    /// Creates or truncates `path` with `data`.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human-readable location of `path` inside this storage, for logs.
    fn describe(&self, path: &str) -> String;
}

/// Element query criteria. The core only ever talks to the page through these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Reads a configured selector: `css=` selects by CSS, anything else
    /// (optionally prefixed `xpath=`) is an XPath expression.
    pub fn parse(selector: &str) -> Self {
        match selector.strip_prefix("css=") {
            Some(css) => Self::Css(css.to_string()),
            None => Self::xpath(selector.strip_prefix("xpath=").unwrap_or(selector)),
        }
    }

    /// W3C WebDriver location strategy name.
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::XPath(_) => "xpath",
            Self::Css(_) => "css selector",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::XPath(v) | Self::Css(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XPath(v) => write!(f, "xpath={}", v),
            Self::Css(v) => write!(f, "css={}", v),
        }
    }
}

/// Opaque handle to an element of the page currently loaded in the browser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    id: String,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// The single shared browser session. Calls must not be interleaved across
/// restaurants: lookups resolve against whatever page was navigated to last.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// `Ok(None)` when nothing matches; `scope` restricts the search to descendants.
    async fn locate(&self, locator: &Locator, scope: Option<&Element>) -> Result<Option<Element>>;

    async fn click(&self, element: &Element) -> Result<()>;

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()>;

    async fn text(&self, element: &Element) -> Result<String>;

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>>;

    async fn close(&self) -> Result<()>;

    /// Polls [`Browser::locate`] until it yields an element or `timeout` elapses.
    async fn wait_until(
        &self,
        locator: &Locator,
        scope: Option<&Element>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Element> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(element) = self.locate(locator, scope).await? {
                return Ok(element);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BuchaError::Timeout {
                    locator: locator.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
}

/// Chat destination for the finished report. Never returns an error.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, payload: &str) -> DeliveryStatus;
}

#[async_trait]
pub trait UrlShortener: Send + Sync {
    async fn shorten(&self, url: &str) -> Result<String>;
}

/// Result of the load phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub artifact: Option<String>,
    pub delivery: DeliveryStatus,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<(Restaurant, ExtractedContent)>>;
    async fn transform(&self, data: Vec<(Restaurant, ExtractedContent)>) -> Result<AggregateReport>;
    async fn load(&self, report: &AggregateReport) -> Result<LoadOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_configured_selectors() {
        assert_eq!(Locator::parse("//*[@id='email']"), Locator::xpath("//*[@id='email']"));
        assert_eq!(Locator::parse("xpath=./div[1]"), Locator::xpath("./div[1]"));

        let css = Locator::parse("css=div[role='feed'] > div");
        assert_eq!(css.strategy(), "css selector");
        assert_eq!(css.value(), "div[role='feed'] > div");
        assert_eq!(css.to_string(), "css=div[role='feed'] > div");
    }
}
