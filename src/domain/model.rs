use serde::{Deserialize, Serialize};
use std::fmt;

/// How a restaurant publishes its daily menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScrapingMode {
    Text,
    Image,
    /// Any value other than `text`/`image`; kept so the row can be reported and skipped.
    Unsupported(String),
}

impl From<String> for ScrapingMode {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "image" => Self::Image,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<ScrapingMode> for String {
    fn from(mode: ScrapingMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for ScrapingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Image => f.write_str("image"),
            Self::Unsupported(raw) => f.write_str(raw),
        }
    }
}

/// One row of the restaurants CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub account_id: String,
    pub alias: String,
    pub scraping_mode: ScrapingMode,
    pub emoji: String,
    /// Price as written in the CSV, validated as a non-negative number.
    pub daily_price: String,
}

impl Restaurant {
    pub fn display_name(&self) -> String {
        format!("{} - {} [{} Eur]", self.emoji, self.alias, self.daily_price)
    }
}

/// Why a restaurant has no real menu in today's report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Last post is too old to hold today's menu.
    Closed,
    /// Post matched, but carried no body before the reactions bar.
    NotYetPosted,
    /// Post text had no reactions-bar boundary.
    NoMatch,
    /// Image mode, but the post has no content-hosted image.
    NoImage,
    /// Timestamp of the last post could not be found or read.
    MissingTimestamp,
    /// Feed or last post could not be located.
    Unreachable(String),
}

/// Outcome of scraping one restaurant, consumed by [`crate::core::normalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    Text(String),
    Image(String),
    Failed(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub display_name: String,
    pub body: Option<String>,
    pub image_reference: Option<String>,
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = self
            .body
            .as_deref()
            .or(self.image_reference.as_deref())
            .unwrap_or_default();
        writeln!(f, "*{}*\n{}", self.display_name, content)
    }
}

/// Today's menus in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    pub header: Option<String>,
    pub menus: Vec<Menu>,
}

impl AggregateReport {
    pub fn render(&self) -> String {
        let menus = self
            .menus
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        match &self.header {
            Some(header) => format!("{}\n{}", header, menus),
            None => menus,
        }
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}
