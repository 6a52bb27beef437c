use crate::utils::error::{BuchaError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bucha.toml";

/// Everything a run needs, resolved once at startup and passed down explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub facebook: FacebookConfig,
    pub browser: BrowserConfig,
    pub selectors: SelectorConfig,
    pub extract: ExtractConfig,
    pub freshness: FreshnessConfig,
    pub report: ReportConfig,
    pub placeholders: PlaceholderConfig,
    pub delivery: DeliveryConfig,
    pub shortener: ShortenerConfig,
    /// Config file these settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookConfig {
    pub base_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.facebook.com/".to_string(),
            email: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub timeout_seconds: u64,
    pub poll_interval_ms: u64,
    /// Pause after each navigation so the feed can render.
    pub page_settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            timeout_seconds: 10,
            poll_interval_ms: 250,
            page_settle_ms: 2000,
        }
    }
}

/// Selectors for the login form and the page feed, XPath unless prefixed
/// with `css=`. XPaths starting with `.` are evaluated relative to the feed
/// or the last post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub cookie_accept: String,
    pub email_input: String,
    pub password_input: String,
    pub login_button: String,
    pub feed: String,
    pub last_post: String,
    pub expand_content: String,
    pub timestamp: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            cookie_accept: "//div[@role='dialog']//div[@role='button' and contains(., 'cookies')]"
                .to_string(),
            email_input: "//*[@id='email']".to_string(),
            password_input: "//*[@id='pass']".to_string(),
            login_button: "//*[@name='login']".to_string(),
            feed: "//div[@data-pagelet='ProfileTimeline']".to_string(),
            last_post: "./div[1]".to_string(),
            expand_content: ".//div[contains(text(), 'Ver mais')]".to_string(),
            timestamp: ".//a[@role='link' and contains(@href, '/posts/')]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Leading post lines that are always page chrome (author, timestamp, follow button).
    pub header_lines: usize,
    /// Feed UI labels that follow the post body, e.g. the reactions bar.
    pub boundary_tokens: Vec<String>,
    /// Substring identifying content-hosted images in `src` attributes.
    pub image_host_pattern: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            header_lines: 4,
            boundary_tokens: vec!["Gosto".to_string(), "Todas as reações".to_string()],
            image_host_pattern: "scontent".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    pub closed_after_hours: u32,
    pub closed_after_days: u32,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            closed_after_hours: 14,
            closed_after_days: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Report header; `{date}` becomes today's ISO date. Empty disables it.
    pub greeting: String,
    pub restaurants_csv: String,
    pub output_dir: String,
    pub log_dir: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            greeting: "Ora viva camaradas! Aqui vão os menus de hoje ({date}). Bom proveito 🥘\n"
                .to_string(),
            restaurants_csv: "assets/restaurants.csv".to_string(),
            output_dir: "out/menus".to_string(),
            log_dir: Some("out/logs/scraper".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub closed: String,
    pub not_yet_posted: String,
    pub no_match: String,
    pub no_image: String,
    pub missing_timestamp: String,
    /// `{reason}` is replaced with what could not be located.
    pub unreachable: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            closed: "Closed today, no recent post. 🚫".to_string(),
            not_yet_posted: "Today's menu has not been posted yet. ⏳".to_string(),
            no_match: "Could not extract the menu from the last post.".to_string(),
            no_image: "No menu image found in the last post.".to_string(),
            missing_timestamp: "Could not tell when the last post was published.".to_string(),
            unreachable: "Could not read the page ({reason}).".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortenerConfig {
    pub endpoint: String,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://tinyurl.com/api-create.php".to_string(),
        }
    }
}

impl Settings {
    /// Resolves settings for a run: `.env`, then `BUCHA_CONFIG` or `bucha.toml`
    /// when present, then secrets from the environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let path = std::env::var("BUCHA_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            BuchaError::config(format!(
                "Cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut settings = Self::from_toml_str(&content)?;
        settings.source = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| BuchaError::config(format!("Invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Secrets always come from the environment when set.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(email) = lookup("FACEBOOK_USERNAME") {
            self.facebook.email = Some(email);
        }
        if let Some(password) = lookup("FACEBOOK_PASSWORD") {
            self.facebook.password = Some(password);
        }
        if let Some(webhook) = lookup("SLACK_INCOMING_WEBHOOK_URL") {
            self.delivery.webhook_url = Some(webhook);
        }
        if let Some(webdriver) = lookup("WEBDRIVER_URL") {
            self.browser.webdriver_url = webdriver;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.browser.timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.browser.poll_interval_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.browser.page_settle_ms)
    }

    /// Report header for `date`, or `None` when the greeting is disabled.
    pub fn greeting_for(&self, date: chrono::NaiveDate) -> Option<String> {
        if self.report.greeting.trim().is_empty() {
            return None;
        }
        Some(
            self.report
                .greeting
                .replace("{date}", &date.format("%Y-%m-%d").to_string()),
        )
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("facebook.base_url", &self.facebook.base_url)?;
        validation::validate_required_field("facebook.email", &self.facebook.email)?;
        validation::validate_required_field("facebook.password", &self.facebook.password)?;

        validation::validate_url("browser.webdriver_url", &self.browser.webdriver_url)?;
        validation::validate_positive_number("browser.timeout_seconds", self.browser.timeout_seconds, 1)?;
        validation::validate_positive_number("browser.poll_interval_ms", self.browser.poll_interval_ms, 1)?;

        validation::validate_non_empty_list("extract.boundary_tokens", &self.extract.boundary_tokens)?;
        validation::validate_non_empty_string(
            "extract.image_host_pattern",
            &self.extract.image_host_pattern,
        )?;
        validation::validate_positive_number(
            "freshness.closed_after_days",
            u64::from(self.freshness.closed_after_days),
            1,
        )?;
        validation::validate_positive_number(
            "freshness.closed_after_hours",
            u64::from(self.freshness.closed_after_hours),
            1,
        )?;

        validation::validate_path("report.restaurants_csv", &self.report.restaurants_csv)?;
        validation::validate_path("report.output_dir", &self.report.output_dir)?;

        let webhook = validation::validate_required_field("delivery.webhook_url", &self.delivery.webhook_url)?;
        validation::validate_url("delivery.webhook_url", webhook)?;
        validation::validate_url("shortener.endpoint", &self.shortener.endpoint)?;

        tracing::debug!("Settings validation passed");
        Ok(())
    }
}
