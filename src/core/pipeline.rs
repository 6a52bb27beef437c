use crate::config::Settings;
use crate::core::freshness::{Freshness, FreshnessClassifier};
use crate::core::image_resolver::ImageResolver;
use crate::core::normalizer;
use crate::core::text_extractor::TextExtractor;
use crate::core::{
    AggregateReport, Browser, Delivery, DeliveryStatus, Element, ExtractedContent, LoadOutcome,
    Locator, Pipeline, Placeholder, Restaurant, ScrapingMode, Storage, UrlShortener,
};
use crate::utils::error::{BuchaError, Result};
use chrono::NaiveDate;
use tracing::Instrument;

/// Scrapes every configured restaurant through one shared browser session,
/// strictly one page at a time.
pub struct MenuPipeline<B: Browser, U: UrlShortener, D: Delivery, S: Storage> {
    browser: B,
    shortener: U,
    delivery: D,
    storage: S,
    settings: Settings,
    restaurants: Vec<Restaurant>,
    classifier: FreshnessClassifier,
    text_extractor: TextExtractor,
    image_resolver: ImageResolver,
    today: NaiveDate,
}

impl<B: Browser, U: UrlShortener, D: Delivery, S: Storage> MenuPipeline<B, U, D, S> {
    pub fn new(
        browser: B,
        shortener: U,
        delivery: D,
        storage: S,
        settings: Settings,
        restaurants: Vec<Restaurant>,
    ) -> Result<Self> {
        Ok(Self {
            classifier: FreshnessClassifier::new(settings.freshness),
            text_extractor: TextExtractor::new(&settings.extract)?,
            image_resolver: ImageResolver::new(
                &settings.extract,
                settings.timeout(),
                settings.poll_interval(),
            ),
            browser,
            shortener,
            delivery,
            storage,
            settings,
            restaurants,
            today: chrono::Local::now().date_naive(),
        })
    }

    /// Overrides the report date (header and artifact name).
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn report_file_name(&self) -> String {
        format!("{}.txt", self.today.format("%Y_%m_%d"))
    }

    fn locator(selector: &str) -> Locator {
        Locator::parse(selector)
    }

    /// Signs in once for the whole run. Any failure here is a session error.
    pub async fn login(&self) -> Result<()> {
        let selectors = &self.settings.selectors;
        let (Some(email), Some(password)) = (
            self.settings.facebook.email.as_deref(),
            self.settings.facebook.password.as_deref(),
        ) else {
            return Err(BuchaError::session("Facebook credentials are not configured"));
        };

        tracing::info!("Logging in to {}", self.settings.facebook.base_url);
        self.browser
            .navigate(&self.settings.facebook.base_url)
            .await
            .map_err(|e| BuchaError::session(format!("Cannot open login page: {}", e)))?;
        tokio::time::sleep(self.settings.page_settle()).await;

        // cookie banner only shows up for fresh sessions in some regions
        match self
            .browser
            .wait_until(
                &Self::locator(&selectors.cookie_accept),
                None,
                self.settings.poll_interval() * 4,
                self.settings.poll_interval(),
            )
            .await
        {
            Ok(button) => {
                if let Err(e) = self.browser.click(&button).await {
                    tracing::debug!("Cookie banner click failed: {}", e);
                }
            }
            Err(_) => tracing::debug!("No cookie banner shown"),
        }

        self.fill(&selectors.email_input, email).await?;
        self.fill(&selectors.password_input, password).await?;

        let login_button = self
            .browser
            .wait_until(
                &Self::locator(&selectors.login_button),
                None,
                self.settings.timeout(),
                self.settings.poll_interval(),
            )
            .await
            .map_err(|e| BuchaError::session(format!("Login button not found: {}", e)))?;
        self.browser
            .click(&login_button)
            .await
            .map_err(|e| BuchaError::session(format!("Cannot submit login form: {}", e)))?;
        tokio::time::sleep(self.settings.page_settle()).await;

        if self
            .browser
            .locate(&Self::locator(&selectors.password_input), None)
            .await
            .map_err(|e| BuchaError::session(format!("Cannot check login result: {}", e)))?
            .is_some()
        {
            return Err(BuchaError::session("Still on the login form after submitting credentials"));
        }

        tracing::info!("Logged in");
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let input = self
            .browser
            .wait_until(
                &Self::locator(selector),
                None,
                self.settings.timeout(),
                self.settings.poll_interval(),
            )
            .await
            .map_err(|e| BuchaError::session(format!("Login form field missing: {}", e)))?;
        self.browser
            .send_keys(&input, value)
            .await
            .map_err(|e| BuchaError::session(format!("Cannot type into login form: {}", e)))
    }

    /// Runs the per-restaurant state machine. Never fails: every problem ends
    /// up as a [`Placeholder`].
    pub async fn scrape(&self, restaurant: &Restaurant) -> ExtractedContent {
        let wants_text = match &restaurant.scraping_mode {
            ScrapingMode::Text => true,
            ScrapingMode::Image => false,
            ScrapingMode::Unsupported(mode) => {
                tracing::warn!("Not scraping: unsupported scraping mode '{}'", mode);
                return ExtractedContent::Failed(Placeholder::Unreachable(format!(
                    "unsupported scraping mode '{}'",
                    mode
                )));
            }
        };

        // NAVIGATE
        let url = format!(
            "{}/{}",
            self.settings.facebook.base_url.trim_end_matches('/'),
            restaurant.account_id
        );
        if let Err(e) = self.browser.navigate(&url).await {
            tracing::error!("Navigation to {} failed: {}", url, e);
            return ExtractedContent::Failed(Placeholder::Unreachable("page did not load".into()));
        }
        tokio::time::sleep(self.settings.page_settle()).await;

        // LOCATE_FEED
        let feed = match self.wait_for(&self.settings.selectors.feed, None).await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::error!("Feed not found: {}", e);
                return ExtractedContent::Failed(Placeholder::Unreachable("feed not found".into()));
            }
        };

        // LOCATE_LAST_POST
        let post = match self
            .wait_for(&self.settings.selectors.last_post, Some(&feed))
            .await
        {
            Ok(post) => post,
            Err(e) => {
                tracing::error!("Last post not found: {}", e);
                return ExtractedContent::Failed(Placeholder::Unreachable(
                    "last post not found".into(),
                ));
            }
        };

        // CLASSIFY_TIMESTAMP
        match self.freshness(&post).await {
            Some(Freshness::Open) => {}
            Some(Freshness::Closed) => {
                tracing::info!("Last post is stale, marking '{}' as closed", restaurant.alias);
                return ExtractedContent::Failed(Placeholder::Closed);
            }
            None => {
                tracing::error!("No timestamp found on the last post");
                return ExtractedContent::Failed(Placeholder::MissingTimestamp);
            }
        }

        if wants_text {
            self.extract_text(&post).await
        } else {
            self.image_resolver
                .resolve(&self.browser, &self.shortener, &post)
                .await
        }
    }

    async fn wait_for(&self, selector: &str, scope: Option<&Element>) -> Result<Element> {
        self.browser
            .wait_until(
                &Self::locator(selector),
                scope,
                self.settings.timeout(),
                self.settings.poll_interval(),
            )
            .await
    }

    async fn freshness(&self, post: &Element) -> Option<Freshness> {
        let stamp = match self.wait_for(&self.settings.selectors.timestamp, Some(post)).await {
            Ok(element) => self.browser.text(&element).await.ok()?,
            Err(BuchaError::Timeout { .. }) => return None,
            Err(e) => {
                tracing::warn!("Timestamp lookup failed: {}", e);
                return None;
            }
        };

        let freshness = self.classifier.classify(&stamp);
        tracing::debug!("Timestamp '{}' classified as {:?}", stamp.trim(), freshness);
        freshness
    }

    async fn extract_text(&self, post: &Element) -> ExtractedContent {
        // "Ver mais" only exists on long posts
        if let Ok(Some(expand)) = self
            .browser
            .locate(&Self::locator(&self.settings.selectors.expand_content), Some(post))
            .await
        {
            match self.browser.click(&expand).await {
                Ok(()) => tokio::time::sleep(self.settings.poll_interval()).await,
                Err(e) => tracing::debug!("Could not expand post: {}", e),
            }
        }

        match self.browser.text(post).await {
            Ok(raw) => self.text_extractor.extract(&raw),
            Err(e) => {
                tracing::error!("Cannot read post text: {}", e);
                ExtractedContent::Failed(Placeholder::Unreachable("post text unavailable".into()))
            }
        }
    }

    async fn scrape_all(&self) -> Result<Vec<(Restaurant, ExtractedContent)>> {
        self.login().await?;

        let mut scraped = Vec::with_capacity(self.restaurants.len());
        for restaurant in &self.restaurants {
            let span = tracing::info_span!("restaurant", account = %restaurant.account_id);
            let content = self.scrape(restaurant).instrument(span).await;
            tracing::info!(
                "Scraped '{}' ({}): {}",
                restaurant.alias,
                restaurant.scraping_mode,
                outcome_label(&content)
            );
            scraped.push((restaurant.clone(), content));
        }
        Ok(scraped)
    }
}

fn outcome_label(content: &ExtractedContent) -> &'static str {
    match content {
        ExtractedContent::Text(_) => "text menu",
        ExtractedContent::Image(_) => "image menu",
        ExtractedContent::Failed(Placeholder::Closed) => "closed",
        ExtractedContent::Failed(_) => "placeholder",
    }
}

#[async_trait::async_trait]
impl<B: Browser, U: UrlShortener, D: Delivery, S: Storage> Pipeline for MenuPipeline<B, U, D, S> {
    async fn extract(&self) -> Result<Vec<(Restaurant, ExtractedContent)>> {
        let result = self.scrape_all().await;

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Could not close browser session: {}", e);
        }

        result
    }

    async fn transform(&self, data: Vec<(Restaurant, ExtractedContent)>) -> Result<AggregateReport> {
        let configured = data.len();
        let menus: Vec<_> = data
            .into_iter()
            .filter_map(|(restaurant, content)| {
                normalizer::normalize(&restaurant, content, &self.settings.placeholders)
            })
            .collect();

        if menus.len() < configured {
            tracing::warn!(
                "{} of {} restaurants excluded from the report",
                configured - menus.len(),
                configured
            );
        }

        Ok(AggregateReport {
            header: self.settings.greeting_for(self.today),
            menus,
        })
    }

    async fn load(&self, report: &AggregateReport) -> Result<LoadOutcome> {
        let payload = report.render();
        let file_name = self.report_file_name();

        let artifact = match self.storage.write_file(&file_name, payload.as_bytes()).await {
            Ok(()) => {
                let location = self.storage.describe(&file_name);
                tracing::info!("Today's menu saved in {}", location);
                Some(location)
            }
            Err(e) => {
                tracing::error!("Could not save today's menu: {}", e);
                None
            }
        };

        let delivery = self.delivery.deliver(&payload).await;
        match &delivery {
            DeliveryStatus::Delivered => tracing::info!("Menus delivered"),
            DeliveryStatus::Failed(reason) => {
                tracing::error!("Could not deliver the menus: {}", reason)
            }
        }

        Ok(LoadOutcome { artifact, delivery })
    }
}
