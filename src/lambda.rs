use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use bucha::adapters::{SlackWebhook, TinyUrlShortener, WebDriverBrowser};
use bucha::config::load_restaurants;
use bucha::core::DeliveryStatus;
use bucha::utils::{logger, validation::Validate};
use bucha::{LambdaConfig, MenuEngine, MenuPipeline, S3Storage, Settings};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Request {
    /// Overrides `report.restaurants_csv` for this invocation.
    pub restaurants_csv: Option<String>,
}

#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub menus: usize,
    pub artifact: Option<String>,
    pub delivered: bool,
    pub report: String,
}

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Buchabot is alive 🍕");

    let mut settings = Settings::load()?;
    if let Some(path) = &settings.source {
        tracing::info!("Settings loaded from {}", path.display());
    }
    if let Some(csv) = event.payload.restaurants_csv {
        settings.report.restaurants_csv = csv;
    }
    settings.validate()?;

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    let restaurants = load_restaurants(&settings.report.restaurants_csv)?;

    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&aws)
        .region(Region::new(lambda_config.s3_region.clone()))
        .build();
    let storage = S3Storage::new(
        S3Client::from_conf(s3_config),
        lambda_config.s3_bucket.clone(),
        lambda_config.s3_prefix.clone(),
    );

    let delivery = SlackWebhook::new(settings.delivery.webhook_url.clone().unwrap_or_default());
    let shortener = TinyUrlShortener::new(settings.shortener.endpoint.clone())?;
    let browser =
        WebDriverBrowser::connect(&settings.browser.webdriver_url, settings.browser.headless).await?;

    let pipeline = MenuPipeline::new(browser, shortener, delivery, storage, settings, restaurants)?;
    let summary = MenuEngine::new(pipeline).run().await?;

    tracing::info!("Lambda run completed with {} menus", summary.menus);
    Ok(Response {
        message: "Menus scraped".to_string(),
        menus: summary.menus,
        artifact: summary.artifact,
        delivered: summary.delivery == DeliveryStatus::Delivered,
        report: summary.report,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();
    run(service_fn(function_handler)).await
}
