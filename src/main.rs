use bucha::adapters::{SlackWebhook, TinyUrlShortener, WebDriverBrowser};
use bucha::config::load_restaurants;
use bucha::core::etl::RunSummary;
use bucha::core::DeliveryStatus;
use bucha::utils::{logger, validation::Validate};
use bucha::{BuchaError, LocalStorage, MenuEngine, MenuPipeline, Settings};
use std::path::Path;

#[tokio::main]
async fn main() {
    // no log directory without settings, report on stdout only
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            logger::init_cli_logger(None);
            fail(&e)
        }
    };

    let log_path = logger::init_cli_logger(settings.report.log_dir.as_deref().map(Path::new));
    tracing::info!("Buchabot is alive 🍕");
    match &settings.source {
        Some(path) => tracing::info!("Settings loaded from {}", path.display()),
        None => tracing::info!("No config file found, using default settings"),
    }
    if let Some(path) = log_path {
        tracing::debug!("Logging to {}", path.display());
    }

    match run(settings).await {
        Ok(summary) => {
            println!("Today's menu -----");
            println!("{}", summary.report);
            if let Some(artifact) = &summary.artifact {
                println!("📁 Saved to: {}", artifact);
            }
            match summary.delivery {
                DeliveryStatus::Delivered => println!("✅ Menus sent, check the lunch channel."),
                DeliveryStatus::Failed(reason) => eprintln!("⚠️ Menus not delivered: {}", reason),
            }
        }
        Err(e) => fail(&e),
    }
}

async fn run(settings: Settings) -> Result<RunSummary, BuchaError> {
    settings.validate()?;
    let restaurants = load_restaurants(&settings.report.restaurants_csv)?;

    let webhook_url = settings.delivery.webhook_url.clone().unwrap_or_default();
    let delivery = SlackWebhook::new(webhook_url);
    let shortener = TinyUrlShortener::new(settings.shortener.endpoint.clone())?;
    let storage = LocalStorage::new(settings.report.output_dir.clone());
    let browser =
        WebDriverBrowser::connect(&settings.browser.webdriver_url, settings.browser.headless).await?;

    let pipeline = MenuPipeline::new(browser, shortener, delivery, storage, settings, restaurants)?;
    let summary = MenuEngine::new(pipeline).run().await?;

    tracing::info!("Done, {} menus in today's report", summary.menus);
    Ok(summary)
}

fn fail(e: &BuchaError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code())
}
