use async_trait::async_trait;
use bucha::adapters::{SlackWebhook, TinyUrlShortener};
use bucha::config::load_restaurants;
use bucha::core::{Browser, DeliveryStatus, Element, Locator};
use bucha::utils::error::Result;
use bucha::utils::validation::Validate;
use bucha::{LocalStorage, MenuEngine, MenuPipeline, Settings};
use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const IMAGE_SRC: &str = "https://scontent.xx.fbcdn.net/v/menu-do-dia.jpg";

/// Every page has a fresh post; text pages carry a short menu, image pages a scontent picture.
#[derive(Clone, Default)]
struct ScriptedBrowser {
    url: Arc<Mutex<String>>,
    logged_in: Arc<Mutex<bool>>,
}

impl ScriptedBrowser {
    fn current(&self) -> String {
        self.url.lock().unwrap().clone()
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn locate(&self, locator: &Locator, _scope: Option<&Element>) -> Result<Option<Element>> {
        let value = locator.value();
        let logged_in = *self.logged_in.lock().unwrap();

        let found = if value.contains("@id='email'") || value.contains("@name='login'") {
            (!logged_in).then(|| Element::new(value))
        } else if value.contains("@id='pass'") {
            (!logged_in).then(|| Element::new("pass"))
        } else if value.contains("ProfileTimeline") {
            Some(Element::new("feed"))
        } else if value == "./div[1]" {
            Some(Element::new("post"))
        } else if value.contains("/posts/") {
            Some(Element::new("stamp"))
        } else if value.contains("img") && self.current().ends_with("tasca") {
            Some(Element::new("img"))
        } else {
            None
        };
        Ok(found)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        if element.id().contains("login") {
            *self.logged_in.lock().unwrap() = true;
        }
        Ok(())
    }

    async fn send_keys(&self, _element: &Element, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn text(&self, element: &Element) -> Result<String> {
        Ok(match element.id() {
            "stamp" => "45 min".to_string(),
            "post" => "Cantina\n45 min\n·\nSeguir\nArroz de pato\nTodas as reações:\n12"
                .to_string(),
            _ => String::new(),
        })
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok((element.id() == "img" && name == "src").then(|| IMAGE_SRC.to_string()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

fn write_fixture(dir: &TempDir, webhook_url: &str, tinyurl_endpoint: &str) -> std::path::PathBuf {
    let output_dir = dir.path().join("menus");
    let csv_path = dir.path().join("restaurants.csv");
    std::fs::write(
        &csv_path,
        "account_id,alias,scraping_mode,emoji,daily_price\n\
         cantina, Cantina, text, 🍲, 7.5\n\
         tasca, Tasca, IMAGE, 🐟, 9\n\
         cinema, Cinema, video, 🎬, 4\n",
    )
    .unwrap();

    let config = format!(
        r#"
[facebook]
base_url = "https://fb.example.com/"
email = "bot@example.com"
password = "${{BUCHA_IT_PASSWORD}}"

[browser]
timeout_seconds = 1
poll_interval_ms = 5
page_settle_ms = 0

[report]
greeting = "Menus ({{date}})\n"
restaurants_csv = "{csv}"
output_dir = "{out}"

[delivery]
webhook_url = "{webhook}"

[shortener]
endpoint = "{tiny}"
"#,
        csv = csv_path.display(),
        out = output_dir.display(),
        webhook = webhook_url,
        tiny = tinyurl_endpoint,
    );
    let config_path = dir.path().join("bucha.toml");
    std::fs::write(&config_path, config).unwrap();
    config_path
}

#[tokio::test]
async fn test_end_to_end_run_with_real_http_adapters() {
    // Setup temporary directory and mock services
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let expected_report = "Menus (2024-05-02)\n\n\
                           *🍲 - Cantina [7.5 Eur]*\nArroz de pato\n\n\
                           *🐟 - Tasca [9 Eur]*\nhttps://tinyurl.com/abc123\n";

    let tiny_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api-create.php")
            .query_param("url", IMAGE_SRC);
        then.status(200).body("https://tinyurl.com/abc123");
    });
    let slack_mock = server.mock(|when, then| {
        when.method(POST).path("/services/T/B/X").json_body(json!({
            "text": expected_report,
            "unfurl_links": false,
            "unfurl_media": false
        }));
        then.status(200).body("ok");
    });

    std::env::set_var("BUCHA_IT_PASSWORD", "hunter2");
    let config_path = write_fixture(
        &temp_dir,
        &server.url("/services/T/B/X"),
        &server.url("/api-create.php"),
    );

    // Load configuration the same way a run does
    let settings = Settings::from_file(&config_path).unwrap();
    assert_eq!(settings.facebook.password.as_deref(), Some("hunter2"));
    settings.validate().unwrap();

    let restaurants = load_restaurants(&settings.report.restaurants_csv).unwrap();
    assert_eq!(restaurants.len(), 3);

    let storage = LocalStorage::new(settings.report.output_dir.clone());
    let output_dir = std::path::PathBuf::from(&settings.report.output_dir);
    let pipeline = MenuPipeline::new(
        ScriptedBrowser::default(),
        TinyUrlShortener::new(settings.shortener.endpoint.clone()).unwrap(),
        SlackWebhook::new(settings.delivery.webhook_url.clone().unwrap()),
        storage,
        settings,
        restaurants,
    )
    .unwrap()
    .with_date(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());

    // Run
    let summary = MenuEngine::new(pipeline).run().await.unwrap();

    // Verify results
    tiny_mock.assert();
    slack_mock.assert();
    assert_eq!(summary.menus, 2);
    assert_eq!(summary.delivery, DeliveryStatus::Delivered);
    assert_eq!(summary.report, expected_report);

    let saved = std::fs::read_to_string(output_dir.join("2024_05_02.txt")).unwrap();
    assert_eq!(saved, expected_report);
}

#[tokio::test]
async fn test_slack_failure_still_saves_report() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/api-create.php");
        then.status(200).body("https://tinyurl.com/abc123");
    });
    let slack_mock = server.mock(|when, then| {
        when.method(POST).path("/hook");
        then.status(500).body("invalid_payload");
    });

    let config_path = write_fixture(&temp_dir, &server.url("/hook"), &server.url("/api-create.php"));
    let mut settings = Settings::from_file(&config_path).unwrap();
    settings.facebook.password = Some("secret".to_string());

    let restaurants = load_restaurants(&settings.report.restaurants_csv).unwrap();
    let output_dir = std::path::PathBuf::from(&settings.report.output_dir);
    let pipeline = MenuPipeline::new(
        ScriptedBrowser::default(),
        TinyUrlShortener::new(settings.shortener.endpoint.clone()).unwrap(),
        SlackWebhook::new(server.url("/hook")),
        LocalStorage::new(settings.report.output_dir.clone()),
        settings,
        restaurants,
    )
    .unwrap()
    .with_date(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());

    let summary = MenuEngine::new(pipeline).run().await.unwrap();

    slack_mock.assert();
    assert!(matches!(summary.delivery, DeliveryStatus::Failed(_)));
    assert!(summary.artifact.is_some());
    assert!(output_dir.join("2024_05_03.txt").exists());
}

#[test]
fn test_restaurant_file_with_bad_price_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("restaurants.csv");
    std::fs::write(
        &csv_path,
        "account_id,alias,scraping_mode,emoji,daily_price\ncantina,Cantina,text,🍲,barato\n",
    )
    .unwrap();

    let err = load_restaurants(&csv_path).unwrap_err();
    assert!(err.is_fatal());
}
