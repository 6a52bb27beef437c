//! Minimal W3C WebDriver client (geckodriver) implementing [`Browser`].

use crate::domain::ports::{Browser, Element, Locator};
use crate::utils::error::{BuchaError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;

/// Key under which WebDriver serializes element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52a-4f735466cecf";

/// Error payload of a failed WebDriver command.
#[derive(Debug)]
struct WireError {
    status: u16,
    error: String,
    message: String,
}

pub struct WebDriverBrowser {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverBrowser {
    /// Starts a new Firefox session on the WebDriver server.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        let base_url = webdriver_url.trim_end_matches('/').to_string();

        let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "firefox",
                    "moz:firefoxOptions": { "args": args }
                }
            }
        });

        let resp = client
            .post(format!("{}/session", base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| BuchaError::session(format!("WebDriver unreachable at {}: {}", base_url, e)))?;

        let status = resp.status();
        let payload: Value = resp.json().await?;
        if !status.is_success() {
            return Err(BuchaError::session(format!(
                "WebDriver refused new session ({}): {}",
                status,
                payload["value"]["message"].as_str().unwrap_or_default()
            )));
        }

        let session_id = payload["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| BuchaError::session("WebDriver response has no sessionId"))?
            .to_string();

        tracing::info!("Browser session {} started", session_id);
        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<std::result::Result<Value, WireError>> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let payload: Value = resp.json().await.unwrap_or(Value::Null);
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(Ok(value));
        }

        Ok(Err(WireError {
            status: status.as_u16(),
            error: value["error"].as_str().unwrap_or("unknown error").to_string(),
            message: value["message"].as_str().unwrap_or_default().to_string(),
        }))
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        self.send(method, path, body)
            .await?
            .map_err(|e| BuchaError::WebDriverError {
                command: path.to_string(),
                status: e.status,
                message: format!("{}: {}", e.error, e.message),
            })
    }

    async fn execute(&self, script: &str, element: &Element) -> Result<Value> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": [element_ref(element)] })),
        )
        .await
    }
}

fn element_ref(element: &Element) -> Value {
    json!({ ELEMENT_KEY: element.id() })
}

fn parse_element(value: &Value) -> Result<Element> {
    value[ELEMENT_KEY]
        .as_str()
        .map(Element::new)
        .ok_or_else(|| BuchaError::WebDriverError {
            command: "find element".to_string(),
            status: 200,
            message: format!("Unexpected element payload: {}", value),
        })
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    async fn locate(&self, locator: &Locator, scope: Option<&Element>) -> Result<Option<Element>> {
        let path = match scope {
            Some(parent) => format!("/element/{}/element", parent.id()),
            None => "/element".to_string(),
        };
        let body = json!({ "using": locator.strategy(), "value": locator.value() });

        match self.send(Method::POST, &path, Some(body)).await? {
            Ok(value) => parse_element(&value).map(Some),
            Err(e) if e.error == "no such element" => Ok(None),
            Err(e) => Err(BuchaError::WebDriverError {
                command: format!("find {}", locator),
                status: e.status,
                message: format!("{}: {}", e.error, e.message),
            }),
        }
    }

    async fn click(&self, element: &Element) -> Result<()> {
        if let Err(e) = self
            .execute("arguments[0].scrollIntoView(true);", element)
            .await
        {
            tracing::debug!("scrollIntoView failed: {}", e);
        }

        let path = format!("/element/{}/click", element.id());
        match self.send(Method::POST, &path, Some(json!({}))).await? {
            Ok(_) => Ok(()),
            Err(e) if e.error == "element click intercepted" => {
                tracing::debug!("Click intercepted, falling back to script click");
                self.execute("arguments[0].click();", element).await.map(|_| ())
            }
            Err(e) => Err(BuchaError::WebDriverError {
                command: path,
                status: e.status,
                message: format!("{}: {}", e.error, e.message),
            }),
        }
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/value", element.id()),
            Some(json!({ "text": text })),
        )
        .await
        .map(|_| ())
    }

    async fn text(&self, element: &Element) -> Result<String> {
        let value = self
            .command(Method::GET, &format!("/element/{}/text", element.id()), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        let value = self
            .command(
                Method::GET,
                &format!("/element/{}/attribute/{}", element.id(), name),
                None,
            )
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn close(&self) -> Result<()> {
        self.command(Method::DELETE, "", None).await?;
        tracing::info!("Browser session {} closed", self.session_id);
        Ok(())
    }
}
