//! Minimal W3C WebDriver HTTP client.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Key codes from the WebDriver key table.
pub(super) const KEY_ENTER: &str = "\u{E007}";
pub(super) const KEY_ESCAPE: &str = "\u{E00C}";

/// Errors from the WebDriver endpoint.
#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a W3C error object.
    #[error("WebDriver error ({status}) {error}: {message}")]
    Command {
        status: u16,
        error: String,
        message: String,
    },

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),

    #[error("Screenshot decode failed: {0}")]
    Screenshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebDriverError {
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, WebDriverError::Command { error, .. } if error == "no such element")
    }
}

/// Reference to a DOM element inside a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn id(&self) -> &str {
        &self.0
    }

    pub(super) fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }

    pub(super) fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| ElementRef(id.to_string()))
    }
}

/// An open browser session.
#[derive(Debug)]
pub struct WebDriverSession {
    id: String,
}

impl WebDriverSession {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Extract `value` from a WebDriver response body, mapping error objects.
pub(super) fn parse_response(status: u16, body: Value) -> Result<Value, WebDriverError> {
    let value = body.get("value").cloned().unwrap_or(Value::Null);
    if (200..300).contains(&status) {
        return Ok(value);
    }

    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(WebDriverError::Command {
        status,
        error,
        message,
    })
}

/// HTTP client for one WebDriver endpoint.
pub struct WebDriverClient {
    http: Client,
    base_url: String,
}

impl WebDriverClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, WebDriverError> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WebDriverError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("WebDriver {} {}", method, path);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body: Value = response.json().await.map_err(|e| {
            WebDriverError::Protocol(format!("invalid JSON from {}: {}", path, e))
        })?;
        parse_response(status, body)
    }

    fn session_path(session: &WebDriverSession, suffix: &str) -> String {
        format!("/session/{}{}", session.id, suffix)
    }

    pub async fn new_session(&self, capabilities: Value) -> Result<WebDriverSession, WebDriverError> {
        let value = self
            .send(Method::POST, "/session", Some(capabilities))
            .await?;
        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Protocol("missing sessionId".to_string()))?;
        Ok(WebDriverSession { id: id.to_string() })
    }

    pub async fn delete_session(&self, session: &WebDriverSession) -> Result<(), WebDriverError> {
        self.send(Method::DELETE, &Self::session_path(session, ""), None)
            .await
            .map(|_| ())
    }

    pub async fn set_timeouts(
        &self,
        session: &WebDriverSession,
        page_load: Duration,
        implicit: Duration,
    ) -> Result<(), WebDriverError> {
        let body = json!({
            "pageLoad": page_load.as_millis() as u64,
            "implicit": implicit.as_millis() as u64,
        });
        self.send(Method::POST, &Self::session_path(session, "/timeouts"), Some(body))
            .await
            .map(|_| ())
    }

    pub async fn navigate(&self, session: &WebDriverSession, url: &str) -> Result<(), WebDriverError> {
        self.send(
            Method::POST,
            &Self::session_path(session, "/url"),
            Some(json!({ "url": url })),
        )
        .await
        .map(|_| ())
    }

    pub async fn current_url(&self, session: &WebDriverSession) -> Result<String, WebDriverError> {
        let value = self
            .send(Method::GET, &Self::session_path(session, "/url"), None)
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WebDriverError::Protocol("url is not a string".to_string()))
    }

    pub async fn back(&self, session: &WebDriverSession) -> Result<(), WebDriverError> {
        self.send(Method::POST, &Self::session_path(session, "/back"), Some(json!({})))
            .await
            .map(|_| ())
    }

    /// Run a synchronous script. Element arguments go through [`ElementRef::to_json`].
    pub async fn execute(
        &self,
        session: &WebDriverSession,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, WebDriverError> {
        self.send(
            Method::POST,
            &Self::session_path(session, "/execute/sync"),
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    /// `using` is a W3C strategy name such as `"css selector"` or `"xpath"`.
    pub async fn find_elements(
        &self,
        session: &WebDriverSession,
        using: &str,
        selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let value = self
            .send(
                Method::POST,
                &Self::session_path(session, "/elements"),
                Some(json!({ "using": using, "value": selector })),
            )
            .await?;
        Ok(value
            .as_array()
            .map(|items| items.iter().filter_map(ElementRef::from_json).collect())
            .unwrap_or_default())
    }

    pub async fn is_displayed(
        &self,
        session: &WebDriverSession,
        element: &ElementRef,
    ) -> Result<bool, WebDriverError> {
        let path = Self::session_path(session, &format!("/element/{}/displayed", element.0));
        let value = self.send(Method::GET, &path, None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn click(
        &self,
        session: &WebDriverSession,
        element: &ElementRef,
    ) -> Result<(), WebDriverError> {
        let path = Self::session_path(session, &format!("/element/{}/click", element.0));
        self.send(Method::POST, &path, Some(json!({}))).await.map(|_| ())
    }

    pub async fn send_keys(
        &self,
        session: &WebDriverSession,
        element: &ElementRef,
        text: &str,
    ) -> Result<(), WebDriverError> {
        let path = Self::session_path(session, &format!("/element/{}/value", element.0));
        self.send(Method::POST, &path, Some(json!({ "text": text })))
            .await
            .map(|_| ())
    }

    /// Press and release a single key on the focused element.
    pub async fn press_key(&self, session: &WebDriverSession, key: &str) -> Result<(), WebDriverError> {
        let body = json!({
            "actions": [{
                "type": "key",
                "id": "keyboard",
                "actions": [
                    { "type": "keyDown", "value": key },
                    { "type": "keyUp", "value": key },
                ],
            }]
        });
        self.send(Method::POST, &Self::session_path(session, "/actions"), Some(body))
            .await
            .map(|_| ())
    }

    /// Capture the viewport and write it as PNG.
    pub async fn save_screenshot(
        &self,
        session: &WebDriverSession,
        path: &Path,
    ) -> Result<(), WebDriverError> {
        let value = self
            .send(Method::GET, &Self::session_path(session, "/screenshot"), None)
            .await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| WebDriverError::Protocol("screenshot is not a string".to_string()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| WebDriverError::Screenshot(e.to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}
