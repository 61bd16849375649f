use std::thread;
use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::browser::protocol::{self, with_selector};
use crate::browser::{Browser, BrowserError};
use crate::typing::Key;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const NAVIGATION_POLL: Duration = Duration::from_millis(100);

/// Blocking W3C WebDriver client bound to one browser session.
pub struct WebDriver {
    client: Client,
    endpoint: String,
    session_id: String,
    closed: bool,
}

impl WebDriver {
    /// Start a new browser through the driver listening at `endpoint`.
    pub fn connect(endpoint: &str, browser: &str, headless: bool) -> Result<Self, BrowserError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BrowserError::Transport(e.to_string()))?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let value = send(
            &client,
            Method::POST,
            &format!("{endpoint}/session"),
            Some(protocol::new_session_body(browser, headless)),
        )?;
        let session_id = protocol::session_id(&value)?;
        info!(%browser, headless, "Created new browser session");

        Ok(Self {
            client,
            endpoint,
            session_id,
            closed: false,
        })
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, BrowserError> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        send(&self.client, method, &url, body)
    }

    fn find(&self, selector: &str) -> Result<String, BrowserError> {
        let value = self
            .command(
                Method::POST,
                "/element",
                Some(protocol::find_element_body(selector)),
            )
            .map_err(|e| with_selector(e, selector))?;
        protocol::element_id(&value)
    }

    fn execute(&self, script: &str, args: &[&str]) -> Result<Value, BrowserError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(protocol::execute_body(script, args)),
        )
    }
}

fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> Result<Value, BrowserError> {
    debug!(%method, %url, "webdriver request");
    let request = client.request(method, url);
    let request = match body {
        Some(body) => request.json(&body),
        None => request,
    };
    let response = request
        .send()
        .map_err(|e| BrowserError::Transport(e.to_string()))?;
    let success = response.status().is_success();
    let text = response
        .text()
        .map_err(|e| BrowserError::Transport(e.to_string()))?;
    protocol::parse_response(success, &text)
}

impl Browser for WebDriver {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, BrowserError> {
        let value = self.command(Method::GET, "/url", None)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::UnexpectedResponse(value.to_string()))
    }

    fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        let element = self.find(selector)?;
        self.command(Method::POST, &format!("/element/{element}/click"), Some(json!({})))?;
        Ok(())
    }

    fn click_and_navigate(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        // Element Click already blocks on a navigation it starts under the
        // default page load strategy; polling covers script-driven redirects.
        let before = self.current_url()?;
        self.click(selector)?;

        let started = Instant::now();
        loop {
            let url = self.current_url()?;
            let ready = self.execute(protocol::SCRIPT_READY_STATE, &[])?;
            if url != before && ready.as_str() == Some("complete") {
                debug!(%url, "navigation committed");
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(BrowserError::NavigationTimeout(timeout));
            }
            thread::sleep(NAVIGATION_POLL);
        }
    }

    fn focus(&mut self, selector: &str) -> Result<(), BrowserError> {
        match self.execute(protocol::SCRIPT_FOCUS, &[selector])? {
            Value::Bool(true) => Ok(()),
            _ => Err(BrowserError::NoSuchElement(selector.to_string())),
        }
    }

    fn press_key(&mut self, key: Key) -> Result<(), BrowserError> {
        self.command(Method::POST, "/actions", Some(protocol::key_press_body(key)))?;
        Ok(())
    }

    fn read_text(&mut self, selector: &str) -> Result<String, BrowserError> {
        match self.execute(protocol::SCRIPT_TEXT_CONTENT, &[selector])? {
            Value::String(text) => Ok(text),
            _ => Err(BrowserError::NoSuchElement(selector.to_string())),
        }
    }

    fn is_displayed(&mut self, selector: &str) -> Result<bool, BrowserError> {
        let value = self.execute(protocol::SCRIPT_IS_DISPLAYED, &[selector])?;
        protocol::displayed_flag(&value)
    }

    fn remove(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.execute(protocol::SCRIPT_REMOVE, &[selector])?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.command(Method::DELETE, "", None)?;
        self.closed = true;
        info!("Closed the browser");
        Ok(())
    }
}

impl Drop for WebDriver {
    fn drop(&mut self) {
        if !self.closed
            && let Err(e) = self.close()
        {
            warn!(error = %e, "failed to close browser session");
        }
    }
}
