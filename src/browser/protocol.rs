//! Pure pieces of the W3C WebDriver wire protocol: request bodies, response
//! unwrapping and the scripts injected into the page.

use serde_json::{Value, json};

use crate::browser::BrowserError;
use crate::typing::Key;

/// Key under which W3C drivers return element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// WebDriver's private-use code point for Backspace.
pub const BACKSPACE_CODE: char = '\u{E003}';

pub const SCRIPT_IS_DISPLAYED: &str = "const el = document.querySelector(arguments[0]); \
     return !!el && window.getComputedStyle(el).display !== 'none';";
pub const SCRIPT_TEXT_CONTENT: &str =
    "const el = document.querySelector(arguments[0]); return el ? el.textContent : null;";
pub const SCRIPT_FOCUS: &str = "const el = document.querySelector(arguments[0]); \
     if (!el) { return false; } el.focus(); return true;";
pub const SCRIPT_REMOVE: &str =
    "const el = document.querySelector(arguments[0]); if (el) { el.remove(); } return null;";
pub const SCRIPT_READY_STATE: &str = "return document.readyState;";

/// New-session request body for the named browser.
pub fn new_session_body(browser: &str, headless: bool) -> Value {
    let browser = browser.to_ascii_lowercase();
    let mut always_match = json!({ "browserName": browser });
    match browser.as_str() {
        "chrome" | "chromium" => {
            let args: Vec<&str> = if headless { vec!["--headless=new"] } else { vec![] };
            always_match["browserName"] = json!("chrome");
            always_match["goog:chromeOptions"] = json!({ "args": args });
        }
        "firefox" => {
            let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
            always_match["moz:firefoxOptions"] = json!({ "args": args });
        }
        "edge" | "msedge" => {
            let args: Vec<&str> = if headless { vec!["--headless=new"] } else { vec![] };
            always_match["browserName"] = json!("MicrosoftEdge");
            always_match["ms:edgeOptions"] = json!({ "args": args });
        }
        _ => {}
    }
    json!({ "capabilities": { "alwaysMatch": always_match } })
}

/// Unwrap the `value` member of a response, mapping W3C error payloads.
pub fn parse_response(success: bool, body: &str) -> Result<Value, BrowserError> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| BrowserError::UnexpectedResponse(format!("{e}: {body}")))?;
    let value = parsed
        .get("value")
        .cloned()
        .ok_or_else(|| BrowserError::UnexpectedResponse(body.to_string()))?;

    match value.get("error").and_then(Value::as_str) {
        Some(error) => Err(BrowserError::Protocol {
            error: error.to_string(),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        None if !success => Err(BrowserError::UnexpectedResponse(body.to_string())),
        None => Ok(value),
    }
}

pub fn session_id(value: &Value) -> Result<String, BrowserError> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BrowserError::UnexpectedResponse(value.to_string()))
}

pub fn element_id(value: &Value) -> Result<String, BrowserError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BrowserError::UnexpectedResponse(value.to_string()))
}

/// Result of the visibility script. Anything but a boolean means the page misbehaved.
pub fn displayed_flag(value: &Value) -> Result<bool, BrowserError> {
    value
        .as_bool()
        .ok_or_else(|| BrowserError::UnexpectedResponse(value.to_string()))
}

pub fn find_element_body(selector: &str) -> Value {
    json!({ "using": "css selector", "value": selector })
}

pub fn execute_body(script: &str, args: &[&str]) -> Value {
    json!({ "script": script, "args": args })
}

pub fn key_value(key: Key) -> String {
    match key {
        Key::Char(ch) => ch.to_string(),
        Key::Backspace => BACKSPACE_CODE.to_string(),
    }
}

/// One key press and release as a single input-source action sequence.
pub fn key_press_body(key: Key) -> Value {
    let value = key_value(key);
    json!({
        "actions": [{
            "type": "key",
            "id": "keyboard",
            "actions": [
                { "type": "keyDown", "value": value },
                { "type": "keyUp", "value": value },
            ],
        }]
    })
}

/// Map a driver "no such element" error onto the selector that missed.
pub fn with_selector(err: BrowserError, selector: &str) -> BrowserError {
    match err {
        BrowserError::Protocol { ref error, .. } if error == "no such element" => {
            BrowserError::NoSuchElement(selector.to_string())
        }
        other => other,
    }
}
