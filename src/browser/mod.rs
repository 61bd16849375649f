//! Browser Driver seam used by the session loop.
//!
//! The loop only ever talks to a [`Browser`]; the production implementation
//! is a W3C WebDriver client (chromedriver, geckodriver, ...) and tests plug
//! in a scripted fake.

pub mod protocol;
#[cfg(feature = "network")]
pub mod webdriver;

use std::time::Duration;

use thiserror::Error;

use crate::typing::Key;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("no element matches selector {0:?}")]
    NoSuchElement(String),
    #[error("navigation did not complete within {0:?}")]
    NavigationTimeout(Duration),
    #[error("webdriver error \"{error}\": {message}")]
    Protocol { error: String, message: String },
    #[error("could not reach the webdriver: {0}")]
    Transport(String),
    #[error("unexpected webdriver response: {0}")]
    UnexpectedResponse(String),
}

impl BrowserError {
    /// True when the failure reflects the page's state rather than a broken
    /// connection to the driver.
    pub fn is_page_state(&self) -> bool {
        matches!(
            self,
            BrowserError::NoSuchElement(_)
                | BrowserError::NavigationTimeout(_)
                | BrowserError::Protocol { .. }
        )
    }
}

pub trait Browser {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    fn current_url(&mut self) -> Result<String, BrowserError>;

    fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Click and return only once the navigation it triggers has committed.
    /// The wait must already be armed when the click lands.
    fn click_and_navigate(&mut self, selector: &str, timeout: Duration)
    -> Result<(), BrowserError>;

    fn focus(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Press and release one key on whatever element has focus.
    fn press_key(&mut self, key: Key) -> Result<(), BrowserError>;

    /// `textContent` of the first element matching `selector`.
    fn read_text(&mut self, selector: &str) -> Result<String, BrowserError>;

    /// Whether the element exists and its computed `display` is not `none`.
    fn is_displayed(&mut self, selector: &str) -> Result<bool, BrowserError>;

    /// Remove the element from the DOM if present.
    fn remove(&mut self, selector: &str) -> Result<(), BrowserError>;

    fn close(&mut self) -> Result<(), BrowserError>;
}
