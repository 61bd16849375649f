pub mod run;
pub mod site;
pub mod solver;
pub mod tracker;

use std::time::Duration;

use thiserror::Error;

use crate::browser::BrowserError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to retrieve the \"student_id\" parameter after login (landed on {url})")]
    MissingStudentId { url: String },
    #[error("page did not finish loading within {0:?}")]
    LoadTimeout(Duration),
    #[error("interstitial still shown after {attempts} dismissal attempts")]
    InterstitialStuck { attempts: usize },
    #[error("neither the start nor the continue session control is shown")]
    NoSessionAffordance,
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("failed to persist the answer store: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Recoverable errors abort the current session only; everything else
    /// ends the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::LoadTimeout(_)
            | SessionError::InterstitialStuck { .. }
            | SessionError::NoSessionAffordance => true,
            SessionError::Browser(e) => e.is_page_state(),
            SessionError::MissingStudentId { .. } | SessionError::Store(_) => false,
        }
    }
}
