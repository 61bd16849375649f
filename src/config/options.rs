use serde::{Deserialize, Serialize};

use crate::store::schema::Document;
use crate::timing::ReactionWindow;
use crate::typing::TypingProfile;

/// Tunables for how human the bot looks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub input_typing: TypingProfile,
    pub reaction_time: ReactionWindow,
    /// Chance of deliberately answering a known question wrong.
    pub error_rate: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self::recommended()
    }
}

impl Options {
    pub fn recommended() -> Self {
        Self {
            input_typing: TypingProfile::new(40.0, 0.05),
            reaction_time: ReactionWindow::new(1000, 1600),
            error_rate: 0.02,
        }
    }
}

impl Document for Options {
    const FILE_NAME: &'static str = "options.json";
    const LABEL: &'static str = "options";

    fn validate(&self) -> Result<(), String> {
        if !(self.input_typing.wpm.is_finite() && self.input_typing.wpm > 0.0) {
            return Err("inputTyping.wpm must be a positive number".into());
        }
        if !(0.0..=1.0).contains(&self.input_typing.typo_rate) {
            return Err("inputTyping.typoRate must be between 0 and 1".into());
        }
        if !self.reaction_time.is_valid() {
            return Err("reactionTime.from must not exceed reactionTime.to".into());
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err("errorRate must be between 0 and 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_options_are_valid() {
        assert!(Options::recommended().validate().is_ok());
    }

    #[test]
    fn test_options_json_shape() {
        let json = r#"{
            "inputTyping": { "wpm": 65, "typoRate": 0.1 },
            "reactionTime": { "from": 200, "to": 900 },
            "errorRate": 0.05
        }"#;
        let options: Options = serde_json::from_str(json).unwrap();
        assert_eq!(options.input_typing.wpm, 65.0);
        assert_eq!(options.reaction_time.to_ms, 900);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_reject_out_of_range_values() {
        let mut options = Options::recommended();
        options.error_rate = 1.2;
        assert!(options.validate().unwrap_err().contains("errorRate"));

        let mut options = Options::recommended();
        options.input_typing.wpm = -3.0;
        assert!(options.validate().unwrap_err().contains("wpm"));

        let mut options = Options::recommended();
        options.input_typing.typo_rate = -0.1;
        assert!(options.validate().unwrap_err().contains("typoRate"));

        let mut options = Options::recommended();
        options.reaction_time = ReactionWindow::new(900, 100);
        assert!(options.validate().unwrap_err().contains("reactionTime"));
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let json = r#"{ "inputTyping": { "wpm": 40, "typoRate": 0 }, "errorRate": 0 }"#;
        assert!(serde_json::from_str::<Options>(json).is_err());
    }
}
