use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A JSON file living in the config directory, with its own semantic checks
/// on top of what serde already enforces.
pub trait Document: Serialize + DeserializeOwned {
    const FILE_NAME: &'static str;
    /// Human name used in prompts and log lines ("accounts", "options", ...).
    const LABEL: &'static str;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question: String,
    pub translation: String,
    pub answer: String,
    pub updated_at: DateTime<Utc>,
}

impl AnswerRecord {
    pub fn matches(&self, question: &str, translation: &str) -> bool {
        self.question == question && self.translation == translation
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageData {
    pub records: Vec<AnswerRecord>,
}

impl Document for StorageData {
    const FILE_NAME: &'static str = "storage.json";
    const LABEL: &'static str = "storage";
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub username: String,
    pub password: String,
}

impl Account {
    /// Name shown to the user: the optional label, falling back to the username.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountsData {
    pub accounts: Vec<Account>,
}

impl Document for AccountsData {
    const FILE_NAME: &'static str = "accounts.json";
    const LABEL: &'static str = "accounts";

    fn validate(&self) -> Result<(), String> {
        if let Some(i) = self.accounts.iter().position(|a| a.username.is_empty()) {
            return Err(format!("account #{} has an empty username", i + 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_record_uses_camel_case_keys() {
        let json = r#"[{"question":"Q1","translation":"T1","answer":"A1","updatedAt":"2026-01-02T03:04:05Z"}]"#;
        let data: StorageData = serde_json::from_str(json).unwrap();
        assert_eq!(data.records.len(), 1);
        assert!(data.records[0].matches("Q1", "T1"));
        assert!(!data.records[0].matches("Q1", "T2"));

        let out = serde_json::to_string(&data).unwrap();
        assert!(out.contains("\"updatedAt\""));
        assert!(out.starts_with('['));
    }

    #[test]
    fn test_account_name_is_optional() {
        let data: AccountsData =
            serde_json::from_str(r#"[{"username":"jan","password":"x"}]"#).unwrap();
        assert_eq!(data.accounts[0].name, None);
        assert_eq!(data.accounts[0].display_name(), "jan");
        assert!(data.validate().is_ok());

        let out = serde_json::to_string(&data).unwrap();
        assert!(!out.contains("\"name\""));
    }

    #[test]
    fn test_empty_account_name_falls_back_to_username() {
        let account = Account {
            name: Some(String::new()),
            username: "ola".into(),
            password: "p".into(),
        };
        assert_eq!(account.display_name(), "ola");
    }

    #[test]
    fn test_accounts_reject_empty_username() {
        let data = AccountsData {
            accounts: vec![Account {
                name: None,
                username: String::new(),
                password: "p".into(),
            }],
        };
        assert!(data.validate().unwrap_err().contains("#1"));
    }
}
