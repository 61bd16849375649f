use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::config::options::Options;
use crate::store::json_store::{FileState, JsonStore};
use crate::store::schema::{Account, AccountsData, Document, StorageData};

/// Interactive questions asked while initializing config files.
pub trait Prompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
    fn text(&mut self, message: &str) -> Result<String>;
    fn password(&mut self, message: &str) -> Result<String>;
    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Setup<T> {
    pub data: T,
    /// The file was already valid and left untouched.
    pub was_valid: bool,
}

/// Load a document, or ask to (re)initialize it when missing or invalid.
///
/// Declining is reported as [`ConfigError::Declined`].
pub fn ensure<T, F>(
    store: &JsonStore,
    prompter: &mut dyn Prompter,
    reset_with: &str,
    fresh: F,
) -> Result<Setup<T>>
where
    T: Document,
    F: FnOnce(&mut dyn Prompter) -> Result<T>,
{
    let state = store.inspect::<T>();
    if let FileState::Valid(data) = state {
        return Ok(Setup {
            data,
            was_valid: true,
        });
    }

    warn!("The {} config file is {}.", T::LABEL, state.describe());
    if let FileState::Invalid(reason) = &state {
        debug!(file = T::FILE_NAME, %reason, "config validation failed");
    }

    let proceed = prompter.confirm(
        &format!(
            "Do you want to proceed and *override* the {} config with {}?",
            T::LABEL,
            reset_with
        ),
        matches!(state, FileState::Missing),
    )?;
    if !proceed {
        return Err(ConfigError::Declined(T::LABEL).into());
    }

    let data = fresh(prompter)?;
    store.save(&data)?;
    info!(
        path = %store.path_of::<T>().display(),
        "wrote {} config",
        T::LABEL
    );
    Ok(Setup {
        data,
        was_valid: false,
    })
}

pub fn setup_accounts(store: &JsonStore, prompter: &mut dyn Prompter) -> Result<Setup<AccountsData>> {
    ensure(store, prompter, "new data", |p| {
        let name = p.text("Enter the name (identifier) of the account. (optional)")?;
        let username = p.text("Enter the username of the account.")?;
        let password = p.password("Enter the password for the account")?;
        Ok(AccountsData {
            accounts: vec![Account {
                name: (!name.trim().is_empty()).then(|| name.trim().to_string()),
                username: username.trim().to_string(),
                password,
            }],
        })
    })
}

pub fn setup_options(store: &JsonStore, prompter: &mut dyn Prompter) -> Result<Setup<Options>> {
    ensure(store, prompter, "recommended data", |_| Ok(Options::recommended()))
}

pub fn setup_storage(store: &JsonStore, prompter: &mut dyn Prompter) -> Result<Setup<StorageData>> {
    ensure(store, prompter, "empty data", |_| Ok(StorageData::default()))
}

/// Pick the account to log in with. A `preferred` name or username skips
/// the prompt; a single account is selected without asking.
pub fn choose_account(
    accounts: &AccountsData,
    preferred: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Account> {
    let list = &accounts.accounts;
    if list.is_empty() {
        return Err(ConfigError::NoAccounts.into());
    }

    if let Some(wanted) = preferred {
        return list
            .iter()
            .find(|a| a.display_name() == wanted || a.username == wanted)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownAccount(wanted.to_string()).into());
    }

    if let [only] = list.as_slice() {
        info!("Selecting the only account available: {}", only.display_name());
        return Ok(only.clone());
    }

    let choices: Vec<String> = list.iter().map(|a| a.display_name().to_string()).collect();
    let index = prompter.select("Select the account to use", &choices)?;
    list.get(index)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownAccount(format!("#{}", index + 1)).into())
}

/// Delete every JSON document. Settings are left alone.
pub fn clear_all(store: &JsonStore) -> Result<()> {
    store.remove::<AccountsData>()?;
    store.remove::<Options>()?;
    store.remove::<StorageData>()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct ScriptedPrompter {
        confirms: VecDeque<bool>,
        texts: VecDeque<String>,
        selection: usize,
        asked_defaults: Vec<bool>,
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&mut self, _message: &str, default: bool) -> Result<bool> {
            self.asked_defaults.push(default);
            Ok(self.confirms.pop_front().unwrap_or(default))
        }

        fn text(&mut self, _message: &str) -> Result<String> {
            Ok(self.texts.pop_front().unwrap_or_default())
        }

        fn password(&mut self, message: &str) -> Result<String> {
            self.text(message)
        }

        fn select(&mut self, _message: &str, _choices: &[String]) -> Result<usize> {
            Ok(self.selection)
        }
    }

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn account(name: Option<&str>, username: &str) -> Account {
        Account {
            name: name.map(str::to_string),
            username: username.into(),
            password: "pw".into(),
        }
    }

    #[test]
    fn test_missing_options_are_initialized_with_recommended() {
        let (_dir, store) = make_test_store();
        let mut prompter = ScriptedPrompter::default();
        let setup = setup_options(&store, &mut prompter).unwrap();

        assert!(!setup.was_valid);
        assert_eq!(setup.data, Options::recommended());
        assert_eq!(prompter.asked_defaults, vec![true]);
        assert!(store.inspect::<Options>().is_valid());
    }

    #[test]
    fn test_valid_file_is_left_untouched() {
        let (_dir, store) = make_test_store();
        let mut options = Options::recommended();
        options.error_rate = 0.3;
        store.save(&options).unwrap();

        let mut prompter = ScriptedPrompter::default();
        let setup = setup_options(&store, &mut prompter).unwrap();
        assert!(setup.was_valid);
        assert_eq!(setup.data.error_rate, 0.3);
        assert!(prompter.asked_defaults.is_empty());
    }

    #[test]
    fn test_invalid_file_defaults_to_not_overriding() {
        let (_dir, store) = make_test_store();
        fs::write(store.path_of::<StorageData>(), "garbage").unwrap();

        let mut prompter = ScriptedPrompter::default();
        let err = setup_storage(&store, &mut prompter).unwrap_err();
        assert_eq!(prompter.asked_defaults, vec![false]);
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Declined("storage"))
        ));
        assert_eq!(
            fs::read_to_string(store.path_of::<StorageData>()).unwrap(),
            "garbage"
        );
    }

    #[test]
    fn test_invalid_file_overridden_when_confirmed() {
        let (_dir, store) = make_test_store();
        fs::write(store.path_of::<StorageData>(), "garbage").unwrap();

        let mut prompter = ScriptedPrompter {
            confirms: VecDeque::from([true]),
            ..Default::default()
        };
        let setup = setup_storage(&store, &mut prompter).unwrap();
        assert!(setup.data.records.is_empty());
        assert!(store.inspect::<StorageData>().is_valid());
    }

    #[test]
    fn test_accounts_setup_prompts_for_credentials() {
        let (_dir, store) = make_test_store();
        let mut prompter = ScriptedPrompter {
            texts: VecDeque::from(["  ".to_string(), " jan ".to_string(), "s3cret".to_string()]),
            ..Default::default()
        };
        let setup = setup_accounts(&store, &mut prompter).unwrap();
        assert_eq!(setup.data.accounts, vec![Account {
            name: None,
            username: "jan".into(),
            password: "s3cret".into(),
        }]);
    }

    #[test]
    fn test_choose_only_account_without_prompt() {
        let accounts = AccountsData {
            accounts: vec![account(None, "solo")],
        };
        let mut prompter = ScriptedPrompter {
            selection: 99,
            ..Default::default()
        };
        let chosen = choose_account(&accounts, None, &mut prompter).unwrap();
        assert_eq!(chosen.username, "solo");
    }

    #[test]
    fn test_choose_account_by_selection_and_by_name() {
        let accounts = AccountsData {
            accounts: vec![account(Some("home"), "a"), account(Some("school"), "b")],
        };
        let mut prompter = ScriptedPrompter {
            selection: 1,
            ..Default::default()
        };
        assert_eq!(choose_account(&accounts, None, &mut prompter).unwrap().username, "b");
        assert_eq!(
            choose_account(&accounts, Some("home"), &mut prompter).unwrap().username,
            "a"
        );
        assert_eq!(
            choose_account(&accounts, Some("b"), &mut prompter).unwrap().username,
            "b"
        );
        assert!(choose_account(&accounts, Some("work"), &mut prompter).is_err());
    }

    #[test]
    fn test_choose_from_empty_accounts_fails() {
        let mut prompter = ScriptedPrompter::default();
        let err = choose_account(&AccountsData::default(), None, &mut prompter).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::NoAccounts)
        ));
    }

    #[test]
    fn test_clear_all_removes_documents() {
        let (_dir, store) = make_test_store();
        store.save(&Options::recommended()).unwrap();
        store.save(&StorageData::default()).unwrap();
        clear_all(&store).unwrap();
        assert_eq!(store.inspect::<Options>(), FileState::Missing);
        assert_eq!(store.inspect::<StorageData>(), FileState::Missing);
    }
}
