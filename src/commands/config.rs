use std::fs;
use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use tracing::info;

use crate::config::Settings;
use crate::config::options::Options;
use crate::config::setup::{Prompter, Setup, clear_all, setup_accounts, setup_options, setup_storage};
use crate::store::json_store::JsonStore;
use crate::store::schema::{AccountsData, Document, StorageData};
use crate::ui::console::display_path;
use crate::ui::prompt::TerminalPrompter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigOperation {
    /// Print where the config files live
    Find,
    /// Delete every config file
    Clear,
    /// Create missing or invalid config files
    Init,
}

pub fn run(operation: ConfigOperation) -> Result<()> {
    let store = JsonStore::new()?;
    let mut prompter = TerminalPrompter::stdio();
    match operation {
        ConfigOperation::Find => find(&store, &mut io::stdout()),
        ConfigOperation::Clear => clear(&store, &mut prompter),
        ConfigOperation::Init => init(&store, &mut prompter),
    }
}

pub fn find<W: Write>(store: &JsonStore, out: &mut W) -> Result<()> {
    let paths = [
        ("Accounts", store.path_of::<AccountsData>()),
        ("Options", store.path_of::<Options>()),
        ("Storage", store.path_of::<StorageData>()),
        ("Settings", Settings::settings_path()),
    ];
    for (label, path) in paths {
        writeln!(out, "{label} config path: {}", display_path(&path))?;
    }
    Ok(())
}

pub fn clear(store: &JsonStore, prompter: &mut dyn Prompter) -> Result<()> {
    if !prompter.confirm("Are you sure you want to *delete* all your configs?", false)? {
        return Ok(());
    }
    clear_all(store)?;

    let settings = Settings::settings_path();
    if settings.exists() {
        fs::remove_file(&settings)?;
    }
    info!("Deleted all config files");
    Ok(())
}

pub fn init(store: &JsonStore, prompter: &mut dyn Prompter) -> Result<()> {
    report_skipped(&setup_accounts(store, prompter)?);
    report_skipped(&setup_options(store, prompter)?);
    report_skipped(&setup_storage(store, prompter)?);
    Ok(())
}

fn report_skipped<T: Document>(setup: &Setup<T>) {
    if setup.was_valid {
        info!("The {} config file is already valid, skipping.", T::LABEL);
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_find_lists_every_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut out = Vec::new();
        find(&store, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("accounts.json"));
        assert!(out.contains("options.json"));
        assert!(out.contains("storage.json"));
        assert!(out.contains("settings.toml"));
        assert_eq!(out.lines().count(), 4);
    }
}
