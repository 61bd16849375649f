use std::io;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use crate::config::Settings;
use crate::config::options::Options;
use crate::config::setup::{choose_account, setup_accounts, setup_options, setup_storage};
use crate::session::run::{RunHooks, RunPlan, RunReport, SessionReport};
use crate::store::StoreError;
use crate::store::answers::AnswerStore;
use crate::store::json_store::JsonStore;
use crate::store::schema::Account;
use crate::ui::console::print_summary;
use crate::ui::prompt::TerminalPrompter;

#[derive(Args, Clone, Debug, Default)]
pub struct SolveArgs {
    /// Keep starting new sessions after one finishes
    #[arg(short, long)]
    pub continuous: bool,

    /// Wait for Enter before each new session (q quits)
    #[arg(short, long, requires = "continuous")]
    pub pause: bool,

    /// Stop continuous mode after this many sessions
    #[arg(long, value_name = "N", requires = "continuous")]
    pub max_sessions: Option<usize>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// WebDriver endpoint (chromedriver, geckodriver, ...)
    #[arg(long, value_name = "URL")]
    pub webdriver_url: Option<String>,

    /// Account name or username to log in with
    #[arg(short, long, value_name = "NAME")]
    pub account: Option<String>,
}

impl SolveArgs {
    /// Command-line flags win over `settings.toml`.
    pub fn apply(&self, settings: &mut Settings) {
        if self.headless {
            settings.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            settings.webdriver_url = url.clone();
        }
    }

    pub fn plan(&self, settings: &Settings) -> RunPlan {
        RunPlan {
            continuous: self.continuous,
            max_sessions: self.max_sessions,
            max_consecutive_failures: settings.max_consecutive_failures,
        }
    }
}

/// Writes the answer store back to `storage.json` between sessions.
pub struct StoreHooks<'a> {
    store: &'a JsonStore,
    pause: Option<&'a mut TerminalPrompter<io::StdinLock<'static>, io::Stdout>>,
}

impl RunHooks for StoreHooks<'_> {
    fn persist(&mut self, answers: &AnswerStore) -> Result<(), StoreError> {
        self.store.save(&answers.to_data())
    }

    fn before_next_session(&mut self, _last: &SessionReport) -> bool {
        let Some(prompter) = self.pause.as_deref_mut() else {
            return true;
        };
        match prompter.continue_or_quit() {
            Ok(proceed) => proceed,
            Err(e) => {
                warn!(error = %e, "could not read the answer, stopping");
                false
            }
        }
    }
}

pub fn run(args: &SolveArgs) -> Result<()> {
    let mut settings = Settings::load()?;
    args.apply(&mut settings);

    let store = JsonStore::new()?;
    let mut prompter = TerminalPrompter::stdio();
    let accounts = setup_accounts(&store, &mut prompter)?.data;
    let options = setup_options(&store, &mut prompter)?.data;
    let storage = setup_storage(&store, &mut prompter)?.data;
    let account = choose_account(&accounts, args.account.as_deref(), &mut prompter)?;

    let mut answers = AnswerStore::from(storage);
    info!("Loaded {} stored answers", answers.len());

    let plan = args.plan(&settings);
    let mut hooks = StoreHooks {
        store: &store,
        pause: args.pause.then_some(&mut prompter),
    };
    let report = drive(&settings, options, &account, &mut answers, &plan, &mut hooks)?;

    print_summary(&mut io::stdout(), &report.totals)?;
    Ok(())
}

#[cfg(feature = "network")]
fn drive(
    settings: &Settings,
    options: Options,
    account: &Account,
    answers: &mut AnswerStore,
    plan: &RunPlan,
    hooks: &mut dyn RunHooks,
) -> Result<RunReport> {
    use anyhow::Context;

    use crate::browser::webdriver::WebDriver;
    use crate::session::site::Site;
    use crate::session::solver::{Solver, SolverConfig};
    use crate::timing::ThreadPacer;
    use crate::ui::console::ConsoleObserver;

    let browser = WebDriver::connect(&settings.webdriver_url, &settings.browser, settings.headless)
        .with_context(|| {
            format!(
                "failed to start {} through the webdriver at {}",
                settings.browser, settings.webdriver_url
            )
        })?;

    let mut solver = Solver::new(
        browser,
        ThreadPacer,
        Site::new(&settings.base_url),
        SolverConfig::new(options, settings),
    )
    .with_observer(Box::new(ConsoleObserver::stdout()));

    Ok(crate::session::run::run(&mut solver, account, answers, plan, hooks)?)
}

#[cfg(not(feature = "network"))]
fn drive(
    _settings: &Settings,
    _options: Options,
    _account: &Account,
    _answers: &mut AnswerStore,
    _plan: &RunPlan,
    _hooks: &mut dyn RunHooks,
) -> Result<RunReport> {
    anyhow::bail!("built without the `network` feature, no browser driver is available")
}
