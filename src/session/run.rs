use rand::Rng;
use tracing::{error, info, warn};

use crate::browser::Browser;
use crate::session::SessionError;
use crate::session::solver::{LoopExit, SessionStart, Solver};
use crate::session::tracker::{SessionTracker, Summary};
use crate::store::StoreError;
use crate::store::answers::AnswerStore;
use crate::store::schema::Account;
use crate::timing::Pacer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunPlan {
    /// Keep starting sessions after the first one finishes.
    pub continuous: bool,
    pub max_sessions: Option<usize>,
    pub max_consecutive_failures: usize,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            continuous: false,
            max_sessions: None,
            max_consecutive_failures: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionExit {
    Finished,
    SafetyLimit,
    /// A recoverable error cut the session short.
    Aborted(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub start: Option<SessionStart>,
    pub exit: SessionExit,
    pub summary: Summary,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub sessions: Vec<SessionReport>,
    pub totals: Summary,
}

/// Side effects the run needs from its caller.
pub trait RunHooks {
    /// Flush the answer store. Called after every session, aborted or not.
    fn persist(&mut self, store: &AnswerStore) -> Result<(), StoreError>;

    /// Called between sessions in continuous mode. Returning false ends the run.
    fn before_next_session(&mut self, _last: &SessionReport) -> bool {
        true
    }
}

/// Log in once, then solve one session (or several, per `plan`).
///
/// The browser is released before returning, on success and on error.
pub fn run<B, P, R>(
    solver: &mut Solver<B, P, R>,
    account: &Account,
    store: &mut AnswerStore,
    plan: &RunPlan,
    hooks: &mut dyn RunHooks,
) -> Result<RunReport, SessionError>
where
    B: Browser,
    P: Pacer,
    R: Rng,
{
    let student_id = match solver.login(account) {
        Ok(id) => id,
        Err(e) => {
            close_quietly(solver);
            return Err(e);
        }
    };

    let max_failures = plan.max_consecutive_failures.max(1);
    let mut report = RunReport::default();
    let mut failures = 0;

    loop {
        let mut tracker = SessionTracker::new();
        let mut start = None;
        let result = solver.start_session(&student_id).and_then(|s| {
            start = Some(s);
            solver.solve(store, &mut tracker)
        });

        let exit = match result {
            Ok(LoopExit::Finished) => {
                failures = 0;
                SessionExit::Finished
            }
            Ok(LoopExit::SafetyLimit) => {
                failures += 1;
                SessionExit::SafetyLimit
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Aborting the current session");
                failures += 1;
                SessionExit::Aborted(e.to_string())
            }
            Err(e) => {
                if let Err(flush) = hooks.persist(store) {
                    error!(error = %flush, "failed to save answers before exiting");
                }
                close_quietly(solver);
                return Err(e);
            }
        };

        if let Err(e) = hooks.persist(store) {
            close_quietly(solver);
            return Err(e.into());
        }
        info!("Saved {} answers", store.len());

        let session = SessionReport {
            start,
            exit,
            summary: tracker.summary(),
        };
        report.totals += session.summary;
        report.sessions.push(session);

        if !plan.continuous {
            break;
        }
        if plan
            .max_sessions
            .is_some_and(|max| report.sessions.len() >= max)
        {
            info!("Reached the limit of {} sessions", report.sessions.len());
            break;
        }
        if failures >= max_failures {
            warn!("{failures} sessions in a row did not finish, stopping");
            break;
        }
        if let Some(last) = report.sessions.last()
            && !hooks.before_next_session(last)
        {
            break;
        }
    }

    solver.close()?;
    Ok(report)
}

fn close_quietly<B: Browser, P: Pacer, R: Rng>(solver: &mut Solver<B, P, R>) {
    if let Err(e) = solver.close() {
        warn!(error = %e, "failed to close the browser");
    }
}
