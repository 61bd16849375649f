use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, trace, warn};

use crate::browser::Browser;
use crate::config::Settings;
use crate::config::options::Options;
use crate::session::SessionError;
use crate::session::site::{Site, selectors, student_id_from_url};
use crate::session::tracker::{QuestionOutcome, SessionTracker};
use crate::store::answers::AnswerStore;
use crate::store::schema::Account;
use crate::timing::Pacer;
use crate::typing::{ShadowBuffer, Typist};

#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    pub options: Options,
    /// Questions handled per session before the loop gives up on ever
    /// seeing the finish page.
    pub safety_limit: usize,
    pub interstitial_attempts: usize,
    pub load_timeout: Duration,
    pub poll_interval: Duration,
}

impl SolverConfig {
    pub fn new(options: Options, settings: &Settings) -> Self {
        Self {
            options,
            safety_limit: settings.safety_limit,
            interstitial_attempts: settings.interstitial_attempts,
            load_timeout: settings.load_timeout(),
            poll_interval: settings.poll_interval(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Authenticating,
    AwaitingSessionStart,
    Solving,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStart {
    Started,
    Continued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    Finished,
    SafetyLimit,
}

/// Progress callbacks for whoever renders the run.
pub trait SolveObserver {
    fn question(&mut self, _translation: &str, _cached: Option<&str>) {}

    /// `typed` is the echo of the input field after the latest keystroke.
    fn keystroke(&mut self, _translation: &str, _typed: &str, _target: &str, _intentional: bool) {}

    fn answered(&mut self, _translation: &str, _outcome: QuestionOutcome, _correct: &str) {}
}

pub struct SilentObserver;

impl SolveObserver for SilentObserver {}

/// Drives the quiz UI: login, session start, and the question loop.
pub struct Solver<B, P, R = SmallRng> {
    browser: B,
    pacer: P,
    rng: R,
    site: Site,
    config: SolverConfig,
    observer: Box<dyn SolveObserver>,
    phase: Phase,
}

impl<B: Browser, P: Pacer> Solver<B, P, SmallRng> {
    pub fn new(browser: B, pacer: P, site: Site, config: SolverConfig) -> Self {
        Self::with_rng(browser, pacer, site, config, SmallRng::from_entropy())
    }
}

impl<B: Browser, P: Pacer, R: Rng> Solver<B, P, R> {
    pub fn with_rng(browser: B, pacer: P, site: Site, config: SolverConfig, rng: R) -> Self {
        Self {
            browser,
            pacer,
            rng,
            site,
            config,
            observer: Box::new(SilentObserver),
            phase: Phase::Authenticating,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SolveObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Fill in the login form and return the student id the site redirects to.
    pub fn login(&mut self, account: &Account) -> Result<String, SessionError> {
        self.phase = Phase::Authenticating;
        self.browser.navigate(&self.site.login_url())?;
        self.browser.remove(selectors::COOKIES_MODAL)?;

        self.react();
        self.browser.focus(selectors::LOGIN_INPUT)?;
        self.react();
        self.type_text(&account.username, |_, _| {})?;

        self.react();
        self.browser.focus(selectors::PASSWORD_INPUT)?;
        self.react();
        self.type_text(&account.password, |_, _| {})?;

        self.react();
        self.browser
            .click_and_navigate(selectors::LOGIN_BUTTON, self.config.load_timeout)?;

        let url = self.browser.current_url()?;
        let student_id = student_id_from_url(&url).ok_or(SessionError::MissingStudentId { url })?;

        info!("Logged in as {}", account.display_name());
        self.phase = Phase::AwaitingSessionStart;
        Ok(student_id)
    }

    pub fn start_session(&mut self, student_id: &str) -> Result<SessionStart, SessionError> {
        self.phase = Phase::AwaitingSessionStart;
        self.browser.navigate(&self.site.session_url(student_id))?;
        self.wait_until_loaded()?;
        self.react();

        let start = if self.browser.is_displayed(selectors::START_SESSION)? {
            self.browser.click(selectors::START_SESSION)?;
            info!("Starting new session with student_id = {student_id}");
            SessionStart::Started
        } else if self.browser.is_displayed(selectors::CONTINUE_SESSION)? {
            self.browser.click(selectors::CONTINUE_SESSION)?;
            info!("Continuing existing session with student_id = {student_id}");
            SessionStart::Continued
        } else {
            return Err(SessionError::NoSessionAffordance);
        };

        self.phase = Phase::Solving;
        Ok(start)
    }

    /// Answer questions until the finish page shows up or the safety limit
    /// is hit. Every answer the site discloses is written to `store`.
    pub fn solve(
        &mut self,
        store: &mut AnswerStore,
        tracker: &mut SessionTracker,
    ) -> Result<LoopExit, SessionError> {
        self.phase = Phase::Solving;
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.config.safety_limit {
                warn!(
                    "Session loop exceeded safety limit of {}, breaking from it",
                    self.config.safety_limit
                );
                return Ok(LoopExit::SafetyLimit);
            }

            self.wait_until_loaded()?;
            self.dismiss_interstitials()?;

            if self.browser.is_displayed(selectors::FINISH_PAGE)? {
                self.phase = Phase::Finished;
                info!(
                    questions = tracker.summary().total_questions,
                    "Session finished"
                );
                return Ok(LoopExit::Finished);
            }

            let (question, outcome) = self.solve_question(store)?;
            tracker.record(&question, outcome);
        }
    }

    fn solve_question(
        &mut self,
        store: &mut AnswerStore,
    ) -> Result<(String, QuestionOutcome), SessionError> {
        let question = self.browser.read_text(selectors::QUESTION)?;
        let translation = self.browser.read_text(selectors::TRANSLATION)?;

        let cached = store
            .find(&question, &translation)
            .map(|record| record.answer.clone());
        self.observer.question(&translation, cached.as_deref());

        let error_rate = self.config.options.error_rate.clamp(0.0, 1.0);
        let mut intentional = false;
        let answer = match cached {
            Some(known) if self.rng.gen_bool(error_rate) => {
                match store.pick_decoy(&known, &mut self.rng) {
                    Some(decoy) => {
                        intentional = true;
                        Some(decoy.to_string())
                    }
                    None => Some(known),
                }
            }
            other => other,
        };

        self.react();
        self.browser.focus(selectors::ANSWER_INPUT)?;

        if let Some(target) = answer.as_deref() {
            self.react();
            self.type_text(target, |observer, typed| {
                observer.keystroke(&translation, typed, target, intentional)
            })?;
        }

        self.react();
        self.browser.click(selectors::SUBMIT_ANSWER)?;
        self.wait_until_loaded()?;
        let correct = self.browser.read_text(selectors::CORRECT_ANSWER)?;

        store.update_now(&question, &translation, &correct);

        let outcome = match answer.as_deref() {
            None => QuestionOutcome::Learned,
            Some(_) if intentional => QuestionOutcome::IntentionalError,
            Some(typed) if typed.trim() == correct.trim() => QuestionOutcome::Correct,
            Some(_) => QuestionOutcome::Corrected,
        };
        debug!(%question, %translation, ?outcome, "answered question");
        self.observer.answered(&translation, outcome, &correct);

        self.react();
        self.browser.click(selectors::NEXT_QUESTION)?;

        Ok((question, outcome))
    }

    /// Poll the loading overlay until it is hidden.
    fn wait_until_loaded(&mut self) -> Result<(), SessionError> {
        let interval = self.config.poll_interval.max(Duration::from_millis(1));
        let max_polls = self.config.load_timeout.as_millis() / interval.as_millis();

        let mut polls = 0;
        while self.browser.is_displayed(selectors::LOADING)? {
            if polls >= max_polls {
                return Err(SessionError::LoadTimeout(self.config.load_timeout));
            }
            trace!(polls, "waiting for loading overlay");
            self.pacer.pause(interval);
            polls += 1;
        }
        Ok(())
    }

    fn dismiss_interstitials(&mut self) -> Result<(), SessionError> {
        for _ in 0..self.config.interstitial_attempts {
            let Some(close) = self.visible_interstitial()? else {
                return Ok(());
            };
            debug!(selector = close, "dismissing interstitial");
            self.react();
            self.browser.click(close)?;
            self.wait_until_loaded()?;
        }

        match self.visible_interstitial()? {
            None => Ok(()),
            Some(_) => Err(SessionError::InterstitialStuck {
                attempts: self.config.interstitial_attempts,
            }),
        }
    }

    fn visible_interstitial(&mut self) -> Result<Option<&'static str>, SessionError> {
        for selector in [
            selectors::NEW_WORD_MODAL_CLOSE,
            selectors::POSSIBLE_WORD_MODAL_CLOSE,
        ] {
            if self.browser.is_displayed(selector)? {
                return Ok(Some(selector));
            }
        }
        Ok(None)
    }

    fn react(&mut self) {
        let pause = self.config.options.reaction_time.sample(&mut self.rng);
        self.pacer.pause(pause);
    }

    /// Type into the focused element, echoing each keystroke to `on_key`.
    fn type_text<F>(&mut self, text: &str, mut on_key: F) -> Result<(), SessionError>
    where
        F: FnMut(&mut dyn SolveObserver, &str),
    {
        let profile = self.config.options.input_typing;
        let mut shadow = ShadowBuffer::new();

        for event in Typist::new(text, &profile, &mut self.rng) {
            self.browser.press_key(event.key)?;
            shadow.apply(event.key);
            on_key(self.observer.as_mut(), shadow.as_str());
            self.pacer.pause_ms(event.delay_ms);
        }
        Ok(())
    }

    /// Release the browser. The run is over after this.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.phase = Phase::Finished;
        self.browser.close()?;
        Ok(())
    }
}
