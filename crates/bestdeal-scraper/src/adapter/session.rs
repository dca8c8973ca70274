use std::collections::BTreeMap;
use std::sync::Arc;

use bestdeal_core::{ErrorKind, RawProductRecord};

use super::steps::{self, StepContext};
use super::AdapterSettings;
use crate::browser::PageSession;
use crate::error::BrowserError;
use crate::recovery::RecoveryHandler;
use crate::retry::{retry_step, StepPolicy, StepRun};
use crate::sites::SiteProfile;

/// Position of a scrape session in its navigation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    PageLoaded,
    LocationSet,
    SearchOpened,
    QuerySubmitted,
    ResultsLoaded,
    Extracted,
    Failed(ErrorKind),
}

impl State {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Extracted | State::Failed(_))
    }
}

/// Everything a finished session leaves behind.
#[derive(Debug)]
pub struct SessionReport {
    /// `Extracted` or `Failed(_)`.
    pub state: State,
    /// Every state entered, starting with `Init`.
    pub history: Vec<State>,
    /// Attempts made per step name.
    pub attempts: BTreeMap<&'static str, u32>,
    /// One `"<step> attempt <n>: <error>"` line per failed attempt.
    pub error_log: Vec<String>,
    pub records: Vec<RawProductRecord>,
}

/// One source's run for one request.
///
/// Owns its page exclusively and closes it before [`ScrapeSession::run`]
/// returns, whatever the terminal state.
pub struct ScrapeSession {
    page: Box<dyn PageSession>,
    ctx: Arc<StepContext>,
    empty_results_is_error: bool,
    state: State,
    history: Vec<State>,
    attempts: BTreeMap<&'static str, u32>,
    error_log: Vec<String>,
    card_count: usize,
    records: Vec<RawProductRecord>,
}

impl ScrapeSession {
    #[must_use]
    pub fn new(
        page: Box<dyn PageSession>,
        profile: &'static SiteProfile,
        settings: &AdapterSettings,
        location: &str,
        query: &str,
    ) -> Self {
        let ctx = StepContext {
            profile,
            recovery: RecoveryHandler::new(
                profile.overlay,
                settings.recovery_max_clicks,
                settings.recovery_settle,
            ),
            location: location.to_owned(),
            query: query.to_owned(),
            typing_pace: settings.typing_pace,
            element_timeout: settings.element_timeout,
        };
        Self {
            page,
            ctx: Arc::new(ctx),
            empty_results_is_error: settings.empty_results_is_error,
            state: State::Init,
            history: vec![State::Init],
            attempts: BTreeMap::new(),
            error_log: Vec::new(),
            card_count: 0,
            records: Vec::new(),
        }
    }

    /// Drives the state machine to `Extracted` or `Failed`, then closes the page.
    pub async fn run(mut self) -> SessionReport {
        let source = self.ctx.profile.name;
        while !self.state.is_terminal() {
            let next = self.advance().await;
            tracing::info!(source, from = ?self.state, to = ?next, "state transition");
            self.state = next;
            self.history.push(next);
        }

        if let Err(e) = self.page.close().await {
            tracing::debug!(source, error = %e, "closing page failed");
        }

        SessionReport {
            state: self.state,
            history: self.history,
            attempts: self.attempts,
            error_log: self.error_log,
            records: self.records,
        }
    }

    async fn advance(&mut self) -> State {
        match self.state {
            State::Init => self.load_page().await,
            State::PageLoaded => self.set_location().await,
            State::LocationSet => self.open_search().await,
            State::SearchOpened => self.submit_query().await,
            State::QuerySubmitted => self.await_results().await,
            State::ResultsLoaded => self.extract().await,
            terminal @ (State::Extracted | State::Failed(_)) => terminal,
        }
    }

    async fn load_page(&mut self) -> State {
        let ctx = Arc::clone(&self.ctx);
        let run = retry_step(
            self.page.as_mut(),
            &self.ctx.recovery,
            self.ctx.profile.navigation,
            "load_page",
            move |page| {
                let ctx = Arc::clone(&ctx);
                Box::pin(async move { steps::load_page(page, &ctx).await })
            },
        )
        .await;
        match self.record("load_page", run) {
            Ok(()) => State::PageLoaded,
            Err(e) => self.fail("load_page", ErrorKind::NavigationFailed, &e),
        }
    }

    async fn set_location(&mut self) -> State {
        let ctx = Arc::clone(&self.ctx);
        let run = retry_step(
            self.page.as_mut(),
            &self.ctx.recovery,
            self.ctx.profile.location.policy,
            "set_location",
            move |page| {
                let ctx = Arc::clone(&ctx);
                Box::pin(async move { steps::set_location(page, &ctx).await })
            },
        )
        .await;
        match self.record("set_location", run) {
            Ok(chosen) => {
                tracing::info!(source = self.ctx.profile.name, suggestion = %chosen, "location selected");
                State::LocationSet
            }
            Err(e) => self.fail("set_location", ErrorKind::LocationSetFailed, &e),
        }
    }

    async fn open_search(&mut self) -> State {
        let ctx = Arc::clone(&self.ctx);
        let run = retry_step(
            self.page.as_mut(),
            &self.ctx.recovery,
            self.ctx.profile.search.open_policy,
            "open_search",
            move |page| {
                let ctx = Arc::clone(&ctx);
                Box::pin(async move { steps::open_search(page, &ctx).await })
            },
        )
        .await;
        match self.record("open_search", run) {
            Ok(()) => State::SearchOpened,
            Err(e) => self.fail("open_search", ErrorKind::SearchUnavailable, &e),
        }
    }

    async fn submit_query(&mut self) -> State {
        let ctx = Arc::clone(&self.ctx);
        let run = retry_step(
            self.page.as_mut(),
            &self.ctx.recovery,
            self.ctx.profile.search.submit_policy,
            "submit_query",
            move |page| {
                let ctx = Arc::clone(&ctx);
                Box::pin(async move { steps::submit_query(page, &ctx).await })
            },
        )
        .await;
        match self.record("submit_query", run) {
            Ok(()) => State::QuerySubmitted,
            Err(e) => self.fail("submit_query", ErrorKind::QuerySubmitFailed, &e),
        }
    }

    async fn await_results(&mut self) -> State {
        let ctx = Arc::clone(&self.ctx);
        let policy: StepPolicy = self.ctx.profile.results.policy;
        let run = retry_step(
            self.page.as_mut(),
            &self.ctx.recovery,
            policy,
            "await_results",
            move |page| {
                let ctx = Arc::clone(&ctx);
                Box::pin(async move { steps::count_results(page, &ctx).await })
            },
        )
        .await;
        let err = match self.record("await_results", run) {
            Ok(cards) => {
                self.card_count = cards;
                return State::ResultsLoaded;
            }
            Err(e) => e,
        };

        // Only "nothing matched" may be read as an empty result; a page that
        // broke while polling is a failure.
        if !matches!(
            err,
            BrowserError::ElementNotFound(_) | BrowserError::Timeout { .. }
        ) {
            return self.fail("await_results", ErrorKind::UnrecoverableAdapterError, &err);
        }
        if self.empty_results_is_error {
            return self.fail("await_results", ErrorKind::NoResultsOrTimeout, &err);
        }
        tracing::warn!(
            source = self.ctx.profile.name,
            kind = %ErrorKind::NoResultsOrTimeout,
            polls = policy.max_attempts,
            error = %err,
            "no results after polling, reporting an empty result"
        );
        self.card_count = 0;
        State::ResultsLoaded
    }

    async fn extract(&mut self) -> State {
        let ctx = Arc::clone(&self.ctx);
        self.records.reserve(self.card_count);
        for index in 0..self.card_count {
            let record = steps::extract_card(self.page.as_mut(), &ctx, index).await;
            self.records.push(record);
        }
        tracing::info!(source = ctx.profile.name, cards = self.records.len(), "extracted result cards");
        State::Extracted
    }

    /// Books attempts and failures of a finished step.
    fn record<T>(&mut self, step: &'static str, run: StepRun<T>) -> Result<T, BrowserError> {
        *self.attempts.entry(step).or_insert(0) += run.attempts;
        self.error_log.extend(
            run.failures
                .iter()
                .enumerate()
                .map(|(i, failure)| format!("{step} attempt {}: {failure}", i + 1)),
        );
        run.outcome
    }

    fn fail(&self, step: &'static str, kind: ErrorKind, err: &BrowserError) -> State {
        tracing::error!(
            source = self.ctx.profile.name,
            step,
            attempts = self.attempts.get(step).copied().unwrap_or(0),
            kind = %kind,
            error = %err,
            "step exhausted its retries"
        );
        State::Failed(kind)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
