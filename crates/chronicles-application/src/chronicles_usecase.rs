//! Chronicles use case implementation.
//!
//! `ChroniclesUseCase` is the single writer of `AppState`. It drives the
//! session, query and history flows against a `CrimeBackend` and bounds every
//! backend call with the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chronicles_core::api::{CrimeBackend, MessageResponse};
use chronicles_core::query::{Commit, QueryData};
use chronicles_core::session::{AuthAction, LoginForm, SignupForm};
use chronicles_core::{
    AppState, ChartKind, ChroniclesError, Presentation, Result, ViewMode, ViewModeController,
};
use tokio::sync::Mutex;

/// Result of a query submission that reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The answer is now the held result.
    Committed(Option<QueryData>),
    /// A newer submission was made meanwhile; this answer was discarded.
    Superseded,
    /// The user signed out or signed in again meanwhile; this answer was
    /// discarded.
    Discarded,
}

/// Result of a "load more" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLoad {
    Loaded { added: usize, end: bool },
    /// The end was already reached or a fetch is still outstanding.
    Unavailable,
}

/// Use case coordinating the client flows.
///
/// # Lock discipline
///
/// The state lock is only held while a flow is updated, never across a
/// backend call, so views can read snapshots while a request is pending.
pub struct ChroniclesUseCase {
    backend: Arc<dyn CrimeBackend>,
    state: Arc<Mutex<AppState>>,
    request_timeout: Duration,
}

impl ChroniclesUseCase {
    pub fn new(
        backend: Arc<dyn CrimeBackend>,
        view: ViewModeController,
        request_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(AppState::new(view))),
            request_timeout,
        }
    }

    /// Copy of the current state for rendering.
    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    pub async fn presentation(&self) -> Presentation {
        self.state.lock().await.presentation()
    }

    pub async fn set_view_mode(&self, mode: ViewMode) {
        self.state.lock().await.view.set_mode(mode);
        tracing::debug!(%mode, "view mode changed");
    }

    pub async fn set_chart_kind(&self, kind: ChartKind) {
        self.state.lock().await.view.set_chart_kind(kind);
        tracing::debug!(%kind, "chart kind changed");
    }

    /// Starts in a signed-in state for `email` without calling `/login`.
    pub async fn assume_user(&self, email: &str) {
        self.state.lock().await.assume_user(email);
        tracing::info!(email, "session assumed");
    }

    /// Logs in; returns the success message that was surfaced.
    pub async fn login(&self, form: LoginForm) -> Result<String> {
        if let Err(err) = form.validate() {
            self.state.lock().await.session.reject(AuthAction::Login, &err);
            return Err(err);
        }

        tracing::info!(email = %form.email, "login");
        let outcome = self.call(self.backend.login(&form)).await;
        self.finish_auth(AuthAction::Login, &form.email, outcome).await
    }

    /// Signs up; a successful signup also signs the user in.
    pub async fn signup(&self, form: SignupForm) -> Result<String> {
        if let Err(err) = form.validate() {
            self.state.lock().await.session.reject(AuthAction::Signup, &err);
            return Err(err);
        }

        tracing::info!(email = %form.email, "signup");
        let outcome = self.call(self.backend.signup(&form)).await;
        self.finish_auth(AuthAction::Signup, &form.email, outcome).await
    }

    async fn finish_auth(
        &self,
        action: AuthAction,
        email: &str,
        outcome: Result<MessageResponse>,
    ) -> Result<String> {
        let mut state = self.state.lock().await;
        if state.authenticate(action, email, &outcome) {
            tracing::info!(email, ?action, "authenticated");
            Ok(state.session.message().unwrap_or_default().to_string())
        } else {
            let err = outcome
                .err()
                .unwrap_or_else(|| ChroniclesError::internal("auth outcome lost"));
            tracing::warn!(email, ?action, error = %err, "authentication failed");
            Err(err)
        }
    }

    pub async fn logout(&self) {
        self.state.lock().await.sign_out();
        tracing::info!("logged out");
    }

    /// Submits a query using the current view mode and chart kind.
    ///
    /// Blank text fails with `EmptyQuery` before anything is sent. Backend
    /// failures are recorded in the query flow and returned.
    pub async fn submit_query(&self, text: &str) -> Result<QueryOutcome> {
        let ticket = {
            let mut state = self.state.lock().await;
            let email = state
                .session
                .email()
                .filter(|_| state.session.is_authenticated())
                .map(str::to_string)
                .ok_or(ChroniclesError::NotSignedIn)?;
            let view = state.view;
            state.query.begin(text, &email, &view)?
        };

        tracing::info!(
            seq = ticket.seq,
            is_chart = ticket.request.is_chart,
            chart_type = ?ticket.request.chart_type,
            "submitting query"
        );
        let outcome = self.call(self.backend.query(&ticket.request)).await;
        let failure = outcome.as_ref().err().cloned();

        let mut state = self.state.lock().await;
        match state
            .query
            .complete(ticket.seq, &ticket.request.user_query, outcome)
        {
            Commit::Stale => {
                tracing::debug!(seq = ticket.seq, "discarding superseded query response");
                Ok(QueryOutcome::Superseded)
            }
            Commit::Discarded => {
                tracing::debug!(seq = ticket.seq, "discarding query response after session change");
                Ok(QueryOutcome::Discarded)
            }
            Commit::Applied => match failure {
                Some(err) => {
                    tracing::warn!(seq = ticket.seq, error = %err, "query failed");
                    Err(err)
                }
                None => Ok(QueryOutcome::Committed(state.query.result().cloned())),
            },
        }
    }

    /// Fetches the next history page and appends it.
    pub async fn load_history(&self) -> Result<HistoryLoad> {
        let (email, cursor) = {
            let mut state = self.state.lock().await;
            let email = state
                .session
                .email()
                .filter(|_| state.session.is_authenticated())
                .map(str::to_string)
                .ok_or(ChroniclesError::NotSignedIn)?;
            match state.history.next_cursor() {
                Some(cursor) => (email, cursor),
                None => return Ok(HistoryLoad::Unavailable),
            }
        };

        tracing::debug!(offset = cursor.offset, "loading history page");
        let outcome = self.call(self.backend.history(&email, cursor.offset)).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(page) => {
                let added = state.history.apply_page(cursor, page);
                let end = state.history.is_end();
                tracing::debug!(added, end, "history page applied");
                Ok(HistoryLoad::Loaded { added, end })
            }
            Err(err) => {
                state.history.fail(cursor, &err);
                tracing::warn!(offset = cursor.offset, error = %err, "history fetch failed");
                Err(err)
            }
        }
    }

    async fn call<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ChroniclesError::timeout(self.request_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chronicles_core::api::{QueryRequest, QueryResponse};
    use chronicles_core::chart::{PieSlice, SeriesData};
    use chronicles_core::error::EMPTY_QUERY_MESSAGE;
    use chronicles_core::history::HistoryEntry;
    use chronicles_core::query::{DataPoint, QueryResult};
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Scripted backend: answers are queued per endpoint, each with a delay.
    struct MockBackend {
        auth: Result<MessageResponse>,
        queries: StdMutex<VecDeque<(Duration, Result<QueryResponse>)>>,
        pages: StdMutex<VecDeque<Result<Vec<HistoryEntry>>>>,
        sent_queries: StdMutex<Vec<QueryRequest>>,
        history_calls: StdMutex<Vec<(String, usize)>>,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                auth: Ok(MessageResponse {
                    message: Some("ok".into()),
                }),
                queries: StdMutex::new(VecDeque::new()),
                pages: StdMutex::new(VecDeque::new()),
                sent_queries: StdMutex::new(Vec::new()),
                history_calls: StdMutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_auth(mut self, auth: Result<MessageResponse>) -> Self {
            self.auth = auth;
            self
        }

        fn queue_query(self, delay: Duration, response: Result<QueryResponse>) -> Self {
            self.queries.lock().unwrap().push_back((delay, response));
            self
        }

        fn queue_page(self, page: Result<Vec<HistoryEntry>>) -> Self {
            self.pages.lock().unwrap().push_back(page);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn history_offsets(&self) -> Vec<usize> {
            self.history_calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, offset)| *offset)
                .collect()
        }
    }

    #[async_trait]
    impl CrimeBackend for MockBackend {
        async fn login(&self, _form: &LoginForm) -> Result<MessageResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.auth.clone()
        }

        async fn signup(&self, _form: &SignupForm) -> Result<MessageResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.auth.clone()
        }

        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent_queries.lock().unwrap().push(request.clone());
            let (delay, response) = self
                .queries
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected query");
            tokio::time::sleep(delay).await;
            response
        }

        async fn history(&self, user_email: &str, offset: usize) -> Result<Vec<HistoryEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.history_calls
                .lock()
                .unwrap()
                .push((user_email.to_string(), offset));
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn usecase(backend: Arc<MockBackend>) -> ChroniclesUseCase {
        ChroniclesUseCase::new(
            backend,
            ViewModeController::default(),
            Duration::from_secs(30),
        )
    }

    fn chart_answer(label: &str, value: f64) -> Result<QueryResponse> {
        Ok(QueryResponse {
            message: None,
            data: Some(QueryData::Chart(QueryResult::new(
                Some("T".into()),
                vec![DataPoint::new(label, value)],
            ))),
        })
    }

    fn entries(n: usize) -> Vec<HistoryEntry> {
        (0..n)
            .map(|i| HistoryEntry::new(format!("q{i}"), format!("r{i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_login_success_authenticates() {
        let backend = Arc::new(MockBackend::new());
        let usecase = usecase(backend.clone());

        let message = usecase
            .login(LoginForm::new("a@b.com", "x"))
            .await
            .unwrap();

        assert_eq!(message, "ok");
        let state = usecase.snapshot().await;
        assert!(state.session.is_authenticated());
        assert_eq!(state.session.message(), Some("ok"));
    }

    #[tokio::test]
    async fn test_login_failure_keeps_session() {
        let backend = Arc::new(
            MockBackend::new().with_auth(Err(ChroniclesError::backend(
                Some(500),
                "Login failed: 401: Invalid email or password.",
            ))),
        );
        let usecase = usecase(backend);

        let err = usecase
            .login(LoginForm::new("a@b.com", "wrong"))
            .await
            .unwrap_err();

        assert!(err.is_backend());
        let state = usecase.snapshot().await;
        assert!(!state.session.is_authenticated());
        assert_eq!(
            state.session.error(),
            Some("Login failed: 401: Invalid email or password.")
        );
    }

    #[tokio::test]
    async fn test_blank_signup_field_never_reaches_backend() {
        let backend = Arc::new(MockBackend::new());
        let usecase = usecase(backend.clone());

        let err = usecase
            .signup(SignupForm::new("a@b.com", "555", "", "pw"))
            .await
            .unwrap_err();

        assert_eq!(err, ChroniclesError::missing_field("name"));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_never_calls_backend() {
        let backend = Arc::new(MockBackend::new());
        let usecase = usecase(backend.clone());
        usecase.assume_user("a@b.com").await;

        for text in ["", "   ", "\n\t"] {
            let err = usecase.submit_query(text).await.unwrap_err();
            assert_eq!(err, ChroniclesError::EmptyQuery);
        }

        assert_eq!(backend.calls(), 0);
        let state = usecase.snapshot().await;
        assert_eq!(state.query.error(), Some(EMPTY_QUERY_MESSAGE));
    }

    #[tokio::test]
    async fn test_query_requires_sign_in() {
        let backend = Arc::new(MockBackend::new());
        let usecase = usecase(backend.clone());

        let err = usecase.submit_query("thefts").await.unwrap_err();

        assert_eq!(err, ChroniclesError::NotSignedIn);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_pie_query_yields_single_slice() {
        let backend = Arc::new(MockBackend::new().queue_query(
            Duration::ZERO,
            Ok(serde_json::from_value(serde_json::json!({
                "data": {"title": {"text": "T"}, "series": [{"data": [{"name": "Theft", "y": 5}]}]}
            }))
            .unwrap()),
        ));
        let usecase = usecase(backend.clone());
        usecase.assume_user("a@b.com").await;

        let outcome = usecase.submit_query("thefts").await.unwrap();
        assert!(matches!(outcome, QueryOutcome::Committed(Some(_))));

        let sent = backend.sent_queries.lock().unwrap()[0].clone();
        assert_eq!(sent.user_email, "a@b.com");
        assert_eq!(sent.chart_type, Some(ChartKind::Pie));

        let Presentation::Chart(spec) = usecase.presentation().await else {
            panic!("expected a chart");
        };
        assert_eq!(spec.title.as_deref(), Some("T"));
        assert_eq!(
            spec.series.data,
            SeriesData::Slices(vec![PieSlice {
                name: "Theft".into(),
                y: 5.0
            }])
        );
    }

    #[tokio::test]
    async fn test_text_mode_omits_chart_type_and_keeps_kind() {
        let backend = Arc::new(MockBackend::new().queue_query(
            Duration::ZERO,
            Ok(QueryResponse {
                message: Some("done".into()),
                data: Some(QueryData::Text("Theft leads.".into())),
            }),
        ));
        let usecase = usecase(backend.clone());
        usecase.assume_user("a@b.com").await;
        usecase.set_chart_kind(ChartKind::Line).await;
        usecase.set_view_mode(ViewMode::Text).await;

        usecase.submit_query("which crime leads?").await.unwrap();

        let sent = backend.sent_queries.lock().unwrap()[0].clone();
        assert!(!sent.is_chart);
        assert_eq!(sent.chart_type, None);
        assert_eq!(
            usecase.presentation().await,
            Presentation::Text("Theft leads.".into())
        );

        usecase.set_view_mode(ViewMode::Chart).await;
        assert_eq!(usecase.snapshot().await.view.chart_kind(), ChartKind::Line);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_submission_wins() {
        let backend = Arc::new(
            MockBackend::new()
                .queue_query(Duration::from_millis(500), chart_answer("Theft", 9.0))
                .queue_query(Duration::from_millis(100), chart_answer("Burglary", 2.0)),
        );
        let usecase = usecase(backend);
        usecase.assume_user("a@b.com").await;

        let (older, newer) = tokio::join!(
            usecase.submit_query("first"),
            usecase.submit_query("second")
        );

        assert_eq!(older.unwrap(), QueryOutcome::Superseded);
        assert!(matches!(newer.unwrap(), QueryOutcome::Committed(_)));

        let state = usecase.snapshot().await;
        let held = state
            .query
            .result()
            .and_then(QueryData::as_chart)
            .unwrap();
        assert_eq!(held.points[0].label, "Burglary");
        assert_eq!(state.query.last_query(), Some("second"));
    }

    #[tokio::test]
    async fn test_query_failure_preserves_previous_result() {
        let backend = Arc::new(
            MockBackend::new()
                .queue_query(Duration::ZERO, chart_answer("Theft", 5.0))
                .queue_query(Duration::ZERO, Err(ChroniclesError::backend(Some(500), ""))),
        );
        let usecase = usecase(backend);
        usecase.assume_user("a@b.com").await;

        usecase.submit_query("thefts").await.unwrap();
        let err = usecase.submit_query("assaults").await.unwrap_err();

        assert!(err.is_backend());
        let state = usecase.snapshot().await;
        assert_eq!(state.query.error(), Some("Failed to process query"));
        assert!(state.query.result().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_backend_times_out() {
        let backend = Arc::new(
            MockBackend::new().queue_query(Duration::from_secs(60), chart_answer("Theft", 1.0)),
        );
        let usecase = ChroniclesUseCase::new(
            backend,
            ViewModeController::default(),
            Duration::from_secs(5),
        );
        usecase.assume_user("a@b.com").await;

        let err = usecase.submit_query("thefts").await.unwrap_err();

        assert_eq!(err, ChroniclesError::Timeout { seconds: 5 });
        let state = usecase.snapshot().await;
        assert_eq!(state.query.error(), Some("Request timed out after 5s"));
        assert!(!state.query.is_submitting());
    }

    #[tokio::test]
    async fn test_history_pages_until_empty() {
        let backend = Arc::new(
            MockBackend::new()
                .queue_page(Ok(entries(5)))
                .queue_page(Ok(entries(2)))
                .queue_page(Ok(Vec::new())),
        );
        let usecase = usecase(backend.clone());
        usecase.assume_user("a@b.com").await;

        assert_eq!(
            usecase.load_history().await.unwrap(),
            HistoryLoad::Loaded { added: 5, end: false }
        );
        assert_eq!(
            usecase.load_history().await.unwrap(),
            HistoryLoad::Loaded { added: 2, end: false }
        );
        assert_eq!(
            usecase.load_history().await.unwrap(),
            HistoryLoad::Loaded { added: 0, end: true }
        );
        assert_eq!(usecase.load_history().await.unwrap(), HistoryLoad::Unavailable);

        assert_eq!(backend.history_offsets(), vec![0, 5, 7]);
        let state = usecase.snapshot().await;
        assert_eq!(state.history.entries().len(), 7);
        assert!(!state.history.can_load_more());
    }

    #[tokio::test]
    async fn test_history_failure_can_be_retried() {
        let backend = Arc::new(
            MockBackend::new()
                .queue_page(Err(ChroniclesError::transport("connection refused")))
                .queue_page(Ok(entries(1))),
        );
        let usecase = usecase(backend.clone());
        usecase.assume_user("a@b.com").await;

        assert!(usecase.load_history().await.is_err());
        assert!(usecase.snapshot().await.history.error().is_some());

        assert_eq!(
            usecase.load_history().await.unwrap(),
            HistoryLoad::Loaded { added: 1, end: false }
        );
        assert_eq!(backend.history_offsets(), vec![0, 0]);
    }

    #[tokio::test]
    async fn test_second_sign_in_starts_history_afresh() {
        let backend = Arc::new(
            MockBackend::new()
                .queue_query(Duration::ZERO, chart_answer("Theft", 5.0))
                .queue_page(Ok(vec![HistoryEntry::new("a-q", "a-r"); 3]))
                .queue_page(Ok(vec![HistoryEntry::new("b-q", "b-r")])),
        );
        let usecase = usecase(backend.clone());

        usecase.login(LoginForm::new("a@b.com", "x")).await.unwrap();
        usecase.submit_query("thefts").await.unwrap();
        usecase.load_history().await.unwrap();

        usecase.login(LoginForm::new("c@d.com", "y")).await.unwrap();
        assert_eq!(usecase.presentation().await, Presentation::Empty);
        assert_eq!(
            usecase.load_history().await.unwrap(),
            HistoryLoad::Loaded { added: 1, end: false }
        );

        assert_eq!(
            *backend.history_calls.lock().unwrap(),
            vec![("a@b.com".to_string(), 0), ("c@d.com".to_string(), 0)]
        );
        let state = usecase.snapshot().await;
        let queries: Vec<&str> = state
            .history
            .entries()
            .iter()
            .map(|entry| entry.user_query.as_str())
            .collect();
        assert_eq!(queries, vec!["b-q"]);
    }

    #[tokio::test]
    async fn test_failed_second_sign_in_keeps_current_user() {
        let backend = Arc::new(
            MockBackend::new()
                .with_auth(Err(ChroniclesError::backend(
                    Some(401),
                    "Login failed: 401: Invalid email or password.",
                )))
                .queue_page(Ok(entries(2))),
        );
        let usecase = usecase(backend);
        usecase.assume_user("a@b.com").await;
        usecase.load_history().await.unwrap();

        usecase
            .login(LoginForm::new("c@d.com", "wrong"))
            .await
            .unwrap_err();

        let state = usecase.snapshot().await;
        assert_eq!(state.session.email(), Some("a@b.com"));
        assert_eq!(state.history.entries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_pending_across_logout_is_discarded() {
        let backend = Arc::new(
            MockBackend::new().queue_query(Duration::from_millis(500), chart_answer("Theft", 5.0)),
        );
        let usecase = usecase(backend);
        usecase.assume_user("a@b.com").await;

        let (outcome, ()) = tokio::join!(usecase.submit_query("thefts"), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            usecase.logout().await;
        });

        assert_eq!(outcome.unwrap(), QueryOutcome::Discarded);
        assert_eq!(usecase.presentation().await, Presentation::Empty);
    }

    #[tokio::test]
    async fn test_logout_clears_user_state() {
        let backend = Arc::new(
            MockBackend::new()
                .queue_query(Duration::ZERO, chart_answer("Theft", 5.0))
                .queue_page(Ok(entries(2))),
        );
        let usecase = usecase(backend);
        usecase.login(LoginForm::new("a@b.com", "x")).await.unwrap();
        usecase.submit_query("thefts").await.unwrap();
        usecase.load_history().await.unwrap();

        usecase.logout().await;

        let state = usecase.snapshot().await;
        assert!(!state.session.is_authenticated());
        assert!(state.query.result().is_none());
        assert!(state.history.entries().is_empty());
        assert_eq!(usecase.presentation().await, Presentation::Empty);
    }
}
