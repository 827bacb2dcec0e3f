//! Search session: query image, one in-flight search, ranked results.
//!
//! A session moves through `Idle -> Submitting -> {Ready, Failed}`. Every
//! search is tagged with a monotonic request token; a response is applied
//! only if its token is still the one in flight. Selecting a new image or
//! resetting drops the in-flight token, so late responses are discarded.

use std::collections::HashSet;

use serde::Serialize;

use super::{
    assets::UrlResolver,
    comparison::{ComparisonSelection, ComparisonView},
    error::{Error, Result},
    search::SearchBackend,
    types::{Candidate, QueryImage},
};

/// Lifecycle state of a search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Nothing submitted for the current query.
    #[default]
    Idle,
    /// A search is in flight.
    Submitting,
    /// The last search succeeded; results may be empty.
    Ready,
    /// The last submit failed or was rejected.
    Failed,
}

/// A search that has been started but not yet completed.
#[derive(Debug, Clone)]
pub struct PendingSearch {
    token: u64,
    image: QueryImage,
}

impl PendingSearch {
    /// Returns the request token.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Returns the query image to send.
    pub fn image(&self) -> &QueryImage {
        &self.image
    }
}

/// What happened to a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response became the session's result.
    Applied,
    /// The response belonged to a superseded request and was dropped.
    Discarded,
}

/// State of one user's search-and-compare interaction.
#[derive(Debug, Default)]
pub struct SearchSession {
    query: Option<QueryImage>,
    results: Vec<Candidate>,
    comparison: ComparisonView,
    state: SessionState,
    error: Option<Error>,
    last_token: u64,
    in_flight: Option<u64>,
}

impl SearchSession {
    /// Creates an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the query image and drops all prior results.
    pub fn select_image(&mut self, image: QueryImage) {
        tracing::debug!(
            media_type = %image.media_type,
            size = image.size,
            "iplens: query image selected"
        );
        self.clear_outcome();
        self.query = Some(image);
    }

    /// Starts a search for the current query image.
    ///
    /// Clears the comparison and the result set immediately. Fails with
    /// `SessionBusy` while another search is in flight, and with
    /// `NoQueryImage` or `InvalidMediaType` without issuing a request.
    pub fn begin_submit(&mut self) -> Result<PendingSearch> {
        if self.in_flight.is_some() {
            return Err(Error::SessionBusy);
        }

        let checked = match &self.query {
            None => Err(Error::NoQueryImage),
            Some(q) if !q.is_image() => Err(Error::InvalidMediaType {
                media_type: q.media_type.clone(),
            }),
            Some(q) => Ok(q.clone()),
        };
        let image = match checked {
            Ok(image) => image,
            Err(err) => return Err(self.reject(err)),
        };

        self.comparison.clear();
        self.results.clear();
        self.error = None;
        self.last_token += 1;
        self.in_flight = Some(self.last_token);
        self.state = SessionState::Submitting;

        tracing::debug!(token = self.last_token, "iplens: search submitted");

        Ok(PendingSearch {
            token: self.last_token,
            image,
        })
    }

    /// Applies the outcome of the search tagged `token`.
    ///
    /// Outcomes of superseded requests are discarded and leave the session
    /// untouched.
    pub fn complete(&mut self, token: u64, outcome: Result<Vec<Candidate>>) -> Completion {
        if self.in_flight != Some(token) {
            tracing::debug!(token, current = ?self.in_flight, "iplens: discarding stale search response");
            return Completion::Discarded;
        }
        self.in_flight = None;

        match outcome {
            Ok(candidates) => {
                if let Some(id) = first_duplicate_id(&candidates) {
                    tracing::warn!(token, id, "iplens: result set repeats a candidate id");
                }
                tracing::info!(token, results = candidates.len(), "iplens: search ready");
                self.results = candidates;
                self.state = SessionState::Ready;
            }
            Err(e) => {
                tracing::warn!(token, error = %e, "iplens: search failed");
                self.results.clear();
                self.error = Some(e);
                self.state = SessionState::Failed;
            }
        }
        Completion::Applied
    }

    /// Runs a search against `backend` and returns the new result set.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<&[Candidate]>
    where
        B: SearchBackend + ?Sized,
    {
        let pending = self.begin_submit()?;
        let outcome = backend.search(pending.image()).await;
        self.complete(pending.token(), outcome);

        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(&self.results),
        }
    }

    /// Clears the query image, results, comparison and error.
    pub fn reset(&mut self) {
        tracing::debug!("iplens: session reset");
        self.clear_outcome();
        self.query = None;
    }

    /// Compares candidate `id` of the current result set with the query.
    pub fn select_candidate<R>(&mut self, id: &str, resolver: &R) -> Result<&ComparisonSelection>
    where
        R: UrlResolver + ?Sized,
    {
        self.comparison
            .select(&self.results, self.query.as_ref(), id, resolver)
    }

    /// Drops the current comparison.
    pub fn clear_comparison(&mut self) {
        self.comparison.clear();
    }

    /// Returns the current comparison, if any.
    pub fn comparison(&self) -> Option<&ComparisonSelection> {
        self.comparison.current()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true while a search is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns true if a submit would start a search.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && self.query.as_ref().is_some_and(QueryImage::is_image)
    }

    /// Returns the current query image.
    pub fn query(&self) -> Option<&QueryImage> {
        self.query.as_ref()
    }

    /// Returns the current result set in server order.
    pub fn results(&self) -> &[Candidate] {
        &self.results
    }

    /// Returns the error of the last failed submit.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns the token of the most recently issued search.
    pub fn request_id(&self) -> u64 {
        self.last_token
    }

    fn reject(&mut self, err: Error) -> Error {
        tracing::info!(error = %err, "iplens: submit rejected");
        self.results.clear();
        self.comparison.clear();
        self.error = Some(err.clone());
        self.state = SessionState::Failed;
        err
    }

    fn clear_outcome(&mut self) {
        self.in_flight = None;
        self.results.clear();
        self.comparison.clear();
        self.error = None;
        self.state = SessionState::Idle;
    }
}

fn first_duplicate_id(candidates: &[Candidate]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .map(|c| c.id.as_str())
        .find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::assets::AssetUrls;

    struct FakeBackend {
        responses: Mutex<Vec<Result<Vec<Candidate>>>>,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(responses: Vec<Result<Vec<Candidate>>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SearchBackend for FakeBackend {
        async fn search(&self, _image: &QueryImage) -> Result<Vec<Candidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn jpeg() -> QueryImage {
        QueryImage::from_bytes("q.jpg", vec![0xff, 0xd8, 0xff], "image/jpeg")
    }

    fn three() -> Vec<Candidate> {
        vec![
            Candidate::new("a1", 0.2),
            Candidate::new("b2", 0.5),
            Candidate::new("c3", 1.8),
        ]
    }

    fn resolver() -> AssetUrls {
        AssetUrls::new("http://localhost:8000").unwrap()
    }

    #[tokio::test]
    async fn test_submit_applies_results_in_order() {
        let backend = FakeBackend::new(vec![Ok(three())]);
        let mut session = SearchSession::new();
        session.select_image(jpeg());

        let results = session.submit(&backend).await.unwrap();
        let ids: Vec<_> = results.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a1", "b2", "c3"]);

        let percents: Vec<_> = ["a1", "b2", "c3"]
            .iter()
            .map(|id| session.select_candidate(id, &resolver()).unwrap().score.percent())
            .collect();
        assert_eq!(percents, [90.0, 75.0, 10.0]);
        assert_eq!(session.state(), SessionState::Ready);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_empty_result_is_ready() {
        let backend = FakeBackend::new(vec![Ok(vec![])]);
        let mut session = SearchSession::new();
        session.select_image(jpeg());

        assert!(session.submit(&backend).await.unwrap().is_empty());
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_non_image_is_rejected_without_request() {
        let backend = FakeBackend::new(vec![]);
        let mut session = SearchSession::new();
        session.select_image(QueryImage::from_bytes("a.pdf", vec![1], "application/pdf"));
        assert!(!session.can_submit());

        let err = session.submit(&backend).await.unwrap_err();
        assert_eq!(
            err,
            Error::InvalidMediaType {
                media_type: "application/pdf".into()
            }
        );
        assert_eq!(backend.calls(), 0);
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.results().is_empty());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_submit_without_image() {
        let backend = FakeBackend::new(vec![]);
        let mut session = SearchSession::new();
        assert_eq!(
            session.submit(&backend).await.unwrap_err(),
            Error::NoQueryImage
        );
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_server_error_detail_is_preserved() {
        let backend = FakeBackend::new(vec![Err(Error::server(500, "index unavailable"))]);
        let mut session = SearchSession::new();
        session.select_image(jpeg());

        let err = session.submit(&backend).await.unwrap_err();
        assert_eq!(err, Error::server(500, "index unavailable"));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.error(), Some(&Error::server(500, "index unavailable")));
        assert!(session.results().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_then_manual_retry() {
        let backend = FakeBackend::new(vec![
            Err(Error::NetworkFailure("timed out".into())),
            Ok(three()),
        ]);
        let mut session = SearchSession::new();
        session.select_image(jpeg());

        let err = session.submit(&backend).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.state(), SessionState::Failed);

        assert_eq!(session.submit(&backend).await.unwrap().len(), 3);
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.error().is_none());
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_second_submit_while_pending_is_busy() {
        let mut session = SearchSession::new();
        session.select_image(jpeg());

        let first = session.begin_submit().unwrap();
        assert_eq!(session.state(), SessionState::Submitting);
        assert!(session.is_loading());
        assert_eq!(session.begin_submit().unwrap_err(), Error::SessionBusy);
        assert_eq!(session.state(), SessionState::Submitting);

        assert_eq!(session.complete(first.token(), Ok(three())), Completion::Applied);
        assert_eq!(session.results().len(), 3);
    }

    #[test]
    fn test_only_authoritative_response_is_applied() {
        let mut session = SearchSession::new();
        session.select_image(jpeg());
        let stale = session.begin_submit().unwrap();

        session.select_image(jpeg().with_file_name("other.jpg"));
        assert_eq!(session.state(), SessionState::Idle);
        let current = session.begin_submit().unwrap();
        assert!(current.token() > stale.token());

        assert_eq!(
            session.complete(current.token(), Ok(vec![Candidate::new("new", 0.1)])),
            Completion::Applied
        );
        assert_eq!(
            session.complete(stale.token(), Ok(vec![Candidate::new("old", 0.1)])),
            Completion::Discarded
        );

        let ids: Vec<_> = session.results().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["new"]);
    }

    #[test]
    fn test_stale_response_after_reset_is_discarded() {
        let mut session = SearchSession::new();
        session.select_image(jpeg());
        let pending = session.begin_submit().unwrap();

        session.reset();
        assert_eq!(
            session.complete(pending.token(), Err(Error::NetworkFailure("late".into()))),
            Completion::Discarded
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_submit_clears_comparison_immediately() {
        let mut session = SearchSession::new();
        session.select_image(jpeg());
        let first = session.begin_submit().unwrap();
        session.complete(first.token(), Ok(three()));
        session.select_candidate("a1", &resolver()).unwrap();
        assert!(session.comparison().is_some());

        let _pending = session.begin_submit().unwrap();
        assert!(session.comparison().is_none());
        assert!(session.results().is_empty());

        let err = session.select_candidate("a1", &resolver()).unwrap_err();
        assert_eq!(err, Error::StaleSelection { id: "a1".into() });
    }

    #[test]
    fn test_select_image_clears_results_and_comparison() {
        let mut session = SearchSession::new();
        session.select_image(jpeg());
        let p = session.begin_submit().unwrap();
        session.complete(p.token(), Ok(three()));
        session.select_candidate("b2", &resolver()).unwrap();

        session.select_image(jpeg());
        assert!(session.results().is_empty());
        assert!(session.comparison().is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_stale_selection_leaves_prior_selection() {
        let mut session = SearchSession::new();
        session.select_image(jpeg());
        let p = session.begin_submit().unwrap();
        session.complete(p.token(), Ok(three()));
        let prior = session.select_candidate("a1", &resolver()).unwrap().clone();

        assert!(session.select_candidate("missing", &resolver()).is_err());
        assert_eq!(session.comparison(), Some(&prior));

        session.clear_comparison();
        session.clear_comparison();
        assert!(session.comparison().is_none());
    }

    #[test]
    fn test_reset_from_every_state() {
        let mut idle = SearchSession::new();
        idle.reset();

        let mut submitting = SearchSession::new();
        submitting.select_image(jpeg());
        submitting.begin_submit().unwrap();

        let mut ready = SearchSession::new();
        ready.select_image(jpeg());
        let p = ready.begin_submit().unwrap();
        ready.complete(p.token(), Ok(three()));
        ready.select_candidate("a1", &resolver()).unwrap();

        let mut failed = SearchSession::new();
        failed.select_image(jpeg());
        let p = failed.begin_submit().unwrap();
        failed.complete(p.token(), Err(Error::server(500, "boom")));

        for mut session in [idle, submitting, ready, failed] {
            session.reset();
            assert_eq!(session.state(), SessionState::Idle);
            assert!(session.query().is_none());
            assert!(session.results().is_empty());
            assert!(session.comparison().is_none());
            assert!(session.error().is_none());
            assert!(!session.is_loading());
        }
    }

    #[test]
    fn test_duplicate_ids_are_kept_and_first_wins() {
        let dup = vec![
            Candidate::new("a1", 0.2),
            Candidate::new("b2", 0.5),
            Candidate::new("a1", 1.0),
        ];
        assert_eq!(first_duplicate_id(&dup), Some("a1"));
        assert_eq!(first_duplicate_id(&three()), None);

        let mut session = SearchSession::new();
        session.select_image(jpeg());
        let p = session.begin_submit().unwrap();
        assert_eq!(session.complete(p.token(), Ok(dup)), Completion::Applied);
        assert_eq!(session.results().len(), 3);
        assert_eq!(session.state(), SessionState::Ready);

        let sel = session.select_candidate("a1", &resolver()).unwrap();
        assert_eq!(sel.rank, 1);
        assert_eq!(sel.score.to_string(), "90.00%");
    }
}
