use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use super::*;
use crate::record::SourceTag;

// ---------------------------------------------------------------------------
// Scripted providers
// ---------------------------------------------------------------------------

enum Outcome {
    Records(Vec<BusinessRecord>),
    Fail(&'static str),
    Panic,
}

fn play(script: &StdMutex<VecDeque<Outcome>>) -> Result<Vec<BusinessRecord>, std::io::Error> {
    match script.lock().unwrap().pop_front() {
        None => Ok(Vec::new()),
        Some(Outcome::Records(records)) => Ok(records),
        Some(Outcome::Fail(msg)) => Err(std::io::Error::other(msg)),
        Some(Outcome::Panic) => panic!("scripted provider panic"),
    }
}

#[derive(Clone, Default)]
struct StubAi {
    script: Arc<StdMutex<VecDeque<Outcome>>>,
    excludes: Arc<StdMutex<Vec<Vec<String>>>>,
}

impl StubAi {
    fn then(self, outcome: Outcome) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    fn seen_excludes(&self) -> Vec<Vec<String>> {
        self.excludes.lock().unwrap().clone()
    }
}

impl AiSource for StubAi {
    type Error = std::io::Error;

    async fn find_businesses(
        &self,
        _query: &SearchQuery,
        _location: Option<GeoPoint>,
        exclude: &[String],
    ) -> Result<Vec<BusinessRecord>, Self::Error> {
        self.excludes.lock().unwrap().push(exclude.to_vec());
        play(&self.script)
    }
}

#[derive(Clone, Default)]
struct StubDirectory {
    script: Arc<StdMutex<VecDeque<Outcome>>>,
}

impl StubDirectory {
    fn then(self, outcome: Outcome) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }
}

impl DirectorySource for StubDirectory {
    type Error = std::io::Error;

    async fn find_businesses(
        &self,
        _query: &SearchQuery,
        _location: Option<GeoPoint>,
    ) -> Result<Vec<BusinessRecord>, Self::Error> {
        play(&self.script)
    }
}

fn record(name: &str, address: &str, source: SourceTag) -> BusinessRecord {
    let listing = (source == SourceTag::Directory)
        .then(|| format!("https://directory.example.com/biz/{}", name.len()));
    BusinessRecord {
        name: name.to_string(),
        category: "Test".to_string(),
        services_or_products: Vec::new(),
        phone: String::new(),
        email: String::new(),
        address: address.to_string(),
        map_url: None,
        web_or_social_url: listing.clone(),
        directory_url: listing,
        source,
    }
}

fn ai(name: &str) -> BusinessRecord {
    record(name, &format!("{} Main St", name.len()), SourceTag::Ai)
}

fn dir(name: &str) -> BusinessRecord {
    record(name, &format!("{} Oak Ave", name.len()), SourceTag::Directory)
}

fn names(records: &[BusinessRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

fn query(category: &str) -> SearchQuery {
    let mut q = SearchQuery::new(category);
    q.location_text = "Springfield".to_string();
    q
}

// ---------------------------------------------------------------------------
// Round behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_round_merges_both_providers() {
    let ai_stub = StubAi::default().then(Outcome::Records(vec![record(
        "Joe's Pizza",
        "12 Main St, Springfield",
        SourceTag::Ai,
    )]));
    let dir_stub = StubDirectory::default().then(Outcome::Records(vec![
        record("Joe's Pizza", "12 Main St, Springfield", SourceTag::Directory),
        record("Ace Hardware", "5 Oak Ave", SourceTag::Directory),
    ]));
    let session = SearchSession::new(ai_stub, dir_stub);

    let report = session.search(query("Food"), None).await.expect("round");

    assert!(report.is_new_search);
    assert_eq!(report.round, Some(1));
    assert_eq!(report.total, 2);
    assert!(report.message.is_none());
    assert_eq!(report.records[0].source, SourceTag::Both);
    assert_eq!(report.records[1].source, SourceTag::Directory);

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.rounds.len(), 1);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.last_query, Some(query("Food")));
}

#[tokio::test]
async fn identical_query_continues_with_previous_names_excluded() {
    let ai_stub = StubAi::default()
        .then(Outcome::Records(vec![ai("Alpha"), ai("Bravo")]))
        .then(Outcome::Records(vec![ai("Charlie")]));
    let dir_stub = StubDirectory::default().then(Outcome::Records(vec![dir("Delta")]));
    let session = SearchSession::new(ai_stub.clone(), dir_stub);

    session.search(query("Food"), None).await.expect("round 1");
    let report = session.search(query("Food"), None).await.expect("round 2");

    assert!(!report.is_new_search);
    assert_eq!(report.round, Some(2));
    assert_eq!(names(&report.records), ["Charlie"]);
    assert_eq!(report.total, 4);

    let excludes = ai_stub.seen_excludes();
    assert_eq!(excludes.len(), 2);
    assert!(excludes[0].is_empty(), "new search sends no exclusions");
    assert_eq!(excludes[1], ["Alpha", "Bravo", "Delta"]);
}

#[tokio::test]
async fn continuation_drops_names_already_shown() {
    let repeated = vec![dir("Delta"), dir("Echo")];
    let ai_stub = StubAi::default()
        .then(Outcome::Records(vec![ai("Alpha")]))
        .then(Outcome::Records(vec![ai("Alpha"), ai("Foxtrot")]));
    let dir_stub = StubDirectory::default()
        .then(Outcome::Records(repeated.clone()))
        .then(Outcome::Records(repeated));
    let session = SearchSession::new(ai_stub, dir_stub);

    session.search(query("Food"), None).await.expect("round 1");
    let report = session.search(query("Food"), None).await.expect("round 2");

    assert_eq!(names(&report.records), ["Foxtrot"]);
    let snapshot = session.snapshot().await;
    assert_eq!(names(&snapshot.rounds[0]), ["Alpha", "Delta", "Echo"]);
    assert_eq!(names(&snapshot.rounds[1]), ["Foxtrot"]);
}

#[tokio::test]
async fn exhausted_continuation_keeps_rounds_and_reports_no_more() {
    let ai_stub = StubAi::default()
        .then(Outcome::Records(vec![ai("Alpha")]))
        .then(Outcome::Records(vec![ai("Alpha")]));
    let dir_stub = StubDirectory::default()
        .then(Outcome::Records(vec![dir("Delta")]))
        .then(Outcome::Records(vec![dir("Delta")]));
    let session = SearchSession::new(ai_stub, dir_stub);

    session.search(query("Food"), None).await.expect("round 1");
    let before = session.snapshot().await.rounds;
    let report = session.search(query("Food"), None).await.expect("round 2");

    assert_eq!(report.round, None);
    assert!(report.records.is_empty());
    assert_eq!(report.message.as_deref(), Some(NO_MORE_RESULTS_MESSAGE));
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.rounds, before);
    assert_eq!(snapshot.error.as_deref(), Some(NO_MORE_RESULTS_MESSAGE));
}

#[tokio::test]
async fn empty_new_search_reports_no_results() {
    let session = SearchSession::new(StubAi::default(), StubDirectory::default());

    let report = session.search(query("Food"), None).await.expect("round");

    assert!(report.is_new_search);
    assert_eq!(report.round, None);
    assert_eq!(report.message.as_deref(), Some(NO_RESULTS_MESSAGE));
    assert!(session.snapshot().await.rounds.is_empty());
}

#[tokio::test]
async fn changed_query_replaces_previous_rounds() {
    let ai_stub = StubAi::default()
        .then(Outcome::Records(vec![ai("Alpha")]))
        .then(Outcome::Records(vec![ai("Alpha"), ai("Bravo")]));
    let session = SearchSession::new(ai_stub.clone(), StubDirectory::default());

    session.search(query("Food"), None).await.expect("round 1");
    let report = session.search(query("Retail"), None).await.expect("round 2");

    assert!(report.is_new_search);
    assert_eq!(report.round, Some(1));
    assert_eq!(names(&report.records), ["Alpha", "Bravo"]);
    assert_eq!(session.snapshot().await.rounds.len(), 1);
    assert!(ai_stub.seen_excludes()[1].is_empty());
}

#[tokio::test]
async fn failed_new_search_starts_from_empty() {
    let ai_stub = StubAi::default()
        .then(Outcome::Records(vec![ai("Alpha")]))
        .then(Outcome::Fail("quota exhausted"));
    let dir_stub = StubDirectory::default()
        .then(Outcome::Records(Vec::new()))
        .then(Outcome::Fail("location required"));
    let session = SearchSession::new(ai_stub, dir_stub);

    session.search(query("Food"), None).await.expect("round 1");
    let report = session.search(query("Retail"), None).await.expect("round 2");

    assert_eq!(report.round, None);
    assert!(session.snapshot().await.rounds.is_empty());
    let message = report.message.expect("message");
    let lines: Vec<&str> = message.lines().collect();
    assert_eq!(
        lines,
        [
            "AI search failed: quota exhausted",
            "Directory search failed: location required",
            NO_RESULTS_MESSAGE,
        ]
    );
}

#[tokio::test]
async fn one_provider_failure_keeps_the_other_results() {
    let ai_stub = StubAi::default().then(Outcome::Fail("empty response"));
    let dir_stub = StubDirectory::default().then(Outcome::Records(vec![dir("Delta")]));
    let session = SearchSession::new(ai_stub, dir_stub);

    let report = session.search(query("Food"), None).await.expect("round");

    assert_eq!(names(&report.records), ["Delta"]);
    assert_eq!(
        report.message.as_deref(),
        Some("AI search failed: empty response")
    );
}

#[tokio::test]
async fn panicking_provider_aborts_round_without_touching_rounds() {
    let ai_stub = StubAi::default()
        .then(Outcome::Records(vec![ai("Alpha")]))
        .then(Outcome::Panic);
    let session = SearchSession::new(ai_stub, StubDirectory::default());

    session.search(query("Food"), None).await.expect("round 1");
    let err = session
        .search(query("Food"), None)
        .await
        .expect_err("panic should abort");

    assert!(matches!(err, SessionError::Unexpected(_)));
    let snapshot = session.snapshot().await;
    assert!(!snapshot.loading);
    assert_eq!(snapshot.rounds.len(), 1);
    assert_eq!(names(&snapshot.rounds[0]), ["Alpha"]);
    assert!(snapshot.error.is_some());
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[test]
fn begin_round_while_loading_is_busy() {
    let mut state = SessionState::new();
    state.begin_round(query("Food")).expect("first");
    assert!(state.is_loading());
    assert_eq!(state.begin_round(query("Food")).unwrap_err(), SessionError::Busy);
}

#[test]
fn reset_clears_everything_but_not_while_loading() {
    let mut state = SessionState::new();
    let ticket = state.begin_round(query("Food")).expect("begin");
    assert_eq!(state.reset(), Err(SessionError::Busy));

    state.complete_round(
        &ticket,
        RoundFetch {
            ai: vec![ai("Alpha")],
            ..RoundFetch::default()
        },
    );
    assert_eq!(state.total(), 1);

    state.reset().expect("reset");
    assert!(state.rounds().is_empty());
    assert!(state.last_query().is_none());
    assert!(state.error().is_none());

    let ticket = state.begin_round(query("Food")).expect("begin again");
    assert!(ticket.is_new_search, "reset forgets the last query");
}

#[test]
fn abort_round_sets_error_and_clears_loading() {
    let mut state = SessionState::new();
    state.begin_round(query("Food")).expect("begin");
    state.abort_round("boom");
    assert!(!state.is_loading());
    assert_eq!(state.error(), Some("boom"));
}

#[test]
fn accumulated_names_are_distinct_and_ordered() {
    let mut state = SessionState::new();
    let ticket = state.begin_round(query("Food")).expect("begin");
    state.complete_round(
        &ticket,
        RoundFetch {
            ai: vec![ai("Alpha"), ai("Bravo")],
            directory: vec![record("Alpha", "99 Elsewhere Rd", SourceTag::Directory)],
            failures: Vec::new(),
        },
    );
    assert_eq!(state.accumulated_names(), ["Alpha", "Bravo"]);
}

#[test]
fn snapshot_flattens_rounds_in_order() {
    let mut state = SessionState::new();
    let ticket = state.begin_round(query("Food")).expect("begin");
    state.complete_round(
        &ticket,
        RoundFetch {
            ai: vec![ai("Alpha")],
            ..RoundFetch::default()
        },
    );
    let ticket = state.begin_round(query("Food")).expect("begin");
    state.complete_round(
        &ticket,
        RoundFetch {
            directory: vec![dir("Bravo")],
            ..RoundFetch::default()
        },
    );

    let snapshot = state.snapshot();
    assert_eq!(snapshot.total, 2);
    assert_eq!(names(&snapshot.all_records()), ["Alpha", "Bravo"]);
}
