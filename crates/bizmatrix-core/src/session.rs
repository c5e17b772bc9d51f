//! Round-based search session.
//!
//! A session accumulates rounds of results for one query. Resubmitting the
//! same query continues it: the AI provider is told which names to skip and
//! anything already shown is filtered out again after the merge. Submitting a
//! different query starts over.
//!
//! [`SessionState`] is the synchronous state machine; [`SearchSession`] wraps
//! it with the provider fan-out and the locking needed to share it between
//! request handlers.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::merge::merge_results;
use crate::provider::{AiSource, DirectorySource};
use crate::query::{GeoPoint, SearchQuery};
use crate::record::BusinessRecord;

pub const NO_RESULTS_MESSAGE: &str =
    "No businesses found for your criteria from the AI or directory providers. Try expanding your search.";
pub const NO_MORE_RESULTS_MESSAGE: &str = "No more unique businesses found for this search.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a search is already in progress")]
    Busy,

    #[error("{0}")]
    Unexpected(String),
}

/// What a caller learns about a finished round.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub is_new_search: bool,
    /// 1-based page number of the round just stored, `None` if nothing was stored.
    pub round: Option<usize>,
    /// Records stored by this round.
    pub records: Vec<BusinessRecord>,
    /// Records across all stored rounds after this one.
    pub total: usize,
    /// Provider failures and the no-results notice, newline separated.
    pub message: Option<String>,
}

/// Read-only copy of a session for rendering or export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub rounds: Vec<Vec<BusinessRecord>>,
    pub last_query: Option<SearchQuery>,
    pub loading: bool,
    pub error: Option<String>,
    pub total: usize,
}

impl SessionSnapshot {
    /// All rounds flattened in display order.
    #[must_use]
    pub fn all_records(&self) -> Vec<BusinessRecord> {
        self.rounds.iter().flatten().cloned().collect()
    }
}

/// Inputs for one round, fixed when the round begins.
#[derive(Debug, Clone)]
pub struct RoundTicket {
    pub query: SearchQuery,
    pub is_new_search: bool,
    /// Names the AI provider must not return. Empty for a new search.
    pub exclude_names: Vec<String>,
}

/// Both providers' settled output for one round.
#[derive(Debug, Default)]
pub struct RoundFetch {
    pub ai: Vec<BusinessRecord>,
    pub directory: Vec<BusinessRecord>,
    /// One user-facing fragment per failed provider.
    pub failures: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SessionState {
    rounds: Vec<Vec<BusinessRecord>>,
    last_query: Option<SearchQuery>,
    loading: bool,
    error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rounds(&self) -> &[Vec<BusinessRecord>] {
        &self.rounds
    }

    #[must_use]
    pub fn last_query(&self) -> Option<&SearchQuery> {
        self.last_query.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    /// Distinct names across every stored round, in first-seen order.
    #[must_use]
    pub fn accumulated_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rounds
            .iter()
            .flatten()
            .filter(|r| seen.insert(r.name.as_str()))
            .map(|r| r.name.clone())
            .collect()
    }

    /// Starts a round for `query` and marks the session as loading.
    ///
    /// A query that differs from the last one clears the stored rounds first,
    /// so a failed new search leaves an empty session rather than stale data.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] if a round is already in flight.
    pub fn begin_round(&mut self, query: SearchQuery) -> Result<RoundTicket, SessionError> {
        if self.loading {
            return Err(SessionError::Busy);
        }

        let is_new_search = self.last_query.as_ref() != Some(&query);
        if is_new_search {
            self.rounds.clear();
        }

        let exclude_names = if is_new_search {
            Vec::new()
        } else {
            self.accumulated_names()
        };

        self.loading = true;
        self.error = None;
        self.last_query = Some(query.clone());

        Ok(RoundTicket {
            query,
            is_new_search,
            exclude_names,
        })
    }

    /// Merges a settled round and stores it if it produced anything new.
    pub fn complete_round(&mut self, ticket: &RoundTicket, fetch: RoundFetch) -> RoundReport {
        self.loading = false;

        let merged = merge_results(fetch.ai, fetch.directory);
        let fresh: Vec<BusinessRecord> = {
            let existing: HashSet<&str> =
                self.rounds.iter().flatten().map(|r| r.name.as_str()).collect();
            merged
                .into_iter()
                .filter(|r| !existing.contains(r.name.as_str()))
                .collect()
        };

        let mut messages = fetch.failures;
        let round = if fresh.is_empty() {
            messages.push(
                if ticket.is_new_search {
                    NO_RESULTS_MESSAGE
                } else {
                    NO_MORE_RESULTS_MESSAGE
                }
                .to_string(),
            );
            None
        } else {
            if ticket.is_new_search {
                self.rounds = vec![fresh.clone()];
            } else {
                self.rounds.push(fresh.clone());
            }
            Some(self.rounds.len())
        };

        let message = (!messages.is_empty()).then(|| messages.join("\n"));
        self.error.clone_from(&message);

        tracing::info!(
            is_new_search = ticket.is_new_search,
            round = ?round,
            added = fresh.len(),
            total = self.total(),
            "search round complete"
        );

        RoundReport {
            is_new_search: ticket.is_new_search,
            round,
            records: fresh,
            total: self.total(),
            message,
        }
    }

    /// Ends an in-flight round without touching stored rounds.
    pub fn abort_round(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Explicit "new search": forget every round, the last query and the error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] while a round is in flight.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.loading {
            return Err(SessionError::Busy);
        }
        self.rounds.clear();
        self.last_query = None;
        self.error = None;
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            rounds: self.rounds.clone(),
            last_query: self.last_query.clone(),
            loading: self.loading,
            error: self.error.clone(),
            total: self.total(),
        }
    }
}

/// Turns one provider's outcome into records, recording a fragment on failure.
fn settle<E: std::error::Error>(
    label: &str,
    result: Result<Vec<BusinessRecord>, E>,
    failures: &mut Vec<String>,
) -> Vec<BusinessRecord> {
    match result {
        Ok(records) => {
            tracing::debug!(provider = label, count = records.len(), "provider search succeeded");
            records
        }
        Err(e) => {
            tracing::warn!(provider = label, error = %e, "provider search failed");
            failures.push(format!("{label} search failed: {e}"));
            Vec::new()
        }
    }
}

/// Calls both providers concurrently and waits for both to settle.
///
/// A provider error only empties that provider's contribution. A task that
/// panics or is cancelled fails the whole round.
async fn fetch_round<A, D>(
    ai: Arc<A>,
    directory: Arc<D>,
    ticket: &RoundTicket,
    location: Option<GeoPoint>,
) -> Result<RoundFetch, SessionError>
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    let ai_label = ai.label();
    let directory_label = directory.label();

    let ai_task = {
        let query = ticket.query.clone();
        let exclude = ticket.exclude_names.clone();
        tokio::spawn(async move { ai.find_businesses(&query, location, &exclude).await })
    };
    let directory_task = {
        let query = ticket.query.clone();
        tokio::spawn(async move { directory.find_businesses(&query, location).await })
    };

    let (ai_joined, directory_joined) = tokio::join!(ai_task, directory_task);
    let ai_result = ai_joined
        .map_err(|e| SessionError::Unexpected(format!("{ai_label} search task failed: {e}")))?;
    let directory_result = directory_joined.map_err(|e| {
        SessionError::Unexpected(format!("{directory_label} search task failed: {e}"))
    })?;

    let mut failures = Vec::new();
    let ai = settle(ai_label, ai_result, &mut failures);
    let directory = settle(directory_label, directory_result, &mut failures);

    Ok(RoundFetch {
        ai,
        directory,
        failures,
    })
}

/// Shared handle to one search session and its two providers.
///
/// Cloning is cheap; clones observe the same session.
pub struct SearchSession<A, D> {
    ai: Arc<A>,
    directory: Arc<D>,
    state: Arc<Mutex<SessionState>>,
}

impl<A, D> Clone for SearchSession<A, D> {
    fn clone(&self) -> Self {
        Self {
            ai: Arc::clone(&self.ai),
            directory: Arc::clone(&self.directory),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, D> SearchSession<A, D>
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    pub fn new(ai: A, directory: D) -> Self {
        Self {
            ai: Arc::new(ai),
            directory: Arc::new(directory),
            state: Arc::new(Mutex::new(SessionState::new())),
        }
    }

    /// Runs one search round for `query`.
    ///
    /// The round runs on its own task, so dropping the returned future does
    /// not leave the session stuck in the loading state.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Busy`] if another round is in flight.
    /// - [`SessionError::Unexpected`] if a provider task panicked; stored
    ///   rounds are left as they were when the round began.
    pub async fn search(
        &self,
        query: SearchQuery,
        location: Option<GeoPoint>,
    ) -> Result<RoundReport, SessionError> {
        let ticket = self.state.lock().await.begin_round(query)?;

        let ai = Arc::clone(&self.ai);
        let directory = Arc::clone(&self.directory);
        let state = Arc::clone(&self.state);

        let round = tokio::spawn(async move {
            match fetch_round(ai, directory, &ticket, location).await {
                Ok(fetch) => Ok(state.lock().await.complete_round(&ticket, fetch)),
                Err(e) => {
                    tracing::error!(error = %e, "search round aborted");
                    state.lock().await.abort_round(e.to_string());
                    Err(e)
                }
            }
        });

        round
            .await
            .map_err(|e| SessionError::Unexpected(format!("search round failed: {e}")))?
    }

    /// Clears the session for a brand-new search.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] while a round is in flight.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.state.lock().await.reset()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
