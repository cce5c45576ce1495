//! Latest-only view over a sequence of query results.
//!
//! A UI that re-runs a query as the user types (search, filters, paging)
//! must only ever show the result of the most recent run. Each call to
//! [`QueryObserver::observe`] takes a new generation; a result that comes
//! back after a newer generation started is dropped.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::lock;
use crate::errors::{ClientError, ClientResult};

/// What the observer currently shows.
#[derive(Debug)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Ready(Arc<T>),
    Failed(ClientError),
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Idle => QueryState::Idle,
            QueryState::Loading => QueryState::Loading,
            QueryState::Ready(data) => QueryState::Ready(data.clone()),
            QueryState::Failed(err) => QueryState::Failed(err.clone()),
        }
    }
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            QueryState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

pub struct QueryObserver<T> {
    generation: Mutex<u64>,
    state: watch::Sender<QueryState<T>>,
}

impl<T> Default for QueryObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryObserver<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            generation: Mutex::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    /// Run `fetch` as the newest generation. Returns false when a newer call
    /// or [`cancel`](Self::cancel) superseded it and its result was dropped.
    pub async fn observe<Fut>(&self, fetch: Fut) -> bool
    where
        Fut: Future<Output = ClientResult<Arc<T>>>,
    {
        let ticket = {
            let mut generation = lock(&self.generation);
            *generation += 1;
            self.state.send_replace(QueryState::Loading);
            *generation
        };

        let outcome = fetch.await;

        let generation = lock(&self.generation);
        if *generation != ticket {
            tracing::debug!(
                "Dropping result of generation {} (current {})",
                ticket,
                *generation
            );
            return false;
        }
        self.state.send_replace(match outcome {
            Ok(data) => QueryState::Ready(data),
            Err(err) => QueryState::Failed(err),
        });
        true
    }

    /// Supersede whatever is running and go back to idle.
    pub fn cancel(&self) {
        let mut generation = lock(&self.generation);
        *generation += 1;
        self.state.send_replace(QueryState::Idle);
    }
}
