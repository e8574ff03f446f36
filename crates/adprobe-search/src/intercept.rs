//! Interception Controller: passive capture of outbound search requests.
//!
//! An [`Interceptor`] installs one route hook on a browser driver, records
//! the most recent matching request, and hands it over exactly once. The
//! hook always lets the request through unchanged.
//!
//! States:
//!
//! | State      | Hook installed | Request stored |
//! |------------|----------------|----------------|
//! | `Idle`     | no             | no             |
//! | `Armed`    | yes            | no             |
//! | `Captured` | yes            | yes            |
//!
//! `start` moves any state to `Armed` (replacing an existing hook),
//! a matching request moves `Armed`/`Captured` to `Captured`, and `stop` or
//! `take` move back to `Idle`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use tokio::sync::Notify;

use crate::error::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptState {
    Idle,
    Armed,
    Captured,
}

impl fmt::Display for InterceptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterceptState::Idle => write!(f, "idle"),
            InterceptState::Armed => write!(f, "armed"),
            InterceptState::Captured => write!(f, "captured"),
        }
    }
}

/// URL prefix a route hook is keyed by. Query strings and fragments of
/// candidate URLs are not considered when matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern(String);

impl RoutePattern {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    /// Pattern matching every request to `endpoint`, whatever its query.
    #[must_use]
    pub fn for_endpoint(endpoint: &Url) -> Self {
        let mut prefix = endpoint.clone();
        prefix.set_query(None);
        prefix.set_fragment(None);
        Self(prefix.into())
    }

    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path_part = url.split(['?', '#']).next().unwrap_or(url);
        path_part.starts_with(&self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An outbound request observed by a route hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub captured_at: DateTime<Utc>,
}

impl InterceptedRequest {
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            captured_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// # Errors
    ///
    /// Returns [`SearchError::InvalidUrl`] if the recorded URL is not absolute.
    pub fn parsed_url(&self) -> Result<Url, SearchError> {
        Url::parse(&self.url).map_err(|e| SearchError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }
}

/// What a route hook tells the driver to do with a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteAction {
    /// Send the request on unmodified.
    Continue,
}

pub type RouteHook = Arc<dyn Fn(&InterceptedRequest) -> RouteAction + Send + Sync>;

/// The part of a browser driver the interceptor needs.
///
/// Implementations must invoke the hook for every request whose URL the
/// pattern matches and then perform the returned [`RouteAction`]. Only one
/// hook per pattern is expected to be installed at a time.
pub trait RouteDriver {
    fn route(
        &self,
        pattern: &RoutePattern,
        hook: RouteHook,
    ) -> impl Future<Output = Result<(), SearchError>> + Send;

    fn unroute(&self, pattern: &RoutePattern)
        -> impl Future<Output = Result<(), SearchError>> + Send;
}

enum Slot {
    Idle,
    Armed,
    Captured(InterceptedRequest),
}

impl Slot {
    fn state(&self) -> InterceptState {
        match self {
            Slot::Idle => InterceptState::Idle,
            Slot::Armed => InterceptState::Armed,
            Slot::Captured(_) => InterceptState::Captured,
        }
    }
}

struct Shared {
    slot: Mutex<Slot>,
    arrived: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, pattern: &RoutePattern, request: &InterceptedRequest) {
        if !pattern.matches(&request.url) {
            return;
        }

        let mut slot = self.lock();
        match &*slot {
            Slot::Idle => {
                tracing::debug!(url = %request.url, "request reached a removed hook; not captured");
                return;
            }
            Slot::Captured(previous) => {
                tracing::warn!(
                    previous = %previous.url,
                    url = %request.url,
                    "second matching request before validation; keeping the latest"
                );
            }
            Slot::Armed => {}
        }
        tracing::debug!(method = %request.method, url = %request.url, "captured search request");
        *slot = Slot::Captured(request.clone());
        drop(slot);
        self.arrived.notify_waiters();
    }
}

/// Captures the next search request issued through a browser driver.
///
/// Owned by a single flow: the mutating operations take `&mut self`, so two
/// call sites cannot arm the same interceptor concurrently.
pub struct Interceptor<D> {
    driver: D,
    pattern: RoutePattern,
    shared: Arc<Shared>,
}

impl<D: RouteDriver> Interceptor<D> {
    #[must_use]
    pub fn new(driver: D, pattern: RoutePattern) -> Self {
        Self {
            driver,
            pattern,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot::Idle),
                arrived: Notify::new(),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> InterceptState {
        self.shared.lock().state()
    }

    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Installs the route hook. Requests issued before this returns are
    /// never captured. If a hook is already installed it is removed first
    /// and any captured request is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Driver`] if the driver cannot remove the old
    /// hook or install the new one. A failed removal leaves the previous
    /// session untouched; a failed installation leaves the interceptor idle.
    pub async fn start(&mut self) -> Result<(), SearchError> {
        let previous = self.state();
        if previous != InterceptState::Idle {
            tracing::debug!(
                pattern = %self.pattern,
                state = %previous,
                "replacing active interception hook"
            );
            self.driver.unroute(&self.pattern).await?;
        }

        self.replace_slot(Slot::Armed);
        let shared = Arc::clone(&self.shared);
        let pattern = self.pattern.clone();
        let hook: RouteHook = Arc::new(move |request: &InterceptedRequest| {
            shared.record(&pattern, request);
            RouteAction::Continue
        });

        if let Err(e) = self.driver.route(&self.pattern, hook).await {
            self.replace_slot(Slot::Idle);
            return Err(e);
        }

        tracing::info!(pattern = %self.pattern, "search request interception armed");
        Ok(())
    }

    /// Removes the hook and discards any captured request. Safe to call in
    /// any state; a no-op when idle.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Driver`] if the driver fails to remove the hook.
    /// The state is left unchanged so the call can be retried.
    pub async fn stop(&mut self) -> Result<(), SearchError> {
        let previous = self.state();
        if previous == InterceptState::Idle {
            return Ok(());
        }
        self.driver.unroute(&self.pattern).await?;
        self.replace_slot(Slot::Idle);
        tracing::info!(pattern = %self.pattern, state = %previous, "search request interception stopped");
        Ok(())
    }

    /// Hands over the captured request and stops interception.
    ///
    /// # Errors
    ///
    /// - [`SearchError::NoInterceptedRequest`] if nothing has been captured.
    /// - [`SearchError::Driver`] if the hook cannot be removed; the captured
    ///   request stays available.
    ///
    /// The state is left unchanged on either error.
    pub async fn take(&mut self) -> Result<InterceptedRequest, SearchError> {
        let state = self.state();
        if state != InterceptState::Captured {
            return Err(SearchError::NoInterceptedRequest { state });
        }
        self.driver.unroute(&self.pattern).await?;

        // With the hook gone nothing else can touch the slot.
        match std::mem::replace(&mut *self.shared.lock(), Slot::Idle) {
            Slot::Captured(request) => Ok(request),
            other => Err(SearchError::NoInterceptedRequest {
                state: other.state(),
            }),
        }
    }

    /// Waits until a request has been captured, at most `timeout`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::NoInterceptedRequest`] if the interceptor is idle.
    /// - [`SearchError::InterceptTimeout`] if nothing arrives in time.
    pub async fn wait_for_request(&self, timeout: Duration) -> Result<(), SearchError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.shared.arrived.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.state() {
                InterceptState::Captured => return Ok(()),
                InterceptState::Idle => {
                    return Err(SearchError::NoInterceptedRequest {
                        state: InterceptState::Idle,
                    })
                }
                InterceptState::Armed => {}
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Err(SearchError::InterceptTimeout {
                    pattern: self.pattern.to_string(),
                    waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
        }
    }

    fn replace_slot(&self, next: Slot) -> InterceptState {
        std::mem::replace(&mut *self.shared.lock(), next).state()
    }
}
