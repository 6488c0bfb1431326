//! Transport layer for Energy Tracker requests
//!
//! Two variants share the same contract:
//! - [`HttpTransport`]: async, backed by `reqwest::Client`
//! - [`BlockingHttpTransport`]: blocking, backed by `reqwest::blocking::Client`
//!
//! A transport returns the response envelope for every HTTP status; the
//! client classifies error statuses. Only failures without a server
//! response (connect errors, timeouts) are reported by the transport
//! itself.

mod blocking;
mod http;

pub use blocking::BlockingHttpTransport;
pub use http::HttpTransport;

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::request::{ApiRequest, ApiResponse};

/// Async request execution
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Release the connection resource
    ///
    /// Idempotent. Returns `true` only for the call that released it.
    fn close(&self) -> bool;
}

/// Blocking request execution
pub trait BlockingTransport: Send + Sync {
    /// Send a request and return the raw response
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Release the connection resource
    ///
    /// Idempotent. Returns `true` only for the call that released it.
    fn close(&self) -> bool;
}

enum SlotState<C> {
    Idle,
    Open(C),
    Closed,
}

/// Lazily created, closable holder for a pooled HTTP client
///
/// The lock is only held while the handle is cloned, created or dropped,
/// never while a request is in flight.
pub(crate) struct ConnectionSlot<C> {
    state: Mutex<SlotState<C>>,
}

impl<C: Clone> ConnectionSlot<C> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Idle),
        }
    }

    /// Get the pooled client, creating it on first use
    pub(crate) fn acquire(&self, build: impl FnOnce() -> Result<C>) -> Result<C> {
        let mut state = self.state.lock();
        match &*state {
            SlotState::Open(client) => Ok(client.clone()),
            SlotState::Closed => Err(Error::Closed),
            SlotState::Idle => {
                let client = build()?;
                tracing::debug!("Created HTTP connection pool");
                *state = SlotState::Open(client.clone());
                Ok(client)
            }
        }
    }

    /// Move to the closed state, dropping the pooled client
    ///
    /// Returns the previous client (if one was created) together with
    /// whether this call performed the transition.
    pub(crate) fn close(&self) -> (Option<C>, bool) {
        let previous = std::mem::replace(&mut *self.state.lock(), SlotState::Closed);
        match previous {
            SlotState::Open(client) => (Some(client), true),
            SlotState::Idle => (None, true),
            SlotState::Closed => (None, false),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(&*self.state.lock(), SlotState::Open(_))
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(&*self.state.lock(), SlotState::Closed)
    }
}

/// Map a reqwest failure onto the network error kinds
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout)
    } else {
        Error::Network(err.to_string())
    }
}
