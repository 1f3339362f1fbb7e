//! Bounded exponential-backoff connection to a record store.

use std::cell::Cell;
use std::fmt;
use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};

use crate::error::StoreError;

/// How hard to try before giving up on the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never waits; useful in tests.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            factor: 1.0,
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_attempts.max(1) - 1)
    }
}

/// Terminal connection failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Every attempt found the store unavailable.
    Exhausted {
        attempts: usize,
        last_error: StoreError,
    },
    /// The store answered with an error that retrying will not fix.
    Rejected(StoreError),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::Exhausted {
                attempts,
                last_error,
            } => write!(
                f,
                "gave up connecting after {} attempts: {}",
                attempts, last_error
            ),
            ConnectError::Rejected(err) => write!(f, "connection rejected: {}", err),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::Exhausted { last_error, .. } => Some(last_error),
            ConnectError::Rejected(err) => Some(err),
        }
    }
}

/// Where the application stands with its store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected {
        attempts: usize,
    },
    Exhausted {
        attempts: usize,
        last_error: StoreError,
    },
    Rejected(StoreError),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// True once connecting has failed for good; the user has to reload.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            ConnectionState::Exhausted { .. } | ConnectionState::Rejected(_)
        )
    }
}

impl From<ConnectError> for ConnectionState {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Exhausted {
                attempts,
                last_error,
            } => ConnectionState::Exhausted {
                attempts,
                last_error,
            },
            ConnectError::Rejected(err) => ConnectionState::Rejected(err),
        }
    }
}

/// Run `attempt` until it succeeds, retrying only [`StoreError::Unavailable`].
///
/// Returns the value together with the number of attempts it took.
pub fn connect<T, F>(policy: &RetryPolicy, mut attempt: F) -> Result<(T, usize), ConnectError>
where
    F: FnMut() -> Result<T, StoreError>,
{
    let attempts = Cell::new(0usize);
    let result = (|| {
        attempts.set(attempts.get() + 1);
        attempt()
    })
    .retry(policy.backoff())
    .sleep(std::thread::sleep)
    .when(StoreError::is_retryable)
    .notify(|err: &StoreError, delay: Duration| {
        tracing::warn!(
            attempt = attempts.get(),
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "record store not ready, retrying"
        );
    })
    .call();

    let attempts = attempts.get();
    match result {
        Ok(value) => {
            tracing::info!(attempts, "connected to record store");
            Ok((value, attempts))
        }
        Err(err) if err.is_retryable() => {
            tracing::error!(attempts, error = %err, "record store unavailable, giving up");
            Err(ConnectError::Exhausted {
                attempts,
                last_error: err,
            })
        }
        Err(err) => {
            tracing::error!(attempts, error = %err, "record store rejected connection");
            Err(ConnectError::Rejected(err))
        }
    }
}
