//! State Poller
//!
//! One reusable wait loop: query a resource until a predicate holds, the
//! provider reports it gone, or the deadline elapses.

use crate::backoff::FibonacciBackoff;
use crate::config::{BackoffStrategy, PollConfig};
use cloud_driver::CloudError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Positive terminal signal of a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The predicate held for this observation
    Reached(T),
    /// The provider no longer knows the resource
    Gone,
}

impl<T> PollOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PollOutcome<U> {
        match self {
            Self::Reached(value) => PollOutcome::Reached(f(value)),
            Self::Gone => PollOutcome::Gone,
        }
    }
}

enum Delay {
    Fixed(Duration),
    Fibonacci(FibonacciBackoff),
}

impl Delay {
    fn new(config: &PollConfig) -> Self {
        match config.backoff {
            BackoffStrategy::Fixed => Self::Fixed(config.interval),
            BackoffStrategy::Fibonacci => Self::Fibonacci(FibonacciBackoff::new(config.interval, config.max_interval)),
        }
    }

    fn next(&mut self) -> Duration {
        match self {
            Self::Fixed(interval) => *interval,
            Self::Fibonacci(backoff) => backoff.next_backoff(),
        }
    }
}

/// Reusable wait loop bounded by a [`PollConfig`]
#[derive(Debug, Clone, Copy)]
pub struct StatePoller {
    config: PollConfig,
}

impl StatePoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll `fetch` until `reached` holds for its result
    ///
    /// `ResourceNotFound` ends the wait with [`PollOutcome::Gone`];
    /// `ServiceUnavailable` counts as still in progress; any other error is
    /// returned as is. Returns `CloudError::Timeout` once the deadline elapses,
    /// and `InvalidRequest` without polling when the interval or timeout is zero.
    pub async fn wait_for<T, F, Fut, P>(&self, resource: &str, fetch: F, reached: P) -> Result<PollOutcome<T>, CloudError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CloudError>>,
        P: Fn(&T) -> bool,
    {
        self.config.validate()?;
        let deadline = self.config.timeout;
        match tokio::time::timeout(deadline, self.poll(resource, fetch, reached)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(resource, timeout = ?deadline, "Gave up waiting for resource to settle");
                Err(CloudError::Timeout(format!("{resource} did not settle within {deadline:?}")))
            }
        }
    }

    async fn poll<T, F, Fut, P>(&self, resource: &str, mut fetch: F, reached: P) -> Result<PollOutcome<T>, CloudError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CloudError>>,
        P: Fn(&T) -> bool,
    {
        let mut delay = Delay::new(&self.config);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match fetch().await {
                Ok(value) if reached(&value) => {
                    debug!(resource, attempt, "Resource reached target state");
                    return Ok(PollOutcome::Reached(value));
                }
                Ok(_) => debug!(resource, attempt, "Resource still in progress"),
                Err(e) if e.is_not_found() => {
                    debug!(resource, attempt, "Resource is gone");
                    return Ok(PollOutcome::Gone);
                }
                Err(e) if e.is_transient() => warn!(resource, attempt, error = %e, "Transient error while polling"),
                Err(e) => return Err(e),
            }

            tokio::time::sleep(delay.next()).await;
        }
    }
}
