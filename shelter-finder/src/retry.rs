//! Retry policy shared by the routing client and the geocoding runner.
//!
//! A policy is a retry budget (bounded or unbounded) plus a backoff shape.
//! Errors opt in to retrying through [`Retryable`]; anything else fails on
//! the first attempt.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Default delay between routing attempts.
const DEFAULT_ROUTE_DELAY: Duration = Duration::from_millis(500);

/// Default retry budget for routing calls.
const DEFAULT_ROUTE_RETRIES: u32 = 1;

/// Initial backoff for geocoding lookups.
const GEOCODE_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound on geocoding backoff.
const GEOCODE_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Errors that know whether another attempt might succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// `initial * factor^n`, capped.
    Exponential {
        initial: Duration,
        factor: u32,
        cap: Duration,
    },
}

impl Backoff {
    /// Delay before retry number `retry` (0 for the first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential {
                initial,
                factor,
                cap,
            } => initial
                .saturating_mul(factor.saturating_pow(retry))
                .min(cap),
        }
    }
}

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `None` retries forever.
    max_retries: Option<u32>,
    backoff: Backoff,
}

/// Failure after the policy gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was not retryable.
    Fatal { attempts: u32, error: E },
    /// The retry budget ran out.
    Exhausted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Fatal { attempts, .. } | RetryError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The last underlying error.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal { error, .. } => error,
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

impl RetryPolicy {
    /// A bounded policy with a fixed delay.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: Some(max_retries),
            backoff: Backoff::Fixed(delay),
        }
    }

    /// A policy that never stops retrying retryable errors.
    pub fn unbounded(backoff: Backoff) -> Self {
        Self {
            max_retries: None,
            backoff,
        }
    }

    /// One retry after 500ms.
    pub fn route_default() -> Self {
        Self::fixed(DEFAULT_ROUTE_RETRIES, DEFAULT_ROUTE_DELAY)
    }

    /// Unbounded, starting at 1s and doubling up to 30s.
    pub fn geocode_default() -> Self {
        Self::unbounded(Backoff::Exponential {
            initial: GEOCODE_INITIAL_BACKOFF,
            factor: 2,
            cap: GEOCODE_MAX_BACKOFF,
        })
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// budget runs out.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let error = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(RetryError::Fatal {
                    attempts: attempt,
                    error,
                });
            }

            let retries_used = attempt - 1;
            if self.max_retries.is_some_and(|max| retries_used >= max) {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            let delay = self.backoff.delay(retries_used);
            warn!(attempt, ?delay, error = %error, "attempt failed; retrying");
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::route_default()
    }
}
