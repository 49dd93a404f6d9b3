//! Retry policy for transient backend failures.

/// Bounded retry applied around adapter construction and invocation.
///
/// Only errors reported as transient (unreachable backend, timeout) are
/// retried. Each attempt builds a fresh adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self { max_attempts: 1 }
    }

    /// A policy that makes up to `max_attempts` attempts. Zero is treated
    /// as one.
    #[must_use]
    pub const fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    /// Returns the total number of attempts allowed.
    #[must_use]
    pub const fn max_attempts(self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` when another attempt may follow attempt number
    /// `completed` (counting from one).
    #[must_use]
    pub const fn allows(self, completed: u32) -> bool {
        completed < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
