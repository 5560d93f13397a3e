//! Chainable success/failure values.
//!
//! An [`Outcome`] is what fallible operations across idpath return when
//! there is no value to hand back, only "did it work, and if not, why". It
//! behaves like a boolean that remembers an error message and the objects
//! implicated in the failure.
//!
//! ```
//! use idpath_types::Outcome;
//!
//! fn is_positive(n: i32) -> Outcome {
//!     Outcome::ensure(n > 0, "n is not positive")
//! }
//!
//! fn is_even(n: i32) -> Outcome {
//!     Outcome::ensure(n % 2 == 0, "n is not even")
//! }
//!
//! assert!(is_positive(4).and_then(|| is_even(4)).is_success());
//! assert_eq!(is_positive(-3).and_then(|| is_even(-3)).message(), "n is not positive");
//! ```
//!
//! # Equality
//!
//! Two outcomes compare equal when their success flags match. Messages and
//! sources are ignored, so two failures with different messages are equal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Not;

use thiserror::Error;

use crate::error::IdError;

/// Success or failure with an attached message and source attribution.
#[derive(Clone, Debug)]
pub struct Outcome {
    success: bool,
    message: String,
    sources: Vec<String>,
}

/// A failed [`Outcome`] converted into an error value, see
/// [`Outcome::into_result`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OutcomeError {
    pub message: String,
    pub sources: Vec<String>,
}

impl Outcome {
    /// Canonical success with no message.
    pub const SUCCESS: Outcome = Outcome {
        success: true,
        message: String::new(),
        sources: Vec::new(),
    };

    /// Canonical failure with no message.
    pub const EMPTY_FAIL: Outcome = Outcome {
        success: false,
        message: String::new(),
        sources: Vec::new(),
    };

    pub fn success() -> Self {
        Self::SUCCESS
    }

    pub fn empty_fail() -> Self {
        Self::EMPTY_FAIL
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            sources: Vec::new(),
        }
    }

    /// A failure whose source list starts with `source`.
    pub fn fail_with(message: impl Into<String>, source: impl fmt::Display) -> Self {
        Self {
            success: false,
            message: message.into(),
            sources: vec![source.to_string()],
        }
    }

    /// Success when `condition` holds, otherwise a failure with `message`.
    pub fn ensure(condition: bool, message: impl Into<String>) -> Self {
        if condition {
            Self::SUCCESS
        } else {
            Self::fail(message)
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// The error message. Empty on success.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Objects implicated in the failure, oldest first.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Conjunction: the first failure, or `other` when `self` succeeded.
    ///
    /// Returning `other` on success means a chain of checks reports the
    /// last one evaluated.
    pub fn and(self, other: Outcome) -> Outcome {
        if self.success {
            other
        } else {
            self
        }
    }

    /// Lazy [`and`](Self::and): `f` only runs when `self` succeeded.
    pub fn and_then(self, f: impl FnOnce() -> Outcome) -> Outcome {
        if self.success {
            f()
        } else {
            self
        }
    }

    /// Disjunction: the first success, or a failure combining both messages
    /// (newline separated) and both source lists.
    pub fn or(self, other: Outcome) -> Outcome {
        if self.success {
            return self;
        }
        if other.success {
            return other;
        }
        let mut combined = Outcome::fail(format!("{}\n{}", self.message, other.message));
        combined.sources = self.sources;
        for source in other.sources {
            combined.push_source(source);
        }
        combined
    }

    /// Lazy [`or`](Self::or): `f` only runs when `self` failed.
    pub fn or_else(self, f: impl FnOnce() -> Outcome) -> Outcome {
        if self.success {
            self
        } else {
            self.or(f())
        }
    }

    /// Attribute a failure to `source`. No-op on success, and a repeat of
    /// the most recent source is not recorded twice.
    pub fn append(mut self, source: impl fmt::Display) -> Outcome {
        if !self.success {
            self.push_source(source.to_string());
        }
        self
    }

    /// Convert into a `Result` so failures can be propagated with `?`.
    pub fn into_result(self) -> Result<(), OutcomeError> {
        if self.success {
            Ok(())
        } else {
            Err(OutcomeError {
                message: self.message,
                sources: self.sources,
            })
        }
    }

    fn push_source(&mut self, source: String) {
        if self.sources.last() != Some(&source) {
            self.sources.push(source);
        }
    }
}

impl PartialEq for Outcome {
    fn eq(&self, other: &Self) -> bool {
        self.success == other.success
    }
}

impl Eq for Outcome {}

impl Hash for Outcome {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.success.hash(state);
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<Outcome> for bool {
    fn from(outcome: Outcome) -> Self {
        outcome.success
    }
}

impl From<&Outcome> for bool {
    fn from(outcome: &Outcome) -> Self {
        outcome.success
    }
}

impl Not for Outcome {
    type Output = bool;

    fn not(self) -> bool {
        !self.success
    }
}

impl Not for &Outcome {
    type Output = bool;

    fn not(self) -> bool {
        !self.success
    }
}

impl<E: fmt::Display> From<Result<(), E>> for Outcome {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Outcome::success(),
            Err(e) => Outcome::fail(e.to_string()),
        }
    }
}

impl From<OutcomeError> for Outcome {
    fn from(err: OutcomeError) -> Self {
        Self {
            success: false,
            message: err.message,
            sources: err.sources,
        }
    }
}

impl From<IdError> for Outcome {
    fn from(err: IdError) -> Self {
        Outcome::fail(err.to_string())
    }
}
