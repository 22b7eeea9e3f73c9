//! Error types for the cancellation core.
//!
//! The runtime distinguishes three failure channels:
//!
//! - **Typed domain errors** (`E`): expected, recoverable, carried on the
//!   dedicated error channel of [`Outcome`](crate::types::Outcome)
//! - **Defects**: fatal, unexpected failures outside `E`
//! - **Lost signals**: completions that arrived after a race already
//!   resolved; errors and defects among them are rerouted to the scheduler's
//!   failure sink as defects, never silently dropped
//!
//! [`ConfigError`] covers environment-variable configuration failures.

use core::fmt;
use thiserror::Error;

/// A fatal defect: an unexpected, terminal failure that is not part of the
/// typed error channel.
///
/// Defects carry a message payload for transport across task boundaries.
/// They reach the ultimate consumer through
/// [`Callback::on_termination`](crate::callback::Callback::on_termination),
/// or the scheduler's failure sink when they lose a completion race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defect {
    message: String,
}

impl Defect {
    /// Creates a new defect with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps a typed error that lost a completion race.
    ///
    /// The error was produced by real work after the region's outcome was
    /// already decided; it is rerouted to the failure sink in this form.
    #[must_use]
    pub fn lost_error(detail: impl fmt::Display) -> Self {
        Self {
            message: format!("typed error lost after resolution: {detail}"),
        }
    }

    /// Returns the defect message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "defect: {}", self.message)
    }
}

impl std::error::Error for Defect {}

/// Error applying environment-variable configuration overrides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable was set to a value that does not parse as a
    /// boolean.
    #[error("invalid boolean for {name}: {value:?} (expected true/false/1/0/on/off)")]
    InvalidBool {
        /// The environment variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn defect_display_includes_message() {
        init_test("defect_display_includes_message");
        let defect = Defect::new("boom");
        let rendered = defect.to_string();
        crate::assert_with_log!(
            rendered.contains("boom"),
            "defect display carries message",
            "boom",
            rendered
        );
        crate::test_complete!("defect_display_includes_message");
    }

    #[test]
    fn lost_error_is_marked() {
        init_test("lost_error_is_marked");
        let defect = Defect::lost_error("late failure");
        let contains = defect.message().contains("lost after resolution");
        crate::assert_with_log!(
            contains,
            "lost errors are identifiable",
            true,
            contains
        );
        crate::test_complete!("lost_error_is_marked");
    }

    #[test]
    fn config_error_names_variable() {
        init_test("config_error_names_variable");
        let err = ConfigError::InvalidBool {
            name: "QUELL_LOCAL_CONTEXT_PROPAGATION",
            value: "maybe".to_string(),
        };
        let rendered = err.to_string();
        crate::assert_with_log!(
            rendered.contains("QUELL_LOCAL_CONTEXT_PROPAGATION"),
            "config error names the variable",
            "QUELL_LOCAL_CONTEXT_PROPAGATION",
            rendered
        );
        crate::test_complete!("config_error_names_variable");
    }
}
