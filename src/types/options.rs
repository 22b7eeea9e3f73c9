//! Immutable runtime feature flags.
//!
//! [`Options`] travels inside the execution context and is replaced, never
//! mutated, when a region needs different behavior. Derived variants force a
//! flag on or off; [`Options::with_scheduler_features`] adapts the same
//! logical options value to the capabilities of the scheduler supplied at the
//! call site.
//!
//! # Environment Overrides
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic** — values set via the derivation methods
//! 2. **Environment variables** — `QUELL_*` overrides applied by
//!    [`Options::from_env`]
//! 3. **Defaults** — [`Options::default`]
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `QUELL_AUTO_CANCELABLE_RUN_LOOPS` | `bool` | `auto_cancelable_run_loops` |
//! | `QUELL_LOCAL_CONTEXT_PROPAGATION` | `bool` | `local_context_propagation` |

use crate::error::ConfigError;
use crate::runtime::Scheduler;

/// Environment variable name for the auto-cancelable run-loops flag.
pub const ENV_AUTO_CANCELABLE_RUN_LOOPS: &str = "QUELL_AUTO_CANCELABLE_RUN_LOOPS";
/// Environment variable name for the local context propagation flag.
pub const ENV_LOCAL_CONTEXT_PROPAGATION: &str = "QUELL_LOCAL_CONTEXT_PROPAGATION";

/// Immutable runtime feature flags.
///
/// Equality is structural; tests assert end-to-end propagation by comparing
/// the options read inside a region with the options installed outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
    /// Whether run loops insert automatic cancelable checkpoints.
    pub auto_cancelable_run_loops: bool,
    /// Whether local execution context is propagated across suspensions.
    pub local_context_propagation: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto_cancelable_run_loops: true,
            local_context_propagation: false,
        }
    }
}

impl Options {
    /// Returns a variant with `auto_cancelable_run_loops` forced off.
    ///
    /// Used when entering a masked region: a run loop that inserts automatic
    /// cancelable checkpoints would defeat the mask.
    #[must_use]
    pub const fn without_auto_cancel(self) -> Self {
        Self {
            auto_cancelable_run_loops: false,
            local_context_propagation: self.local_context_propagation,
        }
    }

    /// Returns a variant with `local_context_propagation` forced on.
    #[must_use]
    pub const fn enable_local_context(self) -> Self {
        Self {
            auto_cancelable_run_loops: self.auto_cancelable_run_loops,
            local_context_propagation: true,
        }
    }

    /// Adapts these options to the supplied scheduler's capabilities.
    ///
    /// When the scheduler advertises local-context tracing,
    /// `local_context_propagation` is forced on; otherwise the options are
    /// returned unchanged. The same logical options value thus behaves
    /// differently depending on which scheduler is in effect at the call
    /// site.
    #[must_use]
    pub fn with_scheduler_features(self, scheduler: &dyn Scheduler) -> Self {
        if scheduler.features().local_context_tracing && !self.local_context_propagation {
            self.enable_local_context()
        } else {
            self
        }
    }

    /// Builds options from the defaults with `QUELL_*` environment overrides
    /// applied.
    ///
    /// Only variables that are set in the environment are applied. Returns an
    /// error if a variable is set but contains an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Some(value) = read_env(ENV_AUTO_CANCELABLE_RUN_LOOPS) {
            options.auto_cancelable_run_loops =
                parse_bool(ENV_AUTO_CANCELABLE_RUN_LOOPS, &value)?;
        }
        if let Some(value) = read_env(ENV_LOCAL_CONTEXT_PROPAGATION) {
            options.local_context_propagation =
                parse_bool(ENV_LOCAL_CONTEXT_PROPAGATION, &value)?;
        }
        Ok(options)
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::LabScheduler;
    use crate::runtime::SchedulerFeatures;
    use crate::test_utils::{env_lock, init_test_logging};

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn defaults() {
        init_test("defaults");
        let options = Options::default();
        assert!(options.auto_cancelable_run_loops);
        assert!(!options.local_context_propagation);
        crate::test_complete!("defaults");
    }

    #[test]
    fn without_auto_cancel_preserves_other_flags() {
        init_test("without_auto_cancel_preserves_other_flags");
        let options = Options::default().enable_local_context().without_auto_cancel();
        assert!(!options.auto_cancelable_run_loops);
        assert!(options.local_context_propagation);
        crate::test_complete!("without_auto_cancel_preserves_other_flags");
    }

    #[test]
    fn scheduler_features_force_local_context() {
        init_test("scheduler_features_force_local_context");
        let plain = LabScheduler::new();
        let tracing = LabScheduler::with_features(SchedulerFeatures::TRACING);

        let options = Options::default();
        let under_plain = options.with_scheduler_features(&plain);
        crate::assert_with_log!(
            !under_plain.local_context_propagation,
            "capability-less scheduler leaves propagation off",
            false,
            under_plain.local_context_propagation
        );

        let under_tracing = options.with_scheduler_features(&tracing);
        crate::assert_with_log!(
            under_tracing.local_context_propagation,
            "tracing scheduler turns propagation on",
            true,
            under_tracing.local_context_propagation
        );
        crate::test_complete!("scheduler_features_force_local_context");
    }

    #[test]
    fn env_overrides_apply() {
        init_test("env_overrides_apply");
        let _guard = env_lock();
        std::env::set_var(ENV_AUTO_CANCELABLE_RUN_LOOPS, "off");
        std::env::set_var(ENV_LOCAL_CONTEXT_PROPAGATION, "1");
        let options = Options::from_env().expect("valid env values");
        std::env::remove_var(ENV_AUTO_CANCELABLE_RUN_LOOPS);
        std::env::remove_var(ENV_LOCAL_CONTEXT_PROPAGATION);

        assert!(!options.auto_cancelable_run_loops);
        assert!(options.local_context_propagation);
        crate::test_complete!("env_overrides_apply");
    }

    #[test]
    fn env_rejects_garbage() {
        init_test("env_rejects_garbage");
        let _guard = env_lock();
        std::env::set_var(ENV_LOCAL_CONTEXT_PROPAGATION, "maybe");
        let result = Options::from_env();
        std::env::remove_var(ENV_LOCAL_CONTEXT_PROPAGATION);

        match result {
            Err(ConfigError::InvalidBool { name, value }) => {
                assert_eq!(name, ENV_LOCAL_CONTEXT_PROPAGATION);
                assert_eq!(value, "maybe");
            }
            other => unreachable!("expected InvalidBool, got {other:?}"),
        }
        crate::test_complete!("env_rejects_garbage");
    }
}
