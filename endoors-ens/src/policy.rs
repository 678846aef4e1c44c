//! What to do when an availability lookup fails.
//!
//! Production propagates the failure. Development deployments may choose to
//! treat the label as available so the rest of the flow can be exercised
//! against a flaky endpoint; the answer is then tagged as assumed.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use endoors_core::config::NamingConfig;
use endoors_core::error::EndoorsError;
use endoors_core::types::Label;

/// Outcome of a [`LookupFailurePolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupFailureDecision {
    /// Report the label as available, tagged as assumed.
    AssumeAvailable,
    /// Return the lookup error to the caller.
    Propagate,
}

/// Decides how an availability lookup failure is surfaced.
pub trait LookupFailurePolicy: Send + Sync + fmt::Debug {
    /// Called once per failed availability lookup.
    fn on_lookup_failure(&self, label: &Label, error: &EndoorsError) -> LookupFailureDecision;

    /// Short name for logs and the config endpoint.
    fn name(&self) -> &'static str;
}

/// Always propagates lookup failures.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictPolicy;

impl LookupFailurePolicy for StrictPolicy {
    fn on_lookup_failure(&self, _label: &Label, _error: &EndoorsError) -> LookupFailureDecision {
        LookupFailureDecision::Propagate
    }

    fn name(&self) -> &'static str {
        "strict"
    }
}

/// Assumes availability when the registrar cannot be reached.
#[derive(Clone, Copy, Debug, Default)]
pub struct DevModePolicy;

impl LookupFailurePolicy for DevModePolicy {
    fn on_lookup_failure(&self, label: &Label, error: &EndoorsError) -> LookupFailureDecision {
        warn!(
            %label,
            error = %error,
            "Availability lookup failed; assuming available (development mode)"
        );
        LookupFailureDecision::AssumeAvailable
    }

    fn name(&self) -> &'static str {
        "dev_mode"
    }
}

/// Selects the policy for a configuration.
pub fn policy_for(config: &NamingConfig) -> Arc<dyn LookupFailurePolicy> {
    if config.dev_mode {
        Arc::new(DevModePolicy)
    } else {
        Arc::new(StrictPolicy)
    }
}
