//! Configuration provider seam.
//!
//! A provider collects sensor count, sensor names, state meanings and fail
//! meanings from some front end and hands back a validated
//! [`SpecTableConfig`]. Cancelling is an outcome, not an error.

use crate::error::Result;
use crate::spec::SpecTableConfig;

/// Result of one collection session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCollectOutcome {
    /// Configuration is complete and validated.
    Ready(SpecTableConfig),
    /// The user backed out; nothing is generated.
    Cancelled,
}

/// Source of a table configuration.
pub trait ConfigurationProvider {
    /// Run one collection session.
    fn collect(&mut self) -> Result<EnumCollectOutcome>;
}

/// Provider returning a configuration built ahead of time.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    outcome: EnumCollectOutcome,
}

impl StaticProvider {
    pub fn ready(config: SpecTableConfig) -> Self {
        Self {
            outcome: EnumCollectOutcome::Ready(config),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            outcome: EnumCollectOutcome::Cancelled,
        }
    }
}

impl ConfigurationProvider for StaticProvider {
    fn collect(&mut self) -> Result<EnumCollectOutcome> {
        Ok(self.outcome.clone())
    }
}
