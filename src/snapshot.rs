use crate::config::Configuration;
use serde::Serialize;
use std::ops::Deref;

/// Frozen copy of the configuration taken when a run starts.
///
/// Owns every value, so later edits to the live configuration cannot reach a
/// run that is already in progress. There are no mutators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    config: Configuration,
}

pub fn snapshot(live: &Configuration) -> ConfigSnapshot {
    ConfigSnapshot {
        config: live.clone(),
    }
}

impl ConfigSnapshot {
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn into_config(self) -> Configuration {
        self.config
    }
}

impl Deref for ConfigSnapshot {
    type Target = Configuration;

    fn deref(&self) -> &Configuration {
        &self.config
    }
}
