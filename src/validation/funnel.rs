use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::Path;

use super::ValidationState;

/// Records per validation state, for PRISMA-style funnel reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunnelCounts {
    counts: BTreeMap<ValidationState, usize>,
}

impl FunnelCounts {
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = ValidationState>,
    {
        let mut funnel = Self::default();
        for state in states {
            funnel.increment(state);
        }
        funnel
    }

    pub fn increment(&mut self, state: ValidationState) {
        *self.counts.entry(state).or_insert(0) += 1;
    }

    pub fn get(&self, state: ValidationState) -> usize {
        self.counts.get(&state).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write funnel counts: {}", path.display()))
    }
}

impl Serialize for FunnelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ValidationState::ALL.len()))?;
        for state in ValidationState::ALL {
            map.serialize_entry(state.as_str(), &self.get(state))?;
        }
        map.end()
    }
}
