use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Full-text retrieval status of a citation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    NotDownloaded,
    Validated,
    Invalidated,
    ManualCheckRequired,
    NoAccess,
}

impl ValidationState {
    pub const ALL: [ValidationState; 5] = [
        ValidationState::NotDownloaded,
        ValidationState::Validated,
        ValidationState::Invalidated,
        ValidationState::ManualCheckRequired,
        ValidationState::NoAccess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::NotDownloaded => "not_downloaded",
            ValidationState::Validated => "validated",
            ValidationState::Invalidated => "invalidated",
            ValidationState::ManualCheckRequired => "manual_check_required",
            ValidationState::NoAccess => "no_access",
        }
    }

    /// States that carry the path of the checked file
    pub fn records_location(&self) -> bool {
        matches!(self, ValidationState::Validated | ValidationState::Invalidated)
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValidationState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match ValidationState::ALL.iter().find(|state| state.as_str() == s) {
            Some(state) => Ok(*state),
            None => bail!("Unknown validation state '{}'", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serde() {
        for state in ValidationState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json.trim_matches('"'), state.as_str());
            assert_eq!(state.as_str().parse::<ValidationState>().unwrap(), state);
        }
    }

    #[test]
    fn test_unknown_state() {
        assert!("yes".parse::<ValidationState>().is_err());
    }

    #[test]
    fn test_only_checked_states_record_location() {
        assert!(ValidationState::Validated.records_location());
        assert!(ValidationState::Invalidated.records_location());
        assert!(!ValidationState::ManualCheckRequired.records_location());
        assert!(!ValidationState::NoAccess.records_location());
    }
}
