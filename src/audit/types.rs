//! Data structures produced by an audit run.
//!
//! A run yields a flat list of [`KeyRecord`]s, one per access key (or one
//! placeholder per keyless user), plus the [`Warning`]s collected from
//! profiles and accounts that could not be audited.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used for key fields of users without access keys.
pub const NOT_APPLICABLE: &str = "N/A";

/// Last-used value for keys the provider has no usage record for.
pub const NEVER_USED: &str = "Never Used";

/// One row of audit output.
///
/// # Fields
///
/// - `key_id`: access key ID, or `"N/A"` for a user with no keys
/// - `creation_date`: rendered creation timestamp, or `"N/A"`
/// - `last_used_date`: rendered timestamp, `"Never Used"`, or `"N/A"`
/// - `policies`: attached managed policy names in provider order
/// - `profile`: label of the context the record came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub user: String,
    pub key_id: String,
    pub creation_date: String,
    pub last_used_date: String,
    pub policies: Vec<String>,
    pub profile: String,
    pub account_id: String,
    pub account_name: String,
}

impl KeyRecord {
    /// The single record emitted for a user with no access keys.
    pub fn placeholder(user: &str, policies: Vec<String>, scope: &ContextScope) -> Self {
        Self {
            user: user.to_string(),
            key_id: NOT_APPLICABLE.to_string(),
            creation_date: NOT_APPLICABLE.to_string(),
            last_used_date: NOT_APPLICABLE.to_string(),
            policies,
            profile: scope.profile_label.clone(),
            account_id: scope.account_id.clone(),
            account_name: scope.account_name.clone(),
        }
    }

    /// Stable presentation order: profile, then user, then key.
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (&self.profile, &self.user, &self.key_id)
    }
}

/// Identifies the context a record, warning or failure belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextScope {
    pub profile_label: String,
    pub account_id: String,
    pub account_name: String,
}

impl ContextScope {
    pub fn profile(label: impl Into<String>) -> Self {
        Self {
            profile_label: label.into(),
            ..Self::default()
        }
    }

    pub fn account(label: impl Into<String>, account_id: &str, account_name: &str) -> Self {
        Self {
            profile_label: label.into(),
            account_id: account_id.to_string(),
            account_name: account_name.to_string(),
        }
    }
}

impl fmt::Display for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile {}", self.profile_label)?;
        match (self.account_name.is_empty(), self.account_id.is_empty()) {
            (true, true) => Ok(()),
            (true, false) => write!(f, " (account {})", self.account_id),
            (false, true) => write!(f, " (account {})", self.account_name),
            (false, false) => write!(f, " (account {} / {})", self.account_name, self.account_id),
        }
    }
}

/// A non-fatal failure attributed to one profile or account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub scope: ContextScope,
    pub message: String,
}

impl Warning {
    pub fn new(scope: ContextScope, message: impl Into<String>) -> Self {
        Self {
            scope,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.message)
    }
}

/// Outcome of a successful audit run.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub records: Vec<KeyRecord>,
    pub warnings: Vec<Warning>,
}

impl AuditReport {
    pub fn sort(&mut self) {
        self.records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }
}
