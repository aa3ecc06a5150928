//! Run configuration shared by the resolver and the executor.

use crate::error::AuditError;
use clap::ValueEnum;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_ROLE_NAME: &str = "OrganizationAccountAccessRole";
pub const DEFAULT_USER_CONCURRENCY: usize = 8;

/// Lifetime requested for assumed-role credentials (15 minutes, the STS minimum).
pub const ASSUMED_ROLE_DURATION_SECS: i32 = 900;

/// How individual profile/account failures affect the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Record failures as warnings and keep going; fail only if nothing succeeds.
    #[default]
    BestEffort,
    /// Abort on the first profile or account failure.
    FailFast,
}

/// Which profiles to start from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSelection {
    /// Explicitly requested profiles; order kept, duplicates allowed.
    pub profiles: Vec<String>,
    /// Use every profile in the local config instead of `profiles`.
    pub all_profiles: bool,
    /// Assume into every member account of each profile's organization.
    pub expand_organization: bool,
}

impl ProfileSelection {
    pub fn profiles<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            profiles: profiles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_organization(mut self) -> Self {
        self.expand_organization = true;
        self
    }

    /// Reject incompatible operating modes before any work is done.
    ///
    /// # Errors
    ///
    /// [`AuditError::ConflictingModes`] when both `all_profiles` and
    /// `expand_organization` are set, [`AuditError::NoProfiles`] when no
    /// profile was requested at all.
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.all_profiles && self.expand_organization {
            return Err(AuditError::ConflictingModes);
        }
        if !self.all_profiles && self.profiles.is_empty() {
            return Err(AuditError::NoProfiles);
        }
        Ok(())
    }
}

/// Settings for one audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub region: String,
    /// Role assumed in member accounts during organization expansion.
    pub role_name: String,
    pub failure_policy: FailurePolicy,
    /// Maximum number of users collected concurrently within one context.
    pub user_concurrency: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            role_name: DEFAULT_ROLE_NAME.to_string(),
            failure_policy: FailurePolicy::default(),
            user_concurrency: DEFAULT_USER_CONCURRENCY,
        }
    }
}

impl AuditConfig {
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}
