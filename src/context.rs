//! Credential contexts: the unit of parallelism for an audit run.

use crate::audit::ContextScope;
use crate::aws::Session;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// One authenticated view into one account.
///
/// Contexts are immutable once built. Cloning shares the underlying session,
/// which is safe to use from any task.
#[derive(Clone)]
pub struct CredentialContext {
    scope: ContextScope,
    session: Arc<dyn Session>,
    expires_at: Option<DateTime<Utc>>,
}

impl CredentialContext {
    /// Context for a locally configured profile.
    pub fn for_profile(profile: &str, session: Arc<dyn Session>) -> Self {
        Self {
            scope: ContextScope::profile(profile),
            session,
            expires_at: None,
        }
    }

    /// Context for a member account reached through role assumption.
    pub fn for_member_account(
        base_label: &str,
        account_id: &str,
        account_name: &str,
        session: Arc<dyn Session>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scope: ContextScope::account(
                format!("member-of-{}", base_label),
                account_id,
                account_name,
            ),
            session,
            expires_at: Some(expires_at),
        }
    }

    pub fn profile_label(&self) -> &str {
        &self.scope.profile_label
    }

    /// Empty for contexts that were not produced by organization expansion.
    pub fn account_id(&self) -> &str {
        &self.scope.account_id
    }

    pub fn account_name(&self) -> &str {
        &self.scope.account_name
    }

    pub fn scope(&self) -> &ContextScope {
        &self.scope
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    pub fn region(&self) -> &str {
        self.session.region()
    }

    /// Expiry of assumed-role credentials; `None` for base profiles.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("scope", &self.scope)
            .field("region", &self.session.region())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
