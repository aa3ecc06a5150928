//! Provider-facing traits and the plain data they return.
//!
//! The engine never talks to the AWS SDK directly. Everything goes through
//! these traits so the resolver, expander and dispatcher can be driven by the
//! real SDK backend ([`crate::aws::client`]) or by an in-memory backend in
//! tests.

use super::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// An IAM user as far as the audit is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
}

/// Metadata for one access key belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMetadata {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of a last-used lookup for a single access key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLastUsed {
    pub owning_user: String,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// A member account discovered through AWS Organizations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: String,
    pub name: String,
}

/// Short-lived credentials returned by a role assumption.
///
/// The expiry is kept explicitly; contexts built from these credentials are
/// never renewed.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl std::fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Identity provider (IAM) operations used by the audit commands.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// All users in the account, across every page.
    async fn list_users(&self) -> Result<Vec<User>, ProviderError>;

    /// Fails with [`ProviderError::NotFound`] when the user does not exist.
    async fn get_user(&self, name: &str) -> Result<User, ProviderError>;

    async fn list_access_keys(&self, user: &str) -> Result<Vec<KeyMetadata>, ProviderError>;

    /// Fails with [`ProviderError::AccessDenied`] when the key belongs to an
    /// account the caller cannot see.
    async fn get_access_key_last_used(&self, key_id: &str) -> Result<KeyLastUsed, ProviderError>;

    /// Names of the managed policies attached to the user, in provider order.
    async fn list_attached_policies(&self, user: &str) -> Result<Vec<String>, ProviderError>;
}

/// AWS Organizations operations used to expand into member accounts.
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    /// Returns the management account ID.
    async fn describe_organization(&self) -> Result<String, ProviderError>;

    /// Every account in the organization, management account included.
    async fn list_accounts(&self) -> Result<Vec<AccountInfo>, ProviderError>;
}

#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
        duration_seconds: i32,
    ) -> Result<TemporaryCredentials, ProviderError>;
}

/// An authenticated session against one account.
pub trait Session: Send + Sync {
    fn region(&self) -> &str;

    fn identity(&self) -> &dyn IdentityApi;

    fn organizations(&self) -> &dyn OrganizationApi;

    fn roles(&self) -> &dyn RoleAssumer;

    /// Build a new session in the same region from assumed-role credentials.
    fn derive(&self, credentials: &TemporaryCredentials)
        -> Result<Arc<dyn Session>, ProviderError>;
}

/// Builds base sessions from named credential profiles.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn connect(&self, profile: &str, region: &str) -> Result<Arc<dyn Session>, ProviderError>;
}
