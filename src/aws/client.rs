//! AWS SDK backed implementation of the provider traits.
//!
//! One [`AwsSession`] wraps an [`SdkConfig`] together with the IAM,
//! Organizations and STS clients built from it. Base sessions come from named
//! profiles via [`AwsSessionProvider`]; member-account sessions are derived
//! from assumed-role credentials and inherit the base session's region.

use super::api::{
    AccountInfo, IdentityApi, KeyLastUsed, KeyMetadata, OrganizationApi, RoleAssumer, Session,
    SessionProvider, TemporaryCredentials, User,
};
use super::error::{classify, ProviderError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_iam::primitives::DateTime as SmithyDateTime;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Provider name attached to assumed-role credentials.
const CREDENTIALS_SOURCE: &str = "ratkiez-assume-role";

fn to_chrono(dt: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// Builds sessions from the shared AWS config/credentials files.
#[derive(Debug, Clone, Default)]
pub struct AwsSessionProvider;

#[async_trait]
impl SessionProvider for AwsSessionProvider {
    async fn connect(&self, profile: &str, region: &str) -> Result<Arc<dyn Session>, ProviderError> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile)
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let session = AwsSession::new(config, region);

        // Credentials are resolved lazily by the SDK; force resolution here so
        // a broken profile fails at construction instead of mid-scan.
        let identity = session
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| classify("GetCallerIdentity", e))?;
        debug!(
            profile,
            account = identity.account().unwrap_or_default(),
            "validated profile credentials"
        );

        Ok(Arc::new(session))
    }
}

pub struct AwsSession {
    config: SdkConfig,
    region: String,
    iam: aws_sdk_iam::Client,
    organizations: aws_sdk_organizations::Client,
    sts: aws_sdk_sts::Client,
}

impl AwsSession {
    pub fn new(config: SdkConfig, region: &str) -> Self {
        Self {
            iam: aws_sdk_iam::Client::new(&config),
            organizations: aws_sdk_organizations::Client::new(&config),
            sts: aws_sdk_sts::Client::new(&config),
            region: region.to_string(),
            config,
        }
    }
}

impl Session for AwsSession {
    fn region(&self) -> &str {
        &self.region
    }

    fn identity(&self) -> &dyn IdentityApi {
        self
    }

    fn organizations(&self) -> &dyn OrganizationApi {
        self
    }

    fn roles(&self) -> &dyn RoleAssumer {
        self
    }

    fn derive(
        &self,
        credentials: &TemporaryCredentials,
    ) -> Result<Arc<dyn Session>, ProviderError> {
        let expiry: SystemTime = credentials.expiration.into();
        let static_credentials = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            Some(expiry),
            CREDENTIALS_SOURCE,
        );
        let config = self
            .config
            .to_builder()
            .credentials_provider(SharedCredentialsProvider::new(static_credentials))
            .build();
        Ok(Arc::new(AwsSession::new(config, &self.region)))
    }
}

#[async_trait]
impl IdentityApi for AwsSession {
    async fn list_users(&self) -> Result<Vec<User>, ProviderError> {
        let mut pages = self.iam.list_users().into_paginator().items().send();
        let mut users = Vec::new();
        while let Some(user) = pages.next().await {
            let user = user.map_err(|e| classify("ListUsers", e))?;
            users.push(User {
                name: user.user_name().to_string(),
            });
        }
        Ok(users)
    }

    async fn get_user(&self, name: &str) -> Result<User, ProviderError> {
        self.iam
            .get_user()
            .user_name(name)
            .send()
            .await
            .map_err(|e| classify("GetUser", e))?;
        Ok(User {
            name: name.to_string(),
        })
    }

    async fn list_access_keys(&self, user: &str) -> Result<Vec<KeyMetadata>, ProviderError> {
        let mut pages = self
            .iam
            .list_access_keys()
            .user_name(user)
            .into_paginator()
            .items()
            .send();
        let mut keys = Vec::new();
        while let Some(key) = pages.next().await {
            let key = key.map_err(|e| classify("ListAccessKeys", e))?;
            let id = key.access_key_id().ok_or(ProviderError::MissingField {
                operation: "ListAccessKeys",
                field: "AccessKeyId",
            })?;
            keys.push(KeyMetadata {
                id: id.to_string(),
                created_at: key.create_date().and_then(to_chrono),
            });
        }
        Ok(keys)
    }

    async fn get_access_key_last_used(&self, key_id: &str) -> Result<KeyLastUsed, ProviderError> {
        let output = self
            .iam
            .get_access_key_last_used()
            .access_key_id(key_id)
            .send()
            .await
            .map_err(|e| classify("GetAccessKeyLastUsed", e))?;

        let owning_user = output.user_name().ok_or(ProviderError::MissingField {
            operation: "GetAccessKeyLastUsed",
            field: "UserName",
        })?;
        let last_used_at = output
            .access_key_last_used()
            .and_then(|usage| usage.last_used_date())
            .and_then(to_chrono);

        Ok(KeyLastUsed {
            owning_user: owning_user.to_string(),
            last_used_at,
        })
    }

    async fn list_attached_policies(&self, user: &str) -> Result<Vec<String>, ProviderError> {
        let mut pages = self
            .iam
            .list_attached_user_policies()
            .user_name(user)
            .into_paginator()
            .items()
            .send();
        let mut policies = Vec::new();
        while let Some(policy) = pages.next().await {
            let policy = policy.map_err(|e| classify("ListAttachedUserPolicies", e))?;
            if let Some(name) = policy.policy_name() {
                policies.push(name.to_string());
            }
        }
        Ok(policies)
    }
}

#[async_trait]
impl OrganizationApi for AwsSession {
    async fn describe_organization(&self) -> Result<String, ProviderError> {
        let output = self
            .organizations
            .describe_organization()
            .send()
            .await
            .map_err(|e| classify("DescribeOrganization", e))?;

        output
            .organization()
            .and_then(|org| org.master_account_id())
            .map(str::to_string)
            .ok_or(ProviderError::MissingField {
                operation: "DescribeOrganization",
                field: "Organization.MasterAccountId",
            })
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>, ProviderError> {
        let mut pages = self.organizations.list_accounts().into_paginator().send();
        let mut accounts = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| classify("ListAccounts", e))?;
            for account in page.accounts() {
                if let (Some(id), Some(name)) = (account.id(), account.name()) {
                    accounts.push(AccountInfo {
                        id: id.to_string(),
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(accounts)
    }
}

#[async_trait]
impl RoleAssumer for AwsSession {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
        duration_seconds: i32,
    ) -> Result<TemporaryCredentials, ProviderError> {
        let output = self
            .sts
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .duration_seconds(duration_seconds)
            .send()
            .await
            .map_err(|e| classify("AssumeRole", e))?;

        let credentials = output.credentials().ok_or(ProviderError::MissingField {
            operation: "AssumeRole",
            field: "Credentials",
        })?;
        let expiration = to_chrono(credentials.expiration()).ok_or(ProviderError::MissingField {
            operation: "AssumeRole",
            field: "Credentials.Expiration",
        })?;

        Ok(TemporaryCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expiration,
        })
    }
}
