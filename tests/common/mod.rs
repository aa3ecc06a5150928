//! In-memory provider backend shared by the integration tests.
//!
//! A [`MockWorld`] holds a set of accounts (users, keys, policies and an
//! optional organization) and maps profile names onto them. Sessions,
//! role assumption and derivation all resolve back into the same world, so
//! a member context really does see its own account's users.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ratkiez::aws::profiles::{ProfileStore, ProfileStoreError};
use ratkiez::aws::{
    AccountInfo, IdentityApi, KeyLastUsed, KeyMetadata, OrganizationApi, ProviderError,
    RoleAssumer, Session, SessionProvider, TemporaryCredentials, User,
};
use ratkiez::context::CredentialContext;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const TEMP_KEY_PREFIX: &str = "ASIA-";

pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

#[derive(Debug, Clone)]
pub struct MockKey {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl MockKey {
    pub fn new(id: &str, created_at: &str) -> Self {
        Self {
            id: id.to_string(),
            created_at: Some(ts(created_at)),
            last_used_at: None,
        }
    }

    pub fn used_at(mut self, when: &str) -> Self {
        self.last_used_at = Some(ts(when));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockUser {
    pub name: String,
    pub policies: Vec<String>,
    pub keys: Vec<MockKey>,
    /// Detail lookups for this user fail with a service error.
    pub broken: bool,
}

impl MockUser {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn policy(mut self, policy: &str) -> Self {
        self.policies.push(policy.to_string());
        self
    }

    pub fn key(mut self, key: MockKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockAccount {
    pub id: String,
    pub name: String,
    pub users: Vec<MockUser>,
    /// Present when this account is an organization's management account.
    pub organization: Option<Vec<AccountInfo>>,
    pub list_users_fails: bool,
}

impl MockAccount {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn user(mut self, user: MockUser) -> Self {
        self.users.push(user);
        self
    }

    /// Make this the management account of an organization listing
    /// `accounts` (which should include this account itself).
    pub fn organization(mut self, accounts: &[(&str, &str)]) -> Self {
        self.organization = Some(
            accounts
                .iter()
                .map(|(id, name)| AccountInfo {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn failing_list_users(mut self) -> Self {
        self.list_users_fails = true;
        self
    }

    fn find_user(&self, name: &str) -> Option<&MockUser> {
        self.users.iter().find(|u| u.name == name)
    }
}

#[derive(Debug, Default)]
pub struct MockWorld {
    accounts: HashMap<String, MockAccount>,
    profiles: HashMap<String, String>,
    denied_roles: HashSet<String>,
    session_names: Mutex<Vec<String>>,
    connected_regions: Mutex<Vec<String>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account: MockAccount) -> Self {
        self.accounts.insert(account.id.clone(), account);
        self
    }

    /// Map `profile` onto `account_id`. Profiles never mapped fail to connect.
    pub fn profile(mut self, profile: &str, account_id: &str) -> Self {
        self.profiles
            .insert(profile.to_string(), account_id.to_string());
        self
    }

    /// Role assumption into `account_id` is denied.
    pub fn deny_role(mut self, account_id: &str) -> Self {
        self.denied_roles.insert(account_id.to_string());
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn session_names(&self) -> Vec<String> {
        self.session_names.lock().unwrap().clone()
    }

    pub fn connected_regions(&self) -> Vec<String> {
        self.connected_regions.lock().unwrap().clone()
    }

    /// Number of times `operation` was called, across every account.
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or_default()
    }

    fn record_call(&self, operation: &'static str) {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;
    }
}

pub struct MockSession {
    world: Arc<MockWorld>,
    account_id: String,
    region: String,
}

impl MockSession {
    fn account(&self) -> &MockAccount {
        &self.world.accounts[&self.account_id]
    }

    fn user(&self, operation: &'static str, name: &str) -> Result<&MockUser, ProviderError> {
        let user = self
            .account()
            .find_user(name)
            .ok_or_else(|| ProviderError::NotFound {
                operation,
            })?;
        if user.broken {
            return Err(ProviderError::service(operation, "throttled"));
        }
        Ok(user)
    }
}

#[async_trait]
impl IdentityApi for MockSession {
    async fn list_users(&self) -> Result<Vec<User>, ProviderError> {
        let account = self.account();
        if account.list_users_fails {
            return Err(ProviderError::service("ListUsers", "internal failure"));
        }
        Ok(account
            .users
            .iter()
            .map(|u| User {
                name: u.name.clone(),
            })
            .collect())
    }

    async fn get_user(&self, name: &str) -> Result<User, ProviderError> {
        self.world.record_call("GetUser");
        match self.account().find_user(name) {
            Some(user) => Ok(User {
                name: user.name.clone(),
            }),
            None => Err(ProviderError::NotFound {
                operation: "GetUser",
            }),
        }
    }

    async fn list_access_keys(&self, user: &str) -> Result<Vec<KeyMetadata>, ProviderError> {
        self.world.record_call("ListAccessKeys");
        let user = self.user("ListAccessKeys", user)?;
        Ok(user
            .keys
            .iter()
            .map(|k| KeyMetadata {
                id: k.id.clone(),
                created_at: k.created_at,
            })
            .collect())
    }

    async fn get_access_key_last_used(&self, key_id: &str) -> Result<KeyLastUsed, ProviderError> {
        self.world.record_call("GetAccessKeyLastUsed");
        for user in &self.account().users {
            if let Some(key) = user.keys.iter().find(|k| k.id == key_id) {
                return Ok(KeyLastUsed {
                    owning_user: user.name.clone(),
                    last_used_at: key.last_used_at,
                });
            }
        }
        Err(ProviderError::AccessDenied {
            operation: "GetAccessKeyLastUsed",
        })
    }

    async fn list_attached_policies(&self, user: &str) -> Result<Vec<String>, ProviderError> {
        self.world.record_call("ListAttachedUserPolicies");
        // Hand control back to the runtime so concurrent contexts interleave
        tokio::task::yield_now().await;
        Ok(self.user("ListAttachedUserPolicies", user)?.policies.clone())
    }
}

#[async_trait]
impl OrganizationApi for MockSession {
    async fn describe_organization(&self) -> Result<String, ProviderError> {
        match &self.account().organization {
            Some(_) => Ok(self.account_id.clone()),
            None => Err(ProviderError::OrganizationsNotInUse),
        }
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>, ProviderError> {
        self.account()
            .organization
            .clone()
            .ok_or(ProviderError::OrganizationsNotInUse)
    }
}

#[async_trait]
impl RoleAssumer for MockSession {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
        duration_seconds: i32,
    ) -> Result<TemporaryCredentials, ProviderError> {
        self.world
            .session_names
            .lock()
            .unwrap()
            .push(session_name.to_string());

        // arn:<partition>:iam::<account>:role/<name>
        let account_id = role_arn.split(':').nth(4).unwrap_or_default();
        if self.world.denied_roles.contains(account_id)
            || !self.world.accounts.contains_key(account_id)
        {
            return Err(ProviderError::AccessDenied {
                operation: "AssumeRole",
            });
        }

        Ok(TemporaryCredentials {
            access_key_id: format!("{}{}", TEMP_KEY_PREFIX, account_id),
            secret_access_key: "secret".to_string(),
            session_token: "token".to_string(),
            expiration: Utc::now() + Duration::seconds(i64::from(duration_seconds)),
        })
    }
}

impl Session for MockSession {
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
        let account_id = credentials
            .access_key_id
            .strip_prefix(TEMP_KEY_PREFIX)
            .ok_or_else(|| ProviderError::service("Derive", "unknown credentials"))?;
        Ok(Arc::new(MockSession {
            world: Arc::clone(&self.world),
            account_id: account_id.to_string(),
            region: self.region.clone(),
        }))
    }
}

pub struct MockSessionProvider {
    world: Arc<MockWorld>,
}

impl MockSessionProvider {
    pub fn new(world: &Arc<MockWorld>) -> Self {
        Self {
            world: Arc::clone(world),
        }
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn connect(&self, profile: &str, region: &str) -> Result<Arc<dyn Session>, ProviderError> {
        self.world
            .connected_regions
            .lock()
            .unwrap()
            .push(region.to_string());

        let account_id = self.world.profiles.get(profile).ok_or_else(|| {
            ProviderError::service("GetCallerIdentity", "the security token included in the request is invalid")
        })?;
        Ok(Arc::new(MockSession {
            world: Arc::clone(&self.world),
            account_id: account_id.clone(),
            region: region.to_string(),
        }))
    }
}

/// Profile store returning a fixed list, or failing like a missing file.
pub struct MockProfileStore {
    profiles: Option<Vec<String>>,
}

impl MockProfileStore {
    pub fn with_profiles(profiles: &[&str]) -> Self {
        Self {
            profiles: Some(profiles.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn unreadable() -> Self {
        Self { profiles: None }
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn list_profiles(&self) -> Result<Vec<String>, ProfileStoreError> {
        match &self.profiles {
            Some(profiles) => Ok(profiles.clone()),
            None => Err(ProfileStoreError::Read {
                path: PathBuf::from("/nonexistent/.aws/config"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            }),
        }
    }
}

/// Base context for `profile`, connected in the default region.
pub async fn context_for(world: &Arc<MockWorld>, profile: &str) -> CredentialContext {
    let session = MockSessionProvider::new(world)
        .connect(profile, "us-west-2")
        .await
        .unwrap();
    CredentialContext::for_profile(profile, session)
}
