//! Audit commands run against a single credential context.
//!
//! Each module implements one way of choosing which users to audit; they all
//! funnel into [`collect`] for the per-user key and policy lookups.
//!
//! - [`scan`] - Every user in the account
//! - [`user`] - Users named on the command line
//! - [`key`] - Owners of the given access key IDs
//! - [`collect`] - Per-user detail collection shared by all three

pub mod collect;
pub mod key;
pub mod scan;
pub mod user;

use crate::audit::KeyRecord;
use crate::aws::ProviderError;
use crate::config::DEFAULT_USER_CONCURRENCY;
use crate::context::CredentialContext;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// What to audit in each context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Every user in the account.
    ScanAll,
    /// Only these users; names missing from an account are skipped.
    ByUsernames(Vec<String>),
    /// Owners of these access keys; keys from other accounts are skipped.
    ByKeyIds(Vec<String>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ScanAll => "scan",
            Command::ByUsernames(_) => "user",
            Command::ByKeyIds(_) => "key",
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to list users: {0}")]
    ListUsers(#[source] ProviderError),

    #[error("failed to get user {user}: {source}")]
    UserLookup {
        user: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to get key {key_id}: {source}")]
    KeyLookup {
        key_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to get details for user {user}: {source}")]
    UserDetails {
        user: String,
        #[source]
        source: ProviderError,
    },

    #[error("stopped after an earlier failure")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Worker(String),
}

/// Knobs for one dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Maximum number of users (or lookups) in flight at once.
    pub user_concurrency: usize,
    stop: Arc<AtomicBool>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::new(DEFAULT_USER_CONCURRENCY)
    }
}

impl DispatchOptions {
    pub fn new(user_concurrency: usize) -> Self {
        Self::with_stop_signal(user_concurrency, Arc::new(AtomicBool::new(false)))
    }

    /// Options sharing a stop flag; once the flag is set no new users are
    /// started, but lookups already in flight run to completion.
    pub fn with_stop_signal(user_concurrency: usize, stop: Arc<AtomicBool>) -> Self {
        Self {
            user_concurrency: user_concurrency.max(1),
            stop,
        }
    }

    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// Run `command` against one context.
///
/// Records come back in user order, and in provider key order within a user.
///
/// # Errors
///
/// Any provider failure other than the silently skipped "user not found"
/// and "key access denied" cases.
pub async fn dispatch(
    ctx: &CredentialContext,
    command: &Command,
    options: &DispatchOptions,
) -> Result<Vec<KeyRecord>, DispatchError> {
    match command {
        Command::ScanAll => scan::run(ctx, options).await,
        Command::ByUsernames(names) => user::run(ctx, names, options).await,
        Command::ByKeyIds(key_ids) => key::run(ctx, key_ids, options).await,
    }
}
