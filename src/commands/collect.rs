//! Per-user detail collection.
//!
//! For each user: attached policies, access keys, and the last-used date of
//! every key. Users run concurrently (bounded by
//! [`DispatchOptions::user_concurrency`]) but results are returned in the
//! order the users were given.

use super::{DispatchError, DispatchOptions};
use crate::audit::{KeyRecord, NEVER_USED, NOT_APPLICABLE};
use crate::aws::{ProviderError, User};
use crate::context::CredentialContext;
use crate::utils::time::format_timestamp;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Collect key records for `users`.
///
/// The first failing user stops any user not yet started; users already in
/// flight finish, then the first failure (in user order) is returned.
///
/// # Errors
///
/// [`DispatchError::UserDetails`] for a provider failure,
/// [`DispatchError::Cancelled`] if the stop signal was raised before a user
/// was started.
pub async fn collect(
    ctx: &CredentialContext,
    users: &[User],
    options: &DispatchOptions,
) -> Result<Vec<KeyRecord>, DispatchError> {
    debug!(
        profile = ctx.profile_label(),
        users = users.len(),
        "collecting key details"
    );

    let failed = AtomicBool::new(false);
    let mut pending = Vec::with_capacity(users.len());
    for user in users {
        pending.push(collect_user(ctx, user, options, &failed));
    }
    let results: Vec<Result<Vec<KeyRecord>, DispatchError>> = stream::iter(pending)
        .buffered(options.user_concurrency)
        .collect()
        .await;

    let mut records = Vec::new();
    for result in results {
        records.extend(result?);
    }
    Ok(records)
}

async fn collect_user(
    ctx: &CredentialContext,
    user: &User,
    options: &DispatchOptions,
    failed: &AtomicBool,
) -> Result<Vec<KeyRecord>, DispatchError> {
    if options.stopped() || failed.load(Ordering::Relaxed) {
        return Err(DispatchError::Cancelled);
    }
    let result = user_records(ctx, user)
        .await
        .map_err(|source| DispatchError::UserDetails {
            user: user.name.clone(),
            source,
        });
    if result.is_err() {
        failed.store(true, Ordering::Relaxed);
    }
    result
}

async fn user_records(ctx: &CredentialContext, user: &User) -> Result<Vec<KeyRecord>, ProviderError> {
    let identity = ctx.session().identity();

    let policies = identity.list_attached_policies(&user.name).await?;
    let keys = identity.list_access_keys(&user.name).await?;

    // Keyless users still get a row so they show up in the audit
    if keys.is_empty() {
        return Ok(vec![KeyRecord::placeholder(&user.name, policies, ctx.scope())]);
    }

    let mut records = Vec::with_capacity(keys.len());
    for key in keys {
        let usage = identity.get_access_key_last_used(&key.id).await?;

        records.push(KeyRecord {
            user: user.name.clone(),
            creation_date: key
                .created_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            last_used_date: usage
                .last_used_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| NEVER_USED.to_string()),
            key_id: key.id,
            policies: policies.clone(),
            profile: ctx.profile_label().to_string(),
            account_id: ctx.account_id().to_string(),
            account_name: ctx.account_name().to_string(),
        });
    }

    Ok(records)
}
