//! Audit the owners of specific access keys.
//!
//! Each key ID is mapped to its owning user through the last-used lookup,
//! then the owners are audited like the `user` command. A key belonging to
//! another account comes back as access denied and is skipped.
//!
//! # Usage
//!
//! ```bash
//! ratkiez key AKIA1234 AKIA5678 --all-profiles
//! ```

use super::collect::collect;
use super::user::find_users;
use super::{DispatchError, DispatchOptions};
use crate::audit::KeyRecord;
use crate::context::CredentialContext;
use futures::stream::{self, StreamExt};
use tracing::debug;

pub async fn run(
    ctx: &CredentialContext,
    key_ids: &[String],
    options: &DispatchOptions,
) -> Result<Vec<KeyRecord>, DispatchError> {
    let owners = key_owners(ctx, key_ids, options).await?;
    let users = find_users(ctx, &owners, options).await?;
    collect(ctx, &users, options).await
}

/// Owning user names for `key_ids`, de-duplicated in first-seen order.
///
/// # Errors
///
/// [`DispatchError::KeyLookup`] for any failure other than access denied,
/// [`DispatchError::Cancelled`] once the stop signal is raised.
pub async fn key_owners(
    ctx: &CredentialContext,
    key_ids: &[String],
    options: &DispatchOptions,
) -> Result<Vec<String>, DispatchError> {
    let identity = ctx.session().identity();

    let mut pending = Vec::with_capacity(key_ids.len());
    for key_id in key_ids {
        pending.push(async move {
            if options.stopped() {
                return (key_id, None);
            }
            (key_id, Some(identity.get_access_key_last_used(key_id).await))
        });
    }
    let lookups: Vec<_> = stream::iter(pending)
        .buffered(options.user_concurrency)
        .collect()
        .await;

    let mut owners: Vec<String> = Vec::new();
    for (key_id, lookup) in lookups {
        match lookup {
            None => return Err(DispatchError::Cancelled),
            Some(Ok(usage)) => {
                if !owners.contains(&usage.owning_user) {
                    owners.push(usage.owning_user);
                }
            }
            Some(Err(err)) if err.is_access_denied() => {
                debug!(profile = ctx.profile_label(), key_id = %key_id, "key not visible from this account");
            }
            Some(Err(source)) => {
                return Err(DispatchError::KeyLookup {
                    key_id: key_id.clone(),
                    source,
                });
            }
        }
    }
    Ok(owners)
}
