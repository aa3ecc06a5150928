//! Audit specific users by name.
//!
//! In a multi-profile run a given user usually exists in only one of the
//! accounts, so names that are not found in a context are skipped without
//! error.
//!
//! # Usage
//!
//! ```bash
//! ratkiez user john.doe jane.doe --profile prod --profile staging
//! ```

use super::collect::collect;
use super::{DispatchError, DispatchOptions};
use crate::audit::KeyRecord;
use crate::aws::User;
use crate::context::CredentialContext;
use futures::stream::{self, StreamExt};
use tracing::debug;

pub async fn run(
    ctx: &CredentialContext,
    usernames: &[String],
    options: &DispatchOptions,
) -> Result<Vec<KeyRecord>, DispatchError> {
    let users = find_users(ctx, usernames, options).await?;
    collect(ctx, &users, options).await
}

/// Look up `usernames`, dropping the ones that do not exist in this account.
///
/// # Errors
///
/// [`DispatchError::UserLookup`] for any failure other than "not found",
/// [`DispatchError::Cancelled`] once the stop signal is raised.
pub async fn find_users(
    ctx: &CredentialContext,
    usernames: &[String],
    options: &DispatchOptions,
) -> Result<Vec<User>, DispatchError> {
    let identity = ctx.session().identity();

    let mut pending = Vec::with_capacity(usernames.len());
    for name in usernames {
        pending.push(async move {
            if options.stopped() {
                return (name, None);
            }
            (name, Some(identity.get_user(name).await))
        });
    }
    let lookups: Vec<_> = stream::iter(pending)
        .buffered(options.user_concurrency)
        .collect()
        .await;

    let mut users = Vec::with_capacity(lookups.len());
    for (name, lookup) in lookups {
        match lookup {
            None => return Err(DispatchError::Cancelled),
            Some(Ok(user)) => users.push(user),
            Some(Err(err)) if err.is_not_found() => {
                debug!(profile = ctx.profile_label(), user = %name, "user not in this account");
            }
            Some(Err(source)) => {
                return Err(DispatchError::UserLookup {
                    user: name.clone(),
                    source,
                });
            }
        }
    }
    Ok(users)
}
