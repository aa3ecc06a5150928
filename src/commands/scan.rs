//! Full account scan.
//!
//! Lists every IAM user in the account and audits all of their keys.
//!
//! # Usage
//!
//! ```bash
//! ratkiez scan --profile prod --profile staging
//! ratkiez scan --profile management --org --format csv
//! ```

use super::collect::collect;
use super::{DispatchError, DispatchOptions};
use crate::audit::KeyRecord;
use crate::context::CredentialContext;

pub async fn run(
    ctx: &CredentialContext,
    options: &DispatchOptions,
) -> Result<Vec<KeyRecord>, DispatchError> {
    let users = ctx
        .session()
        .identity()
        .list_users()
        .await
        .map_err(DispatchError::ListUsers)?;

    collect(ctx, &users, options).await
}
