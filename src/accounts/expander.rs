//! Organization expansion.
//!
//! Starting from a context in an organization's management account, discover
//! every member account and assume a role in each one, producing one
//! additional context per member.
//!
//! Expansion never takes the base context down with it: every failure here is
//! reported back to the resolver, which turns it into a warning.

use crate::audit::{ContextScope, Warning};
use crate::aws::arn::{partition_for_region, role_arn, role_session_name};
use crate::aws::{AccountInfo, ProviderError};
use crate::config::ASSUMED_ROLE_DURATION_SECS;
use crate::context::CredentialContext;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("AWS Organizations is not enabled for this account")]
    OrganizationsNotEnabled,

    #[error("failed to query organization: {0}")]
    Query(#[source] ProviderError),

    #[error("no member accounts found in the organization")]
    NoMemberAccounts,

    #[error("no member account contexts could be created ({} role assumptions failed)", .failures.len())]
    NoMemberContexts { failures: Vec<Warning> },
}

/// Member contexts produced from one base context.
#[derive(Debug, Default)]
pub struct Expansion {
    pub contexts: Vec<CredentialContext>,
    /// Member accounts whose role could not be assumed.
    pub warnings: Vec<Warning>,
}

/// Expand `base` into one context per member account of its organization.
///
/// The management account is skipped since `base` already covers it. Role
/// assumptions run concurrently; the returned contexts keep the order in
/// which the organization listed the accounts.
///
/// # Errors
///
/// Fails when the organization cannot be queried, has no member accounts,
/// or when the role could not be assumed in any member account.
pub async fn expand(base: &CredentialContext, role_name: &str) -> Result<Expansion, ExpandError> {
    let accounts = member_accounts(base).await?;
    debug!(
        profile = base.profile_label(),
        members = accounts.len(),
        "expanding into organization member accounts"
    );

    let partition = partition_for_region(base.region());
    let session_name = role_session_name(base.profile_label());

    let attempts = accounts.iter().map(|account| {
        let arn = role_arn(partition, &account.id, role_name);
        let session_name = session_name.as_str();
        async move {
            let result = assume_member(base, account, &arn, session_name).await;
            (account, result)
        }
    });

    let mut expansion = Expansion::default();
    for (account, result) in join_all(attempts).await {
        match result {
            Ok(context) => expansion.contexts.push(context),
            Err(err) => {
                let scope = ContextScope::account(
                    format!("member-of-{}", base.profile_label()),
                    &account.id,
                    &account.name,
                );
                warn!(%scope, error = %err, "failed to assume role in member account");
                expansion.warnings.push(Warning::new(
                    scope,
                    format!("failed to assume role {}: {}", role_name, err),
                ));
            }
        }
    }

    if expansion.contexts.is_empty() {
        return Err(ExpandError::NoMemberContexts {
            failures: expansion.warnings,
        });
    }

    Ok(expansion)
}

async fn member_accounts(base: &CredentialContext) -> Result<Vec<AccountInfo>, ExpandError> {
    let organizations = base.session().organizations();

    let management_account_id = organizations
        .describe_organization()
        .await
        .map_err(query_error)?;
    let accounts = organizations.list_accounts().await.map_err(query_error)?;

    let members: Vec<AccountInfo> = accounts
        .into_iter()
        .filter(|account| account.id != management_account_id)
        .collect();

    if members.is_empty() {
        return Err(ExpandError::NoMemberAccounts);
    }
    Ok(members)
}

fn query_error(err: ProviderError) -> ExpandError {
    match err {
        ProviderError::OrganizationsNotInUse => ExpandError::OrganizationsNotEnabled,
        other => ExpandError::Query(other),
    }
}

async fn assume_member(
    base: &CredentialContext,
    account: &AccountInfo,
    role_arn: &str,
    session_name: &str,
) -> Result<CredentialContext, ProviderError> {
    let credentials = base
        .session()
        .roles()
        .assume_role(role_arn, session_name, ASSUMED_ROLE_DURATION_SECS)
        .await?;
    let session = base.session().derive(&credentials)?;

    debug!(
        account_id = %account.id,
        account_name = %account.name,
        expires_at = %credentials.expiration,
        "assumed role in member account"
    );

    Ok(CredentialContext::for_member_account(
        base.profile_label(),
        &account.id,
        &account.name,
        session,
        credentials.expiration,
    ))
}
