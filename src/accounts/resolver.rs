//! Context resolution.
//!
//! Turns a profile selection into the flat, ordered list of credential
//! contexts the executor fans out over:
//!
//! 1. Pick the profile names (explicit list, or every locally configured one)
//! 2. Build one base context per profile
//! 3. Optionally append the member-account contexts of each base context
//!
//! Per-profile failures are handled according to the configured
//! [`FailurePolicy`]. Expansion failures are always warnings.

use super::expander::{expand, ExpandError};
use crate::audit::{ContextScope, Warning};
use crate::aws::profiles::ProfileStore;
use crate::aws::SessionProvider;
use crate::config::{AuditConfig, FailurePolicy, ProfileSelection};
use crate::context::CredentialContext;
use crate::error::AuditError;
use tracing::{debug, warn};

/// Contexts ready for execution, plus whatever went wrong along the way.
#[derive(Debug, Default)]
pub struct Resolution {
    pub contexts: Vec<CredentialContext>,
    pub warnings: Vec<Warning>,
}

/// Resolve `selection` into credential contexts.
///
/// Member contexts produced by organization expansion follow their base
/// context directly.
///
/// # Errors
///
/// - [`AuditError::ConflictingModes`] / [`AuditError::NoProfiles`] for an
///   invalid selection
/// - [`AuditError::ProfileStore`] when all profiles were requested but the
///   local config could not be read
/// - [`AuditError::ContextConstruction`] on the first broken profile under
///   [`FailurePolicy::FailFast`]
/// - [`AuditError::NoContexts`] when nothing usable remains
pub async fn resolve(
    selection: &ProfileSelection,
    config: &AuditConfig,
    provider: &dyn SessionProvider,
    store: &dyn ProfileStore,
) -> Result<Resolution, AuditError> {
    selection.validate()?;

    let profiles = if selection.all_profiles {
        store.list_profiles().await?
    } else {
        selection.profiles.clone()
    };
    debug!(profiles = ?profiles, region = %config.region, "resolving credential contexts");

    let mut resolution = Resolution::default();

    for profile in &profiles {
        let session = match provider.connect(profile, &config.region).await {
            Ok(session) => session,
            Err(source) => match config.failure_policy {
                FailurePolicy::FailFast => {
                    return Err(AuditError::ContextConstruction {
                        profile: profile.clone(),
                        source,
                    });
                }
                FailurePolicy::BestEffort => {
                    warn!(profile = %profile, error = %source, "skipping profile");
                    resolution.warnings.push(Warning::new(
                        ContextScope::profile(profile.as_str()),
                        format!("failed to create session: {}", source),
                    ));
                    continue;
                }
            },
        };

        let base = CredentialContext::for_profile(profile, session);

        let members = if selection.expand_organization {
            match expand(&base, &config.role_name).await {
                Ok(expansion) => {
                    resolution.warnings.extend(expansion.warnings);
                    expansion.contexts
                }
                Err(err) => {
                    warn!(profile = %profile, error = %err, "organization expansion failed");
                    if let ExpandError::NoMemberContexts { failures } = &err {
                        resolution.warnings.extend(failures.iter().cloned());
                    }
                    resolution.warnings.push(Warning::new(
                        base.scope().clone(),
                        format!("organization expansion failed: {}", err),
                    ));
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        resolution.contexts.push(base);
        resolution.contexts.extend(members);
    }

    if resolution.contexts.is_empty() {
        return Err(AuditError::NoContexts);
    }

    Ok(resolution)
}
