//! Run-level errors.
//!
//! Only these escape an audit run. Per-profile and per-account problems are
//! downgraded to [`Warning`](crate::audit::Warning)s under the best-effort
//! policy and never show up here.

use crate::audit::{ContextScope, Warning};
use crate::aws::profiles::ProfileStoreError;
use crate::aws::ProviderError;
use crate::commands::DispatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("cannot use all local profiles and organization expansion together")]
    ConflictingModes,

    #[error("no profiles requested")]
    NoProfiles,

    #[error(transparent)]
    ProfileStore(#[from] ProfileStoreError),

    #[error("failed to create session for profile {profile}: {source}")]
    ContextConstruction {
        profile: String,
        #[source]
        source: ProviderError,
    },

    #[error("no usable credential contexts could be created")]
    NoContexts,

    #[error("{scope}: {source}")]
    Dispatch {
        scope: ContextScope,
        #[source]
        source: DispatchError,
    },

    /// Nothing was collected; `warnings` holds whatever failed along the way.
    #[error("no data collected from any profile")]
    NoData { warnings: Vec<Warning> },
}
