//! Cloud provider boundary.
//!
//! - [`api`] - Traits the engine is written against, and the data they return
//! - [`client`] - AWS SDK implementation of those traits
//! - [`profiles`] - Profile names from the local AWS config file
//! - [`arn`] - Role ARN and session-name helpers
//! - [`error`] - Provider failure classification

pub mod api;
pub mod arn;
pub mod client;
pub mod error;
pub mod profiles;

pub use api::{
    AccountInfo, IdentityApi, KeyLastUsed, KeyMetadata, OrganizationApi, RoleAssumer, Session,
    SessionProvider, TemporaryCredentials, User,
};
pub use error::ProviderError;
