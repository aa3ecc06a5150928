//! # Ratkiez
//!
//! Command-line audit of IAM users and their access keys across many AWS
//! profiles and organization member accounts.
//!
//! ## Overview
//!
//! One run answers "which access keys exist, who owns them, when were they
//! created and last used, and what is attached to their owners" for every
//! account reachable from the local credential profiles. Each profile (and
//! optionally every member account of its organization) is audited by its
//! own concurrent worker, and the results are merged into a single report.
//!
//! ## Features
//!
//! - **Multi-profile** - Explicit `--profile` list or every locally configured profile
//! - **Organization expansion** - Assumes a role into every member account
//! - **Three audit modes** - All users, specific users, or specific access key IDs
//! - **Best-effort by default** - Broken profiles become warnings, not aborts
//! - **Table, JSON and CSV output** with optional account columns
//! - **Shell completion** for bash, zsh, fish, powershell, and elvish
//!
//! ## Architecture
//!
//! - [`aws`] - Provider traits, the SDK-backed implementation, profile store
//! - [`context`] - Credential contexts (one authenticated handle per account)
//! - [`accounts`] - Context resolution and organization expansion
//! - [`commands`] - Per-context audit commands and per-user collection
//! - [`engine`] - Concurrent fan-out over contexts and result merging
//! - [`output`] - Table, JSON and CSV rendering
//! - [`audit`] - Key records, warnings and the final report
//! - [`utils`] - Formatting, progress and time helpers
//!
//! ## Example Usage
//!
//! ```bash
//! # Every user in the default profile
//! ratkiez scan
//!
//! # Every user in every member account of prod's organization
//! ratkiez --profile prod --org scan
//!
//! # Find who owns two keys, searching all local profiles
//! ratkiez --all-profiles key AKIAEXAMPLE1 AKIAEXAMPLE2
//!
//! # Specific users across two profiles, as CSV
//! ratkiez --profile prod --profile staging --format csv user alice bob
//! ```
//!
//! ## Library Usage
//!
//! The engine only talks to the provider traits in [`aws::api`], so any
//! backend implementing them can be audited:
//!
//! ```no_run
//! use ratkiez::accounts::resolve;
//! use ratkiez::aws::client::AwsSessionProvider;
//! use ratkiez::aws::profiles::ConfigFileStore;
//! use ratkiez::commands::Command;
//! use ratkiez::config::{AuditConfig, ProfileSelection};
//! use ratkiez::engine::execute;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AuditConfig::default();
//! let selection = ProfileSelection::profiles(["prod"]).with_organization();
//! let resolution = resolve(
//!     &selection,
//!     &config,
//!     &AwsSessionProvider::default(),
//!     &ConfigFileStore::from_env(),
//! )
//! .await?;
//! let report = execute(resolution.contexts, Command::ScanAll, &config).await?;
//! println!("{} keys", report.records.len());
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod audit;
pub mod aws;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod output;
pub mod utils;
