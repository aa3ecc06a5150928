//! Utility functions and helpers.
//!
//! This module provides common functionality used across the audit:
//!
//! - [`format`] - Number and cell formatting for reports
//! - [`progress`] - Progress tracking and display utilities
//! - [`time`] - Timestamp formatting helpers
//!
//! # Examples
//!
//! ## Rendering timestamps
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use ratkiez::utils::time::format_timestamp;
//!
//! let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
//! assert_eq!(format_timestamp(&timestamp), "2024-03-01 12:00:00 UTC");
//! ```

pub mod format;
pub mod progress;
pub mod time;
