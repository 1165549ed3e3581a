//! # Gatehouse Core
//!
//! Identity core for the Gatehouse web application: the credential store and
//! session authenticator collaborators, the storage behind them, and the
//! account and admin flows that sequence calls into them.
//!
//! ## Feature Flags
//!
//! - `database`: PostgreSQL persistence through SQLx, plus the embedded
//!   [`MIGRATOR`]
//! - `test-utils`: exports `MockCredentialStore` and `AuthCrypto::for_tests`
//!   for downstream tests
//! - `postgres-tests`: builds the tests that need a live database
//!
//! ## Architecture
//!
//! - [`identity`]: collaborator traits and their default implementations
//! - [`infrastructure`]: in-memory and PostgreSQL repositories
//! - [`application`]: account and admin flows over the collaborators
//! - [`error`]: infrastructure error type shared by all of the above

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod application;

/// Error types and error handling utilities
pub mod error;

pub mod identity;

/// Storage adapters
pub mod infrastructure;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{IdentityError, Result};
