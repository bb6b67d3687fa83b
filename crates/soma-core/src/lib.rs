//! Core domain models and storage access for the Soma check-in service.
//!
//! Provides the identity and check-in record types shared by the HTTP
//! layer, the error taxonomy for storage failures, and the repository
//! layer that talks to Supabase over its REST interface.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;

pub use error::{Result, StoreError};
pub use models::{CheckinSummary, NewCheckin, TelegramUser, UserId};
pub use storage::Storage;
