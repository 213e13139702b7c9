//! Offline-first synchronization core for range use plan (RUP) field data.
//!
//! Mirrors a remote relational dataset (agreements, reference tables, plans
//! and their nested sub-entities) into a local SQLite store, uploads
//! locally-created plans, and reconciles fresh downloads against the local
//! cache without destroying unsynced drafts.
//!
//! The host application supplies configuration, a [`api::TokenProvider`], and
//! drives [`sync::Synchronizer::sync`].

pub mod api;
pub mod config;
pub mod decode;
pub mod model;
pub mod store;
pub mod sync;

pub use config::Config;
pub use store::{Store, StoreError};
pub use sync::{SyncError, Synchronizer};
