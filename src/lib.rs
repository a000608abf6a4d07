//! Encrypted account/password store with a paginated, searchable account list.
//!
//! [`StoreController`] is the entry point. It owns at most one open store and
//! drives a [`StorePrimitive`](store::StorePrimitive), by default the
//! AES-256-GCM [`SealedFileEngine`](store::engine::SealedFileEngine).

pub mod config;
pub mod controller;
pub mod error;
pub mod header;
pub mod store;
pub mod view;

pub use controller::{StoreController, StoreState};
pub use error::StoreError;
pub use header::Header;
pub use store::{ErrorCode, KdfParams, KeyDeriver, Record};
