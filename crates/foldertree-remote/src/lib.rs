//! # foldertree-remote
//!
//! The remote store contract consumed by the sync coordinator, plus two
//! bindings: [`http::HttpStore`] for the REST API and
//! [`memory::InMemoryStore`] which enforces the same server-side rules
//! without a network.

pub mod http;
pub mod memory;
pub mod store;

pub use http::HttpStore;
pub use memory::InMemoryStore;
pub use store::{FolderStore, VideoStore};
