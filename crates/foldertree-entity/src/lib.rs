//! # foldertree-entity
//!
//! Entity models as exchanged with the remote store. Everything here is
//! plain data with no behavior beyond validation predicates.

pub mod folder;
pub mod video;
