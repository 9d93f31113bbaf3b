//! Shared value types.

pub mod id;
pub mod policy;

pub use id::{FolderId, UserId, VideoId};
pub use policy::DeletePolicy;
