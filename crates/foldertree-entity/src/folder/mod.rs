//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{CreateFolder, Folder, FolderUpdate, MAX_NAME_LENGTH, is_valid_name};
pub use tree::{FolderNode, FolderTree};
