//! Video entities. Videos belong to an external collaborator; only their
//! folder assignment matters to the folder tree.

pub mod model;

pub use model::{AssignVideoFolder, Video, VideoStatus};
