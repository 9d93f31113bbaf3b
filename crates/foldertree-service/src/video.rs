//! Video filtering by folder.

use std::collections::HashMap;

use foldertree_core::types::FolderId;
use foldertree_entity::video::Video;

/// Videos shown for a selection: all of them for `None`, else those filed
/// directly in the folder.
pub fn videos_in(videos: &[Video], selection: Option<FolderId>) -> Vec<&Video> {
    match selection {
        None => videos.iter().collect(),
        Some(folder_id) => videos
            .iter()
            .filter(|v| v.folder_id == Some(folder_id))
            .collect(),
    }
}

/// Number of videos filed directly in each folder.
pub fn video_counts(videos: &[Video]) -> HashMap<FolderId, u64> {
    let mut counts = HashMap::new();
    for folder_id in videos.iter().filter_map(|v| v.folder_id) {
        *counts.entry(folder_id).or_insert(0) += 1;
    }
    counts
}
