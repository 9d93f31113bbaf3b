//! Selection and expansion state for a rendered folder tree.
//!
//! Owned by the view, never persisted. Ids that no longer exist in the
//! snapshot are tolerated everywhere: a vanished selection reads as "all
//! items" and expanding a vanished id does nothing visible.

use std::collections::HashSet;

use serde::Serialize;

use foldertree_core::types::FolderId;
use foldertree_entity::folder::Folder;

use crate::folder::index::TreeIndex;

/// Label of the "no parent" entry offered when picking a move target.
pub const ROOT_TARGET_LABEL: &str = "Root (no parent)";

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow<'a> {
    /// The folder on this line.
    pub folder: &'a Folder,
    /// Nesting depth, 0 for roots.
    pub depth: usize,
    /// Whether an expand toggle should be shown.
    pub has_children: bool,
    /// Whether the folder's children are shown below it.
    pub expanded: bool,
    /// Whether this is the selected folder.
    pub selected: bool,
}

/// An entry in a "move to" picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveTarget {
    /// Parent to move under, `None` for root.
    pub parent_id: Option<FolderId>,
    /// Display label.
    pub label: String,
    /// Indentation level. The root option and root folders are both 0.
    pub depth: usize,
    /// The folder itself or one of its descendants.
    pub disabled: bool,
}

/// Which folder is selected and which are expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeViewState {
    /// Selected folder, `None` for "all items".
    selected: Option<FolderId>,
    /// Folders whose children are shown.
    expanded: HashSet<FolderId>,
}

impl TreeViewState {
    /// Start with nothing selected or expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a folder, or `None` for the root view.
    pub fn select(&mut self, id: Option<FolderId>) {
        self.selected = id;
    }

    /// The selected folder id, if it still exists in `index`.
    pub fn selected_id(&self, index: &TreeIndex) -> Option<FolderId> {
        self.selected.filter(|&id| index.contains(id))
    }

    /// The selected folder, if it still exists in `index`.
    pub fn selected_folder<'a>(&self, index: &'a TreeIndex) -> Option<&'a Folder> {
        self.selected.and_then(|id| index.get(id))
    }

    /// Flip a folder's expansion. Returns the new state.
    pub fn toggle(&mut self, id: FolderId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    /// Show a folder's children.
    pub fn expand(&mut self, id: FolderId) {
        self.expanded.insert(id);
    }

    /// Hide a folder's children.
    pub fn collapse(&mut self, id: FolderId) {
        self.expanded.remove(&id);
    }

    /// Whether a folder's children are shown.
    pub fn is_expanded(&self, id: FolderId) -> bool {
        self.expanded.contains(&id)
    }

    /// Expand every ancestor so `id` becomes visible.
    pub fn reveal(&mut self, id: FolderId, index: &TreeIndex) {
        for ancestor in index.ancestors_of(id) {
            self.expanded.insert(ancestor.id);
        }
    }

    /// Forget ids missing from `index`.
    pub fn reconcile(&mut self, index: &TreeIndex) {
        self.expanded.retain(|&id| index.contains(id));
        if self.selected.is_some_and(|id| !index.contains(id)) {
            self.selected = None;
        }
    }

    /// Rows in display order: depth-first, children only under expanded
    /// folders.
    pub fn visible_rows<'a>(&self, index: &'a TreeIndex) -> Vec<TreeRow<'a>> {
        let mut rows = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<(&Folder, usize)> =
            index.roots().into_iter().rev().map(|f| (f, 0)).collect();

        while let Some((folder, depth)) = stack.pop() {
            if !visited.insert(folder.id) {
                continue;
            }
            let expanded = self.is_expanded(folder.id);
            rows.push(TreeRow {
                folder,
                depth,
                has_children: index.has_children(folder.id),
                expanded,
                selected: self.selected == Some(folder.id),
            });
            if expanded {
                stack.extend(
                    index
                        .children_of(Some(folder.id))
                        .into_iter()
                        .rev()
                        .map(|child| (child, depth + 1)),
                );
            }
        }
        rows
    }
}

/// Every place `folder_id` could be moved to, root option first.
///
/// The folder itself and its descendants are listed but disabled.
pub fn move_targets(folder_id: FolderId, index: &TreeIndex) -> Vec<MoveTarget> {
    let forbidden = index.descendants_of(folder_id);
    let mut targets = vec![MoveTarget {
        parent_id: None,
        label: ROOT_TARGET_LABEL.to_string(),
        depth: 0,
        disabled: false,
    }];

    let mut visited = HashSet::new();
    let mut stack: Vec<(&Folder, usize)> =
        index.roots().into_iter().rev().map(|f| (f, 0)).collect();

    while let Some((folder, depth)) = stack.pop() {
        if !visited.insert(folder.id) {
            continue;
        }
        targets.push(MoveTarget {
            parent_id: Some(folder.id),
            label: folder.name.clone(),
            depth,
            disabled: forbidden.contains(&folder.id),
        });
        stack.extend(
            index
                .children_of(Some(folder.id))
                .into_iter()
                .rev()
                .map(|child| (child, depth + 1)),
        );
    }
    targets
}
