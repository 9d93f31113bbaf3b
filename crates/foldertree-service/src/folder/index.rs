//! In-memory adjacency index over a flat folder snapshot.
//!
//! The index is immutable once built. Any structural change is picked up by
//! building a new index from a fresh listing, never by patching this one.
//! Queries never trust the no-cycle invariant: server data may be stale or
//! malformed, so every traversal carries a visited set.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use foldertree_core::types::FolderId;
use foldertree_entity::folder::{Folder, FolderNode, FolderTree};

/// Parent-to-children adjacency built from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    /// Folders in input order. The arena every other field points into.
    folders: Vec<Folder>,
    /// Arena position by id.
    positions: HashMap<FolderId, usize>,
    /// Arena positions of children keyed by `parent_id` (`None` = roots).
    children: HashMap<Option<FolderId>, Vec<usize>>,
    /// Folders not reachable from any root, in input order.
    unreachable: Vec<FolderId>,
}

impl TreeIndex {
    /// Build an index from an unordered flat listing. O(n).
    ///
    /// Children keep their input order. When an id appears more than once
    /// only the first record is kept.
    pub fn build(folders: Vec<Folder>) -> Self {
        let mut arena = Vec::with_capacity(folders.len());
        let mut positions = HashMap::with_capacity(folders.len());
        let mut children: HashMap<Option<FolderId>, Vec<usize>> = HashMap::new();

        for folder in folders {
            if positions.contains_key(&folder.id) {
                warn!(folder_id = %folder.id, "Duplicate folder id in snapshot, keeping first");
                continue;
            }
            let pos = arena.len();
            positions.insert(folder.id, pos);
            children.entry(folder.parent_id).or_default().push(pos);
            arena.push(folder);
        }

        let mut index = Self {
            folders: arena,
            positions,
            children,
            unreachable: Vec::new(),
        };
        index.unreachable = index.find_unreachable();

        if !index.unreachable.is_empty() {
            warn!(
                count = index.unreachable.len(),
                "Snapshot contains folders unreachable from any root"
            );
        }
        index
    }

    /// Number of folders in the snapshot.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the snapshot has no folders.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Look up a folder by id.
    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.positions.get(&id).map(|&pos| &self.folders[pos])
    }

    /// Whether the snapshot contains `id`.
    pub fn contains(&self, id: FolderId) -> bool {
        self.positions.contains_key(&id)
    }

    /// All folders in input order.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Direct children of `parent` (`None` for roots), in input order.
    pub fn children_of(&self, parent: Option<FolderId>) -> Vec<&Folder> {
        self.children
            .get(&parent)
            .map(|positions| positions.iter().map(|&pos| &self.folders[pos]).collect())
            .unwrap_or_default()
    }

    /// Whether `id` has at least one child.
    pub fn has_children(&self, id: FolderId) -> bool {
        self.children
            .get(&Some(id))
            .is_some_and(|positions| !positions.is_empty())
    }

    /// Root folders, in input order.
    pub fn roots(&self) -> Vec<&Folder> {
        self.children_of(None)
    }

    /// `id` plus every folder below it.
    ///
    /// The starting id is always included so callers can exclude it too,
    /// even when it is not in the snapshot.
    pub fn descendants_of(&self, id: FolderId) -> HashSet<FolderId> {
        let mut visited = HashSet::from([id]);
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            for child in self.children_of(Some(current)) {
                if visited.insert(child.id) {
                    stack.push(child.id);
                }
            }
        }
        visited
    }

    /// `id` and its descendants level by level, starting with `id`.
    pub(crate) fn subtree_breadth_first(&self, id: FolderId) -> Vec<FolderId> {
        let mut visited = HashSet::from([id]);
        let mut order = vec![id];
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for child in self.children_of(Some(current)) {
                if visited.insert(child.id) {
                    order.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }
        order
    }

    /// Ancestors from the immediate parent up to the root.
    ///
    /// Stops at a parent missing from the snapshot or at the first repeated
    /// id.
    pub fn ancestors_of(&self, id: FolderId) -> Vec<&Folder> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut next = self.get(id).and_then(|f| f.parent_id);

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            ancestors.push(parent);
            next = parent.parent_id;
        }
        ancestors
    }

    /// Root-first path ending at the folder itself. Empty if unknown.
    pub fn breadcrumbs(&self, id: FolderId) -> Vec<&Folder> {
        let Some(folder) = self.get(id) else {
            return Vec::new();
        };
        let mut trail = self.ancestors_of(id);
        trail.reverse();
        trail.push(folder);
        trail
    }

    /// Folders whose parent chain never reaches a root: a dangling
    /// `parent_id` or a cycle.
    pub fn unreachable(&self) -> &[FolderId] {
        &self.unreachable
    }

    fn find_unreachable(&self) -> Vec<FolderId> {
        let mut reached = HashSet::new();
        let mut stack: Vec<FolderId> = self.roots().iter().map(|f| f.id).collect();

        while let Some(current) = stack.pop() {
            if reached.insert(current) {
                stack.extend(self.children_of(Some(current)).iter().map(|f| f.id));
            }
        }

        self.folders
            .iter()
            .filter(|f| !reached.contains(&f.id))
            .map(|f| f.id)
            .collect()
    }

    /// Nested view of every folder reachable from a root.
    pub fn to_tree(&self, video_counts: &HashMap<FolderId, u64>) -> FolderTree {
        let mut visited = HashSet::new();
        let roots: Vec<FolderNode> = self
            .roots()
            .into_iter()
            .filter_map(|root| self.build_node(root, 0, video_counts, &mut visited))
            .collect();

        FolderTree {
            total_folders: visited.len() as u64,
            roots,
        }
    }

    fn build_node(
        &self,
        folder: &Folder,
        depth: usize,
        video_counts: &HashMap<FolderId, u64>,
        visited: &mut HashSet<FolderId>,
    ) -> Option<FolderNode> {
        if !visited.insert(folder.id) {
            return None;
        }

        let children: Vec<FolderNode> = self
            .children_of(Some(folder.id))
            .into_iter()
            .filter_map(|child| self.build_node(child, depth + 1, video_counts, visited))
            .collect();

        Some(FolderNode {
            id: folder.id,
            name: folder.name.clone(),
            depth,
            child_count: children.len() as u64,
            video_count: video_counts.get(&folder.id).copied().unwrap_or(0),
            children,
        })
    }
}
