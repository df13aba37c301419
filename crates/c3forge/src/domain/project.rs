//! Immutable project tree with copy-on-write updates.
//!
//! The tree is a forest of [`Node`] values. Folder children are stored as
//! `Arc<Node>` so an update only rebuilds the chain of folders between the
//! root and the target node; every other subtree is shared with the previous
//! tree value.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Opaque node identifier, unique across the whole tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps a raw identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Leaf node holding editable text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileNode {
    pub id: NodeId,
    pub name: String,
    /// Text content; `None` means no content is loaded.
    pub content: Option<String>,
}

/// Internal node holding ordered children and its expand/collapse flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderNode {
    pub id: NodeId,
    pub name: String,
    /// Children in display order.
    pub children: Vec<Arc<Node>>,
    pub is_expanded: bool,
}

impl FolderNode {
    /// Returns a copy of this folder with `children` swapped in.
    fn with_children(&self, children: Vec<Arc<Node>>) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            children,
            is_expanded: self.is_expanded,
        }
    }
}

/// One entry in the project tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    File(FileNode),
    Folder(FolderNode),
}

impl Node {
    /// Builds a file node.
    pub fn file(id: impl Into<NodeId>, name: impl Into<String>, content: Option<String>) -> Self {
        Self::File(FileNode {
            id: id.into(),
            name: name.into(),
            content,
        })
    }

    /// Builds a folder node from owned children.
    pub fn folder(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        is_expanded: bool,
        children: Vec<Node>,
    ) -> Self {
        Self::Folder(FolderNode {
            id: id.into(),
            name: name.into(),
            children: children.into_iter().map(Arc::new).collect(),
            is_expanded,
        })
    }

    pub fn id(&self) -> &NodeId {
        match self {
            Self::File(file) => &file.id,
            Self::Folder(folder) => &folder.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }

    /// Returns file content when this is a file with content loaded.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::File(file) => file.content.as_deref(),
            Self::Folder(_) => None,
        }
    }

    /// Returns folder children, or an empty slice for files.
    pub fn children(&self) -> &[Arc<Node>] {
        match self {
            Self::File(_) => &[],
            Self::Folder(folder) => &folder.children,
        }
    }

    /// Returns whether this is an expanded folder.
    pub fn is_expanded(&self) -> bool {
        match self {
            Self::File(_) => false,
            Self::Folder(folder) => folder.is_expanded,
        }
    }
}

/// One row of the flattened, display-ordered tree.
#[derive(Clone, Debug)]
pub struct TreeRow {
    /// Nesting level, `0` for top-level nodes.
    pub depth: usize,
    pub node: Arc<Node>,
}

/// Errors raised while assembling a tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProjectTreeError {
    #[error("duplicate node id `{0}`")]
    DuplicateId(NodeId),
}

/// Ordered forest of top-level nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectTree {
    roots: Vec<Arc<Node>>,
}

/// Result of one path rewrite attempt.
enum Rewrite {
    /// No node with the id exists in the visited slice.
    NotFound,
    /// The id resolved, but the update does not apply to that node.
    Unchanged,
    /// The slice was rebuilt with one slot replaced.
    Replaced(Vec<Arc<Node>>),
}

impl ProjectTree {
    /// Builds a tree from top-level nodes.
    ///
    /// # Errors
    /// Returns [`ProjectTreeError::DuplicateId`] when two nodes anywhere in
    /// the forest share an id.
    pub fn new(nodes: Vec<Node>) -> Result<Self, ProjectTreeError> {
        let tree = Self {
            roots: nodes.into_iter().map(Arc::new).collect(),
        };
        tree.ensure_unique_ids()?;

        Ok(tree)
    }

    fn ensure_unique_ids(&self) -> Result<(), ProjectTreeError> {
        let mut seen = HashSet::new();
        for node in self.iter() {
            if !seen.insert(node.id()) {
                return Err(ProjectTreeError::DuplicateId(node.id().clone()));
            }
        }

        Ok(())
    }

    /// Returns the top-level nodes in display order.
    #[cfg(test)]
    pub(crate) fn roots(&self) -> &[Arc<Node>] {
        &self.roots
    }

    /// Returns the total node count, collapsed folders included.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterates every node in pre-order, ignoring expansion state.
    pub fn iter(&self) -> Nodes<'_> {
        Nodes {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Returns the first node in pre-order whose id matches.
    pub fn find(&self, id: &NodeId) -> Option<&Arc<Node>> {
        self.iter().find(|node| node.id() == id)
    }

    /// Returns a tree with the content of file `id` replaced.
    ///
    /// Unknown ids and folder ids leave the tree unchanged.
    #[must_use]
    pub fn update_content(&self, id: &NodeId, content: String) -> Self {
        self.rewrite(id, |node| match node {
            Node::File(file) => Some(Node::File(FileNode {
                id: file.id.clone(),
                name: file.name.clone(),
                content: Some(content.clone()),
            })),
            Node::Folder(_) => None,
        })
    }

    /// Returns a tree with the expansion flag of folder `id` flipped.
    ///
    /// Unknown ids and file ids leave the tree unchanged.
    #[must_use]
    pub fn toggle_folder(&self, id: &NodeId) -> Self {
        self.rewrite(id, |node| match node {
            Node::Folder(folder) => Some(Node::Folder(FolderNode {
                is_expanded: !folder.is_expanded,
                ..folder.clone()
            })),
            Node::File(_) => None,
        })
    }

    /// Flattens the tree into display rows.
    ///
    /// Children of collapsed folders are skipped.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        push_visible_rows(&self.roots, 0, &mut rows);

        rows
    }

    fn rewrite<F>(&self, id: &NodeId, apply: F) -> Self
    where
        F: Fn(&Node) -> Option<Node>,
    {
        match rewrite_path(&self.roots, id, &apply) {
            Rewrite::Replaced(roots) => Self { roots },
            Rewrite::NotFound | Rewrite::Unchanged => self.clone(),
        }
    }
}

impl<'a> IntoIterator for &'a ProjectTree {
    type Item = &'a Arc<Node>;
    type IntoIter = Nodes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over every node of a [`ProjectTree`].
pub struct Nodes<'a> {
    stack: Vec<&'a Arc<Node>>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Arc<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());

        Some(node)
    }
}

/// Rebuilds `nodes` along the path to `id`, sharing every untouched sibling.
fn rewrite_path<F>(nodes: &[Arc<Node>], id: &NodeId, apply: &F) -> Rewrite
where
    F: Fn(&Node) -> Option<Node>,
{
    for (index, node) in nodes.iter().enumerate() {
        let replacement = if node.id() == id {
            match apply(node) {
                Some(updated) => updated,
                None => return Rewrite::Unchanged,
            }
        } else if let Node::Folder(folder) = node.as_ref() {
            match rewrite_path(&folder.children, id, apply) {
                Rewrite::NotFound => continue,
                Rewrite::Unchanged => return Rewrite::Unchanged,
                Rewrite::Replaced(children) => Node::Folder(folder.with_children(children)),
            }
        } else {
            continue;
        };

        let mut rewritten = nodes.to_vec();
        rewritten[index] = Arc::new(replacement);

        return Rewrite::Replaced(rewritten);
    }

    Rewrite::NotFound
}

fn push_visible_rows(nodes: &[Arc<Node>], depth: usize, rows: &mut Vec<TreeRow>) {
    for node in nodes {
        rows.push(TreeRow {
            depth,
            node: Arc::clone(node),
        });

        if node.is_expanded() {
            push_visible_rows(node.children(), depth + 1, rows);
        }
    }
}
