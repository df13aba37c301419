use std::sync::Arc;

use crate::domain::project::{Node, NodeId, ProjectTree};

/// Currently selected node id, kept apart from the tree.
///
/// Ids are stored unvalidated; consumers resolve them against the latest tree
/// on every read, so a stale id simply resolves to nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected_id: Option<NodeId>,
}

impl Selection {
    pub fn new(selected_id: Option<NodeId>) -> Self {
        Self { selected_id }
    }

    /// Replaces the selection.
    pub fn select(&mut self, id: NodeId) {
        self.selected_id = Some(id);
    }

    pub fn selected_id(&self) -> Option<&NodeId> {
        self.selected_id.as_ref()
    }

    /// Resolves the selected id against `tree`.
    pub fn resolve<'tree>(&self, tree: &'tree ProjectTree) -> Option<&'tree Arc<Node>> {
        tree.find(self.selected_id.as_ref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ProjectTree {
        ProjectTree::new(vec![
            Node::file("readme", "README.md", Some("hello".to_string())),
            Node::folder(
                "scripts",
                "scripts",
                false,
                vec![Node::file("main", "main.js", None)],
            ),
        ])
        .expect("ids are unique")
    }

    #[test]
    fn test_select_accepts_ids_without_validation() {
        // Arrange
        let mut selection = Selection::default();

        // Act
        selection.select(NodeId::new("missing"));

        // Assert
        assert_eq!(selection.selected_id(), Some(&NodeId::new("missing")));
        assert!(selection.resolve(&tree()).is_none());
    }

    #[test]
    fn test_resolve_reads_latest_tree_value() {
        // Arrange
        let selection = Selection::new(Some(NodeId::new("main")));
        let before = tree();
        let after = before.update_content(&NodeId::new("main"), "edited".to_string());

        // Act
        let old_content = selection.resolve(&before).and_then(|node| node.content());
        let new_content = selection.resolve(&after).and_then(|node| node.content());

        // Assert
        assert_eq!(old_content, None);
        assert_eq!(new_content, Some("edited"));
    }

    #[test]
    fn test_empty_selection_resolves_to_nothing() {
        // Arrange
        let selection = Selection::new(None);

        let tree = tree();

        // Act
        let resolved = selection.resolve(&tree);

        // Assert
        assert!(selection.selected_id().is_none());
        assert!(resolved.is_none());
    }
}
