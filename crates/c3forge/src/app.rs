//! Session-level state and the entry points used by a display surface.
//!
//! [`App`] owns the project tree, the selection, and the chat session. Each
//! piece sits behind its own lock that is never held across an `.await`, so
//! edits, folder toggles, and selection changes stay available while a chat
//! send is waiting on the oracle.

pub mod chat;
pub mod context;
pub mod selection;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::app::chat::{ChatSession, SendOutcome};
use crate::app::context::AssistantContextBuilder;
use crate::app::selection::Selection;
use crate::domain::chat::ChatMessage;
use crate::domain::project::{Node, NodeId, ProjectTree, ProjectTreeError, TreeRow};
use crate::domain::seed;
use crate::infra::oracle::AssistantOracle;

/// Editor session: project tree, selection, and assistant transcript.
pub struct App {
    chat: ChatSession,
    selection: Mutex<Selection>,
    tree: Mutex<ProjectTree>,
}

impl App {
    pub fn new(tree: ProjectTree, selection: Selection, chat: ChatSession) -> Self {
        Self {
            chat,
            selection: Mutex::new(selection),
            tree: Mutex::new(tree),
        }
    }

    /// Creates a session over the starter project with its default file
    /// selected and the Construct 3 policy.
    ///
    /// # Errors
    /// Returns an error if the seed project violates tree invariants.
    pub fn with_seed_project(oracle: Arc<dyn AssistantOracle>) -> Result<Self, ProjectTreeError> {
        let tree = seed::initial_project()?;
        info!(nodes = tree.len(), "loaded starter project");

        Ok(Self::new(
            tree,
            Selection::new(Some(seed::default_selection())),
            ChatSession::new(AssistantContextBuilder::default(), oracle),
        ))
    }

    /// Returns the current tree value.
    pub fn tree(&self) -> ProjectTree {
        self.lock_tree().clone()
    }

    /// Returns display rows for the current tree.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        self.lock_tree().visible_rows()
    }

    pub fn selected_id(&self) -> Option<NodeId> {
        self.lock_selection().selected_id().cloned()
    }

    /// Resolves the selection against the current tree.
    pub fn selected_node(&self) -> Option<Arc<Node>> {
        let selection = self.lock_selection().clone();

        selection.resolve(&self.lock_tree()).cloned()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.chat.messages()
    }

    pub fn is_generating(&self) -> bool {
        self.chat.is_generating()
    }

    /// Selects `id` without checking that it resolves.
    pub fn select(&self, id: NodeId) {
        debug!(%id, "selected node");
        self.lock_selection().select(id);
    }

    /// Flips the expansion flag of folder `id`; other ids are ignored.
    pub fn toggle_folder(&self, id: &NodeId) {
        let mut tree = self.lock_tree();
        let toggled = tree.toggle_folder(id);
        debug!(%id, "toggled folder");
        *tree = toggled;
    }

    /// Replaces the selected file's content.
    ///
    /// Does nothing without a selection or when it does not resolve to a
    /// file.
    pub fn edit_content(&self, content: String) {
        let Some(id) = self.selected_id() else {
            debug!("ignoring edit without a selection");

            return;
        };

        let mut tree = self.lock_tree();
        let edited = tree.update_content(&id, content);
        debug!(%id, "edited file content");
        *tree = edited;
    }

    /// Sends a chat message about the currently selected file.
    pub async fn send(&self, utterance: &str) -> SendOutcome {
        let selected = self.selected_node();

        self.chat.send(utterance, selected).await
    }

    fn lock_tree(&self) -> MutexGuard<'_, ProjectTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
