//! Single-flight chat session orchestration.
//!
//! A send appends the user message immediately, resolves the selected file,
//! and hands at most one oracle call to a detached task. Every branch ends
//! with exactly one model message and the session returning to idle, even
//! when the caller stops waiting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::app::context::AssistantContextBuilder;
use crate::domain::chat::{ChatMessage, MessageRole};
use crate::domain::project::Node;
use crate::infra::oracle::AssistantOracle;

/// Model reply used when no editable file is selected.
pub const SELECT_FILE_ADVISORY: &str =
    "Please select a file to edit so I can understand the context.";
/// Model reply used when the oracle call fails.
pub const ORACLE_ERROR_MESSAGE: &str = "Error communicating with the Construct 3 Expert agent.";
/// Model reply used when the oracle answers with empty text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "No response generated.";

/// Branch taken by one [`ChatSession::send`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Another send was in flight; nothing was appended.
    Rejected,
    /// No editable file was selected; the advisory reply was appended.
    Advisory,
    /// The oracle answered and its text was appended.
    Answered,
    /// The oracle failed or answered empty; a fixed reply was appended.
    Fallback,
}

#[derive(Default)]
struct Transcript {
    is_generating: bool,
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Appends one message, clamping its timestamp so order never goes
    /// backwards.
    fn append(&mut self, role: MessageRole, text: impl Into<String>) {
        let mut message = ChatMessage::new(role, text);
        if let Some(last) = self.messages.last()
            && message.timestamp < last.timestamp
        {
            message.timestamp = last.timestamp;
        }

        self.messages.push(message);
    }
}

/// Model reply owed for one in-flight oracle call.
///
/// Dropping it appends the reply and clears the generating flag under one
/// lock. A slot dropped before [`PendingReply::finish`] appends
/// [`ORACLE_ERROR_MESSAGE`].
struct PendingReply {
    reply: Option<String>,
    transcript: Arc<Mutex<Transcript>>,
}

impl PendingReply {
    fn finish(mut self, reply: String) {
        self.reply = Some(reply);
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        let reply = self
            .reply
            .take()
            .unwrap_or_else(|| ORACLE_ERROR_MESSAGE.to_string());
        let mut transcript = lock_transcript(&self.transcript);
        transcript.append(MessageRole::Model, reply);
        transcript.is_generating = false;
    }
}

/// Ordered transcript plus the single-flight gate for oracle calls.
pub struct ChatSession {
    context_builder: AssistantContextBuilder,
    oracle: Arc<dyn AssistantOracle>,
    transcript: Arc<Mutex<Transcript>>,
}

impl ChatSession {
    pub fn new(context_builder: AssistantContextBuilder, oracle: Arc<dyn AssistantOracle>) -> Self {
        Self {
            context_builder,
            oracle,
            transcript: Arc::new(Mutex::new(Transcript::default())),
        }
    }

    /// Returns a snapshot of the transcript in append order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock_transcript(&self.transcript).messages.clone()
    }

    /// Returns whether an oracle call is in flight.
    pub fn is_generating(&self) -> bool {
        lock_transcript(&self.transcript).is_generating
    }

    /// Sends one user utterance about `selected`.
    ///
    /// The user message is appended before any suspension. While a previous
    /// send is still awaiting the oracle, the call is rejected without
    /// touching the transcript. The oracle call runs on its own task, so
    /// dropping this future does not cancel it: the reply is still appended
    /// when it arrives. Failures are never returned; they become a fixed
    /// model reply.
    pub async fn send(&self, utterance: &str, selected: Option<Arc<Node>>) -> SendOutcome {
        let file = selected.as_deref().and_then(editable_file);
        let (request, pending) = {
            let mut transcript = lock_transcript(&self.transcript);
            if transcript.is_generating {
                debug!("rejecting send while a response is pending");

                return SendOutcome::Rejected;
            }

            transcript.append(MessageRole::User, utterance);
            let Some((file_name, file_content)) = file else {
                debug!("no editable file selected, skipping oracle");
                transcript.append(MessageRole::Model, SELECT_FILE_ADVISORY);

                return SendOutcome::Advisory;
            };

            transcript.is_generating = true;
            let request = self
                .context_builder
                .build(file_name, Some(file_content), utterance);
            let pending = PendingReply {
                reply: None,
                transcript: Arc::clone(&self.transcript),
            };

            (request, pending)
        };

        let response = self.oracle.invoke(request);
        let task = tokio::spawn(async move {
            let (reply, outcome) = match response.await {
                Ok(text) if !text.is_empty() => (text, SendOutcome::Answered),
                Ok(_) => {
                    warn!("oracle returned an empty response");

                    (EMPTY_RESPONSE_MESSAGE.to_string(), SendOutcome::Fallback)
                }
                Err(error) => {
                    warn!(%error, "oracle request failed");

                    (ORACLE_ERROR_MESSAGE.to_string(), SendOutcome::Fallback)
                }
            };
            pending.finish(reply);

            outcome
        });

        task.await.unwrap_or_else(|error| {
            warn!(%error, "oracle task did not complete");

            SendOutcome::Fallback
        })
    }
}

/// Returns name and content when `node` is a file with non-empty content.
fn editable_file(node: &Node) -> Option<(&str, &str)> {
    match node {
        Node::File(file) => file
            .content
            .as_deref()
            .filter(|content| !content.is_empty())
            .map(|content| (file.name.as_str(), content)),
        Node::Folder(_) => None,
    }
}

fn lock_transcript(transcript: &Mutex<Transcript>) -> MutexGuard<'_, Transcript> {
    transcript.lock().unwrap_or_else(PoisonError::into_inner)
}
