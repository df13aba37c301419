//! Request bundle construction for the assistant oracle.

use crate::infra::oracle::AssistantRequest;

/// Placeholder sent in place of file content that is not loaded.
pub const NO_CONTENT_MARKER: &str = "(no content loaded)";

/// Default standing instructions for the Construct 3 assistant.
const CONSTRUCT3_POLICY: &str = include_str!("../../templates/construct3_policy.md");

/// Combines a fixed policy with per-request file context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantContextBuilder {
    policy_text: String,
}

impl AssistantContextBuilder {
    pub fn new(policy_text: impl Into<String>) -> Self {
        Self {
            policy_text: policy_text.into(),
        }
    }

    /// Builds one request bundle.
    ///
    /// Content is forwarded verbatim; `None` is replaced by
    /// [`NO_CONTENT_MARKER`] so every bundle carries the same sections.
    pub fn build(
        &self,
        file_name: &str,
        file_content: Option<&str>,
        user_utterance: &str,
    ) -> AssistantRequest {
        AssistantRequest {
            policy_text: self.policy_text.clone(),
            file_name: file_name.to_string(),
            file_content: file_content.unwrap_or(NO_CONTENT_MARKER).to_string(),
            user_utterance: user_utterance.to_string(),
        }
    }
}

impl Default for AssistantContextBuilder {
    fn default() -> Self {
        Self::new(CONSTRUCT3_POLICY.trim())
    }
}
