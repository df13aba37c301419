//! Assistant oracle boundary.
//!
//! Defines the [`AssistantOracle`] trait and the [`AssistantRequest`] bundle
//! it consumes. The oracle is treated as opaque: it maps one request to
//! response text or an [`OracleError`], with no latency guarantee.

pub mod gemini;

use std::future::Future;
use std::pin::Pin;
use std::process::ExitStatus;

use askama::Template;

use crate::infra::config::ConfigError;

/// Boxed async result used by [`AssistantOracle`] methods.
pub type OracleFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Context bundle for one assistant request.
///
/// Sections are kept separate so transports can place them however the
/// provider expects; [`AssistantRequest::render_prompt`] yields the canonical
/// single-text layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantRequest {
    /// Standing instructions for the assistant.
    pub policy_text: String,
    /// Display name of the file under discussion.
    pub file_name: String,
    /// Full file content, or a placeholder marker when none is loaded.
    pub file_content: String,
    /// Raw user message.
    pub user_utterance: String,
}

/// Askama view model for rendering one assistant request.
#[derive(Template)]
#[template(path = "assistant_request.md", escape = "none")]
struct AssistantRequestTemplate<'a> {
    file_content: &'a str,
    file_name: &'a str,
    policy_text: &'a str,
    user_utterance: &'a str,
}

impl AssistantRequest {
    /// Renders the request as one delimited prompt: policy, file name, file
    /// content, then the user utterance.
    ///
    /// # Errors
    /// Returns [`OracleError::Render`] if template rendering fails.
    pub fn render_prompt(&self) -> Result<String, OracleError> {
        let template = AssistantRequestTemplate {
            file_content: &self.file_content,
            file_name: &self.file_name,
            policy_text: &self.policy_text,
            user_utterance: &self.user_utterance,
        };

        Ok(template.render()?)
    }
}

/// Failures reported by an oracle transport.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to render assistant request: {0}")]
    Render(#[from] askama::Error),
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Exited {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Asynchronous service that answers assistant requests.
///
/// The trait is object-safe so it can be held as `Arc<dyn AssistantOracle>`.
#[cfg_attr(test, mockall::automock)]
pub trait AssistantOracle: Send + Sync {
    /// Sends one request and resolves to the response text.
    ///
    /// # Errors
    /// Returns [`OracleError`] on missing configuration or transport failure.
    fn invoke(&self, request: AssistantRequest) -> OracleFuture<Result<String, OracleError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> AssistantRequest {
        AssistantRequest {
            policy_text: "Be helpful.".to_string(),
            file_name: "main.js".to_string(),
            file_content: content.to_string(),
            user_utterance: "Add a jump".to_string(),
        }
    }

    #[test]
    fn test_render_prompt_orders_sections() {
        // Arrange
        let request = request("let x = 1;");

        // Act
        let prompt = request.render_prompt().expect("prompt should render");

        // Assert
        assert_eq!(
            prompt.trim_end(),
            "Be helpful.\n\nContext File: main.js\n\nCurrent Content:\nlet x = 1;\n\nUser Request: Add a jump"
        );
    }

    #[test]
    fn test_render_prompt_keeps_markup_unescaped() {
        // Arrange
        let request = request("if (a < b && c > d) { log(\"<ok>\"); }");

        // Act
        let prompt = request.render_prompt().expect("prompt should render");

        // Assert
        assert!(prompt.contains("if (a < b && c > d) { log(\"<ok>\"); }"));
    }
}
