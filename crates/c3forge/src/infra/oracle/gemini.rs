//! Gemini CLI subprocess oracle.

use std::process::{Command, Stdio};

use tracing::debug;

use super::{AssistantOracle, AssistantRequest, OracleError, OracleFuture};
use crate::infra::config::OracleConfig;

/// Environment variable the Gemini CLI reads its credential from.
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// [`AssistantOracle`] that spawns one Gemini CLI process per request.
///
/// The rendered prompt is passed as a single argument and trimmed stdout is
/// returned as the response text.
pub struct GeminiCliOracle {
    config: OracleConfig,
}

impl GeminiCliOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    /// Builds the provider command for one request.
    ///
    /// # Errors
    /// Returns an error when the credential is missing or the prompt cannot
    /// be rendered.
    fn build_command(&self, request: &AssistantRequest) -> Result<Command, OracleError> {
        let api_key = self.config.api_key()?;
        let prompt = request.render_prompt()?;

        let mut command = Command::new(&self.config.program);
        command
            .arg("--model")
            .arg(&self.config.model)
            .arg("--output-format")
            .arg("text")
            .arg("--prompt")
            .arg(prompt)
            .env(GEMINI_API_KEY_ENV, api_key)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        Ok(command)
    }
}

impl AssistantOracle for GeminiCliOracle {
    fn invoke(&self, request: AssistantRequest) -> OracleFuture<Result<String, OracleError>> {
        let build_result = self.build_command(&request);
        let program = self.config.program.clone();

        Box::pin(async move {
            let command = build_result?;
            debug!(program = %program, file = %request.file_name, "invoking oracle");

            let output = tokio::process::Command::from(command)
                .output()
                .await
                .map_err(|source| OracleError::Spawn {
                    program: program.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err(OracleError::Exited {
                    program,
                    status: output.status,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        })
    }
}
