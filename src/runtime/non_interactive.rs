use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    app::{ChatApp, SubmitOutcome},
    cli::OutputFormat,
};

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// The prompt that was executed
    pub prompt: String,
    /// The model's response, or the user-facing error text
    pub response: String,
    /// Failure details, if the round trip failed
    pub error: Option<ErrorInfo>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Model used
    pub model: String,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

impl NonInteractiveResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Non-interactive runner for executing single prompts
pub struct NonInteractiveRunner {
    app: ChatApp,
}

impl NonInteractiveRunner {
    pub fn new(app: ChatApp) -> Self {
        Self { app }
    }

    /// Execute a single prompt and return the result
    pub async fn execute(
        &mut self,
        prompt: String,
        cancel: &CancellationToken,
    ) -> NonInteractiveResult {
        let start_time = std::time::Instant::now();
        let model = self.app.gateway().model_name();

        let (response, error) = match self.app.submit(&prompt, cancel).await {
            SubmitOutcome::Replied { reply, .. } => (reply, None),
            SubmitOutcome::Failed(e) => (
                e.user_message(),
                Some(ErrorInfo {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }),
            ),
            SubmitOutcome::Ignored => (
                String::new(),
                Some(ErrorInfo {
                    kind: "empty_message".to_string(),
                    message: "prompt is empty".to_string(),
                }),
            ),
        };

        NonInteractiveResult {
            prompt,
            response,
            error,
            metadata: ExecutionMetadata {
                model,
                duration_ms: start_time.elapsed().as_millis(),
            },
        }
    }

    /// Format the result according to the output format
    pub fn format_result(result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = result.response.clone();
                if let Some(error) = &result.error {
                    output.push_str(&format!("\n\n--- Error ---\n{}: {}\n", error.kind, error.message));
                }
                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();

                output.push_str("## Prompt\n\n");
                output.push_str(&result.prompt);
                output.push_str("\n\n## Response\n\n");
                output.push_str(&result.response);
                output.push_str("\n\n");

                if let Some(error) = &result.error {
                    output.push_str("## Error\n\n");
                    output.push_str(&format!("- **{}**: {}\n\n", error.kind, error.message));
                }

                output.push_str("---\n");
                output.push_str(&format!(
                    "*Model: {} | Duration: {}ms*\n",
                    result.metadata.model, result.metadata.duration_ms
                ));

                output
            }
        }
    }
}
