// Resume evaluation: prompt construction, the model call, and normalization
// of the completion into a bounded `EvaluationResult`.
// All model calls go through llm_client; nothing here speaks HTTP directly.

pub mod normalizer;
pub mod prompts;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{CompletionClient, LlmError};
use normalizer::{normalize, EvaluationResult};

/// Builds the evaluation prompt and returns the model's raw completion.
pub async fn request_evaluation(
    llm: &dyn CompletionClient,
    resume_text: &str,
    job_description: &str,
) -> Result<String, LlmError> {
    let prompt = prompts::build_evaluation_prompt(resume_text, job_description);
    llm.complete(&prompt).await
}

/// Full evaluation pipeline: prompt → completion → normalized result.
pub async fn evaluate_resume(
    llm: &dyn CompletionClient,
    resume_text: &str,
    job_description: &str,
) -> Result<EvaluationResult, AppError> {
    let raw = request_evaluation(llm, resume_text, job_description).await?;

    let normalized = normalize(&raw)?;
    if normalized.is_degraded() {
        warn!(
            "Model completion was not valid JSON ({} chars); returning degraded result",
            raw.chars().count()
        );
    }

    let result = normalized.into_result();
    info!("Evaluation complete: score={}", result.score);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a canned completion and remembers the prompt it was given.
    struct RecordingClient {
        completion: Result<String, ()>,
        last_prompt: Mutex<Option<String>>,
    }

    impl RecordingClient {
        fn replying(completion: &str) -> Self {
            Self {
                completion: Ok(completion.to_string()),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                completion: Err(()),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.completion.clone().map_err(|_| LlmError::MissingApiKey)
        }
    }

    #[tokio::test]
    async fn test_request_evaluation_sends_both_inputs() {
        let client = RecordingClient::replying("{}");
        request_evaluation(&client, "Rust, Tokio, Axum", "Backend engineer")
            .await
            .unwrap();

        let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Rust, Tokio, Axum"));
        assert!(prompt.contains("Backend engineer"));
    }

    #[tokio::test]
    async fn test_evaluate_resume_normalizes_completion() {
        let client = RecordingClient::replying(
            r#"```json
{"score": 91, "improvements": ["1", "2", "3", "4", "5"]}
```"#,
        );
        let result = evaluate_resume(&client, "resume", "jd").await.unwrap();
        assert_eq!(result.score, 91);
        assert_eq!(result.improvements.map(|v| v.len()), Some(4));
    }

    #[tokio::test]
    async fn test_evaluate_resume_absorbs_malformed_completion() {
        let client = RecordingClient::replying(r#"I'd say "score": 55 overall"#);
        let result = evaluate_resume(&client, "resume", "jd").await.unwrap();
        assert_eq!(result.score, 55);
    }

    #[tokio::test]
    async fn test_evaluate_resume_propagates_llm_failure() {
        let client = RecordingClient::failing();
        let err = evaluate_resume(&client, "resume", "jd").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_evaluate_resume_rejects_scoreless_json() {
        let client = RecordingClient::replying(r#"{"feedback": "great"}"#);
        let err = evaluate_resume(&client, "resume", "jd").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "An error occurred: Missing 'score' field in response"
        );
    }
}
