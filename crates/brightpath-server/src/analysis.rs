//! Generative analysis of screening responses.
//!
//! Collected answers are summarised by an external language model. The
//! prompt pins the model to an informational, non-diagnostic register.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::AnalysisConfig;

/// Message shown to clients when the provider call fails.
pub const ANALYSIS_UNAVAILABLE: &str = "An error occurred while processing your request. \
     Please try again later. Remember, this tool is for informational purposes only \
     and not for diagnosis.";

/// Produces a summary from free-form answer text.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Generates the summary text for a rendered prompt.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Builds the guideline prompt around the user's answers.
pub fn render_prompt(user_answers: &str) -> String {
    format!(
        "The user has provided answers to a set of questions designed to explore \
         potential autistic traits.\nHere are their responses:\n{user_answers}\n\n\
         Based ONLY on these responses, and generally understood characteristics of \
         Autism Spectrum Disorder (ASD) (which include challenges in social \
         communication and interaction, and restricted, repetitive patterns of \
         behavior, interests, or activities, as outlined in diagnostic manuals like \
         the DSM-5), please provide a neutral, informative summary.\n\n\
         **CRITICAL GUIDELINES:**\n\
         1.  **DO NOT make any form of medical diagnosis.**\n\
         2.  **DO NOT assign a \"level of autism\" (Level 1, 2, or 3).**\n\
         3.  **DO NOT use language that implies certainty about a diagnosis.**\n\
         4.  **Clearly state that this tool is for informational purposes only and \
         is not a substitute for professional medical advice, diagnosis, or \
         treatment.**\n\
         5.  **Encourage the user to consult with a qualified healthcare \
         professional (e.g., a doctor, psychologist, or developmental specialist) \
         for an accurate assessment.**\n\
         6.  Focus on providing general insights into how the responses might align \
         with common characteristics sometimes associated with ASD, without \
         confirming or denying a diagnosis.\n\
         7.  Maintain a supportive, non-judgmental, and empathetic tone.\n\
         8.  Suggest that the user discusses these observations with a professional."
    )
}

/// Calls a Gemini-style `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("generateContent returned {}", response.status());
        }
        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| anyhow::anyhow!("empty generateContent response"))?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn prompt_embeds_answers_and_guidelines() {
        let prompt = render_prompt("Q1: sometimes\nQ2: rarely");
        assert!(prompt.contains("Q1: sometimes"));
        assert!(prompt.contains("CRITICAL GUIDELINES"));
        assert!(prompt.contains("DO NOT make any form of medical diagnosis"));
    }

    #[tokio::test]
    async fn generate_extracts_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    { "content": { "parts": [{ "text": "A careful summary." }] } }
                ]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&AnalysisConfig {
            endpoint: server.uri(),
            model: "gemini-1.5-flash".into(),
            api_key: "test-key".into(),
        });
        let text = client.generate("prompt").await.unwrap();
        assert_eq!(text, "A careful summary.");
    }

    #[tokio::test]
    async fn provider_errors_bubble_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&AnalysisConfig {
            endpoint: server.uri(),
            model: "gemini-1.5-flash".into(),
            api_key: "test-key".into(),
        });
        assert!(client.generate("prompt").await.is_err());
    }
}
