//! Natural-language explanations from an external text-generation service.
//!
//! Explanations are decoration on top of a finished numeric result, so every
//! failure path here ends in a placeholder string instead of an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

pub const MISSING_KEY_PLACEHOLDER: &str =
    "Gemini API key not configured. Please add GEMINI_API_KEY to your environment.";
pub const EMPTY_RESPONSE_PLACEHOLDER: &str =
    "Sorry, I couldn't generate a response. Please try again.";
pub const CONNECTION_PLACEHOLDER: &str =
    "Error connecting to Gemini API. Please try again later.";

/// Flat key/value snapshot handed to the model alongside the prompt.
pub type ExplainContext = Map<String, Value>;

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, prompt: &str, context: &ExplainContext) -> String;
}

/// Returns a fixed reply; used when no upstream service is wanted.
#[derive(Debug, Clone)]
pub struct StaticExplainer {
    reply: String,
}

impl StaticExplainer {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl Explainer for StaticExplainer {
    async fn explain(&self, _prompt: &str, _context: &ExplainContext) -> String {
        self.reply.clone()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiExplainer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiExplainer {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    async fn request(&self, key: &str, body: &Value) -> String {
        let response = match self
            .client
            .post(&self.api_url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            // The URL carries the key; it must reach neither the logs nor the caller.
            Err(e) => {
                let timed_out = e.is_timeout();
                tracing::warn!(
                    error = %e.without_url(),
                    timed_out,
                    "text generation request failed"
                );
                return CONNECTION_PLACEHOLDER.to_string();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "text generation returned non-success");
            return format!(
                "API Error: {}. Please check your API key and try again.",
                status.as_u16()
            );
        }

        match response.json::<GenerateResponse>().await {
            Ok(parsed) => first_text(parsed).unwrap_or_else(|| {
                tracing::debug!("text generation returned no candidates");
                EMPTY_RESPONSE_PLACEHOLDER.to_string()
            }),
            Err(e) => {
                tracing::warn!(
                    error = %e.without_url(),
                    "text generation response was not understood"
                );
                EMPTY_RESPONSE_PLACEHOLDER.to_string()
            }
        }
    }
}

#[async_trait]
impl Explainer for GeminiExplainer {
    async fn explain(&self, prompt: &str, context: &ExplainContext) -> String {
        let Some(key) = self.api_key.as_deref() else {
            return MISSING_KEY_PLACEHOLDER.to_string();
        };
        let body = json!({
            "contents": [{
                "parts": [{ "text": advisor_prompt(prompt, context) }]
            }]
        });
        self.request(key, &body).await
    }
}

fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .next()
        .map(|part| part.text)
        .filter(|text| !text.is_empty())
}

/// Wraps a query in the advisor persona and the serialized context.
pub fn advisor_prompt(prompt: &str, context: &ExplainContext) -> String {
    let context = if context.is_empty() {
        "None".to_string()
    } else {
        Value::Object(context.clone()).to_string()
    };
    format!(
        "You are a financial advisor specializing in Indian markets and regulations.\n\
         Always provide:\n\
         - Simple explanations in bullet points\n\
         - Local Indian examples (INR, Indian banks, schemes)\n\
         - Avoid jargon, use simple language\n\
         - Include relevant disclaimers\n\
         - Focus on practical, actionable advice\n\n\
         Context: {context}\n\n\
         User Query: {prompt}\n\n\
         Please provide a helpful, educational response suitable for Indian users."
    )
}

/// Builds an `ExplainContext` from `key => value` pairs.
#[macro_export]
macro_rules! explain_context {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut context = $crate::explain::ExplainContext::new();
        $( context.insert($key.to_string(), ::serde_json::json!($value)); )*
        context
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_yields_placeholder() {
        let explainer = GeminiExplainer::new(
            "http://127.0.0.1:9/unused",
            Some("   ".to_string()),
            Duration::from_secs(1),
        )
        .expect("client builds");
        let reply = explainer.explain("hello", &ExplainContext::new()).await;
        assert_eq!(reply, MISSING_KEY_PLACEHOLDER);
    }

    const SECRET_KEY: &str = "SUPER-SECRET-KEY";

    fn explainer_for(url: &str, timeout: Duration) -> GeminiExplainer {
        GeminiExplainer::new(url, Some(SECRET_KEY.to_string()), timeout).expect("client builds")
    }

    /// Serves a stub generation endpoint on an ephemeral port and returns its base URL.
    async fn spawn_stub(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn unreachable_service_yields_placeholder_without_key() {
        let explainer = explainer_for("http://127.0.0.1:9/generate", Duration::from_millis(500));
        let reply = explainer.explain("hello", &ExplainContext::new()).await;
        assert_eq!(reply, CONNECTION_PLACEHOLDER);
        assert!(!reply.contains(SECRET_KEY), "{reply}");
    }

    #[tokio::test]
    async fn non_success_status_reports_code_without_key() {
        use axum::http::StatusCode;
        use axum::routing::post;

        let base = spawn_stub(axum::Router::new().route(
            "/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;
        let explainer = explainer_for(&format!("{base}/generate"), Duration::from_secs(5));
        let reply = explainer.explain("hello", &ExplainContext::new()).await;
        assert_eq!(
            reply,
            "API Error: 500. Please check your API key and try again."
        );
        assert!(!reply.contains(SECRET_KEY));
    }

    #[tokio::test]
    async fn slow_service_times_out_to_placeholder_without_key() {
        use axum::routing::post;

        let base = spawn_stub(axum::Router::new().route(
            "/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        ))
        .await;
        let explainer = explainer_for(&format!("{base}/generate"), Duration::from_millis(200));
        let reply = explainer.explain("hello", &ExplainContext::new()).await;
        assert_eq!(reply, CONNECTION_PLACEHOLDER);
        assert!(!reply.contains(SECRET_KEY));
    }

    #[tokio::test]
    async fn successful_reply_returns_first_candidate_text() {
        use axum::routing::post;

        let base = spawn_stub(axum::Router::new().route(
            "/generate",
            post(|| async {
                axum::Json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "Start a SIP early." }] } }]
                }))
            }),
        ))
        .await;
        let explainer = explainer_for(&format!("{base}/generate"), Duration::from_secs(5));
        let reply = explainer.explain("hello", &ExplainContext::new()).await;
        assert_eq!(reply, "Start a SIP early.");
    }

    #[tokio::test]
    async fn static_explainer_echoes_reply() {
        let explainer = StaticExplainer::new("fixed");
        assert_eq!(explainer.explain("x", &ExplainContext::new()).await, "fixed");
    }

    #[test]
    fn prompt_embeds_context_and_query() {
        let context = crate::explain_context! {
            "total_tax" => 18_200.0,
            "regime" => "new",
        };
        let prompt = advisor_prompt("Explain my tax", &context);
        assert!(prompt.contains("\"total_tax\":18200.0"));
        assert!(prompt.contains("User Query: Explain my tax"));
        assert!(advisor_prompt("q", &ExplainContext::new()).contains("Context: None"));
    }

    #[test]
    fn first_text_skips_empty_candidates() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).expect("json");
        assert!(first_text(parsed).is_none());

        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Compounding helps."}]}}]}"#,
        )
        .expect("json");
        assert_eq!(first_text(parsed).as_deref(), Some("Compounding helps."));
    }
}
