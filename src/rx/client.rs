use crate::rx::config::RxRemoteConfig;
use crate::rx::locale::Locale;
use crate::rx::model::{AnalysisInputs, AnalysisResult, GroundingSource};
use crate::rx::parser::{ResponseParser, SentinelParser};
use crate::rx::prompt::build_prompt;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const INVALID_CREDENTIAL_MARKERS: [&str; 3] =
    ["api key not valid", "invalid api key", "api_key_invalid"];
const SAFETY_REASON: &str = "SAFETY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub web_search: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub block_reason: Option<String>,
    pub grounding: Vec<GroundingSource>,
}

/// One text-generation round trip against a remote model.
pub trait GenerativeBackend {
    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

#[derive(Debug, Clone)]
pub struct GeminiBackend {
    api_key: String,
    api_base: String,
    request_timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, remote: &RxRemoteConfig) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: remote.api_base.trim().trim_end_matches('/').to_string(),
            request_timeout_secs: remote.request_timeout_secs,
        }
    }

    fn http_client(&self) -> Result<Client> {
        let timeout = match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Client::builder().timeout(timeout).build()?)
    }
}

impl GenerativeBackend for GeminiBackend {
    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base, request.model
        );

        let mut payload = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        {"text": request.prompt}
                    ]
                }
            ]
        });
        if request.web_search {
            payload["tools"] = serde_json::json!([{"google_search": {}}]);
        }

        let client = self.http_client()?;
        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .context("gemini request failed")?;
        let status = response.status();
        let body = response.text().context("failed to read gemini response body")?;
        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(body);
            anyhow::bail!("gemini call failed with status {status}: {detail}");
        }

        let json: Value =
            serde_json::from_str(&body).context("gemini response was not valid json")?;
        Ok(extract_gemini_response(&json))
    }
}

pub fn extract_gemini_response(json: &Value) -> GenerateResponse {
    let candidate = json
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first());

    let text = candidate
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .filter(|t| !t.is_empty());

    let finish_reason = candidate
        .and_then(|c| c.get("finishReason"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let block_reason = json
        .get("promptFeedback")
        .and_then(|p| p.get("blockReason"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let grounding = candidate
        .and_then(|c| c.get("groundingMetadata"))
        .and_then(|g| g.get("groundingChunks"))
        .and_then(Value::as_array)
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| chunk.get("web"))
                .map(|web| GroundingSource {
                    uri: web.get("uri").and_then(Value::as_str).map(str::to_string),
                    title: web.get("title").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    GenerateResponse {
        text,
        finish_reason,
        block_reason,
        grounding,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no API credential is configured")]
    Credential,
    #[error("response was blocked by safety filters")]
    SafetyBlocked,
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("API credential was rejected")]
    InvalidCredential,
    #[error("analysis service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AnalysisError {
    pub fn user_message(&self, locale: &Locale) -> &'static str {
        match self {
            AnalysisError::Credential => locale.messages.api_key_not_set,
            AnalysisError::SafetyBlocked => locale.messages.safety_block,
            AnalysisError::EmptyResponse => locale.messages.no_response,
            AnalysisError::InvalidCredential => locale.messages.api_key_invalid,
            AnalysisError::ServiceUnavailable(_) => locale.messages.service_unavailable,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AnalysisError::Credential => "credential",
            AnalysisError::SafetyBlocked => "safety-blocked",
            AnalysisError::EmptyResponse => "empty-response",
            AnalysisError::InvalidCredential => "invalid-credential",
            AnalysisError::ServiceUnavailable(_) => "service-unavailable",
        }
    }
}

fn classify_backend_error(err: &anyhow::Error) -> AnalysisError {
    let message = format!("{err:#}");
    let lower = message.to_ascii_lowercase();
    if INVALID_CREDENTIAL_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
    {
        return AnalysisError::InvalidCredential;
    }
    AnalysisError::ServiceUnavailable(message)
}

fn is_safety(reason: Option<&str>) -> bool {
    reason.is_some_and(|r| r == SAFETY_REASON)
}

/// Remote analysis client. A missing backend means no credential was
/// available at construction time.
pub struct AnalysisClient<B> {
    backend: Option<B>,
    model: String,
    web_search: bool,
}

impl<B: GenerativeBackend> AnalysisClient<B> {
    pub fn new(backend: Option<B>, remote: &RxRemoteConfig) -> Self {
        Self {
            backend,
            model: remote.model.clone(),
            web_search: remote.web_search,
        }
    }

    pub fn analyze(&self, inputs: &AnalysisInputs) -> Result<AnalysisResult, AnalysisError> {
        let Some(backend) = self.backend.as_ref() else {
            return Err(AnalysisError::Credential);
        };

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: build_prompt(inputs),
            web_search: self.web_search,
        };
        tracing::debug!(
            model = %request.model,
            web_search = request.web_search,
            prompt_chars = request.prompt.chars().count(),
            "sending analysis request"
        );

        let response = match backend.generate(&request) {
            Ok(response) => response,
            Err(err) => {
                let classified = classify_backend_error(&err);
                tracing::warn!(
                    code = classified.code(),
                    error = %format!("{err:#}"),
                    "analysis request failed"
                );
                return Err(classified);
            }
        };

        let Some(text) = response.text.as_deref() else {
            let safety = is_safety(response.finish_reason.as_deref())
                || is_safety(response.block_reason.as_deref());
            let err = if safety {
                AnalysisError::SafetyBlocked
            } else {
                AnalysisError::EmptyResponse
            };
            tracing::warn!(
                code = err.code(),
                finish_reason = response.finish_reason.as_deref().unwrap_or(""),
                block_reason = response.block_reason.as_deref().unwrap_or(""),
                "analysis response had no text"
            );
            return Err(err);
        };

        let parser = SentinelParser::for_language(inputs.language);
        Ok(parser.parse(text, &response.grounding))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rx::locale::locale;
    use crate::rx::model::Language;
    use serde_json::json;
    use std::cell::RefCell;

    pub(crate) enum Reply {
        Ok(GenerateResponse),
        Err(String),
    }

    pub(crate) struct MockBackend {
        reply: Reply,
        pub seen: RefCell<Vec<GenerateRequest>>,
    }

    impl MockBackend {
        pub(crate) fn text(text: &str) -> Self {
            Self::with(Reply::Ok(GenerateResponse {
                text: Some(text.to_string()),
                ..Default::default()
            }))
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self::with(Reply::Err(message.to_string()))
        }

        pub(crate) fn with(reply: Reply) -> Self {
            Self {
                reply,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl GenerativeBackend for MockBackend {
        fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
            self.seen.borrow_mut().push(request.clone());
            match &self.reply {
                Reply::Ok(response) => Ok(response.clone()),
                Reply::Err(message) => Err(anyhow::anyhow!("{message}")),
            }
        }
    }

    fn inputs() -> AnalysisInputs {
        let mut inputs = AnalysisInputs::new(Language::En);
        inputs.add_medication("Warfarin").expect("add");
        inputs.conditions = "atrial fibrillation".to_string();
        inputs
    }

    fn client(backend: MockBackend) -> AnalysisClient<MockBackend> {
        AnalysisClient::new(Some(backend), &RxRemoteConfig::default())
    }

    #[test]
    fn missing_backend_is_a_credential_error() {
        let client: AnalysisClient<MockBackend> =
            AnalysisClient::new(None, &RxRemoteConfig::default());
        assert!(client.backend.is_none());
        assert_eq!(client.analyze(&inputs()), Err(AnalysisError::Credential));
    }

    #[test]
    fn successful_text_is_parsed() {
        let raw = "[INTERACTION_DATA_START]{\"drugDrugInteractions\":[{\"interaction\":\"Warfarin + Aspirin\",\"riskLevel\":\"High\"}]}[INTERACTION_DATA_END]\nBody text";
        let client = client(MockBackend::text(raw));
        let result = client.analyze(&inputs()).expect("analysis");
        assert_eq!(result.drug_drug_interactions.len(), 1);
        assert_eq!(result.analysis_text, "Body text");

        let backend = client.backend.as_ref().expect("backend");
        let seen = backend.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gemini-2.5-flash");
        assert!(seen[0].web_search);
        assert!(seen[0].prompt.contains("Warfarin"));
    }

    #[test]
    fn missing_text_with_safety_reason_is_blocked() {
        let finish = client(MockBackend::with(Reply::Ok(GenerateResponse {
            finish_reason: Some("SAFETY".to_string()),
            ..Default::default()
        })));
        assert_eq!(finish.analyze(&inputs()), Err(AnalysisError::SafetyBlocked));

        let blocked = client(MockBackend::with(Reply::Ok(GenerateResponse {
            block_reason: Some("SAFETY".to_string()),
            ..Default::default()
        })));
        assert_eq!(blocked.analyze(&inputs()), Err(AnalysisError::SafetyBlocked));
    }

    #[test]
    fn missing_text_without_reason_is_empty() {
        let client = client(MockBackend::with(Reply::Ok(GenerateResponse {
            finish_reason: Some("STOP".to_string()),
            ..Default::default()
        })));
        assert_eq!(client.analyze(&inputs()), Err(AnalysisError::EmptyResponse));
    }

    #[test]
    fn rejected_key_messages_are_invalid_credential() {
        for message in [
            "gemini call failed with status 400 Bad Request: API key not valid. Please pass a valid API key.",
            "Invalid API Key supplied",
            "reason: API_KEY_INVALID",
        ] {
            let client = client(MockBackend::failing(message));
            assert_eq!(
                client.analyze(&inputs()),
                Err(AnalysisError::InvalidCredential),
                "{message}"
            );
        }
    }

    #[test]
    fn other_failures_are_service_unavailable() {
        let client = client(MockBackend::failing("connection refused"));
        match client.analyze(&inputs()) {
            Err(AnalysisError::ServiceUnavailable(msg)) => assert!(msg.contains("refused")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn user_messages_are_localized() {
        let es = locale(Language::Es);
        assert_eq!(AnalysisError::Credential.user_message(es), es.messages.api_key_not_set);
        assert_ne!(
            AnalysisError::EmptyResponse.user_message(es),
            AnalysisError::EmptyResponse.user_message(locale(Language::En))
        );
    }

    #[test]
    fn extracts_text_reasons_and_grounding() {
        let json = json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hello "}, {"text": "world"}]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://a.example", "title": "A"}},
                        {"retrievedContext": {"uri": "ignored"}},
                        {"web": {"uri": "https://b.example"}}
                    ]
                }
            }]
        });
        let response = extract_gemini_response(&json);
        assert_eq!(response.text.as_deref(), Some("Hello world"));
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.block_reason, None);
        assert_eq!(response.grounding.len(), 2);
        assert_eq!(response.grounding[1].title, None);
    }

    #[test]
    fn extracts_prompt_block_reason_without_candidates() {
        let json = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let response = extract_gemini_response(&json);
        assert_eq!(response.text, None);
        assert_eq!(response.block_reason.as_deref(), Some("SAFETY"));
        assert!(response.grounding.is_empty());
    }
}
