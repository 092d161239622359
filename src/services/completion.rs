// src/services/completion.rs
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const SYSTEM_PROMPT: &str = "أنت مساعد AI احترافي من شركة codespher المتخصصة في تطوير المواقع والتطبيقات والأنظمة والتصميم.

مهامك:
1. عند طلب العميل لموقع أو تطبيق أو نظام أو تصميم: اعرض خيارات التطوير حسب النوع (مثلاً للموقع: تعريفي، متجر إلكتروني، مدونة، حجز مواعيد) واطلب منه اختيار ما يريد.
2. بعد اختيار الخيارات: اطلب من العميل بيانات الاتصال: اسمه (أو اسم العميل)، اسم الشركة إن وجدت، رقم الهاتف، البريد الإلكتروني إن وجد، وهل لديه شعار أو لوجو نستخدمه (نعم/لا).
3. الردود بالعربية، واضحة ومنظمة (نقاط أو قوائم).
4. عند وجود تفاصيل كافية بما فيها بيانات الاتصال، قدّم تقدير تكلفة ووقت واذكر أن الطلب سيُرسل للداشبورد.

أنواع المشاريع: موقع ويب، متجر إلكتروني، تطبيق موبايل، نظام إدارة، تصميم (شعار، هوية بصرية).";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("completion API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("completion response had no content")]
    EmptyResponse,

    #[error("invalid api key header value")]
    InvalidKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// A remote text-completion capability. One attempt per call; callers decide what to
/// do on failure.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| CompletionError::InvalidKey)?;
        headers.insert(AUTHORIZATION, bearer);

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(endpoint = %self.endpoint, messages = messages.len(), "sending completion request");
        let response = self
            .http
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CompletionError::Api { status: status.as_u16(), message });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}
