//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；结构化用户内容展平为文本后发送。
//! 每次请求受取消令牌与请求超时约束。

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::LlmSection;
use crate::core::BoxError;
use crate::llm::{ChatAnswer, ChatModel, LlmError, TokenUsage};
use crate::memory::{ChatHistory, Role};

/// OpenAI 兼容客户端：持有 Client、model 名与请求超时
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    timeout_secs: u64,
}

impl OpenAiChatModel {
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            timeout_secs,
        }
    }

    pub fn from_config(llm: &LlmSection) -> Self {
        Self::new(
            llm.base_url.as_deref(),
            &llm.model,
            llm.api_key.as_deref(),
            llm.timeouts.request,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_openai_messages(
        history: &ChatHistory,
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        history
            .iter()
            .map(|m| {
                let text = m.text();
                let msg = match m.role() {
                    Role::System => ChatCompletionRequestSystemMessageArgs::default()
                        .content(text)
                        .build()
                        .map(ChatCompletionRequestMessage::System),
                    Role::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(text)
                        .build()
                        .map(ChatCompletionRequestMessage::User),
                    Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                        .content(text)
                        .build()
                        .map(ChatCompletionRequestMessage::Assistant),
                };
                msg.map_err(|e| LlmError::ApiError(e.to_string()))
            })
            .collect()
    }

    async fn request(&self, history: &ChatHistory) -> Result<ChatAnswer, LlmError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::to_openai_messages(history)?)
            .build()
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        let usage = response.usage.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens as u64,
            completion_tokens: u.completion_tokens as u64,
            total_tokens: u.total_tokens as u64,
        });

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)?;

        Ok(ChatAnswer {
            result: content,
            usage,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn chat(
        &self,
        cancel: &CancellationToken,
        history: &ChatHistory,
    ) -> Result<ChatAnswer, BoxError> {
        let deadline = Duration::from_secs(self.timeout_secs);
        let result = tokio::select! {
            biased;

            () = cancel.cancelled() => Err(LlmError::Cancelled),
            res = tokio::time::timeout(deadline, self.request(history)) => {
                res.unwrap_or(Err(LlmError::Timeout(self.timeout_secs)))
            }
        };
        if let Some(usage) = result.as_ref().ok().and_then(|a| a.usage) {
            tracing::debug!(
                model = %self.model(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "llm usage"
            );
        }
        result.map_err(Into::into)
    }
}
