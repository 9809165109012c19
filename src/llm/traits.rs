//! 模型调用抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 ChatModel：给定完整对话历史，返回一次完整回答（仅非流式）。

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::BoxError;
use crate::memory::ChatHistory;

/// 单次调用的 token 统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// 模型回答：正文与可选的附加信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatAnswer {
    pub result: String,
    pub usage: Option<TokenUsage>,
}

impl ChatAnswer {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            usage: None,
        }
    }
}

/// 后端错误（网络、超时、取消、返回为空等）
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Empty response")]
    EmptyResponse,

    #[error("Script exhausted after {0} answers")]
    ScriptExhausted(usize),
}

/// 模型调用能力：非流式完成
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        cancel: &CancellationToken,
        history: &ChatHistory,
    ) -> Result<ChatAnswer, BoxError>;
}
