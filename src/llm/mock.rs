//! 脚本化 Mock 模型（用于测试与演示，无需 API）
//!
//! 按顺序返回预置回答，并记录每次调用时看到的对话历史；脚本用完后返回 ScriptExhausted。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::BoxError;
use crate::llm::{ChatAnswer, ChatModel, LlmError};
use crate::memory::ChatHistory;

#[derive(Debug, Default)]
pub struct ScriptedChatModel {
    answers: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<ChatHistory>>,
}

impl ScriptedChatModel {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| Ok(a.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 追加一次成功回答
    pub fn push_answer(&self, answer: impl Into<String>) {
        lock(&self.answers).push_back(Ok(answer.into()));
    }

    /// 追加一次失败调用
    pub fn push_failure(&self, reason: impl Into<String>) {
        lock(&self.answers).push_back(Err(reason.into()));
    }

    /// 每次调用时收到的对话历史快照
    pub fn calls(&self) -> Vec<ChatHistory> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat(
        &self,
        cancel: &CancellationToken,
        history: &ChatHistory,
    ) -> Result<ChatAnswer, BoxError> {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled.into());
        }
        let served = {
            let mut calls = lock(&self.calls);
            calls.push(history.clone());
            calls.len() - 1
        };
        match lock(&self.answers).pop_front() {
            Some(Ok(text)) => Ok(ChatAnswer::new(text)),
            Some(Err(reason)) => Err(LlmError::ApiError(reason).into()),
            None => Err(LlmError::ScriptExhausted(served).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answers_in_order_then_exhausted() {
        let model = ScriptedChatModel::new(["a", "b"]);
        let cancel = CancellationToken::new();
        let history = ChatHistory::new();
        assert_eq!(model.chat(&cancel, &history).await.unwrap().result, "a");
        assert_eq!(model.chat(&cancel, &history).await.unwrap().result, "b");
        let err = model.chat(&cancel, &history).await.unwrap_err();
        assert!(err.to_string().contains("exhausted"));
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_token_fails_without_recording() {
        let model = ScriptedChatModel::new(["a"]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(model.chat(&cancel, &ChatHistory::new()).await.is_err());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_scripted_failure_then_answer() {
        let model = ScriptedChatModel::default();
        model.push_failure("boom");
        model.push_answer("recovered");
        let cancel = CancellationToken::new();
        let err = model.chat(&cancel, &ChatHistory::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "API error: boom");
        assert_eq!(
            model.chat(&cancel, &ChatHistory::new()).await.unwrap().result,
            "recovered"
        );
    }
}
