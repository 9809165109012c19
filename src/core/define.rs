//! 能力契约：Prompter、PromptInitializer、Entity
//!
//! 编排器只依赖这些 trait，具体的提示文本、指令业务逻辑与应用状态由上层业务提供。
//! 所有调用都带上取消令牌，是否及时响应取消由实现方负责。

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::BoxError;
use crate::instruction::Instruction;
use crate::memory::{ChatHistory, UserContent};

/// 提示能力：系统提示、初始用户提示、回答解析
#[async_trait]
pub trait Prompter<I: Send + Sync>: Send + Sync {
    /// 获取系统提示
    async fn system_prompt(&self, cancel: &CancellationToken) -> Result<String, BoxError>;

    /// 根据输入构建首条用户提示
    async fn start_user_prompt(
        &self,
        cancel: &CancellationToken,
        input: &I,
    ) -> Result<Vec<UserContent>, BoxError>;

    /// 根据模型回答解析出指令；返回空列表会被视为解析异常
    async fn answer_to_instructions(
        &self,
        cancel: &CancellationToken,
        answer: &str,
    ) -> Result<Vec<Instruction>, BoxError>;
}

/// 可选：由上层业务自行构建完整的初始对话，替代默认的 system + user 构建
#[async_trait]
pub trait PromptInitializer<I: Send + Sync>: Send + Sync {
    async fn initialize(
        &self,
        cancel: &CancellationToken,
        input: &I,
    ) -> Result<ChatHistory, BoxError>;
}

/// 轮次提示：本轮需要附加的内容，或请求结束会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPrompt {
    Content(Vec<UserContent>),
    End,
}

impl RoundPrompt {
    pub fn empty() -> Self {
        Self::Content(Vec::new())
    }
}

impl From<Vec<UserContent>> for RoundPrompt {
    fn from(parts: Vec<UserContent>) -> Self {
        Self::Content(parts)
    }
}

/// 实体能力：执行指令、提供每轮的环境观察
#[async_trait]
pub trait Entity: Send + Sync {
    /// 执行指令，返回需要回传给模型的内容
    async fn execute(
        &self,
        cancel: &CancellationToken,
        round: usize,
        instruction: &Instruction,
    ) -> Result<Vec<UserContent>, BoxError>;

    /// 获取轮次用户提示（第 0 轮在初始化时调用）
    async fn round_user_prompt(
        &self,
        cancel: &CancellationToken,
        round: usize,
    ) -> Result<RoundPrompt, BoxError>;
}
