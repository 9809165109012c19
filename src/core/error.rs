//! Agent 错误类型
//!
//! 每个变体标明出错的步骤，并原样保留协作方返回的错误作为 source。
//! 正常结束不走错误通道，见 `Termination`。

use thiserror::Error;

/// 协作方（模型、Prompter、Entity）返回的错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 错误大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 初始化阶段构建提示失败
    Prompt,
    /// 模型调用失败
    Transport,
    /// 回答解析失败或未产出指令
    Parse,
    /// 指令执行或轮次提示失败
    Execution,
}

/// 会话运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Prompt initializer failed: {source}")]
    Initialize {
        #[source]
        source: BoxError,
    },

    #[error("System prompt failed: {source}")]
    SystemPrompt {
        #[source]
        source: BoxError,
    },

    #[error("Start user prompt failed: {source}")]
    StartPrompt {
        #[source]
        source: BoxError,
    },

    #[error("Round {round} user prompt failed: {source}")]
    RoundPrompt {
        round: usize,
        #[source]
        source: BoxError,
    },

    #[error("Model call failed in round {round}: {source}")]
    Transport {
        round: usize,
        #[source]
        source: BoxError,
    },

    #[error("Answer parse failed in round {round}: {source}")]
    Parse {
        round: usize,
        #[source]
        source: BoxError,
    },

    #[error("No instructions found in agent answer (round {round})")]
    NoInstructions { round: usize },

    #[error("Instruction {instruction_id} failed in round {round}: {source}")]
    Execute {
        round: usize,
        instruction_id: String,
        #[source]
        source: BoxError,
    },
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Initialize { .. } | Self::SystemPrompt { .. } | Self::StartPrompt { .. } => {
                ErrorKind::Prompt
            }
            // 第 0 轮的轮次提示属于初始化阶段
            Self::RoundPrompt { round: 0, .. } => ErrorKind::Prompt,
            Self::RoundPrompt { .. } | Self::Execute { .. } => ErrorKind::Execution,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Parse { .. } | Self::NoInstructions { .. } => ErrorKind::Parse,
        }
    }

    /// 出错时所在轮次；初始化阶段为 0
    pub fn round(&self) -> usize {
        match self {
            Self::Initialize { .. } | Self::SystemPrompt { .. } | Self::StartPrompt { .. } => 0,
            Self::RoundPrompt { round, .. }
            | Self::Transport { round, .. }
            | Self::Parse { round, .. }
            | Self::NoInstructions { round }
            | Self::Execute { round, .. } => *round,
        }
    }
}
