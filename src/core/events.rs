//! 会话过程事件：用于向前端或日志推送每轮的进度

use serde::Serialize;

use crate::core::TerminationCause;

/// 单步过程事件（可序列化为 JSON 供前端展示）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// 初始对话已就绪
    SessionStarted { seed_messages: usize },
    /// 新一轮开始
    RoundStarted { round: usize },
    /// 模型回答
    Answer { round: usize, text: String },
    /// 指令执行完毕
    InstructionExecuted {
        round: usize,
        id: String,
        kind: String,
        target: String,
        produced: usize,
    },
    /// 本轮内容已追加到对话
    RoundCompleted { round: usize, appended: usize },
    /// 会话正常结束
    Terminated {
        round: usize,
        cause: TerminationCause,
    },
    /// 会话因错误中止
    Failed { round: usize, error: String },
}
