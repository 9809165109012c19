//! OpenAgent - Rust 多轮指令式智能体框架
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 能力契约、错误、过程事件、主控循环（Agent / Session）
//! - **instruction**: 指令模型与通用 JSON 指令解析
//! - **llm**: 模型调用抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 对话历史
//! - **observability**: 日志初始化
//! - **sample**: 示例 Prompter 与 Entity

pub mod config;
pub mod core;
pub mod instruction;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod sample;

pub use crate::core::{Agent, AgentError, Entity, PromptInitializer, Prompter, RoundPrompt, Termination};
pub use instruction::{Instruction, InstructionType};
pub use memory::{ChatHistory, ChatMessage, UserContent};
