//! LLM 层：模型调用抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use mock::ScriptedChatModel;
pub use openai::OpenAiChatModel;
pub use traits::{ChatAnswer, ChatModel, LlmError, TokenUsage};

use crate::config::AppConfig;

/// 按 [llm] provider 创建模型：openai 走 OpenAI 兼容端点，其余（含 mock）用脚本化 Mock
pub fn create_model_from_config(cfg: &AppConfig, mock_script: Vec<String>) -> Arc<dyn ChatModel> {
    match cfg.llm.provider.as_str() {
        "openai" => {
            tracing::info!(model = %cfg.llm.model, "Using OpenAI-compatible model");
            Arc::new(OpenAiChatModel::from_config(&cfg.llm))
        }
        other => {
            if other != "mock" {
                tracing::warn!(provider = other, "Unknown provider, falling back to mock");
            }
            Arc::new(ScriptedChatModel::new(mock_script))
        }
    }
}
