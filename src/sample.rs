//! 示例能力实现（演示程序与测试用）
//!
//! JsonPrompter：要求模型以 JSON 指令数组作答，并用通用解析器解析；
//! EchoEntity：`message` 指令回显 content，其余类型报错；可选在第 N 轮后通过轮次提示结束会话。

use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::{BoxError, Entity, Prompter, RoundPrompt};
use crate::instruction::{parse_instructions, Instruction};
use crate::memory::UserContent;

const SYSTEM_PROMPT: &str = "You are an agent that acts only through instructions.\n\
Reply with a JSON array of instructions, each shaped like \
{\"id\": \"1\", \"type\": \"message\", \"target\": \"user\", \"content\": \"...\"}.\n\
When the task is finished, reply with [{\"id\": \"done\", \"type\": \"end\"}].";

/// JSON 指令 Prompter；prompt_config 中的 `language` 会附加到系统提示
#[derive(Debug, Clone, Default)]
pub struct JsonPrompter {
    prompt_config: serde_json::Value,
}

impl JsonPrompter {
    pub fn new(prompt_config: serde_json::Value) -> Self {
        Self { prompt_config }
    }
}

#[async_trait]
impl Prompter<String> for JsonPrompter {
    async fn system_prompt(&self, _cancel: &CancellationToken) -> Result<String, BoxError> {
        Ok(match self.prompt_config.get("language").and_then(|v| v.as_str()) {
            Some(lang) => format!("{}\nAnswer the user in language: {}.", SYSTEM_PROMPT, lang),
            None => SYSTEM_PROMPT.to_string(),
        })
    }

    async fn start_user_prompt(
        &self,
        _cancel: &CancellationToken,
        input: &String,
    ) -> Result<Vec<UserContent>, BoxError> {
        Ok(vec![UserContent::text(input.clone())])
    }

    async fn answer_to_instructions(
        &self,
        _cancel: &CancellationToken,
        answer: &str,
    ) -> Result<Vec<Instruction>, BoxError> {
        Ok(parse_instructions(answer)?)
    }
}

/// Echo 实体：记录已执行的指令 id
#[derive(Debug, Default)]
pub struct EchoEntity {
    end_after_round: Option<usize>,
    executed: Mutex<Vec<String>>,
}

impl EchoEntity {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 `round` 轮结束时通过轮次提示结束会话
    pub fn end_after_round(mut self, round: usize) -> Self {
        self.end_after_round = Some(round);
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Entity for EchoEntity {
    async fn execute(
        &self,
        _cancel: &CancellationToken,
        round: usize,
        instruction: &Instruction,
    ) -> Result<Vec<UserContent>, BoxError> {
        if instruction.kind.as_str() != "message" {
            return Err(format!("unsupported instruction type: {}", instruction.kind).into());
        }
        if let Ok(mut log) = self.executed.lock() {
            log.push(instruction.id.clone());
        }
        let text = match &instruction.content {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "(empty)".to_string(),
            other => other.to_string(),
        };
        tracing::info!(round, to = %instruction.target, "{}", text);
        Ok(vec![UserContent::text(format!("[{}] delivered: {}", instruction.id, text))])
    }

    async fn round_user_prompt(
        &self,
        _cancel: &CancellationToken,
        round: usize,
    ) -> Result<RoundPrompt, BoxError> {
        if self.end_after_round.is_some_and(|last| round >= last && round > 0) {
            return Ok(RoundPrompt::End);
        }
        Ok(vec![UserContent::text(format!("(round {} observation)", round))].into())
    }
}
