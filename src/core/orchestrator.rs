//! 主控循环：Agent 与会话
//!
//! 初始化对话（PromptInitializer 或默认的 system + user）后逐轮执行：
//! 调用模型 -> 解析指令 -> 依次执行 -> 合并指令结果与轮次提示为一条 user 消息追加到对话。
//! 遇到结束指令、轮次提示请求结束或任一步出错时返回。
//!
//! 轮数没有上限：若模型始终不给出结束指令，循环会一直运行，需要由调用方通过取消令牌或
//! Entity 的轮次提示（返回 `RoundPrompt::End`）来兜底。
//! 模型的回答本身不会作为 assistant 消息写回对话，只有 user 内容会累积。

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, AgentEvent, Entity, PromptInitializer, Prompter, RoundPrompt};
use crate::llm::ChatModel;
use crate::memory::{ChatHistory, ChatMessage};

/// 会话结束原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationCause {
    /// 模型给出了结束指令
    EndInstruction { instruction_id: String },
    /// Entity 的轮次提示请求结束
    RoundSignal,
}

/// 会话正常结束
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    /// 结束时所在轮次
    pub round: usize,
    pub cause: TerminationCause,
}

/// 单轮执行结果
#[derive(Debug)]
pub enum RoundOutcome {
    Continue,
    Terminated(TerminationCause),
    Failed(AgentError),
}

impl From<Result<Option<TerminationCause>, AgentError>> for RoundOutcome {
    fn from(res: Result<Option<TerminationCause>, AgentError>) -> Self {
        match res {
            Ok(None) => Self::Continue,
            Ok(Some(cause)) => Self::Terminated(cause),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Agent：持有四种能力与 Prompt 配置，可多次运行，每次运行一个独立会话
pub struct Agent<I: Send + Sync + 'static> {
    /// Prompt 配置（框架只保存与透传，不解释其内容）
    prompt_config: serde_json::Value,
    prompter: Arc<dyn Prompter<I>>,
    initializer: Option<Arc<dyn PromptInitializer<I>>>,
    entity: Arc<dyn Entity>,
    model: Arc<dyn ChatModel>,
    event_tx: Option<mpsc::UnboundedSender<AgentEvent>>,
}

impl<I: Send + Sync + 'static> Agent<I> {
    pub fn new(
        prompter: Arc<dyn Prompter<I>>,
        entity: Arc<dyn Entity>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            prompt_config: serde_json::Value::Null,
            prompter,
            initializer: None,
            entity,
            model,
            event_tx: None,
        }
    }

    /// 设置初始化器：设置后由它构建完整的初始对话，Prompter 的 system / start 提示不再调用
    pub fn with_initializer(mut self, initializer: Arc<dyn PromptInitializer<I>>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn with_prompt_config(mut self, config: serde_json::Value) -> Self {
        self.prompt_config = config;
        self
    }

    /// 设置事件推送通道
    pub fn with_event_tx(mut self, tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn prompt_config(&self) -> &serde_json::Value {
        &self.prompt_config
    }

    /// 创建一个新会话（轮次为 0，对话为空）
    pub fn session(&self) -> Session<'_, I> {
        Session {
            agent: self,
            round: 0,
            history: ChatHistory::new(),
        }
    }

    /// 对单个输入跑完整个会话
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        input: &I,
    ) -> Result<Termination, AgentError> {
        self.session().run(cancel, input).await
    }

    fn emit(&self, ev: AgentEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(ev);
        }
    }
}

/// 一次会话：独占轮次计数与对话历史
pub struct Session<'a, I: Send + Sync + 'static> {
    agent: &'a Agent<I>,
    round: usize,
    history: ChatHistory,
}

impl<'a, I: Send + Sync + 'static> Session<'a, I> {
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn into_history(self) -> ChatHistory {
        self.history
    }

    /// 运行会话直到结束或出错；重复调用会从头开始一个新会话
    pub async fn run(
        &mut self,
        cancel: &CancellationToken,
        input: &I,
    ) -> Result<Termination, AgentError> {
        self.round = 0;
        self.history = ChatHistory::new();

        let mut outcome = RoundOutcome::from(self.seed(cancel, input).await);
        if matches!(outcome, RoundOutcome::Continue) {
            tracing::info!(seed_messages = self.history.len(), "Agent session started");
            self.agent.emit(AgentEvent::SessionStarted {
                seed_messages: self.history.len(),
            });
        }

        loop {
            match outcome {
                RoundOutcome::Continue => {}
                RoundOutcome::Terminated(cause) => {
                    tracing::info!(round = self.round, cause = ?cause, "Agent session terminated");
                    self.agent.emit(AgentEvent::Terminated {
                        round: self.round,
                        cause: cause.clone(),
                    });
                    return Ok(Termination {
                        round: self.round,
                        cause,
                    });
                }
                RoundOutcome::Failed(err) => {
                    tracing::warn!(round = self.round, error = %err, "Agent session failed");
                    self.agent.emit(AgentEvent::Failed {
                        round: self.round,
                        error: err.to_string(),
                    });
                    return Err(err);
                }
            }
            outcome = self.step(cancel).await.into();
        }
    }

    /// 构建初始对话
    async fn seed(
        &mut self,
        cancel: &CancellationToken,
        input: &I,
    ) -> Result<Option<TerminationCause>, AgentError> {
        let agent = self.agent;

        // 上层业务自行初始化与模型的对话消息
        if let Some(initializer) = &agent.initializer {
            self.history = initializer
                .initialize(cancel, input)
                .await
                .map_err(|source| AgentError::Initialize { source })?;
            return Ok(None);
        }

        let system_prompt = agent
            .prompter
            .system_prompt(cancel)
            .await
            .map_err(|source| AgentError::SystemPrompt { source })?;
        let mut user_prompt = agent
            .prompter
            .start_user_prompt(cancel, input)
            .await
            .map_err(|source| AgentError::StartPrompt { source })?;
        match agent
            .entity
            .round_user_prompt(cancel, self.round)
            .await
            .map_err(|source| AgentError::RoundPrompt {
                round: self.round,
                source,
            })? {
            RoundPrompt::End => return Ok(Some(TerminationCause::RoundSignal)),
            RoundPrompt::Content(parts) => user_prompt.extend(parts),
        }

        self.history.push(ChatMessage::system(system_prompt));
        self.history.push(ChatMessage::user(user_prompt));
        Ok(None)
    }

    /// 执行一轮：模型调用 -> 解析 -> 依次执行指令 -> 追加 user 消息
    async fn step(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<TerminationCause>, AgentError> {
        let agent = self.agent;
        self.round += 1;
        let round = self.round;
        tracing::debug!(round, history_len = self.history.len(), "Round started");
        agent.emit(AgentEvent::RoundStarted { round });

        // 暂时只支持非流式对话
        let answer = agent
            .model
            .chat(cancel, &self.history)
            .await
            .map_err(|source| AgentError::Transport { round, source })?;
        agent.emit(AgentEvent::Answer {
            round,
            text: answer.result.clone(),
        });

        let instructions = agent
            .prompter
            .answer_to_instructions(cancel, &answer.result)
            .await
            .map_err(|source| AgentError::Parse { round, source })?;
        if instructions.is_empty() {
            // 没有指令，多半是回答格式异常
            return Err(AgentError::NoInstructions { round });
        }

        let mut round_prompt = Vec::new();
        for ins in &instructions {
            if ins.is_end() {
                tracing::debug!(round, instruction_id = %ins.id, "End instruction received");
                return Ok(Some(TerminationCause::EndInstruction {
                    instruction_id: ins.id.clone(),
                }));
            }
            let produced = agent
                .entity
                .execute(cancel, round, ins)
                .await
                .map_err(|source| AgentError::Execute {
                    round,
                    instruction_id: ins.id.clone(),
                    source,
                })?;
            tracing::debug!(
                round,
                instruction_id = %ins.id,
                instruction_type = %ins.kind,
                produced = produced.len(),
                "Instruction executed"
            );
            agent.emit(AgentEvent::InstructionExecuted {
                round,
                id: ins.id.clone(),
                kind: ins.kind.to_string(),
                target: ins.target.clone(),
                produced: produced.len(),
            });
            round_prompt.extend(produced);
        }

        match agent
            .entity
            .round_user_prompt(cancel, round)
            .await
            .map_err(|source| AgentError::RoundPrompt { round, source })?
        {
            RoundPrompt::End => return Ok(Some(TerminationCause::RoundSignal)),
            RoundPrompt::Content(parts) => round_prompt.extend(parts),
        }

        let appended = round_prompt.len();
        self.history.push(ChatMessage::user(round_prompt));
        agent.emit(AgentEvent::RoundCompleted { round, appended });
        Ok(None)
    }
}
