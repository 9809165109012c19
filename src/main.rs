//! OpenAgent 演示程序
//!
//! 入口：初始化日志、加载配置、按 [llm] provider 创建模型，用示例 Prompter / Entity 跑一次会话。
//! 用法：`open-agent [输入文本]`；provider 为 mock 时使用内置脚本回答。

use std::sync::Arc;

use anyhow::Context;
use open_agent::config::load_config;
use open_agent::core::{Agent, TerminationCause};
use open_agent::llm::create_model_from_config;
use open_agent::sample::{EchoEntity, JsonPrompter};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    open_agent::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let input = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let input = if input.is_empty() {
        "hi".to_string()
    } else {
        input
    };

    let mock_script = vec![
        format!(
            r#"[{{"id": "1", "type": "message", "target": "user", "content": "Received: {}"}}]"#,
            input.replace('"', "'")
        ),
        r#"[{"id": "2", "type": "end"}]"#.to_string(),
    ];
    let model = create_model_from_config(&cfg, mock_script);

    let prompt_config = cfg.agent.prompt_config.clone();
    let agent = Agent::<String>::new(
        Arc::new(JsonPrompter::new(prompt_config.clone())),
        Arc::new(EchoEntity::new()),
        model,
    )
    .with_prompt_config(prompt_config);

    // Ctrl-C 取消当前会话
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let termination = agent
        .run(&cancel, &input)
        .await
        .context("Agent session failed")?;

    match termination.cause {
        TerminationCause::EndInstruction { instruction_id } => println!(
            "Session ended by instruction {} after {} round(s)",
            instruction_id, termination.round
        ),
        TerminationCause::RoundSignal => println!(
            "Session ended by round signal after {} round(s)",
            termination.round
        ),
    }
    Ok(())
}
