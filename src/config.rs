//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `OPEN_AGENT__*` 覆盖（双下划线表示嵌套，如 `OPEN_AGENT__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub agent: AgentSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：mock / openai
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// 未设置时读取 OPENAI_API_KEY
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "mock".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次模型请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [agent] 段：交给 Prompter 的 Prompt 配置（任意结构，框架不解释）
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AgentSection {
    #[serde(default)]
    pub prompt_config: serde_json::Value,
}

/// 从 config 目录加载配置，环境变量 OPEN_AGENT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 OPEN_AGENT__*（双下划线表示嵌套键）
///
/// `[agent] prompt_config` 只能省略或为表，其它类型返回错误。
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("OPEN_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    let cfg: AppConfig = c.try_deserialize()?;
    if !(cfg.agent.prompt_config.is_null() || cfg.agent.prompt_config.is_object()) {
        return Err(config::ConfigError::Message(format!(
            "agent.prompt_config must be a table, got {}",
            cfg.agent.prompt_config
        )));
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.timeouts.request, 60);
        assert!(cfg.agent.prompt_config.is_null());
    }

    #[test]
    fn test_explicit_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[llm]
provider = "openai"
model = "deepseek-chat"

[llm.timeouts]
request = 5

[agent.prompt_config]
language = "zh"
max_items = 3
"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.model, "deepseek-chat");
        assert_eq!(cfg.llm.timeouts.request, 5);
        assert_eq!(cfg.agent.prompt_config["language"], "zh");
        assert_eq!(cfg.agent.prompt_config["max_items"], 3);
    }

    #[test]
    fn test_scalar_prompt_config_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[agent]\nprompt_config = 3").unwrap();

        let err = load_config(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("agent.prompt_config must be a table"));
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let cfg = load_config(Some(PathBuf::from("/nonexistent/open-agent.toml"))).unwrap();
        assert!(!cfg.llm.model.is_empty());
    }
}
