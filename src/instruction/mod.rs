//! 指令：模型回答被解析后的结构化结果
//!
//! 类型为开放字符串集合，`end` 为保留的结束指令；content 的形状由具体类型决定，框架不解释。

pub mod parser;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use parser::parse_instructions;

/// 指令类型（如 message、takeover、mcp_tool），`end` 表示结束会话
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionType(String);

impl InstructionType {
    /// 保留的结束指令类型
    pub const END: &'static str = "end";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn end() -> Self {
        Self::new(Self::END)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_end(&self) -> bool {
        self.0 == Self::END
    }

    /// 展示名：结束指令显示为「结束指令」，其余原样返回
    pub fn display_name(&self) -> &str {
        if self.is_end() {
            "结束指令"
        } else {
            &self.0
        }
    }
}

impl fmt::Display for InstructionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstructionType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InstructionType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// 单条指令
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: String,
    /// 指令类型
    #[serde(rename = "type")]
    pub kind: InstructionType,
    /// 指令目标：如 MCP 工具调用目标
    #[serde(default)]
    pub target: String,
    /// 指令内容：消息内容、接管信息或工具入参
    #[serde(default)]
    pub content: serde_json::Value,
}

impl Instruction {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<InstructionType>,
        target: impl Into<String>,
        content: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            target: target.into(),
            content,
        }
    }

    /// 结束指令
    pub fn end(id: impl Into<String>) -> Self {
        Self::new(id, InstructionType::end(), "", serde_json::Value::Null)
    }

    pub fn is_end(&self) -> bool {
        self.kind.is_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_detection() {
        assert!(Instruction::end("1").is_end());
        assert!(!Instruction::new("2", "message", "", serde_json::Value::Null).is_end());
        assert!(!Instruction::new("3", "END", "", serde_json::Value::Null).is_end());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(InstructionType::end().display_name(), "结束指令");
        assert_eq!(InstructionType::new("mcp_tool").display_name(), "mcp_tool");
    }

    #[test]
    fn test_json_field_names() {
        let ins = Instruction::new("a1", "mcp_tool", "search", serde_json::json!({"q": "rust"}));
        let json = serde_json::to_value(&ins).unwrap();
        assert_eq!(json["type"], "mcp_tool");
        assert_eq!(json["target"], "search");
        assert_eq!(json["content"]["q"], "rust");
    }
}
