//! 通用 JSON 指令解析
//!
//! 从模型回答中提取 JSON（```json ... ``` 代码块，或正文中第一个能解析为指令的 `[`/`{` 片段），
//! 解析为单条指令对象或指令数组。回答中不含 JSON 时返回空列表，由编排器判定为解析异常。

use serde::Deserialize;
use thiserror::Error;

use super::{Instruction, InstructionType};

#[derive(Error, Debug)]
pub enum InstructionParseError {
    #[error("JSON parse error: {0}")]
    Json(String),
}

/// 宽松的指令 JSON：id / target / content 可省略
#[derive(Debug, Deserialize)]
struct RawInstruction {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    target: String,
    #[serde(default)]
    content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Many(Vec<RawInstruction>),
    One(RawInstruction),
}

impl From<RawInstruction> for Instruction {
    fn from(raw: RawInstruction) -> Self {
        Instruction {
            id: raw
                .id
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            kind: InstructionType::new(raw.kind),
            target: raw.target,
            content: raw.content,
        }
    }
}

/// 从 `start` 处解析一个 JSON 值，忽略其后的文字
fn parse_at(text: &str, start: usize) -> Result<RawPayload, serde_json::Error> {
    serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<RawPayload>()
        .next()
        .unwrap_or_else(|| serde_json::from_str::<RawPayload>(""))
}

fn into_instructions(payload: RawPayload) -> Vec<Instruction> {
    match payload {
        RawPayload::Many(list) => list.into_iter().map(Instruction::from).collect(),
        RawPayload::One(one) => vec![one.into()],
    }
}

/// 解析模型回答为指令列表
///
/// 有 ```json 代码块时只解析代码块；否则依次尝试每个 `[` / `{` 起点，取第一个能解析为指令的 JSON，
/// 正文中夹杂的括号（如「Step [1]」）不会导致失败。
pub fn parse_instructions(answer: &str) -> Result<Vec<Instruction>, InstructionParseError> {
    let text = answer.trim();

    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        let block = rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim());
        return serde_json::from_str::<RawPayload>(block)
            .map(into_instructions)
            .map_err(|e| InstructionParseError::Json(format!("{}: {}", e, block)));
    }

    let mut first_err = None;
    for (start, _) in text.match_indices(['[', '{']) {
        match parse_at(text, start) {
            Ok(payload) => return Ok(into_instructions(payload)),
            Err(e) => {
                first_err.get_or_insert_with(|| format!("{}: {}", e, &text[start..]));
            }
        }
    }

    match first_err {
        Some(msg) => Err(InstructionParseError::Json(msg)),
        None => Ok(Vec::new()),
    }
}
