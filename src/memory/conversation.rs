//! 对话历史：与模型交互的消息序列
//!
//! 只追加、不修改：每个会话独享一份 ChatHistory，初始化时写入种子消息，之后每轮最多追加一条 user 消息。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 用户消息中的单个内容项
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserContent {
    Text { text: String },
    ImageUrl { url: String },
}

impl UserContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl { url: url.into() }
    }

    /// 纯文本视图；图片以 `[image: url]` 占位
    pub fn as_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::ImageUrl { url } => format!("[image: {}]", url),
        }
    }
}

/// 消息内容：纯文本或结构化内容列表
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<UserContent>),
}

/// 单条消息，创建后不可变
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: MessageContent,
}

impl ChatMessage {
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self { role, content }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, MessageContent::Text(content.into()))
    }

    pub fn user(parts: Vec<UserContent>) -> Self {
        Self::new(Role::User, MessageContent::Parts(parts))
    }

    pub fn user_text(content: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(content.into()))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(content.into()))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    /// 将内容渲染为纯文本（多个内容项以换行拼接）
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(UserContent::as_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// 对话历史：只允许追加
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<ChatMessage>> for ChatHistory {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
