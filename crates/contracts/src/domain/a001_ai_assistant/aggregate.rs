use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Заголовок нового чата, пока в нём нет сообщений пользователя
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Максимальная длина заголовка, выводимого из первого сообщения
pub const TITLE_MAX_CHARS: usize = 30;

/// Сгенерировать непрозрачный идентификатор сообщения или чата
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Автор сообщения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// Сообщение чата. После создания не изменяется.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_offline: bool,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: generate_id(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            is_offline: false,
        }
    }

    /// Сообщение пользователя
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    /// Ответ ассистента
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Ai)
    }

    /// Ответ ассистента, сформированный без сети
    pub fn offline(text: impl Into<String>) -> Self {
        Self {
            is_offline: true,
            ..Self::new(text, Sender::Ai)
        }
    }
}

/// История одного чата (conversation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatHistory {
    /// Создать пустой чат с заголовком по умолчанию
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Добавить сообщение в конец истории.
    ///
    /// `updated_at` никогда не уменьшается. Первое сообщение пользователя
    /// задаёт заголовок, если он ещё не менялся.
    pub fn push(&mut self, message: Message) {
        let first_user_message = message.sender == Sender::User
            && !self.messages.iter().any(|m| m.sender == Sender::User);
        if first_user_message && self.title == DEFAULT_CHAT_TITLE {
            self.title = derive_title(&message.text);
        }
        self.touch(message.timestamp);
        self.messages.push(message);
    }

    /// Удалить все сообщения, сохранив сам чат
    pub fn clear(&mut self) {
        self.messages.clear();
        self.title = DEFAULT_CHAT_TITLE.to_string();
        self.touch(Utc::now());
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(at).max(Utc::now());
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Заголовок из текста сообщения: обрезка по границе символа
pub fn derive_title(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return DEFAULT_CHAT_TITLE.to_string();
    }
    if text.chars().count() <= TITLE_MAX_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}...", truncated.trim_end())
}
