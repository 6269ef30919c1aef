//! Хранилище чатов на стороне браузера.
//!
//! Владеет списком чатов и указателем на активный чат. Каждое изменение
//! сразу сохраняется в `KeyValueStorage`; ошибки записи логируются и не
//! прерывают работу.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use contracts::domain::a001_ai_assistant::aggregate::{
    derive_title, generate_id, ChatHistory, Message, Sender, DEFAULT_CHAT_TITLE,
};
use serde::Deserialize;
use serde_json::Value;

use crate::shared::date_utils::parse_json_with_dates;
use crate::shared::storage::KeyValueStorage;

pub const HISTORIES_KEY: &str = "chatHistories";
pub const ACTIVE_CHAT_KEY: &str = "activeChatId";
/// Формат с одним чатом: плоский массив сообщений
pub const LEGACY_MESSAGES_KEY: &str = "chatMessages";

/// Сообщение в том виде, в каком оно могло быть сохранено ранее
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMessage {
    #[serde(default)]
    id: Option<String>,
    text: String,
    sender: Sender,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    is_offline: bool,
}

impl StoredMessage {
    fn into_message(self, now: DateTime<Utc>) -> Message {
        Message {
            id: self.id.filter(|id| !id.is_empty()).unwrap_or_else(generate_id),
            text: self.text,
            sender: self.sender,
            timestamp: self.timestamp.unwrap_or(now),
            is_offline: self.is_offline,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHistory {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    messages: Vec<StoredMessage>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl StoredHistory {
    fn into_history(self, now: DateTime<Utc>) -> ChatHistory {
        let messages: Vec<Message> = self
            .messages
            .into_iter()
            .map(|m| m.into_message(now))
            .collect();
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from(&messages));
        wrap_messages(self.id, title, messages, self.created_at, self.updated_at, now)
    }
}

fn title_from(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.sender == Sender::User)
        .map(|m| derive_title(&m.text))
        .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string())
}

fn wrap_messages(
    id: Option<String>,
    title: String,
    messages: Vec<Message>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ChatHistory {
    let first = messages.iter().map(|m| m.timestamp).min();
    let last = messages.iter().map(|m| m.timestamp).max();
    let created_at = created_at.or(first).unwrap_or(now);
    let updated_at = updated_at
        .into_iter()
        .chain(last)
        .max()
        .unwrap_or(created_at)
        .max(created_at);

    ChatHistory {
        id: id.filter(|id| !id.is_empty()).unwrap_or_else(generate_id),
        title,
        messages,
        created_at,
        updated_at,
    }
}

/// JSON из хранилища с восстановлением дат на любой глубине
fn parse_stored<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    serde_json::from_value(parse_json_with_dates(value))
}

pub struct ChatSessionStore {
    storage: Rc<dyn KeyValueStorage>,
    histories: Vec<ChatHistory>,
    active_id: Option<String>,
}

impl ChatSessionStore {
    /// Создать хранилище и сразу загрузить сохранённые чаты
    pub fn open(storage: Rc<dyn KeyValueStorage>) -> Self {
        let mut store = Self {
            storage,
            histories: Vec::new(),
            active_id: None,
        };
        store.load();
        store
    }

    pub fn histories(&self) -> &[ChatHistory] {
        &self.histories
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_history(&self) -> Option<&ChatHistory> {
        let id = self.active_id.as_deref()?;
        self.histories.iter().find(|h| h.id == id)
    }

    /// Перечитать состояние из хранилища.
    ///
    /// Повреждённые данные удаляются и дают пустой список. Старый формат
    /// (`chatMessages`) переносится в один чат.
    pub fn load(&mut self) -> &[ChatHistory] {
        let now = Utc::now();
        self.histories = match self.read(HISTORIES_KEY) {
            Some(raw) => match parse_stored::<Vec<StoredHistory>>(&raw) {
                Ok(stored) => stored.into_iter().map(|h| h.into_history(now)).collect(),
                Err(e) => {
                    log::error!("Error parsing saved chat histories: {}", e);
                    self.remove(HISTORIES_KEY);
                    Vec::new()
                }
            },
            None => self.migrate_legacy(now),
        };

        let saved_active = self.read(ACTIVE_CHAT_KEY);
        self.active_id = saved_active
            .filter(|id| self.histories.iter().any(|h| &h.id == id))
            .or_else(|| self.histories.first().map(|h| h.id.clone()));

        &self.histories
    }

    fn migrate_legacy(&mut self, now: DateTime<Utc>) -> Vec<ChatHistory> {
        let Some(raw) = self.read(LEGACY_MESSAGES_KEY) else {
            return Vec::new();
        };

        let histories = match parse_stored::<Vec<StoredMessage>>(&raw) {
            Ok(stored) if !stored.is_empty() => {
                let messages: Vec<Message> =
                    stored.into_iter().map(|m| m.into_message(now)).collect();
                let title = title_from(&messages);
                vec![wrap_messages(None, title, messages, None, None, now)]
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                log::error!("Error parsing saved messages: {}", e);
                Vec::new()
            }
        };

        if !histories.is_empty() {
            log::info!(
                "Migrated {} legacy messages into a chat history",
                histories[0].messages.len()
            );
            self.write_histories(&histories);
        }
        self.remove(LEGACY_MESSAGES_KEY);
        histories
    }

    /// Заменить все чаты и сохранить
    pub fn save(&mut self, histories: Vec<ChatHistory>) {
        self.histories = histories;
        if !self.active_is_valid() {
            self.active_id = self.histories.first().map(|h| h.id.clone());
        }
        self.persist();
    }

    /// Новый пустой чат в начале списка; он же становится активным
    pub fn create_conversation(&mut self) -> String {
        let history = ChatHistory::new();
        let id = history.id.clone();
        self.histories.insert(0, history);
        self.active_id = Some(id.clone());
        self.persist();
        id
    }

    /// Удалить чат. Если он был активным, активным становится первый
    /// оставшийся или никакой.
    pub fn delete_conversation(&mut self, id: &str) -> bool {
        let before = self.histories.len();
        self.histories.retain(|h| h.id != id);
        if self.histories.len() == before {
            return false;
        }
        if !self.active_is_valid() {
            self.active_id = self.histories.first().map(|h| h.id.clone());
        }
        self.persist();
        true
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        if !self.histories.iter().any(|h| h.id == id) {
            return false;
        }
        self.active_id = Some(id.to_string());
        self.persist();
        true
    }

    /// Активный чат; создаётся, если его нет
    pub fn ensure_active(&mut self) -> String {
        match self.active_history() {
            Some(history) => history.id.clone(),
            None => self.create_conversation(),
        }
    }

    /// Добавить сообщение в чат `id`. `false`, если чата уже нет.
    pub fn append_message(&mut self, id: &str, message: Message) -> bool {
        let Some(history) = self.histories.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        history.push(message);
        self.persist();
        true
    }

    pub fn clear_messages(&mut self, id: &str) -> bool {
        let Some(history) = self.histories.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        history.clear();
        self.persist();
        true
    }

    /// Удалить все чаты вместе с сохранёнными данными
    pub fn clear_all(&mut self) {
        self.histories.clear();
        self.active_id = None;
        for key in [HISTORIES_KEY, ACTIVE_CHAT_KEY, LEGACY_MESSAGES_KEY] {
            self.remove(key);
        }
    }

    fn active_is_valid(&self) -> bool {
        self.active_history().is_some()
    }

    fn persist(&self) {
        self.write_histories(&self.histories);
        let result = match &self.active_id {
            Some(id) => self.storage.set_item(ACTIVE_CHAT_KEY, id),
            None => self.storage.remove_item(ACTIVE_CHAT_KEY),
        };
        if let Err(e) = result {
            log::warn!("Failed to save active chat: {}", e);
        }
    }

    fn write_histories(&self, histories: &[ChatHistory]) {
        let json = match serde_json::to_string(histories) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize chat histories: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(HISTORIES_KEY, &json) {
            log::warn!("Failed to save chat histories: {}", e);
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            log::warn!("Failed to remove '{}': {}", key, e);
        }
    }
}
