//! Логика чата между UI и `/api/ai`.
//!
//! Контроллер не хранит сообщения сам: единственный источник данных это
//! `ChatSessionStore`. Здесь живут только флаги загрузки и ошибки.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use contracts::domain::a001_ai_assistant::aggregate::{ChatHistory, Message};

use super::session_store::ChatSessionStore;
use crate::shared::connectivity::Connectivity;
use crate::shared::timer::Timer;

pub const OFFLINE_REPLY: &str =
    "You appear to be offline. Your message has been saved and will be processed when you reconnect.";
pub const FAILURE_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";
/// Пауза перед офлайн-ответом, мс
pub const OFFLINE_REPLY_DELAY_MS: u32 = 500;

/// Клиент ассистента: текст вопроса -> текст ответа
#[async_trait(?Send)]
pub trait AiClient {
    async fn ask(&self, query: &str) -> Result<String, String>;
}

/// Состояние для отрисовки
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSnapshot {
    pub histories: Vec<ChatHistory>,
    pub active_id: Option<String>,
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_online: bool,
}

type Listener = Box<dyn Fn(&ChatSnapshot)>;

pub struct ChatController {
    store: RefCell<ChatSessionStore>,
    client: Rc<dyn AiClient>,
    connectivity: Rc<dyn Connectivity>,
    timer: Rc<dyn Timer>,
    pending: Cell<usize>,
    error: RefCell<Option<String>>,
    listeners: RefCell<Vec<Listener>>,
}

impl ChatController {
    pub fn new(
        store: ChatSessionStore,
        client: Rc<dyn AiClient>,
        connectivity: Rc<dyn Connectivity>,
        timer: Rc<dyn Timer>,
    ) -> Self {
        Self {
            store: RefCell::new(store),
            client,
            connectivity,
            timer,
            pending: Cell::new(0),
            error: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Подписка на изменения; слушатель сразу получает текущее состояние
    pub fn subscribe(&self, listener: impl Fn(&ChatSnapshot) + 'static) {
        listener(&self.snapshot());
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn is_loading(&self) -> bool {
        self.pending.get() > 0
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let store = self.store.borrow();
        ChatSnapshot {
            histories: store.histories().to_vec(),
            active_id: store.active_id().map(str::to_string),
            messages: store
                .active_history()
                .map(|h| h.messages.clone())
                .unwrap_or_default(),
            is_loading: self.is_loading(),
            error: self.error(),
            is_online: self.is_online(),
        }
    }

    /// Отправить сообщение в активный чат.
    ///
    /// Сообщение пользователя добавляется сразу. Ответ всегда появляется
    /// в том чате, из которого отправляли, даже если пользователь успел
    /// переключиться. Если чат за это время удалили, ответ отбрасывается.
    pub async fn send_message(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        *self.error.borrow_mut() = None;
        let chat_id = {
            let mut store = self.store.borrow_mut();
            let chat_id = store.ensure_active();
            store.append_message(&chat_id, Message::user(text));
            chat_id
        };
        self.pending.set(self.pending.get() + 1);
        self.notify();

        let reply = if self.connectivity.is_online() {
            match self.client.ask(text).await {
                Ok(message) => Message::ai(message),
                Err(e) => {
                    log::error!("Error sending message: {}", e);
                    *self.error.borrow_mut() = Some(e);
                    Message::ai(FAILURE_REPLY)
                }
            }
        } else {
            self.timer.sleep(OFFLINE_REPLY_DELAY_MS).await;
            Message::offline(OFFLINE_REPLY)
        };

        if !self.store.borrow_mut().append_message(&chat_id, reply) {
            log::warn!("Chat {} was deleted before the reply arrived", chat_id);
        }
        self.pending.set(self.pending.get().saturating_sub(1));
        self.notify();
    }

    /// Очистить сообщения активного чата
    pub fn clear_messages(&self) {
        *self.error.borrow_mut() = None;
        {
            let mut store = self.store.borrow_mut();
            if let Some(id) = store.active_id().map(str::to_string) {
                store.clear_messages(&id);
            }
        }
        self.notify();
    }

    pub fn start_new_chat(&self) -> String {
        let id = self.store.borrow_mut().create_conversation();
        self.notify();
        id
    }

    pub fn delete_chat(&self, id: &str) {
        if self.store.borrow_mut().delete_conversation(id) {
            self.notify();
        }
    }

    pub fn switch_chat(&self, id: &str) {
        if self.store.borrow_mut().set_active(id) {
            self.notify();
        }
    }

    /// Сообщить подписчикам о внешнем изменении (например, сети)
    pub fn notify(&self) {
        let snapshot = self.snapshot();
        for listener in self.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::storage::MemoryStorage;
    use contracts::domain::a001_ai_assistant::aggregate::Sender;
    use futures::executor::block_on;
    use std::collections::VecDeque;

    type Hook = Box<dyn FnOnce()>;

    #[derive(Default)]
    struct FakeClient {
        replies: RefCell<VecDeque<Result<String, String>>>,
        calls: RefCell<Vec<String>>,
        /// Выполняется, пока запрос "в полёте"
        during_call: RefCell<Option<Hook>>,
    }

    impl FakeClient {
        fn replying(reply: Result<&str, &str>) -> Rc<Self> {
            let client = Self::default();
            client
                .replies
                .borrow_mut()
                .push_back(reply.map(str::to_string).map_err(str::to_string));
            Rc::new(client)
        }
    }

    #[async_trait(?Send)]
    impl AiClient for FakeClient {
        async fn ask(&self, query: &str) -> Result<String, String> {
            self.calls.borrow_mut().push(query.to_string());
            let hook = self.during_call.borrow_mut().take();
            if let Some(hook) = hook {
                hook();
            }
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted reply".to_string()))
        }
    }

    struct FakeConnectivity(Cell<bool>);

    impl Connectivity for FakeConnectivity {
        fn is_online(&self) -> bool {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct FakeTimer {
        slept: RefCell<Vec<u32>>,
    }

    #[async_trait(?Send)]
    impl Timer for FakeTimer {
        async fn sleep(&self, millis: u32) {
            self.slept.borrow_mut().push(millis);
        }
    }

    struct Harness {
        controller: Rc<ChatController>,
        client: Rc<FakeClient>,
        timer: Rc<FakeTimer>,
        connectivity: Rc<FakeConnectivity>,
    }

    fn harness(client: Rc<FakeClient>, online: bool) -> Harness {
        let timer = Rc::new(FakeTimer::default());
        let connectivity = Rc::new(FakeConnectivity(Cell::new(online)));
        let store = ChatSessionStore::open(Rc::new(MemoryStorage::new()));
        let controller = ChatController::new(
            store,
            client.clone(),
            connectivity.clone(),
            timer.clone(),
        );
        Harness {
            controller: Rc::new(controller),
            client,
            timer,
            connectivity,
        }
    }

    #[test]
    fn test_reply_is_appended_after_user_message() {
        let h = harness(FakeClient::replying(Ok("Your revenue is up.")), true);
        block_on(h.controller.send_message("How is revenue?"));

        let snapshot = h.controller.snapshot();
        let texts: Vec<_> = snapshot.messages.iter().map(|m| (m.sender, m.text.as_str())).collect();
        assert_eq!(
            texts,
            vec![
                (Sender::User, "How is revenue?"),
                (Sender::Ai, "Your revenue is up.")
            ]
        );
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.histories.len(), 1);
        assert_eq!(snapshot.histories[0].title, "How is revenue?");
    }

    #[test]
    fn test_offline_send_never_calls_client() {
        let h = harness(FakeClient::replying(Ok("unused")), false);
        block_on(h.controller.send_message("Reconcile my account"));

        let messages = h.controller.snapshot().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Ai);
        assert!(messages[1].is_offline);
        assert_eq!(messages[1].text, OFFLINE_REPLY);
        assert!(h.client.calls.borrow().is_empty());
        assert_eq!(*h.timer.slept.borrow(), vec![OFFLINE_REPLY_DELAY_MS]);
    }

    #[test]
    fn test_failure_appends_apology_and_records_error() {
        let h = harness(FakeClient::replying(Err("HTTP 500")), true);
        block_on(h.controller.send_message("hello"));

        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].text, FAILURE_REPLY);
        assert!(!snapshot.messages[1].is_offline);
        assert_eq!(snapshot.error.as_deref(), Some("HTTP 500"));
        assert!(!snapshot.is_loading);

        h.controller.clear_messages();
        let snapshot = h.controller.snapshot();
        assert!(snapshot.messages.is_empty());
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.histories.len(), 1);
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let h = harness(FakeClient::replying(Ok("unused")), true);
        block_on(h.controller.send_message("   \n"));

        let snapshot = h.controller.snapshot();
        assert!(snapshot.histories.is_empty());
        assert!(h.client.calls.borrow().is_empty());
    }

    #[test]
    fn test_reply_lands_in_originating_chat_after_switch() {
        let h = harness(FakeClient::replying(Ok("answer")), true);
        let origin = h.controller.start_new_chat();

        let controller = h.controller.clone();
        *h.client.during_call.borrow_mut() = Some(Box::new(move || {
            controller.start_new_chat();
        }));
        block_on(h.controller.send_message("question"));

        let snapshot = h.controller.snapshot();
        assert_ne!(snapshot.active_id.as_deref(), Some(origin.as_str()));
        assert!(snapshot.messages.is_empty());

        let origin_chat = snapshot.histories.iter().find(|c| c.id == origin).unwrap();
        assert_eq!(origin_chat.messages.len(), 2);
        assert_eq!(origin_chat.messages[1].text, "answer");
    }

    #[test]
    fn test_reply_for_deleted_chat_is_dropped() {
        let h = harness(FakeClient::replying(Ok("answer")), true);
        let origin = h.controller.start_new_chat();

        let controller = h.controller.clone();
        let doomed = origin.clone();
        *h.client.during_call.borrow_mut() = Some(Box::new(move || {
            controller.delete_chat(&doomed);
        }));
        block_on(h.controller.send_message("question"));

        let snapshot = h.controller.snapshot();
        assert!(snapshot.histories.is_empty());
        assert_eq!(snapshot.active_id, None);
        assert!(!snapshot.is_loading);
    }

    #[test]
    fn test_going_offline_mid_request_keeps_that_request() {
        let h = harness(FakeClient::replying(Ok("live answer")), true);

        let connectivity = h.connectivity.clone();
        *h.client.during_call.borrow_mut() = Some(Box::new(move || {
            connectivity.0.set(false);
        }));
        block_on(h.controller.send_message("first"));

        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.messages[1].text, "live answer");
        assert!(!snapshot.messages[1].is_offline);
        assert!(!snapshot.is_online);
        assert!(h.timer.slept.borrow().is_empty());

        block_on(h.controller.send_message("second"));
        let messages = h.controller.snapshot().messages;
        assert_eq!(messages.len(), 4);
        assert!(messages[3].is_offline);
        assert_eq!(h.client.calls.borrow().len(), 1);
    }

    #[test]
    fn test_listeners_see_loading_state() {
        let h = harness(FakeClient::replying(Ok("ok")), true);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        h.controller
            .subscribe(move |s: &ChatSnapshot| sink.borrow_mut().push(s.is_loading));

        block_on(h.controller.send_message("hi"));
        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_switch_chat_ignores_unknown_id() {
        let h = harness(FakeClient::replying(Ok("ok")), true);
        let first = h.controller.start_new_chat();
        h.controller.switch_chat("missing");
        assert_eq!(h.controller.snapshot().active_id, Some(first));
    }
}
