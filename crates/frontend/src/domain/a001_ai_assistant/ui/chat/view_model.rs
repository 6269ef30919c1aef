//! AI Chat - View Model

use contracts::domain::a001_ai_assistant::aggregate::{ChatHistory, Message};
use leptos::prelude::*;

use crate::domain::a001_ai_assistant::controller::ChatSnapshot;

#[derive(Clone, Copy)]
pub struct ChatVm {
    pub histories: RwSignal<Vec<ChatHistory>>,
    pub active_id: RwSignal<Option<String>>,
    pub messages: RwSignal<Vec<Message>>,
    pub new_message: RwSignal<String>,
    pub error: RwSignal<Option<String>>,
    pub is_loading: RwSignal<bool>,
    pub is_online: RwSignal<bool>,
}

impl ChatVm {
    pub fn new() -> Self {
        Self {
            histories: RwSignal::new(Vec::new()),
            active_id: RwSignal::new(None),
            messages: RwSignal::new(Vec::new()),
            new_message: RwSignal::new(String::new()),
            error: RwSignal::new(None),
            is_loading: RwSignal::new(false),
            is_online: RwSignal::new(true),
        }
    }

    pub fn apply(&self, snapshot: &ChatSnapshot) {
        self.histories.set(snapshot.histories.clone());
        self.active_id.set(snapshot.active_id.clone());
        self.messages.set(snapshot.messages.clone());
        self.error.set(snapshot.error.clone());
        self.is_loading.set(snapshot.is_loading);
        self.is_online.set(snapshot.is_online);
    }
}
