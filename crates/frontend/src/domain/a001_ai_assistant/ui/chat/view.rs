//! AI Chat - View Component

use std::rc::Rc;

use contracts::domain::a001_ai_assistant::aggregate::{Message, Sender};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use super::model::HttpAiClient;
use super::view_model::ChatVm;
use crate::domain::a001_ai_assistant::controller::ChatController;
use crate::domain::a001_ai_assistant::session_store::ChatSessionStore;
use crate::shared::connectivity::BrowserConnectivity;
use crate::shared::date_utils::format_time;
use crate::shared::storage::local_or_memory;
use crate::shared::timer::BrowserTimer;

#[component]
#[allow(non_snake_case)]
pub fn ChatPage() -> impl IntoView {
    let vm = ChatVm::new();
    let messages_container_ref = NodeRef::<leptos::html::Div>::new();

    let connectivity = Rc::new(BrowserConnectivity::new(move |online| {
        log::info!("Connectivity changed: online={}", online);
        vm.is_online.set(online);
    }));
    let controller = Rc::new(ChatController::new(
        ChatSessionStore::open(local_or_memory()),
        Rc::new(HttpAiClient::new()),
        connectivity,
        Rc::new(BrowserTimer),
    ));
    controller.subscribe(move |snapshot| vm.apply(snapshot));

    // Rc не Send, поэтому только локальное хранение.
    // При уходе со страницы значение удаляется, а с ним и слушатели сети.
    let controller = StoredValue::new_local(controller);

    // Прокрутка к последнему сообщению
    Effect::new(move |_| {
        vm.messages.track();
        if let Some(container) = messages_container_ref.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    });

    let handle_send = move || {
        let text = vm.new_message.get_untracked();
        if text.trim().is_empty() || vm.is_loading.get_untracked() {
            return;
        }
        vm.new_message.set(String::new());

        let controller = controller.get_value();
        spawn_local(async move {
            controller.send_message(&text).await;
        });
    };

    view! {
        <div class="chat-page">
            <aside class="chat-sidebar">
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| {
                        controller.with_value(|c| {
                            c.start_new_chat();
                        });
                    }
                >
                    "+ New Chat"
                </Button>

                <div class="chat-sidebar__list">
                    <For
                        each=move || vm.histories.get()
                        key=|h| (h.id.clone(), h.title.clone(), h.messages.len())
                        let:history
                    >
                        {{
                            let id = history.id.clone();
                            let delete_id = history.id.clone();
                            let is_active = {
                                let id = history.id.clone();
                                move || vm.active_id.get().as_deref() == Some(id.as_str())
                            };
                            view! {
                                <div
                                    class=move || {
                                        if is_active() {
                                            "chat-sidebar__item chat-sidebar__item--active"
                                        } else {
                                            "chat-sidebar__item"
                                        }
                                    }
                                    on:click=move |_| controller.with_value(|c| c.switch_chat(&id))
                                >
                                    <span class="chat-sidebar__title">{history.title.clone()}</span>
                                    <span class="chat-sidebar__count">
                                        {format!("{} msgs", history.messages.len())}
                                    </span>
                                    <button
                                        class="chat-sidebar__delete"
                                        title="Delete chat"
                                        on:click=move |ev| {
                                            ev.stop_propagation();
                                            controller.with_value(|c| c.delete_chat(&delete_id));
                                        }
                                    >
                                        "×"
                                    </button>
                                </div>
                            }
                        }}
                    </For>
                </div>
            </aside>

            <section class="chat-main">
                <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center class="chat-main__header">
                    <h2>"AI Assistant"</h2>
                    <Flex align=FlexAlign::Center style="gap: 12px;">
                        {move || {
                            if vm.is_online.get() {
                                view! {
                                    <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Success>
                                        "Online"
                                    </Badge>
                                }
                                    .into_any()
                            } else {
                                view! {
                                    <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Danger>
                                        "Offline"
                                    </Badge>
                                }
                                    .into_any()
                            }
                        }}
                        <Button
                            appearance=ButtonAppearance::Secondary
                            disabled=Signal::derive(move || vm.messages.get().is_empty())
                            on_click=move |_| controller.with_value(|c| c.clear_messages())
                        >
                            "Clear"
                        </Button>
                    </Flex>
                </Flex>

                {move || {
                    vm.error
                        .get()
                        .map(|e| {
                            view! { <div class="chat-main__error">{format!("Error: {}", e)}</div> }
                        })
                }}

                <div node_ref=messages_container_ref class="chat-main__messages">
                    <Show when=move || vm.messages.with(|m| m.is_empty())>
                        <div class="chat-main__empty">
                            "Ask about reconciliation, discrepancies, expenses, revenue or taxes."
                        </div>
                    </Show>
                    <For each=move || vm.messages.get() key=|m| m.id.clone() let:msg>
                        <MessageBubble message=msg />
                    </For>
                    <Show when=move || vm.is_loading.get()>
                        <div class="chat-message chat-message--ai">
                            <Spinner />
                            " Thinking..."
                        </div>
                    </Show>
                </div>

                <Flex class="chat-main__input" style="gap: 8px; align-items: flex-end;">
                    <div style="flex: 1;">
                        <Textarea
                            value=vm.new_message
                            placeholder="Type your question... (Enter to send, Shift+Enter for new line)"
                            attr:style="width: 100%; min-height: 60px; max-height: 200px; resize: vertical;"
                            disabled=vm.is_loading
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                if ev.key() == "Enter" && !ev.shift_key() {
                                    ev.prevent_default();
                                    handle_send();
                                }
                            }
                        />
                    </div>
                    <Button
                        appearance=ButtonAppearance::Primary
                        disabled=Signal::derive(move || {
                            vm.is_loading.get() || vm.new_message.get().trim().is_empty()
                        })
                        on_click=move |_| handle_send()
                    >
                        {move || if vm.is_loading.get() { "Sending..." } else { "Send" }}
                    </Button>
                </Flex>
            </section>
        </div>
    }
}

#[component]
#[allow(non_snake_case)]
fn MessageBubble(message: Message) -> impl IntoView {
    let is_user = message.sender == Sender::User;
    let class = if is_user {
        "chat-message chat-message--user"
    } else {
        "chat-message chat-message--ai"
    };

    view! {
        <div class=class>
            // Markdown показывается как есть
            <div style="white-space: pre-wrap;">{message.text.clone()}</div>
            <div class="chat-message__meta">
                {format_time(&message.timestamp)}
                {message.is_offline.then(|| view! { <span class="chat-message__offline">" • offline"</span> })}
            </div>
        </div>
    }
}
