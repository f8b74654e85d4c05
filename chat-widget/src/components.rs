use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use shared_types::ChatEntry;

use crate::config::widget_config;
use crate::controller::{ChatController, PanelToggle, SendOutcome};
use crate::error::ChatError;
use crate::identity::load_client_id;
use crate::interop::{alert, focus_after, scroll_to_bottom};
use crate::socket::{BrowserSocket, ConnectionState};

pub const WIDGET_ID: &str = "chat-widget";
pub const WINDOW_ID: &str = "chat-window";
pub const MESSAGES_ID: &str = "chat-messages";
pub const INPUT_ID: &str = "chat-input";

#[component]
pub fn ChatWidget() -> Element {
    let config = widget_config();
    let mut controller = use_signal(|| {
        let client_id = load_client_id(&config.storage_key);
        ChatController::<BrowserSocket>::new(client_id, config)
    });
    let mut input_text = use_signal(String::new);

    // Pin to bottom whenever an entry is appended
    use_effect(move || {
        let _ = controller.read().entries().len();
        scroll_to_bottom(MESSAGES_ID);
    });

    let toggle_panel = use_callback(move |_| {
        let events = controller;
        let outcome = controller.write().toggle_panel(move |url| {
            let mut events = events;
            BrowserSocket::connect(url, move |event| events.write().handle_event(event))
        });

        if let PanelToggle::Shown { .. } = outcome {
            spawn(async move {
                focus_after(INPUT_ID, config.focus_delay_ms).await;
            });
        }
    });

    let send_message = use_callback(move |_| {
        let text = input_text.read().clone();
        let result = controller.write().send(&text);

        if let Err(e) = &result {
            dioxus_logger::tracing::error!("Failed to send chat message: {}", e);
        }
        match send_effect(&result) {
            SendEffect::ClearInput => input_text.set(String::new()),
            SendEffect::AlertNotConnected => alert(&config.not_connected_alert),
            SendEffect::KeepInput => {}
        }
    });

    let onkeydown = use_callback(move |e: KeyboardEvent| {
        if e.key() == Key::Enter {
            e.prevent_default();
            send_message.call(());
        }
    });

    let oninput = use_callback(move |e: FormEvent| {
        input_text.set(e.value());
    });

    let (panel_open, connection_state, entries) = {
        let chat = controller.read();
        (
            chat.is_panel_open(),
            chat.connection_state(),
            chat.entries().to_vec(),
        )
    };

    rsx! {
        style { {CHAT_STYLES} }

        div {
            id: WIDGET_ID,
            class: "chat-widget",

            div {
                id: WINDOW_ID,
                class: if panel_open { "chat-window" } else { "chat-window hidden" },

                div {
                    class: "chat-header",
                    span { class: "chat-title", "Support Chat" }
                    ConnectionBadge { state: connection_state }
                    button {
                        class: "chat-close",
                        title: "Close chat",
                        onclick: move |_| toggle_panel.call(()),
                        "×"
                    }
                }

                div {
                    id: MESSAGES_ID,
                    class: "chat-messages",
                    if entries.is_empty() {
                        div { class: "chat-empty", "Say hello to start a conversation" }
                    }
                    for entry in entries.iter() {
                        MessageBubble { key: "{entry.seq}", entry: entry.clone() }
                    }
                }

                div {
                    class: "chat-input-area",
                    input {
                        id: INPUT_ID,
                        class: "chat-input",
                        r#type: "text",
                        placeholder: "Type a message...",
                        value: "{input_text}",
                        oninput,
                        onkeydown,
                    }
                    button {
                        class: "chat-send",
                        onclick: move |_| send_message.call(()),
                        "Send"
                    }
                }
            }

            button {
                class: "chat-launcher",
                title: "Chat with us",
                onclick: move |_| toggle_panel.call(()),
                "💬"
            }
        }
    }
}

/// One rendered entry. Text is always a literal text node.
#[component]
pub fn MessageBubble(entry: ChatEntry) -> Element {
    let class = format!("message {}", entry.sender.css_class());

    rsx! {
        div {
            class: "{class}",
            span { class: "message-text", "{entry.text}" }
            span { class: "message-time", "{format_timestamp(entry.timestamp)}" }
        }
    }
}

#[component]
pub fn ConnectionBadge(state: ConnectionState) -> Element {
    let class = match state {
        ConnectionState::Open => "chat-status connected",
        ConnectionState::Connecting => "chat-status connecting",
        ConnectionState::Absent | ConnectionState::Closed => "chat-status",
    };

    rsx! {
        span {
            class,
            span { class: "status-dot", "●" }
            span { "{state.label()}" }
        }
    }
}

/// What the input row does after a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendEffect {
    ClearInput,
    AlertNotConnected,
    KeepInput,
}

fn send_effect(result: &Result<SendOutcome, ChatError>) -> SendEffect {
    match result {
        Ok(SendOutcome::Sent) => SendEffect::ClearInput,
        Ok(SendOutcome::NotConnected) => SendEffect::AlertNotConnected,
        Ok(SendOutcome::Empty) | Err(_) => SendEffect::KeepInput,
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

const CHAT_STYLES: &str = r#"
.chat-widget {
    position: fixed;
    right: 1.5rem;
    bottom: 1.5rem;
    z-index: 1000;
    display: flex;
    flex-direction: column;
    align-items: flex-end;
    gap: 0.75rem;
    font-family: system-ui, sans-serif;
}

.chat-launcher {
    width: 56px;
    height: 56px;
    border: none;
    border-radius: 50%;
    background: #2563eb;
    color: white;
    font-size: 1.5rem;
    cursor: pointer;
    box-shadow: 0 8px 24px rgba(0, 0, 0, 0.2);
}

.chat-window {
    width: 340px;
    height: 460px;
    display: flex;
    flex-direction: column;
    background: white;
    border-radius: 12px;
    box-shadow: 0 12px 32px rgba(0, 0, 0, 0.25);
    overflow: hidden;
    transition: opacity 0.3s ease, transform 0.3s ease;
}

.chat-window.hidden {
    display: none;
}

.chat-header {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    padding: 0.75rem 1rem;
    background: #2563eb;
    color: white;
}

.chat-title {
    flex: 1;
    font-weight: 600;
}

.chat-status {
    display: flex;
    align-items: center;
    gap: 0.25rem;
    font-size: 0.75rem;
    opacity: 0.85;
}

.chat-status .status-dot {
    color: #9ca3af;
}

.chat-status.connecting .status-dot {
    color: #f59e0b;
}

.chat-status.connected .status-dot {
    color: #10b981;
}

.chat-close {
    background: none;
    border: none;
    color: white;
    font-size: 1.25rem;
    cursor: pointer;
}

.chat-messages {
    flex: 1;
    overflow-y: auto;
    padding: 1rem;
    display: flex;
    flex-direction: column;
    gap: 0.5rem;
    background: #f9fafb;
}

.chat-empty {
    margin: auto;
    color: #6b7280;
    font-size: 0.875rem;
}

.message {
    max-width: 80%;
    padding: 0.5rem 0.75rem;
    border-radius: 12px;
    white-space: pre-wrap;
    word-wrap: break-word;
    font-size: 0.875rem;
}

.message.user {
    align-self: flex-end;
    background: #2563eb;
    color: white;
    border-bottom-right-radius: 4px;
}

.message.agent {
    align-self: flex-start;
    background: #e5e7eb;
    color: #111827;
    border-bottom-left-radius: 4px;
}

.message-time {
    display: block;
    margin-top: 0.25rem;
    font-size: 0.65rem;
    opacity: 0.7;
}

.chat-input-area {
    display: flex;
    gap: 0.5rem;
    padding: 0.75rem;
    border-top: 1px solid #e5e7eb;
}

.chat-input {
    flex: 1;
    padding: 0.5rem 0.75rem;
    border: 1px solid #d1d5db;
    border-radius: 8px;
    font-size: 0.875rem;
    outline: none;
}

.chat-send {
    padding: 0.5rem 1rem;
    background: #2563eb;
    color: white;
    border: none;
    border-radius: 8px;
    cursor: pointer;
}
"#;
