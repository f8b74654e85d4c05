//! Widget state: panel visibility, the single owned connection and the
//! append-only entry list.
//!
//! Nothing here touches the DOM. The component layer performs the side
//! effects (`connect`, alert, focus, scroll) the returned outcomes ask for.

use chrono::Utc;
use shared_types::{ChatEntry, ClientId, OutgoingMessage, Sender};

use crate::config::WidgetConfig;
use crate::error::ChatError;
use crate::socket::{decode_frame, ChatSocket, ConnectionState, SocketEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelToggle {
    Hidden,
    /// `connect_attempted` is true when a new connection was started.
    Shown { connect_attempted: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Empty,
    /// No open connection; the caller should alert.
    NotConnected,
    Sent,
}

pub struct ChatController<S> {
    client_id: ClientId,
    ws_url: String,
    panel_open: bool,
    connection: Option<S>,
    entries: Vec<ChatEntry>,
    next_seq: u64,
}

impl<S: ChatSocket> ChatController<S> {
    pub fn new(client_id: ClientId, config: &WidgetConfig) -> Self {
        let ws_url = config.chat_ws_url(&client_id);
        Self {
            client_id,
            ws_url,
            panel_open: false,
            connection: None,
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
            .as_ref()
            .map(ChatSocket::state)
            .unwrap_or(ConnectionState::Absent)
    }

    /// Flip panel visibility. Showing the panel without an open connection
    /// starts exactly one new attempt through `connect`; the previous
    /// handle, if any, is dropped. Hiding never touches the connection.
    pub fn toggle_panel<F>(&mut self, connect: F) -> PanelToggle
    where
        F: FnOnce(&str) -> Result<S, ChatError>,
    {
        self.panel_open = !self.panel_open;
        if !self.panel_open {
            return PanelToggle::Hidden;
        }

        if self.connection_state() == ConnectionState::Open {
            return PanelToggle::Shown {
                connect_attempted: false,
            };
        }

        self.connection = None;
        match connect(&self.ws_url) {
            Ok(socket) => self.connection = Some(socket),
            Err(e) => {
                dioxus_logger::tracing::error!("Failed to create chat WebSocket: {}", e);
            }
        }

        PanelToggle::Shown {
            connect_attempted: true,
        }
    }

    pub fn handle_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Opened => {
                dioxus_logger::tracing::info!("Connected to chat server");
            }
            SocketEvent::Frame(payload) => self.receive_frame(&payload),
            SocketEvent::Closed { code, reason } => {
                dioxus_logger::tracing::info!(
                    "Disconnected from chat server (code {}): {}",
                    code,
                    reason
                );
            }
            SocketEvent::Error(detail) => {
                dioxus_logger::tracing::error!("Chat WebSocket error: {}", detail);
            }
        }
    }

    /// Trim and send `input`. On success the text is echoed as a user
    /// entry before it is transmitted.
    pub fn send(&mut self, input: &str) -> Result<SendOutcome, ChatError> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Empty);
        }

        if !self.connection.as_ref().is_some_and(|s| s.is_open()) {
            return Ok(SendOutcome::NotConnected);
        }

        let frame =
            serde_json::to_string(&OutgoingMessage::new(text)).map_err(ChatError::Encode)?;
        self.push_entry(text.to_string(), Sender::User);
        if let Some(socket) = self.connection.as_ref() {
            socket.send_text(&frame)?;
        }
        Ok(SendOutcome::Sent)
    }

    fn receive_frame(&mut self, payload: &str) {
        let event = match decode_frame(payload) {
            Ok(event) => event,
            Err(e) => {
                dioxus_logger::tracing::warn!("Dropping chat frame: {}", e);
                return;
            }
        };

        match event.agent_text() {
            Some(text) => {
                let text = text.to_string();
                self.push_entry(text, Sender::Agent);
            }
            None => {
                dioxus_logger::tracing::debug!("Ignoring chat frame: {:?}", event);
            }
        }
    }

    fn push_entry(&mut self, text: String, sender: Sender) {
        self.entries.push(ChatEntry {
            seq: self.next_seq,
            text,
            sender,
            timestamp: Utc::now(),
        });
        self.next_seq += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    #[derive(Clone)]
    struct FakeSocket {
        state: Rc<Cell<ConnectionState>>,
        sent: Rc<RefCell<Vec<String>>>,
        fail_sends: bool,
    }

    impl FakeSocket {
        fn new(state: ConnectionState) -> Self {
            Self {
                state: Rc::new(Cell::new(state)),
                sent: Rc::new(RefCell::new(Vec::new())),
                fail_sends: false,
            }
        }
    }

    impl ChatSocket for FakeSocket {
        fn state(&self) -> ConnectionState {
            self.state.get()
        }

        fn send_text(&self, text: &str) -> Result<(), ChatError> {
            if self.fail_sends {
                return Err(ChatError::Socket("InvalidStateError".to_string()));
            }
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn controller() -> ChatController<FakeSocket> {
        let config = WidgetConfig {
            ws_origin: "wss://example.com".to_string(),
            ..WidgetConfig::default()
        };
        ChatController::new(ClientId("3fa-e1".to_string()), &config)
    }

    /// Open the panel with a socket that is already open.
    fn connected(socket: &FakeSocket) -> ChatController<FakeSocket> {
        let mut chat = controller();
        let handle = socket.clone();
        chat.toggle_panel(move |_| Ok(handle));
        socket.state.set(ConnectionState::Open);
        chat.handle_event(SocketEvent::Opened);
        chat
    }

    #[test]
    fn opening_without_connection_attempts_once() {
        let mut chat = controller();
        let attempts = Cell::new(0);
        let mut urls = Vec::new();

        let outcome = chat.toggle_panel(|url| {
            attempts.set(attempts.get() + 1);
            urls.push(url.to_string());
            Ok(FakeSocket::new(ConnectionState::Connecting))
        });

        assert_eq!(
            outcome,
            PanelToggle::Shown {
                connect_attempted: true
            }
        );
        assert_eq!(attempts.get(), 1);
        assert_eq!(urls, vec!["wss://example.com/ws/3fa-e1".to_string()]);
        assert!(chat.is_panel_open());
        assert_eq!(chat.connection_state(), ConnectionState::Connecting);
    }

    #[test]
    fn reopening_with_open_connection_does_not_reconnect() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = connected(&socket);

        assert_eq!(chat.toggle_panel(|_| panic!("must not connect")), PanelToggle::Hidden);
        assert!(!chat.is_panel_open());
        assert_eq!(chat.connection_state(), ConnectionState::Open);

        let outcome = chat.toggle_panel(|_| panic!("must not connect"));
        assert_eq!(
            outcome,
            PanelToggle::Shown {
                connect_attempted: false
            }
        );
    }

    #[test]
    fn reopening_after_close_starts_fresh_connection() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = connected(&socket);

        socket.state.set(ConnectionState::Closed);
        chat.handle_event(SocketEvent::Closed {
            code: 1006,
            reason: String::new(),
        });
        chat.toggle_panel(|_| panic!("hiding must not connect"));

        let replacement = FakeSocket::new(ConnectionState::Connecting);
        let handle = replacement.clone();
        let attempts = Cell::new(0);
        chat.toggle_panel(|_| {
            attempts.set(attempts.get() + 1);
            Ok(handle)
        });

        assert_eq!(attempts.get(), 1);
        assert_eq!(chat.connection_state(), ConnectionState::Connecting);
    }

    #[test]
    fn failed_connect_leaves_no_connection() {
        let mut chat = controller();
        let outcome = chat.toggle_panel(|_| Err(ChatError::Socket("SyntaxError".to_string())));

        assert_eq!(
            outcome,
            PanelToggle::Shown {
                connect_attempted: true
            }
        );
        assert_eq!(chat.connection_state(), ConnectionState::Absent);
        assert_eq!(chat.send("hello").unwrap(), SendOutcome::NotConnected);
    }

    #[test]
    fn blank_input_is_a_silent_no_op() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = connected(&socket);

        assert_eq!(chat.send("").unwrap(), SendOutcome::Empty);
        assert_eq!(chat.send("   \t\n").unwrap(), SendOutcome::Empty);
        assert!(chat.entries().is_empty());
        assert!(socket.sent.borrow().is_empty());
    }

    #[test]
    fn blank_input_without_connection_does_not_alert() {
        let mut chat = controller();
        assert_eq!(chat.send("  ").unwrap(), SendOutcome::Empty);
    }

    #[test]
    fn send_echoes_and_transmits_trimmed_text() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = connected(&socket);

        assert_eq!(chat.send("  hello  ").unwrap(), SendOutcome::Sent);

        assert_eq!(chat.entries().len(), 1);
        assert_eq!(chat.entries()[0].text, "hello");
        assert_eq!(chat.entries()[0].sender, Sender::User);
        assert_eq!(*socket.sent.borrow(), vec![r#"{"content":"hello"}"#.to_string()]);
    }

    #[test]
    fn send_while_connecting_or_closed_is_not_connected() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = controller();
        let handle = socket.clone();
        chat.toggle_panel(move |_| Ok(handle));

        assert_eq!(chat.send("hello").unwrap(), SendOutcome::NotConnected);

        socket.state.set(ConnectionState::Closed);
        assert_eq!(chat.send("hello").unwrap(), SendOutcome::NotConnected);

        assert!(chat.entries().is_empty());
        assert!(socket.sent.borrow().is_empty());
    }

    #[test]
    fn transport_failure_is_reported_after_echo() {
        let mut socket = FakeSocket::new(ConnectionState::Connecting);
        socket.fail_sends = true;
        let mut chat = connected(&socket);

        assert!(matches!(chat.send("hello"), Err(ChatError::Socket(_))));
        assert_eq!(chat.entries().len(), 1);
    }

    #[test]
    fn agent_frames_render_and_others_are_ignored() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = connected(&socket);

        chat.handle_event(SocketEvent::Frame(
            r#"{"type":"message","content":"hi"}"#.to_string(),
        ));
        chat.handle_event(SocketEvent::Frame(r#"{"type":"typing"}"#.to_string()));
        chat.handle_event(SocketEvent::Frame("{not json".to_string()));
        chat.handle_event(SocketEvent::Frame(
            r#"{"type":"admin_message","content":"<b>agent</b>"}"#.to_string(),
        ));

        let entries = chat.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "hi");
        assert_eq!(entries[0].sender, Sender::Agent);
        assert_eq!(entries[1].text, "<b>agent</b>");
        assert_eq!(entries[1].sender.css_class(), "agent");
    }

    #[test]
    fn end_to_end_exchange_keeps_order() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = connected(&socket);

        chat.send("hello").unwrap();
        chat.handle_event(SocketEvent::Frame(
            r#"{"type":"message","content":"hi there","sender":"agent"}"#.to_string(),
        ));

        let entries = chat.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            (entries[0].text.as_str(), entries[0].sender.css_class()),
            ("hello", "user")
        );
        assert_eq!(
            (entries[1].text.as_str(), entries[1].sender.css_class()),
            ("hi there", "agent")
        );
        assert!(entries[0].seq < entries[1].seq);
    }

    #[test]
    fn socket_errors_do_not_touch_entries() {
        let socket = FakeSocket::new(ConnectionState::Connecting);
        let mut chat = connected(&socket);

        chat.handle_event(SocketEvent::Error("error".to_string()));
        assert!(chat.entries().is_empty());
        assert!(chat.is_panel_open());
    }
}
