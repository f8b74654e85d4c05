use std::cell::RefCell;
use std::rc::Rc;

use shared_types::{IncomingFrame, ServerEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Absent,
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Open => "Connected",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Absent | ConnectionState::Closed => "Offline",
        }
    }
}

/// Lifecycle callbacks, delivered in transport order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Opened,
    Frame(String),
    Closed { code: u16, reason: String },
    Error(String),
}

/// The one connection the controller owns.
pub trait ChatSocket {
    fn state(&self) -> ConnectionState;
    fn send_text(&self, text: &str) -> Result<(), ChatError>;

    fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }
}

pub fn decode_frame(payload: &str) -> Result<ServerEvent, ChatError> {
    serde_json::from_str::<IncomingFrame>(payload)
        .map(IncomingFrame::into_event)
        .map_err(ChatError::Decode)
}

/// Diagnostic text for a socket `error` event.
pub fn error_detail(event: &Event) -> String {
    format!("{event:?}")
}

/// `web_sys::WebSocket` together with the callbacks registered on it.
///
/// Dropping it detaches the callbacks and closes the socket, so a replaced
/// connection attempt never reports back.
pub struct BrowserSocket {
    ws: WebSocket,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl BrowserSocket {
    pub fn connect<F>(url: &str, on_event: F) -> Result<Self, ChatError>
    where
        F: FnMut(SocketEvent) + 'static,
    {
        dioxus_logger::tracing::info!("Connecting to chat server: {}", url);

        let ws = WebSocket::new(url).map_err(ChatError::socket)?;

        let on_event = Rc::new(RefCell::new(on_event));
        let on_event_open = on_event.clone();
        let on_event_message = on_event.clone();
        let on_event_error = on_event.clone();
        let on_event_close = on_event;

        let on_open = Closure::wrap(Box::new(move |_e: Event| {
            on_event_open.borrow_mut()(SocketEvent::Opened);
        }) as Box<dyn FnMut(Event)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            let Some(text) = e.data().as_string() else {
                dioxus_logger::tracing::debug!("Dropping non-text chat frame");
                return;
            };
            on_event_message.borrow_mut()(SocketEvent::Frame(text));
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let on_error = Closure::wrap(Box::new(move |e: Event| {
            on_event_error.borrow_mut()(SocketEvent::Error(error_detail(&e)));
        }) as Box<dyn FnMut(Event)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            on_event_close.borrow_mut()(SocketEvent::Closed {
                code: e.code(),
                reason: e.reason(),
            });
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        })
    }
}

impl ChatSocket for BrowserSocket {
    fn state(&self) -> ConnectionState {
        match self.ws.ready_state() {
            WebSocket::CONNECTING => ConnectionState::Connecting,
            WebSocket::OPEN => ConnectionState::Open,
            _ => ConnectionState::Closed,
        }
    }

    fn send_text(&self, text: &str) -> Result<(), ChatError> {
        self.ws.send_with_str(text).map_err(ChatError::socket)
    }
}

impl Drop for BrowserSocket {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        if matches!(
            self.state(),
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            let _ = self.ws.close();
        }
    }
}
