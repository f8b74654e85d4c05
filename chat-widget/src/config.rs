use std::sync::OnceLock;

use shared_types::{ClientId, CLIENT_ID_STORAGE_KEY};

pub const DEFAULT_WS_PATH: &str = "/ws";
pub const DEFAULT_FOCUS_DELAY_MS: u32 = 300;
pub const NOT_CONNECTED_ALERT: &str =
    "Not connected to chat server. Please try closing and reopening the chat.";

/// Optional origin for development setups where the chat server does not
/// serve the page, e.g. `http://localhost:8000`.
const WS_ORIGIN_OVERRIDE: Option<&str> = option_env!("CHAT_WIDGET_WS_ORIGIN");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Local storage key for the client identifier
    pub storage_key: String,
    /// Scheme and host of the chat endpoint, e.g. `wss://example.com`
    pub ws_origin: String,
    /// Path prefix the client identifier is appended to
    pub ws_path: String,
    /// Delay before focusing the input after the panel opens
    pub focus_delay_ms: u32,
    /// Shown when sending without an open connection
    pub not_connected_alert: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            storage_key: CLIENT_ID_STORAGE_KEY.to_string(),
            ws_origin: "ws://localhost".to_string(),
            ws_path: DEFAULT_WS_PATH.to_string(),
            focus_delay_ms: DEFAULT_FOCUS_DELAY_MS,
            not_connected_alert: NOT_CONNECTED_ALERT.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Derive the endpoint origin from the current page location.
    pub fn from_page() -> Self {
        let ws_origin = match WS_ORIGIN_OVERRIDE.filter(|origin| !origin.trim().is_empty()) {
            Some(origin) => http_to_ws_url(origin),
            None => {
                let location = web_sys::window().map(|w| w.location());
                let protocol = location
                    .as_ref()
                    .and_then(|l| l.protocol().ok())
                    .unwrap_or_else(|| "http:".to_string());
                let host = location
                    .as_ref()
                    .and_then(|l| l.host().ok())
                    .unwrap_or_else(|| "localhost".to_string());
                ws_origin_for(&protocol, &host)
            }
        };

        Self {
            ws_origin,
            ..Self::default()
        }
    }

    /// `<origin><path>/<client_id>`, identifier used verbatim.
    pub fn chat_ws_url(&self, client_id: &ClientId) -> String {
        format!(
            "{}{}/{}",
            self.ws_origin.trim_end_matches('/'),
            self.ws_path.trim_end_matches('/'),
            client_id
        )
    }
}

static WIDGET_CONFIG: OnceLock<WidgetConfig> = OnceLock::new();

/// Page-derived configuration, computed at first use.
pub fn widget_config() -> &'static WidgetConfig {
    WIDGET_CONFIG.get_or_init(WidgetConfig::from_page)
}

/// Secure pages get `wss:`, everything else `ws:`.
pub fn ws_origin_for(page_protocol: &str, host: &str) -> String {
    if page_protocol == "https:" {
        format!("wss://{host}")
    } else {
        format!("ws://{host}")
    }
}

pub fn http_to_ws_url(http_url: &str) -> String {
    let trimmed = http_url.trim().trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        trimmed.to_string()
    } else {
        format!("ws://{trimmed}")
    }
}
