use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("local storage unavailable: {0}")]
    Storage(String),

    #[error("websocket failure: {0}")]
    Socket(String),

    #[error("malformed frame: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ChatError {
    pub(crate) fn storage(err: JsValue) -> Self {
        Self::Storage(js_error_text(&err))
    }

    pub(crate) fn socket(err: JsValue) -> Self {
        Self::Socket(js_error_text(&err))
    }
}

fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
