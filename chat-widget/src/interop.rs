use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlElement};

fn element_by_id(id: &str) -> Option<web_sys::Element> {
    window()?.document()?.get_element_by_id(id)
}

/// Focus an element once the panel's show transition has settled.
pub async fn focus_after(element_id: &str, delay_ms: u32) {
    TimeoutFuture::new(delay_ms).await;
    if let Some(el) = element_by_id(element_id) {
        let _ = el.dyn_ref::<HtmlElement>().map(|e| e.focus());
    }
}

/// Blocking browser alert.
pub fn alert(message: &str) {
    if let Some(window) = window() {
        if let Err(e) = window.alert_with_message(message) {
            dioxus_logger::tracing::warn!("Alert failed: {:?}", e);
        }
    }
}

/// Pin a scroll container to its bottom edge.
pub fn scroll_to_bottom(element_id: &str) {
    if let Some(container) = element_by_id(element_id) {
        container.set_scroll_top(container.scroll_height());
    }
}
