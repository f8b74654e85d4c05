use std::cell::RefCell;
use std::collections::HashMap;

use shared_types::ClientId;

use crate::error::ChatError;

/// Persistent string store the client identifier lives in.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ChatError>;
}

/// `window.localStorage`
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn local() -> Result<Self, ChatError> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Storage("no global `window` exists".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(ChatError::storage)?
            .ok_or_else(|| ChatError::Storage("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        self.storage.get_item(key).map_err(ChatError::storage)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        self.storage.set_item(key, value).map_err(ChatError::storage)
    }
}

/// Page-lifetime store used when local storage cannot be reached.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the identifier stored under `key`, creating and persisting one if
/// absent. A stored value is returned unchanged.
pub fn resolve_client_id<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<ClientId, ChatError> {
    if let Some(existing) = store.get(key)?.as_deref().and_then(ClientId::from_stored) {
        return Ok(existing);
    }

    let client_id = ClientId::generate();
    store.set(key, client_id.as_str())?;
    dioxus_logger::tracing::info!("Created chat client id {}", client_id);
    Ok(client_id)
}

thread_local! {
    static FALLBACK_STORE: MemoryStore = MemoryStore::default();
}

/// Resolve against the page-lifetime store. Repeated calls agree until the
/// page unloads.
pub fn fallback_client_id(key: &str) -> ClientId {
    FALLBACK_STORE.with(|store| match resolve_client_id(store, key) {
        Ok(client_id) => client_id,
        // MemoryStore never fails
        Err(_) => ClientId::generate(),
    })
}

/// Browser-backed resolution. Falls back to a session-only identifier if
/// local storage is unavailable.
pub fn load_client_id(key: &str) -> ClientId {
    match BrowserStorage::local().and_then(|storage| resolve_client_id(&storage, key)) {
        Ok(client_id) => client_id,
        Err(e) => {
            dioxus_logger::tracing::warn!(
                "Client id cannot be persisted, using a session-only id: {}",
                e
            );
            fallback_client_id(key)
        }
    }
}
