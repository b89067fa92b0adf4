use uuid::Uuid;

use crate::storage::TabStorage;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const SESSION_KEY: &str = "st_session_id";

/// Returns this tab's session id, minting and storing one on first use.
///
/// If the tab storage refuses reads or writes the freshly minted id is still
/// returned; it just won't be seen by the next page in the tab.
pub fn get_or_create_session_id(storage: &dyn TabStorage) -> String {
    match storage.get(SESSION_KEY) {
        Ok(Some(existing)) if !existing.is_empty() => return existing,
        Ok(_) => {}
        Err(err) => log_debug!("Session id lookup failed, minting a new one: {err:#}"),
    }

    let id = Uuid::new_v4().to_string();
    if let Err(err) = storage.set(SESSION_KEY, &id) {
        log_debug!("Session id {id} will not persist across pages: {err:#}");
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BlockedTabStorage, MemoryTabStorage};

    #[test]
    fn stable_within_a_tab() {
        let tab = MemoryTabStorage::new();
        let first = get_or_create_session_id(&tab);
        let second = get_or_create_session_id(&tab);
        assert_eq!(first, second);
        assert_eq!(tab.get(SESSION_KEY).unwrap(), Some(first.clone()));
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn distinct_across_tabs() {
        let a = get_or_create_session_id(&MemoryTabStorage::new());
        let b = get_or_create_session_id(&MemoryTabStorage::new());
        assert_ne!(a, b);
    }

    #[test]
    fn blocked_storage_still_yields_an_id() {
        let id = get_or_create_session_id(&BlockedTabStorage);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, get_or_create_session_id(&BlockedTabStorage));
    }

    #[test]
    fn empty_stored_value_is_replaced() {
        let tab = MemoryTabStorage::new();
        tab.set(SESSION_KEY, "").unwrap();
        let id = get_or_create_session_id(&tab);
        assert!(!id.is_empty());
        assert_eq!(tab.get(SESSION_KEY).unwrap(), Some(id));
    }
}
