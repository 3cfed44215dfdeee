//! Thread-local diagnostic map.
//!
//! A small key/value store attached to the calling thread. Logging code reads
//! it to tag lines with whatever the current unit of work has published.

use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static DIAGNOSTICS: RefCell<HashMap<&'static str, String>> = RefCell::new(HashMap::new());
}

/// Store `value` under `key` for the calling thread, replacing any previous value.
pub fn put(key: &'static str, value: impl Into<String>) {
    let value = value.into();
    DIAGNOSTICS.with(|map| {
        map.borrow_mut().insert(key, value);
    });
}

/// Read the value stored under `key` for the calling thread.
pub fn get(key: &str) -> Option<String> {
    DIAGNOSTICS.with(|map| map.borrow().get(key).cloned())
}

/// Remove `key` from the calling thread's map, returning the old value.
pub fn remove(key: &str) -> Option<String> {
    DIAGNOSTICS.with(|map| map.borrow_mut().remove(key))
}

/// Copy of every entry visible to the calling thread.
pub fn snapshot() -> Vec<(&'static str, String)> {
    DIAGNOSTICS.with(|map| {
        let mut entries: Vec<_> = map
            .borrow()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    })
}
