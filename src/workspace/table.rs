//! The versioned item table, the storage primitive behind every artifact kind.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::Result;

/// Observer for one table's mutations.
///
/// A table holds at most one listener; a later [`VersionedItemTable::set_listener`]
/// replaces the earlier one. Callbacks fire synchronously on the mutating thread and
/// must not block or assume a particular thread.
pub trait ItemListener<I>: Send + Sync {
    /// A key was inserted for the first time.
    fn on_new_item(&self, key: &str, item: &I);
    /// An existing key received a new value.
    fn on_update_item(&self, key: &str, old: &I, new: &I);
    /// A key was removed.
    fn on_removed_item(&self, key: &str, item: &I);
    /// A key is being renamed; return a replacement value when the item's internal
    /// self-references must be fixed up to match the new key, or `None` to move the
    /// value unchanged.
    fn on_rename_item(&self, old_key: &str, new_key: &str, item: &I) -> Option<I> {
        let _ = (old_key, new_key, item);
        None
    }
}

/// A map from artifact key to current value, with a per-key append-only version history
/// and single-slot change notification.
///
/// Invariants:
/// - A key present in the backing map always has a non-empty history.
/// - The current value equals the last history entry, except transiently inside
///   [`Self::history_decrement`].
/// - A key is *dirty* iff its history holds more than one entry.
/// - [`Self::remove`] discards history entirely; a later `put` of the same key starts a
///   fresh single-entry history.
///
/// The table is not internally synchronized; it assumes one logical writer sequence at
/// a time, which is how the owning [`crate::workspace::Resource`] drives it.
pub struct VersionedItemTable<I> {
    backing: BTreeMap<String, I>,
    history: HashMap<String, Vec<I>>,
    listener: Option<Arc<dyn ItemListener<I>>>,
}

impl<I> Default for VersionedItemTable<I> {
    fn default() -> Self {
        Self {
            backing: BTreeMap::new(),
            history: HashMap::new(),
            listener: None,
        }
    }
}

impl<I: Clone> VersionedItemTable<I> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&I> {
        self.backing.get(key)
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.backing.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backing.len()
    }

    /// Whether the table holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backing.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &I)> {
        self.backing.iter().map(|(key, item)| (key.as_str(), item))
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.backing.keys().map(String::as_str)
    }

    /// Insert or replace a value, returning the previous value when the key existed.
    ///
    /// A new key starts a single-entry history and fires the "new item" notification;
    /// an existing key appends to history and fires "update item" with both values.
    pub fn put(&mut self, key: impl Into<String>, item: I) -> Option<I> {
        let key = key.into();
        match self.backing.insert(key.clone(), item.clone()) {
            None => {
                self.history.insert(key.clone(), vec![item.clone()]);
                if let Some(listener) = &self.listener {
                    listener.on_new_item(&key, &item);
                }
                None
            }
            Some(old) => {
                self.history.entry(key.clone()).or_default().push(item.clone());
                if let Some(listener) = &self.listener {
                    listener.on_update_item(&key, &old, &item);
                }
                Some(old)
            }
        }
    }

    /// Remove a key, discarding its history. Returns the removed value when present.
    pub fn remove(&mut self, key: &str) -> Option<I> {
        let removed = self.backing.remove(key)?;
        self.history.remove(key);
        if let Some(listener) = &self.listener {
            listener.on_removed_item(key, &removed);
        }
        Some(removed)
    }

    /// Move a value from `old_key` to `new_key`.
    ///
    /// The listener may substitute a re-keyed value via
    /// [`ItemListener::on_rename_item`]. History does not move: the new key starts a
    /// fresh single-entry history.
    ///
    /// # Errors
    /// [`crate::Error::KeyNotFound`] when `old_key` is absent,
    /// [`crate::Error::KeyOccupied`] when `new_key` is present; the table is unchanged
    /// in both cases.
    pub fn rename(&mut self, old_key: &str, new_key: &str) -> Result<()> {
        if self.backing.contains_key(new_key) {
            return Err(crate::Error::KeyOccupied(new_key.to_string()));
        }
        let Some(item) = self.backing.remove(old_key) else {
            return Err(crate::Error::KeyNotFound(old_key.to_string()));
        };
        self.history.remove(old_key);
        let item = match &self.listener {
            Some(listener) => listener
                .on_rename_item(old_key, new_key, &item)
                .unwrap_or(item),
            None => item,
        };
        self.backing.insert(new_key.to_string(), item.clone());
        self.history.insert(new_key.to_string(), vec![item]);
        Ok(())
    }

    /// Undo one step for a key: pop the most recent history entry when more than one
    /// exists, then reset the current value to whatever remains on top. The sole
    /// remaining entry is never popped, so a key cannot be undone out of existence.
    ///
    /// # Errors
    /// [`crate::Error::KeyNotFound`] when the key has no history.
    pub fn history_decrement(&mut self, key: &str) -> Result<()> {
        let history = self
            .history
            .get_mut(key)
            .ok_or_else(|| crate::Error::KeyNotFound(key.to_string()))?;
        if history.len() > 1 {
            history.pop();
        }
        let top = history
            .last()
            .cloned()
            .ok_or_else(|| crate::Error::KeyNotFound(key.to_string()))?;
        self.backing.insert(key.to_string(), top);
        Ok(())
    }

    /// Full version history for a key, oldest first.
    #[must_use]
    pub fn history_of(&self, key: &str) -> Option<&[I]> {
        self.history.get(key).map(Vec::as_slice)
    }

    /// Keys whose history holds more than one entry.
    #[must_use]
    pub fn dirty_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .history
            .iter()
            .filter(|(_, history)| history.len() > 1)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Drop every entry and all history. Listeners are not notified; a clear precedes a
    /// full repopulation, not an edit.
    pub fn clear(&mut self) {
        self.backing.clear();
        self.history.clear();
    }

    /// Install the table's listener, replacing any earlier one.
    pub fn set_listener(&mut self, listener: Arc<dyn ItemListener<I>>) {
        self.listener = Some(listener);
    }

    /// Detach the listener.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<String>>,
    }

    impl ItemListener<u32> for RecordingListener {
        fn on_new_item(&self, key: &str, item: &u32) {
            self.events.lock().unwrap().push(format!("new {key}={item}"));
        }
        fn on_update_item(&self, key: &str, old: &u32, new: &u32) {
            self.events
                .lock()
                .unwrap()
                .push(format!("update {key}: {old}->{new}"));
        }
        fn on_removed_item(&self, key: &str, item: &u32) {
            self.events
                .lock()
                .unwrap()
                .push(format!("removed {key}={item}"));
        }
        fn on_rename_item(&self, _old_key: &str, _new_key: &str, item: &u32) -> Option<u32> {
            Some(item + 100)
        }
    }

    #[test]
    fn test_single_put_is_clean() {
        let mut table = VersionedItemTable::new();
        assert!(table.put("a", 1).is_none());
        assert_eq!(table.get("a"), Some(&1));
        assert!(table.dirty_keys().is_empty());
        assert_eq!(table.history_of("a"), Some([1].as_slice()));
    }

    #[test]
    fn test_second_put_dirties_and_appends_history() {
        let mut table = VersionedItemTable::new();
        table.put("a", 1);
        assert_eq!(table.put("a", 2), Some(1));
        assert_eq!(table.dirty_keys(), ["a"]);
        assert_eq!(table.history_of("a"), Some([1, 2].as_slice()));
    }

    #[test]
    fn test_remove_discards_history() {
        let mut table = VersionedItemTable::new();
        table.put("a", 1);
        table.put("a", 2);
        assert_eq!(table.remove("a"), Some(2));
        assert!(table.history_of("a").is_none());
        // Re-adding starts fresh.
        table.put("a", 3);
        assert_eq!(table.history_of("a"), Some([3].as_slice()));
        assert!(table.dirty_keys().is_empty());
    }

    #[test]
    fn test_rename_preconditions() {
        let mut table = VersionedItemTable::new();
        table.put("a", 1);
        table.put("b", 2);
        assert!(matches!(
            table.rename("a", "b"),
            Err(crate::Error::KeyOccupied(_))
        ));
        assert!(matches!(
            table.rename("missing", "c"),
            Err(crate::Error::KeyNotFound(_))
        ));
        assert_eq!(table.get("a"), Some(&1));
        assert_eq!(table.get("b"), Some(&2));
    }

    #[test]
    fn test_rename_starts_clean_history_and_rekeys() {
        let mut table = VersionedItemTable::new();
        table.set_listener(Arc::new(RecordingListener::default()));
        table.put("a", 1);
        table.put("a", 2);
        table.rename("a", "b").unwrap();
        assert!(table.get("a").is_none());
        // Listener substituted a re-keyed value.
        assert_eq!(table.get("b"), Some(&102));
        assert_eq!(table.history_of("b"), Some([102].as_slice()));
        assert!(table.dirty_keys().is_empty());
    }

    #[test]
    fn test_history_decrement_never_drops_last() {
        let mut table = VersionedItemTable::new();
        table.put("a", 1);
        table.put("a", 2);
        table.put("a", 3);
        table.history_decrement("a").unwrap();
        assert_eq!(table.get("a"), Some(&2));
        table.history_decrement("a").unwrap();
        assert_eq!(table.get("a"), Some(&1));
        // Sole entry survives further decrements.
        table.history_decrement("a").unwrap();
        assert_eq!(table.get("a"), Some(&1));
        assert_eq!(table.history_of("a"), Some([1].as_slice()));
        assert!(matches!(
            table.history_decrement("missing"),
            Err(crate::Error::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_listener_replacement_is_last_writer_wins() {
        let mut table = VersionedItemTable::new();
        let first = Arc::new(RecordingListener::default());
        let second = Arc::new(RecordingListener::default());
        table.set_listener(first.clone());
        table.set_listener(second.clone());
        table.put("a", 1);
        assert!(first.events.lock().unwrap().is_empty());
        assert_eq!(second.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_listener_event_payloads() {
        let mut table = VersionedItemTable::new();
        let listener = Arc::new(RecordingListener::default());
        table.set_listener(listener.clone());
        table.put("a", 1);
        table.put("a", 2);
        table.remove("a");
        assert_eq!(
            *listener.events.lock().unwrap(),
            ["new a=1", "update a: 1->2", "removed a=2"]
        );
    }
}
