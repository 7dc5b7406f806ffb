//! Favorites
//!
//! The user's persisted set of favorite names.

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::error::Result;
use crate::storage::PersistentStore;

/// Storage key of the favorites list.
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Clone)]
pub struct Favorites {
    store: PersistentStore,
    // Serializes read-modify-write toggles
    write_lock: Arc<Mutex<()>>,
}

impl Favorites {
    pub fn new(store: PersistentStore) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Favorite names in the order they were added.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.store.get(FAVORITES_KEY)?.unwrap_or_default())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|n| n == name))
    }

    /// Marks or unmarks `name`. Setting the current marking again is a no-op.
    pub fn set(&self, name: &str, favorite: bool) -> Result<()> {
        self.update(name, |_| favorite).map(|_| ())
    }

    /// Adds `name` if absent, removes it otherwise. Returns whether it is a
    /// favorite afterwards.
    pub fn toggle(&self, name: &str) -> Result<bool> {
        self.update(name, |current| !current)
    }

    fn update(&self, name: &str, next: impl FnOnce(bool) -> bool) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut favorites = self.list()?;
        let position = favorites.iter().position(|n| n == name);
        let favorite = next(position.is_some());

        match (position, favorite) {
            (Some(index), false) => {
                favorites.remove(index);
            }
            (None, true) => favorites.push(name.to_string()),
            _ => return Ok(favorite),
        }

        self.store.set(FAVORITES_KEY, &favorites, None)?;
        info!("Favorite {}: {}", name, favorite);
        Ok(favorite)
    }
}
