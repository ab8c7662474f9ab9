//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Copy-on-write listener registry

use crate::ListenerId;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Entries<T> = Arc<Vec<(ListenerId, Arc<T>)>>;

/// Thread-safe set of listeners.
///
/// Every mutation replaces the shared list, so a dispatch iterating over a
/// [`snapshot`](ListenerRegistry::snapshot) never observes a concurrent add
/// or remove and never skips an unrelated listener.
pub(crate) struct ListenerRegistry<T: ?Sized> {
    next_id: AtomicU64,
    entries: RwLock<Entries<T>>,
}

impl<T: ?Sized> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }
}

impl<T: ?Sized> ListenerRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns the ID to remove it with.
    pub fn add(&self, listener: Arc<T>) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write();
        let mut updated = Vec::with_capacity(entries.len() + 1);
        updated.extend(entries.iter().cloned());
        updated.push((id, listener));
        *entries = Arc::new(updated);
        id
    }

    /// Removes a listener. Returns `false` if the ID was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        if !entries.iter().any(|(entry, _)| *entry == id) {
            return false;
        }
        let updated = entries
            .iter()
            .filter(|(entry, _)| *entry != id)
            .cloned()
            .collect();
        *entries = Arc::new(updated);
        true
    }

    /// Removes every listener.
    pub fn clear(&self) {
        *self.entries.write() = Arc::new(Vec::new());
    }

    /// The listeners registered right now.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        let entries = Arc::clone(&self.entries.read());
        entries.iter().map(|(_, listener)| Arc::clone(listener)).collect()
    }
}
