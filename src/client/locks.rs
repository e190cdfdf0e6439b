// This file is part of the terraform-provider-azurerm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide named locks
//!
//! Some child resources cannot be modified concurrently by the API
//! (e.g. the subnets of a virtual network): operations on them take the lock
//! of their parent.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, Weak},
};

use lazy_static::lazy_static;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

lazy_static! {
    /// Locks that are held or waited for, the others are pruned
    static ref LOCKS: Mutex<HashMap<String, Weak<AsyncMutex<()>>>> = Mutex::new(HashMap::new());
}

fn lock_for(key: String) -> Arc<AsyncMutex<()>> {
    let mut locks = LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| lock.strong_count() > 0);
    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }
    let lock = Arc::new(AsyncMutex::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// Wait for the lock named `name` of the given `kind` (usually the resource type)
pub async fn lock_by_name(kind: &str, name: &str) -> OwnedMutexGuard<()> {
    let key = format!("{kind}.{name}");
    debug!(lock = key.as_str(), "locking");
    lock_for(key).lock_owned().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_name_is_exclusive() {
        let guard = lock_by_name("test_exclusive", "a").await;
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), lock_by_name("test_exclusive", "a"))
                .await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired =
            tokio::time::timeout(Duration::from_millis(50), lock_by_name("test_exclusive", "a"))
                .await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn names_and_kinds_are_independent() {
        let _a = lock_by_name("test_independent", "a").await;
        let b = tokio::time::timeout(
            Duration::from_millis(50),
            lock_by_name("test_independent", "b"),
        )
        .await;
        assert!(b.is_ok());
        let other_kind = tokio::time::timeout(
            Duration::from_millis(50),
            lock_by_name("test_independent_other", "a"),
        )
        .await;
        assert!(other_kind.is_ok());
    }

    fn is_registered(key: &str) -> bool {
        LOCKS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let guard = lock_by_name("test_pruned", "a").await;
        assert!(is_registered("test_pruned.a"));
        drop(guard);

        let _other = lock_by_name("test_pruned", "b").await;
        assert!(!is_registered("test_pruned.a"));
        assert!(is_registered("test_pruned.b"));
    }
}
