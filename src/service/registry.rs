use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::ScheduleError;
use crate::models::interval::Interval;
use crate::service::interval::EventPolicy;
use crate::service::schedule_store::ScheduleStore;

pub type SharedStore = Arc<Mutex<ScheduleStore>>;

/// Hands out one store per user key. Stores are never shared between keys;
/// callers mutate a store only while holding its lock.
pub struct ScheduleRegistry {
    stores: Mutex<HashMap<String, SharedStore>>,
    policy: EventPolicy,
}

impl ScheduleRegistry {
    pub fn new(policy: EventPolicy) -> Self {
        Self {
            stores: Mutex::new(HashMap::new()),
            policy,
        }
    }

    pub async fn store_for(&self, user: &str) -> SharedStore {
        let mut stores = self.stores.lock().await;
        stores
            .entry(user.to_string())
            .or_insert_with(|| {
                info!(user, "created schedule store");
                Arc::new(Mutex::new(ScheduleStore::new(self.policy)))
            })
            .clone()
    }

    pub async fn install(&self, user: &str, store: ScheduleStore) -> SharedStore {
        let shared = Arc::new(Mutex::new(store));
        let mut stores = self.stores.lock().await;
        stores.insert(user.to_string(), shared.clone());
        shared
    }

    pub async fn users(&self) -> Vec<String> {
        let stores = self.stores.lock().await;
        let mut users: Vec<String> = stores.keys().cloned().collect();
        users.sort();
        users
    }

    pub async fn create_day(&self, user: &str, interval: &Interval) -> Result<usize, ScheduleError> {
        let store = self.store_for(user).await;
        let mut guard = store.lock().await;
        guard.create_day(interval)
    }
}

impl Default for ScheduleRegistry {
    fn default() -> Self {
        Self::new(EventPolicy::default())
    }
}
