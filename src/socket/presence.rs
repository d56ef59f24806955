use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Number of open connections per account, local to this process.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    connections: Arc<RwLock<HashMap<Uuid, usize>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection and return the account's connection count.
    pub async fn connect(&self, user: Uuid) -> usize {
        let mut connections = self.connections.write().await;
        let count = connections.entry(user).or_insert(0);
        *count += 1;
        debug!(user = %user, connections = *count, "user connected");
        *count
    }

    /// Record a closed connection and return the remaining count.
    ///
    /// The account is forgotten once its last connection closes.
    pub async fn disconnect(&self, user: Uuid) -> usize {
        let mut connections = self.connections.write().await;
        let Some(count) = connections.get_mut(&user) else {
            return 0;
        };
        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            connections.remove(&user);
            debug!(user = %user, "user fully disconnected");
        } else {
            debug!(user = %user, connections = remaining, "user disconnected");
        }
        remaining
    }

    pub async fn is_online(&self, user: Uuid) -> bool {
        self.connections.read().await.contains_key(&user)
    }

    pub async fn connection_count(&self, user: Uuid) -> usize {
        self.connections
            .read()
            .await
            .get(&user)
            .copied()
            .unwrap_or(0)
    }

    /// Accounts with at least one open connection, sorted.
    pub async fn online_users(&self) -> Vec<Uuid> {
        let mut users: Vec<Uuid> = self.connections.read().await.keys().copied().collect();
        users.sort();
        users
    }
}
