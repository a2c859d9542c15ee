//! Keyed storage of shared clients.
//!
//! Each key (an EVM chain id, a Solana environment tag) maps to an ordered
//! list of clients. Insertion order is preserved because selection policies
//! walk the list in that order.

use std::{collections::HashMap, hash::Hash, sync::Arc};
use tokio::sync::RwLock;

pub struct ClientStorage<K, T> {
	pub clients: Arc<RwLock<HashMap<K, Vec<Arc<T>>>>>,
}

impl<K, T> Default for ClientStorage<K, T> {
	fn default() -> Self {
		Self {
			clients: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl<K: Eq + Hash + Clone, T> ClientStorage<K, T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `client` under `key`, unless `is_same` matches an existing entry.
	///
	/// Returns the stored client: the new one, or the existing duplicate.
	pub async fn insert_unique(
		&self,
		key: K,
		client: Arc<T>,
		is_same: impl Fn(&T, &T) -> bool,
	) -> Arc<T> {
		let mut clients = self.clients.write().await;
		let entry = clients.entry(key).or_default();
		if let Some(existing) = entry.iter().find(|c| is_same(c, &client)) {
			return existing.clone();
		}
		entry.push(client.clone());
		client
	}

	/// Snapshot of the clients registered under `key`.
	pub async fn get(&self, key: &K) -> Vec<Arc<T>> {
		self.clients
			.read()
			.await
			.get(key)
			.cloned()
			.unwrap_or_default()
	}

	pub async fn keys(&self) -> Vec<K> {
		self.clients.read().await.keys().cloned().collect()
	}

	pub async fn len(&self) -> usize {
		self.clients.read().await.values().map(Vec::len).sum()
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}
