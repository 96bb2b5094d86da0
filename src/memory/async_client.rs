//! Fire-and-collect façade over [`Client`].
//!
//! Every operation spawns onto a tracked tokio task and returns a
//! [`JoinHandle`] immediately. The tracker knows about all outstanding tasks,
//! so [`AsyncClient::wait`] can drain them before the underlying resources
//! are released.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::Result;
use crate::memory::client::Client;
use crate::memory::options::{AddOptions, DeleteAllOptions, GetAllOptions, SearchOptions};
use crate::memory::types::Memory;

/// Concurrent counterpart of [`Client`]: same operations, each running in its
/// own task. The client's internal lock still serializes mutations.
pub struct AsyncClient {
    client: Arc<Client>,
    tracker: TaskTracker,
}

impl AsyncClient {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            tracker: TaskTracker::new(),
        }
    }

    /// The wrapped synchronous-style client, for mixing call styles.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Spawn an [`add`](Client::add); the handle resolves to the stored (or
    /// merged) memory.
    pub fn add(
        &self,
        cancel: CancellationToken,
        content: String,
        opts: AddOptions,
    ) -> JoinHandle<Result<Memory>> {
        let client = self.client.clone();
        self.tracker
            .spawn(async move { client.add(&cancel, &content, opts).await })
    }

    /// Spawn a [`search`](Client::search).
    pub fn search(
        &self,
        cancel: CancellationToken,
        query: String,
        opts: SearchOptions,
    ) -> JoinHandle<Result<Vec<Memory>>> {
        let client = self.client.clone();
        self.tracker
            .spawn(async move { client.search(&cancel, &query, opts).await })
    }

    /// Spawn a [`get`](Client::get).
    pub fn get(&self, cancel: CancellationToken, id: String) -> JoinHandle<Result<Memory>> {
        let client = self.client.clone();
        self.tracker
            .spawn(async move { client.get(&cancel, &id).await })
    }

    /// Spawn an [`update`](Client::update).
    pub fn update(
        &self,
        cancel: CancellationToken,
        id: String,
        content: String,
    ) -> JoinHandle<Result<Memory>> {
        let client = self.client.clone();
        self.tracker
            .spawn(async move { client.update(&cancel, &id, &content).await })
    }

    /// Spawn a [`delete`](Client::delete).
    pub fn delete(&self, cancel: CancellationToken, id: String) -> JoinHandle<Result<()>> {
        let client = self.client.clone();
        self.tracker
            .spawn(async move { client.delete(&cancel, &id).await })
    }

    /// Spawn a [`get_all`](Client::get_all).
    pub fn get_all(
        &self,
        cancel: CancellationToken,
        opts: GetAllOptions,
    ) -> JoinHandle<Result<Vec<Memory>>> {
        let client = self.client.clone();
        self.tracker
            .spawn(async move { client.get_all(&cancel, opts).await })
    }

    /// Spawn a [`delete_all`](Client::delete_all).
    pub fn delete_all(
        &self,
        cancel: CancellationToken,
        opts: DeleteAllOptions,
    ) -> JoinHandle<Result<()>> {
        let client = self.client.clone();
        self.tracker
            .spawn(async move { client.delete_all(&cancel, opts).await })
    }

    /// Block until every outstanding spawned operation has completed. New
    /// operations may be spawned afterwards.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Drain all outstanding operations, then close the underlying client.
    pub async fn close(&self) -> Result<()> {
        self.tracker.close();
        self.tracker.wait().await;
        self.client.close().await
    }
}
