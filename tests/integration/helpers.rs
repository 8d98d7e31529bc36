//! Shared test helpers for integration tests.

use std::sync::Arc;

use sowgen_core::types::UserId;
use sowgen_database::{MemoryCollection, SowCollection};
use sowgen_entity::sow::{CreateSow, Sow};
use sowgen_entity::user::{Actor, UserRole};
use sowgen_service::DocumentStore;

/// A document store over an in-memory collection plus one actor per role.
pub struct TestApp {
    /// The store under test
    pub store: DocumentStore,
    /// Direct handle on the backing collection
    pub collection: MemoryCollection,
    /// A client owning the documents created by [`TestApp::create_draft`]
    pub client: Actor,
    /// A second, unrelated client
    pub other_client: Actor,
    /// An approver
    pub approver: Actor,
    /// An administrator
    pub admin: Actor,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let collection = MemoryCollection::new();
        Self::over(collection.clone(), Arc::new(collection))
    }

    /// Build a store over `backend`, keeping `collection` for inspection.
    pub fn over(collection: MemoryCollection, backend: Arc<dyn SowCollection>) -> Self {
        Self {
            store: DocumentStore::with_defaults(backend),
            collection,
            client: Actor::new(UserId::new(), "Cleo Client", UserRole::Client),
            other_client: Actor::new(UserId::new(), "Olga Other", UserRole::Client),
            approver: Actor::new(UserId::new(), "Abe Approver", UserRole::Approver),
            admin: Actor::new(UserId::new(), "Ada Admin", UserRole::Admin),
        }
    }

    /// Create a draft owned by the primary client.
    pub async fn create_draft(&self, project_name: &str) -> Sow {
        self.store
            .create(
                CreateSow::new(project_name, self.client.id.to_string()),
                &self.client,
            )
            .await
            .expect("Failed to create draft")
    }
}
