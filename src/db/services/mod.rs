//! The `services` module is the persistence seam of the application.
//!
//! Callers never talk to a database or a file directly. They hold the store
//! traits below, and one of two implementations is injected at startup:
//! [`LocalStore`], a JSON key-value store standing in for browser local
//! storage, or [`DatabaseStore`], which keeps the same records in SQL tables
//! through SeaORM. Both honour the same contracts, with one known difference:
//! only the local store removes a deleted font from the collections that
//! reference it.

use async_trait::async_trait;

use crate::db::models::{Collection, CollectionPatch, Device, Font, FontDraft, FontPatch, NewDevice};
use crate::library::Result;

pub mod database_store;
pub mod local_store;

pub use database_store::DatabaseStore;
pub use local_store::LocalStore;

#[async_trait]
pub trait FontStore: Send + Sync {
    /// All fonts owned by `owner_id`. Order is backend defined.
    async fn list(&self, owner_id: &str) -> Result<Vec<Font>>;

    async fn get(&self, id: &str) -> Result<Option<Font>>;

    /// Validates `draft` and stores it under a freshly generated id.
    async fn create(&self, owner_id: &str, draft: FontDraft) -> Result<Font>;

    /// `Ok(None)` when no font has this id.
    async fn update(&self, id: &str, patch: FontPatch) -> Result<Option<Font>>;

    /// `true` when a record existed and was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn list(&self, owner_id: &str) -> Result<Vec<Collection>>;

    async fn get(&self, id: &str) -> Result<Option<Collection>>;

    /// Creates an empty collection with a random palette color.
    async fn create(&self, owner_id: &str, name: &str, description: &str) -> Result<Collection>;

    /// Always refreshes `updated_at`.
    async fn update(&self, id: &str, patch: CollectionPatch) -> Result<Option<Collection>>;

    async fn delete(&self, id: &str) -> Result<bool>;

    /// `false` when the collection is missing or already holds the font.
    async fn attach_font(&self, collection_id: &str, font_id: &str) -> Result<bool>;

    /// `false` when the collection is missing or does not hold the font.
    async fn detach_font(&self, collection_id: &str, font_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn list(&self, owner_id: &str) -> Result<Vec<Device>>;

    async fn create(&self, owner_id: &str, device: NewDevice) -> Result<Device>;
}
