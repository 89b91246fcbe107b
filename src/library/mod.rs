//! Core of the font manager: user-facing operations over the injected stores,
//! plus the aggregation and export engines that shape data for the UI.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::models::{Collection, CollectionPatch, Device, Font, FontDraft, FontPatch, NewDevice};
use crate::db::services::{CollectionStore, DeviceStore, FontStore};

pub mod error;
pub mod export;
pub mod palette;
pub mod search;
pub mod stats;

pub use error::{LibraryError, Result};
pub use export::ExportFormat;
pub use search::FontQuery;
pub use stats::FontStats;

/// Entry point for every user action. Each call names the signed-in owner;
/// records belonging to someone else are reported as missing.
#[derive(Clone)]
pub struct LibraryService {
    fonts: Arc<dyn FontStore>,
    collections: Arc<dyn CollectionStore>,
    devices: Arc<dyn DeviceStore>,
}

fn signed_in(owner: Option<&str>) -> Result<&str> {
    match owner {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(LibraryError::Auth),
    }
}

impl LibraryService {
    pub fn new(
        fonts: Arc<dyn FontStore>,
        collections: Arc<dyn CollectionStore>,
        devices: Arc<dyn DeviceStore>,
    ) -> Self {
        LibraryService {
            fonts,
            collections,
            devices,
        }
    }

    /// Uses one backend for all three record kinds.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: FontStore + CollectionStore + DeviceStore + 'static,
    {
        LibraryService {
            fonts: store.clone(),
            collections: store.clone(),
            devices: store,
        }
    }

    // --- Fonts ---

    pub async fn list_fonts(&self, owner: Option<&str>) -> Result<Vec<Font>> {
        let owner = signed_in(owner)?;
        self.fonts.list(owner).await
    }

    pub async fn search_fonts(&self, owner: Option<&str>, query: &FontQuery) -> Result<Vec<Font>> {
        let fonts = self.list_fonts(owner).await?;
        search::filter_fonts(fonts, query)
    }

    pub async fn get_font(&self, owner: Option<&str>, id: &str) -> Result<Font> {
        let owner = signed_in(owner)?;
        match self.fonts.get(id).await? {
            Some(font) if font.user_id == owner => Ok(font),
            _ => Err(LibraryError::not_found(format!("font {id}"))),
        }
    }

    pub async fn create_font(&self, owner: Option<&str>, draft: FontDraft) -> Result<Font> {
        let owner = signed_in(owner)?;
        let font = self.fonts.create(owner, draft).await?;
        info!(font_id = %font.id, owner, name = %font.name, "Font registered.");
        Ok(font)
    }

    pub async fn update_font(&self, owner: Option<&str>, id: &str, patch: FontPatch) -> Result<Font> {
        self.get_font(owner, id).await?;
        self.fonts
            .update(id, patch)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("font {id}")))
    }

    pub async fn delete_font(&self, owner: Option<&str>, id: &str) -> Result<()> {
        self.get_font(owner, id).await?;
        if !self.fonts.delete(id).await? {
            return Err(LibraryError::not_found(format!("font {id}")));
        }
        info!(font_id = id, "Font deleted.");
        Ok(())
    }

    pub async fn stats(&self, owner: Option<&str>) -> Result<FontStats> {
        let fonts = self.list_fonts(owner).await?;
        Ok(stats::compute(&fonts, Utc::now()))
    }

    // --- Collections ---

    pub async fn list_collections(&self, owner: Option<&str>) -> Result<Vec<Collection>> {
        let owner = signed_in(owner)?;
        self.collections.list(owner).await
    }

    pub async fn get_collection(&self, owner: Option<&str>, id: &str) -> Result<Collection> {
        let owner = signed_in(owner)?;
        match self.collections.get(id).await? {
            Some(collection) if collection.user_id == owner => Ok(collection),
            _ => Err(LibraryError::not_found(format!("collection {id}"))),
        }
    }

    pub async fn create_collection(
        &self,
        owner: Option<&str>,
        name: &str,
        description: &str,
    ) -> Result<Collection> {
        let owner = signed_in(owner)?;
        let collection = self.collections.create(owner, name, description).await?;
        info!(collection_id = %collection.id, owner, "Collection created.");
        Ok(collection)
    }

    pub async fn update_collection(
        &self,
        owner: Option<&str>,
        id: &str,
        patch: CollectionPatch,
    ) -> Result<Collection> {
        let current = self.get_collection(owner, id).await?;
        if let Some(font_ids) = &patch.font_ids {
            // Same rule as attach_font; ids already in the collection may stay
            // even when their font has since been deleted.
            let visible: HashSet<String> = self
                .fonts
                .list(&current.user_id)
                .await?
                .into_iter()
                .map(|f| f.id)
                .collect();
            if let Some(unknown) = font_ids
                .iter()
                .find(|fid| !visible.contains(fid.as_str()) && !current.contains(fid))
            {
                return Err(LibraryError::not_found(format!("font {unknown}")));
            }
        }
        self.collections
            .update(id, patch)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("collection {id}")))
    }

    pub async fn delete_collection(&self, owner: Option<&str>, id: &str) -> Result<()> {
        self.get_collection(owner, id).await?;
        if !self.collections.delete(id).await? {
            return Err(LibraryError::not_found(format!("collection {id}")));
        }
        info!(collection_id = id, "Collection deleted.");
        Ok(())
    }

    /// Adds a font the owner can see. Returns `false` when it was already there.
    pub async fn attach_font(&self, owner: Option<&str>, collection_id: &str, font_id: &str) -> Result<bool> {
        self.get_collection(owner, collection_id).await?;
        self.get_font(owner, font_id).await?;
        let attached = self.collections.attach_font(collection_id, font_id).await?;
        debug!(collection_id, font_id, attached, "Attach font.");
        Ok(attached)
    }

    /// The font itself need not exist any more, so dangling ids can be cleaned up.
    pub async fn detach_font(&self, owner: Option<&str>, collection_id: &str, font_id: &str) -> Result<bool> {
        self.get_collection(owner, collection_id).await?;
        let detached = self.collections.detach_font(collection_id, font_id).await?;
        debug!(collection_id, font_id, detached, "Detach font.");
        Ok(detached)
    }

    /// Fonts of one collection in collection order; ids that no longer resolve are skipped.
    pub async fn collection_fonts(&self, owner: Option<&str>, id: &str) -> Result<Vec<Font>> {
        let collection = self.get_collection(owner, id).await?;
        let fonts = self.fonts.list(&collection.user_id).await?;
        Ok(export::resolve_fonts(&collection, fonts))
    }

    pub async fn export_collection(&self, owner: Option<&str>, id: &str, format: ExportFormat) -> Result<String> {
        let collection = self.get_collection(owner, id).await?;
        let fonts = self.fonts.list(&collection.user_id).await?;
        let resolved = export::resolve_fonts(&collection, fonts);
        let skipped = collection.font_ids.len().saturating_sub(resolved.len());
        if skipped > 0 {
            debug!(collection_id = id, skipped, "Export skipped dangling font ids.");
        }
        export::render(&collection, &resolved, format)
    }

    // --- Devices ---

    pub async fn list_devices(&self, owner: Option<&str>) -> Result<Vec<Device>> {
        let owner = signed_in(owner)?;
        self.devices.list(owner).await
    }

    pub async fn register_device(&self, owner: Option<&str>, device: NewDevice) -> Result<Device> {
        let owner = signed_in(owner)?;
        self.devices.create(owner, device).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::DeviceType;
    use crate::db::services::{DatabaseStore, LocalStore};

    const OWNER: Option<&str> = Some("user-1");

    fn local() -> LibraryService {
        LibraryService::from_store(Arc::new(LocalStore::in_memory()))
    }

    async fn scenario(library: &LibraryService) {
        let font = library
            .create_font(OWNER, FontDraft::new("Inter Regular", "sans-serif", "/fonts/Inter.otf"))
            .await
            .unwrap();
        let listed = library.list_fonts(OWNER).await.unwrap();
        assert_eq!(listed.iter().filter(|f| f.id == font.id).count(), 1);

        let collection = library.create_collection(OWNER, "Brand", "").await.unwrap();
        assert!(collection.font_ids.is_empty());

        assert!(library.attach_font(OWNER, &collection.id, &font.id).await.unwrap());
        let collection = library.get_collection(OWNER, &collection.id).await.unwrap();
        assert_eq!(collection.font_ids, vec![font.id.clone()]);

        let csv = library
            .export_collection(OWNER, &collection.id, ExportFormat::Csv)
            .await
            .unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(r#""Inter Regular","Inter Regular","Regular",400,"#));
    }

    #[tokio::test]
    async fn test_scenario_on_local_store() {
        scenario(&local()).await;
    }

    #[tokio::test]
    async fn test_scenario_on_database_store() {
        let store = DatabaseStore::connect("sqlite::memory:").await.unwrap();
        scenario(&LibraryService::from_store(Arc::new(store))).await;
    }

    #[tokio::test]
    async fn test_requires_signed_in_owner() {
        let library = local();
        assert_eq!(library.list_fonts(None).await.unwrap_err(), LibraryError::Auth);
        assert_eq!(
            library
                .create_font(Some(" "), FontDraft::new("Lora", "serif", "/l.ttf"))
                .await
                .unwrap_err(),
            LibraryError::Auth
        );
        assert_eq!(library.create_collection(None, "Brand", "").await.unwrap_err(), LibraryError::Auth);
    }

    #[tokio::test]
    async fn test_foreign_records_are_not_found() {
        let library = local();
        let font = library
            .create_font(Some("alice"), FontDraft::new("Lora", "serif", "/l.ttf"))
            .await
            .unwrap();
        let collection = library.create_collection(Some("alice"), "Mine", "").await.unwrap();

        let err = library.delete_font(Some("bob"), &font.id).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
        let err = library
            .export_collection(Some("bob"), &collection.id, ExportFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));

        let bob_collection = library.create_collection(Some("bob"), "Theirs", "").await.unwrap();
        let err = library
            .attach_font(Some("bob"), &bob_collection.id, &font.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_collection_patch_cannot_reference_foreign_fonts() {
        let library = local();
        let alices = library
            .create_font(Some("alice"), FontDraft::new("Lora", "serif", "/l.ttf"))
            .await
            .unwrap();
        let bobs = library
            .create_font(Some("bob"), FontDraft::new("Inter", "sans-serif", "/i.ttf"))
            .await
            .unwrap();
        let collection = library.create_collection(Some("bob"), "Theirs", "").await.unwrap();

        let patch = CollectionPatch {
            font_ids: Some(vec![bobs.id.clone(), alices.id.clone()]),
            ..Default::default()
        };
        let err = library
            .update_collection(Some("bob"), &collection.id, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
        let unchanged = library.get_collection(Some("bob"), &collection.id).await.unwrap();
        assert!(unchanged.font_ids.is_empty());

        let patch = CollectionPatch {
            font_ids: Some(vec![bobs.id.clone()]),
            ..Default::default()
        };
        let updated = library
            .update_collection(Some("bob"), &collection.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.font_ids, vec![bobs.id]);
    }

    #[tokio::test]
    async fn test_collection_patch_keeps_dangling_ids() {
        let store = DatabaseStore::connect("sqlite::memory:").await.unwrap();
        let library = LibraryService::from_store(Arc::new(store));
        let gone = library
            .create_font(OWNER, FontDraft::new("Gone", "serif", "/gone.ttf"))
            .await
            .unwrap();
        let collection = library.create_collection(OWNER, "Brand", "").await.unwrap();
        library.attach_font(OWNER, &collection.id, &gone.id).await.unwrap();
        library.delete_font(OWNER, &gone.id).await.unwrap();

        let patch = CollectionPatch {
            name: Some("Brand 2".into()),
            font_ids: Some(vec![gone.id.clone()]),
            ..Default::default()
        };
        let updated = library.update_collection(OWNER, &collection.id, patch).await.unwrap();
        assert_eq!(updated.font_ids, vec![gone.id]);
    }

    #[tokio::test]
    async fn test_export_missing_collection() {
        let library = local();
        let err = library
            .export_collection(OWNER, "missing", ExportFormat::Csv)
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_export_skips_font_deleted_behind_collection() {
        let store = DatabaseStore::connect("sqlite::memory:").await.unwrap();
        let library = LibraryService::from_store(Arc::new(store));
        let kept = library
            .create_font(OWNER, FontDraft::new("Kept", "serif", "/kept.ttf"))
            .await
            .unwrap();
        let gone = library
            .create_font(OWNER, FontDraft::new("Gone", "serif", "/gone.ttf"))
            .await
            .unwrap();
        let collection = library.create_collection(OWNER, "Brand", "").await.unwrap();
        library.attach_font(OWNER, &collection.id, &gone.id).await.unwrap();
        library.attach_font(OWNER, &collection.id, &kept.id).await.unwrap();
        library.delete_font(OWNER, &gone.id).await.unwrap();

        let json = library
            .export_collection(OWNER, &collection.id, ExportFormat::Json)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let fonts = value["fonts"].as_array().unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0]["id"], kept.id.as_str());

        let resolved = library.collection_fonts(OWNER, &collection.id).await.unwrap();
        assert_eq!(resolved, vec![kept]);

        // The dangling id can still be detached.
        assert!(library.detach_font(OWNER, &collection.id, &gone.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_stats_and_search_follow_mutations() {
        let library = local();
        assert_eq!(library.stats(OWNER).await.unwrap(), FontStats::default());

        let mut draft = FontDraft::new("Fira Code", "monospace", "/fira.ttf");
        draft.license = Some("free".into());
        let fira = library.create_font(OWNER, draft).await.unwrap();
        library
            .create_font(OWNER, FontDraft::new("Lora", "serif", "/lora.ttf"))
            .await
            .unwrap();

        let stats = library.stats(OWNER).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.recently_added, 2);

        let query = FontQuery {
            category: Some("monospace".into()),
            ..Default::default()
        };
        let found = library.search_fonts(OWNER, &query).await.unwrap();
        assert_eq!(found, vec![fira.clone()]);

        library.delete_font(OWNER, &fira.id).await.unwrap();
        assert_eq!(library.stats(OWNER).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_devices_are_per_owner() {
        let library = local();
        library
            .register_device(
                OWNER,
                NewDevice {
                    name: "Studio".into(),
                    device_type: DeviceType::Desktop,
                },
            )
            .await
            .unwrap();
        assert_eq!(library.list_devices(OWNER).await.unwrap().len(), 1);
        assert!(library.list_devices(Some("someone-else")).await.unwrap().is_empty());
    }
}
