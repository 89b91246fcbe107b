use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{CollectionStore, DeviceStore, FontStore};
use crate::db::models::{Collection, CollectionPatch, Device, Font, FontDraft, FontPatch, NewDevice};
use crate::library::{Result, palette};

const FONTS_KEY: &str = "fonts";
const COLLECTIONS_KEY: &str = "collections";
const DEVICES_KEY: &str = "devices";

#[derive(Default)]
struct LocalState {
    fonts: Vec<Font>,
    collections: Vec<Collection>,
    devices: Vec<Device>,
}

/// Key-value document store. Each key holds a JSON array of records; when a
/// directory is configured, the array is rewritten to `<dir>/<key>.json` after
/// every mutation. The in-memory state only changes once the write succeeded.
pub struct LocalStore {
    dir: Option<PathBuf>,
    state: Mutex<LocalState>,
}

impl LocalStore {
    /// A store that forgets everything when dropped.
    pub fn in_memory() -> Self {
        LocalStore {
            dir: None,
            state: Mutex::new(LocalState::default()),
        }
    }

    /// Opens (or initialises) a store persisted under `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let state = LocalState {
            fonts: load_key(&dir, FONTS_KEY).await?,
            collections: load_key(&dir, COLLECTIONS_KEY).await?,
            devices: load_key(&dir, DEVICES_KEY).await?,
        };
        info!(
            dir = %dir.display(),
            fonts = state.fonts.len(),
            collections = state.collections.len(),
            "Opened local store."
        );

        Ok(LocalStore {
            dir: Some(dir),
            state: Mutex::new(state),
        })
    }

    async fn persist<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let contents = serde_json::to_vec(items)?;
        let target = key_path(dir, key);
        let tmp = target.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &target).await?;
        debug!(key, records = items.len(), "Persisted local store key.");
        Ok(())
    }
}

fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

async fn load_key<T: DeserializeOwned>(dir: &Path, key: &str) -> Result<Vec<T>> {
    let path = key_path(dir, key);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl FontStore for LocalStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Font>> {
        let state = self.state.lock().await;
        Ok(state
            .fonts
            .iter()
            .filter(|f| f.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Font>> {
        let state = self.state.lock().await;
        Ok(state.fonts.iter().find(|f| f.id == id).cloned())
    }

    async fn create(&self, owner_id: &str, draft: FontDraft) -> Result<Font> {
        let font = draft.into_font(owner_id, Utc::now())?;
        let mut state = self.state.lock().await;

        let mut fonts = state.fonts.clone();
        fonts.push(font.clone());
        self.persist(FONTS_KEY, &fonts).await?;
        state.fonts = fonts;

        Ok(font)
    }

    async fn update(&self, id: &str, patch: FontPatch) -> Result<Option<Font>> {
        let mut state = self.state.lock().await;
        let Some(index) = state.fonts.iter().position(|f| f.id == id) else {
            return Ok(None);
        };

        let mut fonts = state.fonts.clone();
        patch.apply(&mut fonts[index])?;
        let updated = fonts[index].clone();
        self.persist(FONTS_KEY, &fonts).await?;
        state.fonts = fonts;

        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let fonts: Vec<Font> = state.fonts.iter().filter(|f| f.id != id).cloned().collect();
        if fonts.len() == state.fonts.len() {
            return Ok(false);
        }

        // Cascade: drop the id from every collection that references it.
        let mut collections = state.collections.clone();
        let mut touched = false;
        for collection in collections.iter_mut() {
            let before = collection.font_ids.len();
            collection.font_ids.retain(|fid| fid != id);
            touched |= collection.font_ids.len() != before;
        }

        // Collections first: if the second write fails the font is still
        // listed and only its memberships are gone on disk.
        if touched {
            self.persist(COLLECTIONS_KEY, &collections).await?;
        }
        if let Err(e) = self.persist(FONTS_KEY, &fonts).await {
            if touched {
                warn!(font_id = id, "Font delete failed after its collection memberships were written.");
            }
            return Err(e);
        }
        state.fonts = fonts;
        state.collections = collections;
        debug!(font_id = id, cascaded = touched, "Deleted font from local store.");
        Ok(true)
    }
}

#[async_trait]
impl CollectionStore for LocalStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Collection>> {
        let state = self.state.lock().await;
        Ok(state
            .collections
            .iter()
            .filter(|c| c.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Collection>> {
        let state = self.state.lock().await;
        Ok(state.collections.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, owner_id: &str, name: &str, description: &str) -> Result<Collection> {
        let color = palette::random_color(&mut rand::rng());
        let collection = Collection::new(owner_id, name, description, color, Utc::now())?;
        let mut state = self.state.lock().await;

        let mut collections = state.collections.clone();
        collections.push(collection.clone());
        self.persist(COLLECTIONS_KEY, &collections).await?;
        state.collections = collections;

        Ok(collection)
    }

    async fn update(&self, id: &str, patch: CollectionPatch) -> Result<Option<Collection>> {
        let mut state = self.state.lock().await;
        let Some(index) = state.collections.iter().position(|c| c.id == id) else {
            return Ok(None);
        };

        let mut collections = state.collections.clone();
        patch.apply(&mut collections[index], Utc::now())?;
        let updated = collections[index].clone();
        self.persist(COLLECTIONS_KEY, &collections).await?;
        state.collections = collections;

        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let collections: Vec<Collection> = state
            .collections
            .iter()
            .filter(|c| c.id != id)
            .cloned()
            .collect();
        if collections.len() == state.collections.len() {
            return Ok(false);
        }

        self.persist(COLLECTIONS_KEY, &collections).await?;
        state.collections = collections;
        Ok(true)
    }

    async fn attach_font(&self, collection_id: &str, font_id: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(index) = state.collections.iter().position(|c| c.id == collection_id) else {
            return Ok(false);
        };
        if state.collections[index].contains(font_id) {
            return Ok(false);
        }

        let mut collections = state.collections.clone();
        collections[index].font_ids.push(font_id.to_string());
        collections[index].updated_at = Utc::now();
        self.persist(COLLECTIONS_KEY, &collections).await?;
        state.collections = collections;

        Ok(true)
    }

    async fn detach_font(&self, collection_id: &str, font_id: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(index) = state.collections.iter().position(|c| c.id == collection_id) else {
            return Ok(false);
        };
        if !state.collections[index].contains(font_id) {
            return Ok(false);
        }

        let mut collections = state.collections.clone();
        collections[index].font_ids.retain(|id| id != font_id);
        collections[index].updated_at = Utc::now();
        self.persist(COLLECTIONS_KEY, &collections).await?;
        state.collections = collections;

        Ok(true)
    }
}

#[async_trait]
impl DeviceStore for LocalStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Device>> {
        let state = self.state.lock().await;
        Ok(state
            .devices
            .iter()
            .filter(|d| d.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create(&self, owner_id: &str, device: NewDevice) -> Result<Device> {
        let device = device.into_device(owner_id)?;
        let mut state = self.state.lock().await;

        let mut devices = state.devices.clone();
        devices.push(device.clone());
        self.persist(DEVICES_KEY, &devices).await?;
        state.devices = devices;

        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::DeviceType;
    use crate::library::LibraryError;

    fn draft(name: &str) -> FontDraft {
        FontDraft::new(name, "serif", format!("/fonts/{name}.ttf"))
    }

    #[tokio::test]
    async fn test_create_then_list_assigns_unique_ids() {
        let store = LocalStore::in_memory();
        let a = FontStore::create(&store, "u1", draft("Lora")).await.unwrap();
        let b = FontStore::create(&store, "u1", draft("Merriweather")).await.unwrap();
        FontStore::create(&store, "u2", draft("Other")).await.unwrap();

        assert_ne!(a.id, b.id);
        let listed = FontStore::list(&store, "u1").await.unwrap();
        assert_eq!(listed, vec![a, b]);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_written() {
        let store = LocalStore::in_memory();
        let result = FontStore::create(&store, "u1", FontDraft::new("", "serif", "/x.ttf")).await;
        assert!(matches!(result, Err(LibraryError::Validation(_))));
        assert!(FontStore::list(&store, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_font() {
        let store = LocalStore::in_memory();
        assert_eq!(FontStore::update(&store, "nope", FontPatch::default()).await.unwrap(), None);
        assert!(!FontStore::delete(&store, "nope").await.unwrap());

        let font = FontStore::create(&store, "u1", draft("Lora")).await.unwrap();
        let patch = FontPatch {
            weight: Some(700),
            ..Default::default()
        };
        let updated = FontStore::update(&store, &font.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.weight, 700);
        assert!(FontStore::delete(&store, &font.id).await.unwrap());
        assert!(FontStore::get(&store, &font.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attach_is_idempotent_and_detach_restores() {
        let store = LocalStore::in_memory();
        let collection = CollectionStore::create(&store, "u1", "Brand", "").await.unwrap();

        assert!(store.attach_font(&collection.id, "f1").await.unwrap());
        assert!(!store.attach_font(&collection.id, "f1").await.unwrap());
        let current = CollectionStore::get(&store, &collection.id).await.unwrap().unwrap();
        assert_eq!(current.font_ids, vec!["f1".to_string()]);

        assert!(store.detach_font(&collection.id, "f1").await.unwrap());
        assert!(!store.detach_font(&collection.id, "f1").await.unwrap());
        assert!(store.attach_font(&collection.id, "f1").await.unwrap());
        let current = CollectionStore::get(&store, &collection.id).await.unwrap().unwrap();
        assert_eq!(current.font_ids, vec!["f1".to_string()]);

        assert!(!store.attach_font("missing", "f1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_collection_validates_and_picks_palette_color() {
        let store = LocalStore::in_memory();
        let err = CollectionStore::create(&store, "u1", "   ", "").await.unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));

        let collection = CollectionStore::create(&store, "u1", "Brand", "Logo faces").await.unwrap();
        assert!(palette::PALETTE.contains(&collection.color.as_str()));
        assert_eq!(collection.created_at, collection.updated_at);
    }

    #[tokio::test]
    async fn test_collection_update_refreshes_timestamp() {
        let store = LocalStore::in_memory();
        let collection = CollectionStore::create(&store, "u1", "Brand", "").await.unwrap();
        let updated = CollectionStore::update(&store, &collection.id, CollectionPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert!(updated.updated_at >= collection.updated_at);
        assert_eq!(updated.created_at, collection.created_at);
        assert!(CollectionStore::update(&store, "missing", CollectionPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_font_delete_cascades_into_collections() {
        let store = LocalStore::in_memory();
        let font = FontStore::create(&store, "u1", draft("Lora")).await.unwrap();
        let collection = CollectionStore::create(&store, "u1", "Brand", "").await.unwrap();
        store.attach_font(&collection.id, &font.id).await.unwrap();
        store.attach_font(&collection.id, "other").await.unwrap();

        assert!(FontStore::delete(&store, &font.id).await.unwrap());
        let current = CollectionStore::get(&store, &collection.id).await.unwrap().unwrap();
        assert_eq!(current.font_ids, vec!["other".to_string()]);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (font, collection) = {
            let store = LocalStore::open(dir.path()).await.unwrap();
            let font = FontStore::create(&store, "u1", draft("Lora")).await.unwrap();
            let collection = CollectionStore::create(&store, "u1", "Brand", "").await.unwrap();
            store.attach_font(&collection.id, &font.id).await.unwrap();
            DeviceStore::create(
                &store,
                "u1",
                NewDevice {
                    name: "Studio Mac".into(),
                    device_type: DeviceType::Desktop,
                },
            )
            .await
            .unwrap();
            (font, collection.id)
        };

        let reopened = LocalStore::open(dir.path()).await.unwrap();
        assert_eq!(FontStore::list(&reopened, "u1").await.unwrap(), vec![font.clone()]);
        let collection = CollectionStore::get(&reopened, &collection).await.unwrap().unwrap();
        assert_eq!(collection.font_ids, vec![font.id]);
        assert_eq!(DeviceStore::list(&reopened, "u1").await.unwrap().len(), 1);
        assert!(dir.path().join("fonts.json").exists());
    }

    #[tokio::test]
    async fn test_failed_font_write_keeps_font_listed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).await.unwrap();
        let font = FontStore::create(&store, "u1", draft("Lora")).await.unwrap();
        let collection = CollectionStore::create(&store, "u1", "Brand", "").await.unwrap();
        store.attach_font(&collection.id, &font.id).await.unwrap();

        // A directory in the way of the temp file makes the fonts write fail.
        let blocker = dir.path().join("fonts.json.tmp");
        std::fs::create_dir(&blocker).unwrap();
        let result = FontStore::delete(&store, &font.id).await;
        assert!(matches!(result, Err(LibraryError::Backend(_))));
        assert!(FontStore::get(&store, &font.id).await.unwrap().is_some());
        std::fs::remove_dir(&blocker).unwrap();

        let reopened = LocalStore::open(dir.path()).await.unwrap();
        assert_eq!(FontStore::list(&reopened, "u1").await.unwrap(), vec![font]);
        let on_disk = CollectionStore::get(&reopened, &collection.id).await.unwrap().unwrap();
        assert!(on_disk.font_ids.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_key_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fonts.json"), b"{not json").unwrap();
        let result = LocalStore::open(dir.path()).await;
        assert!(matches!(result, Err(LibraryError::Backend(_))));
    }
}
