use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info};

use super::{CollectionStore, DeviceStore, FontStore};
use crate::db::entities::{collection, collection_font, device, font};
use crate::db::models::{Collection, CollectionPatch, Device, Font, FontDraft, FontPatch, NewDevice};
use crate::db::schema;
use crate::library::{Result, palette};

/// Store backed by the `fonts`, `collections`, `collections_fonts` and
/// `devices` tables.
///
/// Deleting a font does not touch `collections_fonts`; collections may keep
/// ids of fonts that are gone, and readers are expected to skip them.
#[derive(Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        DatabaseStore { db }
    }

    /// Connects to `database_url` and makes sure the tables exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let mut opt = ConnectOptions::new(database_url.to_owned());
        // Every pooled connection to an in-memory SQLite database sees its own empty database.
        if database_url.contains(":memory:") {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(10);
        }
        opt.sqlx_logging(false);

        let db = Database::connect(opt).await?;
        schema::create_tables(&db).await?;
        info!("Connected to database store.");
        Ok(DatabaseStore { db })
    }

    async fn font_ids_of<C: ConnectionTrait>(conn: &C, collection_id: &str) -> Result<Vec<String>> {
        let rows = collection_font::Entity::find()
            .filter(collection_font::Column::CollectionId.eq(collection_id))
            .order_by_asc(collection_font::Column::Id)
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|row| row.font_id).collect())
    }

    /// Inserts one join row. `false` when the unique index reports the pair
    /// already exists, which happens when another attach committed first.
    async fn insert_membership<C: ConnectionTrait>(conn: &C, collection_id: &str, font_id: &str) -> Result<bool> {
        let inserted = collection_font::Entity::insert_many(join_rows(collection_id, &[font_id.to_string()]))
            .exec(conn)
            .await;
        match inserted {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn touch<C: ConnectionTrait>(conn: &C, model: collection::Model) -> Result<collection::Model> {
        let mut active: collection::ActiveModel = model.into();
        active.updated_at = Set(Utc::now());
        Ok(active.update(conn).await?)
    }
}

fn assemble(model: collection::Model, font_ids: Vec<String>) -> Collection {
    Collection {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        description: model.description,
        font_ids,
        created_at: model.created_at,
        updated_at: model.updated_at,
        color: model.color,
    }
}

fn font_active_model(f: Font) -> font::ActiveModel {
    let m = font::Model::from(f);
    font::ActiveModel {
        id: Set(m.id),
        user_id: Set(m.user_id),
        device_id: Set(m.device_id),
        name: Set(m.name),
        family: Set(m.family),
        style: Set(m.style),
        weight: Set(m.weight),
        format: Set(m.format),
        size: Set(m.size),
        date_installed: Set(m.date_installed),
        path: Set(m.path),
        license: Set(m.license),
        category: Set(m.category),
        preview_text: Set(m.preview_text),
    }
}

fn join_rows(collection_id: &str, font_ids: &[String]) -> Vec<collection_font::ActiveModel> {
    font_ids
        .iter()
        .map(|font_id| collection_font::ActiveModel {
            collection_id: Set(collection_id.to_string()),
            font_id: Set(font_id.clone()),
            ..Default::default()
        })
        .collect()
}

#[async_trait]
impl FontStore for DatabaseStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Font>> {
        let models = font::Entity::find()
            .filter(font::Column::UserId.eq(owner_id))
            .order_by_asc(font::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Font::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Font>> {
        let model = font::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(Font::from))
    }

    async fn create(&self, owner_id: &str, draft: FontDraft) -> Result<Font> {
        let font = draft.into_font(owner_id, Utc::now())?;
        let inserted = font_active_model(font).insert(&self.db).await?;
        debug!(font_id = %inserted.id, owner = owner_id, "Inserted font.");
        Ok(inserted.into())
    }

    async fn update(&self, id: &str, patch: FontPatch) -> Result<Option<Font>> {
        let Some(model) = font::Entity::find_by_id(id.to_string()).one(&self.db).await? else {
            return Ok(None);
        };
        let mut current = Font::from(model);
        if patch.is_empty() {
            return Ok(Some(current));
        }
        patch.apply(&mut current)?;

        let mut active = font_active_model(current);
        active.id = Unchanged(id.to_string());
        let updated = active.update(&self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = font::Entity::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl CollectionStore for DatabaseStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Collection>> {
        let models = collection::Entity::find()
            .filter(collection::Column::UserId.eq(owner_id))
            .order_by_asc(collection::Column::CreatedAt)
            .all(&self.db)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let rows = collection_font::Entity::find()
            .filter(collection_font::Column::CollectionId.is_in(ids))
            .order_by_asc(collection_font::Column::Id)
            .all(&self.db)
            .await?;
        let mut by_collection: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            by_collection.entry(row.collection_id).or_default().push(row.font_id);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let font_ids = by_collection.remove(&m.id).unwrap_or_default();
                assemble(m, font_ids)
            })
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Collection>> {
        let Some(model) = collection::Entity::find_by_id(id.to_string()).one(&self.db).await? else {
            return Ok(None);
        };
        let font_ids = Self::font_ids_of(&self.db, id).await?;
        Ok(Some(assemble(model, font_ids)))
    }

    async fn create(&self, owner_id: &str, name: &str, description: &str) -> Result<Collection> {
        let color = palette::random_color(&mut rand::rng());
        let new = Collection::new(owner_id, name, description, color, Utc::now())?;

        let active = collection::ActiveModel {
            id: Set(new.id.clone()),
            user_id: Set(new.user_id.clone()),
            name: Set(new.name.clone()),
            description: Set(new.description.clone()),
            color: Set(new.color.clone()),
            created_at: Set(new.created_at),
            updated_at: Set(new.updated_at),
        };
        let model = active.insert(&self.db).await?;
        debug!(collection_id = %model.id, owner = owner_id, "Inserted collection.");
        Ok(assemble(model, Vec::new()))
    }

    async fn update(&self, id: &str, patch: CollectionPatch) -> Result<Option<Collection>> {
        let txn = self.db.begin().await?;
        let Some(model) = collection::Entity::find_by_id(id.to_string()).one(&txn).await? else {
            return Ok(None);
        };
        let font_ids = Self::font_ids_of(&txn, id).await?;
        let replace_fonts = patch.font_ids.is_some();

        let mut current = assemble(model.clone(), font_ids);
        patch.apply(&mut current, Utc::now())?;

        let mut active: collection::ActiveModel = model.into();
        active.name = Set(current.name.clone());
        active.description = Set(current.description.clone());
        active.color = Set(current.color.clone());
        active.updated_at = Set(current.updated_at);
        active.update(&txn).await?;

        if replace_fonts {
            collection_font::Entity::delete_many()
                .filter(collection_font::Column::CollectionId.eq(id))
                .exec(&txn)
                .await?;
            if !current.font_ids.is_empty() {
                collection_font::Entity::insert_many(join_rows(id, &current.font_ids))
                    .exec(&txn)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(Some(current))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let txn = self.db.begin().await?;
        collection_font::Entity::delete_many()
            .filter(collection_font::Column::CollectionId.eq(id))
            .exec(&txn)
            .await?;
        let result = collection::Entity::delete_by_id(id.to_string()).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn attach_font(&self, collection_id: &str, font_id: &str) -> Result<bool> {
        let txn = self.db.begin().await?;
        let Some(model) = collection::Entity::find_by_id(collection_id.to_string()).one(&txn).await? else {
            return Ok(false);
        };
        let existing = collection_font::Entity::find()
            .filter(collection_font::Column::CollectionId.eq(collection_id))
            .filter(collection_font::Column::FontId.eq(font_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        if !Self::insert_membership(&txn, collection_id, font_id).await? {
            debug!(collection_id, font_id, "Concurrent attach already added the font.");
            return Ok(false);
        }
        Self::touch(&txn, model).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn detach_font(&self, collection_id: &str, font_id: &str) -> Result<bool> {
        let txn = self.db.begin().await?;
        let Some(model) = collection::Entity::find_by_id(collection_id.to_string()).one(&txn).await? else {
            return Ok(false);
        };
        let result = collection_font::Entity::delete_many()
            .filter(collection_font::Column::CollectionId.eq(collection_id))
            .filter(collection_font::Column::FontId.eq(font_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }

        Self::touch(&txn, model).await?;
        txn.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl DeviceStore for DatabaseStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<Device>> {
        let models = device::Entity::find()
            .filter(device::Column::UserId.eq(owner_id))
            .order_by_asc(device::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Device::from).collect())
    }

    async fn create(&self, owner_id: &str, new_device: NewDevice) -> Result<Device> {
        let d = new_device.into_device(owner_id)?;
        let active = device::ActiveModel {
            id: Set(d.id),
            user_id: Set(d.user_id),
            name: Set(d.name),
            device_type: Set(d.device_type),
            last_sync: Set(d.last_sync),
        };
        let model = active.insert(&self.db).await?;
        Ok(model.into())
    }
}
