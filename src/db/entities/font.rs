use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::{Category, FontFormat, License};
use crate::db::models;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fonts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub device_id: Option<String>,
    pub name: String,
    pub family: String,
    pub style: String,
    pub weight: i32,
    pub format: FontFormat,
    pub size: i64,
    pub date_installed: ChronoDateTimeUtc,
    pub path: String,
    pub license: License,
    pub category: Category,
    pub preview_text: Option<String>,
}

// No relation to `collections_fonts`: removing a font leaves join rows behind,
// and readers skip ids that no longer resolve.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for models::Font {
    fn from(m: Model) -> Self {
        models::Font {
            id: m.id,
            user_id: m.user_id,
            device_id: m.device_id,
            name: m.name,
            family: m.family,
            style: m.style,
            weight: m.weight.max(0) as u32,
            format: m.format,
            size: m.size.max(0) as u64,
            date_installed: m.date_installed,
            path: m.path,
            license: m.license,
            category: m.category,
            preview_text: m.preview_text,
        }
    }
}

impl From<models::Font> for Model {
    fn from(f: models::Font) -> Self {
        Model {
            id: f.id,
            user_id: f.user_id,
            device_id: f.device_id,
            name: f.name,
            family: f.family,
            style: f.style,
            weight: i32::try_from(f.weight).unwrap_or(i32::MAX),
            format: f.format,
            size: i64::try_from(f.size).unwrap_or(i64::MAX),
            date_installed: f.date_installed,
            path: f.path,
            license: f.license,
            category: f.category,
            preview_text: f.preview_text,
        }
    }
}
