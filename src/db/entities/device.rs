use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::DeviceType;
use crate::db::models;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub device_type: DeviceType,
    pub last_sync: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for models::Device {
    fn from(m: Model) -> Self {
        models::Device {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            device_type: m.device_type,
            last_sync: m.last_sync,
        }
    }
}
