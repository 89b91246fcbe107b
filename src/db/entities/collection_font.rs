use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Join row between a collection and a font id. Rows are read back in `id`
/// order, which keeps a collection's `fontIds` in attach order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collections_fonts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub collection_id: String,
    pub font_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::collection::Entity",
        from = "Column::CollectionId",
        to = "super::collection::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Collection,
}

impl Related<super::collection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
