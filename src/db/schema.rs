use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};
use tracing::info;

use crate::db::entities::collection_font;
use crate::db::entities::prelude::{Collection, CollectionFont, Device, Font};

/// Name of the unique index that keeps a font out of a collection twice.
const COLLECTION_FONT_UNIQUE: &str = "idx_collections_fonts_collection_font";

/// Creates the four record tables if they are missing. `collections` must
/// exist before `collections_fonts` because of the foreign key.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(Font),
        schema.create_table_from_entity(Collection),
        schema.create_table_from_entity(CollectionFont),
        schema.create_table_from_entity(Device),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    let membership_index = Index::create()
        .name(COLLECTION_FONT_UNIQUE)
        .table(CollectionFont)
        .col(collection_font::Column::CollectionId)
        .col(collection_font::Column::FontId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&membership_index)).await?;

    info!(backend = ?backend, "Database tables are ready.");
    Ok(())
}
