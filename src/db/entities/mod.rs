//! SeaORM entities backing the database store.
//!
//! Table names match the record collections of the hosted backend:
//! `fonts`, `collections`, `collections_fonts` and `devices`.

pub mod collection;
pub mod collection_font;
pub mod device;
pub mod font;

pub mod prelude {
    pub use super::collection::Entity as Collection;
    pub use super::collection_font::Entity as CollectionFont;
    pub use super::device::Entity as Device;
    pub use super::font::Entity as Font;
}
