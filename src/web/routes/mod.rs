pub mod collection_routes;
pub mod device_routes;
pub mod font_routes;
