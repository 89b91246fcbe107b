pub mod db;
pub mod library;
pub mod server;
pub mod web;

pub mod version;
