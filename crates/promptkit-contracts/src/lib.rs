pub mod catalog;
pub mod chat;
pub mod data_url;
pub mod events;
pub mod instruction;
pub mod models;
pub mod payload;
pub mod workspace;
