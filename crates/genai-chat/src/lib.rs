pub mod adapter;
pub mod chat;
pub mod errors;
pub mod guard;
pub mod models;
pub mod providers;
