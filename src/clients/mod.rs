pub mod core_api;
pub mod health;
pub mod host;
pub mod webhook;
