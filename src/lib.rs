pub mod aggregate;
pub mod auth;
pub mod config;
pub mod handler;
pub mod model;
pub mod store;
pub mod sync;
pub mod util;
