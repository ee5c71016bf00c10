pub mod auth;
pub mod credentials;
pub mod ids;
pub mod pagination;
pub mod resources;
pub mod user;
