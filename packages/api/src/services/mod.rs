pub mod auth_service;
pub mod errors;
pub mod resource_service;
