pub mod auth_service_errors;
pub mod resource_service_errors;
