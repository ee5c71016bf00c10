pub mod dispatcher;
pub mod errors;
pub mod refresh_coordinator;
pub mod resource_service;
pub mod session_service;
pub mod token_refresher;
