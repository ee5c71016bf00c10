pub mod errors;
pub mod token_service;
