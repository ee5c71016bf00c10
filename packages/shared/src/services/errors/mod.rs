pub mod token_service_errors;
