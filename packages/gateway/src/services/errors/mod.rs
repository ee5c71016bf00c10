pub mod gateway_errors;
pub mod refresh_errors;
pub mod session_errors;
