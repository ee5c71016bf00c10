pub mod claims;
pub mod requests;
pub mod responses;
