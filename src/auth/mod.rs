pub mod claims;
pub mod extractors;
pub mod jwt;
pub mod keys;
pub mod password;
