pub mod fingerprint;
pub mod repository;
pub mod types;
