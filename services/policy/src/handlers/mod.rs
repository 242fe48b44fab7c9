pub mod acknowledgments;
pub mod assignments;
pub mod auth;
pub mod policies;
pub mod tenant;
