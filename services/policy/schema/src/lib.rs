pub mod acknowledgments;
pub mod assignments;
pub mod auth_codes;
pub mod email_events;
pub mod policies;
pub mod users;
