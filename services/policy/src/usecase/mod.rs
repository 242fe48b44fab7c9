pub mod acknowledgment;
pub mod assignment;
pub mod authcode;
pub mod policy;
pub mod reminder;
