pub mod auth;
pub mod categories;
pub mod contact_me;
pub mod home;
pub mod json_error;
pub mod skills;
pub mod system;
