pub mod contact_me;
pub mod memory;
pub mod skill;
pub mod sqlx_repo;
pub mod token;
pub mod user;
